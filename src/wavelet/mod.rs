//! Radially symmetric wavelet kernels.
//!
//! A kernel is an odd-sized square matrix obtained by sampling a 1D radial
//! profile over the distance from the kernel center. Distances are measured
//! between cell centers and normalized by half the side length, so the
//! inscribed circle of the kernel maps to `t = 1`.

use crate::matrix::Matrix2D;
use crate::util::DiscFindResult;

/// `sqrt(1/3)`: core boundary of the 2D French hat, chosen so that the positive
/// core and the negative annulus inside `t <= 1` carry equal and opposite weight.
pub const FHAT2D_CORE: f32 = 0.577_350_26;

/// Built-in radial profiles. Each maps `t` in `[0, 1]` to `[-1, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    /// French hat balanced for 2D: `+1` for `t < 1/sqrt(3)`, `-0.5` up to `t = 1`.
    #[default]
    Fhat2d,
    /// 1D French hat: `+1` for `t < 1/3`, `-0.5` up to `t = 1`.
    Fhat,
    /// Mexican hat `(1 - u^2) * exp(-u^2 / 2)` with `u = 4t`.
    Mhat,
}

impl Profile {
    /// Evaluates the profile at normalized distance `t`.
    pub fn eval(self, t: f32) -> f32 {
        match self {
            Profile::Fhat2d => french_hat(t, FHAT2D_CORE),
            Profile::Fhat => french_hat(t, 1.0 / 3.0),
            Profile::Mhat => {
                let u = 4.0 * t;
                let u2 = u * u;
                (1.0 - u2) * (-u2 / 2.0).exp()
            }
        }
    }

    /// Ratio between the kernel side and the diameter of the positive core.
    ///
    /// A disc of diameter `d` pixels is matched by a kernel of side
    /// `d * footprint_ratio()`.
    pub fn footprint_ratio(self) -> f64 {
        match self {
            Profile::Fhat2d => 3f64.sqrt(),
            Profile::Fhat => 3.0,
            Profile::Mhat => 4.0,
        }
    }

    /// Largest relative diameter whose kernel still fits the matrix's shorter side.
    pub fn max_relative_diameter(self) -> f32 {
        (1.0 / self.footprint_ratio()) as f32
    }
}

fn french_hat(t: f32, core: f32) -> f32 {
    let t = t.abs();
    if t < core {
        1.0
    } else if t <= 1.0 {
        -0.5
    } else {
        0.0
    }
}

/// Samples `profile` into a `(2 * radius + 1)` square kernel scaled by `ratio`.
///
/// Values are truncated toward zero after scaling. `radius == 0` yields a 1x1
/// kernel holding `profile(0) * ratio`.
pub fn synthesize_kernel<F>(profile: F, radius: usize, ratio: f32) -> DiscFindResult<Matrix2D<i32>>
where
    F: Fn(f32) -> f32,
{
    let side = radius * 2 + 1;
    let center = side as f32 / 2.0;
    Matrix2D::from_fn(side, side, |i, j| {
        let dx = center - i as f32 - 0.5;
        let dy = center - j as f32 - 0.5;
        let t = (dx * dx + dy * dy).sqrt() / center;
        (profile(t) * ratio) as i32
    })
}

/// Synthesizes a kernel for one of the built-in profiles.
pub fn profile_kernel(
    profile: Profile,
    radius: usize,
    ratio: f32,
) -> DiscFindResult<Matrix2D<i32>> {
    synthesize_kernel(|t| profile.eval(t), radius, ratio)
}
