//! Conversions between `image` buffers and luminance matrices.
//!
//! Available when the `image-io` feature is enabled.

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};

use crate::matrix::Matrix2D;
use crate::util::{DiscFindError, DiscFindResult};

/// Builds a luminance matrix from a grayscale image, one cell per pixel.
pub fn matrix_from_gray_image(img: &GrayImage) -> DiscFindResult<Matrix2D<i32>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.as_raw().iter().map(|v| i32::from(*v)).collect();
    Matrix2D::from_vec(data, width, height)
}

/// Reduces any decoded image to luminance and builds a matrix from it.
pub fn matrix_from_dynamic_image(img: &DynamicImage) -> DiscFindResult<Matrix2D<i32>> {
    matrix_from_gray_image(&img.to_luma8())
}

/// Loads an image from disk as a luminance matrix.
pub fn load_gray_matrix<P: AsRef<Path>>(path: P) -> DiscFindResult<Matrix2D<i32>> {
    let img = image::open(path).map_err(|err| DiscFindError::ImageIo {
        reason: err.to_string(),
    })?;
    matrix_from_dynamic_image(&img)
}

/// Renders a response map with its minimum at 0 and maximum at 255.
pub fn response_to_gray_image(response: &Matrix2D<i32>) -> DiscFindResult<GrayImage> {
    if response.is_null() {
        return Err(DiscFindError::NullMatrix {
            context: "response image",
        });
    }
    let (min, max) = response
        .as_slice()
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let span = (i64::from(max) - i64::from(min)).max(1);
    to_gray(response, |v| ((i64::from(v) - i64::from(min)) * 255 / span) as u8)
}

/// Renders a kernel around mid-gray; `ratio` maps to full white.
pub fn kernel_to_gray_image(kernel: &Matrix2D<i32>, ratio: f32) -> DiscFindResult<GrayImage> {
    if kernel.is_null() {
        return Err(DiscFindError::NullMatrix {
            context: "kernel image",
        });
    }
    let scale = 127.0 / ratio.abs().max(f32::EPSILON);
    to_gray(kernel, |v| (v as f32 * scale + 127.0).clamp(0.0, 255.0) as u8)
}

fn to_gray<F>(matrix: &Matrix2D<i32>, map: F) -> DiscFindResult<GrayImage>
where
    F: Fn(i32) -> u8,
{
    let width = u32::try_from(matrix.width()).map_err(|_| DiscFindError::InvalidDimensions {
        width: matrix.width(),
        height: matrix.height(),
    })?;
    let height = u32::try_from(matrix.height()).map_err(|_| DiscFindError::InvalidDimensions {
        width: matrix.width(),
        height: matrix.height(),
    })?;
    Ok(GrayImage::from_fn(width, height, |x, y| {
        Luma([map(matrix[(x as usize, y as usize)])])
    }))
}

/// Writes a grayscale image, inferring the format from the extension.
pub fn save_gray_image<P: AsRef<Path>>(img: &GrayImage, path: P) -> DiscFindResult<()> {
    img.save(path).map_err(|err| DiscFindError::ImageIo {
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{kernel_to_gray_image, matrix_from_gray_image, response_to_gray_image};
    use crate::matrix::Matrix2D;
    use crate::wavelet::{profile_kernel, Profile};
    use image::GrayImage;

    #[test]
    fn gray_image_maps_pixels_to_cells() {
        let img = GrayImage::from_fn(3, 2, |x, y| image::Luma([(x + 10 * y) as u8]));
        let m = matrix_from_gray_image(&img).unwrap();
        assert_eq!(m.size().width, 3);
        assert_eq!(m[(2, 1)], 12);
    }

    #[test]
    fn response_image_spans_full_range() {
        let m = Matrix2D::from_vec(vec![-50, 0, 150], 3, 1).unwrap();
        let img = response_to_gray_image(&m).unwrap();
        assert_eq!(img.get_pixel(0, 0)[0], 0);
        assert_eq!(img.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn kernel_image_centers_on_mid_gray() {
        let k = profile_kernel(Profile::Fhat2d, 3, 100.0).unwrap();
        let img = kernel_to_gray_image(&k, 100.0).unwrap();
        assert_eq!(img.get_pixel(3, 3)[0], 254);
        assert_eq!(img.get_pixel(0, 0)[0], 127);
    }
}
