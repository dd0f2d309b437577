//! Span and event macros for the search stages.
//!
//! Built with the `tracing` feature, `trace_span!` opens an info span (`search`,
//! `search_iteration`, `evaluate_candidate`) and `trace_event!` emits an info
//! event. Without it both expand to code that only evaluates the field values,
//! and spans become [`NoopSpan`].

#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info_span!($name $(, $key = $value)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $key:ident = $value:expr)* $(,)?) => {{
        let _ = ($($value,)*);
        $crate::trace::NoopSpan
    }};
}

#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr $(, $key:ident = $value:expr)+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr $(, $key:ident = $value:expr)+ $(,)?) => {
        let _ = ($($value,)*);
    };
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Guard returned by `trace_span!` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
