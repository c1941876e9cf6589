#[cfg(feature = "tracing")]
pub mod logging;
#[cfg(feature = "harness")]
pub mod tracing;
