//! Raster encoding and output sinks.
//!
//! Cards are encoded once and handed to a [`sink::CardSink`], which decides where the bytes go.

/// PNG and JPEG encoding.
pub mod raster;
/// Sink trait and built-in sinks.
pub mod sink;
/// Tinify compression sink.
#[cfg(feature = "tinify")]
pub mod tinify;
