//! Drawing surfaces and the card compositor.

/// Card compositor.
pub mod draw;
/// CPU raster surface.
pub mod cpu;
/// Rendered pixel buffers.
pub mod frame;
pub(crate) mod path;
/// End-to-end render helpers.
pub mod pipeline;
/// Call-recording surface with synthetic text metrics.
pub mod recording;
/// Surface trait and paint types.
pub mod surface;
