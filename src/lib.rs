//! cardsmith renders social-media "card" images.
//!
//! A card is a fixed-size canvas composited from a background color or gradient, an optional
//! template image, edge borders, and word-wrapped text blocks. Cards are described by
//! [`CardOptions`] (usually loaded from JSON) and produced with:
//!
//! - [`make_card`] to render, encode and write one card
//! - [`draw`] to run the compositor against any [`Surface`], such as a [`CpuSurface`] or a
//!   [`RecordingSurface`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod card;
mod foundation;
mod layout;

/// Raster encoding and output sinks.
pub mod encode;
/// Drawing surfaces and the card compositor.
pub mod render;

pub use crate::assets::color::Color;
pub use crate::assets::decode::{PreparedImage, decode_image, load_image};
pub use crate::assets::font::{
    DEFAULT_FONT_FAMILY, FontRegistry, FontSpec, RegisteredFont, ResolvedFont,
};
pub use crate::card::model::{
    BorderSpec, Borders, EdgeGeometry, GradientStop, Position, RenderRequest, RoundedBorderSpec,
    TemplateImage, TextBlock,
};
pub use crate::card::options::{
    CardOptions, CloudStore, CompressionConfig, DEFAULT_OUTPUT, FontSource,
};
pub use crate::foundation::core::{BezPath, Canvas, DEFAULT_HEIGHT, DEFAULT_WIDTH, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{CardError, CardResult};
pub use crate::layout::wrap::{BlockLayout, LineBox, TextPlacement, layout_block, wrap_words};

pub use crate::encode::raster::{EncodedCard, JPEG_QUALITY, OutputFormat, encode_frame};
pub use crate::encode::sink::{CardSink, FileSink, InMemorySink};
#[cfg(feature = "tinify")]
pub use crate::encode::tinify::TinifySink;
pub use crate::render::cpu::CpuSurface;
pub use crate::render::draw::{draw, paint_gradient, round_rect_clip};
pub use crate::render::frame::FrameRGBA;
pub use crate::render::pipeline::{
    CardOutcome, TextBlockLayout, layout_card, load_fonts, make_card, make_card_with_sink,
    prepare_request, render_card, resolve_asset_path,
};
pub use crate::render::recording::{DrawCall, RecordingSurface, SyntheticMetrics};
pub use crate::render::surface::{
    ColorStop, FillStyle, LinearGradient, Surface, TextAlign, TextBaseline, TextMetrics,
};
