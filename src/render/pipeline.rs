use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::assets::decode::load_image;
use crate::assets::font::FontRegistry;
use crate::card::model::{RenderRequest, TemplateImage};
use crate::card::options::CardOptions;
use crate::encode::raster::{EncodedCard, OutputFormat};
use crate::encode::sink::{CardSink, FileSink};
use crate::foundation::error::CardResult;
use crate::layout::wrap::{BlockLayout, layout_block};
use crate::render::cpu::CpuSurface;
use crate::render::draw::{draw, resolve_text_x};
use crate::render::frame::FrameRGBA;
use crate::render::surface::{Surface, TextBaseline};

/// Summary of one finished card.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CardOutcome {
    /// Where the card was written.
    pub path: PathBuf,
    /// Encoded format.
    pub format: OutputFormat,
    /// Size of the encoded image handed to the sink.
    pub bytes: usize,
    /// Whether the card went through the compression service.
    pub compressed: bool,
}

/// Resolve an asset path from the options against `assets_root`. Absolute paths are kept.
pub fn resolve_asset_path(assets_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        assets_root.join(path)
    }
}

/// Load every font listed in the options.
pub fn load_fonts(options: &CardOptions, assets_root: &Path) -> CardResult<FontRegistry> {
    let mut fonts = FontRegistry::new();
    for font in &options.fonts {
        fonts.register_file(resolve_asset_path(assets_root, &font.file), font.family.clone())?;
    }
    Ok(fonts)
}

/// Build the render request, decoding the template image if one is named.
pub fn prepare_request(options: &CardOptions, assets_root: &Path) -> CardResult<RenderRequest> {
    let template = options
        .template_image
        .as_deref()
        .map(|p| load_image(resolve_asset_path(assets_root, p)).map(TemplateImage::Decoded))
        .transpose()?;
    options.to_request(template)
}

/// Render the options to premultiplied pixels.
#[tracing::instrument(skip_all, fields(texts = options.texts.len()))]
pub fn render_card(options: &CardOptions, assets_root: &Path) -> CardResult<FrameRGBA> {
    let fonts = load_fonts(options, assets_root)?;
    let req = prepare_request(options, assets_root)?;
    debug!(
        width = req.canvas.width,
        height = req.canvas.height,
        fonts = fonts.len(),
        "rendering card"
    );
    let mut surface = CpuSurface::new(req.canvas, fonts)?;
    draw(&mut surface, &req)?;
    surface.finish()
}

/// Render, encode and store a card with the sink the options ask for.
///
/// A configured compression key routes the image through the compression service, which stores
/// it in the configured cloud bucket or hands it back for the output path. Otherwise it is
/// written to the output path.
#[tracing::instrument(skip_all, fields(output = %options.output_path().display()))]
pub fn make_card(options: &CardOptions, assets_root: &Path) -> CardResult<CardOutcome> {
    match options.compression_key() {
        #[cfg(feature = "tinify")]
        Some(key) => {
            let store = options.compression.as_ref().and_then(|c| c.store.clone());
            let mut sink = crate::encode::tinify::TinifySink::new(key)?.with_store(store);
            let outcome = make_card_with_sink(options, assets_root, &mut sink)?;
            Ok(CardOutcome {
                compressed: true,
                ..outcome
            })
        }
        #[cfg(not(feature = "tinify"))]
        Some(_) => {
            tracing::warn!("compression requested but the tinify feature is disabled, writing uncompressed");
            make_card_with_sink(options, assets_root, &mut FileSink::new())
        }
        None => make_card_with_sink(options, assets_root, &mut FileSink::new()),
    }
}

/// Render, encode and hand the card to `sink`.
pub fn make_card_with_sink(
    options: &CardOptions,
    assets_root: &Path,
    sink: &mut dyn CardSink,
) -> CardResult<CardOutcome> {
    let frame = render_card(options, assets_root)?;
    let card = EncodedCard::encode(&frame, options.output_path())?;
    sink.write(&card)?;
    Ok(CardOutcome {
        path: card.path,
        format: card.format,
        bytes: card.bytes.len(),
        compressed: false,
    })
}

/// Wrapped lines of one text block, as reported by [`layout_card`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextBlockLayout {
    /// Index into `texts`.
    pub index: usize,
    /// Placed lines.
    #[serde(flatten)]
    pub layout: BlockLayout,
}

/// Wrap and place every text block without drawing it.
///
/// Anchors are resolved the same way [`draw`] resolves them.
pub fn layout_card<S: Surface + ?Sized>(
    surface: &mut S,
    req: &RenderRequest,
) -> CardResult<Vec<TextBlockLayout>> {
    let (w, h) = (req.canvas.w(), req.canvas.h());
    surface.set_text_baseline(TextBaseline::Top);

    let mut out = Vec::with_capacity(req.texts.len());
    for (index, block) in req.texts.iter().enumerate() {
        surface.set_font(&block.font);
        let x = resolve_text_x(surface, block, w, req.text_placement)?;
        let layout = layout_block(
            surface,
            &block.text,
            x,
            block.y.resolve(h),
            block.max_width,
            block.line_height,
            req.text_placement,
        )?;
        out.push(TextBlockLayout { index, layout });
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
