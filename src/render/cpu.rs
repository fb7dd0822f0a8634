use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::assets::decode::PreparedImage;
use crate::assets::font::{FontRegistry, FontSpec};
use crate::assets::text::TextLayoutEngine;
use crate::foundation::core::{BezPath, Canvas, Point};
use crate::foundation::error::{CardError, CardResult};
use crate::render::frame::FrameRGBA;
use crate::render::path::PathBuilder;
use crate::render::surface::{
    FillStyle, LinearGradient, Surface, TextAlign, TextBaseline, TextMetrics,
};

/// CPU raster surface backed by `vello_cpu`, with text shaped by Parley.
///
/// Fonts are fixed at construction. An empty registry gets the bundled default font, so text
/// always has glyphs to fall back to.
pub struct CpuSurface {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    fonts: FontRegistry,
    font_data: Vec<vello_cpu::peniko::FontData>,
    text: TextLayoutEngine,
    fill: FillStyle,
    font: FontSpec,
    align: TextAlign,
    baseline: TextBaseline,
    path: PathBuilder,
    clip_depth: usize,
    warned_no_font: bool,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("canvas", &self.canvas)
            .field("fonts", &self.fonts.len())
            .field("clip_depth", &self.clip_depth)
            .finish_non_exhaustive()
    }
}

impl CpuSurface {
    /// Create a transparent surface of `canvas` size using the fonts in `fonts`.
    pub fn new(canvas: Canvas, mut fonts: FontRegistry) -> CardResult<Self> {
        let (w, h) = canvas_u16(canvas)?;
        fonts.ensure_default_font()?;

        let mut text = TextLayoutEngine::new();
        let mut font_data = Vec::with_capacity(fonts.len());
        for font in fonts.fonts() {
            text.register(font)?;
            font_data.push(vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font.data.as_ref().clone()),
                0,
            ));
        }

        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            fonts,
            font_data,
            text,
            fill: FillStyle::default(),
            font: FontSpec::default(),
            align: TextAlign::default(),
            baseline: TextBaseline::default(),
            path: PathBuilder::new(),
            clip_depth: 0,
            warned_no_font: false,
        })
    }

    /// Canvas this surface draws into.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Pop all clips, rasterize and return the premultiplied pixels.
    pub fn finish(mut self) -> CardResult<FrameRGBA> {
        let (w, h) = canvas_u16(self.canvas)?;
        while self.clip_depth > 0 {
            self.ctx.pop_layer();
            self.clip_depth -= 1;
        }
        self.ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    /// Index of the font the current [`FontSpec`] resolves to, or `None` without fonts.
    fn current_font(&mut self) -> Option<usize> {
        match self.fonts.resolve(&self.font) {
            Some(resolved) => {
                if resolved.fell_back {
                    debug!(
                        requested = %self.font.primary_family(),
                        using = %resolved.font.family,
                        "font family not registered, using the default font"
                    );
                }
                Some(resolved.index)
            }
            None => {
                if !self.warned_no_font {
                    warn!("no fonts registered, text is skipped");
                    self.warned_no_font = true;
                }
                None
            }
        }
    }

    /// Install the current fill style as the paint. Returns `false` when it paints nothing.
    ///
    /// Gradients are rasterized over `bounds` only; pixels outside stay transparent.
    fn apply_paint(&mut self, bounds: vello_cpu::kurbo::Rect) -> CardResult<bool> {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match &self.fill {
            FillStyle::Color(c) => {
                let [r, g, b, a] = c.to_rgba8();
                self.ctx
                    .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                Ok(true)
            }
            FillStyle::LinearGradient(gradient) => {
                match gradient_image(gradient, self.canvas, bounds)? {
                    Some(image) => {
                        self.ctx.set_paint(image);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }

    fn shape(&mut self, text: &str, font_index: usize) -> CardResult<parley::Layout<()>> {
        self.text
            .layout_line(text, font_index, self.font.size_px as f32)
    }
}

impl Surface for CpuSurface {
    fn set_fill_style(&mut self, style: FillStyle) {
        self.fill = style;
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.font = font.clone();
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.baseline = baseline;
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.align = align;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> CardResult<()> {
        if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) {
            return Ok(());
        }
        let rect = vello_cpu::kurbo::Rect::new(x, y, x + w, y + h).abs();
        if rect.area() == 0.0 {
            return Ok(());
        }
        if self.apply_paint(rect)? {
            self.ctx.fill_rect(&rect);
        }
        Ok(())
    }

    fn begin_path(&mut self) {
        self.path.begin();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to(Point::new(x, y));
    }

    fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> CardResult<()> {
        self.path
            .arc_to(Point::new(x1, y1), Point::new(x2, y2), radius)
    }

    fn close_path(&mut self) {
        self.path.close();
    }

    fn clip(&mut self) -> CardResult<()> {
        let path = bezpath_to_cpu(self.path.path());
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.push_clip_layer(&path);
        self.clip_depth += 1;
        Ok(())
    }

    fn measure_text(&mut self, text: &str) -> CardResult<TextMetrics> {
        let Some(index) = self.current_font() else {
            return Ok(TextMetrics::default());
        };
        let layout = self.shape(text, index)?;
        Ok(layout_metrics(&layout))
    }

    fn draw_image(&mut self, image: &PreparedImage, x: f64, y: f64) -> CardResult<()> {
        if image.width == 0 || image.height == 0 {
            return Ok(());
        }
        let pixmap = image_premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> CardResult<()> {
        let Some(index) = self.current_font() else {
            return Ok(());
        };
        let layout = self.shape(text, index)?;
        let Some(first_line) = layout.lines().next() else {
            return Ok(());
        };
        let metrics = layout_metrics(&layout);

        // Parley reports baselines from the layout top; move that top so the anchor lands on y.
        let left = x - self.align.left_offset(metrics.width);
        let top = y + self.baseline.baseline_offset(&metrics) - f64::from(first_line.metrics().baseline);

        let bounds = vello_cpu::kurbo::Rect::new(0.0, 0.0, self.canvas.w(), self.canvas.h());
        if !self.apply_paint(bounds)? {
            return Ok(());
        }

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let mut pen_x = run.offset();
                let baseline = run.baseline();
                let glyphs: Vec<vello_cpu::Glyph> = run
                    .glyphs()
                    .map(|g| {
                        let glyph = vello_cpu::Glyph {
                            id: g.id,
                            x: left as f32 + pen_x + g.x,
                            y: top as f32 + baseline - g.y,
                        };
                        pen_x += g.advance;
                        glyph
                    })
                    .collect();
                self.ctx
                    .glyph_run(&self.font_data[index])
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs.into_iter());
            }
        }
        Ok(())
    }
}

fn canvas_u16(canvas: Canvas) -> CardResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| CardError::validation("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| CardError::validation("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn layout_metrics(layout: &parley::Layout<()>) -> TextMetrics {
    let (ascent, descent) = layout
        .lines()
        .next()
        .map(|line| {
            let m = line.metrics();
            (f64::from(m.ascent), f64::from(m.descent))
        })
        .unwrap_or((0.0, 0.0));
    TextMetrics {
        width: f64::from(layout.full_width()),
        ascent,
        descent,
    }
}

/// Rasterize `gradient` over `bounds` (clipped to the canvas) into a canvas-sized image paint.
fn gradient_image(
    gradient: &LinearGradient,
    canvas: Canvas,
    bounds: vello_cpu::kurbo::Rect,
) -> CardResult<Option<vello_cpu::Image>> {
    if gradient.is_degenerate() || gradient.stops().is_empty() {
        return Ok(None);
    }

    let (cw, ch) = (canvas.width as usize, canvas.height as usize);
    let x0 = bounds.x0.floor().clamp(0.0, canvas.w()) as usize;
    let x1 = bounds.x1.ceil().clamp(0.0, canvas.w()) as usize;
    let y0 = bounds.y0.floor().clamp(0.0, canvas.h()) as usize;
    let y1 = bounds.y1.ceil().clamp(0.0, canvas.h()) as usize;

    let mut bytes = vec![0u8; cw * ch * 4];
    bytes
        .par_chunks_exact_mut(cw * 4)
        .enumerate()
        .skip(y0)
        .take(y1.saturating_sub(y0))
        .for_each(|(y, row)| {
            for x in x0..x1 {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if let Some(color) = gradient.color_at(p) {
                    row[x * 4..x * 4 + 4].copy_from_slice(&color.to_rgba8_premul().to_array());
                }
            }
        });

    let pixmap = image_premul_bytes_to_pixmap(&bytes, canvas.width, canvas.height)?;
    Ok(Some(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }))
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> CardResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CardError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CardError::validation("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(CardError::validation("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
