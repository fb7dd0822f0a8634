use crate::assets::decode::PreparedImage;
use crate::assets::font::FontSpec;
use crate::foundation::core::{BezPath, Point};
use crate::foundation::error::CardResult;
use crate::render::path::PathBuilder;
use crate::render::surface::{FillStyle, Surface, TextAlign, TextBaseline, TextMetrics};

/// Font-independent metrics used by [`RecordingSurface`], as fractions of the font size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntheticMetrics {
    /// Advance per `char`.
    pub advance_em: f64,
    /// Ascent above the baseline.
    pub ascent_em: f64,
    /// Descent below the baseline.
    pub descent_em: f64,
}

impl Default for SyntheticMetrics {
    fn default() -> Self {
        Self {
            advance_em: 0.5,
            ascent_em: 0.8,
            descent_em: 0.2,
        }
    }
}

/// One recorded surface call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    /// `set_fill_style`.
    SetFillStyle(FillStyle),
    /// `set_font`.
    SetFont(FontSpec),
    /// `set_text_baseline`.
    SetTextBaseline(TextBaseline),
    /// `set_text_align`.
    SetTextAlign(TextAlign),
    /// `fill_rect(x, y, w, h)`.
    FillRect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width, may be negative.
        w: f64,
        /// Height, may be negative.
        h: f64,
    },
    /// `begin_path`.
    BeginPath,
    /// `move_to`.
    MoveTo(Point),
    /// `arc_to(p1, p2, radius)`.
    ArcTo {
        /// Corner point.
        p1: Point,
        /// Point the second tangent heads towards.
        p2: Point,
        /// Corner radius.
        radius: f64,
    },
    /// `close_path`.
    ClosePath,
    /// `clip`.
    Clip,
    /// `draw_image` of a `width` x `height` image at `(x, y)`.
    DrawImage {
        /// Destination left edge.
        x: f64,
        /// Destination top edge.
        y: f64,
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
    /// `fill_text(text, x, y)`.
    FillText {
        /// Line text.
        text: String,
        /// Anchor x.
        x: f64,
        /// Anchor y.
        y: f64,
    },
}

/// A text draw together with the surface state it was issued under.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedText {
    /// Line text as passed to `fill_text`.
    pub text: String,
    /// Anchor x.
    pub x: f64,
    /// Anchor y.
    pub y: f64,
    /// Alignment in effect.
    pub align: TextAlign,
    /// Baseline in effect.
    pub baseline: TextBaseline,
    /// Font in effect.
    pub font: FontSpec,
    /// Fill style in effect.
    pub fill: FillStyle,
}

/// A fill together with the fill style it was issued under.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedFill {
    /// Rectangle x.
    pub x: f64,
    /// Rectangle y.
    pub y: f64,
    /// Rectangle width argument.
    pub w: f64,
    /// Rectangle height argument.
    pub h: f64,
    /// Fill style in effect.
    pub fill: FillStyle,
}

/// Surface that records every call instead of rasterizing.
///
/// Text is measured with [`SyntheticMetrics`], so layouts are reproducible without font files.
/// Used by tests and by the `layout --synthetic` CLI command.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    metrics: SyntheticMetrics,
    calls: Vec<DrawCall>,
    fill: FillStyle,
    font: FontSpec,
    align: TextAlign,
    baseline: TextBaseline,
    path: PathBuilder,
    clips: Vec<BezPath>,
    texts: Vec<RecordedText>,
    fills: Vec<RecordedFill>,
}

impl RecordingSurface {
    /// Create a recorder with default synthetic metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder with custom synthetic metrics.
    pub fn with_metrics(metrics: SyntheticMetrics) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    /// All calls in issue order.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Text draws in issue order, with their effective state.
    pub fn texts(&self) -> &[RecordedText] {
        &self.texts
    }

    /// Rectangle fills in issue order, with their effective fill style.
    pub fn fills(&self) -> &[RecordedFill] {
        &self.fills
    }

    /// Paths installed as clips, in issue order.
    pub fn clip_paths(&self) -> &[BezPath] {
        &self.clips
    }

    /// Measure with explicit font, bypassing the current state.
    pub fn measure_with(&self, font: &FontSpec, text: &str) -> TextMetrics {
        let size = font.size_px;
        TextMetrics {
            width: text.chars().count() as f64 * size * self.metrics.advance_em,
            ascent: size * self.metrics.ascent_em,
            descent: size * self.metrics.descent_em,
        }
    }
}

impl Surface for RecordingSurface {
    fn set_fill_style(&mut self, style: FillStyle) {
        self.calls.push(DrawCall::SetFillStyle(style.clone()));
        self.fill = style;
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.calls.push(DrawCall::SetFont(font.clone()));
        self.font = font.clone();
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.calls.push(DrawCall::SetTextBaseline(baseline));
        self.baseline = baseline;
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.calls.push(DrawCall::SetTextAlign(align));
        self.align = align;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> CardResult<()> {
        self.calls.push(DrawCall::FillRect { x, y, w, h });
        self.fills.push(RecordedFill {
            x,
            y,
            w,
            h,
            fill: self.fill.clone(),
        });
        Ok(())
    }

    fn begin_path(&mut self) {
        self.calls.push(DrawCall::BeginPath);
        self.path.begin();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let p = Point::new(x, y);
        self.calls.push(DrawCall::MoveTo(p));
        self.path.move_to(p);
    }

    fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> CardResult<()> {
        let (p1, p2) = (Point::new(x1, y1), Point::new(x2, y2));
        self.calls.push(DrawCall::ArcTo { p1, p2, radius });
        self.path.arc_to(p1, p2, radius)
    }

    fn close_path(&mut self) {
        self.calls.push(DrawCall::ClosePath);
        self.path.close();
    }

    fn clip(&mut self) -> CardResult<()> {
        self.calls.push(DrawCall::Clip);
        self.clips.push(self.path.path().clone());
        Ok(())
    }

    fn measure_text(&mut self, text: &str) -> CardResult<TextMetrics> {
        Ok(self.measure_with(&self.font, text))
    }

    fn draw_image(&mut self, image: &PreparedImage, x: f64, y: f64) -> CardResult<()> {
        self.calls.push(DrawCall::DrawImage {
            x,
            y,
            width: image.width,
            height: image.height,
        });
        Ok(())
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> CardResult<()> {
        self.calls.push(DrawCall::FillText {
            text: text.to_owned(),
            x,
            y,
        });
        self.texts.push(RecordedText {
            text: text.to_owned(),
            x,
            y,
            align: self.align,
            baseline: self.baseline,
            font: self.font.clone(),
            fill: self.fill.clone(),
        });
        Ok(())
    }
}
