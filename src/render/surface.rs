//! The imperative 2D drawing-surface contract used by [`crate::draw`].
//!
//! A surface keeps canvas-style mutable state (fill style, font, text alignment, baseline,
//! current path, clip). It does not track style per call: every caller must set the style it
//! needs immediately before the fill or text operation that uses it. [`crate::draw`] follows
//! that protocol, so state left over from one stage never decides how a later stage paints.

use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::assets::font::FontSpec;
use crate::foundation::core::Point;
use crate::foundation::error::{CardError, CardResult};

/// Horizontal anchor of `fill_text` relative to its `x` argument.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// `x` is the left edge of the line.
    #[default]
    Left,
    /// `x` is the horizontal center of the line.
    Center,
    /// `x` is the right edge of the line.
    Right,
}

impl TextAlign {
    /// Distance from the anchor back to the left edge of a line of `width`.
    pub fn left_offset(self, width: f64) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => width / 2.0,
            Self::Right => width,
        }
    }
}

/// Vertical anchor of `fill_text` relative to its `y` argument.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    /// `y` is the top of the line box.
    Top,
    /// `y` is halfway between the top and the bottom of the line box.
    Middle,
    /// `y` is the alphabetic baseline.
    #[default]
    Alphabetic,
    /// `y` is the bottom of the line box.
    Bottom,
}

impl TextBaseline {
    /// Distance from the anchor down to the alphabetic baseline.
    pub fn baseline_offset(self, metrics: &TextMetrics) -> f64 {
        match self {
            Self::Top => metrics.ascent,
            Self::Middle => (metrics.ascent - metrics.descent) / 2.0,
            Self::Alphabetic => 0.0,
            Self::Bottom => -metrics.descent,
        }
    }
}

/// Result of [`Surface::measure_text`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width, including trailing spaces.
    pub width: f64,
    /// Distance from the baseline up to the top of the line.
    pub ascent: f64,
    /// Distance from the baseline down to the bottom of the line.
    pub descent: f64,
}

impl TextMetrics {
    /// Single-line text height, `ascent + descent`.
    pub fn height(&self) -> f64 {
        self.ascent + self.descent
    }
}

/// One `(offset, color)` pair of a [`LinearGradient`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient vector in `0..=1`.
    pub offset: f64,
    /// Color at `offset`.
    pub color: Color,
}

/// Linear gradient object with canvas semantics.
///
/// The color at a point is taken from its projection onto the `start -> end` vector, padded
/// with the first and last stop colors outside the stop range. A zero-length vector paints
/// nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    /// Gradient vector start.
    pub start: Point,
    /// Gradient vector end.
    pub end: Point,
    stops: Vec<ColorStop>,
}

impl LinearGradient {
    /// Create a gradient with no stops.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    /// Append a color stop.
    ///
    /// Offsets must be finite, non-negative and non-decreasing. Offsets above `1` are clamped
    /// to `1`, so a list written in percent-like units (`0`, `50`) still ends at the vector end.
    pub fn add_color_stop(&mut self, offset: f64, color: Color) -> CardResult<()> {
        if !offset.is_finite() {
            return Err(CardError::invalid_gradient(format!(
                "color stop offset {offset} is not finite"
            )));
        }
        if offset < 0.0 {
            return Err(CardError::invalid_gradient(format!(
                "color stop offset {offset} is negative"
            )));
        }
        let offset = offset.min(1.0);
        if let Some(prev) = self.stops.last()
            && offset < prev.offset
        {
            return Err(CardError::invalid_gradient(format!(
                "color stop offset {offset} is lower than the previous offset {}",
                prev.offset
            )));
        }
        self.stops.push(ColorStop { offset, color });
        Ok(())
    }

    /// Stops in insertion order.
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// `true` when start and end coincide, in which case nothing is painted.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Color at canvas point `p`, or `None` when the gradient paints nothing.
    pub fn color_at(&self, p: Point) -> Option<Color> {
        if self.is_degenerate() {
            return None;
        }
        let first = self.stops.first()?;
        let last = self.stops.last()?;

        let d = self.end - self.start;
        let t = (p - self.start).dot(d) / d.hypot2();
        if t <= first.offset {
            return Some(first.color);
        }
        if t >= last.offset {
            return Some(last.color);
        }

        // Equal offsets form a hard edge: the later stop wins from that offset on.
        let i = self.stops.partition_point(|s| s.offset <= t);
        let a = self.stops[i - 1];
        let b = self.stops[i];
        let span = b.offset - a.offset;
        let u = if span > 0.0 {
            (t - a.offset) / span
        } else {
            1.0
        };
        let lerp = |x: f64, y: f64| x + (y - x) * u;
        Some(Color::rgba(
            lerp(a.color.r, b.color.r),
            lerp(a.color.g, b.color.g),
            lerp(a.color.b, b.color.b),
            lerp(a.color.a, b.color.a),
        ))
    }
}

/// Paint used by `fill_rect` and `fill_text`.
#[derive(Clone, Debug, PartialEq)]
pub enum FillStyle {
    /// Solid color.
    Color(Color),
    /// Linear gradient in canvas coordinates.
    LinearGradient(LinearGradient),
}

impl Default for FillStyle {
    fn default() -> Self {
        Self::Color(Color::BLACK)
    }
}

impl From<Color> for FillStyle {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}

impl From<LinearGradient> for FillStyle {
    fn from(g: LinearGradient) -> Self {
        Self::LinearGradient(g)
    }
}

/// Imperative 2D drawing surface in the style of an HTML canvas context.
///
/// Rectangles are `(x, y, w, h)`. Installed clips stay active until the surface is finished.
pub trait Surface {
    /// Set the paint for subsequent fills.
    fn set_fill_style(&mut self, style: FillStyle);

    /// Set the font for subsequent measurement and text drawing.
    fn set_font(&mut self, font: &FontSpec);

    /// Set the vertical text anchor.
    fn set_text_baseline(&mut self, baseline: TextBaseline);

    /// Set the horizontal text anchor.
    fn set_text_align(&mut self, align: TextAlign);

    /// Fill `(x, y, w, h)` with the current fill style, inside the current clip.
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> CardResult<()>;

    /// Discard the current path.
    fn begin_path(&mut self);

    /// Start a new subpath at `(x, y)`.
    fn move_to(&mut self, x: f64, y: f64);

    /// Tangent arc through the corner `(x1, y1)` towards `(x2, y2)` with `radius`.
    fn arc_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> CardResult<()>;

    /// Close the current subpath.
    fn close_path(&mut self);

    /// Intersect the clip region with the current path.
    fn clip(&mut self) -> CardResult<()>;

    /// Create a linear gradient object from `(x0, y0)` to `(x1, y1)`.
    fn create_linear_gradient(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> LinearGradient {
        LinearGradient::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    /// Measure `text` with the current font.
    fn measure_text(&mut self, text: &str) -> CardResult<TextMetrics>;

    /// Blit `image` unscaled with its top-left corner at `(x, y)`.
    fn draw_image(&mut self, image: &PreparedImage, x: f64, y: f64) -> CardResult<()>;

    /// Draw `text` with the current font, fill style, alignment and baseline.
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> CardResult<()>;
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
