use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::assets::font::FontSpec;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CardError, CardResult};
use crate::layout::wrap::TextPlacement;

/// Horizontal or vertical anchor of a text block.
///
/// In JSON this is either a number or the string `"center"`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Position {
    /// Literal canvas coordinate.
    Absolute(f64),
    /// Middle of the canvas along the axis.
    Centered,
}

impl Default for Position {
    fn default() -> Self {
        Self::Absolute(0.0)
    }
}

impl Position {
    /// Resolve against a canvas extent along the same axis.
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Absolute(v) => v,
            Self::Centered => extent / 2.0,
        }
    }

    /// `true` for [`Position::Centered`].
    pub fn is_centered(self) -> bool {
        matches!(self, Self::Centered)
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absolute(v) => serializer.serialize_f64(*v),
            Self::Centered => serializer.serialize_str("center"),
        }
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Str(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(v) => Ok(Self::Absolute(v)),
            Repr::Str(s) if s.trim().eq_ignore_ascii_case("center") => Ok(Self::Centered),
            Repr::Str(s) => Err(serde::de::Error::custom(format!(
                "position must be a number or \"center\", got \"{s}\""
            ))),
        }
    }
}

/// One gradient color stop as written in card options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient vector. Values above `1` are clamped by the gradient object.
    #[serde(rename = "stop", alias = "offset")]
    pub offset: f64,
    /// Stop color.
    pub color: Color,
}

impl GradientStop {
    /// Build a stop.
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Band painted along one canvas edge.
///
/// The solid `color` is painted first; the `gradient` covers it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BorderSpec {
    /// Band thickness in pixels.
    #[serde(default)]
    pub width: f64,
    /// Solid band color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Gradient painted over the band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Vec<GradientStop>>,
}

/// Frame around the whole card with rounded inner corners.
///
/// The fill covers the full canvas; everything drawn later is clipped to the rounded rectangle
/// inset by `width`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundedBorderSpec {
    /// Inset of the clip rectangle from every edge.
    #[serde(default)]
    pub width: f64,
    /// Corner radius of the clip rectangle.
    #[serde(default)]
    pub radius: f64,
    /// Solid frame color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Gradient painted over the frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Vec<GradientStop>>,
}

/// The four optional edge bands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Borders {
    /// Band along the top edge.
    pub top: Option<BorderSpec>,
    /// Band along the right edge.
    pub right: Option<BorderSpec>,
    /// Band along the bottom edge.
    pub bottom: Option<BorderSpec>,
    /// Band along the left edge.
    pub left: Option<BorderSpec>,
}

/// How right and bottom border bands are sized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeGeometry {
    /// Bands exactly as the first card renderer drew them: the right band is
    /// `(W-width, 0, W-width, H)` and the bottom band `(0, H-width, W, H-width)`.
    #[default]
    Compat,
    /// True `(x, y, w, h)` bands with gradients running corner to corner.
    Corrected,
}

/// A wrapped, optionally centered block of text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    /// Text to draw; wrapped on spaces.
    pub text: String,
    /// Font shorthand, e.g. `64px "Roboto"`.
    #[serde(default)]
    pub font: FontSpec,
    /// Fill color.
    #[serde(default = "default_text_color")]
    pub color: Color,
    /// Horizontal anchor.
    #[serde(default)]
    pub x: Position,
    /// Vertical center of the wrapped block.
    #[serde(default)]
    pub y: Position,
    /// Wrap width.
    #[serde(default = "default_max_width")]
    pub max_width: f64,
    /// Line height used to space wrapped lines.
    #[serde(default = "default_line_height")]
    pub line_height: f64,
}

fn default_text_color() -> Color {
    Color::BLACK
}

fn default_max_width() -> f64 {
    700.0
}

fn default_line_height() -> f64 {
    20.0
}

impl TextBlock {
    /// Text block with default color, anchors and metrics.
    pub fn new(text: impl Into<String>, font: FontSpec) -> Self {
        Self {
            text: text.into(),
            font,
            color: default_text_color(),
            x: Position::default(),
            y: Position::default(),
            max_width: default_max_width(),
            line_height: default_line_height(),
        }
    }

    /// Set both anchors.
    pub fn at(mut self, x: Position, y: Position) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the fill color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    fn validate(&self, index: usize) -> CardResult<()> {
        if !self.max_width.is_finite() || self.max_width < 0.0 {
            return Err(CardError::validation(format!(
                "texts[{index}].maxWidth must be finite and >= 0"
            )));
        }
        if !self.line_height.is_finite() {
            return Err(CardError::validation(format!(
                "texts[{index}].lineHeight must be finite"
            )));
        }
        if !self.font.size_px.is_finite() || self.font.size_px <= 0.0 {
            return Err(CardError::validation(format!(
                "texts[{index}].font size must be finite and > 0"
            )));
        }
        Ok(())
    }
}

/// Template image as seen by the compositor.
#[derive(Clone, PartialEq)]
pub enum TemplateImage {
    /// Decoded pixels, ready to blit.
    Decoded(PreparedImage),
    /// A path that has not been loaded yet. Drawing it fails.
    Unresolved(PathBuf),
}

impl fmt::Debug for TemplateImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decoded(img) => write!(f, "Decoded({}x{})", img.width, img.height),
            Self::Unresolved(path) => write!(f, "Unresolved({})", path.display()),
        }
    }
}

/// Everything [`crate::draw`] needs for one card.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderRequest {
    /// Canvas size; must match the surface.
    pub canvas: Canvas,
    /// Solid background over the full canvas.
    pub background_color: Option<Color>,
    /// Gradient background over the full canvas.
    pub background_gradient: Option<Vec<GradientStop>>,
    /// Rounded frame and clip.
    pub rounded_border: Option<RoundedBorderSpec>,
    /// Edge bands.
    pub borders: Borders,
    /// Text blocks in draw order.
    pub texts: Vec<TextBlock>,
    /// Paint lime center guides last.
    pub guides: bool,
    /// Image blitted at the origin after the backgrounds.
    pub template_image: Option<TemplateImage>,
    /// Right and bottom band geometry.
    pub edge_geometry: EdgeGeometry,
    /// Vertical text placement rule.
    pub text_placement: TextPlacement,
}

impl RenderRequest {
    /// Empty request for `canvas`.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            ..Self::default()
        }
    }

    /// Check numeric fields that the compositor cannot recover from.
    pub fn validate(&self) -> CardResult<()> {
        for (name, border) in [
            ("borderTop", &self.borders.top),
            ("borderRight", &self.borders.right),
            ("borderBottom", &self.borders.bottom),
            ("borderLeft", &self.borders.left),
        ] {
            if let Some(b) = border
                && (!b.width.is_finite() || b.width < 0.0)
            {
                return Err(CardError::validation(format!(
                    "{name}.width must be finite and >= 0"
                )));
            }
        }
        if let Some(rb) = &self.rounded_border {
            if !rb.width.is_finite() || rb.width < 0.0 {
                return Err(CardError::validation(
                    "roundedBorder.width must be finite and >= 0",
                ));
            }
            if !rb.radius.is_finite() || rb.radius < 0.0 {
                return Err(CardError::validation(
                    "roundedBorder.radius must be finite and >= 0",
                ));
            }
        }
        for (i, t) in self.texts.iter().enumerate() {
            t.validate(i)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/card/model.rs"]
mod tests;
