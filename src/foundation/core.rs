use crate::foundation::error::{CardError, CardResult};

pub use kurbo::{BezPath, Point, Rect, Vec2};

/// Default card width used when the options omit `width`.
pub const DEFAULT_WIDTH: u32 = 1280;
/// Default card height used when the options omit `height`.
pub const DEFAULT_HEIGHT: u32 = 669;

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl Canvas {
    /// Create a validated canvas. Both dimensions must be positive and fit the rasterizer (`u16`).
    pub fn new(width: u32, height: u32) -> CardResult<Self> {
        if width == 0 || height == 0 {
            return Err(CardError::validation("canvas width and height must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(CardError::validation(format!(
                "canvas {width}x{height} exceeds the maximum of {0}x{0}",
                u16::MAX
            )));
        }
        Ok(Self { width, height })
    }

    /// Build a canvas from optional dimensions, falling back to 1280x669 per axis.
    ///
    /// A zero dimension counts as unset.
    pub fn from_options(width: Option<u32>, height: Option<u32>) -> CardResult<Self> {
        Self::new(
            width.filter(|&w| w > 0).unwrap_or(DEFAULT_WIDTH),
            height.filter(|&h| h > 0).unwrap_or(DEFAULT_HEIGHT),
        )
    }

    /// Width as a float, for geometry.
    pub fn w(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as a float, for geometry.
    pub fn h(self) -> f64 {
        f64::from(self.height)
    }

    /// Canvas midpoint, `(W/2, H/2)`.
    pub fn center(self) -> Point {
        Point::new(self.w() / 2.0, self.h() / 2.0)
    }

    /// Full-canvas rectangle.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, self.w(), self.h())
    }
}

/// Premultiplied RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply a straight-alpha color.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let a16 = a as u16;
        let premul = |c: u8| -> u8 { (((c as u16) * a16 + 127) / 255) as u8 };
        Self {
            r: premul(r),
            g: premul(g),
            b: premul(b),
            a,
        }
    }

    /// Return the channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
