use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::CardError;
use serde::{Deserialize, Serialize};

/// Straight-alpha sRGB color with channels in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
    /// Alpha channel.
    pub a: f64,
}

impl Color {
    /// Opaque black, the initial fill style of a fresh surface.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// The `lime` keyword (`#00ff00`) used for debug guides.
    pub const LIME: Self = Self::rgba(0.0, 1.0, 0.0, 1.0);

    /// Build a color from normalized channels.
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Build an opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            1.0,
        )
    }

    /// Quantize to straight-alpha RGBA8.
    pub fn to_rgba8(self) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(self.a)]
    }

    /// Quantize to premultiplied RGBA8.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let a = self.a.clamp(0.0, 1.0);
        let r = (self.r.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let g = (self.g.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let b = (self.b.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);

        Rgba8Premul {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
            a: to_u8(a),
        }
    }

    /// Parse a CSS color string: hex, `rgb()`/`rgba()`, or a named color.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            let args = args
                .strip_suffix(')')
                .ok_or_else(|| format!("unterminated color function \"{s}\""))?;
            return parse_rgb_args(args);
        }
        named_color(&lower).ok_or_else(|| format!("unknown color \"{s}\""))
    }
}

impl FromStr for Color {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).map_err(CardError::validation)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Css(String),
            RgbaObj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Css(s) => Self::parse(&s).map_err(serde::de::Error::custom),
            Repr::RgbaObj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::Arr(v) => {
                if v.len() == 3 {
                    Ok(Self::rgba(v[0], v[1], v[2], 1.0))
                } else if v.len() == 4 {
                    Ok(Self::rgba(v[0], v[1], v[2], v[3]))
                } else {
                    Err(serde::de::Error::custom(
                        "rgba array must have len 3 ([r,g,b]) or 4 ([r,g,b,a])",
                    ))
                }
            }
        }
    }
}

fn parse_hex(s: &str) -> Result<Color, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }
    fn hex_nibble(c: &str) -> Result<u8, String> {
        let v = u8::from_str_radix(c, 16).map_err(|_| format!("invalid hex digit \"{c}\""))?;
        Ok(v * 17)
    }

    if !s.is_ascii() {
        return Err(format!("invalid hex color \"#{s}\""));
    }

    let (r, g, b, a) = match s.len() {
        3 | 4 => {
            let r = hex_nibble(&s[0..1])?;
            let g = hex_nibble(&s[1..2])?;
            let b = hex_nibble(&s[2..3])?;
            let a = if s.len() == 4 {
                hex_nibble(&s[3..4])?
            } else {
                255
            };
            (r, g, b, a)
        }
        6 | 8 => {
            let r = hex_byte(&s[0..2])?;
            let g = hex_byte(&s[2..4])?;
            let b = hex_byte(&s[4..6])?;
            let a = if s.len() == 8 {
                hex_byte(&s[6..8])?
            } else {
                255
            };
            (r, g, b, a)
        }
        _ => {
            return Err(
                "hex color must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA (case-insensitive)".to_owned(),
            );
        }
    };

    Ok(Color::rgba(
        (r as f64) / 255.0,
        (g as f64) / 255.0,
        (b as f64) / 255.0,
        (a as f64) / 255.0,
    ))
}

fn parse_rgb_args(args: &str) -> Result<Color, String> {
    let parts: Vec<&str> = args
        .split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("rgb() expects 3 or 4 components, got {}", parts.len()));
    }

    fn channel(p: &str) -> Result<f64, String> {
        if let Some(pct) = p.strip_suffix('%') {
            let v: f64 = pct.parse().map_err(|_| format!("invalid percentage \"{p}\""))?;
            return Ok((v / 100.0).clamp(0.0, 1.0));
        }
        let v: f64 = p.parse().map_err(|_| format!("invalid channel \"{p}\""))?;
        Ok((v / 255.0).clamp(0.0, 1.0))
    }

    fn alpha(p: &str) -> Result<f64, String> {
        if let Some(pct) = p.strip_suffix('%') {
            let v: f64 = pct.parse().map_err(|_| format!("invalid percentage \"{p}\""))?;
            return Ok((v / 100.0).clamp(0.0, 1.0));
        }
        let v: f64 = p.parse().map_err(|_| format!("invalid alpha \"{p}\""))?;
        Ok(v.clamp(0.0, 1.0))
    }

    let a = match parts.get(3) {
        Some(p) => alpha(p)?,
        None => 1.0,
    };
    Ok(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

fn named_color(name: &str) -> Option<Color> {
    let rgb = match name {
        "transparent" => return Some(Color::rgba(0.0, 0.0, 0.0, 0.0)),
        "black" => (0x00, 0x00, 0x00),
        "silver" => (0xc0, 0xc0, 0xc0),
        "gray" | "grey" => (0x80, 0x80, 0x80),
        "white" => (0xff, 0xff, 0xff),
        "maroon" => (0x80, 0x00, 0x00),
        "red" => (0xff, 0x00, 0x00),
        "purple" => (0x80, 0x00, 0x80),
        "fuchsia" | "magenta" => (0xff, 0x00, 0xff),
        "green" => (0x00, 0x80, 0x00),
        "lime" => (0x00, 0xff, 0x00),
        "olive" => (0x80, 0x80, 0x00),
        "yellow" => (0xff, 0xff, 0x00),
        "navy" => (0x00, 0x00, 0x80),
        "blue" => (0x00, 0x00, 0xff),
        "teal" => (0x00, 0x80, 0x80),
        "aqua" | "cyan" => (0x00, 0xff, 0xff),
        "orange" => (0xff, 0xa5, 0x00),
        "pink" => (0xff, 0xc0, 0xcb),
        "gold" => (0xff, 0xd7, 0x00),
        "brown" => (0xa5, 0x2a, 0x2a),
        "coral" => (0xff, 0x7f, 0x50),
        "tomato" => (0xff, 0x63, 0x47),
        "salmon" => (0xfa, 0x80, 0x72),
        "crimson" => (0xdc, 0x14, 0x3c),
        "indigo" => (0x4b, 0x00, 0x82),
        "violet" => (0xee, 0x82, 0xee),
        "orchid" => (0xda, 0x70, 0xd6),
        "khaki" => (0xf0, 0xe6, 0x8c),
        "beige" => (0xf5, 0xf5, 0xdc),
        "ivory" => (0xff, 0xff, 0xf0),
        "lavender" => (0xe6, 0xe6, 0xfa),
        "turquoise" => (0x40, 0xe0, 0xd0),
        "skyblue" => (0x87, 0xce, 0xeb),
        "steelblue" => (0x46, 0x82, 0xb4),
        "royalblue" => (0x41, 0x69, 0xe1),
        "slategray" | "slategrey" => (0x70, 0x80, 0x90),
        "darkgray" | "darkgrey" => (0xa9, 0xa9, 0xa9),
        "lightgray" | "lightgrey" => (0xd3, 0xd3, 0xd3),
        "dimgray" | "dimgrey" => (0x69, 0x69, 0x69),
        "whitesmoke" => (0xf5, 0xf5, 0xf5),
        "gainsboro" => (0xdc, 0xdc, 0xdc),
        "darkred" => (0x8b, 0x00, 0x00),
        "darkgreen" => (0x00, 0x64, 0x00),
        "darkblue" => (0x00, 0x00, 0x8b),
        "darkorange" => (0xff, 0x8c, 0x00),
        "limegreen" => (0x32, 0xcd, 0x32),
        "forestgreen" => (0x22, 0x8b, 0x22),
        "seagreen" => (0x2e, 0x8b, 0x57),
        "hotpink" => (0xff, 0x69, 0xb4),
        "deeppink" => (0xff, 0x14, 0x93),
        "rebeccapurple" => (0x66, 0x33, 0x99),
        _ => return None,
    };
    Some(Color::from_rgb8(rgb.0, rgb.1, rgb.2))
}
