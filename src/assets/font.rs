use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{CardError, CardResult};

/// Font descriptor parsed from a CSS font shorthand such as `64px "Roboto"`.
///
/// Style, variant and weight keywords in front of the size are accepted and skipped: the glyphs
/// come from whatever file was registered under the family name.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Font size in CSS pixels.
    pub size_px: f64,
    /// Family names in preference order, unquoted.
    pub families: Vec<String>,
}

impl Default for FontSpec {
    /// `10px sans-serif`, the initial font of a 2D canvas.
    fn default() -> Self {
        Self {
            size_px: 10.0,
            families: vec!["sans-serif".to_owned()],
        }
    }
}

impl FontSpec {
    /// Build a descriptor for a single family.
    pub fn new(size_px: f64, family: impl Into<String>) -> Self {
        Self {
            size_px,
            families: vec![family.into()],
        }
    }

    /// Parse a CSS font shorthand.
    pub fn parse(s: &str) -> CardResult<Self> {
        let mut rest = s.trim();
        loop {
            let (tok, tail) = match rest.split_once(char::is_whitespace) {
                Some((tok, tail)) => (tok, tail.trim_start()),
                None => (rest, ""),
            };
            if let Some(size_px) = parse_size(tok)? {
                let families = parse_families(tail);
                if families.is_empty() {
                    return Err(CardError::validation(format!(
                        "font \"{s}\" is missing a family name"
                    )));
                }
                return Ok(Self { size_px, families });
            }
            if tail.is_empty() {
                return Err(CardError::validation(format!(
                    "font \"{s}\" is missing a size (expected e.g. \"64px Roboto\")"
                )));
            }
            rest = tail;
        }
    }

    /// First family in the list.
    pub fn primary_family(&self) -> &str {
        self.families.first().map(String::as_str).unwrap_or_default()
    }
}

fn parse_size(tok: &str) -> CardResult<Option<f64>> {
    // `64px/1.2` carries a line height we don't use.
    let tok = tok.split('/').next().unwrap_or(tok);
    let lower = tok.to_ascii_lowercase();
    let (num, scale) = if let Some(n) = lower.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = lower.strip_suffix("pt") {
        (n, 4.0 / 3.0)
    } else {
        return Ok(None);
    };
    let Ok(v) = num.parse::<f64>() else {
        return Ok(None);
    };
    if !v.is_finite() || v <= 0.0 {
        return Err(CardError::validation(format!(
            "font size \"{tok}\" must be finite and > 0"
        )));
    }
    Ok(Some(v * scale))
}

fn parse_families(s: &str) -> Vec<String> {
    s.split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').trim())
        .filter(|f| !f.is_empty())
        .map(str::to_owned)
        .collect()
}

impl FromStr for FontSpec {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px ", self.size_px)?;
        for (i, family) in self.families.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "\"{family}\"")?;
        }
        Ok(())
    }
}

impl Serialize for FontSpec {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FontSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Family alias of the bundled default font, matching the `10px sans-serif` default shorthand.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// DejaVu Sans, used when a surface is created without any registered font.
static DEFAULT_FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Font file bytes registered under a caller-chosen family alias.
#[derive(Clone, Debug)]
pub struct RegisteredFont {
    /// Alias used in font shorthands (`"Roboto"`).
    pub family: String,
    /// Raw font file bytes (TTF/OTF).
    pub data: Arc<Vec<u8>>,
}

/// Result of resolving a [`FontSpec`] against a [`FontRegistry`].
#[derive(Clone, Copy, Debug)]
pub struct ResolvedFont<'a> {
    /// Index of the font in registration order.
    pub index: usize,
    /// The registered font.
    pub font: &'a RegisteredFont,
    /// `true` when no requested family was registered and the default font was used.
    pub fell_back: bool,
}

/// Fonts available to a surface, keyed by family alias.
///
/// Registration must complete before a surface is created from the registry. Lookups are
/// case-insensitive. An unknown family resolves to the first registered font.
#[derive(Clone, Debug, Default)]
pub struct FontRegistry {
    fonts: Vec<RegisteredFont>,
}

impl FontRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register font bytes under `family`. Re-registering a family replaces its bytes.
    pub fn register_bytes(&mut self, family: impl Into<String>, bytes: Vec<u8>) -> CardResult<()> {
        let family = family.into();
        if family.trim().is_empty() {
            return Err(CardError::validation("font family must be non-empty"));
        }
        if bytes.is_empty() {
            return Err(CardError::validation(format!(
                "font file for family \"{family}\" is empty"
            )));
        }
        let data = Arc::new(bytes);
        match self
            .fonts
            .iter_mut()
            .find(|f| f.family.eq_ignore_ascii_case(&family))
        {
            Some(existing) => existing.data = data,
            None => self.fonts.push(RegisteredFont { family, data }),
        }
        Ok(())
    }

    /// Register the bundled DejaVu Sans under [`DEFAULT_FONT_FAMILY`] if nothing else is registered.
    pub fn ensure_default_font(&mut self) -> CardResult<()> {
        if self.fonts.is_empty() {
            tracing::debug!("no fonts registered, using the bundled default font");
            self.register_bytes(DEFAULT_FONT_FAMILY, DEFAULT_FONT_BYTES.to_vec())?;
        }
        Ok(())
    }

    /// Read a font file from disk and register it under `family`.
    pub fn register_file(&mut self, path: impl AsRef<Path>, family: impl Into<String>) -> CardResult<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font file '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "registered font file");
        self.register_bytes(family, bytes)
    }

    /// Resolve a font descriptor. Returns `None` only when nothing is registered.
    pub fn resolve(&self, spec: &FontSpec) -> Option<ResolvedFont<'_>> {
        for family in &spec.families {
            if let Some((index, font)) = self
                .fonts
                .iter()
                .enumerate()
                .find(|(_, f)| f.family.eq_ignore_ascii_case(family))
            {
                return Some(ResolvedFont {
                    index,
                    font,
                    fell_back: false,
                });
            }
        }
        self.fonts.first().map(|font| ResolvedFont {
            index: 0,
            font,
            fell_back: true,
        })
    }

    /// Registered fonts in registration order.
    pub fn fonts(&self) -> &[RegisteredFont] {
        &self.fonts
    }

    /// Number of registered fonts.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Return `true` when no font is registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
