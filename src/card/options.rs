use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::card::model::{
    BorderSpec, Borders, EdgeGeometry, GradientStop, RenderRequest, RoundedBorderSpec,
    TemplateImage, TextBlock,
};
use crate::foundation::core::Canvas;
use crate::foundation::error::{CardError, CardResult};
use crate::layout::wrap::TextPlacement;

/// Output path used when the options do not name one.
pub const DEFAULT_OUTPUT: &str = "./test.jpeg";

/// A font file to register under a family alias.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FontSource {
    /// Font file path, relative to the assets root unless absolute.
    pub file: PathBuf,
    /// Alias used by text blocks' font shorthands.
    pub family: String,
}

/// Credentials for the external compression service.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionConfig {
    /// API key sent as the basic-auth password.
    pub api_key: String,
    /// Cloud bucket the service stores the result in. Without one the result is downloaded to
    /// the output path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<CloudStore>,
}

impl CompressionConfig {
    /// Configuration with a key and no cloud store.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            store: None,
        }
    }
}

impl fmt::Debug for CompressionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionConfig")
            .field("api_key", &"<redacted>")
            .field("store", &self.store)
            .finish()
    }
}

/// Cloud storage target handed to the compression service, e.g. `{"service": "s3", ...}`.
///
/// Every field besides `service` is passed through unchanged (`aws_access_key_id`, `region`,
/// `path`, `gcp_access_token`, ...).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudStore {
    /// Storage provider: `s3`, `gcs` and so on.
    pub service: String,
    /// Provider-specific settings.
    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl fmt::Debug for CloudStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudStore")
            .field("service", &self.service)
            .field("settings", &self.settings.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Card options as read from JSON. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOptions {
    /// Canvas width, default 1280.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Canvas height, default 669.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Output file; `.png` selects PNG, anything else JPEG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Text blocks in draw order.
    #[serde(default)]
    pub texts: Vec<TextBlock>,
    /// Image blitted at the origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_image: Option<PathBuf>,
    /// Fonts to register before drawing.
    #[serde(default)]
    pub fonts: Vec<FontSource>,
    /// Solid background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    /// Gradient background.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_gradient: Option<Vec<GradientStop>>,
    /// Rounded frame and clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounded_border: Option<RoundedBorderSpec>,
    /// Band along the top edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_top: Option<BorderSpec>,
    /// Band along the right edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_right: Option<BorderSpec>,
    /// Band along the bottom edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_bottom: Option<BorderSpec>,
    /// Band along the left edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_left: Option<BorderSpec>,
    /// Paint lime center guides.
    #[serde(default)]
    pub guides: bool,
    /// Send the encoded card through the compression service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<CompressionConfig>,
    /// Right and bottom band geometry.
    #[serde(default)]
    pub edge_geometry: EdgeGeometry,
    /// Vertical text placement rule.
    #[serde(default)]
    pub text_placement: TextPlacement,
}

impl CardOptions {
    /// Parse options from a JSON string.
    pub fn from_json_str(s: &str) -> CardResult<Self> {
        serde_json::from_str(s).map_err(|e| CardError::validation(format!("card options: {e}")))
    }

    /// Parse options from a JSON reader.
    pub fn from_reader(reader: impl Read) -> CardResult<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| CardError::validation(format!("card options: {e}")))
    }

    /// Read and parse an options file.
    pub fn from_path(path: impl AsRef<Path>) -> CardResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open card options '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Canvas from `width`/`height`, defaulting per axis.
    pub fn canvas(&self) -> CardResult<Canvas> {
        Canvas::from_options(self.width, self.height)
    }

    /// Output path, defaulting to `./test.jpeg`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    /// Compression key, if one is configured and non-blank.
    pub fn compression_key(&self) -> Option<&str> {
        self.compression
            .as_ref()
            .map(|c| c.api_key.trim())
            .filter(|k| !k.is_empty())
    }

    /// Build a validated render request with the given template image.
    ///
    /// When `template` is `None` but the options name a template, the request carries it as
    /// [`TemplateImage::Unresolved`].
    pub fn to_request(&self, template: Option<TemplateImage>) -> CardResult<RenderRequest> {
        let template_image = template.or_else(|| {
            self.template_image
                .clone()
                .map(TemplateImage::Unresolved)
        });
        let req = RenderRequest {
            canvas: self.canvas()?,
            background_color: self.background_color,
            background_gradient: self.background_gradient.clone(),
            rounded_border: self.rounded_border.clone(),
            borders: Borders {
                top: self.border_top.clone(),
                right: self.border_right.clone(),
                bottom: self.border_bottom.clone(),
                left: self.border_left.clone(),
            },
            texts: self.texts.clone(),
            guides: self.guides,
            template_image,
            edge_geometry: self.edge_geometry,
            text_placement: self.text_placement,
        };
        req.validate()?;
        Ok(req)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/card/options.rs"]
mod tests;
