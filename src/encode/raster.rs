use std::path::{Path, PathBuf};

use image::ImageEncoder as _;
use serde::Serialize;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::foundation::error::{CardError, CardResult};
use crate::render::frame::FrameRGBA;

/// JPEG quality used for every non-PNG output.
pub const JPEG_QUALITY: u8 = 95;

/// Raster format chosen from the output path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG with alpha.
    Png,
    /// Baseline JPEG, quality 95.
    Jpeg,
}

impl OutputFormat {
    /// `.png` (any case) selects PNG; every other path, including no extension, selects JPEG.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => Self::Png,
            _ => Self::Jpeg,
        }
    }

    /// MIME type of the encoded bytes.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// An encoded card ready for a [`crate::CardSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedCard {
    /// Destination path.
    pub path: PathBuf,
    /// Encoded format.
    pub format: OutputFormat,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Encoded file bytes.
    pub bytes: Vec<u8>,
}

impl EncodedCard {
    /// Encode `frame` for `path`, picking the format from the path.
    pub fn encode(frame: &FrameRGBA, path: impl Into<PathBuf>) -> CardResult<Self> {
        let path = path.into();
        let format = OutputFormat::from_path(&path);
        let bytes = encode_frame(frame, format)?;
        Ok(Self {
            path,
            format,
            width: frame.width,
            height: frame.height,
            bytes,
        })
    }
}

/// Encode a frame. PNG keeps alpha; JPEG composites premultiplied pixels over black.
pub fn encode_frame(frame: &FrameRGBA, format: OutputFormat) -> CardResult<Vec<u8>> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(CardError::encoding(format!(
            "frame data is {} bytes, expected {expected}",
            frame.data.len()
        )));
    }

    let mut out = Vec::new();
    match format {
        OutputFormat::Png => {
            let mut rgba = frame.data.clone();
            if frame.premultiplied {
                unpremultiply_rgba8_in_place(&mut rgba);
            }
            image::codecs::png::PngEncoder::new(&mut out)
                .write_image(
                    &rgba,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| CardError::encoding(format!("png encode failed: {e}")))?;
        }
        OutputFormat::Jpeg => {
            let rgb = flatten_to_rgb8(&frame.data, frame.premultiplied);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                .write_image(
                    &rgb,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgb8,
                )
                .map_err(|e| CardError::encoding(format!("jpeg encode failed: {e}")))?;
        }
    }
    Ok(out)
}

/// Drop alpha by compositing over black.
fn flatten_to_rgb8(src: &[u8], src_is_premul: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() / 4 * 3);
    for px in src.chunks_exact(4) {
        if src_is_premul {
            out.extend_from_slice(&px[..3]);
        } else {
            let a = u16::from(px[3]);
            out.extend(px[..3].iter().map(|&c| mul_div255(u16::from(c), a) as u8));
        }
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/encode/raster.rs"]
mod tests;
