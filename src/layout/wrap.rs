use serde::{Deserialize, Serialize};

use crate::foundation::error::CardResult;
use crate::render::surface::Surface;

/// Vertical placement rule for wrapped text blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPlacement {
    /// Block centered on `y` with a pitch pulled from `line_height` towards the text height.
    #[default]
    Centered,
    /// Placement of the first-generation card renderer, kept for pixel parity with old cards.
    Legacy,
}

/// One placed line of a wrapped block.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LineBox {
    /// Line text, trimmed.
    pub text: String,
    /// Anchor x passed to `fill_text`.
    pub x: f64,
    /// Anchor y passed to `fill_text`.
    pub y: f64,
}

/// Result of wrapping and placing one text block.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BlockLayout {
    /// Lines in draw order.
    pub lines: Vec<LineBox>,
    /// `ascent + descent` of the first line.
    pub text_height: f64,
    /// Vertical advance between consecutive lines.
    pub pitch: f64,
}

impl BlockLayout {
    /// Vertical span `[top, bottom)` covered by the block's line pitches.
    pub fn extent(&self) -> Option<(f64, f64)> {
        let first = self.lines.first()?;
        let last = self.lines.last()?;
        Some((first.y, last.y + self.pitch))
    }
}

/// Greedy word wrap on single spaces.
///
/// Words are packed while `measure(line + word + " ")` stays within `max_width`. A word that
/// overflows an empty line is kept on it, so words are never broken. Runs of spaces collapse
/// and whitespace-only input yields no lines.
pub fn wrap_words<F>(text: &str, max_width: f64, mut measure: F) -> CardResult<Vec<String>>
where
    F: FnMut(&str) -> CardResult<f64>,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let candidate = format!("{line}{word} ");
        if measure(&candidate)? > max_width && !line.is_empty() {
            lines.push(line.trim().to_owned());
            line = format!("{word} ");
        } else {
            line = candidate;
        }
    }
    let last = line.trim();
    if !last.is_empty() {
        lines.push(last.to_owned());
    }
    Ok(lines)
}

/// Wrap `text` and compute each line's anchor, measuring with the surface's current font.
pub fn layout_block<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    x: f64,
    y: f64,
    max_width: f64,
    line_height: f64,
    placement: TextPlacement,
) -> CardResult<BlockLayout> {
    let lines = wrap_words(text, max_width, |candidate| {
        surface.measure_text(candidate).map(|m| m.width)
    })?;
    let Some(first) = lines.first() else {
        return Ok(BlockLayout::default());
    };
    let text_height = surface.measure_text(first)?.height();
    let n = lines.len() as f64;

    let (first_y, pitch) = match placement {
        TextPlacement::Centered => {
            let pitch = line_height - (line_height - text_height) / 2.0;
            (y - n * pitch / 2.0, pitch)
        }
        TextPlacement::Legacy => {
            let offset = -(n * line_height) / 2.0 + line_height / 2.0;
            (y - text_height + offset, line_height + (line_height - text_height))
        }
    };

    let lines = lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| LineBox {
            text,
            x,
            y: first_y + i as f64 * pitch,
        })
        .collect();

    Ok(BlockLayout {
        lines,
        text_height,
        pitch,
    })
}

/// Wrap, place and draw one block with the surface's current font, fill and alignment.
pub fn draw_wrapped_text<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    x: f64,
    y: f64,
    max_width: f64,
    line_height: f64,
    placement: TextPlacement,
) -> CardResult<BlockLayout> {
    let layout = layout_block(surface, text, x, y, max_width, line_height, placement)?;
    for line in &layout.lines {
        surface.fill_text(&line.text, line.x, line.y)?;
    }
    Ok(layout)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
