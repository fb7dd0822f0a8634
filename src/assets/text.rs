use std::borrow::Cow;

use crate::assets::font::RegisteredFont;
use crate::foundation::error::{CardError, CardResult};

/// Stateful helper for shaping single lines with Parley from registered font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    /// Parley family name per registered font, in registration order.
    family_names: Vec<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            family_names: Vec::new(),
        }
    }

    /// Register a font with the Parley collection and remember the family name it exposes.
    ///
    /// The name inside the font file can differ from the caller's alias; layouts always request
    /// the file's own name so the shaped glyphs come from these exact bytes.
    pub(crate) fn register(&mut self, font: &RegisteredFont) -> CardResult<usize> {
        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.data.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CardError::validation(format!(
                "no font families registered from font bytes for \"{}\"",
                font.family
            ))
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CardError::validation("registered font family has no name"))?
            .to_string();

        self.family_names.push(family_name);
        Ok(self.family_names.len() - 1)
    }

    /// Shape `text` as a single unwrapped line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font_index: usize,
        size_px: f32,
    ) -> CardResult<parley::Layout<()>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CardError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self
            .family_names
            .get(font_index)
            .cloned()
            .ok_or_else(|| CardError::validation("font index is not registered"))?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}
