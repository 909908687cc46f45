use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::assets::color::DEFAULT_TEXT_COLOUR;
use crate::assets::font::FontFace;
use crate::foundation::core::{FrameIndex, Position};
use crate::layer::LayerOverrides;

/// A line (or wrapped block) of text, optionally typed out one character per frame.
#[derive(Clone, Debug)]
pub struct TextLayer {
    text: Arc<str>,
    position: Position,
    font: Option<FontFace>,
    size_px: f32,
    colour: Rgba<u8>,
    reveal: bool,
}

impl TextLayer {
    /// Create a text layer. With `font` unset the layer occupies its slot but draws nothing.
    pub fn new(text: impl Into<String>, font: Option<FontFace>, size_px: f32) -> Self {
        let text: String = text.into();
        Self {
            text: text.into(),
            position: Position::default(),
            font,
            size_px,
            colour: DEFAULT_TEXT_COLOUR,
            reveal: false,
        }
    }

    /// Place the text at `position`.
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set the ink colour; `None` keeps the default UI colour.
    pub fn with_colour(mut self, colour: Option<Rgba<u8>>) -> Self {
        self.colour = colour.unwrap_or(DEFAULT_TEXT_COLOUR);
        self
    }

    /// Enable the typewriter reveal.
    pub fn with_reveal(mut self, reveal: bool) -> Self {
        self.reveal = reveal;
        self
    }

    /// Full text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ink colour.
    pub fn colour(&self) -> Rgba<u8> {
        self.colour
    }

    /// Baseline reveal flag.
    pub fn reveals(&self) -> bool {
        self.reveal
    }

    /// Number of characters (not bytes) in the text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Text visible at scene-local frame `local`: the first `local` characters while revealing,
    /// otherwise everything.
    pub fn visible_text(&self, local: FrameIndex, overrides: LayerOverrides) -> &str {
        if !overrides.reveal.unwrap_or(self.reveal) {
            return &self.text;
        }
        let take = usize::try_from(local.0).unwrap_or(usize::MAX);
        match self.text.char_indices().nth(take) {
            Some((byte_end, _)) => &self.text[..byte_end],
            None => &self.text,
        }
    }

    /// Draw the visible text onto `canvas`.
    pub fn render_onto(
        &self,
        canvas: &mut RgbaImage,
        local: FrameIndex,
        overrides: LayerOverrides,
    ) {
        let Some(font) = self.font.as_ref() else {
            return;
        };
        let visible = self.visible_text(local, overrides);
        font.draw_text(canvas, self.position, visible, self.size_px, self.colour);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/text.rs"]
mod tests;
