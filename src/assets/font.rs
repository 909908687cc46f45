use std::sync::Arc;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};

use crate::foundation::core::Position;
use crate::foundation::error::{TurnaboutError, TurnaboutResult};
use crate::foundation::math::{blend_over, mul_div255_u16};

/// Parsed TrueType face shared by every text layer of a job.
#[derive(Clone)]
pub struct FontFace {
    font: Arc<Font>,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace").finish_non_exhaustive()
    }
}

impl FontFace {
    /// Parse font bytes (TTF/OTF).
    pub fn from_bytes(bytes: Vec<u8>) -> TurnaboutResult<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| TurnaboutError::asset(format!("failed to parse font: {e}")))?;
        Ok(Self {
            font: Arc::new(font),
        })
    }

    /// Draw `text` with its top-left corner at `pos`. Hard line breaks start new lines.
    pub fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        pos: Position,
        text: &str,
        size_px: f32,
        colour: Rgba<u8>,
    ) {
        if text.is_empty() {
            return;
        }

        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: pos.x as f32,
            y: pos.y as f32,
            max_width: None,
            max_height: None,
            horizontal_align: fontdue::layout::HorizontalAlign::Left,
            vertical_align: fontdue::layout::VerticalAlign::Top,
            line_height: 1.0,
            wrap_style: fontdue::layout::WrapStyle::Letter,
            wrap_hard_breaks: true,
        });
        layout.append(&[self.font.as_ref()], &TextStyle::new(text, size_px, 0));

        let (cw, ch) = canvas.dimensions();
        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (_, coverage) = self.font.rasterize_config(glyph.key);
            let gx = glyph.x.round() as i64;
            let gy = glyph.y.round() as i64;

            for row in 0..glyph.height {
                let py = gy + row as i64;
                if py < 0 || py >= i64::from(ch) {
                    continue;
                }
                for col in 0..glyph.width {
                    let px = gx + col as i64;
                    if px < 0 || px >= i64::from(cw) {
                        continue;
                    }
                    let mask = coverage[row * glyph.width + col];
                    if mask == 0 {
                        continue;
                    }
                    let alpha = mul_div255_u16(u16::from(mask), u16::from(colour[3])) as u8;
                    let dst = canvas.get_pixel_mut(px as u32, py as u32);
                    blend_over(&mut dst.0, [colour[0], colour[1], colour[2], alpha]);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
