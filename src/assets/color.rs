use image::Rgba;

use crate::foundation::error::{TurnaboutError, TurnaboutResult};

/// Default ink for name tags and dialogue.
pub const DEFAULT_TEXT_COLOUR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional, case-insensitive).
pub fn parse_hex_colour(s: &str) -> TurnaboutResult<Rgba<u8>> {
    let s = s.trim();
    let hex = s.strip_prefix('#').unwrap_or(s);

    let byte = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| TurnaboutError::validation(format!("invalid hex colour \"{s}\"")))
    };

    match hex.len() {
        6 => Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Ok(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => Err(TurnaboutError::validation(format!(
            "colour \"{s}\" must be #RRGGBB or #RRGGBBAA"
        ))),
    }
}
