use std::io::Cursor;

use anyhow::Context as _;
use image::imageops::{self, FilterType};
use image::{AnimationDecoder, ImageFormat, RgbaImage};

use crate::foundation::error::{TurnaboutError, TurnaboutResult};

/// Optional target size applied to every decoded frame.
///
/// With both dimensions set the frame is stretched to exactly `w x h`; with one set the other is
/// derived from the source aspect ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Resize {
    /// Target width in pixels.
    pub w: Option<u32>,
    /// Target height in pixels.
    pub h: Option<u32>,
}

impl Resize {
    /// Keep the source size.
    pub const NONE: Self = Self { w: None, h: None };

    /// Scale to `w` pixels wide, preserving aspect ratio.
    pub fn width(w: u32) -> Self {
        Self {
            w: Some(w),
            h: None,
        }
    }

    /// Stretch to exactly `w x h`.
    pub fn exact(w: u32, h: u32) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
        }
    }

    fn apply(self, frame: RgbaImage) -> RgbaImage {
        let (src_w, src_h) = frame.dimensions();
        match (self.w, self.h) {
            (Some(w), Some(h)) => imageops::resize(&frame, w, h, FilterType::Nearest),
            (Some(w), None) => {
                let h = (f64::from(src_h) * (f64::from(w) / f64::from(src_w))) as u32;
                imageops::resize(&frame, w, h.max(1), FilterType::Lanczos3)
            }
            (None, Some(h)) => {
                let w = (f64::from(src_w) * (f64::from(h) / f64::from(src_h))) as u32;
                imageops::resize(&frame, w.max(1), h, FilterType::Lanczos3)
            }
            (None, None) => frame,
        }
    }
}

/// Decode encoded image bytes into straight-alpha RGBA8 frames.
///
/// Animated GIFs yield one frame per GIF frame; every other format yields a single frame.
pub fn decode_frames(bytes: &[u8], resize: Resize) -> TurnaboutResult<Vec<RgbaImage>> {
    let format = image::guess_format(bytes).context("guess image format")?;

    let frames = if format == ImageFormat::Gif {
        let decoder = image::codecs::gif::GifDecoder::new(Cursor::new(bytes))
            .context("open gif decoder")?;
        decoder
            .into_frames()
            .collect_frames()
            .context("decode gif frames")?
            .into_iter()
            .map(|f| f.into_buffer())
            .collect::<Vec<_>>()
    } else {
        let img = image::load_from_memory_with_format(bytes, format)
            .context("decode image from memory")?;
        vec![img.to_rgba8()]
    };

    if frames.is_empty() {
        return Err(TurnaboutError::asset("image contains no frames"));
    }
    Ok(frames.into_iter().map(|f| resize.apply(f)).collect())
}

/// Build a horizontal "bounce" sequence from a still frame.
///
/// Produces `steps` frames left-padded by `0..steps` pixels, followed by the same frames in
/// reverse when `reverse` is set.
pub fn bounce_frames(frame: &RgbaImage, steps: u32, reverse: bool) -> Vec<RgbaImage> {
    let forward = (0..steps).map(|pad| pad_left(frame, pad));
    if reverse {
        let mut out: Vec<_> = forward.collect();
        let back: Vec<_> = out.iter().rev().cloned().collect();
        out.extend(back);
        out
    } else {
        forward.collect()
    }
}

fn pad_left(frame: &RgbaImage, pad: u32) -> RgbaImage {
    let (w, h) = frame.dimensions();
    let mut out = RgbaImage::new(w + pad, h);
    imageops::replace(&mut out, frame, i64::from(pad), 0);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
