use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use image::imageops;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::assets::decode::{Resize, decode_frames};
use crate::assets::source::AssetSource;
use crate::foundation::core::{FrameIndex, Position};
use crate::foundation::error::{TurnaboutError, TurnaboutResult};
use crate::layer::LayerOverrides;

/// What happens after the last frame of a sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Playback {
    /// Wrap around to the first frame.
    #[default]
    Loop,
    /// Hold the last frame.
    Clamp,
}

/// Playback rate of a looping sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    /// One sequence frame per timeline frame.
    #[default]
    Full,
    /// One sequence frame per two timeline frames.
    Half,
}

impl Speed {
    fn divisor(self) -> u64 {
        match self {
            Speed::Full => 1,
            Speed::Half => 2,
        }
    }
}

/// Image layer: an immutable, shared frame sequence drawn at a position.
#[derive(Clone, Debug)]
pub struct ImageLayer {
    label: Arc<str>,
    frames: Arc<Vec<RgbaImage>>,
    position: Position,
    playback: Playback,
    speed: Speed,
    jitter: bool,
}

impl ImageLayer {
    /// Build from decoded frames. `label` is used in logs and errors.
    pub fn from_frames(label: impl Into<String>, frames: Vec<RgbaImage>) -> TurnaboutResult<Self> {
        Self::from_shared(label, Arc::new(frames))
    }

    /// Build from a frame sequence shared with other layers.
    pub fn from_shared(
        label: impl Into<String>,
        frames: Arc<Vec<RgbaImage>>,
    ) -> TurnaboutResult<Self> {
        let label: String = label.into();
        if frames.is_empty() {
            return Err(TurnaboutError::validation(format!(
                "image layer '{label}' needs at least one frame"
            )));
        }
        Ok(Self {
            label: label.into(),
            frames,
            position: Position::default(),
            playback: Playback::Loop,
            speed: Speed::Full,
            jitter: false,
        })
    }

    /// Decode `path` from `source`. A missing asset is an error.
    pub fn load(source: &dyn AssetSource, path: &Path, resize: Resize) -> TurnaboutResult<Self> {
        let bytes = source.read(path)?;
        let frames = decode_frames(&bytes, resize)
            .map_err(|e| TurnaboutError::asset(format!("'{}': {e}", path.display())))?;
        Self::from_frames(path.display().to_string(), frames)
    }

    /// Place the layer at `position`.
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set the baseline playback mode.
    pub fn with_playback(mut self, playback: Playback) -> Self {
        self.playback = playback;
        self
    }

    /// Set the baseline speed.
    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    /// Set the baseline jitter flag.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Asset label (usually the source path).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Top-left draw position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Baseline playback mode.
    pub fn playback(&self) -> Playback {
        self.playback
    }

    /// Baseline speed.
    pub fn speed(&self) -> Speed {
        self.speed
    }

    /// Width of the first frame.
    pub fn width(&self) -> u32 {
        self.frames[0].width()
    }

    /// Height of the first frame.
    pub fn height(&self) -> u32 {
        self.frames[0].height()
    }

    /// Length of the frame sequence.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Index into the sequence shown at timeline frame `frame`.
    ///
    /// Looping sequences halve the index first at half speed, then wrap. Clamped sequences
    /// ignore the speed and hold the last frame.
    pub fn frame_slot(&self, frame: FrameIndex, overrides: LayerOverrides) -> usize {
        let len = self.frames.len() as u64;
        let slot = match overrides.playback.unwrap_or(self.playback) {
            Playback::Loop => (frame.0 / self.speed.divisor()) % len,
            Playback::Clamp => frame.0.min(len - 1),
        };
        slot as usize
    }

    /// Sequence frame shown at timeline frame `frame`.
    pub fn frame_at(&self, frame: FrameIndex, overrides: LayerOverrides) -> &RgbaImage {
        &self.frames[self.frame_slot(frame, overrides)]
    }

    fn draw_position(&self, overrides: LayerOverrides, rng: &mut dyn RngCore) -> Position {
        if overrides.jitter.unwrap_or(self.jitter) {
            self.position
                .nudged(rng.gen_range(-1..=1), rng.gen_range(-1..=1))
        } else {
            self.position
        }
    }

    /// Composite this layer onto `canvas` in place.
    pub fn render_onto(
        &self,
        canvas: &mut RgbaImage,
        frame: FrameIndex,
        overrides: LayerOverrides,
        rng: &mut dyn RngCore,
    ) {
        let img = self.frame_at(frame, overrides);
        let pos = self.draw_position(overrides, rng);
        imageops::overlay(canvas, img, i64::from(pos.x), i64::from(pos.y));
    }

    /// Composite this layer onto a fresh transparent canvas the size of its first frame.
    pub fn render_new(
        &self,
        frame: FrameIndex,
        overrides: LayerOverrides,
        rng: &mut dyn RngCore,
    ) -> RgbaImage {
        let mut canvas = RgbaImage::new(self.width(), self.height());
        self.render_onto(&mut canvas, frame, overrides, rng);
        canvas
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/sprite.rs"]
mod tests;
