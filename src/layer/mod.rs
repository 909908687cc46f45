//! Renderable visual units.
//!
//! A [`Layer`] owns an immutable frame sequence (or text) plus baseline playback modifiers.
//! Scenes never mutate layers: per-scene changes travel as [`LayerOverrides`].

pub(crate) mod sprite;
pub(crate) mod text;

use std::sync::Arc;

use image::RgbaImage;
use rand::RngCore;

use crate::foundation::core::FrameIndex;

pub use sprite::{ImageLayer, Playback, Speed};
pub use text::TextLayer;

/// Scoped modifier set applied to one layer inside one scene.
///
/// `None` keeps the layer's own baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerOverrides {
    /// Enable or disable the one-pixel shake.
    pub jitter: Option<bool>,
    /// Force looping or clamp-to-last playback.
    pub playback: Option<Playback>,
    /// Enable or disable the typewriter reveal of text layers.
    pub reveal: Option<bool>,
}

impl LayerOverrides {
    /// No overrides.
    pub const NONE: Self = Self {
        jitter: None,
        playback: None,
        reveal: None,
    };

    /// Shake this layer for the scene.
    pub const SHAKE: Self = Self {
        jitter: Some(true),
        playback: None,
        reveal: None,
    };

    /// Show the whole text for the scene.
    pub const FULL_TEXT: Self = Self {
        jitter: None,
        playback: None,
        reveal: Some(false),
    };

    /// Force a playback mode for the scene.
    pub fn playback(playback: Playback) -> Self {
        Self {
            playback: Some(playback),
            ..Self::NONE
        }
    }
}

/// A renderable element of a scene.
#[derive(Clone, Debug)]
pub enum Layer {
    /// Raster or decoded multi-frame sequence.
    Image(ImageLayer),
    /// Optionally revealed line of text.
    Text(TextLayer),
    /// Already-rendered canvas, only meaningful as the bottom of a stack.
    Canvas(Arc<RgbaImage>),
}

impl Layer {
    /// Return `true` for text layers, which run on the scene-local clock.
    pub fn is_text(&self) -> bool {
        matches!(self, Layer::Text(_))
    }

    /// Render as the bottom of a stack, producing a fresh canvas.
    pub(crate) fn render_base(
        &self,
        global: FrameIndex,
        overrides: LayerOverrides,
        rng: &mut dyn RngCore,
    ) -> Option<RgbaImage> {
        match self {
            Layer::Image(img) => Some(img.render_new(global, overrides, rng)),
            Layer::Canvas(canvas) => Some(canvas.as_ref().clone()),
            Layer::Text(_) => None,
        }
    }

    /// Composite on top of `canvas`. Text uses `local`, everything else uses `global`.
    pub(crate) fn render_onto(
        &self,
        canvas: &mut RgbaImage,
        global: FrameIndex,
        local: FrameIndex,
        overrides: LayerOverrides,
        rng: &mut dyn RngCore,
    ) {
        match self {
            Layer::Image(img) => img.render_onto(canvas, global, overrides, rng),
            Layer::Text(text) => text.render_onto(canvas, local, overrides),
            Layer::Canvas(top) => image::imageops::overlay(canvas, top.as_ref(), 0, 0),
        }
    }
}

impl From<ImageLayer> for Layer {
    fn from(value: ImageLayer) -> Self {
        Layer::Image(value)
    }
}

impl From<TextLayer> for Layer {
    fn from(value: TextLayer) -> Self {
        Layer::Text(value)
    }
}
