use image::RgbaImage;
use rand::RngCore;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TurnaboutError, TurnaboutResult};
use crate::layer::{Layer, LayerOverrides};

/// One layer of a scene stack together with the overrides it is drawn with.
#[derive(Clone, Debug)]
pub struct SceneLayer {
    /// Shared layer.
    pub layer: Layer,
    /// Modifiers scoped to this scene.
    pub overrides: LayerOverrides,
}

/// Fixed-length stack of layers, bottom first.
///
/// Frame `i` of a scene composites every layer in order: text layers sample local frame `i`,
/// all other layers sample global frame `start_offset + i` so animation phase carries across
/// scenes.
#[derive(Clone, Debug)]
pub struct Scene {
    layers: Vec<SceneLayer>,
    length: u64,
    start_offset: FrameIndex,
}

impl Scene {
    /// Build a validated scene.
    pub fn new(
        layers: Vec<SceneLayer>,
        length: u64,
        start_offset: FrameIndex,
    ) -> TurnaboutResult<Self> {
        if length == 0 {
            return Err(TurnaboutError::validation("scene length must be > 0"));
        }
        let Some(bottom) = layers.first() else {
            return Err(TurnaboutError::validation("scene needs at least one layer"));
        };
        if bottom.layer.is_text() {
            return Err(TurnaboutError::validation(
                "the bottom layer of a scene cannot be text",
            ));
        }
        Ok(Self {
            layers,
            length,
            start_offset,
        })
    }

    /// Start an empty layer stack.
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    /// Number of frames this scene renders.
    pub fn len_frames(&self) -> u64 {
        self.length
    }

    /// Global frame index of the first frame.
    pub fn start_offset(&self) -> FrameIndex {
        self.start_offset
    }

    /// Layer stack, bottom first.
    pub fn layers(&self) -> &[SceneLayer] {
        &self.layers
    }

    /// Composite local frame `local` (`0..len_frames()`).
    pub fn render_frame(&self, local: u64, rng: &mut dyn RngCore) -> TurnaboutResult<RgbaImage> {
        if local >= self.length {
            return Err(TurnaboutError::validation(format!(
                "local frame {local} is out of bounds for a scene of {} frames",
                self.length
            )));
        }
        let global = self.start_offset.offset(local);
        let local = FrameIndex(local);

        let (bottom, rest) = self
            .layers
            .split_first()
            .ok_or_else(|| TurnaboutError::validation("scene has no layers"))?;
        let mut canvas = bottom
            .layer
            .render_base(global, bottom.overrides, rng)
            .ok_or_else(|| TurnaboutError::validation("scene bottom layer cannot be text"))?;

        for sl in rest {
            sl.layer
                .render_onto(&mut canvas, global, local, sl.overrides, rng);
        }
        Ok(canvas)
    }

    /// Composite every frame of the scene in order.
    pub fn render_frames(&self, rng: &mut dyn RngCore) -> TurnaboutResult<Vec<RgbaImage>> {
        (0..self.length)
            .map(|i| self.render_frame(i, rng))
            .collect()
    }
}

/// Incremental layer-stack builder.
#[derive(Clone, Debug, Default)]
pub struct SceneBuilder {
    layers: Vec<SceneLayer>,
}

impl SceneBuilder {
    /// Push `layer` with no overrides.
    pub fn layer(self, layer: &Layer) -> Self {
        self.layer_with(layer, LayerOverrides::NONE)
    }

    /// Push `layer` with scene-scoped overrides.
    pub fn layer_with(mut self, layer: &Layer, overrides: LayerOverrides) -> Self {
        self.layers.push(SceneLayer {
            layer: layer.clone(),
            overrides,
        });
        self
    }

    /// Push `layer` when present.
    pub fn maybe(self, layer: Option<&Layer>, overrides: LayerOverrides) -> Self {
        match layer {
            Some(layer) => self.layer_with(layer, overrides),
            None => self,
        }
    }

    /// Finish the stack as a scene of `length` frames starting at `start_offset`.
    pub fn build(self, length: u64, start_offset: FrameIndex) -> TurnaboutResult<Scene> {
        Scene::new(self.layers, length, start_offset)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
