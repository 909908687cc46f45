//! Scene-script expansion.
//!
//! Each stage direction becomes one [`TimelineStep`] plus the scenes that realise it. Sound
//! events are derived from the steps, so every frame a scene consumes is matched by exactly one
//! frame of sound.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::assets::catalog::AssetCatalog;
use crate::assets::color::parse_hex_colour;
use crate::assets::decode::{Resize, bounce_frames, decode_frames};
use crate::assets::font::FontFace;
use crate::assets::source::AssetSource;
use crate::audio::events::{SoundEvent, total_event_frames};
use crate::foundation::core::{FrameIndex, Position};
use crate::foundation::error::{TurnaboutError, TurnaboutResult};
use crate::layer::{ImageLayer, Layer, LayerOverrides, Playback, Speed, TextLayer};
use crate::scene::model::Scene;
use crate::script::model::{Action, Character, Location, LocationBlock, SceneScript, StageDirection};
use crate::script::wrap::{DEFAULT_WRAP_WIDTH, wrap_dialogue};

/// Screen placement of the interface chrome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageLayout {
    /// Name tag origin.
    pub name_pos: Position,
    /// Name tag font size in pixels.
    pub name_size: f32,
    /// Dialogue origin.
    pub text_pos: Position,
    /// Dialogue font size in pixels.
    pub text_size: f32,
    /// "Continue" arrow origin.
    pub arrow_pos: Position,
    /// Arrow sprite is stretched to this size.
    pub arrow_size: (u32, u32),
    /// Pixels the arrow bobs sideways.
    pub arrow_bounce: u32,
}

impl Default for StageLayout {
    fn default() -> Self {
        Self {
            name_pos: Position::new(4, 113),
            name_size: 12.0,
            text_pos: Position::new(5, 130),
            text_size: 15.0,
            arrow_pos: Position::new(235, 170),
            arrow_size: (15, 15),
            arrow_bounce: 5,
        }
    }
}

/// Timing and layout knobs of the expander.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpanderOpts {
    /// Frames a finished line (and a shake, and a default pause) is held.
    pub lag_frames: u64,
    /// Frames of each objection phase (burst, then settle).
    pub objection_frames: u64,
    /// Dialogue line width in characters.
    pub wrap_width: usize,
    /// Dialogue colour when a direction names none, `#RRGGBB[AA]`.
    pub text_colour: String,
    /// Interface chrome placement.
    pub layout: StageLayout,
}

impl Default for ExpanderOpts {
    fn default() -> Self {
        Self {
            lag_frames: 25,
            objection_frames: 11,
            wrap_width: DEFAULT_WRAP_WIDTH,
            text_colour: "#ffffff".to_owned(),
            layout: StageLayout::default(),
        }
    }
}

/// What one stage direction turned into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TimelineStep {
    /// Background music starts; consumes no frames.
    MusicCue {
        /// Track name.
        track: String,
    },
    /// Dialogue typing out on the talking sprite.
    Reveal {
        /// Frames (wrapped characters minus one).
        frames: u64,
        /// Stage shakes while typing.
        shake: bool,
    },
    /// Finished line held on the idle sprite with the continue arrow.
    Hold {
        /// Frames held.
        frames: u64,
    },
    /// Stage shake without new dialogue.
    Shake {
        /// Frames shaken.
        frames: u64,
    },
    /// Objection burst followed by a settle phase.
    Objection {
        /// Frames of both phases together.
        frames: u64,
        /// Who objected.
        character: Option<Character>,
    },
    /// Idle sprite on stage with nothing happening.
    Pause {
        /// Frames paused.
        frames: u64,
    },
}

impl TimelineStep {
    /// Video frames consumed by this step.
    pub fn frames(&self) -> u64 {
        match self {
            TimelineStep::MusicCue { .. } => 0,
            TimelineStep::Reveal { frames, .. }
            | TimelineStep::Hold { frames }
            | TimelineStep::Shake { frames }
            | TimelineStep::Objection { frames, .. }
            | TimelineStep::Pause { frames } => *frames,
        }
    }

    /// Sound event accompanying this step.
    pub fn sound_event(&self) -> SoundEvent {
        match self {
            TimelineStep::MusicCue { track } => SoundEvent::MusicCue {
                track: track.clone(),
            },
            TimelineStep::Reveal { frames, .. } => SoundEvent::Blip { length: *frames },
            TimelineStep::Hold { frames } | TimelineStep::Pause { frames } => {
                SoundEvent::Silence { length: *frames }
            }
            TimelineStep::Shake { frames } => SoundEvent::Shock { length: *frames },
            TimelineStep::Objection { frames, character } => SoundEvent::Objection {
                length: *frames,
                character: *character,
            },
        }
    }
}

/// Expanded script: scenes in play order and the steps that produced them.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    scenes: Vec<Scene>,
    steps: Vec<TimelineStep>,
    total_frames: u64,
}

impl Timeline {
    /// Scenes in play order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Steps in play order.
    pub fn steps(&self) -> &[TimelineStep] {
        &self.steps
    }

    /// Frames across all scenes.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Sound events in play order, one per step.
    pub fn sound_events(&self) -> Vec<SoundEvent> {
        self.steps.iter().map(TimelineStep::sound_event).collect()
    }

    /// Canvas size of the first scene.
    pub fn frame_size(&self) -> Option<(u32, u32)> {
        let bottom = &self.scenes.first()?.layers().first()?.layer;
        match bottom {
            Layer::Image(img) => Some((img.width(), img.height())),
            Layer::Canvas(c) => Some(c.dimensions()),
            Layer::Text(_) => None,
        }
    }

    /// Scene showing global frame `frame` and the local index within it.
    pub fn scene_at(&self, frame: FrameIndex) -> Option<(&Scene, u64)> {
        self.scenes.iter().find_map(|s| {
            let start = s.start_offset().0;
            (frame.0 >= start && frame.0 < start + s.len_frames()).then(|| (s, frame.0 - start))
        })
    }

    /// Check that the sound timeline covers exactly the video frames and that scenes are
    /// contiguous.
    pub fn verify_sync(&self) -> TurnaboutResult<()> {
        let mut expected_start = 0u64;
        for (i, scene) in self.scenes.iter().enumerate() {
            if scene.start_offset().0 != expected_start {
                return Err(TurnaboutError::timing(format!(
                    "scene {i} starts at frame {}, expected {expected_start}",
                    scene.start_offset().0
                )));
            }
            expected_start += scene.len_frames();
        }
        let sound = total_event_frames(&self.sound_events());
        if sound != expected_start || expected_start != self.total_frames {
            return Err(TurnaboutError::timing(format!(
                "video covers {expected_start} frames but sound covers {sound}"
            )));
        }
        Ok(())
    }

    fn push(&mut self, step: TimelineStep, scenes: Vec<Scene>) -> TurnaboutResult<()> {
        let scene_frames: u64 = scenes.iter().map(Scene::len_frames).sum();
        if scene_frames != step.frames() {
            return Err(TurnaboutError::timing(format!(
                "{step:?} claims {} frames but its scenes cover {scene_frames}",
                step.frames()
            )));
        }
        tracing::debug!(?step, at = self.total_frames, "timeline step");
        self.total_frames += scene_frames;
        self.scenes.extend(scenes);
        self.steps.push(step);
        Ok(())
    }
}

/// Static layers shared by every direction of a location block.
struct Stage {
    background: Layer,
    bench: Option<Layer>,
    textbox: Layer,
    arrow: Layer,
    objection: Layer,
}

struct Speaker {
    character: Character,
    idle: Layer,
    talking: Layer,
    name: Layer,
}

/// Speaker-turn state machine, reset at every location block.
#[derive(Default)]
struct BlockState {
    speaker: Option<Speaker>,
    /// Speaker's own name tag and the text of the last line, reused by later shakes.
    last_line: Option<(Layer, Layer)>,
}

/// Turns a [`SceneScript`] into a [`Timeline`] using an injected asset catalog.
pub struct Expander<'a> {
    catalog: &'a AssetCatalog,
    source: &'a dyn AssetSource,
    opts: ExpanderOpts,
    text_colour: Rgba<u8>,
    font: Option<FontFace>,
    frames_cache: HashMap<(PathBuf, Resize), Arc<Vec<RgbaImage>>>,
}

impl<'a> Expander<'a> {
    /// Create an expander. The configured font is loaded eagerly.
    pub fn new(
        catalog: &'a AssetCatalog,
        source: &'a dyn AssetSource,
        opts: ExpanderOpts,
    ) -> TurnaboutResult<Self> {
        if opts.lag_frames == 0 || opts.objection_frames == 0 {
            return Err(TurnaboutError::validation(
                "lag_frames and objection_frames must be > 0",
            ));
        }
        let text_colour = parse_hex_colour(&opts.text_colour)?;
        let font = match catalog.font.as_deref() {
            Some(path) => Some(FontFace::from_bytes(source.read(path)?)?),
            None => {
                tracing::warn!("no font configured; name tags and dialogue will not be drawn");
                None
            }
        };
        Ok(Self {
            catalog,
            source,
            opts,
            text_colour,
            font,
            frames_cache: HashMap::new(),
        })
    }

    /// Options in effect.
    pub fn opts(&self) -> &ExpanderOpts {
        &self.opts
    }

    /// Expand every location block in order.
    #[tracing::instrument(skip(self, script), fields(blocks = script.blocks.len()))]
    pub fn expand(&mut self, script: &SceneScript) -> TurnaboutResult<Timeline> {
        script.validate()?;
        let mut timeline = Timeline::default();
        for block in &script.blocks {
            self.expand_block(block, &mut timeline)?;
        }
        timeline.verify_sync()?;
        tracing::info!(
            scenes = timeline.scenes.len(),
            frames = timeline.total_frames,
            "expanded scene script"
        );
        Ok(timeline)
    }

    fn expand_block(&mut self, block: &LocationBlock, tl: &mut Timeline) -> TurnaboutResult<()> {
        let stage = self.stage(block.location)?;
        if let Some(track) = &block.audio {
            tl.push(
                TimelineStep::MusicCue {
                    track: track.clone(),
                },
                Vec::new(),
            )?;
        }

        let mut state = BlockState::default();
        for dir in &block.scene {
            self.select_speaker(&mut state, dir)?;
            match dir.action {
                Some(Action::Text) => self.dialogue(&stage, &mut state, dir, false, tl)?,
                Some(Action::TextShake) => self.dialogue(&stage, &mut state, dir, true, tl)?,
                Some(Action::Shake) => self.shake(&stage, &state, tl)?,
                Some(Action::Objection) => self.objection(&stage, &state, tl)?,
                Some(Action::Other) | None => self.pause(&stage, &state, dir, tl)?,
            }
        }
        Ok(())
    }

    fn select_speaker(
        &mut self,
        state: &mut BlockState,
        dir: &StageDirection,
    ) -> TurnaboutResult<()> {
        let emotion = dir.emotion.as_deref();
        if let Some(character) = dir.character {
            state.speaker = Some(self.speaker(character, emotion)?);
        } else if emotion.is_some() {
            let Some(current) = state.speaker.as_ref() else {
                return Err(TurnaboutError::validation(
                    "emotion change with no character on stage",
                ));
            };
            let (idle, talking) = self.sprites(current.character, emotion)?;
            if let Some(sp) = state.speaker.as_mut() {
                sp.idle = idle;
                sp.talking = talking;
            }
        }
        Ok(())
    }

    fn dialogue(
        &mut self,
        stage: &Stage,
        state: &mut BlockState,
        dir: &StageDirection,
        shake: bool,
        tl: &mut Timeline,
    ) -> TurnaboutResult<()> {
        let Some(speaker) = state.speaker.as_ref() else {
            return Err(TurnaboutError::validation("dialogue with no character on stage"));
        };
        let raw = dir.text.as_deref().unwrap_or_default();
        let wrapped = wrap_dialogue(raw, self.opts.wrap_width);
        let colour = match dir.colour.as_deref() {
            Some(hex) => parse_hex_colour(hex)?,
            None => self.text_colour,
        };

        let layout = &self.opts.layout;
        let text: Layer = TextLayer::new(wrapped, self.font.clone(), layout.text_size)
            .at(layout.text_pos)
            .with_colour(Some(colour))
            .with_reveal(true)
            .into();
        let name = match dir.name.as_deref() {
            Some(n) => self.name_tag(n),
            None => speaker.name.clone(),
        };

        let reveal_frames = match &text {
            Layer::Text(t) => (t.char_count() as u64).saturating_sub(1),
            _ => 0,
        };
        let shaking = if shake {
            LayerOverrides::SHAKE
        } else {
            LayerOverrides::NONE
        };

        if reveal_frames > 0 {
            let scene = Scene::builder()
                .layer_with(&stage.background, shaking)
                .layer_with(&speaker.talking, shaking)
                .maybe(stage.bench.as_ref(), shaking)
                .layer_with(&stage.textbox, shaking)
                .layer(&name)
                .layer(&text)
                .build(reveal_frames, FrameIndex(tl.total_frames))?;
            tl.push(
                TimelineStep::Reveal {
                    frames: reveal_frames,
                    shake,
                },
                vec![scene],
            )?;
        }

        let lag = self.opts.lag_frames;
        let hold = Scene::builder()
            .layer(&stage.background)
            .layer(&speaker.idle)
            .maybe(stage.bench.as_ref(), LayerOverrides::NONE)
            .layer(&stage.textbox)
            .layer(&name)
            .layer_with(&text, LayerOverrides::FULL_TEXT)
            .layer(&stage.arrow)
            .build(lag, FrameIndex(tl.total_frames))?;
        tl.push(TimelineStep::Hold { frames: lag }, vec![hold])?;

        state.last_line = Some((speaker.name.clone(), text));
        Ok(())
    }

    fn shake(
        &mut self,
        stage: &Stage,
        state: &BlockState,
        tl: &mut Timeline,
    ) -> TurnaboutResult<()> {
        let lag = self.opts.lag_frames;
        let shaking = LayerOverrides::SHAKE;

        let mut builder = Scene::builder()
            .layer_with(&stage.background, shaking)
            .maybe(state.speaker.as_ref().map(|s| &s.idle), shaking)
            .maybe(stage.bench.as_ref(), shaking);
        if let Some((name, text)) = &state.last_line {
            builder = builder
                .layer_with(&stage.textbox, shaking)
                .layer(name)
                .layer_with(text, LayerOverrides::FULL_TEXT)
                .layer(&stage.arrow);
        }
        let scene = builder.build(lag, FrameIndex(tl.total_frames))?;
        tl.push(TimelineStep::Shake { frames: lag }, vec![scene])
    }

    fn objection(
        &mut self,
        stage: &Stage,
        state: &BlockState,
        tl: &mut Timeline,
    ) -> TurnaboutResult<()> {
        let phase = self.opts.objection_frames;
        let idle = state.speaker.as_ref().map(|s| &s.idle);
        let start = tl.total_frames;

        let burst = Scene::builder()
            .layer(&stage.background)
            .maybe(idle, LayerOverrides::NONE)
            .maybe(stage.bench.as_ref(), LayerOverrides::NONE)
            .layer_with(&stage.objection, LayerOverrides::SHAKE)
            .build(phase, FrameIndex(start))?;
        let settle = Scene::builder()
            .layer(&stage.background)
            .maybe(idle, LayerOverrides::NONE)
            .maybe(stage.bench.as_ref(), LayerOverrides::NONE)
            .build(phase, FrameIndex(start + phase))?;

        tl.push(
            TimelineStep::Objection {
                frames: phase * 2,
                character: state.speaker.as_ref().map(|s| s.character),
            },
            vec![burst, settle],
        )
    }

    fn pause(
        &mut self,
        stage: &Stage,
        state: &BlockState,
        dir: &StageDirection,
        tl: &mut Timeline,
    ) -> TurnaboutResult<()> {
        let length = dir.length.unwrap_or(self.opts.lag_frames);
        let idle_overrides = match dir.repeat {
            Some(false) => LayerOverrides::playback(Playback::Clamp),
            _ => LayerOverrides::NONE,
        };
        let scene = Scene::builder()
            .layer(&stage.background)
            .maybe(state.speaker.as_ref().map(|s| &s.idle), idle_overrides)
            .maybe(stage.bench.as_ref(), LayerOverrides::NONE)
            .build(length, FrameIndex(tl.total_frames))?;
        tl.push(TimelineStep::Pause { frames: length }, vec![scene])
    }

    fn stage(&mut self, location: Location) -> TurnaboutResult<Stage> {
        let catalog = self.catalog;
        let background = self.image(catalog.background(location)?, Resize::NONE)?;
        let (bg_w, bg_h) = (background.width(), background.height());

        let bench = match catalog.bench(location) {
            Some(path) if location == Location::WitnessStand => {
                let bench = self.image(path, Resize::width(bg_w))?;
                let y = bg_h as i32 - bench.height() as i32;
                Some(bench.at(Position::new(0, y)))
            }
            Some(path) => Some(self.image(path, Resize::NONE)?),
            None => None,
        };

        let textbox = self.image(&catalog.ui.textbox, Resize::width(bg_w))?;

        let layout = &self.opts.layout;
        let (arrow_w, arrow_h) = layout.arrow_size;
        let (arrow_pos, bounce) = (layout.arrow_pos, layout.arrow_bounce);
        let arrow_frames = self.frames(&catalog.ui.arrow, Resize::exact(arrow_w, arrow_h))?;
        let bounced = arrow_frames
            .first()
            .map(|still| bounce_frames(still, bounce.max(1), true))
            .unwrap_or_default();
        let arrow =
            ImageLayer::from_frames(catalog.ui.arrow.display().to_string(), bounced)?.at(arrow_pos);

        let objection = self.image(&catalog.ui.objection, Resize::NONE)?;

        Ok(Stage {
            background: background.into(),
            bench: bench.map(Layer::from),
            textbox: textbox.into(),
            arrow: arrow.into(),
            objection: objection.into(),
        })
    }

    fn speaker(&mut self, character: Character, emotion: Option<&str>) -> TurnaboutResult<Speaker> {
        let (idle, talking) = self.sprites(character, emotion)?;
        Ok(Speaker {
            character,
            idle,
            talking,
            name: self.name_tag(&character.display_name()),
        })
    }

    fn sprites(
        &mut self,
        character: Character,
        emotion: Option<&str>,
    ) -> TurnaboutResult<(Layer, Layer)> {
        let pair = self
            .catalog
            .resolve_sprites(self.source, character, emotion)?;
        let idle = self.image(&pair.idle, Resize::NONE)?.with_speed(Speed::Half);
        let talking = self
            .image(&pair.talking, Resize::NONE)?
            .with_speed(Speed::Half);
        Ok((idle.into(), talking.into()))
    }

    fn name_tag(&self, name: &str) -> Layer {
        let layout = &self.opts.layout;
        TextLayer::new(name, self.font.clone(), layout.name_size)
            .at(layout.name_pos)
            .into()
    }

    fn image(&mut self, path: &Path, resize: Resize) -> TurnaboutResult<ImageLayer> {
        let frames = self.frames(path, resize)?;
        ImageLayer::from_shared(path.display().to_string(), frames)
    }

    fn frames(&mut self, path: &Path, resize: Resize) -> TurnaboutResult<Arc<Vec<RgbaImage>>> {
        let key = (path.to_path_buf(), resize);
        if let Some(frames) = self.frames_cache.get(&key) {
            return Ok(Arc::clone(frames));
        }
        let bytes = self.source.read(path)?;
        let frames = Arc::new(
            decode_frames(&bytes, resize)
                .map_err(|e| TurnaboutError::asset(format!("'{}': {e}", path.display())))?,
        );
        self.frames_cache.insert(key, Arc::clone(&frames));
        Ok(frames)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/expand.rs"]
mod tests;
