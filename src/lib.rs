//! Turnabout renders courtroom scene scripts into video and a frame-locked soundtrack.
//!
//! A [`SceneScript`] is expanded by an [`Expander`] into a [`Timeline`]: scenes of stacked
//! layers plus the steps that produced them. The timeline is then rendered:
//!
//! - [`render_video`] streams composited frames into a [`FrameSink`]
//! - [`render_audio`] mixes the derived sound events into PCM of exactly the video duration
//! - [`render_job`] does both and encodes the results with the system `ffmpeg`
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod audio;
mod encode;
mod foundation;
mod layer;
mod render;
mod scene;
mod script;

pub use crate::foundation::core::{Fps, FrameIndex, Position};
pub use crate::foundation::error::{TurnaboutError, TurnaboutResult};

pub use crate::assets::catalog::{
    AssetCatalog, DEFAULT_EMOTION, SoundAssets, SpriteCandidate, SpritePair, UiAssets,
};
pub use crate::assets::color::{DEFAULT_TEXT_COLOUR, parse_hex_colour};
pub use crate::assets::decode::{Resize, bounce_frames, decode_frames};
pub use crate::assets::font::FontFace;
pub use crate::assets::media::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
pub use crate::assets::source::{AssetSource, FsAssetSource, MemoryAssetSource};

pub use crate::layer::{ImageLayer, Layer, LayerOverrides, Playback, Speed, TextLayer};
pub use crate::scene::model::{Scene, SceneBuilder, SceneLayer};

pub use crate::script::cast::{CastAssignment, LEAD_ROLES, SUPPORTING_ROLES, rank_participants};
pub use crate::script::expand::{Expander, ExpanderOpts, StageLayout, Timeline, TimelineStep};
pub use crate::script::model::{
    Action, Character, Location, LocationBlock, SceneScript, StageDirection,
};
pub use crate::script::wrap::{DEFAULT_WRAP_WIDTH, wrap_dialogue};

pub use crate::audio::bank::{BLIP_GAP_SECS, DIALOGUE_GAIN_DB, SoundBank, SoundClip};
pub use crate::audio::events::{MusicSlice, SoundEvent, music_slices, total_event_frames};
pub use crate::audio::mix::frame_to_sample;

pub use crate::encode::ffmpeg::{
    FfmpegSink, FfmpegSinkOpts, encode_audio_file, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::pipeline::{
    RenderJobOpts, RenderStats, render_audio, render_frame, render_job, render_video,
};
