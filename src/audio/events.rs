use serde::{Deserialize, Serialize};

use crate::script::model::Character;

/// One duration-bearing unit of the sound timeline.
///
/// Every variant except [`SoundEvent::MusicCue`] covers exactly `length` video frames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoundEvent {
    /// Nothing but music.
    Silence {
        /// Frames covered.
        length: u64,
    },
    /// Dialogue blips while text types out.
    Blip {
        /// Frames covered.
        length: u64,
    },
    /// Stage-shake impact.
    Shock {
        /// Frames covered.
        length: u64,
    },
    /// Objection stinger of the given character (generic when `None`).
    Objection {
        /// Frames covered.
        length: u64,
        /// Speaker, if any.
        character: Option<Character>,
    },
    /// Start of a background music track; takes no timeline frames.
    MusicCue {
        /// Track name resolved through the sound catalog.
        track: String,
    },
}

impl SoundEvent {
    /// Frames covered, or `None` for music cues.
    pub fn frames(&self) -> Option<u64> {
        match self {
            SoundEvent::Silence { length }
            | SoundEvent::Blip { length }
            | SoundEvent::Shock { length }
            | SoundEvent::Objection { length, .. } => Some(*length),
            SoundEvent::MusicCue { .. } => None,
        }
    }
}

/// Sum of frames covered by all non-cue events.
pub fn total_event_frames(events: &[SoundEvent]) -> u64 {
    events.iter().filter_map(SoundEvent::frames).sum()
}

/// One music slice: the track started by a cue and the frame span it plays for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MusicSlice {
    /// Track name.
    pub track: String,
    /// First timeline frame of the slice.
    pub start_frame: u64,
    /// Frames until the next cue or the end of the timeline.
    pub frames: u64,
}

/// Split the timeline into music slices, one per cue.
///
/// The first slice starts at frame 0 and also covers the frames before its cue.
pub fn music_slices(events: &[SoundEvent]) -> Vec<MusicSlice> {
    let mut slices: Vec<MusicSlice> = Vec::new();
    let mut cursor = 0u64;
    for ev in events {
        match ev {
            SoundEvent::MusicCue { track } => {
                let (start_frame, frames) = if slices.is_empty() {
                    (0, cursor)
                } else {
                    (cursor, 0)
                };
                slices.push(MusicSlice {
                    track: track.clone(),
                    start_frame,
                    frames,
                });
            }
            other => {
                let n = other.frames().unwrap_or(0);
                cursor += n;
                if let Some(last) = slices.last_mut() {
                    last.frames += n;
                }
            }
        }
    }
    slices
}

#[cfg(test)]
#[path = "../../tests/unit/audio/events.rs"]
mod tests;
