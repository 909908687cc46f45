use std::sync::Arc;

use crate::assets::media::{MIX_CHANNELS, MIX_SAMPLE_RATE};
use crate::audio::bank::{SoundBank, SoundClip};
use crate::audio::events::{SoundEvent, music_slices, total_event_frames};
use crate::audio::mix::frame_to_sample;
use crate::foundation::core::Fps;
use crate::foundation::error::TurnaboutResult;

/// One scheduled clip in timeline sample space. Playback stops at `timeline_end_sample` or
/// when a non-looping source runs out, whichever comes first.
#[derive(Clone, Debug)]
pub(crate) struct AudioSegment {
    pub(crate) timeline_start_sample: u64,
    pub(crate) timeline_end_sample: u64,
    pub(crate) volume: f32,
    pub(crate) looped: bool,
    pub(crate) source_interleaved_f32: Arc<Vec<f32>>,
}

impl AudioSegment {
    fn from_clip(clip: &SoundClip, start: u64, end: u64, looped: bool) -> Self {
        Self {
            timeline_start_sample: start,
            timeline_end_sample: end,
            volume: clip.gain(),
            looped,
            source_interleaved_f32: Arc::clone(clip.samples()),
        }
    }
}

/// Audio rendering plan for a whole timeline.
#[derive(Clone, Debug)]
pub(crate) struct AudioManifest {
    pub(crate) sample_rate: u32,
    pub(crate) channels: u16,
    pub(crate) total_samples: u64,
    pub(crate) segments: Vec<AudioSegment>,
}

/// Schedule every sound event and music slice.
///
/// Segment boundaries come from cumulative frame counts, so the manifest is exactly as long as
/// the video and no event can drift relative to the frames it accompanies.
pub(crate) fn build_audio_manifest(
    events: &[SoundEvent],
    bank: &SoundBank,
    fps: Fps,
) -> TurnaboutResult<AudioManifest> {
    let sr = MIX_SAMPLE_RATE;
    let at = |frame: u64| frame_to_sample(frame, fps, sr);

    let mut segments = Vec::<AudioSegment>::new();

    for slice in music_slices(events) {
        if slice.frames == 0 {
            continue;
        }
        let clip = bank.music(&slice.track)?;
        segments.push(AudioSegment::from_clip(
            clip,
            at(slice.start_frame),
            at(slice.start_frame + slice.frames),
            false,
        ));
    }

    let mut cursor = 0u64;
    for ev in events {
        let Some(len) = ev.frames() else {
            continue;
        };
        let start = at(cursor);
        let end = at(cursor + len);
        cursor += len;

        match ev {
            SoundEvent::Silence { .. } | SoundEvent::MusicCue { .. } => {}
            SoundEvent::Blip { .. } => {
                let blink = bank.blink();
                let blink_end = (start + blink.frames()).min(end);
                segments.push(AudioSegment::from_clip(blink, start, blink_end, false));
                if blink_end < end {
                    segments.push(AudioSegment::from_clip(
                        bank.blip_pattern(),
                        blink_end,
                        end,
                        true,
                    ));
                }
            }
            SoundEvent::Shock { .. } => {
                segments.push(AudioSegment::from_clip(bank.shock(), start, end, false));
            }
            SoundEvent::Objection { character, .. } => {
                segments.push(AudioSegment::from_clip(
                    bank.objection_for(*character),
                    start,
                    end,
                    false,
                ));
            }
        }
    }

    Ok(AudioManifest {
        sample_rate: sr,
        channels: MIX_CHANNELS,
        total_samples: at(total_event_frames(events)),
        segments,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/manifest.rs"]
mod tests;
