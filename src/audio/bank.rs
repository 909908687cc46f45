use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assets::catalog::SoundAssets;
use crate::assets::media::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::assets::source::FsAssetSource;
use crate::audio::events::SoundEvent;
use crate::foundation::error::{TurnaboutError, TurnaboutResult};
use crate::script::model::Character;

/// Silence appended after every dialogue blip before it repeats.
pub const BLIP_GAP_SECS: f64 = 0.05;

/// Attenuation applied to the blink cue and the blip pattern.
pub const DIALOGUE_GAIN_DB: f32 = -10.0;

/// Pre-decoded clip at the mix rate and layout.
#[derive(Clone, Debug)]
pub struct SoundClip {
    samples: Arc<Vec<f32>>,
    gain: f32,
}

impl SoundClip {
    /// Wrap decoded PCM. The PCM must already be at the mix rate and channel count.
    pub fn from_pcm(pcm: AudioPcm) -> TurnaboutResult<Self> {
        if pcm.sample_rate != MIX_SAMPLE_RATE || pcm.channels != MIX_CHANNELS {
            return Err(TurnaboutError::validation(format!(
                "sound clip must be {MIX_SAMPLE_RATE} Hz / {MIX_CHANNELS} ch, got {} Hz / {} ch",
                pcm.sample_rate, pcm.channels
            )));
        }
        Ok(Self {
            samples: Arc::new(pcm.interleaved_f32),
            gain: 1.0,
        })
    }

    /// Interleaved stereo samples at [`MIX_SAMPLE_RATE`].
    pub fn from_interleaved(samples: Vec<f32>) -> TurnaboutResult<Self> {
        Self::from_pcm(AudioPcm {
            sample_rate: MIX_SAMPLE_RATE,
            channels: MIX_CHANNELS,
            interleaved_f32: samples,
        })
    }

    /// Adjust playback gain by `db` decibels.
    pub fn with_gain_db(mut self, db: f32) -> Self {
        self.gain *= 10f32.powf(db / 20.0);
        self
    }

    /// Append `secs` of silence.
    pub fn with_trailing_silence(self, secs: f64) -> Self {
        let pad = (secs * f64::from(MIX_SAMPLE_RATE)).round() as usize * usize::from(MIX_CHANNELS);
        let mut samples = self.samples.as_ref().clone();
        samples.resize(samples.len() + pad, 0.0);
        Self {
            samples: Arc::new(samples),
            gain: self.gain,
        }
    }

    /// Sample frames in the clip.
    pub fn frames(&self) -> u64 {
        (self.samples.len() / usize::from(MIX_CHANNELS)) as u64
    }

    /// Linear playback gain.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub(crate) fn samples(&self) -> &Arc<Vec<f32>> {
        &self.samples
    }
}

/// All clips one job needs, decoded up front.
#[derive(Clone, Debug)]
pub struct SoundBank {
    blink: SoundClip,
    blip_pattern: SoundClip,
    shock: SoundClip,
    default_objection: SoundClip,
    objections: BTreeMap<Character, SoundClip>,
    music: BTreeMap<String, SoundClip>,
}

impl SoundBank {
    /// Assemble a bank from raw clips.
    ///
    /// The blip gets its repeat gap, and both blip and blink are attenuated by
    /// [`DIALOGUE_GAIN_DB`].
    pub fn new(
        blip: SoundClip,
        blink: SoundClip,
        shock: SoundClip,
        default_objection: SoundClip,
    ) -> Self {
        Self {
            blink: blink.with_gain_db(DIALOGUE_GAIN_DB),
            blip_pattern: blip
                .with_trailing_silence(BLIP_GAP_SECS)
                .with_gain_db(DIALOGUE_GAIN_DB),
            shock,
            default_objection,
            objections: BTreeMap::new(),
            music: BTreeMap::new(),
        }
    }

    /// Register a character-specific objection stinger.
    pub fn with_objection(mut self, character: Character, clip: SoundClip) -> Self {
        self.objections.insert(character, clip);
        self
    }

    /// Register a music track.
    pub fn with_music(mut self, track: impl Into<String>, clip: SoundClip) -> Self {
        self.music.insert(track.into(), clip);
        self
    }

    /// Decode every effect in `sounds` and each music track cued by `events` with `ffmpeg`.
    #[tracing::instrument(skip(source, sounds, events))]
    pub fn load(
        source: &FsAssetSource,
        sounds: &SoundAssets,
        events: &[SoundEvent],
    ) -> TurnaboutResult<Self> {
        let decode = |path: &std::path::Path| -> TurnaboutResult<SoundClip> {
            let full = source.resolve(path);
            SoundClip::from_pcm(decode_audio_f32_stereo(&full, MIX_SAMPLE_RATE)?)
        };

        let mut bank = Self::new(
            decode(&sounds.blip)?,
            decode(&sounds.blink)?,
            decode(&sounds.shock)?,
            decode(&sounds.default_objection)?,
        );
        for (character, path) in &sounds.objections {
            bank = bank.with_objection(*character, decode(path)?);
        }
        for ev in events {
            if let SoundEvent::MusicCue { track } = ev
                && !bank.music.contains_key(track)
            {
                let clip = decode(&sounds.music_track(track))?;
                tracing::debug!(track, frames = clip.frames(), "decoded music track");
                bank.music.insert(track.clone(), clip);
            }
        }
        Ok(bank)
    }

    pub(crate) fn blink(&self) -> &SoundClip {
        &self.blink
    }

    pub(crate) fn blip_pattern(&self) -> &SoundClip {
        &self.blip_pattern
    }

    pub(crate) fn shock(&self) -> &SoundClip {
        &self.shock
    }

    /// Stinger for `character`, falling back to the generic one.
    pub(crate) fn objection_for(&self, character: Option<Character>) -> &SoundClip {
        character
            .and_then(|c| self.objections.get(&c))
            .unwrap_or(&self.default_objection)
    }

    pub(crate) fn music(&self, track: &str) -> TurnaboutResult<&SoundClip> {
        self.music
            .get(track)
            .ok_or_else(|| TurnaboutError::asset(format!("music track '{track}' is not loaded")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/bank.rs"]
mod tests;
