use std::path::Path;

use crate::audio::manifest::{AudioManifest, AudioSegment};
use crate::foundation::core::Fps;
use crate::foundation::error::{TurnaboutError, TurnaboutResult};

/// Mix all manifest segments into interleaved output PCM.
///
/// Segments overlay each other (sum, then clamp to `[-1, 1]`).
pub(crate) fn mix_manifest(manifest: &AudioManifest) -> Vec<f32> {
    let frames = manifest.total_samples as usize;
    let mut out = vec![0.0f32; frames * usize::from(manifest.channels)];

    for seg in &manifest.segments {
        mix_segment(&mut out, manifest, seg);
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

fn mix_segment(out: &mut [f32], manifest: &AudioManifest, seg: &AudioSegment) {
    let channels = usize::from(manifest.channels);
    let src = seg.source_interleaved_f32.as_ref();
    let src_frames = src.len() / channels;
    if src_frames == 0 {
        return;
    }

    let end = seg.timeline_end_sample.min(manifest.total_samples);
    for dst_sample in seg.timeline_start_sample..end {
        let mut src_frame = (dst_sample - seg.timeline_start_sample) as usize;
        if src_frame >= src_frames {
            if !seg.looped {
                break;
            }
            src_frame %= src_frames;
        }

        let dst_idx = dst_sample as usize * channels;
        let src_idx = src_frame * channels;
        for c in 0..channels {
            out[dst_idx + c] += src[src_idx + c] * seg.volume;
        }
    }
}

/// Write interleaved `f32` PCM samples to raw little-endian `.f32le` file.
pub(crate) fn write_mix_to_f32le_file(
    samples_interleaved: &[f32],
    out_path: &Path,
) -> TurnaboutResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            TurnaboutError::encode(format!(
                "failed to create audio mix output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        TurnaboutError::encode(format!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

/// Convert a frame count to the nearest sample index at `sample_rate`.
pub fn frame_to_sample(frame_delta: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frame_delta) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
