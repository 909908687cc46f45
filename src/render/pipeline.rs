use std::path::{Path, PathBuf};

use image::RgbaImage;
use rand::RngCore;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::assets::catalog::AssetCatalog;
use crate::assets::media::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE};
use crate::assets::source::FsAssetSource;
use crate::audio::bank::SoundBank;
use crate::audio::manifest::build_audio_manifest;
use crate::audio::mix::{frame_to_sample, mix_manifest, write_mix_to_f32le_file};
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, encode_audio_file, is_ffmpeg_on_path};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TurnaboutError, TurnaboutResult};
use crate::script::expand::{Expander, ExpanderOpts, Timeline};
use crate::script::model::SceneScript;

/// Render one global frame of `timeline`.
pub fn render_frame(
    timeline: &Timeline,
    frame: FrameIndex,
    rng: &mut dyn RngCore,
) -> TurnaboutResult<RgbaImage> {
    let (scene, local) = timeline.scene_at(frame).ok_or_else(|| {
        TurnaboutError::validation(format!(
            "frame {} is outside the timeline ({} frames)",
            frame.0,
            timeline.total_frames()
        ))
    })?;
    scene.render_frame(local, rng)
}

/// Render every scene in order into `sink`. Returns the number of frames pushed.
#[tracing::instrument(skip(timeline, sink, rng), fields(frames = timeline.total_frames()))]
pub fn render_video(
    timeline: &Timeline,
    sink: &mut dyn FrameSink,
    fps: Fps,
    rng: &mut dyn RngCore,
) -> TurnaboutResult<u64> {
    let (width, height) = timeline
        .frame_size()
        .ok_or_else(|| TurnaboutError::validation("timeline has no scenes to render"))?;

    sink.begin(SinkConfig { width, height, fps })?;
    let mut pushed = 0u64;
    for scene in timeline.scenes() {
        for local in 0..scene.len_frames() {
            let frame = scene.render_frame(local, rng)?;
            if frame.dimensions() != (width, height) {
                return Err(TurnaboutError::validation(format!(
                    "scene at frame {} renders {}x{}, expected {width}x{height}",
                    scene.start_offset().0,
                    frame.width(),
                    frame.height()
                )));
            }
            sink.push_frame(scene.start_offset().offset(local), &frame)?;
            pushed += 1;
        }
    }
    sink.end()?;

    if pushed != timeline.total_frames() {
        return Err(TurnaboutError::timing(format!(
            "pushed {pushed} frames but the timeline covers {}",
            timeline.total_frames()
        )));
    }
    tracing::info!(frames = pushed, "video rendered");
    Ok(pushed)
}

/// Mix the sound timeline of `timeline` into stereo PCM of exactly the video duration.
#[tracing::instrument(skip(timeline, bank), fields(frames = timeline.total_frames()))]
pub fn render_audio(timeline: &Timeline, bank: &SoundBank, fps: Fps) -> TurnaboutResult<AudioPcm> {
    timeline.verify_sync()?;
    let manifest = build_audio_manifest(&timeline.sound_events(), bank, fps)?;

    let expected = frame_to_sample(timeline.total_frames(), fps, manifest.sample_rate);
    if manifest.total_samples != expected {
        return Err(TurnaboutError::timing(format!(
            "audio covers {} samples but the video needs {expected}",
            manifest.total_samples
        )));
    }

    let pcm = AudioPcm {
        sample_rate: manifest.sample_rate,
        channels: manifest.channels,
        interleaved_f32: mix_manifest(&manifest),
    };
    tracing::info!(
        samples = manifest.total_samples,
        segments = manifest.segments.len(),
        "audio mixed"
    );
    Ok(pcm)
}

/// Options for [`render_job`].
#[derive(Clone, Debug)]
pub struct RenderJobOpts {
    /// Output frame rate.
    pub fps: Fps,
    /// Seed for shake jitter.
    pub seed: u64,
    /// Overwrite existing outputs.
    pub overwrite: bool,
    /// Background colour the video is flattened onto (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Expansion knobs.
    pub expander: ExpanderOpts,
}

impl Default for RenderJobOpts {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            seed: 0,
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            expander: ExpanderOpts::default(),
        }
    }
}

/// Summary of a finished [`render_job`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    /// Scenes rendered.
    pub scenes: usize,
    /// Video frames encoded.
    pub frames: u64,
    /// Stereo sample frames encoded.
    pub audio_samples: u64,
    /// Output duration.
    pub duration_secs: f64,
}

/// Expand `script`, then encode a silent video to `video_out` and its soundtrack to `audio_out`.
///
/// Asset paths in `catalog` are resolved against `assets_root`. Requires `ffmpeg` on `PATH`.
#[tracing::instrument(
    skip(script, catalog, opts),
    fields(video = %video_out.display(), audio = %audio_out.display())
)]
pub fn render_job(
    script: &SceneScript,
    catalog: &AssetCatalog,
    assets_root: &Path,
    video_out: &Path,
    audio_out: &Path,
    opts: &RenderJobOpts,
) -> TurnaboutResult<RenderStats> {
    if !is_ffmpeg_on_path() {
        return Err(TurnaboutError::encode(
            "ffmpeg is required for rendering, but was not found on PATH",
        ));
    }

    let source = FsAssetSource::new(assets_root);
    let mut expander = Expander::new(catalog, &source, opts.expander.clone())?;
    let timeline = expander.expand(script)?;
    let bank = SoundBank::load(&source, &catalog.sounds, &timeline.sound_events())?;

    let pcm = render_audio(&timeline, &bank, opts.fps)?;

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: video_out.to_path_buf(),
        overwrite: opts.overwrite,
        bg_rgba: opts.bg_rgba,
    });
    let frames = render_video(&timeline, &mut sink, opts.fps, &mut rng)?;

    let mix_path = std::env::temp_dir().join(format!(
        "turnabout_audio_mix_{}_{}.f32le",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ));
    let _mix_tmp = TempFileGuard(mix_path.clone());
    write_mix_to_f32le_file(&pcm.interleaved_f32, &mix_path)?;
    encode_audio_file(&mix_path, MIX_SAMPLE_RATE, MIX_CHANNELS, audio_out, opts.overwrite)?;

    let stats = RenderStats {
        scenes: timeline.scenes().len(),
        frames,
        audio_samples: pcm.frames() as u64,
        duration_secs: opts.fps.frames_to_secs(frames),
    };
    tracing::info!(?stats, "render job finished");
    Ok(stats)
}

struct TempFileGuard(PathBuf);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
