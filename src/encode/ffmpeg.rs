use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use image::RgbaImage;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TurnaboutError, TurnaboutResult};
use crate::foundation::math::mul_div255_u16;

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background colour used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
///
/// The output is a silent H.264 MP4; audio is encoded separately by [`encode_audio_file`].
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> TurnaboutResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(TurnaboutError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(TurnaboutError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(TurnaboutError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(TurnaboutError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(TurnaboutError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args([
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            TurnaboutError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TurnaboutError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let stderr_drain = spawn_stderr_drain(&mut child)?;

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "ffmpeg video sink started"
        );
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &RgbaImage) -> TurnaboutResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TurnaboutError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(TurnaboutError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width() != cfg.width || frame.height() != cfg.height {
            return Err(TurnaboutError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }

        flatten_straight_over_bg(&mut self.scratch, frame.as_raw(), self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(TurnaboutError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            TurnaboutError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> TurnaboutResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| TurnaboutError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            TurnaboutError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = join_stderr_drain(self.stderr_drain.take())?;
        check_exit(status, &stderr_bytes)?;

        self.cfg = None;
        Ok(())
    }
}

/// Transcode raw interleaved `f32le` PCM at `pcm_path` into `out_path`.
///
/// The codec follows the output extension.
pub fn encode_audio_file(
    pcm_path: &Path,
    sample_rate: u32,
    channels: u16,
    out_path: &Path,
    overwrite: bool,
) -> TurnaboutResult<()> {
    if sample_rate == 0 || channels == 0 {
        return Err(TurnaboutError::validation(
            "audio sample_rate and channels must be non-zero",
        ));
    }
    ensure_parent_dir(out_path)?;
    if !overwrite && out_path.exists() {
        return Err(TurnaboutError::validation(format!(
            "output file '{}' already exists",
            out_path.display()
        )));
    }
    if !is_ffmpeg_on_path() {
        return Err(TurnaboutError::encode(
            "ffmpeg is required for audio encoding, but was not found on PATH",
        ));
    }

    let output = Command::new("ffmpeg")
        .arg(if overwrite { "-y" } else { "-n" })
        .args([
            "-loglevel",
            "error",
            "-f",
            "f32le",
            "-ar",
            &sample_rate.to_string(),
            "-ac",
            &channels.to_string(),
            "-i",
        ])
        .arg(pcm_path)
        .arg(out_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| TurnaboutError::encode(format!("failed to spawn ffmpeg: {e}")))?;
    check_exit(output.status, &output.stderr)?;
    tracing::debug!(out = %out_path.display(), "ffmpeg audio encoded");
    Ok(())
}

fn spawn_stderr_drain(
    child: &mut Child,
) -> TurnaboutResult<std::thread::JoinHandle<std::io::Result<Vec<u8>>>> {
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| TurnaboutError::encode("failed to open ffmpeg stderr (unexpected)"))?;
    Ok(std::thread::spawn(move || {
        let mut stderr_bytes = Vec::new();
        stderr.read_to_end(&mut stderr_bytes)?;
        Ok(stderr_bytes)
    }))
}

fn join_stderr_drain(
    handle: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
) -> TurnaboutResult<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| TurnaboutError::encode("ffmpeg stderr drain thread panicked"))?
            .map_err(|e| TurnaboutError::encode(format!("ffmpeg stderr read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

fn check_exit(status: std::process::ExitStatus, stderr: &[u8]) -> TurnaboutResult<()> {
    if status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(stderr);
    Err(TurnaboutError::encode(format!(
        "ffmpeg exited with status {}: {}",
        status,
        stderr.trim()
    )))
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // Rawvideo input rate goes before `-i`. Rational rates as `num/den`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_straight_over_bg(dst: &mut [u8], src: &[u8], bg_rgba: [u8; 4]) -> TurnaboutResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TurnaboutError::validation(
            "flatten_straight_over_bg expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = mul_div255_u16(u16::from(s[c]), a) + mul_div255_u16(bg[c], inv);
            d[c] = v.min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> TurnaboutResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
