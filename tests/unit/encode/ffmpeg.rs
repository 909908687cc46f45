use super::*;
use crate::encode::sink::InMemorySink;

#[test]
fn flatten_alpha_0_returns_bg() {
    let src = vec![200u8, 100, 50, 0];
    let mut dst = vec![0u8; 4];
    flatten_straight_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_straight_over_bg(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_straight_half_alpha_over_black() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_straight_over_bg(&mut dst, &src, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_straight_over_bg(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn sink_rejects_odd_dimensions_before_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("out.mp4")));
    let err = sink
        .begin(SinkConfig {
            width: 255,
            height: 192,
            fps: Fps::default(),
        })
        .unwrap_err();
    assert!(matches!(err, TurnaboutError::Validation(_)));
}

#[test]
fn sink_refuses_to_clobber_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.mp4");
    std::fs::write(&out, b"keep").unwrap();

    let mut opts = FfmpegSinkOpts::new(&out);
    opts.overwrite = false;
    let mut sink = FfmpegSink::new(opts);
    let err = sink
        .begin(SinkConfig {
            width: 256,
            height: 192,
            fps: Fps::default(),
        })
        .unwrap_err();
    assert!(matches!(err, TurnaboutError::Validation(_)));
    assert_eq!(std::fs::read(&out).unwrap(), b"keep");
}

#[test]
fn push_before_begin_is_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let frame = RgbaImage::new(2, 2);
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}

#[test]
fn in_memory_sink_records_frames() {
    let mut sink = InMemorySink::new();
    let cfg = SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::default(),
    };
    sink.begin(cfg).unwrap();
    sink.push_frame(FrameIndex(0), &RgbaImage::new(2, 2)).unwrap();
    sink.push_frame(FrameIndex(1), &RgbaImage::new(2, 2)).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.config(), Some(cfg));
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.frames()[1].0, FrameIndex(1));
    assert!(sink.is_finished());
}

#[test]
fn encodes_audio_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let pcm = dir.path().join("mix.f32le");
    let samples: Vec<u8> = (0..48_000 * 2)
        .flat_map(|i| ((i as f32 * 0.01).sin() * 0.1).to_le_bytes())
        .collect();
    std::fs::write(&pcm, samples).unwrap();

    let out = dir.path().join("out/mix.wav");
    encode_audio_file(&pcm, 48_000, 2, &out, true).unwrap();
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}
