use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(18, 0).is_err());
    assert_eq!(Fps::whole(18).unwrap(), Fps { num: 18, den: 1 });
}

#[test]
fn default_fps_is_eighteen() {
    assert_eq!(Fps::default().as_f64(), 18.0);
}

#[test]
fn frames_to_secs_uses_rational_rate() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(30000);
    assert!((secs - 1001.0).abs() < 1e-9);
    assert!((Fps::whole(18).unwrap().frames_to_secs(100) - 100.0 / 18.0).abs() < 1e-12);
}

#[test]
fn frame_index_offset_saturates() {
    assert_eq!(FrameIndex(10).offset(5), FrameIndex(15));
    assert_eq!(FrameIndex(u64::MAX - 1).offset(5), FrameIndex(u64::MAX));
}

#[test]
fn position_nudge_moves_both_axes() {
    let p = Position::new(4, 113).nudged(-1, 1);
    assert_eq!(p, Position::new(3, 114));
}
