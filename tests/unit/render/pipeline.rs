use super::*;
use crate::assets::source::MemoryAssetSource;
use crate::audio::bank::SoundClip;
use crate::encode::sink::InMemorySink;
use crate::script::model::{Action, Character, Location, LocationBlock, StageDirection};
use image::{ImageFormat, Rgba};

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    RgbaImage::from_pixel(w, h, Rgba(px))
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

// Transparent except for the bottom third, like the real dialogue box overlay.
fn textbox() -> Vec<u8> {
    let img = RgbaImage::from_fn(32, 24, |_, y| {
        if y >= 16 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn timeline() -> Timeline {
    let catalog = AssetCatalog {
        font: None,
        ..AssetCatalog::standard()
    };
    let mut src = MemoryAssetSource::new();
    src.insert("judgestand.png", png(64, 48, [30, 30, 30, 255]));
    src.insert("textbox4.png", textbox());
    src.insert("arrow.png", png(4, 4, [255, 255, 255, 255]));
    src.insert("objection.gif", png(16, 8, [255, 0, 0, 255]));
    src.insert("Sprites-judge/judge-normal(a).gif", png(16, 16, [0, 200, 0, 255]));
    src.insert("Sprites-judge/judge-normal(b).gif", png(16, 16, [0, 0, 200, 255]));

    let script = SceneScript {
        blocks: vec![LocationBlock {
            location: Location::JudgeStand,
            audio: Some("trial".into()),
            scene: vec![
                StageDirection {
                    character: Some(Character::Judge),
                    action: Some(Action::Text),
                    text: Some("Order!".into()),
                    ..StageDirection::default()
                },
                StageDirection {
                    action: Some(Action::Objection),
                    ..StageDirection::default()
                },
            ],
        }],
    };
    let mut exp = Expander::new(&catalog, &src, ExpanderOpts::default()).unwrap();
    exp.expand(&script).unwrap()
}

fn bank() -> SoundBank {
    let clip = |frames: usize, v: f32| SoundClip::from_interleaved(vec![v; frames * 2]).unwrap();
    SoundBank::new(clip(480, 0.2), clip(240, 0.3), clip(2_000, 0.4), clip(2_000, 0.5))
        .with_music("trial", clip(48_000 * 10, 0.05))
}

#[test]
fn video_pushes_every_frame_in_order() {
    let tl = timeline();
    let mut sink = InMemorySink::new();
    let mut rng = StdRng::seed_from_u64(0);
    let pushed = render_video(&tl, &mut sink, Fps::default(), &mut rng).unwrap();

    // "Order! " reveals for 6 frames, holds 25, then the objection takes 22.
    assert_eq!(pushed, 6 + 25 + 22);
    assert_eq!(sink.frames().len() as u64, pushed);
    assert!(sink.is_finished());
    assert_eq!(
        sink.config(),
        Some(SinkConfig {
            width: 64,
            height: 48,
            fps: Fps::default()
        })
    );
    for (i, (idx, frame)) in sink.frames().iter().enumerate() {
        assert_eq!(*idx, FrameIndex(i as u64));
        assert_eq!(frame.dimensions(), (64, 48));
    }
}

#[test]
fn talking_and_idle_sprites_alternate_with_the_step() {
    let tl = timeline();
    let mut rng = StdRng::seed_from_u64(0);
    // Sprite sits at the origin of the background.
    let talking = render_frame(&tl, FrameIndex(0), &mut rng).unwrap();
    let idle = render_frame(&tl, FrameIndex(10), &mut rng).unwrap();
    assert_eq!(talking.get_pixel(8, 8), &Rgba([0, 0, 200, 255]));
    assert_eq!(idle.get_pixel(8, 8), &Rgba([0, 200, 0, 255]));
    assert!(render_frame(&tl, FrameIndex(53), &mut rng).is_err());
}

#[test]
fn rendering_without_jitter_is_deterministic() {
    let tl = timeline();
    let mut a = InMemorySink::new();
    let mut b = InMemorySink::new();
    render_video(&tl, &mut a, Fps::default(), &mut StdRng::seed_from_u64(1)).unwrap();
    render_video(&tl, &mut b, Fps::default(), &mut StdRng::seed_from_u64(2)).unwrap();
    // Frames 0..31 contain no shaking layers.
    for i in 0..31 {
        assert_eq!(a.frames()[i].1, b.frames()[i].1);
    }
}

#[test]
fn audio_is_exactly_as_long_as_video() {
    let tl = timeline();
    let fps = Fps::default();
    let pcm = render_audio(&tl, &bank(), fps).unwrap();
    assert_eq!(pcm.sample_rate, MIX_SAMPLE_RATE);
    assert_eq!(pcm.channels, MIX_CHANNELS);
    assert_eq!(
        pcm.frames() as u64,
        frame_to_sample(tl.total_frames(), fps, MIX_SAMPLE_RATE)
    );
    assert!((pcm.duration_secs() - fps.frames_to_secs(tl.total_frames())).abs() < 1.0 / 48_000.0);
}

#[test]
fn audio_needs_every_cued_track() {
    let tl = timeline();
    let clip = |v: f32| SoundClip::from_interleaved(vec![v; 20]).unwrap();
    let no_music = SoundBank::new(clip(0.1), clip(0.1), clip(0.1), clip(0.1));
    assert!(render_audio(&tl, &no_music, Fps::default()).is_err());
}

#[test]
fn empty_timeline_cannot_be_rendered() {
    let mut sink = InMemorySink::new();
    let mut rng = StdRng::seed_from_u64(0);
    let err = render_video(&Timeline::default(), &mut sink, Fps::default(), &mut rng).unwrap_err();
    assert!(matches!(err, TurnaboutError::Validation(_)));
}
