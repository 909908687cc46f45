use super::*;
use crate::layer::{ImageLayer, Playback, TextLayer};
use image::Rgba;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

fn grey_sequence(n: u8) -> Layer {
    let frames = (0..n)
        .map(|i| RgbaImage::from_pixel(2, 2, Rgba([i * 10, i * 10, i * 10, 255])))
        .collect();
    ImageLayer::from_frames("seq", frames).unwrap().into()
}

fn text() -> Layer {
    TextLayer::new("abc ", None, 15.0).with_reveal(true).into()
}

#[test]
fn zero_length_is_rejected() {
    let err = Scene::builder()
        .layer(&grey_sequence(1))
        .build(0, FrameIndex(0))
        .unwrap_err();
    assert!(matches!(err, TurnaboutError::Validation(_)));
}

#[test]
fn empty_stack_is_rejected() {
    assert!(Scene::builder().build(5, FrameIndex(0)).is_err());
}

#[test]
fn text_cannot_be_the_bottom_layer() {
    assert!(Scene::builder().layer(&text()).build(5, FrameIndex(0)).is_err());
}

#[test]
fn non_text_layers_follow_the_global_clock() {
    let mut rng = StdRng::seed_from_u64(0);
    let scene = Scene::builder()
        .layer(&grey_sequence(4))
        .build(3, FrameIndex(2))
        .unwrap();

    let frames = scene.render_frames(&mut rng).unwrap();
    let shades: Vec<u8> = frames.iter().map(|f| f.get_pixel(0, 0)[0]).collect();
    // Global frames 2, 3, 4 -> sequence slots 2, 3, 0.
    assert_eq!(shades, vec![20, 30, 0]);
}

#[test]
fn overrides_apply_only_inside_the_scene() {
    let mut rng = StdRng::seed_from_u64(0);
    let seq = grey_sequence(2);
    let clamped = Scene::builder()
        .layer_with(&seq, LayerOverrides::playback(Playback::Clamp))
        .build(2, FrameIndex(10))
        .unwrap();
    let looping = Scene::builder().layer(&seq).build(2, FrameIndex(10)).unwrap();

    let clamped_shades: Vec<u8> = clamped
        .render_frames(&mut rng)
        .unwrap()
        .iter()
        .map(|f| f.get_pixel(0, 0)[0])
        .collect();
    let looping_shades: Vec<u8> = looping
        .render_frames(&mut rng)
        .unwrap()
        .iter()
        .map(|f| f.get_pixel(0, 0)[0])
        .collect();
    assert_eq!(clamped_shades, vec![10, 10]);
    assert_eq!(looping_shades, vec![0, 10]);
}

#[test]
fn canvas_bottom_is_copied() {
    let mut rng = StdRng::seed_from_u64(0);
    let base = Arc::new(RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 255])));
    let scene = Scene::builder()
        .layer(&Layer::Canvas(base))
        .layer(&text())
        .build(1, FrameIndex(0))
        .unwrap();
    let frame = scene.render_frame(0, &mut rng).unwrap();
    assert_eq!(frame.get_pixel(1, 1), &Rgba([1, 2, 3, 255]));
}

#[test]
fn render_frame_out_of_bounds_is_error() {
    let mut rng = StdRng::seed_from_u64(0);
    let scene = Scene::builder()
        .layer(&grey_sequence(1))
        .build(2, FrameIndex(0))
        .unwrap();
    assert!(scene.render_frame(2, &mut rng).is_err());
    assert_eq!(scene.render_frames(&mut rng).unwrap().len(), 2);
}

#[test]
fn maybe_skips_absent_layers() {
    let scene = Scene::builder()
        .layer(&grey_sequence(1))
        .maybe(None, LayerOverrides::SHAKE)
        .maybe(Some(&text()), LayerOverrides::FULL_TEXT)
        .build(4, FrameIndex(7))
        .unwrap();
    assert_eq!(scene.layers().len(), 2);
    assert_eq!(scene.layers()[1].overrides, LayerOverrides::FULL_TEXT);
    assert_eq!(scene.len_frames(), 4);
    assert_eq!(scene.start_offset(), FrameIndex(7));
}
