use super::*;

#[test]
fn reveal_shows_prefix_of_local_length() {
    let layer = TextLayer::new("Objection! ", None, 15.0).with_reveal(true);
    assert_eq!(layer.visible_text(FrameIndex(0), LayerOverrides::NONE), "");
    assert_eq!(layer.visible_text(FrameIndex(3), LayerOverrides::NONE), "Obj");
    assert_eq!(
        layer.visible_text(FrameIndex(500), LayerOverrides::NONE),
        "Objection! "
    );
}

#[test]
fn full_text_override_disables_reveal() {
    let layer = TextLayer::new("Hold it! ", None, 15.0).with_reveal(true);
    assert!(layer.reveals());
    assert_eq!(
        layer.visible_text(FrameIndex(1), LayerOverrides::FULL_TEXT),
        "Hold it! "
    );
}

#[test]
fn reveal_counts_characters_not_bytes() {
    let layer = TextLayer::new("héllo", None, 15.0).with_reveal(true);
    assert_eq!(layer.char_count(), 5);
    assert_eq!(layer.visible_text(FrameIndex(2), LayerOverrides::NONE), "hé");
}

#[test]
fn colour_defaults_to_white() {
    let layer = TextLayer::new("x", None, 12.0);
    assert_eq!(layer.colour(), DEFAULT_TEXT_COLOUR);
    let red = layer.with_colour(Some(Rgba([255, 0, 0, 255])));
    assert_eq!(red.colour(), Rgba([255, 0, 0, 255]));
}

#[test]
fn without_font_nothing_is_drawn() {
    let layer = TextLayer::new("Take that!", None, 15.0).at(Position::new(1, 1));
    let mut canvas = RgbaImage::new(8, 8);
    layer.render_onto(&mut canvas, FrameIndex(5), LayerOverrides::NONE);
    assert!(canvas.pixels().all(|p| p[3] == 0));
    assert_eq!(layer.text(), "Take that!");
}

const MONO: &[u8] = include_bytes!("../../data/DejaVuSansMono.ttf");

fn typed(text: &str) -> TextLayer {
    let font = FontFace::from_bytes(MONO.to_vec()).unwrap();
    TextLayer::new(text, Some(font), 15.0)
        .at(Position::new(4, 4))
        .with_reveal(true)
}

fn draw(layer: &TextLayer, local: u64, overrides: LayerOverrides) -> RgbaImage {
    let mut canvas = RgbaImage::new(160, 32);
    layer.render_onto(&mut canvas, FrameIndex(local), overrides);
    canvas
}

fn ink(canvas: &RgbaImage) -> usize {
    canvas.pixels().filter(|p| p[3] > 0).count()
}

#[test]
fn reveal_frames_draw_growing_prefixes() {
    let layer = typed("Take that!");
    assert_eq!(ink(&draw(&layer, 0, LayerOverrides::NONE)), 0);

    let one = draw(&layer, 1, LayerOverrides::NONE);
    let five = draw(&layer, 5, LayerOverrides::NONE);
    assert_ne!(one, five);
    assert!(ink(&five) > ink(&one));
    let mut first_glyph = one.enumerate_pixels().filter(|(_, _, p)| p[3] > 0);
    assert!(first_glyph.all(|(x, y, _)| five.get_pixel(x, y)[3] > 0));
}

#[test]
fn hold_frame_adds_the_remaining_glyphs_to_the_last_reveal() {
    let text = "Hold it! ";
    let layer = typed(text);
    let reveal_len = layer.char_count() as u64 - 1;

    let last_reveal = draw(&layer, reveal_len - 1, LayerOverrides::NONE);
    let hold = draw(&layer, 0, LayerOverrides::FULL_TEXT);
    assert!(ink(&hold) > ink(&last_reveal));
    for (x, y, p) in last_reveal.enumerate_pixels() {
        assert!(hold.get_pixel(x, y)[3] >= p[3]);
    }

    // Once every character is typed the reveal matches the held text exactly.
    assert_eq!(draw(&layer, layer.char_count() as u64, LayerOverrides::NONE), hold);
}

#[test]
fn colour_override_tints_the_glyphs() {
    let layer = typed("MW").with_colour(Some(Rgba([0, 0, 255, 255])));
    let canvas = draw(&layer, 0, LayerOverrides::FULL_TEXT);
    assert!(ink(&canvas) > 0);
    let mut inked = canvas.pixels().filter(|p| p[3] > 0);
    assert!(inked.all(|p| (p[0], p[1], p[2]) == (0, 0, 255)));
}
