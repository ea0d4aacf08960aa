use super::*;

const BLACK: [u8; 4] = [0, 0, 0, 255];
const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

#[test]
fn normal_opaque_replaces_covered_pixels_only() {
    let mut bg = FrameRGBA::solid(4, 4, BLACK);
    let fg = FrameRGBA::solid(2, 2, RED);
    alpha_composite(&mut bg, &fg, (1, 1), 1.0, BlendMode::Normal).unwrap();
    assert_eq!(bg.pixel(0, 0), Some(BLACK));
    assert_eq!(bg.pixel(1, 1), Some(RED));
    assert_eq!(bg.pixel(2, 2), Some(RED));
    assert_eq!(bg.pixel(3, 3), Some(BLACK));
}

#[test]
fn negative_offsets_are_clipped() {
    let mut bg = FrameRGBA::solid(4, 4, BLACK);
    let fg = FrameRGBA::solid(2, 2, RED);
    alpha_composite(&mut bg, &fg, (-1, -1), 1.0, BlendMode::Normal).unwrap();
    assert_eq!(bg.pixel(0, 0), Some(RED));
    assert_eq!(bg.pixel(1, 0), Some(BLACK));
    assert_eq!(bg.pixel(0, 1), Some(BLACK));
}

#[test]
fn fully_outside_placement_leaves_background_untouched() {
    let mut bg = FrameRGBA::solid(4, 4, BLACK);
    let before = bg.clone();
    let fg = FrameRGBA::solid(2, 2, RED);
    for pos in [(10, 10), (-5, -5), (4, 0), (0, -2)] {
        alpha_composite(&mut bg, &fg, pos, 1.0, BlendMode::Normal).unwrap();
    }
    assert_eq!(bg, before);
}

#[test]
fn zero_opacity_is_noop() {
    let mut bg = FrameRGBA::solid(2, 2, BLACK);
    let before = bg.clone();
    let fg = FrameRGBA::solid(2, 2, RED);
    alpha_composite(&mut bg, &fg, (0, 0), 0.0, BlendMode::Normal).unwrap();
    assert_eq!(bg, before);
}

#[test]
fn half_opacity_mixes_colors() {
    let mut bg = FrameRGBA::solid(1, 1, BLACK);
    let fg = FrameRGBA::solid(1, 1, [255, 255, 255, 255]);
    alpha_composite(&mut bg, &fg, (0, 0), 0.5, BlendMode::Normal).unwrap();
    let px = bg.pixel(0, 0).unwrap();
    assert_eq!(px[3], 255);
    assert!(px[0] > 120 && px[0] < 135);
}

#[test]
fn multiply_opaque_is_multiply() {
    let mut bg = FrameRGBA::solid(1, 1, [128, 128, 128, 255]);
    let fg = FrameRGBA::solid(1, 1, RED);
    alpha_composite(&mut bg, &fg, (0, 0), 1.0, BlendMode::Multiply).unwrap();
    assert_eq!(bg.pixel(0, 0), Some([128, 0, 0, 255]));
}

#[test]
fn normal_over_is_order_dependent() {
    let a = FrameRGBA::solid(2, 2, RED);
    let b = FrameRGBA::solid(2, 2, BLUE);

    let mut ab = FrameRGBA::transparent(2, 2);
    alpha_composite(&mut ab, &a, (0, 0), 1.0, BlendMode::Normal).unwrap();
    alpha_composite(&mut ab, &b, (0, 0), 1.0, BlendMode::Normal).unwrap();

    let mut ba = FrameRGBA::transparent(2, 2);
    alpha_composite(&mut ba, &b, (0, 0), 1.0, BlendMode::Normal).unwrap();
    alpha_composite(&mut ba, &a, (0, 0), 1.0, BlendMode::Normal).unwrap();

    assert_eq!(ab.pixel(0, 0), Some(BLUE));
    assert_eq!(ba.pixel(0, 0), Some(RED));
}

#[test]
fn straight_alpha_inputs_are_rejected() {
    let mut bg = FrameRGBA::transparent(1, 1);
    let fg = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![255, 0, 0, 128],
        premultiplied: false,
    };
    assert!(alpha_composite(&mut bg, &fg, (0, 0), 1.0, BlendMode::Normal).is_err());
}

#[test]
fn blend_modes_parse_from_snake_case() {
    assert_eq!("normal".parse::<BlendMode>().unwrap(), BlendMode::Normal);
    assert_eq!(
        "color_dodge".parse::<BlendMode>().unwrap(),
        BlendMode::ColorDodge
    );
    assert!("sparkle".parse::<BlendMode>().is_err());
}
