use super::*;

fn checker_2x2() -> FrameRGBA {
    FrameRGBA::from_premul(
        2,
        2,
        vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ],
    )
    .unwrap()
}

#[test]
fn identity_copies_pixels_exactly() {
    let src = checker_2x2();
    let out = warp_affine_bilinear(&src, Affine::IDENTITY, 2, 2);
    assert_eq!(out, src);
}

#[test]
fn integer_translation_shifts_without_filtering() {
    let src = checker_2x2();
    let out = warp_affine_bilinear(&src, Affine::translate((1.0, 0.0)), 3, 2);
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(out.pixel(1, 0), src.pixel(0, 0));
    assert_eq!(out.pixel(2, 1), src.pixel(1, 1));
}

#[test]
fn half_pixel_translation_blends_with_transparent_border() {
    let src = FrameRGBA::solid(1, 1, [255, 255, 255, 255]);
    let out = warp_affine_bilinear(&src, Affine::translate((0.5, 0.0)), 2, 1);
    assert_eq!(out.pixel(0, 0), Some([128, 128, 128, 128]));
    assert_eq!(out.pixel(1, 0), Some([128, 128, 128, 128]));
}

#[test]
fn upscale_by_two_keeps_corner_colors() {
    let src = checker_2x2();
    let out = warp_affine_bilinear(&src, Affine::scale(2.0), 4, 4);
    assert_eq!(out.pixel(0, 0), src.pixel(0, 0));
    assert_eq!(out.pixel(2, 2), src.pixel(1, 1));
}

#[test]
fn singular_matrix_yields_transparent_output() {
    let src = checker_2x2();
    let out = warp_affine_bilinear(&src, Affine::scale_non_uniform(0.0, 1.0), 2, 2);
    assert!(out.data.iter().all(|&b| b == 0));
}

#[test]
fn zero_sized_destination_is_empty() {
    let src = checker_2x2();
    let out = warp_affine_bilinear(&src, Affine::IDENTITY, 0, 3);
    assert!(out.is_empty());
    assert!(out.data.is_empty());
}
