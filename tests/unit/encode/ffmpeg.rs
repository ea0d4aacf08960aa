use super::*;

#[test]
fn flatten_transparent_yields_background() {
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &[0, 0, 0, 0], [10, 20, 30, 255]);
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_opaque_is_identity() {
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &[1, 2, 3, 255], [10, 20, 30, 255]);
    assert_eq!(dst, vec![1, 2, 3, 255]);
}

#[test]
fn flatten_half_alpha_mixes() {
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &[128, 0, 0, 128], [0, 0, 254, 255]);
    assert_eq!(dst, vec![128, 0, 127, 255]);
}

#[test]
fn odd_sizes_are_rejected_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(
        std::env::temp_dir().join("strata-odd.mp4"),
    ));
    let err = sink
        .begin(SinkConfig {
            width: 3,
            height: 2,
            fps: Fps::new(30, 1).unwrap(),
            audio: None,
        })
        .unwrap_err();
    assert!(matches!(err, StrataError::InvalidArgument(_)));
}

#[test]
fn frames_before_begin_are_errors() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    assert!(
        sink.push_frame(FrameIndex(0), &FrameRGBA::transparent(2, 2))
            .is_err()
    );
    assert!(sink.end().is_err());
}
