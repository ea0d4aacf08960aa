use super::*;

const SCENE: &str = r#"{
  "width": 100,
  "height": 100,
  "duration": 1.0,
  "layers": [
    { "name": "red", "source": { "kind": "solid", "width": 20, "height": 20, "color": [255, 0, 0, 255] }, "position": [50, 50] },
    { "source": { "kind": "solid", "width": 4, "height": 4, "color": [0, 0, 255, 255] }, "blend_mode": "screen", "origin_point": "top_left" },
    { "name": "inner", "source": { "kind": "composition", "scene": { "width": 10, "height": 10, "duration": 0.5 } }, "offset": 0.25 }
  ]
}"#;

#[test]
fn parses_and_builds_layers_in_order() {
    let def = SceneDef::from_json(SCENE).unwrap();
    assert_eq!(def.layers.len(), 3);
    assert_eq!(def.layers[1].blend_mode, BlendMode::Screen);
    assert_eq!(def.layers[1].origin_point, Direction::TopLeft);

    let comp = def.build(Path::new(".")).unwrap();
    assert_eq!(comp.layer_names(), vec!["red", "layer_1", "inner"]);
    assert_eq!(
        comp.get("layer_1").unwrap().transform().evaluate(0.0).position,
        Vec2::new(50.0, 50.0)
    );
    let inner = comp.get("inner").unwrap();
    assert_eq!((inner.offset(), inner.end_time()), (0.25, 0.5));
}

#[test]
fn rendered_scene_has_the_red_square() {
    let comp = SceneDef::from_json(SCENE)
        .unwrap()
        .build(Path::new("."))
        .unwrap();
    let f = comp.render_at(0.0).unwrap().unwrap();
    assert_eq!(f.pixel(40, 40), Some([255, 0, 0, 255]));
    assert_eq!(f.pixel(39, 39), Some([0, 0, 0, 0]));
}

#[test]
fn unknown_fields_are_serde_errors() {
    let err = SceneDef::from_json(r#"{"width": 1, "height": 1, "duration": 1, "fps": 30}"#)
        .unwrap_err();
    assert!(matches!(err, StrataError::Serde(_)));
}

#[test]
fn invalid_layers_report_their_index() {
    let def = SceneDef::from_json(
        r#"{"width": 8, "height": 8, "duration": 1, "layers": [
            {"source": {"kind": "solid", "width": 1, "height": 1, "color": [0,0,0,255]}, "opacity": 2.0}
        ]}"#,
    )
    .unwrap();
    let err = def.build(Path::new(".")).unwrap_err();
    assert!(err.to_string().contains("layers[0]"), "{err}");
}

#[test]
fn image_paths_resolve_against_assets_root() {
    let dir = std::env::temp_dir().join(format!("strata-def-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]))
        .save(dir.join("dot.png"))
        .unwrap();

    let def = SceneDef::from_json(
        r#"{"width": 4, "height": 4, "duration": 1, "layers": [
            {"source": {"kind": "image", "path": "dot.png"}}
        ]}"#,
    )
    .unwrap();
    let comp = def.build(&dir).unwrap();
    let f = comp.render_at(0.0).unwrap().unwrap();
    assert_eq!(f.pixel(1, 1), Some([0, 255, 0, 255]));
    assert!(def.build(Path::new("/nonexistent")).is_err());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn preview_level_defaults_to_one_and_is_applied() {
    let def = SceneDef::from_json(SCENE).unwrap();
    assert_eq!(def.preview_level, 1);

    let halved = SceneDef::from_json(
        r#"{"width": 100, "height": 60, "duration": 1.0, "preview_level": 2}"#,
    )
    .unwrap();
    let comp = halved.build(Path::new(".")).unwrap();
    assert_eq!(comp.preview_level(), 2);
    let f = comp.render_at(0.0).unwrap().unwrap();
    assert_eq!((f.width, f.height), (50, 30));

    let zero = SceneDef::from_json(
        r#"{"width": 10, "height": 10, "duration": 1.0, "preview_level": 0}"#,
    )
    .unwrap();
    assert!(matches!(
        zero.build(Path::new(".")),
        Err(StrataError::InvalidArgument(_))
    ));
}

#[test]
fn source_construction_errors_report_their_index() {
    let zero = SceneDef::from_json(
        r#"{"width": 8, "height": 8, "duration": 1, "layers": [
            {"source": {"kind": "solid", "width": 2, "height": 2, "color": [0,0,0,255]}},
            {"source": {"kind": "solid", "width": 0, "height": 2, "color": [0,0,0,255]}}
        ]}"#,
    )
    .unwrap();
    let err = zero.build(Path::new(".")).unwrap_err();
    assert!(matches!(err, StrataError::InvalidArgument(_)));
    assert!(err.to_string().contains("layers[1]"), "{err}");

    let missing = SceneDef::from_json(
        r#"{"width": 8, "height": 8, "duration": 1, "layers": [
            {"source": {"kind": "image", "path": "no-such-file.png"}}
        ]}"#,
    )
    .unwrap();
    let err = missing.build(Path::new("/nonexistent")).unwrap_err();
    assert!(err.to_string().contains("layers[0]"), "{err}");
}

#[test]
fn audio_sources_load_f32le_relative_to_assets_root() {
    let dir = std::env::temp_dir().join(format!("strata-def-audio-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let tone = crate::audio::buffer::AudioBuffer::from_interleaved(vec![0.25; 2 * 4410]).unwrap();
    crate::audio::mix::write_f32le_file(&tone, &dir.join("tone.f32le")).unwrap();

    let def = SceneDef::from_json(
        r#"{"width": 4, "height": 4, "duration": 1, "layers": [
            {"name": "tone", "source": {"kind": "audio", "path": "tone.f32le"}, "offset": 0.5}
        ]}"#,
    )
    .unwrap();
    let comp = def.build(&dir).unwrap();
    assert_eq!(comp.get("tone").unwrap().end_time(), 0.1);
    let mix = comp.get_audio(0.0, None).unwrap().unwrap();
    assert_eq!(mix.frames(), 44_100);
    assert_eq!(mix.frame(0), Some((0.0, 0.0)));
    assert_eq!(mix.frame(22_050), Some((0.25, 0.25)));
    assert_eq!(mix.frame(22_050 + 4410), Some((0.0, 0.0)));
    let _ = std::fs::remove_dir_all(dir);
}
