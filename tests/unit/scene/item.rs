use super::*;
use crate::foundation::core::Vec2;
use crate::render::composite::BlendMode;

struct Flat {
    w: u32,
    h: u32,
    rgba: [u8; 4],
    keyed: bool,
}

impl Layer for Flat {
    fn render(&self, _time: f64) -> StrataResult<Option<FrameRGBA>> {
        Ok(Some(FrameRGBA::solid(self.w, self.h, self.rgba)))
    }

    fn duration(&self) -> Option<f64> {
        Some(2.0)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            keyed: self.keyed,
            audio: false,
        }
    }

    fn content_key(&self, _time: f64) -> ContentKey {
        ContentKey::of(&self.rgba)
    }
}

struct Broken;

impl Layer for Broken {
    fn render(&self, _time: f64) -> StrataResult<Option<FrameRGBA>> {
        Ok(Some(FrameRGBA {
            width: 2,
            height: 2,
            data: vec![0; 12],
            premultiplied: true,
        }))
    }
}

struct Straight;

impl Layer for Straight {
    fn render(&self, _time: f64) -> StrataResult<Option<FrameRGBA>> {
        Ok(Some(FrameRGBA {
            width: 1,
            height: 1,
            data: vec![255, 255, 255, 128],
            premultiplied: false,
        }))
    }
}

struct Invert;

impl Effect for Invert {
    fn apply(&self, mut frame: FrameRGBA, _time: f64) -> StrataResult<FrameRGBA> {
        for px in frame.data.chunks_exact_mut(4) {
            let a = px[3];
            for c in &mut px[..3] {
                *c = a - *c;
            }
        }
        Ok(frame)
    }

    fn keyed(&self) -> bool {
        true
    }

    fn cache_key(&self, _time: f64) -> ContentKey {
        ContentKey::of("invert")
    }
}

fn flat(keyed: bool) -> LayerItem {
    LayerItem::new(
        Arc::new(Flat {
            w: 2,
            h: 2,
            rgba: [255, 0, 0, 255],
            keyed,
        }),
        "flat",
    )
}

fn placed_at(x: f64, y: f64) -> TransformValue {
    TransformValue {
        position: Vec2::new(x, y),
        ..TransformValue::default()
    }
}

#[test]
fn window_defaults_to_layer_duration() {
    let item = flat(false);
    assert_eq!((item.start_time(), item.end_time()), (0.0, 2.0));
    assert_eq!(item.duration(), 2.0);

    let item = LayerItem::new(Arc::new(Broken), "b");
    assert_eq!(item.end_time(), DEFAULT_END_TIME);
}

#[test]
fn time_range_requires_start_before_end() {
    let mut item = flat(false);
    assert!(item.set_time_range(1.0, 1.0).is_err());
    assert!(item.set_time_range(1.0, f64::NAN).is_err());
    item.set_time_range(0.5, 1.5).unwrap();
    assert!(item.is_active_at(0.5));
    assert!(!item.is_active_at(1.5));
}

#[test]
fn unkeyed_layers_key_by_time() {
    let item = flat(false);
    assert_ne!(item.get_key(0.0), item.get_key(1.0));

    let keyed = flat(true);
    assert_eq!(keyed.get_key(0.0), keyed.get_key(1.0));
}

#[test]
fn hidden_layers_key_as_hidden_and_render_nothing() {
    let mut item = flat(true);
    item.set_visible(false);
    assert_eq!(item.get_key(0.0), LayerKey::Hidden);
    assert!(item.render_at(0.0).unwrap().is_none());
}

#[test]
fn effects_apply_in_order_and_enter_the_key() {
    let mut item = flat(true);
    let before = item.get_key(0.0);
    item.add_effect(Invert);
    let after = item.get_key(0.0);
    assert_ne!(before, after);

    let f = item.render_at(0.0).unwrap().unwrap();
    assert_eq!(f.pixel(0, 0), Some([0, 255, 255, 255]));

    item.add_effect(Invert);
    let f = item.render_at(0.0).unwrap().unwrap();
    assert_eq!(f.pixel(0, 0), Some([255, 0, 0, 255]));

    assert_eq!(item.effect_count(), 2);
    item.remove_effect(0).unwrap();
    assert!(item.remove_effect(5).is_err());
    assert_eq!(item.effect_count(), 1);
}

#[test]
fn composite_respects_parent_offset() {
    let mut item = flat(true);
    // 2x2 centered on (3, 3) covers pixels [2, 4) in both axes.
    item.set_transform(placed_at(3.0, 3.0));
    let mut bg = FrameRGBA::transparent(4, 4);
    item.composite_onto(&mut bg, 0.0, (1, 1), 1).unwrap();
    assert_eq!(bg.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(bg.pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(bg.pixel(2, 2), Some([255, 0, 0, 255]));
    assert_eq!(bg.pixel(3, 3), Some([0, 0, 0, 0]));
}

#[test]
fn composite_skips_inactive_times() {
    let mut item = flat(true);
    item.set_transform(placed_at(1.0, 1.0));
    item.set_offset(1.0).unwrap();
    let mut bg = FrameRGBA::transparent(2, 2);
    item.composite_onto(&mut bg, 0.5, (0, 0), 1).unwrap();
    assert_eq!(bg, FrameRGBA::transparent(2, 2));
    item.composite_onto(&mut bg, 1.5, (0, 0), 1).unwrap();
    assert_eq!(bg.pixel(0, 0), Some([255, 0, 0, 255]));
}

#[test]
fn composite_uses_blend_mode_and_opacity() {
    let mut item = flat(true);
    item.set_transform(TransformValue {
        position: Vec2::new(1.0, 1.0),
        opacity: 0.0,
        blend_mode: BlendMode::Multiply,
        ..TransformValue::default()
    });
    let mut bg = FrameRGBA::solid(2, 2, [10, 20, 30, 255]);
    item.composite_onto(&mut bg, 0.0, (0, 0), 1).unwrap();
    assert_eq!(bg.pixel(0, 0), Some([10, 20, 30, 255]));
}

#[test]
fn malformed_layer_output_is_a_contract_violation() {
    let item = LayerItem::new(Arc::new(Broken), "b");
    let mut bg = FrameRGBA::transparent(4, 4);
    let err = item.composite_onto(&mut bg, 0.0, (0, 0), 1).unwrap_err();
    assert!(matches!(err, StrataError::ContractViolation(_)));
}

#[test]
fn straight_alpha_output_is_premultiplied_on_entry() {
    let mut item = LayerItem::new(Arc::new(Straight), "s");
    item.set_transform(TransformValue {
        position: Vec2::new(0.5, 0.5),
        ..TransformValue::default()
    });
    let mut bg = FrameRGBA::transparent(1, 1);
    item.composite_onto(&mut bg, 0.0, (0, 0), 1).unwrap();
    assert_eq!(bg.pixel(0, 0), Some([128, 128, 128, 128]));
}
