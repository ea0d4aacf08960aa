use super::*;
use crate::transform::value::TransformValue;
use smallvec::smallvec;

fn visible(t: f64, content: ContentKey) -> Option<LayerKey> {
    let mut v = TransformValue::default();
    v.position.x = t;
    Some(LayerKey::Visible {
        transform: v.key(),
        content,
        effects: None,
    })
}

fn key(layers: Vec<Option<LayerKey>>) -> CacheKey {
    CacheKey {
        canvas: (16, 16),
        preview_level: 1,
        layers,
    }
}

#[test]
fn equal_keys_share_a_fingerprint() {
    let a = key(vec![visible(1.0, ContentKey::of("solid")), None]);
    let b = a.clone();
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn fingerprint_tracks_every_component() {
    let base = key(vec![visible(1.0, ContentKey::time(0.5))]);
    let moved = key(vec![visible(2.0, ContentKey::time(0.5))]);
    let retimed = key(vec![visible(1.0, ContentKey::time(0.75))]);
    let hidden = key(vec![Some(LayerKey::Hidden)]);
    let inactive = key(vec![None]);
    let fps = [
        base.fingerprint(),
        moved.fingerprint(),
        retimed.fingerprint(),
        hidden.fingerprint(),
        inactive.fingerprint(),
    ];
    for (i, a) in fps.iter().enumerate() {
        for b in &fps[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn empty_effect_list_differs_from_no_effects() {
    let v = TransformValue::default().key();
    let none = key(vec![Some(LayerKey::Visible {
        transform: v,
        content: ContentKey::time(0.0),
        effects: None,
    })]);
    let one = key(vec![Some(LayerKey::Visible {
        transform: v,
        content: ContentKey::time(0.0),
        effects: Some(smallvec![ContentKey::time(0.0)]),
    })]);
    assert_ne!(none.fingerprint(), one.fingerprint());
}

#[test]
fn nested_keys_are_distinct_from_flat_ones() {
    let inner = key(vec![visible(0.0, ContentKey::time(1.0))]);
    let nested = key(vec![visible(0.0, ContentKey::Composition(Box::new(inner.clone())))]);
    assert_ne!(nested.fingerprint(), inner.fingerprint());
    assert_eq!(
        nested.fingerprint(),
        key(vec![visible(0.0, ContentKey::Composition(Box::new(inner)))]).fingerprint()
    );
}

#[test]
fn value_keys_follow_value_equality() {
    assert_eq!(ContentKey::of(&(1u32, 2u32)), ContentKey::of(&(1u32, 2u32)));
    assert_ne!(ContentKey::of(&(1u32, 2u32)), ContentKey::of(&(2u32, 1u32)));
    assert_eq!(ContentKey::time(0.25), ContentKey::Time(0.25f64.to_bits()));
}

#[test]
fn canvas_and_preview_level_are_part_of_the_fingerprint() {
    let base = key(vec![visible(1.0, ContentKey::of("solid"))]);
    let resized = CacheKey {
        canvas: (8, 8),
        ..base.clone()
    };
    let previewed = CacheKey {
        preview_level: 2,
        ..base.clone()
    };
    assert_ne!(base.fingerprint(), resized.fingerprint());
    assert_ne!(base.fingerprint(), previewed.fingerprint());
    assert_ne!(resized.fingerprint(), previewed.fingerprint());
}

#[test]
fn empty_content_differs_from_any_nested_scene() {
    let inner = key(Vec::new());
    let empty = key(vec![visible(0.0, ContentKey::Empty)]);
    let nested = key(vec![visible(0.0, ContentKey::Composition(Box::new(inner)))]);
    assert_ne!(empty.fingerprint(), nested.fingerprint());
}
