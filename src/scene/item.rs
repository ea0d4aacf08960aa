use crate::foundation::core::ensure_finite;
use crate::foundation::error::{StrataError, StrataResult};
use crate::render::composite::alpha_composite;
use crate::render::frame::FrameRGBA;
use crate::render::warp::warp_affine_bilinear;
use crate::scene::key::{ContentKey, LayerKey};
use crate::scene::layer::{Capabilities, Effect, Layer};
use crate::transform::affine::fixed_affine_matrix;
use crate::transform::value::{Transform, TransformValue};
use std::sync::Arc;

/// End of the active window for layers without a natural duration.
pub const DEFAULT_END_TIME: f64 = 1e6;

struct EffectSlot {
    effect: Box<dyn Effect>,
    keyed: bool,
}

/// A layer attached to a composition, with its placement and timing.
///
/// Local time is composition time minus [`LayerItem::offset`]; the layer is active while local
/// time lies in `[start_time, end_time)`.
pub struct LayerItem {
    layer: Arc<dyn Layer>,
    capabilities: Capabilities,
    name: String,
    transform: Box<dyn Transform>,
    offset: f64,
    start_time: f64,
    end_time: f64,
    visible: bool,
    effects: Vec<EffectSlot>,
}

impl LayerItem {
    /// Wrap `layer` with an identity placement and its natural time window.
    pub fn new(layer: Arc<dyn Layer>, name: impl Into<String>) -> Self {
        let capabilities = layer.capabilities();
        let end_time = layer.duration().unwrap_or(DEFAULT_END_TIME);
        Self {
            layer,
            capabilities,
            name: name.into(),
            transform: Box::new(TransformValue::default()),
            offset: 0.0,
            start_time: 0.0,
            end_time,
            visible: true,
            effects: Vec::new(),
        }
    }

    /// Unique name within the owning composition.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// The wrapped layer.
    pub fn layer(&self) -> &Arc<dyn Layer> {
        &self.layer
    }

    /// Capabilities resolved when the layer was attached.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Placement of the layer.
    pub fn transform(&self) -> &dyn Transform {
        self.transform.as_ref()
    }

    /// Replace the placement.
    pub fn set_transform(&mut self, transform: impl Transform + 'static) {
        self.transform = Box::new(transform);
    }

    pub(crate) fn set_boxed_transform(&mut self, transform: Box<dyn Transform>) {
        self.transform = transform;
    }

    /// Composition time at which local time 0 occurs.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Shift the layer in composition time.
    pub fn set_offset(&mut self, offset: f64) -> StrataResult<()> {
        ensure_finite(offset, "offset")?;
        self.offset = offset;
        Ok(())
    }

    /// Start of the active window (local seconds).
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// End of the active window (local seconds, exclusive).
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Set the active window `[start, end)`; requires `start < end`.
    pub fn set_time_range(&mut self, start: f64, end: f64) -> StrataResult<()> {
        ensure_finite(start, "start_time")?;
        if end.is_nan() || end <= start {
            return Err(StrataError::invalid(format!(
                "end_time ({end}) must be greater than start_time ({start})"
            )));
        }
        self.start_time = start;
        self.end_time = end;
        Ok(())
    }

    /// Length of the active window.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Whether the layer is drawn.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the layer.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Append an effect; effects apply in insertion order.
    pub fn add_effect(&mut self, effect: impl Effect + 'static) {
        let keyed = effect.keyed();
        self.effects.push(EffectSlot {
            effect: Box::new(effect),
            keyed,
        });
    }

    /// Remove and return the effect at `index`.
    pub fn remove_effect(&mut self, index: usize) -> StrataResult<Box<dyn Effect>> {
        if index >= self.effects.len() {
            return Err(StrataError::not_found(format!(
                "effect #{index} on layer '{}'",
                self.name
            )));
        }
        Ok(self.effects.remove(index).effect)
    }

    /// Number of attached effects.
    pub fn effect_count(&self) -> usize {
        self.effects.len()
    }

    /// Attached effects in application order.
    pub fn effects(&self) -> impl Iterator<Item = &dyn Effect> + '_ {
        self.effects.iter().map(|slot| slot.effect.as_ref())
    }

    /// Local time corresponding to composition time `time`.
    pub fn local_time(&self, time: f64) -> f64 {
        time - self.offset
    }

    /// Return `true` when local time `t` is inside `[start_time, end_time)`.
    pub fn is_active_at(&self, local_time: f64) -> bool {
        self.start_time <= local_time && local_time < self.end_time
    }

    /// Render the layer at local time `time` and run its effects.
    ///
    /// Invisible layers and layers producing nothing yield `None`.
    pub fn render_at(&self, time: f64) -> StrataResult<Option<FrameRGBA>> {
        if !self.visible {
            return Ok(None);
        }
        let Some(mut frame) = self.layer.render(time)? else {
            return Ok(None);
        };
        for slot in &self.effects {
            frame = slot.effect.apply(frame, time)?;
        }
        Ok(Some(frame))
    }

    /// Cache key at local time `time`.
    pub fn get_key(&self, time: f64) -> LayerKey {
        if !self.visible {
            return LayerKey::Hidden;
        }
        let content = if self.capabilities.keyed {
            self.layer.content_key(time)
        } else {
            ContentKey::time(time)
        };
        let effects = (!self.effects.is_empty()).then(|| {
            self.effects
                .iter()
                .map(|slot| {
                    if slot.keyed {
                        slot.effect.cache_key(time)
                    } else {
                        ContentKey::time(time)
                    }
                })
                .collect()
        });
        LayerKey::Visible {
            transform: self.transform.snapshot_key(time),
            content,
            effects,
        }
    }

    /// Draw this layer onto `bg` at composition time `time`.
    ///
    /// `parent_offset` is the position of `bg`'s top-left corner in composition pixels at the
    /// given preview level; `bg` is left untouched outside the active window or when the
    /// layer collapses to nothing.
    pub fn composite_onto(
        &self,
        bg: &mut FrameRGBA,
        time: f64,
        parent_offset: (i32, i32),
        preview_level: u32,
    ) -> StrataResult<()> {
        let local = self.local_time(time);
        if !self.is_active_at(local) {
            return Ok(());
        }
        let Some(frame) = self.render_at(local)? else {
            return Ok(());
        };
        frame.validate()?;
        let frame = frame.into_premultiplied();

        let p = self.transform.evaluate(local);
        let Some(placement) = fixed_affine_matrix(frame.size(), &p, preview_level) else {
            return Ok(());
        };
        let warped = warp_affine_bilinear(&frame, placement.matrix, placement.width, placement.height);
        let position = (
            placement.offset.0.saturating_sub(parent_offset.0),
            placement.offset.1.saturating_sub(parent_offset.1),
        );
        alpha_composite(bg, &warped, position, p.opacity as f32, p.blend_mode)
    }
}

impl std::fmt::Debug for LayerItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerItem")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("offset", &self.offset)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("visible", &self.visible)
            .field("effects", &self.effects.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/item.rs"]
mod tests;
