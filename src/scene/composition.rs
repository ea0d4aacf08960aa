use crate::audio::buffer::{AudioBuffer, secs_to_audio_frames};
use crate::audio::mix::mix_at;
use crate::foundation::core::{Canvas, Vec2, ensure_finite};
use crate::foundation::error::{StrataError, StrataResult};
use crate::render::frame::FrameRGBA;
use crate::scene::cache::{CacheStats, FrameCache};
use crate::scene::item::LayerItem;
use crate::scene::key::{CacheKey, ContentKey};
use crate::scene::layer::{Capabilities, CompositionId, Layer};
use crate::scene::opts::{CompositionOpts, LayerOpts};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

static NEXT_COMPOSITION_ID: AtomicU64 = AtomicU64::new(1);

/// An ordered stack of named layers rendered onto a transparent canvas.
///
/// Layers are drawn first-to-last. Rendered frames are memoized by a structural [`CacheKey`],
/// so repeated requests for an unchanged scene return the same frame without re-rendering.
///
/// A composition is itself a [`Layer`] and can be nested inside another composition.
pub struct Composition {
    id: CompositionId,
    canvas: Canvas,
    duration: f64,
    preview_level: u32,
    layers: Vec<LayerItem>,
    name_index: HashMap<String, usize>,
    cache: Mutex<FrameCache>,
}

impl Composition {
    /// Create an empty `width`x`height` composition lasting `duration` seconds.
    pub fn new(width: u32, height: u32, duration: f64) -> StrataResult<Self> {
        Self::with_opts(width, height, duration, CompositionOpts::default())
    }

    /// Create an empty composition with explicit options.
    pub fn with_opts(
        width: u32,
        height: u32,
        duration: f64,
        opts: CompositionOpts,
    ) -> StrataResult<Self> {
        let canvas = Canvas::new(width, height)?;
        validate_duration(duration)?;
        Ok(Self {
            id: CompositionId(NEXT_COMPOSITION_ID.fetch_add(1, Ordering::Relaxed)),
            canvas,
            duration,
            preview_level: 1,
            layers: Vec::new(),
            name_index: HashMap::new(),
            cache: Mutex::new(FrameCache::new(opts.cache_max_bytes)),
        })
    }

    /// Identity used for cycle detection.
    pub fn id(&self) -> CompositionId {
        self.id
    }

    /// Full-resolution canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// `(width, height)` of the full-resolution canvas.
    pub fn size(&self) -> (u32, u32) {
        (self.canvas.width, self.canvas.height)
    }

    /// Resize the canvas. Frames cached at the old size are no longer served.
    pub fn set_size(&mut self, width: u32, height: u32) -> StrataResult<()> {
        self.canvas = Canvas::new(width, height)?;
        Ok(())
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Change the length.
    pub fn set_duration(&mut self, duration: f64) -> StrataResult<()> {
        validate_duration(duration)?;
        self.duration = duration;
        Ok(())
    }

    /// Integer downscale factor applied at render time (1 = full resolution).
    pub fn preview_level(&self) -> u32 {
        self.preview_level
    }

    /// Set the downscale factor; must be at least 1.
    pub fn set_preview_level(&mut self, level: u32) -> StrataResult<()> {
        if level == 0 {
            return Err(StrataError::invalid("preview_level must be >= 1"));
        }
        self.preview_level = level;
        Ok(())
    }

    /// Temporarily render at `level`; the previous level is restored when the guard drops.
    pub fn preview(&mut self, level: u32) -> StrataResult<PreviewGuard<'_>> {
        let prior = self.preview_level;
        self.set_preview_level(level)?;
        Ok(PreviewGuard { comp: self, prior })
    }

    /// Resolution of rendered frames at the current preview level.
    pub fn target_size(&self) -> (u32, u32) {
        self.canvas.downscaled(self.preview_level)
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Return `true` when there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer names in render order.
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(LayerItem::name).collect()
    }

    /// Layers in render order.
    pub fn iter(&self) -> impl Iterator<Item = &LayerItem> {
        self.layers.iter()
    }

    /// Return `true` if a layer named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Layer named `name`.
    pub fn get(&self, name: &str) -> Option<&LayerItem> {
        self.name_index.get(name).map(|&i| &self.layers[i])
    }

    /// Mutable access to the layer named `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut LayerItem> {
        let i = *self.name_index.get(name)?;
        Some(&mut self.layers[i])
    }

    /// Append `layer` on top of the stack.
    pub fn add_layer<L: Layer + 'static>(
        &mut self,
        layer: L,
        opts: LayerOpts,
    ) -> StrataResult<&mut LayerItem> {
        self.add_shared_layer(Arc::new(layer), opts)
    }

    /// Append a layer that may also be referenced elsewhere.
    ///
    /// Fails with [`StrataError::DuplicateName`] if the name is taken and with
    /// [`StrataError::InvalidArgument`] if attaching would make this composition contain itself.
    pub fn add_shared_layer(
        &mut self,
        layer: Arc<dyn Layer>,
        mut opts: LayerOpts,
    ) -> StrataResult<&mut LayerItem> {
        opts.validate_timing()?;
        let name = opts
            .name
            .take()
            .unwrap_or_else(|| format!("layer_{}", self.layers.len()));
        self.ensure_attachable(&name, layer.as_ref())?;

        let mut item = LayerItem::new(layer, name.clone());
        match opts.transform.take() {
            Some(transform) => item.set_boxed_transform(transform),
            None => {
                let value = opts.transform_value(self.canvas.center());
                value.validate()?;
                item.set_transform(value);
            }
        }
        item.set_offset(opts.offset)?;
        let end = opts.end_time.unwrap_or(item.end_time());
        item.set_time_range(opts.start_time, end)?;
        item.set_visible(opts.visible);

        Ok(self.push_item(name, item))
    }

    /// Append a pre-built item under `name`.
    pub fn insert_item(
        &mut self,
        name: impl Into<String>,
        mut item: LayerItem,
    ) -> StrataResult<&mut LayerItem> {
        let name = name.into();
        self.ensure_attachable(&name, item.layer().as_ref())?;
        item.set_name(name.clone());
        Ok(self.push_item(name, item))
    }

    /// Remove and return the layer named `name`.
    pub fn pop_layer(&mut self, name: &str) -> StrataResult<LayerItem> {
        let Some(i) = self.name_index.remove(name) else {
            return Err(StrataError::not_found(name));
        };
        let item = self.layers.remove(i);
        self.reindex();
        tracing::debug!(layer = name, remaining = self.layers.len(), "removed layer");
        Ok(item)
    }

    /// Remove every layer.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.name_index.clear();
    }

    /// Structural key of the frame at composition time `time`.
    pub fn get_key(&self, time: f64) -> CacheKey {
        let layers = self
            .layers
            .iter()
            .map(|item| {
                let local = item.local_time(time);
                item.is_active_at(local).then(|| item.get_key(local))
            })
            .collect();
        CacheKey {
            canvas: self.size(),
            preview_level: self.preview_level,
            layers,
        }
    }

    /// Render the frame at `time`, or `None` outside `[0, duration)`.
    ///
    /// The frame has [`Composition::target_size`] and premultiplied alpha. Repeated calls for an
    /// unchanged scene return the same cached allocation.
    #[tracing::instrument(level = "debug", skip(self), fields(layers = self.layers.len()))]
    pub fn render_at(&self, time: f64) -> StrataResult<Option<Arc<FrameRGBA>>> {
        if !(0.0 <= time && time < self.duration) {
            return Ok(None);
        }
        let size = self.target_size();
        let fingerprint = self.get_key(time).fingerprint();
        if let Some(hit) = self.lock_cache().lookup(fingerprint, size) {
            return Ok(Some(hit));
        }

        let mut frame = FrameRGBA::transparent(size.0, size.1);
        for item in &self.layers {
            item.composite_onto(&mut frame, time, (0, 0), self.preview_level)?;
        }
        let frame = Arc::new(frame);
        self.lock_cache().insert(fingerprint, Arc::clone(&frame));
        Ok(Some(frame))
    }

    /// Mix the audio of all layers over composition window `[start, end)`.
    ///
    /// `end` defaults to the duration. Returns `None` when no layer contributes audio.
    /// Sample 0 of the result corresponds to composition time `start`.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get_audio(&self, start: f64, end: Option<f64>) -> StrataResult<Option<AudioBuffer>> {
        let end = end.unwrap_or(self.duration);
        ensure_finite(start, "audio start")?;
        ensure_finite(end, "audio end")?;
        if !(start >= 0.0) {
            return Err(StrataError::invalid(format!(
                "audio start must be non-negative, got {start}"
            )));
        }
        if !(start < end) {
            return Err(StrataError::invalid(format!(
                "audio start ({start}) must be before end ({end})"
            )));
        }

        let frames = secs_to_audio_frames(end - start);
        let mut mix: Option<AudioBuffer> = None;
        for item in &self.layers {
            if !item.capabilities().audio {
                continue;
            }
            let local_start = item.start_time().max(start - item.offset());
            let local_end = item.end_time().min(end - item.offset());
            if local_start >= local_end {
                continue;
            }
            let Some(chunk) = item.layer().audio(local_start, local_end)? else {
                continue;
            };
            let at = secs_to_audio_frames(local_start + item.offset() - start);
            if mix.is_none() {
                mix = Some(AudioBuffer::silence(frames)?);
            }
            if let Some(out) = mix.as_mut() {
                mix_at(out, at, &chunk);
            }
        }
        Ok(mix)
    }

    /// Drop every cached frame.
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    /// Snapshot of the frame cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    fn lock_cache(&self) -> MutexGuard<'_, FrameCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_attachable(&self, name: &str, layer: &dyn Layer) -> StrataResult<()> {
        if self.name_index.contains_key(name) {
            return Err(StrataError::duplicate_name(name));
        }
        if layer.contains_composition(self.id) {
            return Err(StrataError::invalid(format!(
                "layer '{name}' would make the composition contain itself"
            )));
        }
        Ok(())
    }

    fn push_item(&mut self, name: String, item: LayerItem) -> &mut LayerItem {
        tracing::debug!(layer = %name, index = self.layers.len(), "added layer");
        let i = self.layers.len();
        self.name_index.insert(name, i);
        self.layers.push(item);
        &mut self.layers[i]
    }

    fn reindex(&mut self) {
        self.name_index = self
            .layers
            .iter()
            .enumerate()
            .map(|(i, item)| (item.name().to_owned(), i))
            .collect();
    }
}

fn validate_duration(duration: f64) -> StrataResult<()> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(StrataError::invalid(format!(
            "duration must be finite and > 0, got {duration}"
        )));
    }
    Ok(())
}

impl Layer for Composition {
    fn render(&self, time: f64) -> StrataResult<Option<FrameRGBA>> {
        Ok(self.render_at(time)?.map(Arc::unwrap_or_clone))
    }

    fn duration(&self) -> Option<f64> {
        Some(self.duration)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::keyed().with_audio()
    }

    fn content_key(&self, time: f64) -> ContentKey {
        if !(0.0 <= time && time < self.duration) {
            return ContentKey::Empty;
        }
        ContentKey::Composition(Box::new(self.get_key(time)))
    }

    fn audio(&self, start: f64, end: f64) -> StrataResult<Option<AudioBuffer>> {
        self.get_audio(start.max(0.0), Some(end))
    }

    fn contains_composition(&self, id: CompositionId) -> bool {
        self.id == id
            || self
                .layers
                .iter()
                .any(|item| item.layer().contains_composition(id))
    }
}

impl std::fmt::Debug for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composition")
            .field("id", &self.id)
            .field("canvas", &self.canvas)
            .field("duration", &self.duration)
            .field("preview_level", &self.preview_level)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

/// Scoped preview level; see [`Composition::preview`].
pub struct PreviewGuard<'a> {
    comp: &'a mut Composition,
    prior: u32,
}

impl std::ops::Deref for PreviewGuard<'_> {
    type Target = Composition;

    fn deref(&self) -> &Composition {
        self.comp
    }
}

impl std::ops::DerefMut for PreviewGuard<'_> {
    fn deref_mut(&mut self) -> &mut Composition {
        self.comp
    }
}

impl Drop for PreviewGuard<'_> {
    fn drop(&mut self) {
        self.comp.preview_level = self.prior;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/composition.rs"]
mod tests;
