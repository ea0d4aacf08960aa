use crate::audio::buffer::AudioBuffer;
use crate::foundation::error::StrataResult;
use crate::render::frame::FrameRGBA;
use crate::scene::key::ContentKey;

/// Unique identity of a live [`Composition`](crate::Composition), used for cycle checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositionId(pub(crate) u64);

/// Optional behaviors a layer opts into.
///
/// Resolved once when the layer is attached to a composition, so the per-frame paths never
/// query the layer again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// The layer provides a meaningful [`Layer::content_key`].
    pub keyed: bool,
    /// The layer may return audio from [`Layer::audio`].
    pub audio: bool,
}

impl Capabilities {
    /// Capabilities of a layer whose content key is meaningful.
    pub fn keyed() -> Self {
        Self {
            keyed: true,
            audio: false,
        }
    }

    /// Also advertise audio.
    pub fn with_audio(mut self) -> Self {
        self.audio = true;
        self
    }
}

/// Something that can produce an RGBA image for a layer-local time.
///
/// `render` is the only required capability. A layer that does not report itself as
/// [`Capabilities::keyed`] is cached by its local time instead of [`Layer::content_key`].
pub trait Layer: Send + Sync {
    /// Render the layer at `time` (layer-local seconds). `None` means nothing to draw.
    fn render(&self, time: f64) -> StrataResult<Option<FrameRGBA>>;

    /// Natural length of the layer in seconds, if it has one.
    fn duration(&self) -> Option<f64> {
        None
    }

    /// Optional behaviors; see [`Capabilities`].
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Value that identifies the rendered content at `time`.
    ///
    /// Two times with equal keys must render identical pixels.
    fn content_key(&self, time: f64) -> ContentKey {
        ContentKey::time(time)
    }

    /// Interleaved stereo samples for the local window `[start, end)`.
    fn audio(&self, _start: f64, _end: f64) -> StrataResult<Option<AudioBuffer>> {
        Ok(None)
    }

    /// Return `true` if this layer is, or transitively contains, the composition `id`.
    fn contains_composition(&self, _id: CompositionId) -> bool {
        false
    }
}

/// Per-layer image post-process applied after `render` and before placement.
pub trait Effect: Send + Sync {
    /// Transform `frame` at `time` (layer-local seconds).
    fn apply(&self, frame: FrameRGBA, time: f64) -> StrataResult<FrameRGBA>;

    /// Whether [`Effect::cache_key`] is meaningful. Unkeyed effects are keyed by time.
    fn keyed(&self) -> bool {
        false
    }

    /// Value that identifies this effect's output at `time`.
    fn cache_key(&self, time: f64) -> ContentKey {
        ContentKey::time(time)
    }
}
