//! JSON scene descriptions for the CLI and fixtures.
//!
//! A [`SceneDef`] describes a composition tree with data-only layer kinds. Relative image paths
//! resolve against the directory passed to [`SceneDef::build`].

use crate::foundation::core::Vec2;
use crate::foundation::error::{StrataError, StrataResult};
use crate::layers::image::ImageLayer;
use crate::layers::pcm::PcmLayer;
use crate::layers::solid::SolidLayer;
use crate::render::composite::BlendMode;
use crate::scene::composition::Composition;
use crate::scene::opts::{CompositionOpts, LayerOpts};
use crate::transform::direction::Direction;
use std::path::Path;

/// Serializable composition description.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDef {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Length in seconds.
    pub duration: f64,
    /// Preview downscale factor applied after building.
    #[serde(default = "unit_level")]
    pub preview_level: u32,
    /// Layers in render order.
    #[serde(default)]
    pub layers: Vec<LayerDef>,
}

/// One layer of a [`SceneDef`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerDef {
    /// Unique name; generated when absent.
    #[serde(default)]
    pub name: Option<String>,
    /// Content source.
    pub source: SourceDef,
    /// `[x, y]` placement; canvas center when absent.
    #[serde(default)]
    pub position: Option<[f64; 2]>,
    /// `[sx, sy]` scale.
    #[serde(default = "unit_scale")]
    pub scale: [f64; 2],
    /// Clockwise degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity in `[0, 1]`.
    #[serde(default = "one")]
    pub opacity: f64,
    /// Blending mode.
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// `[x, y]` anchor offset.
    #[serde(default)]
    pub anchor_point: [f64; 2],
    /// Reference point on the layer box.
    #[serde(default)]
    pub origin_point: Direction,
    /// Composition time of local time 0.
    #[serde(default)]
    pub offset: f64,
    /// Start of the active window.
    #[serde(default)]
    pub start_time: f64,
    /// End of the active window; the source's duration when absent.
    #[serde(default)]
    pub end_time: Option<f64>,
    /// Whether the layer is drawn.
    #[serde(default = "yes")]
    pub visible: bool,
}

/// Data-only layer sources.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceDef {
    /// Uniform rectangle.
    Solid {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Straight RGBA color.
        color: [u8; 4],
    },
    /// Still image file.
    Image {
        /// Path, relative to the scene directory unless absolute.
        path: String,
    },
    /// Raw interleaved stereo `f32le` audio at 44.1 kHz.
    Audio {
        /// Path, relative to the scene directory unless absolute.
        path: String,
    },
    /// Nested composition.
    Composition {
        /// Nested scene.
        scene: Box<SceneDef>,
    },
}

fn unit_scale() -> [f64; 2] {
    [1.0, 1.0]
}

fn unit_level() -> u32 {
    1
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

impl SceneDef {
    /// Parse a scene from a JSON string.
    pub fn from_json(s: &str) -> StrataResult<Self> {
        serde_json::from_str(s).map_err(|e| StrataError::serde(e.to_string()))
    }

    /// Read and parse a scene file.
    pub fn from_path(path: &Path) -> StrataResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            StrataError::evaluation(format!("failed to read scene '{}': {e}", path.display()))
        })?;
        Self::from_json(&s)
    }

    /// Instantiate the composition tree.
    pub fn build(&self, assets_root: &Path) -> StrataResult<Composition> {
        self.build_with(assets_root, CompositionOpts::default())
    }

    /// Instantiate with explicit options for every composition in the tree.
    pub fn build_with(&self, assets_root: &Path, opts: CompositionOpts) -> StrataResult<Composition> {
        let mut comp = Composition::with_opts(self.width, self.height, self.duration, opts)?;
        for (i, def) in self.layers.iter().enumerate() {
            def.attach(&mut comp, assets_root, opts)
                .map_err(|e| match e {
                    StrataError::InvalidArgument(msg) => {
                        StrataError::invalid(format!("layers[{i}]: {msg}"))
                    }
                    StrataError::Evaluation(msg) => {
                        StrataError::evaluation(format!("layers[{i}]: {msg}"))
                    }
                    other => other,
                })?;
        }
        comp.set_preview_level(self.preview_level)?;
        Ok(comp)
    }
}

impl LayerDef {
    fn attach(
        &self,
        comp: &mut Composition,
        assets_root: &Path,
        opts: CompositionOpts,
    ) -> StrataResult<()> {
        let layer_opts = self.layer_opts();
        match &self.source {
            SourceDef::Solid {
                width,
                height,
                color,
            } => comp.add_layer(SolidLayer::new(*width, *height, *color)?, layer_opts)?,
            SourceDef::Image { path } => {
                comp.add_layer(ImageLayer::open(&assets_root.join(path))?, layer_opts)?
            }
            SourceDef::Audio { path } => {
                comp.add_layer(PcmLayer::open(&assets_root.join(path))?, layer_opts)?
            }
            SourceDef::Composition { scene } => {
                comp.add_layer(scene.build_with(assets_root, opts)?, layer_opts)?
            }
        };
        Ok(())
    }

    fn layer_opts(&self) -> LayerOpts {
        LayerOpts {
            name: self.name.clone(),
            position: self.position.map(|[x, y]| Vec2::new(x, y)),
            scale: Vec2::new(self.scale[0], self.scale[1]),
            rotation: self.rotation,
            opacity: self.opacity,
            blend_mode: self.blend_mode,
            anchor_point: Vec2::new(self.anchor_point[0], self.anchor_point[1]),
            origin_point: self.origin_point,
            offset: self.offset,
            start_time: self.start_time,
            end_time: self.end_time,
            visible: self.visible,
            transform: None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/def.rs"]
mod tests;
