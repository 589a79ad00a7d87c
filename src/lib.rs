//! Extruded glyph showcase built around a small, configurable shading model.
//!
//! The scene is a pulsing cube carrying a point light and two extruded text
//! meshes lit by it. The [`shading`] module holds the per-point color
//! computation; the software renderer evaluates it on the CPU and the GPU
//! renderer runs an equivalent WGSL program.

pub mod app;
pub mod config;
pub mod font;
pub mod input;
pub mod material;
pub mod mesh;
pub mod render;
pub mod scene;
pub mod shading;
pub mod text;

pub use app::{run_windowed, WindowInitError};
pub use config::{ShowcaseConfig, Variant};
pub use font::{load_font, FontError, FontSource, StrokeFont};
pub use input::{action_for_key, KeyCode, NamedKey, SceneAction};
pub use material::Material;
pub use mesh::Mesh;
pub use render::{GpuRenderer, RenderStats, SoftwareRenderer};
pub use scene::{FrameSnapshot, SceneContext};
pub use shading::{shade, Color, ShadingModel, ShadingParameters, SurfacePoint};
pub use text::{build_text_mesh, TextOptions};
