pub mod gpu;
mod shader;
pub mod software;

pub use gpu::GpuRenderer;
pub use software::{RenderStats, SoftwareRenderer};
