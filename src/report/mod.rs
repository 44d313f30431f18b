//! HTML heatmap generation for the ranked tests' smoothed flip rates.

mod render;

pub use render::Renderer;
