//! sketchstep-render: Step canvas rasterization.
//!
//! Draws one planned drawing step at a time onto a white, gridded paper
//! canvas: muted strokes for what was drawn before, highlighted strokes
//! for what is new, an optional start marker, an optional tone hatch for
//! the shading step, and a text header.
//!
//! Rendering is stateless. Every input arrives through [`StepScene`], so
//! two calls with the same scene produce identical pixels.

pub mod canvas;
pub mod error;
pub mod render;
pub mod text;

pub use canvas::{CanvasOptions, DrawArea, Footprint, PaperSize};
pub use error::RenderError;
pub use render::{Shading, StepScene, render_step, save_png};
