//! Ember Render - wgpu point-sprite renderer
//!
//! Draws particles as textured, additively blended quads that always face
//! the viewer. `BillboardRenderer` collects a frame's sprites on the CPU;
//! `BillboardPipeline` uploads and draws them into a window surface or an
//! offscreen snapshot target.

pub mod billboard;
pub mod billboard_pipeline;
mod camera;
mod context;
mod headless;
mod texture;

pub use billboard::{
    BillboardFrame, BillboardRenderer, CachedOrientation, QuadGeometry, SpriteInstance,
};
pub use billboard_pipeline::{BillboardPipeline, BillboardUniforms};
pub use camera::Camera;
pub use context::{RenderContext, RenderError};
pub use headless::HeadlessContext;
pub use texture::{radial_sprite, GpuTexture, TextureCache, TextureHandle};
