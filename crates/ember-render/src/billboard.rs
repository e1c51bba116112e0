//! Camera-facing point sprites
//!
//! A sprite is drawn by moving its centre into view space with the frame's
//! cached view matrix and then placing the quad there *without* the view
//! rotation, so every quad lies in the view plane. The rotation is captured
//! once per frame and shared by all sprites.

use bytemuck::{Pod, Zeroable};
use ember_core::matrix::{self, Mat4};
use ember_core::Vec3;

use crate::texture::TextureHandle;

/// Unit quad scaled to `width` x `height`, centred at the origin in the XY plane.
///
/// Corners are in triangle-strip order: top-right, top-left, bottom-right,
/// bottom-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadGeometry {
    corners: [[f32; 3]; 4],
    uvs: [[f32; 2]; 4],
}

impl QuadGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        let x = width * 0.5;
        let y = height * 0.5;
        Self {
            corners: [[x, y, 0.0], [-x, y, 0.0], [x, -y, 0.0], [-x, -y, 0.0]],
            // Texture origin is the top-left texel
            uvs: [[1.0, 0.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        }
    }

    pub fn corners(&self) -> &[[f32; 3]; 4] {
        &self.corners
    }

    pub fn width(&self) -> f32 {
        self.corners[0][0] * 2.0
    }

    pub fn height(&self) -> f32 {
        self.corners[0][1] * 2.0
    }

    /// Corners packed for the shader: xy = offset, zw = uv
    pub fn packed(&self) -> [[f32; 4]; 4] {
        let mut out = [[0.0; 4]; 4];
        for (dst, (corner, uv)) in out.iter_mut().zip(self.corners.iter().zip(&self.uvs)) {
            *dst = [corner[0], corner[1], uv[0], uv[1]];
        }
        out
    }
}

/// Snapshot of the view transform, valid for the frame it was captured in
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CachedOrientation {
    view: Mat4,
}

impl CachedOrientation {
    fn capture(view: &Mat4) -> Self {
        Self { view: *view }
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.view
    }

    /// World-space point to view space (rotation and translation)
    pub fn to_view_space(&self, world: Vec3) -> Vec3 {
        matrix::transform_point(&self.view, world)
    }
}

/// Per-sprite data uploaded to the GPU, matches WGSL `SpriteInstance`.
/// 32 bytes (2 x vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// xyz = view-space centre, w unused
    pub view_pos: [f32; 4],
    /// rgba, alpha = particle life
    pub color: [f32; 4],
}

impl SpriteInstance {
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.view_pos[0], self.view_pos[1], self.view_pos[2])
    }

    /// View-space quad corners: the cached quad translated, never rotated
    pub fn corners(&self, quad: &QuadGeometry) -> [Vec3; 4] {
        let c = self.center();
        (*quad.corners()).map(|k| c + Vec3::from_array(k))
    }
}

/// Holds the sprite texture, the prebuilt quad and the current frame's batch.
///
/// Construction is the only way to get one, so a renderer is always ready.
pub struct BillboardRenderer {
    texture: TextureHandle,
    quad: QuadGeometry,
    batch: Vec<SpriteInstance>,
}

impl BillboardRenderer {
    pub fn new(texture: TextureHandle, width: f32, height: f32) -> Self {
        log::debug!("[billboard] quad {width}x{height}, texture {texture:?}");
        Self {
            texture,
            quad: QuadGeometry::new(width, height),
            batch: Vec::new(),
        }
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn quad(&self) -> &QuadGeometry {
        &self.quad
    }

    /// Sprites emitted since the last capture
    pub fn instances(&self) -> &[SpriteInstance] {
        &self.batch
    }

    /// Snapshot `view` for this frame and start a new batch.
    ///
    /// Call after the frame's camera is final. Sprites can only be emitted
    /// through the returned frame, which borrows the renderer until dropped.
    pub fn capture_orientation(&mut self, view: &Mat4) -> BillboardFrame<'_> {
        self.batch.clear();
        BillboardFrame {
            orientation: CachedOrientation::capture(view),
            batch: &mut self.batch,
        }
    }
}

/// One frame's worth of sprite emission against a captured orientation
pub struct BillboardFrame<'a> {
    orientation: CachedOrientation,
    batch: &'a mut Vec<SpriteInstance>,
}

impl BillboardFrame<'_> {
    pub fn orientation(&self) -> &CachedOrientation {
        &self.orientation
    }

    /// Emit one sprite centred on `position` (world space)
    pub fn render(&mut self, position: Vec3, color: [f32; 4]) -> SpriteInstance {
        let center = self.orientation.to_view_space(position);
        let instance = SpriteInstance {
            view_pos: [center.x, center.y, center.z, 1.0],
            color,
        };
        self.batch.push(instance);
        instance
    }

    pub fn sprite_count(&self) -> usize {
        self.batch.len()
    }
}
