//! Per-frame simulation and sprite emission shared by both players

use std::path::{Path, PathBuf};

use ember_core::Result;
use ember_particles::{ParticleConfig, ParticleSystem};
use ember_render::{
    radial_sprite, BillboardRenderer, Camera, RenderError, TextureCache, TextureHandle,
};
use ember_runtime::RuntimeSystem;

/// Edge length of every sprite quad, in world units
pub const SPRITE_SIZE: f32 = 1.0;

/// Side of the generated sprite used when no texture file is given
const GENERATED_SPRITE_SIZE: u32 = 64;

/// Everything the players need to know, resolved from the command line
#[derive(Clone, Debug)]
pub struct PlayerOptions {
    pub config: ParticleConfig,
    pub texture: Option<PathBuf>,
    pub seed: u32,
    pub fps: f64,
    pub pacing: bool,
    pub fullscreen: bool,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            config: ParticleConfig::default(),
            texture: None,
            seed: 1,
            fps: 50.0,
            pacing: true,
            fullscreen: false,
        }
    }
}

/// Load the sprite from `path`, or generate a soft round one
pub fn load_sprite_texture(
    cache: &mut TextureCache,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: Option<&Path>,
) -> std::result::Result<TextureHandle, RenderError> {
    match path {
        Some(path) => cache.load_file(device, queue, path),
        None => {
            let img = radial_sprite(GENERATED_SPRITE_SIZE);
            let (width, height) = img.dimensions();
            cache.upload_rgba(device, queue, "Generated Sprite", width, height, &img)
        }
    }
}

/// The fountain: particles, camera and this frame's sprites
pub struct FountainScene {
    particles: ParticleSystem,
    camera: Camera,
    billboards: BillboardRenderer,
}

impl FountainScene {
    pub fn new(
        config: ParticleConfig,
        seed: u32,
        texture: TextureHandle,
        aspect: f32,
    ) -> Result<Self> {
        let mut particles = ParticleSystem::new(config, seed)?;
        particles.initialize()?;
        let camera = Camera {
            aspect,
            ..Camera::default()
        };
        Ok(Self {
            particles,
            camera,
            billboards: BillboardRenderer::new(texture, SPRITE_SIZE, SPRITE_SIZE),
        })
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn billboards(&self) -> &BillboardRenderer {
        &self.billboards
    }

    /// Simulate `dt` seconds, move the camera, then emit one sprite per live
    /// particle against the new view. Returns the sprite count.
    pub fn advance(&mut self, dt: f64) -> Result<usize> {
        self.particles.update(dt)?;
        self.camera.advance(dt as f32);

        let view = self.camera.view_matrix();
        let mut frame = self.billboards.capture_orientation(&view);
        for particle in self.particles.pool().alive() {
            frame.render(particle.position, particle.rgba());
        }
        Ok(frame.sprite_count())
    }

    pub fn shutdown(&mut self) -> Result<()> {
        self.particles.shutdown()
    }
}
