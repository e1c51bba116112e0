//! GPU texture cache: sprite uploads plus a white fallback

use crate::context::RenderError;
use image::{Rgba, RgbaImage};
use std::path::Path;
use wgpu::util::DeviceExt;

/// Opaque reference to a texture in a `TextureCache`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    /// The cache's built-in 1x1 white texture
    pub const WHITE: Self = Self(0);
}

/// A GPU-resident texture with its view and sampler
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Cache of GPU textures addressed by handle. Slot 0 is always white.
pub struct TextureCache {
    textures: Vec<GpuTexture>,
}

impl TextureCache {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = Self::create_texture(device, queue, "Default White", 1, 1, &[255; 4]);
        Self {
            textures: vec![white],
        }
    }

    fn create_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> GpuTexture {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            rgba,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        GpuTexture {
            texture,
            view,
            sampler,
        }
    }

    /// Upload tightly packed RGBA8 pixels
    pub fn upload_rgba(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle, RenderError> {
        check_dimensions(width, height, rgba.len())?;
        let texture = Self::create_texture(device, queue, label, width, height, rgba);
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(texture);
        log::info!("[texture] Uploaded '{label}' ({width}x{height})");
        Ok(handle)
    }

    /// Load an image file (BMP, PNG, ...) from disk
    pub fn load_file(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<TextureHandle, RenderError> {
        let img = image::open(path).map_err(|e| RenderError::TextureLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let label = path.display().to_string();
        self.upload_rgba(device, queue, &label, width, height, &rgba)
    }

    /// Get a texture; unknown handles resolve to the white fallback
    pub fn get(&self, handle: TextureHandle) -> &GpuTexture {
        self.textures
            .get(handle.0 as usize)
            .unwrap_or(&self.textures[0])
    }
}

fn check_dimensions(width: u32, height: u32, len: usize) -> Result<(), RenderError> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 || len != expected {
        return Err(RenderError::InvalidTextureData {
            width,
            height,
            len,
        });
    }
    Ok(())
}

/// Soft round sprite: bright centre falling off to black at the edge.
/// Alpha stays opaque; brightness carries the shape under additive blending.
pub fn radial_sprite(size: u32) -> RgbaImage {
    let size = size.max(1);
    let half = size as f32 * 0.5;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = (x as f32 + 0.5 - half) / half;
        let dy = (y as f32 + 0.5 - half) / half;
        let falloff = (1.0 - (dx * dx + dy * dy).sqrt()).max(0.0);
        let v = (falloff * falloff * 255.0).round() as u8;
        Rgba([v, v, v, 255])
    })
}
