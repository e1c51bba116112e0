//! Offscreen target for snapshot rendering

use crate::context::{request_device, RenderError};
use image::RgbaImage;

/// wgpu device plus a colour texture that stands in for a window surface
pub struct HeadlessContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    pub color_texture: wgpu::Texture,
    pub color_view: wgpu::TextureView,
}

impl HeadlessContext {
    pub async fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let (adapter, device, queue) =
            request_device(&instance, None, "Ember Headless Device").await?;
        log::info!("[render] headless on {}", adapter.get_info().name);

        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let color_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Snapshot Color Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            device,
            queue,
            format,
            width,
            height,
            color_texture,
            color_view,
        })
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Copy the colour texture back to the CPU
    pub fn read_image(&self) -> Result<RgbaImage, RenderError> {
        let layout = RowLayout::new(self.width);
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Snapshot Readback Buffer"),
            size: layout.padded as u64 * self.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Snapshot Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(layout.padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| RenderError::BufferReadFailed(e.to_string()))?
            .map_err(|e| RenderError::BufferReadFailed(e.to_string()))?;

        let pixels = layout.unpad(&slice.get_mapped_range());
        staging.unmap();

        RgbaImage::from_raw(self.width, self.height, pixels).ok_or_else(|| {
            RenderError::BufferReadFailed("readback size does not match target".to_string())
        })
    }
}

/// Row pitch of a texture-to-buffer copy, padded to wgpu's alignment
struct RowLayout {
    unpadded: u32,
    padded: u32,
}

impl RowLayout {
    fn new(width: u32) -> Self {
        let unpadded = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        Self {
            unpadded,
            padded: unpadded.div_ceil(align) * align,
        }
    }

    fn unpad(&self, data: &[u8]) -> Vec<u8> {
        data.chunks(self.padded as usize)
            .flat_map(|row| &row[..self.unpadded as usize])
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_layout_pads_to_alignment() {
        let layout = RowLayout::new(10);
        assert_eq!(layout.unpadded, 40);
        assert_eq!(layout.padded, 256);

        let aligned = RowLayout::new(64);
        assert_eq!(aligned.padded, aligned.unpadded);
    }

    #[test]
    fn unpad_strips_row_padding() {
        let layout = RowLayout::new(1);
        let mut data = vec![0u8; layout.padded as usize * 2];
        data[..4].copy_from_slice(&[1, 2, 3, 4]);
        let second = layout.padded as usize;
        data[second..second + 4].copy_from_slice(&[5, 6, 7, 8]);
        assert_eq!(layout.unpad(&data), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
