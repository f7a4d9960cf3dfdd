//! Offscreen rendering and PNG encoding for export.

use roundel_render::{PngRenderResult, RendererError};
use vello::peniko::Color;
use vello::wgpu;
use vello::{AaConfig, RenderParams, Scene};

/// Errors from exporting the view as PNG.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Nothing to export")]
    Empty,
}

/// An Rgba8Unorm texture Vello can render into.
///
/// Vello needs storage binding, which Bgra8 surface formats don't offer.
pub(crate) fn render_target(device: &wgpu::Device, label: &str, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::STORAGE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

/// Render a Vello scene offscreen and read the pixels back (blocking).
pub(crate) fn render_scene_to_png(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    vello_renderer: &mut vello::Renderer,
    scene: &Scene,
    width: u32,
    height: u32,
) -> Result<PngRenderResult, ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::Empty);
    }

    let texture = render_target(device, "png export texture", width, height);
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    // Transparent base so the area outside the circle stays clear.
    let params = RenderParams {
        base_color: Color::TRANSPARENT,
        width,
        height,
        antialiasing_method: AaConfig::Area,
    };
    vello_renderer
        .render_to_texture(device, queue, scene, &texture_view, &params)
        .map_err(|e| RendererError::RenderFailed(format!("{:?}", e)))?;

    let bytes_per_row = (width * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
    let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("png readback buffer"),
        size: u64::from(bytes_per_row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("png copy encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let buffer_slice = readback_buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).ok();
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| RendererError::Readback(e.to_string()))?;

    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(RendererError::Readback(e.to_string()).into()),
        Err(e) => return Err(RendererError::Readback(e.to_string()).into()),
    }

    let data = buffer_slice.get_mapped_range();
    let rgba_data = unpad_rows(&data, width, height, bytes_per_row);
    drop(data);
    readback_buffer.unmap();

    Ok(PngRenderResult {
        rgba_data,
        width,
        height,
    })
}

/// Strip per-row alignment padding from a readback buffer.
fn unpad_rows(data: &[u8], width: u32, height: u32, bytes_per_row: u32) -> Vec<u8> {
    let row_len = (width * 4) as usize;
    let mut rgba = Vec::with_capacity(row_len * height as usize);
    for row in data.chunks(bytes_per_row as usize).take(height as usize) {
        rgba.extend_from_slice(&row[..row_len.min(row.len())]);
    }
    rgba
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
        writer.finish()?;
    }
    Ok(png_data)
}
