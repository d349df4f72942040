//! GPU compositor
//!
//! Draws a label map through a palette lookup with one fullscreen-triangle
//! render pipeline. The label and wall textures are uploaded once per scene
//! ([`Compositor::upload_scene`]); a fill or undo only rewrites the palette
//! texture ([`Compositor::upload_palette`]), so the cost of a color change
//! does not depend on the image size.
//!
//! Rendering targets an offscreen RGBA8 texture and reads it back as a
//! [`RasterImage`].

use crate::error::{RenderError, RenderResult};
use crate::textures::{check_region_limits, pack_labels, pack_walls, padded_bytes_per_row, unpad_rows};
use log::{debug, info};
use std::sync::mpsc;
use tintmap_core::{LabelMap, RasterImage, Viewport, WallMask};

const SHADER: &str = include_str!("shader.wgsl");
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const UNIFORM_SIZE: u64 = 32;

/// Per-frame view parameters, mirrored by `View` in the shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub viewport: Viewport,
    /// 1.0 draws walls black, 0.0 hides them
    pub outline_opacity: f32,
    pub width: u32,
    pub height: u32,
}

impl FrameParams {
    /// Unzoomed frame the size of the image
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::IDENTITY,
            outline_opacity: 1.0,
            width,
            height,
        }
    }
}

fn pack_uniforms(frame: &FrameParams, image_size: (u32, u32)) -> [u8; UNIFORM_SIZE as usize] {
    let mut bytes = [0u8; UNIFORM_SIZE as usize];
    bytes[0..4].copy_from_slice(&(frame.viewport.offset_x as f32).to_le_bytes());
    bytes[4..8].copy_from_slice(&(frame.viewport.offset_y as f32).to_le_bytes());
    bytes[8..12].copy_from_slice(&(frame.viewport.zoom as f32).to_le_bytes());
    bytes[12..16].copy_from_slice(&frame.outline_opacity.clamp(0.0, 1.0).to_le_bytes());
    bytes[16..20].copy_from_slice(&image_size.0.to_le_bytes());
    bytes[20..24].copy_from_slice(&image_size.1.to_le_bytes());
    bytes
}

/// Textures of the current label map
struct Scene {
    width: u32,
    height: u32,
    max_region_id: u32,
    palette: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Offscreen region compositor
pub struct Compositor {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniforms: wgpu::Buffer,
    scene: Option<Scene>,
    max_texture_dimension: u32,
}

impl Compositor {
    /// Create a compositor on the default adapter
    ///
    /// Fails with [`RenderError::NoAdapter`] when the machine has no usable
    /// GPU; there is no software fallback.
    pub fn new() -> RenderResult<Self> {
        pollster::block_on(Self::new_async())
    }

    /// Async form of [`Compositor::new`]
    pub async fn new_async() -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;
        let info = adapter.get_info();
        info!("compositor adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("tintmap compositor"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;
        let max_texture_dimension = device.limits().max_texture_dimension_2d;

        let texture_entry = |binding: u32, sample_type: wgpu::TextureSampleType| {
            wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("compositor bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1, wgpu::TextureSampleType::Uint),
                texture_entry(2, wgpu::TextureSampleType::Uint),
                texture_entry(3, wgpu::TextureSampleType::Float { filterable: false }),
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("compositor shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("compositor pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("compositor pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("compositor uniforms"),
            size: UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            uniforms,
            scene: None,
            max_texture_dimension,
        })
    }

    /// Largest 2D texture side the device accepts
    pub fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    /// Dimensions of the uploaded label map
    pub fn scene_size(&self) -> Option<(u32, u32)> {
        self.scene.as_ref().map(|s| (s.width, s.height))
    }

    fn create_texture(
        &self,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        bytes_per_texel: u32,
        data: &[u8],
    ) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.write_texture(&texture, width, height, bytes_per_texel, data);
        texture
    }

    fn write_texture(
        &self,
        texture: &wgpu::Texture,
        width: u32,
        height: u32,
        bytes_per_texel: u32,
        data: &[u8],
    ) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * bytes_per_texel),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Upload a new label map and wall mask
    ///
    /// Called on reprocess only. The palette starts with every region
    /// uncolored.
    pub fn upload_scene(&mut self, labels: &LabelMap, mask: &WallMask) -> RenderResult<()> {
        mask.check_same_size(labels.width(), labels.height())?;
        let (width, height) = labels.dimensions();
        if width > self.max_texture_dimension || height > self.max_texture_dimension {
            return Err(RenderError::DimensionMismatch {
                expected: (self.max_texture_dimension, self.max_texture_dimension),
                actual: (width, height),
            });
        }
        let max_region_id = labels.max_region_id();
        check_region_limits(max_region_id, self.max_texture_dimension)?;

        let label_tex = self.create_texture(
            "labels",
            width,
            height,
            wgpu::TextureFormat::R16Uint,
            2,
            &pack_labels(labels)?,
        );
        let wall_tex = self.create_texture(
            "walls",
            width,
            height,
            wgpu::TextureFormat::R8Uint,
            1,
            &pack_walls(mask),
        );
        let uncolored = tintmap_core::RegionColorMap::new().palette_texels(max_region_id);
        let palette = self.create_texture(
            "palette",
            max_region_id + 1,
            1,
            wgpu::TextureFormat::Rgba8Unorm,
            4,
            &uncolored,
        );

        let label_view = label_tex.create_view(&wgpu::TextureViewDescriptor::default());
        let wall_view = wall_tex.create_view(&wgpu::TextureViewDescriptor::default());
        let palette_view = palette.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("compositor bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&label_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&wall_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&palette_view),
                },
            ],
        });

        debug!(
            "uploaded scene {}x{} with {} regions",
            width, height, max_region_id
        );
        self.scene = Some(Scene {
            width,
            height,
            max_region_id,
            palette,
            bind_group,
        });
        Ok(())
    }

    /// Rewrite the palette texture
    ///
    /// `texels` comes from [`tintmap_core::RegionColorMap::palette_texels`]
    /// for the uploaded scene's max region id.
    pub fn upload_palette(&mut self, texels: &[u8]) -> RenderResult<()> {
        let scene = self.scene.as_ref().ok_or(RenderError::NoScene)?;
        let width = scene.max_region_id + 1;
        if texels.len() != width as usize * 4 {
            return Err(RenderError::DimensionMismatch {
                expected: (width, 1),
                actual: ((texels.len() / 4) as u32, 1),
            });
        }
        self.write_texture(&scene.palette, width, 1, 4, texels);
        Ok(())
    }

    /// Draw one frame and read it back
    pub fn render(&self, frame: &FrameParams) -> RenderResult<RasterImage> {
        let scene = self.scene.as_ref().ok_or(RenderError::NoScene)?;
        let (width, height) = (frame.width, frame.height);
        if width == 0
            || height == 0
            || width > self.max_texture_dimension
            || height > self.max_texture_dimension
        {
            return Err(RenderError::DimensionMismatch {
                expected: (scene.width, scene.height),
                actual: (width, height),
            });
        }
        self.queue.write_buffer(
            &self.uniforms,
            0,
            &pack_uniforms(frame, (scene.width, scene.height)),
        );

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let target = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("compositor target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let unpadded = width * 4;
        let padded = padded_bytes_per_row(unpadded);
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("compositor readback"),
            size: padded as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut enc = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("compositor enc"),
            });
        {
            let mut pass = enc.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("compositor pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &scene.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        enc.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            size,
        );
        self.queue.submit(std::iter::once(enc.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        let _ = self.device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|e| RenderError::Readback(e.to_string()))?
            .map_err(|e| RenderError::Readback(e.to_string()))?;

        let data = {
            let mapped = slice.get_mapped_range();
            unpad_rows(&mapped, unpadded as usize, padded as usize, height as usize)
        };
        readback.unmap();
        Ok(RasterImage::from_rgba(width, height, data)?)
    }
}
