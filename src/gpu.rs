//! Immediate-mode GPU scene recording and the wgpu submission seam.
//!
//! Desklet and data-renderer code records a `GpuFrame`: a matrix-stack
//! command list plus named bounding quads. The same recording path serves
//! normal rendering (commands replayed by the backend) and selection-mode
//! picking (quads projected in software against a 2x2 pick window), which
//! keeps the two numerically consistent.

use std::collections::HashMap;

use tiny_skia::Pixmap;
use wgpu::util::DeviceExt;

use crate::geometry::Mat4;

/// Handle of a texture in the cache. `0` is never allocated, so a raw `u32`
/// name taken from a quad always maps back to a real texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Owns the raster copies of every texture uploaded to the GPU. The raster
/// side is the source of truth: submission uploads from here, and deleting a
/// texture invalidates both sides at once.
#[derive(Default)]
pub struct TextureCache {
    next: u32,
    pixmaps: HashMap<u32, Pixmap>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_from_pixmap(&mut self, pixmap: &Pixmap) -> TextureId {
        self.next += 1;
        self.pixmaps.insert(self.next, pixmap.clone());
        TextureId(self.next)
    }

    pub fn delete(&mut self, id: TextureId) {
        self.pixmaps.remove(&id.0);
    }

    pub fn pixmap(&self, id: TextureId) -> Option<&Pixmap> {
        self.pixmaps.get(&id.0)
    }

    pub fn len(&self) -> usize {
        self.pixmaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixmaps.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum GpuCommand {
    Texture {
        texture: TextureId,
        width: f32,
        height: f32,
        alpha: f32,
        matrix: Mat4,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct NamedQuad {
    pub name: u32,
    /// Corners after the model matrix, counter-clockwise from top-left.
    pub corners: [[f32; 3]; 4],
}

#[derive(Debug, Clone, Copy)]
struct PickWindow {
    x: f32,
    y: f32,
    viewport_w: f32,
    viewport_h: f32,
}

pub struct GpuFrame {
    projection: Mat4,
    matrix: Mat4,
    stack: Vec<Mat4>,
    alpha: f32,
    current_name: u32,
    commands: Vec<GpuCommand>,
    quads: Vec<NamedQuad>,
    pick: Option<PickWindow>,
}

impl GpuFrame {
    pub fn new(projection: Mat4) -> Self {
        Self {
            projection,
            matrix: Mat4::IDENTITY,
            stack: Vec::new(),
            alpha: 1.0,
            current_name: 0,
            commands: Vec::new(),
            quads: Vec::new(),
            pick: None,
        }
    }

    /// Starts a selection pass restricted to a 2x2 pixel window centered on
    /// the cursor. `y` is given in GL viewport coordinates (origin bottom).
    pub fn begin_selection(&mut self, x: f32, y: f32, viewport_w: f32, viewport_h: f32) {
        self.pick = Some(PickWindow {
            x,
            y,
            viewport_w,
            viewport_h,
        });
        self.quads.clear();
    }

    pub fn in_selection(&self) -> bool {
        self.pick.is_some()
    }

    pub fn push_matrix(&mut self) {
        self.stack.push(self.matrix);
    }

    pub fn pop_matrix(&mut self) {
        if let Some(m) = self.stack.pop() {
            self.matrix = m;
        }
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.matrix = self.matrix.mul(&Mat4::translation(x, y, z));
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.matrix = self.matrix.mul(&Mat4::scaling(x, y, z));
    }

    pub fn rotate_z(&mut self, radians: f32) {
        self.matrix = self.matrix.mul(&Mat4::rotation_z(radians));
    }

    pub fn apply(&mut self, m: &Mat4) {
        self.matrix = self.matrix.mul(m);
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn load_name(&mut self, name: u32) {
        self.current_name = name;
    }

    /// Draws `texture` as a `width` x `height` quad centered on the origin of
    /// the current frame; in selection mode only the bounding quad is kept.
    pub fn draw_texture_at_size(&mut self, texture: TextureId, width: f32, height: f32) {
        if self.pick.is_none() {
            self.commands.push(GpuCommand::Texture {
                texture,
                width,
                height,
                alpha: self.alpha,
                matrix: self.matrix,
            });
        }
        self.quad_centered(texture.0, width, height);
    }

    /// Records a named axis-aligned quad centered at (x, y) in the current
    /// frame, under the name previously set by `load_name`.
    pub fn quad(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let name = self.current_name;
        let w = width / 2.0;
        let h = height / 2.0;
        let local = [
            [x - w, y + h, 0.0],
            [x + w, y + h, 0.0],
            [x + w, y - h, 0.0],
            [x - w, y - h, 0.0],
        ];
        let corners = local.map(|p| {
            let v = self.matrix.transform_point(p);
            [v[0], v[1], v[2]]
        });
        self.quads.push(NamedQuad { name, corners });
    }

    fn quad_centered(&mut self, name: u32, width: f32, height: f32) {
        let saved = self.current_name;
        self.current_name = name;
        self.quad(0.0, 0.0, width, height);
        self.current_name = saved;
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    pub fn quads(&self) -> &[NamedQuad] {
        &self.quads
    }

    /// Resolves the selection pass: projects every named quad and returns the
    /// name of the nearest one overlapping the pick window, if any.
    pub fn nearest_hit(&self) -> Option<u32> {
        let pick = self.pick?;
        let px0 = pick.x - 1.0;
        let px1 = pick.x + 1.0;
        let py0 = pick.y - 1.0;
        let py1 = pick.y + 1.0;

        let mut best: Option<(f32, u32)> = None;
        for quad in &self.quads {
            let mut min_x = f32::MAX;
            let mut max_x = f32::MIN;
            let mut min_y = f32::MAX;
            let mut max_y = f32::MIN;
            let mut min_z = f32::MAX;
            let mut visible = false;
            for corner in quad.corners {
                let clip = self.projection.transform_point(corner);
                if clip[3] <= 0.0 {
                    continue;
                }
                visible = true;
                let ndc_x = clip[0] / clip[3];
                let ndc_y = clip[1] / clip[3];
                let ndc_z = clip[2] / clip[3];
                let sx = (ndc_x + 1.0) / 2.0 * pick.viewport_w;
                let sy = (ndc_y + 1.0) / 2.0 * pick.viewport_h;
                min_x = min_x.min(sx);
                max_x = max_x.max(sx);
                min_y = min_y.min(sy);
                max_y = max_y.max(sy);
                min_z = min_z.min(ndc_z);
            }
            if !visible || max_x < px0 || min_x > px1 || max_y < py0 || min_y > py1 {
                continue;
            }
            match best {
                Some((z, _)) if z <= min_z => {}
                _ => best = Some((min_z, quad.name)),
            }
        }
        best.map(|(_, name)| name)
    }
}

/// GPU-side vertex of a textured quad.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Two triangles covering a `width` x `height` quad centered on the origin,
/// texture origin at the top-left.
pub fn quad_vertices(width: f32, height: f32) -> [Vertex; 6] {
    let w = width / 2.0;
    let h = height / 2.0;
    let tl = Vertex {
        position: [-w, h, 0.0],
        tex_coords: [0.0, 0.0],
    };
    let tr = Vertex {
        position: [w, h, 0.0],
        tex_coords: [1.0, 0.0],
    };
    let br = Vertex {
        position: [w, -h, 0.0],
        tex_coords: [1.0, 1.0],
    };
    let bl = Vertex {
        position: [-w, -h, 0.0],
        tex_coords: [0.0, 1.0],
    };
    [tl, bl, br, tl, br, tr]
}

/// Per-draw uniform block: projection * model matrix, draw alpha in `tint.x`.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub transform: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

const SHADER: &str = r#"
struct Uniforms {
    transform: mat4x4<f32>,
    tint: vec4<f32>,
};

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(1) @binding(0) var t_color: texture_2d<f32>;
@group(1) @binding(1) var s_color: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) tex_coords: vec2<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.transform * vec4<f32>(position, 1.0);
    out.tex_coords = tex_coords;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // Textures are uploaded premultiplied; scaling every channel keeps them so.
    return textureSample(t_color, s_color, in.tex_coords) * uniforms.tint.x;
}
"#;

/// Backend seam: a submission layer replays a recorded frame into a render
/// pass, resolving texture ids through the cache.
pub trait Renderer {
    /// Uploads any missing textures and builds the per-draw buffers for one
    /// recorded frame.
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &GpuFrame,
        textures: &TextureCache,
    );

    /// Replays the prepared draws into a render pass.
    fn submit(&mut self, rpass: &mut wgpu::RenderPass<'_>, pipeline: &wgpu::RenderPipeline);
}

struct PreparedDraw {
    texture: u32,
    vertices: wgpu::Buffer,
    uniform: wgpu::BindGroup,
}

pub struct WgpuRenderer {
    sampler: wgpu::Sampler,
    texture_layout: wgpu::BindGroupLayout,
    uniform_layout: wgpu::BindGroupLayout,
    bindings: HashMap<u32, wgpu::BindGroup>,
    draws: Vec<PreparedDraw>,
}

impl WgpuRenderer {
    pub fn new(device: &wgpu::Device) -> Self {
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("desklet texture layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("desklet uniform layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("desklet sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            sampler,
            texture_layout,
            uniform_layout,
            bindings: HashMap::new(),
            draws: Vec::new(),
        }
    }

    /// Builds the textured-quad pipeline matching the renderer's bind group
    /// layouts, for the embedding's surface format.
    pub fn create_pipeline(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("desklet shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("desklet pipeline layout"),
            bind_group_layouts: &[&self.uniform_layout, &self.texture_layout],
            push_constant_ranges: &[],
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("desklet pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn binding_for(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: TextureId,
        textures: &TextureCache,
    ) -> bool {
        if self.bindings.contains_key(&id.0) {
            return true;
        }
        let Some(pixmap) = textures.pixmap(id) else {
            return false;
        };
        let texture = Self::upload_pixmap(device, queue, pixmap);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("desklet texture binding"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        self.bindings.insert(id.0, bind_group);
        true
    }

    /// Uploads a pixmap as an RGBA texture, padding rows to the copy
    /// alignment the way the queue requires.
    pub fn upload_pixmap(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pixmap: &Pixmap,
    ) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: pixmap.width(),
            height: pixmap.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("desklet texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        const COPY_BYTES_PER_ROW_ALIGNMENT: usize = 256;
        let bytes_per_pixel = 4;
        let unpadded_bytes_per_row = pixmap.width() as usize * bytes_per_pixel;
        let padded_bytes_per_row = (unpadded_bytes_per_row + COPY_BYTES_PER_ROW_ALIGNMENT - 1)
            / COPY_BYTES_PER_ROW_ALIGNMENT
            * COPY_BYTES_PER_ROW_ALIGNMENT;

        let mut padded = vec![0u8; padded_bytes_per_row * pixmap.height() as usize];
        for y in 0..pixmap.height() as usize {
            let dst = y * padded_bytes_per_row;
            let src = y * unpadded_bytes_per_row;
            padded[dst..dst + unpadded_bytes_per_row]
                .copy_from_slice(&pixmap.data()[src..src + unpadded_bytes_per_row]);
        }

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &padded,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row as u32),
                rows_per_image: Some(pixmap.height()),
            },
            size,
        );
        texture
    }
}

impl Renderer for WgpuRenderer {
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &GpuFrame,
        textures: &TextureCache,
    ) {
        self.draws.clear();
        // Entries deleted from the cache drop their GPU side here.
        self.bindings
            .retain(|id, _| textures.pixmap(TextureId(*id)).is_some());

        for command in frame.commands() {
            let GpuCommand::Texture {
                texture,
                width,
                height,
                alpha,
                matrix,
            } = *command;
            if !self.binding_for(device, queue, texture, textures) {
                continue;
            }
            let uniform = TransformUniform {
                transform: frame.projection().mul(&matrix).0,
                tint: [alpha, 0.0, 0.0, 0.0],
            };
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("desklet draw uniform"),
                contents: bytemuck::bytes_of(&uniform),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let uniform_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("desklet draw binding"),
                layout: &self.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("desklet quad"),
                contents: bytemuck::cast_slice(&quad_vertices(width, height)),
                usage: wgpu::BufferUsages::VERTEX,
            });
            self.draws.push(PreparedDraw {
                texture: texture.0,
                vertices,
                uniform: uniform_group,
            });
        }
    }

    fn submit(&mut self, rpass: &mut wgpu::RenderPass<'_>, pipeline: &wgpu::RenderPipeline) {
        rpass.set_pipeline(pipeline);
        for draw in &self.draws {
            let Some(binding) = self.bindings.get(&draw.texture) else {
                continue;
            };
            rpass.set_bind_group(0, &draw.uniform, &[]);
            rpass.set_bind_group(1, binding, &[]);
            rpass.set_vertex_buffer(0, draw.vertices.slice(..));
            rpass.draw(0..6, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_vertices_cover_the_size() {
        let v = quad_vertices(10.0, 4.0);
        for vert in &v {
            assert_eq!(vert.position[0].abs(), 5.0);
            assert_eq!(vert.position[1].abs(), 2.0);
        }
        // Texture y grows downward while quad y grows upward.
        assert_eq!(v[0].position[1], 2.0);
        assert_eq!(v[0].tex_coords[1], 0.0);
        assert_eq!(v[1].position[1], -2.0);
        assert_eq!(v[1].tex_coords[1], 1.0);
    }

    #[test]
    fn frame_records_one_command_per_texture_draw() {
        let mut frame = GpuFrame::new(Mat4::IDENTITY);
        frame.translate(1.0, 2.0, 0.0);
        frame.set_alpha(0.5);
        frame.draw_texture_at_size(TextureId(3), 8.0, 8.0);

        assert_eq!(frame.commands().len(), 1);
        let GpuCommand::Texture {
            texture,
            alpha,
            matrix,
            ..
        } = frame.commands()[0];
        assert_eq!(texture, TextureId(3));
        assert_eq!(alpha, 0.5);
        assert_eq!(matrix.0[3][0], 1.0);
        assert_eq!(matrix.0[3][1], 2.0);
    }
}
