#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use std::borrow::Cow;
    use std::collections::BTreeMap;
    use std::num::NonZeroU64;

    use gpu::{
        PhysicalSize, RenderBackend, RenderError, RenderFrame, ResourceId, ResourceIds,
        ResourceKind,
    };
    use scene::components::{Material, Shape3D};
    use scene::texture::TextureImage;
    use tracing::{debug, warn};

    use crate::mesh::{Topology, build_mesh};
    use crate::uniforms::{DrawUniform, Globals, draw_order, draw_stride};

    const SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    ambient: vec4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    eye: vec4<f32>,
};

struct Draw {
    model: mat4x4<f32>,
    color: vec4<f32>,
    emissive: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> draw: Draw;

@group(2) @binding(0)
var albedo: texture_2d<f32>;
@group(2) @binding(1)
var albedo_sampler: sampler;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> VsOut {
    let world = draw.model * vec4<f32>(position, 1.0);
    var out: VsOut;
    out.pos = globals.view_proj * world;
    out.world_pos = world.xyz;
    out.normal = (draw.model * vec4<f32>(normal, 0.0)).xyz;
    out.uv = uv;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let texel = textureSample(albedo, albedo_sampler, in.uv);
    let tint = select(vec4<f32>(1.0), texel, draw.params.y > 0.5);
    let base = draw.color * tint;

    var rgb = base.rgb;
    if (draw.params.x > 0.5) {
        let n = normalize(in.normal);
        let l = normalize(globals.light_dir.xyz);
        let diffuse = max(dot(n, l), 0.0);
        rgb = base.rgb * (globals.ambient.rgb + globals.light_color.rgb * diffuse);
        if (draw.params.x > 1.5) {
            let v = normalize(globals.eye.xyz - in.world_pos);
            let h = normalize(l + v);
            let spec = pow(max(dot(n, h), 0.0), max(draw.emissive.w, 1.0));
            rgb = rgb + globals.light_color.rgb * spec * 0.0667;
        }
    }
    return vec4<f32>(rgb + draw.emissive.rgb, base.a);
}
"#;

    struct GpuMesh {
        vertices: ::wgpu::Buffer,
        indices: ::wgpu::Buffer,
        index_count: u32,
        topology: Topology,
    }

    struct GpuTexture {
        texture: ::wgpu::Texture,
        bind_group: ::wgpu::BindGroup,
    }

    struct Pipelines {
        opaque: ::wgpu::RenderPipeline,
        blended: ::wgpu::RenderPipeline,
        lines: ::wgpu::RenderPipeline,
    }

    struct Gpu {
        _instance: ::wgpu::Instance,
        surface: ::wgpu::Surface<'static>,
        device: ::wgpu::Device,
        queue: ::wgpu::Queue,
        config: ::wgpu::SurfaceConfiguration,
        depth_view: ::wgpu::TextureView,
        pipelines: Pipelines,
        globals_buffer: ::wgpu::Buffer,
        globals_bind_group: ::wgpu::BindGroup,
        draw_layout: ::wgpu::BindGroupLayout,
        draw_stride: u64,
        draw_capacity: u64,
        draw_buffer: ::wgpu::Buffer,
        draw_bind_group: ::wgpu::BindGroup,
        texture_layout: ::wgpu::BindGroupLayout,
        sampler: ::wgpu::Sampler,
        white: GpuTexture,
        meshes: BTreeMap<ResourceId, GpuMesh>,
        materials: BTreeMap<ResourceId, Material>,
        textures: BTreeMap<ResourceId, GpuTexture>,
    }

    /// WebGL2-backed renderer drawing into one canvas.
    pub struct WgpuBackend {
        gpu: Option<Gpu>,
        ids: ResourceIds,
        size: PhysicalSize,
    }

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("tracker-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn create_draw_buffer(
        device: &::wgpu::Device,
        layout: &::wgpu::BindGroupLayout,
        capacity: u64,
    ) -> (::wgpu::Buffer, ::wgpu::BindGroup) {
        let buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("tracker-draws"),
            size: capacity,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("tracker-draws-bg"),
            layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: ::wgpu::BindingResource::Buffer(::wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn upload_texture(
        device: &::wgpu::Device,
        queue: &::wgpu::Queue,
        layout: &::wgpu::BindGroupLayout,
        sampler: &::wgpu::Sampler,
        image: &TextureImage,
    ) -> GpuTexture {
        let texture = device.create_texture_with_data(
            queue,
            &::wgpu::TextureDescriptor {
                label: Some("tracker-texture"),
                size: ::wgpu::Extent3d {
                    width: image.width(),
                    height: image.height(),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: ::wgpu::TextureDimension::D2,
                format: ::wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            ::wgpu::util::TextureDataOrder::LayerMajor,
            image.pixels(),
        );
        let view = texture.create_view(&::wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("tracker-texture-bg"),
            layout,
            entries: &[
                ::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ::wgpu::BindingResource::TextureView(&view),
                },
                ::wgpu::BindGroupEntry {
                    binding: 1,
                    resource: ::wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });
        GpuTexture {
            texture,
            bind_group,
        }
    }

    fn create_pipeline(
        device: &::wgpu::Device,
        layout: &::wgpu::PipelineLayout,
        shader: &::wgpu::ShaderModule,
        format: ::wgpu::TextureFormat,
        topology: ::wgpu::PrimitiveTopology,
        blended: bool,
        label: &'static str,
    ) -> ::wgpu::RenderPipeline {
        device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: ::wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[::wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<crate::mesh::MeshVertex>()
                        as ::wgpu::BufferAddress,
                    step_mode: ::wgpu::VertexStepMode::Vertex,
                    attributes: &::wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2
                    ],
                }],
            },
            fragment: Some(::wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format,
                    blend: Some(if blended {
                        ::wgpu::BlendState::ALPHA_BLENDING
                    } else {
                        ::wgpu::BlendState::REPLACE
                    }),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: ::wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: ::wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: !blended,
                depth_compare: ::wgpu::CompareFunction::LessEqual,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            }),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    impl WgpuBackend {
        pub async fn acquire(
            canvas: web_sys::HtmlCanvasElement,
            size: PhysicalSize,
        ) -> Result<Self, RenderError> {
            let failed = |what: &str, e: String| {
                RenderError::ContextCreationFailed(format!("{what}: {e}"))
            };

            canvas.set_width(size.width);
            canvas.set_height(size.height);

            let instance = ::wgpu::Instance::new(&::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::GL,
                ..Default::default()
            });
            let surface = instance
                .create_surface(::wgpu::SurfaceTarget::Canvas(canvas))
                .map_err(|e| failed("surface", e.to_string()))?;
            let adapter = instance
                .request_adapter(&::wgpu::RequestAdapterOptions {
                    power_preference: ::wgpu::PowerPreference::HighPerformance,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|e| failed("adapter", e.to_string()))?;
            let (device, queue) = adapter
                .request_device(&::wgpu::DeviceDescriptor {
                    label: Some("tracker-device"),
                    required_features: ::wgpu::Features::empty(),
                    required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                    ..Default::default()
                })
                .await
                .map_err(|e| failed("device", e.to_string()))?;

            let caps = surface.get_capabilities(&adapter);
            let format = caps
                .formats
                .iter()
                .copied()
                .find(|f| f.is_srgb())
                .or_else(|| caps.formats.first().copied())
                .ok_or_else(|| failed("surface", "no supported format".into()))?;
            let alpha_mode = caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(::wgpu::CompositeAlphaMode::Auto);
            let config = ::wgpu::SurfaceConfiguration {
                usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: size.width,
                height: size.height,
                desired_maximum_frame_latency: 2,
                present_mode: ::wgpu::PresentMode::Fifo,
                alpha_mode,
                view_formats: vec![],
            };
            surface.configure(&device, &config);
            let depth_view = create_depth_view(&device, &config);

            let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
                label: Some("tracker-shader"),
                source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADER)),
            });

            let uniform_entry = |dynamic: bool, size: usize| ::wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: ::wgpu::BindingType::Buffer {
                    ty: ::wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: dynamic,
                    min_binding_size: NonZeroU64::new(size as u64),
                },
                count: None,
            };
            let globals_layout =
                device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                    label: Some("tracker-globals-bgl"),
                    entries: &[uniform_entry(false, std::mem::size_of::<Globals>())],
                });
            let draw_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("tracker-draw-bgl"),
                entries: &[uniform_entry(true, std::mem::size_of::<DrawUniform>())],
            });
            let texture_layout =
                device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                    label: Some("tracker-texture-bgl"),
                    entries: &[
                        ::wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: ::wgpu::ShaderStages::FRAGMENT,
                            ty: ::wgpu::BindingType::Texture {
                                sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: ::wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        ::wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: ::wgpu::ShaderStages::FRAGMENT,
                            ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

            let globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
                label: Some("tracker-globals"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("tracker-globals-bg"),
                layout: &globals_layout,
                entries: &[::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                }],
            });

            let stride = draw_stride(device.limits().min_uniform_buffer_offset_alignment);
            let capacity = stride * 64;
            let (draw_buffer, draw_bind_group) =
                create_draw_buffer(&device, &draw_layout, capacity);

            let sampler = device.create_sampler(&::wgpu::SamplerDescriptor {
                label: Some("tracker-sampler"),
                address_mode_u: ::wgpu::AddressMode::Repeat,
                address_mode_v: ::wgpu::AddressMode::ClampToEdge,
                mag_filter: ::wgpu::FilterMode::Linear,
                min_filter: ::wgpu::FilterMode::Linear,
                ..Default::default()
            });
            let white = upload_texture(
                &device,
                &queue,
                &texture_layout,
                &sampler,
                &TextureImage::filled(1, 1, [255, 255, 255, 255]),
            );

            let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
                label: Some("tracker-pipeline-layout"),
                bind_group_layouts: &[&globals_layout, &draw_layout, &texture_layout],
                immediate_size: 0,
            });
            let pipelines = Pipelines {
                opaque: create_pipeline(
                    &device,
                    &pipeline_layout,
                    &shader,
                    format,
                    ::wgpu::PrimitiveTopology::TriangleList,
                    false,
                    "tracker-opaque",
                ),
                blended: create_pipeline(
                    &device,
                    &pipeline_layout,
                    &shader,
                    format,
                    ::wgpu::PrimitiveTopology::TriangleList,
                    true,
                    "tracker-blended",
                ),
                lines: create_pipeline(
                    &device,
                    &pipeline_layout,
                    &shader,
                    format,
                    ::wgpu::PrimitiveTopology::LineList,
                    true,
                    "tracker-lines",
                ),
            };

            debug!(
                width = size.width,
                height = size.height,
                ?format,
                "webgl context acquired"
            );

            Ok(Self {
                gpu: Some(Gpu {
                    _instance: instance,
                    surface,
                    device,
                    queue,
                    config,
                    depth_view,
                    pipelines,
                    globals_buffer,
                    globals_bind_group,
                    draw_layout,
                    draw_stride: stride,
                    draw_capacity: capacity,
                    draw_buffer,
                    draw_bind_group,
                    texture_layout,
                    sampler,
                    white,
                    meshes: BTreeMap::new(),
                    materials: BTreeMap::new(),
                    textures: BTreeMap::new(),
                }),
                ids: ResourceIds::new(),
                size,
            })
        }

        fn gpu(&mut self) -> Result<&mut Gpu, RenderError> {
            self.gpu.as_mut().ok_or(RenderError::Disposed)
        }
    }

    impl RenderBackend for WgpuBackend {
        fn size(&self) -> PhysicalSize {
            self.size
        }

        fn resize(&mut self, size: PhysicalSize) {
            self.size = size;
            if let Some(gpu) = self.gpu.as_mut() {
                gpu.config.width = size.width.max(1);
                gpu.config.height = size.height.max(1);
                gpu.surface.configure(&gpu.device, &gpu.config);
                gpu.depth_view = create_depth_view(&gpu.device, &gpu.config);
            }
        }

        fn create_geometry(&mut self, shape: &Shape3D) -> Result<ResourceId, RenderError> {
            let id = self.ids.next();
            let gpu = self.gpu()?;
            let mesh = build_mesh(shape);
            let vertices = gpu
                .device
                .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some("tracker-vertices"),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: ::wgpu::BufferUsages::VERTEX,
                });
            let indices = gpu
                .device
                .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some("tracker-indices"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: ::wgpu::BufferUsages::INDEX,
                });
            gpu.meshes.insert(
                id,
                GpuMesh {
                    vertices,
                    indices,
                    index_count: mesh.indices.len() as u32,
                    topology: mesh.topology,
                },
            );
            Ok(id)
        }

        fn create_material(&mut self, material: &Material) -> Result<ResourceId, RenderError> {
            let id = self.ids.next();
            self.gpu()?.materials.insert(id, material.clone());
            Ok(id)
        }

        fn create_texture(&mut self, image: &TextureImage) -> Result<ResourceId, RenderError> {
            let id = self.ids.next();
            let gpu = self.gpu()?;
            let limit = gpu.device.limits().max_texture_dimension_2d;
            if image.width() > limit || image.height() > limit {
                return Err(RenderError::ResourceAllocation {
                    kind: ResourceKind::Texture,
                    reason: format!(
                        "{}x{} exceeds the {limit}px texture limit",
                        image.width(),
                        image.height()
                    ),
                });
            }
            let texture = upload_texture(
                &gpu.device,
                &gpu.queue,
                &gpu.texture_layout,
                &gpu.sampler,
                image,
            );
            gpu.textures.insert(id, texture);
            Ok(id)
        }

        fn render(&mut self, frame: &RenderFrame) -> Result<(), RenderError> {
            let gpu = self.gpu()?;

            let surface_texture = match gpu.surface.get_current_texture() {
                Ok(t) => t,
                Err(::wgpu::SurfaceError::Timeout | ::wgpu::SurfaceError::Outdated) => {
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    return Ok(());
                }
                Err(e) => return Err(RenderError::SurfaceLost(e.to_string())),
            };
            let target = surface_texture
                .texture
                .create_view(&::wgpu::TextureViewDescriptor::default());

            gpu.queue.write_buffer(
                &gpu.globals_buffer,
                0,
                bytemuck::bytes_of(&Globals::from_frame(frame)),
            );

            let materials = &gpu.materials;
            let meshes = &gpu.meshes;
            let order = draw_order(&frame.draws, |d| {
                materials.get(&d.material).is_some_and(|m| m.transparent)
                    || meshes
                        .get(&d.geometry)
                        .is_some_and(|m| m.topology == Topology::Lines)
            });

            let needed = gpu.draw_stride * order.len().max(1) as u64;
            if needed > gpu.draw_capacity {
                let capacity = needed.next_power_of_two();
                let (buffer, bind_group) =
                    create_draw_buffer(&gpu.device, &gpu.draw_layout, capacity);
                gpu.draw_buffer = buffer;
                gpu.draw_bind_group = bind_group;
                gpu.draw_capacity = capacity;
            }

            let stride = gpu.draw_stride as usize;
            let mut bytes = vec![0u8; stride * order.len()];
            let mut passes = Vec::with_capacity(order.len());
            for (slot, (_, call)) in order.iter().enumerate() {
                let (Some(material), Some(mesh)) =
                    (gpu.materials.get(&call.material), gpu.meshes.get(&call.geometry))
                else {
                    warn!(?call.geometry, "draw references a released resource");
                    continue;
                };
                let uniform = DrawUniform::new(material, call);
                let start = slot * stride;
                bytes[start..start + std::mem::size_of::<DrawUniform>()]
                    .copy_from_slice(bytemuck::bytes_of(&uniform));
                passes.push((slot, *call, mesh.topology, material.transparent));
            }
            if !bytes.is_empty() {
                gpu.queue.write_buffer(&gpu.draw_buffer, 0, &bytes);
            }

            let mut encoder = gpu
                .device
                .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                    label: Some("tracker-encoder"),
                });
            {
                let [r, g, b] = frame.background.to_unit_rgb();
                let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                    label: Some("tracker-pass"),
                    color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                        view: &target,
                        resolve_target: None,
                        depth_slice: None,
                        ops: ::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                                r: f64::from(r),
                                g: f64::from(g),
                                b: f64::from(b),
                                a: 1.0,
                            }),
                            store: ::wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                        view: &gpu.depth_view,
                        depth_ops: Some(::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(1.0),
                            store: ::wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });

                rpass.set_bind_group(0, &gpu.globals_bind_group, &[]);
                for (slot, call, topology, transparent) in &passes {
                    let Some(mesh) = gpu.meshes.get(&call.geometry) else {
                        continue;
                    };
                    let pipeline = match (topology, transparent) {
                        (Topology::Lines, _) => &gpu.pipelines.lines,
                        (Topology::Triangles, true) => &gpu.pipelines.blended,
                        (Topology::Triangles, false) => &gpu.pipelines.opaque,
                    };
                    let texture = call
                        .texture
                        .and_then(|id| gpu.textures.get(&id))
                        .unwrap_or(&gpu.white);
                    rpass.set_pipeline(pipeline);
                    rpass.set_bind_group(
                        1,
                        &gpu.draw_bind_group,
                        &[(*slot as u64 * gpu.draw_stride) as u32],
                    );
                    rpass.set_bind_group(2, &texture.bind_group, &[]);
                    rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                    rpass.set_index_buffer(mesh.indices.slice(..), ::wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }

            gpu.queue.submit(std::iter::once(encoder.finish()));
            surface_texture.present();
            Ok(())
        }

        fn release(&mut self, id: ResourceId) {
            let Some(gpu) = self.gpu.as_mut() else {
                return;
            };
            if let Some(mesh) = gpu.meshes.remove(&id) {
                mesh.vertices.destroy();
                mesh.indices.destroy();
            } else if let Some(texture) = gpu.textures.remove(&id) {
                texture.texture.destroy();
            } else {
                gpu.materials.remove(&id);
            }
        }

        fn destroy(&mut self) {
            if let Some(gpu) = self.gpu.take() {
                debug!(
                    meshes = gpu.meshes.len(),
                    textures = gpu.textures.len(),
                    "webgl context released"
                );
                gpu.white.texture.destroy();
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use gpu::{PhysicalSize, RenderBackend, RenderError, RenderFrame, ResourceId};
    use scene::components::{Material, Shape3D};
    use scene::texture::TextureImage;

    const UNAVAILABLE: &str = "WebGL rendering is only available on wasm32 targets";

    /// Stand-in so the crate builds natively; acquiring always fails.
    pub struct WgpuBackend {
        size: PhysicalSize,
    }

    impl WgpuBackend {
        pub async fn acquire(
            _canvas: web_sys::HtmlCanvasElement,
            _size: PhysicalSize,
        ) -> Result<Self, RenderError> {
            Err(RenderError::ContextCreationFailed(UNAVAILABLE.to_string()))
        }
    }

    impl RenderBackend for WgpuBackend {
        fn size(&self) -> PhysicalSize {
            self.size
        }

        fn resize(&mut self, size: PhysicalSize) {
            self.size = size;
        }

        fn create_geometry(&mut self, _shape: &Shape3D) -> Result<ResourceId, RenderError> {
            Err(RenderError::Disposed)
        }

        fn create_material(&mut self, _material: &Material) -> Result<ResourceId, RenderError> {
            Err(RenderError::Disposed)
        }

        fn create_texture(&mut self, _image: &TextureImage) -> Result<ResourceId, RenderError> {
            Err(RenderError::Disposed)
        }

        fn render(&mut self, _frame: &RenderFrame) -> Result<(), RenderError> {
            Err(RenderError::Disposed)
        }

        fn release(&mut self, _id: ResourceId) {}

        fn destroy(&mut self) {}
    }
}

pub use imp::WgpuBackend;
