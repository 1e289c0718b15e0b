//! Draws a composed [`Scene`] every frame.

use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::Zeroable;
use terra_materials::{
    CompiledShader, Material, RenderState, ShaderError, SpriteMaterial, StandardMaterial,
};
use terra_scene::{Scene, SceneNode, SceneObject};
use winit::window::Window;

use crate::background::BackgroundPass;
use crate::buffer::{MeshBuffer, uniform_buffer};
use crate::pipeline::{MaterialLayouts, PipelineDesc, create_pipeline, custom_layout_entries};
use crate::uniforms::{
    AtmosphereUniforms, FrameUniforms, ObjectUniforms, SpriteUniforms, StandardUniforms,
};
use crate::{
    Camera, DepthBuffer, FrameEncoder, RenderContext, RenderContextError, RenderPassBuilder,
    RendererOptions, SurfaceError, TextureCache, TextureError, init_render_context_blocking,
};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("material of '{0}' must be compiled before it can be drawn")]
    Uncompiled(String),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

enum NodeUniforms {
    Standard {
        object: wgpu::Buffer,
        material: wgpu::Buffer,
        custom: Option<wgpu::Buffer>,
    },
    Atmosphere(wgpu::Buffer),
    Sprite(wgpu::Buffer),
}

/// GPU state for one child of the rotation group.
struct NodeDraw {
    /// Index into the group's children.
    node: usize,
    pipeline: Arc<wgpu::RenderPipeline>,
    /// `None` for sprites, which expand six vertices in the shader.
    mesh: Option<MeshBuffer>,
    /// Bound from group 1 upward.
    bind_groups: Vec<wgpu::BindGroup>,
    uniforms: NodeUniforms,
    transparent: bool,
}

/// Scene renderer: background, opaque meshes, then transparent layers and
/// markers in scene order.
pub struct GlobeRenderer {
    options: RendererOptions,
    surface_format: wgpu::TextureFormat,
    depth: DepthBuffer,
    textures: TextureCache,
    layouts: MaterialLayouts,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    pipelines: HashMap<(String, RenderState), Arc<wgpu::RenderPipeline>>,
    background: Option<BackgroundPass>,
    draws: Vec<NodeDraw>,
}

impl GlobeRenderer {
    pub fn new(ctx: &RenderContext, options: RendererOptions) -> Self {
        let device = &ctx.device;
        let (width, height) = ctx.size();
        let layouts = MaterialLayouts::new(device);
        let frame_buffer = uniform_buffer(device, "frame-uniforms", &FrameUniforms::zeroed());
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        Self {
            options,
            surface_format: ctx.surface_format,
            depth: DepthBuffer::new(device, width, height),
            textures: TextureCache::new(device),
            layouts,
            frame_buffer,
            frame_bind_group,
            pipelines: HashMap::new(),
            background: None,
            draws: Vec::new(),
        }
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    /// Clear color and exposure take effect on the next frame.
    pub fn options_mut(&mut self) -> &mut RendererOptions {
        &mut self.options
    }

    pub fn resize(&mut self, ctx: &RenderContext) {
        let (width, height) = ctx.size();
        self.depth.resize(&ctx.device, width, height);
    }

    /// Upload textures and build pipelines for every node of `scene`.
    ///
    /// Materials must already be compiled. Call again if the set of nodes
    /// changes; parameter changes only need [`GlobeRenderer::render`].
    pub fn prepare(&mut self, ctx: &RenderContext, scene: &Scene) -> Result<(), RenderError> {
        self.draws.clear();
        self.background = None;

        if self.options.background
            && let Some(environment) = &scene.background
        {
            let texture = self.textures.upload(&ctx.device, &ctx.queue, environment)?;
            self.background = Some(BackgroundPass::new(
                &ctx.device,
                self.surface_format,
                &self.layouts.frame,
                self.textures.bind_group_layout(),
                &texture,
            )?);
        }

        for (index, node) in scene.group.children().iter().enumerate() {
            let model = scene.group.world_matrix(node);
            let draw = match &node.object {
                SceneObject::Mesh { geometry, material } => {
                    match material {
                        Material::Standard(standard) => {
                            let mesh = MeshBuffer::new(&ctx.device, geometry);
                            self.standard_draw(ctx, node, standard, model, mesh)?
                        }
                        Material::Atmosphere(atmosphere) => {
                            let mesh = MeshBuffer::new(&ctx.device, geometry);
                            let compiled = compiled(node, material.compiled())?;
                            let buffer = uniform_buffer(
                                &ctx.device,
                                &format!("{}-uniforms", node.name),
                                &AtmosphereUniforms::new(model, atmosphere),
                            );
                            let bind_group =
                                ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                                    label: Some(&node.name),
                                    layout: &self.layouts.atmosphere,
                                    entries: &[wgpu::BindGroupEntry {
                                        binding: 0,
                                        resource: buffer.as_entire_binding(),
                                    }],
                                });
                            let state = atmosphere.render_state();
                            let pipeline = cached_pipeline(
                                &mut self.pipelines,
                                &ctx.device,
                                self.surface_format,
                                compiled,
                                state,
                                &[&self.layouts.frame, &self.layouts.atmosphere],
                                true,
                            );
                            NodeDraw {
                                node: index,
                                pipeline,
                                mesh: Some(mesh),
                                bind_groups: vec![bind_group],
                                uniforms: NodeUniforms::Atmosphere(buffer),
                                transparent: state.transparent,
                            }
                        }
                        // The geometry is unused; sprites always face the camera.
                        Material::Sprite(sprite) => {
                            self.sprite_draw(ctx, node, sprite, glam::Vec2::ONE, model)?
                        }
                    }
                }
                SceneObject::Sprite { material, size } => {
                    self.sprite_draw(ctx, node, material, *size, model)?
                }
            };
            self.draws.push(NodeDraw {
                node: index,
                ..draw
            });
        }

        // Stable: scene order is kept within each bucket.
        self.draws.sort_by_key(|draw| draw.transparent);
        log::info!(
            "Prepared {} draws, {} textures, {} pipelines",
            self.draws.len(),
            self.textures.len(),
            self.pipelines.len()
        );
        Ok(())
    }

    fn standard_draw(
        &mut self,
        ctx: &RenderContext,
        node: &SceneNode,
        material: &StandardMaterial,
        model: glam::Mat4,
        mesh: MeshBuffer,
    ) -> Result<NodeDraw, RenderError> {
        let device = &ctx.device;
        let compiled = compiled(node, material.compiled())?;
        let fallback = self.textures.fallback(device, &ctx.queue)?;
        let mut views = Vec::with_capacity(6);
        for slot in material.texture_slots() {
            views.push(match slot {
                Some(resource) => self.textures.upload(device, &ctx.queue, resource)?,
                None => Arc::clone(&fallback),
            });
        }

        let object = uniform_buffer(
            device,
            &format!("{}-object", node.name),
            &ObjectUniforms::new(model),
        );
        let material_buffer = uniform_buffer(
            device,
            &format!("{}-material", node.name),
            &StandardUniforms::from(material),
        );

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: object.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: material_buffer.as_entire_binding(),
            },
        ];
        for (slot, texture) in views.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: 2 + slot as u32,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: 8,
            resource: wgpu::BindingResource::Sampler(
                self.textures.sampler(terra_materials::WrapMode::Clamp),
            ),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&node.name),
            layout: &self.layouts.standard,
            entries: &entries,
        });
        let mut bind_groups = vec![bind_group];

        let custom = if compiled.uniforms.is_empty() {
            None
        } else {
            let (layout, group, buffer) = self.custom_group(ctx, node, compiled)?;
            bind_groups.push(group);
            Some((layout, buffer))
        };

        let state = material.render_state();
        let pipeline = match &custom {
            Some((layout, _)) => cached_pipeline(
                &mut self.pipelines,
                device,
                self.surface_format,
                compiled,
                state,
                &[&self.layouts.frame, &self.layouts.standard, layout],
                true,
            ),
            None => cached_pipeline(
                &mut self.pipelines,
                device,
                self.surface_format,
                compiled,
                state,
                &[&self.layouts.frame, &self.layouts.standard],
                true,
            ),
        };

        Ok(NodeDraw {
            node: 0,
            pipeline,
            mesh: Some(mesh),
            bind_groups,
            uniforms: NodeUniforms::Standard {
                object,
                material: material_buffer,
                custom: custom.map(|(_, buffer)| buffer),
            },
            transparent: state.transparent,
        })
    }

    /// Bind group for the uniforms a shader hook declared.
    fn custom_group(
        &mut self,
        ctx: &RenderContext,
        node: &SceneNode,
        compiled: &CompiledShader,
    ) -> Result<(wgpu::BindGroupLayout, wgpu::BindGroup, wgpu::Buffer), RenderError> {
        let device = &ctx.device;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{}-custom-layout", node.name)),
            entries: &custom_layout_entries(&compiled.uniforms),
        });

        let block = compiled.uniforms.float_block();
        let buffer = {
            use wgpu::util::DeviceExt;
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{}-custom", node.name)),
                contents: bytemuck::cast_slice(&block),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
        };

        let mut textures = Vec::new();
        for (_, resource, wrap) in compiled.uniforms.textures() {
            textures.push((self.textures.upload(device, &ctx.queue, resource)?, wrap));
        }
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }];
        for (k, (texture, wrap)) in textures.iter().enumerate() {
            let k = k as u32;
            entries.push(wgpu::BindGroupEntry {
                binding: 1 + 2 * k,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: 2 + 2 * k,
                resource: wgpu::BindingResource::Sampler(self.textures.sampler(*wrap)),
            });
        }
        let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{}-custom", node.name)),
            layout: &layout,
            entries: &entries,
        });
        Ok((layout, group, buffer))
    }

    fn sprite_draw(
        &mut self,
        ctx: &RenderContext,
        node: &SceneNode,
        material: &SpriteMaterial,
        size: glam::Vec2,
        model: glam::Mat4,
    ) -> Result<NodeDraw, RenderError> {
        let device = &ctx.device;
        let compiled = compiled(node, material.compiled())?;
        let texture = self.textures.upload(device, &ctx.queue, &material.map)?;
        let buffer = uniform_buffer(
            device,
            &format!("{}-sprite", node.name),
            &SpriteUniforms::new(model, material, size),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&node.name),
            layout: &self.layouts.sprite,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(
                        self.textures.sampler(terra_materials::WrapMode::Clamp),
                    ),
                },
            ],
        });
        let state = material.render_state();
        let pipeline = cached_pipeline(
            &mut self.pipelines,
            device,
            self.surface_format,
            compiled,
            state,
            &[&self.layouts.frame, &self.layouts.sprite],
            false,
        );

        Ok(NodeDraw {
            node: 0,
            pipeline,
            mesh: None,
            bind_groups: vec![bind_group],
            uniforms: NodeUniforms::Sprite(buffer),
            transparent: state.transparent,
        })
    }

    /// Write this frame's uniforms and draw. A timed-out surface skips the frame.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        let queue = &ctx.queue;
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(camera, scene, self.options.exposure)),
        );
        for draw in &self.draws {
            let Some(node) = scene.group.children().get(draw.node) else {
                continue;
            };
            write_node_uniforms(queue, draw, node, scene.group.world_matrix(node));
        }

        let surface_texture = match ctx.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => {
                log::debug!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let builder = RenderPassBuilder::new()
            .clear_color(self.options.clear_color())
            .depth(&self.depth)
            .label("globe-pass");
        let mut frame = FrameEncoder::new(&ctx.device, Arc::clone(&ctx.queue), surface_texture);
        if let Some(mut pass) = frame.begin_render_pass(&builder) {
            if let Some(background) = &self.background {
                background.draw(&mut pass, &self.frame_bind_group);
            }
            for draw in &self.draws {
                pass.set_pipeline(&draw.pipeline);
                pass.set_bind_group(0, &self.frame_bind_group, &[]);
                for (i, group) in draw.bind_groups.iter().enumerate() {
                    pass.set_bind_group(1 + i as u32, group, &[]);
                }
                match &draw.mesh {
                    Some(mesh) => mesh.draw(&mut pass),
                    None => pass.draw(0..6, 0..1),
                }
            }
        }
        frame.submit();
        Ok(())
    }

    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }
}

/// Pipelines are keyed by final shader source and render state.
fn cached_pipeline(
    pipelines: &mut HashMap<(String, RenderState), Arc<wgpu::RenderPipeline>>,
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    compiled: &CompiledShader,
    state: RenderState,
    layouts: &[&wgpu::BindGroupLayout],
    mesh_vertices: bool,
) -> Arc<wgpu::RenderPipeline> {
    pipelines
        .entry((compiled.source.clone(), state))
        .or_insert_with(|| {
            Arc::new(create_pipeline(
                device,
                surface_format,
                &PipelineDesc {
                    label: &compiled.label,
                    source: &compiled.source,
                    bind_group_layouts: layouts,
                    state,
                    mesh_vertices,
                    depth_compare: Some(DepthBuffer::COMPARE_FUNCTION),
                },
            ))
        })
        .clone()
}

fn compiled<'a>(
    node: &SceneNode,
    compiled: Option<&'a CompiledShader>,
) -> Result<&'a CompiledShader, RenderError> {
    compiled.ok_or_else(|| RenderError::Uncompiled(node.name.clone()))
}

fn write_node_uniforms(queue: &wgpu::Queue, draw: &NodeDraw, node: &SceneNode, model: glam::Mat4) {
    match (&draw.uniforms, &node.object) {
        (
            NodeUniforms::Standard {
                object,
                material,
                custom,
            },
            SceneObject::Mesh {
                material: Material::Standard(standard),
                ..
            },
        ) => {
            queue.write_buffer(object, 0, bytemuck::bytes_of(&ObjectUniforms::new(model)));
            queue.write_buffer(
                material,
                0,
                bytemuck::bytes_of(&StandardUniforms::from(standard)),
            );
            if let (Some(buffer), Some(compiled)) = (custom, standard.compiled()) {
                let block = compiled.uniforms.float_block();
                queue.write_buffer(buffer, 0, bytemuck::cast_slice(&block));
            }
        }
        (
            NodeUniforms::Atmosphere(buffer),
            SceneObject::Mesh {
                material: Material::Atmosphere(atmosphere),
                ..
            },
        ) => {
            queue.write_buffer(
                buffer,
                0,
                bytemuck::bytes_of(&AtmosphereUniforms::new(model, atmosphere)),
            );
        }
        (
            NodeUniforms::Sprite(buffer),
            SceneObject::Mesh {
                material: Material::Sprite(sprite),
                ..
            },
        ) => {
            queue.write_buffer(
                buffer,
                0,
                bytemuck::bytes_of(&SpriteUniforms::new(model, sprite, glam::Vec2::ONE)),
            );
        }
        (NodeUniforms::Sprite(buffer), SceneObject::Sprite { material, size }) => {
            queue.write_buffer(
                buffer,
                0,
                bytemuck::bytes_of(&SpriteUniforms::new(model, material, *size)),
            );
        }
        _ => log::warn!("Node '{}' changed kind since prepare", node.name),
    }
}

/// Open the GPU for `window` and build a renderer, letting `configure` adjust
/// the options first.
pub fn create_renderer(
    window: Arc<Window>,
    mut options: RendererOptions,
    configure: impl FnOnce(&mut RendererOptions),
) -> Result<(RenderContext, GlobeRenderer), RenderContextError> {
    configure(&mut options);
    let ctx = init_render_context_blocking(window, &options)?;
    let renderer = GlobeRenderer::new(&ctx, options);
    Ok((ctx, renderer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_assets::TextureResource;

    fn sprite_node(compile: bool) -> SceneNode {
        let mut material = SpriteMaterial::new(Arc::new(TextureResource::solid(
            "pin",
            [255, 0, 0, 255],
        )));
        if compile {
            material.compile().unwrap();
        }
        SceneNode {
            name: "marker-0".into(),
            position: glam::Vec3::ZERO,
            object: SceneObject::Sprite {
                material,
                size: glam::Vec2::splat(0.4),
            },
        }
    }

    #[test]
    fn test_uncompiled_material_is_an_error() {
        let node = sprite_node(false);
        let SceneObject::Sprite { material, .. } = &node.object else {
            unreachable!()
        };
        let err = compiled(&node, material.compiled()).unwrap_err();
        assert!(matches!(err, RenderError::Uncompiled(ref name) if name == "marker-0"));
        assert!(err.to_string().contains("marker-0"));
    }

    #[test]
    fn test_compiled_material_is_returned() {
        let node = sprite_node(true);
        let SceneObject::Sprite { material, .. } = &node.object else {
            unreachable!()
        };
        let shader = compiled(&node, material.compiled()).unwrap();
        assert!(!shader.source.is_empty());
    }

    #[test]
    fn test_pipeline_cache_reuses_identical_shaders() {
        let Some((device, _queue)) = crate::texture::create_test_device_queue() else {
            eprintln!("No GPU adapter available, skipping");
            return;
        };
        let node = sprite_node(true);
        let SceneObject::Sprite { material, .. } = &node.object else {
            unreachable!()
        };
        let shader = material.compiled().unwrap();
        let layouts = MaterialLayouts::new(&device);
        let mut pipelines = HashMap::new();
        let format = wgpu::TextureFormat::Bgra8UnormSrgb;
        let first = cached_pipeline(
            &mut pipelines,
            &device,
            format,
            shader,
            material.render_state(),
            &[&layouts.frame, &layouts.sprite],
            false,
        );
        let second = cached_pipeline(
            &mut pipelines,
            &device,
            format,
            shader,
            material.render_state(),
            &[&layouts.frame, &layouts.sprite],
            false,
        );
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(pipelines.len(), 1);
    }
}
