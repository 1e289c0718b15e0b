//! Per-frame command encoding.
//!
//! A [`FrameEncoder`] wraps one acquired surface texture. The globe is drawn
//! in a single pass described by a [`RenderPassBuilder`].

use std::sync::Arc;

use crate::DepthBuffer;

/// Describes the main pass: what to clear the color target to and which
/// depth buffer, if any, to test against.
#[derive(Debug, Clone, Copy)]
pub struct RenderPassBuilder<'a> {
    clear_color: wgpu::Color,
    depth: Option<&'a wgpu::TextureView>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> RenderPassBuilder<'a> {
    /// Clears to black with no depth attachment.
    pub fn new() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
            depth: None,
            label: None,
        }
    }

    pub fn clear_color(self, clear_color: wgpu::Color) -> Self {
        Self {
            clear_color,
            ..self
        }
    }

    /// Test against `depth`, cleared to [`DepthBuffer::CLEAR_VALUE`].
    pub fn depth(self, depth: &'a DepthBuffer) -> Self {
        Self {
            depth: Some(&depth.view),
            ..self
        }
    }

    pub fn label(self, label: &'static str) -> Self {
        Self {
            label: Some(label),
            ..self
        }
    }

    fn begin<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        target: &'e wgpu::TextureView,
    ) -> wgpu::RenderPass<'e>
    where
        'a: 'e,
    {
        let depth_stencil_attachment =
            self.depth
                .map(|view| wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                });
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment,
            ..Default::default()
        })
    }
}

struct PendingFrame {
    encoder: wgpu::CommandEncoder,
    output: wgpu::SurfaceTexture,
}

/// Commands for one frame. [`FrameEncoder::submit`] presents the surface
/// texture; dropping an unsubmitted frame presents it too, with a warning.
pub struct FrameEncoder {
    queue: Arc<wgpu::Queue>,
    target: wgpu::TextureView,
    pending: Option<PendingFrame>,
}

impl FrameEncoder {
    pub fn new(device: &wgpu::Device, queue: Arc<wgpu::Queue>, output: wgpu::SurfaceTexture) -> Self {
        let target = output.texture.create_view(&Default::default());
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("globe-frame"),
        });
        Self {
            queue,
            target,
            pending: Some(PendingFrame { encoder, output }),
        }
    }

    /// `None` once the frame has been submitted.
    pub fn begin_render_pass<'f>(
        &'f mut self,
        builder: &RenderPassBuilder<'f>,
    ) -> Option<wgpu::RenderPass<'f>> {
        let pending = self.pending.as_mut()?;
        Some(builder.begin(&mut pending.encoder, &self.target))
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn submit(mut self) {
        self.present();
    }

    fn present(&mut self) {
        if let Some(PendingFrame { encoder, output }) = self.pending.take() {
            self.queue.submit([encoder.finish()]);
            output.present();
        }
    }
}

impl Drop for FrameEncoder {
    fn drop(&mut self) {
        if self.pending.is_some() {
            log::warn!("Frame dropped before submit, presenting anyway");
            self.present();
        }
    }
}
