use glam::Vec4;
use sceneview_render::{ClearMask, ContextError, GraphicsContext};

/// Offscreen color format.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
/// Depth buffer format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Debug, thiserror::Error)]
pub enum WgpuContextError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error(transparent)]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Graphics context backed by a wgpu device and offscreen color + depth
/// targets.
///
/// Clears are encoded as render passes on the frame's command encoder;
/// `present` submits the encoder.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
    width: u32,
    height: u32,
    encoder: Option<wgpu::CommandEncoder>,
    clear_color: Vec4,
    clear_depth: f32,
    depth_write: bool,
    depth_test: bool,
    color_write: [bool; 4],
    open_groups: usize,
    frames: u64,
}

impl WgpuContext {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, width: u32, height: u32) -> Self {
        let color = create_target(&device, "color_target", COLOR_FORMAT, width, height);
        let depth = create_target(&device, "depth_target", DEPTH_FORMAT, width, height);
        Self {
            device,
            queue,
            color,
            depth,
            width,
            height,
            encoder: None,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            clear_depth: 1.0,
            depth_write: true,
            depth_test: false,
            color_write: [true; 4],
            open_groups: 0,
            frames: 0,
        }
    }

    /// Request an adapter and device without a window surface.
    pub fn headless(width: u32, height: u32) -> Result<Self, WgpuContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or(WgpuContextError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("sceneview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
            },
            None,
        ))?;
        tracing::info!(adapter = ?adapter.get_info().name, width, height, "headless wgpu context");
        Ok(Self::new(device, queue, width, height))
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn color_target(&self) -> &wgpu::TextureView {
        &self.color
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// Depth/stencil state matching the current depth write and test flags,
    /// for pipelines drawn inside this frame.
    pub fn depth_stencil(&self) -> wgpu::DepthStencilState {
        depth_stencil_state(self.depth_write, self.depth_test)
    }

    /// Color target state matching the current color write mask.
    pub fn color_target_state(&self) -> wgpu::ColorTargetState {
        wgpu::ColorTargetState {
            format: COLOR_FORMAT,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: color_writes(self.color_write),
        }
    }
}

impl GraphicsContext for WgpuContext {
    fn begin_frame(&mut self) -> Result<(), ContextError> {
        if self.encoder.is_some() {
            return Err(ContextError::FrameInProgress);
        }
        // Validation errors raised while the frame is encoded surface in
        // `present`.
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        self.encoder = Some(
            self.device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame_encoder"),
                }),
        );
        Ok(())
    }

    fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    fn set_clear_depth(&mut self, depth: f32) {
        self.clear_depth = depth;
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.depth_write = enabled;
    }

    fn set_color_write(&mut self, mask: [bool; 4]) {
        self.color_write = mask;
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn clear(&mut self, mask: ClearMask) -> Result<(), ContextError> {
        let encoder = self.encoder.as_mut().ok_or(ContextError::NoFrame)?;
        let Some((color_load, depth_load)) = load_ops(
            mask,
            self.clear_color,
            self.clear_depth,
            self.color_write,
            self.depth_write,
        ) else {
            return Ok(());
        };

        // The pass only records load ops; dropping it ends the pass.
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        Ok(())
    }

    fn push_debug_group(&mut self, label: &str) -> Result<(), ContextError> {
        let encoder = self.encoder.as_mut().ok_or(ContextError::NoFrame)?;
        encoder.push_debug_group(label);
        self.open_groups += 1;
        Ok(())
    }

    fn pop_debug_group(&mut self) -> Result<(), ContextError> {
        let encoder = self.encoder.as_mut().ok_or(ContextError::NoFrame)?;
        if self.open_groups == 0 {
            return Err(ContextError::UnbalancedDebugGroup);
        }
        encoder.pop_debug_group();
        self.open_groups -= 1;
        Ok(())
    }

    fn present(&mut self) -> Result<(), ContextError> {
        if self.open_groups != 0 {
            return Err(ContextError::UnbalancedDebugGroup);
        }
        let encoder = self.encoder.take().ok_or(ContextError::NoFrame)?;
        self.queue.submit(std::iter::once(encoder.finish()));
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ContextError::Backend(error.to_string()));
        }
        self.frames += 1;
        Ok(())
    }

    fn abort_frame(&mut self) {
        if self.encoder.take().is_none() {
            return;
        }
        self.open_groups = 0;
        // Balance the scope pushed by begin_frame; its errors belong to the
        // discarded frame.
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            tracing::debug!(%error, "validation error in aborted frame");
        }
        tracing::debug!("frame aborted");
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.color = create_target(&self.device, "color_target", COLOR_FORMAT, width, height);
        self.depth = create_target(&self.device, "depth_target", DEPTH_FORMAT, width, height);
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Load ops for a clear of `mask` under the given write masks, or `None`
/// when nothing would be cleared.
///
/// A buffer is cleared only if its bit is in `mask` and writes to it are
/// enabled; otherwise its contents are loaded.
pub fn load_ops(
    mask: ClearMask,
    clear_color: Vec4,
    clear_depth: f32,
    color_write: [bool; 4],
    depth_write: bool,
) -> Option<(wgpu::LoadOp<wgpu::Color>, wgpu::LoadOp<f32>)> {
    let clear_color_buffer = mask.contains(ClearMask::COLOR) && color_write.iter().any(|w| *w);
    let clear_depth_buffer = mask.contains(ClearMask::DEPTH) && depth_write;
    if !clear_color_buffer && !clear_depth_buffer {
        return None;
    }
    let color = if clear_color_buffer {
        wgpu::LoadOp::Clear(wgpu::Color {
            r: f64::from(clear_color.x),
            g: f64::from(clear_color.y),
            b: f64::from(clear_color.z),
            a: f64::from(clear_color.w),
        })
    } else {
        wgpu::LoadOp::Load
    };
    let depth = if clear_depth_buffer {
        wgpu::LoadOp::Clear(clear_depth)
    } else {
        wgpu::LoadOp::Load
    };
    Some((color, depth))
}

pub fn depth_stencil_state(depth_write: bool, depth_test: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: depth_write,
        depth_compare: if depth_test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: Default::default(),
        bias: Default::default(),
    }
}

pub fn color_writes(mask: [bool; 4]) -> wgpu::ColorWrites {
    let mut writes = wgpu::ColorWrites::empty();
    for (enabled, bit) in mask.into_iter().zip([
        wgpu::ColorWrites::RED,
        wgpu::ColorWrites::GREEN,
        wgpu::ColorWrites::BLUE,
        wgpu::ColorWrites::ALPHA,
    ]) {
        if enabled {
            writes |= bit;
        }
    }
    writes
}

fn create_target(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_clear_uses_clear_values() {
        let (color, depth) = load_ops(
            ClearMask::all(),
            Vec4::new(0.5, 0.25, 0.0, 1.0),
            1.0,
            [true; 4],
            true,
        )
        .unwrap();
        assert_eq!(
            color,
            wgpu::LoadOp::Clear(wgpu::Color {
                r: 0.5,
                g: 0.25,
                b: 0.0,
                a: 1.0
            })
        );
        assert_eq!(depth, wgpu::LoadOp::Clear(1.0));
    }

    #[test]
    fn disabled_depth_write_keeps_depth() {
        let (color, depth) =
            load_ops(ClearMask::all(), Vec4::ONE, 1.0, [true; 4], false).unwrap();
        assert!(matches!(color, wgpu::LoadOp::Clear(_)));
        assert_eq!(depth, wgpu::LoadOp::Load);
    }

    #[test]
    fn empty_mask_skips_the_pass() {
        assert!(load_ops(ClearMask::empty(), Vec4::ONE, 1.0, [true; 4], true).is_none());
        assert!(load_ops(ClearMask::DEPTH, Vec4::ONE, 1.0, [true; 4], false).is_none());
        assert!(load_ops(ClearMask::COLOR, Vec4::ONE, 1.0, [false; 4], true).is_none());
    }

    #[test]
    fn depth_state_follows_flags() {
        let state = depth_stencil_state(false, true);
        assert!(!state.depth_write_enabled);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Less);
        let state = depth_stencil_state(true, false);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
        assert_eq!(state.format, DEPTH_FORMAT);
    }

    #[test]
    fn unbalanced_present_can_be_aborted() {
        // Needs a GPU adapter; machines without one skip.
        let Ok(mut ctx) = WgpuContext::headless(8, 8) else {
            return;
        };
        ctx.begin_frame().unwrap();
        ctx.push_debug_group("renderer").unwrap();
        assert_eq!(ctx.present(), Err(ContextError::UnbalancedDebugGroup));
        assert_eq!(ctx.begin_frame(), Err(ContextError::FrameInProgress));

        ctx.abort_frame();
        ctx.begin_frame().unwrap();
        ctx.clear(ClearMask::all()).unwrap();
        ctx.present().unwrap();
        assert_eq!(ctx.frames_presented(), 1);
    }

    #[test]
    fn color_write_mask_maps_channels() {
        assert_eq!(color_writes([true; 4]), wgpu::ColorWrites::ALL);
        assert_eq!(
            color_writes([true, false, false, true]),
            wgpu::ColorWrites::RED | wgpu::ColorWrites::ALPHA
        );
        assert!(color_writes([false; 4]).is_empty());
    }
}
