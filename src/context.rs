//! WGPU context: surface, device, queue and surface configuration.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use winit::window::Window;

/// The rendered size caps the device pixel ratio at 2, so very dense
/// displays do not pay for pixels nobody can tell apart.
pub fn surface_extent(physical: winit::dpi::PhysicalSize<u32>, scale_factor: f64) -> [u32; 2] {
    let capped = (scale_factor.min(2.0) / scale_factor.max(f64::MIN_POSITIVE)) as f32;
    [
        ((physical.width as f32 * capped) as u32).max(1),
        ((physical.height as f32 * capped) as u32).max(1),
    ]
}

/// Pointer state tracked across window events, for orbit input.
#[derive(Debug, Default)]
pub struct MouseState {
    pub left_pressed: bool,
}

/// Core GPU handles shared by every render path.
pub struct Context {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub window: Arc<Window>,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible adapter found")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: if cfg!(target_arch = "wasm32") {
                        wgpu::Limits::downlevel_webgl2_defaults()
                    } else {
                        wgpu::Limits::default()
                    },
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Prefer an sRGB surface so the matcap colors come out as authored.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let extent = surface_extent(size, window.scale_factor());
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: extent[0],
            height: extent[1],
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        Ok(Self {
            surface,
            device,
            queue,
            config,
            window,
        })
    }

    /// Reconfigure the surface for a new physical window size.
    pub fn resize(&mut self, physical: winit::dpi::PhysicalSize<u32>) {
        let extent = surface_extent(physical, self.window.scale_factor());
        self.config.width = extent[0];
        self.config.height = extent[1];
        self.surface.configure(&self.device, &self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalSize;

    #[test]
    fn extent_passes_through_at_low_dpi() {
        assert_eq!(surface_extent(PhysicalSize::new(800, 600), 1.0), [800, 600]);
        assert_eq!(
            surface_extent(PhysicalSize::new(1600, 1200), 2.0),
            [1600, 1200]
        );
    }

    #[test]
    fn extent_caps_dense_displays_at_ratio_two() {
        // 3x display: 2400 physical pixels are 800 logical, rendered at 2x.
        assert_eq!(
            surface_extent(PhysicalSize::new(2400, 1800), 3.0),
            [1600, 1200]
        );
    }

    #[test]
    fn extent_never_collapses_to_zero() {
        assert_eq!(surface_extent(PhysicalSize::new(0, 0), 1.0), [1, 1]);
    }
}
