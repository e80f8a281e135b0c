//! The live parameter panel: matcap choice and text content.
//!
//! The panel owns all egui plumbing. The application feeds it window events
//! and one draw call per frame; it answers with the actions the user took,
//! which the application applies to the scene.

use std::sync::Arc;

use winit::window::Window;

use crate::material::TextureChoice;

pub const DEFAULT_TEXT: &str = "bagel universe";

/// Current values of the panel controls.
///
/// The text control starts out disabled; it only becomes editable once the
/// typeface has loaded and the first text mesh exists.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub matcap: TextureChoice,
    pub text: String,
    pub text_enabled: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            matcap: TextureChoice::default(),
            text: DEFAULT_TEXT.to_string(),
            text_enabled: false,
        }
    }
}

/// One user interaction with the panel, to be applied to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    SelectMatcap(TextureChoice),
    EditText(String),
}

pub struct Panel {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Panel {
    pub fn new(
        window: &Arc<Window>,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let ctx = egui::Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);
        Self {
            ctx,
            winit_state,
            renderer,
        }
    }

    /// Forward a window event to egui. Returns true when egui consumed it,
    /// in which case the camera must not also react to it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    /// Whether the pointer currently interacts with the panel. Orbit input
    /// is suppressed while this holds.
    pub fn wants_pointer(&self) -> bool {
        self.ctx.wants_pointer_input() || self.ctx.is_using_pointer()
    }

    /// Run the UI and paint it over the scene. The returned actions are
    /// whatever the user changed this frame, usually nothing.
    pub fn draw(
        &mut self,
        window: &Window,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        state: &mut PanelState,
    ) -> Vec<PanelAction> {
        let mut actions = Vec::new();

        let raw_input = self.winit_state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("controls")
                .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
                .resizable(false)
                .show(ctx, |ui| {
                    egui::ComboBox::from_label("matcap")
                        .selected_text(state.matcap.label())
                        .show_ui(ui, |ui| {
                            for choice in TextureChoice::ALL {
                                if ui
                                    .selectable_value(&mut state.matcap, choice, choice.label())
                                    .changed()
                                {
                                    actions.push(PanelAction::SelectMatcap(choice));
                                }
                            }
                        });

                    ui.add_enabled_ui(state.text_enabled, |ui| {
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut state.text).hint_text("text"),
                        );
                        if response.changed() {
                            actions.push(PanelAction::EditText(state.text.clone()));
                        }
                    });
                });
        });

        self.winit_state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        self.renderer
            .update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_control_starts_locked_with_default_content() {
        let state = PanelState::default();
        assert_eq!(state.matcap, TextureChoice::Nine);
        assert_eq!(state.text, "bagel universe");
        assert!(!state.text_enabled);
    }
}
