//! Application state and the winit event loop.
//!
//! All previously free-floating mutable pieces (scene, camera, panel values,
//! GPU context) live in one [`AppState`]. Asset loads run as spawned futures
//! whose single continuation is an [`AppEvent`] delivered back to the event
//! loop through its proxy, so all mutation happens on the loop thread.

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::Result;
use cgmath::Point3;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy};
use winit::window::Window;

use crate::camera::{CameraResources, OrbitCamera, Projection};
use crate::context::{Context, MouseState};
use crate::data_structures::texture::Texture;
use crate::material::TextureChoice;
use crate::panel::{Panel, PanelAction, PanelState};
use crate::pipelines::matcap::mk_matcap_pipeline;
use crate::resources;
use crate::scene::Scene;
use crate::text::Typeface;

/// Completions of spawned work, delivered through the event loop proxy.
pub enum AppEvent {
    /// Async initialization finished (the web path; native blocks instead).
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<AppState>),
    MatcapLoaded(TextureChoice, image::DynamicImage),
    TypefaceLoaded(Typeface),
}

impl Debug for AppEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(_) => f.write_str("Initialized"),
            Self::MatcapLoaded(choice, _) => f.debug_tuple("MatcapLoaded").field(choice).finish(),
            Self::TypefaceLoaded(typeface) => f
                .debug_tuple("TypefaceLoaded")
                .field(&typeface.family_name)
                .finish(),
        }
    }
}

pub struct AppState {
    pub ctx: Context,
    pub scene: Scene,
    panel: Panel,
    pub panel_state: PanelState,
    camera: OrbitCamera,
    projection: Projection,
    camera_resources: CameraResources,
    pipeline: wgpu::RenderPipeline,
    depth_texture: Texture,
    mouse: MouseState,
    started: Instant,
    is_surface_configured: bool,
}

impl AppState {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let ctx = Context::new(window).await?;

        let camera = OrbitCamera::new(Point3::new(1.0, 1.0, 2.0), Point3::new(0.0, 0.0, 0.0));
        let projection = Projection::new(ctx.config.width, ctx.config.height);
        let camera_resources = CameraResources::new(&ctx.device);
        let pipeline = mk_matcap_pipeline(&ctx.device, &ctx.config, &camera_resources.layout);
        let depth_texture = Texture::create_depth_texture(
            &ctx.device,
            [ctx.config.width, ctx.config.height],
            "depth_texture",
        );

        let mut rng = rand::thread_rng();
        let scene = Scene::new(&ctx.device, &ctx.queue, &mut rng);
        let panel = Panel::new(&ctx.window, &ctx.device, ctx.config.format);

        Ok(Self {
            ctx,
            scene,
            panel,
            panel_state: PanelState::default(),
            camera,
            projection,
            camera_resources,
            pipeline,
            depth_texture,
            mouse: MouseState::default(),
            started: Instant::now(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.ctx.resize(size);
        self.projection
            .resize(self.ctx.config.width, self.ctx.config.height);
        self.depth_texture = Texture::create_depth_texture(
            &self.ctx.device,
            [self.ctx.config.width, self.ctx.config.height],
            "depth_texture",
        );
        self.is_surface_configured = true;
    }

    fn update(&mut self, dt: f32) {
        self.camera.update(dt);
        self.camera_resources
            .write(&self.ctx.queue, &self.camera, &self.projection);
        let elapsed = self.started.elapsed().as_secs_f32();
        self.scene.update(&self.ctx.queue, elapsed);
    }

    /// Draw the scene and the panel. Returns the panel actions taken this
    /// frame so the caller can apply them (they may spawn loads).
    fn render(&mut self) -> Result<Vec<PanelAction>, wgpu::SurfaceError> {
        if !self.is_surface_configured {
            return Ok(Vec::new());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("scene_encoder"),
                });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.pipeline);
            self.scene.draw(&mut pass, &self.camera_resources.bind_group);
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        let actions = self.panel.draw(
            &self.ctx.window,
            &self.ctx.device,
            &self.ctx.queue,
            &view,
            [self.ctx.config.width, self.ctx.config.height],
            &mut self.panel_state,
        );

        output.present();
        Ok(actions)
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<AppEvent>,
    state: Option<AppState>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<AppEvent>) -> Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            state: None,
            last_time: Instant::now(),
        })
    }

    /// Install the initialized state and kick off the first asset loads.
    fn install(&mut self, mut state: AppState) {
        let size = state.ctx.window.inner_size();
        state.resize(size);

        let matcap = state.panel_state.matcap;
        self.spawn_matcap_load(matcap);
        self.spawn_typeface_load();

        state.ctx.window.request_redraw();
        self.state = Some(state);
    }

    fn spawn_matcap_load(&self, choice: TextureChoice) {
        let proxy = self.proxy.clone();
        let fut = async move {
            match resources::load_matcap(choice.path()).await {
                Ok(image) => {
                    let _ = proxy.send_event(AppEvent::MatcapLoaded(choice, image));
                }
                Err(error) => log::error!("failed to load matcap {}: {error:#}", choice.label()),
            }
        };
        #[cfg(not(target_arch = "wasm32"))]
        self.runtime.spawn(fut);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(fut);
    }

    fn spawn_typeface_load(&self) {
        let proxy = self.proxy.clone();
        let fut = async move {
            match resources::load_typeface(resources::TYPEFACE_PATH).await {
                Ok(typeface) => {
                    let _ = proxy.send_event(AppEvent::TypefaceLoaded(typeface));
                }
                Err(error) => log::error!("failed to load typeface: {error:#}"),
            }
        };
        #[cfg(not(target_arch = "wasm32"))]
        self.runtime.spawn(fut);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(fut);
    }

    fn apply_panel_actions(&mut self, actions: Vec<PanelAction>) {
        for action in actions {
            match action {
                PanelAction::SelectMatcap(choice) => self.spawn_matcap_load(choice),
                PanelAction::EditText(text) => {
                    let Some(state) = &mut self.state else { return };
                    if let Err(error) = state.scene.rebuild_text(&state.ctx.device, &text) {
                        log::error!("failed to rebuild text mesh: {error:#}");
                    }
                }
            }
        }
    }
}

impl ApplicationHandler<AppEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("bagelverse");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{JsCast, UnwrapThrowExt};
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                log::error!("failed to create a window: {error}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.runtime.block_on(AppState::new(window)) {
                Ok(state) => self.install(state),
                Err(error) => {
                    log::error!("initialization failed: {error:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::UnwrapThrowExt;

            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = AppState::new(window).await.unwrap_throw();
                assert!(
                    proxy
                        .send_event(AppEvent::Initialized(Box::new(state)))
                        .is_ok()
                );
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AppEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            AppEvent::Initialized(state) => {
                // The message from our `spawn_local` above.
                self.install(*state);
            }
            AppEvent::MatcapLoaded(choice, image) => {
                let Some(state) = &mut self.state else { return };
                // A slow load racing a newer selection must not win.
                if choice != state.panel_state.matcap {
                    log::debug!("discarding stale matcap load {}", choice.label());
                    return;
                }
                match Texture::from_image(
                    &state.ctx.device,
                    &state.ctx.queue,
                    &image,
                    Some(choice.label()),
                ) {
                    Ok(texture) => {
                        state.scene.material.set_texture(&state.ctx.device, texture);
                        state.ctx.window.request_redraw();
                    }
                    Err(error) => {
                        log::error!("failed to upload matcap {}: {error:#}", choice.label())
                    }
                }
            }
            AppEvent::TypefaceLoaded(typeface) => {
                let Some(state) = &mut self.state else { return };
                let text = state.panel_state.text.clone();
                match state
                    .scene
                    .set_typeface(&state.ctx.device, typeface, &text)
                {
                    Ok(()) => {
                        state.panel_state.text_enabled = true;
                        state.ctx.window.request_redraw();
                    }
                    Err(error) => log::error!("failed to build text mesh: {error:#}"),
                }
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else { return };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if state.mouse.left_pressed && !state.panel.wants_pointer() {
                state.camera.rotate(dx as f32, dy as f32);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else { return };

        if state.panel.on_window_event(&state.ctx.window, &event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                state.mouse.left_pressed = button_state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if !state.panel.wants_pointer() {
                    match delta {
                        MouseScrollDelta::LineDelta(_, y) => state.camera.zoom(y),
                        MouseScrollDelta::PixelDelta(position) => {
                            state.camera.zoom(position.y as f32 / 50.0)
                        }
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed().as_secs_f32().min(0.1);
                self.last_time = Instant::now();
                state.update(dt);

                match state.render() {
                    Ok(actions) => {
                        // Continuous animation: immediately queue the next frame.
                        state.ctx.window.request_redraw();
                        self.apply_panel_actions(actions);
                    }
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size);
                        state.ctx.window.request_redraw();
                    }
                    Err(error) => {
                        log::error!("unable to render: {error}");
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(error) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {error}");
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::UnwrapThrowExt;
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<AppEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use wasm_bindgen::UnwrapThrowExt;
    run().unwrap_throw();
}
