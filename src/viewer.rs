//! The viewer application: window, event loop and per-frame rendering.
//!
//! Startup is synchronous up to the first frame. Asset loading runs on the
//! async runtime and comes back to the event loop as a user event, so the
//! window renders (an empty, postprocessed frame) while the environment and
//! model are still in flight.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and the GPU context, then kicks off the
//!    asset load
//! 2. `user_event` installs the loaded assets into the scene
//! 3. every `RedrawRequested` advances the rotation tween, renders the
//!    scene through the composer and requests the next frame
//! 4. `Resized` propagates to the camera, depth texture and composer
//! 5. `CursorMoved` retargets the model rotation

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::Context,
    data_structures::model::DrawModel,
    options::ViewerOptions,
    pipelines::lighting::{AmbientLightUniform, LightingResources},
    resources::{self, SceneAssets},
    scene::Scene,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub(crate) enum ViewerEvent {
    // This is the message from our wasm `spawn_local`
    #[cfg(target_arch = "wasm32")]
    Initialized(Box<AppState>),
    AssetsLoaded(Box<SceneAssets>),
}

/// Application state bundle: GPU context, scene and surface status.
#[derive(Debug)]
pub(crate) struct AppState {
    ctx: Context,
    scene: Scene,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, options: &ViewerOptions) -> anyhow::Result<Self> {
        let ctx = Context::new(window, options).await?;
        Ok(Self {
            ctx,
            scene: Scene::new(options),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.is_surface_configured = true;
            self.ctx.resize(width, height);
        }
    }

    fn install_assets(&mut self, assets: SceneAssets, options: &ViewerOptions) {
        let ambient = AmbientLightUniform {
            colour: options.ambient_colour,
            intensity: options.ambient_intensity,
        };
        let lighting = LightingResources::new(
            &self.ctx.device,
            ambient,
            assets.environment,
            &self.ctx.lighting_layout,
        );
        self.scene.install(lighting, assets.model);
        log::info!("scene assets installed");
    }

    fn render(&mut self) -> Result<(), wgpu::CurrentSurfaceTexture> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            other => return Err(other),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut scene_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.ctx.composer.scene_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            if let (Some(model), Some(lighting)) = (self.scene.model(), self.scene.lighting()) {
                scene_pass.set_pipeline(&self.ctx.model_pipeline);
                scene_pass.draw_model(model, &self.ctx.camera.bind_group, &lighting.bind_group);
            }
        }
        {
            let mut post_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Post Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.ctx.composer.blit(&mut post_pass);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: winit::event_loop::EventLoopProxy<ViewerEvent>,
    state: Option<AppState>,
    options: ViewerOptions,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>, options: ViewerOptions) -> anyhow::Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy: event_loop.create_proxy(),
            state: None,
            options,
            last_time: Instant::now(),
        })
    }

    /// Kick off asset loading; the result comes back as a user event. A
    /// failure is logged and leaves the scene without a model.
    fn spawn_asset_load(&self, device: wgpu::Device, queue: wgpu::Queue) {
        let options = self.options.clone();
        let proxy = self.proxy.clone();
        let load = async move {
            match resources::load_scene_assets(&options, &device, &queue).await {
                Ok(assets) => {
                    if proxy
                        .send_event(ViewerEvent::AssetsLoaded(Box::new(assets)))
                        .is_err()
                    {
                        log::warn!("event loop closed before the scene assets arrived");
                    }
                }
                Err(e) => log::error!("failed to load scene assets: {e:#}"),
            }
        };
        #[cfg(not(target_arch = "wasm32"))]
        let _ = self.async_runtime.spawn(load);
        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load);
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("hdri-view");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create the viewer window: {e}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let state = match self
                .async_runtime
                .block_on(AppState::new(window, &self.options))
            {
                Ok(state) => state,
                Err(e) => {
                    log::error!("viewer initialization failed: {e:#}");
                    event_loop.exit();
                    return;
                }
            };
            self.spawn_asset_load(state.ctx.device.clone(), state.ctx.queue.clone());
            self.state = Some(state);
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            let options = self.options.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let state = AppState::new(window, &options)
                    .await
                    .expect("viewer initialization failed");
                assert!(
                    proxy
                        .send_event(ViewerEvent::Initialized(Box::new(state)))
                        .is_ok()
                );
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            #[cfg(target_arch = "wasm32")]
            ViewerEvent::Initialized(state) => {
                let mut state = *state;
                // Trigger a resize and redraw now that we are initialized
                let size = state.ctx.window.inner_size();
                state.resize(size.width, size.height);
                let device = state.ctx.device.clone();
                let queue = state.ctx.queue.clone();
                state.ctx.window.request_redraw();
                self.state = Some(state);
                self.spawn_asset_load(device, queue);
            }
            ViewerEvent::AssetsLoaded(assets) => {
                if let Some(state) = &mut self.state {
                    state.install_assets(*assets, &self.options);
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                let size = state.ctx.window.inner_size();
                state.scene.pointer_moved(position, size);
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                if let Some((pitch, yaw)) = state.scene.step_animation(dt) {
                    if let Some(model) = state.scene.model() {
                        model.set_rotation(&state.ctx.queue, pitch, yaw);
                    }
                }

                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => log::error!("unable to render: {e}"),
                }
            }
            _ => {}
        }
    }
}

/// Build the event loop and run the viewer until the window closes.
pub fn run(options: ViewerOptions) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {e}");
        }
    }

    #[cfg(target_arch = "wasm32")]
    console_log::init_with_level(log::Level::Info).unwrap_throw();

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, options)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
