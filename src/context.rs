//! Central GPU and window context.

use std::sync::Arc;

use anyhow::Result;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, Projection},
    data_structures::texture::Texture,
    options::ViewerOptions,
    pipelines::{lighting, model::mk_model_pipeline, post::Composer},
};

/// Everything the renderer owns for the lifetime of the window: device,
/// queue, surface, camera resources, the model pipeline and the composer.
#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub lighting_layout: wgpu::BindGroupLayout,
    pub model_pipeline: wgpu::RenderPipeline,
    pub composer: Composer,
    pub clear_colour: wgpu::Color,
}

impl Context {
    pub async fn new(window: Arc<Window>, options: &ViewerOptions) -> Result<Self> {
        let size = window.inner_size();

        log::info!("wgpu setup");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The post shader writes linear colour and leaves the encoding to an
        // sRGB surface format.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let camera = Camera::new((0.0, 0.0, options.camera_distance), (0.0, 0.0, 0.0));
        let projection = Projection::new(
            config.width,
            config.height,
            options.fovy,
            options.znear,
            options.zfar,
        );
        let camera = CameraResources::new(&device, camera, &projection);

        let depth_texture =
            Texture::create_depth_texture(&device, config.width, config.height, "depth_texture");

        let lighting_layout = lighting::mk_bind_group_layout(&device);
        let model_pipeline =
            mk_model_pipeline(&device, &camera.bind_group_layout, &lighting_layout);
        let composer = Composer::new(&device, config.format, config.width, config.height, options);

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            lighting_layout,
            model_pipeline,
            composer,
            clear_colour: options.clear_colour,
        })
    }

    /// Reconfigure the surface and every size-dependent resource.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.projection.resize(width, height);
        self.camera.update(&self.queue, &self.projection);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, width, height, "depth_texture");
        self.composer.resize(&self.device, width, height);
    }
}
