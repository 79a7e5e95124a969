//! GPU-backed smoke tests. These need a real adapter, so they hide behind
//! the `integration-tests` feature:
//!
//! ```text
//! cargo test --features integration-tests
//! ```

#![cfg(feature = "integration-tests")]

use hdri_view::data_structures::model::{Material, Mesh, MeshData, Model, ModelVertex};
use hdri_view::data_structures::texture::Texture;
use hdri_view::options::ViewerOptions;
use hdri_view::pipelines::lighting::{AmbientLightUniform, LightingResources, mk_bind_group_layout};
use hdri_view::pipelines::model::{material_bind_group_layout, transform_bind_group_layout};
use hdri_view::pipelines::post::Composer;
use hdri_view::scene::Scene;
use instant::Duration;
use winit::dpi::{PhysicalPosition, PhysicalSize};

async fn create_device() -> (wgpu::Device, wgpu::Queue) {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .expect("no compatible adapter");
    adapter
        .request_device(&wgpu::DeviceDescriptor::default())
        .await
        .expect("no device")
}

fn srgb_encode(linear: f64) -> f64 {
    if linear <= 0.0031308 {
        linear * 12.92
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

fn aces_film(x: f64) -> f64 {
    ((x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14)).clamp(0.0, 1.0)
}

#[tokio::test]
async fn empty_scene_renders_the_clear_colour_through_the_composer() {
    let (device, queue) = create_device().await;
    let options = ViewerOptions::default();

    let (width, height) = (64u32, 64u32);
    let format = wgpu::TextureFormat::Rgba8UnormSrgb;
    let mut composer = Composer::new(&device, format, width, height, &options);
    assert_eq!(composer.size(), (width, height));

    let output = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Smoke Test Output"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let output_view = output.create_view(&wgpu::TextureViewDescriptor::default());

    let clear = wgpu::Color {
        r: 0.25,
        g: 0.25,
        b: 0.25,
        a: 1.0,
    };
    let mut encoder =
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
        // An empty scene pass: nothing but the clear reaches the composer.
        let _scene_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: composer.scene_view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
    }
    {
        let mut post_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Post Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &output_view,
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
        composer.blit(&mut post_pass);
    }

    let bytes_per_row = width * 4;
    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: None,
        size: u64::from(bytes_per_row * height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &output,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    let buffer_slice = output_buffer.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .unwrap();
    rx.receive().await.unwrap().unwrap();

    let data = buffer_slice.get_mapped_range();
    // With a uniform input field the RGB shift samples the same value for
    // every channel, so the whole frame is the tone-mapped clear colour.
    let expected = (srgb_encode(aces_film(clear.r * options.exposure as f64)) * 255.0).round();
    let centre = ((height / 2) * bytes_per_row + (width / 2) * 4) as usize;
    for channel in 0..3 {
        let got = f64::from(data[centre + channel]);
        assert!(
            (got - expected).abs() <= 2.0,
            "channel {channel}: got {got}, expected {expected}"
        );
    }
    assert_eq!(data[centre + 3], 255);
}

#[tokio::test]
async fn composer_target_tracks_resize() {
    let (device, _queue) = create_device().await;
    let options = ViewerOptions::default();
    let mut composer = Composer::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb, 64, 64, &options);

    composer.resize(&device, 1280, 720);
    assert_eq!(composer.size(), (1280, 720));

    composer.resize(&device, 0, 0);
    assert_eq!(composer.size(), (1, 1));
}

#[tokio::test]
async fn scene_rotates_only_once_a_model_is_installed() {
    let (device, queue) = create_device().await;
    let options = ViewerOptions::default();
    let mut scene = Scene::new(&options);
    assert!(scene.model().is_none());

    // A pointer event before the model exists changes nothing.
    scene.pointer_moved(PhysicalPosition::new(0.0, 0.0), PhysicalSize::new(800, 600));
    assert_eq!(scene.step_animation(Duration::from_millis(250)), None);

    // Minimal GPU scene: one triangle, one solid material, a flat
    // environment.
    let mesh_data = MeshData {
        name: "triangle".to_string(),
        vertices: vec![
            ModelVertex {
                position: [0.0, 0.0, 0.0],
                tex_coords: [0.0, 0.0],
                normal: [0.0, 0.0, 1.0],
            },
            ModelVertex {
                position: [1.0, 0.0, 0.0],
                tex_coords: [1.0, 0.0],
                normal: [0.0, 0.0, 1.0],
            },
            ModelVertex {
                position: [0.0, 1.0, 0.0],
                tex_coords: [0.0, 1.0],
                normal: [0.0, 0.0, 1.0],
            },
        ],
        indices: vec![0, 1, 2],
        material_id: None,
    };
    let mesh = Mesh::from_data(&device, &mesh_data);
    let white = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        1,
        1,
        image::Rgba([255, 255, 255, 255]),
    ));
    let material_texture =
        Texture::from_image(&device, &queue, &white, Some("white"), true).unwrap();
    let material = Material::new(
        &device,
        "white",
        material_texture,
        &material_bind_group_layout(&device),
    );
    let model = Model::new(
        &device,
        vec![mesh],
        vec![material],
        &transform_bind_group_layout(&device),
    );

    let environment = Texture::from_equirect(
        &device,
        &queue,
        &image::Rgba32FImage::from_pixel(4, 2, image::Rgba([0.5, 0.5, 0.5, 1.0])),
        "flat environment",
    );
    let lighting = LightingResources::new(
        &device,
        AmbientLightUniform {
            colour: options.ambient_colour,
            intensity: options.ambient_intensity,
        },
        environment,
        &mk_bind_group_layout(&device),
    );

    scene.install(lighting, model);
    assert!(scene.has_model());

    // Now the same pointer event drives the tween toward the corner target.
    scene.pointer_moved(PhysicalPosition::new(0.0, 0.0), PhysicalSize::new(800, 600));
    let (pitch, yaw) = scene
        .step_animation(options.tween_duration)
        .expect("tween should be running");
    assert!((pitch + options.rotation_range / 2.0).abs() < 1e-5);
    assert!((yaw + options.rotation_range / 2.0).abs() < 1e-5);
}
