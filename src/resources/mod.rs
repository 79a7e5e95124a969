//! Loading of external assets: the HDRI environment and the glTF model.
//!
//! Loading is deliberately ordered: the environment is fetched and decoded
//! before the model source is touched, so lighting is ready by the time the
//! model can appear. A failed environment load therefore aborts the whole
//! load, and the model source is never read.

pub mod texture;

use std::io::{BufReader, Cursor};

use anyhow::{Context as _, Result, anyhow};
use cgmath::{InnerSpace, Matrix, Matrix4, Point3, SquareMatrix, Transform, Vector3};

use crate::{
    data_structures::{
        model::{Material, Mesh, MeshData, Model, ModelVertex},
        texture::Texture,
    },
    options::ViewerOptions,
    pipelines::model::{material_bind_group_layout, transform_bind_group_layout},
    resources::texture::{load_binary, load_texture},
};

/// GPU-ready assets for one scene.
#[derive(Debug)]
pub struct SceneAssets {
    pub environment: Texture,
    pub model: Model,
}

/// Decoded sources, before any GPU upload.
pub struct SceneSources {
    pub environment: image::Rgba32FImage,
    pub document: gltf::Document,
    pub buffers: Vec<Vec<u8>>,
}

/// Decode Radiance HDR bytes into linear float RGBA.
pub fn decode_hdr(bytes: &[u8]) -> Result<image::Rgba32FImage> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Hdr)
        .context("decoding equirectangular HDR image")?;
    Ok(img.to_rgba32f())
}

/// Fetch and decode both asset sources, environment first.
pub async fn load_scene_sources(environment: &str, model: &str) -> Result<SceneSources> {
    let hdr_bytes = load_binary(environment)
        .await
        .with_context(|| format!("loading environment {environment}"))?;
    let environment = decode_hdr(&hdr_bytes)?;

    let gltf_bytes = load_binary(model)
        .await
        .with_context(|| format!("loading model {model}"))?;
    let gltf = gltf::Gltf::from_reader(BufReader::new(Cursor::new(gltf_bytes)))
        .with_context(|| format!("parsing model {model}"))?;

    let mut buffers = Vec::new();
    for buffer in gltf.document.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffers.push(blob.to_vec());
                }
            }
            gltf::buffer::Source::Uri(uri) => {
                buffers.push(load_binary(uri).await?);
            }
        }
    }

    Ok(SceneSources {
        environment,
        document: gltf.document,
        buffers,
    })
}

/// Extract every mesh primitive with its node transform baked into the
/// vertices, so the runtime model matrix stays a pure rotation.
pub fn extract_mesh_data(document: &gltf::Document, buffers: &[Vec<u8>]) -> Result<Vec<MeshData>> {
    let mut meshes = Vec::new();
    for scene in document.scenes() {
        for node in scene.nodes() {
            collect_node(&node, Matrix4::identity(), buffers, &mut meshes)?;
        }
    }
    if meshes.is_empty() {
        return Err(anyhow!("model contains no mesh primitives"));
    }
    Ok(meshes)
}

fn collect_node(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[Vec<u8>],
    out: &mut Vec<MeshData>,
) -> Result<()> {
    let local = Matrix4::from(node.transform().matrix());
    let transform = parent * local;

    if let Some(mesh) = node.mesh() {
        // Normals need the inverse transpose in case a node scales.
        let normal_matrix = transform
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);

        for (index, primitive) in mesh.primitives().enumerate() {
            let reader =
                primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| anyhow!("mesh primitive without positions"))?
                .collect();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|normals| normals.collect())
                .unwrap_or_default();
            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|tex_coords| tex_coords.into_f32().collect())
                .unwrap_or_default();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let vertices = positions
                .iter()
                .enumerate()
                .map(|(i, position)| {
                    let position = transform.transform_point(Point3::from(*position));
                    let normal = normals
                        .get(i)
                        .map(|normal| {
                            normal_matrix
                                .transform_vector(Vector3::from(*normal))
                                .normalize()
                        })
                        .unwrap_or_else(Vector3::unit_z);
                    ModelVertex {
                        position: position.into(),
                        tex_coords: tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                        normal: normal.into(),
                    }
                })
                .collect();

            out.push(MeshData {
                name: format!("{}.{}", mesh.name().unwrap_or("mesh"), index),
                vertices,
                indices,
                material_id: primitive.material().index(),
            });
        }
    }

    for child in node.children() {
        collect_node(&child, transform, buffers, out)?;
    }
    Ok(())
}

async fn load_materials(
    document: &gltf::Document,
    buffers: &[Vec<u8>],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> Result<Vec<Material>> {
    let mut materials = Vec::new();
    for material in document.materials() {
        let name = material.name().unwrap_or("material").to_string();
        let pbr = material.pbr_metallic_roughness();
        let base_colour = match pbr.base_color_texture() {
            Some(info) => match info.texture().source().source() {
                gltf::image::Source::View { view, mime_type: _ } => {
                    let start = view.offset();
                    let end = start + view.length();
                    let bytes = buffers
                        .get(view.buffer().index())
                        .and_then(|buffer| buffer.get(start..end))
                        .ok_or_else(|| anyhow!("texture buffer view out of range in {name}"))?;
                    Texture::from_bytes(device, queue, bytes, &name, true)?
                }
                gltf::image::Source::Uri { uri, mime_type: _ } => {
                    load_texture(uri, device, queue).await?
                }
            },
            // No texture: a single texel carrying the base colour factor.
            None => solid_colour_texture(device, queue, pbr.base_color_factor(), &name)?,
        };
        materials.push(Material::new(device, &name, base_colour, layout));
    }

    if materials.is_empty() {
        let fallback = solid_colour_texture(device, queue, [1.0, 1.0, 1.0, 1.0], "default")?;
        materials.push(Material::new(device, "default", fallback, layout));
    }
    Ok(materials)
}

fn solid_colour_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    factor: [f32; 4],
    label: &str,
) -> Result<Texture> {
    let rgba: Vec<u8> = factor
        .iter()
        .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    let img = image::RgbaImage::from_raw(1, 1, rgba)
        .ok_or_else(|| anyhow!("building fallback texel for {label}"))?;
    Texture::from_image(
        device,
        queue,
        &image::DynamicImage::ImageRgba8(img),
        Some(label),
        true,
    )
}

/// Upload decoded sources to the GPU.
pub async fn upload_scene(
    sources: SceneSources,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<SceneAssets> {
    let environment = Texture::from_equirect(device, queue, &sources.environment, "Environment Map");

    let material_layout = material_bind_group_layout(device);
    let materials = load_materials(
        &sources.document,
        &sources.buffers,
        device,
        queue,
        &material_layout,
    )
    .await?;

    let mesh_data = extract_mesh_data(&sources.document, &sources.buffers)?;
    let meshes = mesh_data
        .iter()
        .map(|data| Mesh::from_data(device, data))
        .collect();

    let transform_layout = transform_bind_group_layout(device);
    let model = Model::new(device, meshes, materials, &transform_layout);

    Ok(SceneAssets { environment, model })
}

/// Load everything the scene needs: the environment first, then the model.
pub async fn load_scene_assets(
    options: &ViewerOptions,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> Result<SceneAssets> {
    let sources = load_scene_sources(&options.environment, &options.model).await?;
    log::info!(
        "environment {}x{}, {} model buffer(s) loaded",
        sources.environment.width(),
        sources.environment.height(),
        sources.buffers.len()
    );
    upload_scene(sources, device, queue).await
}
