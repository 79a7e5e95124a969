//! Model data: CPU-side mesh extraction output, GPU meshes and materials,
//! and the rotation transform uniform shared by every mesh of the model.

use cgmath::{Matrix4, Rad};
use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Mesh data on the CPU, as extracted from a glTF document. Node transforms
/// are already baked into the vertices.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub material_id: Option<usize>,
}

/// A mesh uploaded to the GPU.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material_id: Option<usize>,
}

impl Mesh {
    pub fn from_data(device: &wgpu::Device, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", data.name)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", data.name)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: data.name.clone(),
            vertex_buffer,
            index_buffer,
            num_elements: data.indices.len() as u32,
            material_id: data.material_id,
        }
    }
}

/// A base-colour material with its bind group.
#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub base_colour: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        base_colour: Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&base_colour.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&base_colour.sampler),
                },
            ],
            label: Some(name),
        });

        Self {
            name: name.to_string(),
            base_colour,
            bind_group,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
}

impl ModelUniform {
    fn from_rotation(pitch: Rad<f32>, yaw: Rad<f32>) -> Self {
        let matrix = Matrix4::from_angle_y(yaw) * Matrix4::from_angle_x(pitch);
        Self {
            model: matrix.into(),
        }
    }
}

/// A loaded model: meshes, materials and the rotation uniform the input
/// handler animates.
#[derive(Debug)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    uniform_buffer: wgpu::Buffer,
    pub transform_bind_group: wgpu::BindGroup,
}

impl Model {
    pub fn new(
        device: &wgpu::Device,
        meshes: Vec<Mesh>,
        materials: Vec<Material>,
        transform_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform = ModelUniform::from_rotation(Rad(0.0), Rad(0.0));
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Transform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("model_transform_bind_group"),
        });

        Self {
            meshes,
            materials,
            uniform_buffer,
            transform_bind_group,
        }
    }

    /// Upload a new rotation. Called once per frame while the tween runs.
    pub fn set_rotation(&self, queue: &wgpu::Queue, pitch: f32, yaw: f32) {
        let uniform = ModelUniform::from_rotation(Rad(pitch), Rad(yaw));
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

pub trait DrawModel<'a> {
    fn draw_mesh(
        &mut self,
        mesh: &'a Mesh,
        material: &'a Material,
        camera_bind_group: &'a wgpu::BindGroup,
        lighting_bind_group: &'a wgpu::BindGroup,
        transform_bind_group: &'a wgpu::BindGroup,
    );
    fn draw_model(
        &mut self,
        model: &'a Model,
        camera_bind_group: &'a wgpu::BindGroup,
        lighting_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(
        &mut self,
        mesh: &'b Mesh,
        material: &'b Material,
        camera_bind_group: &'b wgpu::BindGroup,
        lighting_bind_group: &'b wgpu::BindGroup,
        transform_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, lighting_bind_group, &[]);
        self.set_bind_group(3, transform_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, 0..1);
    }

    fn draw_model(
        &mut self,
        model: &'b Model,
        camera_bind_group: &'b wgpu::BindGroup,
        lighting_bind_group: &'b wgpu::BindGroup,
    ) {
        for mesh in &model.meshes {
            // The loader guarantees at least one material.
            let Some(material) = model.materials.get(mesh.material_id.unwrap_or(0)) else {
                continue;
            };
            self.draw_mesh(
                mesh,
                material,
                camera_bind_group,
                lighting_bind_group,
                &model.transform_bind_group,
            );
        }
    }
}
