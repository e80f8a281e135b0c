//! CPU mesh data, the torus generator, and GPU mesh buffers.

use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

/// Describes the memory layout of one vertex-buffer element for a pipeline.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];
}

impl Vertex for MeshVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Triangle mesh data on the CPU side.
///
/// Geometry is generated and transformed here before being uploaded into a
/// [`Mesh`]. An empty `MeshData` is valid and uploads to a mesh that draws
/// nothing.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Axis-aligned bounding box as `(min, max)`, or `None` for empty data.
    pub fn bounding_box(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let first = self.vertices.first()?;
        let mut min = Vector3::from(first.position);
        let mut max = min;
        for vertex in &self.vertices {
            let p = Vector3::from(vertex.position);
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }

    pub fn translate(&mut self, offset: Vector3<f32>) {
        for vertex in &mut self.vertices {
            vertex.position[0] += offset.x;
            vertex.position[1] += offset.y;
            vertex.position[2] += offset.z;
        }
    }

    /// Append another mesh, re-basing its indices.
    pub fn extend(&mut self, other: MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }

    /// Recompute vertex normals by area-weighted averaging of face normals.
    pub fn compute_smooth_normals(&mut self) {
        let mut accumulated = vec![Vector3::new(0.0f32, 0.0, 0.0); self.vertices.len()];
        for triangle in self.indices.chunks_exact(3) {
            let a = Vector3::from(self.vertices[triangle[0] as usize].position);
            let b = Vector3::from(self.vertices[triangle[1] as usize].position);
            let c = Vector3::from(self.vertices[triangle[2] as usize].position);
            // The un-normalized cross product weights by triangle area.
            let face_normal = (b - a).cross(c - a);
            for &index in triangle {
                accumulated[index as usize] += face_normal;
            }
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(accumulated) {
            let length = normal.magnitude();
            vertex.normal = if length > 1e-12 {
                (normal / length).into()
            } else {
                [0.0, 0.0, 1.0]
            };
        }
    }
}

/// Generate a torus lying in the XY plane, centered at the origin.
///
/// `radius` is the distance from the torus center to the tube center, `tube`
/// the tube radius. Normals are analytic (radially out of the tube).
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let mut vertices =
        Vec::with_capacity(((radial_segments + 1) * (tubular_segments + 1)) as usize);
    for j in 0..=radial_segments {
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * std::f32::consts::TAU;
            let v = j as f32 / radial_segments as f32 * std::f32::consts::TAU;

            let position = Vector3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let tube_center = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let normal = (position - tube_center).normalize();

            vertices.push(MeshVertex {
                position: position.into(),
                normal: normal.into(),
            });
        }
    }

    let mut indices = Vec::with_capacity((radial_segments * tubular_segments * 6) as usize);
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = (tubular_segments + 1) * j + i - 1;
            let b = (tubular_segments + 1) * (j - 1) + i - 1;
            let c = (tubular_segments + 1) * (j - 1) + i;
            let d = (tubular_segments + 1) * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    MeshData { vertices, indices }
}

/// GPU-side mesh: vertex and index buffers ready for drawing.
#[derive(Debug)]
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl Mesh {
    pub fn from_data(device: &wgpu::Device, data: &MeshData, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_elements: data.indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torus_has_expected_counts() {
        let data = torus(0.3, 0.2, 20, 45);
        assert_eq!(data.vertices.len(), 21 * 46);
        assert_eq!(data.indices.len(), (20 * 45 * 6) as usize);
        assert_eq!(data.indices.len() % 3, 0);
    }

    #[test]
    fn torus_stays_within_outer_radius() {
        let data = torus(0.3, 0.2, 20, 45);
        let (min, max) = data.bounding_box().unwrap();
        for bound in [min.x.abs(), min.y.abs(), max.x, max.y] {
            assert!(bound <= 0.5 + 1e-5);
        }
        assert!(min.z >= -0.2 - 1e-5 && max.z <= 0.2 + 1e-5);
    }

    #[test]
    fn torus_normals_are_unit_length() {
        let data = torus(0.3, 0.2, 8, 12);
        for vertex in &data.vertices {
            let length = Vector3::from(vertex.normal).magnitude();
            assert!((length - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn translate_shifts_bounding_box() {
        let mut data = torus(0.3, 0.2, 4, 4);
        let (min_before, _) = data.bounding_box().unwrap();
        data.translate(Vector3::new(1.0, 0.0, 0.0));
        let (min_after, _) = data.bounding_box().unwrap();
        assert!((min_after.x - min_before.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn extend_rebases_indices() {
        let mut a = torus(0.3, 0.2, 2, 2);
        let b = torus(0.3, 0.2, 2, 2);
        let base = a.vertices.len() as u32;
        let first_b_index = b.indices[0];
        a.extend(b);
        assert_eq!(a.indices[(2 * 2 * 6) as usize], first_b_index + base);
    }

    #[test]
    fn smooth_normals_on_flat_quad_point_up() {
        let mut data = MeshData {
            vertices: [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
                .iter()
                .map(|[x, y]| MeshVertex {
                    position: [*x, *y, 0.0],
                    normal: [0.0; 3],
                })
                .collect(),
            indices: vec![0, 1, 2, 0, 2, 3],
        };
        data.compute_smooth_normals();
        for vertex in &data.vertices {
            assert_eq!(vertex.normal, [0.0, 0.0, 1.0]);
        }
    }
}
