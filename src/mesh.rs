use std::collections::HashSet;

use wgpu::util::DeviceExt;

use crate::error::BootstrapError;

#[repr(C)] // make 'C-like' memory storage so the bytes match the vertex layout
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    /// Layout of a tightly packed vertex buffer holding only positions.
    /// Stride and format come from the `Vertex` type so the pipeline always
    /// reads the bytes that were uploaded.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

pub const HEXAGON_VERTICES: &[Vertex] = &[
    Vertex {
        position: [0.3, 0.5],
    }, // top right
    Vertex {
        position: [0.5, 0.0],
    }, // right
    Vertex {
        position: [0.3, -0.5],
    }, // bottom right
    Vertex {
        position: [-0.3, -0.5],
    }, // bottom left
    Vertex {
        position: [-0.5, 0.0],
    }, // left
    Vertex {
        position: [-0.3, 0.5],
    }, // top left
];

pub const HEXAGON_INDICES: &[u32] = &[0, 5, 4, 0, 4, 1, 1, 4, 3, 1, 3, 2];

/// Checks that `indices` is a triangle list that stays inside a buffer of
/// `vertex_count` vertices.
pub fn check_indices(indices: &[u32], vertex_count: usize) -> Result<(), BootstrapError> {
    if indices.is_empty() || indices.len() % 3 != 0 {
        return Err(BootstrapError::Mesh(format!(
            "{} indices do not form a triangle list",
            indices.len()
        )));
    }

    if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(BootstrapError::Mesh(format!(
            "index {} out of bounds for {} vertices",
            bad, vertex_count
        )));
    }

    Ok(())
}

/// Number of distinct vertices a triangle list touches.
pub fn referenced_vertices(indices: &[u32]) -> usize {
    indices.iter().collect::<HashSet<_>>().len()
}

/// A vertex buffer and an index buffer, uploaded once and never written to
/// again.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl Mesh {
    pub fn upload(
        device: &wgpu::Device,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Mesh, BootstrapError> {
        check_indices(indices, vertices.len())?;

        // no COPY_DST: the buffers are static once created
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Hexagon Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Hexagon Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::info!(
            "Uploaded mesh: {} triangles over {} of {} vertices",
            indices.len() / 3,
            referenced_vertices(indices),
            vertices.len()
        );

        Ok(Mesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        })
    }

    pub fn hexagon(device: &wgpu::Device) -> Result<Mesh, BootstrapError> {
        Self::upload(device, HEXAGON_VERTICES, HEXAGON_INDICES)
    }

    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Releases the GPU memory now instead of at drop.
    pub fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hexagon_is_four_triangles_over_six_vertices() {
        assert_eq!(HEXAGON_VERTICES.len(), 6);
        assert_eq!(HEXAGON_INDICES.len(), 12);
        assert_eq!(HEXAGON_INDICES.len() / 3, 4);
        assert_eq!(referenced_vertices(HEXAGON_INDICES), 6);
        assert!(HEXAGON_INDICES.iter().all(|&i| i <= 5));
        assert!(check_indices(HEXAGON_INDICES, HEXAGON_VERTICES.len()).is_ok());
    }

    #[test]
    fn layout_matches_vertex_bytes() {
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.array_stride as usize, std::mem::size_of::<Vertex>());
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(layout.attributes.len(), 1);

        let position = layout.attributes[0];
        assert_eq!(position.shader_location, 0);
        assert_eq!(position.offset, 0);
        assert_eq!(position.format, wgpu::VertexFormat::Float32x2);
        assert_eq!(position.format.size(), layout.array_stride);
    }

    #[test]
    fn uploaded_bytes_are_tightly_packed() {
        let bytes: &[u8] = bytemuck::cast_slice(HEXAGON_VERTICES);
        assert_eq!(bytes.len(), HEXAGON_VERTICES.len() * 2 * 4);
    }

    #[test]
    fn out_of_bounds_index_is_rejected() {
        let err = check_indices(&[0, 1, 6], 6).unwrap_err();
        assert!(err.to_string().contains("index 6 out of bounds"));
    }

    #[test]
    fn partial_triangle_is_rejected() {
        assert!(check_indices(&[0, 1], 6).is_err());
        assert!(check_indices(&[], 6).is_err());
    }

    #[test]
    fn hexagon_uploads_static_buffers() {
        let Some((device, _queue)) =
            crate::testing::headless_device("hexagon_uploads_static_buffers")
        else {
            return;
        };
        let mesh = Mesh::hexagon(&device).unwrap();
        assert_eq!(mesh.index_count, 12);
        assert_eq!(mesh.vertex_buffer.size(), 6 * 8);
        assert_eq!(mesh.index_buffer.size(), 12 * 4);
        assert_eq!(mesh.vertex_buffer.usage(), wgpu::BufferUsages::VERTEX);
        assert_eq!(mesh.index_buffer.usage(), wgpu::BufferUsages::INDEX);
        mesh.destroy();
    }

    #[test]
    fn upload_rejects_bad_indices_before_touching_the_device() {
        let Some((device, _queue)) =
            crate::testing::headless_device("upload_rejects_bad_indices_before_touching_the_device")
        else {
            return;
        };
        assert!(Mesh::upload(&device, HEXAGON_VERTICES, &[0, 1, 9]).is_err());
    }
}
