pub struct TriangleMesh {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Bytes the mesh occupies once uploaded (positions, normals, uvs, indices).
    pub fn byte_size(&self) -> usize {
        (self.vertices.len() + self.normals.len() + self.uvs.len()) * size_of::<f32>()
            + self.indices.len() * size_of::<u32>()
    }
}

/// Interleaved vertex layout used by the surface pipeline.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl TriangleMesh {
    pub fn interleaved(&self) -> Vec<SurfaceVertex> {
        self.vertices
            .chunks_exact(3)
            .zip(self.normals.chunks_exact(3))
            .zip(self.uvs.chunks_exact(2))
            .map(|((p, n), uv)| SurfaceVertex {
                position: [p[0], p[1], p[2]],
                normal: [n[0], n[1], n[2]],
                uv: [uv[0], uv[1]],
            })
            .collect()
    }
}
