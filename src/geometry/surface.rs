use std::f64::consts::TAU;

use glam::DVec3;
use thiserror::Error;

use crate::geometry::mesh::TriangleMesh;
use crate::geometry::profile::ProfileCurve;

const NORMAL_EPS: f64 = 1e-5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("surface resolution must be at least 1x1, got {slices}x{stacks}")]
    ZeroResolution { slices: usize, stacks: usize },
    #[error("surface resolution {slices}x{stacks} needs more than u32::MAX vertices")]
    TooManyVertices { slices: usize, stacks: usize },
}

/// Surface of revolution: the profile gives the radius, the axis is Z.
#[derive(Clone, Copy, Debug)]
pub struct RevolutionSurface {
    pub profile: ProfileCurve,
    pub depth_scale: f64,
}

impl Default for RevolutionSurface {
    fn default() -> Self {
        Self {
            profile: ProfileCurve::default(),
            depth_scale: 15.0,
        }
    }
}

impl RevolutionSurface {
    pub fn new(profile: ProfileCurve, depth_scale: f64) -> Self {
        Self {
            profile,
            depth_scale,
        }
    }

    /// `u` walks around the axis, `t` along it. Both are in `[0, 1]`.
    pub fn point(&self, u: f64, t: f64) -> DVec3 {
        let radius = self.profile.radius(t);
        let angle = u * TAU;
        DVec3::new(
            angle.sin() * radius,
            angle.cos() * radius,
            (t - 0.5) * self.depth_scale,
        )
    }

    fn normal(&self, u: f64, t: f64, p0: DVec3) -> DVec3 {
        let du = if u - NORMAL_EPS >= 0.0 {
            p0 - self.point(u - NORMAL_EPS, t)
        } else {
            self.point(u + NORMAL_EPS, t) - p0
        };
        let dt = if t - NORMAL_EPS >= 0.0 {
            p0 - self.point(u, t - NORMAL_EPS)
        } else {
            self.point(u, t + NORMAL_EPS) - p0
        };

        du.cross(dt).try_normalize().unwrap_or(DVec3::Z)
    }

    /// Samples the surface on a `(slices + 1) x (stacks + 1)` grid and
    /// triangulates it. Rows run along `t`, columns around `u`.
    pub fn tessellate(&self, slices: usize, stacks: usize) -> Result<TriangleMesh, GeometryError> {
        if slices == 0 || stacks == 0 {
            return Err(GeometryError::ZeroResolution { slices, stacks });
        }

        let row_len = slices + 1;
        let vertex_count = row_len * (stacks + 1);
        if vertex_count > u32::MAX as usize {
            return Err(GeometryError::TooManyVertices { slices, stacks });
        }

        let mut vertices = Vec::with_capacity(vertex_count * 3);
        let mut normals = Vec::with_capacity(vertex_count * 3);
        let mut uvs = Vec::with_capacity(vertex_count * 2);

        for i in 0..=stacks {
            let t = i as f64 / stacks as f64;
            for j in 0..=slices {
                let u = j as f64 / slices as f64;

                let p = self.point(u, t);
                let n = self.normal(u, t, p);

                vertices.extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
                normals.extend_from_slice(&[n.x as f32, n.y as f32, n.z as f32]);
                uvs.extend_from_slice(&[u as f32, t as f32]);
            }
        }

        let mut indices = Vec::with_capacity(slices * stacks * 6);
        for i in 0..stacks {
            for j in 0..slices {
                let a = (i * row_len + j) as u32;
                let b = (i * row_len + j + 1) as u32;
                let d = ((i + 1) * row_len + j) as u32;
                let c = ((i + 1) * row_len + j + 1) as u32;

                indices.push(a);
                indices.push(b);
                indices.push(d);

                indices.push(b);
                indices.push(c);
                indices.push(d);
            }
        }

        Ok(TriangleMesh {
            vertices,
            normals,
            uvs,
            indices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn start_of_profile_sits_on_the_y_axis() {
        let surface = RevolutionSurface::new(ProfileCurve::new([70.0, 1.0, 1.0, 1.0]), 15.0);
        let p = surface.point(0.0, 0.0);
        assert!(approx(p.x, 0.0, EPS));
        assert!(approx(p.y, 70.0, EPS));
        assert!(approx(p.z, -7.5, EPS));
    }

    #[test]
    fn quarter_turn_at_the_tip() {
        let surface = RevolutionSurface::new(ProfileCurve::new([70.0, 1.0, 1.0, 1.0]), 15.0);
        let p = surface.point(0.25, 1.0);
        assert!(approx(p.x, 1.0, 1e-12));
        assert!(approx(p.y, 0.0, 1e-12));
        assert!(approx(p.z, 7.5, EPS));
    }

    #[test]
    fn every_point_lies_on_its_ring() {
        let surface = RevolutionSurface::default();
        for ti in 0..=20 {
            let t = ti as f64 / 20.0;
            let radius = surface.profile.radius(t);
            for ui in 0..=36 {
                let u = ui as f64 / 36.0;
                let p = surface.point(u, t);
                let axis_distance = (p.x * p.x + p.y * p.y).sqrt();
                assert!(approx(axis_distance, radius, 1e-9));
                assert!(approx(p.z, (t - 0.5) * 15.0, EPS));
            }
        }
    }

    #[test]
    fn tessellation_counts() {
        let mesh = RevolutionSurface::default().tessellate(8, 5).unwrap();
        assert_eq!(mesh.vertex_count(), 9 * 6);
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
        assert_eq!(mesh.uvs.len(), mesh.vertex_count() * 2);
        assert_eq!(mesh.index_count(), 8 * 5 * 6);

        let max = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn full_resolution_mesh_fits_u32_indices() {
        let mesh = RevolutionSurface::default().tessellate(325, 325).unwrap();
        assert_eq!(mesh.vertex_count(), 326 * 326);
        assert_eq!(mesh.index_count(), 325 * 325 * 6);
    }

    #[test]
    fn sampled_vertices_match_the_point_function() {
        let surface = RevolutionSurface::default();
        let mesh = surface.tessellate(12, 7).unwrap();

        for (pos, uv) in mesh.vertices.chunks_exact(3).zip(mesh.uvs.chunks_exact(2)) {
            let (u, t) = (uv[0] as f64, uv[1] as f64);
            let radius = surface.profile.radius(t);
            let axis_distance = ((pos[0] as f64).powi(2) + (pos[1] as f64).powi(2)).sqrt();
            assert!(approx(axis_distance, radius, 1e-3 * radius.max(1.0)));
            assert!(approx(pos[2] as f64, (t - 0.5) * 15.0, 1e-5));
            assert!((0.0..=1.0).contains(&u));
        }
    }

    #[test]
    fn normals_are_unit_length() {
        let mesh = RevolutionSurface::default().tessellate(16, 16).unwrap();
        for n in mesh.normals.chunks_exact(3) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4, "normal length {len}");
        }
    }

    #[test]
    fn first_quad_winding() {
        let mesh = RevolutionSurface::default().tessellate(4, 3).unwrap();
        assert_eq!(&mesh.indices[..6], &[0, 1, 5, 1, 6, 5]);
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let surface = RevolutionSurface::default();
        assert_eq!(
            surface.tessellate(0, 10).err(),
            Some(GeometryError::ZeroResolution {
                slices: 0,
                stacks: 10
            })
        );
        assert!(surface.tessellate(10, 0).is_err());
    }

    #[test]
    fn interleaved_vertices_keep_attribute_order() {
        let mesh = RevolutionSurface::default().tessellate(3, 2).unwrap();
        let interleaved = mesh.interleaved();
        assert_eq!(interleaved.len(), mesh.vertex_count());
        let last = interleaved.last().unwrap();
        assert_eq!(last.uv, [1.0, 1.0]);
        assert_eq!(last.position[2], 7.5);
    }
}
