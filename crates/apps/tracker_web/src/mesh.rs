//! Vertex data for the scene's primitive shapes.

use scene::components::Shape3D;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub topology: Topology,
}

fn vertex(position: [f64; 3], normal: [f64; 3], uv: [f64; 2]) -> MeshVertex {
    MeshVertex {
        position: position.map(|v| v as f32),
        normal: normal.map(|v| v as f32),
        uv: uv.map(|v| v as f32),
    }
}

pub fn build_mesh(shape: &Shape3D) -> Mesh {
    match *shape {
        Shape3D::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere(radius, width_segments, height_segments),
        Shape3D::Cylinder {
            radius,
            height,
            radial_segments,
        } => cylinder(radius, height, radial_segments),
        Shape3D::Plane { width, height } => plane(width, height),
        Shape3D::Grid { size, divisions } => grid(size, divisions),
    }
}

/// UV sphere laid out like `project_to_sphere`: `u = 0` at longitude -180, `v = 0` at the
/// north pole, so an equirectangular image wraps with its top row at the pole.
fn sphere(radius: f64, width_segments: u32, height_segments: u32) -> Mesh {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
    for iy in 0..=hs {
        let v = f64::from(iy) / f64::from(hs);
        let phi = v * std::f64::consts::PI;
        for ix in 0..=ws {
            let u = f64::from(ix) / f64::from(ws);
            let theta = u * std::f64::consts::TAU;
            let n = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
            vertices.push(vertex(n.map(|c| c * radius), n, [u, v]));
        }
    }

    let stride = ws + 1;
    let mut indices = Vec::with_capacity((ws * hs * 6) as usize);
    for iy in 0..hs {
        for ix in 0..ws {
            let a = iy * stride + ix;
            let b = a + stride;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if iy != hs - 1 {
                indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }

    Mesh {
        vertices,
        indices,
        topology: Topology::Triangles,
    }
}

/// Closed cylinder along Y, centered on the origin.
fn cylinder(radius: f64, height: f64, radial_segments: u32) -> Mesh {
    let segs = radial_segments.max(3);
    let half = height / 2.0;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ix in 0..=segs {
        let u = f64::from(ix) / f64::from(segs);
        let theta = u * std::f64::consts::TAU;
        let (s, c) = theta.sin_cos();
        let normal = [s, 0.0, c];
        vertices.push(vertex([radius * s, half, radius * c], normal, [u, 0.0]));
        vertices.push(vertex([radius * s, -half, radius * c], normal, [u, 1.0]));
    }
    for ix in 0..segs {
        let top = ix * 2;
        indices.extend_from_slice(&[top, top + 1, top + 2, top + 2, top + 1, top + 3]);
    }

    for (y, ny) in [(half, 1.0), (-half, -1.0)] {
        let center = vertices.len() as u32;
        vertices.push(vertex([0.0, y, 0.0], [0.0, ny, 0.0], [0.5, 0.5]));
        for ix in 0..=segs {
            let theta = f64::from(ix) / f64::from(segs) * std::f64::consts::TAU;
            let (s, c) = theta.sin_cos();
            vertices.push(vertex(
                [radius * s, y, radius * c],
                [0.0, ny, 0.0],
                [0.5 + s / 2.0, 0.5 + c / 2.0],
            ));
        }
        for ix in 0..segs {
            indices.extend_from_slice(&[center, center + 1 + ix, center + 2 + ix]);
        }
    }

    Mesh {
        vertices,
        indices,
        topology: Topology::Triangles,
    }
}

fn plane(width: f64, height: f64) -> Mesh {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let n = [0.0, 0.0, 1.0];
    Mesh {
        vertices: vec![
            vertex([-hw, hh, 0.0], n, [0.0, 0.0]),
            vertex([hw, hh, 0.0], n, [1.0, 0.0]),
            vertex([-hw, -hh, 0.0], n, [0.0, 1.0]),
            vertex([hw, -hh, 0.0], n, [1.0, 1.0]),
        ],
        indices: vec![0, 2, 1, 2, 3, 1],
        topology: Topology::Triangles,
    }
}

fn grid(size: f64, divisions: u32) -> Mesh {
    let divisions = divisions.max(1);
    let half = size / 2.0;
    let step = size / f64::from(divisions);
    let up = [0.0, 1.0, 0.0];

    let mut vertices = Vec::with_capacity(((divisions + 1) * 4) as usize);
    for i in 0..=divisions {
        let k = -half + f64::from(i) * step;
        vertices.push(vertex([-half, 0.0, k], up, [0.0, 0.0]));
        vertices.push(vertex([half, 0.0, k], up, [0.0, 0.0]));
        vertices.push(vertex([k, 0.0, -half], up, [0.0, 0.0]));
        vertices.push(vertex([k, 0.0, half], up, [0.0, 0.0]));
    }
    let indices = (0..vertices.len() as u32).collect();

    Mesh {
        vertices,
        indices,
        topology: Topology::Lines,
    }
}
