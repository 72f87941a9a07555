//! Extruded sector meshes for arcs
//!
//! Each arc becomes a pie slice: an outline from the hub centre around the
//! outer edge, extruded straight up by the ring depth with flat caps. The same
//! solid is used as the arc's collision boundary, so there is no separate
//! simplified collider.
//!
//! Ring-plane point `(x, y)` maps to world `(x, h, -y)` with `h` the height
//! inside the slab; rotating the level about +Y by `θ` turns ring angle `a`
//! into world direction `(cos(a+θ), 0, -sin(a+θ))`.

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec2, Vec3};

use crate::consts::FULL_TURN;
use crate::{normalize_angle, polar_to_cartesian};

/// Mesh vertex with position and face normal
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PanelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl PanelVertex {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

/// Solid pie slice for one arc, in the ring's local frame
#[derive(Debug, Clone)]
pub struct ArcPanel {
    /// Closed outline in the ring plane: hub centre, then end -> start
    pub outline: Vec<Vec2>,
    pub vertices: Vec<PanelVertex>,
    /// Triangle list into `vertices`
    pub indices: Vec<u32>,
    pub outer_radius: f32,
    pub depth: f32,
    pub start: f32,
    pub end: f32,
}

/// Number of outer-edge divisions for an arc span
pub fn arc_divisions(start: f32, end: f32, resolution: u32) -> u32 {
    let span = (end - start).max(0.0);
    // tolerance keeps exact fractions of a turn from rounding up a division
    let raw = resolution as f32 * span / FULL_TURN;
    ((raw - 1e-4).ceil() as u32).max(1)
}

/// Ring-plane point to local 3D position at height `h`
#[inline]
pub fn plane_to_local(p: Vec2, h: f32) -> Vec3 {
    Vec3::new(p.x, h, -p.y)
}

/// Local 3D position back to its ring-plane point
#[inline]
pub fn local_to_plane(p: Vec3) -> Vec2 {
    Vec2::new(p.x, -p.z)
}

/// World point (relative to the ring centre) into the frame of a ring
/// rotated by `rotation` about +Y
pub fn world_to_local(point: Vec3, rotation: f32) -> Vec3 {
    Quat::from_rotation_y(-rotation) * point
}

/// Direction in world space of ring angle `theta` for a ring rotated by `rotation`
pub fn ring_direction(theta: f32, rotation: f32) -> Vec3 {
    let a = theta + rotation;
    Vec3::new(a.cos(), 0.0, -a.sin())
}

/// Build the extruded mesh for an arc
pub fn build_arc_panel(
    outer_radius: f32,
    depth: f32,
    start: f32,
    end: f32,
    resolution: u32,
) -> ArcPanel {
    let divisions = arc_divisions(start, end, resolution);
    let span = end - start;

    let mut outline = Vec::with_capacity(divisions as usize + 2);
    outline.push(Vec2::ZERO);
    for i in 0..=divisions {
        let theta = end - span * (i as f32 / divisions as f32);
        outline.push(polar_to_cartesian(outer_radius, theta));
    }

    let mut mesh = MeshBuilder::default();
    let centroid = outline.iter().copied().sum::<Vec2>() / outline.len() as f32;

    // Caps: triangle fans around the hub centre
    for (h, normal) in [(0.0, Vec3::NEG_Y), (depth, Vec3::Y)] {
        let base = mesh.vertices.len() as u32;
        for p in &outline {
            mesh.vertices.push(PanelVertex::new(plane_to_local(*p, h), normal));
        }
        for k in 1..outline.len() - 1 {
            mesh.triangle(base, base + k as u32, base + k as u32 + 1, normal);
        }
    }

    // Side walls, one flat quad per outline edge
    for k in 0..outline.len() {
        let a = outline[k];
        let b = outline[(k + 1) % outline.len()];
        let edge = b - a;
        let mut n2 = Vec2::new(edge.y, -edge.x).normalize_or_zero();
        if n2.dot((a + b) / 2.0 - centroid) < 0.0 {
            n2 = -n2;
        }
        let normal = plane_to_local(n2, 0.0);
        let base = mesh.vertices.len() as u32;
        for (p, h) in [(a, 0.0), (b, 0.0), (b, depth), (a, depth)] {
            mesh.vertices.push(PanelVertex::new(plane_to_local(p, h), normal));
        }
        mesh.triangle(base, base + 1, base + 2, normal);
        mesh.triangle(base, base + 2, base + 3, normal);
    }

    ArcPanel {
        outline,
        vertices: mesh.vertices,
        indices: mesh.indices,
        outer_radius,
        depth,
        start,
        end,
    }
}

#[derive(Default)]
struct MeshBuilder {
    vertices: Vec<PanelVertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    /// Push a triangle, flipping its winding to face `normal`
    fn triangle(&mut self, a: u32, b: u32, c: u32, normal: Vec3) {
        let pos = |i: u32| Vec3::from_array(self.vertices[i as usize].position);
        let facing = (pos(b) - pos(a)).cross(pos(c) - pos(a)).dot(normal);
        if facing < 0.0 {
            self.indices.extend_from_slice(&[a, c, b]);
        } else {
            self.indices.extend_from_slice(&[a, b, c]);
        }
    }
}

impl ArcPanel {
    /// Check if a point in the ring's local frame lies inside the solid
    pub fn contains_local(&self, point: Vec3) -> bool {
        if point.y < 0.0 || point.y > self.depth {
            return false;
        }
        let p = local_to_plane(point);
        if p.length() > self.outer_radius {
            return false;
        }
        let theta = normalize_angle(p.y.atan2(p.x));
        theta >= self.start && theta <= self.end
    }

    /// Triangle count of the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes for GPU upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn test_outline_starts_at_hub_and_traces_end_to_start() {
        let panel = build_arc_panel(10.0, 1.0, 0.0, FRAC_PI_2, 32);
        assert_eq!(panel.outline[0], Vec2::ZERO);
        let first = panel.outline[1];
        let last = *panel.outline.last().unwrap();
        assert!((first - Vec2::new(0.0, 10.0)).length() < 1e-4);
        assert!((last - Vec2::new(10.0, 0.0)).length() < 1e-4);
        // 32 points per turn over a quarter turn
        assert_eq!(panel.outline.len(), 1 + 8 + 1);
    }

    #[test]
    fn test_outline_scales_linearly_with_span() {
        let quarter = build_arc_panel(10.0, 1.0, 0.0, FRAC_PI_2, 64).outline.len() - 2;
        let half = build_arc_panel(10.0, 1.0, 1.0, 1.0 + PI, 64).outline.len() - 2;
        assert_eq!(half, quarter * 2);
        assert_eq!(arc_divisions(0.0, 0.001, 32), 1);
    }

    #[test]
    fn test_mesh_is_closed_solid() {
        let panel = build_arc_panel(10.0, 1.0, 0.3, 1.3, 32);
        let n = panel.outline.len();
        // two fans plus two triangles per wall
        assert_eq!(panel.triangle_count(), 2 * (n - 2) + 2 * n);
        assert!(panel.indices.iter().all(|&i| (i as usize) < panel.vertices.len()));
        let heights: Vec<f32> = panel.vertices.iter().map(|v| v.position[1]).collect();
        assert!(heights.iter().all(|&h| h == 0.0 || h == 1.0));
    }

    #[test]
    fn test_triangles_face_their_normals() {
        let panel = build_arc_panel(10.0, 2.0, 2.0, 4.5, 32);
        for tri in panel.indices.chunks(3) {
            let v = |i: u32| Vec3::from_array(panel.vertices[i as usize].position);
            let face = (v(tri[1]) - v(tri[0])).cross(v(tri[2]) - v(tri[0]));
            let normal = Vec3::from_array(panel.vertices[tri[0] as usize].normal);
            assert!(face.dot(normal) >= 0.0);
        }
    }

    #[test]
    fn test_walls_point_outward() {
        let panel = build_arc_panel(10.0, 1.0, 0.0, FRAC_PI_2, 32);
        let mid_dir = ring_direction(FRAC_PI_4, 0.0);
        // the outer wall facing the arc midpoint points away from the hub
        let best = panel
            .vertices
            .iter()
            .map(|v| Vec3::from_array(v.normal))
            .map(|n| n.dot(mid_dir))
            .fold(f32::MIN, f32::max);
        assert!(best > 0.95);
    }

    #[test]
    fn test_contains_local() {
        let panel = build_arc_panel(10.0, 1.0, 0.0, FRAC_PI_2, 32);
        let inside = plane_to_local(polar_to_cartesian(5.0, 0.7), 0.5);
        let outside_angle = plane_to_local(polar_to_cartesian(5.0, 2.0), 0.5);
        let outside_radius = plane_to_local(polar_to_cartesian(11.0, 0.7), 0.5);
        let above = plane_to_local(polar_to_cartesian(5.0, 0.7), 1.5);
        assert!(panel.contains_local(inside));
        assert!(!panel.contains_local(outside_angle));
        assert!(!panel.contains_local(outside_radius));
        assert!(!panel.contains_local(above));
    }

    #[test]
    fn test_rotation_frames_agree() {
        let rotation = 0.9;
        let theta = 0.4;
        let world = ring_direction(theta, rotation) * 5.0;
        let local = world_to_local(world, rotation);
        let (r, a) = crate::cartesian_to_polar(local_to_plane(local));
        assert!((r - 5.0).abs() < 1e-4);
        assert!((a - theta).abs() < 1e-4);
    }

    #[test]
    fn test_vertex_bytes_layout() {
        let panel = build_arc_panel(10.0, 1.0, 0.0, 1.0, 16);
        assert_eq!(panel.vertex_bytes().len(), panel.vertices.len() * 24);
    }
}
