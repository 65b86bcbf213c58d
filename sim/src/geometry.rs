//! Triangle geometry handed over by the model loader, and the naming helpers
//! used to classify it.

use nalgebra as na;
use rapier3d::parry::bounding_volume::{Aabb, BoundingVolume};

/// Triangle soup in a single coordinate frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshGeometry {
    pub positions: Vec<na::Point3<f32>>,
    pub indices: Vec<[u32; 3]>,
}

impl MeshGeometry {
    pub fn new(positions: Vec<na::Point3<f32>>, indices: Vec<[u32; 3]>) -> Self {
        Self { positions, indices }
    }

    /// Axis-aligned box with 12 triangles.
    pub fn cuboid(center: na::Point3<f32>, half_extents: na::Vector3<f32>) -> Self {
        let (hx, hy, hz) = (half_extents.x, half_extents.y, half_extents.z);
        let positions = [
            [-hx, -hy, -hz],
            [hx, -hy, -hz],
            [hx, hy, -hz],
            [-hx, hy, -hz],
            [-hx, -hy, hz],
            [hx, -hy, hz],
            [hx, hy, hz],
            [-hx, hy, hz],
        ]
        .into_iter()
        .map(|[x, y, z]| center + na::Vector3::new(x, y, z))
        .collect();

        let indices = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];

        Self { positions, indices }
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Bounds of all vertices. Invalid (mins > maxs) when empty.
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::new_invalid();
        for p in &self.positions {
            aabb.take_point(*p);
        }
        aabb
    }

    /// Appends `other`, re-basing its indices.
    pub fn append(&mut self, other: &MeshGeometry) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.indices
            .extend(other.indices.iter().map(|[a, b, c]| [a + base, b + base, c + base]));
    }

    pub fn translated(&self, offset: &na::Vector3<f32>) -> Self {
        Self {
            positions: self.positions.iter().map(|p| p + offset).collect(),
            indices: self.indices.clone(),
        }
    }

    /// Largest vertex distance from `center`.
    pub fn bounding_radius(&self, center: &na::Point3<f32>) -> f32 {
        self.positions
            .iter()
            .map(|p| na::distance(p, center))
            .fold(0.0, f32::max)
    }
}

/// Union of several bounds, skipping invalid ones.
pub fn merge_bounds<'a>(iter: impl IntoIterator<Item = &'a Aabb>) -> Aabb {
    iter.into_iter()
        .filter(|a| is_valid(a))
        .fold(Aabb::new_invalid(), |acc, a| {
            if is_valid(&acc) { acc.merged(a) } else { *a }
        })
}

#[inline]
pub fn is_valid(aabb: &Aabb) -> bool {
    aabb.mins.x <= aabb.maxs.x && aabb.mins.y <= aabb.maxs.y && aabb.mins.z <= aabb.maxs.z
}

/// `true` for name parts like `"1"` or `"12"`.
#[inline]
pub fn is_numeric(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// Node names split on `_`.
#[inline]
pub fn name_parts(name: &str) -> Vec<&str> {
    name.split('_').collect()
}

/// Numbered sub-meshes (`Car_Body_2`) share the key of their group (`Car_Body`).
pub fn group_key(name: &str) -> &str {
    match name.rsplit_once('_') {
        Some((head, tail)) if is_numeric(tail) => head,
        _ => name,
    }
}

/// Whether a node is the part that defines its group's placement: either an
/// unnumbered node or the `_1` part of a numbered group.
pub fn is_group_leader(name: &str) -> bool {
    match name.rsplit_once('_') {
        Some((_, tail)) if is_numeric(tail) => tail == "1",
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_bounds_match_extents() {
        let g = MeshGeometry::cuboid(na::Point3::new(1.0, 2.0, 3.0), na::Vector3::new(0.5, 0.25, 1.0));
        let b = g.bounds();
        assert_eq!(b.mins, na::Point3::new(0.5, 1.75, 2.0));
        assert_eq!(b.maxs, na::Point3::new(1.5, 2.25, 4.0));
        assert_eq!(g.indices.len(), 12);
    }

    #[test]
    fn append_rebases_indices() {
        let mut a = MeshGeometry::cuboid(na::Point3::origin(), na::Vector3::repeat(1.0));
        let b = MeshGeometry::cuboid(na::Point3::new(5.0, 0.0, 0.0), na::Vector3::repeat(1.0));
        a.append(&b);
        assert_eq!(a.positions.len(), 16);
        assert!(a.indices[12..].iter().all(|tri| tri.iter().all(|i| *i >= 8)));
        assert_eq!(a.bounds().maxs.x, 6.0);
    }

    #[test]
    fn merge_skips_invalid() {
        let a = MeshGeometry::cuboid(na::Point3::origin(), na::Vector3::repeat(1.0)).bounds();
        let merged = merge_bounds([&Aabb::new_invalid(), &a]);
        assert_eq!(merged, a);
        assert!(!is_valid(&merge_bounds([])));
    }

    #[test]
    fn numbered_parts_group_together() {
        assert_eq!(group_key("Car_Body_2"), "Car_Body");
        assert_eq!(group_key("Car_Body"), "Car_Body");
        assert_eq!(group_key("Radio_Box"), "Radio_Box");
        assert!(is_group_leader("Car_Body_1"));
        assert!(is_group_leader("Car_Body"));
        assert!(!is_group_leader("Car_Body_3"));
    }
}
