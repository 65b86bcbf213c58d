//! Conversions between Bevy's glam types and the simulation's nalgebra types.

use bevy::prelude::*;
use nalgebra as na;
use sim::Ray;

pub fn point_to_vec3(p: &na::Point3<f32>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

pub fn vec3_to_point(v: Vec3) -> na::Point3<f32> {
    na::Point3::new(v.x, v.y, v.z)
}

pub fn vector_to_vec3(v: &na::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Rigid nalgebra pose as a unit-scale `Transform`.
pub fn isometry_to_transform(iso: &na::Isometry3<f32>) -> Transform {
    let q = iso.rotation.quaternion();
    Transform {
        translation: vector_to_vec3(&iso.translation.vector),
        rotation: Quat::from_xyzw(q.i, q.j, q.k, q.w),
        scale: Vec3::ONE,
    }
}

pub fn ray_from_bevy(ray: Ray3d) -> Ray {
    let dir = ray.direction.as_vec3();
    Ray::new(
        vec3_to_point(ray.origin),
        na::Vector3::new(dir.x, dir.y, dir.z),
    )
}
