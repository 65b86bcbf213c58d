use nalgebra as na;

use super::WorldError;
use super::classify::ObjectTable;
use crate::asset::SceneAsset;
use crate::geometry::MeshGeometry;
use crate::physics::{ColliderShapeDef, PhysicsWorld, Surface};
use crate::scene::SceneGraph;

/// Gives every prop with a collider suffix a fixed body at its bounds center.
pub fn add_prop_bodies(
    asset: &SceneAsset,
    objects: &mut ObjectTable,
    scene: &SceneGraph,
    physics: &mut PhysicsWorld,
) -> Result<usize, WorldError> {
    let mut count = 0;
    for object in objects.iter_mut() {
        let Some(kind) = object.shape else {
            continue;
        };
        let Some(node) = scene.get(object.node) else {
            continue;
        };

        let geometry = node_geometry(asset, node.visuals.iter().map(|v| v.index), &object.position);
        let def = ColliderShapeDef::fit(kind, &geometry).map_err(|source| WorldError::Collider {
            tag: object.tag.clone(),
            source,
        })?;
        let pose = na::Isometry3::translation(object.position.x, object.position.y, object.position.z);
        let body = physics
            .add_fixed_body(pose, &def, Surface::Ground)
            .map_err(|source| WorldError::Collider {
                tag: object.tag.clone(),
                source,
            })?;

        object.body = Some(body);
        count += 1;
    }
    Ok(count)
}

/// Prop geometry relative to its body origin.
fn node_geometry(
    asset: &SceneAsset,
    members: impl Iterator<Item = usize>,
    origin: &na::Point3<f32>,
) -> MeshGeometry {
    let members: Vec<usize> = members.collect();
    asset.merged_geometry(&members).translated(&-origin.coords)
}
