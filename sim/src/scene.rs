//! Retained scene graph mirrored by the client's render entities.
//!
//! Each node draws its visuals offset by `pivot` and then placed by its world
//! transform, so a node's origin can sit anywhere relative to the model-space
//! geometry it was cut from.

use std::sync::Arc;

use nalgebra as na;
use rapier3d::parry::bounding_volume::Aabb;
use rapier3d::parry::query::{Ray, RayCast};
use rapier3d::parry::shape::TriMesh;

use crate::asset::VisualRef;
use crate::geometry::{MeshGeometry, is_valid, merge_bounds};

/// Slot index plus the generation the slot had when the node was added.
/// A removed node's id never matches whatever later reuses its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

/// Material overlay requested for a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tint {
    /// Emissive red highlight for hovered and selected road tiles.
    Hover,
    /// TV screen while the TV is on.
    Screen,
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub visuals: Vec<VisualRef>,
    /// Offset applied to the model-space visuals before `transform`.
    pub pivot: na::Vector3<f32>,
    /// Transform relative to the parent, or to the world for roots.
    pub transform: na::Isometry3<f32>,
    pub parent: Option<NodeId>,
    pub visible: bool,
    pub tint: Option<Tint>,
    /// Bounds of the pivoted geometry in node space.
    pub local_bounds: Aabb,
    hit_mesh: Option<Arc<TriMesh>>,
}

impl SceneNode {
    /// Node whose origin sits at `-pivot` in model space.
    ///
    /// `geometry` is the model-space geometry of all visuals, used for bounds and
    /// picking.
    pub fn new(
        name: impl Into<String>,
        visuals: Vec<VisualRef>,
        geometry: &MeshGeometry,
        pivot: na::Vector3<f32>,
    ) -> Self {
        let local = geometry.translated(&pivot);
        let hit_mesh = if local.is_empty() {
            None
        } else {
            TriMesh::new(local.positions.clone(), local.indices.clone())
                .ok()
                .map(Arc::new)
        };

        Self {
            name: name.into(),
            visuals,
            pivot,
            transform: na::Isometry3::translation(-pivot.x, -pivot.y, -pivot.z),
            parent: None,
            visible: true,
            tint: None,
            local_bounds: local.bounds(),
            hit_mesh,
        }
    }

    /// Name parts split on `_`.
    pub fn name_part(&self, index: usize) -> Option<&str> {
        self.name.split('_').nth(index)
    }
}

/// Nearest pick result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub point: na::Point3<f32>,
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Slot>,
    /// Emptied slots, reused before the arena grows.
    free: Vec<u32>,
    /// Bumped whenever a node is added or removed.
    revision: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn add(&mut self, node: SceneNode) -> NodeId {
        self.revision += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.nodes[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.nodes.len() as u32;
        self.nodes.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let id = NodeId {
                    index: i as u32,
                    generation: slot.generation,
                };
                slot.node.as_ref().map(|n| (id, n))
            })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds the first live node called `name`.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.iter().find(|(_, n)| n.name == name).map(|(id, _)| id)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.iter()
            .filter(move |(_, n)| n.parent == Some(id))
            .map(|(child, _)| child)
    }

    /// Copies a node (not its children) as a new root with the same world transform.
    pub fn clone_node(&mut self, id: NodeId) -> Option<NodeId> {
        let transform = self.world_transform(id)?;
        let mut copy = self.get(id)?.clone();
        copy.parent = None;
        copy.transform = transform;
        Some(self.add(copy))
    }

    /// Removes a node and its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let children: Vec<_> = self.children(id).collect();
        for child in children {
            self.remove(child);
        }
        let slot = self
            .nodes
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)?;
        let removed = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.revision += 1;
        Some(removed)
    }

    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.get_mut(id) {
            node.parent = parent;
        }
    }

    pub fn set_transform(&mut self, id: NodeId, transform: na::Isometry3<f32>) {
        if let Some(node) = self.get_mut(id) {
            node.transform = transform;
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.get_mut(id) {
            node.visible = visible;
        }
    }

    pub fn set_tint(&mut self, id: NodeId, tint: Option<Tint>) {
        if let Some(node) = self.get_mut(id) {
            node.tint = tint;
        }
    }

    pub fn world_transform(&self, id: NodeId) -> Option<na::Isometry3<f32>> {
        let node = self.get(id)?;
        match node.parent {
            Some(parent) => Some(self.world_transform(parent)? * node.transform),
            None => Some(node.transform),
        }
    }

    /// World-space bounds of a node and all its descendants.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        let node = self.get(id)?;
        let world = self.world_transform(id)?;
        let own = if is_valid(&node.local_bounds) {
            node.local_bounds.transform_by(&world)
        } else {
            Aabb::new_invalid()
        };

        let children: Vec<Aabb> = self
            .children(id)
            .filter_map(|child| self.world_bounds(child))
            .collect();
        Some(merge_bounds(std::iter::once(&own).chain(children.iter())))
    }

    /// Whether a node and all of its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        match self.get(id) {
            Some(node) if node.visible => node.parent.is_none_or(|p| self.is_visible(p)),
            _ => false,
        }
    }

    /// Nearest visible node hit by `ray` (world space).
    pub fn pick(&self, ray: &Ray) -> Option<PickHit> {
        let mut best: Option<(f32, NodeId)> = None;

        for (id, node) in self.iter() {
            let Some(mesh) = &node.hit_mesh else {
                continue;
            };
            if !self.is_visible(id) {
                continue;
            }
            let Some(world) = self.world_transform(id) else {
                continue;
            };

            let local_ray = ray.inverse_transform_by(&world);
            let max_toi = best.map_or(f32::MAX, |(toi, _)| toi);
            if let Some(toi) = mesh.cast_local_ray(&local_ray, max_toi, true) {
                if best.is_none_or(|(b, _)| toi < b) {
                    best = Some((toi, id));
                }
            }
        }

        best.map(|(toi, node)| PickHit {
            node,
            point: ray.point_at(toi),
        })
    }
}
