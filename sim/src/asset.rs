//! Output of the model loader: named mesh nodes with their geometry in model space.

use rapier3d::parry::bounding_volume::Aabb;

use crate::geometry::{MeshGeometry, group_key, is_group_leader};

/// Which loaded model a visual comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetSource {
    World,
    Vehicle,
}

/// Handle to one mesh node of a loaded model. The client resolves it to the
/// renderable primitives it loaded for that node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualRef {
    pub source: AssetSource,
    pub index: usize,
}

#[derive(Clone, Debug)]
pub struct AssetNode {
    pub name: String,
    /// Geometry with the node's global transform already applied.
    pub geometry: MeshGeometry,
}

#[derive(Clone, Debug)]
pub struct SceneAsset {
    pub source: AssetSource,
    /// Mesh nodes in traversal order.
    pub nodes: Vec<AssetNode>,
}

/// Nodes sharing a [`group_key`], in traversal order.
#[derive(Clone, Debug)]
pub struct NodeGroup<'a> {
    pub key: &'a str,
    /// The member whose name ends in `_1`, or the only member.
    pub leader: usize,
    pub members: Vec<usize>,
}

impl SceneAsset {
    pub fn new(source: AssetSource, nodes: Vec<AssetNode>) -> Self {
        Self { source, nodes }
    }

    pub fn visual(&self, index: usize) -> VisualRef {
        VisualRef {
            source: self.source,
            index,
        }
    }

    /// Groups numbered sub-meshes with their siblings.
    pub fn groups(&self) -> Vec<NodeGroup<'_>> {
        let mut groups: Vec<NodeGroup<'_>> = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            let key = group_key(&node.name);
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => {
                    if is_group_leader(&node.name) && !is_group_leader(&self.nodes[group.leader].name)
                    {
                        group.leader = index;
                    }
                    group.members.push(index);
                }
                None => groups.push(NodeGroup {
                    key,
                    leader: index,
                    members: vec![index],
                }),
            }
        }
        groups
    }

    /// Geometry of all `members`, merged.
    pub fn merged_geometry(&self, members: &[usize]) -> MeshGeometry {
        let mut merged = MeshGeometry::default();
        for index in members {
            merged.append(&self.nodes[*index].geometry);
        }
        merged
    }

    pub fn bounds(&self, index: usize) -> Aabb {
        self.nodes[index].geometry.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra as na;

    fn node(name: &str, x: f32) -> AssetNode {
        AssetNode {
            name: name.to_string(),
            geometry: MeshGeometry::cuboid(na::Point3::new(x, 0.0, 0.0), na::Vector3::repeat(0.1)),
        }
    }

    #[test]
    fn numbered_parts_group_under_their_leader() {
        let asset = SceneAsset::new(
            AssetSource::World,
            vec![
                node("Car_Body_2", 0.0),
                node("Lamp_None", 1.0),
                node("Car_Body_1", 2.0),
            ],
        );
        let groups = asset.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "Car_Body");
        assert_eq!(groups[0].leader, 2);
        assert_eq!(groups[0].members, vec![0, 2]);
        assert_eq!(groups[1].key, "Lamp_None");

        let merged = asset.merged_geometry(&groups[0].members);
        assert_eq!(merged.positions.len(), 16);
    }
}
