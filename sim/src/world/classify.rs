//! Sorts the nodes of a world model by name.
//!
//! - `CarStart`: where the vehicle spawns.
//! - `<Kind>_RoadKit[_n]`: a tile template; `StartTile_RoadKit_1` marks the grid origin.
//! - `<Tag>_<Shape>[_<Sub>][_n]`: a prop whose collider is `<Shape>`
//!   (Box, Sphere, Hull, Cylinder, Mesh). `None`, a number or anything else means
//!   decoration only.

use nalgebra as na;
use rapier3d::prelude::RigidBodyHandle;

use crate::asset::{NodeGroup, SceneAsset};
use crate::geometry::{is_numeric, name_parts};
use crate::physics::ShapeKind;
use crate::roadkit::{TileDefinition, TileKind, TileSet, TileSetBuilder};
use crate::scene::{NodeId, SceneGraph, SceneNode};

pub const CAR_START: &str = "CarStart";
pub const GRID_START_TAG: &str = "StartTile";

/// A placed prop or decoration.
#[derive(Clone, Debug)]
pub struct WorldObject {
    pub tag: String,
    pub shape: Option<ShapeKind>,
    /// Bounds center in world space; also the node and body origin.
    pub position: na::Point3<f32>,
    pub node: NodeId,
    pub body: Option<RigidBodyHandle>,
}

/// Props by tag, in model order.
#[derive(Clone, Debug, Default)]
pub struct ObjectTable {
    objects: Vec<WorldObject>,
}

impl ObjectTable {
    pub fn get(&self, tag: &str) -> Option<&WorldObject> {
        self.objects.iter().find(|o| o.tag == tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WorldObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn push(&mut self, object: WorldObject) {
        self.objects.push(object);
    }
}

/// Tag and collider requested by a prop node name.
pub fn object_name(name: &str) -> (String, Option<ShapeKind>) {
    let parts = name_parts(name);
    let tag = match parts.as_slice() {
        [first, _, third, ..] if !is_numeric(third) => format!("{first}_{third}"),
        [first, ..] => first.to_string(),
        [] => name.to_string(),
    };
    let shape = parts
        .get(1)
        .filter(|p| !is_numeric(p) && **p != "None")
        .and_then(|p| {
            let kind = ShapeKind::from_suffix(p);
            if kind.is_none() {
                log::debug!("`{name}`: unknown collider `{p}`, treated as decoration");
            }
            kind
        });
    (tag, shape)
}

pub struct ClassifiedWorld {
    pub car_start: Option<na::Point3<f32>>,
    pub grid_origin: Option<na::Point3<f32>>,
    pub tiles: TileSet,
    pub objects: ObjectTable,
}

/// Adds one node per prop and a hidden template per tile kind to `scene`.
pub fn classify(asset: &SceneAsset, scene: &mut SceneGraph) -> ClassifiedWorld {
    let mut car_start = None;
    let mut grid_origin = None;
    let mut tiles = TileSetBuilder::new();
    let mut objects = ObjectTable::default();

    for group in asset.groups() {
        let parts = name_parts(group.key);

        if group.key == CAR_START {
            car_start = Some(asset.merged_geometry(&group.members).bounds().center());
        } else if parts.get(1) == Some(&"RoadKit") {
            if parts[0] == GRID_START_TAG {
                grid_origin = Some(asset.merged_geometry(&group.members).bounds().center());
            } else {
                add_template(asset, &group, parts[0], &mut tiles, scene);
            }
        } else {
            add_object(asset, &group, &mut objects, scene);
        }
    }

    log::debug!(
        "world model: {} objects, {} tile templates",
        objects.len(),
        TileKind::ALL.iter().filter(|k| tiles.contains(**k)).count()
    );

    ClassifiedWorld {
        car_start,
        grid_origin,
        tiles: tiles.build(),
        objects,
    }
}

fn add_template(
    asset: &SceneAsset,
    group: &NodeGroup<'_>,
    tag: &str,
    tiles: &mut TileSetBuilder,
    scene: &mut SceneGraph,
) {
    let Some(kind) = TileKind::from_tag(tag) else {
        log::warn!("`{}` is not a known road-kit tile", group.key);
        return;
    };
    if tiles.contains(kind) {
        return;
    }

    let geometry = asset.merged_geometry(&group.members);
    let bounds = geometry.bounds();
    let center = bounds.center();
    let height = bounds.maxs.y - bounds.mins.y;

    // Template origin sits at the bottom center of the tile.
    let pivot = na::Vector3::new(-center.x, -center.y + height / 2.0, -center.z);
    let node = SceneNode::new(
        group.key,
        group.members.iter().map(|i| asset.visual(*i)).collect(),
        &geometry,
        pivot,
    );
    let local_bounds = node.local_bounds;
    let template = scene.add(node);
    scene.set_visible(template, false);
    scene.set_transform(template, na::Isometry3::identity());

    tiles.insert(TileDefinition {
        kind,
        template,
        local_bounds,
        height,
    });
}

fn add_object(
    asset: &SceneAsset,
    group: &NodeGroup<'_>,
    objects: &mut ObjectTable,
    scene: &mut SceneGraph,
) {
    let (tag, shape) = object_name(&asset.nodes[group.leader].name);
    if objects.contains(&tag) {
        log::debug!("`{}` repeats tag `{tag}`, skipped", group.key);
        return;
    }

    let geometry = asset.merged_geometry(&group.members);
    let position = geometry.bounds().center();
    let node = scene.add(SceneNode::new(
        group.key,
        group.members.iter().map(|i| asset.visual(*i)).collect(),
        &geometry,
        -position.coords,
    ));

    objects.push(WorldObject {
        tag,
        shape,
        position,
        node,
        body: None,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::world_asset;

    #[test]
    fn tags_combine_first_and_third_parts() {
        assert_eq!(object_name("Radio_Box"), ("Radio".to_string(), Some(ShapeKind::Box)));
        assert_eq!(object_name("Table_Box_2"), ("Table".to_string(), Some(ShapeKind::Box)));
        assert_eq!(
            object_name("Lamp_Hull_Shade"),
            ("Lamp_Shade".to_string(), Some(ShapeKind::Hull))
        );
        assert_eq!(object_name("Rug_None"), ("Rug".to_string(), None));
        assert_eq!(object_name("Books_3"), ("Books".to_string(), None));
        assert_eq!(object_name("Plant_Glass"), ("Plant".to_string(), None));
        assert_eq!(object_name("Sofa"), ("Sofa".to_string(), None));
    }

    #[test]
    fn world_model_is_split_by_role() {
        let mut scene = SceneGraph::new();
        let world = classify(&world_asset(), &mut scene);

        let car_start = world.car_start.unwrap();
        let grid_origin = world.grid_origin.unwrap();
        assert!((car_start - na::Point3::new(0.5, 0.01, 0.5)).norm() < 1.0e-6);
        assert!((grid_origin - na::Point3::new(-1.0, 0.01, 1.0)).norm() < 1.0e-6);
        for kind in TileKind::ALL {
            let def = world.tiles.get(kind).unwrap();
            assert!(!scene.is_visible(def.template));
            assert!(def.local_bounds.mins.y.abs() < 1.0e-6);
        }

        let radio = world.objects.get("Radio").unwrap();
        assert_eq!(radio.shape, Some(ShapeKind::Box));
        let bounds = scene.world_bounds(radio.node).unwrap();
        assert!((bounds.center() - radio.position).norm() < 1.0e-6);
        assert_eq!(world.objects.get("Rug").unwrap().shape, None);
        assert!(!world.objects.contains("CarStart"));
    }

    #[test]
    fn repeated_tags_keep_the_first_object() {
        let mut scene = SceneGraph::new();
        let world = classify(&world_asset(), &mut scene);
        let tables: Vec<_> = world.objects.iter().filter(|o| o.tag == "Table").collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].shape, Some(ShapeKind::Box));
    }
}
