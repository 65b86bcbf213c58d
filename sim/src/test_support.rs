//! Box-geometry stand-ins for the vehicle and world models.

use nalgebra as na;

use crate::asset::{AssetNode, AssetSource, SceneAsset};
use crate::geometry::MeshGeometry;
use crate::roadkit::{TileDefinition, TileKind, TileSet, TileSetBuilder};
use crate::scene::{SceneGraph, SceneNode};

fn cuboid(name: &str, center: [f32; 3], half: [f32; 3]) -> AssetNode {
    AssetNode {
        name: name.to_string(),
        geometry: MeshGeometry::cuboid(center.into(), half.into()),
    }
}

fn vehicle_nodes() -> Vec<AssetNode> {
    vec![
        cuboid("Car_Body_1", [0.0, 0.15, 0.0], [0.1, 0.05, 0.2]),
        cuboid("Car_Body_2", [0.0, 0.22, 0.0], [0.08, 0.03, 0.1]),
        cuboid("L_Front_Wheel", [0.1, 0.06, 0.12], [0.02, 0.06, 0.06]),
        cuboid("R_Front_Wheel", [-0.1, 0.06, 0.12], [0.02, 0.06, 0.06]),
        cuboid("L_Back_Wheel", [0.1, 0.06, -0.12], [0.02, 0.06, 0.06]),
        cuboid("R_Back_Wheel", [-0.1, 0.06, -0.12], [0.02, 0.06, 0.06]),
        cuboid("Spoiler_None", [0.0, 0.26, -0.18], [0.09, 0.01, 0.02]),
    ]
}

/// A small car facing +z with its left side on +x.
pub fn vehicle_asset(reversed: bool) -> SceneAsset {
    let mut nodes = vehicle_nodes();
    if reversed {
        nodes.reverse();
    }
    SceneAsset::new(AssetSource::Vehicle, nodes)
}

pub fn vehicle_asset_without(prefix: &str) -> SceneAsset {
    let nodes = vehicle_nodes()
        .into_iter()
        .filter(|n| !n.name.starts_with(prefix))
        .collect();
    SceneAsset::new(AssetSource::Vehicle, nodes)
}

fn template_half_height(kind: TileKind) -> f32 {
    match kind {
        TileKind::Bridge => 0.05,
        _ => 0.01,
    }
}

/// Hidden templates for every tile kind, their origin at the bottom center.
pub fn tile_set(scene: &mut SceneGraph) -> TileSet {
    let mut builder = TileSetBuilder::new();
    for kind in TileKind::ALL {
        let half_height = template_half_height(kind);
        let geometry = MeshGeometry::cuboid(
            na::Point3::new(0.0, half_height, 0.0),
            na::Vector3::new(0.25, half_height, 0.25),
        );
        let node = SceneNode::new(
            format!("{}_RoadKit", kind.tag()),
            Vec::new(),
            &geometry,
            na::Vector3::zeros(),
        );
        let local_bounds = node.local_bounds;
        let template = scene.add(node);
        scene.set_visible(template, false);
        builder.insert(TileDefinition {
            kind,
            template,
            local_bounds,
            height: half_height * 2.0,
        });
    }
    builder.build()
}

fn world_nodes() -> Vec<AssetNode> {
    let mut nodes = vec![
        cuboid("Floor_None", [0.0, -0.05, 0.0], [5.0, 0.01, 5.0]),
        cuboid("CarStart", [0.5, 0.01, 0.5], [0.1, 0.01, 0.1]),
        cuboid("StartTile_RoadKit_1", [-1.0, 0.01, 1.0], [0.25, 0.01, 0.25]),
        cuboid("StartTile_RoadKit_2", [-1.0, 0.01, 1.0], [0.1, 0.01, 0.1]),
        cuboid("Toolbox_Box", [0.5, 0.1, 1.3], [0.1, 0.1, 0.1]),
        cuboid("Radio_Box", [3.0, 0.1, 3.0], [0.1, 0.1, 0.1]),
        cuboid("Remote_Box", [-3.0, 0.02, 3.0], [0.05, 0.02, 0.1]),
        cuboid("TVScreen_None", [-3.0, 0.5, -3.0], [0.02, 0.3, 0.5]),
        cuboid("Ramp_Box", [3.0, 0.05, -3.0], [0.3, 0.05, 0.2]),
        cuboid("Table_Box_1", [2.0, 0.3, 0.0], [0.2, 0.2, 0.2]),
        cuboid("Table_Box_2", [2.0, 0.52, 0.0], [0.3, 0.02, 0.3]),
        cuboid("Table_None", [-2.0, 0.3, 0.0], [0.2, 0.2, 0.2]),
        cuboid("Rug_None", [0.0, 0.001, -2.0], [0.5, 0.001, 0.5]),
        cuboid("Lamp_Hull_Shade", [-2.0, 0.4, 2.0], [0.1, 0.1, 0.1]),
        cuboid("Ball_Sphere", [2.5, 0.1, 1.5], [0.1, 0.1, 0.1]),
        cuboid("Vase_Cylinder", [-2.5, 0.15, -1.5], [0.05, 0.15, 0.05]),
    ];

    for (i, kind) in TileKind::ALL.into_iter().enumerate() {
        let half_height = template_half_height(kind);
        let center = [6.0 + i as f32, half_height, 6.0];
        if kind == TileKind::Intersection {
            nodes.push(cuboid("Intersection_RoadKit_1", center, [0.25, half_height, 0.25]));
            nodes.push(cuboid("Intersection_RoadKit_2", center, [0.1, half_height, 0.1]));
        } else {
            nodes.push(cuboid(
                &format!("{}_RoadKit", kind.tag()),
                center,
                [0.25, half_height, 0.25],
            ));
        }
    }
    nodes
}

/// A living room with every required object, a full tile set and the car
/// starting next to the toolbox.
pub fn world_asset() -> SceneAsset {
    SceneAsset::new(AssetSource::World, world_nodes())
}

pub fn world_asset_without(prefix: &str) -> SceneAsset {
    let nodes = world_nodes()
        .into_iter()
        .filter(|n| !n.name.starts_with(prefix))
        .collect();
    SceneAsset::new(AssetSource::World, nodes)
}
