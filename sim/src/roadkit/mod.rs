//! Road-kit tiles laid out on a fixed grid, and the editor that rearranges them.

pub mod editor;
pub mod grid;
pub mod layout;

pub use editor::{CursorHint, GridEditor, Selection};
pub use grid::{CellCoord, Grid, GridCell, Placement};

use nalgebra as na;
use rapier3d::parry::bounding_volume::Aabb;
use rapier3d::prelude::RigidBodyHandle;

use crate::constants::{
    BRIDGE_DECK_DROP, BRIDGE_HALF_THICKNESS, SLANT_PITCH_DEG, SLANT_Y_OFFSET, TILE_SIZE,
};
use crate::physics::{ColliderShapeDef, PhysicsWorld, ShapeError, Surface};
use crate::scene::{NodeId, SceneGraph};

/// Tile types offered by the palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TileKind {
    BendSidewalk,
    BendSquare,
    Bridge,
    Crossroad,
    End,
    Intersection,
    SlantHigh,
    Single,
}

impl TileKind {
    pub const ALL: [TileKind; 8] = [
        TileKind::BendSidewalk,
        TileKind::BendSquare,
        TileKind::Bridge,
        TileKind::Crossroad,
        TileKind::End,
        TileKind::Intersection,
        TileKind::SlantHigh,
        TileKind::Single,
    ];

    /// Kind named by the first part of a `<Kind>_RoadKit[_n]` node.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            TileKind::BendSidewalk => "BendSidewalk",
            TileKind::BendSquare => "BendSquare",
            TileKind::Bridge => "Bridge",
            TileKind::Crossroad => "Crossroad",
            TileKind::End => "End",
            TileKind::Intersection => "Intersection",
            TileKind::SlantHigh => "SlantHigh",
            TileKind::Single => "Single",
        }
    }

    /// Palette button text.
    pub fn label(self) -> &'static str {
        match self {
            TileKind::BendSidewalk => "Bend Piece",
            TileKind::BendSquare => "Turn Piece",
            TileKind::Bridge => "Bridge Piece",
            TileKind::Crossroad => "Crossroad Piece",
            TileKind::End => "End Piece",
            TileKind::Intersection => "Intersection Piece",
            TileKind::SlantHigh => "Slant Piece",
            TileKind::Single => "Single Piece",
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Vertical correction for tiles whose visual sits above the cell.
    pub fn y_offset(self) -> f32 {
        match self {
            TileKind::SlantHigh => SLANT_Y_OFFSET,
            _ => 0.0,
        }
    }

    /// Only bridges and slants are driveable above the floor.
    pub fn has_body(self) -> bool {
        matches!(self, TileKind::Bridge | TileKind::SlantHigh)
    }
}

/// Hidden template a tile instance is cloned from.
#[derive(Clone, Debug)]
pub struct TileDefinition {
    pub kind: TileKind,
    pub template: NodeId,
    /// Template bounds in node space; the node origin sits at the bottom center.
    pub local_bounds: Aabb,
    /// Bounding height of the template.
    pub height: f32,
}

/// Collects tile templates while the world model is classified.
#[derive(Debug, Default)]
pub struct TileSetBuilder {
    definitions: [Option<TileDefinition>; 8],
}

impl TileSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a template. The first template of each kind wins.
    pub fn insert(&mut self, definition: TileDefinition) -> bool {
        let slot = &mut self.definitions[definition.kind.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(definition);
        true
    }

    pub fn contains(&self, kind: TileKind) -> bool {
        self.definitions[kind.index()].is_some()
    }

    pub fn build(self) -> TileSet {
        for kind in TileKind::ALL {
            if !self.contains(kind) {
                log::warn!("no template for {kind:?} tiles");
            }
        }
        TileSet {
            definitions: self.definitions,
        }
    }
}

/// Immutable tile templates, fixed before the grid is built.
#[derive(Clone, Debug)]
pub struct TileSet {
    definitions: [Option<TileDefinition>; 8],
}

impl TileSet {
    pub fn get(&self, kind: TileKind) -> Option<&TileDefinition> {
        self.definitions[kind.index()].as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileDefinition> {
        self.definitions.iter().flatten()
    }
}

/// Yaw about +Y.
#[inline]
pub fn yaw(angle: f32) -> na::UnitQuaternion<f32> {
    na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), angle)
}

/// Orientation of a tile: slants are pitched first, then yawed.
pub fn tile_rotation(kind: TileKind, rotation: f32) -> na::UnitQuaternion<f32> {
    match kind {
        TileKind::SlantHigh => {
            let pitch = na::UnitQuaternion::from_axis_angle(
                &na::Vector3::x_axis(),
                SLANT_PITCH_DEG.to_radians(),
            );
            yaw(rotation) * pitch
        }
        _ => yaw(rotation),
    }
}

fn tile_body(
    definition: &TileDefinition,
    cell: &na::Point3<f32>,
    rotation: f32,
    physics: &mut PhysicsWorld,
) -> Result<Option<RigidBodyHandle>, ShapeError> {
    let (y, def) = match definition.kind {
        TileKind::Bridge => (
            definition.height - BRIDGE_DECK_DROP,
            ColliderShapeDef::cuboid(na::Vector3::new(
                TILE_SIZE / 2.0,
                BRIDGE_HALF_THICKNESS,
                TILE_SIZE / 2.0,
            )),
        ),
        TileKind::SlantHigh => (
            cell.y + definition.kind.y_offset(),
            ColliderShapeDef::cuboid(definition.local_bounds.half_extents()),
        ),
        _ => return Ok(None),
    };

    let pose = na::Isometry3::from_parts(
        na::Translation3::new(cell.x, y, cell.z),
        tile_rotation(definition.kind, rotation),
    );
    physics
        .add_fixed_body(pose, &def, Surface::Ground)
        .map(Some)
}

/// Instantiates a tile over `cell`: a visible clone of the template plus the
/// collider its kind needs.
pub fn spawn_tile(
    definition: &TileDefinition,
    cell: &na::Point3<f32>,
    rotation: f32,
    scene: &mut SceneGraph,
    physics: &mut PhysicsWorld,
) -> Result<Option<Placement>, ShapeError> {
    let Some(mesh) = scene.clone_node(definition.template) else {
        return Ok(None);
    };
    scene.set_visible(mesh, true);
    scene.set_transform(
        mesh,
        na::Isometry3::from_parts(
            na::Translation3::new(cell.x, cell.y + definition.kind.y_offset(), cell.z),
            tile_rotation(definition.kind, rotation),
        ),
    );

    let body = match tile_body(definition, cell, rotation, physics) {
        Ok(body) => body,
        Err(e) => {
            scene.remove(mesh);
            return Err(e);
        }
    };

    Ok(Some(Placement {
        tile: definition.kind,
        mesh,
        body,
        rotation,
    }))
}

/// Removes a tile's node and body.
pub fn destroy_tile(placement: &Placement, scene: &mut SceneGraph, physics: &mut PhysicsWorld) {
    scene.remove(placement.mesh);
    if let Some(body) = placement.body {
        physics.remove_body(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::tile_set;

    #[test]
    fn tags_round_trip_through_kinds() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(TileKind::from_tag("StartTile"), None);
    }

    #[test]
    fn first_template_of_a_kind_wins() {
        let mut scene = SceneGraph::new();
        let tiles = tile_set(&mut scene);
        let single = tiles.get(TileKind::Single).unwrap().clone();

        let mut builder = TileSetBuilder::new();
        assert!(builder.insert(single.clone()));
        assert!(!builder.insert(TileDefinition {
            height: 9.0,
            ..single
        }));
        let frozen = builder.build();
        assert_eq!(frozen.get(TileKind::Single).unwrap().height, 0.02);
        assert!(frozen.get(TileKind::Bridge).is_none());
    }

    #[test]
    fn bridge_deck_sits_below_the_template_top() {
        let mut scene = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        let tiles = tile_set(&mut scene);
        let bridge = tiles.get(TileKind::Bridge).unwrap();

        let placement = spawn_tile(
            bridge,
            &na::Point3::new(0.5, -0.032, -0.5),
            0.0,
            &mut scene,
            &mut physics,
        )
        .unwrap()
        .unwrap();

        let pose = physics.body_pose(placement.body.unwrap()).unwrap();
        assert!((pose.translation.y - (bridge.height - BRIDGE_DECK_DROP)).abs() < 1.0e-6);
        assert!(scene.is_visible(placement.mesh));
    }

    #[test]
    fn flat_tiles_have_no_body() {
        let mut scene = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        let tiles = tile_set(&mut scene);
        let placement = spawn_tile(
            tiles.get(TileKind::End).unwrap(),
            &na::Point3::origin(),
            0.0,
            &mut scene,
            &mut physics,
        )
        .unwrap()
        .unwrap();
        assert!(placement.body.is_none());
    }
}
