//! The environment the vehicle drives through: props, road-kit grid, interaction
//! zones and the per-world behavior behind them.

pub mod classify;
pub mod living_room;
pub mod props;
pub mod radio;
pub mod tv;
pub mod zones;

pub use classify::{ObjectTable, WorldObject};
pub use living_room::LivingRoom;
pub use radio::Radio;
pub use tv::Tv;
pub use zones::InteractionZone;

use nalgebra as na;
use rapier3d::parry::bounding_volume::Aabb;
use thiserror::Error;

use crate::asset::SceneAsset;
use crate::audio::AudioMixer;
use crate::constants::{GRID_COLS, GRID_ROWS, TILE_SIZE};
use crate::input::Key;
use crate::physics::{PhysicsWorld, ShapeError};
use crate::roadkit::{Grid, GridEditor, TileKind, layout};
use crate::scene::SceneGraph;
use crate::vehicle::Vehicle;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("world model has no `StartTile_RoadKit_1` marker")]
    MissingGridOrigin,
    #[error("world model has no `{0}` object")]
    MissingObject(&'static str),
    #[error("collider for `{tag}`: {source}")]
    Collider {
        tag: String,
        #[source]
        source: ShapeError,
    },
    #[error("road-kit tile: {0}")]
    Tile(#[from] ShapeError),
}

/// Selectable environments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WorldKind {
    #[default]
    LivingRoom,
}

impl WorldKind {
    pub const ALL: [WorldKind; 1] = [WorldKind::LivingRoom];

    pub const fn label(self) -> &'static str {
        match self {
            WorldKind::LivingRoom => "Living room",
        }
    }

    pub const fn model_path(self) -> &'static str {
        match self {
            WorldKind::LivingRoom => "models/environments/living-room/room.glb",
        }
    }

    fn variant(self) -> Box<dyn WorldVariant> {
        match self {
            WorldKind::LivingRoom => Box::new(LivingRoom::new()),
        }
    }
}

/// Behavior that differs between worlds. Every hook has a do-nothing default.
pub trait WorldVariant: Send + Sync {
    /// Tiles placed on the grid when the world loads.
    fn layout(&self) -> &'static [(usize, usize, TileKind, f32)] {
        &[]
    }

    /// Extra transforms for a prop after its body exists.
    fn apply_customizations(
        &self,
        _object: &WorldObject,
        _scene: &mut SceneGraph,
        _physics: &mut PhysicsWorld,
    ) {
    }

    /// Builds interaction zones around the loaded props.
    fn assign_interactables(
        &mut self,
        _objects: &ObjectTable,
        _scene: &SceneGraph,
    ) -> Result<(), WorldError> {
        Ok(())
    }

    /// Runs once the vehicle exists.
    fn on_ready(
        &mut self,
        _objects: &ObjectTable,
        _scene: &mut SceneGraph,
        _mixer: &mut AudioMixer,
    ) -> Result<(), WorldError> {
        Ok(())
    }

    /// World sound assets finished loading.
    fn on_audio_loaded(&mut self, _mixer: &mut AudioMixer) {}

    /// Re-evaluates zones against the chassis bounds.
    fn interactions_tick(&mut self, _chassis: Option<&Aabb>, _editing: bool) {}

    fn zones(&self) -> &[InteractionZone] {
        &[]
    }

    /// Key press outside the editor.
    fn on_key(
        &mut self,
        _key: Key,
        _editor: &mut GridEditor,
        _scene: &mut SceneGraph,
        _mixer: &mut AudioMixer,
    ) {
    }

    fn update(&mut self, _listener: &na::Point3<f32>, _mixer: &mut AudioMixer) {}
}

pub struct World {
    kind: WorldKind,
    variant: Box<dyn WorldVariant>,
    objects: ObjectTable,
    car_start: na::Point3<f32>,
    editor: GridEditor,
    started: bool,
}

impl World {
    /// Classifies the world model, builds prop bodies and lays out the road kit.
    pub fn load(
        kind: WorldKind,
        asset: &SceneAsset,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
    ) -> Result<Self, WorldError> {
        let mut variant = kind.variant();
        let classified = classify::classify(asset, scene);
        let mut objects = classified.objects;

        props::add_prop_bodies(asset, &mut objects, scene, physics)?;
        for object in objects.iter() {
            variant.apply_customizations(object, scene, physics);
        }

        let origin = classified
            .grid_origin
            .ok_or(WorldError::MissingGridOrigin)?;
        let mut grid = Grid::new(GRID_ROWS, GRID_COLS, TILE_SIZE, origin);
        layout::populate(
            &mut grid,
            &classified.tiles,
            variant.layout(),
            scene,
            physics,
        )?;

        variant.assign_interactables(&objects, scene)?;

        let car_start = classified.car_start.unwrap_or_else(|| {
            log::warn!("world model has no `CarStart` marker, spawning at the origin");
            na::Point3::origin()
        });

        log::info!("{} loaded with {} objects", kind.label(), objects.len());

        Ok(Self {
            kind,
            variant,
            objects,
            car_start,
            editor: GridEditor::new(grid, classified.tiles),
            started: false,
        })
    }

    pub fn kind(&self) -> WorldKind {
        self.kind
    }

    pub fn car_start(&self) -> na::Point3<f32> {
        self.car_start
    }

    pub fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    pub fn editor(&self) -> &GridEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut GridEditor {
        &mut self.editor
    }

    pub fn variant(&self) -> &dyn WorldVariant {
        self.variant.as_ref()
    }

    /// Wires up world objects that need the vehicle. Runs once.
    pub fn start(&mut self, scene: &mut SceneGraph, mixer: &mut AudioMixer) -> Result<(), WorldError> {
        if self.started {
            return Ok(());
        }
        self.variant.on_ready(&self.objects, scene, mixer)?;
        self.started = true;
        Ok(())
    }

    pub fn audio_loaded(&mut self, mixer: &mut AudioMixer) {
        self.variant.on_audio_loaded(mixer);
    }

    /// Zones whose prompt is showing.
    pub fn prompts(&self) -> impl Iterator<Item = &InteractionZone> {
        self.variant.zones().iter().filter(|z| z.is_shown())
    }

    /// Per-tick update after the vehicle.
    pub fn update(
        &mut self,
        vehicle: &mut Vehicle,
        listener: &na::Point3<f32>,
        scene: &SceneGraph,
        mixer: &mut AudioMixer,
    ) {
        let editing = self.editor.is_open();
        if editing {
            vehicle.stop_driving();
        } else {
            vehicle.resume_driving();
        }

        let chassis = scene.world_bounds(vehicle.chassis_node());
        self.variant.interactions_tick(chassis.as_ref(), editing);
        self.variant.update(listener, mixer);
    }

    /// Key press routed to the editor while it is open, otherwise to the world.
    pub fn on_key_down(
        &mut self,
        key: Key,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
        mixer: &mut AudioMixer,
    ) {
        if self.editor.is_open() {
            self.editor.on_key(key, scene, physics);
        } else {
            self.variant.on_key(key, &mut self.editor, scene, mixer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{world_asset, world_asset_without};

    #[test]
    fn living_room_loads_with_its_track() {
        let mut scene = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        let world = World::load(WorldKind::LivingRoom, &world_asset(), &mut scene, &mut physics)
            .unwrap();

        assert_eq!(world.editor().grid().occupied(), layout::DEFAULT_LAYOUT.len());
        assert_eq!(world.variant().zones().len(), 3);
        assert!((world.car_start() - na::Point3::new(0.5, 0.01, 0.5)).norm() < 1.0e-6);
        assert_eq!(world.prompts().count(), 0);
    }

    #[test]
    fn ramp_is_rolled_with_its_body() {
        let mut scene = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        let world = World::load(WorldKind::LivingRoom, &world_asset(), &mut scene, &mut physics)
            .unwrap();

        let ramp = world.objects().get("Ramp").unwrap();
        let node = scene.world_transform(ramp.node).unwrap();
        let body = physics.body_pose(ramp.body.unwrap()).unwrap();
        assert!((node.rotation.angle() - 16.0_f32.to_radians()).abs() < 1.0e-5);
        assert!(node.rotation.angle_to(&body.rotation) < 1.0e-5);
    }

    #[test]
    fn missing_markers_fail_the_load() {
        let mut scene = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        assert!(matches!(
            World::load(
                WorldKind::LivingRoom,
                &world_asset_without("StartTile"),
                &mut scene,
                &mut physics
            ),
            Err(WorldError::MissingGridOrigin)
        ));
        assert!(matches!(
            World::load(
                WorldKind::LivingRoom,
                &world_asset_without("Remote"),
                &mut scene,
                &mut physics
            ),
            Err(WorldError::MissingObject("Remote"))
        ));
    }
}
