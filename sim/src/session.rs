//! One play session: the world, the vehicle and everything they share.

use std::time::Duration;

use nalgebra as na;
use rapier3d::parry::query::Ray;
use thiserror::Error;

use crate::asset::SceneAsset;
use crate::audio::AudioMixer;
use crate::input::{InputState, Key};
use crate::physics::PhysicsWorld;
use crate::roadkit::{CursorHint, TileKind};
use crate::scene::{PickHit, SceneGraph};
use crate::sim_loop::FixedStepClock;
use crate::vehicle::{Vehicle, VehicleError, VehicleKind};
use crate::world::{World, WorldError, WorldKind};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("world: {0}")]
    World(#[from] WorldError),
    #[error("vehicle: {0}")]
    Vehicle(#[from] VehicleError),
}

/// Owns exactly one world and one vehicle.
///
/// Built once both models have loaded; everything the loop touches lives here.
pub struct Session {
    clock: FixedStepClock,
    physics: PhysicsWorld,
    scene: SceneGraph,
    input: InputState,
    mixer: AudioMixer,
    world: World,
    vehicle: Vehicle,
}

impl Session {
    pub fn new(
        world_kind: WorldKind,
        world_asset: &SceneAsset,
        vehicle_kind: VehicleKind,
        vehicle_asset: &SceneAsset,
    ) -> Result<Self, SessionError> {
        let mut physics = PhysicsWorld::new();
        let mut scene = SceneGraph::new();
        let mut mixer = AudioMixer::new();

        let mut world = World::load(world_kind, world_asset, &mut scene, &mut physics)?;
        let vehicle = Vehicle::spawn(
            vehicle_kind,
            vehicle_asset,
            world.car_start(),
            &mut scene,
            &mut physics,
        )?;
        world.start(&mut scene, &mut mixer)?;

        log::info!(
            "session ready: {} in the {}",
            vehicle_kind.profile().label,
            world_kind.label()
        );

        Ok(Self {
            clock: FixedStepClock::default(),
            physics,
            scene,
            input: InputState::new(),
            mixer,
            world,
            vehicle,
        })
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn mixer(&self) -> &AudioMixer {
        &self.mixer
    }

    pub fn mixer_mut(&mut self) -> &mut AudioMixer {
        &mut self.mixer
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Simulated time.
    pub fn now(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Advances the frame. Returns whether a physics step ran.
    pub fn update(&mut self, frame_dt: Duration, listener: &na::Point3<f32>) -> bool {
        if !self.clock.advance(frame_dt) {
            return false;
        }
        let now = self.clock.elapsed();

        self.vehicle.apply_wheel_forces(&mut self.physics);
        self.physics.step();

        let events = self.physics.drain_collision_events();
        for event in &events {
            self.vehicle
                .on_collision(event, now, &self.physics, &mut self.mixer);
        }

        self.vehicle.update(
            now,
            &self.input,
            listener,
            &mut self.physics,
            &mut self.scene,
            &mut self.mixer,
        );
        self.world
            .update(&mut self.vehicle, listener, &self.scene, &mut self.mixer);
        true
    }

    pub fn key_down(&mut self, key: Key) {
        let now = self.now();
        self.input.press(key);
        self.vehicle.on_key_down(key, now, &mut self.mixer);
        self.world
            .on_key_down(key, &mut self.scene, &mut self.physics, &mut self.mixer);
    }

    pub fn key_up(&mut self, key: Key) {
        self.input.release(key);
        self.vehicle.on_key_up(key, self.now());
    }

    /// World sound assets are decodable.
    pub fn audio_loaded(&mut self) {
        self.world.audio_loaded(&mut self.mixer);
    }

    pub fn is_editing(&self) -> bool {
        self.world.editor().is_open()
    }

    pub fn open_editor(&mut self) {
        self.world.editor_mut().open_editor();
    }

    pub fn close_editor(&mut self) {
        self.world
            .editor_mut()
            .close_editor(&mut self.scene, &mut self.physics);
    }

    /// Palette button.
    pub fn create_tile(&mut self, kind: TileKind) -> bool {
        if !self.is_editing() {
            return false;
        }
        self.world
            .editor_mut()
            .create_tile(kind, &mut self.scene, &mut self.physics)
    }

    /// Nearest scene hit, falling back to the grid plane so a held tile can be
    /// dragged over empty floor.
    fn pointer_hit(&self, ray: &Ray) -> Option<PickHit> {
        if let Some(hit) = self.scene.pick(ray) {
            return Some(hit);
        }
        let selection = self.world.editor().selection()?;
        let height = self.world.editor().grid().origin().y;
        if ray.dir.y.abs() < f32::EPSILON {
            return None;
        }
        let toi = (height - ray.origin.y) / ray.dir.y;
        (toi >= 0.0).then(|| PickHit {
            node: selection.placement.mesh,
            point: ray.point_at(toi),
        })
    }

    pub fn pointer_move(&mut self, ray: &Ray) -> CursorHint {
        if !self.is_editing() {
            return CursorHint::Default;
        }
        let hit = self.pointer_hit(ray);
        self.world
            .editor_mut()
            .pointer_move(hit.as_ref(), &mut self.scene, &mut self.physics)
    }

    pub fn pointer_click(&mut self, ray: &Ray) {
        if !self.is_editing() {
            return;
        }
        let hit = self.pointer_hit(ray);
        self.world
            .editor_mut()
            .pointer_click(hit.as_ref(), &mut self.scene, &mut self.physics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Emitter;
    use crate::roadkit::CellCoord;
    use crate::test_support::{vehicle_asset, world_asset};

    const FRAME: Duration = Duration::from_millis(17);

    fn session() -> Session {
        Session::new(
            WorldKind::LivingRoom,
            &world_asset(),
            VehicleKind::SportsCar,
            &vehicle_asset(false),
        )
        .unwrap()
    }

    fn run(session: &mut Session, frames: usize) {
        let listener = session.vehicle().position(session.physics());
        for _ in 0..frames {
            session.update(FRAME, &listener);
        }
    }

    fn down_ray(x: f32, z: f32) -> Ray {
        Ray::new(na::Point3::new(x, 3.0, z), na::Vector3::new(0.0, -1.0, 0.0))
    }

    #[test]
    fn one_step_per_frame_at_most() {
        let mut session = session();
        assert!(!session.update(Duration::from_millis(10), &na::Point3::origin()));
        assert!(session.update(Duration::from_millis(10), &na::Point3::origin()));
        assert!(session.update(Duration::from_millis(100), &na::Point3::origin()));
        assert_eq!(session.now(), session.clock.interval() * 2);
    }

    #[test]
    fn toolbox_prompt_opens_the_editor_and_parks_the_car() {
        let mut session = session();
        run(&mut session, 5);
        let prompts: Vec<_> = session.world().prompts().map(|z| z.name).collect();
        assert_eq!(prompts, vec!["Toolbox"]);

        session.key_down(Key::E);
        session.key_up(Key::E);
        assert!(session.is_editing());

        run(&mut session, 1);
        assert!(!session.vehicle().is_driving());
        assert_eq!(session.world().prompts().count(), 0);

        session.close_editor();
        run(&mut session, 1);
        assert!(session.vehicle().is_driving());
        assert_eq!(session.world().prompts().count(), 1);
    }

    #[test]
    fn editor_keys_do_not_reach_the_world() {
        let mut session = session();
        session.audio_loaded();
        assert!(session.mixer().channel(Emitter::Radio).playing);

        session.open_editor();
        session.key_down(Key::Q);
        assert!(session.mixer().channel(Emitter::Radio).playing);
    }

    #[test]
    fn tiles_move_with_the_pointer() {
        let mut session = session();
        session.open_editor();
        let start = session.world().editor().grid().origin();

        // (2, 1) holds a Single in the starting layout.
        let single = *session
            .world()
            .editor()
            .grid()
            .occupant(CellCoord::new(2, 1))
            .unwrap();
        let cell = |row: usize, col: usize| {
            na::Point2::new(start.x + row as f32 * 0.5, start.z - col as f32 * 0.5)
        };

        let from = cell(2, 1);
        session.pointer_move(&down_ray(from.x, from.y));
        session.pointer_click(&down_ray(from.x, from.y));
        assert!(session.world().editor().selection().is_some());

        let to = cell(3, 1);
        session.pointer_move(&down_ray(to.x + 0.1, to.y - 0.1));
        session.pointer_click(&down_ray(to.x, to.y));

        let grid = session.world().editor().grid();
        assert!(grid.occupant(CellCoord::new(2, 1)).is_none());
        assert_eq!(grid.occupant(CellCoord::new(3, 1)).unwrap().mesh, single.mesh);
    }

    #[test]
    fn palette_needs_an_open_editor() {
        let mut session = session();
        assert!(!session.create_tile(TileKind::Single));
        session.open_editor();
        assert!(session.create_tile(TileKind::Single));
        assert!(!session.create_tile(TileKind::End));
    }
}
