//! Four-wheel rigid vehicle: a dynamic chassis with a ball wheel hinged at each
//! corner, driven by wheel torque and steered by turning the front hinge axes.

pub mod model;

pub use model::{VehicleModel, WheelPosition, classify};

use std::time::Duration;

use nalgebra as na;
use rapier3d::prelude::*;
use thiserror::Error;

use crate::asset::SceneAsset;
use crate::audio::{AudioMixer, CollisionSound, Emitter, EngineSound, Horn, compute_gain};
use crate::constants::{
    STEER_ANGLE, VEHICLE_ANGULAR_DAMPING, VEHICLE_BODY_MASS, VEHICLE_MAX_VOLUME,
    WHEEL_FRICTION_SLIP,
};
use crate::input::{InputState, Key};
use crate::physics::{ColliderShapeDef, PhysicsWorld, ShapeError, Surface, collider_from_def};
use crate::scene::{NodeId, SceneGraph, SceneNode};

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("vehicle model has no `Car_Body` node")]
    MissingChassis,
    #[error("vehicle model has no {0:?} wheel")]
    MissingWheel(WheelPosition),
    #[error("chassis collider: {0}")]
    Shape(#[from] ShapeError),
}

/// Selectable vehicles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VehicleKind {
    #[default]
    SportsCar,
    Truck,
}

/// Per-vehicle tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleProfile {
    pub label: &'static str,
    pub model_path: &'static str,
    /// Wheel torque while a drive key is held.
    pub max_force: f32,
}

impl VehicleKind {
    pub const ALL: [VehicleKind; 2] = [VehicleKind::SportsCar, VehicleKind::Truck];

    pub const fn profile(self) -> VehicleProfile {
        match self {
            VehicleKind::SportsCar => VehicleProfile {
                label: "Sports car",
                model_path: "models/vehicles/SportsCar.glb",
                max_force: 0.2,
            },
            VehicleKind::Truck => VehicleProfile {
                label: "Truck",
                model_path: "models/vehicles/Truck.glb",
                max_force: 0.35,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct Wheel {
    pub position: WheelPosition,
    /// Hinge anchor relative to the chassis center.
    pub offset: na::Vector3<f32>,
    pub radius: f32,
    /// Hinge axis in chassis space before steering.
    pub axis: na::Vector3<f32>,
    /// Suspension direction in chassis space.
    pub direction: na::Vector3<f32>,
    pub friction_slip: f32,
    pub body: RigidBodyHandle,
    pub joint: ImpulseJointHandle,
    pub node: NodeId,
    force: f32,
    steering: f32,
}

impl Wheel {
    pub fn force(&self) -> f32 {
        self.force
    }

    pub fn steering(&self) -> f32 {
        self.steering
    }
}

pub struct Vehicle {
    kind: VehicleKind,
    max_force: f32,
    chassis: RigidBodyHandle,
    chassis_collider: ColliderHandle,
    chassis_node: NodeId,
    wheels: [Wheel; 4],
    is_driving: bool,
    engine: EngineSound,
    horn: Horn,
    collision: CollisionSound,
}

impl Vehicle {
    /// Builds the vehicle from its model and places the chassis over `start`
    /// (x/z from `start`, height from the model).
    pub fn spawn(
        kind: VehicleKind,
        asset: &SceneAsset,
        start: na::Point3<f32>,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
    ) -> Result<Self, VehicleError> {
        let model = classify(asset)?;
        let center = model.chassis.center;
        let origin = na::Vector3::new(start.x + center.x, center.y, start.z + center.z);

        let hull = asset
            .merged_geometry(&model.chassis.members)
            .translated(&-center.coords);
        let chassis_shape = collider_from_def(&ColliderShapeDef::ConvexHull {
            points: hull.positions.clone(),
        })?;
        let (chassis, chassis_collider) = physics.add_dynamic_body(
            RigidBodyBuilder::dynamic()
                .translation(origin)
                .angular_damping(VEHICLE_ANGULAR_DAMPING),
            chassis_shape
                .mass(VEHICLE_BODY_MASS)
                .active_events(ActiveEvents::COLLISION_EVENTS),
            Surface::Default,
        );

        let chassis_node = scene.add(SceneNode::new(
            "Car_Body",
            model.chassis.members.iter().map(|i| asset.visual(*i)).collect(),
            &asset.merged_geometry(&model.chassis.members),
            -center.coords,
        ));
        scene.set_transform(chassis_node, na::Isometry3::translation(origin.x, origin.y, origin.z));

        for members in &model.deco {
            let node = scene.add(SceneNode::new(
                asset.nodes[members[0]].name.clone(),
                members.iter().map(|i| asset.visual(*i)).collect(),
                &asset.merged_geometry(members),
                -center.coords,
            ));
            scene.set_parent(node, Some(chassis_node));
            scene.set_transform(node, na::Isometry3::identity());
        }

        let wheels = WheelPosition::ALL.map(|position| {
            let part = &model.wheels[position.index()];
            let offset = part.center - center;
            let radius = part.size.y / 2.0;
            let at = origin + offset;

            let (body, _) = physics.add_dynamic_body(
                RigidBodyBuilder::dynamic()
                    .translation(at)
                    .angular_damping(VEHICLE_ANGULAR_DAMPING),
                ColliderBuilder::ball(radius).mass(VEHICLE_BODY_MASS),
                Surface::Wheel,
            );

            let hinge = RevoluteJointBuilder::new(Vector::x_axis())
                .local_anchor1(offset.into())
                .local_anchor2(Point::origin())
                .contacts_enabled(false);
            let joint = physics.impulse_joints.insert(chassis, body, hinge, true);

            let node = scene.add(SceneNode::new(
                format!("{}_Wheel", position.tag()),
                part.members.iter().map(|i| asset.visual(*i)).collect(),
                &asset.merged_geometry(&part.members),
                -part.center.coords,
            ));
            scene.set_transform(node, na::Isometry3::translation(at.x, at.y, at.z));

            Wheel {
                position,
                offset,
                radius,
                axis: na::Vector3::x(),
                direction: -na::Vector3::y(),
                friction_slip: WHEEL_FRICTION_SLIP,
                body,
                joint,
                node,
                force: 0.0,
                steering: 0.0,
            }
        });

        log::info!(
            "{} ready at ({:.2}, {:.2}, {:.2})",
            kind.profile().label,
            origin.x,
            origin.y,
            origin.z
        );

        Ok(Self {
            kind,
            max_force: kind.profile().max_force,
            chassis,
            chassis_collider,
            chassis_node,
            wheels,
            is_driving: true,
            engine: EngineSound::new(),
            horn: Horn::new(),
            collision: CollisionSound::new(),
        })
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn max_force(&self) -> f32 {
        self.max_force
    }

    pub fn chassis(&self) -> RigidBodyHandle {
        self.chassis
    }

    pub fn chassis_node(&self) -> NodeId {
        self.chassis_node
    }

    /// Always ordered left-front, right-front, left-back, right-back.
    pub fn wheels(&self) -> &[Wheel; 4] {
        &self.wheels
    }

    pub fn wheel(&self, position: WheelPosition) -> &Wheel {
        &self.wheels[position.index()]
    }

    pub fn is_driving(&self) -> bool {
        self.is_driving
    }

    pub fn engine_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Ignore drive input; wheel force and steering keep their last values.
    pub fn stop_driving(&mut self) {
        self.is_driving = false;
    }

    pub fn resume_driving(&mut self) {
        self.is_driving = true;
    }

    pub fn set_wheel_force(&mut self, force: f32, position: WheelPosition) {
        self.wheels[position.index()].force = force;
    }

    /// Turns a wheel's hinge axis about the chassis up axis.
    pub fn set_steering_value(
        &mut self,
        value: f32,
        position: WheelPosition,
        physics: &mut PhysicsWorld,
    ) {
        let wheel = &mut self.wheels[position.index()];
        wheel.steering = value;

        let axis = na::Rotation3::from_axis_angle(&na::Vector3::y_axis(), value) * wheel.axis;
        if let Some(joint) = physics.impulse_joints.get_mut(wheel.joint, true) {
            joint.data.set_local_axis1(na::Unit::new_normalize(axis));
        }
    }

    /// Chassis position in world space.
    pub fn position(&self, physics: &PhysicsWorld) -> na::Point3<f32> {
        physics
            .bodies
            .get(self.chassis)
            .map(|rb| na::Point3::from(*rb.translation()))
            .unwrap_or_else(na::Point3::origin)
    }

    pub fn speed(&self, physics: &PhysicsWorld) -> f32 {
        physics
            .bodies
            .get(self.chassis)
            .map_or(0.0, |rb| rb.linvel().norm())
    }

    /// Applies each wheel's force as torque about its own spin axis. Runs right
    /// before every physics step.
    pub fn apply_wheel_forces(&self, physics: &mut PhysicsWorld) {
        for wheel in &self.wheels {
            if let Some(rb) = physics.bodies.get_mut(wheel.body) {
                let spin_axis = rb.rotation() * wheel.axis;
                rb.reset_torques(false);
                if wheel.force != 0.0 {
                    rb.add_torque(spin_axis * wheel.force, true);
                }
            }
        }
    }

    /// Maps the drive keys onto wheel force and front steering.
    ///
    /// Back is evaluated after forward, right after left, so the later key wins
    /// when both of a pair are held.
    pub fn apply_drive_input(
        &mut self,
        input: &InputState,
        now: Duration,
        physics: &mut PhysicsWorld,
        mixer: &mut AudioMixer,
    ) {
        let mut force = 0.0;
        if input.forward() {
            force = self.max_force;
        }
        if input.back() {
            force = -self.max_force;
        }
        for position in WheelPosition::ALL {
            self.set_wheel_force(force, position);
        }
        self.engine.on_drive_force(force, now, mixer);

        let mut steering = 0.0;
        if input.left() {
            steering = STEER_ANGLE;
        }
        if input.right() {
            steering = -STEER_ANGLE;
        }
        for position in WheelPosition::ALL.into_iter().filter(|p| p.is_front()) {
            self.set_steering_value(steering, position, physics);
        }
    }

    /// Copies body poses onto the chassis and wheel nodes.
    pub fn sync_visual(&self, physics: &PhysicsWorld, scene: &mut SceneGraph) {
        if let Some(pose) = physics.body_pose(self.chassis) {
            scene.set_transform(self.chassis_node, pose);
        }
        for wheel in &self.wheels {
            if let Some(pose) = physics.body_pose(wheel.body) {
                scene.set_transform(wheel.node, pose);
            }
        }
    }

    /// Per-tick update after the physics step.
    pub fn update(
        &mut self,
        now: Duration,
        input: &InputState,
        listener: &na::Point3<f32>,
        physics: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        mixer: &mut AudioMixer,
    ) {
        if self.is_driving {
            self.apply_drive_input(input, now, physics, mixer);
        }
        self.sync_visual(physics, scene);

        let gain = compute_gain(&self.position(physics), listener, VEHICLE_MAX_VOLUME);
        for emitter in [Emitter::Engine, Emitter::Horn, Emitter::Collision] {
            mixer.set_gain(emitter, gain);
        }

        self.engine
            .tick(now, self.speed(physics), self.max_force, mixer);
        self.horn.tick(now, mixer);
        self.collision.tick(now, mixer);
    }

    pub fn on_key_down(&mut self, key: Key, now: Duration, mixer: &mut AudioMixer) {
        if key == Key::Space {
            self.horn.press(now, mixer);
        }
    }

    pub fn on_key_up(&mut self, key: Key, now: Duration) {
        if key == Key::Space {
            self.horn.release(now);
        }
    }

    /// Feeds a physics collision event; plays the impact sound for hard hits on
    /// anything but the floor.
    pub fn on_collision(
        &mut self,
        event: &CollisionEvent,
        now: Duration,
        physics: &PhysicsWorld,
        mixer: &mut AudioMixer,
    ) -> bool {
        if !event.started() {
            return false;
        }
        let other = if event.collider1() == self.chassis_collider {
            event.collider2()
        } else if event.collider2() == self.chassis_collider {
            event.collider1()
        } else {
            return false;
        };
        if other == physics.ground() {
            return false;
        }
        if let Some(parent) = physics.collider_parent(other) {
            if self.wheels.iter().any(|w| w.body == parent) {
                return false;
            }
        }

        self.collision.on_contact(now, self.speed(physics), mixer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::vehicle_asset;

    fn spawn(kind: VehicleKind) -> (Vehicle, SceneGraph, PhysicsWorld) {
        let mut scene = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        let vehicle = Vehicle::spawn(
            kind,
            &vehicle_asset(true),
            na::Point3::new(1.0, 0.0, -1.0),
            &mut scene,
            &mut physics,
        )
        .unwrap();
        (vehicle, scene, physics)
    }

    fn tick(
        vehicle: &mut Vehicle,
        input: &InputState,
        now: Duration,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
        mixer: &mut AudioMixer,
    ) {
        vehicle.apply_wheel_forces(physics);
        physics.step();
        vehicle.update(now, input, &na::Point3::origin(), physics, scene, mixer);
    }

    #[test]
    fn spawns_over_the_start_marker() {
        let (vehicle, _, physics) = spawn(VehicleKind::Truck);
        let p = vehicle.position(&physics);
        assert!((p.x - 1.0).abs() < 1.0e-6);
        assert!((p.z + 1.0).abs() < 1.0e-6);
        assert!((p.y - 0.15).abs() < 1.0e-6);
        assert_eq!(vehicle.max_force(), 0.35);
    }

    #[test]
    fn wheels_keep_their_slots() {
        let (vehicle, scene, _) = spawn(VehicleKind::SportsCar);
        for (i, wheel) in vehicle.wheels().iter().enumerate() {
            assert_eq!(wheel.position.index(), i);
            assert_eq!(
                scene.get(wheel.node).unwrap().name,
                format!("{}_Wheel", wheel.position.tag())
            );
        }
        assert!(vehicle.wheel(WheelPosition::LeftFront).offset.x > 0.0);
        assert!(vehicle.wheel(WheelPosition::RightBack).offset.z < 0.0);
        assert!((vehicle.wheel(WheelPosition::LeftBack).radius - 0.06).abs() < 1.0e-6);
    }

    #[test]
    fn later_key_of_a_pair_wins() {
        let (mut vehicle, _, mut physics) = spawn(VehicleKind::SportsCar);
        let mut mixer = AudioMixer::new();
        let mut input = InputState::new();
        input.press(Key::W);
        input.press(Key::ArrowDown);
        input.press(Key::A);
        input.press(Key::D);

        vehicle.apply_drive_input(&input, Duration::ZERO, &mut physics, &mut mixer);
        assert!(vehicle.wheels().iter().all(|w| w.force() == -0.2));
        assert_eq!(vehicle.wheel(WheelPosition::LeftFront).steering(), -STEER_ANGLE);
        assert_eq!(vehicle.wheel(WheelPosition::RightFront).steering(), -STEER_ANGLE);
        assert_eq!(vehicle.wheel(WheelPosition::LeftBack).steering(), 0.0);
    }

    #[test]
    fn stopped_vehicle_freezes_its_last_input() {
        let (mut vehicle, mut scene, mut physics) = spawn(VehicleKind::SportsCar);
        let mut mixer = AudioMixer::new();
        let mut input = InputState::new();
        input.press(Key::W);
        input.press(Key::A);
        tick(&mut vehicle, &input, Duration::ZERO, &mut scene, &mut physics, &mut mixer);

        vehicle.stop_driving();
        input.release(Key::W);
        input.release(Key::A);
        tick(&mut vehicle, &input, Duration::from_millis(16), &mut scene, &mut physics, &mut mixer);
        assert!(vehicle.wheels().iter().all(|w| w.force() == 0.2));
        assert_eq!(vehicle.wheel(WheelPosition::RightFront).steering(), STEER_ANGLE);

        vehicle.resume_driving();
        tick(&mut vehicle, &input, Duration::from_millis(33), &mut scene, &mut physics, &mut mixer);
        assert!(vehicle.wheels().iter().all(|w| w.force() == 0.0));
    }

    #[test]
    fn driving_forward_moves_the_car_and_visuals_follow() {
        let (mut vehicle, mut scene, mut physics) = spawn(VehicleKind::SportsCar);
        let mut mixer = AudioMixer::new();
        let mut input = InputState::new();
        let start = vehicle.position(&physics);

        // Let the car settle on its wheels first.
        for i in 0..30 {
            tick(&mut vehicle, &input, Duration::from_millis(i * 16), &mut scene, &mut physics, &mut mixer);
        }
        input.press(Key::W);
        for i in 30..150 {
            tick(&mut vehicle, &input, Duration::from_millis(i * 16), &mut scene, &mut physics, &mut mixer);
        }

        let end = vehicle.position(&physics);
        assert!(end.z - start.z > 0.05, "car moved from {start} to {end}");
        assert!(vehicle.engine_running());

        let node = scene.world_transform(vehicle.chassis_node()).unwrap();
        assert!((node.translation.vector - end.coords).norm() < 1.0e-6);
    }

    #[test]
    fn floor_contacts_are_silent() {
        let (mut vehicle, _, physics) = spawn(VehicleKind::SportsCar);
        let mut mixer = AudioMixer::new();
        let event = CollisionEvent::Started(
            vehicle.chassis_collider,
            physics.ground(),
            CollisionEventFlags::empty(),
        );
        assert!(!vehicle.on_collision(&event, Duration::from_secs(1), &physics, &mut mixer));
    }

    #[test]
    fn wall_hits_thud_at_most_once_per_cooldown() {
        let (mut vehicle, _, mut physics) = spawn(VehicleKind::SportsCar);
        let mut mixer = AudioMixer::new();
        let wall_body = physics
            .add_fixed_body(
                Isometry::translation(3.0, 0.2, 0.0),
                &ColliderShapeDef::cuboid(na::Vector3::new(0.1, 0.2, 1.0)),
                Surface::Default,
            )
            .unwrap();
        let wall = physics.bodies[wall_body].colliders()[0];
        physics.bodies[vehicle.chassis].set_linvel(vector![3.0, 0.0, 0.0], true);

        let hit = CollisionEvent::Started(vehicle.chassis_collider, wall, CollisionEventFlags::empty());
        let mut at = |ms: u64, vehicle: &mut Vehicle, physics: &PhysicsWorld| {
            vehicle.on_collision(&hit, Duration::from_millis(ms), physics, &mut mixer)
        };
        assert!(at(1_000, &mut vehicle, &physics));
        assert!(!at(1_050, &mut vehicle, &physics));
        assert!(at(1_150, &mut vehicle, &physics));
        assert!(at(1_300, &mut vehicle, &physics));

        physics.bodies[vehicle.chassis].set_linvel(vector![1.0, 0.0, 0.0], true);
        assert!(!at(2_000, &mut vehicle, &physics));
    }

    #[test]
    fn own_wheels_never_thud() {
        let (mut vehicle, _, mut physics) = spawn(VehicleKind::SportsCar);
        let mut mixer = AudioMixer::new();
        physics.bodies[vehicle.chassis].set_linvel(vector![3.0, 0.0, 0.0], true);

        let wheel = physics.bodies[vehicle.wheel(WheelPosition::LeftFront).body].colliders()[0];
        let rubbing = CollisionEvent::Started(wheel, vehicle.chassis_collider, CollisionEventFlags::empty());
        assert!(!vehicle.on_collision(&rubbing, Duration::from_secs(1), &physics, &mut mixer));
    }
}
