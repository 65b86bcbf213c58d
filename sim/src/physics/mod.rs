//! Rapier world owned by a session: sets, pipeline, ground plane and the contact
//! event channel.

pub mod shapes;

pub use shapes::{ColliderShapeDef, ShapeError, ShapeKind, collider_from_def};

use std::sync::mpsc::{Receiver, channel};
use std::sync::{Mutex, PoisonError};

use rapier3d::prelude::*;

use crate::constants::{
    DEFAULT_FRICTION, FIXED_TIMESTEP, GRAVITY_Y, WHEEL_GROUND_FRICTION, WHEEL_GROUND_RESTITUTION,
};

/// Contact surface of a collider.
///
/// Friction combines with `Min`, so a wheel on the ground grips at
/// [`WHEEL_GROUND_FRICTION`] and everything touching a default surface at
/// [`DEFAULT_FRICTION`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Default,
    Ground,
    Wheel,
}

impl Surface {
    pub fn friction(self) -> f32 {
        match self {
            Surface::Default => DEFAULT_FRICTION,
            Surface::Ground | Surface::Wheel => WHEEL_GROUND_FRICTION,
        }
    }

    fn apply(self, builder: ColliderBuilder) -> ColliderBuilder {
        builder
            .friction(self.friction())
            .friction_combine_rule(CoefficientCombineRule::Min)
            .restitution(WHEEL_GROUND_RESTITUTION)
    }
}

pub struct PhysicsWorld {
    pub gravity: Vector<f32>,
    pub integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    pub islands: IslandManager,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub impulse_joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    events: ChannelEventCollector,
    // Receivers are `!Sync`; the mutex lets a session live in shared app state.
    collision_recv: Mutex<Receiver<CollisionEvent>>,
    // Contact forces aren't consumed; the receiver keeps the channel open.
    _contact_force_recv: Mutex<Receiver<ContactForceEvent>>,
    ground: ColliderHandle,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Empty world with the floor half-space at y = 0.
    pub fn new() -> Self {
        let (collision_send, collision_recv) = channel();
        let (contact_force_send, contact_force_recv) = channel();

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        let floor = bodies.insert(RigidBodyBuilder::fixed().build());
        let ground = colliders.insert_with_parent(
            Surface::Ground.apply(ColliderBuilder::halfspace(Vector::y_axis())),
            floor,
            &mut bodies,
        );

        Self {
            gravity: vector![0.0, GRAVITY_Y, 0.0],
            integration_parameters: IntegrationParameters {
                dt: FIXED_TIMESTEP,
                ..IntegrationParameters::default()
            },
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            events: ChannelEventCollector::new(collision_send, contact_force_send),
            collision_recv: Mutex::new(collision_recv),
            _contact_force_recv: Mutex::new(contact_force_recv),
            ground,
        }
    }

    /// The floor collider.
    pub fn ground(&self) -> ColliderHandle {
        self.ground
    }

    /// Inserts a fixed body at `pose` carrying one collider built from `def`.
    pub fn add_fixed_body(
        &mut self,
        pose: Isometry<f32>,
        def: &ColliderShapeDef,
        surface: Surface,
    ) -> Result<RigidBodyHandle, ShapeError> {
        let collider = surface.apply(collider_from_def(def)?);
        let handle = self
            .bodies
            .insert(RigidBodyBuilder::fixed().pose(pose).build());
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        Ok(handle)
    }

    /// Inserts a dynamic body with one collider.
    pub fn add_dynamic_body(
        &mut self,
        body: RigidBodyBuilder,
        collider: ColliderBuilder,
        surface: Surface,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let handle = self.bodies.insert(body.build());
        let collider = self.colliders.insert_with_parent(
            surface.apply(collider),
            handle,
            &mut self.bodies,
        );
        (handle, collider)
    }

    /// Removes a body with its colliders and joints. Unknown handles are ignored.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<Isometry<f32>> {
        self.bodies
            .get(handle)
            .map(|rb| Isometry::from_parts((*rb.translation()).into(), *rb.rotation()))
    }

    pub fn set_body_pose(&mut self, handle: RigidBodyHandle, pose: &Isometry<f32>) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_translation(pose.translation.vector, true);
            rb.set_rotation(pose.rotation, true);
        }
    }

    /// Clears velocities and accumulated forces so a moved body carries no momentum.
    pub fn settle_body(&mut self, handle: RigidBodyHandle) {
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_linvel(Vector::zeros(), true);
            rb.set_angvel(Vector::zeros(), true);
            rb.reset_forces(true);
            rb.reset_torques(true);
        }
    }

    pub fn collider_parent(&self, handle: ColliderHandle) -> Option<RigidBodyHandle> {
        self.colliders.get(handle).and_then(|c| c.parent())
    }

    /// Advances the simulation by exactly one fixed interval.
    pub fn step(&mut self) {
        let hooks = ();
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            &hooks,
            &self.events,
        );
    }

    /// Collision events produced since the last drain.
    pub fn drain_collision_events(&mut self) -> Vec<CollisionEvent> {
        self.collision_recv
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .try_iter()
            .collect()
    }
}
