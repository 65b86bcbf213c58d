use bevy::{
    core_pipeline::tonemapping::Tonemapping,
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll},
    prelude::*,
};
use sim::constants::{EDITOR_CAMERA_PITCH, EDITOR_CAMERA_POSITION};

use crate::convert::point_to_vec3;
use crate::session::{SimSession, SimSet};
use crate::state::AppState;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(AppState::Playing), add_camera);
    app.add_systems(
        Update,
        (orbit_input, follow_vehicle).chain().in_set(SimSet::Present),
    );
}

const CAMERA_DECAY_RATE: f32 = 12.0;
const ORBIT_SENSITIVITY: f32 = 0.005;
const ZOOM_SENSITIVITY: f32 = 0.1;
const MIN_DISTANCE: f32 = 0.4;
const MAX_DISTANCE: f32 = 4.0;
const MIN_PITCH: f32 = 0.05;
const MAX_PITCH: f32 = 1.4;

/// Orbit around the chassis, driven by right-drag and the scroll wheel.
#[derive(Component, Debug)]
struct Orbit {
    yaw: f32,
    pitch: f32,
    distance: f32,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            yaw: std::f32::consts::PI,
            pitch: 0.45,
            distance: 1.2,
        }
    }
}

impl Orbit {
    fn offset(&self) -> Vec3 {
        Quat::from_euler(EulerRot::YXZ, self.yaw, -self.pitch, 0.0) * Vec3::Z * self.distance
    }
}

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Tonemapping::AcesFitted,
        AmbientLight {
            brightness: 400.0,
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            near: 0.01,
            ..default()
        }),
        Orbit::default(),
        Transform::from_translation(Vec3::new(0.0, 1.0, -1.0)).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn orbit_input(
    mut orbit: Single<&mut Orbit>,
    buttons: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
) {
    if buttons.pressed(MouseButton::Right) {
        orbit.yaw -= motion.delta.x * ORBIT_SENSITIVITY;
        orbit.pitch = (orbit.pitch + motion.delta.y * ORBIT_SENSITIVITY).clamp(MIN_PITCH, MAX_PITCH);
    }
    if scroll.delta.y != 0.0 {
        orbit.distance =
            (orbit.distance * (1.0 - scroll.delta.y * ZOOM_SENSITIVITY)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

fn follow_vehicle(
    camera: Single<(&mut Transform, &Orbit), With<Camera3d>>,
    session: Res<SimSession>,
    time: Res<Time>,
) {
    let (mut transform, orbit) = camera.into_inner();

    if session.is_editing() {
        *transform = Transform::from_translation(Vec3::from_array(EDITOR_CAMERA_POSITION))
            .with_rotation(Quat::from_rotation_x(EDITOR_CAMERA_PITCH));
        return;
    }

    let target = point_to_vec3(&session.vehicle().position(session.physics()));
    let desired = target + orbit.offset();
    transform
        .translation
        .smooth_nudge(&desired, CAMERA_DECAY_RATE, time.delta_secs());
    transform.look_at(target, Vec3::Y);
}
