//! The running simulation and the per-frame tick that drives it.

use bevy::prelude::*;
use sim::Session;

use crate::convert::vec3_to_point;
use crate::state::AppState;

#[derive(Resource, Deref, DerefMut)]
pub struct SimSession(pub Session);

/// Ordering within a frame: input feeds the tick, the tick feeds presentation.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimSet {
    Input,
    Tick,
    Present,
}

pub(super) fn plugin(app: &mut App) {
    app.configure_sets(
        Update,
        (SimSet::Input, SimSet::Tick, SimSet::Present)
            .chain()
            .run_if(in_state(AppState::Playing)),
    );
    app.add_systems(OnEnter(AppState::Playing), spawn_lights);
    app.add_systems(Update, tick.in_set(SimSet::Tick));
}

fn tick(
    mut session: ResMut<SimSession>,
    camera: Single<&GlobalTransform, With<Camera3d>>,
    time: Res<Time>,
) {
    let listener = vec3_to_point(camera.translation());
    session.update(time.delta(), &listener);
}

fn spawn_lights(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 6_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(3.0, 6.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
