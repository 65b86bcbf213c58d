//! Debug/performance tooling for native dev builds.
//!
//! Compiled only with `dev_native` (`#[cfg(feature = "dev_native")] mod debug_tools;`
//! in `main.rs`).

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;

use crate::convert::{point_to_vec3, vector_to_vec3};
use crate::session::{SimSession, SimSet};

const ZONE_COLOR: Color = Color::srgb(0.2, 0.8, 0.3);
const ZONE_ACTIVE_COLOR: Color = Color::srgb(1.0, 0.8, 0.1);
const CELL_COLOR: Color = Color::srgba(0.3, 0.6, 1.0, 0.6);

/// Add debug/perf tooling (intended for `dev_native` builds only).
pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(Update, (draw_zones, draw_grid).in_set(SimSet::Present));
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn draw_zones(session: Res<SimSession>, mut gizmos: Gizmos) {
    for zone in session.world().variant().zones() {
        let center = point_to_vec3(&zone.bounds.center());
        let size = vector_to_vec3(&zone.bounds.extents());
        let color = if zone.is_shown() {
            ZONE_ACTIVE_COLOR
        } else {
            ZONE_COLOR
        };
        gizmos.cuboid(Transform::from_translation(center).with_scale(size), color);
    }
}

fn draw_grid(session: Res<SimSession>, mut gizmos: Gizmos) {
    let grid = session.world().editor().grid();
    let size = Vec2::splat(grid.tile_size());
    for (_, cell) in grid.iter() {
        let position = point_to_vec3(cell.position());
        gizmos.rect(
            Isometry3d::new(position, Quat::from_rotation_x(std::f32::consts::FRAC_PI_2)),
            size,
            CELL_COLOR,
        );
    }
}
