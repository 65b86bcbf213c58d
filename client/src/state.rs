use bevy::prelude::*;
use sim::{VehicleKind, WorldKind};

/// Top-level flow: pick a vehicle and a world, wait for both models, drive.
#[derive(States, Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppState {
    #[default]
    Menu,
    Loading,
    Playing,
}

/// Menu selection, read once the models are requested.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct Choice {
    pub vehicle: VehicleKind,
    pub world: WorldKind,
}

pub(super) fn plugin(app: &mut App) {
    app.init_state::<AppState>();
    app.init_resource::<Choice>();
}
