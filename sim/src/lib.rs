pub mod asset;
pub mod audio;
pub mod constants;
pub mod geometry;
pub mod input;
pub mod physics;
pub mod roadkit;
pub mod scene;
pub mod session;
pub mod sim_loop;
pub mod vehicle;
pub mod world;

#[cfg(test)]
mod test_support;

pub use rapier3d::parry::query::Ray;

pub use asset::{AssetNode, AssetSource, SceneAsset, VisualRef};
pub use audio::{AudioEvent, AudioMixer, Channel, Clip, Emitter};
pub use geometry::MeshGeometry;
pub use input::{InputState, Key};
pub use roadkit::{CursorHint, TileKind};
pub use scene::{NodeId, PickHit, SceneGraph, SceneNode, Tint};
pub use session::{Session, SessionError};
pub use sim_loop::FixedStepClock;
pub use vehicle::{Vehicle, VehicleKind};
pub use world::{World, WorldKind};
