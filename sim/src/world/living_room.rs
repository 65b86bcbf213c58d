use nalgebra as na;
use rapier3d::parry::bounding_volume::Aabb;

use super::classify::{ObjectTable, WorldObject};
use super::radio::Radio;
use super::tv::Tv;
use super::zones::InteractionZone;
use super::{WorldError, WorldVariant};
use crate::audio::AudioMixer;
use crate::input::Key;
use crate::physics::PhysicsWorld;
use crate::roadkit::layout::DEFAULT_LAYOUT;
use crate::roadkit::{GridEditor, TileKind};
use crate::scene::SceneGraph;

const RAMP_ROLL_DEG: f32 = 16.0;

const TOOLBOX: &str = "Toolbox";
const RADIO: &str = "Radio";
const REMOTE: &str = "Remote";
const TV_SCREEN: &str = "TVScreen";

#[derive(Default)]
pub struct LivingRoom {
    zones: Vec<InteractionZone>,
    radio: Option<Radio>,
    tv: Option<Tv>,
}

impl LivingRoom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn radio(&self) -> Option<&Radio> {
        self.radio.as_ref()
    }

    pub fn tv(&self) -> Option<&Tv> {
        self.tv.as_ref()
    }

    fn is_shown(&self, name: &str) -> bool {
        self.zones.iter().any(|z| z.name == name && z.is_shown())
    }
}

fn required<'a>(objects: &'a ObjectTable, tag: &'static str) -> Result<&'a WorldObject, WorldError> {
    objects.get(tag).ok_or(WorldError::MissingObject(tag))
}

impl WorldVariant for LivingRoom {
    fn layout(&self) -> &'static [(usize, usize, TileKind, f32)] {
        &DEFAULT_LAYOUT
    }

    fn apply_customizations(
        &self,
        object: &WorldObject,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
    ) {
        if object.tag != "Ramp" {
            return;
        }
        let roll = na::UnitQuaternion::from_axis_angle(
            &na::Vector3::z_axis(),
            RAMP_ROLL_DEG.to_radians(),
        );
        if let Some(mut pose) = scene.world_transform(object.node) {
            pose.rotation *= roll;
            scene.set_transform(object.node, pose);
        }
        if let Some(body) = object.body {
            if let Some(mut pose) = physics.body_pose(body) {
                pose.rotation = roll;
                physics.set_body_pose(body, &pose);
            }
        }
    }

    fn assign_interactables(
        &mut self,
        objects: &ObjectTable,
        scene: &SceneGraph,
    ) -> Result<(), WorldError> {
        let zones = [
            (TOOLBOX, 0.7, "Press **E** to change the tracks."),
            (
                RADIO,
                0.3,
                "Press **E** to change the station, or **Q** to turn the radio on/off.",
            ),
            (REMOTE, 0.5, "Press **Q** to turn the TV on/off."),
        ];
        for (tag, margin, prompt) in zones {
            let object = required(objects, tag)?;
            let bounds = scene
                .world_bounds(object.node)
                .ok_or(WorldError::MissingObject(tag))?;
            self.zones
                .push(InteractionZone::around(tag, &bounds, margin, prompt));
        }
        Ok(())
    }

    fn on_ready(
        &mut self,
        objects: &ObjectTable,
        _scene: &mut SceneGraph,
        _mixer: &mut AudioMixer,
    ) -> Result<(), WorldError> {
        let radio = required(objects, RADIO)?;
        let screen = required(objects, TV_SCREEN)?;
        self.radio = Some(Radio::new(radio.position));
        self.tv = Some(Tv::new(screen.node, screen.position));
        Ok(())
    }

    fn on_audio_loaded(&mut self, mixer: &mut AudioMixer) {
        if let Some(radio) = &mut self.radio {
            radio.on_loaded(mixer);
        }
    }

    fn interactions_tick(&mut self, chassis: Option<&Aabb>, editing: bool) {
        for zone in &mut self.zones {
            zone.update(chassis, editing);
        }
    }

    fn zones(&self) -> &[InteractionZone] {
        &self.zones
    }

    fn on_key(
        &mut self,
        key: Key,
        editor: &mut GridEditor,
        scene: &mut SceneGraph,
        mixer: &mut AudioMixer,
    ) {
        let near_toolbox = self.is_shown(TOOLBOX);
        let near_radio = self.is_shown(RADIO);
        let near_remote = self.is_shown(REMOTE);
        let (Some(radio), Some(tv)) = (&mut self.radio, &mut self.tv) else {
            return;
        };

        match key {
            Key::E => {
                if near_toolbox {
                    editor.open_editor();
                }
                if near_radio && radio.is_playing() {
                    radio.change_station(mixer);
                }
            }
            Key::Q => {
                if near_radio {
                    radio.toggle_radio(mixer);
                    if tv.is_playing() {
                        tv.toggle_video(scene, mixer);
                    }
                }
                if near_remote {
                    tv.toggle_video(scene, mixer);
                    if radio.is_playing() {
                        radio.toggle_radio(mixer);
                    }
                }
            }
            _ => {}
        }
    }

    fn update(&mut self, listener: &na::Point3<f32>, mixer: &mut AudioMixer) {
        if let Some(radio) = &self.radio {
            radio.update(listener, mixer);
        }
        if let Some(tv) = &self.tv {
            tv.update(listener, mixer);
        }
    }
}
