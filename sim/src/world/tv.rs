use nalgebra as na;

use crate::audio::{AudioMixer, Emitter, compute_gain};
use crate::constants::TV_MAX_VOLUME;
use crate::scene::{NodeId, SceneGraph, Tint};

#[derive(Clone, Debug)]
pub struct Tv {
    screen: NodeId,
    position: na::Point3<f32>,
    is_playing: bool,
}

impl Tv {
    pub fn new(screen: NodeId, position: na::Point3<f32>) -> Self {
        Self {
            screen,
            position,
            is_playing: false,
        }
    }

    pub fn screen(&self) -> NodeId {
        self.screen
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn toggle_video(&mut self, scene: &mut SceneGraph, mixer: &mut AudioMixer) {
        self.is_playing = !self.is_playing;
        if self.is_playing {
            scene.set_tint(self.screen, Some(Tint::Screen));
            mixer.start(Emitter::Tv);
        } else {
            scene.set_tint(self.screen, None);
            mixer.stop(Emitter::Tv);
        }
    }

    pub fn update(&self, listener: &na::Point3<f32>, mixer: &mut AudioMixer) {
        if self.is_playing {
            mixer.set_gain(Emitter::Tv, compute_gain(&self.position, listener, TV_MAX_VOLUME));
        }
    }
}
