use nalgebra as na;

use crate::audio::{AudioMixer, Clip, Emitter, compute_gain};
use crate::constants::RADIO_MAX_VOLUME;

/// Looping station tracks, cycled in order.
pub const RADIO_STATIONS: [&str; 3] = [
    "music/smooth.mp3",
    "music/electronic.mp3",
    "music/rock.mp3",
];

#[derive(Clone, Debug)]
pub struct Radio {
    position: na::Point3<f32>,
    station: usize,
    is_playing: bool,
    is_loaded: bool,
}

impl Radio {
    /// A radio that is switched on but silent until its stations load.
    pub fn new(position: na::Point3<f32>) -> Self {
        Self {
            position,
            station: 0,
            is_playing: true,
            is_loaded: false,
        }
    }

    pub fn station(&self) -> usize {
        self.station
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    /// Called once every station track is decodable.
    pub fn on_loaded(&mut self, mixer: &mut AudioMixer) {
        if self.is_loaded {
            return;
        }
        self.is_loaded = true;
        mixer.set_clip(Emitter::Radio, Clip::Station(self.station));
        if self.is_playing {
            mixer.start(Emitter::Radio);
        }
    }

    pub fn change_station(&mut self, mixer: &mut AudioMixer) {
        if !self.is_loaded {
            return;
        }
        mixer.stop(Emitter::Radio);
        self.station = (self.station + 1) % RADIO_STATIONS.len();
        mixer.set_clip(Emitter::Radio, Clip::Station(self.station));
        mixer.start(Emitter::Radio);
        log::info!("radio tuned to {}", RADIO_STATIONS[self.station]);
    }

    pub fn toggle_radio(&mut self, mixer: &mut AudioMixer) {
        if !self.is_loaded {
            return;
        }
        if self.is_playing {
            mixer.stop(Emitter::Radio);
        } else {
            mixer.start(Emitter::Radio);
        }
        self.is_playing = !self.is_playing;
    }

    pub fn update(&self, listener: &na::Point3<f32>, mixer: &mut AudioMixer) {
        if self.is_loaded {
            mixer.set_gain(
                Emitter::Radio,
                compute_gain(&self.position, listener, RADIO_MAX_VOLUME),
            );
        }
    }
}
