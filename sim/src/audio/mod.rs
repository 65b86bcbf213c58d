//! Audio policy: proximity gain, voice envelopes and the channel table the client
//! reconciles its audio sinks against.
//!
//! Decoding and playback belong to the client. The simulation only decides what
//! should be playing, how loud, and at which rate.

pub mod engine;
pub mod envelope;
pub mod proximity;
pub mod voices;

pub use engine::{EngineSound, engine_playback_rate};
pub use envelope::{COLLISION_ENVELOPE, Envelope, EnvelopeShape, HORN_ENVELOPE};
pub use proximity::compute_gain;
pub use voices::{CollisionSound, Horn, SynthTone};

/// Every sound source in a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Emitter {
    Engine,
    Horn,
    Collision,
    Radio,
    Tv,
}

impl Emitter {
    pub const ALL: [Emitter; 5] = [
        Emitter::Engine,
        Emitter::Horn,
        Emitter::Collision,
        Emitter::Radio,
        Emitter::Tv,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// What a channel plays. The client maps these onto asset paths or synth voices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Clip {
    EngineLoop,
    Horn,
    CollisionThud,
    Station(usize),
    TvSoundtrack,
}

/// Transitions recorded by the mixer, drained by the client for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioEvent {
    Started(Emitter, Clip),
    Stopped(Emitter),
}

/// Desired state for one emitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Channel {
    pub clip: Clip,
    pub looping: bool,
    /// Fixed trim applied on top of the proximity gain, in decibels.
    pub base_volume_db: f32,
    pub playing: bool,
    /// Proximity gain (may be negative, see [`compute_gain`]).
    pub gain: f32,
    pub playback_rate: f32,
    /// Envelope level for synth voices, 1.0 for sample players.
    pub level: f32,
    /// Bumped on every (re)start so the client can tell a retrigger from a continued play.
    pub generation: u32,
}

impl Channel {
    const fn new(clip: Clip, looping: bool, base_volume_db: f32) -> Self {
        Self {
            clip,
            looping,
            base_volume_db,
            playing: false,
            gain: 1.0,
            playback_rate: 1.0,
            level: 1.0,
            generation: 0,
        }
    }

    /// Linear amplitude the sink should use.
    pub fn volume(&self) -> f32 {
        db_to_linear(self.base_volume_db) * self.gain * self.level
    }
}

#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Channel table for all emitters of a session.
#[derive(Clone, Debug)]
pub struct AudioMixer {
    channels: [Channel; 5],
    events: Vec<AudioEvent>,
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioMixer {
    pub fn new() -> Self {
        Self {
            channels: [
                Channel::new(Clip::EngineLoop, true, -12.0),
                Channel::new(Clip::Horn, true, -12.0),
                Channel::new(Clip::CollisionThud, true, -18.0),
                Channel::new(Clip::Station(0), true, -10.0),
                Channel::new(Clip::TvSoundtrack, true, -10.0),
            ],
            events: Vec::new(),
        }
    }

    pub fn channel(&self, emitter: Emitter) -> &Channel {
        &self.channels[emitter.index()]
    }

    pub fn channels(&self) -> impl Iterator<Item = (Emitter, &Channel)> {
        Emitter::ALL.iter().map(|e| (*e, &self.channels[e.index()]))
    }

    /// Starts (or restarts) the emitter's current clip.
    pub fn start(&mut self, emitter: Emitter) {
        let ch = &mut self.channels[emitter.index()];
        ch.playing = true;
        ch.generation = ch.generation.wrapping_add(1);
        self.events.push(AudioEvent::Started(emitter, ch.clip));
    }

    pub fn stop(&mut self, emitter: Emitter) {
        let ch = &mut self.channels[emitter.index()];
        if ch.playing {
            ch.playing = false;
            self.events.push(AudioEvent::Stopped(emitter));
        }
    }

    pub fn set_clip(&mut self, emitter: Emitter, clip: Clip) {
        self.channels[emitter.index()].clip = clip;
    }

    pub fn set_gain(&mut self, emitter: Emitter, gain: f32) {
        self.channels[emitter.index()].gain = gain;
    }

    pub fn set_playback_rate(&mut self, emitter: Emitter, rate: f32) {
        self.channels[emitter.index()].playback_rate = rate;
    }

    pub fn set_level(&mut self, emitter: Emitter, level: f32) {
        self.channels[emitter.index()].level = level;
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, AudioEvent> {
        self.events.drain(..)
    }
}
