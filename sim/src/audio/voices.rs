use std::time::Duration;

use super::{AudioMixer, Emitter, Envelope, envelope::COLLISION_ENVELOPE, envelope::HORN_ENVELOPE};
use crate::constants::{COLLISION_MIN_SPEED, COLLISION_SOUND_COOLDOWN};

/// Additive synth description shared with the client's tone generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthTone {
    pub frequency: f32,
    /// Amplitudes of harmonics 1..=N of `frequency`.
    pub partials: &'static [f32],
    /// Soft-clip drive in `0..=1`, 0 disables it.
    pub distortion: f32,
}

/// A#4 detuned by +50 cents.
const HORN_FREQUENCY: f32 = 466.163_76 * 1.029_302_2;

const HORN_PARTIALS: [f32; 50] = [
    0.392_798_15,
    -0.318_309_9,
    0.392_798_15,
    -0.159_154_94,
    0.127_323_95,
    0.586_181_64,
    0.586_181_64,
    0.586_181_64,
    0.586_181_64,
    0.392_798_15,
    0.392_798_15,
    0.586_181_64,
    0.048_970_75,
    0.030_140_818,
    0.706_066_74,
    -0.039_788_736,
    0.706_066_74,
    1.0,
    1.0,
    -0.031_830_99,
    0.843_463_66,
    1.0,
    0.027_679_12,
    -0.026_525_824,
    0.843_463_66,
    -0.024_485_376,
    0.843_463_66,
    -0.022_736_42,
    0.030_140_818,
    0.003_906_25,
    0.086_085_19,
    0.0625,
    0.152_587_89,
    1.0,
    0.392_798_15,
    -0.017_683_883,
    0.843_463_66,
    0.843_463_66,
    0.016_323_584,
    0.316_406_25,
    0.015_527_311,
    -0.015_157_614,
    0.014_805_111,
    0.030_140_818,
    0.014_147_106,
    0.0625,
    0.115_788_97,
    0.251_739_13,
    0.012_992_24,
    -0.012_732_395,
];

pub const HORN_TONE: SynthTone = SynthTone {
    frequency: HORN_FREQUENCY,
    partials: &HORN_PARTIALS,
    distortion: 0.8,
};

pub const COLLISION_TONE: SynthTone = SynthTone {
    frequency: 65.41,
    partials: &[1.0, 0.6, 0.35, 0.2, 0.1],
    distortion: 0.3,
};

/// How long the collision thud is held before its release.
const COLLISION_HOLD: Duration = Duration::from_millis(40);

/// Horn voice: attack while held, release on key-up.
#[derive(Clone, Debug)]
pub struct Horn {
    envelope: Envelope,
}

impl Default for Horn {
    fn default() -> Self {
        Self::new()
    }
}

impl Horn {
    pub fn new() -> Self {
        Self {
            envelope: Envelope::new(HORN_ENVELOPE),
        }
    }

    /// Returns false when a previous honk is still sounding.
    pub fn press(&mut self, now: Duration, mixer: &mut AudioMixer) -> bool {
        if self.envelope.is_sounding(now) {
            return false;
        }
        self.envelope.trigger_attack(now);
        mixer.start(Emitter::Horn);
        true
    }

    pub fn release(&mut self, now: Duration) {
        self.envelope.trigger_release(now);
    }

    pub fn tick(&mut self, now: Duration, mixer: &mut AudioMixer) {
        mixer.set_level(Emitter::Horn, self.envelope.level_at(now));
        if !self.envelope.is_sounding(now) {
            mixer.stop(Emitter::Horn);
        }
    }
}

/// Impact voice with a speed threshold and a cooldown.
#[derive(Clone, Debug)]
pub struct CollisionSound {
    envelope: Envelope,
    last_played: Option<Duration>,
}

impl Default for CollisionSound {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionSound {
    pub fn new() -> Self {
        Self {
            envelope: Envelope::new(COLLISION_ENVELOPE),
            last_played: None,
        }
    }

    /// Called for each contact start between the chassis and a non-floor collider.
    ///
    /// Returns whether a sound was triggered.
    pub fn on_contact(&mut self, now: Duration, chassis_speed: f32, mixer: &mut AudioMixer) -> bool {
        if chassis_speed <= COLLISION_MIN_SPEED {
            return false;
        }
        if let Some(last) = self.last_played {
            if now.saturating_sub(last) < COLLISION_SOUND_COOLDOWN {
                return false;
            }
        }

        self.last_played = Some(now);
        self.envelope.trigger_attack_release(now, COLLISION_HOLD);
        mixer.start(Emitter::Collision);
        true
    }

    pub fn tick(&mut self, now: Duration, mixer: &mut AudioMixer) {
        mixer.set_level(Emitter::Collision, self.envelope.level_at(now));
        if !self.envelope.is_sounding(now) {
            mixer.stop(Emitter::Collision);
        }
    }
}
