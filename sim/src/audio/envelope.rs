use std::time::Duration;

/// Attack/decay/sustain/release timings, seconds except `sustain` (a level in `0..=1`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeShape {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

/// Horn voice: short attack, quick drop to a low sustain.
pub const HORN_ENVELOPE: EnvelopeShape = EnvelopeShape {
    attack: 0.05,
    decay: 0.2,
    sustain: 0.2,
    release: 0.1,
};

/// Collision thud: percussive, no sustain.
pub const COLLISION_ENVELOPE: EnvelopeShape = EnvelopeShape {
    attack: 0.005,
    decay: 0.08,
    sustain: 0.0,
    release: 0.05,
};

/// Piecewise-linear ADSR evaluated against simulation time.
#[derive(Clone, Copy, Debug)]
pub struct Envelope {
    shape: EnvelopeShape,
    attack_at: Option<Duration>,
    release_at: Option<Duration>,
}

impl Envelope {
    pub const fn new(shape: EnvelopeShape) -> Self {
        Self {
            shape,
            attack_at: None,
            release_at: None,
        }
    }

    pub fn shape(&self) -> EnvelopeShape {
        self.shape
    }

    pub fn trigger_attack(&mut self, now: Duration) {
        self.attack_at = Some(now);
        self.release_at = None;
    }

    /// Starts the release phase. Ignored when the voice isn't held.
    pub fn trigger_release(&mut self, now: Duration) {
        if self.attack_at.is_some() && self.release_at.is_none() {
            self.release_at = Some(now);
        }
    }

    /// Attack now and release automatically after `hold`.
    pub fn trigger_attack_release(&mut self, now: Duration, hold: Duration) {
        self.attack_at = Some(now);
        self.release_at = Some(now + hold);
    }

    /// Level in `0..=1` at `now`.
    pub fn level_at(&self, now: Duration) -> f32 {
        let Some(attack_at) = self.attack_at else {
            return 0.0;
        };
        if now < attack_at {
            return 0.0;
        }

        match self.release_at {
            Some(release_at) if now >= release_at => {
                let start = self.held_level(secs_between(attack_at, release_at));
                let t = secs_between(release_at, now);
                if self.shape.release <= 0.0 || t >= self.shape.release {
                    0.0
                } else {
                    start * (1.0 - t / self.shape.release)
                }
            }
            _ => self.held_level(secs_between(attack_at, now)),
        }
    }

    /// True from the attack until the release tail has fully decayed.
    ///
    /// This is the "non-zero level" test; it also covers the first instant of the
    /// attack, where the ramp itself still reads zero.
    pub fn is_sounding(&self, now: Duration) -> bool {
        let Some(attack_at) = self.attack_at else {
            return false;
        };
        if now < attack_at {
            return false;
        }
        match self.release_at {
            None => true,
            Some(release_at) => {
                now < release_at + Duration::from_secs_f32(self.shape.release.max(0.0))
            }
        }
    }

    fn held_level(&self, t: f32) -> f32 {
        let EnvelopeShape {
            attack,
            decay,
            sustain,
            ..
        } = self.shape;

        if t < attack {
            t / attack
        } else if t < attack + decay {
            1.0 - (1.0 - sustain) * (t - attack) / decay
        } else {
            sustain
        }
    }
}

#[inline]
fn secs_between(from: Duration, to: Duration) -> f32 {
    to.saturating_sub(from).as_secs_f32()
}
