use std::time::Duration;

use super::{AudioMixer, Emitter};
use crate::constants::{ENGINE_MAX_RATE, ENGINE_MIN_RATE, ENGINE_STOP_GRACE};

/// Engine loop controller.
///
/// Starts the loop on the first non-zero drive force and stops it only after the
/// input has stayed neutral for [`ENGINE_STOP_GRACE`], so key flutter doesn't
/// chop the loop.
#[derive(Clone, Debug, Default)]
pub struct EngineSound {
    running: bool,
    stop_deadline: Option<Duration>,
}

impl EngineSound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Feed the drive force chosen this tick.
    pub fn on_drive_force(&mut self, force: f32, now: Duration, mixer: &mut AudioMixer) {
        if force != 0.0 {
            self.stop_deadline = None;
            if !self.running {
                self.running = true;
                mixer.start(Emitter::Engine);
            }
        } else if self.running && self.stop_deadline.is_none() {
            self.stop_deadline = Some(now + ENGINE_STOP_GRACE);
        }
    }

    /// Runs every tick: expires the grace period and retunes the loop to `speed`.
    pub fn tick(&mut self, now: Duration, speed: f32, max_force: f32, mixer: &mut AudioMixer) {
        if let Some(deadline) = self.stop_deadline {
            if now >= deadline {
                self.stop_deadline = None;
                self.running = false;
                mixer.stop(Emitter::Engine);
            }
        }

        mixer.set_playback_rate(Emitter::Engine, engine_playback_rate(speed, max_force));
    }
}

/// Linear map of `speed` over `0..=max_force` onto the engine rate range, clamped.
pub fn engine_playback_rate(speed: f32, max_force: f32) -> f32 {
    if max_force <= 0.0 {
        return ENGINE_MIN_RATE;
    }
    let t = speed / max_force;
    (ENGINE_MIN_RATE + t * (ENGINE_MAX_RATE - ENGINE_MIN_RATE)).clamp(ENGINE_MIN_RATE, ENGINE_MAX_RATE)
}
