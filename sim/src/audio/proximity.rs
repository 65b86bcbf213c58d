use nalgebra::Point3;

use crate::constants::{PROXIMITY_MAX_DISTANCE, PROXIMITY_MIN_VOLUME};

/// Distance-attenuated gain for an emitter heard from `listener`.
///
/// `max(PROXIMITY_MIN_VOLUME, max_volume - distance / PROXIMITY_MAX_DISTANCE)`.
/// Recomputed from scratch every tick; there is no smoothing between ticks.
#[inline]
pub fn compute_gain(emitter: &Point3<f32>, listener: &Point3<f32>, max_volume: f32) -> f32 {
    let distance = nalgebra::distance(emitter, listener);
    (max_volume - distance / PROXIMITY_MAX_DISTANCE).max(PROXIMITY_MIN_VOLUME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Point3<f32> {
        Point3::new(x, 0.0, 0.0)
    }

    #[test]
    fn full_volume_at_listener() {
        assert_eq!(compute_gain(&at(0.0), &at(0.0), 0.8), 0.8);
    }

    #[test]
    fn one_unit_of_volume_per_max_distance() {
        let gain = compute_gain(&at(3.0), &at(0.0), 0.8);
        assert!((gain - (0.8_f32 - 1.0).max(-0.9)).abs() < 1.0e-6);
    }

    #[test]
    fn clamps_at_min_volume() {
        assert_eq!(compute_gain(&at(100.0), &at(0.0), 0.8), PROXIMITY_MIN_VOLUME);
        assert_eq!(compute_gain(&at(0.0), &at(0.0), -2.0), PROXIMITY_MIN_VOLUME);
    }

    #[test]
    fn gain_never_increases_with_distance() {
        let mut previous = f32::INFINITY;
        for step in 0..200 {
            let d = step as f32 * 0.05;
            let gain = compute_gain(&Point3::new(0.0, d, 0.0), &Point3::origin(), 0.8);
            assert!(gain <= previous, "gain rose at d={d}");
            assert!(gain >= PROXIMITY_MIN_VOLUME);
            previous = gain;
        }
    }

    #[test]
    fn distance_is_measured_in_3d() {
        let gain = compute_gain(&Point3::new(0.0, 1.5, 0.0), &Point3::new(0.0, 0.0, 0.0), 0.0);
        assert!((gain + 0.5).abs() < 1.0e-6);
    }
}
