use rapier3d::parry::bounding_volume::{Aabb, BoundingVolume};

/// Area around an object that shows a prompt while the vehicle is inside it.
#[derive(Clone, Debug)]
pub struct InteractionZone {
    pub name: &'static str,
    pub bounds: Aabb,
    /// Prompt text; `**E**` marks a key.
    pub prompt: &'static str,
    shown: bool,
}

impl InteractionZone {
    /// Zone covering `object` grown by `margin` on every side.
    pub fn around(name: &'static str, object: &Aabb, margin: f32, prompt: &'static str) -> Self {
        Self {
            name,
            bounds: object.loosened(margin),
            prompt,
            shown: false,
        }
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Shows the prompt while `chassis` overlaps the zone, unless `suppressed`.
    pub fn update(&mut self, chassis: Option<&Aabb>, suppressed: bool) {
        self.shown = !suppressed && chassis.is_some_and(|c| c.intersects(&self.bounds));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra as na;

    fn unit_box(x: f32) -> Aabb {
        Aabb::new(na::Point3::new(x, 0.0, 0.0), na::Point3::new(x + 1.0, 1.0, 1.0))
    }

    #[test]
    fn margin_extends_the_reach() {
        let mut zone = InteractionZone::around("Radio", &unit_box(0.0), 0.3, "");
        zone.update(Some(&unit_box(1.2)), false);
        assert!(zone.is_shown());
        zone.update(Some(&unit_box(1.4)), false);
        assert!(!zone.is_shown());
    }

    #[test]
    fn editing_hides_every_prompt() {
        let mut zone = InteractionZone::around("Toolbox", &unit_box(0.0), 0.7, "");
        zone.update(Some(&unit_box(0.5)), true);
        assert!(!zone.is_shown());
        zone.update(None, false);
        assert!(!zone.is_shown());
    }
}
