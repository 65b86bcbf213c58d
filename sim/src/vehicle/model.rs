//! Splits a vehicle model into chassis, wheels and decoration by node name.
//!
//! Names follow `<Side>_<Axle>_Wheel[_n]` for wheels and `Car_Body[_n]` for the
//! chassis; anything else rides along as decoration.

use nalgebra as na;

use super::VehicleError;
use crate::asset::SceneAsset;
use crate::geometry::name_parts;

/// Wheel slot. The discriminant is the index into [`super::Vehicle::wheels`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WheelPosition {
    LeftFront = 0,
    RightFront = 1,
    LeftBack = 2,
    RightBack = 3,
}

impl WheelPosition {
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::LeftFront,
        WheelPosition::RightFront,
        WheelPosition::LeftBack,
        WheelPosition::RightBack,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "L_Front" => Some(Self::LeftFront),
            "R_Front" => Some(Self::RightFront),
            "L_Back" => Some(Self::LeftBack),
            "R_Back" => Some(Self::RightBack),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::LeftFront => "L_Front",
            Self::RightFront => "R_Front",
            Self::LeftBack => "L_Back",
            Self::RightBack => "R_Back",
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_front(self) -> bool {
        matches!(self, Self::LeftFront | Self::RightFront)
    }
}

#[derive(Clone, Debug)]
pub struct PartModel {
    /// Bounds center of the leading part, in model space.
    pub center: na::Point3<f32>,
    /// Bounds size of the leading part.
    pub size: na::Vector3<f32>,
    /// Asset node indices drawn by this part.
    pub members: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct VehicleModel {
    pub chassis: PartModel,
    /// Indexed by [`WheelPosition`].
    pub wheels: [PartModel; 4],
    /// Decoration groups, each parented to the chassis.
    pub deco: Vec<Vec<usize>>,
}

pub fn classify(asset: &SceneAsset) -> Result<VehicleModel, VehicleError> {
    let mut chassis: Option<PartModel> = None;
    let mut wheels: [Option<PartModel>; 4] = Default::default();
    let mut deco = Vec::new();

    for group in asset.groups() {
        let parts = name_parts(group.key);
        let tag = match parts.as_slice() {
            [first, second, ..] => format!("{first}_{second}"),
            _ => group.key.to_string(),
        };

        let bounds = asset.bounds(group.leader);
        let part = PartModel {
            center: bounds.center(),
            size: bounds.extents(),
            members: group.members.clone(),
        };

        if parts.contains(&"Wheel") {
            match WheelPosition::from_tag(&tag) {
                Some(position) if wheels[position.index()].is_none() => {
                    wheels[position.index()] = Some(part);
                }
                Some(position) => {
                    log::warn!("duplicate {position:?} wheel `{}` ignored", group.key);
                }
                None => {
                    log::warn!("wheel `{}` has no known position, kept as decoration", group.key);
                    deco.push(part.members);
                }
            }
        } else if tag == "Car_Body" {
            if chassis.is_none() {
                chassis = Some(part);
            } else {
                log::warn!("duplicate chassis `{}` ignored", group.key);
            }
        } else {
            deco.push(part.members);
        }
    }

    let chassis = chassis.ok_or(VehicleError::MissingChassis)?;
    let [lf, rf, lb, rb] = wheels;
    let wheels = [
        lf.ok_or(VehicleError::MissingWheel(WheelPosition::LeftFront))?,
        rf.ok_or(VehicleError::MissingWheel(WheelPosition::RightFront))?,
        lb.ok_or(VehicleError::MissingWheel(WheelPosition::LeftBack))?,
        rb.ok_or(VehicleError::MissingWheel(WheelPosition::RightBack))?,
    ];

    Ok(VehicleModel {
        chassis,
        wheels,
        deco,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{vehicle_asset, vehicle_asset_without};

    #[test]
    fn wheel_slots_ignore_traversal_order() {
        let forward = classify(&vehicle_asset(false)).unwrap();
        let reversed = classify(&vehicle_asset(true)).unwrap();

        for model in [&forward, &reversed] {
            let lf = model.wheels[WheelPosition::LeftFront.index()].center;
            let rf = model.wheels[WheelPosition::RightFront.index()].center;
            let lb = model.wheels[WheelPosition::LeftBack.index()].center;
            assert!(lf.x > rf.x, "left wheels sit on +x");
            assert!(lf.z > lb.z, "front wheels sit on +z");
        }
        for i in 0..4 {
            assert_eq!(forward.wheels[i].center, reversed.wheels[i].center);
        }
    }

    #[test]
    fn numbered_body_parts_join_the_chassis() {
        let model = classify(&vehicle_asset(false)).unwrap();
        assert_eq!(model.chassis.members.len(), 2);
        assert_eq!(model.deco.len(), 1);
        assert!((model.wheels[0].size.y / 2.0 - 0.06).abs() < 1.0e-6);
    }

    #[test]
    fn missing_parts_are_load_errors() {
        assert!(matches!(
            classify(&vehicle_asset_without("R_Back_Wheel")),
            Err(VehicleError::MissingWheel(WheelPosition::RightBack))
        ));
        assert!(matches!(
            classify(&vehicle_asset_without("Car_Body")),
            Err(VehicleError::MissingChassis)
        ));
    }
}
