use nalgebra as na;
use rapier3d::prelude::*;
use thiserror::Error;

use crate::geometry::{MeshGeometry, is_valid};

/// Collider family requested by a node name suffix (`Radio_Box`, `Lamp_Hull`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Box,
    Sphere,
    Hull,
    Cylinder,
    Mesh,
}

impl ShapeKind {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "Box" => Some(Self::Box),
            "Sphere" => Some(Self::Sphere),
            "Hull" => Some(Self::Hull),
            "Cylinder" => Some(Self::Cylinder),
            "Mesh" => Some(Self::Mesh),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("cannot fit a collider around empty geometry")]
    EmptyGeometry,
    #[error("convex hull of {0} points is degenerate")]
    DegenerateHull(usize),
    #[error("triangle mesh rejected: {0}")]
    TriMesh(String),
}

/// Supported collider shapes, expressed in the owning body's frame.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Cuboid centered on the body origin.
    Cuboid { half_extents: Vector<f32> },

    /// Ball centered on the body origin.
    Sphere { radius: f32 },

    /// Y-aligned cylinder centered on the body origin.
    CylinderY { radius: f32, half_height: f32 },

    /// Convex hull of a point cloud.
    ConvexHull { points: Vec<Point<f32>> },

    /// Static triangle mesh.
    TriMesh {
        vertices: Vec<Point<f32>>,
        indices: Vec<[u32; 3]>,
    },
}

impl ColliderShapeDef {
    /// Fits a shape of `kind` around `geometry`, which must already be relative to
    /// the body origin.
    ///
    /// Box, sphere and cylinder fits only take their extents from the geometry and
    /// stay centered on the origin.
    pub fn fit(kind: ShapeKind, geometry: &MeshGeometry) -> Result<Self, ShapeError> {
        let bounds = geometry.bounds();
        if geometry.is_empty() || !is_valid(&bounds) {
            return Err(ShapeError::EmptyGeometry);
        }
        let half = bounds.half_extents();

        Ok(match kind {
            ShapeKind::Box => Self::Cuboid { half_extents: half },
            ShapeKind::Sphere => Self::Sphere {
                radius: geometry.bounding_radius(&bounds.center()),
            },
            ShapeKind::Cylinder => Self::CylinderY {
                radius: half.x.max(half.z),
                half_height: half.y,
            },
            ShapeKind::Hull => Self::ConvexHull {
                points: geometry.positions.clone(),
            },
            ShapeKind::Mesh => Self::TriMesh {
                vertices: geometry.positions.clone(),
                indices: geometry.indices.clone(),
            },
        })
    }

    pub fn cuboid(half_extents: na::Vector3<f32>) -> Self {
        Self::Cuboid { half_extents }
    }
}

/// Build a Rapier collider for `def`.
///
/// The collider gets an identity local transform; the pose lives on the parent
/// rigid body.
pub fn collider_from_def(def: &ColliderShapeDef) -> Result<ColliderBuilder, ShapeError> {
    let builder = match def {
        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),

        ColliderShapeDef::ConvexHull { points } => ColliderBuilder::convex_hull(points)
            .ok_or(ShapeError::DegenerateHull(points.len()))?,

        ColliderShapeDef::TriMesh { vertices, indices } => {
            ColliderBuilder::trimesh(vertices.clone(), indices.clone())
                .map_err(|e| ShapeError::TriMesh(format!("{e:?}")))?
        }
    };

    Ok(builder)
}
