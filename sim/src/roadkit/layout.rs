//! Track the living room starts with.

use std::f32::consts::{FRAC_PI_2, PI};

use super::{CellCoord, Grid, TileKind, TileSet, spawn_tile};
use crate::physics::{PhysicsWorld, ShapeError};
use crate::scene::SceneGraph;

/// `(row, col, kind, yaw)` for every pre-placed tile.
pub const DEFAULT_LAYOUT: [(usize, usize, TileKind, f32); 15] = [
    (0, 2, TileKind::End, 0.0),
    (1, 0, TileKind::BendSidewalk, PI + FRAC_PI_2),
    (1, 1, TileKind::SlantHigh, PI),
    (1, 2, TileKind::Bridge, 0.0),
    (1, 3, TileKind::SlantHigh, 0.0),
    (1, 4, TileKind::BendSidewalk, PI),
    (2, 0, TileKind::BendSidewalk, 0.0),
    (2, 1, TileKind::Single, 0.0),
    (2, 2, TileKind::Intersection, 0.0),
    (2, 4, TileKind::Single, FRAC_PI_2),
    (3, 2, TileKind::Single, FRAC_PI_2),
    (3, 4, TileKind::Single, FRAC_PI_2),
    (4, 2, TileKind::BendSquare, 0.0),
    (4, 3, TileKind::Single, 0.0),
    (4, 4, TileKind::BendSquare, FRAC_PI_2),
];

/// Fills `grid` from `layout`. Entries without a template, or outside the grid,
/// are skipped.
pub fn populate(
    grid: &mut Grid,
    tiles: &TileSet,
    layout: &[(usize, usize, TileKind, f32)],
    scene: &mut SceneGraph,
    physics: &mut PhysicsWorld,
) -> Result<usize, ShapeError> {
    let mut placed = 0;
    for &(row, col, kind, rotation) in layout {
        let coord = CellCoord::new(row, col);
        let Some(definition) = tiles.get(kind) else {
            log::warn!("layout wants a {kind:?} at {coord:?} but the model has no template");
            continue;
        };
        let Some(cell) = grid.cell(coord) else {
            log::warn!("layout cell {coord:?} is outside the grid");
            continue;
        };
        let position = *cell.position();

        if let Some(placement) = spawn_tile(definition, &position, rotation, scene, physics)? {
            if let Some(cell) = grid.cell_mut(coord) {
                cell.occupant = Some(placement);
                placed += 1;
            }
        }
    }
    log::debug!("placed {placed} road-kit tiles");
    Ok(placed)
}
