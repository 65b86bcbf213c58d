use nalgebra as na;
use rapier3d::prelude::RigidBodyHandle;

use super::TileKind;
use crate::constants::GRID_SURFACE_OFFSET;
use crate::scene::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A tile committed to a cell. Mesh, body and rotation only exist together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub tile: TileKind,
    pub mesh: NodeId,
    pub body: Option<RigidBodyHandle>,
    /// Accumulated yaw in radians.
    pub rotation: f32,
}

#[derive(Clone, Debug)]
pub struct GridCell {
    position: na::Point3<f32>,
    pub occupant: Option<Placement>,
}

impl GridCell {
    pub fn position(&self) -> &na::Point3<f32> {
        &self.position
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

/// Fixed `rows × cols` grid. Rows advance along +x, columns along -z.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    tile_size: f32,
    cells: Vec<GridCell>,
}

impl Grid {
    /// Builds an empty grid whose first cell sits under `start`.
    pub fn new(rows: usize, cols: usize, tile_size: f32, start: na::Point3<f32>) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(GridCell {
                    position: na::Point3::new(
                        start.x + row as f32 * tile_size,
                        start.y + GRID_SURFACE_OFFSET,
                        start.z - col as f32 * tile_size,
                    ),
                    occupant: None,
                });
            }
        }
        Self {
            rows,
            cols,
            tile_size,
            cells,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Position of cell (0, 0).
    pub fn origin(&self) -> na::Point3<f32> {
        self.cells
            .first()
            .map_or_else(na::Point3::origin, |c| c.position)
    }

    fn offset(&self, coord: CellCoord) -> Option<usize> {
        (coord.row < self.rows && coord.col < self.cols).then(|| coord.row * self.cols + coord.col)
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&GridCell> {
        self.offset(coord).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut GridCell> {
        self.offset(coord).map(|i| &mut self.cells[i])
    }

    pub fn occupant(&self, coord: CellCoord) -> Option<&Placement> {
        self.cell(coord).and_then(|c| c.occupant.as_ref())
    }

    /// Nearest cell to a world-space `(x, z)`, or `None` outside the grid.
    pub fn get_cell(&self, x: f32, z: f32) -> Option<CellCoord> {
        if !x.is_finite() || !z.is_finite() {
            return None;
        }
        let origin = self.origin();
        let row = ((x - origin.x) / self.tile_size).round();
        let col = ((origin.z - z) / self.tile_size).round();
        if row < 0.0 || col < 0.0 || row >= self.rows as f32 || col >= self.cols as f32 {
            return None;
        }
        Some(CellCoord::new(row as usize, col as usize))
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &GridCell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (CellCoord::new(i / self.cols, i % self.cols), c))
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_step_along_x_and_minus_z() {
        let grid = Grid::new(5, 5, 0.5, na::Point3::new(1.0, 0.032, 2.0));
        let cell = grid.cell(CellCoord::new(2, 3)).unwrap();
        assert_eq!(*cell.position(), na::Point3::new(2.0, 0.0, 0.5));
        assert_eq!(grid.origin(), na::Point3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn nearest_cell_is_rounded_not_clamped() {
        let grid = Grid::new(5, 5, 0.5, na::Point3::origin());
        assert_eq!(grid.get_cell(1.0, -0.5), Some(CellCoord::new(2, 1)));
        assert_eq!(grid.get_cell(0.2, -0.3), Some(CellCoord::new(0, 1)));
        assert_eq!(grid.get_cell(2.0, -2.0), Some(CellCoord::new(4, 4)));
        assert_eq!(grid.get_cell(2.3, 0.0), None);
        assert_eq!(grid.get_cell(-0.3, 0.0), None);
        assert_eq!(grid.get_cell(0.0, 0.3), None);
        assert!(grid.cell(CellCoord::new(5, 0)).is_none());
        assert!(grid.cell(CellCoord::new(0, 5)).is_none());
    }

    #[test]
    fn non_finite_points_have_no_cell() {
        let grid = Grid::new(5, 5, 0.5, na::Point3::origin());
        assert_eq!(grid.get_cell(f32::NAN, -0.5), None);
        assert_eq!(grid.get_cell(1.0, f32::NAN), None);
        assert_eq!(grid.get_cell(f32::INFINITY, -0.5), None);
    }
}
