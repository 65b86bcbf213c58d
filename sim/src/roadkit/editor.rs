//! Road-kit editor: one in-flight selection that can be created from the palette,
//! picked up from the grid, dragged, rotated, deleted and dropped.

use nalgebra as na;

use super::{CellCoord, Grid, Placement, TileKind, TileSet, destroy_tile, spawn_tile, yaw};
use crate::constants::TILE_ROTATION_STEP;
use crate::input::Key;
use crate::physics::PhysicsWorld;
use crate::scene::{NodeId, PickHit, SceneGraph, Tint};

/// Cursor the client should show while the pointer moves over the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorHint {
    #[default]
    Default,
    Pointer,
}

/// The tile being edited.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    /// Working copy of the placement; shares mesh and body with the origin cell.
    pub placement: Placement,
    /// Cell it was picked up from, `None` for palette tiles.
    pub origin: Option<CellCoord>,
}

pub struct GridEditor {
    grid: Grid,
    tiles: TileSet,
    selection: Option<Selection>,
    hovered: Option<NodeId>,
    open: bool,
}

/// Road-kit nodes are named `<Kind>_RoadKit[_n]`.
fn is_tile_node(scene: &SceneGraph, hit: &PickHit) -> bool {
    scene
        .get(hit.node)
        .is_some_and(|n| n.name_part(1) == Some("RoadKit"))
}

impl GridEditor {
    pub fn new(grid: Grid, tiles: TileSet) -> Self {
        Self {
            grid,
            tiles,
            selection: None,
            hovered: None,
            open: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open_editor(&mut self) {
        if !self.open {
            self.open = true;
            log::info!("road-kit editor opened");
        }
    }

    /// Drops any selection, clears the hover tint and closes. Safe to call twice.
    pub fn close_editor(&mut self, scene: &mut SceneGraph, physics: &mut PhysicsWorld) {
        if !self.open {
            return;
        }
        self.drop_tile(scene, physics);
        if self.selection.is_some() {
            self.delete_tile(scene, physics);
        }
        self.clear_hover(scene);
        self.open = false;
        log::info!("road-kit editor closed");
    }

    /// Starts placing a new tile over the first cell. Ignored while another tile
    /// is selected.
    pub fn create_tile(
        &mut self,
        kind: TileKind,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
    ) -> bool {
        if self.selection.is_some() {
            return false;
        }
        let Some(definition) = self.tiles.get(kind) else {
            log::warn!("no template for {kind:?}");
            return false;
        };

        let placement = match spawn_tile(definition, &self.grid.origin(), 0.0, scene, physics) {
            Ok(Some(placement)) => placement,
            Ok(None) => return false,
            Err(e) => {
                log::warn!("could not create {kind:?} tile: {e}");
                return false;
            }
        };
        scene.set_tint(placement.mesh, Some(Tint::Hover));
        self.selection = Some(Selection {
            placement,
            origin: None,
        });
        true
    }

    /// Picks up the tile under `hit`. Misses, non-tile nodes and empty cells are ignored.
    pub fn grab_tile(&mut self, hit: &PickHit, scene: &mut SceneGraph) -> bool {
        if self.selection.is_some() || !is_tile_node(scene, hit) {
            return false;
        }
        let Some(coord) = self.grid.get_cell(hit.point.x, hit.point.z) else {
            return false;
        };
        let Some(placement) = self.grid.occupant(coord).copied() else {
            return false;
        };

        scene.set_tint(placement.mesh, Some(Tint::Hover));
        self.selection = Some(Selection {
            placement,
            origin: Some(coord),
        });
        true
    }

    /// Snaps the selection over the cell nearest `point`, keeping its height.
    pub fn drag_tile(
        &mut self,
        point: &na::Point3<f32>,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
    ) {
        let Some(selection) = &self.selection else {
            return;
        };
        let Some(cell) = self.grid.get_cell(point.x, point.z).and_then(|c| self.grid.cell(c))
        else {
            return;
        };
        let target = *cell.position();

        let placement = selection.placement;
        if let Some(mut pose) = scene.world_transform(placement.mesh) {
            pose.translation.x = target.x;
            pose.translation.z = target.z;
            scene.set_transform(placement.mesh, pose);
        }
        if let Some(body) = placement.body {
            if let Some(mut pose) = physics.body_pose(body) {
                pose.translation.x = target.x;
                pose.translation.z = target.z;
                physics.set_body_pose(body, &pose);
            }
        }
    }

    /// Tints the tile under the pointer while nothing is selected.
    pub fn hover_tile(&mut self, hit: Option<&PickHit>, scene: &mut SceneGraph) -> CursorHint {
        if self.selection.is_some() {
            return CursorHint::Default;
        }

        let target = hit.filter(|h| is_tile_node(scene, h)).map(|h| h.node);
        if target != self.hovered {
            self.clear_hover(scene);
        }
        match target {
            Some(node) => {
                scene.set_tint(node, Some(Tint::Hover));
                self.hovered = Some(node);
                CursorHint::Pointer
            }
            None => CursorHint::Default,
        }
    }

    fn clear_hover(&mut self, scene: &mut SceneGraph) {
        if let Some(node) = self.hovered.take() {
            let selected = self.selection.is_some_and(|s| s.placement.mesh == node);
            if !selected {
                scene.set_tint(node, None);
            }
        }
    }

    /// Yaws the selection about the world up axis.
    pub fn rotate_tile(&mut self, amount: f32, scene: &mut SceneGraph, physics: &mut PhysicsWorld) {
        let Some(selection) = &mut self.selection else {
            return;
        };
        let placement = &mut selection.placement;
        let turn = yaw(amount);

        if let Some(mut pose) = scene.world_transform(placement.mesh) {
            pose.rotation = turn * pose.rotation;
            scene.set_transform(placement.mesh, pose);
        }
        if let Some(body) = placement.body {
            if let Some(mut pose) = physics.body_pose(body) {
                pose.rotation = turn * pose.rotation;
                physics.set_body_pose(body, &pose);
            }
        }
        placement.rotation += amount;
    }

    /// Destroys the selection. A tile picked up from the grid also leaves its cell.
    pub fn delete_tile(&mut self, scene: &mut SceneGraph, physics: &mut PhysicsWorld) {
        let Some(selection) = self.selection.take() else {
            return;
        };
        if let Some(cell) = selection.origin.and_then(|c| self.grid.cell_mut(c)) {
            cell.occupant = None;
        }
        if self.hovered == Some(selection.placement.mesh) {
            self.hovered = None;
        }
        destroy_tile(&selection.placement, scene, physics);
    }

    /// Commits the selection to the cell under it. Without a valid cell the
    /// selection stays in hand.
    pub fn drop_tile(&mut self, scene: &mut SceneGraph, physics: &mut PhysicsWorld) -> Option<CellCoord> {
        let selection = self.selection?;
        let placement = selection.placement;

        let position = scene.world_transform(placement.mesh)?.translation.vector;
        let target = self.grid.get_cell(position.x, position.z)?;

        if let Some(body) = placement.body {
            physics.settle_body(body);
        }
        scene.set_tint(placement.mesh, None);
        self.selection = None;
        if self.hovered == Some(placement.mesh) {
            self.hovered = None;
        }

        match selection.origin {
            Some(origin) if origin == target => {
                if let Some(cell) = self.grid.cell_mut(origin) {
                    cell.occupant = Some(placement);
                }
            }
            origin => {
                self.replace_cell(target, placement, scene, physics);
                if let Some(cell) = origin.and_then(|c| self.grid.cell_mut(c)) {
                    cell.occupant = None;
                }
            }
        }

        log::debug!("{:?} tile committed at {target:?}", placement.tile);
        Some(target)
    }

    fn replace_cell(
        &mut self,
        target: CellCoord,
        placement: Placement,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
    ) {
        let Some(cell) = self.grid.cell_mut(target) else {
            return;
        };
        if let Some(previous) = cell.occupant.replace(placement) {
            if previous.mesh != placement.mesh {
                destroy_tile(&previous, scene, physics);
            }
        }
    }

    /// Click: drop what is held, otherwise pick up what is under the pointer.
    pub fn pointer_click(
        &mut self,
        hit: Option<&PickHit>,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
    ) {
        if self.selection.is_some() {
            self.drop_tile(scene, physics);
        } else if let Some(hit) = hit {
            self.grab_tile(hit, scene);
        }
    }

    /// Move: drag what is held, otherwise hover.
    pub fn pointer_move(
        &mut self,
        hit: Option<&PickHit>,
        scene: &mut SceneGraph,
        physics: &mut PhysicsWorld,
    ) -> CursorHint {
        if self.selection.is_some() {
            if let Some(hit) = hit {
                self.drag_tile(&hit.point, scene, physics);
            }
            CursorHint::Default
        } else {
            self.hover_tile(hit, scene)
        }
    }

    /// A/D rotate the selection, Delete removes it.
    pub fn on_key(&mut self, key: Key, scene: &mut SceneGraph, physics: &mut PhysicsWorld) {
        match key {
            Key::A => self.rotate_tile(TILE_ROTATION_STEP, scene, physics),
            Key::D => self.rotate_tile(-TILE_ROTATION_STEP, scene, physics),
            Key::Delete => self.delete_tile(scene, physics),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{GRID_COLS, GRID_ROWS, TILE_SIZE};
    use crate::roadkit::layout::populate;
    use crate::roadkit::tile_rotation;
    use crate::test_support::tile_set;

    struct Fixture {
        editor: GridEditor,
        scene: SceneGraph,
        physics: PhysicsWorld,
    }

    fn fixture(layout: &[(usize, usize, TileKind, f32)]) -> Fixture {
        let mut scene = SceneGraph::new();
        let mut physics = PhysicsWorld::new();
        let tiles = tile_set(&mut scene);
        let mut grid = Grid::new(GRID_ROWS, GRID_COLS, TILE_SIZE, na::Point3::new(0.0, 0.032, 0.0));
        populate(&mut grid, &tiles, layout, &mut scene, &mut physics).unwrap();
        let mut editor = GridEditor::new(grid, tiles);
        editor.open_editor();
        Fixture {
            editor,
            scene,
            physics,
        }
    }

    fn hit(node: NodeId, x: f32, z: f32) -> PickHit {
        PickHit {
            node,
            point: na::Point3::new(x, 0.0, z),
        }
    }

    fn assert_cells_consistent(f: &Fixture) {
        for (_, cell) in f.editor.grid().iter() {
            if let Some(p) = cell.occupant {
                assert!(f.scene.contains(p.mesh));
                assert_eq!(p.tile.has_body(), p.body.is_some());
            }
        }
    }

    #[test]
    fn palette_tile_dragged_and_dropped_lands_in_its_cell() {
        let mut f = fixture(&[]);
        assert!(f.editor.create_tile(TileKind::Single, &mut f.scene, &mut f.physics));

        f.editor
            .drag_tile(&na::Point3::new(1.0, 0.0, -0.5), &mut f.scene, &mut f.physics);
        let committed = f.editor.drop_tile(&mut f.scene, &mut f.physics);
        assert_eq!(committed, Some(CellCoord::new(2, 1)));

        let cell = f.editor.grid().cell(CellCoord::new(2, 1)).unwrap();
        let placement = cell.occupant.unwrap();
        let translation = f.scene.world_transform(placement.mesh).unwrap().translation.vector;
        assert!((translation - cell.position().coords).norm() < 1.0e-6);
        assert!(f.editor.selection().is_none());
        assert_eq!(f.scene.get(placement.mesh).unwrap().tint, None);
        assert_eq!(f.editor.grid().occupied(), 1);
    }

    #[test]
    fn second_create_is_ignored_while_placing() {
        let mut f = fixture(&[]);
        assert!(f.editor.create_tile(TileKind::End, &mut f.scene, &mut f.physics));
        let before = *f.editor.selection().unwrap();
        let nodes = f.scene.len();

        assert!(!f.editor.create_tile(TileKind::Bridge, &mut f.scene, &mut f.physics));
        assert_eq!(*f.editor.selection().unwrap(), before);
        assert_eq!(f.scene.len(), nodes);
        assert_eq!(f.editor.grid().occupied(), 0);
    }

    #[test]
    fn dropping_back_on_the_origin_keeps_the_same_tile() {
        let mut f = fixture(&[(1, 2, TileKind::Bridge, 0.0)]);
        let coord = CellCoord::new(1, 2);
        let original = *f.editor.grid().occupant(coord).unwrap();

        assert!(f.editor.grab_tile(&hit(original.mesh, 0.55, -1.0), &mut f.scene));
        f.editor
            .drag_tile(&na::Point3::new(0.5, 0.0, -1.0), &mut f.scene, &mut f.physics);
        assert_eq!(f.editor.drop_tile(&mut f.scene, &mut f.physics), Some(coord));

        assert_eq!(*f.editor.grid().occupant(coord).unwrap(), original);
        assert!(f.scene.contains(original.mesh));
        assert!(f.physics.body_pose(original.body.unwrap()).is_some());
        assert_eq!(f.editor.grid().occupied(), 1);
    }

    #[test]
    fn moving_a_tile_clears_its_origin_and_replaces_the_target() {
        let mut f = fixture(&[
            (0, 2, TileKind::End, 0.0),
            (2, 2, TileKind::Bridge, 0.0),
        ]);
        let end = *f.editor.grid().occupant(CellCoord::new(0, 2)).unwrap();
        let bridge = *f.editor.grid().occupant(CellCoord::new(2, 2)).unwrap();

        assert!(f.editor.grab_tile(&hit(bridge.mesh, 1.0, -1.0), &mut f.scene));
        f.editor
            .drag_tile(&na::Point3::new(0.1, 0.0, -0.9), &mut f.scene, &mut f.physics);
        assert_eq!(
            f.editor.drop_tile(&mut f.scene, &mut f.physics),
            Some(CellCoord::new(0, 2))
        );

        assert!(f.editor.grid().occupant(CellCoord::new(2, 2)).is_none());
        assert_eq!(*f.editor.grid().occupant(CellCoord::new(0, 2)).unwrap(), bridge);
        assert!(!f.scene.contains(end.mesh));

        let body = f.physics.body_pose(bridge.body.unwrap()).unwrap();
        assert!((body.translation.x - 0.0).abs() < 1.0e-6);
        assert!((body.translation.z + 1.0).abs() < 1.0e-6);
        assert_cells_consistent(&f);
    }

    #[test]
    fn grabbing_an_empty_or_missing_cell_does_nothing() {
        let mut f = fixture(&[(0, 0, TileKind::Single, 0.0)]);
        let single = f.editor.grid().occupant(CellCoord::new(0, 0)).unwrap().mesh;

        assert!(!f.editor.grab_tile(&hit(single, 1.0, -1.0), &mut f.scene));
        assert!(!f.editor.grab_tile(&hit(single, 9.0, 9.0), &mut f.scene));
        assert!(f.editor.selection().is_none());
    }

    #[test]
    fn out_of_range_drag_leaves_the_selection_where_it_was() {
        let mut f = fixture(&[]);
        f.editor.create_tile(TileKind::Single, &mut f.scene, &mut f.physics);
        let mesh = f.editor.selection().unwrap().placement.mesh;
        f.editor
            .drag_tile(&na::Point3::new(0.5, 0.0, -0.5), &mut f.scene, &mut f.physics);
        let before = f.scene.world_transform(mesh).unwrap();

        f.editor
            .drag_tile(&na::Point3::new(-3.0, 0.0, 5.0), &mut f.scene, &mut f.physics);
        assert_eq!(f.scene.world_transform(mesh).unwrap(), before);
    }

    #[test]
    fn slant_rotation_composes_yaw_outside_pitch() {
        let mut f = fixture(&[]);
        f.editor.create_tile(TileKind::SlantHigh, &mut f.scene, &mut f.physics);
        f.editor.on_key(Key::A, &mut f.scene, &mut f.physics);
        f.editor.on_key(Key::A, &mut f.scene, &mut f.physics);
        f.editor.on_key(Key::D, &mut f.scene, &mut f.physics);

        let selection = *f.editor.selection().unwrap();
        assert!((selection.placement.rotation - TILE_ROTATION_STEP).abs() < 1.0e-6);

        let expected = tile_rotation(TileKind::SlantHigh, TILE_ROTATION_STEP);
        let mesh = f.scene.world_transform(selection.placement.mesh).unwrap();
        let body = f.physics.body_pose(selection.placement.body.unwrap()).unwrap();
        assert!(mesh.rotation.angle_to(&expected) < 1.0e-5);
        assert!(body.rotation.angle_to(&expected) < 1.0e-5);
    }

    #[test]
    fn delete_removes_a_grabbed_tile_from_its_cell() {
        let mut f = fixture(&[(3, 3, TileKind::SlantHigh, 0.0)]);
        let slant = *f.editor.grid().occupant(CellCoord::new(3, 3)).unwrap();

        f.editor.grab_tile(&hit(slant.mesh, 1.5, -1.5), &mut f.scene);
        f.editor.on_key(Key::Delete, &mut f.scene, &mut f.physics);

        assert!(f.editor.selection().is_none());
        assert_eq!(f.editor.grid().occupied(), 0);
        assert!(!f.scene.contains(slant.mesh));
        assert!(f.physics.body_pose(slant.body.unwrap()).is_none());
    }

    #[test]
    fn hover_moves_the_tint_between_tiles() {
        let mut f = fixture(&[
            (0, 0, TileKind::Single, 0.0),
            (0, 1, TileKind::Single, 0.0),
        ]);
        let a = f.editor.grid().occupant(CellCoord::new(0, 0)).unwrap().mesh;
        let b = f.editor.grid().occupant(CellCoord::new(0, 1)).unwrap().mesh;

        let cursor = f.editor.pointer_move(Some(&hit(a, 0.0, 0.0)), &mut f.scene, &mut f.physics);
        assert_eq!(cursor, CursorHint::Pointer);
        assert_eq!(f.scene.get(a).unwrap().tint, Some(Tint::Hover));

        f.editor.pointer_move(Some(&hit(b, 0.0, -0.5)), &mut f.scene, &mut f.physics);
        assert_eq!(f.scene.get(a).unwrap().tint, None);
        assert_eq!(f.scene.get(b).unwrap().tint, Some(Tint::Hover));

        let cursor = f.editor.pointer_move(None, &mut f.scene, &mut f.physics);
        assert_eq!(cursor, CursorHint::Default);
        assert_eq!(f.scene.get(b).unwrap().tint, None);
    }

    #[test]
    fn closing_drops_the_selection_and_is_idempotent() {
        let mut f = fixture(&[(0, 0, TileKind::Single, 0.0)]);
        let single = f.editor.grid().occupant(CellCoord::new(0, 0)).unwrap().mesh;
        f.editor.pointer_move(Some(&hit(single, 0.0, 0.0)), &mut f.scene, &mut f.physics);
        f.editor.pointer_click(Some(&hit(single, 0.0, 0.0)), &mut f.scene, &mut f.physics);
        f.editor.pointer_move(
            Some(&hit(single, 0.5, -0.5)),
            &mut f.scene,
            &mut f.physics,
        );

        f.editor.close_editor(&mut f.scene, &mut f.physics);
        assert!(!f.editor.is_open());
        assert!(f.editor.selection().is_none());
        assert!(f.editor.hovered().is_none());
        assert!(f.editor.grid().occupant(CellCoord::new(1, 1)).is_some());
        assert_eq!(f.scene.get(single).unwrap().tint, None);

        f.editor.close_editor(&mut f.scene, &mut f.physics);
        assert!(!f.editor.is_open());
        assert_eq!(f.editor.grid().occupied(), 1);
    }
}
