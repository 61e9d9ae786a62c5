//! Wall adjacency resolution run once after a grid is populated.
//!
//! The pass is split in two: every wall's adjacency is computed against the
//! untouched grid first, and only then written back together with the derived
//! appearance. Writing while scanning would let a converted tile influence the
//! neighbours visited after it.

use strata_maze_core::{AdjacentWalls, Position, WallSide};

use crate::tiles::{Level, TileData};

/// Neighbour offsets as `(dx, dy)` and the side each one is recorded as.
///
/// The row above is labelled `Down` and the row below `Up`, following the
/// direction in which screen rows grow. Wall visuals are drawn against this
/// labelling, so it must not be "corrected".
const NEIGHBOURS: [(i32, i32, WallSide); 4] = [
    (0, -1, WallSide::Down),
    (0, 1, WallSide::Up),
    (-1, 0, WallSide::Right),
    (1, 0, WallSide::Left),
];

/// Computes which horizontal neighbours of the cell at `(x, y)` are walls.
///
/// Cells outside the level never count as walls.
#[must_use]
pub fn adjacency_of(level: &Level, x: i32, y: i32) -> AdjacentWalls {
    let mut adjacent = AdjacentWalls::EMPTY;
    for (dx, dy, side) in NEIGHBOURS {
        if level.get(x.saturating_add(dx), y.saturating_add(dy)).wall() {
            adjacent.insert(side);
        }
    }
    adjacent
}

pub(crate) fn resolve_adjacency(tile_data: &mut TileData) {
    let resolved: Vec<(Position, AdjacentWalls)> = tile_data
        .cells()
        .filter(|cell| cell.tile.wall())
        .map(|cell| {
            let adjacent = adjacency_of(cell.level, cell.position.x(), cell.position.y());
            (cell.position, adjacent)
        })
        .collect();

    for (position, adjacent) in resolved {
        if let Some(tile) = tile_data.get_mut(position) {
            tile.set_adjacent_walls(adjacent);
        }
    }
}
