//! Legality of a single step across the map.

use strata_maze_core::{Capabilities, Direction, MoveRejection, Position};

use crate::map::Map;

/// Decides whether an entity with the provided capabilities may step from
/// `from` in `direction`, returning the destination when it may.
///
/// Rules are checked in a fixed order and the first violation is reported:
/// leaving the grid, entering a boundary, entering a solid tile while
/// corporeal, then the floor, ceiling and suspension rules of vertical steps.
pub fn check_move(
    map: &Map,
    from: Position,
    direction: Direction,
    capabilities: Capabilities,
) -> Result<Position, MoveRejection> {
    let to = Map::rel(from, direction);
    let old_tile = map.tile(from);
    let new_tile = map.tile(to);
    let corporeal = !capabilities.incorporeal;

    if new_tile.is_out_of_bounds() {
        return Err(MoveRejection::OffGrid);
    }
    if new_tile.boundary() {
        return Err(MoveRejection::Boundary);
    }
    if new_tile.solid() && corporeal {
        return Err(MoveRejection::Solid);
    }
    match direction {
        Direction::VerticalUp => {
            if (old_tile.ceiling() || new_tile.floor()) && corporeal {
                return Err(MoveRejection::FloorOrCeiling);
            }
            if !(capabilities.flight || (old_tile.suspend() && new_tile.suspend())) {
                return Err(MoveRejection::NoSuspension);
            }
        }
        Direction::VerticalDown => {
            if (old_tile.floor() || new_tile.ceiling()) && corporeal {
                return Err(MoveRejection::FloorOrCeiling);
            }
        }
        Direction::Up | Direction::Down | Direction::Left | Direction::Right => {}
    }

    Ok(to)
}

/// Reports whether the step is legal without computing the destination.
#[must_use]
pub fn is_legal(
    map: &Map,
    from: Position,
    direction: Direction,
    capabilities: Capabilities,
) -> bool {
    check_move(map, from, direction, capabilities).is_ok()
}
