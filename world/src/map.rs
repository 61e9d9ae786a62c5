//! Map ownership, relative positions and the falling predicate.

use strata_maze_core::{Direction, EntityId, GridError, MapData, Position};

use crate::tiles::{Level, LevelExtent, Tile, TileData};

/// Holds all map data: the tile grid, its name and the extent of each level.
#[derive(Clone, Debug, Default)]
pub struct Map {
    name: Option<String>,
    tile_data: TileData,
    extents: Vec<LevelExtent>,
}

impl Map {
    /// Creates an empty map with no levels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the map with the provided data.
    ///
    /// The grid is rebuilt from scratch; on error the previous contents are kept.
    pub fn load(&mut self, data: &MapData) -> Result<(), GridError> {
        let tile_data = TileData::load(&data.tile_data)?;
        self.extents = tile_data.levels().iter().map(Level::extent).collect();
        self.tile_data = tile_data;
        self.name = Some(data.name.clone());
        Ok(())
    }

    /// Name of the loaded map, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Tile grid backing the map.
    #[must_use]
    pub fn tile_data(&self) -> &TileData {
        &self.tile_data
    }

    /// Returns the tile at the provided position, or the out-of-bounds tile.
    #[must_use]
    pub fn tile(&self, position: Position) -> &Tile {
        self.tile_data.get(position)
    }

    /// Returns a single z-level of the map.
    #[must_use]
    pub fn level(&self, z: i32) -> Option<&Level> {
        self.tile_data.level(z)
    }

    /// Extent of every level, bottom first.
    #[must_use]
    pub fn extents(&self) -> &[LevelExtent] {
        &self.extents
    }

    /// Computes the position one step away in the provided direction.
    #[must_use]
    pub fn rel(position: Position, direction: Direction) -> Position {
        let (dx, dy, dz) = direction.delta();
        position.offset(dx, dy, dz)
    }

    /// Records the entity as standing on the tile at `position`.
    ///
    /// Returns `false` when the position is outside the grid.
    pub fn add_entity(&mut self, position: Position, entity: EntityId) -> bool {
        match self.tile_data.get_mut(position) {
            Some(tile) => {
                tile.add_occupant(entity);
                true
            }
            None => false,
        }
    }

    /// Removes the entity from the tile at `position`.
    ///
    /// Returns `false` when the entity was not standing there.
    pub fn remove_entity(&mut self, position: Position, entity: EntityId) -> bool {
        self.tile_data
            .get_mut(position)
            .map_or(false, |tile| tile.remove_occupant(entity))
    }

    /// Whether a flightless entity at `position` drops to the level below.
    #[must_use]
    pub fn fall(&self, position: Position) -> bool {
        let this_tile = self.tile(position);
        if this_tile.suspend() {
            return false;
        }
        let beneath = self.tile(Self::rel(position, Direction::VerticalDown));
        !(beneath.ceiling() || this_tile.floor())
    }
}
