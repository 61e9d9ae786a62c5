//! Tile storage for every level of a map.

use strata_maze_core::{
    appearance_index, AdjacentWalls, EntityId, GridError, Position, TileRecord, TileSnapshot,
};

use crate::walls;

/// Tile returned for every lookup outside the stored grid.
///
/// It blocks every kind of movement and is never a wall, so edge checks and the
/// wall adjacency pass can treat it like any other tile.
static OUT_OF_BOUNDS: Tile = Tile {
    flags: TileRecord {
        wall: false,
        floor: true,
        ceiling: true,
        solid: true,
        boundary: true,
        suspend: false,
    },
    adjacent_walls: AdjacentWalls::EMPTY,
    appearance_index: 0,
    occupants: Vec::new(),
    out_of_bounds: true,
};

/// Physical properties of a single grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    flags: TileRecord,
    adjacent_walls: AdjacentWalls,
    appearance_index: u8,
    occupants: Vec<EntityId>,
    out_of_bounds: bool,
}

impl Tile {
    pub(crate) fn from_record(record: TileRecord) -> Self {
        Self {
            flags: record,
            adjacent_walls: AdjacentWalls::EMPTY,
            appearance_index: appearance_index(record.wall, AdjacentWalls::EMPTY),
            occupants: Vec::new(),
            out_of_bounds: false,
        }
    }

    /// The shared tile standing in for every cell outside the grid.
    #[must_use]
    pub fn out_of_bounds() -> &'static Tile {
        &OUT_OF_BOUNDS
    }

    /// Reports whether this is the shared out-of-bounds tile.
    #[must_use]
    pub const fn is_out_of_bounds(&self) -> bool {
        self.out_of_bounds
    }

    /// Raw physical flags of the tile.
    #[must_use]
    pub const fn flags(&self) -> TileRecord {
        self.flags
    }

    /// Whether the tile is drawn as a wall.
    #[must_use]
    pub const fn wall(&self) -> bool {
        self.flags.wall
    }

    /// Whether the tile has a floor.
    #[must_use]
    pub const fn floor(&self) -> bool {
        self.flags.floor
    }

    /// Whether the tile has a ceiling.
    #[must_use]
    pub const fn ceiling(&self) -> bool {
        self.flags.ceiling
    }

    /// Whether corporeal entities are kept out.
    #[must_use]
    pub const fn solid(&self) -> bool {
        self.flags.solid
    }

    /// Whether every entity is kept out.
    #[must_use]
    pub const fn boundary(&self) -> bool {
        self.flags.boundary
    }

    /// Whether the tile holds entities in place.
    #[must_use]
    pub const fn suspend(&self) -> bool {
        self.flags.suspend
    }

    /// Sides on which the tile touches other walls.
    #[must_use]
    pub const fn adjacent_walls(&self) -> AdjacentWalls {
        self.adjacent_walls
    }

    /// Visual variant derived from the wall flag and adjacency.
    #[must_use]
    pub const fn appearance_index(&self) -> u8 {
        self.appearance_index
    }

    /// Entities currently standing on the tile.
    #[must_use]
    pub fn occupants(&self) -> &[EntityId] {
        &self.occupants
    }

    /// Captures the presentation-relevant state of the tile.
    #[must_use]
    pub const fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            flags: self.flags,
            appearance_index: self.appearance_index,
        }
    }

    /// Replaces the adjacency set and recomputes the appearance.
    ///
    /// Non-wall tiles never carry adjacency, so the set is cleared for them.
    pub(crate) fn set_adjacent_walls(&mut self, adjacent_walls: AdjacentWalls) {
        self.adjacent_walls = if self.flags.wall {
            adjacent_walls
        } else {
            AdjacentWalls::EMPTY
        };
        self.appearance_index = appearance_index(self.flags.wall, self.adjacent_walls);
    }

    pub(crate) fn add_occupant(&mut self, entity: EntityId) {
        if !self.occupants.contains(&entity) {
            self.occupants.push(entity);
        }
    }

    pub(crate) fn remove_occupant(&mut self, entity: EntityId) -> bool {
        match self.occupants.iter().position(|occupant| *occupant == entity) {
            Some(index) => {
                let _ = self.occupants.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Column and row counts of one level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LevelExtent {
    columns: usize,
    rows: usize,
}

impl LevelExtent {
    /// Creates a new extent descriptor.
    #[must_use]
    pub const fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    /// Number of cells in every row.
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }
}

/// One z-level of the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Level {
    columns: usize,
    rows: Vec<Vec<Tile>>,
}

impl Level {
    /// Returns the tile at the provided column and row, or the out-of-bounds tile.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> &Tile {
        index(y)
            .and_then(|y| self.rows.get(y))
            .and_then(|row| index(x).and_then(|x| row.get(x)))
            .unwrap_or(&OUT_OF_BOUNDS)
    }

    /// Dimensions of the level.
    #[must_use]
    pub fn extent(&self) -> LevelExtent {
        LevelExtent::new(self.columns, self.rows.len())
    }

    /// Iterator over the rows of the level, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.rows.iter().map(Vec::as_slice)
    }

    fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        let row = self.rows.get_mut(index(y)?)?;
        row.get_mut(index(x)?)
    }
}

/// Real cell of the grid yielded by [`TileData::cells`].
#[derive(Clone, Copy, Debug)]
pub struct GridCell<'a> {
    /// Position of the cell.
    pub position: Position,
    /// Tile stored at the cell.
    pub tile: &'a Tile,
    /// Level containing the cell, for neighbour lookups.
    pub level: &'a Level,
}

/// Every tile of a map, indexed as level, row, column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileData {
    levels: Vec<Level>,
}

impl TileData {
    /// Builds the grid from raw records and resolves wall adjacency.
    ///
    /// Rejects levels whose rows differ in length.
    pub fn load(records: &[Vec<Vec<TileRecord>>]) -> Result<Self, GridError> {
        let mut levels = Vec::with_capacity(records.len());
        for (z, level_records) in records.iter().enumerate() {
            let columns = level_records.first().map_or(0, Vec::len);
            let mut rows: Vec<Vec<Tile>> = Vec::with_capacity(level_records.len());
            for (y, row_records) in level_records.iter().enumerate() {
                if row_records.len() != columns {
                    return Err(GridError::RaggedLevel {
                        z,
                        y,
                        expected: columns,
                        found: row_records.len(),
                    });
                }
                rows.push(
                    row_records
                        .iter()
                        .copied()
                        .map(Tile::from_record)
                        .collect(),
                );
            }
            levels.push(Level { columns, rows });
        }

        let mut tile_data = Self { levels };
        walls::resolve_adjacency(&mut tile_data);
        Ok(tile_data)
    }

    /// Returns the tile at the provided position, or the out-of-bounds tile.
    #[must_use]
    pub fn get(&self, position: Position) -> &Tile {
        self.level(position.z())
            .map_or(&OUT_OF_BOUNDS, |level| level.get(position.x(), position.y()))
    }

    /// Returns the provided level, if stored.
    #[must_use]
    pub fn level(&self, z: i32) -> Option<&Level> {
        index(z).and_then(|z| self.levels.get(z))
    }

    /// All stored levels, bottom first.
    #[must_use]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Iterates over every real cell exactly once, bottom level first.
    pub fn cells(&self) -> impl Iterator<Item = GridCell<'_>> {
        self.levels.iter().enumerate().flat_map(|(z, level)| {
            level.rows.iter().enumerate().flat_map(move |(y, row)| {
                row.iter().enumerate().map(move |(x, tile)| GridCell {
                    position: Position::new(coordinate(x), coordinate(y), coordinate(z)),
                    tile,
                    level,
                })
            })
        })
    }

    pub(crate) fn get_mut(&mut self, position: Position) -> Option<&mut Tile> {
        let level = self.levels.get_mut(index(position.z())?)?;
        level.get_mut(position.x(), position.y())
    }
}

fn index(coordinate: i32) -> Option<usize> {
    usize::try_from(coordinate).ok()
}

fn coordinate(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}
