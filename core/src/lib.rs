#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Strata Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the tick and lifecycle systems. Systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point and broadcasts [`Event`] values in
//! response. The ports at the bottom of this file ([`MapSource`],
//! [`InputSource`], [`RenderSink`] and [`Clock`]) are the only way the
//! simulation talks to the outside world.

use std::{error::Error as StdError, io, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Strata Maze.";

/// Location of a single grid cell expressed as column, row and level.
///
/// Coordinates are signed so that a step off the low edge of a level yields a
/// negative coordinate that the grid resolves to its out-of-bounds tile.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: i32,
    y: i32,
    z: i32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Zero-based column of the position.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the position. Rows grow downwards on screen.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Zero-based level of the position. Levels grow upwards.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns a copy of the position shifted by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }
}

/// One-step movement directions understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
    /// Movement to the level above.
    VerticalUp,
    /// Movement to the level below.
    VerticalDown,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::VerticalUp,
        Direction::VerticalDown,
    ];

    /// Column, row and level deltas applied by a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32, i32) {
        match self {
            Self::Up => (0, -1, 0),
            Self::Down => (0, 1, 0),
            Self::Left => (-1, 0, 0),
            Self::Right => (1, 0, 0),
            Self::VerticalUp => (0, 0, 1),
            Self::VerticalDown => (0, 0, -1),
        }
    }

    /// Reports whether the direction changes level.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::VerticalUp | Self::VerticalDown)
    }
}

/// Side of a wall tile on which another wall may sit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallSide {
    /// Neighbour labelled "up" by the adjacency pass.
    Up,
    /// Neighbour labelled "down" by the adjacency pass.
    Down,
    /// Neighbour labelled "left" by the adjacency pass.
    Left,
    /// Neighbour labelled "right" by the adjacency pass.
    Right,
}

impl WallSide {
    /// Every side in bit order.
    pub const ALL: [WallSide; 4] = [WallSide::Up, WallSide::Down, WallSide::Left, WallSide::Right];

    /// Side facing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::Up => 0b0001,
            Self::Down => 0b0010,
            Self::Left => 0b0100,
            Self::Right => 0b1000,
        }
    }
}

/// Set of sides on which a wall tile touches other walls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AdjacentWalls(u8);

impl AdjacentWalls {
    /// Set with no sides.
    pub const EMPTY: Self = Self(0);

    /// Rebuilds a set from its four-bit encoding, ignoring higher bits.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    /// Four-bit encoding of the set.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Adds a side to the set.
    pub fn insert(&mut self, side: WallSide) {
        self.0 |= side.bit();
    }

    /// Reports whether the side belongs to the set.
    #[must_use]
    pub const fn contains(&self, side: WallSide) -> bool {
        self.0 & side.bit() != 0
    }

    /// Number of sides in the set.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    /// Reports whether no side is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates over the sides contained in the set.
    pub fn iter(&self) -> impl Iterator<Item = WallSide> + '_ {
        WallSide::ALL
            .into_iter()
            .filter(move |side| self.contains(*side))
    }
}

/// Number of distinct appearance indices a tile may carry.
pub const APPEARANCE_COUNT: u8 = 17;

/// Derives the visual variant of a tile from its wall flag and adjacency.
///
/// Non-wall tiles always use index `0`. Wall tiles use `1 + bits`, giving one
/// variant per adjacency combination (isolated, end pieces, straights,
/// corners, junctions and the four-way cross).
#[must_use]
pub const fn appearance_index(wall: bool, adjacent: AdjacentWalls) -> u8 {
    if wall {
        1 + adjacent.bits()
    } else {
        0
    }
}

/// Raw per-cell record supplied by a map source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TileRecord {
    /// Whether the cell is drawn as a wall.
    pub wall: bool,
    /// Whether the cell has a floor that blocks movement downwards out of it.
    pub floor: bool,
    /// Whether the cell has a ceiling that blocks movement upwards out of it.
    pub ceiling: bool,
    /// Whether corporeal entities are unable to enter the cell.
    pub solid: bool,
    /// Whether no entity may ever enter the cell.
    pub boundary: bool,
    /// Whether the cell holds entities in place, like a ladder or rope.
    pub suspend: bool,
}

/// Logical shape of a map handed over by a [`MapSource`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    /// Human readable map name.
    pub name: String,
    /// Cell the controlled entity starts on.
    pub start_pos: Position,
    /// Cell records indexed as `tile_data[z][y][x]`.
    pub tile_data: Vec<Vec<Vec<TileRecord>>>,
}

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Identifier reserved for the player-controlled entity.
    pub const PLAYER: Self = Self(0);

    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Movement capabilities carried by an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Whether the entity may rise between levels without a suspension.
    pub flight: bool,
    /// Whether the entity may pass through solid tiles, floors and ceilings.
    pub incorporeal: bool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the current map with the provided data.
    LoadMap {
        /// Map to load.
        map: MapData,
    },
    /// Places an entity on a cell without applying movement rules.
    PlaceEntity {
        /// Entity to place.
        entity: EntityId,
        /// Cell the entity should occupy.
        position: Position,
    },
    /// Requests that an entity advance a single step in the specified direction.
    MoveEntity {
        /// Entity attempting to move.
        entity: EntityId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a map replaced the previous one.
    MapLoaded {
        /// Name of the loaded map.
        name: String,
        /// Number of z-levels contained in the map.
        levels: usize,
    },
    /// Reports that a map could not be loaded. The previous map is kept.
    MapRejected {
        /// Name of the rejected map.
        name: String,
        /// Reason the tile data was refused.
        reason: GridError,
    },
    /// Confirms that an entity was placed on a cell.
    EntityPlaced {
        /// Entity that was placed.
        entity: EntityId,
        /// Cell the entity now occupies.
        position: Position,
    },
    /// Reports that an entity could not be placed.
    PlacementRejected {
        /// Entity that was not placed.
        entity: EntityId,
        /// Requested cell.
        position: Position,
    },
    /// Confirms that an entity moved between two cells.
    EntityMoved {
        /// Entity that moved.
        entity: EntityId,
        /// Cell the entity occupied before moving.
        from: Position,
        /// Cell the entity occupies after moving.
        to: Position,
        /// Direction of the step.
        direction: Direction,
    },
    /// Reports that a requested step was illegal.
    MoveRejected {
        /// Entity that attempted to move.
        entity: EntityId,
        /// Direction of the attempted step.
        direction: Direction,
        /// First rule the step violated.
        reason: MoveRejection,
    },
}

/// Rules a step may violate, in the order they are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveRejection {
    /// The destination lies outside the stored grid.
    OffGrid,
    /// The destination is an impassable boundary tile.
    Boundary,
    /// The destination is solid and the entity is corporeal.
    Solid,
    /// A floor or ceiling separates the two levels and the entity is corporeal.
    FloorOrCeiling,
    /// The entity cannot fly and the two cells do not both offer a suspension.
    NoSuspension,
    /// The entity is not part of the world.
    UnknownEntity,
}

/// Reasons raw tile data may be refused by the grid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// A row within a level differs in length from the first row of that level.
    #[error("row {y} of level {z} has {found} cells but the level is {expected} cells wide")]
    RaggedLevel {
        /// Level containing the row.
        z: usize,
        /// Offending row.
        y: usize,
        /// Width of the first row of the level.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
}

/// Control transfers raised by input handling and consumed by the lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Terminate the program.
    Close,
    /// Leave the current map for the main menu.
    QuitToMenu,
    /// Rebuild the session from scratch.
    Reset,
    /// Pick another map without resetting the session.
    ReturnToMapSelect,
}

/// Which phase an input source is currently serving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// Map selection menu.
    MapSelect,
    /// Interactive play.
    Play,
}

/// One classified input event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Movement request in the provided direction.
    Move(Direction),
    /// Nothing happened during the wait.
    Idle,
    /// Lifecycle control transfer.
    Signal(Signal),
    /// Raw text entered while choosing from a menu.
    MenuSelection(String),
}

/// Immutable representation of a single tile used for presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileSnapshot {
    /// Physical flags of the tile.
    pub flags: TileRecord,
    /// Derived visual variant, see [`appearance_index`].
    pub appearance_index: u8,
}

/// Immutable representation of a single entity used for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntitySnapshot {
    /// Identifier of the entity.
    pub id: EntityId,
    /// Cell the entity occupies.
    pub position: Position,
    /// Visual token used to draw the entity.
    pub token: char,
}

/// Everything visible on one z-level at the end of a tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    z: i32,
    columns: usize,
    tiles: Vec<TileSnapshot>,
    entities: Vec<EntitySnapshot>,
}

impl Frame {
    /// Creates a frame from row-major tiles and the entities on the level.
    #[must_use]
    pub fn new(
        z: i32,
        columns: usize,
        tiles: Vec<TileSnapshot>,
        mut entities: Vec<EntitySnapshot>,
    ) -> Self {
        entities.sort_by_key(|entity| entity.id);
        Self {
            z,
            columns,
            tiles,
            entities,
        }
    }

    /// Level shown by the frame.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Column and row counts of the level.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        if self.columns == 0 {
            (0, 0)
        } else {
            (self.columns, self.tiles.len() / self.columns)
        }
    }

    /// Iterator over the rows of the level, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[TileSnapshot]> {
        self.tiles.chunks(self.columns.max(1))
    }

    /// Entities standing on the level in deterministic order.
    #[must_use]
    pub fn entities(&self) -> &[EntitySnapshot] {
        &self.entities
    }

    /// Returns the entity drawn on the provided cell, if any.
    #[must_use]
    pub fn entity_at(&self, x: i32, y: i32) -> Option<&EntitySnapshot> {
        self.entities
            .iter()
            .find(|entity| entity.position.x() == x && entity.position.y() == y)
    }
}

/// Single row of the map selection menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    /// Code the player types to select the entry.
    pub code: String,
    /// Map name.
    pub name: String,
}

/// Map selection menu handed to a [`RenderSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapMenu {
    /// Title shown above the table.
    pub title: &'static str,
    /// Column headers.
    pub headers: [&'static str; 2],
    /// Selectable entries in presentation order.
    pub entries: Vec<MenuEntry>,
    /// Prompt shown below the table.
    pub prompt: &'static str,
}

/// Fatal errors signalling a broken engine invariant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProgrammingError {
    /// An input event the tick engine has no handling for.
    #[error("unexpected input {0:?} reached the tick engine")]
    UnexpectedInput(InputEvent),
    /// A forced move failed the movement rules.
    #[error("forced move {direction:?} was rejected: {reason:?}")]
    ForcedMoveRejected {
        /// Direction of the forced move.
        direction: Direction,
        /// Rule the forced move violated.
        reason: MoveRejection,
    },
    /// The world no longer contains the controlled entity.
    #[error("entity {0:?} is not part of the world")]
    MissingEntity(EntityId),
}

/// Failures reported by a [`MapSource`].
#[derive(Debug, Error)]
pub enum MapSourceError {
    /// No map with the requested name exists.
    #[error("no map named `{name}`")]
    NotFound {
        /// Requested map name.
        name: String,
    },
    /// The underlying storage could not be read or decoded.
    #[error("map storage unavailable: {context}")]
    Unavailable {
        /// What was being attempted.
        context: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

/// Provider of the maps a player may choose from.
pub trait MapSource {
    /// Names of every available map in presentation order.
    fn list_map_names(&mut self) -> Result<Vec<String>, MapSourceError>;

    /// Loads the map with the provided name.
    fn get_map(&mut self, name: &str) -> Result<MapData, MapSourceError>;
}

/// Blocking supplier of classified input events.
pub trait InputSource {
    /// Informs the source which phase it is serving.
    fn set_mode(&mut self, mode: InputMode);

    /// Blocks until the next classified event is available.
    fn next_event(&mut self) -> InputEvent;

    /// Notifies the source that the last event could not be used.
    fn invalid_input(&mut self);
}

/// Consumer of presentation requests.
pub trait RenderSink {
    /// Presents the map selection menu.
    fn present_menu(&mut self, menu: &MapMenu) -> io::Result<()>;

    /// Presents the state of one level.
    fn present_frame(&mut self, frame: &Frame) -> io::Result<()>;
}

/// Source of the pacing delay that precedes each tick.
pub trait Clock {
    /// Suspends the caller for the provided duration.
    fn pause(&mut self, duration: Duration);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn direction_deltas_follow_screen_rows_and_rising_levels() {
        let origin = Position::new(3, 3, 1);
        let moved: Vec<Position> = Direction::ALL
            .iter()
            .map(|direction| {
                let (dx, dy, dz) = direction.delta();
                origin.offset(dx, dy, dz)
            })
            .collect();

        assert_eq!(
            moved,
            vec![
                Position::new(3, 2, 1),
                Position::new(3, 4, 1),
                Position::new(2, 3, 1),
                Position::new(4, 3, 1),
                Position::new(3, 3, 2),
                Position::new(3, 3, 0),
            ]
        );
    }

    #[test]
    fn only_level_changes_are_vertical() {
        let vertical: Vec<_> = Direction::ALL
            .into_iter()
            .filter(|direction| direction.is_vertical())
            .collect();
        assert_eq!(vertical, vec![Direction::VerticalUp, Direction::VerticalDown]);
    }

    #[test]
    fn adjacency_set_tracks_each_side_once() {
        let mut walls = AdjacentWalls::EMPTY;
        walls.insert(WallSide::Left);
        walls.insert(WallSide::Left);
        walls.insert(WallSide::Down);

        assert_eq!(walls.len(), 2);
        assert!(walls.contains(WallSide::Left));
        assert!(walls.contains(WallSide::Down));
        assert!(!walls.contains(WallSide::Up));
        assert_eq!(
            walls.iter().collect::<Vec<_>>(),
            vec![WallSide::Down, WallSide::Left]
        );
    }

    #[test]
    fn appearance_index_is_distinct_for_every_wall_combination() {
        let mut seen: Vec<u8> = (0..16)
            .map(|bits| appearance_index(true, AdjacentWalls::from_bits(bits)))
            .collect();
        seen.sort_unstable();
        seen.dedup();

        assert_eq!(seen.len(), 16);
        assert!(seen.iter().all(|index| *index > 0 && *index < APPEARANCE_COUNT));
        assert_eq!(appearance_index(false, AdjacentWalls::EMPTY), 0);
    }

    #[test]
    fn appearance_index_is_idempotent() {
        for bits in 0..16 {
            let walls = AdjacentWalls::from_bits(bits);
            assert_eq!(appearance_index(true, walls), appearance_index(true, walls));
        }
    }

    #[test]
    fn tile_record_flags_default_to_false_when_absent() {
        let record: TileRecord = serde_json::from_str(r#"{ "wall": true }"#).expect("record");
        assert_eq!(
            record,
            TileRecord {
                wall: true,
                ..TileRecord::default()
            }
        );
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(4, -1, 2));
    }

    #[test]
    fn frame_reports_rows_and_entities() {
        let tiles = vec![TileSnapshot::default(); 6];
        let frame = Frame::new(
            0,
            3,
            tiles,
            vec![EntitySnapshot {
                id: EntityId::PLAYER,
                position: Position::new(2, 1, 0),
                token: '@',
            }],
        );

        assert_eq!(frame.dimensions(), (3, 2));
        assert_eq!(frame.rows().count(), 2);
        assert!(frame.entity_at(2, 1).is_some());
        assert!(frame.entity_at(1, 1).is_none());
    }

    #[test]
    fn empty_frame_has_no_rows() {
        let frame = Frame::default();
        assert_eq!(frame.dimensions(), (0, 0));
        assert_eq!(frame.rows().count(), 0);
    }
}
