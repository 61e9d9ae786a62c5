#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Strata Maze.

pub mod entity;
pub mod map;
pub mod rules;
pub mod tiles;
pub mod walls;

use log::{debug, info, warn};
use strata_maze_core::{Command, Direction, EntityId, Event, MoveRejection, Position};

pub use entity::{Entity, DEFAULT_PLAYER_TOKEN};
pub use map::Map;
pub use tiles::{GridCell, Level, LevelExtent, Tile, TileData};

/// Represents one game session: the map and the entities standing on it.
#[derive(Clone, Debug)]
pub struct World {
    map: Map,
    entities: Vec<Entity>,
}

impl World {
    /// Creates a session with an empty map and a default player.
    #[must_use]
    pub fn new() -> Self {
        Self::with_player(Entity::default())
    }

    /// Creates a session with an empty map and the provided player entity.
    #[must_use]
    pub fn with_player(player: Entity) -> Self {
        Self {
            map: Map::new(),
            entities: vec![player],
        }
    }

    fn entity_index(&self, entity: EntityId) -> Option<usize> {
        self.entities.iter().position(|candidate| candidate.id() == entity)
    }

    fn place_entity(&mut self, entity: EntityId, position: Position, out_events: &mut Vec<Event>) {
        let Some(index) = self.entity_index(entity) else {
            out_events.push(Event::PlacementRejected { entity, position });
            return;
        };
        if self.map.tile(position).is_out_of_bounds() {
            warn!("refusing to place {entity:?} outside the grid at {position:?}");
            out_events.push(Event::PlacementRejected { entity, position });
            return;
        }

        let previous = self.entities[index].position();
        let _ = self.map.remove_entity(previous, entity);
        let _ = self.map.add_entity(position, entity);
        self.entities[index].set_position(position);
        out_events.push(Event::EntityPlaced { entity, position });
    }

    fn move_entity(&mut self, entity: EntityId, direction: Direction, out_events: &mut Vec<Event>) {
        let Some(index) = self.entity_index(entity) else {
            out_events.push(Event::MoveRejected {
                entity,
                direction,
                reason: MoveRejection::UnknownEntity,
            });
            return;
        };

        let mover = &self.entities[index];
        let from = mover.position();
        match rules::check_move(&self.map, from, direction, mover.capabilities()) {
            Ok(to) => {
                let _ = self.map.remove_entity(from, entity);
                let _ = self.map.add_entity(to, entity);
                self.entities[index].set_position(to);
                debug!("{entity:?} moved {direction:?} from {from:?} to {to:?}");
                out_events.push(Event::EntityMoved {
                    entity,
                    from,
                    to,
                    direction,
                });
            }
            Err(reason) => {
                debug!("{entity:?} could not move {direction:?} from {from:?}: {reason:?}");
                out_events.push(Event::MoveRejected {
                    entity,
                    direction,
                    reason,
                });
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadMap { map } => match world.map.load(&map) {
            Ok(()) => {
                info!(
                    "loaded map `{}` with {} level(s)",
                    map.name,
                    map.tile_data.len()
                );
                out_events.push(Event::MapLoaded {
                    name: map.name,
                    levels: map.tile_data.len(),
                });
            }
            Err(reason) => {
                warn!("rejected map `{}`: {reason}", map.name);
                out_events.push(Event::MapRejected {
                    name: map.name,
                    reason,
                });
            }
        },
        Command::PlaceEntity { entity, position } => {
            world.place_entity(entity, position, out_events);
        }
        Command::MoveEntity { entity, direction } => {
            world.move_entity(entity, direction, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use strata_maze_core::{EntityId, Frame, TileSnapshot};

    use super::{Entity, Map, World};

    /// Provides read-only access to the loaded map.
    #[must_use]
    pub fn map(world: &World) -> &Map {
        &world.map
    }

    /// Provides read-only access to an entity.
    #[must_use]
    pub fn entity(world: &World, entity: EntityId) -> Option<&Entity> {
        world.entities.iter().find(|candidate| candidate.id() == entity)
    }

    /// Captures everything visible on the level the provided entity stands on.
    #[must_use]
    pub fn frame(world: &World, viewer: EntityId) -> Option<Frame> {
        let z = entity(world, viewer)?.z();
        let (columns, tiles) = world.map.level(z).map_or((0, Vec::new()), |level| {
            let tiles: Vec<TileSnapshot> = level
                .rows()
                .flat_map(|row| row.iter().map(|tile| tile.snapshot()))
                .collect();
            (level.extent().columns(), tiles)
        });
        let entities = world
            .entities
            .iter()
            .filter(|candidate| candidate.z() == z)
            .map(Entity::snapshot)
            .collect();
        Some(Frame::new(z, columns, tiles, entities))
    }
}
