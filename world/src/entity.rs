//! Entities that occupy cells of the map.

use strata_maze_core::{Capabilities, EntityId, EntitySnapshot, Position};

/// Token drawn for the player when no other token is configured.
pub const DEFAULT_PLAYER_TOKEN: char = '@';

/// Positioned actor with movement capabilities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    position: Position,
    capabilities: Capabilities,
    token: char,
}

impl Entity {
    /// Creates an entity at the origin.
    #[must_use]
    pub const fn new(id: EntityId, capabilities: Capabilities, token: char) -> Self {
        Self {
            id,
            position: Position::new(0, 0, 0),
            capabilities,
            token,
        }
    }

    /// Creates the flightless, corporeal player entity.
    #[must_use]
    pub const fn player(token: char) -> Self {
        Self::new(
            EntityId::PLAYER,
            Capabilities {
                flight: false,
                incorporeal: false,
            },
            token,
        )
    }

    /// Identifier of the entity.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Cell the entity occupies.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Moves the entity to the provided cell without applying any rules.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Column of the entity.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.position.x()
    }

    /// Row of the entity.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.position.y()
    }

    /// Level of the entity.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.position.z()
    }

    /// Movement capabilities of the entity.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Whether the entity can fly.
    #[must_use]
    pub const fn flight(&self) -> bool {
        self.capabilities.flight
    }

    /// Whether the entity passes through solid matter.
    #[must_use]
    pub const fn incorporeal(&self) -> bool {
        self.capabilities.incorporeal
    }

    /// Captures the presentation-relevant state of the entity.
    #[must_use]
    pub const fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            position: self.position,
            token: self.token,
        }
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::player(DEFAULT_PLAYER_TOKEN)
    }
}
