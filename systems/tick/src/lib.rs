#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick engine that turns input into world commands and chains falls.
//!
//! Every tick either consumes one classified input event or, while an entity
//! is falling, replays a forced downward step without touching the input
//! source. Forced steps are paced faster than interactive ones so that falls
//! animate quickly.

use std::{thread, time::Duration};

use log::debug;
use strata_maze_core::{
    Clock, Command, Direction, EntityId, Event, InputEvent, InputSource, MoveRejection,
    ProgrammingError, Signal,
};
use strata_maze_world::{self as world, query, World};

/// Delays applied before each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    input_delay: Duration,
    forced_move_delay: Duration,
}

impl Pacing {
    /// Delay before waiting for input when nothing else is configured.
    pub const DEFAULT_INPUT_DELAY: Duration = Duration::from_millis(120);

    /// Delay before a forced move when nothing else is configured.
    pub const DEFAULT_FORCED_MOVE_DELAY: Duration = Duration::from_millis(60);

    /// Creates a pacing descriptor.
    #[must_use]
    pub const fn new(input_delay: Duration, forced_move_delay: Duration) -> Self {
        Self {
            input_delay,
            forced_move_delay,
        }
    }

    /// Pacing that never waits, for scripted sessions.
    #[must_use]
    pub const fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Delay before a tick that waits for input.
    #[must_use]
    pub const fn input_delay(&self) -> Duration {
        self.input_delay
    }

    /// Delay before a tick that replays a forced move.
    #[must_use]
    pub const fn forced_move_delay(&self) -> Duration {
        self.forced_move_delay
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INPUT_DELAY, Self::DEFAULT_FORCED_MOVE_DELAY)
    }
}

/// Clock that blocks the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadClock;

impl Clock for ThreadClock {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Where the next tick takes its movement from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickState {
    /// The next tick blocks for a fresh input event.
    AwaitingInput,
    /// The next tick replays the carried direction without reading input.
    ForcedMove {
        /// Direction replayed by the forced move.
        direction: Direction,
    },
}

/// Result of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick was fully applied.
    Continue {
        /// Whether the caller owes a render of the new state.
        render: bool,
    },
    /// Input raised a lifecycle signal; nothing was applied.
    Signal(Signal),
}

/// Advances the simulation one step at a time on behalf of one entity.
#[derive(Debug)]
pub struct TickEngine {
    entity: EntityId,
    pacing: Pacing,
    state: TickState,
    events: Vec<Event>,
}

impl TickEngine {
    /// Creates an engine driving the provided entity.
    #[must_use]
    pub fn new(entity: EntityId, pacing: Pacing) -> Self {
        Self {
            entity,
            pacing,
            state: TickState::AwaitingInput,
            events: Vec::new(),
        }
    }

    /// State the next tick starts from.
    #[must_use]
    pub const fn state(&self) -> TickState {
        self.state
    }

    /// World events broadcast during the most recent tick.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Runs one tick against the world.
    ///
    /// Fails only when an engine invariant is broken: an input event the
    /// engine cannot handle, a forced move the rules refuse, or a missing
    /// entity.
    pub fn tick<I, C>(
        &mut self,
        world: &mut World,
        input: &mut I,
        clock: &mut C,
    ) -> Result<TickOutcome, ProgrammingError>
    where
        I: InputSource + ?Sized,
        C: Clock + ?Sized,
    {
        self.events.clear();

        let (direction, forced) = match self.state {
            TickState::ForcedMove { direction } => {
                clock.pause(self.pacing.forced_move_delay);
                (direction, true)
            }
            TickState::AwaitingInput => {
                clock.pause(self.pacing.input_delay);
                match input.next_event() {
                    InputEvent::Move(direction) => (direction, false),
                    InputEvent::Idle => return Ok(TickOutcome::Continue { render: false }),
                    InputEvent::Signal(signal) => {
                        debug!("tick interrupted by {signal:?}");
                        return Ok(TickOutcome::Signal(signal));
                    }
                    unexpected @ InputEvent::MenuSelection(_) => {
                        return Err(ProgrammingError::UnexpectedInput(unexpected));
                    }
                }
            }
        };

        world::apply(
            world,
            Command::MoveEntity {
                entity: self.entity,
                direction,
            },
            &mut self.events,
        );

        let destination = self.events.iter().find_map(|event| match event {
            Event::EntityMoved { entity, to, .. } if *entity == self.entity => Some(*to),
            _ => None,
        });

        self.state = match destination {
            Some(to) => {
                let mover = query::entity(world, self.entity)
                    .ok_or(ProgrammingError::MissingEntity(self.entity))?;
                if !mover.flight() && query::map(world).fall(to) {
                    debug!("{:?} falls from {to:?}", self.entity);
                    TickState::ForcedMove {
                        direction: Direction::VerticalDown,
                    }
                } else {
                    TickState::AwaitingInput
                }
            }
            None if forced => {
                return Err(ProgrammingError::ForcedMoveRejected {
                    direction,
                    reason: self.rejection().unwrap_or(MoveRejection::UnknownEntity),
                });
            }
            None => TickState::AwaitingInput,
        };

        Ok(TickOutcome::Continue { render: true })
    }

    fn rejection(&self) -> Option<MoveRejection> {
        self.events.iter().find_map(|event| match event {
            Event::MoveRejected { reason, .. } => Some(*reason),
            _ => None,
        })
    }
}
