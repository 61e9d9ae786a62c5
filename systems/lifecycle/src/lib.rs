#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session lifecycle: reset, map selection and play, driven by signals.
//!
//! The lifecycle is a trampoline. Each phase runs to completion and hands back
//! the next phase as a value; lifecycle signals raised by input are converted
//! into phase transitions here and nowhere else.

use std::io;

use log::{debug, info, warn};
use strata_maze_core::{
    Clock, Command, EntityId, Event, GridError, InputEvent, InputMode, InputSource, MapMenu,
    MapSource, MapSourceError, MenuEntry, Position, ProgrammingError, RenderSink, Signal,
};
use strata_maze_system_tick::{Pacing, TickEngine, TickOutcome};
use strata_maze_world::{self as world, query, Entity, World, DEFAULT_PLAYER_TOKEN};
use thiserror::Error;

/// Title shown above the map selection table.
pub const MAP_SELECT_TITLE: &str = "Choose a map:";

/// Column headers of the map selection table.
pub const MAP_SELECT_HEADERS: [&str; 2] = ["Code", "Name"];

/// Prompt shown below the map selection table.
pub const MAP_SELECT_PROMPT: &str = "Select code: ";

/// Phase the session is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Nothing has run yet.
    Uninitialized,
    /// The session must be rebuilt before anything else happens.
    ResetPending,
    /// The player must choose a map.
    MapSelectPending,
    /// A map is loaded and ticks are running.
    Running,
    /// The session is over.
    Terminated,
}

/// Failures that end a session.
#[derive(Debug, Error)]
pub enum GameError {
    /// An engine invariant was broken.
    #[error(transparent)]
    Programming(#[from] ProgrammingError),
    /// The map source could not provide the requested data.
    #[error(transparent)]
    MapSource(#[from] MapSourceError),
    /// The selected map carries malformed tile data.
    #[error("map `{name}` could not be loaded")]
    MapRejected {
        /// Name of the selected map.
        name: String,
        /// Reason the grid refused the tile data.
        #[source]
        reason: GridError,
    },
    /// The selected map starts the player outside its grid.
    #[error("map `{name}` starts outside its grid at {position:?}")]
    StartOutOfBounds {
        /// Name of the selected map.
        name: String,
        /// Start position declared by the map.
        position: Position,
    },
    /// The render sink failed.
    #[error("failed to present output")]
    Render(#[from] io::Error),
}

/// Values that survive a reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    pacing: Pacing,
    player_token: char,
}

impl SessionSettings {
    /// Creates session settings.
    #[must_use]
    pub const fn new(pacing: Pacing, player_token: char) -> Self {
        Self {
            pacing,
            player_token,
        }
    }

    /// Delays applied before ticks.
    #[must_use]
    pub const fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Token the player is drawn with.
    #[must_use]
    pub const fn player_token(&self) -> char {
        self.player_token
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(Pacing::default(), DEFAULT_PLAYER_TOKEN)
    }
}

/// One interactive session wired to its collaborators.
#[derive(Debug)]
pub struct Game<M, I, R, C> {
    maps: M,
    input: I,
    render: R,
    clock: C,
    settings: SessionSettings,
    world: World,
    engine: TickEngine,
    state: LifecycleState,
}

impl<M, I, R, C> Game<M, I, R, C>
where
    M: MapSource,
    I: InputSource,
    R: RenderSink,
    C: Clock,
{
    /// Wires a session to its collaborators. Nothing runs until [`Game::run`].
    #[must_use]
    pub fn new(maps: M, input: I, render: R, clock: C, settings: SessionSettings) -> Self {
        Self {
            maps,
            input,
            render,
            clock,
            settings,
            world: World::with_player(Entity::player(settings.player_token)),
            engine: TickEngine::new(EntityId::PLAYER, settings.pacing),
            state: LifecycleState::Uninitialized,
        }
    }

    /// Phase the session is in.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Session world, for inspection between runs.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Input source the session reads from.
    #[must_use]
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Render sink the session writes to.
    #[must_use]
    pub fn render_sink(&self) -> &R {
        &self.render
    }

    /// Map source the session loads from.
    #[must_use]
    pub fn maps(&self) -> &M {
        &self.maps
    }

    /// Runs the session until it is closed.
    pub fn run(&mut self) -> Result<(), GameError> {
        if self.state == LifecycleState::Uninitialized {
            self.state = LifecycleState::ResetPending;
        }

        loop {
            let next = match self.state {
                LifecycleState::Uninitialized | LifecycleState::ResetPending => {
                    self.reset();
                    LifecycleState::MapSelectPending
                }
                LifecycleState::MapSelectPending => match self.map_select()? {
                    Some(signal) => self.transition(signal),
                    None => LifecycleState::Running,
                },
                LifecycleState::Running => {
                    let signal = self.play()?;
                    self.transition(signal)
                }
                LifecycleState::Terminated => return Ok(()),
            };
            debug!("lifecycle {:?} -> {next:?}", self.state);
            self.state = next;
        }
    }

    fn transition(&mut self, signal: Signal) -> LifecycleState {
        info!("received {signal:?}");
        match signal {
            Signal::Close => LifecycleState::Terminated,
            Signal::QuitToMenu => {
                self.main_menu();
                LifecycleState::MapSelectPending
            }
            Signal::Reset => LifecycleState::ResetPending,
            Signal::ReturnToMapSelect => LifecycleState::MapSelectPending,
        }
    }

    fn main_menu(&mut self) {
        debug!("main menu has no options yet; continuing to map selection");
    }

    fn reset(&mut self) {
        self.world = World::with_player(Entity::player(self.settings.player_token));
        self.engine = TickEngine::new(EntityId::PLAYER, self.settings.pacing);
    }

    fn map_select(&mut self) -> Result<Option<Signal>, GameError> {
        self.input.set_mode(InputMode::MapSelect);
        let names = self.maps.list_map_names()?;
        if names.is_empty() {
            warn!("map source offers no maps");
        }
        self.render.present_menu(&map_menu(&names))?;

        let name = loop {
            match self.input.next_event() {
                InputEvent::MenuSelection(text) => match select(&names, &text) {
                    Some(name) => break name,
                    None => {
                        warn!("`{}` does not name a map", text.trim());
                        self.input.invalid_input();
                    }
                },
                InputEvent::Signal(signal) => return Ok(Some(signal)),
                other => {
                    debug!("ignoring {other:?} during map selection");
                    self.input.invalid_input();
                }
            }
        };

        self.load(name)?;
        self.input.set_mode(InputMode::Play);
        Ok(None)
    }

    fn load(&mut self, name: &str) -> Result<(), GameError> {
        let map = self.maps.get_map(name)?;
        let name = map.name.clone();
        let start = map.start_pos;
        let mut events = Vec::new();

        world::apply(&mut self.world, Command::LoadMap { map }, &mut events);
        if let Some(Event::MapRejected { reason, .. }) = events.pop() {
            return Err(GameError::MapRejected { name, reason });
        }

        world::apply(
            &mut self.world,
            Command::PlaceEntity {
                entity: EntityId::PLAYER,
                position: start,
            },
            &mut events,
        );
        if let Some(Event::PlacementRejected { position, .. }) = events.pop() {
            return Err(GameError::StartOutOfBounds { name, position });
        }

        self.engine = TickEngine::new(EntityId::PLAYER, self.settings.pacing);
        Ok(())
    }

    fn play(&mut self) -> Result<Signal, GameError> {
        self.present_frame()?;
        loop {
            match self
                .engine
                .tick(&mut self.world, &mut self.input, &mut self.clock)?
            {
                TickOutcome::Continue { render: true } => self.present_frame()?,
                TickOutcome::Continue { render: false } => {}
                TickOutcome::Signal(signal) => return Ok(signal),
            }
        }
    }

    fn present_frame(&mut self) -> Result<(), GameError> {
        let frame = query::frame(&self.world, EntityId::PLAYER)
            .ok_or(ProgrammingError::MissingEntity(EntityId::PLAYER))?;
        self.render.present_frame(&frame)?;
        Ok(())
    }
}

/// Builds the map selection table for the provided names.
#[must_use]
pub fn map_menu(names: &[String]) -> MapMenu {
    MapMenu {
        title: MAP_SELECT_TITLE,
        headers: MAP_SELECT_HEADERS,
        entries: names
            .iter()
            .enumerate()
            .map(|(index, name)| MenuEntry {
                code: format!("{index:02}"),
                name: name.clone(),
            })
            .collect(),
        prompt: MAP_SELECT_PROMPT,
    }
}

/// Resolves raw selection text to one of the offered names.
#[must_use]
pub fn select<'names>(names: &'names [String], text: &str) -> Option<&'names str> {
    let index: usize = text.trim().parse().ok()?;
    names.get(index).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["first", "second", "third"]
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn menu_codes_are_two_digit_indices() {
        let menu = map_menu(&names());
        let codes: Vec<&str> = menu.entries.iter().map(|entry| entry.code.as_str()).collect();

        assert_eq!(codes, vec!["00", "01", "02"]);
        assert_eq!(menu.title, "Choose a map:");
        assert_eq!(menu.headers, ["Code", "Name"]);
        assert_eq!(menu.prompt, "Select code: ");
    }

    #[test]
    fn selection_accepts_indices_with_or_without_padding() {
        let names = names();
        assert_eq!(select(&names, "1"), Some("second"));
        assert_eq!(select(&names, "02"), Some("third"));
        assert_eq!(select(&names, " 0\n"), Some("first"));
    }

    #[test]
    fn selection_rejects_text_and_out_of_range_indices() {
        let names = names();
        assert_eq!(select(&names, "9"), None);
        assert_eq!(select(&names, "x"), None);
        assert_eq!(select(&names, "-1"), None);
        assert_eq!(select(&names, ""), None);
    }

    #[test]
    fn default_settings_use_default_pacing_and_token() {
        let settings = SessionSettings::default();
        assert_eq!(settings.pacing(), Pacing::default());
        assert_eq!(settings.player_token(), '@');
    }
}
