use std::{collections::VecDeque, io, time::Duration};

use strata_maze_core::{
    Clock, Direction, EntityId, Frame, InputEvent, InputMode, InputSource, MapData, MapMenu,
    MapSource, MapSourceError, Position, RenderSink, Signal, TileRecord,
};
use strata_maze_system_lifecycle::{Game, GameError, LifecycleState, SessionSettings};
use strata_maze_system_tick::Pacing;
use strata_maze_world::query;

#[derive(Debug, Default)]
struct ScriptedInput {
    events: VecDeque<InputEvent>,
    modes: Vec<InputMode>,
    invalid: usize,
}

impl ScriptedInput {
    fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl InputSource for ScriptedInput {
    fn set_mode(&mut self, mode: InputMode) {
        self.modes.push(mode);
    }

    fn next_event(&mut self) -> InputEvent {
        self.events
            .pop_front()
            .unwrap_or(InputEvent::Signal(Signal::Close))
    }

    fn invalid_input(&mut self) {
        self.invalid += 1;
    }
}

#[derive(Debug, Default)]
struct RecordingSink {
    menus: Vec<MapMenu>,
    frames: Vec<Frame>,
}

impl RenderSink for RecordingSink {
    fn present_menu(&mut self, menu: &MapMenu) -> io::Result<()> {
        self.menus.push(menu.clone());
        Ok(())
    }

    fn present_frame(&mut self, frame: &Frame) -> io::Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct NoDelay;

impl Clock for NoDelay {
    fn pause(&mut self, _duration: Duration) {}
}

#[derive(Debug, Default)]
struct MemoryMaps {
    maps: Vec<MapData>,
    listed_only: Vec<String>,
    requested: Vec<String>,
}

impl MemoryMaps {
    fn new(maps: impl IntoIterator<Item = MapData>) -> Self {
        Self {
            maps: maps.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl MapSource for MemoryMaps {
    fn list_map_names(&mut self) -> Result<Vec<String>, MapSourceError> {
        Ok(self
            .maps
            .iter()
            .map(|map| map.name.clone())
            .chain(self.listed_only.iter().cloned())
            .collect())
    }

    fn get_map(&mut self, name: &str) -> Result<MapData, MapSourceError> {
        self.requested.push(name.to_owned());
        self.maps
            .iter()
            .find(|map| map.name == name)
            .cloned()
            .ok_or_else(|| MapSourceError::NotFound {
                name: name.to_owned(),
            })
    }
}

fn floor() -> TileRecord {
    TileRecord {
        floor: true,
        ..TileRecord::default()
    }
}

fn corridor(name: &str, length: usize) -> MapData {
    MapData {
        name: name.to_owned(),
        start_pos: Position::new(0, 0, 0),
        tile_data: vec![vec![vec![floor(); length]]],
    }
}

fn menu(text: &str) -> InputEvent {
    InputEvent::MenuSelection(text.to_owned())
}

fn step(direction: Direction) -> InputEvent {
    InputEvent::Move(direction)
}

fn signal(signal: Signal) -> InputEvent {
    InputEvent::Signal(signal)
}

type TestGame = Game<MemoryMaps, ScriptedInput, RecordingSink, NoDelay>;

fn game(maps: MemoryMaps, events: impl IntoIterator<Item = InputEvent>) -> TestGame {
    let settings = SessionSettings::new(Pacing::immediate(), '@');
    Game::new(maps, ScriptedInput::new(events), RecordingSink::default(), NoDelay, settings)
}

fn three_maps() -> MemoryMaps {
    MemoryMaps::new([
        corridor("alpha", 2),
        corridor("beta", 3),
        corridor("gamma", 4),
    ])
}

fn player_position(game: &TestGame) -> Position {
    query::entity(game.world(), EntityId::PLAYER)
        .expect("player")
        .position()
}

#[test]
fn invalid_selections_reprompt_until_a_map_is_chosen() {
    let mut game = game(
        three_maps(),
        [menu("9"), menu("x"), menu("1"), signal(Signal::Close)],
    );

    game.run().expect("session runs");

    assert_eq!(game.state(), LifecycleState::Terminated);
    assert_eq!(game.input().invalid, 2);
    assert_eq!(game.maps().requested, vec!["beta".to_owned()]);
    assert_eq!(query::map(game.world()).name(), Some("beta"));
    assert_eq!(game.render_sink().menus.len(), 1);
    let names: Vec<&str> = game.render_sink().menus[0]
        .entries
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn running_renders_once_up_front_and_after_every_move() {
    let mut game = game(
        three_maps(),
        [
            menu("0"),
            step(Direction::Right),
            InputEvent::Idle,
            step(Direction::Right),
            step(Direction::Left),
            signal(Signal::Close),
        ],
    );

    game.run().expect("session runs");

    assert_eq!(game.render_sink().frames.len(), 4);
    assert_eq!(player_position(&game), Position::new(0, 0, 0));
    assert_eq!(
        game.input().modes,
        vec![InputMode::MapSelect, InputMode::Play]
    );
}

#[test]
fn reset_rebuilds_the_session_before_selecting_again() {
    let mut game = game(
        three_maps(),
        [
            menu("2"),
            step(Direction::Right),
            signal(Signal::Reset),
            menu("2"),
            signal(Signal::Close),
        ],
    );

    game.run().expect("session runs");

    assert_eq!(game.render_sink().menus.len(), 2);
    assert_eq!(player_position(&game), Position::new(0, 0, 0));
    let start = query::map(game.world()).tile(Position::new(0, 0, 0));
    assert_eq!(start.occupants(), &[EntityId::PLAYER]);
    let visited = query::map(game.world()).tile(Position::new(1, 0, 0));
    assert!(visited.occupants().is_empty());
}

#[test]
fn returning_to_map_select_switches_maps() {
    let mut game = game(
        three_maps(),
        [
            menu("0"),
            signal(Signal::ReturnToMapSelect),
            menu("2"),
            signal(Signal::Close),
        ],
    );

    game.run().expect("session runs");

    assert_eq!(game.render_sink().menus.len(), 2);
    assert_eq!(query::map(game.world()).name(), Some("gamma"));
    assert_eq!(
        game.maps().requested,
        vec!["alpha".to_owned(), "gamma".to_owned()]
    );
}

#[test]
fn quitting_to_menu_leads_back_to_map_select() {
    let mut game = game(
        three_maps(),
        [menu("1"), signal(Signal::QuitToMenu), signal(Signal::Close)],
    );

    game.run().expect("session runs");

    assert_eq!(game.state(), LifecycleState::Terminated);
    assert_eq!(game.render_sink().menus.len(), 2);
    assert_eq!(game.render_sink().frames.len(), 1);
}

#[test]
fn closing_during_map_select_never_renders_a_frame() {
    let mut game = game(three_maps(), [signal(Signal::Close)]);

    game.run().expect("session runs");

    assert_eq!(game.state(), LifecycleState::Terminated);
    assert!(game.render_sink().frames.is_empty());
    assert!(game.maps().requested.is_empty());
}

#[test]
fn falls_render_every_forced_step() {
    let open = TileRecord::default();
    let shaft = MapData {
        name: "shaft".to_owned(),
        start_pos: Position::new(0, 0, 2),
        tile_data: vec![
            vec![vec![floor(), floor()]],
            vec![vec![floor(), open]],
            vec![vec![floor(), open]],
        ],
    };
    let mut game = game(
        MemoryMaps::new([shaft]),
        [menu("0"), step(Direction::Right), signal(Signal::Close)],
    );

    game.run().expect("session runs");

    assert_eq!(player_position(&game), Position::new(1, 0, 0));
    let levels: Vec<i32> = game.render_sink().frames.iter().map(Frame::z).collect();
    assert_eq!(levels, vec![2, 2, 1, 0]);
}

#[test]
fn malformed_maps_end_the_session() {
    let mut ragged = corridor("ragged", 2);
    ragged.tile_data[0].push(vec![floor()]);
    let mut game = game(MemoryMaps::new([ragged]), [menu("0")]);

    let error = game.run().expect_err("ragged map");

    assert!(matches!(error, GameError::MapRejected { ref name, .. } if name == "ragged"));
}

#[test]
fn start_outside_the_grid_ends_the_session() {
    let mut stray = corridor("stray", 2);
    stray.start_pos = Position::new(5, 0, 0);
    let mut game = game(MemoryMaps::new([stray]), [menu("0")]);

    let error = game.run().expect_err("start outside grid");

    assert!(matches!(error, GameError::StartOutOfBounds { .. }));
}

#[test]
fn map_source_failures_are_propagated() {
    let mut maps = three_maps();
    maps.listed_only.push("phantom".to_owned());
    let mut game = game(maps, [menu("3")]);

    let error = game.run().expect_err("phantom map");

    assert!(matches!(
        error,
        GameError::MapSource(MapSourceError::NotFound { ref name }) if name == "phantom"
    ));
}
