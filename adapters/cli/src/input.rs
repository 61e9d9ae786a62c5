use std::io::{BufRead, Write};

use log::warn;
use strata_maze_core::{Direction, InputEvent, InputMode, InputSource, Signal};
use strata_maze_system_lifecycle::MAP_SELECT_PROMPT;

const INVALID_INPUT: &str = "Invalid input, please try again.";

/// Classifies one line of text for the provided mode.
///
/// Returns `None` for lines that mean nothing in that mode.
pub(crate) fn classify(mode: InputMode, line: &str) -> Option<InputEvent> {
    let word = line.trim();
    if let Some(signal) = signal(word) {
        return Some(InputEvent::Signal(signal));
    }
    match mode {
        InputMode::MapSelect => Some(InputEvent::MenuSelection(word.to_owned())),
        InputMode::Play if word.is_empty() => Some(InputEvent::Idle),
        InputMode::Play => direction(word).map(InputEvent::Move),
    }
}

fn signal(word: &str) -> Option<Signal> {
    match word {
        "exit" => Some(Signal::Close),
        "quit" => Some(Signal::QuitToMenu),
        "reset" => Some(Signal::Reset),
        "maps" => Some(Signal::ReturnToMapSelect),
        _ => None,
    }
}

fn direction(word: &str) -> Option<Direction> {
    match word {
        "w" | "up" => Some(Direction::Up),
        "s" | "down" => Some(Direction::Down),
        "a" | "left" => Some(Direction::Left),
        "d" | "right" => Some(Direction::Right),
        "<" | "climb" => Some(Direction::VerticalUp),
        ">" | "descend" => Some(Direction::VerticalDown),
        _ => None,
    }
}

/// Line-oriented input source; invalid-input notices go to `feedback`.
#[derive(Debug)]
pub(crate) struct LineInput<R, W> {
    reader: R,
    feedback: W,
    mode: InputMode,
}

impl<R: BufRead, W: Write> LineInput<R, W> {
    pub(crate) fn new(reader: R, feedback: W) -> Self {
        Self {
            reader,
            feedback,
            mode: InputMode::MapSelect,
        }
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(error) => {
                warn!("failed to read input: {error}");
                None
            }
        }
    }

    fn notify(&mut self, message: &str) {
        if let Err(error) = write!(self.feedback, "{message}").and_then(|()| self.feedback.flush())
        {
            warn!("failed to write input feedback: {error}");
        }
    }
}

impl<R: BufRead, W: Write> InputSource for LineInput<R, W> {
    fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    fn next_event(&mut self) -> InputEvent {
        loop {
            let Some(line) = self.read_line() else {
                return InputEvent::Signal(Signal::Close);
            };
            match classify(self.mode, &line) {
                Some(event) => return event,
                None => self.invalid_input(),
            }
        }
    }

    fn invalid_input(&mut self) {
        let message = match self.mode {
            InputMode::MapSelect => format!("{INVALID_INPUT}\n{MAP_SELECT_PROMPT}"),
            InputMode::Play => format!("{INVALID_INPUT}\n"),
        };
        self.notify(&message);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn play_lines_map_to_moves() {
        let cases = [
            ("w", Direction::Up),
            ("down", Direction::Down),
            ("a\n", Direction::Left),
            ("  right ", Direction::Right),
            ("<", Direction::VerticalUp),
            ("descend", Direction::VerticalDown),
        ];
        for (line, expected) in cases {
            assert_eq!(
                classify(InputMode::Play, line),
                Some(InputEvent::Move(expected)),
                "line {line:?}"
            );
        }
    }

    #[test]
    fn empty_play_line_is_idle() {
        assert_eq!(classify(InputMode::Play, "\n"), Some(InputEvent::Idle));
    }

    #[test]
    fn signals_are_recognised_in_every_mode() {
        for mode in [InputMode::MapSelect, InputMode::Play] {
            assert_eq!(
                classify(mode, "exit"),
                Some(InputEvent::Signal(Signal::Close))
            );
            assert_eq!(
                classify(mode, "maps"),
                Some(InputEvent::Signal(Signal::ReturnToMapSelect))
            );
        }
        assert_eq!(
            classify(InputMode::Play, "quit"),
            Some(InputEvent::Signal(Signal::QuitToMenu))
        );
        assert_eq!(
            classify(InputMode::Play, "reset"),
            Some(InputEvent::Signal(Signal::Reset))
        );
    }

    #[test]
    fn map_select_passes_raw_text_through() {
        assert_eq!(
            classify(InputMode::MapSelect, " 01\n"),
            Some(InputEvent::MenuSelection("01".to_owned()))
        );
        assert_eq!(classify(InputMode::Play, "jump"), None);
    }

    #[test]
    fn unknown_play_lines_are_reported_and_skipped() {
        let mut input = LineInput::new(Cursor::new("jump\nd\n"), Vec::new());
        input.set_mode(InputMode::Play);

        assert_eq!(input.next_event(), InputEvent::Move(Direction::Right));
        let feedback = String::from_utf8(input.feedback.clone()).expect("utf-8");
        assert_eq!(feedback, "Invalid input, please try again.\n");
    }

    #[test]
    fn invalid_selection_repeats_the_prompt() {
        let mut input = LineInput::new(Cursor::new(""), Vec::new());
        input.invalid_input();

        let feedback = String::from_utf8(input.feedback.clone()).expect("utf-8");
        assert_eq!(feedback, "Invalid input, please try again.\nSelect code: ");
    }

    #[test]
    fn end_of_input_closes_the_session() {
        let mut input = LineInput::new(Cursor::new("w\n"), Vec::new());
        input.set_mode(InputMode::Play);

        assert_eq!(input.next_event(), InputEvent::Move(Direction::Up));
        assert_eq!(input.next_event(), InputEvent::Signal(Signal::Close));
    }
}
