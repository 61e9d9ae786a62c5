#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text rendering for Strata Maze adapters.

use std::io::{self, Write};

use strata_maze_core::{AdjacentWalls, Frame, MapMenu, RenderSink, TileSnapshot, WallSide};

/// Glyph drawn for impassable boundary tiles.
pub const BOUNDARY_GLYPH: char = '#';
/// Glyph drawn for solid tiles that are not walls.
pub const SOLID_GLYPH: char = '%';
/// Glyph drawn for tiles that can be climbed.
pub const SUSPEND_GLYPH: char = 'H';
/// Glyph drawn for tiles with a floor.
pub const FLOOR_GLYPH: char = '.';
/// Glyph drawn for open air.
pub const EMPTY_GLYPH: char = ' ';

/// Box-drawing glyph for a wall with the provided adjacency.
///
/// A wall's `Down` side marks a wall in the row above and its `Up` side a wall
/// in the row below; `Right` marks the column to the left and `Left` the column
/// to the right. The glyph connects towards every neighbouring wall.
#[must_use]
pub fn wall_glyph(adjacent: AdjacentWalls) -> char {
    let above = adjacent.contains(WallSide::Down);
    let below = adjacent.contains(WallSide::Up);
    let left = adjacent.contains(WallSide::Right);
    let right = adjacent.contains(WallSide::Left);

    match (above, below, left, right) {
        (true, true, true, true) => '┼',
        (true, true, true, false) => '┤',
        (true, true, false, true) => '├',
        (true, false, true, true) => '┴',
        (false, true, true, true) => '┬',
        (true, false, true, false) => '┘',
        (false, true, true, false) => '┐',
        (true, false, false, true) => '└',
        (false, true, false, true) => '┌',
        (true, _, false, false) | (_, true, false, false) => '│',
        (false, false, _, _) if left || right => '─',
        _ => '┼',
    }
}

/// Glyph for a tile snapshot with no entity on it.
#[must_use]
pub fn tile_glyph(tile: &TileSnapshot) -> char {
    let flags = tile.flags;
    if flags.wall {
        let bits = tile.appearance_index.saturating_sub(1);
        wall_glyph(AdjacentWalls::from_bits(bits))
    } else if flags.boundary {
        BOUNDARY_GLYPH
    } else if flags.solid {
        SOLID_GLYPH
    } else if flags.suspend {
        SUSPEND_GLYPH
    } else if flags.floor {
        FLOOR_GLYPH
    } else {
        EMPTY_GLYPH
    }
}

/// Render sink writing frames and menus as plain text.
#[derive(Debug)]
pub struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    /// Creates a renderer writing to the provided stream.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying stream.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Formats a frame into lines without writing it.
    #[must_use]
    pub fn frame_lines(frame: &Frame) -> Vec<String> {
        let mut lines = Vec::with_capacity(frame.dimensions().1 + 1);
        lines.push(format!("Level {}", frame.z()));
        for (y, row) in frame.rows().enumerate() {
            let line: String = row
                .iter()
                .enumerate()
                .map(|(x, tile)| {
                    let (x, y) = (coordinate(x), coordinate(y));
                    frame
                        .entity_at(x, y)
                        .map_or_else(|| tile_glyph(tile), |entity| entity.token)
                })
                .collect();
            lines.push(line);
        }
        lines
    }

    /// Formats a menu into lines, without the trailing prompt.
    #[must_use]
    pub fn menu_lines(menu: &MapMenu) -> Vec<String> {
        let code_width = menu
            .entries
            .iter()
            .map(|entry| entry.code.chars().count())
            .chain(std::iter::once(menu.headers[0].chars().count()))
            .max()
            .unwrap_or_default();

        let mut lines = Vec::with_capacity(menu.entries.len() + 2);
        lines.push(menu.title.to_owned());
        lines.push(format!(
            "{:<code_width$}  {}",
            menu.headers[0], menu.headers[1]
        ));
        for entry in &menu.entries {
            lines.push(format!("{:<code_width$}  {}", entry.code, entry.name));
        }
        lines
    }
}

impl<W: Write> RenderSink for TextRenderer<W> {
    fn present_menu(&mut self, menu: &MapMenu) -> io::Result<()> {
        for line in Self::menu_lines(menu) {
            writeln!(self.out, "{line}")?;
        }
        write!(self.out, "{}", menu.prompt)?;
        self.out.flush()
    }

    fn present_frame(&mut self, frame: &Frame) -> io::Result<()> {
        writeln!(self.out)?;
        for line in Self::frame_lines(frame) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }
}

fn coordinate(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}
