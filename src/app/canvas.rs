use std::fmt;

use crossterm::style::{Color, StyledContent, Stylize};

use crate::maze::{Coord, Direction};

/// What a single canvas position currently shows.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    #[default]
    Wall,
    Empty,
    /// Interior of a cell that joined the maze (fill mode).
    Visited,
    /// Cell waiting on Prim's frontier.
    Frontier,
    /// Cell the generator is currently at.
    Head,
    /// Cell a backtracking walk stepped out of.
    Backtracked,
    Path,
    Dead,
    Start,
    Goal,
}

impl Glyph {
    /// The width of each glyph when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;

    /// Styled symbol, with walls and empty space swapped when `inverse` is set.
    pub fn styled(self, inverse: bool) -> StyledContent<&'static str> {
        let styled_symbol = match (self, inverse) {
            (Glyph::Wall, false) | (Glyph::Empty, true) => "██".with(Color::White),
            (Glyph::Empty, false) | (Glyph::Wall, true) => "  ".with(Color::Reset),
            (Glyph::Visited, _) => "██".with(Color::DarkBlue),
            (Glyph::Frontier, _) => "▒▒".with(Color::Magenta),
            (Glyph::Head, _) => "██".with(Color::Cyan),
            (Glyph::Backtracked, _) => "░░".with(Color::DarkGrey),
            (Glyph::Path, _) => "██".with(Color::Yellow),
            (Glyph::Dead, _) => "░░".with(Color::DarkRed),
            (Glyph::Start, _) => "██".with(Color::Green),
            (Glyph::Goal, _) => "██".with(Color::Red),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                Glyph::CELL_WIDTH as usize,
                "Each glyph must occupy exactly two character widths."
            );
        }

        styled_symbol
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.styled(false))
    }
}

/// Screen-space picture of a maze: `(2w + 1) x (2h + 1)` glyphs with cells at
/// odd positions, walls between them and wall posts at even ones.
pub struct Canvas {
    glyphs: Box<[Glyph]>,
    width: u32,
    height: u32,
}

impl Canvas {
    pub fn new(maze_height: u16, maze_width: u16, fill: Glyph) -> Self {
        let width = maze_width as u32 * 2 + 1;
        let height = maze_height as u32 * 2 + 1;
        let glyphs = vec![fill; width as usize * height as usize].into_boxed_slice();
        Canvas {
            glyphs,
            width,
            height,
        }
    }

    /// Number of glyph rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of glyph columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_boundary(&self, x: u32, y: u32) -> bool {
        x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1
    }

    fn ravel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Canvas position `(x, y)` of a maze cell.
    pub fn cell_position(coord: Coord) -> (u32, u32) {
        (coord.1 as u32 * 2 + 1, coord.0 as u32 * 2 + 1)
    }

    /// Canvas position of the wall on the `dir` side of a cell.
    pub fn wall_position(coord: Coord, dir: Direction) -> (u32, u32) {
        let (x, y) = Canvas::cell_position(coord);
        match dir {
            Direction::Up => (x, y - 1),
            Direction::Right => (x + 1, y),
            Direction::Down => (x, y + 1),
            Direction::Left => (x - 1, y),
        }
    }

    /// Canvas positions of the four wall posts around a cell.
    pub fn post_positions(coord: Coord) -> [(u32, u32); 4] {
        let (x, y) = Canvas::cell_position(coord);
        [(x - 1, y - 1), (x + 1, y - 1), (x - 1, y + 1), (x + 1, y + 1)]
    }

    /// Sets a glyph. Returns whether it changed.
    pub fn set(&mut self, pos: (u32, u32), glyph: Glyph) -> bool {
        let idx = self.ravel_index(pos.0, pos.1);
        let old = std::mem::replace(&mut self.glyphs[idx], glyph);
        old != glyph
    }

    /// Clears everything inside the boundary, keeping the outer walls.
    pub fn clear_interior(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.is_boundary(x, y) {
                    let idx = self.ravel_index(x, y);
                    self.glyphs[idx] = Glyph::Empty;
                }
            }
        }
    }

    /// Rows of glyphs, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Glyph]> + '_ {
        self.glyphs.chunks(self.width as usize)
    }
}

impl std::ops::Index<(u32, u32)> for Canvas {
    type Output = Glyph;

    fn index(&self, index: (u32, u32)) -> &Self::Output {
        &self.glyphs[self.ravel_index(index.0, index.1)]
    }
}
