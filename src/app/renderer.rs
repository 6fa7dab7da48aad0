use std::{collections::HashSet, io::Write};

use crossterm::{
    cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};
use unicode_truncate::UnicodeTruncateStr;

use crate::{
    app::{
        AppOptions, RenderMode,
        canvas::{Canvas, Glyph},
        observer::{MazeObserver, RunInfo},
    },
    error::{MazeError, Result},
    maze::{Coord, Direction},
};

/// Counters shown on the status line under the maze.
#[derive(Debug, Default)]
struct Status {
    title: String,
    phase: &'static str,
    entered: usize,
    total: usize,
    merges: usize,
    dead: usize,
}

impl Status {
    fn line(&self) -> String {
        format!(
            "{} | {} | {}/{} cells | {} merges | {} dead ends",
            self.title, self.phase, self.entered, self.total, self.merges, self.dead
        )
    }
}

/// Draws engine events onto a terminal-like writer with crossterm.
///
/// Every event is applied to an in-memory [`Canvas`] first; glyphs that
/// actually changed are queued to the writer and flushed once per event.
pub struct TerminalRenderer<W: Write> {
    out: W,
    options: AppOptions,
    /// Terminal size `(columns, rows)`. `None` means unbounded.
    viewport: Option<(u16, u16)>,
    canvas: Option<Canvas>,
    /// Cell the generator is at, drawn highlighted.
    head: Option<Coord>,
    /// Wall positions already opened, so build-walls mode never redraws them.
    opened: HashSet<(u32, u32)>,
    /// Mirror of the solver's stack.
    trail: Vec<Coord>,
    /// Whether changes are drawn as they happen.
    live: bool,
    status: Status,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, options: AppOptions) -> Self {
        TerminalRenderer {
            out,
            options,
            viewport: None,
            canvas: None,
            head: None,
            opened: HashSet::new(),
            trail: Vec::new(),
            live: false,
            status: Status::default(),
        }
    }

    pub fn with_viewport(mut self, columns: u16, rows: u16) -> Self {
        self.viewport = Some((columns, rows));
        self
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Glyph a cell settles to once the generator has moved on.
    fn settled_glyph(&self) -> Glyph {
        match self.options.mode {
            RenderMode::FillCells => Glyph::Visited,
            RenderMode::RemoveWalls | RenderMode::BuildWalls => Glyph::Empty,
        }
    }

    fn canvas_glyph(&self, cell: Coord) -> Option<Glyph> {
        self.canvas
            .as_ref()
            .map(|canvas| canvas[Canvas::cell_position(cell)])
    }

    /// Converts a canvas position to terminal columns and rows.
    fn screen_position(pos: (u32, u32)) -> Result<(u16, u16)> {
        let x = pos.0 * Glyph::CELL_WIDTH as u32;
        match (u16::try_from(x), u16::try_from(pos.1)) {
            (Ok(x), Ok(y)) => Ok((x, y)),
            _ => Err(MazeError::Configuration(format!(
                "canvas position {:?} does not fit on a terminal",
                pos
            ))),
        }
    }

    fn paint(&mut self, pos: (u32, u32), glyph: Glyph) -> Result<()> {
        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(());
        };
        if canvas.set(pos, glyph) && self.live {
            let (x, y) = Self::screen_position(pos)?;
            queue!(
                self.out,
                cursor::MoveTo(x, y),
                style::PrintStyledContent(glyph.styled(self.options.inverse_colors))
            )?;
        }
        Ok(())
    }

    fn paint_cell(&mut self, cell: Coord, glyph: Glyph) -> Result<()> {
        self.paint(Canvas::cell_position(cell), glyph)
    }

    /// Draws the whole canvas and the status line.
    fn redraw(&mut self) -> Result<()> {
        let Some(canvas) = self.canvas.as_ref() else {
            return Ok(());
        };
        queue!(
            self.out,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        for row in canvas.rows() {
            for glyph in row {
                queue!(
                    self.out,
                    style::PrintStyledContent(glyph.styled(self.options.inverse_colors))
                )?;
            }
            queue!(self.out, style::Print("\r\n"))?;
        }
        self.draw_status()
    }

    fn draw_status(&mut self) -> Result<()> {
        let Some(canvas) = self.canvas.as_ref() else {
            return Ok(());
        };
        let row = u16::try_from(canvas.height()).unwrap_or(u16::MAX);
        let line = self.status.line();
        let max_width = self
            .viewport
            .map_or(usize::MAX, |(columns, _)| columns as usize);
        let (line, _) = line.unicode_truncate(max_width);
        queue!(
            self.out,
            cursor::MoveTo(0, row),
            terminal::Clear(ClearType::CurrentLine),
            style::PrintStyledContent(line.with(Color::Cyan).attribute(Attribute::Bold))
        )?;
        Ok(())
    }

    /// Moves the highlight to `cell`, settling the previous head.
    fn move_head(&mut self, cell: Option<Coord>) -> Result<()> {
        if let Some(previous) = self.head.take() {
            let settled = self.settled_glyph();
            self.paint_cell(previous, settled)?;
        }
        if let Some(cell) = cell {
            self.paint_cell(cell, Glyph::Head)?;
        }
        self.head = cell;
        Ok(())
    }

    /// Walls a cell in, skipping sides that were already opened.
    fn build_walls_around(&mut self, cell: Coord) -> Result<()> {
        for post in Canvas::post_positions(cell) {
            self.paint(post, Glyph::Wall)?;
        }
        for dir in Direction::ALL {
            let pos = Canvas::wall_position(cell, dir);
            if !self.opened.contains(&pos) {
                self.paint(pos, Glyph::Wall)?;
            }
        }
        Ok(())
    }
}

impl<W: Write> MazeObserver for TerminalRenderer<W> {
    fn on_run_started(&mut self, info: &RunInfo) -> Result<()> {
        let mut canvas = Canvas::new(info.height, info.width, Glyph::Wall);
        if let Some((columns, rows)) = self.viewport {
            let needed_columns = canvas.width() as u64 * Glyph::CELL_WIDTH as u64;
            // One extra row for the status line
            let needed_rows = canvas.height() as u64 + 1;
            if needed_columns > columns as u64 || needed_rows > rows as u64 {
                return Err(MazeError::Configuration(format!(
                    "terminal size {}x{} is too small for a {}x{} maze (needs {}x{})",
                    columns, rows, info.height, info.width, needed_columns, needed_rows
                )));
            }
        }
        match self.options.mode {
            RenderMode::RemoveWalls => {}
            RenderMode::BuildWalls => canvas.clear_interior(),
            RenderMode::FillCells => {
                for row in 0..info.height {
                    for col in 0..info.width {
                        canvas.set(Canvas::cell_position((row, col)), Glyph::Empty);
                    }
                }
            }
        }
        tracing::info!(
            "[render] {}x{} canvas for {}x{} maze in {} mode",
            canvas.width(),
            canvas.height(),
            info.height,
            info.width,
            self.options.mode
        );

        self.canvas = Some(canvas);
        self.head = None;
        self.opened.clear();
        self.trail.clear();
        self.live = self.options.show_generation;
        self.status = Status {
            title: format!("{} | seed {}", info.generator, info.seed),
            phase: "generating",
            total: info.height as usize * info.width as usize,
            ..Status::default()
        };
        if self.live {
            self.redraw()?;
        }
        Ok(())
    }

    fn on_cell_entered(&mut self, cell: Coord) -> Result<()> {
        self.status.entered += 1;
        if self.options.mode == RenderMode::BuildWalls {
            self.build_walls_around(cell)?;
        }
        self.move_head(Some(cell))
    }

    fn on_passage_opened(&mut self, cell: Coord, dir: Direction) -> Result<()> {
        let pos = Canvas::wall_position(cell, dir);
        self.opened.insert(pos);
        let glyph = self.settled_glyph();
        self.paint(pos, glyph)
    }

    fn on_frontier_marked(&mut self, cell: Coord) -> Result<()> {
        self.paint_cell(cell, Glyph::Frontier)
    }

    fn on_regions_merged(&mut self, _loser: u32, _winner: u32) -> Result<()> {
        self.status.merges += 1;
        Ok(())
    }

    fn on_backtracked(&mut self, cell: Coord) -> Result<()> {
        if !self.options.show_backtracks {
            return Ok(());
        }
        if self.head == Some(cell) {
            self.head = None;
        }
        self.paint_cell(cell, Glyph::Backtracked)
    }

    fn on_generation_complete(&mut self) -> Result<()> {
        self.move_head(None)?;
        self.status.phase = "generated";
        let was_live = self.live;
        self.live = self.options.show_solve;
        if !was_live {
            // Nothing was drawn while generating
            self.redraw()?;
        } else {
            self.draw_status()?;
        }
        Ok(())
    }

    fn on_solve_started(&mut self, start: Coord, stop: Coord) -> Result<()> {
        self.status.phase = "solving";
        self.trail.clear();
        self.paint_cell(start, Glyph::Start)?;
        self.paint_cell(stop, Glyph::Goal)?;
        if self.live {
            self.draw_status()?;
        }
        Ok(())
    }

    fn on_cell_marked_on_path(&mut self, cell: Coord) -> Result<()> {
        if let Some(&previous) = self.trail.last() {
            self.paint(between(previous, cell), Glyph::Path)?;
        }
        if self.trail.is_empty() {
            self.paint_cell(cell, Glyph::Start)?;
        } else if self.canvas_glyph(cell) != Some(Glyph::Goal) {
            self.paint_cell(cell, Glyph::Path)?;
        }
        self.trail.push(cell);
        Ok(())
    }

    fn on_cell_marked_dead(&mut self, cell: Coord) -> Result<()> {
        self.status.dead += 1;
        self.trail.pop();
        if let Some(&previous) = self.trail.last() {
            self.paint(between(previous, cell), Glyph::Dead)?;
        }
        self.paint_cell(cell, Glyph::Dead)
    }

    fn on_solve_complete(&mut self) -> Result<()> {
        self.status.phase = "solved";
        if !self.live {
            self.live = true;
            return self.redraw();
        }
        self.draw_status()
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Canvas position of the wall between two adjacent cells.
fn between(a: Coord, b: Coord) -> (u32, u32) {
    let (ax, ay) = Canvas::cell_position(a);
    let (bx, by) = Canvas::cell_position(b);
    ((ax + bx) / 2, (ay + by) / 2)
}
