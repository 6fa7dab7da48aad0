pub mod cell;
mod direction;

use std::{collections::VecDeque, fmt};

pub use cell::{Cell, SolveState};
pub use direction::Direction;

use crate::{
    error::{MazeError, Result},
    random::RandomSource,
};

/// Cell coordinate as `(row, col)`, with `(0, 0)` the top-left cell.
pub type Coord = (u16, u16);

/// Largest number of cells a single maze may hold.
pub const MAX_CELLS: usize = 1 << 24;

/// Rectangular grid of cells together with the start and stop corners.
pub struct Maze {
    cells: Box<[Cell]>,
    height: u16,
    width: u16,
    start: Coord,
    stop: Coord,
}

impl Maze {
    /// Creates a fully walled maze with the given number of rows and columns.
    pub fn new(height: u16, width: u16) -> Result<Self> {
        Maze::validate(height, width)?;
        let mut maze = Maze {
            cells: Box::new([]),
            height,
            width,
            start: (0, 0),
            stop: (height - 1, width - 1),
        };
        maze.clear();
        Ok(maze)
    }

    fn validate(height: u16, width: u16) -> Result<()> {
        if height < 1 || width < 1 {
            return Err(MazeError::Configuration(format!(
                "maze must be at least 1x1, got {}x{}",
                height, width
            )));
        }
        let cells = height as usize * width as usize;
        if cells > MAX_CELLS {
            return Err(MazeError::Configuration(format!(
                "{}x{} is {} cells, the maximum is {}",
                height, width, cells, MAX_CELLS
            )));
        }
        Ok(())
    }

    /// Resizes the maze and puts every cell back into its initial state:
    /// walled on all sides, unvisited, its own region, not on any solve path.
    /// On error the maze is left as it was.
    pub fn reset(&mut self, height: u16, width: u16) -> Result<()> {
        Maze::validate(height, width)?;
        self.height = height;
        self.width = width;
        self.start = (0, 0);
        self.stop = (height - 1, width - 1);
        self.clear();
        Ok(())
    }

    /// Puts every cell back into its initial state, keeping the dimensions.
    pub(crate) fn clear(&mut self) {
        let len = self.cell_count() as u32;
        self.cells = (0..len).map(Cell::walled).collect();
    }

    /// Returns the number of rows.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns the number of columns.
    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn cell_count(&self) -> usize {
        self.height as usize * self.width as usize
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn stop(&self) -> Coord {
        self.stop
    }

    /// Overrides the solve endpoints.
    pub fn set_endpoints(&mut self, start: Coord, stop: Coord) -> Result<()> {
        for coord in [start, stop] {
            if !self.is_in_bounds(coord) {
                return Err(MazeError::Configuration(format!(
                    "endpoint {:?} is outside the {}x{} maze",
                    coord, self.height, self.width
                )));
            }
        }
        self.start = start;
        self.stop = stop;
        Ok(())
    }

    /// Picks a random corner as start and the diagonally opposite one as stop.
    pub(crate) fn choose_endpoints(&mut self, rng: &mut RandomSource) {
        let (last_row, last_col) = (self.height - 1, self.width - 1);
        let corners = [(0, 0), (0, last_col), (last_row, 0), (last_row, last_col)];
        let i = rng.index(corners.len());
        self.start = corners[i];
        self.stop = corners[corners.len() - 1 - i];
    }

    fn ravel_index(&self, coord: Coord) -> usize {
        coord.0 as usize * self.width as usize + coord.1 as usize
    }

    /// Row-major index of a cell, also its initial region id.
    pub fn index_of(&self, coord: Coord) -> usize {
        self.ravel_index(coord)
    }

    pub fn coord_of(&self, index: usize) -> Coord {
        (
            (index / self.width as usize) as u16,
            (index % self.width as usize) as u16,
        )
    }

    /// Checks if the given coordinate is within the bounds of the maze.
    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        coord.0 < self.height && coord.1 < self.width
    }

    /// The cell one step away in `dir`, if it is inside the maze.
    pub fn neighbor(&self, coord: Coord, dir: Direction) -> Option<Coord> {
        let (row, col) = coord;
        match dir {
            Direction::Up => row.checked_sub(1).map(|r| (r, col)),
            // row < height <= u16::MAX, so row + 1 cannot overflow
            Direction::Down => (row + 1 < self.height).then(|| (row + 1, col)),
            Direction::Left => col.checked_sub(1).map(|c| (row, c)),
            Direction::Right => (col + 1 < self.width).then(|| (row, col + 1)),
        }
    }

    /// In-bounds neighbors of a cell together with the direction leading to them.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = (Direction, Coord)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.neighbor(coord, dir).map(|next| (dir, next)))
    }

    fn directions_where<F>(&self, coord: Coord, predicate: F) -> Vec<Direction>
    where
        F: Fn(&Cell) -> bool,
    {
        self.neighbors(coord)
            .filter(|&(_, next)| predicate(&self[next]))
            .map(|(dir, _)| dir)
            .collect()
    }

    /// Directions leading to neighbors that have not joined the maze yet.
    pub fn unvisited_directions(&self, coord: Coord) -> Vec<Direction> {
        self.directions_where(coord, |cell| !cell.visited)
    }

    /// Directions leading to neighbors that are already part of the maze.
    pub fn visited_directions(&self, coord: Coord) -> Vec<Direction> {
        self.directions_where(coord, |cell| cell.visited)
    }

    pub fn has_unvisited_neighbor(&self, coord: Coord) -> bool {
        self.neighbors(coord).any(|(_, next)| !self[next].visited)
    }

    pub fn has_visited_neighbor(&self, coord: Coord) -> bool {
        self.neighbors(coord).any(|(_, next)| self[next].visited)
    }

    /// True iff every in-bounds neighbor is visited.
    pub fn is_dead_end(&self, coord: Coord) -> bool {
        !self.has_unvisited_neighbor(coord)
    }

    /// Whether the wall between `coord` and its neighbor in `dir` has been removed.
    pub fn is_open(&self, coord: Coord, dir: Direction) -> bool {
        match (dir, self.neighbor(coord, dir)) {
            (_, None) => false,
            (Direction::Up, Some(_)) => self[coord].passage_up,
            (Direction::Right, Some(_)) => self[coord].passage_right,
            (Direction::Down, Some(next)) => self[next].passage_up,
            (Direction::Left, Some(next)) => self[next].passage_right,
        }
    }

    /// Removes the wall between `coord` and its neighbor in `dir`.
    ///
    /// # Returns
    /// `true` if a wall was removed, `false` if the passage was already open
    ///
    /// # Panics
    /// If the neighbor in `dir` lies outside the maze
    pub fn open_passage(&mut self, coord: Coord, dir: Direction) -> bool {
        let Some(next) = self.neighbor(coord, dir) else {
            panic!("cannot open a passage {} of {:?}, it leads out of the maze", dir, coord);
        };
        let (owner, vertical) = match dir {
            Direction::Up => (coord, true),
            Direction::Down => (next, true),
            Direction::Right => (coord, false),
            Direction::Left => (next, false),
        };
        let idx = self.ravel_index(owner);
        let cell = &mut self.cells[idx];
        let flag = if vertical {
            &mut cell.passage_up
        } else {
            &mut cell.passage_right
        };
        let was_walled = !*flag;
        *flag = true;
        was_walled
    }

    /// Directions reachable through an open passage whose cell the current
    /// solve has not touched yet.
    pub fn neighbors_solvable_from(&self, coord: Coord) -> Vec<Direction> {
        self.neighbors(coord)
            .filter(|&(dir, next)| {
                self.is_open(coord, dir) && self[next].solve_state == SolveState::Unvisited
            })
            .map(|(dir, _)| dir)
            .collect()
    }

    /// Marks a cell as part of the spanning tree. Returns whether it was unvisited.
    pub(crate) fn mark_visited(&mut self, coord: Coord) -> bool {
        let idx = self.ravel_index(coord);
        !std::mem::replace(&mut self.cells[idx].visited, true)
    }

    pub(crate) fn set_region(&mut self, coord: Coord, region_id: u32) {
        let idx = self.ravel_index(coord);
        self.cells[idx].region_id = region_id;
    }

    pub(crate) fn set_solve_state(&mut self, coord: Coord, state: SolveState) {
        let idx = self.ravel_index(coord);
        self.cells[idx].solve_state = state;
    }

    /// Forgets any previous solve, leaving passages untouched.
    pub(crate) fn reset_solve_state(&mut self) {
        self.cells
            .iter_mut()
            .for_each(|cell| cell.solve_state = SolveState::Unvisited);
    }

    /// Iterates over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (self.coord_of(i), cell))
    }

    /// Number of removed walls.
    pub fn open_passage_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.passage_up as usize + cell.passage_right as usize)
            .sum()
    }

    /// Checks that the open passages form a spanning tree: `n - 1` edges that
    /// connect all `n` cells.
    pub fn is_spanning_tree(&self) -> bool {
        if self.open_passage_count() != self.cell_count() - 1 {
            return false;
        }
        let mut seen = vec![false; self.cell_count()];
        let mut queue = VecDeque::from([(0, 0)]);
        seen[0] = true;
        let mut reached = 1;
        while let Some(coord) = queue.pop_front() {
            for (dir, next) in self.neighbors(coord) {
                let idx = self.ravel_index(next);
                if self.is_open(coord, dir) && !seen[idx] {
                    seen[idx] = true;
                    reached += 1;
                    queue.push_back(next);
                }
            }
        }
        reached == self.cell_count()
    }

    /// Cells currently marked `OnPath`, in row-major order.
    ///
    /// This is a set of cells, not a walk: for the path from start to stop in
    /// the order the solver took it, use [`crate::solvers::Solve::path`].
    pub fn cells_on_path(&self) -> Vec<Coord> {
        self.iter()
            .filter(|(_, cell)| cell.solve_state == SolveState::OnPath)
            .map(|(coord, _)| coord)
            .collect()
    }

    fn cell_label(&self, coord: Coord) -> &'static str {
        if coord == self.start {
            "S "
        } else if coord == self.stop {
            "G "
        } else {
            match self[coord].solve_state {
                SolveState::OnPath => "**",
                SolveState::Unvisited | SolveState::Dead => "  ",
            }
        }
    }
}

impl std::ops::Index<Coord> for Maze {
    type Output = Cell;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.cells[self.ravel_index(index)]
    }
}

/// Plain ASCII rendering: `+--+` wall segments, `|` side walls, `S`/`G` endpoints
/// and `**` for cells on the solve path.
impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            for col in 0..self.width {
                let top = if self.is_open((row, col), Direction::Up) {
                    "  "
                } else {
                    "--"
                };
                write!(f, "+{}", top)?;
            }
            writeln!(f, "+")?;
            write!(f, "|")?;
            for col in 0..self.width {
                let side = if self.is_open((row, col), Direction::Right) {
                    " "
                } else {
                    "|"
                };
                write!(f, "{}{}", self.cell_label((row, col)), side)?;
            }
            writeln!(f)?;
        }
        for _ in 0..self.width {
            write!(f, "+--")?;
        }
        writeln!(f, "+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maze_indexing() {
        let maze = Maze::new(3, 5).unwrap();
        assert_eq!(maze.index_of((2, 3)), 13);
        assert_eq!(maze.coord_of(13), (2, 3));
        assert_eq!(maze[(2, 3)].region_id(), 13);
        assert!(!maze[(2, 3)].visited());
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(Maze::new(0, 4), Err(MazeError::Configuration(_))));
        assert!(matches!(Maze::new(4, 0), Err(MazeError::Configuration(_))));
        assert!(matches!(
            Maze::new(u16::MAX, u16::MAX),
            Err(MazeError::Configuration(_))
        ));
    }

    #[test]
    fn test_failed_reset_leaves_maze_untouched() {
        let mut maze = Maze::new(2, 3).unwrap();
        maze.open_passage((0, 0), Direction::Right);
        assert!(maze.reset(0, 3).is_err());
        assert_eq!((maze.height(), maze.width()), (2, 3));
        assert!(maze.is_open((0, 0), Direction::Right));
    }

    #[test]
    fn test_remove_wall() {
        let mut maze = Maze::new(5, 5).unwrap();
        assert!(maze.open_passage((1, 1), Direction::Right));
        // Trying to remove the same wall again should return false
        assert!(!maze.open_passage((1, 1), Direction::Right));
        // Opening it from the other side is the same passage
        assert!(!maze.open_passage((1, 2), Direction::Left));
        assert!(maze.is_open((1, 2), Direction::Left));
        assert!(maze[(1, 1)].passage_right());
        assert!(!maze[(1, 2)].passage_right());
        assert_eq!(maze.open_passage_count(), 1);
    }

    #[test]
    fn test_vertical_passage_is_stored_on_lower_cell() {
        let mut maze = Maze::new(3, 3).unwrap();
        maze.open_passage((0, 1), Direction::Down);
        assert!(maze[(1, 1)].passage_up());
        assert!(!maze[(0, 1)].passage_up());
        assert!(maze.is_open((1, 1), Direction::Up));
        assert!(maze.is_open((0, 1), Direction::Down));
    }

    #[test]
    #[should_panic]
    fn test_open_passage_out_of_maze() {
        let mut maze = Maze::new(2, 2).unwrap();
        maze.open_passage((0, 0), Direction::Up);
    }

    #[test]
    fn test_out_of_bounds() {
        let maze = Maze::new(5, 5).unwrap();
        assert!(!maze.is_in_bounds((5, 5)));
        assert!(!maze.is_in_bounds((0, 5)));
        assert!(!maze.is_in_bounds((5, 0)));
        assert!(maze.is_in_bounds((4, 4)));
        assert_eq!(maze.neighbor((0, 0), Direction::Up), None);
        assert_eq!(maze.neighbor((4, 4), Direction::Right), None);
        assert_eq!(maze.neighbors((0, 0)).count(), 2);
        assert_eq!(maze.neighbors((2, 2)).count(), 4);
    }

    #[test]
    fn test_visited_queries() {
        let mut maze = Maze::new(2, 2).unwrap();
        assert!(maze.has_unvisited_neighbor((0, 0)));
        assert!(!maze.has_visited_neighbor((0, 0)));
        maze.mark_visited((0, 1));
        maze.mark_visited((1, 0));
        assert!(maze.is_dead_end((0, 0)));
        assert!(maze.has_visited_neighbor((1, 1)));
        assert_eq!(maze.visited_directions((0, 0)), vec![Direction::Right, Direction::Down]);
        assert!(maze.unvisited_directions((0, 0)).is_empty());
        assert!(!maze.mark_visited((0, 1)));
    }

    #[test]
    fn test_solvable_neighbors_need_open_passage() {
        let mut maze = Maze::new(2, 2).unwrap();
        maze.open_passage((0, 0), Direction::Right);
        assert_eq!(maze.neighbors_solvable_from((0, 0)), vec![Direction::Right]);
        maze.set_solve_state((0, 1), SolveState::Dead);
        assert!(maze.neighbors_solvable_from((0, 0)).is_empty());
        maze.reset_solve_state();
        assert_eq!(maze.neighbors_solvable_from((0, 0)), vec![Direction::Right]);
    }

    #[test]
    fn test_spanning_tree_check() {
        let mut maze = Maze::new(2, 2).unwrap();
        maze.open_passage((0, 0), Direction::Right);
        maze.open_passage((0, 0), Direction::Down);
        assert!(!maze.is_spanning_tree());
        maze.open_passage((1, 0), Direction::Right);
        assert!(maze.is_spanning_tree());
        maze.open_passage((0, 1), Direction::Down);
        assert!(!maze.is_spanning_tree());
    }

    #[test]
    fn test_endpoints() {
        let mut maze = Maze::new(3, 4).unwrap();
        assert!(maze.set_endpoints((0, 0), (3, 0)).is_err());
        maze.set_endpoints((2, 3), (0, 0)).unwrap();
        assert_eq!((maze.start(), maze.stop()), ((2, 3), (0, 0)));

        let mut rng = RandomSource::new(3);
        for _ in 0..16 {
            maze.choose_endpoints(&mut rng);
            let (start, stop) = (maze.start(), maze.stop());
            assert_eq!(start.0 + stop.0, 2);
            assert_eq!(start.1 + stop.1, 3);
        }
    }

    #[test]
    fn test_cells_on_path_are_row_major() {
        let mut maze = Maze::new(2, 2).unwrap();
        for coord in [(1, 1), (0, 1), (0, 0)] {
            maze.set_solve_state(coord, SolveState::OnPath);
        }
        maze.set_solve_state((1, 0), SolveState::Dead);
        assert_eq!(maze.cells_on_path(), vec![(0, 0), (0, 1), (1, 1)]);
        maze.reset_solve_state();
        assert!(maze.cells_on_path().is_empty());
    }

    #[test]
    fn test_display() {
        let mut maze = Maze::new(1, 3).unwrap();
        maze.set_endpoints((0, 0), (0, 2)).unwrap();
        maze.open_passage((0, 0), Direction::Right);
        let expected = "+--+--+--+\n|S    |G |\n+--+--+--+\n";
        assert_eq!(maze.to_string(), expected);
    }
}
