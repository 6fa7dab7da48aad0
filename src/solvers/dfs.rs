use std::collections::VecDeque;

use super::SolveEvent;
use crate::{
    generators::Step,
    maze::{Coord, Maze, SolveState},
    random::RandomSource,
};

/// Depth-first walk from start to goal through open passages.
///
/// In a perfect maze there is exactly one simple path between two cells, so
/// whatever is left on the stack once the goal is reached is that path.
pub(crate) struct DepthFirst {
    stack: Vec<Coord>,
    goal: Coord,
}

impl DepthFirst {
    pub fn start(maze: &mut Maze, out: &mut VecDeque<SolveEvent>) -> Self {
        let start = maze.start();
        maze.set_solve_state(start, SolveState::OnPath);
        out.push_back(SolveEvent::CellMarkedOnPath(start));
        DepthFirst {
            stack: vec![start],
            goal: maze.stop(),
        }
    }

    /// Cells from start to the current head of the walk.
    pub fn path(&self) -> &[Coord] {
        &self.stack
    }

    pub fn step(
        &mut self,
        maze: &mut Maze,
        rng: &mut RandomSource,
        out: &mut VecDeque<SolveEvent>,
    ) -> Step {
        let Some(&cell) = self.stack.last() else {
            unreachable!("goal {:?} is not connected to the start", self.goal);
        };

        if cell == self.goal {
            out.push_back(SolveEvent::SolveComplete);
            return Step::Done;
        }

        let candidates = maze.neighbors_solvable_from(cell);
        if candidates.is_empty() {
            maze.set_solve_state(cell, SolveState::Dead);
            out.push_back(SolveEvent::CellMarkedDead(cell));
            self.stack.pop();
            return Step::Continue;
        }

        let dir = rng.pick(&candidates);
        let Some(next) = maze.neighbor(cell, dir) else {
            unreachable!("open passage {} of {:?} leaves the maze", dir, cell);
        };
        maze.set_solve_state(next, SolveState::OnPath);
        out.push_back(SolveEvent::CellMarkedOnPath(next));
        self.stack.push(next);
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Direction;

    /// 3x3 maze shaped like a comb: the top row is a corridor and every
    /// column hangs off it.
    fn comb() -> Maze {
        let mut maze = Maze::new(3, 3).unwrap();
        maze.open_passage((0, 0), Direction::Right);
        maze.open_passage((0, 1), Direction::Right);
        for col in 0..3 {
            maze.open_passage((0, col), Direction::Down);
            maze.open_passage((1, col), Direction::Down);
        }
        assert!(maze.is_spanning_tree());
        maze
    }

    #[test]
    fn test_solve_dfs() {
        let mut maze = comb();
        maze.set_endpoints((2, 0), (2, 2)).unwrap();
        let mut rng = RandomSource::new(0);
        let mut out = VecDeque::new();
        let mut dfs = DepthFirst::start(&mut maze, &mut out);
        while dfs.step(&mut maze, &mut rng, &mut out) == Step::Continue {}

        assert_eq!(
            dfs.path(),
            &[(2, 0), (1, 0), (0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]
        );
        assert_eq!(out.back(), Some(&SolveEvent::SolveComplete));
        // The middle column is the only possible detour
        for (coord, cell) in maze.iter() {
            if dfs.path().contains(&coord) {
                assert_eq!(cell.solve_state(), SolveState::OnPath);
            } else {
                assert_ne!(cell.solve_state(), SolveState::OnPath);
            }
        }
    }

    #[test]
    fn test_start_is_goal() {
        let mut maze = Maze::new(1, 1).unwrap();
        let mut out = VecDeque::new();
        let mut dfs = DepthFirst::start(&mut maze, &mut out);
        assert_eq!(
            dfs.step(&mut maze, &mut RandomSource::new(0), &mut out),
            Step::Done
        );
        assert_eq!(
            out.into_iter().collect::<Vec<_>>(),
            vec![SolveEvent::CellMarkedOnPath((0, 0)), SolveEvent::SolveComplete]
        );
    }
}
