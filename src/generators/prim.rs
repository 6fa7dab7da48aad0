use indexmap::IndexSet;

use crate::{
    generators::{GenerationEvent, RunContext, Step, Strategy},
    maze::{Coord, Maze},
};

/// Randomized Prim's algorithm over an explicit frontier set.
#[derive(Default)]
pub(crate) struct Prim {
    /// Unvisited cells adjacent to the maze. Insertion ordered, so removing a
    /// random member depends on the seed only.
    frontier: IndexSet<Coord>,
}

impl Prim {
    /// Adds the unvisited neighbors of a freshly visited cell to the frontier set.
    fn mark_frontier(&mut self, maze: &Maze, ctx: &mut RunContext, cell: Coord) {
        for (_, next) in maze.neighbors(cell) {
            // Only report cells that were not already on the frontier
            if !maze[next].visited() && self.frontier.insert(next) {
                ctx.emit(GenerationEvent::FrontierMarked(next));
            }
        }
    }
}

impl Strategy for Prim {
    fn start(&mut self, maze: &mut Maze, ctx: &mut RunContext) {
        let start = ctx.random_cell(maze);
        ctx.enter(maze, start);
        self.mark_frontier(maze, ctx, start);
    }

    fn step(&mut self, maze: &mut Maze, ctx: &mut RunContext) -> Step {
        if self.frontier.is_empty() {
            return Step::Done;
        }
        let idx = ctx.rng.index(self.frontier.len());
        let Some(cell) = self.frontier.swap_remove_index(idx) else {
            unreachable!("frontier index {} out of range", idx);
        };

        // A frontier cell always borders at least one visited cell
        let candidates = maze.visited_directions(cell);
        let dir = ctx.rng.pick(&candidates);
        ctx.attach(maze, cell, dir);
        self.mark_frontier(maze, ctx, cell);
        Step::Continue
    }
}
