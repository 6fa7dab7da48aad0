use crate::{
    generators::{DirectionPolicy, GenerationEvent, RunContext, Step, Strategy},
    maze::{Coord, Direction, Maze},
};

/// Randomized depth-first search with an explicit stack.
pub(crate) struct RecurBacktrack {
    policy: DirectionPolicy,
    /// Cells of the current walk with the side each one was entered through.
    stack: Vec<(Coord, Option<Direction>)>,
}

impl RecurBacktrack {
    pub fn new(policy: DirectionPolicy) -> Self {
        RecurBacktrack {
            policy,
            stack: Vec::new(),
        }
    }
}

impl Strategy for RecurBacktrack {
    fn start(&mut self, maze: &mut Maze, ctx: &mut RunContext) {
        let start = ctx.random_cell(maze);
        ctx.enter(maze, start);
        self.stack.push((start, None));
    }

    fn step(&mut self, maze: &mut Maze, ctx: &mut RunContext) -> Step {
        let Some(&(cell, arrival)) = self.stack.last() else {
            return Step::Done;
        };

        let candidates = maze.unvisited_directions(cell);
        if candidates.is_empty() {
            ctx.emit(GenerationEvent::Backtracked(cell));
            self.stack.pop();
            return Step::Continue;
        }

        let dir = self.policy.choose(&candidates, arrival, &mut ctx.rng);
        let next = ctx.carve(maze, cell, dir);
        // `cell` stays below `next` so its other neighbors get looked at later
        self.stack.push((next, Some(dir.reverse())));
        Step::Continue
    }
}
