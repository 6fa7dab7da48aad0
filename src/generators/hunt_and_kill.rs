use crate::{
    generators::{DirectionPolicy, RunContext, Step, Strategy},
    maze::{Coord, Direction, Maze},
};

/// Hunt-and-Kill: random walks ("kill") that, once stuck, resume from an
/// unvisited cell bordering the maze found by a row-major scan ("hunt").
pub(crate) struct HuntAndKill {
    policy: DirectionPolicy,
    /// Head of the current walk and the side it was entered through.
    /// `None` while hunting.
    walk: Option<(Coord, Option<Direction>)>,
    /// Every row above this one is fully visited.
    hunt_row: u16,
}

impl HuntAndKill {
    pub fn new(policy: DirectionPolicy) -> Self {
        HuntAndKill {
            policy,
            walk: None,
            hunt_row: 0,
        }
    }

    /// First unvisited cell, in row-major order, with at least one visited neighbor.
    fn hunt(&mut self, maze: &Maze) -> Option<Coord> {
        while self.hunt_row < maze.height()
            && (0..maze.width()).all(|col| maze[(self.hunt_row, col)].visited())
        {
            self.hunt_row += 1;
        }
        (self.hunt_row..maze.height())
            .flat_map(|row| (0..maze.width()).map(move |col| (row, col)))
            .find(|&coord| !maze[coord].visited() && maze.has_visited_neighbor(coord))
    }
}

impl Strategy for HuntAndKill {
    fn start(&mut self, maze: &mut Maze, ctx: &mut RunContext) {
        let start = ctx.random_cell(maze);
        ctx.enter(maze, start);
        self.walk = Some((start, None));
    }

    fn step(&mut self, maze: &mut Maze, ctx: &mut RunContext) -> Step {
        if let Some((cell, arrival)) = self.walk {
            if maze.is_dead_end(cell) {
                tracing::trace!("[hunt-and-kill] dead end at {:?}, hunting", cell);
                self.walk = None;
                return Step::Continue;
            }
            let candidates = maze.unvisited_directions(cell);
            let dir = self.policy.choose(&candidates, arrival, &mut ctx.rng);
            let next = ctx.carve(maze, cell, dir);
            self.walk = Some((next, Some(dir.reverse())));
            return Step::Continue;
        }

        if ctx.visited() == maze.cell_count() {
            return Step::Done;
        }
        let Some(cell) = self.hunt(maze) else {
            unreachable!(
                "{} cells left unvisited but none borders the maze",
                maze.cell_count() - ctx.visited()
            );
        };
        let candidates = maze.visited_directions(cell);
        let dir = self.policy.choose(&candidates, None, &mut ctx.rng);
        ctx.attach(maze, cell, dir);
        self.walk = Some((cell, Some(dir)));
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::GenerationEvent;

    fn run(maze: &mut Maze, policy: DirectionPolicy, seed: u64) -> RunContext {
        let mut ctx = RunContext::new(seed);
        let mut strategy = HuntAndKill::new(policy);
        strategy.start(maze, &mut ctx);
        while strategy.step(maze, &mut ctx) == Step::Continue {}
        ctx
    }

    #[test]
    fn test_hunt_and_kill() {
        for policy in [DirectionPolicy::Straight, DirectionPolicy::Jagged] {
            for seed in 0..8 {
                let mut maze = Maze::new(12, 7).unwrap();
                let ctx = run(&mut maze, policy, seed);
                assert!(maze.is_spanning_tree());
                assert_eq!(ctx.visited(), maze.cell_count());
            }
        }
    }

    #[test]
    fn test_never_backtracks() {
        let mut maze = Maze::new(6, 6).unwrap();
        let mut ctx = run(&mut maze, DirectionPolicy::Straight, 3);
        assert!(
            !ctx.events
                .drain(..)
                .any(|event| matches!(event, GenerationEvent::Backtracked(_)))
        );
    }

    #[test]
    fn test_hunt_scans_row_major() {
        let mut maze = Maze::new(3, 3).unwrap();
        maze.mark_visited((1, 1));
        let mut strategy = HuntAndKill::new(DirectionPolicy::Straight);
        assert_eq!(strategy.hunt(&maze), Some((0, 1)));

        (0..3).for_each(|col| {
            maze.mark_visited((0, col));
        });
        assert_eq!(strategy.hunt(&maze), Some((1, 0)));
        assert_eq!(strategy.hunt_row, 1);
    }
}
