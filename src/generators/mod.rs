use std::{
    collections::VecDeque,
    iter::FusedIterator,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

mod hunt_and_kill;
mod kruskal;
mod policy;
mod prim;
mod recur_backtrack;
mod region;

pub use policy::DirectionPolicy;
pub use region::RegionTracker;

use crate::{
    engine::Phase,
    error::MazeError,
    maze::{Coord, Direction, Maze},
    random::RandomSource,
};
use hunt_and_kill::HuntAndKill;
use kruskal::Kruskal;
use prim::Prim;
use recur_backtrack::RecurBacktrack;

/// Structural change made to the maze while it is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationEvent {
    /// The cell joined the spanning tree.
    CellEntered(Coord),
    /// The wall between the cell and its neighbor in the given direction was removed.
    PassageOpened(Coord, Direction),
    /// The cell became a frontier candidate (Prim only).
    FrontierMarked(Coord),
    /// Two regions were joined; cells of `loser` now belong to `winner` (Kruskal only).
    RegionsMerged { loser: u32, winner: u32 },
    /// The walk stepped back from a cell with no unvisited neighbor left.
    Backtracked(Coord),
    GenerationComplete,
}

/// Available maze generation algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generator {
    RecurBacktrack(DirectionPolicy),
    HuntAndKill(DirectionPolicy),
    Prim,
    Kruskal,
}

impl Generator {
    pub const ALL: [Generator; 6] = [
        Generator::RecurBacktrack(DirectionPolicy::Straight),
        Generator::RecurBacktrack(DirectionPolicy::Jagged),
        Generator::HuntAndKill(DirectionPolicy::Straight),
        Generator::HuntAndKill(DirectionPolicy::Jagged),
        Generator::Prim,
        Generator::Kruskal,
    ];

    /// Short identifier accepted by [`Generator::from_str`].
    pub fn name(&self) -> &'static str {
        match self {
            Generator::RecurBacktrack(DirectionPolicy::Straight) => "backtrack-straight",
            Generator::RecurBacktrack(DirectionPolicy::Jagged) => "backtrack-jagged",
            Generator::HuntAndKill(DirectionPolicy::Straight) => "hunt-and-kill-straight",
            Generator::HuntAndKill(DirectionPolicy::Jagged) => "hunt-and-kill-jagged",
            Generator::Prim => "prim",
            Generator::Kruskal => "kruskal",
        }
    }

    fn strategy(self) -> Box<dyn Strategy> {
        match self {
            Generator::RecurBacktrack(policy) => Box::new(RecurBacktrack::new(policy)),
            Generator::HuntAndKill(policy) => Box::new(HuntAndKill::new(policy)),
            Generator::Prim => Box::new(Prim::default()),
            Generator::Kruskal => Box::new(Kruskal::default()),
        }
    }
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generator::RecurBacktrack(policy) => write!(f, "Recursive Backtracker ({})", policy),
            Generator::HuntAndKill(policy) => write!(f, "Hunt-and-Kill ({})", policy),
            Generator::Prim => write!(f, "Prim's Algorithm"),
            Generator::Kruskal => write!(f, "Kruskal's Algorithm"),
        }
    }
}

impl FromStr for Generator {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Generator::ALL
            .into_iter()
            .find(|generator| generator.name() == wanted)
            .ok_or_else(|| MazeError::UnknownGenerator(s.to_string()))
    }
}

/// Outcome of a single strategy step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    Done,
}

/// State owned by one generation run and handed to its strategy on every step.
pub(crate) struct RunContext {
    pub rng: RandomSource,
    events: VecDeque<GenerationEvent>,
    visited: usize,
}

impl RunContext {
    pub fn new(seed: u64) -> Self {
        RunContext {
            rng: RandomSource::new(seed),
            events: VecDeque::new(),
            visited: 0,
        }
    }

    pub fn emit(&mut self, event: GenerationEvent) {
        self.events.push_back(event);
    }

    /// Number of cells that joined the spanning tree so far.
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// A uniformly random cell of the maze.
    pub fn random_cell(&mut self, maze: &Maze) -> Coord {
        maze.coord_of(self.rng.index(maze.cell_count()))
    }

    /// Adds a cell to the spanning tree.
    pub fn enter(&mut self, maze: &mut Maze, coord: Coord) {
        if maze.mark_visited(coord) {
            self.visited += 1;
        }
        self.emit(GenerationEvent::CellEntered(coord));
    }

    /// Walks from `from` into its neighbor in `dir`, opening the wall on the way.
    /// Returns the neighbor.
    pub fn carve(&mut self, maze: &mut Maze, from: Coord, dir: Direction) -> Coord {
        let Some(next) = maze.neighbor(from, dir) else {
            unreachable!("carving {} from {:?} leaves the maze", dir, from);
        };
        maze.open_passage(from, dir);
        self.enter(maze, next);
        self.emit(GenerationEvent::PassageOpened(from, dir));
        next
    }

    /// Adds `cell` to the spanning tree through the wall towards `dir`.
    pub fn attach(&mut self, maze: &mut Maze, cell: Coord, dir: Direction) {
        maze.open_passage(cell, dir);
        self.enter(maze, cell);
        self.emit(GenerationEvent::PassageOpened(cell, dir));
    }
}

/// One maze generation algorithm, advanced a step at a time.
pub(crate) trait Strategy {
    /// Picks the initial cell(s) before the first step.
    fn start(&mut self, maze: &mut Maze, ctx: &mut RunContext);

    /// Performs one unit of work, queueing its events on `ctx`.
    fn step(&mut self, maze: &mut Maze, ctx: &mut RunContext) -> Step;

    /// Region `cell` belongs to right now, for strategies that track regions
    /// apart from the cells.
    fn region_of(&mut self, _maze: &Maze, _cell: Coord) -> Option<u32> {
        None
    }
}

/// Lazy sequence of events produced by one generation run.
///
/// The run mutably borrows the engine, so nothing else can touch the maze
/// while events are pending. Dropping it early leaves the maze half-built and
/// the engine refuses to solve it.
pub struct Generation<'a> {
    maze: &'a mut Maze,
    phase: &'a mut Phase,
    generator: Generator,
    strategy: Box<dyn Strategy>,
    ctx: RunContext,
    cancel: Option<Arc<AtomicBool>>,
    elapsed: Duration,
    exhausted: bool,
    finished: bool,
}

impl<'a> Generation<'a> {
    /// Starts a run on an already reset maze.
    pub(crate) fn new(
        maze: &'a mut Maze,
        phase: &'a mut Phase,
        generator: Generator,
        seed: u64,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Self {
        let started = Instant::now();
        let mut ctx = RunContext::new(seed);
        maze.choose_endpoints(&mut ctx.rng);
        let mut strategy = generator.strategy();
        strategy.start(maze, &mut ctx);
        *phase = Phase::Generating;
        tracing::info!(
            "[generate] {} on {}x{} with seed {}",
            generator,
            maze.height(),
            maze.width(),
            seed
        );
        Generation {
            maze,
            phase,
            generator,
            strategy,
            ctx,
            cancel,
            elapsed: started.elapsed(),
            exhausted: false,
            finished: false,
        }
    }

    /// Wall-clock time spent inside the generator so far, excluding the time the
    /// caller spends between pulls.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn generator(&self) -> Generator {
        self.generator
    }

    /// Number of cells that joined the maze so far.
    pub fn visited_cells(&self) -> usize {
        self.ctx.visited()
    }

    /// The maze in its current, possibly unfinished, state.
    pub fn maze(&self) -> &Maze {
        &*self.maze
    }

    /// Region `coord` belongs to at this point of the run.
    ///
    /// Kruskal only writes region ids into the cells once the last merge is
    /// done, so mid-run [`Cell::region_id`](crate::maze::Cell::region_id) lags
    /// behind `RegionsMerged` while this does not.
    pub fn region_of(&mut self, coord: Coord) -> u32 {
        self.strategy
            .region_of(&*self.maze, coord)
            .unwrap_or_else(|| self.maze[coord].region_id())
    }

    /// Whether `GenerationComplete` has been yielded.
    pub fn is_complete(&self) -> bool {
        matches!(*self.phase, Phase::Generated)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl Iterator for Generation<'_> {
    type Item = GenerationEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.is_cancelled() {
            tracing::info!(
                "[generate] cancelled after {} of {} cells",
                self.ctx.visited(),
                self.maze.cell_count()
            );
            self.finished = true;
            return None;
        }
        loop {
            if let Some(event) = self.ctx.events.pop_front() {
                if event == GenerationEvent::GenerationComplete {
                    *self.phase = Phase::Generated;
                    self.finished = true;
                    tracing::info!(
                        "[generate] {} finished in {:?}",
                        self.generator,
                        self.elapsed
                    );
                }
                return Some(event);
            }
            if self.exhausted {
                return None;
            }
            let started = Instant::now();
            let step = self.strategy.step(self.maze, &mut self.ctx);
            self.elapsed += started.elapsed();
            if step == Step::Done {
                debug_assert_eq!(self.ctx.visited(), self.maze.cell_count());
                self.ctx.emit(GenerationEvent::GenerationComplete);
                self.exhausted = true;
            }
        }
    }
}

impl FusedIterator for Generation<'_> {}
