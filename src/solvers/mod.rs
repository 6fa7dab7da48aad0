use std::{
    collections::VecDeque,
    iter::FusedIterator,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

mod dfs;

use crate::{
    engine::Phase,
    generators::Step,
    maze::{Coord, Maze},
    random::RandomSource,
};
use dfs::DepthFirst;

/// Change of a cell's solve state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveEvent {
    CellMarkedOnPath(Coord),
    CellMarkedDead(Coord),
    SolveComplete,
}

/// Lazy sequence of events walking from the maze's start to its stop.
pub struct Solve<'a> {
    maze: &'a mut Maze,
    phase: &'a mut Phase,
    walker: DepthFirst,
    rng: RandomSource,
    pending: VecDeque<SolveEvent>,
    cancel: Option<Arc<AtomicBool>>,
    elapsed: Duration,
    exhausted: bool,
    finished: bool,
}

impl<'a> Solve<'a> {
    /// Starts a solve on a fully generated maze, clearing any earlier solve.
    pub(crate) fn new(
        maze: &'a mut Maze,
        phase: &'a mut Phase,
        seed: u64,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Self {
        let started = Instant::now();
        maze.reset_solve_state();
        let mut pending = VecDeque::new();
        let walker = DepthFirst::start(maze, &mut pending);
        *phase = Phase::Solving;
        tracing::info!(
            "[solve] from {:?} to {:?}",
            maze.start(),
            maze.stop()
        );
        Solve {
            maze,
            phase,
            walker,
            rng: RandomSource::new(seed),
            pending,
            cancel,
            elapsed: started.elapsed(),
            exhausted: false,
            finished: false,
        }
    }

    /// Cells from the start to the head of the walk. Once the sequence is
    /// complete this is the solution, start and stop included.
    pub fn path(&self) -> &[Coord] {
        self.walker.path()
    }

    /// Wall-clock time spent inside the solver so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn maze(&self) -> &Maze {
        &*self.maze
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl Iterator for Solve<'_> {
    type Item = SolveEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.is_cancelled() {
            tracing::info!("[solve] cancelled");
            self.finished = true;
            return None;
        }
        loop {
            if let Some(event) = self.pending.pop_front() {
                if event == SolveEvent::SolveComplete {
                    *self.phase = Phase::Solved;
                    self.finished = true;
                    tracing::info!(
                        "[solve] path of {} cells found in {:?}",
                        self.walker.path().len(),
                        self.elapsed
                    );
                }
                return Some(event);
            }
            if self.exhausted {
                return None;
            }
            let started = Instant::now();
            let step = self.walker.step(self.maze, &mut self.rng, &mut self.pending);
            self.elapsed += started.elapsed();
            self.exhausted = step == Step::Done;
        }
    }
}

impl FusedIterator for Solve<'_> {}
