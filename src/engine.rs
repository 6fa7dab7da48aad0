use std::sync::{Arc, atomic::AtomicBool};

use crate::{
    error::{MazeError, Result},
    generators::{Generation, Generator},
    maze::{Coord, Maze},
    solvers::Solve,
};

/// Mixed into the run seed for the solver, so its random choices do not
/// depend on how much randomness the generator consumed.
const SOLVE_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Where the engine is in its configure → generate → solve lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Configured,
    /// A generation was started but has not yielded `GenerationComplete`.
    Generating,
    Generated,
    Solving,
    Solved,
}

/// Owns one maze and runs generators and the solver over it.
pub struct MazeEngine {
    maze: Maze,
    generator: Generator,
    seed: u64,
    phase: Phase,
    cancel: Option<Arc<AtomicBool>>,
}

impl MazeEngine {
    pub fn new(height: u16, width: u16, generator: Generator, seed: u64) -> Result<Self> {
        Ok(MazeEngine {
            maze: Maze::new(height, width)?,
            generator,
            seed,
            phase: Phase::Configured,
            cancel: None,
        })
    }

    /// Resets the maze to the given dimensions and selects the next run's
    /// generator and seed. Nothing changes if the dimensions are invalid.
    pub fn configure(
        &mut self,
        height: u16,
        width: u16,
        generator: Generator,
        seed: u64,
    ) -> Result<()> {
        self.maze.reset(height, width)?;
        self.generator = generator;
        self.seed = seed;
        self.phase = Phase::Configured;
        tracing::debug!(
            "[engine] configured {}x{} {} seed {}",
            height,
            width,
            generator,
            seed
        );
        Ok(())
    }

    /// Flag checked between events; once set, running sequences end early.
    pub fn set_cancel_flag(&mut self, flag: Option<Arc<AtomicBool>>) {
        self.cancel = flag;
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn generator(&self) -> Generator {
        self.generator
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether a generation ran to completion since the last `configure`.
    pub fn is_generated(&self) -> bool {
        matches!(
            self.phase,
            Phase::Generated | Phase::Solving | Phase::Solved
        )
    }

    pub fn is_solved(&self) -> bool {
        self.phase == Phase::Solved
    }

    /// Starts a fresh generation, wiping whatever the maze held before.
    pub fn generate(&mut self) -> Generation<'_> {
        if self.phase == Phase::Generating {
            tracing::debug!("[engine] discarding an unfinished generation");
        }
        self.maze.clear();
        Generation::new(
            &mut self.maze,
            &mut self.phase,
            self.generator,
            self.seed,
            self.cancel.clone(),
        )
    }

    /// Overrides the corners picked by the last generation. Clears any
    /// earlier solve.
    ///
    /// Every generation picks its own corners, so this fails with
    /// [`MazeError::Precondition`] until one has completed.
    pub fn set_endpoints(&mut self, start: Coord, stop: Coord) -> Result<()> {
        if !self.is_generated() {
            return Err(MazeError::Precondition(format!(
                "cannot place endpoints before a generation has completed (engine is {:?})",
                self.phase
            )));
        }
        self.maze.set_endpoints(start, stop)?;
        self.maze.reset_solve_state();
        if matches!(self.phase, Phase::Solving | Phase::Solved) {
            self.phase = Phase::Generated;
        }
        Ok(())
    }

    /// Starts walking from the start to the stop corner.
    ///
    /// Fails with [`MazeError::Precondition`] unless a generation ran to
    /// completion since the last `configure`.
    pub fn solve(&mut self) -> Result<Solve<'_>> {
        if !self.is_generated() {
            return Err(MazeError::Precondition(format!(
                "cannot solve before a generation has completed (engine is {:?})",
                self.phase
            )));
        }
        Ok(Solve::new(
            &mut self.maze,
            &mut self.phase,
            self.seed ^ SOLVE_SEED_SALT,
            self.cancel.clone(),
        ))
    }
}
