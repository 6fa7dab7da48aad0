use crate::{
    error::Result,
    generators::{GenerationEvent, Generator},
    maze::{Coord, Direction},
    solvers::SolveEvent,
};

/// What a run is about to do, handed to observers before the first event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunInfo {
    pub height: u16,
    pub width: u16,
    pub generator: Generator,
    pub seed: u64,
}

/// Receives engine events one at a time, in the order they were produced.
///
/// Every method defaults to doing nothing, so an observer only implements
/// what it draws or records.
pub trait MazeObserver {
    fn on_run_started(&mut self, _info: &RunInfo) -> Result<()> {
        Ok(())
    }

    fn on_cell_entered(&mut self, _cell: Coord) -> Result<()> {
        Ok(())
    }

    fn on_passage_opened(&mut self, _cell: Coord, _dir: Direction) -> Result<()> {
        Ok(())
    }

    fn on_frontier_marked(&mut self, _cell: Coord) -> Result<()> {
        Ok(())
    }

    fn on_regions_merged(&mut self, _loser: u32, _winner: u32) -> Result<()> {
        Ok(())
    }

    fn on_backtracked(&mut self, _cell: Coord) -> Result<()> {
        Ok(())
    }

    fn on_generation_complete(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_solve_started(&mut self, _start: Coord, _stop: Coord) -> Result<()> {
        Ok(())
    }

    fn on_cell_marked_on_path(&mut self, _cell: Coord) -> Result<()> {
        Ok(())
    }

    fn on_cell_marked_dead(&mut self, _cell: Coord) -> Result<()> {
        Ok(())
    }

    fn on_solve_complete(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called after every delivered event.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Hands one generation event to the matching observer method.
pub fn notify_generation<O: MazeObserver + ?Sized>(
    observer: &mut O,
    event: GenerationEvent,
) -> Result<()> {
    match event {
        GenerationEvent::CellEntered(cell) => observer.on_cell_entered(cell)?,
        GenerationEvent::PassageOpened(cell, dir) => observer.on_passage_opened(cell, dir)?,
        GenerationEvent::FrontierMarked(cell) => observer.on_frontier_marked(cell)?,
        GenerationEvent::RegionsMerged { loser, winner } => {
            observer.on_regions_merged(loser, winner)?
        }
        GenerationEvent::Backtracked(cell) => observer.on_backtracked(cell)?,
        GenerationEvent::GenerationComplete => observer.on_generation_complete()?,
    }
    observer.flush()
}

/// Hands one solve event to the matching observer method.
pub fn notify_solve<O: MazeObserver + ?Sized>(observer: &mut O, event: SolveEvent) -> Result<()> {
    match event {
        SolveEvent::CellMarkedOnPath(cell) => observer.on_cell_marked_on_path(cell)?,
        SolveEvent::CellMarkedDead(cell) => observer.on_cell_marked_dead(cell)?,
        SolveEvent::SolveComplete => observer.on_solve_complete()?,
    }
    observer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tally {
        entered: usize,
        opened: usize,
        completed: usize,
        flushes: usize,
    }

    impl MazeObserver for Tally {
        fn on_cell_entered(&mut self, _cell: Coord) -> Result<()> {
            self.entered += 1;
            Ok(())
        }

        fn on_passage_opened(&mut self, _cell: Coord, _dir: Direction) -> Result<()> {
            self.opened += 1;
            Ok(())
        }

        fn on_solve_complete(&mut self) -> Result<()> {
            self.completed += 1;
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_notify_dispatches_and_flushes() {
        let mut tally = Tally::default();
        let events = [
            GenerationEvent::CellEntered((0, 0)),
            GenerationEvent::CellEntered((0, 1)),
            GenerationEvent::PassageOpened((0, 0), Direction::Right),
            GenerationEvent::Backtracked((0, 1)),
            GenerationEvent::GenerationComplete,
        ];
        for event in events {
            notify_generation(&mut tally, event).unwrap();
        }
        notify_solve(&mut tally, SolveEvent::SolveComplete).unwrap();

        assert_eq!(tally.entered, 2);
        assert_eq!(tally.opened, 1);
        assert_eq!(tally.completed, 1);
        assert_eq!(tally.flushes, 6);
    }
}
