/// Progress of the solver through a single cell.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    /// Not reached by the current solve yet.
    #[default]
    Unvisited,
    /// On the stack of the current solve, i.e. part of the candidate route.
    OnPath,
    /// Fully explored without reaching the goal.
    Dead,
}

/// Per-cell maze state.
///
/// Only the passages towards the upper and the right neighbor are stored here.
/// The passage towards the lower neighbor lives on that neighbor's `passage_up`,
/// the one towards the left neighbor on that neighbor's `passage_right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub(crate) passage_up: bool,
    pub(crate) passage_right: bool,
    pub(crate) visited: bool,
    pub(crate) region_id: u32,
    pub(crate) solve_state: SolveState,
}

impl Cell {
    /// A fully walled, unvisited cell forming its own region.
    pub(crate) fn walled(region_id: u32) -> Self {
        Cell {
            passage_up: false,
            passage_right: false,
            visited: false,
            region_id,
            solve_state: SolveState::Unvisited,
        }
    }

    pub fn passage_up(&self) -> bool {
        self.passage_up
    }

    pub fn passage_right(&self) -> bool {
        self.passage_right
    }

    pub fn visited(&self) -> bool {
        self.visited
    }

    /// Kruskal writes the surviving region into every cell once its last merge
    /// is done; while it runs, ask the generation for the live region instead.
    pub fn region_id(&self) -> u32 {
        self.region_id
    }

    pub fn solve_state(&self) -> SolveState {
        self.solve_state
    }
}
