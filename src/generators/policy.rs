use std::fmt;

use crate::{maze::Direction, random::RandomSource};

/// How a walk picks its next direction among the valid ones.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionPolicy {
    /// Uniform over every valid direction.
    #[default]
    Straight,
    /// Uniform over the valid directions that turn, falling back to going
    /// straight on when that is the only valid move.
    Jagged,
}

impl DirectionPolicy {
    /// Picks one of `candidates`.
    ///
    /// `arrival` is the side of the current cell the walk entered through, `None`
    /// for the first cell of a walk. Its reverse is the direction that keeps
    /// going straight on.
    ///
    /// # Panics
    /// If `candidates` is empty. Callers only ask for a direction after
    /// checking that one exists.
    pub fn choose(
        self,
        candidates: &[Direction],
        arrival: Option<Direction>,
        rng: &mut RandomSource,
    ) -> Direction {
        assert!(
            !candidates.is_empty(),
            "asked for a direction with no valid candidate"
        );
        match (self, arrival) {
            (DirectionPolicy::Jagged, Some(arrival)) => {
                let straight_on = arrival.reverse();
                let turns = candidates
                    .iter()
                    .copied()
                    .filter(|&dir| dir != straight_on)
                    .collect::<Vec<_>>();
                if turns.is_empty() {
                    straight_on
                } else {
                    rng.pick(&turns)
                }
            }
            _ => rng.pick(candidates),
        }
    }
}

impl fmt::Display for DirectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionPolicy::Straight => write!(f, "Straight"),
            DirectionPolicy::Jagged => write!(f, "Jagged"),
        }
    }
}
