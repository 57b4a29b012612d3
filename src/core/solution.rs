use super::{Schedule, Score};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// A schedule together with its score.
#[derive(Clone, Debug, Eq, Hash, Serialize, PartialEq)]
pub struct Solution {
    pub schedule: Schedule,
    pub score: Score,
}

impl Solution {
    /// Creates a new solution.
    #[must_use]
    pub const fn new(schedule: Schedule, score: Score) -> Self {
        Self { schedule, score }
    }

    /// Returns whether this solution scores strictly lower than the other one.
    #[must_use]
    pub const fn is_better_than(&self, other: &Self) -> bool {
        self.score < other.score
    }
}

/// Single-slot hand-off of the best solution found so far.
///
/// The search publishes into it after every improvement; a supervisor may take snapshots at
/// any time, even while the search keeps mutating its own working schedule. Stored and
/// returned solutions are always owned copies.
#[derive(Debug, Default)]
pub struct Incumbent {
    slot: Mutex<Option<Solution>>,
}

impl Incumbent {
    /// Creates an empty incumbent.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Stores a copy of the solution if it is strictly better than the stored one.
    /// Returns whether it was stored.
    pub fn publish(&self, solution: &Solution) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(best) if !solution.is_better_than(best) => false,
            _ => {
                *slot = Some(solution.clone());
                true
            }
        }
    }

    /// Returns a copy of the stored solution.
    #[must_use]
    pub fn snapshot(&self) -> Option<Solution> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the score of the stored solution.
    #[must_use]
    pub fn score(&self) -> Option<Score> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(|solution| solution.score)
    }
}
