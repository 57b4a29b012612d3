use super::{Instance, Move};
use crate::cast_usize;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Swap,
    Relocate,
    Done,
}

/// Deterministic enumeration of every move of a schedule.
///
/// All swaps come first (machine, then slot pairs `i < j`), followed by all relocations
/// (machine, then slot, then every start in `0..max_time_units`). Moves are produced one at
/// a time and may be inapplicable to the current schedule.
#[derive(Clone, Debug)]
pub struct Neighborhood {
    jobs: usize,
    machines: usize,
    horizon: u64,
    phase: Phase,
    machine: usize,
    i: usize,
    j: usize,
    start: u64,
}

impl Neighborhood {
    /// Creates an enumeration positioned at the first move.
    #[must_use]
    pub fn new(instance: &Instance) -> Self {
        let mut neighborhood = Self {
            jobs: instance.jobs(),
            machines: instance.machines(),
            horizon: instance.max_time_units(),
            phase: Phase::Swap,
            machine: 0,
            i: 0,
            j: 1,
            start: 0,
        };
        neighborhood.first();
        neighborhood
    }

    /// Returns the number of moves in the neighborhood.
    #[must_use]
    pub fn size(instance: &Instance) -> usize {
        let (jobs, machines) = (instance.jobs(), instance.machines());
        let swaps = machines * jobs * jobs.saturating_sub(1) / 2;
        swaps + machines * jobs * cast_usize(instance.max_time_units())
    }

    /// Moves back to the first move.
    pub fn first(&mut self) {
        self.machine = 0;
        self.i = 0;
        self.j = 1;
        if self.jobs > 1 {
            self.phase = Phase::Swap;
        } else {
            self.enter_relocations();
        }
    }

    /// Returns whether every move has been visited.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Returns the move under the cursor, or `None` when done.
    #[must_use]
    pub fn current(&self) -> Option<Move> {
        match self.phase {
            Phase::Swap => Some(Move::Swap {
                machine: self.machine,
                first: self.i,
                second: self.j,
            }),
            Phase::Relocate => Some(Move::Relocate {
                machine: self.machine,
                index: self.i,
                start: self.start,
            }),
            Phase::Done => None,
        }
    }

    /// Advances the cursor to the next move.
    pub fn advance(&mut self) {
        match self.phase {
            Phase::Swap => {
                if self.j + 1 < self.jobs {
                    self.j += 1;
                } else if self.i + 2 < self.jobs {
                    self.i += 1;
                    self.j = self.i + 1;
                } else if self.machine + 1 < self.machines {
                    self.machine += 1;
                    self.i = 0;
                    self.j = 1;
                } else {
                    self.enter_relocations();
                }
            }
            Phase::Relocate => {
                if self.start + 1 < self.horizon {
                    self.start += 1;
                } else if self.i + 1 < self.jobs {
                    self.i += 1;
                    self.start = 0;
                } else if self.machine + 1 < self.machines {
                    self.machine += 1;
                    self.i = 0;
                    self.start = 0;
                } else {
                    self.phase = Phase::Done;
                }
            }
            Phase::Done => {}
        }
    }

    fn enter_relocations(&mut self) {
        self.machine = 0;
        self.i = 0;
        self.start = 0;
        self.phase = if self.horizon > 0 {
            Phase::Relocate
        } else {
            Phase::Done
        };
    }
}

impl Iterator for Neighborhood {
    type Item = Move;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current();
        self.advance();
        current
    }
}
