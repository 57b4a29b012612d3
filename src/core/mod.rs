mod eval;
mod moves;
mod neighborhood;
mod problem;
mod schedule;
mod solution;

pub use eval::*;
pub use moves::*;
pub use neighborhood::*;
pub use problem::*;
pub use schedule::*;
pub use solution::*;

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Solves instances of the job-shop problem.
pub trait Solver: Send {
    /// Solves the given instance.
    /// Improvements are published through the context as soon as they are found.
    fn solve(&mut self, instance: &Instance, context: &mut Context<'_>) -> Solution;

    /// Returns the name of the solver.
    fn name(&self) -> &'static str;
}

/// Progress of one search iteration.
#[derive(Clone, Copy, Debug, Eq, Hash, Serialize, PartialEq)]
pub struct Progress {
    pub iteration: usize,
    pub local: Score,
    pub best: Score,
}

/// Receives search progress.
pub trait Observer {
    /// Called after every iteration of the search.
    fn on_iteration(&mut self, progress: Progress);
}

/// Observer writing progress to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_iteration(&mut self, progress: Progress) {
        log::info!(
            "Iteration: {} - local score: {} - best score: {}",
            progress.iteration,
            progress.local,
            progress.best
        );
    }
}

impl Observer for Vec<Progress> {
    fn on_iteration(&mut self, progress: Progress) {
        self.push(progress);
    }
}

/// Everything a solver shares with its caller during a run.
pub struct Context<'a> {
    incumbent: &'a Incumbent,
    stop: &'a AtomicBool,
    observer: &'a mut dyn Observer,
}

impl<'a> Context<'a> {
    /// Creates a new context.
    pub fn new(incumbent: &'a Incumbent, stop: &'a AtomicBool, observer: &'a mut dyn Observer) -> Self {
        Self {
            incumbent,
            stop,
            observer,
        }
    }

    /// Hands a copy of the solution to the incumbent if it improves on it.
    pub fn publish(&self, solution: &Solution) -> bool {
        self.incumbent.publish(solution)
    }

    /// Returns whether the caller asked the search to stop.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Reports the progress of an iteration.
    pub fn report(&mut self, progress: Progress) {
        self.observer.on_iteration(progress);
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("incumbent", &self.incumbent.score())
            .field("stop", &self.should_stop())
            .finish_non_exhaustive()
    }
}
