use super::{perturb, Config, LocalSearch};
use crate::core::{Context, Evaluator, Instance, Progress, Schedule, Score, Solution, Solver};
use rand::rngs::StdRng;
use rand::Rng;

/// Why the iterated local search stopped.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StopReason {
    /// Too many iterations passed without improving the best schedule.
    Stagnation,
    /// The best score reached the configured goal.
    GoalReached,
    /// The caller raised the stop flag.
    Interrupted,
}

/// Iterated local search.
///
/// Starting from a local optimum of a randomized greedy schedule, every iteration perturbs
/// the working schedule with `k` random moves and runs a local search sweep on it. With
/// a small probability the iteration restarts from the best schedule instead. Whenever the
/// best score improves `k` drops back to its initial value; otherwise it grows by one, up to
/// half the number of operations.
#[derive(Clone, Debug)]
pub struct IteratedLocalSearch {
    config: Config,
    rng: StdRng,
    iterations: usize,
    stop_reason: Option<StopReason>,
}

impl IteratedLocalSearch {
    /// Creates a new instance of `IteratedLocalSearch`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = config.rng();
        Self {
            config,
            rng,
            iterations: 0,
            stop_reason: None,
        }
    }

    /// Returns the number of iterations performed by the last run.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Returns why the last run stopped.
    #[must_use]
    pub const fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    fn goal_reached(&self, score: Score) -> bool {
        self.config.goal.is_some_and(|goal| score <= goal)
    }

    fn stagnated(&self, iteration: usize, best_iteration: usize) -> bool {
        let limit = self.config.max_stagnation;
        limit.is_some_and(|limit| iteration - best_iteration >= limit)
    }
}

impl Default for IteratedLocalSearch {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Solver for IteratedLocalSearch {
    fn solve(&mut self, instance: &Instance, context: &mut Context<'_>) -> Solution {
        let evaluator = Evaluator::new(self.config.penalty);
        let search = LocalSearch::new(self.config.strategy, evaluator);
        let rollback_chance = if self.config.rollback_chance.is_finite() {
            self.config.rollback_chance.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let max_strength = instance.operations() / 2;

        let initial = Schedule::generate(instance, &mut self.rng);
        let score = evaluator.evaluate(instance, &initial);
        context.publish(&Solution::new(initial.clone(), score));
        log::debug!("Initial schedule scores {score}");

        let mut best = search.sweep_until(instance, initial, || context.should_stop());
        context.publish(&best);
        log::debug!("Initial local search scores {}", best.score);

        let mut working = best.schedule.clone();
        let mut strength = self.config.strength;
        let mut iteration = 0;
        let mut best_iteration = 0;

        let reason = loop {
            if self.goal_reached(best.score) {
                break StopReason::GoalReached;
            }
            if self.stagnated(iteration, best_iteration) {
                break StopReason::Stagnation;
            }
            if context.should_stop() {
                break StopReason::Interrupted;
            }

            iteration += 1;

            if self.rng.gen_bool(rollback_chance) {
                working.clone_from(&best.schedule);
            }

            perturb(instance, &mut working, strength, &mut self.rng);
            let local = search.sweep_until(instance, working, || context.should_stop());

            if local.is_better_than(&best) {
                best = local.clone();
                context.publish(&best);
                log::debug!("New best score {} at iteration {iteration}", best.score);
                best_iteration = iteration;
                strength = self.config.strength;
            } else {
                strength = (strength + 1).min(max_strength);
            }

            context.report(Progress {
                iteration,
                local: local.score,
                best: best.score,
            });
            working = local.schedule;
        };

        log::debug!(
            "Stopped after {iteration} iterations ({reason:?}) with score {}",
            best.score
        );
        self.iterations = iteration;
        self.stop_reason = Some(reason);
        best
    }

    fn name(&self) -> &'static str {
        "ILS"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: super::SolverFactory = |config| Box::new(IteratedLocalSearch::new(config.clone()));
