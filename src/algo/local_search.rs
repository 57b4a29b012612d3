use crate::core::{Context, Evaluator, Instance, Neighborhood, Progress, Schedule, Solution};
use serde::{Deserialize, Serialize};

/// How a local search sweep picks the move it keeps.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Serialize, PartialEq, clap::ValueEnum,
)]
pub enum Strategy {
    /// Try the whole neighborhood and keep the best move.
    #[default]
    Best,
    /// Keep the first improving move.
    First,
}

/// Local search over the swap and relocation neighborhood.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LocalSearch {
    strategy: Strategy,
    evaluator: Evaluator,
}

impl LocalSearch {
    /// Creates a new local search.
    #[must_use]
    pub const fn new(strategy: Strategy, evaluator: Evaluator) -> Self {
        Self {
            strategy,
            evaluator,
        }
    }

    /// Returns the evaluator used to score schedules.
    #[must_use]
    pub const fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Performs a single sweep with the configured strategy.
    /// The result never scores worse than the input.
    #[must_use]
    pub fn sweep(&self, instance: &Instance, schedule: Schedule) -> Solution {
        self.sweep_until(instance, schedule, || false)
    }

    /// Performs a single sweep, polling `stop` before every move.
    /// When it fires the best schedule seen so far is returned.
    #[must_use]
    pub fn sweep_until(
        &self,
        instance: &Instance,
        schedule: Schedule,
        stop: impl Fn() -> bool,
    ) -> Solution {
        match self.strategy {
            Strategy::Best => self.best_improvement(instance, schedule, stop),
            Strategy::First => self.first_improvement(instance, schedule, stop),
        }
    }

    /// Repeats sweeps until no move improves the schedule or the caller asks to stop.
    /// Every improvement is published and reported through the context.
    pub fn descend(
        &self,
        instance: &Instance,
        schedule: Schedule,
        context: &mut Context<'_>,
    ) -> Solution {
        let score = self.evaluator.evaluate(instance, &schedule);
        let mut current = Solution::new(schedule, score);
        let mut iteration = 0;

        while !context.should_stop() {
            let next =
                self.sweep_until(instance, current.schedule.clone(), || context.should_stop());
            if !next.is_better_than(&current) {
                break;
            }

            iteration += 1;
            log::trace!("Descent improved to {}", next.score);
            context.report(Progress {
                iteration,
                local: next.score,
                best: next.score,
            });
            context.publish(&next);
            current = next;
        }

        current
    }

    /// Visits every applicable move once and returns the best schedule seen.
    /// Each move is undone right after scoring, so the base is only copied on improvement.
    #[must_use]
    pub fn best_improvement(
        &self,
        instance: &Instance,
        mut schedule: Schedule,
        stop: impl Fn() -> bool,
    ) -> Solution {
        let mut best_score = self.evaluator.evaluate(instance, &schedule);
        let mut best = None;

        for mv in Neighborhood::new(instance) {
            if stop() {
                log::trace!("Sweep interrupted at {mv}");
                break;
            }
            if !mv.can_apply(instance, &schedule) {
                continue;
            }

            let undo = mv.apply(instance, &mut schedule);
            let score = self.evaluator.evaluate(instance, &schedule);
            if score < best_score {
                best_score = score;
                best = Some(schedule.clone());
            }
            undo.revert(&mut schedule);
        }

        Solution::new(best.unwrap_or(schedule), best_score)
    }

    /// Applies the first applicable move that improves the schedule.
    #[must_use]
    pub fn first_improvement(
        &self,
        instance: &Instance,
        mut schedule: Schedule,
        stop: impl Fn() -> bool,
    ) -> Solution {
        let base = self.evaluator.evaluate(instance, &schedule);

        for mv in Neighborhood::new(instance) {
            if stop() {
                break;
            }
            if !mv.can_apply(instance, &schedule) {
                continue;
            }

            let undo = mv.apply(instance, &mut schedule);
            let score = self.evaluator.evaluate(instance, &schedule);
            if score < base {
                log::trace!("{mv} improved {base} to {score}");
                return Solution::new(schedule, score);
            }
            undo.revert(&mut schedule);
        }

        Solution::new(schedule, base)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::{Incumbent, Penalty};
    use crate::data;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn sweeps_should_never_worsen() -> anyhow::Result<()> {
        let instance = data::load("samples/ft06_55.txt")?;
        let mut rng = StdRng::seed_from_u64(5);

        for strategy in [Strategy::Best, Strategy::First] {
            let search = LocalSearch::new(strategy, Evaluator::new(Penalty::Fixed(100)));
            for _ in 0..3 {
                let schedule = Schedule::generate(&instance, &mut rng);
                let base = search.evaluator().evaluate(&instance, &schedule);
                let result = search.sweep(&instance, schedule);

                assert!(result.score <= base);
                assert!(result.schedule.verify(&instance));
                assert_eq!(search.evaluator().evaluate(&instance, &result.schedule), result.score);
            }
        }
        Ok(())
    }

    #[test]
    fn best_improvement_should_beat_first_improvement() -> anyhow::Result<()> {
        let instance = data::load("samples/small_3x3.txt")?;
        let schedule = Schedule::generate(&instance, &mut StdRng::seed_from_u64(9));
        let evaluator = Evaluator::default();

        let best = LocalSearch::new(Strategy::Best, evaluator).sweep(&instance, schedule.clone());
        let first = LocalSearch::new(Strategy::First, evaluator).sweep(&instance, schedule);

        assert!(best.score <= first.score);
        Ok(())
    }

    #[test]
    fn descent_should_reach_local_optimum() -> anyhow::Result<()> {
        let instance = data::load("samples/small_3x3.txt")?;
        let schedule = Schedule::generate(&instance, &mut StdRng::seed_from_u64(13));
        let search = LocalSearch::default();
        let incumbent = Incumbent::new();
        let stop = AtomicBool::new(false);
        let mut progress = Vec::new();

        let optimum = search.descend(
            &instance,
            schedule,
            &mut Context::new(&incumbent, &stop, &mut progress),
        );
        let again = search.best_improvement(&instance, optimum.schedule.clone(), || false);

        assert_eq!(again.score, optimum.score);
        assert_eq!(again.schedule, optimum.schedule);
        for pair in progress.windows(2) {
            assert!(pair[1].best < pair[0].best);
        }
        if !progress.is_empty() {
            assert_eq!(incumbent.score(), Some(optimum.score));
        }
        Ok(())
    }

    #[test]
    fn raised_stop_should_end_sweep_at_once() -> anyhow::Result<()> {
        let instance = data::load("samples/ft06_55.txt")?;
        let schedule = Schedule::generate(&instance, &mut StdRng::seed_from_u64(14));
        let evaluator = Evaluator::default();
        let base = evaluator.evaluate(&instance, &schedule);

        for strategy in [Strategy::Best, Strategy::First] {
            let search = LocalSearch::new(strategy, evaluator);
            let result = search.sweep_until(&instance, schedule.clone(), || true);

            assert_eq!(result.score, base);
            assert_eq!(result.schedule, schedule);
        }
        Ok(())
    }

    #[test]
    fn stop_should_be_polled_between_moves() -> anyhow::Result<()> {
        let instance = data::load("samples/ft06_55.txt")?;
        let schedule = Schedule::generate(&instance, &mut StdRng::seed_from_u64(15));
        let polls = Cell::new(0);

        let result = LocalSearch::default().sweep_until(&instance, schedule, || {
            polls.set(polls.get() + 1);
            polls.get() > 10
        });

        assert_eq!(polls.get(), 11);
        assert!(result.schedule.verify(&instance));
        Ok(())
    }
}
