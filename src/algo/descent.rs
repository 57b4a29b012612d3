use super::{Config, LocalSearch};
use crate::core::{Context, Evaluator, Instance, Schedule, Solution, Solver};
use rand::rngs::StdRng;

/// Plain local search descent from a single greedy schedule.
/// Stops in the first local optimum, so it is a baseline for the iterated search.
#[derive(Clone, Debug)]
pub struct Descent {
    search: LocalSearch,
    rng: StdRng,
}

impl Descent {
    /// Creates a new instance of `Descent`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            search: LocalSearch::new(config.strategy, Evaluator::new(config.penalty)),
            rng: config.rng(),
        }
    }
}

impl Solver for Descent {
    fn solve(&mut self, instance: &Instance, context: &mut Context<'_>) -> Solution {
        let schedule = Schedule::generate(instance, &mut self.rng);
        let score = self.search.evaluator().evaluate(instance, &schedule);
        context.publish(&Solution::new(schedule.clone(), score));

        let best = self.search.descend(instance, schedule, context);
        log::debug!("Descent finished with score {}", best.score);
        best
    }

    fn name(&self) -> &'static str {
        "Descent"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: super::SolverFactory = |config| Box::new(Descent::new(config));

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::Incumbent;
    use crate::data;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn descent_should_end_in_local_optimum() -> anyhow::Result<()> {
        let instance = data::load("samples/small_3x3.txt")?;
        let config = Config {
            seed: Some(17),
            ..Config::default()
        };
        let incumbent = Incumbent::new();
        let stop = AtomicBool::new(false);
        let mut progress = Vec::new();

        let solution =
            Descent::new(&config).solve(&instance, &mut Context::new(&incumbent, &stop, &mut progress));

        assert!(solution.schedule.verify(&instance));
        assert_eq!(incumbent.score(), Some(solution.score));
        for pair in progress.windows(2) {
            assert!(pair[1].best < pair[0].best);
        }

        let again = LocalSearch::default().sweep(&instance, solution.schedule.clone());
        assert_eq!(again.score, solution.score);
        Ok(())
    }

    #[test]
    fn raised_stop_should_return_initial_schedule() -> anyhow::Result<()> {
        let instance = data::load("samples/ft06_55.txt")?;
        let incumbent = Incumbent::new();
        let stop = AtomicBool::new(true);
        let mut progress = Vec::new();

        let solution = Descent::new(&Config::default())
            .solve(&instance, &mut Context::new(&incumbent, &stop, &mut progress));

        assert!(progress.is_empty());
        assert_eq!(incumbent.snapshot(), Some(solution));
        Ok(())
    }
}
