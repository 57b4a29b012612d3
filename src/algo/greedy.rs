use super::Config;
use crate::core::{Context, Evaluator, Instance, Schedule, Solution, Solver};
use rand::rngs::StdRng;

/// Randomized longest-processing-time-first schedule without any improvement.
#[derive(Clone, Debug)]
pub struct Greedy {
    evaluator: Evaluator,
    rng: StdRng,
}

impl Greedy {
    /// Creates a new instance of `Greedy`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            evaluator: Evaluator::new(config.penalty),
            rng: config.rng(),
        }
    }
}

impl Solver for Greedy {
    fn solve(&mut self, instance: &Instance, context: &mut Context<'_>) -> Solution {
        let schedule = Schedule::generate(instance, &mut self.rng);
        let score = self.evaluator.evaluate(instance, &schedule);
        let solution = Solution::new(schedule, score);
        context.publish(&solution);
        solution
    }

    fn name(&self) -> &'static str {
        "Greedy"
    }
}

#[allow(unsafe_code)]
#[linkme::distributed_slice(super::SOLVERS)]
static INSTANCE: super::SolverFactory = |config| Box::new(Greedy::new(config));

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::Incumbent;
    use crate::data;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn greedy_should_publish_its_schedule() -> anyhow::Result<()> {
        let instance = data::load("samples/ft06_55.txt")?;
        let incumbent = Incumbent::new();
        let stop = AtomicBool::new(false);
        let mut progress = Vec::new();
        let mut greedy = Greedy::new(&Config {
            seed: Some(8),
            ..Config::default()
        });

        let solution = greedy.solve(&instance, &mut Context::new(&incumbent, &stop, &mut progress));

        assert!(solution.schedule.verify(&instance));
        assert!(solution.score >= 55);
        assert_eq!(incumbent.snapshot(), Some(solution));
        assert!(progress.is_empty());
        Ok(())
    }
}
