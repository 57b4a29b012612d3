use crate::core::{Context, Incumbent, Instance, LogObserver, Solution, Solver};
use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a supervised run.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub solution: Solution,
    pub elapsed: Duration,
    /// Whether the run was cut by the time limit.
    pub timed_out: bool,
}

/// Runs the solver on a worker thread and enforces the time limit.
///
/// The solver publishes its improvements into an [`Incumbent`]. When the limit expires the
/// stop flag is raised; solvers poll it before every move, so the worker returns shortly
/// after and is joined. The best of the published and the returned solution is kept, and
/// the elapsed time is measured after the join.
///
/// # Errors
/// - If the worker thread cannot be spawned.
/// - If the worker panics or stops without any solution.
pub fn supervise(
    mut solver: Box<dyn Solver>,
    instance: Arc<Instance>,
    time_limit: Option<Duration>,
) -> Result<Outcome> {
    let name = solver.name();
    let incumbent = Arc::new(Incumbent::new());
    let stop = Arc::new(AtomicBool::new(false));
    let (sender, receiver) = mpsc::channel();

    let start = Instant::now();
    let worker = {
        let incumbent = Arc::clone(&incumbent);
        let stop = Arc::clone(&stop);
        thread::Builder::new()
            .name(format!("{name}-worker"))
            .spawn(move || {
                let mut observer = LogObserver;
                let mut context = Context::new(&incumbent, &stop, &mut observer);
                let solution = solver.solve(&instance, &mut context);
                let _ = sender.send(solution);
            })?
    };

    let received = match time_limit {
        Some(limit) => receiver.recv_timeout(limit),
        None => receiver.recv().map_err(RecvTimeoutError::from),
    };

    let (finished, timed_out) = match received {
        Ok(solution) => (Some(solution), false),
        Err(RecvTimeoutError::Timeout) => {
            stop.store(true, Ordering::Relaxed);
            log::warn!(
                "{name} hit the time limit after {:.2} sec",
                start.elapsed().as_secs_f64()
            );
            (receiver.recv().ok(), true)
        }
        Err(RecvTimeoutError::Disconnected) => (None, false),
    };

    if worker.join().is_err() {
        bail!("{name} worker panicked");
    }

    let solution = match (incumbent.snapshot(), finished) {
        (Some(published), Some(returned)) if returned.is_better_than(&published) => returned,
        (Some(published), _) => published,
        (None, Some(returned)) => returned,
        (None, None) => bail!("{name} stopped without a solution"),
    };
    let outcome = Outcome {
        solution,
        elapsed: start.elapsed(),
        timed_out,
    };

    log::debug!(
        "{name} finished with score {} in {:.2} sec",
        outcome.solution.score,
        outcome.elapsed.as_secs_f64()
    );
    Ok(outcome)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::{Config, Greedy, IteratedLocalSearch};
    use crate::core::{Evaluator, Operation, Schedule};
    use crate::data;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};

    /// Publishes nothing and returns once asked to stop.
    struct Silent;

    impl Solver for Silent {
        fn solve(&mut self, instance: &Instance, context: &mut Context<'_>) -> Solution {
            while !context.should_stop() {
                thread::sleep(Duration::from_millis(5));
            }
            let schedule = Schedule::generate(instance, &mut StdRng::seed_from_u64(0));
            let score = Evaluator::default().evaluate(instance, &schedule);
            Solution::new(schedule, score)
        }

        fn name(&self) -> &'static str {
            "Silent"
        }
    }

    /// Publishes once more after being asked to stop.
    struct Late;

    impl Solver for Late {
        fn solve(&mut self, instance: &Instance, context: &mut Context<'_>) -> Solution {
            let schedule = Schedule::generate(instance, &mut StdRng::seed_from_u64(1));
            let score = Evaluator::default().evaluate(instance, &schedule);
            let solution = Solution::new(schedule, score);
            context.publish(&solution);

            while !context.should_stop() {
                thread::sleep(Duration::from_millis(5));
            }
            context.publish(&Solution::new(solution.schedule.clone(), score - 1));
            solution
        }

        fn name(&self) -> &'static str {
            "Late"
        }
    }

    fn random_instance(jobs: usize, machines: usize, seed: u64) -> Result<Instance> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut routes = Vec::with_capacity(jobs);
        for _ in 0..jobs {
            let mut order: Vec<_> = (0..machines).collect();
            order.shuffle(&mut rng);
            let route = order
                .into_iter()
                .map(|machine| Operation::new(machine, rng.gen_range(40..=98)))
                .collect();
            routes.push(route);
        }
        Ok(Instance::new(routes)?)
    }

    #[test]
    fn finished_run_should_not_time_out() -> Result<()> {
        let instance = Arc::new(data::load("samples/ft06_55.txt")?);
        let solver = Box::new(Greedy::new(&Config::default()));

        let outcome = supervise(solver, Arc::clone(&instance), Some(Duration::from_secs(60)))?;

        assert!(!outcome.timed_out);
        assert!(outcome.solution.schedule.verify(&instance));
        Ok(())
    }

    #[test]
    fn time_limit_should_return_published_solution() -> Result<()> {
        let instance = Arc::new(data::load("samples/ft06_55.txt")?);
        let limit = Duration::from_millis(300);
        let solver = Box::new(IteratedLocalSearch::new(Config {
            max_stagnation: None,
            seed: Some(10),
            ..Config::default()
        }));

        let outcome = supervise(solver, Arc::clone(&instance), Some(limit))?;

        assert!(outcome.timed_out);
        assert!(outcome.elapsed >= limit);
        assert!(outcome.solution.schedule.verify(&instance));
        assert_eq!(
            Evaluator::default().evaluate(&instance, &outcome.solution.schedule),
            outcome.solution.score
        );
        Ok(())
    }

    #[test]
    fn silent_worker_should_be_awaited() -> Result<()> {
        let instance = Arc::new(data::load("samples/small_3x3.txt")?);

        let outcome = supervise(Box::new(Silent), Arc::clone(&instance), Some(Duration::from_millis(20)))?;

        assert!(outcome.timed_out);
        assert!(outcome.solution.schedule.verify(&instance));
        Ok(())
    }

    #[test]
    fn time_limit_should_hold_on_larger_instance() -> Result<()> {
        let instance = Arc::new(random_instance(12, 12, 42)?);
        let limit = Duration::from_millis(200);
        let solver = Box::new(IteratedLocalSearch::new(Config {
            max_stagnation: None,
            seed: Some(11),
            ..Config::default()
        }));

        let start = Instant::now();
        let outcome = supervise(solver, Arc::clone(&instance), Some(limit))?;
        let wall = start.elapsed();

        assert!(outcome.timed_out);
        assert!(outcome.elapsed >= limit);
        assert!(outcome.elapsed <= wall);
        assert!(wall < limit + Duration::from_secs(1), "returned after {wall:?}");
        assert!(outcome.solution.schedule.verify(&instance));
        Ok(())
    }

    #[test]
    fn late_publication_should_be_kept() -> Result<()> {
        let instance = Arc::new(data::load("samples/small_3x3.txt")?);
        let schedule = Schedule::generate(&instance, &mut StdRng::seed_from_u64(1));
        let score = Evaluator::default().evaluate(&instance, &schedule);

        let outcome = supervise(Box::new(Late), Arc::clone(&instance), Some(Duration::from_millis(20)))?;

        assert!(outcome.timed_out);
        assert_eq!(outcome.solution.score, score - 1);
        Ok(())
    }
}
