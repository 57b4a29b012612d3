use super::{Instance, Schedule};
use crate::cast_u64;
use serde::{Deserialize, Serialize};

/// Score of a schedule. Lower is better.
pub type Score = u64;

/// Penalty added on top of the makespan when it exceeds the sum of all processing times.
pub const OVERFLOW_PENALTY: Score = 1_000_000;

/// Weight charged per constraint violation.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub enum Penalty {
    /// One more than the sum of all processing times.
    /// Any feasible schedule then outranks any infeasible one.
    #[default]
    Dominant,
    /// Fixed weight per violation.
    Fixed(Score),
}

/// Scores schedules as makespan plus weighted precedence and overlap violations.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Evaluator {
    penalty: Penalty,
}

impl Evaluator {
    /// Creates an evaluator with the given violation weight.
    #[must_use]
    pub const fn new(penalty: Penalty) -> Self {
        Self { penalty }
    }

    /// Returns the weight charged per violation on the instance.
    #[must_use]
    pub const fn weight(&self, instance: &Instance) -> Score {
        match self.penalty {
            Penalty::Dominant => instance.max_time_units() + 1,
            Penalty::Fixed(weight) => weight,
        }
    }

    /// Scores the schedule.
    ///
    /// Schedules whose makespan exceeds [`Instance::max_time_units`] are not inspected and
    /// get [`OVERFLOW_PENALTY`] added instead.
    #[must_use]
    pub fn evaluate(&self, instance: &Instance, schedule: &Schedule) -> Score {
        let makespan = schedule.makespan();
        if makespan > instance.max_time_units() {
            return makespan.saturating_add(OVERFLOW_PENALTY);
        }

        let violations = violations(instance, schedule);
        makespan.saturating_add(self.weight(instance).saturating_mul(violations))
    }
}

/// Counts the constraint violations of a schedule.
///
/// For every job its operations are sorted by start time. A job whose machine sequence
/// departs from its required order counts once; every pair of its operations that overlap
/// in time counts once more.
#[must_use]
pub fn violations(instance: &Instance, schedule: &Schedule) -> u64 {
    let mut jobs = vec![Vec::with_capacity(instance.machines()); instance.jobs()];
    for (machine, tasks) in schedule.machines().iter().enumerate() {
        for task in tasks {
            jobs[task.job].push((task.start, task.end, machine));
        }
    }

    let mut count = 0;
    for (job, operations) in jobs.iter_mut().enumerate() {
        operations.sort_by_key(|&(start, _, _)| start);

        let order = instance.order(job);
        if operations.iter().zip(order).any(|(op, &machine)| op.2 != machine) {
            count += 1;
        }

        for (i, &(_, end, _)) in operations.iter().enumerate() {
            let later = operations[i + 1..].iter();
            let overlapping = later.take_while(|&&(start, _, _)| start < end).count();
            count += cast_u64(overlapping);
        }
    }

    count
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data;

    fn scenario() -> anyhow::Result<(Instance, Schedule)> {
        let instance = data::load("samples/scenario_2x2.txt")?;
        let schedule =
            Schedule::from_starts(&instance, vec![vec![(0, 0), (1, 4)], vec![(1, 0), (0, 3)]]);
        Ok((instance, schedule))
    }

    #[test]
    fn feasible_schedule_should_score_its_makespan() -> anyhow::Result<()> {
        let (instance, schedule) = scenario()?;

        assert_eq!(schedule.makespan(), 8);
        assert_eq!(violations(&instance, &schedule), 0);
        assert_eq!(Evaluator::default().evaluate(&instance, &schedule), 8);
        assert_eq!(Evaluator::new(Penalty::Fixed(100)).evaluate(&instance, &schedule), 8);
        Ok(())
    }

    #[test]
    fn evaluation_should_be_pure() -> anyhow::Result<()> {
        let (instance, schedule) = scenario()?;
        let evaluator = Evaluator::new(Penalty::Fixed(10));
        let copy = schedule.clone();

        assert_eq!(
            evaluator.evaluate(&instance, &schedule),
            evaluator.evaluate(&instance, &copy)
        );
        assert_eq!(
            evaluator.evaluate(&instance, &schedule),
            evaluator.evaluate(&instance, &schedule)
        );
        Ok(())
    }

    #[test]
    fn out_of_order_job_should_be_penalized_once() -> anyhow::Result<()> {
        let instance = data::load("samples/scenario_2x2.txt")?;
        // Job 0 runs on machine 1 before machine 0, without any overlap.
        let schedule =
            Schedule::from_starts(&instance, vec![vec![(1, 2), (0, 6)], vec![(1, 0), (0, 2)]]);

        assert_eq!(violations(&instance, &schedule), 1);
        assert_eq!(
            Evaluator::new(Penalty::Fixed(100)).evaluate(&instance, &schedule),
            schedule.makespan() + 100
        );
        Ok(())
    }

    #[test]
    fn overlapping_operations_should_be_penalized() -> anyhow::Result<()> {
        let instance = data::load("samples/scenario_2x2.txt")?;
        // Job 0 runs on both machines at time 0, and so does job 1 at time 3.
        let schedule =
            Schedule::from_starts(&instance, vec![vec![(0, 0), (1, 3)], vec![(0, 0), (1, 3)]]);

        // Job 0 keeps its order but overlaps once.
        // Job 1 starts on machine 0 first, which breaks its order, and overlaps once.
        assert_eq!(violations(&instance, &schedule), 3);
        Ok(())
    }

    #[test]
    fn dominant_penalty_should_rank_feasible_first() -> anyhow::Result<()> {
        let (instance, feasible) = scenario()?;
        let infeasible =
            Schedule::from_starts(&instance, vec![vec![(0, 0), (1, 3)], vec![(0, 0), (1, 3)]]);
        let evaluator = Evaluator::default();

        assert_eq!(evaluator.weight(&instance), instance.max_time_units() + 1);
        assert!(
            evaluator.evaluate(&instance, &infeasible) > instance.max_time_units(),
            "Infeasible schedule must score above any feasible makespan"
        );
        assert!(
            evaluator.evaluate(&instance, &feasible) < evaluator.evaluate(&instance, &infeasible)
        );
        Ok(())
    }

    #[test]
    fn overflowing_schedule_should_get_sentinel() -> anyhow::Result<()> {
        let instance = data::load("samples/scenario_2x2.txt")?;
        let schedule =
            Schedule::from_starts(&instance, vec![vec![(0, 20), (1, 30)], vec![(1, 0), (0, 40)]]);

        assert!(schedule.makespan() > instance.max_time_units());
        assert_eq!(
            Evaluator::default().evaluate(&instance, &schedule),
            schedule.makespan() + OVERFLOW_PENALTY
        );
        Ok(())
    }
}
