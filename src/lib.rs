#![deny(clippy::all, clippy::cargo, clippy::expect_used, clippy::unwrap_used)]
#![deny(clippy::pedantic, clippy::nursery, unsafe_code)]
#![warn(clippy::unimplemented, clippy::redundant_type_annotations)]

use anyhow::Result;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

pub mod algo;
pub mod core;
pub mod data;
pub mod supervisor;

/// Runs the given solver on the instance read from reader under the time limit.
/// Returns the report of the run.
///
/// # Errors
/// - If the instance could not be read from the reader.
/// - If the solver could not be run.
///
/// # Panics
///  - If the schedule is invalid in debug mode.
pub fn run_reader(
    solver: Box<dyn core::Solver>,
    reader: &mut impl BufRead,
    time_limit: Option<Duration>,
) -> Result<data::RunReport> {
    let instance = Arc::new(data::deserialize(reader)?);
    log::info!("Loaded {} jobs on {} machines", instance.jobs(), instance.machines());
    log::debug!("{instance}");

    let name = solver.name();
    let outcome = supervisor::supervise(solver, Arc::clone(&instance), time_limit)?;
    let schedule = &outcome.solution.schedule;

    debug_assert!(schedule.verify(&instance), "Schedule is invalid: {schedule:?}");

    Ok(data::RunReport::new(name, &instance, &outcome))
}

#[cfg(not(target_pointer_width = "64"))]
compile_error!("Must be 64-bit system!");

/// Casts the given value to `usize`.
/// It should never fail on 64-bit systems.
///
/// # Panics
/// - If the value cannot be cast to `usize`.
#[must_use]
pub fn cast_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or_else(|_| unreachable!("Must be 64-bit system!"))
}

/// Casts the given value to `u64`.
/// It should never fail on 64-bit systems.
///
/// # Panics
/// - If the value cannot be cast to `u64`.
#[must_use]
pub fn cast_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or_else(|_| unreachable!("Must be 64-bit system!"))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algo::{Config, IteratedLocalSearch};

    #[test]
    fn run_reader_should_solve_the_scenario() -> Result<()> {
        let solver = Box::new(IteratedLocalSearch::new(Config {
            seed: Some(3),
            ..Config::default()
        }));
        let text = std::fs::read_to_string("samples/scenario_2x2.txt")?;

        let report = run_reader(solver, &mut text.as_bytes(), None)?;

        assert_eq!(report.solver, "ILS");
        assert!(report.feasible);
        assert!(!report.timed_out);
        assert!(report.makespan >= 7);
        assert_eq!(report.score, report.makespan);
        Ok(())
    }
}
