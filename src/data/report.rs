use crate::core::{violations, Instance, Score, Task};
use crate::supervisor::Outcome;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result};

/// Result of solving a single instance.
#[non_exhaustive]
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub solver: String,
    pub score: Score,
    pub makespan: u64,
    /// Whether every job follows its processing order.
    pub feasible: bool,
    /// Wall-clock time in seconds.
    pub elapsed: f64,
    pub timed_out: bool,
    pub machines: Vec<Vec<Task>>,
    /// Character timeline of the schedule, one row per machine.
    #[serde(skip)]
    pub timeline: String,
}

impl RunReport {
    /// Creates a report of a supervised run.
    #[must_use]
    pub fn new(solver: &str, instance: &Instance, outcome: &Outcome) -> Self {
        let schedule = &outcome.solution.schedule;
        Self {
            solver: solver.into(),
            score: outcome.solution.score,
            makespan: schedule.makespan(),
            feasible: violations(instance, schedule) == 0,
            elapsed: outcome.elapsed.as_secs_f64(),
            timed_out: outcome.timed_out,
            machines: schedule.machines().to_vec(),
            timeline: schedule.timeline().to_string(),
        }
    }

    /// Serializes the report to pretty-printed JSON.
    ///
    /// # Errors
    /// - If serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Solver: {}", self.solver)?;
        for (machine, tasks) in self.machines.iter().enumerate() {
            write!(f, "Machine {machine}:")?;
            for task in tasks {
                write!(f, " Job {}: [{} - {}]", task.job, task.start, task.end)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Makespan: {}", self.makespan)?;
        writeln!(f, "Score: {}", self.score)?;
        if !self.feasible {
            writeln!(f, "Schedule breaks the processing order")?;
        }
        write!(f, "Time: {:.2} sec", self.elapsed)?;
        if self.timed_out {
            write!(f, " (time limit)")?;
        }
        Ok(())
    }
}
