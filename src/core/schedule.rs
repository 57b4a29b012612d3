use super::Instance;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A scheduled operation of a job on a machine.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Task {
    pub job: usize,
    pub start: u64,
    pub end: u64,
}

impl Task {
    /// Creates a task starting at `start` and lasting `time` units.
    #[must_use]
    pub const fn new(job: usize, start: u64, time: u64) -> Self {
        Self {
            job,
            start,
            end: start + time,
        }
    }
}

/// A schedule of the job-shop problem.
///
/// Holds one ordered task sequence per machine. Tasks on a machine never overlap in time,
/// but the operations of a job may be out of its required order; such schedules are
/// penalized by the evaluator instead of being rejected.
#[derive(Clone, Debug, Eq, Hash, Serialize, PartialEq)]
pub struct Schedule {
    machines: Vec<Vec<Task>>,
    makespan: u64,
}

impl Schedule {
    /// Builds a schedule with a randomized longest-processing-time-first rule.
    ///
    /// Operations are sorted by descending duration; each step takes either the longest
    /// remaining one or, with probability one half, a uniformly random one, and appends it
    /// to its machine right after the previous task.
    #[must_use]
    pub fn generate(instance: &Instance, rng: &mut impl Rng) -> Self {
        let machines = instance.machines();
        let mut operations: Vec<_> = (0..instance.operations())
            .map(|operation| (operation / machines, operation % machines))
            .collect();
        operations.sort_by(|a, b| instance.time(b.0, b.1).cmp(&instance.time(a.0, a.1)));

        let mut schedule = Self {
            machines: vec![Vec::with_capacity(instance.jobs()); machines],
            makespan: 0,
        };

        while !operations.is_empty() {
            let index = if rng.gen_bool(0.5) {
                0
            } else {
                rng.gen_range(0..operations.len())
            };
            let (job, machine) = operations.remove(index);

            let sequence = &mut schedule.machines[machine];
            let free = sequence.last().map_or(0, |task| task.end);
            let task = Task::new(job, free, instance.time(job, machine));

            schedule.makespan = schedule.makespan.max(task.end);
            sequence.push(task);
        }

        schedule
    }

    /// Builds a schedule from `(job, start)` pairs listed per machine.
    /// End times are derived from the instance and every machine is rescheduled.
    #[must_use]
    pub fn from_starts(instance: &Instance, machines: Vec<Vec<(usize, u64)>>) -> Self {
        let machines = machines
            .into_iter()
            .enumerate()
            .map(|(machine, tasks)| {
                let tasks = tasks.into_iter();
                tasks
                    .map(|(job, start)| Task::new(job, start, instance.time(job, machine)))
                    .collect()
            })
            .collect();

        let mut schedule = Self {
            machines,
            makespan: 0,
        };
        for machine in 0..schedule.machines.len() {
            schedule.reschedule(instance, machine);
        }
        schedule
    }

    /// Restores the no-overlap invariant of a machine after a mutation.
    ///
    /// Tasks are walked in stored order: each one starts at the later of its own start and
    /// the end of its predecessor. The makespan is recomputed afterwards.
    pub fn reschedule(&mut self, instance: &Instance, machine: usize) {
        let mut free = 0;
        for task in &mut self.machines[machine] {
            task.start = task.start.max(free);
            task.end = task.start + instance.time(task.job, machine);
            free = task.end;
        }

        self.makespan = self
            .machines
            .iter()
            .filter_map(|tasks| tasks.last())
            .map(|task| task.end)
            .max()
            .unwrap_or_default();
    }

    /// Returns the maximum end time over all tasks.
    #[must_use]
    pub const fn makespan(&self) -> u64 {
        self.makespan
    }

    /// Returns the task sequences of all machines.
    #[must_use]
    pub fn machines(&self) -> &[Vec<Task>] {
        &self.machines
    }

    /// Returns the task sequence of a machine.
    #[must_use]
    pub fn machine(&self, machine: usize) -> &[Task] {
        &self.machines[machine]
    }

    pub(super) fn machine_mut(&mut self, machine: usize) -> &mut Vec<Task> {
        &mut self.machines[machine]
    }

    /// Replaces a machine sequence and the makespan with previously saved values.
    pub(super) fn restore(&mut self, machine: usize, tasks: Vec<Task>, makespan: u64) {
        self.machines[machine] = tasks;
        self.makespan = makespan;
    }

    /// Checks the structural invariants of the schedule.
    /// Every machine holds every job exactly once, end times match the processing times,
    /// consecutive tasks do not overlap and the makespan is the latest end.
    #[must_use]
    pub fn verify(&self, instance: &Instance) -> bool {
        if self.machines.len() != instance.machines() {
            return false;
        }

        let mut latest = 0;
        for (machine, tasks) in self.machines.iter().enumerate() {
            let mut seen = vec![false; instance.jobs()];
            let mut free = 0;

            for task in tasks {
                match seen.get_mut(task.job) {
                    Some(visited) if !*visited => *visited = true,
                    _ => return false,
                }
                if task.start < free || task.end != task.start + instance.time(task.job, machine)
                {
                    return false;
                }
                free = task.end;
            }

            if seen.contains(&false) {
                return false;
            }
            latest = latest.max(free);
        }

        latest == self.makespan
    }

    /// Returns a character timeline of the schedule, one row per machine.
    #[must_use]
    pub const fn timeline(&self) -> Timeline<'_> {
        Timeline(self)
    }
}

impl Display for Schedule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (machine, tasks) in self.machines.iter().enumerate() {
            write!(f, "Machine {machine}:")?;
            for task in tasks {
                write!(f, " Job {}: [{} - {}]", task.job, task.start, task.end)?;
            }
            writeln!(f)?;
        }
        write!(f, "Makespan: {}", self.makespan)
    }
}

/// Gantt-like rendering of a schedule. Each column is one time unit.
#[derive(Clone, Copy, Debug)]
pub struct Timeline<'a>(&'a Schedule);

impl Display for Timeline<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let width = self.0.makespan.to_string().len().max(2);

        write!(f, "{:>4}", "")?;
        for time in 0..self.0.makespan {
            write!(f, " {time:>width$}")?;
        }
        writeln!(f)?;

        for (machine, tasks) in self.0.machines.iter().enumerate() {
            write!(f, "M{machine:<3}")?;
            let mut tasks = tasks.iter().peekable();
            for time in 0..self.0.makespan {
                while tasks.next_if(|task| task.end <= time).is_some() {}
                match tasks.peek() {
                    Some(task) if task.start <= time => write!(f, " {:>width$}", task.job)?,
                    _ => write!(f, " {:>width$}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
