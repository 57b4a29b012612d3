use super::{Instance, Schedule, Task};
use rand::Rng;
use std::fmt::{Display, Formatter};

/// An elementary edit of a single machine sequence.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Move {
    /// Exchanges the jobs at two slots of a machine. The slots keep their start times.
    Swap {
        machine: usize,
        first: usize,
        second: usize,
    },
    /// Takes the task at `index` out of a machine and reinserts it starting at `start`.
    Relocate {
        machine: usize,
        index: usize,
        start: u64,
    },
}

/// Saved state of the machine touched by an applied move.
/// Reverting it restores the schedule exactly, including tasks pushed back by rescheduling.
#[must_use = "dropping an undo makes the move permanent"]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Undo {
    machine: usize,
    tasks: Vec<Task>,
    makespan: u64,
}

impl Undo {
    /// Returns the schedule to the state before the move.
    pub fn revert(self, schedule: &mut Schedule) {
        schedule.restore(self.machine, self.tasks, self.makespan);
    }
}

impl Move {
    /// Returns the machine edited by the move.
    #[must_use]
    pub const fn machine(&self) -> usize {
        match *self {
            Self::Swap { machine, .. } | Self::Relocate { machine, .. } => machine,
        }
    }

    /// Checks whether the move can be applied without reaching past the time horizon.
    #[must_use]
    pub fn can_apply(&self, instance: &Instance, schedule: &Schedule) -> bool {
        let horizon = instance.max_time_units();

        match *self {
            Self::Swap {
                machine,
                first,
                second,
            } => {
                let tasks = schedule.machine(machine);
                let (Some(a), Some(b)) = (tasks.get(first), tasks.get(second)) else {
                    return false;
                };
                first != second
                    && a.start + instance.time(b.job, machine) <= horizon
                    && b.start + instance.time(a.job, machine) <= horizon
            }
            Self::Relocate {
                machine,
                index,
                start,
            } => schedule
                .machine(machine)
                .get(index)
                .is_some_and(|task| start + instance.time(task.job, machine) <= horizon),
        }
    }

    /// Applies the move and reschedules the edited machine.
    /// The move must be applicable, see [`Move::can_apply`].
    pub fn apply(&self, instance: &Instance, schedule: &mut Schedule) -> Undo {
        let machine = self.machine();
        let undo = Undo {
            machine,
            tasks: schedule.machine(machine).to_vec(),
            makespan: schedule.makespan(),
        };

        match *self {
            Self::Swap { first, second, .. } => {
                let tasks = schedule.machine_mut(machine);
                let job = tasks[first].job;
                tasks[first].job = tasks[second].job;
                tasks[second].job = job;
            }
            Self::Relocate { index, start, .. } => {
                let tasks = schedule.machine_mut(machine);
                let task = tasks.remove(index);
                let position = tasks
                    .iter()
                    .position(|other| other.end > start)
                    .unwrap_or(tasks.len());
                let time = instance.time(task.job, machine);
                tasks.insert(position, Task::new(task.job, start, time));
            }
        }

        schedule.reschedule(instance, machine);
        undo
    }

    /// Draws a swap or a relocation with equal probability.
    /// Instances with a single job only have relocations.
    pub fn random(instance: &Instance, schedule: &Schedule, rng: &mut impl Rng) -> Self {
        if instance.jobs() > 1 && rng.gen_bool(0.5) {
            Self::random_swap(instance, rng)
        } else {
            Self::random_relocate(instance, schedule, rng)
        }
    }

    /// Draws two distinct slots of a random machine. The instance must have two jobs.
    pub fn random_swap(instance: &Instance, rng: &mut impl Rng) -> Self {
        let machine = rng.gen_range(0..instance.machines());
        let first = rng.gen_range(0..instance.jobs());
        let mut second = rng.gen_range(0..instance.jobs());
        while first == second {
            second = rng.gen_range(0..instance.jobs());
        }

        Self::Swap {
            machine,
            first,
            second,
        }
    }

    /// Draws a random task and a new start time within the current makespan.
    /// A start later than the current one is drawn again once, which favours compaction.
    pub fn random_relocate(instance: &Instance, schedule: &Schedule, rng: &mut impl Rng) -> Self {
        let machine = rng.gen_range(0..instance.machines());
        let index = rng.gen_range(0..instance.jobs());
        let mut start = rng.gen_range(0..=schedule.makespan());
        if schedule.machine(machine)[index].start < start {
            start = rng.gen_range(0..=schedule.makespan());
        }

        Self::Relocate {
            machine,
            index,
            start,
        }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Swap {
                machine,
                first,
                second,
            } => write!(f, "Swap({first}, {second}, {machine})"),
            Self::Relocate {
                machine,
                index,
                start,
            } => write!(f, "Relocate({index}, {start}, {machine})"),
        }
    }
}
