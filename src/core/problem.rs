use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A single operation of a job. Contains the machine and the processing time.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Serialize, PartialEq)]
pub struct Operation {
    pub machine: usize,
    pub time: u64,
}

impl Operation {
    /// Creates a new operation.
    #[must_use]
    pub const fn new(machine: usize, time: u64) -> Self {
        Self { machine, time }
    }
}

/// Structural errors of an instance.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InstanceError {
    #[error("instance must have at least one job and one machine")]
    Empty,
    #[error("job {job} has {found} operations, expected {expected}")]
    WrongLength {
        job: usize,
        expected: usize,
        found: usize,
    },
    #[error("job {job} uses machine {machine} which is out of range")]
    MachineOutOfRange { job: usize, machine: usize },
    #[error("job {job} visits machine {machine} more than once")]
    RepeatedMachine { job: usize, machine: usize },
}

/// An instance of the job-shop scheduling problem.
///
/// Every job visits every machine exactly once, in the job's own order.
/// The instance is immutable once built.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize, Eq, Serialize, PartialEq)]
#[serde(try_from = "Vec<Vec<Operation>>", into = "Vec<Vec<Operation>>")]
pub struct Instance {
    jobs: usize,
    machines: usize,
    times: Vec<Vec<u64>>,
    orders: Vec<Vec<usize>>,
    max_time_units: u64,
}

impl Instance {
    /// Creates an instance from job routes. Each route lists the operations of a job in the
    /// order they must be processed.
    ///
    /// # Errors
    /// - If there are no jobs or no machines.
    /// - If a route is not a permutation of all machines.
    pub fn new(routes: Vec<Vec<Operation>>) -> Result<Self, InstanceError> {
        let machines = routes.first().map_or(0, Vec::len);
        if routes.is_empty() || machines == 0 {
            return Err(InstanceError::Empty);
        }

        let mut times = vec![vec![0; machines]; routes.len()];
        let mut orders = Vec::with_capacity(routes.len());

        for (job, route) in routes.into_iter().enumerate() {
            if route.len() != machines {
                return Err(InstanceError::WrongLength {
                    job,
                    expected: machines,
                    found: route.len(),
                });
            }

            let mut seen = vec![false; machines];
            let mut order = Vec::with_capacity(machines);

            for Operation { machine, time } in route {
                match seen.get_mut(machine) {
                    None => return Err(InstanceError::MachineOutOfRange { job, machine }),
                    Some(true) => return Err(InstanceError::RepeatedMachine { job, machine }),
                    Some(visited) => *visited = true,
                }
                times[job][machine] = time;
                order.push(machine);
            }

            orders.push(order);
        }

        let max_time_units = times.iter().flatten().sum();

        Ok(Self {
            jobs: times.len(),
            machines,
            times,
            orders,
            max_time_units,
        })
    }

    /// Returns the number of jobs.
    #[must_use]
    pub const fn jobs(&self) -> usize {
        self.jobs
    }

    /// Returns the number of machines.
    #[must_use]
    pub const fn machines(&self) -> usize {
        self.machines
    }

    /// Returns the number of operations, one per job and machine.
    #[must_use]
    pub const fn operations(&self) -> usize {
        self.jobs * self.machines
    }

    /// Returns the processing time of the job on the machine.
    #[must_use]
    pub fn time(&self, job: usize, machine: usize) -> u64 {
        self.times[job][machine]
    }

    /// Returns the required machine order of the job.
    #[must_use]
    pub fn order(&self, job: usize) -> &[usize] {
        &self.orders[job]
    }

    /// Sum of all processing times.
    /// No schedule without idle time can be longer, so it bounds every sensible start time.
    #[must_use]
    pub const fn max_time_units(&self) -> u64 {
        self.max_time_units
    }

    /// Returns the route of the job.
    pub fn route(&self, job: usize) -> impl Iterator<Item = Operation> + '_ {
        let times = &self.times[job];
        self.orders[job]
            .iter()
            .map(move |&machine| Operation::new(machine, times[machine]))
    }
}

impl TryFrom<Vec<Vec<Operation>>> for Instance {
    type Error = InstanceError;

    fn try_from(routes: Vec<Vec<Operation>>) -> Result<Self, Self::Error> {
        Self::new(routes)
    }
}

impl From<Instance> for Vec<Vec<Operation>> {
    fn from(instance: Instance) -> Self {
        (0..instance.jobs)
            .map(|job| instance.route(job).collect())
            .collect()
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let header: Vec<_> = (0..self.machines).map(|m| m.to_string()).collect();
        let header = header.join(" ");

        writeln!(f, "Jobs: {} x Machines: {}", self.jobs, self.machines)?;
        writeln!(f)?;
        writeln!(f, "Processing times:")?;
        writeln!(f, "Machine: {header}")?;
        for (job, times) in self.times.iter().enumerate() {
            writeln!(f, "Job {job}: {times:?}")?;
        }
        writeln!(f, "Processing order:")?;
        for (job, order) in self.orders.iter().enumerate() {
            writeln!(f, "Job {job}: {order:?}")?;
        }
        Ok(())
    }
}
