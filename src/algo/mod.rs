mod descent;
mod greedy;
mod ils;
mod local_search;
mod perturb;

pub use descent::Descent;
pub use greedy::Greedy;
pub use ils::{IteratedLocalSearch, StopReason};
pub use local_search::{LocalSearch, Strategy};
pub use perturb::perturb;

use crate::core::{Penalty, Score, Solver};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Builds a solver from the run configuration.
pub type SolverFactory = fn(&Config) -> Box<dyn Solver>;

/// Every solver of the crate, registered next to its implementation.
#[allow(unsafe_code)]
#[linkme::distributed_slice]
pub static SOLVERS: [SolverFactory];

/// Run configuration shared by all solvers.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Iterations without improvement before the search stops. `None` means no limit.
    pub max_stagnation: Option<usize>,
    /// Score at which the search stops early.
    pub goal: Option<Score>,
    /// Number of random moves applied by the first perturbation after an improvement.
    pub strength: usize,
    /// Probability of restarting an iteration from the best schedule.
    pub rollback_chance: f64,
    pub strategy: Strategy,
    pub penalty: Penalty,
    /// Seed of the random generator. Drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Config {
    fn rng(&self) -> StdRng {
        self.seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_stagnation: Some(100),
            goal: None,
            strength: 2,
            rollback_chance: 0.1,
            strategy: Strategy::default(),
            penalty: Penalty::default(),
            seed: None,
        }
    }
}

/// Returns the factory of the solver with the given name.
#[must_use]
pub fn find(name: &str) -> Option<SolverFactory> {
    let config = Config::default();
    SOLVERS
        .iter()
        .copied()
        .find(|factory| factory(&config).name().eq_ignore_ascii_case(name))
}
