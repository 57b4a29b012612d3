use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use job_shop_ils::algo::{self, Config, SolverFactory, Strategy};
use job_shop_ils::core::{Instance, Operation, Penalty, Solver};
use job_shop_ils::{data, run_reader};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{BufReader, Write};
use std::num::NonZero;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Copy, Clone, Debug)]
struct Algorithm(usize, &'static str);

impl Algorithm {
    fn factory(self) -> SolverFactory {
        algo::SOLVERS[self.0]
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl ValueEnum for Algorithm {
    fn value_variants<'a>() -> &'a [Self] {
        static ALGORITHMS: std::sync::LazyLock<Vec<Algorithm>> = std::sync::LazyLock::new(|| {
            let config = Config::default();
            let iter = algo::SOLVERS.iter().enumerate();
            iter.map(|(i, factory)| Algorithm(i, factory(&config).name()))
                .collect()
        });

        ALGORITHMS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.1))
    }
}

/// Application solving the job-shop scheduling problem.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Application {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one of the implemented algorithms on a single instance.
    Run {
        #[clap(default_value = "ILS")]
        algorithm: Algorithm,
        /// The instance file. Read from stdin when absent.
        #[clap(short = 'f', long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        search: SearchArgs,
        /// Print the report as JSON.
        #[clap(long)]
        json: bool,
        /// Print a character timeline of the schedule.
        #[clap(long)]
        timeline: bool,
    },
    /// Run benchmarks on a directory of instances.
    Bench {
        /// The input directory.
        input: PathBuf,
        /// Exclude solvers.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Generate random instances of the job-shop problem.
    Gen {
        /// The number of jobs.
        jobs: NonZero<usize>,
        /// The number of machines.
        machines: NonZero<usize>,
        /// The maximum processing time of an operation.
        max_time: NonZero<u64>,
        /// Number of instances to generate.
        #[clap(short, long, default_value = "1")]
        amount: NonZero<u64>,
        /// Path to output the generated instances. If the directory does not exist, it will be created.
        #[clap(short, long, default_value = "output")]
        output: PathBuf,
        /// Seed of the random generator.
        #[clap(short, long)]
        seed: Option<u64>,
    },
}

/// Search parameters. A value of -1 disables the corresponding limit.
#[derive(Debug, Args)]
#[command(next_help_heading = "Search")]
struct SearchArgs {
    /// Time limit of a single run in seconds.
    #[clap(short, long, default_value = "-1", allow_negative_numbers = true)]
    time_limit: f64,
    /// Iterations without improvement before the search stops.
    #[clap(short = 'i', long, default_value = "100", allow_negative_numbers = true)]
    max_stagnation: i64,
    /// Score at which the search stops.
    #[clap(short, long, default_value = "-1", allow_negative_numbers = true)]
    goal: i64,
    /// Initial number of random moves of a perturbation.
    #[clap(short = 'k', long, default_value = "2")]
    strength: usize,
    /// Probability of restarting an iteration from the best schedule.
    #[clap(short, long, default_value = "0.1", value_parser = probability)]
    rollback_chance: f64,
    /// Local search strategy.
    #[clap(long, value_enum, default_value = "best")]
    strategy: Strategy,
    /// Weight of a precedence violation: `dominant` or a number.
    #[clap(short, long, default_value = "dominant", value_parser = penalty)]
    penalty: Penalty,
    /// Seed of the random generator.
    #[clap(short, long)]
    seed: Option<u64>,
}

impl SearchArgs {
    fn config(&self) -> Config {
        Config {
            max_stagnation: usize::try_from(self.max_stagnation).ok(),
            goal: u64::try_from(self.goal).ok(),
            strength: self.strength,
            rollback_chance: self.rollback_chance,
            strategy: self.strategy,
            penalty: self.penalty,
            seed: self.seed,
        }
    }

    fn time_limit(&self) -> Option<Duration> {
        if self.time_limit < 0.0 {
            None
        } else {
            Duration::try_from_secs_f64(self.time_limit).ok()
        }
    }
}

fn probability(value: &str) -> Result<f64, String> {
    let value: f64 = value.parse().map_err(|_| format!("`{value}` is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0..=1"))
    }
}

fn penalty(value: &str) -> Result<Penalty, String> {
    if value.eq_ignore_ascii_case("dominant") {
        Ok(Penalty::Dominant)
    } else {
        let weight = value
            .parse()
            .map_err(|_| format!("`{value}` is neither `dominant` nor a number"))?;
        Ok(Penalty::Fixed(weight))
    }
}

fn solvers(exclude: &[Algorithm]) -> impl Iterator<Item = SolverFactory> + '_ {
    let config = Config::default();
    let iter = algo::SOLVERS.iter().copied();
    iter.filter(move |factory| {
        let name = factory(&config).name();
        !exclude.iter().any(|algorithm| algorithm.1 == name)
    })
}

fn gen_instance(jobs: usize, machines: usize, max_time: u64, rng: &mut impl Rng) -> anyhow::Result<Instance> {
    let routes = (0..jobs)
        .map(|_| {
            let mut order: Vec<_> = (0..machines).collect();
            order.shuffle(rng);
            order
                .into_iter()
                .map(|machine| Operation::new(machine, rng.gen_range(1..=max_time)))
                .collect()
        })
        .collect();
    Ok(Instance::new(routes)?)
}

fn main() -> anyhow::Result<()> {
    let application = Application::parse();

    env_logger::Builder::new()
        .filter_level(application.verbose.log_level_filter())
        .init();

    match application.command {
        Command::Run {
            algorithm,
            input,
            search,
            json,
            timeline,
        } => {
            let solver: Box<dyn Solver> = algorithm.factory()(&search.config());
            let report = match input {
                Some(path) => {
                    let mut reader = BufReader::new(File::open(path)?);
                    run_reader(solver, &mut reader, search.time_limit())?
                }
                None => run_reader(solver, &mut std::io::stdin().lock(), search.time_limit())?,
            };

            if json {
                println!("{}", report.to_json()?);
            } else {
                println!("{report}");
            }
            if timeline {
                print!("{}", report.timeline);
            }
            Ok(())
        }
        Command::Bench {
            input,
            exclude,
            search,
        } => {
            let config = search.config();
            for factory in solvers(&exclude) {
                println!("{}", data::run(&input, &config, factory, search.time_limit())?);
            }
            Ok(())
        }
        Command::Gen {
            jobs,
            machines,
            max_time,
            amount,
            output,
            seed,
        } => {
            let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

            if !output.try_exists()? {
                std::fs::create_dir_all(&output)?;
            }

            for i in 0..amount.get() {
                let instance = gen_instance(jobs.get(), machines.get(), max_time.get(), &mut rng)?;
                let filename = format!("{jobs}x{machines}-{i}.txt");
                File::create(output.join(filename))?.write_all(data::to_string(&instance).as_bytes())?;
            }
            log::info!("Generated {amount} instances in {}", output.display());
            Ok(())
        }
    }
}
