use crate::algo::{Config, SolverFactory};
use crate::core::{violations, Score};
use crate::data::load;
use crate::supervisor::supervise;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Report of running a directory of samples.
#[derive(Debug, Deserialize, Serialize)]
pub struct Report {
    solver: String,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create a new report.
    fn new(solver: String) -> Self {
        let entries = Vec::new();
        Self { solver, entries }
    }

    /// Get the solver name.
    #[must_use]
    pub fn solver_name(&self) -> &str {
        &self.solver
    }

    /// Get the entries.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Solver: {}", self.solver)?;
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "-------------------")
    }
}

/// Report of running a single sample.
#[non_exhaustive]
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub score: Score,
    pub makespan: u64,
    pub feasible: bool,
    /// Best known makespan taken from the file name.
    pub best_known: Option<u64>,
    pub time: f64,
    pub timed_out: bool,
}

impl ReportEntry {
    /// Relative distance of the makespan from the best known one, in percent.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn gap(&self) -> Option<f64> {
        let best = self.best_known.filter(|&best| best > 0 && self.feasible)?;
        Some((self.makespan as f64 - best as f64) * 100.0 / best as f64)
    }
}

impl Display for ReportEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}: {} in {:.2} sec", self.name, self.score, self.time)?;
        if let Some(gap) = self.gap() {
            write!(f, " (gap {gap:.2}%)")?;
        }
        if !self.feasible {
            write!(f, " (infeasible)")?;
        }
        if self.timed_out {
            write!(f, " (time limit)")?;
        }
        Ok(())
    }
}

/// Run all samples in the `samples` directory.
/// Print the report to stdout.
///
/// # Errors
/// - If a file cannot be read.
/// - If no samples are found.
///
/// # Panics
/// - If the schedule is invalid.
pub fn samples(config: &Config, factory: SolverFactory) -> anyhow::Result<()> {
    run("samples", config, factory, None).and_then(|report| {
        if report.entries.is_empty() {
            Err(anyhow!("No samples found"))
        } else {
            println!("{report}");
            Ok(())
        }
    })
}

/// Run all instances in the `dir` directory, in file name order.
///
/// # Arguments
/// - `config` is passed to the solver factory for every instance.
/// - `time_limit` bounds each single run.
///
/// # Errors
/// - If a file cannot be read or parsed.
/// - If a run fails.
///
/// # Panics
/// - If the schedule is invalid.
pub fn run(
    dir: impl AsRef<Path>,
    config: &Config,
    factory: SolverFactory,
    time_limit: Option<Duration>,
) -> anyhow::Result<Report> {
    let mut report = Report::new(factory(config).name().into());

    let mut files = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    files.sort_by_key(std::fs::DirEntry::file_name);

    for file in files {
        if !file.file_type()?.is_file() {
            continue;
        }
        let filename = file.file_name();
        let filename = filename.to_str().ok_or_else(|| anyhow!("Cannot read filename"))?;
        let (name, best_known) = parse_filename(filename);

        let instance = Arc::new(load(file.path())?);
        let outcome = supervise(factory(config), Arc::clone(&instance), time_limit)?;
        let schedule = &outcome.solution.schedule;

        assert!(schedule.verify(&instance), "Invalid schedule created");

        report.entries.push(ReportEntry {
            name,
            score: outcome.solution.score,
            makespan: schedule.makespan(),
            feasible: violations(&instance, schedule) == 0,
            best_known,
            time: outcome.elapsed.as_secs_f64(),
            timed_out: outcome.timed_out,
        });
    }

    Ok(report)
}

/// Splits `<name>_<best-known>.<ext>` into the name and the best known makespan.
fn parse_filename(filename: &str) -> (String, Option<u64>) {
    let stem = filename.split('.').next().unwrap_or(filename);
    let best_known = stem
        .rsplit_once('_')
        .and_then(|(_, best)| best.parse().ok());
    (filename.into(), best_known)
}
