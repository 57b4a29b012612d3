mod report;
mod run;

pub use report::*;
pub use run::*;

use crate::core::{Instance, InstanceError, Operation};
use std::fmt::Write;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Errors of reading an instance.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read instance: {0}")]
    Io(#[from] std::io::Error),
    #[error("instance is empty, expected a `jobs machines` header")]
    MissingHeader,
    #[error("header must contain exactly the number of jobs and machines")]
    BadHeader,
    #[error("line {line}: expected an integer, found `{token}`")]
    NotInteger { line: usize, token: String },
    #[error("line {line}: expected {expected} values, found {found}")]
    WrongCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("expected {expected} job lines, found {found}")]
    MissingJobs { expected: usize, found: usize },
    #[error(transparent)]
    Invalid(#[from] InstanceError),
}

/// Reads an instance in the text format.
///
/// The first line holds the number of jobs and machines. Each of the following lines lists
/// the `machine time` pairs of one job in processing order. Blank lines are skipped.
///
/// # Errors
/// - If the reader fails.
/// - If the text does not follow the format or describes an invalid instance.
pub fn deserialize(reader: &mut impl BufRead) -> Result<Instance, LoadError> {
    let mut lines = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push((number + 1, line));
        }
    }
    let mut lines = lines.into_iter();

    let (number, header) = lines.next().ok_or(LoadError::MissingHeader)?;
    let header = parse_line(number, &header)?;
    let [jobs, machines] = header[..] else {
        return Err(LoadError::BadHeader);
    };
    let (jobs, machines) = (to_usize(number, jobs)?, to_usize(number, machines)?);

    let mut routes = Vec::with_capacity(jobs);
    for (number, line) in lines.by_ref().take(jobs) {
        let values = parse_line(number, &line)?;
        if values.len() != 2 * machines {
            return Err(LoadError::WrongCount {
                line: number,
                expected: 2 * machines,
                found: values.len(),
            });
        }

        let mut route = Vec::with_capacity(machines);
        for pair in values.chunks_exact(2) {
            route.push(Operation::new(to_usize(number, pair[0])?, pair[1]));
        }
        routes.push(route);
    }

    if routes.len() != jobs {
        return Err(LoadError::MissingJobs {
            expected: jobs,
            found: routes.len(),
        });
    }
    if let Some((number, line)) = lines.next() {
        return Err(LoadError::WrongCount {
            line: number,
            expected: 0,
            found: line.split_whitespace().count(),
        });
    }

    Ok(Instance::new(routes)?)
}

/// Reads an instance from a file.
///
/// # Errors
/// - If the file cannot be opened or parsed.
pub fn load(path: impl AsRef<Path>) -> Result<Instance, LoadError> {
    deserialize(&mut BufReader::new(File::open(path)?))
}

/// Writes an instance in the text format read by [`deserialize`].
#[must_use]
pub fn to_string(instance: &Instance) -> String {
    let mut text = format!("{} {}\n", instance.jobs(), instance.machines());
    for job in 0..instance.jobs() {
        let pairs: Vec<_> = instance
            .route(job)
            .map(|op| format!("{} {}", op.machine, op.time))
            .collect();
        let _ = writeln!(text, "{}", pairs.join(" "));
    }
    text
}

fn parse_line(line: usize, text: &str) -> Result<Vec<u64>, LoadError> {
    text.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| LoadError::NotInteger {
                line,
                token: token.into(),
            })
        })
        .collect()
}

fn to_usize(line: usize, value: u64) -> Result<usize, LoadError> {
    usize::try_from(value).map_err(|_| LoadError::NotInteger {
        line,
        token: value.to_string(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(text: &str) -> Result<Instance, LoadError> {
        deserialize(&mut text.as_bytes())
    }

    #[test]
    fn instance_should_round_trip_through_text() -> anyhow::Result<()> {
        let instance = load("samples/ft06_55.txt")?;

        assert_eq!(instance.jobs(), 6);
        assert_eq!(instance.machines(), 6);
        assert_eq!(instance.order(0), &[2, 0, 1, 3, 5, 4]);
        assert_eq!(instance.time(0, 3), 7);
        assert_eq!(instance.max_time_units(), 197);
        assert_eq!(parse(&to_string(&instance))?, instance);
        Ok(())
    }

    #[test]
    fn parser_should_skip_blank_lines() -> anyhow::Result<()> {
        let instance = parse("\n2 2\n\n0 3 1 2\n  1 2 0 4  \n\n")?;
        assert_eq!(instance, load("samples/scenario_2x2.txt")?);
        Ok(())
    }

    #[test]
    fn parser_should_report_malformed_input() {
        assert!(matches!(parse(""), Err(LoadError::MissingHeader)));
        assert!(matches!(parse("2\n"), Err(LoadError::BadHeader)));
        assert!(matches!(
            parse("2 x\n"),
            Err(LoadError::NotInteger { line: 1, .. })
        ));
        assert!(matches!(
            parse("2 2\n0 3 1\n1 2 0 4\n"),
            Err(LoadError::WrongCount {
                line: 2,
                expected: 4,
                found: 3
            })
        ));
        assert!(matches!(
            parse("2 2\n0 3 1 2\n"),
            Err(LoadError::MissingJobs {
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            parse("1 2\n0 3 1 2\n1 1\n"),
            Err(LoadError::WrongCount { line: 3, .. })
        ));
        assert!(matches!(
            parse("1 2\n0 3 0 2\n"),
            Err(LoadError::Invalid(InstanceError::RepeatedMachine { .. }))
        ));
        assert!(matches!(
            parse("1 2\n0 3 -1 2\n"),
            Err(LoadError::NotInteger { line: 2, .. })
        ));
        assert!(matches!(
            parse("0 0\n"),
            Err(LoadError::Invalid(InstanceError::Empty))
        ));
    }

    #[test]
    fn missing_file_should_fail() {
        assert!(matches!(
            load("samples/does_not_exist.txt"),
            Err(LoadError::Io(_))
        ));
    }
}
