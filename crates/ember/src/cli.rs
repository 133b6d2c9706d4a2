//! Command-line and environment parsing for the `ember` binary.
//!
//! ```text
//! ember <N> <M> <MAX_STEPS> <OUT_FILE>
//! ```
//!
//! Worker count and durability strategy come from the environment:
//! `EMBER_THREADS` (positive integer) and `EMBER_DURABILITY`
//! (`auto`, `persistent` or `msync`). `persistent` fails the run unless the
//! output file lands on persistent memory.
//!
//! Arguments are taken as [`OsString`]s, so `OUT_FILE` may be any path the
//! platform accepts, UTF-8 or not.

use std::error::Error;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use ember_core::{ConfigError, GridDims};
use ember_engine::RunConfig;
use ember_store::DurabilityMode;

/// Worker-count override.
pub const THREADS_VAR: &str = "EMBER_THREADS";

/// Durability-mode override.
pub const DURABILITY_VAR: &str = "EMBER_DURABILITY";

/// A fully parsed invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    /// Grid intervals.
    pub dims: GridDims,
    /// Steps to run.
    pub steps_max: u64,
    /// Store file to create.
    pub path: PathBuf,
    /// Run configuration including environment overrides.
    pub config: RunConfig,
}

/// Why an invocation could not be parsed.
#[derive(Clone, Debug, PartialEq)]
pub enum UsageError {
    /// Fewer than four positional arguments.
    MissingArguments {
        /// Positional arguments actually given.
        given: usize,
    },
    /// A positional argument or environment variable did not parse.
    InvalidValue {
        /// Argument or variable name.
        name: &'static str,
        /// The offending value.
        value: String,
        /// What was expected instead.
        expected: String,
    },
    /// The grid size is not usable.
    Dimensions(ConfigError),
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArguments { given } => {
                write!(f, "expected 4 arguments, got {given}")
            }
            Self::InvalidValue {
                name,
                value,
                expected,
            } => write!(f, "invalid {name} '{value}': {expected}"),
            Self::Dimensions(e) => write!(f, "{e}"),
        }
    }
}

impl Error for UsageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Dimensions(e) => Some(e),
            _ => None,
        }
    }
}

/// Usage text for `program`.
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <N> <M> <MAX_STEPS> <OUT_FILE>\n\
         \x20 <N> x <M>     grid intervals per axis\n\
         \x20 <MAX_STEPS>   number of time steps to run\n\
         \x20 <OUT_FILE>    store file to create (must not exist)\n\
         \n\
         Environment:\n\
         \x20 {THREADS_VAR}      stencil worker threads (default: all cores)\n\
         \x20 {DURABILITY_VAR}   auto | persistent | msync (default: auto);\n\
         \x20                    persistent requires a persistent-memory file\n\
         \x20 EMBER_LOG          log filter, e.g. ember_store=debug\n"
    )
}

/// Parse positional arguments (without the program name) and the
/// environment, looked up through `env`.
pub fn parse<I, S, F>(args: I, env: F) -> Result<Invocation, UsageError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    F: Fn(&str) -> Option<String>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if args.len() < 4 {
        return Err(UsageError::MissingArguments { given: args.len() });
    }

    let n = parse_argument::<usize>("N", &args[0])?;
    let m = parse_argument::<usize>("M", &args[1])?;
    let steps_max = parse_argument::<u64>("MAX_STEPS", &args[2])?;
    let dims = GridDims::new(n, m).map_err(UsageError::Dimensions)?;

    let mut config = RunConfig::default();
    if let Some(value) = env(THREADS_VAR) {
        let workers = parse_number::<usize>(THREADS_VAR, &value)?;
        if workers == 0 {
            return Err(UsageError::InvalidValue {
                name: THREADS_VAR,
                value,
                expected: "expected at least 1".to_string(),
            });
        }
        config.workers = Some(workers);
    }
    if let Some(value) = env(DURABILITY_VAR) {
        config.durability = value
            .parse::<DurabilityMode>()
            .map_err(|expected| UsageError::InvalidValue {
                name: DURABILITY_VAR,
                value: value.clone(),
                expected,
            })?;
    }

    Ok(Invocation {
        dims,
        steps_max,
        path: PathBuf::from(&args[3]),
        config,
    })
}

fn parse_argument<T: std::str::FromStr>(
    name: &'static str,
    value: &OsStr,
) -> Result<T, UsageError> {
    match value.to_str() {
        Some(text) => parse_number(name, text),
        None => Err(UsageError::InvalidValue {
            name,
            value: value.to_string_lossy().into_owned(),
            expected: "expected a non-negative integer".to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, UsageError> {
    value.trim().parse().map_err(|_| UsageError::InvalidValue {
        name,
        value: value.to_string(),
        expected: "expected a non-negative integer".to_string(),
    })
}
