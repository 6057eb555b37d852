//! Error types and process exit code mapping.
//!
//! Exit codes: 0 success, 1 user-facing input error, 2 internal failure.

use std::process::{ExitCode, Termination};

/// Top-level application error, distinguishing user-input mistakes (exit 1)
/// from internal failures (exit 2).
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    UserInput(#[from] ArgError),

    #[error("invalid expression: {0}")]
    Expression(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Termination for AppError {
    fn report(self) -> ExitCode {
        match self {
            AppError::UserInput(e) => {
                eprintln!("error: {e}");
                ExitCode::from(1)
            }
            AppError::Expression(e) => {
                eprintln!("error: invalid expression: {e}");
                ExitCode::from(1)
            }
            AppError::Internal(e) => {
                eprintln!("error: {e:?}");
                ExitCode::from(2)
            }
        }
    }
}

/// User-facing argument/input validation errors.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ArgError {
    #[error("input and output must each be given exactly once (positional or flag, not both)")]
    InputOutputConflict,
    #[error("--sample-names can only be used with --mode sample")]
    SampleNamesNeedSampleMode,
    #[error("--caller-names can only be used with --mode caller")]
    CallerNamesNeedCallerMode,
    #[error("number of names ({given}) does not match number of input files ({expected})")]
    NameCountMismatch { given: usize, expected: usize },
    #[error("no input files provided")]
    NoInputFiles,
    #[error("no merge strategy specified; use --intersect, --union, --specific, --min-support, --exact-support, --max-support, or --expression")]
    NoMergeStrategy,
    #[error("--min-support/--max-support/--exact-support must be positive")]
    NonPositiveSupportBound,
    #[error("more than one merge strategy given; exactly one is required")]
    ConflictingMergeStrategies,
}
