/**
 * file: error.rs
 * desc: Error type used across the transcript index, selection, expression and simulation steps.
 */
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    // Missing or inconsistent inputs for the requested mode, detected before anything is written
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Tsv(#[from] csv::Error),

    #[error("{path} is missing the required column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error("Line {line}: could not parse '{value}' as {expected}")]
    Parse {
        line: u64,
        value: String,
        expected: &'static str,
    },

    #[error("{tool} failed ({status}): {command}")]
    ExternalTool {
        tool: String,
        command: String,
        status: ExitStatus,
    },

    #[error("Failed to read alignments from {path}: {message}")]
    Alignment { path: String, message: String },

    #[error("Could not assign {missing} {class} transcript counts after {attempts} sampling attempts")]
    SamplingExhausted {
        class: &'static str,
        missing: usize,
        attempts: usize,
    },
}

pub type Result<T> = std::result::Result<T, SimError>;
