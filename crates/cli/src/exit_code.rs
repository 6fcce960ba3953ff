// Consistent exit codes for the docket CLI.
//
//   0  = success
//   1  = general error (I/O, bad envelope)
//   2  = usage/argument error, including action input that fails validation
//   12 = action rejected by a document rule
//   13 = envelope state does not match its replayed log

use std::process;

use docket_common::error::DomainError;
use docket_engine::EngineError;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    Rejected = 12,
    Diverged = 13,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(engine) = cause.downcast_ref::<EngineError>() {
                return Self::from_code(engine.code());
            }
            if let Some(domain) = cause.downcast_ref::<DomainError>() {
                return Self::from_code(domain.code().as_str());
            }
            if cause.downcast_ref::<Diverged>().is_some() {
                return Self::Diverged;
            }
        }
        Self::Error
    }

    /// Map an error code string to an exit code.
    pub fn from_code(code: &str) -> Self {
        match code {
            "VALIDATION_FAILED" => Self::Usage,
            "DUPLICATE_ID" | "NOT_FOUND" | "INVARIANT_VIOLATION" => Self::Rejected,
            "OUT_OF_ORDER" => Self::Diverged,
            _ => Self::Error,
        }
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}

/// Replaying an envelope's log did not reproduce its stored state.
#[derive(Debug)]
pub struct Diverged;

impl std::fmt::Display for Diverged {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("replayed state does not match stored state")
    }
}

impl std::error::Error for Diverged {}
