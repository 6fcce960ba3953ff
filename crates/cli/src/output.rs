// Output format auto-detection for the CLI.
//
// TTY → human-readable text. Piped/redirected → structured JSON.
// `--json` flag forces JSON output regardless of terminal.

use serde::Serialize;
use std::io::{self, IsTerminal, Write};

use docket_common::error::DomainError;
use docket_engine::EngineError;

use crate::exit_code::Diverged;

const ANSI_RED: &str = "\x1b[31m";
const ANSI_RESET: &str = "\x1b[0m";

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one object per response).
    Json,
}

impl OutputFormat {
    /// Auto-detect format: JSON if `--json` was passed or stdout is not a TTY.
    pub fn detect(json_flag: bool) -> Self {
        if json_flag {
            return Self::Json;
        }
        Self::detect_from_terminal(io::stdout().is_terminal())
    }

    /// Testable variant that takes an explicit `is_tty` flag.
    pub fn detect_from_terminal(is_tty: bool) -> Self {
        if is_tty {
            Self::Human
        } else {
            Self::Json
        }
    }
}

/// Write a value to stdout in the selected format.
pub fn print_output<T, F>(format: OutputFormat, value: &T, human_fn: F) -> io::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    write_output(&mut io::stdout().lock(), format, value, human_fn)
}

/// Write a value to a provided writer.
pub fn write_output<W, T, F>(
    writer: &mut W,
    format: OutputFormat,
    value: &T,
    human_fn: F,
) -> io::Result<()>
where
    W: Write,
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    match format {
        OutputFormat::Human => {
            writeln!(writer, "{}", human_fn(value))
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
            writeln!(writer)
        }
    }
}

/// Write an error to stderr in the selected format.
pub fn print_error(format: OutputFormat, code: &str, message: &str) {
    let mut err = io::stderr().lock();
    let _ = writeln!(err, "{}", render_error(format, code, message, io::stderr().is_terminal()));
}

/// Print a command failure with the most specific error code in its chain.
pub fn print_anyhow_error(format: OutputFormat, error: &anyhow::Error) {
    print_error(format, error_code(error), &format!("{error:#}"));
}

pub fn error_code(error: &anyhow::Error) -> &'static str {
    for cause in error.chain() {
        if let Some(engine) = cause.downcast_ref::<EngineError>() {
            return engine.code();
        }
        if let Some(domain) = cause.downcast_ref::<DomainError>() {
            return domain.code().as_str();
        }
        if cause.downcast_ref::<Diverged>().is_some() {
            return "REPLAY_DIVERGED";
        }
        if cause.downcast_ref::<io::Error>().is_some() {
            return "IO_ERROR";
        }
    }
    "ERROR"
}

fn render_error(format: OutputFormat, code: &str, message: &str, is_tty: bool) -> String {
    match format {
        OutputFormat::Human if is_tty => format!("{ANSI_RED}error[{code}]:{ANSI_RESET} {message}"),
        OutputFormat::Human => format!("error[{code}]: {message}"),
        OutputFormat::Json => {
            serde_json::json!({ "error": { "code": code, "message": message } }).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use docket_common::error::DomainError;

    use super::*;

    #[test]
    fn detect_tty_returns_human() {
        assert_eq!(OutputFormat::detect_from_terminal(true), OutputFormat::Human);
    }

    #[test]
    fn detect_pipe_returns_json() {
        assert_eq!(OutputFormat::detect_from_terminal(false), OutputFormat::Json);
    }

    #[test]
    fn detect_json_flag_overrides_tty() {
        assert_eq!(OutputFormat::detect(true), OutputFormat::Json);
    }

    #[test]
    fn write_output_human_format() {
        #[derive(Serialize)]
        struct Info {
            name: String,
        }
        let info = Info { name: "alice".into() };
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Human, &info, |i| format!("Name: {}", i.name))
            .expect("write");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "Name: alice\n");
    }

    #[test]
    fn write_output_json_skips_human_fn() {
        #[derive(Serialize)]
        struct Info {
            revision: u64,
        }
        let mut buf = Vec::new();
        write_output(&mut buf, OutputFormat::Json, &Info { revision: 3 }, |_| {
            unreachable!("human_fn should not be called in JSON mode")
        })
        .expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.ends_with('\n'));
        let parsed: serde_json::Value = serde_json::from_str(output.trim()).expect("json");
        assert_eq!(parsed["revision"], 3);
    }

    #[test]
    fn error_code_prefers_domain_codes() {
        let err = anyhow::Error::new(DomainError::not_found("milestone", "m9"))
            .context("failed to apply UPDATE_MILESTONE");
        assert_eq!(error_code(&err), "NOT_FOUND");

        let err = anyhow::Error::new(io::Error::new(io::ErrorKind::NotFound, "missing"))
            .context("failed to read envelope");
        assert_eq!(error_code(&err), "IO_ERROR");
        assert_eq!(error_code(&anyhow::anyhow!("other")), "ERROR");
    }

    #[test]
    fn render_error_formats() {
        assert_eq!(
            render_error(OutputFormat::Human, "NOT_FOUND", "boom", false),
            "error[NOT_FOUND]: boom"
        );
        let colored = render_error(OutputFormat::Human, "NOT_FOUND", "boom", true);
        assert!(colored.contains(ANSI_RED) && colored.contains(ANSI_RESET));

        let json: serde_json::Value =
            serde_json::from_str(&render_error(OutputFormat::Json, "DUPLICATE_ID", "dup", true))
                .expect("json");
        assert_eq!(json["error"]["code"], "DUPLICATE_ID");
        assert_eq!(json["error"]["message"], "dup");
    }
}
