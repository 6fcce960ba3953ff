// `docket log`: list the operations in an envelope.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use docket_common::types::Scope;
use docket_engine::AnyDocument;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::envelope;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct LogArgs {
    pub file: PathBuf,

    /// Only list this scope.
    #[arg(long)]
    scope: Option<Scope>,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub scope: Scope,
    pub index: u64,
    #[serde(rename = "type")]
    pub action_type: String,
    pub timestamp: DateTime<Utc>,
    pub input: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogResult {
    pub document_id: Uuid,
    pub operations: Vec<LogEntry>,
}

pub fn run(args: LogArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    match envelope::read(&args.file) {
        Ok(document) => {
            let operations = entries(&document, args.scope);
            let result = LogResult { document_id: document.id(), operations };
            output::print_output(format, &result, format_human)?;
            Ok(())
        }
        Err(e) => {
            output::print_anyhow_error(format, &e);
            Err(e)
        }
    }
}

/// Operations ordered by scope, then index.
fn entries(document: &AnyDocument, only: Option<Scope>) -> Vec<LogEntry> {
    let log = document.operations();
    Scope::ALL
        .into_iter()
        .filter(|scope| only.is_none_or(|only| only == *scope))
        .flat_map(|scope| {
            log.scope(scope).iter().map(move |operation| LogEntry {
                scope,
                index: operation.index,
                action_type: operation.action_type.clone(),
                timestamp: operation.timestamp,
                input: operation.input.clone(),
            })
        })
        .collect()
}

fn format_human(result: &LogResult) -> String {
    if result.operations.is_empty() {
        return format!("{}: no operations", result.document_id);
    }
    result
        .operations
        .iter()
        .map(|entry| {
            format!(
                "{:<6} #{:<4} {}  {}  {}",
                entry.scope.as_str(),
                entry.index,
                entry.timestamp.to_rfc3339(),
                entry.action_type,
                entry.input
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
