// `docket apply`: dispatch one action against an envelope file.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use docket_common::protocol::Action;
use docket_common::types::Scope;
use docket_engine::Revision;
use serde::Serialize;
use uuid::Uuid;

use crate::envelope;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Envelope file, rewritten in place on success.
    pub file: PathBuf,

    /// Operation type, e.g. `ADD_MILESTONE`.
    pub action_type: String,

    /// Action input as a JSON object.
    #[arg(long, default_value = "{}")]
    input: String,

    #[arg(long, default_value_t = Scope::Global)]
    scope: Scope,

    /// Operation timestamp (RFC 3339). Defaults to now.
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    pub document_id: Uuid,
    pub action_type: String,
    pub scope: Scope,
    pub index: u64,
    pub revision: Revision,
}

pub fn run(args: ApplyArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    match apply(&args) {
        Ok(result) => {
            output::print_output(format, &result, format_human)?;
            Ok(())
        }
        Err(e) => {
            output::print_anyhow_error(format, &e);
            Err(e)
        }
    }
}

fn apply(args: &ApplyArgs) -> anyhow::Result<ApplyResult> {
    let document = envelope::read(&args.file)?;
    let input = serde_json::from_str(&args.input).context("--input is not valid JSON")?;
    let mut action = Action::new(args.action_type.clone(), input).with_scope(args.scope);
    if let Some(at) = args.at {
        action = action.at(at);
    }

    let index = document.operations().next_index(args.scope);
    let next = document
        .dispatch(&action)
        .with_context(|| format!("{} rejected by {}", args.action_type, document.id()))?;
    envelope::write(&args.file, &next)?;

    Ok(ApplyResult {
        document_id: next.id(),
        action_type: args.action_type.clone(),
        scope: args.scope,
        index,
        revision: next.header().revision,
    })
}

fn format_human(result: &ApplyResult) -> String {
    format!(
        "applied {} as {} #{} (revision: global {}, local {})",
        result.action_type,
        result.scope,
        result.index,
        result.revision.global,
        result.revision.local
    )
}
