// `docket history`: state as of an earlier revision or point in time.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args};
use docket_common::types::Scope;
use docket_engine::history::{HistoryQuery, ReplayEngine};
use docket_engine::{AnyDocument, EngineConfig};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::envelope;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["index", "at"])))]
pub struct HistoryArgs {
    pub file: PathBuf,

    /// Replay `--scope` through this operation index (inclusive).
    #[arg(long)]
    index: Option<u64>,

    #[arg(long, default_value_t = Scope::Global, requires = "index")]
    scope: Scope,

    /// Replay every operation stamped at or before this time (RFC 3339).
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResult {
    pub document_id: Uuid,
    pub query: HistoryQuery,
    pub applied_ops: usize,
    pub capped: bool,
    pub state: Value,
}

pub fn run(args: HistoryArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let engine = ReplayEngine::new(config.history.max_replay_ops);
    let result = envelope::read(&args.file).and_then(|document| {
        let query = query(&args);
        revision(&document, &engine, query)
    });
    match result {
        Ok(result) => {
            if result.capped {
                tracing::warn!(
                    applied_ops = result.applied_ops,
                    max_replay_ops = engine.max_ops(),
                    "replay capped; state is partial"
                );
            }
            output::print_output(format, &result, format_human)?;
            Ok(())
        }
        Err(e) => {
            output::print_anyhow_error(format, &e);
            Err(e)
        }
    }
}

fn query(args: &HistoryArgs) -> HistoryQuery {
    match (args.index, args.at) {
        (Some(index), _) => HistoryQuery::AtIndex { scope: args.scope, index },
        (None, Some(at)) => HistoryQuery::AtTime { at },
        // The arg group requires one of the two; treat a bare call as "now".
        (None, None) => HistoryQuery::AtTime { at: Utc::now() },
    }
}

fn revision(
    document: &AnyDocument,
    engine: &ReplayEngine,
    query: HistoryQuery,
) -> anyhow::Result<HistoryResult> {
    let replayed = document.revision(engine, query)?;
    Ok(HistoryResult {
        document_id: document.id(),
        query,
        applied_ops: replayed.applied_ops,
        capped: replayed.capped,
        state: replayed.state,
    })
}

fn format_human(result: &HistoryResult) -> String {
    let target = match result.query {
        HistoryQuery::AtIndex { scope, index } => format!("{scope} #{index}"),
        HistoryQuery::AtTime { at } => at.to_rfc3339(),
    };
    let capped = if result.capped { " (capped)" } else { "" };
    let state = serde_json::to_string_pretty(&result.state)
        .unwrap_or_else(|_| result.state.to_string());
    format!(
        "{} at {target}: {} operations replayed{capped}\n{state}",
        result.document_id, result.applied_ops
    )
}

#[cfg(test)]
mod tests {
    use docket_common::model::DocumentKind;
    use docket_common::protocol::Action;
    use serde_json::json;

    use super::*;

    fn profile() -> AnyDocument {
        ["Alpha", "Beta", "Gamma"]
            .into_iter()
            .enumerate()
            .try_fold(AnyDocument::create(DocumentKind::NetworkProfile), |doc, (step, name)| {
                let at = format!("2026-02-0{}T00:00:00Z", step + 1).parse().expect("timestamp");
                doc.dispatch(&Action::new("SET_PROFILE_NAME", json!({ "name": name })).at(at))
            })
            .expect("dispatch")
    }

    #[test]
    fn revision_by_index_and_time() {
        let document = profile();
        let engine = ReplayEngine::default();

        let by_index =
            revision(&document, &engine, HistoryQuery::AtIndex { scope: Scope::Global, index: 1 })
                .expect("by index");
        assert_eq!(by_index.state["global"]["name"], json!("Beta"));
        assert_eq!(by_index.applied_ops, 2);

        let at = "2026-02-01T12:00:00Z".parse().expect("timestamp");
        let by_time = revision(&document, &engine, HistoryQuery::AtTime { at }).expect("by time");
        assert_eq!(by_time.state["global"]["name"], json!("Alpha"));
        assert!(format_human(&by_time).contains("1 operations replayed"));
    }

    #[test]
    fn capped_replay_is_reported() {
        let document = profile();
        let query = HistoryQuery::AtTime { at: Utc::now() };
        let result = revision(&document, &ReplayEngine::new(2), query).expect("capped");
        assert!(result.capped);
        assert_eq!(result.state["global"]["name"], json!("Beta"));
        assert!(format_human(&result).contains("(capped)"));
    }
}
