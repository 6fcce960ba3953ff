// `docket new`: create a fresh document envelope.

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use docket_common::model::DocumentKind;
use docket_engine::AnyDocument;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::envelope;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Document type, full (`docket/workstream`) or short (`workstream`).
    #[arg(value_parser = parse_kind)]
    pub document_type: DocumentKind,

    /// Write the envelope to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Replace `--out` if it already exists.
    #[arg(long, requires = "out")]
    force: bool,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum NewResult {
    Written {
        #[serde(rename = "documentId")]
        document_id: Uuid,
        #[serde(rename = "documentType")]
        document_type: String,
        path: PathBuf,
    },
    Envelope(Value),
}

pub fn run(args: NewArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    match create(&args) {
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

fn create(args: &NewArgs) -> anyhow::Result<NewResult> {
    let document = AnyDocument::create(args.document_type);
    let Some(path) = &args.out else {
        return Ok(NewResult::Envelope(serde_json::to_value(&document)?));
    };
    if path.exists() && !args.force {
        bail!("`{}` already exists (pass --force to replace it)", path.display());
    }
    envelope::write(path, &document)?;
    tracing::info!(document_id = %document.id(), path = %path.display(), "envelope created");
    Ok(NewResult::Written {
        document_id: document.id(),
        document_type: document.header().document_type.clone(),
        path: path.clone(),
    })
}

fn parse_kind(value: &str) -> Result<DocumentKind, String> {
    DocumentKind::parse(value).ok_or_else(|| {
        let known = DocumentKind::ALL.map(DocumentKind::document_type).join(", ");
        format!("unknown document type `{value}` (known: {known})")
    })
}

fn format_human(result: &NewResult) -> String {
    match result {
        NewResult::Written { document_id, document_type, path } => {
            format!("created {document_type} {document_id} at {}", path.display())
        }
        NewResult::Envelope(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn args(out: Option<PathBuf>, force: bool) -> NewArgs {
        NewArgs { document_type: DocumentKind::Workstream, out, force, json: true }
    }

    #[test]
    fn parse_kind_accepts_short_names() {
        assert_eq!(parse_kind("request-for-proposals"), Ok(DocumentKind::RequestForProposals));
        assert_eq!(parse_kind("payment-terms"), Ok(DocumentKind::PaymentTerms));
        let err = parse_kind("invoice").expect_err("unknown");
        assert!(err.contains("docket/workstream"));
    }

    #[test]
    fn create_writes_and_refuses_to_clobber() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("ws.json");

        let result = create(&args(Some(path.clone()), false)).expect("create");
        let NewResult::Written { document_id, .. } = result else {
            panic!("expected a written envelope");
        };
        assert_eq!(envelope::read(&path).expect("read").id(), document_id);

        create(&args(Some(path.clone()), false)).expect_err("exists");
        let replaced = create(&args(Some(path.clone()), true)).expect("force");
        assert!(matches!(
            replaced,
            NewResult::Written { document_id: id, .. } if id != document_id
        ));
    }

    #[test]
    fn create_without_out_returns_the_envelope() {
        let NewResult::Envelope(value) = create(&args(None, false)).expect("create") else {
            panic!("expected an inline envelope");
        };
        assert_eq!(value["header"]["documentType"], "docket/workstream");
        assert_eq!(value["operations"]["global"], serde_json::json!([]));
    }
}
