// `docket verify`: replay the full log and compare with the stored state.

use std::path::PathBuf;

use clap::Args;
use docket_engine::{AnyDocument, Revision};
use serde::Serialize;
use uuid::Uuid;

use crate::envelope;
use crate::exit_code::Diverged;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct VerifyArgs {
    pub file: PathBuf,

    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    pub document_id: Uuid,
    pub document_type: String,
    pub revision: Revision,
    pub operations: usize,
    pub consistent: bool,
}

pub fn run(args: VerifyArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = envelope::read(&args.file).and_then(|document| verify(&document));
    let outcome = match result {
        Ok(result) => {
            output::print_output(format, &result, format_human)?;
            if result.consistent {
                Ok(())
            } else {
                Err(anyhow::Error::new(Diverged))
            }
        }
        Err(e) => Err(e),
    };
    if let Err(e) = &outcome {
        output::print_anyhow_error(format, e);
    }
    outcome
}

fn verify(document: &AnyDocument) -> anyhow::Result<VerifyResult> {
    Ok(VerifyResult {
        document_id: document.id(),
        document_type: document.header().document_type.clone(),
        revision: document.header().revision,
        operations: document.operations().len(),
        consistent: document.verify()?,
    })
}

fn format_human(result: &VerifyResult) -> String {
    let verdict = if result.consistent { "ok" } else { "DIVERGED" };
    format!(
        "{verdict}: {} {} ({} operations, revision global {} local {})",
        result.document_type,
        result.document_id,
        result.operations,
        result.revision.global,
        result.revision.local
    )
}
