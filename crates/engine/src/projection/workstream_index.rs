// Reference read model: one row per workstream.

use std::collections::{BTreeMap, HashMap};

use docket_common::model::workstream::{self, ProposalStatus, WorkstreamAction, WorkstreamStatus};
use docket_common::normalize::non_empty;
use docket_common::protocol::Operation;
use docket_common::types::Scope;
use serde::Serialize;
use uuid::Uuid;

use super::Projection;
use crate::error::EngineError;
use crate::model::decode_action;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkstreamRow {
    pub title: Option<String>,
    pub status: WorkstreamStatus,
    pub rfp_id: Option<String>,
    pub accepted_proposal: Option<String>,
    #[serde(skip)]
    initial_proposal: Option<String>,
}

impl WorkstreamRow {
    fn set_proposal_status(&mut self, id: &str, status: ProposalStatus) {
        // The newly accepted proposal wins, as in the reducer.
        if status == ProposalStatus::Accepted {
            self.accepted_proposal = Some(id.to_string());
        } else if self.accepted_proposal.as_deref() == Some(id) {
            self.accepted_proposal = None;
        }
    }
}

/// Workstream rows keyed by document ID, built from operation type and input.
#[derive(Debug, Clone, Default)]
pub struct WorkstreamIndex {
    rows: HashMap<Uuid, WorkstreamRow>,
}

impl WorkstreamIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, document_id: Uuid) -> Option<&WorkstreamRow> {
        self.rows.get(&document_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows ordered by document ID.
    pub fn rows(&self) -> BTreeMap<Uuid, &WorkstreamRow> {
        self.rows.iter().map(|(id, row)| (*id, row)).collect()
    }
}

impl Projection for WorkstreamIndex {
    fn name(&self) -> &str {
        "workstream_index"
    }

    fn handles(&self, document_type: &str, scope: Scope) -> bool {
        document_type == workstream::DOCUMENT_TYPE && scope == Scope::Global
    }

    fn apply(&mut self, document_id: Uuid, operation: &Operation) -> Result<(), EngineError> {
        let action: WorkstreamAction = decode_action(
            workstream::DOCUMENT_TYPE,
            Scope::Global,
            &operation.action_type,
            &operation.input,
        )?;
        let row = self.rows.entry(document_id).or_default();

        match action {
            WorkstreamAction::EditWorkstream(input) => {
                input.title.normalized().apply_to(&mut row.title);
                if let Some(status) = input.status {
                    row.status = status;
                }
            }
            WorkstreamAction::SetRequestForProposal(input) => row.rfp_id = Some(input.rfp_id),
            WorkstreamAction::EditInitialProposal(input) => {
                if row.initial_proposal.is_none() {
                    row.initial_proposal = non_empty(input.id);
                }
                if let (Some(status), Some(id)) = (input.status, row.initial_proposal.clone()) {
                    row.set_proposal_status(&id, status);
                }
            }
            WorkstreamAction::AddAlternativeProposal(input) => {
                row.set_proposal_status(&input.id, input.status.unwrap_or_default());
            }
            WorkstreamAction::EditAlternativeProposal(input) => {
                if let Some(status) = input.status {
                    row.set_proposal_status(&input.id, status);
                }
            }
            WorkstreamAction::RemoveAlternativeProposal(input) => {
                row.set_proposal_status(&input.id, ProposalStatus::Rejected);
            }
            WorkstreamAction::EditClientInfo(_)
            | WorkstreamAction::AddPaymentRequest(_)
            | WorkstreamAction::RemovePaymentRequest(_) => {}
        }
        Ok(())
    }
}
