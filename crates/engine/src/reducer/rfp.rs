// Request-for-proposals reducer bank.

use docket_common::error::DomainError;
use docket_common::model::rfp::{self, BudgetRange, RfpAction, RfpState, SubmittedProposal};
use docket_common::model::workstream::ProposalStatus;
use docket_common::normalize::{dedup_in_order, non_empty};
use docket_common::types::EmptyState;

use crate::model::{DocumentModel, NoLocalAction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestForProposals;

impl DocumentModel for RequestForProposals {
    const DOCUMENT_TYPE: &'static str = rfp::DOCUMENT_TYPE;

    type Global = RfpState;
    type Local = EmptyState;
    type GlobalAction = RfpAction;
    type LocalAction = NoLocalAction;

    fn reduce_global(state: &mut RfpState, action: RfpAction) -> Result<(), DomainError> {
        match action {
            RfpAction::EditRfp(input) => {
                input.issuer.apply_text(&mut state.issuer);
                input.title.apply_text(&mut state.title);
                input.code.apply_text(&mut state.code);
                input.summary.apply_text(&mut state.summary);
                input.briefing.apply_text(&mut state.briefing);
                input.eligibility_criteria.apply_text(&mut state.eligibility_criteria);
                input.evaluation_criteria.apply_text(&mut state.evaluation_criteria);
                input.deadline.apply_text(&mut state.deadline);
                if let Some(status) = input.status {
                    state.status = status;
                }
                if let Some(tags) = input.tags {
                    state.tags =
                        dedup_in_order(tags.into_iter().filter(|tag| !tag.is_empty()).collect());
                }
            }
            RfpAction::SetBudgetRange(range) => {
                state.budget_range =
                    Some(BudgetRange { currency: non_empty(range.currency), ..range });
            }
            RfpAction::AddContextDocument(document) => {
                state.context_documents.insert(document)?;
            }
            RfpAction::RemoveContextDocument(input) => {
                state.context_documents.remove(&input.id);
            }
            RfpAction::AddProposal(input) => state.proposals.insert(SubmittedProposal {
                id: input.id,
                title: input.title,
                author: input.author.normalized(),
                status: input.status.unwrap_or(ProposalStatus::Submitted),
            })?,
            RfpAction::ChangeProposalStatus(input) => {
                state.proposals.update(&input.id, |proposal| proposal.status = input.status)?;
            }
            RfpAction::RemoveProposal(input) => {
                state.proposals.remove(&input.id);
            }
        }
        Ok(())
    }

    fn reduce_local(_state: &mut EmptyState, action: NoLocalAction) -> Result<(), DomainError> {
        match action {}
    }
}
