// Payment terms reducer bank.

use docket_common::collection::{IdList, Identified};
use docket_common::error::DomainError;
use docket_common::model::payment_terms::{
    self, AddClauseInput, BonusClause, EscrowDetails, EvaluationTerms, Milestone,
    PaymentTermsAction, PaymentTermsState, PayoutStatus, PenaltyClause, UpdateClauseInput,
};
use docket_common::normalize::non_empty;
use docket_common::types::{Amount, EmptyState};

use crate::model::{DocumentModel, NoLocalAction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentTerms;

impl DocumentModel for PaymentTerms {
    const DOCUMENT_TYPE: &'static str = payment_terms::DOCUMENT_TYPE;

    type Global = PaymentTermsState;
    type Local = EmptyState;
    type GlobalAction = PaymentTermsAction;
    type LocalAction = NoLocalAction;

    fn reduce_global(
        state: &mut PaymentTermsState,
        action: PaymentTermsAction,
    ) -> Result<(), DomainError> {
        match action {
            PaymentTermsAction::SetBasicTerms(input) => {
                input.proposer.apply_text(&mut state.proposer);
                input.payer.apply_text(&mut state.payer);
                input.currency.apply_text(&mut state.currency);
                input.total_amount.apply_to(&mut state.total_amount);
                if let Some(model) = input.payment_model {
                    state.payment_model = model;
                }
            }
            PaymentTermsAction::UpdateStatus(input) => state.status = input.status,
            PaymentTermsAction::AddMilestone(input) => state.milestones.insert(Milestone {
                id: input.id,
                name: input.name,
                amount: input.amount,
                expected_completion_date: non_empty(input.expected_completion_date),
                requires_approval: input.requires_approval,
                payout_status: PayoutStatus::Pending,
            })?,
            PaymentTermsAction::UpdateMilestone(input) => {
                state.milestones.update(&input.id, |milestone| {
                    if let Some(name) = input.name {
                        milestone.name = name;
                    }
                    if let Some(amount) = input.amount {
                        milestone.amount = amount;
                    }
                    input
                        .expected_completion_date
                        .apply_text(&mut milestone.expected_completion_date);
                    if let Some(requires_approval) = input.requires_approval {
                        milestone.requires_approval = requires_approval;
                    }
                })?;
            }
            PaymentTermsAction::UpdateMilestoneStatus(input) => {
                state
                    .milestones
                    .update(&input.id, |milestone| milestone.payout_status = input.status)?;
            }
            PaymentTermsAction::DeleteMilestone(input) => {
                state.milestones.remove(&input.id);
            }
            PaymentTermsAction::ReorderMilestones(input) => state.milestones.reorder(&input.order),
            PaymentTermsAction::SetTimeAndMaterials(terms) => {
                state.time_and_materials = Some(terms)
            }
            PaymentTermsAction::SetEscrowDetails(escrow) => {
                state.escrow_details = Some(EscrowDetails {
                    amount_held: escrow.amount_held,
                    proof_of_funds_document_id: non_empty(escrow.proof_of_funds_document_id),
                    release_conditions: non_empty(escrow.release_conditions),
                    escrow_provider: non_empty(escrow.escrow_provider),
                });
            }
            PaymentTermsAction::SetEvaluationTerms(terms) => {
                state.evaluation = Some(EvaluationTerms {
                    evaluator_team: non_empty(terms.evaluator_team),
                    ..terms
                });
            }
            PaymentTermsAction::AddBonusClause(input) => {
                let AddClauseInput { id, condition, amount, comment } = input;
                state.bonus_clauses.insert(BonusClause {
                    id,
                    condition,
                    amount,
                    comment: non_empty(comment),
                })?;
            }
            PaymentTermsAction::UpdateBonusClause(input) => {
                update_clause(&mut state.bonus_clauses, input, |clause| {
                    (&mut clause.condition, &mut clause.amount, &mut clause.comment)
                })?;
            }
            PaymentTermsAction::DeleteBonusClause(input) => {
                state.bonus_clauses.remove(&input.id);
            }
            PaymentTermsAction::AddPenaltyClause(input) => {
                let AddClauseInput { id, condition, amount, comment } = input;
                state.penalty_clauses.insert(PenaltyClause {
                    id,
                    condition,
                    amount,
                    comment: non_empty(comment),
                })?;
            }
            PaymentTermsAction::UpdatePenaltyClause(input) => {
                update_clause(&mut state.penalty_clauses, input, |clause| {
                    (&mut clause.condition, &mut clause.amount, &mut clause.comment)
                })?;
            }
            PaymentTermsAction::DeletePenaltyClause(input) => {
                state.penalty_clauses.remove(&input.id);
            }
        }
        Ok(())
    }

    fn reduce_local(_state: &mut EmptyState, action: NoLocalAction) -> Result<(), DomainError> {
        match action {}
    }
}

/// Bonus and penalty clauses share a shape but not a type; `fields` projects
/// the mutable parts of either.
fn update_clause<T, F>(
    clauses: &mut IdList<T>,
    input: UpdateClauseInput,
    fields: F,
) -> Result<(), DomainError>
where
    T: Identified,
    F: FnOnce(&mut T) -> (&mut String, &mut Amount, &mut Option<String>),
{
    clauses.update(&input.id, |clause| {
        let (condition, amount, comment) = fields(clause);
        if let Some(value) = input.condition {
            *condition = value;
        }
        if let Some(value) = input.amount {
            *amount = value;
        }
        input.comment.apply_text(comment);
    })
}
