// Payment terms: milestones, clauses, and nested billing configuration.

use serde::{Deserialize, Serialize};

use crate::collection::{IdList, Identified};
use crate::patch::Patch;
use crate::types::Amount;

pub const DOCUMENT_TYPE: &str = "docket/payment-terms";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTermsStatus {
    #[default]
    Draft,
    SubmittedForApproval,
    Accepted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentModel {
    #[default]
    Milestone,
    TimeAndMaterials,
}

/// Milestone payout lifecycle. `REJECTED` is reachable from any non-terminal
/// state; writes are not checked against a transition graph.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutStatus {
    #[default]
    Pending,
    ReadyForReview,
    Approved,
    Paid,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub amount: Amount,
    #[serde(default)]
    pub expected_completion_date: Option<String>,
    pub requires_approval: bool,
    #[serde(default)]
    pub payout_status: PayoutStatus,
}

impl Identified for Milestone {
    const ENTITY: &'static str = "milestone";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BonusClause {
    pub id: String,
    pub condition: String,
    pub amount: Amount,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Identified for BonusClause {
    const ENTITY: &'static str = "bonus clause";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyClause {
    pub id: String,
    pub condition: String,
    pub amount: Amount,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Identified for PenaltyClause {
    const ENTITY: &'static str = "penalty clause";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Hour,
    Day,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeAndMaterials {
    pub time_unit: TimeUnit,
    pub rate: Amount,
    pub billing_frequency: BillingFrequency,
    pub timesheet_required: bool,
    #[serde(default)]
    pub max_billable_units: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EscrowDetails {
    pub amount_held: Amount,
    #[serde(default)]
    pub proof_of_funds_document_id: Option<String>,
    #[serde(default)]
    pub release_conditions: Option<String>,
    #[serde(default)]
    pub escrow_provider: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationFrequency {
    Weekly,
    Monthly,
    PerMilestone,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationTerms {
    pub frequency: EvaluationFrequency,
    #[serde(default)]
    pub evaluator_team: Option<String>,
    #[serde(default)]
    pub criteria: Vec<String>,
    pub impacts_payout: bool,
    pub impacts_reputation: bool,
    pub comments_visible_to_client: bool,
}

/// Global state of a payment terms document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentTermsState {
    pub proposer: Option<String>,
    pub payer: Option<String>,
    pub currency: Option<String>,
    pub payment_model: PaymentModel,
    pub status: PaymentTermsStatus,
    pub total_amount: Option<Amount>,
    pub milestones: IdList<Milestone>,
    pub time_and_materials: Option<TimeAndMaterials>,
    pub escrow_details: Option<EscrowDetails>,
    pub evaluation: Option<EvaluationTerms>,
    pub bonus_clauses: IdList<BonusClause>,
    pub penalty_clauses: IdList<PenaltyClause>,
}

// ── Action schema ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetBasicTermsInput {
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub proposer: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub payer: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub currency: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_model: Option<PaymentModel>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub total_amount: Patch<Amount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusInput {
    pub status: PaymentTermsStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddMilestoneInput {
    pub id: String,
    pub name: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_completion_date: Option<String>,
    pub requires_approval: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMilestoneInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub expected_completion_date: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_approval: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMilestoneStatusInput {
    pub id: String,
    pub status: PayoutStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteByIdInput {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReorderMilestonesInput {
    pub order: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddClauseInput {
    pub id: String,
    pub condition: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClauseInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub comment: Patch<String>,
}

/// Every operation a payment terms document accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "input", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTermsAction {
    SetBasicTerms(SetBasicTermsInput),
    UpdateStatus(UpdateStatusInput),
    AddMilestone(AddMilestoneInput),
    UpdateMilestone(UpdateMilestoneInput),
    UpdateMilestoneStatus(UpdateMilestoneStatusInput),
    DeleteMilestone(DeleteByIdInput),
    ReorderMilestones(ReorderMilestonesInput),
    SetTimeAndMaterials(TimeAndMaterials),
    SetEscrowDetails(EscrowDetails),
    SetEvaluationTerms(EvaluationTerms),
    AddBonusClause(AddClauseInput),
    UpdateBonusClause(UpdateClauseInput),
    DeleteBonusClause(DeleteByIdInput),
    AddPenaltyClause(AddClauseInput),
    UpdatePenaltyClause(UpdateClauseInput),
    DeletePenaltyClause(DeleteByIdInput),
}

pub const OPERATIONS: &[&str] = &[
    "SET_BASIC_TERMS",
    "UPDATE_STATUS",
    "ADD_MILESTONE",
    "UPDATE_MILESTONE",
    "UPDATE_MILESTONE_STATUS",
    "DELETE_MILESTONE",
    "REORDER_MILESTONES",
    "SET_TIME_AND_MATERIALS",
    "SET_ESCROW_DETAILS",
    "SET_EVALUATION_TERMS",
    "ADD_BONUS_CLAUSE",
    "UPDATE_BONUS_CLAUSE",
    "DELETE_BONUS_CLAUSE",
    "ADD_PENALTY_CLAUSE",
    "UPDATE_PENALTY_CLAUSE",
    "DELETE_PENALTY_CLAUSE",
];
