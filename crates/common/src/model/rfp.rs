// Request for proposals: briefing, budget, submitted proposals, context documents.

use serde::{Deserialize, Serialize};

use crate::collection::{IdList, Identified};
use crate::model::workstream::ProposalStatus;
use crate::patch::Patch;
use crate::types::Author;

pub const DOCUMENT_TYPE: &str = "docket/request-for-proposals";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfpStatus {
    #[default]
    Draft,
    RequestForComments,
    NotOpened,
    OpenForProposals,
    Awarded,
    NotAwarded,
    Closed,
    Canceled,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedProposal {
    pub id: String,
    pub title: String,
    pub author: Author,
    #[serde(default)]
    pub status: ProposalStatus,
}

impl Identified for SubmittedProposal {
    const ENTITY: &'static str = "proposal";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContextDocument {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl Identified for ContextDocument {
    const ENTITY: &'static str = "context document";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Global state of a request-for-proposals document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RfpState {
    pub issuer: Option<String>,
    pub title: Option<String>,
    pub code: Option<String>,
    pub summary: Option<String>,
    pub briefing: Option<String>,
    pub eligibility_criteria: Option<String>,
    pub evaluation_criteria: Option<String>,
    pub deadline: Option<String>,
    pub status: RfpStatus,
    pub budget_range: Option<BudgetRange>,
    pub tags: Vec<String>,
    pub proposals: IdList<SubmittedProposal>,
    pub context_documents: IdList<ContextDocument>,
}

// ── Action schema ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditRfpInput {
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub issuer: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub code: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub summary: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub briefing: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub eligibility_criteria: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub evaluation_criteria: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub deadline: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RfpStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddProposalInput {
    pub id: String,
    pub title: String,
    pub author: Author,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProposalStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeProposalStatusInput {
    pub id: String,
    pub status: ProposalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveByIdInput {
    pub id: String,
}

/// Every operation a request-for-proposals document accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "input", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RfpAction {
    EditRfp(EditRfpInput),
    SetBudgetRange(BudgetRange),
    AddContextDocument(ContextDocument),
    RemoveContextDocument(RemoveByIdInput),
    AddProposal(AddProposalInput),
    ChangeProposalStatus(ChangeProposalStatusInput),
    RemoveProposal(RemoveByIdInput),
}

pub const OPERATIONS: &[&str] = &[
    "EDIT_RFP",
    "SET_BUDGET_RANGE",
    "ADD_CONTEXT_DOCUMENT",
    "REMOVE_CONTEXT_DOCUMENT",
    "ADD_PROPOSAL",
    "CHANGE_PROPOSAL_STATUS",
    "REMOVE_PROPOSAL",
];
