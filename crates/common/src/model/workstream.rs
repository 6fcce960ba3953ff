// Workstream: client, RFP link, initial and alternative proposals.
//
// At most one proposal (initial or alternative) may be ACCEPTED; the parent
// `sow`/`paymentTerms` mirror that proposal's references.

use serde::{Deserialize, Serialize};

use crate::collection::{IdList, Identified};
use crate::patch::Patch;
use crate::types::Author;

pub const DOCUMENT_TYPE: &str = "docket/workstream";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkstreamStatus {
    #[default]
    RfpDraft,
    OpenForProposals,
    ProposalSubmitted,
    NotAwarded,
    Awarded,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    #[default]
    Draft,
    Submitted,
    NeedsRevision,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    #[serde(default)]
    pub sow: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub status: ProposalStatus,
    pub author: Author,
}

impl Proposal {
    pub fn is_accepted(&self) -> bool {
        self.status == ProposalStatus::Accepted
    }
}

impl Identified for Proposal {
    const ENTITY: &'static str = "alternative proposal";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RfpReference {
    pub id: String,
    pub title: String,
}

/// Reference to a payment request document raised against this workstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PaymentRequestRef(pub String);

impl Identified for PaymentRequestRef {
    const ENTITY: &'static str = "payment request";

    fn id(&self) -> &str {
        &self.0
    }
}

/// Which proposal an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalTarget<'a> {
    Initial,
    Alternative(&'a str),
}

/// Global state of a workstream document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkstreamState {
    pub code: Option<String>,
    pub title: Option<String>,
    pub status: WorkstreamStatus,
    pub client: Option<ClientInfo>,
    pub rfp: Option<RfpReference>,
    pub initial_proposal: Option<Proposal>,
    pub alternative_proposals: IdList<Proposal>,
    /// Mirrored from the accepted proposal.
    pub sow: Option<String>,
    /// Mirrored from the accepted proposal.
    pub payment_terms: Option<String>,
    pub payment_requests: IdList<PaymentRequestRef>,
}

impl WorkstreamState {
    /// Every proposal, initial first.
    pub fn proposals(&self) -> impl Iterator<Item = (ProposalTarget<'_>, &Proposal)> {
        self.initial_proposal
            .iter()
            .map(|proposal| (ProposalTarget::Initial, proposal))
            .chain(
                self.alternative_proposals
                    .iter()
                    .map(|proposal| (ProposalTarget::Alternative(&proposal.id), proposal)),
            )
    }

    /// The accepted proposal, if any.
    pub fn accepted_proposal(&self) -> Option<&Proposal> {
        self.proposals().map(|(_, proposal)| proposal).find(|proposal| proposal.is_accepted())
    }

    pub fn accepted_count(&self) -> usize {
        self.proposals().filter(|(_, proposal)| proposal.is_accepted()).count()
    }
}

// ── Action schema ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditWorkstreamInput {
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub code: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub title: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkstreamStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditClientInfoInput {
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub client_id: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub name: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub icon: Patch<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetRequestForProposalInput {
    pub rfp_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestInput {
    pub payment_request_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditInitialProposalInput {
    /// Required only when no initial proposal exists yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub sow: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub payment_terms: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProposalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddAlternativeProposalInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProposalStatus>,
    pub author: Author,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditAlternativeProposalInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub sow: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_omitted")]
    pub payment_terms: Patch<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProposalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoveAlternativeProposalInput {
    pub id: String,
}

/// Every operation a workstream document accepts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "input", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkstreamAction {
    EditWorkstream(EditWorkstreamInput),
    EditClientInfo(EditClientInfoInput),
    SetRequestForProposal(SetRequestForProposalInput),
    AddPaymentRequest(PaymentRequestInput),
    RemovePaymentRequest(PaymentRequestInput),
    EditInitialProposal(EditInitialProposalInput),
    AddAlternativeProposal(AddAlternativeProposalInput),
    EditAlternativeProposal(EditAlternativeProposalInput),
    RemoveAlternativeProposal(RemoveAlternativeProposalInput),
}

pub const OPERATIONS: &[&str] = &[
    "EDIT_WORKSTREAM",
    "EDIT_CLIENT_INFO",
    "SET_REQUEST_FOR_PROPOSAL",
    "ADD_PAYMENT_REQUEST",
    "REMOVE_PAYMENT_REQUEST",
    "EDIT_INITIAL_PROPOSAL",
    "ADD_ALTERNATIVE_PROPOSAL",
    "EDIT_ALTERNATIVE_PROPOSAL",
    "REMOVE_ALTERNATIVE_PROPOSAL",
];
