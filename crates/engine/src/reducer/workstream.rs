// Workstream reducer bank and the proposal-acceptance rule.
//
// Accepting a proposal rejects every other accepted proposal; afterwards the
// parent `sow`/`paymentTerms` are re-derived from the single accepted
// proposal (or cleared when there is none). The mirror is recomputed after
// every workstream action, so it can never drift from its source.

use docket_common::error::DomainError;
use docket_common::model::workstream::{
    self, ClientInfo, EditClientInfoInput, EditInitialProposalInput, PaymentRequestRef, Proposal,
    ProposalStatus, RfpReference, WorkstreamAction, WorkstreamState,
};
use docket_common::normalize::non_empty;
use docket_common::patch::Patch;
use docket_common::types::EmptyState;
use tracing::debug;

use crate::model::{DocumentModel, NoLocalAction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Workstream;

/// The proposal whose status was just written.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Initial,
    Alternative(String),
}

impl Target {
    fn is_alternative(&self, id: &str) -> bool {
        matches!(self, Self::Alternative(target) if target == id)
    }
}

impl DocumentModel for Workstream {
    const DOCUMENT_TYPE: &'static str = workstream::DOCUMENT_TYPE;

    type Global = WorkstreamState;
    type Local = EmptyState;
    type GlobalAction = WorkstreamAction;
    type LocalAction = NoLocalAction;

    fn reduce_global(
        state: &mut WorkstreamState,
        action: WorkstreamAction,
    ) -> Result<(), DomainError> {
        match action {
            WorkstreamAction::EditWorkstream(input) => {
                input.code.apply_text(&mut state.code);
                input.title.apply_text(&mut state.title);
                if let Some(status) = input.status {
                    state.status = status;
                }
            }
            WorkstreamAction::EditClientInfo(input) => edit_client_info(state, input)?,
            WorkstreamAction::SetRequestForProposal(input) => {
                state.rfp = Some(RfpReference { id: input.rfp_id, title: input.title });
            }
            WorkstreamAction::AddPaymentRequest(input) => {
                state.payment_requests.insert(PaymentRequestRef(input.payment_request_id))?;
            }
            WorkstreamAction::RemovePaymentRequest(input) => {
                state.payment_requests.remove(&input.payment_request_id);
            }
            WorkstreamAction::EditInitialProposal(input) => edit_initial_proposal(state, input)?,
            WorkstreamAction::AddAlternativeProposal(input) => {
                let status = input.status.unwrap_or_default();
                let target = Target::Alternative(input.id.clone());
                state.alternative_proposals.insert(Proposal {
                    id: input.id,
                    sow: non_empty(input.sow),
                    payment_terms: non_empty(input.payment_terms),
                    status,
                    author: input.author.normalized(),
                })?;
                if status == ProposalStatus::Accepted {
                    reject_other_accepted(state, &target);
                }
            }
            WorkstreamAction::EditAlternativeProposal(input) => {
                let target = Target::Alternative(input.id.clone());
                state.alternative_proposals.update(&input.id, |proposal| {
                    input.sow.apply_text(&mut proposal.sow);
                    input.payment_terms.apply_text(&mut proposal.payment_terms);
                    if let Some(author) = input.author {
                        proposal.author = author.normalized();
                    }
                    if let Some(status) = input.status {
                        proposal.status = status;
                    }
                })?;
                if input.status == Some(ProposalStatus::Accepted) {
                    reject_other_accepted(state, &target);
                }
            }
            WorkstreamAction::RemoveAlternativeProposal(input) => {
                state.alternative_proposals.remove(&input.id);
            }
        }
        sync_mirror(state);
        Ok(())
    }

    fn reduce_local(_state: &mut EmptyState, action: NoLocalAction) -> Result<(), DomainError> {
        match action {}
    }

    fn check_invariants(state: &WorkstreamState) -> Result<(), DomainError> {
        let accepted = state.accepted_count();
        if accepted > 1 {
            return Err(DomainError::invariant(format!(
                "{accepted} proposals are ACCEPTED; at most one may be"
            )));
        }
        let (sow, payment_terms) = mirrored_fields(state);
        if state.sow != sow || state.payment_terms != payment_terms {
            return Err(DomainError::invariant(
                "workstream sow/paymentTerms do not mirror the accepted proposal",
            ));
        }
        Ok(())
    }
}

fn edit_client_info(
    state: &mut WorkstreamState,
    input: EditClientInfoInput,
) -> Result<(), DomainError> {
    let EditClientInfoInput { client_id, name, icon } = input;
    match client_id.normalized() {
        Patch::Null => {
            state.client = None;
            return Ok(());
        }
        Patch::Value(id) => match state.client.as_mut() {
            Some(client) => client.id = id,
            None => state.client = Some(ClientInfo { id, name: None, icon: None }),
        },
        Patch::Omitted => {}
    }

    if name.is_omitted() && icon.is_omitted() {
        return Ok(());
    }
    let client = state.client.as_mut().ok_or_else(|| DomainError::not_found("client", ""))?;
    name.apply_text(&mut client.name);
    icon.apply_text(&mut client.icon);
    Ok(())
}

fn edit_initial_proposal(
    state: &mut WorkstreamState,
    input: EditInitialProposalInput,
) -> Result<(), DomainError> {
    let EditInitialProposalInput { id, sow, payment_terms, status, mut author } = input;

    if state.initial_proposal.is_none() {
        let id = non_empty(id).ok_or_else(|| DomainError::not_found("initial proposal", ""))?;
        let author = author.take().ok_or_else(|| {
            DomainError::validation("creating the initial proposal requires an author")
        })?;
        debug!(proposal_id = %id, "initial proposal created");
        state.initial_proposal = Some(Proposal {
            id,
            sow: None,
            payment_terms: None,
            status: ProposalStatus::default(),
            author: author.normalized(),
        });
    }

    if let Some(proposal) = state.initial_proposal.as_mut() {
        sow.apply_text(&mut proposal.sow);
        payment_terms.apply_text(&mut proposal.payment_terms);
        if let Some(author) = author {
            proposal.author = author.normalized();
        }
        if let Some(status) = status {
            proposal.status = status;
        }
    }
    if status == Some(ProposalStatus::Accepted) {
        reject_other_accepted(state, &Target::Initial);
    }
    Ok(())
}

/// Force every accepted proposal other than `target` to REJECTED.
fn reject_other_accepted(state: &mut WorkstreamState, target: &Target) {
    if *target != Target::Initial {
        if let Some(initial) = state.initial_proposal.as_mut().filter(|p| p.is_accepted()) {
            debug!(proposal_id = %initial.id, "initial proposal auto-rejected");
            initial.status = ProposalStatus::Rejected;
        }
    }
    state.alternative_proposals.modify_each(|proposal| {
        if proposal.is_accepted() && !target.is_alternative(&proposal.id) {
            debug!(proposal_id = %proposal.id, "alternative proposal auto-rejected");
            proposal.status = ProposalStatus::Rejected;
        }
    });
}

fn mirrored_fields(state: &WorkstreamState) -> (Option<String>, Option<String>) {
    match state.accepted_proposal() {
        Some(proposal) => {
            (non_empty(proposal.sow.clone()), non_empty(proposal.payment_terms.clone()))
        }
        None => (None, None),
    }
}

fn sync_mirror(state: &mut WorkstreamState) {
    let (sow, payment_terms) = mirrored_fields(state);
    state.sow = sow;
    state.payment_terms = payment_terms;
}

#[cfg(test)]
mod tests {
    use docket_common::error::{DomainError, ErrorCode};
    use docket_common::model::workstream::{ProposalStatus, WorkstreamState};
    use docket_common::protocol::Action;
    use serde_json::{json, Value};

    use super::Workstream;
    use crate::document::Document;
    use crate::model::DocumentModel;

    fn apply(doc: &Document<Workstream>, action_type: &str, input: Value) -> Document<Workstream> {
        doc.dispatch(&Action::new(action_type, input)).expect(action_type)
    }

    fn author() -> Value {
        json!({ "id": "did:alice", "name": "Alice" })
    }

    fn with_accepted_initial() -> Document<Workstream> {
        apply(
            &Document::new(),
            "EDIT_INITIAL_PROPOSAL",
            json!({
                "id": "init",
                "sow": "sow-init",
                "paymentTerms": "pt-init",
                "status": "ACCEPTED",
                "author": author()
            }),
        )
    }

    fn status_of(state: &WorkstreamState, id: &str) -> Option<ProposalStatus> {
        state.proposals().map(|(_, p)| p).find(|p| p.id == id).map(|p| p.status)
    }

    #[test]
    fn accepting_an_alternative_rejects_the_initial_proposal() {
        let doc = with_accepted_initial();
        assert_eq!(doc.global().sow.as_deref(), Some("sow-init"));

        let doc = apply(
            &doc,
            "ADD_ALTERNATIVE_PROPOSAL",
            json!({ "id": "p1", "sow": "sow-p1", "paymentTerms": "pt-p1", "author": author() }),
        );
        assert_eq!(status_of(doc.global(), "p1"), Some(ProposalStatus::Draft));

        let doc =
            apply(&doc, "EDIT_ALTERNATIVE_PROPOSAL", json!({ "id": "p1", "status": "ACCEPTED" }));
        let state = doc.global();
        assert_eq!(status_of(state, "init"), Some(ProposalStatus::Rejected));
        assert_eq!(status_of(state, "p1"), Some(ProposalStatus::Accepted));
        assert_eq!(state.sow.as_deref(), Some("sow-p1"));
        assert_eq!(state.payment_terms.as_deref(), Some("pt-p1"));
    }

    #[test]
    fn adding_an_accepted_alternative_runs_the_acceptance_rule() {
        let doc = with_accepted_initial();
        let doc = apply(
            &doc,
            "ADD_ALTERNATIVE_PROPOSAL",
            json!({ "id": "p2", "sow": "sow-p2", "status": "ACCEPTED", "author": author() }),
        );
        let state = doc.global();
        assert_eq!(state.accepted_count(), 1);
        assert_eq!(status_of(state, "init"), Some(ProposalStatus::Rejected));
        assert_eq!(state.sow.as_deref(), Some("sow-p2"));
        assert_eq!(state.payment_terms, None);
    }

    #[test]
    fn unaccepting_clears_the_mirror() {
        let doc = with_accepted_initial();
        let doc = apply(&doc, "EDIT_INITIAL_PROPOSAL", json!({ "status": "NEEDS_REVISION" }));
        assert_eq!(doc.global().sow, None);
        assert_eq!(doc.global().payment_terms, None);
    }

    #[test]
    fn editing_the_accepted_proposal_updates_the_mirror() {
        let doc = with_accepted_initial();
        let doc =
            apply(&doc, "EDIT_INITIAL_PROPOSAL", json!({ "sow": "sow-v2", "paymentTerms": "" }));
        assert_eq!(doc.global().sow.as_deref(), Some("sow-v2"));
        assert_eq!(doc.global().payment_terms, None);
    }

    #[test]
    fn removing_the_accepted_alternative_clears_the_mirror() {
        let doc = apply(
            &Document::new(),
            "ADD_ALTERNATIVE_PROPOSAL",
            json!({ "id": "p1", "sow": "s", "status": "ACCEPTED", "author": author() }),
        );
        assert_eq!(doc.global().sow.as_deref(), Some("s"));

        let doc = apply(&doc, "REMOVE_ALTERNATIVE_PROPOSAL", json!({ "id": "ghost" }));
        assert_eq!(doc.global().sow.as_deref(), Some("s"));

        let doc = apply(&doc, "REMOVE_ALTERNATIVE_PROPOSAL", json!({ "id": "p1" }));
        assert!(doc.global().alternative_proposals.is_empty());
        assert_eq!(doc.global().sow, None);
    }

    #[test]
    fn initial_proposal_creation_requirements() {
        let doc = Document::<Workstream>::new();
        let err = doc
            .dispatch(&Action::new("EDIT_INITIAL_PROPOSAL", json!({ "sow": "x" })))
            .expect_err("no id");
        assert_eq!(err, DomainError::not_found("initial proposal", ""));

        let err = doc
            .dispatch(&Action::new("EDIT_INITIAL_PROPOSAL", json!({ "id": "init" })))
            .expect_err("no author");
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let doc = apply(&doc, "EDIT_INITIAL_PROPOSAL", json!({ "id": "init", "author": author() }));
        let initial = doc.global().initial_proposal.as_ref().expect("created");
        assert_eq!(initial.status, ProposalStatus::Draft);
        assert_eq!(initial.author.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn alternative_proposal_errors() {
        let doc = apply(
            &Document::new(),
            "ADD_ALTERNATIVE_PROPOSAL",
            json!({ "id": "p1", "author": author() }),
        );
        let err = doc
            .dispatch(&Action::new(
                "ADD_ALTERNATIVE_PROPOSAL",
                json!({ "id": "p1", "author": author() }),
            ))
            .expect_err("duplicate");
        assert_eq!(err, DomainError::duplicate("alternative proposal", "p1"));

        let err = doc
            .dispatch(&Action::new(
                "EDIT_ALTERNATIVE_PROPOSAL",
                json!({ "id": "p9", "status": "ACCEPTED" }),
            ))
            .expect_err("missing");
        assert_eq!(err, DomainError::not_found("alternative proposal", "p9"));
    }

    #[test]
    fn client_info_lifecycle() {
        let doc = Document::<Workstream>::new();
        let err = doc
            .dispatch(&Action::new("EDIT_CLIENT_INFO", json!({ "name": "Acme" })))
            .expect_err("no client yet");
        assert_eq!(err.code(), ErrorCode::NotFound);

        let doc = apply(
            &doc,
            "EDIT_CLIENT_INFO",
            json!({ "clientId": "c1", "name": "Acme", "icon": "" }),
        );
        let client = doc.global().client.as_ref().expect("client");
        assert_eq!(client.id, "c1");
        assert_eq!(client.name.as_deref(), Some("Acme"));
        assert_eq!(client.icon, None);

        let doc = apply(&doc, "EDIT_CLIENT_INFO", json!({ "clientId": "c2" }));
        let client = doc.global().client.as_ref().expect("client");
        assert_eq!((client.id.as_str(), client.name.as_deref()), ("c2", Some("Acme")));

        let doc = apply(&doc, "EDIT_CLIENT_INFO", json!({ "clientId": "" }));
        assert_eq!(doc.global().client, None);
    }

    #[test]
    fn payment_requests_and_scalars() {
        let doc =
            apply(&Document::new(), "ADD_PAYMENT_REQUEST", json!({ "paymentRequestId": "pr1" }));
        let err = doc
            .dispatch(&Action::new("ADD_PAYMENT_REQUEST", json!({ "paymentRequestId": "pr1" })))
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::DuplicateId);

        let doc = apply(&doc, "REMOVE_PAYMENT_REQUEST", json!({ "paymentRequestId": "ghost" }));
        assert_eq!(doc.global().payment_requests.len(), 1);

        let doc = apply(
            &doc,
            "EDIT_WORKSTREAM",
            json!({ "title": "Indexer", "code": "", "status": "IN_PROGRESS" }),
        );
        let doc = apply(
            &doc,
            "SET_REQUEST_FOR_PROPOSAL",
            json!({ "rfpId": "rfp-1", "title": "Indexer RFP" }),
        );
        let encoded = serde_json::to_value(doc.global()).expect("encode");
        assert_eq!(encoded["title"], json!("Indexer"));
        assert_eq!(encoded["code"], Value::Null);
        assert_eq!(encoded["status"], json!("IN_PROGRESS"));
        assert_eq!(encoded["rfp"], json!({ "id": "rfp-1", "title": "Indexer RFP" }));
        assert_eq!(encoded["paymentRequests"], json!(["pr1"]));
    }

    #[test]
    fn invariant_check_flags_broken_states() {
        let mut state = with_accepted_initial().global().clone();
        assert!(Workstream::check_invariants(&state).is_ok());

        state.sow = Some("drifted".to_string());
        let err = Workstream::check_invariants(&state).expect_err("mirror drift");
        assert_eq!(err.code(), ErrorCode::InvariantViolation);
    }
}
