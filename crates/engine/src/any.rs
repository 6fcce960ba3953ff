// Dynamically-typed envelope over the closed set of document types.

use chrono::{DateTime, Utc};
use docket_common::error::DomainError;
use docket_common::model::DocumentKind;
use docket_common::protocol::{Action, Operation};
use docket_common::types::Scope;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::document::{Document, DocumentHeader, OperationLog};
use crate::error::EngineError;
use crate::history::{HistoryQuery, ReplayEngine, ReplayResult};
use crate::projection::Strand;
use crate::reducer::{NetworkProfile, PaymentTerms, RequestForProposals, Workstream};

/// A document of any known type, selected by `header.documentType`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyDocument {
    PaymentTerms(Document<PaymentTerms>),
    Workstream(Document<Workstream>),
    RequestForProposals(Document<RequestForProposals>),
    NetworkProfile(Document<NetworkProfile>),
}

macro_rules! with_document {
    ($value:expr, $doc:ident => $body:expr) => {
        match $value {
            AnyDocument::PaymentTerms($doc) => $body,
            AnyDocument::Workstream($doc) => $body,
            AnyDocument::RequestForProposals($doc) => $body,
            AnyDocument::NetworkProfile($doc) => $body,
        }
    };
}

macro_rules! map_document {
    ($value:expr, $doc:ident => $body:expr) => {
        match $value {
            AnyDocument::PaymentTerms($doc) => ($body).map(AnyDocument::PaymentTerms),
            AnyDocument::Workstream($doc) => ($body).map(AnyDocument::Workstream),
            AnyDocument::RequestForProposals($doc) => ($body).map(AnyDocument::RequestForProposals),
            AnyDocument::NetworkProfile($doc) => ($body).map(AnyDocument::NetworkProfile),
        }
    };
}

macro_rules! for_kind {
    ($kind:expr, $model:ident => $body:expr) => {
        match $kind {
            DocumentKind::PaymentTerms => {
                type $model = PaymentTerms;
                ($body).map(AnyDocument::PaymentTerms)
            }
            DocumentKind::Workstream => {
                type $model = Workstream;
                ($body).map(AnyDocument::Workstream)
            }
            DocumentKind::RequestForProposals => {
                type $model = RequestForProposals;
                ($body).map(AnyDocument::RequestForProposals)
            }
            DocumentKind::NetworkProfile => {
                type $model = NetworkProfile;
                ($body).map(AnyDocument::NetworkProfile)
            }
        }
    };
}

impl AnyDocument {
    pub fn create(kind: DocumentKind) -> Self {
        Self::create_with_id(kind, Uuid::new_v4(), Utc::now())
    }

    pub fn create_with_id(kind: DocumentKind, id: Uuid, created_at: DateTime<Utc>) -> Self {
        match kind {
            DocumentKind::PaymentTerms => Self::PaymentTerms(Document::with_id(id, created_at)),
            DocumentKind::Workstream => Self::Workstream(Document::with_id(id, created_at)),
            DocumentKind::RequestForProposals => {
                Self::RequestForProposals(Document::with_id(id, created_at))
            }
            DocumentKind::NetworkProfile => Self::NetworkProfile(Document::with_id(id, created_at)),
        }
    }

    /// Rebuild an empty-log envelope from a stored header and initial state.
    pub fn restore(header: &DocumentHeader, initial_state: Value) -> Result<Self, EngineError> {
        let kind = kind_of(&header.document_type)?;
        for_kind!(kind, M => serde_json::from_value(initial_state)
            .map(|initial| Document::<M>::with_initial_state(header.id, header.created_at, initial))
            .map_err(EngineError::from))
    }

    /// Decode an envelope, dispatching on `header.documentType`.
    pub fn from_value(value: Value) -> Result<Self, EngineError> {
        let document_type = value
            .pointer("/header/documentType")
            .and_then(Value::as_str)
            .ok_or_else(|| EngineError::UnknownDocumentType(String::new()))?;
        let kind = kind_of(document_type)?;
        for_kind!(kind, M => Document::<M>::from_value(value))
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::PaymentTerms(_) => DocumentKind::PaymentTerms,
            Self::Workstream(_) => DocumentKind::Workstream,
            Self::RequestForProposals(_) => DocumentKind::RequestForProposals,
            Self::NetworkProfile(_) => DocumentKind::NetworkProfile,
        }
    }

    pub fn header(&self) -> &DocumentHeader {
        with_document!(self, doc => doc.header())
    }

    pub fn id(&self) -> Uuid {
        self.header().id
    }

    pub fn operations(&self) -> &OperationLog {
        with_document!(self, doc => doc.operations())
    }

    /// `{global, local}` state as JSON.
    pub fn state_json(&self) -> Result<Value, EngineError> {
        Ok(with_document!(self, doc => serde_json::to_value(doc.state()))?)
    }

    pub fn initial_state_json(&self) -> Result<Value, EngineError> {
        Ok(with_document!(self, doc => serde_json::to_value(doc.initial_state()))?)
    }

    pub fn dispatch(&self, action: &Action) -> Result<Self, DomainError> {
        map_document!(self, doc => doc.dispatch(action))
    }

    pub fn apply_operation(
        &self,
        scope: Scope,
        operation: &Operation,
    ) -> Result<Self, EngineError> {
        map_document!(self, doc => doc.apply_operation(scope, operation))
    }

    /// Whether replaying the full log from the initial state reproduces the
    /// current state.
    pub fn verify(&self) -> Result<bool, EngineError> {
        Ok(with_document!(self, doc => doc.replayed_state().map(|state| &state == doc.state()))?)
    }

    pub fn revision(
        &self,
        engine: &ReplayEngine,
        query: HistoryQuery,
    ) -> Result<ReplayResult<Value>, EngineError> {
        with_document!(self, doc => {
            let result = engine.revision(doc, query)?;
            Ok(ReplayResult {
                state: serde_json::to_value(&result.state)?,
                applied_ops: result.applied_ops,
                capped: result.capped,
            })
        })
    }

    pub fn strand_since(&self, scope: Scope, from_index: u64) -> Strand {
        with_document!(self, doc => doc.strand_since(scope, from_index))
    }
}

impl<'de> Deserialize<'de> for AnyDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}

fn kind_of(document_type: &str) -> Result<DocumentKind, EngineError> {
    DocumentKind::ALL
        .into_iter()
        .find(|kind| kind.document_type() == document_type)
        .ok_or_else(|| EngineError::UnknownDocumentType(document_type.to_string()))
}

#[cfg(test)]
mod tests {
    use docket_common::model::DocumentKind;
    use docket_common::protocol::Action;
    use docket_common::types::Scope;
    use serde_json::json;

    use super::AnyDocument;
    use crate::error::EngineError;
    use crate::history::{HistoryQuery, ReplayEngine};

    #[test]
    fn every_kind_round_trips_through_json() {
        for kind in DocumentKind::ALL {
            let doc = AnyDocument::create(kind);
            let encoded = serde_json::to_value(&doc).expect("encode");
            assert_eq!(encoded["header"]["documentType"], json!(kind.document_type()));
            let decoded: AnyDocument = serde_json::from_value(encoded).expect("decode");
            assert_eq!(decoded, doc);
            assert_eq!(decoded.kind(), kind);
        }
    }

    #[test]
    fn unknown_document_type_is_rejected() {
        let mut encoded =
            serde_json::to_value(AnyDocument::create(DocumentKind::Workstream)).expect("encode");
        encoded["header"]["documentType"] = json!("docket/invoice");
        let err = AnyDocument::from_value(encoded).expect_err("unknown");
        assert!(matches!(err, EngineError::UnknownDocumentType(name) if name == "docket/invoice"));
    }

    #[test]
    fn dispatch_keeps_the_variant_and_verifies() {
        let doc = AnyDocument::create(DocumentKind::RequestForProposals)
            .dispatch(&Action::new("EDIT_RFP", json!({ "title": "Oracles" })))
            .and_then(|d| d.dispatch(&Action::new("EDIT_RFP", json!({ "code": "RFP-1" }))))
            .expect("dispatch");
        assert_eq!(doc.kind(), DocumentKind::RequestForProposals);
        assert_eq!(doc.header().revision.global, 2);
        assert!(doc.verify().expect("verify"));

        let state = doc.state_json().expect("state");
        assert_eq!(state["global"]["title"], json!("Oracles"));
        assert_eq!(state["local"], json!({}));

        let query = HistoryQuery::AtIndex { scope: Scope::Global, index: 0 };
        let past = doc.revision(&ReplayEngine::default(), query).expect("revision");
        assert_eq!(past.state["global"]["code"], serde_json::Value::Null);
        assert_eq!(past.applied_ops, 1);
    }

    #[test]
    fn restore_starts_from_the_stored_initial_state() {
        let doc = AnyDocument::create(DocumentKind::NetworkProfile);
        let initial = json!({ "global": { "name": "Seeded" }, "local": {} });
        let restored = AnyDocument::restore(doc.header(), initial).expect("restore");
        assert_eq!(restored.id(), doc.id());
        assert_eq!(restored.state_json().expect("state")["global"]["name"], json!("Seeded"));
        assert!(restored.operations().is_empty());
    }
}
