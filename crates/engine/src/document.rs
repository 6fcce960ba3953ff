// Document envelope: header, initial state, current state, and the
// scope-partitioned operation log.
//
// Envelopes are values: `dispatch` and `apply_operation` return a new
// envelope and never touch the receiver, so readers can hold a stale
// snapshot while a newer one is computed.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use docket_common::error::DomainError;
use docket_common::protocol::{Action, Operation};
use docket_common::types::Scope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, debug_span};
use uuid::Uuid;

use crate::error::EngineError;
use crate::history;
use crate::model::{decode_action, DocumentModel};
use crate::projection::Strand;

/// Number of operations applied per scope.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Revision {
    pub global: u64,
    pub local: u64,
}

impl Revision {
    pub const fn get(self, scope: Scope) -> u64 {
        match scope {
            Scope::Global => self.global,
            Scope::Local => self.local,
        }
    }

    fn bumped(self, scope: Scope) -> Self {
        match scope {
            Scope::Global => Self { global: self.global + 1, ..self },
            Scope::Local => Self { local: self.local + 1, ..self },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeader {
    pub id: Uuid,
    pub document_type: String,
    pub revision: Revision,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentState<G, L> {
    pub global: G,
    pub local: L,
}

/// Append-only, scope-partitioned operation log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OperationLog {
    #[serde(default)]
    pub global: Vec<Operation>,
    #[serde(default)]
    pub local: Vec<Operation>,
}

impl OperationLog {
    pub fn scope(&self, scope: Scope) -> &[Operation] {
        match scope {
            Scope::Global => &self.global,
            Scope::Local => &self.local,
        }
    }

    /// `max(index) + 1` within the scope, or 0 for an empty scope.
    pub fn next_index(&self, scope: Scope) -> u64 {
        self.scope(scope).iter().map(|operation| operation.index).max().map_or(0, |max| max + 1)
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.local.is_empty()
    }

    /// Return a new log with one more entry in `scope`; `self` is left as is.
    pub fn append(
        &self,
        scope: Scope,
        action_type: impl Into<String>,
        input: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let operation = Operation {
            index: self.next_index(scope),
            action_type: action_type.into(),
            input,
            timestamp,
        };
        self.appended(scope, operation)
    }

    fn appended(&self, scope: Scope, operation: Operation) -> Self {
        let mut next = self.clone();
        match scope {
            Scope::Global => next.global.push(operation),
            Scope::Local => next.local.push(operation),
        }
        next
    }
}

/// The envelope of one document instance of model `M`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(serialize = "", deserialize = ""))]
pub struct Document<M: DocumentModel> {
    header: DocumentHeader,
    initial_state: DocumentState<M::Global, M::Local>,
    state: DocumentState<M::Global, M::Local>,
    operations: OperationLog,
    #[serde(skip)]
    model: PhantomData<M>,
}

impl<M: DocumentModel> Default for Document<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: DocumentModel> Document<M> {
    /// A fresh document with a random ID and default initial state.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4(), Utc::now())
    }

    pub fn with_id(id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self::with_initial_state(id, created_at, DocumentState::default())
    }

    pub fn with_initial_state(
        id: Uuid,
        created_at: DateTime<Utc>,
        initial_state: DocumentState<M::Global, M::Local>,
    ) -> Self {
        Self {
            header: DocumentHeader {
                id,
                document_type: M::DOCUMENT_TYPE.to_string(),
                revision: Revision::default(),
                created_at,
                last_modified: created_at,
            },
            state: initial_state.clone(),
            initial_state,
            operations: OperationLog::default(),
            model: PhantomData,
        }
    }

    /// Decode an envelope, checking that it belongs to this document type.
    pub fn from_value(value: Value) -> Result<Self, EngineError> {
        let document: Self = serde_json::from_value(value)?;
        if document.header.document_type != M::DOCUMENT_TYPE {
            return Err(EngineError::DocumentTypeMismatch {
                expected: M::DOCUMENT_TYPE.to_string(),
                found: document.header.document_type,
            });
        }
        Ok(document)
    }

    pub fn id(&self) -> Uuid {
        self.header.id
    }

    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    pub fn state(&self) -> &DocumentState<M::Global, M::Local> {
        &self.state
    }

    pub fn global(&self) -> &M::Global {
        &self.state.global
    }

    pub fn local(&self) -> &M::Local {
        &self.state.local
    }

    pub fn initial_state(&self) -> &DocumentState<M::Global, M::Local> {
        &self.initial_state
    }

    pub fn operations(&self) -> &OperationLog {
        &self.operations
    }

    /// Reduce `action` and append it to the log, returning the new envelope.
    ///
    /// On error nothing is appended and `self` is unchanged.
    pub fn dispatch(&self, action: &Action) -> Result<Self, DomainError> {
        let span = debug_span!(
            "engine.dispatch",
            document_id = %self.header.id,
            document_type = M::DOCUMENT_TYPE,
            scope = %action.scope,
            action_type = %action.action_type
        );
        let _entered = span.enter();

        let state = reduce::<M>(&self.state, action.scope, &action.action_type, &action.input)
            .inspect_err(|error| debug!(error = %error, "action rejected"))?;
        let timestamp = action.timestamp.unwrap_or_else(Utc::now);
        let operations = self.operations.append(
            action.scope,
            action.action_type.clone(),
            action.input.clone(),
            timestamp,
        );
        debug!(index = self.operations.next_index(action.scope), "operation appended");

        Ok(self.advance(action.scope, state, operations, timestamp))
    }

    /// Apply an operation that was already sequenced elsewhere (a replica
    /// catching up). Its index must be the next index for `scope`.
    pub fn apply_operation(
        &self,
        scope: Scope,
        operation: &Operation,
    ) -> Result<Self, EngineError> {
        let expected = self.operations.next_index(scope);
        if operation.index != expected {
            return Err(EngineError::OutOfOrder { scope, expected, actual: operation.index });
        }

        let state = reduce::<M>(&self.state, scope, &operation.action_type, &operation.input)?;
        let operations = self.operations.appended(scope, operation.clone());
        Ok(self.advance(scope, state, operations, operation.timestamp))
    }

    /// Rebuild state by replaying the full log over the initial state.
    pub fn replayed_state(&self) -> Result<DocumentState<M::Global, M::Local>, DomainError> {
        history::replay::<M>(&self.initial_state, &self.operations)
    }

    /// Operations of `scope` with index `>= from_index`, packaged for projections.
    pub fn strand_since(&self, scope: Scope, from_index: u64) -> Strand {
        Strand {
            document_id: self.header.id,
            document_type: self.header.document_type.clone(),
            scope,
            operations: self
                .operations
                .scope(scope)
                .iter()
                .filter(|operation| operation.index >= from_index)
                .cloned()
                .collect(),
        }
    }

    fn advance(
        &self,
        scope: Scope,
        state: DocumentState<M::Global, M::Local>,
        operations: OperationLog,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            header: DocumentHeader {
                revision: self.header.revision.bumped(scope),
                last_modified: timestamp.max(self.header.last_modified),
                ..self.header.clone()
            },
            initial_state: self.initial_state.clone(),
            state,
            operations,
            model: PhantomData,
        }
    }
}

/// Reduce one action against a copy of `state`. The copy is discarded on
/// error, so no partial write is ever observable.
pub(crate) fn reduce<M: DocumentModel>(
    state: &DocumentState<M::Global, M::Local>,
    scope: Scope,
    action_type: &str,
    input: &Value,
) -> Result<DocumentState<M::Global, M::Local>, DomainError> {
    match scope {
        Scope::Global => {
            let action =
                decode_action::<M::GlobalAction>(M::DOCUMENT_TYPE, scope, action_type, input)?;
            let mut global = state.global.clone();
            M::reduce_global(&mut global, action)?;
            M::check_invariants(&global)?;
            Ok(DocumentState { global, local: state.local.clone() })
        }
        Scope::Local => {
            let action =
                decode_action::<M::LocalAction>(M::DOCUMENT_TYPE, scope, action_type, input)?;
            let mut local = state.local.clone();
            M::reduce_local(&mut local, action)?;
            Ok(DocumentState { global: state.global.clone(), local })
        }
    }
}
