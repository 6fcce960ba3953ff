// The contract every document type implements.

use std::fmt;

use docket_common::error::DomainError;
use docket_common::types::Scope;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A document type: its state shapes, its typed actions, and the pure
/// reducers folding those actions into state.
///
/// Scopes are independent: global actions only touch global state and local
/// actions only touch local state, so each scope's log replays on its own.
pub trait DocumentModel:
    fmt::Debug + Clone + Copy + Default + PartialEq + Send + Sync + 'static
{
    const DOCUMENT_TYPE: &'static str;

    type Global: fmt::Debug
        + Clone
        + Default
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync;
    type Local: fmt::Debug
        + Clone
        + Default
        + PartialEq
        + Serialize
        + DeserializeOwned
        + Send
        + Sync;
    type GlobalAction: DeserializeOwned;
    type LocalAction: DeserializeOwned;

    fn reduce_global(
        state: &mut Self::Global,
        action: Self::GlobalAction,
    ) -> Result<(), DomainError>;

    fn reduce_local(state: &mut Self::Local, action: Self::LocalAction)
        -> Result<(), DomainError>;

    /// Cross-field invariants checked after every global reduction.
    fn check_invariants(_state: &Self::Global) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Local action type for documents that define no local operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoLocalAction {}

impl<'de> Deserialize<'de> for NoLocalAction {
    fn deserialize<D>(_deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Err(de::Error::custom("document defines no local operations"))
    }
}

/// Decode `{type, input}` into a typed action. Unknown operation names and
/// malformed input both surface as `ValidationError`.
pub fn decode_action<A>(
    document_type: &str,
    scope: Scope,
    action_type: &str,
    input: &Value,
) -> Result<A, DomainError>
where
    A: DeserializeOwned,
{
    serde_json::from_value(json!({ "type": action_type, "input": input })).map_err(|error| {
        DomainError::validation(format!(
            "{document_type} rejected {scope} operation {action_type}: {error}"
        ))
    })
}
