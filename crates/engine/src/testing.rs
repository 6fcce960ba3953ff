// Test-only document model with both global and local operations.

use chrono::{DateTime, Duration, TimeZone, Utc};
use docket_common::error::DomainError;
use serde::{Deserialize, Serialize};

use crate::model::DocumentModel;

/// Fixed timestamps: `t(n)` is `n` seconds after 2026-01-01T00:00:00Z.
pub(crate) fn t(seconds: i64) -> DateTime<Utc> {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().expect("valid base time");
    base + Duration::seconds(seconds)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Counter;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct CounterState {
    pub total: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct CursorState {
    pub position: i64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "input", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum CounterAction {
    Add { amount: i64 },
    Fail {},
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "input", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum CursorAction {
    MoveCursor { position: i64 },
}

impl DocumentModel for Counter {
    const DOCUMENT_TYPE: &'static str = "docket/test-counter";

    type Global = CounterState;
    type Local = CursorState;
    type GlobalAction = CounterAction;
    type LocalAction = CursorAction;

    fn reduce_global(state: &mut CounterState, action: CounterAction) -> Result<(), DomainError> {
        match action {
            CounterAction::Add { amount } => {
                state.total += amount;
                Ok(())
            }
            CounterAction::Fail {} => {
                state.total = i64::MIN;
                Err(DomainError::invariant("counter refused"))
            }
        }
    }

    fn reduce_local(state: &mut CursorState, action: CursorAction) -> Result<(), DomainError> {
        match action {
            CursorAction::MoveCursor { position } => state.position = position,
        }
        Ok(())
    }
}
