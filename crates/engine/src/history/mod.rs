use chrono::{DateTime, Utc};
use docket_common::error::DomainError;
use docket_common::protocol::Operation;
use docket_common::types::Scope;
use serde::{Deserialize, Serialize};
use tracing::debug_span;

use crate::document::{reduce, Document, DocumentState, OperationLog};
use crate::model::DocumentModel;

pub const DEFAULT_MAX_REPLAY_OPS: usize = 10_000;

/// Fold the full log over `initial`. Scopes replay independently, each in
/// index order.
pub fn replay<M: DocumentModel>(
    initial: &DocumentState<M::Global, M::Local>,
    log: &OperationLog,
) -> Result<DocumentState<M::Global, M::Local>, DomainError> {
    let mut state = initial.clone();
    for scope in Scope::ALL {
        state = replay_scope::<M>(state, scope, &sorted(log.scope(scope).iter()))?;
    }
    Ok(state)
}

fn replay_scope<M: DocumentModel>(
    mut state: DocumentState<M::Global, M::Local>,
    scope: Scope,
    operations: &[&Operation],
) -> Result<DocumentState<M::Global, M::Local>, DomainError> {
    for operation in operations {
        state = reduce::<M>(&state, scope, &operation.action_type, &operation.input)?;
    }
    Ok(state)
}

fn sorted<'a>(operations: impl Iterator<Item = &'a Operation>) -> Vec<&'a Operation> {
    let mut operations = operations.collect::<Vec<_>>();
    operations.sort_by_key(|operation| operation.index);
    operations
}

/// Which revision to reconstruct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum HistoryQuery {
    /// Indices `0..=index` of `scope`; the other scope replays in full.
    AtIndex { scope: Scope, index: u64 },
    /// Per scope, the longest index-ordered prefix stamped at or before
    /// the instant. A later operation stamped earlier is not included.
    AtTime { at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayResult<S> {
    pub state: S,
    pub applied_ops: usize,
    pub capped: bool,
}

/// Reconstructs past revisions without touching the live envelope.
#[derive(Debug, Clone, Copy)]
pub struct ReplayEngine {
    max_ops: usize,
}

impl ReplayEngine {
    pub fn new(max_ops: usize) -> Self {
        Self { max_ops }
    }

    pub fn max_ops(&self) -> usize {
        self.max_ops
    }

    pub fn revision<M: DocumentModel>(
        &self,
        document: &Document<M>,
        query: HistoryQuery,
    ) -> Result<ReplayResult<DocumentState<M::Global, M::Local>>, DomainError> {
        let span = debug_span!("engine.replay", document_id = %document.id(), ?query);
        let _entered = span.enter();

        let log = document.operations();
        let selected = Scope::ALL.map(|scope| {
            let operations = sorted(log.scope(scope).iter())
                .into_iter()
                .take_while(|operation| match query {
                    HistoryQuery::AtIndex { scope: target, index } => {
                        scope != target || operation.index <= index
                    }
                    HistoryQuery::AtTime { at } => operation.timestamp <= at,
                })
                .collect::<Vec<_>>();
            (scope, operations)
        });

        let total = selected.iter().map(|(_, operations)| operations.len()).sum::<usize>();
        let mut budget = self.max_ops;
        let mut state = document.initial_state().clone();
        for (scope, operations) in selected {
            let take = operations.len().min(budget);
            budget -= take;
            state = replay_scope::<M>(state, scope, &operations[..take])?;
        }

        Ok(ReplayResult {
            state,
            applied_ops: total.min(self.max_ops),
            capped: total > self.max_ops,
        })
    }
}

impl Default for ReplayEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REPLAY_OPS)
    }
}

#[cfg(test)]
mod tests {
    use docket_common::protocol::Action;
    use docket_common::types::Scope;
    use serde_json::json;

    use super::{replay, HistoryQuery, ReplayEngine};
    use crate::document::Document;
    use crate::testing::{t, Counter};

    fn counter_with_history() -> Document<Counter> {
        let mut doc = Document::<Counter>::with_id(uuid::Uuid::new_v4(), t(0));
        for (second, amount) in [(10, 1), (20, 10), (30, 100)] {
            doc = doc
                .dispatch(&Action::new("ADD", json!({ "amount": amount })).at(t(second)))
                .expect("add");
        }
        doc.dispatch(&Action::local("MOVE_CURSOR", json!({ "position": 4 })).at(t(25)))
            .expect("move cursor")
    }

    #[test]
    fn full_replay_reproduces_current_state() {
        let doc = counter_with_history();
        let state = replay::<Counter>(doc.initial_state(), doc.operations()).expect("replay");
        assert_eq!(&state, doc.state());
    }

    #[test]
    fn at_index_replays_prefix_of_one_scope_only() {
        let doc = counter_with_history();
        let result = ReplayEngine::default()
            .revision(&doc, HistoryQuery::AtIndex { scope: Scope::Global, index: 1 })
            .expect("revision");

        assert_eq!(result.state.global.total, 11);
        assert_eq!(result.state.local.position, 4);
        assert_eq!(result.applied_ops, 3);
        assert!(!result.capped);
        assert_eq!(doc.global().total, 111);
    }

    #[test]
    fn at_time_filters_both_scopes() {
        let doc = counter_with_history();
        let engine = ReplayEngine::default();

        let before_cursor = engine.revision(&doc, HistoryQuery::AtTime { at: t(20) }).expect("t20");
        assert_eq!(before_cursor.state.global.total, 11);
        assert_eq!(before_cursor.state.local.position, 0);

        let after_cursor = engine.revision(&doc, HistoryQuery::AtTime { at: t(25) }).expect("t25");
        assert_eq!(after_cursor.state.local.position, 4);

        let before_anything = engine.revision(&doc, HistoryQuery::AtTime { at: t(0) }).expect("t0");
        assert_eq!(&before_anything.state, doc.initial_state());
        assert_eq!(before_anything.applied_ops, 0);
    }

    #[test]
    fn at_time_stops_at_the_first_later_operation() {
        // Index 1 carries an earlier stamp than index 0.
        let doc = Document::<Counter>::with_id(uuid::Uuid::new_v4(), t(0))
            .dispatch(&Action::new("ADD", json!({ "amount": 1 })).at(t(30)))
            .and_then(|d| d.dispatch(&Action::new("ADD", json!({ "amount": 10 })).at(t(10))))
            .and_then(|d| d.dispatch(&Action::new("ADD", json!({ "amount": 100 })).at(t(40))))
            .expect("dispatch");
        let engine = ReplayEngine::default();

        let early = engine.revision(&doc, HistoryQuery::AtTime { at: t(20) }).expect("t20");
        assert_eq!(&early.state, doc.initial_state());
        assert_eq!(early.applied_ops, 0);

        let middle = engine.revision(&doc, HistoryQuery::AtTime { at: t(35) }).expect("t35");
        assert_eq!(middle.state.global.total, 11);
        assert_eq!(middle.applied_ops, 2);
    }

    #[test]
    fn replay_is_capped() {
        let doc = counter_with_history();
        let query = HistoryQuery::AtTime { at: t(100) };
        let result = ReplayEngine::new(2).revision(&doc, query).expect("capped");
        assert!(result.capped);
        assert_eq!(result.applied_ops, 2);
        assert_eq!(result.state.global.total, 11);
    }
}
