// Projection feed: strands of applied operations for downstream read models.
//
// Delivery is at-least-once. `ProjectionCursor` remembers the next expected
// index per (document, scope), drops operations it has already seen, and
// refuses strands that would skip an index. The cursor only moves past an
// operation once the projection has applied it.

use std::collections::HashMap;

use docket_common::protocol::Operation;
use docket_common::types::Scope;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info_span, warn};
use uuid::Uuid;

use crate::error::EngineError;

mod workstream_index;

pub use workstream_index::{WorkstreamIndex, WorkstreamRow};

/// An ordered batch of operations for one document and scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Strand {
    pub document_id: Uuid,
    pub document_type: String,
    pub scope: Scope,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectionCursor {
    next: HashMap<(Uuid, Scope), u64>,
}

impl ProjectionCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_index(&self, document_id: Uuid, scope: Scope) -> u64 {
        self.next.get(&(document_id, scope)).copied().unwrap_or(0)
    }

    /// Operations of `strand` not seen before, in index order. Leaves the
    /// cursor untouched; call [`ProjectionCursor::advance`] per applied
    /// operation.
    pub fn admit<'a>(&self, strand: &'a Strand) -> Result<Vec<&'a Operation>, EngineError> {
        let mut expected = self.next_index(strand.document_id, strand.scope);

        let mut operations = strand.operations.iter().collect::<Vec<_>>();
        operations.sort_by_key(|operation| operation.index);

        let mut fresh = Vec::with_capacity(operations.len());
        for operation in operations {
            if operation.index < expected {
                continue;
            }
            if operation.index > expected {
                return Err(EngineError::OutOfOrder {
                    scope: strand.scope,
                    expected,
                    actual: operation.index,
                });
            }
            fresh.push(operation);
            expected += 1;
        }
        Ok(fresh)
    }

    /// Mark `index` of (`document_id`, `scope`) as applied.
    pub fn advance(&mut self, document_id: Uuid, scope: Scope, index: u64) {
        let next = self.next.entry((document_id, scope)).or_default();
        *next = (*next).max(index + 1);
    }
}

/// A read model updated incrementally from operation type and input alone.
pub trait Projection {
    fn name(&self) -> &str;

    fn handles(&self, document_type: &str, scope: Scope) -> bool;

    fn apply(&mut self, document_id: Uuid, operation: &Operation) -> Result<(), EngineError>;
}

/// Feeds strands into one projection through a deduplicating cursor.
#[derive(Debug)]
pub struct ProjectionRunner<P> {
    projection: P,
    cursor: ProjectionCursor,
}

impl<P: Projection> ProjectionRunner<P> {
    pub fn new(projection: P) -> Self {
        Self { projection, cursor: ProjectionCursor::new() }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn into_projection(self) -> P {
        self.projection
    }

    /// Apply the unseen part of `strand`; returns how many operations were applied.
    pub fn process(&mut self, strand: &Strand) -> Result<usize, EngineError> {
        if !self.projection.handles(&strand.document_type, strand.scope) {
            return Ok(0);
        }
        let span = info_span!(
            "engine.projection",
            projection = self.projection.name(),
            document_id = %strand.document_id,
            scope = %strand.scope
        );
        let _entered = span.enter();

        let fresh = self.cursor.admit(strand)?;
        let applied = fresh.len();
        for operation in fresh {
            self.projection.apply(strand.document_id, operation)?;
            self.cursor.advance(strand.document_id, strand.scope, operation.index);
        }
        debug!(applied, skipped = strand.operations.len() - applied, "strand processed");
        Ok(applied)
    }

    /// Consume strands until the channel closes. Lagged receivers log and
    /// keep going; the gap surfaces as `OutOfOrder` on the next strand of
    /// the affected document.
    pub async fn run(mut self, mut strands: broadcast::Receiver<Strand>) -> P {
        loop {
            match strands.recv().await {
                Ok(strand) => {
                    if let Err(error) = self.process(&strand) {
                        warn!(
                            projection = self.projection.name(),
                            document_id = %strand.document_id,
                            %error,
                            "strand rejected"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(projection = self.projection.name(), missed, "projection lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        self.projection
    }
}
