// docket-engine: operation-log reducer core.
//
// Actions are folded into document state by pure per-document reducers; every
// applied action is appended to a scope-partitioned operation log that can be
// replayed to reproduce state at any revision.

pub mod any;
pub mod config;
pub mod document;
pub mod error;
pub mod history;
pub mod model;
pub mod projection;
pub mod reducer;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use any::AnyDocument;
pub use config::EngineConfig;
pub use document::{Document, DocumentHeader, DocumentState, OperationLog, Revision};
pub use error::EngineError;
pub use model::DocumentModel;
pub use store::DocumentStore;
