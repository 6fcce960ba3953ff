// In-process document store.
//
// Holds the latest envelope of every open document, serializes dispatch per
// store, journals each applied operation when a data directory is configured,
// and broadcasts one-operation strands to projection subscribers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use docket_common::model::DocumentKind;
use docket_common::protocol::Action;
use docket_common::types::Scope;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::any::AnyDocument;
use crate::config::EngineConfig;
use crate::document::{DocumentHeader, Revision};
use crate::error::EngineError;
use crate::history::{HistoryQuery, ReplayEngine, ReplayResult};
use crate::projection::Strand;

pub mod journal;

pub use journal::{journal_paths, Journal, JournalRecord, JournalReplaySummary};

pub struct DocumentStore {
    documents: RwLock<HashMap<Uuid, Arc<AnyDocument>>>,
    journal_dir: Option<PathBuf>,
    replay: ReplayEngine,
    strands: broadcast::Sender<Strand>,
}

impl DocumentStore {
    /// Empty store; journals go to `config.data_dir` when set.
    pub fn new(config: &EngineConfig) -> Self {
        let (strands, _) = broadcast::channel(config.projection.strand_capacity.max(1));
        Self {
            documents: RwLock::new(HashMap::new()),
            journal_dir: config.data_dir.clone(),
            replay: ReplayEngine::new(config.history.max_replay_ops),
            strands,
        }
    }

    /// Store with every journal under `config.data_dir` reloaded.
    pub fn open(config: &EngineConfig) -> Result<Self, EngineError> {
        let store = Self::new(config);
        let Some(dir) = config.data_dir.as_ref() else {
            return Ok(store);
        };

        let mut documents = HashMap::new();
        for path in journal_paths(dir)? {
            let Some((document, summary)) = Journal::open(&path)?.load()? else {
                warn!(path = %path.display(), "empty journal skipped");
                continue;
            };
            if summary.truncated {
                warn!(
                    path = %path.display(),
                    records = summary.records,
                    checksum_failed = summary.checksum_failed,
                    "journal tail discarded"
                );
            }
            documents.insert(document.id(), Arc::new(document));
        }
        info!(dir = %dir.display(), documents = documents.len(), "document store opened");

        Ok(Self { documents: RwLock::new(documents), ..store })
    }

    pub async fn create(&self, kind: DocumentKind) -> Result<Arc<AnyDocument>, EngineError> {
        self.insert(AnyDocument::create(kind)).await
    }

    /// Add an existing document, journaling its initial state and full log.
    pub async fn insert(&self, document: AnyDocument) -> Result<Arc<AnyDocument>, EngineError> {
        let mut documents = self.documents.write().await;
        let id = document.id();
        if documents.contains_key(&id) {
            return Err(EngineError::DocumentExists(id));
        }

        if let Some(journal) = self.journal(id)? {
            journal.append(&JournalRecord::Created {
                header: initial_header(&document),
                initial_state: document.initial_state_json()?,
            })?;
            let log = document.operations();
            for scope in Scope::ALL {
                for operation in log.scope(scope) {
                    let record = JournalRecord::Applied { scope, operation: operation.clone() };
                    journal.append(&record)?;
                }
            }
        }

        let document = Arc::new(document);
        documents.insert(id, Arc::clone(&document));
        debug!(
            document_id = %id,
            document_type = %document.header().document_type,
            "document added"
        );
        Ok(document)
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<AnyDocument>, EngineError> {
        self.documents.read().await.get(&id).cloned().ok_or(EngineError::DocumentNotFound(id))
    }

    /// IDs of all open documents, sorted.
    pub async fn ids(&self) -> Vec<Uuid> {
        let mut ids = self.documents.read().await.keys().copied().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    /// Reduce `action` against document `id`. A rejected action leaves the
    /// stored envelope, the journal, and subscribers untouched.
    pub async fn dispatch(
        &self,
        id: Uuid,
        action: &Action,
    ) -> Result<Arc<AnyDocument>, EngineError> {
        let span = info_span!(
            "engine.store.dispatch",
            document_id = %id,
            scope = %action.scope,
            action_type = %action.action_type
        );
        async {
            let mut documents = self.documents.write().await;
            let current = documents.get(&id).ok_or(EngineError::DocumentNotFound(id))?;
            let next = current.dispatch(action)?;

            let from_index = current.operations().next_index(action.scope);
            let strand = next.strand_since(action.scope, from_index);
            if let Some(journal) = self.journal(id)? {
                for operation in &strand.operations {
                    journal.append(&JournalRecord::Applied {
                        scope: action.scope,
                        operation: operation.clone(),
                    })?;
                }
            }

            let next = Arc::new(next);
            documents.insert(id, Arc::clone(&next));
            drop(documents);

            // No subscribers is not an error.
            let receivers = self.strands.send(strand).unwrap_or(0);
            debug!(revision = ?next.header().revision, receivers, "action applied");
            Ok(next)
        }
        .instrument(span)
        .await
    }

    pub async fn revision(
        &self,
        id: Uuid,
        query: HistoryQuery,
    ) -> Result<ReplayResult<Value>, EngineError> {
        self.get(id).await?.revision(&self.replay, query)
    }

    /// Strands of every operation applied after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Strand> {
        self.strands.subscribe()
    }

    fn journal(&self, id: Uuid) -> Result<Option<Journal>, EngineError> {
        Ok(match &self.journal_dir {
            Some(dir) => Some(Journal::for_document(dir, id)?),
            None => None,
        })
    }
}

/// Header as it was before any operation, which is what `Created` records.
fn initial_header(document: &AnyDocument) -> DocumentHeader {
    let mut header = document.header().clone();
    header.revision = Revision::default();
    header.last_modified = header.created_at;
    header
}

#[cfg(test)]
mod tests {
    use docket_common::model::DocumentKind;
    use docket_common::protocol::Action;
    use docket_common::types::Scope;
    use serde_json::json;
    use tempfile::tempdir;

    use super::DocumentStore;
    use crate::config::EngineConfig;
    use crate::error::EngineError;
    use crate::history::HistoryQuery;

    fn persistent(dir: &std::path::Path) -> EngineConfig {
        EngineConfig { data_dir: Some(dir.to_path_buf()), ..EngineConfig::default() }
    }

    #[tokio::test]
    async fn rejected_actions_leave_the_store_untouched() {
        let store = DocumentStore::new(&EngineConfig::default());
        let doc = store.create(DocumentKind::PaymentTerms).await.expect("create");
        let mut strands = store.subscribe();

        let err = store
            .dispatch(doc.id(), &Action::new("DELETE_MILESTONE", json!({})))
            .await
            .expect_err("missing id");
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert_eq!(store.get(doc.id()).await.expect("get").operations().len(), 0);
        assert!(strands.try_recv().is_err());
    }

    #[tokio::test]
    async fn dispatch_broadcasts_the_new_operation() {
        let store = DocumentStore::new(&EngineConfig::default());
        let doc = store.create(DocumentKind::NetworkProfile).await.expect("create");
        let mut strands = store.subscribe();

        store
            .dispatch(doc.id(), &Action::new("SET_PROFILE_NAME", json!({ "name": "Powerhouse" })))
            .await
            .expect("dispatch");

        let strand = strands.recv().await.expect("strand");
        assert_eq!(strand.document_id, doc.id());
        assert_eq!(strand.scope, Scope::Global);
        assert_eq!(strand.operations.len(), 1);
        assert_eq!(strand.operations[0].index, 0);
    }

    #[tokio::test]
    async fn unknown_and_duplicate_documents() {
        let store = DocumentStore::new(&EngineConfig::default());
        let missing = uuid::Uuid::new_v4();
        let err = store.get(missing).await.expect_err("missing");
        assert!(matches!(err, EngineError::DocumentNotFound(id) if id == missing));

        let doc = store.create(DocumentKind::Workstream).await.expect("create");
        let err = store.insert((*doc).clone()).await.expect_err("duplicate");
        assert!(matches!(err, EngineError::DocumentExists(_)));
        assert_eq!(store.ids().await, vec![doc.id()]);
    }

    #[tokio::test]
    async fn documents_survive_reopen() {
        let tmp = tempdir().expect("tempdir");
        let config = persistent(tmp.path());

        let id = {
            let store = DocumentStore::open(&config).expect("open");
            let doc = store.create(DocumentKind::RequestForProposals).await.expect("create");
            for title in ["Draft", "Final"] {
                store
                    .dispatch(doc.id(), &Action::new("EDIT_RFP", json!({ "title": title })))
                    .await
                    .expect("dispatch");
            }
            doc.id()
        };

        let store = DocumentStore::open(&config).expect("reopen");
        let doc = store.get(id).await.expect("reloaded");
        assert_eq!(doc.header().revision.global, 2);
        assert_eq!(doc.state_json().expect("state")["global"]["title"], json!("Final"));
        assert!(doc.verify().expect("verify"));

        let past = store
            .revision(id, HistoryQuery::AtIndex { scope: Scope::Global, index: 0 })
            .await
            .expect("revision");
        assert_eq!(past.state["global"]["title"], json!("Draft"));
    }

    #[tokio::test]
    async fn inserting_a_populated_document_journals_its_log() {
        let tmp = tempdir().expect("tempdir");
        let config = persistent(tmp.path());
        let doc = crate::AnyDocument::create(DocumentKind::NetworkProfile)
            .dispatch(&Action::new("SET_PROFILE_NAME", json!({ "name": "Seed" })))
            .expect("dispatch");

        DocumentStore::open(&config).expect("open").insert(doc.clone()).await.expect("insert");

        let reopened = DocumentStore::open(&config).expect("reopen");
        assert_eq!(*reopened.get(doc.id()).await.expect("get"), doc);
    }
}
