use std::sync::atomic::{AtomicBool, Ordering};

use super::*;
use crate::llm::mock::{MockLlm, Reply};
use crate::model::Model;
use crate::pipeline::ModelSource;
use crate::store::{MemoryStore, StoreError};

const INVOICE: &str = "{\"classes\": [{\"name\": \"Invoice\"}], \"relationships\": []}";
const INVOICE_PAYMENT: &str = "{\"classes\": [{\"name\": \"Invoice\"}, {\"name\": \"Payment\"}], \"relationships\": []}";

fn session_with(replies: Vec<Reply>) -> (Session, Arc<MockLlm>, Arc<MemoryStore>) {
    let llm = Arc::new(MockLlm::new(replies));
    let store = Arc::new(MemoryStore::new());
    let chat: Arc<dyn LlmChat> = llm.clone();
    let history: Arc<dyn HistoryStore> = store.clone();
    (Session::new(history, Some(chat), PipelineConfig::default()), llm, store)
}

#[tokio::test]
async fn second_submit_edits_the_first_model() {
    let (session, llm, _) =
        session_with(vec![Reply::Text(INVOICE.into()), Reply::Text(INVOICE_PAYMENT.into())]);

    let first = session.submit("s1", "Invoices.", DiagramType::Class).await;
    assert_eq!(first.source, ModelSource::Candidate);

    let second = session.submit("s1", "Add a Payment class.", DiagramType::Class).await;
    assert_eq!(second.model.entity_count(), 2);

    let requests = llm.requests();
    assert!(requests[0].prompt.starts_with("Create"));
    assert!(requests[1].prompt.starts_with("Edit"));
    assert!(requests[1].prompt.contains("\"name\": \"Invoice\""));

    let history = session.history("s1").await;
    assert_eq!(history.len(), 2);
    assert_eq!(history.turns()[1].prompt, "Add a Payment class.");
    assert_eq!(history.turns()[1].diagram, second.plantuml);
}

#[tokio::test]
async fn failed_edit_keeps_the_previous_model() {
    let (session, _, _) = session_with(vec![Reply::Text(INVOICE.into()), Reply::Text("{\"foo\": []}".into())]);

    let first = session.submit("s1", "Invoices.", DiagramType::Class).await;
    let second = session.submit("s1", "Make it better.", DiagramType::Class).await;

    assert_eq!(second.source, ModelSource::Seed);
    assert_eq!(second.model, first.model);
}

#[tokio::test]
async fn sessions_and_diagram_types_are_isolated() {
    let (session, llm, _) = session_with(vec![Reply::Text(INVOICE.into())]);

    session.submit("s1", "Invoices.", DiagramType::Class).await;
    session.submit("s2", "Invoices.", DiagramType::Class).await;
    session.submit("s1", "Users log in.", DiagramType::Sequence).await;

    let requests = llm.requests();
    assert!(requests.iter().all(|r| r.prompt.starts_with("Create")));
}

#[tokio::test]
async fn reset_returns_to_create_mode() {
    let (session, llm, store) = session_with(vec![Reply::Text(INVOICE.into())]);

    session.submit("s1", "Invoices.", DiagramType::Class).await;
    assert!(session.reset("s1").await);
    assert!(!session.reset("s1").await);
    assert!(store.get("s1").await.unwrap().is_none());

    session.submit("s1", "Invoices again.", DiagramType::Class).await;
    assert!(llm.requests()[1].prompt.starts_with("Create"));
}

struct BrokenStore;

#[async_trait::async_trait]
impl HistoryStore for BrokenStore {
    async fn get(&self, _id: &str) -> Result<Option<History>, StoreError> {
        Err(StoreError::Backend("offline".into()))
    }

    async fn put(&self, _id: &str, _history: History) -> Result<(), StoreError> {
        Err(StoreError::Backend("offline".into()))
    }

    async fn delete(&self, _id: &str) -> Result<bool, StoreError> {
        Err(StoreError::Backend("offline".into()))
    }
}

#[tokio::test]
async fn store_failures_never_block_generation() {
    let session = Session::new(Arc::new(BrokenStore), None, PipelineConfig::default());

    let outcome = session.submit("s1", "A Library contains Books.", DiagramType::Class).await;
    assert_eq!(outcome.source, ModelSource::Draft);
    assert!(matches!(outcome.model, Model::Class(_)));
    assert!(session.history("s1").await.is_empty());
    assert!(!session.reset("s1").await);
}

/// Memory-backed store whose reads can be switched off; writes keep working.
#[derive(Default)]
struct FlakyReadStore {
    inner: MemoryStore,
    reads_fail: AtomicBool,
}

#[async_trait::async_trait]
impl HistoryStore for FlakyReadStore {
    async fn get(&self, id: &str) -> Result<Option<History>, StoreError> {
        if self.reads_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("read timeout".into()));
        }
        self.inner.get(id).await
    }

    async fn put(&self, id: &str, history: History) -> Result<(), StoreError> {
        self.inner.put(id, history).await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn unreadable_history_is_never_overwritten() {
    let store = Arc::new(FlakyReadStore::default());
    let llm: Arc<dyn LlmChat> = Arc::new(MockLlm::new((0..5).map(|_| Reply::Text(INVOICE.into())).collect()));
    let history: Arc<dyn HistoryStore> = store.clone();
    let session = Session::new(history, Some(llm), PipelineConfig::default());

    for text in ["Invoices.", "Add a total.", "Add a due date."] {
        session.submit("s1", text, DiagramType::Class).await;
    }
    assert_eq!(store.inner.get("s1").await.unwrap().unwrap().len(), 3);

    store.reads_fail.store(true, Ordering::SeqCst);
    let outcome = session.submit("s1", "Add a Payment class.", DiagramType::Class).await;
    assert_eq!(outcome.source, ModelSource::Candidate);

    let kept = store.inner.get("s1").await.unwrap().unwrap();
    assert_eq!(kept.len(), 3);
    assert_eq!(kept.turns()[2].prompt, "Add a due date.");

    store.reads_fail.store(false, Ordering::SeqCst);
    session.submit("s1", "Add a Payment class.", DiagramType::Class).await;
    assert_eq!(store.inner.get("s1").await.unwrap().unwrap().len(), 4);
}
