//! Pipeline tests using in-memory embedder and index implementations.

use async_trait::async_trait;
use docs_search::config::Config;
use docs_search::embedding::{Embedder, EmbeddingError};
use docs_search::index::{IndexError, VectorIndex};
use docs_search::models::{EmbeddingVector, HitPayload, SearchHit, SearchRequest, SearchResponse};
use docs_search::search::{SearchError, SearchService, UNAVAILABLE_MESSAGE};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ─── Fakes ──────────────────────────────────────────────────────────

enum EmbedBehavior {
    Vector(Vec<f32>),
    Unusable,
    Timeout,
}

struct FakeEmbedder {
    behavior: EmbedBehavior,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    fn new(behavior: EmbedBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    fn model_name(&self) -> &str {
        "fake-embedder"
    }

    async fn embed(&self, _text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            EmbedBehavior::Vector(v) => Ok(v.clone()),
            EmbedBehavior::Unusable => Err(EmbeddingError::Unusable("success flag not set".into())),
            EmbedBehavior::Timeout => Err(EmbeddingError::Timeout),
        }
    }
}

enum IndexBehavior {
    Hits(Vec<SearchHit>),
    Timeout,
    Broken,
}

struct FakeIndex {
    behavior: IndexBehavior,
    calls: AtomicUsize,
    last_top_k: Mutex<Option<usize>>,
}

impl FakeIndex {
    fn new(behavior: IndexBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_top_k: Mutex::new(None),
        })
    }
}

#[async_trait]
impl VectorIndex for FakeIndex {
    async fn search(&self, _vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>, IndexError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_top_k.lock().unwrap() = Some(top_k);
        match &self.behavior {
            IndexBehavior::Hits(h) => Ok(h.clone()),
            IndexBehavior::Timeout => Err(IndexError::Timeout),
            IndexBehavior::Broken => Err(IndexError::Decode("expected value at line 1".into())),
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn hit(href: &str, score: f64) -> SearchHit {
    SearchHit {
        score,
        payload: HitPayload {
            href: Some(href.to_string()),
            title: Some(format!("Page {}", href)),
            text: Some("Agents are deployed with a single command. ".repeat(10)),
            category: Some("guides".to_string()),
        },
    }
}

fn service(embedder: Arc<FakeEmbedder>, index: Arc<FakeIndex>) -> SearchService {
    SearchService::new(Arc::new(Config::minimal()), embedder, index)
}

fn request(query: &str, top_k: Option<u64>) -> SearchRequest {
    SearchRequest {
        query: Some(query.to_string()),
        top_k,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_short_query_makes_no_outbound_calls() {
    let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![1.0]));
    let index = FakeIndex::new(IndexBehavior::Hits(vec![hit("/a", 1.0)]));
    let svc = service(embedder.clone(), index.clone());

    for q in ["", "d", "é"] {
        let resp = svc.search(&request(q, None)).await.unwrap();
        assert_eq!(resp, SearchResponse::empty(), "query {:?}", q);
    }
    let resp = svc.search(&SearchRequest::default()).await.unwrap();
    assert_eq!(resp, SearchResponse::empty());

    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert_eq!(index.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_two_char_query_runs_pipeline() {
    let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![1.0]));
    let index = FakeIndex::new(IndexBehavior::Hits(vec![hit("/k8s", 0.7)]));
    let svc = service(embedder.clone(), index.clone());

    let resp = svc.search(&request("k8", None)).await.unwrap();
    assert_eq!(resp.results.len(), 1);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_embedding_failure_degrades() {
    for behavior in [EmbedBehavior::Unusable, EmbedBehavior::Timeout] {
        let embedder = FakeEmbedder::new(behavior);
        let index = FakeIndex::new(IndexBehavior::Hits(vec![hit("/a", 1.0)]));
        let svc = service(embedder, index.clone());

        let resp = svc.search(&request("deploy agent", None)).await.unwrap();
        assert!(resp.results.is_empty());
        assert_eq!(resp.answer.as_deref(), Some(UNAVAILABLE_MESSAGE));
        assert_eq!(index.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_empty_index_has_no_answer() {
    let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![0.1, 0.2]));
    let index = FakeIndex::new(IndexBehavior::Hits(Vec::new()));
    let svc = service(embedder, index);

    let resp = svc.search(&request("deploy agent", None)).await.unwrap();
    assert_eq!(resp, SearchResponse::empty());
}

#[tokio::test]
async fn test_index_timeout_is_empty_result() {
    let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![0.1]));
    let index = FakeIndex::new(IndexBehavior::Timeout);
    let svc = service(embedder, index);

    let resp = svc.search(&request("deploy agent", None)).await.unwrap();
    assert_eq!(resp, SearchResponse::empty());
}

#[tokio::test]
async fn test_broken_index_is_hard_failure() {
    let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![0.1]));
    let index = FakeIndex::new(IndexBehavior::Broken);
    let svc = service(embedder, index);

    let err = svc.search(&request("deploy agent", None)).await.unwrap_err();
    assert!(matches!(err, SearchError::Index(IndexError::Decode(_))));
}

#[tokio::test]
async fn test_happy_path_dedups_and_truncates() {
    let hits = vec![
        hit("/docs/deploy", 0.95),
        hit("/docs/deploy", 0.94),
        hit("/docs/agents", 0.90),
        hit("/docs/agents", 0.85),
        hit("/docs/config", 0.80),
        hit("/docs/faq", 0.60),
    ];
    let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![0.3; 8]));
    let index = FakeIndex::new(IndexBehavior::Hits(hits));
    let svc = service(embedder, index.clone());

    let resp = svc.search(&request("deploy agent", Some(3))).await.unwrap();

    let hrefs: Vec<&str> = resp.results.iter().map(|r| r.href.as_str()).collect();
    assert_eq!(hrefs, vec!["/docs/deploy", "/docs/agents", "/docs/config"]);
    assert_eq!(resp.answer.as_deref(), Some("Found 3 relevant pages"));
    assert_eq!(resp.results[0].score, 0.95);
    assert_eq!(resp.results[1].score, 0.90);
    for r in &resp.results {
        assert!(r.description.ends_with("..."));
        assert_eq!(r.description.chars().count(), 153);
    }
    assert_eq!(*index.last_top_k.lock().unwrap(), Some(3));
}

#[tokio::test]
async fn test_default_and_clamped_top_k() {
    let hits: Vec<SearchHit> = (0..120).map(|i| hit(&format!("/p{}", i), 1.0)).collect();
    let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![0.1]));
    let index = FakeIndex::new(IndexBehavior::Hits(hits));
    let svc = service(embedder, index.clone());

    let resp = svc.search(&request("deploy", None)).await.unwrap();
    assert_eq!(resp.results.len(), 5);
    assert_eq!(*index.last_top_k.lock().unwrap(), Some(5));

    let resp = svc.search(&request("deploy", Some(1_000))).await.unwrap();
    assert_eq!(resp.results.len(), 50);

    let resp = svc.search(&request("deploy", Some(0))).await.unwrap();
    assert_eq!(resp.results.len(), 1);
}

#[tokio::test]
async fn test_handle_body_rejects_malformed_json() {
    let embedder = FakeEmbedder::new(EmbedBehavior::Vector(vec![0.1]));
    let index = FakeIndex::new(IndexBehavior::Hits(Vec::new()));
    let svc = service(embedder.clone(), index);

    let err = svc.handle_body(b"{not json").await.unwrap_err();
    assert!(matches!(err, SearchError::InvalidBody(_)));

    let err = svc.handle_body(br#"{"query": 42}"#).await.unwrap_err();
    assert!(matches!(err, SearchError::InvalidBody(_)));

    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
}
