//! HTTP handlers for the fact store.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use catfacts_storage::{FactStore, ALL_KEY};
use catfacts_types::extract_new_facts;

use crate::error::ServiceError;

/// Shared state for fact handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FactStore>,
}

impl AppState {
    pub fn new(store: Arc<FactStore>) -> Self {
        Self { store }
    }
}

/// Create the facts router
pub fn facts_router(state: AppState) -> Router {
    Router::new()
        .route("/api/get_cat_facts/:topics", get(get_cat_facts))
        .route("/api/write_new_cat_fact", post(write_new_cat_fact))
        .route("/health", get(health))
        .with_state(state)
}

/// Turn the path segment into a topic filter.
///
/// `all` means no filter. Otherwise names are split on commas, trimmed, and
/// blank names are skipped.
pub fn parse_topics(raw: &str) -> Option<Vec<String>> {
    if raw.trim() == ALL_KEY {
        return None;
    }
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// GET /api/get_cat_facts/:topics
async fn get_cat_facts(
    State(state): State<AppState>,
    Path(topics): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = parse_topics(&topics);
    debug!(?filter, "Fetching cat facts");

    // RocksDB reads block; keep them off the async workers.
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || store.fetch(filter.as_deref())).await??;
    Ok(Json(result))
}

/// POST /api/write_new_cat_fact
async fn write_new_cat_fact(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let Json(body) = body.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    let records =
        extract_new_facts(body).map_err(|e| ServiceError::BadRequest(e.to_string()))?;

    let store = state.store.clone();
    let report = tokio::task::spawn_blocking(move || store.create(records)).await??;
    info!(
        created = report.created,
        rejected = report.rejected.len(),
        "Wrote new cat facts"
    );
    Ok(Json(report))
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use catfacts_types::{ClassifiedFact, TreeResult};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn make_app() -> (Router, Arc<FactStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FactStore::open(dir.path()).unwrap());

        let mut tree = TreeResult::new();
        tree.ensure_root("cat");
        tree.push_fact(ClassifiedFact::new("cat", 1, vec!["cat_root".into()], "Cats purr."));
        tree.push_fact(ClassifiedFact::new(
            "appearance",
            2,
            vec!["cat_root".into(), "cat".into()],
            "Her fur is soft.",
        ));
        store.write_clean(&tree).unwrap();

        let app = facts_router(AppState::new(store.clone()));
        (app, store, dir)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/write_new_cat_fact")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_parse_topics() {
        assert_eq!(parse_topics("all"), None);
        assert_eq!(
            parse_topics("cat, appearance,,  "),
            Some(vec!["cat".to_string(), "appearance".to_string()])
        );
        assert_eq!(parse_topics(" , "), Some(vec![]));
    }

    #[tokio::test]
    async fn test_get_all() {
        let (app, _store, _dir) = make_app();
        let req = Request::builder()
            .uri("/api/get_cat_facts/all")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let all = json["all"].as_array().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0]["id"], 0);
        assert_eq!(all[0]["topic"], "appearance");
        assert_eq!(all[0]["parents"], "cat_root, cat");
        assert_eq!(all[2]["topic"], "cat_root");
        assert_eq!(all[2]["fact"], "none");
    }

    #[tokio::test]
    async fn test_get_by_topics() {
        let (app, _store, _dir) = make_app();
        let req = Request::builder()
            .uri("/api/get_cat_facts/cat,%20dog,")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let map = json.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(json["cat"].as_array().unwrap().len(), 1);
        assert_eq!(json["cat"][0]["fact"], "Cats purr.");
        assert!(json["dog"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_new_cat_fact() {
        let (app, store, _dir) = make_app();
        let body = r#"{"new_cat_facts": [
            {"depth": 2, "topic": "health", "parents": ["cat_root", "cat"], "fact": "Cats need water."},
            {"depth": 1, "topic": "misc", "fact": "No parents here."},
            {"depth": 1, "topic": "misc"}
        ]}"#;
        let resp = app.oneshot(post_json(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["created"], 2);
        assert_eq!(json["ids"], json!([3, 4]));
        assert_eq!(json["rejected"][0]["index"], 2);

        let misc = store.fetch(Some(&["misc".to_string()])).unwrap();
        assert_eq!(misc["misc"][0].parents, "none");
        let health = store.fetch(Some(&["health".to_string()])).unwrap();
        assert_eq!(health["health"][0].parents, "cat_root, cat");
    }

    #[tokio::test]
    async fn test_write_without_key_is_bad_request() {
        let (app, store, _dir) = make_app();
        let resp = app.oneshot(post_json(r#"{"facts": []}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("new_cat_facts"));
        assert_eq!(store.max_id().unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_write_non_array_is_bad_request() {
        let (app, _store, _dir) = make_app();
        let resp = app
            .oneshot(post_json(r#"{"new_cat_facts": {"depth": 1}}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_write_invalid_json_is_bad_request() {
        let (app, _store, _dir) = make_app();
        let resp = app.oneshot(post_json("{not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _store, _dir) = make_app();
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"status": "ok"}));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_writes_and_reads_share_the_store() {
        let (app, store, _dir) = make_app();

        let writes = (0..8).map(|i| {
            let app = app.clone();
            async move {
                let body = format!(
                    r#"{{"new_cat_facts": [{{"depth": 1, "topic": "misc", "fact": "note {}"}}]}}"#,
                    i
                );
                let resp = app.oneshot(post_json(&body)).await.unwrap();
                assert_eq!(resp.status(), StatusCode::OK);
            }
        });
        let reads = (0..8).map(|_| {
            let app = app.clone();
            async move {
                let req = Request::builder()
                    .uri("/api/get_cat_facts/misc")
                    .body(Body::empty())
                    .unwrap();
                let resp = app.oneshot(req).await.unwrap();
                assert_eq!(resp.status(), StatusCode::OK);
            }
        });
        spawn_and_wait(writes, reads).await;

        let misc = store.fetch(Some(&["misc".to_string()])).unwrap();
        let mut ids: Vec<u64> = misc["misc"].iter().map(|r| r.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (3..11).collect::<Vec<u64>>());
    }

    async fn futures_join<W, R>(writes: W, reads: R)
    where
        W: Iterator,
        W::Item: std::future::Future<Output = ()> + Send + 'static,
        R: Iterator,
        R::Item: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut handles: Vec<_> = writes.map(tokio::spawn).collect();
        handles.extend(reads.map(tokio::spawn));
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_failed_store_task_maps_to_500() {
        let join_err = tokio::task::spawn_blocking(|| panic!("store task died"))
            .await
            .unwrap_err();
        let resp = ServiceError::from(join_err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_storage_error_maps_to_500() {
        let resp = ServiceError::Storage(catfacts_storage::StorageError::LockPoisoned).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
