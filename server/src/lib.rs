use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use termstore_core::{Client, Error, Operator, SledStore};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_op")]
    pub op: Operator,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_op() -> Operator { Operator::Or }
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub op: Operator,
    pub took_ms: u128,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<String>,
}

#[derive(Deserialize)]
pub struct IndexRequest {
    pub id: String,
    pub text: String,
}

/// Settings the binary reads from flags and the environment.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub namespace: String,
    /// Required in `X-ADMIN-TOKEN` by mutating endpoints; unset rejects them all.
    pub admin_token: Option<String>,
    /// Comma separated origins; unset allows any.
    pub cors_allow_origin: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<Client<SledStore>>,
    pub admin_token: Option<String>,
}

type ApiError = (StatusCode, String);

pub fn build_app(store: SledStore, config: AppConfig) -> Router {
    let client = Client::new(store, &config.namespace);
    tracing::info!(namespace = client.namespace(), "serving index");
    let app_state = AppState { client: Arc::new(client), admin_token: config.admin_token };

    let cors = match config.cors_allow_origin {
        Some(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:id", get(doc_handler).delete(remove_handler))
        .route("/index", post(index_handler))
        .route("/index/batch", post(index_batch))
        .route("/index/commit", post(index_commit))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn api_error(err: Error) -> ApiError {
    match err {
        Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        Error::Store(e) => {
            tracing::error!(error = %e, "store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let mut ids = state.client.query(&params.q, params.op).map_err(api_error)?;
    let total_hits = ids.len();
    ids.truncate(params.k.clamp(1, 100));

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse {
        query: params.q,
        op: params.op,
        took_ms: elapsed.as_millis(),
        took_s: elapsed.as_secs_f64(),
        total_hits,
        results: ids,
    }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    let terms = state.client.document_terms(&id).map_err(api_error)?;
    if terms.is_empty() {
        return Err((StatusCode::NOT_FOUND, "not found".into()));
    }
    Ok(Json(serde_json::json!({ "id": id, "terms": terms })))
}

async fn index_handler(State(state): State<AppState>, headers: HeaderMap, Json(doc): Json<IndexRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    state.client.index(&doc.text, &doc.id).map_err(api_error)?;
    Ok(Json(serde_json::json!({ "indexed": doc.id })))
}

async fn remove_handler(State(state): State<AppState>, headers: HeaderMap, Path(id): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    state.client.remove(&id).map_err(api_error)?;
    Ok(Json(serde_json::json!({ "removed": id })))
}

async fn index_batch(State(state): State<AppState>, headers: HeaderMap, Json(docs): Json<Vec<IndexRequest>>) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let count = state
        .client
        .index_batch(docs.iter().map(|d| (d.id.as_str(), d.text.as_str())))
        .map_err(api_error)?;
    Ok(Json(serde_json::json!({ "indexed": count })))
}

async fn index_commit(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    state.client.flush().map_err(api_error)?;
    Ok(Json(serde_json::json!({ "committed": true })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
