use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use scholardex_core::{IndexPaths, SearchEngine};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: u128,
    pub total_hits: usize,
    pub results: Vec<SearchHitDto>,
}

#[derive(Serialize)]
pub struct SearchHitDto {
    pub doc_id: u32,
    pub score: f64,
    pub path: String,
    pub url: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

/// Opens the index at `index_dir` and builds the router. Opening fails
/// fast (propagated to the caller, which exits non-zero) if any of the
/// three final artifacts is missing.
pub fn build_app(index_dir: &str) -> Result<Router> {
    let paths = IndexPaths::new(index_dir);
    let engine =
        SearchEngine::open(&paths).with_context(|| format!("opening index at {index_dir}"))?;
    let state = AppState {
        engine: Arc::new(engine),
    };

    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = Instant::now();
    match state.engine.search(&params.q) {
        Ok(hits) => {
            let results: Vec<SearchHitDto> = hits
                .into_iter()
                .map(|h| SearchHitDto {
                    doc_id: h.doc_id,
                    score: h.score,
                    path: h.meta.path,
                    url: h.meta.url,
                })
                .collect();
            let took_ms = start.elapsed().as_millis();
            Ok(Json(SearchResponse {
                total_hits: results.len(),
                query: params.q,
                took_ms,
                results,
            }))
        }
        // A corrupted index is the only query-time error the evaluator
        // raises; the CLI counterpart exits non-zero for the same
        // condition, but a running service can't exit per request.
        Err(e) => {
            tracing::error!(error = %e, query = params.q.as_str(), "query failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
