use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use hyper::body::Bytes;
use scholardex_core::finalize::{finalize_doc_map, write_final_index};
use scholardex_core::merge::MergeIter;
use scholardex_core::{IndexPaths, Indexer};
use serde_json::Value;
use tempfile::tempdir;

fn build_tiny_index(dir: &std::path::Path) {
    let paths = IndexPaths::new(dir);
    let mut indexer = Indexer::new();
    indexer.ingest_document(
        "doc0.html",
        "http://example.test/doc0",
        "<title>Rust</title><body>Rust is great. rust systems programming.</body>",
    );
    indexer.ingest_document(
        "doc1.html",
        "http://example.test/doc1",
        "<body>Learning rust.</body>",
    );
    indexer.spill(&paths, "0001").unwrap();

    let doc_map = finalize_doc_map(&paths).unwrap();
    let run = paths.partial_search_index("0001");
    let merge = MergeIter::open(&[run]).unwrap();
    write_final_index(merge, doc_map.len() as u32, &paths).unwrap();
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(axum::body::Body::empty()).unwrap();
    let svc = app.into_service();
    let resp = tower::ServiceExt::oneshot(svc, req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = scholardex_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let (status, body) = call(app, "/search?q=rust").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    // doc0's title weight (0.4) outweighs doc1's plain-body occurrence (0.1).
    assert_eq!(arr[0]["url"], "http://example.test/doc0");
}

#[tokio::test]
async fn health_check_responds_ok() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = scholardex_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let (status, _body) = call(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_query_term_returns_empty_results_not_an_error() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = scholardex_server::build_app(dir.path().to_str().unwrap()).unwrap();

    let (status, body) = call(app, "/search?q=nonexistentword").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_hits"], 0);
}
