// tests/metrics.rs
//
// Installs the global Prometheus recorder, so this file holds a single test.

use axum::body::{self, Body};
use http::{Request, StatusCode};
use naija_grid_watch::api::create_router;
use naija_grid_watch::ingest::build_events;
use naija_grid_watch::metrics::Metrics;
use tower::ServiceExt as _;

#[tokio::test]
async fn metrics_route_exposes_ingest_series() {
    let metrics = Metrics::init().expect("recorder");
    let _ = build_events(Vec::new());

    let tmp = tempfile::tempdir().unwrap();
    let app = create_router(tmp.path(), Some(&metrics));
    let req = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(
        body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap()
            .to_vec(),
    )
    .unwrap();
    assert!(text.contains("ingest_rejected_total"), "{text}");
}
