use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use settlement_readiness::readiness::{
    readiness_router, EntitySource, ReadinessService, WeightStore,
};
use std::sync::Arc;

pub(crate) fn with_readiness_routes<S, W>(service: Arc<ReadinessService<S, W>>) -> axum::Router
where
    S: EntitySource + 'static,
    W: WeightStore + 'static,
{
    readiness_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{build_service, ConfiguredWeightStore};
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use settlement_readiness::config::ScoringConfig;
    use settlement_readiness::import::EntitySnapshot;
    use settlement_readiness::readiness::ScoringPolicy;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app_state(ready: bool) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        }
    }

    fn service() -> ReadinessService<EntitySnapshot, ConfiguredWeightStore> {
        let scoring = ScoringConfig {
            settlements: vec!["Talmon".to_string()],
            snapshot_path: None,
            weights_path: None,
            policy: ScoringPolicy::default(),
        };
        build_service(&scoring, EntitySnapshot::default())
    }

    #[tokio::test]
    async fn readiness_endpoint_tracks_startup_flag() {
        let state = app_state(false);
        let response = readiness_endpoint(Extension(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = readiness_endpoint(Extension(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn operational_routes_sit_beside_the_readiness_api() {
        let app = with_readiness_routes(Arc::new(service())).layer(Extension(app_state(true)));

        for path in ["/health", "/ready", "/metrics", "/api/v1/weights"] {
            let response = app
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).expect("request builds"))
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn empty_data_still_scores_configured_settlements() {
        let app = with_readiness_routes(Arc::new(service())).layer(Extension(app_state(true)));

        let response = app
            .oneshot(
                Request::get("/api/v1/readiness/Talmon?at=2025-10-16T10:00:00")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let payload: serde_json::Value = serde_json::from_slice(&body).expect("json payload");
        assert_eq!(payload["readiness"], json!(0));
        assert_eq!(payload["priority"], json!(76));
    }
}
