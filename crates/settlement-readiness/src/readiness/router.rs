use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use super::aggregator::EntitySource;
use super::service::{ReadinessService, ReadinessServiceError};
use super::weights::{WeightStore, WeightsError};

/// Header carrying the operator a weights change is attributed to.
pub const OPERATOR_HEADER: &str = "x-operator-id";

/// Router builder exposing the dashboard, per-settlement lookup and weights endpoints.
pub fn readiness_router<S, W>(service: Arc<ReadinessService<S, W>>) -> Router
where
    S: EntitySource + 'static,
    W: WeightStore + 'static,
{
    Router::new()
        .route("/api/v1/readiness", get(dashboard_handler::<S, W>))
        .route(
            "/api/v1/readiness/:settlement",
            get(settlement_handler::<S, W>),
        )
        .route(
            "/api/v1/weights",
            get(weights_handler::<S, W>).put(save_weights_handler::<S, W>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct EvaluationQuery {
    /// Local evaluation instant; defaults to the current wall-clock time.
    #[serde(default)]
    pub at: Option<NaiveDateTime>,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub(crate) async fn dashboard_handler<S, W>(
    State(service): State<Arc<ReadinessService<S, W>>>,
    Query(query): Query<EvaluationQuery>,
) -> Response
where
    S: EntitySource + 'static,
    W: WeightStore + 'static,
{
    let now = query.at.unwrap_or_else(local_now);
    match run_blocking(move || service.dashboard(now)).await {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn settlement_handler<S, W>(
    State(service): State<Arc<ReadinessService<S, W>>>,
    Path(settlement): Path<String>,
    Query(query): Query<EvaluationQuery>,
) -> Response
where
    S: EntitySource + 'static,
    W: WeightStore + 'static,
{
    let now = query.at.unwrap_or_else(local_now);
    match run_blocking(move || service.settlement(&settlement, now)).await {
        Ok(score) => (StatusCode::OK, Json(score)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn weights_handler<S, W>(
    State(service): State<Arc<ReadinessService<S, W>>>,
) -> Response
where
    S: EntitySource + 'static,
    W: WeightStore + 'static,
{
    match run_blocking(move || service.weights()).await {
        Ok(active) => (StatusCode::OK, Json(active)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn save_weights_handler<S, W>(
    State(service): State<Arc<ReadinessService<S, W>>>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response
where
    S: EntitySource + 'static,
    W: WeightStore + 'static,
{
    let operator = headers
        .get(OPERATOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    match run_blocking(move || service.save_weights(&operator, &payload, local_now())).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(response) => response,
    }
}

/// Runs store and source reads off the async executor.
async fn run_blocking<T, F>(task: F) -> Result<T, Response>
where
    F: FnOnce() -> Result<T, ReadinessServiceError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(error_response(err)),
        Err(join_error) => {
            error!(error = %join_error, "readiness task aborted");
            let payload = json!({ "error": "readiness computation aborted" });
            Err((StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response())
        }
    }
}

fn error_response(err: ReadinessServiceError) -> Response {
    let status = match &err {
        ReadinessServiceError::Weights(WeightsError::Validation { .. }) => StatusCode::BAD_REQUEST,
        ReadinessServiceError::Weights(WeightsError::MissingOperator) => StatusCode::UNAUTHORIZED,
        ReadinessServiceError::UnknownSettlement(_) => StatusCode::NOT_FOUND,
        ReadinessServiceError::EvaluationOutOfRange(_) => StatusCode::BAD_REQUEST,
        ReadinessServiceError::Configuration(_)
        | ReadinessServiceError::Weights(WeightsError::Storage(_)) => {
            error!(error = %err, "readiness request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
