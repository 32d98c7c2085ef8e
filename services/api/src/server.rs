use crate::cli::ServeArgs;
use crate::infra::{build_service, load_snapshot, AppState};
use crate::routes::with_readiness_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use settlement_readiness::config::AppConfig;
use settlement_readiness::error::AppError;
use settlement_readiness::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let snapshot = load_snapshot(config.scoring.snapshot_path.as_deref(), None)?;
    let service = build_service(&config.scoring, snapshot);
    info!(
        settlements = service.settlements().len(),
        weights_path = ?config.scoring.weights_path,
        "readiness service configured"
    );

    let app = with_readiness_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "settlement readiness service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
