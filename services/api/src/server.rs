use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionRepository};
use crate::routes::with_application_routes;
use agent_lab::config::AppConfig;
use agent_lab::error::AppError;
use agent_lab::telemetry;
use agent_lab::workflows::application::{ApplicationAssistantService, JsonFileSnapshotStore};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    let repository = Arc::new(InMemorySessionRepository::default());
    let snapshots = Arc::new(JsonFileSnapshotStore::per_session(
        config.intake.snapshot_dir.clone(),
    ));
    let application_service = Arc::new(ApplicationAssistantService::new(repository, snapshots));

    let app = with_application_routes(application_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        snapshot_dir = %config.intake.snapshot_dir.display(),
        "applicant intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
