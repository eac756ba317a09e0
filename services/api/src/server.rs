use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySportRepository, JsonFileRepository};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sportdash::config::AppConfig;
use sportdash::dashboard::{SportDashService, SportRepository};
use sportdash::error::AppError;
use sportdash::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_file) = args.data_file.take() {
        config.dashboard.data_file = Some(data_file);
    }

    telemetry::init(&config.telemetry)?;

    match config.dashboard.data_file.clone() {
        Some(path) => {
            let repository = Arc::new(JsonFileRepository::open(&path)?);
            repository.flush()?;
            info!(path = %repository.path().display(), "dashboard data persisted to file");
            serve(&config, repository.clone()).await?;
            repository.flush()?;
        }
        None => {
            warn!("no data file configured; dashboard data is kept in memory only");
            serve(&config, Arc::new(InMemorySportRepository::default())).await?;
        }
    }

    Ok(())
}

async fn serve<R>(config: &AppConfig, repository: Arc<R>) -> Result<(), AppError>
where
    R: SportRepository + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(SportDashService::new(repository, &config.dashboard));
    let app = with_dashboard_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        timezone = %config.dashboard.timezone,
        "sport dashboard ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("sport dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
