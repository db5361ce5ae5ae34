use crate::cli::ServeArgs;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::infra::{
    AppState, InMemoryPostingRepository, InMemoryPostulationRepository,
    LoggingNotificationDispatcher,
};
use crate::routes::service_routes;
use crate::telemetry;
use crate::workflows::postings::postulations::{postulation_router, PostulationService};
use crate::workflows::postings::{posting_router, JobPostingService};
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

    let postings = Arc::new(InMemoryPostingRepository::default());
    let postulations = Arc::new(InMemoryPostulationRepository::default());
    let notifier = Arc::new(LoggingNotificationDispatcher);

    let posting_service = Arc::new(JobPostingService::new(
        postings.clone(),
        notifier.clone(),
        config.scheduling.default_timezone.clone(),
    ));
    let postulation_service = Arc::new(PostulationService::new(
        postulations,
        postings,
        notifier,
    ));

    let app = service_routes(
        posting_router(posting_service).merge(postulation_router(postulation_service)),
    )
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tutoring marketplace service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
