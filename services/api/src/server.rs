use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryEnquiryRepository, InMemoryFranchiseDirectory};
use crate::notify::ConfiguredNotifier;
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use franchise_hub::config::AppConfig;
use franchise_hub::error::AppError;
use franchise_hub::telemetry;
use franchise_hub::workflows::enquiries::{EnquiryIntakeService, IntakeSettings};
use franchise_hub::workflows::franchises::FranchiseDirectoryService;
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

    let cities = Arc::new(config.intake.city_aliases());
    let directory = Arc::new(InMemoryFranchiseDirectory::default());
    let notifier = Arc::new(ConfiguredNotifier::from_config(&config.notifications));
    info!(notifier = notifier.label(), aliases = cities.len(), "enquiry intake configured");

    let intake = Arc::new(EnquiryIntakeService::new(
        Arc::new(InMemoryEnquiryRepository::default()),
        directory.clone(),
        notifier,
        IntakeSettings {
            back_office_address: config.notifications.back_office_address.clone(),
            cities: cities.clone(),
        },
    ));
    let franchises = Arc::new(FranchiseDirectoryService::new(directory, cities));

    let app = with_service_routes(intake, franchises)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "franchise hub ready");

    axum::serve(listener, app).await?;
    Ok(())
}
