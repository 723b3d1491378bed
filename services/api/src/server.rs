use crate::cli::ServeArgs;
use crate::infra::{build_engine, AppState, TableOverrides};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use store_kpi::config::AppConfig;
use store_kpi::error::AppError;
use store_kpi::telemetry;
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

    let engine = Arc::new(build_engine(&config.scoring, &TableOverrides::default())?);
    info!(
        overall = %engine.config().overall_policy.label(),
        days_per_period = engine.config().days_per_period,
        lookback_months = engine.config().sanction_policy.lookback_months(),
        "scoring engine configured"
    );

    let app = with_scoring_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "store kpi service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
