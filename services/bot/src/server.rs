use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use fitlog::config::{AppConfig, ConfigError};
use fitlog::error::AppError;
use fitlog::telemetry;

use crate::adapters::{AirtableStore, SlackGateway};
use crate::cli::ServeArgs;
use crate::infra::{AppState, BotContext};
use crate::routes::with_bot_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let store_config = config
        .store
        .clone()
        .ok_or(AppError::Config(ConfigError::MissingVar {
            var: "STORE_API_KEY",
        }))?;
    let gateway_config = config
        .gateway
        .clone()
        .ok_or(AppError::Config(ConfigError::MissingVar {
            var: "GATEWAY_BOT_TOKEN",
        }))?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(AirtableStore::new(store_config));
    let gateway = Arc::new(SlackGateway::new(gateway_config));
    let ctx = Arc::new(BotContext::new(store, gateway, &config));

    let app = with_bot_routes(ctx)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        campaign_start = %config.campaign.start_date,
        campaign_end = %config.campaign.end_date,
        "exercise record bot ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
