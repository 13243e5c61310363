//! # Rates Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize tracing (with optional OTLP export)
//! - Build the repository, upstream and mail adapters
//! - Start the broadcast scheduler and the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exchange_rates::ExchangeRateApi;
use rates_hex::outbound::SmtpMailer;
use rates_hex::{BroadcastScheduler, ExchangeService, RateCacheConfig, inbound::HttpServer};
use rates_repo::build_repo;

fn init_tracer(endpoint: &str) -> anyhow::Result<sdktrace::SdkTracerProvider> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());
    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = config::Config::from_env()?;

    let otel_provider = config
        .otlp_endpoint
        .as_deref()
        .map(init_tracer)
        .transpose()?;
    let telemetry = otel_provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("rates-service")));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rates_app=debug,rates_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    tracing::info!("Starting rates server on port {}", config.port);
    tracing::info!("Using database: {}", config.database_url);
    tracing::info!("Upstream rate API: {}", config.rate_api_url);

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;
    let source = ExchangeRateApi::new(config.rate_api_url.clone(), config.fetch_timeout)?;
    let mailer = SmtpMailer::new(config.smtp.clone())?;

    let service = ExchangeService::new(
        repo,
        source,
        mailer,
        RateCacheConfig {
            staleness_threshold: config.staleness_threshold,
            fetch_timeout: config.fetch_timeout,
        },
    );

    let scheduler = BroadcastScheduler::new(service.notifier(), &config.broadcast_schedule)?;
    tracing::info!("Broadcast schedule: {}", config.broadcast_schedule);
    let scheduler_task = scheduler.spawn();

    let server = match config.rate_limit_per_minute {
        Some(quota) => {
            tracing::info!("Rate limit: {} requests per minute per client", quota);
            HttpServer::with_rate_limit(service, quota)
        }
        None => HttpServer::new(service),
    };
    let addr = format!("0.0.0.0:{}", config.port);

    let result = server.run(&addr).await;

    scheduler_task.abort();
    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    result
}
