mod config;

use clap::{Parser, Subcommand};
use config::{Config, ConfigError, LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use sku_details::config::Config as SkuDetailsConfig;
use sku_details::http_service::HttpBillingService;
use sku_details::metrics_defs::describe_metrics;
use sku_details::service::ReportingErrorHandler;
use sku_details::{
    BillingClient, BillingContext, GetSkuDetailsRequest, Request, RequestOutcome, Response,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(about = "Fetch SKU details from the billing service")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, short, default_value = "skus.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Fetch details of the given SKUs and print them as JSON
    Fetch {
        #[arg(long, default_value = "inapp")]
        product: String,
        skus: Vec<String>,
    },
    /// Print the cache key of a request without contacting the service
    CacheKey {
        #[arg(long, default_value = "inapp")]
        product: String,
        skus: Vec<String>,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("request failed: {0}")]
    SkuDetails(#[from] sku_details::SkuDetailsError),
    #[error("could not create billing service client: {0}")]
    Transport(#[from] sku_details::TransportError),
    #[error("could not set up metrics: {0}")]
    Metrics(String),
    #[error("could not serialize result: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        CliCommand::CacheKey { product, skus } => {
            println!("{}", GetSkuDetailsRequest::new(product, skus).cache_key());
            Ok(ExitCode::SUCCESS)
        }
        CliCommand::Fetch { product, skus } => run_fetch(&cli.config, product, skus).await,
    };

    result.unwrap_or_else(|e| {
        eprintln!("{e}");
        ExitCode::FAILURE
    })
}

async fn run_fetch(
    config_path: &std::path::Path,
    product: String,
    skus: Vec<String>,
) -> Result<ExitCode, CliError> {
    let config = Config::from_file(config_path)?;

    let _sentry = init_logging(&config.common.logging);
    if let Some(metrics_config) = &config.common.metrics {
        init_metrics(metrics_config)?;
    }

    fetch(config.sku_details, Request::sku_details(product, skus)).await
}

async fn fetch(config: SkuDetailsConfig, request: Request) -> Result<ExitCode, CliError> {
    let service = HttpBillingService::new(&config.service)?;
    let (error_tx, mut error_rx) = mpsc::unbounded_channel();

    let context = BillingContext::new(Arc::new(service), config.package_name)
        .with_api_version(config.api_version)
        .with_error_handler(Arc::new(ReportingErrorHandler::with_listener(error_tx)));
    let client = BillingClient::new(context, &config.cache);

    tracing::info!(cache_key = ?request.cache_key(), "Fetching SKU details");

    match client.execute(&request).await? {
        RequestOutcome::Completed(Response::SkuDetails(skus)) => {
            println!("{}", serde_json::to_string_pretty(&skus)?);
            Ok(ExitCode::SUCCESS)
        }
        RequestOutcome::Aborted { batch_index } => {
            while let Ok(error) = error_rx.try_recv() {
                eprintln!("Billing service error in batch {batch_index}: {}", error.code);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_logging(config: &LoggingConfig) -> Option<sentry::ClientInitGuard> {
    let guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    guard
}

fn init_metrics(config: &MetricsConfig) -> Result<(), CliError> {
    let recorder = StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port)
        .build(Some(&config.prefix))
        .map_err(|e| CliError::Metrics(e.to_string()))?;
    metrics::set_global_recorder(recorder).map_err(|e| CliError::Metrics(e.to_string()))?;
    describe_metrics();

    Ok(())
}
