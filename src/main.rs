use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vertexbatch::config::Config;
use vertexbatch::gcs::GcsClient;
use vertexbatch::google_oauth::token_source;
use vertexbatch::utils::http::build_http_client;
use vertexbatch::vertex::VertexBatchClient;
use vertexbatch::{BatchError, BatchPipeline, RunOutcome};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    // Fail on missing settings before any credential or network work.
    let settings = cfg.validate()?;
    info!(
        project_id = %settings.project_id,
        location = %settings.location,
        bucket_name = %settings.bucket_name,
        model_id = %settings.model_id,
        proxy = %cfg.proxy.as_ref().map_or("<none>", |u| u.as_str()),
        poll_interval_secs = settings.poll.interval.as_secs(),
        loglevel = %cfg.loglevel,
    );

    let http = build_http_client(&cfg)?;
    let tokens = token_source(&cfg, http.clone())?;
    let store = Arc::new(GcsClient::new(
        http.clone(),
        tokens.clone(),
        settings.storage_endpoint.clone(),
    ));
    let jobs = Arc::new(VertexBatchClient::new(
        http,
        tokens,
        settings.aiplatform_endpoint.clone(),
        settings.project_id.clone(),
        settings.location.clone(),
    ));
    let pipeline = BatchPipeline::new(settings, store, jobs);

    let outcome = tokio::select! {
        res = pipeline.run() => res?,
        () = shutdown_signal() => {
            warn!("Interrupted; the submitted job keeps running server-side.");
            return Err(BatchError::Interrupted.into());
        }
    };

    match outcome {
        RunOutcome::ReportWritten { rows, .. } => info!(rows, "Done."),
        RunOutcome::NoResultsFile { .. } | RunOutcome::JobFailed { .. } => {}
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
