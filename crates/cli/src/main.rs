//! investor-intel CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load configuration**: read an optional `.env` file, then validate every
//!    environment variable into an [`config::AppConfig`]. An invalid
//!    configuration exits non-zero before any prompt is shown.
//! 2. **Wire observability**: `tracing-subscriber` with text or JSON output on
//!    stderr, plus an OpenTelemetry OTLP exporter when
//!    `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
//! 3. **Construct infrastructure**: `OpenAlexClient`, `AzureOpenAiProvider`,
//!    and `PngChartRenderer`, injected into `PipelineExecutor`.
//! 4. **Run the prompt loop** on stdin until the user quits.

mod config;
mod repl;
mod telemetry;

use std::process::ExitCode;
use std::sync::Arc;

use charts::PngChartRenderer;
use llm::AzureOpenAiProvider;
use nodes::PipelineExecutor;
use openalex::OpenAlexClient;
use pipeline::PipelineError;
use tokio::io::BufReader;

use crate::config::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env file: {e}");
            return ExitCode::FAILURE;
        }
    }

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let _telemetry = match telemetry::init(config.log_format, config.otlp_endpoint.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let executor = match build_executor(config) {
        Ok(executor) => executor,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let settings = executor.settings();
    tracing::info!(
        page_size = %settings.page_size,
        top_n = settings.top_n,
        output_dir = %settings.output_dir.display(),
        max_retries = settings.retry.max_retries,
        "investor-intel ready"
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    match repl::run_session(&executor, stdin, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Terminal I/O failed");
            ExitCode::FAILURE
        }
    }
}

fn build_executor(config: AppConfig) -> Result<PipelineExecutor, PipelineError> {
    let search = OpenAlexClient::new(config.openalex)?;
    let completion = AzureOpenAiProvider::new(config.azure)?;
    tracing::debug!(deployment = %completion.deployment(), "Completion provider configured");

    Ok(PipelineExecutor::new(
        Arc::new(search),
        Arc::new(completion),
        Arc::new(PngChartRenderer::default()),
        config.executor,
    ))
}
