//! `PipelineExecutor`: runs the four stages in order for one concept.

use std::path::PathBuf;
use std::sync::Arc;

use pipeline::{
    ChartRenderer, ChartSet, CompletionService, Concept, PageSize, PipelineError, PipelineState,
    RunId, SearchService, DEFAULT_TOP_N,
};
use tracing::Instrument;

use crate::retry::RetryConfig;
use crate::stages::{analysis_stage, format_stage, insight_stage, query_stage};

/// Tunables applied to every run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorSettings {
    pub page_size: PageSize,
    /// Length bound for every ranked list.
    pub top_n: usize,
    /// Directory the chart files are written to. Must already exist.
    pub output_dir: PathBuf,
    pub retry: RetryConfig,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            top_n: DEFAULT_TOP_N,
            output_dir: PathBuf::from("."),
            retry: RetryConfig::default(),
        }
    }
}

/// What a successful run hands back to the caller for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub run_id: RunId,
    pub concept: Concept,
    pub formatted_result: String,
    pub investment_insights: String,
    pub charts: ChartSet,
}

impl TryFrom<PipelineState> for PipelineOutcome {
    type Error = PipelineError;

    fn try_from(state: PipelineState) -> Result<Self, Self::Error> {
        let missing = |field| PipelineError::StageOrder {
            stage: "present",
            field,
        };
        Ok(Self {
            run_id: state.run_id(),
            concept: state.concept().clone(),
            formatted_result: state
                .formatted_result()
                .ok_or_else(|| missing("formatted_result"))?
                .to_string(),
            investment_insights: state
                .investment_insights()
                .ok_or_else(|| missing("investment_insights"))?
                .to_string(),
            charts: state.chart_paths().cloned().ok_or_else(|| missing("chart_paths"))?,
        })
    }
}

/// Drives Query → Analysis → Format → Insight.
///
/// Collaborators are injected at construction so the executor never depends
/// on a concrete HTTP client or image encoder.
pub struct PipelineExecutor {
    search: Arc<dyn SearchService>,
    completion: Arc<dyn CompletionService>,
    renderer: Arc<dyn ChartRenderer>,
    settings: ExecutorSettings,
}

impl PipelineExecutor {
    pub fn new(
        search: Arc<dyn SearchService>,
        completion: Arc<dyn CompletionService>,
        renderer: Arc<dyn ChartRenderer>,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            search,
            completion,
            renderer,
            settings,
        }
    }

    pub fn settings(&self) -> &ExecutorSettings {
        &self.settings
    }

    /// Runs the pipeline for `concept`.
    ///
    /// # Errors
    ///
    /// The first stage error, unchanged. Later stages do not run and no
    /// partial result is returned.
    pub async fn run(&self, concept: Concept) -> Result<PipelineOutcome, PipelineError> {
        let state = PipelineState::new(concept);
        let span = tracing::info_span!(
            "run",
            run_id = %state.run_id(),
            concept = %state.concept(),
        );
        let started_at = state.started_at();

        let result = self.run_stages(state).instrument(span.clone()).await;
        span.in_scope(|| match &result {
            Ok(_) => tracing::info!(elapsed_ms = started_at.elapsed_ms(), "Run complete"),
            Err(e) => tracing::error!(elapsed_ms = started_at.elapsed_ms(), error = %e, "Run failed"),
        });
        result
    }

    async fn run_stages(&self, state: PipelineState) -> Result<PipelineOutcome, PipelineError> {
        let settings = &self.settings;
        let state = query_stage(state, self.search.as_ref(), settings.page_size, &settings.retry).await?;
        let state = analysis_stage(state, self.renderer.as_ref(), &settings.output_dir, settings.top_n)?;
        let state = format_stage(state)?;
        let state = insight_stage(state, self.completion.as_ref(), &settings.retry).await?;
        PipelineOutcome::try_from(state)
    }
}
