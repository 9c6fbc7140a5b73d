//! The four pipeline stages.
//!
//! Each stage consumes the [`PipelineState`], performs one step, and returns
//! the state with that step's output recorded. Stages hold no state of their
//! own; collaborators are passed in.

use std::path::Path;

use pipeline::{
    format_report, insight_request, ChartKind, ChartRenderer, ChartSet, ChartSpec,
    CompletionService, PageSize, PipelineError, PipelineState, ResearchStats, SearchRequest,
    SearchService,
};

use crate::retry::{execute_with_retry, RetryConfig};

/// Query Stage: fetches research records for the state's concept.
#[tracing::instrument(name = "query_stage", skip_all, fields(concept = %state.concept()))]
pub async fn query_stage(
    state: PipelineState,
    search: &dyn SearchService,
    page_size: PageSize,
    retry: &RetryConfig,
) -> Result<PipelineState, PipelineError> {
    let request = SearchRequest {
        concept: state.concept().clone(),
        page_size,
    };
    let response = execute_with_retry(retry, "search", || search.search(&request)).await?;
    tracing::info!(
        papers = response.papers.len(),
        total_matches = ?response.meta.total_matches,
        "Search complete"
    );
    state.with_raw_response(response)
}

/// Analysis Stage: aggregates statistics and renders the three charts.
///
/// Charts are written in [`ChartKind::ALL`] order; the first failed write
/// aborts the stage.
#[tracing::instrument(name = "analysis_stage", skip_all, fields(concept = %state.concept()))]
pub fn analysis_stage(
    state: PipelineState,
    renderer: &dyn ChartRenderer,
    output_dir: &Path,
    top_n: usize,
) -> Result<PipelineState, PipelineError> {
    let stats = ResearchStats::from_response(state.raw_response(), top_n);
    let charts = ChartSet::in_dir(output_dir, state.concept());

    for kind in ChartKind::ALL {
        let spec = ChartSpec::for_stats(kind, &stats);
        renderer.render(&spec, charts.path(kind))?;
    }

    tracing::info!(
        total_papers = stats.total_papers,
        years = stats.papers_by_year.len(),
        institutions = stats.top_institutions.len(),
        authors = stats.top_authors.len(),
        "Analysis complete"
    );
    state.with_analysis(stats, charts)
}

/// Format Stage: renders the statistics as the research-data text block.
pub fn format_stage(state: PipelineState) -> Result<PipelineState, PipelineError> {
    let report = match state.stats() {
        Some(stats) => format_report(stats),
        None => {
            return Err(PipelineError::StageOrder {
                stage: "format",
                field: "stats",
            })
        }
    };
    state.with_formatted_result(report)
}

/// Insight Stage: asks the completion service for an investment assessment.
#[tracing::instrument(name = "insight_stage", skip_all, fields(concept = %state.concept()))]
pub async fn insight_stage(
    state: PipelineState,
    completion: &dyn CompletionService,
    retry: &RetryConfig,
) -> Result<PipelineState, PipelineError> {
    let research_data = state.formatted_result().ok_or(PipelineError::StageOrder {
        stage: "insight",
        field: "formatted_result",
    })?;
    let request = insight_request(state.concept(), research_data);

    let response = execute_with_retry(retry, "completion", || completion.complete(&request)).await?;
    tracing::info!(
        model = response.model.as_deref().unwrap_or("unknown"),
        chars = response.text.len(),
        "Insight received"
    );
    state.with_investment_insights(response.text)
}
