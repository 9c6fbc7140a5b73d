//! The record threaded through the four pipeline stages.
//!
//! [`PipelineState`] is passed by value: each stage consumes it and returns it
//! with exactly one more field populated. Fields are write-once; a setter
//! called on a populated field returns [`PipelineError::FieldAlreadySet`]
//! rather than silently replacing earlier output.

use serde::{Deserialize, Serialize};

use crate::{ChartSet, Concept, PipelineError, ResearchStats, RunId, SearchResponse, Timestamp};

/// Per-run pipeline state. Created once per concept and discarded after the
/// result is presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    run_id: RunId,
    started_at: Timestamp,
    concept: Concept,
    raw_response: Option<SearchResponse>,
    stats: Option<ResearchStats>,
    chart_paths: Option<ChartSet>,
    formatted_result: Option<String>,
    investment_insights: Option<String>,
}

/// Stores `value` into an empty slot, or reports the slot as already populated.
fn set_once<T>(slot: &mut Option<T>, value: T, field: &'static str) -> Result<(), PipelineError> {
    if slot.is_some() {
        return Err(PipelineError::FieldAlreadySet { field });
    }
    *slot = Some(value);
    Ok(())
}

impl PipelineState {
    /// Creates a fresh state for `concept` with a new run identifier.
    pub fn new(concept: Concept) -> Self {
        Self {
            run_id: RunId::new_random(),
            started_at: Timestamp::now(),
            concept,
            raw_response: None,
            stats: None,
            chart_paths: None,
            formatted_result: None,
            investment_insights: None,
        }
    }

    /// Identifier of this run, recorded on the `run` span.
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// When the state was created.
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// The concept being researched.
    pub fn concept(&self) -> &Concept {
        &self.concept
    }

    /// Search results, once the Query Stage has run.
    pub fn raw_response(&self) -> Option<&SearchResponse> {
        self.raw_response.as_ref()
    }

    /// Aggregate statistics, once the Analysis Stage has run.
    pub fn stats(&self) -> Option<&ResearchStats> {
        self.stats.as_ref()
    }

    /// Paths of the rendered charts, once the Analysis Stage has run.
    pub fn chart_paths(&self) -> Option<&ChartSet> {
        self.chart_paths.as_ref()
    }

    /// The research-data text block, once the Format Stage has run.
    pub fn formatted_result(&self) -> Option<&str> {
        self.formatted_result.as_deref()
    }

    /// The completion service's assessment, once the Insight Stage has run.
    pub fn investment_insights(&self) -> Option<&str> {
        self.investment_insights.as_deref()
    }

    /// Records the Query Stage output.
    pub fn with_raw_response(mut self, response: SearchResponse) -> Result<Self, PipelineError> {
        set_once(&mut self.raw_response, response, "raw_response")?;
        Ok(self)
    }

    /// Records the Analysis Stage output: statistics and the rendered charts.
    pub fn with_analysis(
        mut self,
        stats: ResearchStats,
        charts: ChartSet,
    ) -> Result<Self, PipelineError> {
        if self.chart_paths.is_some() {
            return Err(PipelineError::FieldAlreadySet { field: "chart_paths" });
        }
        set_once(&mut self.stats, stats, "stats")?;
        self.chart_paths = Some(charts);
        Ok(self)
    }

    /// Records the Format Stage output. Requires statistics.
    pub fn with_formatted_result(mut self, text: String) -> Result<Self, PipelineError> {
        if self.stats.is_none() {
            return Err(PipelineError::StageOrder {
                stage: "format",
                field: "stats",
            });
        }
        set_once(&mut self.formatted_result, text, "formatted_result")?;
        Ok(self)
    }

    /// Records the Insight Stage output. Requires the formatted result.
    pub fn with_investment_insights(mut self, text: String) -> Result<Self, PipelineError> {
        if self.formatted_result.is_none() {
            return Err(PipelineError::StageOrder {
                stage: "insight",
                field: "formatted_result",
            });
        }
        set_once(&mut self.investment_insights, text, "investment_insights")?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn concept() -> Concept {
        Concept::new("fusion energy").unwrap()
    }

    #[test]
    fn fields_fill_in_pipeline_order() {
        let state = PipelineState::new(concept());
        assert!(state.raw_response().is_none());

        let charts = ChartSet::in_dir(Path::new("."), state.concept());
        let state = state
            .with_raw_response(SearchResponse::default())
            .unwrap()
            .with_analysis(ResearchStats::default(), charts.clone())
            .unwrap()
            .with_formatted_result("report".into())
            .unwrap()
            .with_investment_insights("insight".into())
            .unwrap();

        assert_eq!(state.concept().as_str(), "fusion energy");
        assert_eq!(state.chart_paths(), Some(&charts));
        assert_eq!(state.formatted_result(), Some("report"));
        assert_eq!(state.investment_insights(), Some("insight"));
    }

    #[test]
    fn populated_fields_cannot_be_overwritten() {
        let state = PipelineState::new(concept())
            .with_raw_response(SearchResponse::default())
            .unwrap();
        let err = state.with_raw_response(SearchResponse::default()).unwrap_err();
        assert_eq!(err, PipelineError::FieldAlreadySet { field: "raw_response" });
    }

    #[test]
    fn later_stages_require_earlier_output() {
        let err = PipelineState::new(concept())
            .with_formatted_result("too early".into())
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::StageOrder {
                stage: "format",
                field: "stats"
            }
        );

        let err = PipelineState::new(concept())
            .with_investment_insights("too early".into())
            .unwrap_err();
        assert!(matches!(err, PipelineError::StageOrder { stage: "insight", .. }));
    }
}
