//! investor-intel pipeline stages and executor.
//!
//! This crate provides the four stage functions (Query, Analysis, Format,
//! Insight), the bounded retry wrapper applied to the two network calls, and
//! the [`PipelineExecutor`] that composes the stages in order for one concept.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Stages sequence calls between the pure
//! computations in the [`pipeline`] crate and the port traits implemented by
//! the infrastructure crates (`openalex`, `llm`, `charts`). They contain no
//! domain rules of their own.

pub mod executor;
pub mod retry;
pub mod stages;

pub use executor::{ExecutorSettings, PipelineExecutor, PipelineOutcome};
pub use retry::{execute_with_retry, RetryConfig};
pub use stages::{analysis_stage, format_stage, insight_stage, query_stage};
