//! Core research-pipeline domain for investor-intel.
//!
//! This crate contains every domain concept, identifier, value type, and error
//! used throughout the pipeline, plus the pure computations (aggregation,
//! report formatting, prompt construction) the stages rely on. Infrastructure
//! crates implement the traits defined in [`ports`]; they never add domain
//! rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`Concept`, `RunId`, `DeploymentName`) |
//! | [`types`] | Search/completion request and response values, `PageSize`, `Timestamp` |
//! | [`state`] | `PipelineState`, the write-once record threaded through stages |
//! | [`stats`] | `ResearchStats` aggregation |
//! | [`report`] | Deterministic text rendering of statistics |
//! | [`insight`] | Investment-insight prompt construction |
//! | [`charts`] | Chart descriptions and file naming |
//! | [`ports`] | `SearchService`, `CompletionService`, `ChartRenderer` |
//! | [`errors`] | `PipelineError` and retry policy |

pub mod charts;
pub mod errors;
pub mod identifiers;
pub mod insight;
pub mod ports;
pub mod report;
pub mod state;
pub mod stats;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use charts::{ChartKind, ChartPoint, ChartSet, ChartSpec, ChartStyle};
pub use errors::{PipelineError, RetryPolicy, ServiceFailure, ServiceKind};
pub use identifiers::{Concept, DeploymentName, RunId};
pub use insight::{insight_request, SYSTEM_INSTRUCTION};
pub use ports::{ChartRenderer, CompletionService, SearchService};
pub use report::{format_report, group_thousands};
pub use state::PipelineState;
pub use stats::{CitedPaper, RankedName, ResearchStats, DEFAULT_TOP_N};
pub use types::{
    CompletionRequest, CompletionResponse, PageSize, PaperRecord, SearchMeta, SearchRequest,
    SearchResponse, Timestamp,
};
