//! Port traits implemented by the infrastructure crates.
//!
//! The pipeline sees only these traits. HTTP transport, wire formats, and
//! image encoding live in `openalex`, `llm`, and `charts` respectively.

use std::path::Path;

use async_trait::async_trait;

use crate::{ChartSpec, CompletionRequest, CompletionResponse, PipelineError, SearchRequest, SearchResponse};

/// The bibliographic search service.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Fetches one page of records matching the request's concept.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ExternalService`] with
    /// [`crate::ServiceKind::Search`] on network failure, non-success status,
    /// or a payload that cannot be decoded.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, PipelineError>;
}

/// The language-model completion service.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends the system instruction and prompt, returning the model's text.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ExternalService`] with
    /// [`crate::ServiceKind::Completion`] on service, authentication, or
    /// rate-limit failure, or when the response carries no text.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, PipelineError>;
}

/// Writes chart images.
pub trait ChartRenderer: Send + Sync {
    /// Draws `spec` and writes the image to `path`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ChartRender`] when the file cannot be encoded or
    /// written.
    fn render(&self, spec: &ChartSpec, path: &Path) -> Result<(), PipelineError>;
}
