//! investor-intel bibliographic search adapter.
//!
//! Implements the [`pipeline::SearchService`] trait over the OpenAlex works
//! API (`GET /works?search=…`). Results are requested most-cited first so the
//! bounded page holds the most influential work on the concept.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, query encoding, status handling, and
//! decoding of the OpenAlex wire format all live here. The [`pipeline`] crate
//! sees only [`pipeline::SearchService`] and [`pipeline::SearchResponse`].

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{
    PipelineError, SearchRequest, SearchResponse, SearchService, ServiceFailure, ServiceKind,
};
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};

/// Public OpenAlex API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openalex.org";

/// Connection settings for [`OpenAlexClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAlexConfig {
    /// API root, without the `/works` path.
    pub base_url: String,
    /// Contact address sent as `mailto`, which routes requests to OpenAlex's
    /// polite pool.
    pub mailto: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for OpenAlexConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            mailto: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// [`SearchService`] backed by the OpenAlex works endpoint.
#[derive(Debug, Clone)]
pub struct OpenAlexClient {
    http: Client,
    base_url: String,
    mailto: Option<String>,
}

impl OpenAlexClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: OpenAlexConfig) -> Result<Self, PipelineError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("investor-intel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipelineError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            mailto: config.mailto,
        })
    }

    fn works_url(&self) -> String {
        format!("{}/works", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SearchService for OpenAlexClient {
    #[tracing::instrument(skip_all, fields(concept = %request.concept, page_size = %request.page_size))]
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, PipelineError> {
        let url = self.works_url();
        let mut query: Vec<(&str, String)> = vec![
            ("search", request.concept.to_string()),
            ("per_page", request.page_size.to_string()),
            ("sort", "cited_by_count:desc".to_string()),
        ];
        if let Some(mailto) = &self.mailto {
            query.push(("mailto", mailto.clone()));
        }

        tracing::debug!(%url, "Querying OpenAlex");
        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(response).await);
        }

        let body = response.text().await.map_err(transport_error)?;
        let works = wire::WorksResponse::from_json(&body).map_err(|e| {
            PipelineError::external(
                ServiceKind::Search,
                ServiceFailure::MalformedPayload,
                format!("Failed to parse OpenAlex response: {e}"),
            )
        })?;

        let response = works.into_search_response();
        tracing::info!(
            %status,
            papers = response.papers.len(),
            total_matches = ?response.meta.total_matches,
            "OpenAlex search completed"
        );
        Ok(response)
    }
}

fn transport_error(e: reqwest::Error) -> PipelineError {
    let failure = if e.is_timeout() {
        ServiceFailure::Timeout
    } else {
        ServiceFailure::Unreachable
    };
    PipelineError::external(ServiceKind::Search, failure, format!("OpenAlex request failed: {e}"))
}

async fn status_error(response: Response) -> PipelineError {
    let status = response.status();
    let failure = if status == StatusCode::TOO_MANY_REQUESTS {
        ServiceFailure::RateLimited {
            retry_after: response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
        }
    } else {
        ServiceFailure::Status(status.as_u16())
    };
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, "OpenAlex returned an error status");
    PipelineError::external(
        ServiceKind::Search,
        failure,
        format!("OpenAlex API request failed with status {status}: {body}"),
    )
}
