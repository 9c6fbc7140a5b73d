//! Top-level error and retry-policy types for the research pipeline.
//!
//! [`PipelineError`] covers every condition that aborts a run: external service
//! failures, chart output failures, invalid configuration, and state-machine
//! violations. There are no partial results; any error ends the run for the
//! current concept.
//!
//! [`RetryPolicy`] is a cross-cutting concern: the orchestrator asks each error
//! for its policy before deciding whether to re-issue a network call.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// ## Rules
///
/// - `Retryable` errors: connection failures, timeouts, 408/429/5xx responses.
/// - `NonRetryable` errors: authentication failure, malformed payloads, empty
///   completions, chart output failures, invalid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt (e.g. from a `Retry-After`
        /// header). `None` means apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried; the run is aborted.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// External services
// ---------------------------------------------------------------------------

/// The external collaborator that produced an [`PipelineError::ExternalService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// The bibliographic search service.
    Search,
    /// The language-model completion service.
    Completion,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceKind::Search => write!(f, "search"),
            ServiceKind::Completion => write!(f, "completion"),
        }
    }
}

/// How an external service call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceFailure {
    /// The service could not be reached (DNS, connect, TLS, reset).
    Unreachable,
    /// The request did not complete within the client timeout.
    Timeout,
    /// The service answered with a non-success status code.
    Status(u16),
    /// The credential was rejected (HTTP 401/403).
    Authentication,
    /// The service is throttling requests (HTTP 429).
    RateLimited {
        /// Delay requested by the service, if it sent one.
        retry_after: Option<Duration>,
    },
    /// The response body could not be decoded into the expected shape.
    MalformedPayload,
    /// The service answered successfully but with no usable content.
    EmptyResponse,
}

impl std::fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceFailure::Unreachable => write!(f, "unreachable"),
            ServiceFailure::Timeout => write!(f, "timed out"),
            ServiceFailure::Status(code) => write!(f, "status {code}"),
            ServiceFailure::Authentication => write!(f, "authentication failed"),
            ServiceFailure::RateLimited { .. } => write!(f, "rate limited"),
            ServiceFailure::MalformedPayload => write!(f, "malformed payload"),
            ServiceFailure::EmptyResponse => write!(f, "empty response"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline-level errors
// ---------------------------------------------------------------------------

/// Errors that abort a pipeline run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The search or completion service was unreachable, answered with a
    /// non-success status, or returned a payload that could not be used.
    ///
    /// Produced by: Query Stage, Insight Stage.
    #[error("{service} service error ({failure}): {message}")]
    ExternalService {
        /// Which collaborator failed.
        service: ServiceKind,
        /// Failure classification, used for retry decisions.
        failure: ServiceFailure,
        /// Human-readable detail (status text, decode error, etc.).
        message: String,
    },

    /// A chart image could not be written.
    ///
    /// Produced by: Analysis Stage. Fatal to the run.
    #[error("Failed to render chart to '{}': {message}", .path.display())]
    ChartRender {
        /// Target file of the failed write.
        path: PathBuf,
        /// Description of the I/O or encoding failure.
        message: String,
    },

    /// The runtime configuration is missing or invalid.
    ///
    /// Produced at load time; the program never starts with an invalid config.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A stage ran before the stage that populates its input.
    #[error("Stage '{stage}' requires '{field}', which has not been populated")]
    StageOrder {
        /// The stage that was invoked.
        stage: &'static str,
        /// The missing state field.
        field: &'static str,
    },

    /// A stage tried to overwrite a state field that is already populated.
    #[error("Pipeline state field '{field}' is already populated")]
    FieldAlreadySet {
        /// The state field that was already set.
        field: &'static str,
    },
}

impl PipelineError {
    /// Convenience constructor for [`PipelineError::ExternalService`].
    pub fn external(
        service: ServiceKind,
        failure: ServiceFailure,
        message: impl Into<String>,
    ) -> Self {
        Self::ExternalService {
            service,
            failure,
            message: message.into(),
        }
    }

    /// Convenience constructor for [`PipelineError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns whether the failed operation may be re-issued.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            PipelineError::ExternalService { failure, .. } => match failure {
                ServiceFailure::Unreachable | ServiceFailure::Timeout => {
                    RetryPolicy::Retryable { after: None }
                }
                ServiceFailure::RateLimited { retry_after } => RetryPolicy::Retryable {
                    after: *retry_after,
                },
                ServiceFailure::Status(code) if matches!(*code, 408 | 500..=599) => {
                    RetryPolicy::Retryable { after: None }
                }
                _ => RetryPolicy::NonRetryable,
            },
            _ => RetryPolicy::NonRetryable,
        }
    }
}
