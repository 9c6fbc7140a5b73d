//! investor-intel completion provider infrastructure adapter.
//!
//! Implements the [`pipeline::CompletionService`] trait for Azure OpenAI chat
//! completions. Other providers are added as new `impl` blocks in this crate
//! without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, response
//! parsing, and status classification live here. The [`pipeline`] crate sees
//! only [`pipeline::CompletionService`]. Retry decisions are made by the
//! orchestrator from [`pipeline::PipelineError::retry_policy`].

mod azure;
mod config;

pub use azure::AzureOpenAiProvider;
pub use config::AzureOpenAiConfig;
