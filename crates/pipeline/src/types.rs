//! Shared value types for the research pipeline.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (page sizes are bounded, paper records
//! default every missing field) and cross the port boundaries defined in
//! [`crate::ports`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Concept;

// ---------------------------------------------------------------------------
// Search request / response
// ---------------------------------------------------------------------------

/// Number of records requested from the search service in a single page.
///
/// Bounded to `1..=200`, the largest page the bibliographic search service
/// accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageSize(u32);

impl PageSize {
    /// Largest accepted page size.
    pub const MAX: u32 = 200;

    /// Creates a [`PageSize`], returning `None` if `value` is outside `1..=200`.
    #[must_use]
    pub fn new(value: u32) -> Option<Self> {
        if (1..=Self::MAX).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the underlying integer value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(50)
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// A request to the bibliographic search service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The concept to search for.
    pub concept: Concept,
    /// Maximum number of records to return.
    pub page_size: PageSize,
}

/// One publication returned by the search service.
///
/// Every field defaults when the service omits it, so a sparse record never
/// fails decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperRecord {
    /// Publication title (empty when unknown).
    pub title: String,
    /// Publication year, if known.
    pub year: Option<i32>,
    /// Number of citations received.
    pub citation_count: u64,
    /// Author display names, one per authorship.
    pub authors: Vec<String>,
    /// Institution display names across all authorships.
    pub institutions: Vec<String>,
    /// DOI URL or bare DOI, if known.
    pub doi: Option<String>,
}

/// Pagination metadata reported by the search service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchMeta {
    /// Total number of works matching the query in the service's index.
    pub total_matches: Option<u64>,
    /// Page number of this response.
    pub page: Option<u32>,
    /// Page size the service applied.
    pub page_size: Option<u32>,
}

/// The raw response of the Query Stage, normalised from the service's wire
/// format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    /// Returned publications, in the order the service ranked them.
    pub papers: Vec<PaperRecord>,
    /// Pagination metadata.
    pub meta: SearchMeta,
}

// ---------------------------------------------------------------------------
// Completion request / response
// ---------------------------------------------------------------------------

/// A request to the language-model completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Fixed instruction describing the assistant's role.
    pub system_instruction: String,
    /// The task prompt, including the research data.
    pub user_prompt: String,
}

/// The completion service's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text, unmodified.
    pub text: String,
    /// Model that produced the text, when the service reports it.
    pub model: Option<String>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Milliseconds elapsed between this timestamp and now (zero if in the future).
    pub fn elapsed_ms(self) -> u64 {
        (Utc::now() - self.0).num_milliseconds().max(0) as u64
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_bounded() {
        assert!(PageSize::new(0).is_none());
        assert!(PageSize::new(201).is_none());
        assert_eq!(PageSize::new(200).map(PageSize::as_u32), Some(200));
        assert_eq!(PageSize::default().as_u32(), 50);
    }

    #[test]
    fn missing_keys_decode_to_defaults() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.papers.is_empty());
        assert_eq!(response.meta, SearchMeta::default());

        let response: SearchResponse =
            serde_json::from_str(r#"{"papers":[{"title":"Only a title"}]}"#).unwrap();
        let paper = &response.papers[0];
        assert_eq!(paper.title, "Only a title");
        assert_eq!(paper.year, None);
        assert_eq!(paper.citation_count, 0);
        assert!(paper.authors.is_empty());
    }
}
