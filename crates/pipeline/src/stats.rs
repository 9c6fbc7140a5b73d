//! Aggregate statistics derived from search results.
//!
//! Everything here is a pure function of a [`SearchResponse`]. An absent or
//! empty response yields zero counts and empty rankings, never an error.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{PaperRecord, SearchResponse};

/// Default bound on every ranked list (top papers, institutions, authors).
pub const DEFAULT_TOP_N: usize = 5;

/// A highly cited publication, as listed in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitedPaper {
    pub title: String,
    pub citations: u64,
    pub year: Option<i32>,
    pub doi: Option<String>,
}

/// A name (institution or author) with the number of papers it appears on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedName {
    pub name: String,
    pub paper_count: usize,
}

impl RankedName {
    /// Returns the entry as a `(name, count)` pair.
    pub fn as_pair(&self) -> (&str, usize) {
        (&self.name, self.paper_count)
    }
}

/// Aggregate statistics for one concept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchStats {
    /// Number of records in the search response.
    pub total_papers: usize,
    /// Total matches in the search service's index, when reported.
    pub total_matches: Option<u64>,
    /// Paper count per publication year, ascending. Records without a year
    /// are not represented.
    pub papers_by_year: BTreeMap<i32, usize>,
    /// Most cited papers, citations descending.
    pub top_cited_papers: Vec<CitedPaper>,
    /// Institutions ranked by paper count.
    pub top_institutions: Vec<RankedName>,
    /// Authors ranked by paper count.
    pub top_authors: Vec<RankedName>,
}

impl ResearchStats {
    /// Computes statistics from a raw search response.
    ///
    /// `top_n` bounds each ranked list. A `top_n` of zero yields empty
    /// rankings while counts are still computed.
    pub fn from_response(response: Option<&SearchResponse>, top_n: usize) -> Self {
        let Some(response) = response else {
            return Self::default();
        };
        let papers = &response.papers;

        let stats = Self {
            total_papers: papers.len(),
            total_matches: response.meta.total_matches,
            papers_by_year: papers_by_year(papers),
            top_cited_papers: top_cited(papers, top_n),
            top_institutions: rank_names(papers.iter().map(|p| p.institutions.as_slice()), top_n),
            top_authors: rank_names(papers.iter().map(|p| p.authors.as_slice()), top_n),
        };

        tracing::debug!(
            total_papers = stats.total_papers,
            years = stats.papers_by_year.len(),
            institutions = stats.top_institutions.len(),
            authors = stats.top_authors.len(),
            "Computed research statistics"
        );

        stats
    }

    /// Sum of all per-year counts.
    pub fn papers_with_year(&self) -> usize {
        self.papers_by_year.values().sum()
    }
}

fn papers_by_year(papers: &[PaperRecord]) -> BTreeMap<i32, usize> {
    let mut by_year = BTreeMap::new();
    for year in papers.iter().filter_map(|p| p.year) {
        *by_year.entry(year).or_insert(0) += 1;
    }
    by_year
}

fn top_cited(papers: &[PaperRecord], top_n: usize) -> Vec<CitedPaper> {
    let mut ranked: Vec<&PaperRecord> = papers.iter().collect();
    // `sort_by` is stable: equal citation counts keep the service's order.
    ranked.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));
    ranked
        .into_iter()
        .take(top_n)
        .map(|p| CitedPaper {
            title: p.title.clone(),
            citations: p.citation_count,
            year: p.year,
            doi: p.doi.clone(),
        })
        .collect()
}

/// Counts, per distinct name, the number of records listing it.
///
/// A name repeated within one record counts once for that record. Blank names
/// are ignored. Ties keep first-seen order.
fn rank_names<'a>(
    per_record: impl Iterator<Item = &'a [String]>,
    top_n: usize,
) -> Vec<RankedName> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<RankedName> = Vec::new();

    for names in per_record {
        let mut seen: HashSet<&str> = HashSet::new();
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            if !seen.insert(name) {
                continue;
            }
            match position.get(name) {
                Some(&idx) => counts[idx].paper_count += 1,
                None => {
                    position.insert(name, counts.len());
                    counts.push(RankedName {
                        name: name.to_string(),
                        paper_count: 1,
                    });
                }
            }
        }
    }

    counts.sort_by(|a, b| b.paper_count.cmp(&a.paper_count));
    counts.truncate(top_n);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn paper(citations: u64, year: Option<i32>) -> PaperRecord {
        PaperRecord {
            title: format!("paper-{citations}"),
            citation_count: citations,
            year,
            ..PaperRecord::default()
        }
    }

    fn with_institutions(names: &[&str]) -> PaperRecord {
        PaperRecord {
            institutions: names.iter().map(|n| n.to_string()).collect(),
            ..PaperRecord::default()
        }
    }

    #[test]
    fn absent_or_empty_response_yields_zeroed_stats() {
        for stats in [
            ResearchStats::from_response(None, DEFAULT_TOP_N),
            ResearchStats::from_response(Some(&SearchResponse::default()), DEFAULT_TOP_N),
        ] {
            assert_eq!(stats.total_papers, 0);
            assert!(stats.papers_by_year.is_empty());
            assert!(stats.top_cited_papers.is_empty());
            assert!(stats.top_institutions.is_empty());
            assert!(stats.top_authors.is_empty());
        }
    }

    #[test]
    fn top_cited_sorted_descending() {
        let response = SearchResponse {
            papers: vec![paper(5, None), paper(9, None), paper(1, None)],
            ..SearchResponse::default()
        };
        let stats = ResearchStats::from_response(Some(&response), 10);
        let citations: Vec<u64> = stats.top_cited_papers.iter().map(|p| p.citations).collect();
        assert_eq!(citations, vec![9, 5, 1]);
    }

    #[test]
    fn top_cited_ties_keep_input_order_and_respect_bound() {
        let mut a = paper(3, None);
        a.title = "a".into();
        let mut b = paper(3, None);
        b.title = "b".into();
        let response = SearchResponse {
            papers: vec![paper(1, None), a, b, paper(7, None)],
            ..SearchResponse::default()
        };
        let stats = ResearchStats::from_response(Some(&response), 3);
        let titles: Vec<&str> = stats.top_cited_papers.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["paper-7", "a", "b"]);
    }

    #[test]
    fn institutions_are_counted_per_paper() {
        let response = SearchResponse {
            papers: vec![with_institutions(&["A", "B"]), with_institutions(&["A"])],
            ..SearchResponse::default()
        };
        let stats = ResearchStats::from_response(Some(&response), DEFAULT_TOP_N);
        let pairs: Vec<(&str, usize)> = stats.top_institutions.iter().map(RankedName::as_pair).collect();
        assert_eq!(pairs, vec![("A", 2), ("B", 1)]);
    }

    #[test]
    fn repeated_and_blank_names_within_a_paper_count_once() {
        let response = SearchResponse {
            papers: vec![
                with_institutions(&["MIT", "MIT", " ", ""]),
                with_institutions(&["Caltech"]),
                with_institutions(&["Caltech", "MIT"]),
            ],
            ..SearchResponse::default()
        };
        let stats = ResearchStats::from_response(Some(&response), DEFAULT_TOP_N);
        let pairs: Vec<(&str, usize)> = stats.top_institutions.iter().map(RankedName::as_pair).collect();
        // Tie broken by first appearance: MIT was seen before Caltech.
        assert_eq!(pairs, vec![("MIT", 2), ("Caltech", 2)]);
    }

    #[test]
    fn years_are_sparse_and_ascending() {
        let response = SearchResponse {
            papers: vec![paper(1, Some(2023)), paper(1, Some(2019)), paper(1, None), paper(1, Some(2023))],
            ..SearchResponse::default()
        };
        let stats = ResearchStats::from_response(Some(&response), DEFAULT_TOP_N);
        let years: Vec<(i32, usize)> = stats.papers_by_year.iter().map(|(y, c)| (*y, *c)).collect();
        assert_eq!(years, vec![(2019, 1), (2023, 2)]);
        assert_eq!(stats.total_papers, 4);
        assert_eq!(stats.papers_with_year(), 3);
    }

    #[test]
    fn quantum_computing_scenario() {
        let response = SearchResponse {
            papers: vec![
                PaperRecord {
                    title: "Later work".into(),
                    year: Some(2023),
                    citation_count: 3,
                    ..PaperRecord::default()
                },
                PaperRecord {
                    title: "Seminal work".into(),
                    year: Some(2022),
                    citation_count: 10,
                    ..PaperRecord::default()
                },
            ],
            ..SearchResponse::default()
        };
        let stats = ResearchStats::from_response(Some(&response), DEFAULT_TOP_N);
        assert_eq!(stats.total_papers, 2);
        assert_eq!(stats.papers_by_year, BTreeMap::from([(2022, 1), (2023, 1)]));
        assert_eq!(stats.top_cited_papers[0].title, "Seminal work");
        assert_eq!(stats.top_cited_papers[0].year, Some(2022));
    }

    fn arb_paper() -> impl Strategy<Value = PaperRecord> {
        (
            0u64..10_000,
            proptest::option::of(1990i32..2030),
            proptest::collection::vec("[A-E]", 0..4),
            proptest::collection::vec("[a-e]", 0..4),
        )
            .prop_map(|(citation_count, year, institutions, authors)| PaperRecord {
                title: String::new(),
                year,
                citation_count,
                authors,
                institutions,
                doi: None,
            })
    }

    proptest! {
        #[test]
        fn year_counts_cover_every_dated_paper(papers in proptest::collection::vec(arb_paper(), 0..60)) {
            let dated = papers.iter().filter(|p| p.year.is_some()).count();
            let response = SearchResponse { papers, ..SearchResponse::default() };
            let stats = ResearchStats::from_response(Some(&response), DEFAULT_TOP_N);
            prop_assert_eq!(stats.papers_with_year(), dated);
            prop_assert_eq!(stats.total_papers, response.papers.len());
        }

        #[test]
        fn rankings_are_bounded_and_descending(
            papers in proptest::collection::vec(arb_paper(), 0..60),
            top_n in 0usize..8,
        ) {
            let response = SearchResponse { papers, ..SearchResponse::default() };
            let stats = ResearchStats::from_response(Some(&response), top_n);

            prop_assert!(stats.top_cited_papers.len() <= top_n);
            prop_assert!(stats.top_cited_papers.windows(2).all(|w| w[0].citations >= w[1].citations));
            for ranking in [&stats.top_institutions, &stats.top_authors] {
                prop_assert!(ranking.len() <= top_n);
                prop_assert!(ranking.windows(2).all(|w| w[0].paper_count >= w[1].paper_count));
                prop_assert!(ranking.iter().all(|r| r.paper_count <= stats.total_papers));
            }
        }
    }
}
