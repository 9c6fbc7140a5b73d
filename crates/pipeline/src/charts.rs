//! Chart descriptions derived from [`ResearchStats`].
//!
//! The domain decides *what* each chart shows and where it is written; the
//! [`crate::ChartRenderer`] port decides how pixels are produced.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Concept, ResearchStats};

/// The three charts produced by the Analysis Stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Papers per year, as a line.
    Trend,
    /// Top institutions by paper count, as bars.
    Institutions,
    /// Top authors by paper count, as bars.
    Authors,
}

impl ChartKind {
    /// All chart kinds in rendering order.
    pub const ALL: [ChartKind; 3] = [ChartKind::Trend, ChartKind::Institutions, ChartKind::Authors];

    /// Short chart name used in file names and output listings.
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Trend => "trend",
            ChartKind::Institutions => "institutions",
            ChartKind::Authors => "authors",
        }
    }

    /// File name for this chart: `{concept stem}_{kind}_chart.png`.
    pub fn file_name(self, concept: &Concept) -> String {
        format!("{}_{}_chart.png", concept.file_stem(), self.as_str())
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the data points of a chart are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStyle {
    /// Points joined by a line, left to right, with markers.
    Line,
    /// One horizontal bar per point, first point at the top.
    HorizontalBars,
}

/// A single labelled value on a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    /// Position along the category axis: the year for trend charts, the rank
    /// index for bar charts.
    pub position: f64,
    pub value: f64,
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub style: ChartStyle,
    /// Points in display order. May be empty.
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    /// Describes the chart of `kind` for `stats`.
    pub fn for_stats(kind: ChartKind, stats: &ResearchStats) -> Self {
        match kind {
            ChartKind::Trend => Self {
                kind,
                title: "Research Trend Over Time".into(),
                x_label: "Year".into(),
                y_label: "Number of Papers".into(),
                style: ChartStyle::Line,
                points: stats
                    .papers_by_year
                    .iter()
                    .map(|(year, count)| ChartPoint {
                        label: year.to_string(),
                        position: f64::from(*year),
                        value: *count as f64,
                    })
                    .collect(),
            },
            ChartKind::Institutions => Self {
                kind,
                title: "Top Research Institutions".into(),
                x_label: "Number of Papers".into(),
                y_label: "Institution".into(),
                style: ChartStyle::HorizontalBars,
                points: ranked_points(&stats.top_institutions),
            },
            ChartKind::Authors => Self {
                kind,
                title: "Top Authors in the Field".into(),
                x_label: "Number of Papers".into(),
                y_label: "Author".into(),
                style: ChartStyle::HorizontalBars,
                points: ranked_points(&stats.top_authors),
            },
        }
    }

    /// Largest value among the points, or `0.0` when there are none.
    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }
}

fn ranked_points(ranking: &[crate::RankedName]) -> Vec<ChartPoint> {
    ranking
        .iter()
        .enumerate()
        .map(|(rank, r)| ChartPoint {
            label: r.name.clone(),
            position: rank as f64,
            value: r.paper_count as f64,
        })
        .collect()
}

/// Paths of the three chart files written for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSet {
    pub trend: PathBuf,
    pub institutions: PathBuf,
    pub authors: PathBuf,
}

impl ChartSet {
    /// Paths for `concept` inside `output_dir`.
    pub fn in_dir(output_dir: &Path, concept: &Concept) -> Self {
        Self {
            trend: output_dir.join(ChartKind::Trend.file_name(concept)),
            institutions: output_dir.join(ChartKind::Institutions.file_name(concept)),
            authors: output_dir.join(ChartKind::Authors.file_name(concept)),
        }
    }

    /// Path of the chart of `kind`.
    pub fn path(&self, kind: ChartKind) -> &Path {
        match kind {
            ChartKind::Trend => &self.trend,
            ChartKind::Institutions => &self.institutions,
            ChartKind::Authors => &self.authors,
        }
    }

    /// Iterates `(kind, path)` in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = (ChartKind, &Path)> {
        ChartKind::ALL.into_iter().map(move |kind| (kind, self.path(kind)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::RankedName;

    #[test]
    fn file_names_follow_concept_and_kind() {
        let concept = Concept::new("quantum computing").unwrap();
        let set = ChartSet::in_dir(Path::new("out"), &concept);
        assert_eq!(set.trend, Path::new("out/quantum_computing_trend_chart.png"));
        assert_eq!(
            set.institutions,
            Path::new("out/quantum_computing_institutions_chart.png")
        );
        assert_eq!(set.authors, Path::new("out/quantum_computing_authors_chart.png"));

        let kinds: Vec<ChartKind> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());
    }

    #[test]
    fn trend_points_are_chronological() {
        let stats = ResearchStats {
            papers_by_year: BTreeMap::from([(2024, 7), (2019, 2)]),
            ..ResearchStats::default()
        };
        let spec = ChartSpec::for_stats(ChartKind::Trend, &stats);
        let labels: Vec<&str> = spec.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["2019", "2024"]);
        assert_eq!(spec.points[1].position, 2024.0);
        assert_eq!(spec.max_value(), 7.0);
        assert_eq!(spec.style, ChartStyle::Line);
    }

    #[test]
    fn bar_points_keep_rank_order() {
        let stats = ResearchStats {
            top_authors: vec![
                RankedName { name: "Ada".into(), paper_count: 4 },
                RankedName { name: "Grace".into(), paper_count: 2 },
            ],
            ..ResearchStats::default()
        };
        let spec = ChartSpec::for_stats(ChartKind::Authors, &stats);
        assert_eq!(spec.points[0].label, "Ada");
        assert_eq!(spec.points[1].value, 2.0);
        assert!(ChartSpec::for_stats(ChartKind::Institutions, &stats).points.is_empty());
    }
}
