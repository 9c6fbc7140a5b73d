//! Human-readable rendering of [`ResearchStats`].
//!
//! [`format_report`] is a pure function: the same statistics always produce
//! byte-identical text, and empty aggregates render as empty sections.

use crate::{RankedName, ResearchStats};

/// Renders statistics as the structured text block shown to the user and
/// sent to the completion service.
pub fn format_report(stats: &ResearchStats) -> String {
    let mut out = String::new();

    out.push_str("📊 Market Research Insights\n");

    out.push_str(&format!(
        "\n🔍 Found {} academic papers on this topic",
        group_thousands(stats.total_papers as u64)
    ));
    if let Some(total) = stats.total_matches {
        out.push_str(&format!(" ({} matching works indexed)", group_thousands(total)));
    }
    out.push('\n');

    out.push_str("\n📈 Research Interest:\n");
    out.push_str("Year | Number of Papers\n");
    out.push_str("-----|----------------\n");
    for (year, count) in &stats.papers_by_year {
        out.push_str(&format!("{year} | {count}\n"));
    }

    out.push_str("\n🏆 Top Cited Papers:\n");
    out.push_str("-------------------\n");
    for paper in &stats.top_cited_papers {
        let year = paper
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        out.push_str(&format!("• {}\n", paper.title));
        out.push_str(&format!(
            "  Citations: {} | Year: {}\n",
            group_thousands(paper.citations),
            year
        ));
        out.push_str(&format!("  DOI: {}\n", paper.doi.as_deref().unwrap_or("n/a")));
    }

    out.push_str("\n🏛️ Leading Institutions:\n");
    out.push_str("--------------------\n");
    push_ranking(&mut out, &stats.top_institutions);

    out.push_str("\n👨‍🔬 Top Researchers:\n");
    out.push_str("----------------\n");
    push_ranking(&mut out, &stats.top_authors);

    out
}

fn push_ranking(out: &mut String, ranking: &[RankedName]) {
    for entry in ranking {
        out.push_str(&format!("• {} ({} papers)\n", entry.name, entry.paper_count));
    }
}

/// Formats an integer with `,` thousands separators (`1234567` → `1,234,567`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
