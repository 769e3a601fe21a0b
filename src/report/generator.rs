//! Report generation.
//!
//! This module renders a page of ranked matches as Markdown, JSON or CSV,
//! showing only the selected columns.

use super::view::{Page, RankedMatch};
use super::{Column, MatchReport, ReportMetadata};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &MatchReport, columns: &[Column]) -> String {
    let mut output = String::new();

    output.push_str("# Investor Match Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_results_section(&report.page, columns));
    output.push_str(&generate_footer(&report.page));

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Query\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Verticals:** {}\n", join_or_dash(&metadata.verticals)));
    section.push_str(&format!("- **Stages:** {}\n", join_or_dash(&metadata.funding_stages)));
    section.push_str(&format!("- **Locations:** {}\n", join_or_dash(&metadata.locations)));
    section.push_str(&format!(
        "- **Investor Types:** {}\n",
        join_or_dash(&metadata.investor_types)
    ));
    section.push_str(&format!("- **Combinations:** {}\n", metadata.combinations));
    section.push_str(&format!("- **Investors Matched:** {}\n", metadata.total_matches));
    if let Some(ref filter) = metadata.filter {
        section.push_str(&format!("- **Filter:** `{}`\n", filter));
    }
    section.push_str(&format!("- **Duration:** {:.2}s\n", metadata.duration_seconds));
    section.push('\n');

    section
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Generate the results table.
fn generate_results_section(page: &Page, columns: &[Column]) -> String {
    let mut section = String::new();

    section.push_str("## Matched Investors\n\n");

    if page.entries.is_empty() {
        section.push_str("No investors matched the selected criteria.\n\n");
        return section;
    }

    let header: Vec<&str> = columns.iter().map(|c| c.title()).collect();
    section.push_str(&format!("| {} |\n", header.join(" | ")));
    section.push_str(&format!(
        "|{}\n",
        columns.iter().map(|_| ":---|").collect::<String>()
    ));

    for entry in &page.entries {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| c.value(entry).replace('|', "\\|"))
            .collect();
        section.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer(page: &Page) -> String {
    let shown = page.entries.len();
    let first = if shown == 0 {
        0
    } else {
        (page.number - 1) * page.size + 1
    };
    let last = if shown == 0 { 0 } else { first + shown - 1 };

    format!(
        "---\n\n*Showing {}-{} of {} investors (page {} of {})*\n",
        first, last, page.total_items, page.number, page.total_pages
    )
}

/// Generate a JSON report.
pub fn generate_json_report(report: &MatchReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a CSV export of the page with the selected columns.
pub fn generate_csv_report(entries: &[RankedMatch], columns: &[Column]) -> String {
    let mut output = String::new();

    let header: Vec<String> = columns.iter().map(|c| csv_field(c.title())).collect();
    output.push_str(&header.join(","));
    output.push('\n');

    for entry in entries {
        let row: Vec<String> = columns.iter().map(|c| csv_field(&c.value(entry))).collect();
        output.push_str(&row.join(","));
        output.push('\n');
    }

    output
}

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write rendered output to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::{angel, institutional};
    use crate::models::{AngelMatch, InstitutionalMatch, MatchedInvestor};
    use crate::report::view::{paginate, with_ranks};
    use chrono::Utc;
    use indexmap::IndexMap;

    fn create_test_report() -> MatchReport {
        let mut counts = IndexMap::new();
        counts.insert("Fintech-Seed-US".to_string(), 3);
        counts.insert("Fintech-Seed-UK".to_string(), 2);

        let entries = with_ranks(vec![
            MatchedInvestor::Institutional(InstitutionalMatch::new(
                institutional("A", "northwind.vc", "Venture Capital"),
                counts,
            )),
            MatchedInvestor::Angel(AngelMatch::new(angel("X", "Doe, Jane", "US", 4))),
        ]);

        MatchReport {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                verticals: vec!["Fintech".to_string()],
                funding_stages: vec!["Seed".to_string()],
                locations: vec!["US".to_string(), "UK".to_string()],
                investor_types: vec!["Venture Capital".to_string()],
                combinations: 2,
                total_matches: 2,
                filter: None,
                duration_seconds: 0.25,
            },
            page: paginate(entries, 1, 25),
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, Column::defaults());

        assert!(markdown.contains("# Investor Match Report"));
        assert!(markdown.contains("## Query"));
        assert!(markdown.contains("## Matched Investors"));
        assert!(markdown.contains("| Rank | Website |"));
        assert!(markdown.contains("northwind.vc"));
        assert!(markdown.contains("Angel Investor"));
        assert!(markdown.contains("Showing 1-2 of 2 investors"));
    }

    #[test]
    fn test_markdown_report_without_matches() {
        let mut report = create_test_report();
        report.page = paginate(Vec::new(), 1, 25);

        let markdown = generate_markdown_report(&report, Column::defaults());
        assert!(markdown.contains("No investors matched"));
        assert!(markdown.contains("Showing 0-0 of 0 investors"));
    }

    #[test]
    fn test_generate_metadata_section() {
        let mut report = create_test_report();
        report.metadata.filter = Some("vc".to_string());

        let section = generate_metadata_section(&report.metadata);
        assert!(section.contains("US, UK"));
        assert!(section.contains("**Combinations:** 2"));
        assert!(section.contains("**Filter:** `vc`"));
    }

    #[test]
    fn test_csv_selected_columns_and_quoting() {
        let report = create_test_report();
        let csv = generate_csv_report(
            &report.page.entries,
            &[Column::Website, Column::MatchedTotal, Column::MatchedCounts],
        );
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Website,Matched Total,Matched Counts");
        assert_eq!(lines[1], "northwind.vc,5,Fintech-Seed-US: 3; Fintech-Seed-UK: 2");
        assert_eq!(lines[2], "\"Doe, Jane\",4,4");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"investmentCounts\""));
        assert!(json.contains("\"matched_total\": 5"));
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        write_report("a,b\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n");
    }
}
