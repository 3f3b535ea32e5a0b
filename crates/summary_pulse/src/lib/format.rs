use std::fmt::Write;

use summary_datastore::StructuredSummary;

/// Renders a summary under fixed Markdown headings
pub fn format_summary_markdown(summary: &StructuredSummary) -> String {
    let mut out = String::new();

    // writing into a String cannot fail
    let _ = writeln!(out, "## Sub title\n{}\n", summary.sub_title);
    let _ = writeln!(out, "## Overview\n{}\n", summary.overview);

    out.push_str("## Main topics\n");
    for topic in &summary.main_topics {
        let _ = writeln!(out, "- {topic}");
    }

    out.push_str("\n## Key points\n");
    for point in &summary.key_points {
        let _ = writeln!(out, "- **{}**: {}", point.title, point.description);
    }

    let _ = writeln!(out, "\n## Keywords\n{}", summary.keywords.join(", "));

    out.push_str("\n## Action items\n");
    for (i, item) in summary.action_items.iter().enumerate() {
        let _ = writeln!(out, "{}. {item}", i + 1);
    }

    out
}
