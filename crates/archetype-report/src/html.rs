//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use archetype_core::model::Instrument;
use archetype_core::report::AssessmentReport;
use archetype_core::simulation::ArchetypeProbability;

use crate::heatmap_rows;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report for an assessment taken on `instrument`.
pub fn generate_html(report: &AssessmentReport, instrument: &Instrument) -> String {
    let assessment = &report.assessment;
    let stability = &assessment.stability;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{} — your results</title>\n",
        html_escape(&instrument.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&instrument.name)));
    if !instrument.tagline.is_empty() {
        html.push_str(&format!(
            "<p class=\"tagline\">{}</p>\n",
            html_escape(&instrument.tagline)
        ));
    }
    html.push_str(&format!(
        "<p class=\"meta\">{} questions | {} trials | noise {} | {}</p>\n",
        assessment.answers.len(),
        stability.trials,
        stability.noise,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Result card
    let primary = assessment.primary_name().unwrap_or("None");
    let description = instrument
        .archetype(primary)
        .map(|a| a.description.as_str())
        .unwrap_or("");
    html.push_str("<section class=\"card\">\n");
    html.push_str(&format!(
        "<h2>Your archetype: {}</h2>\n",
        html_escape(primary)
    ));
    if !description.is_empty() {
        html.push_str(&format!("<p>{}</p>\n", html_escape(description)));
    }
    html.push_str(&format!(
        "<p><strong>Stability:</strong> {:.1}%</p>\n",
        stability.stability
    ));
    html.push_str(&format!(
        "<p><strong>Shadow archetype:</strong> {}</p>\n",
        html_escape(&stability.shadow_label())
    ));
    if !assessment.is_consistent() && assessment.primary.is_some() {
        html.push_str("<p class=\"note\">Under answer noise a different archetype came up most often.</p>\n");
    }
    html.push_str("</section>\n");

    // Dimension scores
    html.push_str("<section>\n<h2>Dimension scores</h2>\n");
    html.push_str("<table class=\"scores\">\n");
    html.push_str("<thead><tr><th>Dimension</th><th>Score</th></tr></thead>\n<tbody>\n");
    for s in assessment.scores.iter() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.1}</td></tr>\n",
            html_escape(&s.dimension),
            assessment.scores.scale.to_percent(s.score)
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");

    // Probabilities
    if !stability.probabilities.is_empty() {
        html.push_str("<section>\n<h2>Archetype probabilities</h2>\n");
        html.push_str(&generate_bar_chart(&stability.probabilities));
        html.push_str("</section>\n");
    }

    if let Some(rows) = heatmap_rows(instrument, stability) {
        html.push_str("<section>\n<h2>Probability map</h2>\n");
        html.push_str("<table class=\"heatmap\">\n");
        if let Some(grid) = &instrument.grid {
            if !grid.col_labels.is_empty() {
                html.push_str("<thead><tr><th></th>");
                for col in &grid.col_labels {
                    html.push_str(&format!("<th>{}</th>", html_escape(col)));
                }
                html.push_str("</tr></thead>\n");
            }
        }
        html.push_str("<tbody>\n");
        for row in rows {
            html.push_str(&format!("<tr><th>{}</th>", html_escape(row.label)));
            for (name, p) in row.cells {
                html.push_str(&format!(
                    "<td style=\"background: rgba(37, 99, 235, {:.2})\">{}<br><span>{:.1}%</span></td>",
                    (p / 100.0).clamp(0.05, 1.0),
                    html_escape(name),
                    p
                ));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody></table>\n</section>\n");
    }

    // Breakdown
    if let Some(archetype) = instrument.archetype(primary) {
        let sections: Vec<_> = instrument
            .sections
            .iter()
            .filter(|s| !archetype.details(&s.key).is_empty())
            .collect();
        if !sections.is_empty() {
            html.push_str("<section class=\"breakdown\">\n<h2>Breakdown</h2>\n");
            for section in sections {
                html.push_str(&format!("<h3>{}</h3>\n<ul>\n", html_escape(&section.title)));
                for item in archetype.details(&section.key) {
                    html.push_str(&format!("<li>{}</li>\n", html_escape(item)));
                }
                html.push_str("</ul>\n");
            }
            html.push_str("</section>\n");
        }
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(
    report: &AssessmentReport,
    instrument: &Instrument,
    path: &Path,
) -> Result<()> {
    let html = generate_html(report, instrument);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

fn generate_bar_chart(probabilities: &[ArchetypeProbability]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 200;

    let total_height = probabilities.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 70,
        total_height
    );

    for (i, p) in probabilities.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (p.probability / 100.0 * max_width as f64) as usize;

        let color = match i {
            0 => "#2563eb",
            1 => "#7c3aed",
            _ => "#9ca3af",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&p.name)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            p.probability
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --card: #eff6ff; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --card: #1e3a8a; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); max-width: 960px; }
h1, h2 { margin-top: 2rem; }
.meta, .tagline { color: #6b7280; }
.card { background: var(--card); border-radius: 8px; padding: 1rem 1.5rem; }
.note { font-style: italic; }
table { border-collapse: collapse; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.heatmap td { text-align: center; min-width: 8rem; }
.heatmap span { font-size: 0.85rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
