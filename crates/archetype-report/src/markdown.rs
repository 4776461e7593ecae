//! Markdown report generator.

use anyhow::{Context, Result};
use std::path::Path;

use archetype_core::model::Instrument;
use archetype_core::report::AssessmentReport;

use crate::heatmap_rows;

/// Generate a Markdown report for an assessment taken on `instrument`.
pub fn generate_markdown(report: &AssessmentReport, instrument: &Instrument) -> String {
    let assessment = &report.assessment;
    let stability = &assessment.stability;
    let primary = assessment.primary_name().unwrap_or("None");
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", instrument.name));
    if !instrument.tagline.is_empty() {
        md.push_str(&format!("_{}_\n\n", instrument.tagline));
    }
    md.push_str(&format!(
        "Scored {} with {} trials (noise {}).\n\n",
        report.created_at.format("%Y-%m-%d %H:%M UTC"),
        stability.trials,
        stability.noise
    ));

    md.push_str(&format!("## Your archetype: {primary}\n\n"));
    if let Some(archetype) = instrument.archetype(primary) {
        if !archetype.description.is_empty() {
            md.push_str(&format!("{}\n\n", archetype.description));
        }
    }
    md.push_str(&format!("- **Stability:** {:.1}%\n", stability.stability));
    md.push_str(&format!("- **Shadow archetype:** {}\n\n", stability.shadow_label()));
    if !assessment.is_consistent() && assessment.primary.is_some() {
        md.push_str("> Under answer noise a different archetype came up most often.\n\n");
    }

    md.push_str("## Dimension scores\n\n");
    md.push_str("| Dimension | Score |\n");
    md.push_str("|-----------|-------|\n");
    for s in assessment.scores.iter() {
        md.push_str(&format!(
            "| {} | {:.1} |\n",
            table_cell(&s.dimension),
            assessment.scores.scale.to_percent(s.score)
        ));
    }
    md.push('\n');

    if !stability.probabilities.is_empty() {
        md.push_str("## Archetype probabilities\n\n");
        md.push_str("| Archetype | Probability |\n");
        md.push_str("|-----------|-------------|\n");
        for p in &stability.probabilities {
            md.push_str(&format!(
                "| {} | {:.1}% |\n",
                table_cell(&p.name),
                p.probability
            ));
        }
        md.push('\n');
    }

    if let Some(rows) = heatmap_rows(instrument, stability) {
        md.push_str("## Probability map\n\n");
        let cols = instrument
            .grid
            .as_ref()
            .map(|g| g.col_labels.clone())
            .unwrap_or_default();
        let width = rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        md.push_str("| |");
        for i in 0..width {
            let label = cols.get(i).map(String::as_str).unwrap_or("");
            md.push_str(&format!(" {} |", table_cell(label)));
        }
        md.push_str("\n|---|");
        md.push_str(&"---|".repeat(width));
        md.push('\n');
        for row in rows {
            md.push_str(&format!("| **{}** |", table_cell(row.label)));
            for (name, p) in row.cells {
                md.push_str(&format!(" {} ({p:.1}%) |", table_cell(name)));
            }
            md.push('\n');
        }
        md.push('\n');
    }

    if let Some(archetype) = instrument.archetype(primary) {
        for section in &instrument.sections {
            let items = archetype.details(&section.key);
            if items.is_empty() {
                continue;
            }
            md.push_str(&format!("### {}\n\n", section.title));
            for item in items {
                md.push_str(&format!("- {item}\n"));
            }
            md.push('\n');
        }
    }

    md
}

/// Escape pipes so a value stays inside its table cell.
fn table_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Write a Markdown report to a file.
pub fn write_markdown_report(
    report: &AssessmentReport,
    instrument: &Instrument,
    path: &Path,
) -> Result<()> {
    let md = generate_markdown(report, instrument);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, md)
        .with_context(|| format!("failed to write Markdown report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn markdown_has_card_scores_and_breakdown() {
        let instrument = fixtures::instrument();
        let report = fixtures::report(&instrument);
        let md = generate_markdown(&report, &instrument);

        assert!(md.starts_with("# Mini <Type>\n"));
        assert!(md.contains("## Your archetype: Visionary"));
        assert!(md.contains("| thinking | 100.0 |"));
        assert!(md.contains("| execution | 25.0 |"));
        assert!(md.contains("**Shadow archetype:**"));
        assert!(md.contains("### Growth Edges & Risks"));
        assert!(md.contains("- Loses interest in details"));
    }

    #[test]
    fn markdown_heatmap_layout() {
        let instrument = fixtures::instrument();
        let report = fixtures::report(&instrument);
        let md = generate_markdown(&report, &instrument);

        assert!(md.contains("| | Left | Right |\n|---|---|---|\n"));
        assert!(md.contains("| **Ideas** | Visionary ("));
        assert!(md.contains("| **Delivery** | Operator ("));
    }

    #[test]
    fn markdown_notes_disagreeing_simulation() {
        let instrument = fixtures::instrument();
        let mut report = fixtures::report(&instrument);
        let note = "a different archetype came up most often";
        assert!(!generate_markdown(&report, &instrument).contains(note));

        report.assessment.primary.as_mut().unwrap().name = "Operator".into();
        let md = generate_markdown(&report, &instrument);
        assert!(md.contains("## Your archetype: Operator"));
        assert!(md.contains(note));
    }

    #[test]
    fn markdown_escapes_pipes_in_tables() {
        let instrument = fixtures::instrument();
        let mut report = fixtures::report(&instrument);
        report.assessment.stability.probabilities[0].name = "Left|Right".into();
        let md = generate_markdown(&report, &instrument);
        assert!(md.contains("| Left\\|Right | "));
    }

    #[test]
    fn markdown_write_to_file() {
        let instrument = fixtures::instrument();
        let report = fixtures::report(&instrument);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        write_markdown_report(&report, &instrument, &path).unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("Dimension scores"));
    }
}
