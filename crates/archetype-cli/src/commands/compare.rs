//! The `archetype compare` command.

use std::path::PathBuf;

use anyhow::Result;

use archetype_core::report::AssessmentReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_shift: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(
        threshold.is_finite() && threshold >= 0.0,
        "threshold must be a non-negative number"
    );

    let baseline = AssessmentReport::load_json(&baseline_path)?;
    let current = AssessmentReport::load_json(&current_path)?;

    let shift = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", shift.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&shift)?);
        }
        _ => {
            let name = |n: &Option<String>| n.as_deref().unwrap_or("None").to_string();
            println!(
                "Comparison: {} shifted, {} unchanged",
                shift.shifts.len(),
                shift.unchanged
            );
            println!(
                "Archetype: {} -> {}{}",
                name(&shift.baseline_primary),
                name(&shift.current_primary),
                if shift.archetype_changed {
                    " (changed)"
                } else {
                    ""
                }
            );
            println!("Stability: {:+.1} points", shift.stability_delta);

            if !shift.same_instrument {
                println!("\nWarning: reports come from different instruments.");
            }

            if !shift.shifts.is_empty() {
                println!("\nShifts:");
                for s in &shift.shifts {
                    println!(
                        "  {} {:.1} -> {:.1} ({:+.1})",
                        s.dimension, s.baseline_score, s.current_score, s.delta
                    );
                }
            }

            if shift.new_dimensions > 0 {
                println!("\n{} new dimension(s)", shift.new_dimensions);
            }
            if shift.removed_dimensions > 0 {
                println!("{} removed dimension(s)", shift.removed_dimensions);
            }
        }
    }

    if fail_on_shift && shift.has_shifts() {
        std::process::exit(1);
    }

    Ok(())
}
