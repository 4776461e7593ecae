//! The `archetype validate` command.

use std::path::PathBuf;

use anyhow::Result;

use archetype_core::parser::{load_instruments, validate_instrument};

pub fn execute(instrument_path: PathBuf) -> Result<()> {
    let instruments = load_instruments(&instrument_path)?;
    anyhow::ensure!(
        !instruments.is_empty(),
        "no instruments found in {}",
        instrument_path.display()
    );

    let mut total_warnings = 0;

    for instrument in &instruments {
        println!(
            "Instrument: {} ({} questions, {} archetypes, {} matching)",
            instrument.name,
            instrument.questions.len(),
            instrument.archetypes.len(),
            instrument.matching
        );

        let warnings = validate_instrument(instrument);
        for w in &warnings {
            let prefix = w
                .subject
                .as_ref()
                .map(|s| format!("  [{s}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All instruments valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
