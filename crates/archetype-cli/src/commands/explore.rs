//! The `archetype explore` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use archetype_core::parser::load_instrument;

use super::print_sections;

pub fn execute(instrument_path: PathBuf, archetype: Option<String>) -> Result<()> {
    let instrument = load_instrument(&instrument_path)?;

    let Some(name) = archetype else {
        println!("{} ({} archetypes)", instrument.name, instrument.archetypes.len());
        let mut table = Table::new();
        table.set_header(vec!["#", "Archetype", "Description"]);
        for (i, a) in instrument.archetypes.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&a.name),
                Cell::new(&a.description),
            ]);
        }
        println!("{table}");
        return Ok(());
    };

    let Some(archetype) = instrument
        .archetypes
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(&name))
    else {
        let available: Vec<&str> = instrument
            .archetypes
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        anyhow::bail!(
            "unknown archetype '{}'. Available: {}",
            name,
            available.join(", ")
        );
    };

    println!("{}", archetype.name);
    if !archetype.description.is_empty() {
        println!("{}", archetype.description);
    }

    let mut table = Table::new();
    table.set_header(vec!["Dimension", "Value"]);
    for dim in &instrument.dimensions {
        table.add_row(vec![
            Cell::new(dim),
            Cell::new(format!(
                "{:.1}",
                instrument.scale.to_percent(archetype.value(dim))
            )),
        ]);
    }
    println!("\n{table}");

    print_sections(&mut std::io::stdout().lock(), &instrument, archetype)?;
    Ok(())
}
