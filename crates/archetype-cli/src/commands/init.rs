//! The `archetype init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("archetype.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("instruments")?;
    write_if_missing(Path::new("instruments/i-type.toml"), I_TYPE)?;
    write_if_missing(Path::new("instruments/d-type.toml"), D_TYPE)?;

    println!("\nNext steps:");
    println!("  1. Run: archetype validate --instrument instruments");
    println!("  2. Run: archetype take --instrument instruments/i-type.toml");
    println!("  3. Edit archetype.toml to enable local response logging");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# archetype configuration

instrument = "instruments/i-type.toml"
# trials = 4000
# Noise is in the instrument's scale units: about 4.0 for percent-scale
# instruments (I-Type), 0.04 for unit-scale ones (D-Type).
# noise = 4.0
# seed = 42
output_dir = "./archetype-results"

[log]
# Responses are only written when enabled and the respondent agrees.
enabled = false
path = "./archetype-results/responses.jsonl"
"#;

const I_TYPE: &str = include_str!("../../../../instruments/i-type.toml");
const D_TYPE: &str = include_str!("../../../../instruments/d-type.toml");
