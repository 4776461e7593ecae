//! Subcommand implementations and the helpers they share.

pub mod compare;
pub mod explore;
pub mod init;
pub mod score;
pub mod take;
pub mod validate;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use archetype_core::assessment::{Assessment, AssessmentOptions};
use archetype_core::config::{load_config_from, ArchetypeConfig};
use archetype_core::model::{Archetype, Instrument, ScoreScale};
use archetype_core::parser::load_instrument;
use archetype_core::response_log::{ResponseLog, ResponseRecord};
use archetype_core::simulation::SimulationConfig;

/// Simulation overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct SimulationArgs {
    pub trials: Option<u32>,
    pub noise: Option<f64>,
    pub seed: Option<u64>,
}

/// Instrument, config and scoring options resolved for one run.
pub struct Setup {
    pub config: ArchetypeConfig,
    pub instrument: Instrument,
    pub options: AssessmentOptions,
}

/// Load config and instrument, then layer flags over config over instrument defaults.
pub fn setup(
    instrument_path: Option<PathBuf>,
    config_path: Option<&Path>,
    sim: &SimulationArgs,
) -> Result<Setup> {
    let config = load_config_from(config_path)?;

    let path = match instrument_path.or_else(|| config.instrument.clone()) {
        Some(p) => p,
        None => anyhow::bail!(
            "no instrument given; pass --instrument or set `instrument` in archetype.toml"
        ),
    };
    let instrument = load_instrument(&path)?;

    let mut simulation = SimulationConfig::for_instrument(&instrument);
    if let Some(trials) = sim.trials.or(config.trials) {
        simulation.trials = trials;
    }
    if let Some(noise) = sim.noise.or(config.noise) {
        simulation.noise = noise;
    }
    simulation.seed = sim.seed.or(config.seed);
    if let Some(warning) = noise_warning(simulation.noise, instrument.scale) {
        tracing::warn!(instrument = %instrument.id, "{warning}");
    }

    tracing::debug!(
        instrument = %instrument.id,
        trials = simulation.trials,
        noise = simulation.noise,
        seed = ?simulation.seed,
        "resolved scoring settings"
    );

    let options = AssessmentOptions {
        simulation,
        energy_temperature: config.energy_temperature,
    };

    Ok(Setup {
        config,
        instrument,
        options,
    })
}

/// Noise is in the instrument's scale units; a spread wider than the whole
/// scale drowns the answers.
fn noise_warning(noise: f64, scale: ScoreScale) -> Option<String> {
    (noise > scale.max()).then(|| {
        format!(
            "noise {noise} exceeds the {scale} scale maximum of {}; results will be mostly noise (default is {})",
            scale.max(),
            scale.default_noise()
        )
    })
}

/// Append the assessment to the response log when logging is enabled.
pub fn log_response(
    config: &ArchetypeConfig,
    instrument: &Instrument,
    assessment: &Assessment,
    consent: bool,
) {
    if !config.log.enabled {
        return;
    }
    let record = ResponseRecord::from_assessment(&instrument.id, assessment);
    ResponseLog::new(&config.log.path).record(&record, consent);
}

/// Print the result card, score and probability tables, and the breakdown.
pub fn print_assessment(
    out: &mut dyn Write,
    instrument: &Instrument,
    assessment: &Assessment,
) -> io::Result<()> {
    let stability = &assessment.stability;
    let primary = assessment.primary_name().unwrap_or("None");

    writeln!(out, "Your archetype: {primary}")?;
    if let Some(archetype) = instrument.archetype(primary) {
        if !archetype.description.is_empty() {
            writeln!(out, "  {}", archetype.description)?;
        }
    }
    writeln!(out, "Stability: {:.1}%", stability.stability)?;
    writeln!(out, "Shadow archetype: {}", stability.shadow_label())?;
    if assessment.primary.is_some() && !assessment.is_consistent() {
        writeln!(
            out,
            "Note: under answer noise {} came up most often.",
            stability.dominant().map(|d| d.name.as_str()).unwrap_or("None")
        )?;
    }

    let mut scores = Table::new();
    scores.set_header(vec!["Dimension", "Score"]);
    for s in assessment.scores.iter() {
        scores.add_row(vec![
            Cell::new(&s.dimension),
            Cell::new(format!("{:.1}", assessment.scores.scale.to_percent(s.score))),
        ]);
    }
    writeln!(out, "\n{scores}")?;

    if !stability.probabilities.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Archetype", "Probability", "Distance", "Energy"]);
        for p in &stability.probabilities {
            let distance = assessment.distances.iter().find(|d| d.name == p.name);
            table.add_row(vec![
                Cell::new(&p.name),
                Cell::new(format!("{:.1}%", p.probability)),
                Cell::new(
                    distance
                        .map(|d| format!("{:.3}", d.euclidean))
                        .unwrap_or_else(|| "-".into()),
                ),
                Cell::new(
                    distance
                        .map(|d| format!("{:.3}", d.energy))
                        .unwrap_or_else(|| "-".into()),
                ),
            ]);
        }
        writeln!(out, "\n{table}")?;
    }

    if let Some(archetype) = instrument.archetype(primary) {
        print_sections(out, instrument, archetype)?;
    }
    Ok(())
}

/// Print every non-empty breakdown section of `archetype`.
pub fn print_sections(
    out: &mut dyn Write,
    instrument: &Instrument,
    archetype: &Archetype,
) -> io::Result<()> {
    for section in &instrument.sections {
        let items = archetype.details(&section.key);
        if items.is_empty() {
            continue;
        }
        writeln!(out, "\n{}:", section.title)?;
        for item in items {
            writeln!(out, "  - {item}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_wider_than_scale_warns() {
        assert!(noise_warning(4.0, ScoreScale::Percent).is_none());
        assert!(noise_warning(0.04, ScoreScale::Unit).is_none());

        let warning = noise_warning(4.0, ScoreScale::Unit).unwrap();
        assert!(warning.contains("noise 4 exceeds"));
        assert!(warning.contains("default is 0.04"));
    }
}
