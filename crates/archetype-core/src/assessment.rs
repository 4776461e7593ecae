//! End-to-end scoring of one set of answers.
//!
//! Normalizes answers, picks the primary archetype, computes per-archetype
//! diagnostics, and runs the Monte Carlo stability estimate.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::likert::{collect_answers, normalize_scores, AnswerSheet, DimensionScores, ScoredAnswer};
use crate::matching::{ArchetypeDistance, ArchetypeMatch, Matcher};
use crate::model::Instrument;
use crate::simulation::{run_simulation, SimulationConfig, StabilityReport};

/// Knobs for a single assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentOptions {
    pub simulation: SimulationConfig,
    /// Distance-to-energy temperature; the scale default when `None`.
    pub energy_temperature: Option<f64>,
}

impl AssessmentOptions {
    /// Instrument defaults with no seed.
    pub fn for_instrument(instrument: &Instrument) -> Self {
        Self {
            simulation: SimulationConfig::for_instrument(instrument),
            energy_temperature: None,
        }
    }
}

/// Everything computed for a respondent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Answers as scored, including neutral defaults for skipped questions.
    pub answers: Vec<ScoredAnswer>,
    pub scores: DimensionScores,
    /// Deterministic best match; `None` for an empty catalog.
    pub primary: Option<ArchetypeMatch>,
    pub distances: Vec<ArchetypeDistance>,
    pub stability: StabilityReport,
}

impl Assessment {
    pub fn primary_name(&self) -> Option<&str> {
        self.primary.as_ref().map(|m| m.name.as_str())
    }

    /// Simulated probability of the deterministic primary, in percent.
    pub fn primary_probability(&self) -> f64 {
        self.primary_name()
            .map(|n| self.stability.probability(n))
            .unwrap_or(0.0)
    }

    /// Whether the simulation's top bucket agrees with the deterministic match.
    pub fn is_consistent(&self) -> bool {
        match (self.primary_name(), self.stability.dominant()) {
            (Some(primary), Some(dominant)) => primary == dominant.name,
            _ => false,
        }
    }
}

/// Score `sheet` against `instrument`.
pub fn assess(
    instrument: &Instrument,
    sheet: &AnswerSheet,
    options: &AssessmentOptions,
) -> Result<Assessment, ScoringError> {
    let matcher = Matcher::new(instrument)?;

    let answers = collect_answers(instrument, sheet);
    let scores = normalize_scores(&answers, &instrument.dimensions, instrument.scale);

    let primary = matcher.determine(&scores);
    let temperature = options
        .energy_temperature
        .unwrap_or_else(|| instrument.scale.default_energy_temperature());
    let distances = matcher.distances(&scores, temperature);
    let stability = run_simulation(&matcher, &scores, &options.simulation)?;

    tracing::info!(
        instrument = %instrument.id,
        primary = primary.as_ref().map(|m| m.name.as_str()).unwrap_or("None"),
        stability = stability.stability,
        shadow = %stability.shadow_label(),
        "assessment complete"
    );

    Ok(Assessment {
        answers,
        scores,
        primary,
        distances,
        stability,
    })
}
