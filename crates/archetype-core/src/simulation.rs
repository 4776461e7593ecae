//! Monte Carlo stability of the archetype assignment.
//!
//! The user's score vector is resampled with Gaussian noise on every
//! dimension and each resample is bucketed to its best-fitting archetype.
//! Bucket frequencies give a probability per archetype, the share of the top
//! bucket ("stability"), and the runner-up ("shadow").

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::likert::DimensionScores;
use crate::matching::Matcher;
use crate::model::Instrument;

/// Monte Carlo settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of noisy resamples.
    pub trials: u32,
    /// Standard deviation of the per-dimension noise, in scale units.
    pub noise: f64,
    /// Seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: 4000,
            noise: 4.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Defaults declared by `instrument` (or its scale).
    pub fn for_instrument(instrument: &Instrument) -> Self {
        Self {
            trials: instrument.default_trials(),
            noise: instrument.default_noise(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.trials == 0 {
            return Err(ScoringError::InvalidSimulation(
                "trials must be at least 1".into(),
            ));
        }
        if !self.noise.is_finite() || self.noise < 0.0 {
            return Err(ScoringError::InvalidSimulation(format!(
                "noise must be a non-negative number, got {}",
                self.noise
            )));
        }
        Ok(())
    }
}

/// Share of resamples that landed on one archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeProbability {
    pub name: String,
    /// Number of resamples bucketed to this archetype.
    pub count: u32,
    /// `count / trials * 100`.
    pub probability: f64,
}

/// Outcome of a Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    pub trials: u32,
    pub noise: f64,
    pub seed: Option<u64>,
    /// Every archetype, highest probability first; ties keep catalog order.
    pub probabilities: Vec<ArchetypeProbability>,
    /// Probability of the top bucket, in percent.
    pub stability: f64,
    /// Second-ranked archetype; the top one itself for a single-entry catalog.
    pub shadow: Option<ArchetypeProbability>,
}

impl StabilityReport {
    fn empty(config: &SimulationConfig) -> Self {
        Self {
            trials: config.trials,
            noise: config.noise,
            seed: config.seed,
            probabilities: Vec::new(),
            stability: 0.0,
            shadow: None,
        }
    }

    /// The archetype with the largest share.
    pub fn dominant(&self) -> Option<&ArchetypeProbability> {
        self.probabilities.first()
    }

    /// Probability for `name` in percent, 0.0 if unknown.
    pub fn probability(&self, name: &str) -> f64 {
        self.probabilities
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.probability)
            .unwrap_or(0.0)
    }

    /// "Name (12.3%)", or "None" when there is no shadow.
    pub fn shadow_label(&self) -> String {
        match &self.shadow {
            Some(s) => format!("{} ({:.1}%)", s.name, s.probability),
            None => "None".to_string(),
        }
    }
}

/// Bucket `trials` noisy copies of `user` to their best archetype.
///
/// Returns one count per archetype, in catalog order.
pub fn simulate_counts<R: Rng + ?Sized>(
    matcher: &Matcher,
    user: &[f64],
    trials: u32,
    noise: f64,
    rng: &mut R,
) -> Result<Vec<u32>, ScoringError> {
    let normal = Normal::new(0.0, noise)
        .map_err(|e| ScoringError::InvalidSimulation(format!("noise {noise}: {e}")))?;

    let mut counts = vec![0u32; matcher.names().len()];
    if counts.is_empty() {
        return Ok(counts);
    }

    let mut noisy = vec![0.0f64; user.len()];
    for _ in 0..trials {
        for (slot, &base) in noisy.iter_mut().zip(user) {
            *slot = base + normal.sample(rng);
        }
        if let Some(i) = matcher.best(&noisy) {
            counts[i] += 1;
        }
    }

    Ok(counts)
}

/// Turn per-archetype counts into a ranked [`StabilityReport`].
pub fn rank_counts(names: &[String], counts: &[u32], config: &SimulationConfig) -> StabilityReport {
    if names.is_empty() {
        return StabilityReport::empty(config);
    }

    let trials = config.trials.max(1) as f64;
    let mut probabilities: Vec<ArchetypeProbability> = names
        .iter()
        .zip(counts)
        .map(|(name, &count)| ArchetypeProbability {
            name: name.clone(),
            count,
            probability: count as f64 / trials * 100.0,
        })
        .collect();

    // Stable sort keeps catalog order among equal shares.
    probabilities.sort_by(|a, b| b.count.cmp(&a.count));

    let Some(stability) = probabilities.first().map(|p| p.probability) else {
        return StabilityReport::empty(config);
    };
    let shadow = probabilities
        .get(1)
        .or_else(|| probabilities.first())
        .cloned();

    StabilityReport {
        trials: config.trials,
        noise: config.noise,
        seed: config.seed,
        probabilities,
        stability,
        shadow,
    }
}

/// Estimate archetype probabilities, stability and shadow for `scores`.
pub fn monte_carlo_probabilities(
    scores: &DimensionScores,
    instrument: &Instrument,
    config: &SimulationConfig,
) -> Result<StabilityReport, ScoringError> {
    let matcher = Matcher::new(instrument)?;
    run_simulation(&matcher, scores, config)
}

/// Run the simulation with a prepared matcher.
pub fn run_simulation(
    matcher: &Matcher,
    scores: &DimensionScores,
    config: &SimulationConfig,
) -> Result<StabilityReport, ScoringError> {
    config.validate()?;

    if matcher.is_empty() {
        tracing::warn!("archetype catalog is empty, skipping simulation");
        return Ok(StabilityReport::empty(config));
    }

    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };

    tracing::debug!(
        trials = config.trials,
        noise = config.noise,
        seed = ?config.seed,
        archetypes = matcher.names().len(),
        "running monte carlo simulation"
    );

    let counts = simulate_counts(
        matcher,
        &scores.as_vector(),
        config.trials,
        config.noise,
        &mut rng,
    )?;

    Ok(rank_counts(matcher.names(), &counts, config))
}
