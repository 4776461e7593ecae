//! Archetype matching in dimension space.
//!
//! A [`Matcher`] precomputes the archetype vectors of an instrument together
//! with the configured [`Metric`], so the Monte Carlo loop can bucket
//! thousands of resamples without touching the catalog maps again.

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::likert::DimensionScores;
use crate::model::{Instrument, MatchMethod, ScoreScale};

/// Plain Euclidean distance between two vectors of equal length.
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Softmax-style weight: lower distance gives higher energy.
pub fn distance_to_energy(distance: f64, temperature: f64) -> f64 {
    (-distance / temperature).exp()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MetricKind {
    Euclidean,
    Weighted,
    Hybrid { distance_penalty: f64 },
}

/// Scoring rule resolved against an instrument's dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    kind: MetricKind,
    weights: Vec<f64>,
    max_distance: f64,
}

impl Metric {
    /// Resolve `method` against `dimensions`. Weights default to 1.0 for
    /// dimensions the method does not name.
    pub fn new(
        method: &MatchMethod,
        dimensions: &[String],
        scale: ScoreScale,
    ) -> Result<Self, ScoringError> {
        let (kind, weights) = match method {
            MatchMethod::Euclidean => (MetricKind::Euclidean, vec![1.0; dimensions.len()]),
            MatchMethod::Weighted { weights } => (
                MetricKind::Weighted,
                resolve_weights(weights, dimensions)?,
            ),
            MatchMethod::Hybrid {
                weights,
                distance_penalty,
            } => {
                if !distance_penalty.is_finite() || *distance_penalty < 0.0 {
                    return Err(ScoringError::InvalidWeights(format!(
                        "distance_penalty must be a non-negative number, got {distance_penalty}"
                    )));
                }
                (
                    MetricKind::Hybrid {
                        distance_penalty: *distance_penalty,
                    },
                    resolve_weights(weights, dimensions)?,
                )
            }
        };

        let max_distance = scale.max() * weights.iter().sum::<f64>().sqrt();

        Ok(Self {
            kind,
            weights,
            max_distance,
        })
    }

    /// Build the metric configured on `instrument`.
    pub fn for_instrument(instrument: &Instrument) -> Result<Self, ScoringError> {
        Self::new(
            &instrument.matching,
            &instrument.dimensions,
            instrument.scale,
        )
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weighted Euclidean distance (plain Euclidean when all weights are 1).
    pub fn distance(&self, user: &[f64], archetype: &[f64]) -> f64 {
        user.iter()
            .zip(archetype)
            .zip(&self.weights)
            .map(|((u, a), w)| w * (u - a) * (u - a))
            .sum::<f64>()
            .sqrt()
    }

    /// Goodness of fit; higher is better.
    ///
    /// Distance metrics return the negated distance. The hybrid metric
    /// returns weighted cosine similarity minus the penalized, normalized
    /// distance.
    pub fn fit(&self, user: &[f64], archetype: &[f64]) -> f64 {
        match self.kind {
            MetricKind::Euclidean | MetricKind::Weighted => -self.distance(user, archetype),
            MetricKind::Hybrid { distance_penalty } => {
                let similarity = self.cosine_similarity(user, archetype);
                let normalized = if self.max_distance > 0.0 {
                    self.distance(user, archetype) / self.max_distance
                } else {
                    0.0
                };
                similarity - distance_penalty * normalized
            }
        }
    }

    fn cosine_similarity(&self, a: &[f64], b: &[f64]) -> f64 {
        let mut dot = 0.0;
        let mut norm_a = 0.0;
        let mut norm_b = 0.0;
        for ((x, y), w) in a.iter().zip(b).zip(&self.weights) {
            dot += w * x * y;
            norm_a += w * x * x;
            norm_b += w * y * y;
        }
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

fn resolve_weights(
    weights: &std::collections::HashMap<String, f64>,
    dimensions: &[String],
) -> Result<Vec<f64>, ScoringError> {
    if let Some(unknown) = weights.keys().find(|k| !dimensions.contains(k)) {
        return Err(ScoringError::UnknownDimension(unknown.clone()));
    }

    let resolved: Vec<f64> = dimensions
        .iter()
        .map(|d| weights.get(d).copied().unwrap_or(1.0))
        .collect();

    if let Some((dim, w)) = dimensions
        .iter()
        .zip(&resolved)
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(ScoringError::InvalidWeights(format!(
            "weight for '{dim}' must be a non-negative number, got {w}"
        )));
    }
    if !dimensions.is_empty() && resolved.iter().all(|w| *w == 0.0) {
        return Err(ScoringError::InvalidWeights("all weights are zero".into()));
    }

    Ok(resolved)
}

/// The archetype chosen for a score vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeMatch {
    pub name: String,
    /// Plain Euclidean distance to the archetype.
    pub distance: f64,
    /// Metric fit (higher is better).
    pub fit: f64,
}

/// Diagnostics for one archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDistance {
    pub name: String,
    pub euclidean: f64,
    pub fit: f64,
    pub energy: f64,
}

/// An instrument's catalog, resolved for repeated matching.
#[derive(Debug, Clone)]
pub struct Matcher {
    metric: Metric,
    names: Vec<String>,
    vectors: Vec<Vec<f64>>,
}

impl Matcher {
    pub fn new(instrument: &Instrument) -> Result<Self, ScoringError> {
        let metric = Metric::for_instrument(instrument)?;
        let names = instrument.archetypes.iter().map(|a| a.name.clone()).collect();
        let vectors = instrument
            .archetypes
            .iter()
            .map(|a| a.vector_for(&instrument.dimensions))
            .collect();
        Ok(Self {
            metric,
            names,
            vectors,
        })
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    /// Archetype names in catalog order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of the best-fitting archetype. Ties go to the earliest entry.
    pub fn best(&self, user: &[f64]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, vector) in self.vectors.iter().enumerate() {
            let fit = self.metric.fit(user, vector);
            match best {
                Some((_, best_fit)) if fit <= best_fit => {}
                _ => best = Some((i, fit)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// The best-fitting archetype for `scores`, or `None` for an empty catalog.
    pub fn determine(&self, scores: &DimensionScores) -> Option<ArchetypeMatch> {
        let user = scores.as_vector();
        self.best(&user).map(|i| ArchetypeMatch {
            name: self.names[i].clone(),
            distance: euclidean(&user, &self.vectors[i]),
            fit: self.metric.fit(&user, &self.vectors[i]),
        })
    }

    /// Distance, fit and energy for every archetype, in catalog order.
    pub fn distances(&self, scores: &DimensionScores, temperature: f64) -> Vec<ArchetypeDistance> {
        let user = scores.as_vector();
        self.names
            .iter()
            .zip(&self.vectors)
            .map(|(name, vector)| {
                let d = euclidean(&user, vector);
                ArchetypeDistance {
                    name: name.clone(),
                    euclidean: d,
                    fit: self.metric.fit(&user, vector),
                    energy: distance_to_energy(d, temperature),
                }
            })
            .collect()
    }
}

/// Find the archetype closest to `scores` under the instrument's metric.
pub fn determine_archetype(
    scores: &DimensionScores,
    instrument: &Instrument,
) -> Result<Option<ArchetypeMatch>, ScoringError> {
    Ok(Matcher::new(instrument)?.determine(scores))
}

/// Per-archetype distance diagnostics at the scale's default temperature.
pub fn compute_archetype_distances(
    scores: &DimensionScores,
    instrument: &Instrument,
) -> Result<Vec<ArchetypeDistance>, ScoringError> {
    let temperature = instrument.scale.default_energy_temperature();
    Ok(Matcher::new(instrument)?.distances(scores, temperature))
}
