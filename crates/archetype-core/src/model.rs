//! Core data model types for archetype.
//!
//! An [`Instrument`] bundles everything needed to run one questionnaire:
//! its dimensions, questions, archetype catalog, matching method, and the
//! presentation metadata (breakdown sections, heatmap grid) that reports use.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Dimensions of the innovator engine, in vector order.
pub const INNOVATOR_DIMENSIONS: [&str; 6] = [
    "thinking",
    "execution",
    "risk",
    "motivation",
    "team",
    "commercial",
];

/// Range that normalized dimension scores live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreScale {
    /// 0–100, used by the I-Type instrument.
    #[default]
    Percent,
    /// 0–1, used by the D-Type instrument.
    Unit,
}

impl ScoreScale {
    /// Upper bound of the scale (lower bound is always 0).
    pub fn max(self) -> f64 {
        match self {
            ScoreScale::Percent => 100.0,
            ScoreScale::Unit => 1.0,
        }
    }

    /// Score assigned to a dimension with no answered items.
    pub fn midpoint(self) -> f64 {
        self.max() / 2.0
    }

    /// Default Monte Carlo noise standard deviation for this scale.
    pub fn default_noise(self) -> f64 {
        self.max() * 0.04
    }

    /// Default temperature for the distance-to-energy transform.
    pub fn default_energy_temperature(self) -> f64 {
        self.max() * 0.6
    }

    /// Convert a score on this scale to a 0–100 display value.
    pub fn to_percent(self, value: f64) -> f64 {
        value / self.max() * 100.0
    }
}

impl fmt::Display for ScoreScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreScale::Percent => write!(f, "percent"),
            ScoreScale::Unit => write!(f, "unit"),
        }
    }
}

impl FromStr for ScoreScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "percent" | "0-100" => Ok(ScoreScale::Percent),
            "unit" | "0-1" => Ok(ScoreScale::Unit),
            other => Err(format!("unknown score scale: {other}")),
        }
    }
}

/// A single Likert-scale questionnaire item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier used by answer files.
    pub id: String,
    /// The statement shown to the respondent.
    pub text: String,
    /// Dimension this item loads on.
    pub dimension: String,
    /// Whether agreement lowers the dimension score.
    #[serde(default)]
    pub reverse: bool,
}

/// A predefined archetype in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    /// Display name, unique within an instrument.
    pub name: String,
    /// Short description shown on the result card.
    #[serde(default)]
    pub description: String,
    /// Position of the archetype in dimension space.
    #[serde(default)]
    pub vector: HashMap<String, f64>,
    /// Breakdown lists keyed by section (e.g. "strengths", "blindspots").
    #[serde(default)]
    pub details: BTreeMap<String, Vec<String>>,
}

impl Archetype {
    /// Value on `dimension`, reading a missing entry as 0.0.
    pub fn value(&self, dimension: &str) -> f64 {
        self.vector.get(dimension).copied().unwrap_or(0.0)
    }

    /// The archetype vector laid out in `dimensions` order.
    pub fn vector_for(&self, dimensions: &[String]) -> Vec<f64> {
        dimensions.iter().map(|d| self.value(d)).collect()
    }

    /// Items listed under a breakdown section, empty if absent.
    pub fn details(&self, key: &str) -> &[String] {
        self.details.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// How the user vector is compared with archetype vectors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum MatchMethod {
    /// Plain Euclidean distance; nearest archetype wins.
    #[default]
    Euclidean,
    /// Per-dimension weighted Euclidean distance.
    Weighted {
        #[serde(default)]
        weights: HashMap<String, f64>,
    },
    /// Weighted cosine similarity minus a normalized distance penalty.
    Hybrid {
        #[serde(default)]
        weights: HashMap<String, f64>,
        #[serde(default = "default_distance_penalty")]
        distance_penalty: f64,
    },
}

fn default_distance_penalty() -> f64 {
    0.5
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMethod::Euclidean => write!(f, "euclidean"),
            MatchMethod::Weighted { .. } => write!(f, "weighted"),
            MatchMethod::Hybrid { .. } => write!(f, "hybrid"),
        }
    }
}

/// Instrument-level Monte Carlo defaults. Unset fields fall back to the
/// scale defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationDefaults {
    #[serde(default)]
    pub trials: Option<u32>,
    #[serde(default)]
    pub noise: Option<f64>,
}

/// A titled breakdown section rendered for an archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Key into [`Archetype::details`].
    pub key: String,
    /// Heading shown above the items.
    pub title: String,
}

/// Grid layout used to display archetype probabilities as a heatmap.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeatmapGrid {
    #[serde(default)]
    pub row_labels: Vec<String>,
    #[serde(default)]
    pub col_labels: Vec<String>,
    /// Archetype names, row-major.
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// A complete questionnaire definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Unique identifier (e.g. "i-type").
    pub id: String,
    /// Human-readable title.
    pub name: String,
    /// Subtitle shown under the title.
    #[serde(default)]
    pub tagline: String,
    /// Scale of normalized scores and archetype vectors.
    #[serde(default)]
    pub scale: ScoreScale,
    /// Dimensions in vector order.
    pub dimensions: Vec<String>,
    /// Matching method.
    #[serde(default)]
    pub matching: MatchMethod,
    /// Monte Carlo defaults.
    #[serde(default)]
    pub simulation: SimulationDefaults,
    /// Breakdown sections, in display order.
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
    /// Optional heatmap layout.
    #[serde(default)]
    pub grid: Option<HeatmapGrid>,
    /// Questionnaire items, in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Archetype catalog, in catalog order.
    #[serde(default)]
    pub archetypes: Vec<Archetype>,
}

impl Instrument {
    /// Look up an archetype by name.
    pub fn archetype(&self, name: &str) -> Option<&Archetype> {
        self.archetypes.iter().find(|a| a.name == name)
    }

    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Whether `dimension` is one of this instrument's dimensions.
    pub fn has_dimension(&self, dimension: &str) -> bool {
        self.dimensions.iter().any(|d| d == dimension)
    }

    /// Effective number of Monte Carlo trials.
    pub fn default_trials(&self) -> u32 {
        self.simulation.trials.unwrap_or(4000)
    }

    /// Effective Monte Carlo noise standard deviation.
    pub fn default_noise(&self) -> f64 {
        self.simulation
            .noise
            .unwrap_or_else(|| self.scale.default_noise())
    }

    /// Header-only summary, stored in reports.
    pub fn summary(&self) -> InstrumentSummary {
        InstrumentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            scale: self.scale,
            dimensions: self.dimensions.clone(),
            question_count: self.questions.len(),
            archetype_count: self.archetypes.len(),
        }
    }
}

/// Summary of an instrument (without questions or catalog).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSummary {
    pub id: String,
    pub name: String,
    pub scale: ScoreScale,
    pub dimensions: Vec<String>,
    pub question_count: usize,
    pub archetype_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_bounds() {
        assert_eq!(ScoreScale::Percent.max(), 100.0);
        assert_eq!(ScoreScale::Percent.midpoint(), 50.0);
        assert_eq!(ScoreScale::Unit.midpoint(), 0.5);
        assert!((ScoreScale::Percent.default_noise() - 4.0).abs() < 1e-12);
        assert!((ScoreScale::Unit.default_noise() - 0.04).abs() < 1e-12);
        assert!((ScoreScale::Percent.default_energy_temperature() - 60.0).abs() < 1e-12);
        assert!((ScoreScale::Unit.to_percent(0.25) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn scale_display_and_parse() {
        assert_eq!(ScoreScale::Unit.to_string(), "unit");
        assert_eq!("Percent".parse::<ScoreScale>().unwrap(), ScoreScale::Percent);
        assert_eq!("0-1".parse::<ScoreScale>().unwrap(), ScoreScale::Unit);
        assert!("stanine".parse::<ScoreScale>().is_err());
    }

    #[test]
    fn archetype_missing_dimension_reads_zero() {
        let a = Archetype {
            name: "Visionary".into(),
            description: String::new(),
            vector: HashMap::from([("thinking".to_string(), 90.0)]),
            details: BTreeMap::new(),
        };
        let dims: Vec<String> = vec!["thinking".into(), "risk".into()];
        assert_eq!(a.vector_for(&dims), vec![90.0, 0.0]);
        assert!(a.details("strengths").is_empty());
    }

    #[test]
    fn match_method_tagged_serde() {
        let m: MatchMethod = toml::from_str(
            r#"
method = "hybrid"
weights = { thinking = 2.0 }
"#,
        )
        .unwrap();
        match m {
            MatchMethod::Hybrid {
                weights,
                distance_penalty,
            } => {
                assert_eq!(weights.get("thinking"), Some(&2.0));
                assert_eq!(distance_penalty, 0.5);
            }
            other => panic!("expected hybrid, got {other}"),
        }
    }
}
