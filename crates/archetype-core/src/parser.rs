//! Instrument loading and validation.
//!
//! Instruments are normally TOML files. The legacy layout of the original
//! quiz apps, a directory holding `questions.json` and `archetypes.json`, is
//! also accepted and mapped onto the innovator engine defaults.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::matching::Metric;
use crate::model::{
    Archetype, HeatmapGrid, Instrument, MatchMethod, Question, ScoreScale, SectionSpec,
    SimulationDefaults, INNOVATOR_DIMENSIONS,
};
use crate::simulation::SimulationConfig;

/// Intermediate TOML structure for parsing instrument files.
#[derive(Debug, Deserialize)]
struct TomlInstrumentFile {
    instrument: TomlInstrumentHeader,
    #[serde(default)]
    matching: MatchMethod,
    #[serde(default)]
    simulation: SimulationDefaults,
    #[serde(default)]
    sections: Vec<SectionSpec>,
    #[serde(default)]
    grid: Option<HeatmapGrid>,
    #[serde(default)]
    questions: Vec<Question>,
    #[serde(default)]
    archetypes: Vec<Archetype>,
}

#[derive(Debug, Deserialize)]
struct TomlInstrumentHeader {
    id: String,
    name: String,
    #[serde(default)]
    tagline: String,
    #[serde(default = "default_scale_str")]
    scale: String,
    dimensions: Vec<String>,
}

fn default_scale_str() -> String {
    "percent".to_string()
}

/// Parse a single TOML file into an `Instrument`.
pub fn parse_instrument(path: &Path) -> Result<Instrument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read instrument file: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        return serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()));
    }

    parse_instrument_str(&content, path)
}

/// Parse a TOML string into an `Instrument` (useful for testing).
pub fn parse_instrument_str(content: &str, source_path: &Path) -> Result<Instrument> {
    let parsed: TomlInstrumentFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let scale: ScoreScale = parsed
        .instrument
        .scale
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}", e))?;

    Ok(Instrument {
        id: parsed.instrument.id,
        name: parsed.instrument.name,
        tagline: parsed.instrument.tagline,
        scale,
        dimensions: parsed.instrument.dimensions,
        matching: parsed.matching,
        simulation: parsed.simulation,
        sections: parsed.sections,
        grid: parsed.grid,
        questions: parsed.questions,
        archetypes: parsed.archetypes,
    })
}

/// Legacy `questions.json` entry.
#[derive(Debug, Deserialize)]
struct LegacyQuestion {
    #[serde(default)]
    id: Option<Value>,
    question: String,
    #[serde(default = "default_legacy_dimension")]
    dimension: String,
    #[serde(default)]
    reverse: bool,
}

fn default_legacy_dimension() -> String {
    "thinking".to_string()
}

/// Parse a legacy `questions.json` document.
///
/// Question ids come from `id` when present (numbers are stringified) and
/// otherwise from the question text.
pub fn parse_legacy_questions(content: &str) -> Result<Vec<Question>> {
    let raw: Vec<LegacyQuestion> =
        serde_json::from_str(content).context("failed to parse legacy questions JSON")?;

    Ok(raw
        .into_iter()
        .map(|q| {
            let id = match q.id {
                Some(Value::String(s)) => s,
                Some(Value::Null) | None => q.question.clone(),
                Some(other) => other.to_string(),
            };
            Question {
                id,
                text: q.question,
                dimension: q.dimension,
                reverse: q.reverse,
            }
        })
        .collect())
}

/// Parse a legacy `archetypes.json` document, keeping catalog order.
///
/// The vector is read from `vector` or, failing that, `signature`. Every
/// other key holding a list of strings becomes a breakdown section.
pub fn parse_legacy_archetypes(content: &str) -> Result<Vec<Archetype>> {
    let raw: serde_json::Map<String, Value> =
        serde_json::from_str(content).context("failed to parse legacy archetypes JSON")?;

    let mut archetypes = Vec::with_capacity(raw.len());
    for (name, data) in raw {
        let Value::Object(fields) = data else {
            anyhow::bail!("archetype '{name}' must be a JSON object");
        };

        let description = fields
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let vector_source = fields
            .get("vector")
            .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
            .or_else(|| fields.get("signature"));

        let mut vector = HashMap::new();
        if let Some(Value::Object(dims)) = vector_source {
            for (dim, value) in dims {
                let v = value.as_f64().with_context(|| {
                    format!("archetype '{name}': value for '{dim}' is not a number")
                })?;
                vector.insert(dim.clone(), v);
            }
        }

        let mut details = BTreeMap::new();
        for (key, value) in &fields {
            if matches!(key.as_str(), "description" | "vector" | "signature") {
                continue;
            }
            if let Value::Array(items) = value {
                let strings: Vec<String> = items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect();
                details.insert(key.clone(), strings);
            }
        }

        archetypes.push(Archetype {
            name,
            description,
            vector,
            details,
        });
    }

    Ok(archetypes)
}

/// Wrap legacy questions and archetypes in the innovator engine defaults:
/// six dimensions, percent scale, Euclidean matching.
pub fn legacy_innovator_instrument(
    questions: Vec<Question>,
    archetypes: Vec<Archetype>,
) -> Instrument {
    let section = |key: &str, title: &str| SectionSpec {
        key: key.into(),
        title: title.into(),
    };
    let names = |row: [&str; 3]| row.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    Instrument {
        id: "i-type".into(),
        name: "I-TYPE — Innovator Type Assessment".into(),
        tagline: "Powered by the Innovator DNA Index".into(),
        scale: ScoreScale::Percent,
        dimensions: INNOVATOR_DIMENSIONS.iter().map(|d| d.to_string()).collect(),
        matching: MatchMethod::Euclidean,
        simulation: SimulationDefaults::default(),
        sections: vec![
            section("strengths", "Strengths"),
            section("risks", "Growth Edges & Risks"),
            section("pathways", "Recommended Innovation Pathways"),
            section("business_models", "Suggested Business Models"),
            section("funding_strategy", "Funding Strategy Fit"),
        ],
        grid: Some(HeatmapGrid {
            row_labels: names(["Ideation Cluster", "Activation Cluster", "Execution Cluster"]),
            col_labels: names(["Visionary", "Strategist", "Storyteller"]),
            rows: vec![
                names(["Visionary", "Strategist", "Storyteller"]),
                names(["Catalyst", "Apex Innovator", "Integrator"]),
                names(["Engineer", "Operator", "Experimenter"]),
            ],
        }),
        questions,
        archetypes,
    }
}

/// Load a legacy directory containing `questions.json` and `archetypes.json`.
pub fn load_legacy_directory(dir: &Path) -> Result<Instrument> {
    let questions_path = dir.join("questions.json");
    let archetypes_path = dir.join("archetypes.json");

    let questions = std::fs::read_to_string(&questions_path)
        .with_context(|| format!("failed to read {}", questions_path.display()))?;
    let archetypes = std::fs::read_to_string(&archetypes_path)
        .with_context(|| format!("failed to read {}", archetypes_path.display()))?;

    Ok(legacy_innovator_instrument(
        parse_legacy_questions(&questions)?,
        parse_legacy_archetypes(&archetypes)?,
    ))
}

/// Load one instrument from a file or a legacy directory.
pub fn load_instrument(path: &Path) -> Result<Instrument> {
    if path.is_dir() {
        load_legacy_directory(path)
    } else {
        parse_instrument(path)
    }
}

/// Load every instrument reachable from `path`.
///
/// A file yields one instrument. A legacy directory yields one instrument.
/// Any other directory is scanned for `.toml` files; unparsable files are
/// skipped with a warning.
pub fn load_instruments(path: &Path) -> Result<Vec<Instrument>> {
    if !path.is_dir() {
        return Ok(vec![parse_instrument(path)?]);
    }
    if path.join("questions.json").exists() {
        return Ok(vec![load_legacy_directory(path)?]);
    }

    let mut instruments = Vec::new();
    let mut entries: Vec<_> = std::fs::read_dir(path)
        .with_context(|| format!("failed to read directory: {}", path.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let file = entry.path();
        if file.extension().is_some_and(|ext| ext == "toml") {
            match parse_instrument(&file) {
                Ok(instrument) => instruments.push(instrument),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", file.display(), e);
                }
            }
        }
    }

    Ok(instruments)
}

/// A warning from instrument validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id or archetype name concerned (if applicable).
    pub subject: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn new(subject: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Validate an instrument for common authoring mistakes.
pub fn validate_instrument(instrument: &Instrument) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let dims: HashSet<&str> = instrument.dimensions.iter().map(String::as_str).collect();

    if instrument.dimensions.is_empty() {
        warnings.push(ValidationWarning::new(None, "instrument defines no dimensions"));
    }
    if dims.len() != instrument.dimensions.len() {
        warnings.push(ValidationWarning::new(None, "duplicate dimension names"));
    }
    if instrument.questions.is_empty() {
        warnings.push(ValidationWarning::new(None, "instrument has no questions"));
    }
    if instrument.archetypes.is_empty() {
        warnings.push(ValidationWarning::new(None, "archetype catalog is empty"));
    }

    // Questions
    let mut seen_ids = HashSet::new();
    for q in &instrument.questions {
        if !seen_ids.insert(q.id.as_str()) {
            warnings.push(ValidationWarning::new(
                Some(q.id.as_str()),
                format!("duplicate question ID: {}", q.id),
            ));
        }
        if !dims.contains(q.dimension.as_str()) {
            warnings.push(ValidationWarning::new(
                Some(q.id.as_str()),
                format!(
                    "question loads on unknown dimension '{}' and will be ignored",
                    q.dimension
                ),
            ));
        }
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning::new(Some(q.id.as_str()), "question text is empty"));
        }
    }

    for dim in &instrument.dimensions {
        if !instrument.questions.iter().any(|q| &q.dimension == dim) {
            warnings.push(ValidationWarning::new(
                None,
                format!("dimension '{dim}' has no questions and will score the midpoint"),
            ));
        }
    }

    // Archetypes
    let max = instrument.scale.max();
    let mut seen_names = HashSet::new();
    for a in &instrument.archetypes {
        if !seen_names.insert(a.name.as_str()) {
            warnings.push(ValidationWarning::new(
                Some(a.name.as_str()),
                format!("duplicate archetype name: {}", a.name),
            ));
        }
        let missing: Vec<&str> = instrument
            .dimensions
            .iter()
            .filter(|d| !a.vector.contains_key(*d))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            warnings.push(ValidationWarning::new(
                Some(a.name.as_str()),
                format!("vector missing dimensions (read as 0): {}", missing.join(", ")),
            ));
        }
        let mut unknown: Vec<&str> = a
            .vector
            .keys()
            .filter(|k| !dims.contains(k.as_str()))
            .map(String::as_str)
            .collect();
        unknown.sort_unstable();
        if !unknown.is_empty() {
            warnings.push(ValidationWarning::new(
                Some(a.name.as_str()),
                format!("vector names unknown dimensions: {}", unknown.join(", ")),
            ));
        }
        for dim in &instrument.dimensions {
            if let Some(&v) = a.vector.get(dim) {
                if !(0.0..=max).contains(&v) {
                    warnings.push(ValidationWarning::new(
                        Some(a.name.as_str()),
                        format!(
                            "value {v} for '{dim}' is outside the {} scale (0–{max})",
                            instrument.scale
                        ),
                    ));
                }
            }
        }
    }

    // Heatmap grid
    if let Some(grid) = &instrument.grid {
        for row in &grid.rows {
            for cell in row {
                if instrument.archetype(cell).is_none() {
                    warnings.push(ValidationWarning::new(
                        Some(cell.as_str()),
                        "heatmap grid names an unknown archetype",
                    ));
                }
            }
            if !grid.col_labels.is_empty() && row.len() != grid.col_labels.len() {
                warnings.push(ValidationWarning::new(
                    None,
                    "heatmap grid row length does not match column labels",
                ));
            }
        }
        if !grid.row_labels.is_empty() && grid.row_labels.len() != grid.rows.len() {
            warnings.push(ValidationWarning::new(
                None,
                "heatmap grid row count does not match row labels",
            ));
        }
    }

    // Scoring settings
    if let Err(e) = Metric::for_instrument(instrument) {
        warnings.push(ValidationWarning::new(None, format!("matching: {e}")));
    }
    let sim = SimulationConfig::for_instrument(instrument);
    if let Err(e) = sim.validate() {
        warnings.push(ValidationWarning::new(None, format!("simulation: {e}")));
    }

    warnings
}
