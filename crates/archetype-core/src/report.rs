//! Assessment report types with JSON persistence and retake comparison.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::Assessment;
use crate::model::{Instrument, InstrumentSummary};

/// A complete, persisted assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the assessment was scored.
    pub created_at: DateTime<Utc>,
    /// Which instrument produced it.
    pub instrument: InstrumentSummary,
    /// Scores, matches and simulation outcome.
    pub assessment: Assessment,
}

impl AssessmentReport {
    pub fn new(instrument: &Instrument, assessment: Assessment) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            instrument: instrument.summary(),
            assessment,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AssessmentReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Compare this report against an earlier one.
    ///
    /// `threshold` is in percentage points of the scale; dimension changes
    /// at or below it count as unchanged.
    pub fn compare(&self, baseline: &AssessmentReport, threshold: f64) -> ProfileShift {
        let mut shifts = Vec::new();
        let mut unchanged = 0usize;
        let mut new_dimensions = 0usize;

        let baseline_scale = baseline.assessment.scores.scale;
        let current_scale = self.assessment.scores.scale;

        for current in self.assessment.scores.iter() {
            match baseline.assessment.scores.get(&current.dimension) {
                Some(before) => {
                    let before = baseline_scale.to_percent(before);
                    let after = current_scale.to_percent(current.score);
                    let delta = after - before;
                    if delta.abs() > threshold {
                        shifts.push(DimensionShift {
                            dimension: current.dimension.clone(),
                            baseline_score: before,
                            current_score: after,
                            delta,
                        });
                    } else {
                        unchanged += 1;
                    }
                }
                None => new_dimensions += 1,
            }
        }

        let removed_dimensions = baseline
            .assessment
            .scores
            .iter()
            .filter(|b| self.assessment.scores.get(&b.dimension).is_none())
            .count();

        let baseline_primary = baseline.assessment.primary_name().map(str::to_string);
        let current_primary = self.assessment.primary_name().map(str::to_string);

        ProfileShift {
            same_instrument: baseline.instrument.id == self.instrument.id,
            archetype_changed: baseline_primary != current_primary,
            baseline_primary,
            current_primary,
            stability_delta: self.assessment.stability.stability
                - baseline.assessment.stability.stability,
            shifts,
            unchanged,
            new_dimensions,
            removed_dimensions,
        }
    }
}

/// Result of comparing two assessments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileShift {
    /// Whether both reports come from the same instrument.
    pub same_instrument: bool,
    pub baseline_primary: Option<String>,
    pub current_primary: Option<String>,
    pub archetype_changed: bool,
    /// Change in stability, percentage points.
    pub stability_delta: f64,
    /// Dimensions that moved by more than the threshold.
    pub shifts: Vec<DimensionShift>,
    /// Dimensions with no significant change.
    pub unchanged: usize,
    /// Dimensions in current but not baseline.
    pub new_dimensions: usize,
    /// Dimensions in baseline but not current.
    pub removed_dimensions: usize,
}

/// A significant change on one dimension, on a 0–100 display scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionShift {
    pub dimension: String,
    pub baseline_score: f64,
    pub current_score: f64,
    pub delta: f64,
}

impl ProfileShift {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let name = |n: &Option<String>| n.clone().unwrap_or_else(|| "None".to_string());

        md.push_str(&format!(
            "**Summary:** {} shifted, {} unchanged; archetype {} → {}{}\n\n",
            self.shifts.len(),
            self.unchanged,
            name(&self.baseline_primary),
            name(&self.current_primary),
            if self.archetype_changed {
                " (changed)"
            } else {
                ""
            }
        ));

        md.push_str(&format!(
            "**Stability:** {:+.1} points\n\n",
            self.stability_delta
        ));

        if !self.same_instrument {
            md.push_str("> Reports come from different instruments.\n\n");
        }

        if !self.shifts.is_empty() {
            md.push_str("### Dimension shifts\n\n");
            md.push_str("| Dimension | Baseline | Current | Delta |\n");
            md.push_str("|-----------|----------|---------|-------|\n");
            for s in &self.shifts {
                md.push_str(&format!(
                    "| {} | {:.1} | {:.1} | {:+.1} |\n",
                    s.dimension, s.baseline_score, s.current_score, s.delta
                ));
            }
        }

        md
    }

    /// Returns true if anything moved beyond the threshold.
    pub fn has_shifts(&self) -> bool {
        self.archetype_changed || !self.shifts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likert::DimensionScores;
    use crate::matching::ArchetypeMatch;
    use crate::model::ScoreScale;
    use crate::simulation::{ArchetypeProbability, StabilityReport};

    fn make_report(primary: &str, scores: &[f64], stability: f64) -> AssessmentReport {
        let dims: Vec<String> = vec!["thinking".into(), "risk".into()];
        AssessmentReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            instrument: InstrumentSummary {
                id: "i-type".into(),
                name: "I-Type".into(),
                scale: ScoreScale::Percent,
                dimensions: dims.clone(),
                question_count: 2,
                archetype_count: 2,
            },
            assessment: Assessment {
                answers: vec![],
                scores: DimensionScores::from_vector(&dims, scores, ScoreScale::Percent),
                primary: Some(ArchetypeMatch {
                    name: primary.into(),
                    distance: 1.0,
                    fit: -1.0,
                }),
                distances: vec![],
                stability: StabilityReport {
                    trials: 100,
                    noise: 4.0,
                    seed: Some(1),
                    probabilities: vec![ArchetypeProbability {
                        name: primary.into(),
                        count: 100,
                        probability: stability,
                    }],
                    stability,
                    shadow: None,
                },
            },
        }
    }

    #[test]
    fn compare_identical_reports() {
        let a = make_report("Visionary", &[80.0, 40.0], 90.0);
        let shift = a.compare(&a.clone(), 5.0);
        assert!(!shift.has_shifts());
        assert_eq!(shift.unchanged, 2);
        assert_eq!(shift.stability_delta, 0.0);
        assert!(shift.same_instrument);
    }

    #[test]
    fn compare_detects_archetype_change_and_shifts() {
        let baseline = make_report("Visionary", &[80.0, 40.0], 90.0);
        let current = make_report("Operator", &[50.0, 42.0], 70.0);
        let shift = current.compare(&baseline, 5.0);

        assert!(shift.archetype_changed);
        assert_eq!(shift.shifts.len(), 1);
        assert_eq!(shift.shifts[0].dimension, "thinking");
        assert!((shift.shifts[0].delta + 30.0).abs() < 1e-9);
        assert_eq!(shift.unchanged, 1);
        assert!((shift.stability_delta + 20.0).abs() < 1e-9);

        let md = shift.to_markdown();
        assert!(md.contains("Visionary → Operator (changed)"));
        assert!(md.contains("| thinking |"));
    }

    #[test]
    fn compare_across_scales() {
        let baseline = make_report("Analyst", &[80.0, 40.0], 90.0);
        let mut current = make_report("Analyst", &[0.8, 0.4], 90.0);
        current.assessment.scores.scale = ScoreScale::Unit;
        let shift = current.compare(&baseline, 1.0);
        assert!(shift.shifts.is_empty());
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report("Visionary", &[80.0, 40.0], 90.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = AssessmentReport::load_json(&path).unwrap();

        assert_eq!(loaded.instrument.id, "i-type");
        assert_eq!(loaded.assessment.primary_name(), Some("Visionary"));
        assert_eq!(loaded.assessment.scores, report.assessment.scores);
    }
}
