//! Consent-gated local response log.
//!
//! Each scored assessment may be appended to a JSON-lines file. Nothing is
//! written unless logging is enabled and the respondent agreed to it.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assessment::Assessment;
use crate::simulation::StabilityReport;

/// One logged assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub timestamp: DateTime<Utc>,
    pub instrument: String,
    pub archetype: String,
    /// Percent, rounded to two decimals.
    pub stability: f64,
    /// `"Name (pct%)"` with pct rounded to two decimals, `"None (0.0%)"` without one.
    pub shadow: String,
    pub scores: BTreeMap<String, f64>,
    /// Raw 1–5 answers keyed by question id, before reverse scoring.
    pub answers: BTreeMap<String, u8>,
}

impl ResponseRecord {
    pub fn from_assessment(instrument_id: &str, assessment: &Assessment) -> Self {
        Self {
            timestamp: Utc::now(),
            instrument: instrument_id.to_string(),
            archetype: assessment.primary_name().unwrap_or("None").to_string(),
            stability: round2(assessment.stability.stability),
            shadow: shadow_entry(&assessment.stability),
            scores: assessment
                .scores
                .iter()
                .map(|s| (s.dimension.clone(), s.score))
                .collect(),
            answers: assessment
                .answers
                .iter()
                .map(|a| (a.question_id.clone(), a.value.value()))
                .collect(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shadow column text, e.g. `"Strategist (12.35%)"`.
fn shadow_entry(report: &StabilityReport) -> String {
    let (name, pct) = match &report.shadow {
        Some(s) => (s.name.as_str(), round2(s.probability)),
        None => ("None", 0.0),
    };
    if pct.fract() == 0.0 {
        format!("{name} ({pct:.1}%)")
    } else {
        format!("{name} ({pct}%)")
    }
}

/// Append-only JSON-lines log of responses.
#[derive(Debug, Clone)]
pub struct ResponseLog {
    path: PathBuf,
}

impl ResponseLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file and its parent directory as needed.
    pub fn append(&self, record: &ResponseRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create log directory: {}", parent.display())
                })?;
            }
        }
        let line = serde_json::to_string(record).context("failed to serialize response")?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open response log: {}", self.path.display()))?;
        writeln!(file, "{line}")
            .with_context(|| format!("failed to write response log: {}", self.path.display()))?;
        Ok(())
    }

    /// Log `record` if `consent` is given. Failures are reported as warnings.
    ///
    /// Returns whether a record was written.
    pub fn record(&self, record: &ResponseRecord, consent: bool) -> bool {
        if !consent {
            tracing::debug!("respondent declined logging");
            return false;
        }
        match self.append(record) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "response logged");
                true
            }
            Err(e) => {
                tracing::warn!("could not log response: {e:#}");
                false
            }
        }
    }

    /// Read every record back, in file order.
    pub fn read_all(&self) -> Result<Vec<ResponseRecord>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read response log: {}", self.path.display()))?;
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str(line).with_context(|| {
                    format!("invalid record on line {} of {}", i + 1, self.path.display())
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{assess, AssessmentOptions};
    use crate::likert::{AnswerSheet, Likert};
    use crate::matching::tests::{archetype, instrument};
    use crate::model::{MatchMethod, Question};
    use crate::simulation::{rank_counts, SimulationConfig};

    fn sample_assessment() -> Assessment {
        let mut inst = instrument(
            MatchMethod::Euclidean,
            vec![
                archetype("High", &["x", "y"], &[90.0, 90.0]),
                archetype("Low", &["x", "y"], &[10.0, 10.0]),
            ],
        );
        inst.questions = vec![Question {
            id: "q1".into(),
            text: "Q".into(),
            dimension: "x".into(),
            reverse: false,
        }];
        let mut sheet = AnswerSheet::new();
        sheet.set("q1", Likert::new(5).unwrap());
        let options = AssessmentOptions {
            simulation: SimulationConfig {
                trials: 200,
                noise: 4.0,
                seed: Some(3),
            },
            energy_temperature: None,
        };
        assess(&inst, &sheet, &options).unwrap()
    }

    #[test]
    fn record_fields() {
        let assessment = sample_assessment();
        let record = ResponseRecord::from_assessment("test", &assessment);
        assert_eq!(record.archetype, "High");
        assert_eq!(record.answers.get("q1"), Some(&5));
        assert_eq!(record.scores.get("x"), Some(&100.0));
        assert_eq!(record.scores.get("y"), Some(&50.0));
        assert_eq!(record.stability, (record.stability * 100.0).round() / 100.0);
        assert_eq!(record.shadow, shadow_entry(&assessment.stability));
    }

    #[test]
    fn shadow_entry_keeps_two_decimals() {
        let names: Vec<String> = vec!["Visionary".into(), "Strategist".into()];
        let config = SimulationConfig {
            trials: 4000,
            ..Default::default()
        };
        let report = rank_counts(&names, &[3506, 494], &config);
        assert_eq!(shadow_entry(&report), "Strategist (12.35%)");

        let whole = rank_counts(&names, &[3000, 1000], &config);
        assert_eq!(shadow_entry(&whole), "Strategist (25.0%)");

        let only = rank_counts(&names[..1], &[4000], &config);
        assert_eq!(shadow_entry(&only), "Visionary (100.0%)");
    }

    #[test]
    fn shadow_entry_for_empty_catalog() {
        let config = SimulationConfig::default();
        let report = rank_counts(&[], &[], &config);
        assert_eq!(shadow_entry(&report), "None (0.0%)");
    }

    #[test]
    fn appends_only_with_consent() {
        let dir = tempfile::tempdir().unwrap();
        let log = ResponseLog::new(dir.path().join("logs").join("responses.jsonl"));
        let record = ResponseRecord::from_assessment("test", &sample_assessment());

        assert!(!log.record(&record, false));
        assert!(!log.path().exists());

        assert!(log.record(&record, true));
        assert!(log.record(&record, true));
        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], record);
    }

    #[test]
    fn write_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the open fail.
        let log = ResponseLog::new(dir.path());
        let record = ResponseRecord::from_assessment("test", &sample_assessment());
        assert!(!log.record(&record, true));
        assert!(log.append(&record).is_err());
    }
}
