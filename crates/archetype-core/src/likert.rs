//! Likert answers and per-dimension score normalization.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::model::{Instrument, ScoreScale};

/// Anchor labels for the five Likert points.
pub const LIKERT_LABELS: [&str; 5] = [
    "Strongly Disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly Agree",
];

/// A validated answer on the 1..=5 agreement scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Likert(u8);

impl Likert {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// Value assumed for unanswered questions.
    pub const NEUTRAL: Likert = Likert(3);

    pub fn new(value: i64) -> Result<Self, ScoringError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Likert(value as u8))
        } else {
            Err(ScoringError::InvalidLikert(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Reverse-scored value: 1 ↔ 5, 2 ↔ 4.
    pub fn reversed(self) -> Likert {
        Likert(Self::MIN + Self::MAX - self.0)
    }

    pub fn label(self) -> &'static str {
        LIKERT_LABELS[(self.0 - 1) as usize]
    }
}

impl Default for Likert {
    fn default() -> Self {
        Likert::NEUTRAL
    }
}

impl TryFrom<i64> for Likert {
    type Error = ScoringError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Likert::new(value)
    }
}

impl From<Likert> for u8 {
    fn from(l: Likert) -> u8 {
        l.0
    }
}

impl fmt::Display for Likert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw answers keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    values: HashMap<String, Likert>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sheet from raw integers, rejecting out-of-range values and
    /// ids the instrument does not define.
    pub fn from_raw(
        instrument: &Instrument,
        raw: &HashMap<String, i64>,
    ) -> Result<Self, ScoringError> {
        let mut sheet = AnswerSheet::new();
        for (id, &value) in raw {
            if instrument.question(id).is_none() {
                return Err(ScoringError::UnknownQuestion(id.clone()));
            }
            sheet.set(id.clone(), Likert::new(value)?);
        }
        Ok(sheet)
    }

    pub fn set(&mut self, question_id: impl Into<String>, value: Likert) {
        self.values.insert(question_id.into(), value);
    }

    /// The answer for `question_id`, or neutral if unanswered.
    pub fn get(&self, question_id: &str) -> Likert {
        self.values.get(question_id).copied().unwrap_or_default()
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.values.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One answer resolved against its question's scoring metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    pub question_id: String,
    pub value: Likert,
    pub dimension: String,
    pub reverse: bool,
}

impl ScoredAnswer {
    /// Value after applying reverse scoring.
    pub fn effective(&self) -> Likert {
        if self.reverse {
            self.value.reversed()
        } else {
            self.value
        }
    }
}

/// Resolve every question of `instrument` against `sheet`, defaulting
/// unanswered questions to neutral.
pub fn collect_answers(instrument: &Instrument, sheet: &AnswerSheet) -> Vec<ScoredAnswer> {
    instrument
        .questions
        .iter()
        .map(|q| ScoredAnswer {
            question_id: q.id.clone(),
            value: sheet.get(&q.id),
            dimension: q.dimension.clone(),
            reverse: q.reverse,
        })
        .collect()
}

/// Normalized score for a single dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension: String,
    pub score: f64,
}

/// Normalized scores for every dimension, in instrument order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub scale: ScoreScale,
    pub scores: Vec<DimensionScore>,
}

impl DimensionScores {
    /// Build scores directly from a vector laid out in `dimensions` order.
    pub fn from_vector(dimensions: &[String], values: &[f64], scale: ScoreScale) -> Self {
        Self {
            scale,
            scores: dimensions
                .iter()
                .zip(values)
                .map(|(d, &score)| DimensionScore {
                    dimension: d.clone(),
                    score,
                })
                .collect(),
        }
    }

    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.dimension == dimension)
            .map(|s| s.score)
    }

    pub fn as_vector(&self) -> Vec<f64> {
        self.scores.iter().map(|s| s.score).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionScore> {
        self.scores.iter()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Convert Likert answers into per-dimension scores on `scale`.
///
/// Each dimension's effective answers are averaged and mapped linearly from
/// 1..=5 onto `0..=scale.max()`. A dimension without any items gets the
/// scale midpoint. Answers on dimensions outside `dimensions` are ignored.
pub fn normalize_scores(
    answers: &[ScoredAnswer],
    dimensions: &[String],
    scale: ScoreScale,
) -> DimensionScores {
    let mut buckets: HashMap<&str, (u32, u32)> =
        dimensions.iter().map(|d| (d.as_str(), (0, 0))).collect();

    for answer in answers {
        match buckets.get_mut(answer.dimension.as_str()) {
            Some((sum, count)) => {
                *sum += answer.effective().value() as u32;
                *count += 1;
            }
            None => {
                tracing::debug!(
                    question = %answer.question_id,
                    dimension = %answer.dimension,
                    "ignoring answer on unknown dimension"
                );
            }
        }
    }

    let scores = dimensions
        .iter()
        .map(|d| {
            let (sum, count) = buckets[d.as_str()];
            let score = if count == 0 {
                scale.midpoint()
            } else {
                let avg = sum as f64 / count as f64;
                (avg - 1.0) / 4.0 * scale.max()
            };
            DimensionScore {
                dimension: d.clone(),
                score,
            }
        })
        .collect();

    DimensionScores { scale, scores }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn answer(id: &str, value: i64, dimension: &str, reverse: bool) -> ScoredAnswer {
        ScoredAnswer {
            question_id: id.into(),
            value: Likert::new(value).unwrap(),
            dimension: dimension.into(),
            reverse,
        }
    }

    #[test]
    fn likert_bounds() {
        assert!(Likert::new(1).is_ok());
        assert!(Likert::new(5).is_ok());
        assert_eq!(Likert::new(0), Err(ScoringError::InvalidLikert(0)));
        assert_eq!(Likert::new(6), Err(ScoringError::InvalidLikert(6)));
        assert_eq!(Likert::default(), Likert::NEUTRAL);
    }

    #[test]
    fn likert_reverse() {
        assert_eq!(Likert::new(1).unwrap().reversed().value(), 5);
        assert_eq!(Likert::new(2).unwrap().reversed().value(), 4);
        assert_eq!(Likert::NEUTRAL.reversed(), Likert::NEUTRAL);
        assert_eq!(Likert::new(5).unwrap().label(), "Strongly Agree");
    }

    #[test]
    fn likert_serde_rejects_out_of_range() {
        let ok: Likert = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Likert>("9").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "4");
    }

    #[test]
    fn normalize_maps_extremes_and_midpoint() {
        let d = dims(&["thinking", "risk", "team"]);
        let answers = vec![
            answer("a", 5, "thinking", false),
            answer("b", 5, "thinking", false),
            answer("c", 1, "risk", false),
        ];
        let scores = normalize_scores(&answers, &d, ScoreScale::Percent);
        assert_eq!(scores.get("thinking"), Some(100.0));
        assert_eq!(scores.get("risk"), Some(0.0));
        // No items on "team" -> midpoint
        assert_eq!(scores.get("team"), Some(50.0));
    }

    #[test]
    fn normalize_applies_reverse_scoring() {
        let d = dims(&["risk"]);
        let answers = vec![answer("a", 1, "risk", true), answer("b", 4, "risk", false)];
        // effective: 5 and 4 -> avg 4.5 -> 87.5
        let scores = normalize_scores(&answers, &d, ScoreScale::Percent);
        assert!((scores.get("risk").unwrap() - 87.5).abs() < 1e-9);
    }

    #[test]
    fn normalize_unit_scale() {
        let d = dims(&["analytical", "composure"]);
        let answers = vec![answer("a", 4, "analytical", false)];
        let scores = normalize_scores(&answers, &d, ScoreScale::Unit);
        assert!((scores.get("analytical").unwrap() - 0.75).abs() < 1e-9);
        assert_eq!(scores.get("composure"), Some(0.5));
    }

    #[test]
    fn normalize_ignores_unknown_dimension() {
        let d = dims(&["thinking"]);
        let answers = vec![
            answer("a", 5, "thinking", false),
            answer("b", 1, "empathy", false),
        ];
        let scores = normalize_scores(&answers, &d, ScoreScale::Percent);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get("thinking"), Some(100.0));
        assert_eq!(scores.get("empathy"), None);
    }

    #[test]
    fn answer_sheet_defaults_to_neutral() {
        let mut sheet = AnswerSheet::new();
        sheet.set("q1", Likert::new(5).unwrap());
        assert_eq!(sheet.get("q1").value(), 5);
        assert_eq!(sheet.get("q2"), Likert::NEUTRAL);
        assert!(sheet.is_answered("q1"));
        assert!(!sheet.is_answered("q2"));
    }
}
