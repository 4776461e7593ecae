//! Answer file loading.
//!
//! Answer files map question ids to 1–5 values, as JSON or TOML.
//! Questions missing from the file count as neutral.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::likert::AnswerSheet;
use crate::model::Instrument;

/// Parse raw answers from a string; the format is picked by `source_path`'s
/// extension (`.toml`, anything else is JSON).
pub fn parse_answers_str(content: &str, source_path: &Path) -> Result<HashMap<String, i64>> {
    if source_path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(content)
            .with_context(|| format!("failed to parse TOML answers: {}", source_path.display()))
    } else {
        serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON answers: {}", source_path.display()))
    }
}

/// Load an answer file and validate it against `instrument`.
pub fn load_answers(path: &Path, instrument: &Instrument) -> Result<AnswerSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file: {}", path.display()))?;
    let raw = parse_answers_str(&content, path)?;

    let sheet = AnswerSheet::from_raw(instrument, &raw)
        .with_context(|| format!("invalid answers in {}", path.display()))?;

    let skipped = instrument.questions.len().saturating_sub(sheet.len());
    if skipped > 0 {
        tracing::info!(skipped, "unanswered questions default to neutral (3)");
    }

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likert::Likert;
    use crate::matching::tests::instrument;
    use crate::model::{MatchMethod, Question};
    use std::path::PathBuf;

    fn quiz() -> Instrument {
        let mut inst = instrument(MatchMethod::Euclidean, vec![]);
        inst.questions = ["q1", "q2"]
            .iter()
            .map(|id| Question {
                id: id.to_string(),
                text: format!("Question {id}"),
                dimension: "x".into(),
                reverse: false,
            })
            .collect();
        inst
    }

    #[test]
    fn json_and_toml_formats() {
        let json = parse_answers_str(r#"{"q1": 5}"#, &PathBuf::from("a.json")).unwrap();
        assert_eq!(json.get("q1"), Some(&5));
        let toml = parse_answers_str("q2 = 1\n", &PathBuf::from("a.toml")).unwrap();
        assert_eq!(toml.get("q2"), Some(&1));
    }

    #[test]
    fn load_validates_against_instrument() {
        let dir = tempfile::tempdir().unwrap();
        let inst = quiz();

        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"{"q1": 4}"#).unwrap();
        let sheet = load_answers(&good, &inst).unwrap();
        assert_eq!(sheet.get("q1"), Likert::new(4).unwrap());
        assert_eq!(sheet.get("q2"), Likert::NEUTRAL);

        let out_of_range = dir.path().join("range.json");
        std::fs::write(&out_of_range, r#"{"q1": 6}"#).unwrap();
        let err = load_answers(&out_of_range, &inst).unwrap_err();
        assert!(format!("{err:#}").contains("outside 1..=5"));

        let unknown = dir.path().join("unknown.json");
        std::fs::write(&unknown, r#"{"q9": 2}"#).unwrap();
        let err = load_answers(&unknown, &inst).unwrap_err();
        assert!(format!("{err:#}").contains("unknown question: q9"));
    }

    #[test]
    fn missing_file_errors() {
        let inst = quiz();
        assert!(load_answers(&PathBuf::from("/no/such/answers.json"), &inst).is_err());
    }
}
