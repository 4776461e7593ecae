//! Two-step questionnaire wizard state.
//!
//! Keeps answers across navigation, tracks whether results have been
//! produced, and which archetype the explorer currently has open. Front ends
//! (the interactive CLI) drive it; it renders nothing itself.

use std::collections::HashMap;

use crate::likert::{AnswerSheet, Likert};
use crate::model::Instrument;

/// Where the respondent is in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Questionnaire,
    Results,
}

impl Step {
    /// 1-based step number.
    pub fn number(self) -> u8 {
        match self {
            Step::Questionnaire => 1,
            Step::Results => 2,
        }
    }

    pub const COUNT: u8 = 2;
}

/// Wizard state for one respondent.
#[derive(Debug, Clone)]
pub struct QuizSession {
    step: Step,
    answers: HashMap<usize, Likert>,
    has_results: bool,
    open_archetype: Option<String>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        Self {
            step: Step::Questionnaire,
            answers: HashMap::new(),
            has_results: false,
            open_archetype: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Fraction of the wizard completed (step / step count).
    pub fn progress(&self) -> f64 {
        self.step.number() as f64 / Step::COUNT as f64
    }

    /// "Step 1 of 2 — ..." heading for the current step.
    pub fn step_label(&self, questionnaire: &str, results: &str) -> String {
        let title = match self.step {
            Step::Questionnaire => questionnaire,
            Step::Results => results,
        };
        format!("Step {} of {} — {}", self.step.number(), Step::COUNT, title)
    }

    /// Stored answer for question `index`, neutral if never set.
    pub fn answer(&self, index: usize) -> Likert {
        self.answers.get(&index).copied().unwrap_or_default()
    }

    pub fn set_answer(&mut self, index: usize, value: Likert) {
        self.answers.insert(index, value);
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    /// Move from the questionnaire to the results step.
    pub fn advance(&mut self) {
        self.step = Step::Results;
    }

    /// Return to the questionnaire, keeping answers but discarding results.
    pub fn back(&mut self) {
        self.step = Step::Questionnaire;
        self.has_results = false;
    }

    /// Clear answers and results and return to the first step.
    pub fn reset(&mut self) {
        self.answers.clear();
        self.step = Step::Questionnaire;
        self.has_results = false;
    }

    /// Same as [`QuizSession::reset`]; offered from the results step.
    pub fn start_over(&mut self) {
        self.reset();
    }

    /// Mark results as computed and close the explorer.
    pub fn record_results(&mut self) {
        self.has_results = true;
        self.open_archetype = None;
    }

    pub fn has_results(&self) -> bool {
        self.has_results
    }

    /// Open `name` in the explorer, or close it if it is already open.
    pub fn toggle_archetype(&mut self, name: &str) -> Option<&str> {
        if self.open_archetype.as_deref() == Some(name) {
            self.open_archetype = None;
        } else {
            self.open_archetype = Some(name.to_string());
        }
        self.open_archetype.as_deref()
    }

    pub fn open_archetype(&self) -> Option<&str> {
        self.open_archetype.as_deref()
    }

    /// Answers keyed by question id, for scoring.
    pub fn answer_sheet(&self, instrument: &Instrument) -> AnswerSheet {
        let mut sheet = AnswerSheet::new();
        for (i, q) in instrument.questions.iter().enumerate() {
            sheet.set(q.id.clone(), self.answer(i));
        }
        sheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::tests::instrument;
    use crate::model::{MatchMethod, Question};

    fn likert(v: i64) -> Likert {
        Likert::new(v).unwrap()
    }

    #[test]
    fn starts_on_questionnaire() {
        let s = QuizSession::new();
        assert_eq!(s.step(), Step::Questionnaire);
        assert_eq!(s.progress(), 0.5);
        assert!(!s.has_results());
        assert_eq!(s.answer(0), Likert::NEUTRAL);
        assert_eq!(
            s.step_label("Questionnaire", "Results"),
            "Step 1 of 2 — Questionnaire"
        );
    }

    #[test]
    fn back_keeps_answers_and_drops_results() {
        let mut s = QuizSession::new();
        s.set_answer(0, likert(5));
        s.advance();
        s.record_results();
        assert_eq!(s.progress(), 1.0);
        assert!(s.has_results());

        s.back();
        assert_eq!(s.step(), Step::Questionnaire);
        assert!(!s.has_results());
        assert_eq!(s.answer(0), likert(5));
    }

    #[test]
    fn reset_and_start_over_clear_answers() {
        let mut s = QuizSession::new();
        s.set_answer(2, likert(1));
        s.advance();
        s.start_over();
        assert_eq!(s.step(), Step::Questionnaire);
        assert_eq!(s.answered_count(), 0);

        s.set_answer(1, likert(4));
        s.reset();
        assert_eq!(s.answer(1), Likert::NEUTRAL);
    }

    #[test]
    fn explorer_toggle() {
        let mut s = QuizSession::new();
        assert_eq!(s.toggle_archetype("Visionary"), Some("Visionary"));
        assert_eq!(s.toggle_archetype("Operator"), Some("Operator"));
        assert_eq!(s.toggle_archetype("Operator"), None);
        s.toggle_archetype("Engineer");
        s.record_results();
        assert_eq!(s.open_archetype(), None);
    }

    #[test]
    fn answer_sheet_uses_question_ids() {
        let mut inst = instrument(MatchMethod::Euclidean, vec![]);
        inst.questions = vec![
            Question {
                id: "q-a".into(),
                text: "A".into(),
                dimension: "x".into(),
                reverse: false,
            },
            Question {
                id: "q-b".into(),
                text: "B".into(),
                dimension: "y".into(),
                reverse: true,
            },
        ];
        let mut s = QuizSession::new();
        s.set_answer(1, likert(2));
        let sheet = s.answer_sheet(&inst);
        assert_eq!(sheet.get("q-a"), Likert::NEUTRAL);
        assert_eq!(sheet.get("q-b"), likert(2));
    }
}
