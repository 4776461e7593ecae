//! The `archetype take` command: the interactive questionnaire.
//!
//! Step 1 walks the questions one at a time. Step 2 shows the results and an
//! explorer over the archetype catalog. End of input submits the current
//! answers on step 1 and quits on step 2.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use archetype_core::assessment::{assess, Assessment, AssessmentOptions};
use archetype_core::likert::{Likert, LIKERT_LABELS};
use archetype_core::model::Instrument;
use archetype_core::session::{QuizSession, Step};

use super::{log_response, print_assessment, print_sections, setup, SimulationArgs};

pub fn execute(
    instrument_path: Option<PathBuf>,
    sim: SimulationArgs,
    no_consent: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let setup = setup(instrument_path, config_path.as_deref(), &sim)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();

    let ask_consent = setup.config.log.enabled && !no_consent;
    let mut on_result = |assessment: &Assessment,
                         input: &mut dyn BufRead,
                         out: &mut dyn Write|
     -> io::Result<()> {
        if !ask_consent {
            return Ok(());
        }
        write!(out, "\nMay we log these answers locally? [y/N] ")?;
        out.flush()?;
        let consent = read_line(input)?
            .map(|l| l.eq_ignore_ascii_case("y") || l.eq_ignore_ascii_case("yes"))
            .unwrap_or(false);
        log_response(&setup.config, &setup.instrument, assessment, consent);
        Ok(())
    };

    run_session(
        &setup.instrument,
        &setup.options,
        &mut input,
        &mut output,
        &mut on_result,
    )?;
    Ok(())
}

/// Callback run each time fresh results are produced.
type ResultHook<'a> =
    dyn FnMut(&Assessment, &mut dyn BufRead, &mut dyn Write) -> io::Result<()> + 'a;

/// Drive a [`QuizSession`] over `input`/`out`. Returns the last assessment shown.
pub fn run_session(
    instrument: &Instrument,
    options: &AssessmentOptions,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    on_result: &mut ResultHook<'_>,
) -> Result<Option<Assessment>> {
    let mut session = QuizSession::new();
    let mut last: Option<Assessment> = None;
    let total = instrument.questions.len();

    writeln!(out, "{}", instrument.name)?;
    if !instrument.tagline.is_empty() {
        writeln!(out, "{}", instrument.tagline)?;
    }

    loop {
        match session.step() {
            Step::Questionnaire => {
                writeln!(
                    out,
                    "\n{}",
                    session.step_label("Questionnaire", "Your results")
                )?;
                writeln!(
                    out,
                    "Answer 1-5 ({}). Enter keeps the shown value, 'b' goes back.",
                    scale_legend()
                )?;

                let mut i = 0;
                while i < total {
                    let question = &instrument.questions[i];
                    let current = session.answer(i);
                    write!(
                        out,
                        "\n[{}/{}] {}\n  ({}) > ",
                        i + 1,
                        total,
                        question.text,
                        current.value()
                    )?;
                    out.flush()?;

                    let Some(line) = read_line(input)? else {
                        break;
                    };
                    match line.as_str() {
                        "" => i += 1,
                        "b" | "B" => i = i.saturating_sub(1),
                        other => match other.parse::<i64>().ok().map(Likert::new) {
                            Some(Ok(value)) => {
                                session.set_answer(i, value);
                                i += 1;
                            }
                            _ => writeln!(out, "  Please enter a number from 1 to 5.")?,
                        },
                    }
                }
                session.advance();
            }
            Step::Results => {
                if !session.has_results() {
                    writeln!(
                        out,
                        "\n{}",
                        session.step_label("Questionnaire", "Your results")
                    )?;
                    let sheet = session.answer_sheet(instrument);
                    let assessment = assess(instrument, &sheet, options)?;
                    print_assessment(out, instrument, &assessment)?;
                    session.record_results();
                    on_result(&assessment, &mut *input, &mut *out)?;
                    last = Some(assessment);
                }

                if !explore_loop(instrument, &mut session, input, out)? {
                    return Ok(last);
                }
            }
        }
    }
}

/// Archetype explorer. Returns `false` when the user quits.
fn explore_loop(
    instrument: &Instrument,
    session: &mut QuizSession,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<bool> {
    loop {
        writeln!(out, "\nExplore the archetypes:")?;
        for (i, a) in instrument.archetypes.iter().enumerate() {
            let marker = if session.open_archetype() == Some(a.name.as_str()) {
                "*"
            } else {
                " "
            };
            writeln!(out, " {marker}{:>2}. {}", i + 1, a.name)?;
        }
        write!(
            out,
            "Number to open/close, 'b' back to questions, 'r' start over, 'q' quit > "
        )?;
        out.flush()?;

        let Some(line) = read_line(input)? else {
            writeln!(out)?;
            return Ok(false);
        };
        match line.as_str() {
            "q" | "Q" => return Ok(false),
            "b" | "B" => {
                session.back();
                return Ok(true);
            }
            "r" | "R" => {
                session.start_over();
                return Ok(true);
            }
            other => {
                let chosen = other
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| instrument.archetypes.get(i));
                let Some(archetype) = chosen else {
                    writeln!(out, "  Unknown choice: {other}")?;
                    continue;
                };
                if session.toggle_archetype(&archetype.name).is_some() {
                    writeln!(out, "\n== {} ==", archetype.name)?;
                    if !archetype.description.is_empty() {
                        writeln!(out, "{}", archetype.description)?;
                    }
                    print_sections(out, instrument, archetype)?;
                } else {
                    writeln!(out, "  Closed {}.", archetype.name)?;
                }
            }
        }
    }
}

fn scale_legend() -> String {
    LIKERT_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{}={label}", i + 1))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Next trimmed line, or `None` at end of input.
fn read_line(input: &mut dyn BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use archetype_core::parser::parse_instrument_str;
    use archetype_core::simulation::SimulationConfig;
    use std::path::Path;

    const QUIZ: &str = r#"
[instrument]
id = "quiz"
name = "Quiz"
dimensions = ["x", "y"]

[[sections]]
key = "strengths"
title = "Strengths"

[[questions]]
id = "x1"
text = "X question"
dimension = "x"

[[questions]]
id = "y1"
text = "Y question"
dimension = "y"

[[archetypes]]
name = "Xer"
vector = { x = 90, y = 10 }

[archetypes.details]
strengths = ["Focus on x"]

[[archetypes]]
name = "Yer"
vector = { x = 10, y = 90 }
"#;

    fn run(script: &str) -> (Option<Assessment>, String, usize) {
        let instrument = parse_instrument_str(QUIZ, Path::new("quiz.toml")).unwrap();
        let options = AssessmentOptions {
            simulation: SimulationConfig {
                trials: 200,
                noise: 4.0,
                seed: Some(9),
            },
            energy_temperature: None,
        };
        let mut input = io::Cursor::new(script.as_bytes().to_vec());
        let mut out = Vec::new();
        let mut hits = 0;
        let mut hook = |_: &Assessment, _: &mut dyn BufRead, _: &mut dyn Write| -> io::Result<()> {
            hits += 1;
            Ok(())
        };
        let result = run_session(&instrument, &options, &mut input, &mut out, &mut hook).unwrap();
        (result, String::from_utf8(out).unwrap(), hits)
    }

    #[test]
    fn answers_then_quit() {
        let (result, out, hits) = run("5\n1\nq\n");
        let result = result.unwrap();
        assert_eq!(result.primary_name(), Some("Xer"));
        assert!(out.contains("Step 1 of 2"));
        assert!(out.contains("Step 2 of 2"));
        assert!(out.contains("Your archetype: Xer"));
        assert_eq!(hits, 1);
    }

    #[test]
    fn back_and_invalid_input() {
        // x1=1, back, x1=5 again, invalid, y1=1
        let (result, out, _) = run("1\nb\n5\n7\n1\nq\n");
        assert!(out.contains("Please enter a number from 1 to 5."));
        assert_eq!(result.unwrap().scores.as_vector(), vec![100.0, 0.0]);
    }

    #[test]
    fn end_of_input_submits_neutral_answers() {
        let (result, _, _) = run("");
        let result = result.unwrap();
        assert_eq!(result.scores.as_vector(), vec![50.0, 50.0]);
    }

    #[test]
    fn explorer_and_back_to_questions() {
        // Answer, open Xer, close it, go back, flip answers, quit.
        let (result, out, hits) = run("5\n1\n1\n1\nb\n1\n5\nq\n");
        assert!(out.contains("== Xer =="));
        assert!(out.contains("Focus on x"));
        assert!(out.contains("Closed Xer."));
        assert_eq!(hits, 2);
        assert_eq!(result.unwrap().primary_name(), Some("Yer"));
    }

    #[test]
    fn start_over_resets_answers() {
        let (result, _, hits) = run("5\n1\nr\n\n\nq\n");
        assert_eq!(hits, 2);
        assert_eq!(result.unwrap().scores.as_vector(), vec![50.0, 50.0]);
    }
}
