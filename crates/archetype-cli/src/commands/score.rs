//! The `archetype score` command.

use std::path::PathBuf;

use anyhow::Result;

use archetype_core::answers::load_answers;
use archetype_core::assessment::assess;
use archetype_core::report::AssessmentReport;
use archetype_report::html::write_html_report;
use archetype_report::markdown::write_markdown_report;

use super::{log_response, print_assessment, setup, SimulationArgs};

pub fn execute(
    instrument_path: Option<PathBuf>,
    answers_path: PathBuf,
    sim: SimulationArgs,
    format: String,
    output: Option<PathBuf>,
    no_consent: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let setup = setup(instrument_path, config_path.as_deref(), &sim)?;
    let instrument = &setup.instrument;

    let sheet = load_answers(&answers_path, instrument)?;
    let assessment = assess(instrument, &sheet, &setup.options)?;
    log_response(&setup.config, instrument, &assessment, !no_consent);

    let report = AssessmentReport::new(instrument, assessment);
    let output_dir = output
        .clone()
        .unwrap_or_else(|| setup.config.output_dir.clone());
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["text", "json", "html", "markdown"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    for fmt in &formats {
        match *fmt {
            "text" => {
                let mut stdout = std::io::stdout().lock();
                print_assessment(&mut stdout, instrument, &report.assessment)?;
                if output.is_some() && format != "all" {
                    let path = output_dir.join(format!("report-{timestamp}.json"));
                    report.save_json(&path)?;
                    eprintln!("Results saved to: {}", path.display());
                }
            }
            "json" if format != "all" && output.is_none() => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            "json" => {
                let path = output_dir.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output_dir.join(format!("report-{timestamp}.html"));
                write_html_report(&report, instrument, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "markdown" | "md" => {
                let path = output_dir.join(format!("report-{timestamp}.md"));
                write_markdown_report(&report, instrument, &path)?;
                eprintln!("Markdown report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}
