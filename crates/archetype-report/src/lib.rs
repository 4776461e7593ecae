//! archetype-report — HTML and Markdown rendering of assessment reports.

pub mod html;
pub mod markdown;

use archetype_core::model::Instrument;
use archetype_core::simulation::StabilityReport;

/// One row of the probability heatmap.
pub(crate) struct HeatmapRow<'a> {
    pub label: &'a str,
    /// `(archetype, probability %)` per column.
    pub cells: Vec<(&'a str, f64)>,
}

/// Lay the simulated probabilities out on the instrument's grid.
///
/// Returns nothing when the instrument has no grid.
pub(crate) fn heatmap_rows<'a>(
    instrument: &'a Instrument,
    stability: &StabilityReport,
) -> Option<Vec<HeatmapRow<'a>>> {
    let grid = instrument.grid.as_ref()?;
    let rows = grid
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| HeatmapRow {
            label: grid.row_labels.get(i).map(String::as_str).unwrap_or(""),
            cells: row
                .iter()
                .map(|name| (name.as_str(), stability.probability(name)))
                .collect(),
        })
        .collect();
    Some(rows)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::Path;

    use archetype_core::assessment::{assess, AssessmentOptions};
    use archetype_core::likert::{AnswerSheet, Likert};
    use archetype_core::model::Instrument;
    use archetype_core::parser::parse_instrument_str;
    use archetype_core::report::AssessmentReport;
    use archetype_core::simulation::SimulationConfig;

    const INSTRUMENT: &str = r#"
[instrument]
id = "mini"
name = "Mini <Type>"
tagline = "Two dimensions"
dimensions = ["thinking", "execution"]

[[sections]]
key = "strengths"
title = "Strengths"

[[sections]]
key = "risks"
title = "Growth Edges & Risks"

[grid]
row_labels = ["Ideas", "Delivery"]
col_labels = ["Left", "Right"]
rows = [["Visionary", "Strategist"], ["Operator", "Engineer"]]

[[questions]]
id = "t1"
text = "I picture what does not exist yet."
dimension = "thinking"

[[questions]]
id = "e1"
text = "I finish what I start."
dimension = "execution"

[[archetypes]]
name = "Visionary"
description = "Sees the future first."
vector = { thinking = 95, execution = 30 }

[archetypes.details]
strengths = ["Bold ideas"]
risks = ["Loses interest in details"]

[[archetypes]]
name = "Strategist"
description = "Plans the path."
vector = { thinking = 75, execution = 60 }

[[archetypes]]
name = "Operator"
description = "Runs the machine."
vector = { thinking = 30, execution = 90 }

[[archetypes]]
name = "Engineer"
description = "Builds it right."
vector = { thinking = 55, execution = 80 }
"#;

    pub fn instrument() -> Instrument {
        parse_instrument_str(INSTRUMENT, Path::new("mini.toml")).unwrap()
    }

    pub fn report(instrument: &Instrument) -> AssessmentReport {
        let mut sheet = AnswerSheet::new();
        sheet.set("t1", Likert::new(5).unwrap());
        sheet.set("e1", Likert::new(2).unwrap());
        let options = AssessmentOptions {
            simulation: SimulationConfig {
                trials: 500,
                noise: 4.0,
                seed: Some(5),
            },
            energy_temperature: None,
        };
        let assessment = assess(instrument, &sheet, &options).unwrap();
        AssessmentReport::new(instrument, assessment)
    }
}
