//! Checks on the bundled D-Type and I-Type instruments.

use std::path::Path;

use archetype_core::assessment::{assess, AssessmentOptions};
use archetype_core::likert::{AnswerSheet, DimensionScores, Likert};
use archetype_core::matching::{compute_archetype_distances, determine_archetype};
use archetype_core::model::{Instrument, ScoreScale};
use archetype_core::parser::{load_instrument, validate_instrument};
use archetype_core::simulation::{monte_carlo_probabilities, SimulationConfig};

fn bundled(name: &str) -> Instrument {
    load_instrument(&Path::new("../../instruments").join(name)).unwrap()
}

fn both() -> Vec<Instrument> {
    vec![bundled("i-type.toml"), bundled("d-type.toml")]
}

#[test]
fn bundled_instruments_are_clean() {
    for instrument in both() {
        let warnings = validate_instrument(&instrument);
        assert!(warnings.is_empty(), "{}: {warnings:?}", instrument.id);
    }
}

#[test]
fn scales_and_sections() {
    let i_type = bundled("i-type.toml");
    assert_eq!(i_type.scale, ScoreScale::Percent);
    assert_eq!(i_type.sections.len(), 5);
    assert!(i_type.grid.is_some());

    let d_type = bundled("d-type.toml");
    assert_eq!(d_type.scale, ScoreScale::Unit);
    let titles: Vec<&str> = d_type.sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Strengths", "Blindspots"]);
    let grid = d_type.grid.as_ref().unwrap();
    assert_eq!(grid.rows[1], ["Stabiliser", "Harmoniser", "Lone Wolf"]);
}

#[test]
fn each_archetype_matches_itself() {
    for instrument in both() {
        for archetype in &instrument.archetypes {
            let scores = DimensionScores::from_vector(
                &instrument.dimensions,
                &archetype.vector_for(&instrument.dimensions),
                instrument.scale,
            );
            let best = determine_archetype(&scores, &instrument).unwrap().unwrap();
            assert_eq!(best.name, archetype.name, "{}", instrument.id);
        }
    }
}

#[test]
fn distances_cover_catalog_in_order() {
    let instrument = bundled("d-type.toml");
    let scores = DimensionScores::from_vector(
        &instrument.dimensions,
        &[0.5; 6],
        instrument.scale,
    );
    let distances = compute_archetype_distances(&scores, &instrument).unwrap();
    let names: Vec<&str> = distances.iter().map(|d| d.name.as_str()).collect();
    let catalog: Vec<&str> = instrument.archetypes.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, catalog);
    assert!(distances.iter().all(|d| d.energy > 0.0 && d.energy <= 1.0));
}

#[test]
fn probabilities_sum_to_one_hundred() {
    for instrument in both() {
        let scores = DimensionScores::from_vector(
            &instrument.dimensions,
            &vec![instrument.scale.midpoint(); instrument.dimensions.len()],
            instrument.scale,
        );
        let config = SimulationConfig::for_instrument(&instrument).with_seed(99);
        let report = monte_carlo_probabilities(&scores, &instrument, &config).unwrap();

        let total: f64 = report.probabilities.iter().map(|p| p.probability).sum();
        assert!((total - 100.0).abs() < 1e-6, "{}: {total}", instrument.id);
        assert_eq!(report.probabilities.len(), instrument.archetypes.len());
        assert_eq!(report.stability, report.probabilities[0].probability);
        assert_eq!(report.shadow.as_ref(), report.probabilities.get(1));
    }
}

#[test]
fn strong_i_type_profile_is_stable() {
    let instrument = bundled("i-type.toml");
    let mut sheet = AnswerSheet::new();
    for q in &instrument.questions {
        // Forward items 5, reverse items 1: every dimension maxes out.
        let v = if q.reverse { 1 } else { 5 };
        sheet.set(q.id.clone(), Likert::new(v).unwrap());
    }
    let options = AssessmentOptions {
        simulation: SimulationConfig::for_instrument(&instrument).with_seed(4),
        energy_temperature: None,
    };
    let result = assess(&instrument, &sheet, &options).unwrap();

    assert!(result.scores.iter().all(|s| s.score == 100.0));
    assert_eq!(result.primary_name(), Some("Apex Innovator"));
    assert!(result.is_consistent());
    assert!(result.stability.stability > 90.0);
}
