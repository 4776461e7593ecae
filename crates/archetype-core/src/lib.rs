//! archetype-core — Likert scoring, archetype matching, and Monte Carlo stability.
//!
//! This crate defines the instrument data model, answer normalization, the
//! nearest-archetype metrics, and the simulation that estimates how stable
//! a respondent's match is under answer noise.

pub mod answers;
pub mod assessment;
pub mod config;
pub mod error;
pub mod likert;
pub mod matching;
pub mod model;
pub mod parser;
pub mod report;
pub mod response_log;
pub mod session;
pub mod simulation;
