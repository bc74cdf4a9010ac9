//! Round generation and KPI evaluation.
//!
//! [`RoundGenerator`] is the single entry point a tournament host calls to
//! (re)generate a round: it resolves the plan, picks the format for the
//! round type, runs it and re-checks the result.
//!
//! # KPI
//!
//! [`RoundKpi`] summarises a generated round: race sizes per bracket,
//! repeat pairings against the history and unplaced pilots.

mod kpi;
mod round_generator;

pub use kpi::RoundKpi;
pub use round_generator::RoundGenerator;
