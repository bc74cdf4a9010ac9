//! Heat scheduling for multi-round racing tournaments.
//!
//! Given a pool of pilots, a set of mutually interfering video channels and
//! the history of who has already raced whom, assigns pilots to the races
//! ("heats") of the next round so that:
//!
//! - no two pilots in a race share or interfere on a channel,
//! - repeat pairings are kept to a minimum,
//! - race sizes within a bracket differ by at most one pilot,
//! - bracket semantics (winners/losers, finals, win-limit cutoffs) carry
//!   over from round to round.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Pilot`, `Channel`, `ChannelModel`, `Race`,
//!   `RaceResult`, `Standings`, `Round`, `Event`, `Generation`, `Violation`
//! - **`history`**: `PairingHistory`, symmetric co-race counts
//! - **`plan`**: `RoundPlan`, the resolved input of one generation
//! - **`seeding`**: Composable pilot-ordering rules
//! - **`formats`**: The round formats (`AutoFormat`, `SeededFormat`,
//!   `FinalFormat`, `DoubleElimination`, `ChaseTheAce`, `StreetLeague`,
//!   `LadderFormat`)
//! - **`generator`**: `RoundGenerator` entry point and `RoundKpi`
//! - **`validation`**: Event integrity checks and race invariant checks
//! - **`config`**: `GeneratorConfig`, `ScoringWeights`
//!
//! # Architecture
//!
//! The engine is synchronous and single-threaded. It reads an [`Event`]
//! and returns a [`Generation`]; persisting the races is a single swap on
//! the event (`Event::replace_round_races`). Callers serialise generations
//! per event.
//!
//! Compromises (pilots that could not be placed, an exhausted retry
//! budget, uneven races) never fail a generation; they are reported as
//! violations on the result.
//!
//! [`Event`]: models::Event
//! [`Generation`]: models::Generation

pub mod config;
pub mod error;
pub mod formats;
pub mod generator;
pub mod history;
pub mod models;
pub mod plan;
pub mod seeding;
pub mod validation;
