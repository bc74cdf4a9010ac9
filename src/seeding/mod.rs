//! Pilot seeding rules and rule engine.
//!
//! Every format that orders pilots (finals, seeded rounds, street league,
//! double-elimination rotation, ladders) does so through a [`SeedingEngine`]:
//! an explicit chain of rules evaluated in sequence, each consulted only
//! when the previous ones tie, with a deterministic final tie-breaker.
//!
//! # Usage
//!
//! ```
//! use u_heat::seeding::{rules, SeedingContext, SeedingEngine};
//!
//! let pilots = vec!["A".to_string(), "B".to_string()];
//! let context = SeedingContext::new(&pilots).with_points("B", 10);
//! let engine = SeedingEngine::new()
//!     .with_rule(rules::MostPoints)
//!     .with_tie_breaker(rules::EntryOrder);
//!
//! assert_eq!(engine.order(&pilots, &context), vec!["B", "A"]);
//! ```

mod context;
mod engine;
pub mod rules;

pub use context::SeedingContext;
pub use engine::SeedingEngine;

use std::fmt::Debug;

/// Score returned by a seeding rule.
///
/// Lower scores = seeded earlier.
pub type RuleScore = f64;

/// A rule that evaluates a pilot's seeding position.
///
/// # Score Convention
/// **Lower score = earlier seed.** Rules return smaller values for pilots
/// that should be placed first.
pub trait SeedingRule: Send + Sync + Debug {
    /// Rule name (e.g., "POINTS").
    fn name(&self) -> &'static str;

    /// Evaluates a pilot given the seeding context.
    fn evaluate(&self, pilot_id: &str, context: &SeedingContext) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
