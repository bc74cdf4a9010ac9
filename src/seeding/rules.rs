//! Built-in seeding rules.
//!
//! # Categories
//!
//! - **Standings**: POINTS, LOW_POINTS, BEST_TIME, BRACKET
//! - **Rotation**: LAST_RACE, ENTRY
//! - **Pairing**: LEAST_FLOWN
//!
//! # Score Convention
//! All rules return lower scores for pilots seeded earlier.

use super::{RuleScore, SeedingContext, SeedingRule};
use crate::models::Bracket;

// ======================== Standings rules ========================

/// Most cumulative points first.
#[derive(Debug, Clone, Copy)]
pub struct MostPoints;

impl SeedingRule for MostPoints {
    fn name(&self) -> &'static str {
        "POINTS"
    }

    fn evaluate(&self, pilot_id: &str, context: &SeedingContext) -> RuleScore {
        -f64::from(context.points.get(pilot_id).copied().unwrap_or(0))
    }

    fn description(&self) -> &'static str {
        "Most Points"
    }
}

/// Fewest cumulative points first.
///
/// Street league groups the weakest pilots into the earliest races.
#[derive(Debug, Clone, Copy)]
pub struct FewestPoints;

impl SeedingRule for FewestPoints {
    fn name(&self) -> &'static str {
        "LOW_POINTS"
    }

    fn evaluate(&self, pilot_id: &str, context: &SeedingContext) -> RuleScore {
        f64::from(context.points.get(pilot_id).copied().unwrap_or(0))
    }

    fn description(&self) -> &'static str {
        "Fewest Points"
    }
}

/// Fastest personal best first; pilots without a time go last.
#[derive(Debug, Clone, Copy)]
pub struct FastestTime;

impl SeedingRule for FastestTime {
    fn name(&self) -> &'static str {
        "BEST_TIME"
    }

    fn evaluate(&self, pilot_id: &str, context: &SeedingContext) -> RuleScore {
        context
            .best_time_ms
            .get(pilot_id)
            .map_or(f64::MAX, |&t| t as f64)
    }

    fn description(&self) -> &'static str {
        "Fastest Personal Best"
    }
}

/// Groups pilots by the bracket of their last race.
///
/// Order: no bracket, winners, losers, then lettered brackets A..Z.
#[derive(Debug, Clone, Copy)]
pub struct PreviousBracket;

impl SeedingRule for PreviousBracket {
    fn name(&self) -> &'static str {
        "BRACKET"
    }

    fn evaluate(&self, pilot_id: &str, context: &SeedingContext) -> RuleScore {
        let bracket = context
            .last_bracket
            .get(pilot_id)
            .copied()
            .unwrap_or_default();
        match bracket {
            Bracket::None => 0.0,
            Bracket::Winners => 1.0,
            Bracket::Losers => 2.0,
            Bracket::Lettered(c) => 3.0 + f64::from(u32::from(c)),
        }
    }

    fn description(&self) -> &'static str {
        "Previous Bracket"
    }
}

// ======================== Rotation rules ========================

/// Earliest last race first, so pilots rotate through heat positions.
#[derive(Debug, Clone, Copy)]
pub struct LastRaceNumber;

impl SeedingRule for LastRaceNumber {
    fn name(&self) -> &'static str {
        "LAST_RACE"
    }

    fn evaluate(&self, pilot_id: &str, context: &SeedingContext) -> RuleScore {
        f64::from(context.last_race_number.get(pilot_id).copied().unwrap_or(0))
    }

    fn description(&self) -> &'static str {
        "Last Race Number"
    }
}

/// Input order.
#[derive(Debug, Clone, Copy)]
pub struct EntryOrder;

impl SeedingRule for EntryOrder {
    fn name(&self) -> &'static str {
        "ENTRY"
    }

    fn evaluate(&self, pilot_id: &str, context: &SeedingContext) -> RuleScore {
        context
            .entry_order
            .get(pilot_id)
            .map_or(f64::MAX, |&i| i as f64)
    }

    fn description(&self) -> &'static str {
        "Entry Order"
    }
}

// ======================== Pairing rules ========================

/// Lowest historical pairing load first.
#[derive(Debug, Clone, Copy)]
pub struct LeastFlown;

impl SeedingRule for LeastFlown {
    fn name(&self) -> &'static str {
        "LEAST_FLOWN"
    }

    fn evaluate(&self, pilot_id: &str, context: &SeedingContext) -> RuleScore {
        f64::from(context.flown_sum.get(pilot_id).copied().unwrap_or(0))
    }

    fn description(&self) -> &'static str {
        "Least Previously Flown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_rules_are_mirrored() {
        let ctx = SeedingContext::default().with_points("A", 12);
        assert!((MostPoints.evaluate("A", &ctx) + 12.0).abs() < 1e-10);
        assert!((FewestPoints.evaluate("A", &ctx) - 12.0).abs() < 1e-10);
        assert!(FewestPoints.evaluate("unknown", &ctx).abs() < 1e-10);
    }

    #[test]
    fn test_missing_time_sorts_last() {
        let ctx = SeedingContext::default().with_best_time("A", 61_000);
        assert!(FastestTime.evaluate("A", &ctx) < FastestTime.evaluate("B", &ctx));
    }

    #[test]
    fn test_bracket_order() {
        let ctx = SeedingContext::default()
            .with_last_bracket("W", Bracket::Winners)
            .with_last_bracket("L", Bracket::Losers)
            .with_last_bracket("A", Bracket::Lettered('A'))
            .with_last_bracket("B", Bracket::Lettered('B'));
        let scores: Vec<f64> = ["N", "W", "L", "A", "B"]
            .iter()
            .map(|p| PreviousBracket.evaluate(p, &ctx))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_rotation_rules() {
        let ctx = SeedingContext::new(&["A", "B"]).with_last_race_number("A", 3);
        assert!(LastRaceNumber.evaluate("B", &ctx) < LastRaceNumber.evaluate("A", &ctx));
        assert!(EntryOrder.evaluate("A", &ctx) < EntryOrder.evaluate("B", &ctx));
        assert_eq!(EntryOrder.evaluate("C", &ctx), f64::MAX);
    }
}
