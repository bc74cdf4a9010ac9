//! Rule engine for multi-criteria seeding.
//!
//! Rules are consulted in sequence, each only when the previous ones tie.
//! Sorting is stable: pilots that tie on every rule keep their input order.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, SeedingContext, SeedingRule};

/// A composable rule engine for pilot seeding.
#[derive(Clone)]
pub struct SeedingEngine {
    rules: Vec<Arc<dyn SeedingRule>>,
    epsilon: f64,
}

impl SeedingEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            epsilon: 1e-9,
        }
    }

    /// Points descending, then personal best ascending.
    pub fn by_standings() -> Self {
        Self::new()
            .with_rule(rules::MostPoints)
            .with_tie_breaker(rules::FastestTime)
    }

    /// Previous bracket, then points descending, then personal best.
    pub fn for_finals() -> Self {
        Self::new()
            .with_rule(rules::PreviousBracket)
            .with_tie_breaker(rules::MostPoints)
            .with_tie_breaker(rules::FastestTime)
    }

    /// Points ascending, then entry order.
    pub fn for_street_league() -> Self {
        Self::new()
            .with_rule(rules::FewestPoints)
            .with_tie_breaker(rules::EntryOrder)
    }

    /// Earliest last race first.
    pub fn for_rotation() -> Self {
        Self::new()
            .with_rule(rules::LastRaceNumber)
            .with_tie_breaker(rules::EntryOrder)
    }

    /// Lowest pairing load first.
    pub fn by_pairing_load() -> Self {
        Self::new()
            .with_rule(rules::LeastFlown)
            .with_tie_breaker(rules::EntryOrder)
    }

    /// Adds a primary rule.
    pub fn with_rule<R: SeedingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Adds a rule consulted only when every earlier rule ties.
    pub fn with_tie_breaker<R: SeedingRule + 'static>(self, rule: R) -> Self {
        self.with_rule(rule)
    }

    /// Returns indices into `pilots`, earliest seed first.
    pub fn sort_indices<S: AsRef<str>>(
        &self,
        pilots: &[S],
        context: &SeedingContext,
    ) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..pilots.len()).collect();
        indices.sort_by(|&a, &b| self.compare(pilots[a].as_ref(), pilots[b].as_ref(), context));
        indices
    }

    /// Returns pilot IDs in seeding order.
    pub fn order<S: AsRef<str>>(&self, pilots: &[S], context: &SeedingContext) -> Vec<String> {
        self.sort_indices(pilots, context)
            .into_iter()
            .map(|i| pilots[i].as_ref().to_string())
            .collect()
    }

    fn compare(&self, a: &str, b: &str, context: &SeedingContext) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a, context);
            let score_b = rule.evaluate(b, context);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }
        Ordering::Equal
    }
}

impl Default for SeedingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SeedingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedingEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| r.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bracket;

    fn pilots() -> Vec<String> {
        ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_by_standings() {
        let p = pilots();
        let ctx = SeedingContext::new(&p)
            .with_points("A", 8)
            .with_points("B", 10)
            .with_points("C", 8)
            .with_best_time("C", 55_000)
            .with_best_time("A", 60_000);
        let order = SeedingEngine::by_standings().order(&p, &ctx);
        assert_eq!(order, vec!["B", "C", "A", "D"]);
    }

    #[test]
    fn test_stable_ties_keep_input_order() {
        let p = vec!["D", "B", "A"];
        let ctx = SeedingContext::new(&p);
        let engine = SeedingEngine::new().with_rule(rules::MostPoints);
        assert_eq!(engine.order(&p, &ctx), vec!["D", "B", "A"]);
    }

    #[test]
    fn test_finals_group_by_bracket_first() {
        let p = pilots();
        let ctx = SeedingContext::new(&p)
            .with_last_bracket("A", Bracket::Lettered('B'))
            .with_last_bracket("B", Bracket::Lettered('A'))
            .with_last_bracket("C", Bracket::Lettered('A'))
            .with_last_bracket("D", Bracket::Lettered('B'))
            .with_points("A", 20)
            .with_points("C", 6)
            .with_points("B", 4);
        let order = SeedingEngine::for_finals().order(&p, &ctx);
        assert_eq!(order, vec!["C", "B", "A", "D"]);
    }

    #[test]
    fn test_later_rules_only_break_ties() {
        let p = vec!["A", "B", "C"];
        let ctx = SeedingContext::new(&p)
            .with_points("A", 4)
            .with_points("B", 10)
            .with_points("C", 4)
            .with_last_race_number("A", 7)
            .with_last_race_number("B", 9)
            .with_last_race_number("C", 2);
        let engine = SeedingEngine::new()
            .with_rule(rules::MostPoints)
            .with_tie_breaker(rules::LastRaceNumber);
        assert_eq!(engine.order(&p, &ctx), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_empty_field() {
        let ctx = SeedingContext::default().with_points("A", 3);
        let engine = SeedingEngine::by_standings();
        assert!(engine.sort_indices::<String>(&[], &ctx).is_empty());
        assert_eq!(engine.order(&["A"], &ctx), vec!["A"]);
    }
}
