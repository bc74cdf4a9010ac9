//! Generator configuration.
//!
//! All tunables of the round generator live here so a host can load them
//! from its own settings file. Every field has a default, so a partial
//! document deserializes cleanly.

use serde::{Deserialize, Serialize};

use crate::models::PointsTable;

/// Weights of the AutoFormat placement score.
///
/// The score of placing pilot `p` into race `r` is
///
/// ```text
///   only_free_race        if r is the only race where p's channel is free
/// - full_race             if r already holds its fair share of pilots
/// - channel_change        if p would change channel under the keep policy
/// + unflown_affinity * k² where k = pilots in r that p has never raced
/// - repeat_penalty * Σ count²  over pilots already in r
/// + remaining_opponents * (opponents p has still to meet)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Bonus for the only race where the pilot's channel is still free.
    pub only_free_race: i64,
    /// Penalty for a race that already holds its share of pilots.
    pub full_race: i64,
    /// Penalty for a forced channel change under the keep policy.
    pub channel_change: i64,
    /// Multiplier on the squared count of fresh opponents in the race.
    pub unflown_affinity: i64,
    /// Multiplier on the summed squared co-race counts.
    pub repeat_penalty: i64,
    /// Multiplier on the number of opponents still to meet.
    pub remaining_opponents: i64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            only_free_race: 1000,
            full_race: 10_000,
            channel_change: 1000,
            unflown_affinity: 5,
            repeat_penalty: 2,
            remaining_opponents: 1,
        }
    }
}

/// Round generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Placement budget multiplier: AutoFormat gives up after
    /// `retry_factor × pilots` placement attempts per bracket.
    pub retry_factor: usize,
    /// Placement score weights.
    pub weights: ScoringWeights,
    /// Wins needed to end a chase-the-ace stage.
    pub chase_the_ace_limit: u32,
    /// Points awarded per finishing position.
    pub points: PointsTable,
    /// Shuffles the AutoFormat pool before placement. Identical inputs and
    /// seed give identical rounds.
    pub shuffle_seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            retry_factor: 4,
            weights: ScoringWeights::default(),
            chase_the_ace_limit: 2,
            points: PointsTable::default(),
            shuffle_seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Sets the placement budget multiplier (minimum 1).
    pub fn with_retry_factor(mut self, retry_factor: usize) -> Self {
        self.retry_factor = retry_factor.max(1);
        self
    }

    /// Sets the score weights.
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the chase-the-ace win limit.
    pub fn with_chase_the_ace_limit(mut self, limit: u32) -> Self {
        self.chase_the_ace_limit = limit;
        self
    }

    /// Sets the points table.
    pub fn with_points(mut self, points: PointsTable) -> Self {
        self.points = points;
        self
    }

    /// Enables seeded pool shuffling.
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Placement attempts allowed for `pilots` pilots.
    pub fn placement_budget(&self, pilots: usize) -> usize {
        self.retry_factor.max(1) * pilots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = GeneratorConfig::default();
        assert_eq!(c.retry_factor, 4);
        assert_eq!(c.placement_budget(8), 32);
        assert_eq!(c.weights.full_race, 10_000);
        assert_eq!(c.chase_the_ace_limit, 2);
        assert!(c.shuffle_seed.is_none());
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let c: GeneratorConfig =
            serde_json::from_str(r#"{"retry_factor": 6, "weights": {"repeat_penalty": 3}}"#)
                .unwrap();
        assert_eq!(c.retry_factor, 6);
        assert_eq!(c.weights.repeat_penalty, 3);
        assert_eq!(c.weights.only_free_race, 1000);
        assert_eq!(c.points, PointsTable::default());
    }

    #[test]
    fn test_roundtrip() {
        let c = GeneratorConfig::default()
            .with_shuffle_seed(7)
            .with_chase_the_ace_limit(3);
        let json = serde_json::to_string(&c).unwrap();
        let back: GeneratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_retry_factor_floor() {
        let c = GeneratorConfig::default().with_retry_factor(0);
        assert_eq!(c.retry_factor, 1);
    }
}
