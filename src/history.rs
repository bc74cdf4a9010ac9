//! Pairing history.
//!
//! A symmetric counter of how many times each pair of pilots has shared a
//! race. Every format's scoring consults it to avoid repeat pairings.
//!
//! The history is an explicit value rebuilt from the authoritative race list
//! at the start of each generation (see [`Event::pairing_history`]); nothing
//! in the engine keeps a global copy.
//!
//! # Invariants
//! - `flown_count(a, b) == flown_count(b, a)` at all times.
//! - Counts only grow; practice races never contribute.
//! - Unknown pilots and pairs read as zero.
//!
//! [`Event::pairing_history`]: crate::models::Event::pairing_history

use std::collections::HashMap;

use crate::models::Race;

/// Pilot → (other pilot → co-race count).
#[derive(Debug, Clone, Default)]
pub struct PairingHistory {
    counts: HashMap<String, HashMap<String, u32>>,
}

impl PairingHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from a race list.
    pub fn from_races<'a>(races: impl IntoIterator<Item = &'a Race>) -> Self {
        let mut history = Self::new();
        history.add_races(races);
        history
    }

    /// Counts every unordered pair of distinct pilots in a non-practice race.
    ///
    /// Adding the same race twice counts it twice; deduplication is the
    /// caller's job.
    pub fn add_race(&mut self, race: &Race) {
        if race.practice {
            return;
        }
        let pilots: Vec<&str> = race.pilot_ids().collect();
        self.add_pilots(&pilots);
    }

    /// Adds several races.
    pub fn add_races<'a>(&mut self, races: impl IntoIterator<Item = &'a Race>) {
        for race in races {
            self.add_race(race);
        }
    }

    /// Records one co-race among the given pilots.
    pub fn add_pilots(&mut self, pilots: &[&str]) {
        for (i, a) in pilots.iter().enumerate() {
            for b in &pilots[i + 1..] {
                if a == b {
                    continue;
                }
                self.bump(a, b);
                self.bump(b, a);
            }
        }
    }

    fn bump(&mut self, a: &str, b: &str) {
        *self
            .counts
            .entry(a.to_string())
            .or_default()
            .entry(b.to_string())
            .or_insert(0) += 1;
    }

    /// Times `a` and `b` have raced together.
    pub fn flown_count(&self, a: &str, b: &str) -> u32 {
        self.counts
            .get(a)
            .and_then(|m| m.get(b))
            .copied()
            .unwrap_or(0)
    }

    /// Every pilot `a` has raced against, sorted by ID.
    pub fn flown_pilots(&self, a: &str) -> Vec<&str> {
        let mut pilots: Vec<&str> = self
            .counts
            .get(a)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        pilots.sort_unstable();
        pilots
    }

    /// Total co-races of `a` with anyone.
    pub fn flown_pilots_sum(&self, a: &str) -> u32 {
        self.counts.get(a).map_or(0, |m| m.values().sum())
    }

    /// Total co-races of `a` with pilots in `subset`.
    pub fn flown_pilots_sum_among<S: AsRef<str>>(&self, a: &str, subset: &[S]) -> u32 {
        subset
            .iter()
            .map(|b| self.flown_count(a, b.as_ref()))
            .sum()
    }

    /// Sum of squared co-race counts of `a` with pilots in `subset`.
    ///
    /// Concentrated repeats cost more than the same total spread out.
    pub fn flown_pilots_sum_sqr<S: AsRef<str>>(&self, a: &str, subset: &[S]) -> u32 {
        subset
            .iter()
            .map(|b| {
                let n = self.flown_count(a, b.as_ref());
                n * n
            })
            .sum()
    }

    /// Candidates `a` has never raced against (`a` itself excluded).
    pub fn unflown_pilots<'c, S: AsRef<str>>(&self, a: &str, candidates: &'c [S]) -> Vec<&'c str> {
        candidates
            .iter()
            .map(|b| b.as_ref())
            .filter(|b| *b != a && self.flown_count(a, b) == 0)
            .collect()
    }

    /// Highest single co-race count of `a`.
    pub fn flown_pilots_max(&self, a: &str) -> u32 {
        self.counts
            .get(a)
            .and_then(|m| m.values().max().copied())
            .unwrap_or(0)
    }

    /// Number of pilots with any history.
    pub fn pilot_count(&self) -> usize {
        self.counts.len()
    }

    /// Whether no pairing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
