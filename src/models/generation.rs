//! Generation (solution) model.
//!
//! A generation is the full race set a format produced for one round, plus
//! any best-effort compromises it had to make. Live events must always get
//! *some* schedule, so compromises are recorded as violations rather than
//! returned as errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Bracket, Race};

/// The races produced for one round.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Generation {
    /// Races of the round, ordered by number.
    pub races: Vec<Race>,
    /// Compromises made while generating.
    pub violations: Vec<Violation>,
}

/// A compromise recorded during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (pilot, channel or race number).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A pilot from the pool ended up in no race.
    UnplacedPilot,
    /// The placement loop hit its attempt cap with pilots left over.
    RetryBudgetExhausted,
    /// Race sizes within a bracket differ by more than one.
    Unbalanced,
    /// Two slots in a race share or interfere on a channel.
    ChannelConflict,
    /// A race holds more pilots than its capacity.
    CapacityExceeded,
    /// A pilot holds more than one slot in a race.
    DuplicatePilot,
    /// Domain-specific violation.
    Custom(String),
}

impl Violation {
    /// A pilot could not be placed anywhere.
    pub fn unplaced_pilot(pilot_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::UnplacedPilot,
            entity_id: pilot_id.into(),
            message: message.into(),
            severity: 90,
        }
    }

    /// The placement budget ran out.
    pub fn retry_budget_exhausted(bracket: Bracket, attempts: usize, remaining: usize) -> Self {
        Self {
            violation_type: ViolationType::RetryBudgetExhausted,
            entity_id: format!("{bracket:?}"),
            message: format!("gave up after {attempts} attempts with {remaining} pilots unplaced"),
            severity: 80,
        }
    }

    /// Race sizes could not be evened out.
    pub fn unbalanced(bracket: Bracket, largest: usize, smallest: usize) -> Self {
        Self {
            violation_type: ViolationType::Unbalanced,
            entity_id: format!("{bracket:?}"),
            message: format!("race sizes range from {smallest} to {largest}"),
            severity: 40,
        }
    }

    /// Creates a violation of any type.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
        severity: i32,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }
}

impl Generation {
    /// Creates an empty generation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a race.
    pub fn add_race(&mut self, race: Race) {
        self.races.push(race);
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Whether nothing had to be compromised.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of races.
    pub fn race_count(&self) -> usize {
        self.races.len()
    }

    /// Total placed pilots across races.
    pub fn pilots_placed(&self) -> usize {
        self.races.iter().map(Race::pilot_count).sum()
    }

    /// Pilots reported as unplaced.
    pub fn unplaced_pilots(&self) -> Vec<&str> {
        self.violations
            .iter()
            .filter(|v| v.violation_type == ViolationType::UnplacedPilot)
            .map(|v| v.entity_id.as_str())
            .collect()
    }

    /// Violations of one type.
    pub fn violations_of(&self, violation_type: &ViolationType) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| &v.violation_type == violation_type)
            .collect()
    }

    /// Races grouped by bracket, each group ordered by number.
    pub fn races_by_bracket(&self) -> BTreeMap<Bracket, Vec<&Race>> {
        let mut groups: BTreeMap<Bracket, Vec<&Race>> = BTreeMap::new();
        for race in &self.races {
            groups.entry(race.bracket).or_default().push(race);
        }
        for races in groups.values_mut() {
            races.sort_by_key(|r| r.number);
        }
        groups
    }

    /// Race holding a pilot.
    pub fn race_of(&self, pilot_id: &str) -> Option<&Race> {
        self.races.iter().find(|r| r.has_pilot(pilot_id))
    }

    /// Sorts races by number.
    pub fn sort(&mut self) {
        self.races.sort_by_key(|r| r.number);
    }
}
