//! Seeding context for rule evaluation.

use std::collections::HashMap;

use crate::history::PairingHistory;
use crate::models::{Bracket, Standings};

/// Per-pilot facts seeding rules read.
///
/// Unknown pilots read as zero points, no best time, bracket `None`, race
/// number 0 and no pairing load.
#[derive(Debug, Clone, Default)]
pub struct SeedingContext {
    /// Cumulative points per pilot.
    pub points: HashMap<String, i32>,
    /// Personal best time per pilot (ms).
    pub best_time_ms: HashMap<String, i64>,
    /// Bracket of each pilot's most recent race.
    pub last_bracket: HashMap<String, Bracket>,
    /// Number of each pilot's most recent race.
    pub last_race_number: HashMap<String, u32>,
    /// Total historical co-races per pilot.
    pub flown_sum: HashMap<String, u32>,
    /// Position of each pilot in the input list.
    pub entry_order: HashMap<String, usize>,
}

impl SeedingContext {
    /// Creates a context whose entry order follows `pilots`.
    pub fn new<S: AsRef<str>>(pilots: &[S]) -> Self {
        Self {
            entry_order: pilots
                .iter()
                .enumerate()
                .map(|(i, p)| (p.as_ref().to_string(), i))
                .collect(),
            ..Default::default()
        }
    }

    /// Copies standings facts for `pilots`.
    pub fn with_standings<S: AsRef<str>>(mut self, standings: &Standings, pilots: &[S]) -> Self {
        for pilot in pilots.iter().map(|p| p.as_ref()) {
            let Some(standing) = standings.get(pilot) else {
                continue;
            };
            self.points.insert(pilot.to_string(), standing.points);
            if let Some(time) = standing.best_time_ms {
                self.best_time_ms.insert(pilot.to_string(), time);
            }
            self.last_bracket
                .insert(pilot.to_string(), standing.last_bracket);
            self.last_race_number
                .insert(pilot.to_string(), standing.last_race_number);
        }
        self
    }

    /// Copies pairing load for `pilots`.
    pub fn with_history<S: AsRef<str>>(mut self, history: &PairingHistory, pilots: &[S]) -> Self {
        for pilot in pilots.iter().map(|p| p.as_ref()) {
            self.flown_sum
                .insert(pilot.to_string(), history.flown_pilots_sum(pilot));
        }
        self
    }

    /// Sets a pilot's points.
    pub fn with_points(mut self, pilot_id: impl Into<String>, points: i32) -> Self {
        self.points.insert(pilot_id.into(), points);
        self
    }

    /// Sets a pilot's best time.
    pub fn with_best_time(mut self, pilot_id: impl Into<String>, time_ms: i64) -> Self {
        self.best_time_ms.insert(pilot_id.into(), time_ms);
        self
    }

    /// Sets a pilot's last bracket.
    pub fn with_last_bracket(mut self, pilot_id: impl Into<String>, bracket: Bracket) -> Self {
        self.last_bracket.insert(pilot_id.into(), bracket);
        self
    }

    /// Sets a pilot's last race number.
    pub fn with_last_race_number(mut self, pilot_id: impl Into<String>, number: u32) -> Self {
        self.last_race_number.insert(pilot_id.into(), number);
        self
    }
}
