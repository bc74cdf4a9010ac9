//! Points and standings.
//!
//! Standings are derived, never stored: they are folded from the ended,
//! non-practice races of the event in chronological order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Bracket, Race, RaceResult};

/// Points awarded per finishing position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsTable {
    /// Points for positions 1, 2, 3, ... (missing positions score 0).
    pub positions: Vec<i32>,
    /// Points for a DNF.
    pub dnf_points: i32,
}

impl Default for PointsTable {
    fn default() -> Self {
        Self {
            positions: vec![10, 8, 6, 4, 2, 1],
            dnf_points: 0,
        }
    }
}

impl PointsTable {
    /// Creates a table from per-position points.
    pub fn new(positions: Vec<i32>) -> Self {
        Self {
            positions,
            dnf_points: 0,
        }
    }

    /// Points earned by a result. A result-level override wins.
    pub fn points_for(&self, result: &RaceResult) -> i32 {
        if let Some(points) = result.points {
            return points;
        }
        if result.dnf {
            return self.dnf_points;
        }
        result
            .position
            .checked_sub(1)
            .and_then(|i| self.positions.get(i as usize))
            .copied()
            .unwrap_or(0)
    }
}

/// Cumulative record of one pilot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PilotStanding {
    /// Cumulative points.
    pub points: i32,
    /// First-place finishes.
    pub wins: u32,
    /// Ended races flown.
    pub races: u32,
    /// Personal best total time (ms) among finished races.
    pub best_time_ms: Option<i64>,
    /// Bracket of the most recent race the pilot appeared in.
    pub last_bracket: Bracket,
    /// Number of the most recent race the pilot appeared in.
    pub last_race_number: u32,
}

/// Standings for every pilot that appeared in the folded races.
#[derive(Debug, Clone, Default)]
pub struct Standings {
    entries: HashMap<String, PilotStanding>,
}

impl Standings {
    /// Creates empty standings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds races given in chronological order.
    pub fn from_races<'a>(races: impl IntoIterator<Item = &'a Race>, table: &PointsTable) -> Self {
        let mut standings = Self::new();
        for race in races {
            standings.record(race, table);
        }
        standings
    }

    /// Folds one race. Practice races are ignored; races that have not ended
    /// only update the "last raced" markers.
    pub fn record(&mut self, race: &Race, table: &PointsTable) {
        if race.practice {
            return;
        }
        for pilot in race.pilot_ids() {
            let entry = self.entries.entry(pilot.to_string()).or_default();
            entry.last_bracket = race.bracket;
            entry.last_race_number = race.number;
        }
        if !race.is_ended() {
            return;
        }
        for result in race.results() {
            let entry = self.entries.entry(result.pilot_id.clone()).or_default();
            entry.races += 1;
            entry.points += table.points_for(result);
            if result.position == 1 && !result.dnf {
                entry.wins += 1;
            }
            if !result.dnf {
                if let Some(time) = result.time_ms {
                    entry.best_time_ms = Some(entry.best_time_ms.map_or(time, |b| b.min(time)));
                }
            }
        }
    }

    /// Standing of a pilot.
    pub fn get(&self, pilot_id: &str) -> Option<&PilotStanding> {
        self.entries.get(pilot_id)
    }

    /// Cumulative points (0 if unknown).
    pub fn points(&self, pilot_id: &str) -> i32 {
        self.get(pilot_id).map_or(0, |s| s.points)
    }

    /// First-place finishes (0 if unknown).
    pub fn wins(&self, pilot_id: &str) -> u32 {
        self.get(pilot_id).map_or(0, |s| s.wins)
    }

    /// Personal best time.
    pub fn best_time_ms(&self, pilot_id: &str) -> Option<i64> {
        self.get(pilot_id).and_then(|s| s.best_time_ms)
    }

    /// Bracket of the pilot's most recent race.
    pub fn last_bracket(&self, pilot_id: &str) -> Bracket {
        self.get(pilot_id).map_or(Bracket::None, |s| s.last_bracket)
    }

    /// Number of the pilot's most recent race (0 if never raced).
    pub fn last_race_number(&self, pilot_id: &str) -> u32 {
        self.get(pilot_id).map_or(0, |s| s.last_race_number)
    }

    /// Highest win count of any pilot.
    pub fn max_wins(&self) -> u32 {
        self.entries.values().map(|s| s.wins).max().unwrap_or(0)
    }

    /// Number of pilots with a standing.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pilot has a standing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
