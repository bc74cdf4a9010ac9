//! Round quality metrics (KPIs).
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Size spread | Largest minus smallest race per bracket |
//! | Repeat pairings | Pairs in the same race that have met before |
//! | Max repeat | Most previous meetings of any pair now racing again |
//! | Fresh pairings | Pairs meeting for the first time |
//! | Unplaced | Pilots reported as unplaced |

use std::collections::BTreeMap;

use crate::history::PairingHistory;
use crate::models::{Bracket, Generation};

/// Round performance indicators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundKpi {
    /// Number of races.
    pub race_count: usize,
    /// Slots filled across all races.
    pub pilots_placed: usize,
    /// Smallest race (0 when there are no races).
    pub min_race_size: usize,
    /// Largest race.
    pub max_race_size: usize,
    /// Largest minus smallest race, per bracket.
    pub size_spread_by_bracket: BTreeMap<Bracket, usize>,
    /// Pairs that have raced each other before.
    pub repeat_pairings: usize,
    /// Highest previous meeting count among repeated pairs.
    pub max_repeat: u32,
    /// Pairs meeting for the first time.
    pub fresh_pairings: usize,
    /// Unplaced pilots.
    pub unplaced: usize,
}

impl RoundKpi {
    /// Computes KPIs from a generation and the history it was built on.
    pub fn calculate(generation: &Generation, history: &PairingHistory) -> Self {
        let mut kpi = Self {
            race_count: generation.race_count(),
            pilots_placed: generation.pilots_placed(),
            unplaced: generation.unplaced_pilots().len(),
            ..Self::default()
        };

        let sizes: Vec<usize> = generation.races.iter().map(|r| r.pilot_count()).collect();
        kpi.min_race_size = sizes.iter().copied().min().unwrap_or(0);
        kpi.max_race_size = sizes.iter().copied().max().unwrap_or(0);

        for (bracket, races) in generation.races_by_bracket() {
            let sizes = races.iter().map(|r| r.pilot_count());
            let spread = sizes.clone().max().unwrap_or(0) - sizes.min().unwrap_or(0);
            kpi.size_spread_by_bracket.insert(bracket, spread);
        }

        for race in &generation.races {
            let pilots: Vec<&str> = race.pilot_ids().collect();
            for (i, a) in pilots.iter().enumerate() {
                for b in &pilots[i + 1..] {
                    match history.flown_count(a, b) {
                        0 => kpi.fresh_pairings += 1,
                        n => {
                            kpi.repeat_pairings += 1;
                            kpi.max_repeat = kpi.max_repeat.max(n);
                        }
                    }
                }
            }
        }

        kpi
    }

    /// Whether every bracket's races differ by at most one pilot.
    pub fn is_balanced(&self) -> bool {
        self.size_spread_by_bracket.values().all(|&spread| spread <= 1)
    }
}
