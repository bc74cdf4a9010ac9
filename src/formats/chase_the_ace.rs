//! Chase the ace.
//!
//! The same field races again and again until one pilot has collected
//! `limit` wins across the earlier rounds of the stage. Each round is a copy
//! of the last race of the calling round.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::{FormatInput, RoundDraft, RoundFormat};
use crate::error::ScheduleError;
use crate::models::{Generation, Race};

/// Repeat the last race until someone reaches the win limit.
#[derive(Debug, Clone, Copy)]
pub struct ChaseTheAce {
    limit: u32,
}

impl Default for ChaseTheAce {
    fn default() -> Self {
        Self::new(2)
    }
}

impl ChaseTheAce {
    /// Creates the format with a win limit (at least 1).
    pub fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    /// Win limit.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// First places per pilot over the earlier chase-the-ace races.
    ///
    /// Only the races handed in as stage races count; the generator passes
    /// the other chase-the-ace rounds of the same stage, so qualifier wins
    /// never count, staged or not.
    pub fn wins(input: &FormatInput<'_>) -> HashMap<String, u32> {
        let mut wins = HashMap::new();
        for race in input.stage_races.iter().filter(|r| !r.practice) {
            if let Some(winner) = race.winner() {
                *wins.entry(winner.to_string()).or_insert(0) += 1;
            }
        }
        wins
    }

    /// Whether some pilot has reached the limit.
    pub fn is_decided(&self, input: &FormatInput<'_>) -> bool {
        Self::wins(input).values().any(|&w| w >= self.limit)
    }
}

impl RoundFormat for ChaseTheAce {
    fn name(&self) -> &'static str {
        "chase-the-ace"
    }

    fn can_generate(&self, input: &FormatInput<'_>) -> Result<(), ScheduleError> {
        if let Some(race) = input.prior_races.iter().find(|r| !r.is_ended()) {
            return Err(ScheduleError::UnfinishedRace {
                round: race.round_id,
                race: race.number,
            });
        }
        let brackets: BTreeSet<_> = input.prior_races.iter().map(|r| r.bracket).collect();
        if brackets.len() > 1 {
            return Err(ScheduleError::MultipleBrackets(input.round_id));
        }
        Ok(())
    }

    fn generate_round(&self, input: &FormatInput<'_>) -> Generation {
        let mut draft = RoundDraft::new(input);
        if !draft.races.is_empty() {
            return draft.into_generation();
        }
        if self.is_decided(input) {
            debug!(limit = self.limit, "ace decided");
            return draft.into_generation();
        }

        let last: Option<&Race> = input.prior_races.iter().copied().max_by_key(|r| r.number);
        if let Some(race) = last {
            draft.push_clone(race);
        }
        draft.into_generation()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::history::PairingHistory;
    use crate::models::{Bracket, RaceState, RoundId, Standings};
    use crate::plan::RoundPlan;

    fn heat(round: u32, order: &[&str]) -> Race {
        let channels = ["R1", "R3", "R6", "R8"];
        let pilots: Vec<(&str, &str)> = order
            .iter()
            .map(|p| {
                let slot = p.as_bytes()[0] - b'A';
                (*p, channels[slot as usize])
            })
            .collect();
        ended_race(RoundId(round), 1, Bracket::None, &pilots, &raceband4())
    }

    fn run(stage: &[&Race], prior: &[&Race]) -> Generation {
        let plan = RoundPlan::new(Vec::new(), raceband4());
        let history = PairingHistory::new();
        let standings = Standings::new();
        let config = GeneratorConfig::default();
        let input = FormatInput::new(RoundId(9), &plan, &history, &standings, &config)
            .with_stage_races(stage)
            .with_prior_races(prior);
        ChaseTheAce::new(2).generate_round(&input)
    }

    #[test]
    fn test_clones_last_race_until_limit() {
        let r1 = heat(1, &["A", "B", "C"]);
        let g = run(&[&r1], &[&r1]);
        assert_eq!(g.race_count(), 1);
        let race = &g.races[0];
        assert_eq!(race.round_id, RoundId(9));
        assert_eq!(race.number, 1);
        assert_eq!(race.state(), RaceState::Populated);
        assert_eq!(race.channel_of("B"), Some("R3"));

        let r2 = heat(2, &["A", "C", "B"]);
        let g = run(&[&r1, &r2], &[&r2]);
        assert_eq!(g.race_count(), 0);
    }

    #[test]
    fn test_different_winners_keep_going() {
        let r1 = heat(1, &["A", "B", "C"]);
        let r2 = heat(2, &["B", "A", "C"]);
        let g = run(&[&r1, &r2], &[&r2]);
        assert_eq!(g.race_count(), 1);
    }

    #[test]
    fn test_can_generate_guards() {
        let model = raceband4();
        let plan = RoundPlan::new(Vec::new(), model.clone());
        let history = PairingHistory::new();
        let standings = Standings::new();
        let config = GeneratorConfig::default();

        let mut open = Race::new(RoundId(1), 2, 4);
        open.add_pilot("A", "R1", &model).unwrap();
        let done = heat(1, &["A", "B"]);
        let prior = [&done, &open];
        let input = FormatInput::new(RoundId(2), &plan, &history, &standings, &config)
            .with_prior_races(&prior);
        assert_eq!(
            ChaseTheAce::default().can_generate(&input),
            Err(ScheduleError::UnfinishedRace {
                round: RoundId(1),
                race: 2
            })
        );

        let other = ended_race(RoundId(1), 2, Bracket::Losers, &[("C", "R6")], &model);
        let prior = [&done, &other];
        let input = input.with_prior_races(&prior);
        assert_eq!(
            ChaseTheAce::default().can_generate(&input),
            Err(ScheduleError::MultipleBrackets(RoundId(2)))
        );
    }
}
