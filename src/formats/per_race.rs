//! Per-race template.
//!
//! For formats where only the number of races varies and every race is set
//! up on its own. Implement [`RaceCountFormat`] and wrap it in [`PerRace`]
//! to get a [`RoundFormat`].

use std::collections::BTreeMap;
use std::fmt::Debug;

use super::{open_pool, FormatInput, RoundDraft, RoundFormat};
use crate::models::{Bracket, Generation, Race};
use crate::seeding::{SeedingContext, SeedingEngine};

/// A format described by its race count and a per-race setup.
pub trait RaceCountFormat: Debug {
    /// Format name.
    fn name(&self) -> &'static str;

    /// Number of races for the round.
    fn race_count(&self, input: &FormatInput<'_>, pool: &[String]) -> usize;

    /// Seats pilots into race `index` of `count`.
    ///
    /// Returns the pilots that could not be seated.
    fn populate(
        &self,
        input: &FormatInput<'_>,
        index: usize,
        count: usize,
        pool: &[String],
        race: &mut Race,
    ) -> Vec<String>;

    /// Bracket of race `index`.
    fn bracket(&self, _index: usize) -> Bracket {
        Bracket::None
    }
}

/// Adapts a [`RaceCountFormat`] into a [`RoundFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PerRace<F> {
    inner: F,
}

impl<F: RaceCountFormat> PerRace<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

impl<F: RaceCountFormat> RoundFormat for PerRace<F> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn generate_round(&self, input: &FormatInput<'_>) -> Generation {
        let mut draft = RoundDraft::new(input);
        let pool = open_pool(input.plan, &draft);
        if pool.is_empty() || input.channels().group_count() == 0 {
            return draft.into_generation();
        }

        let count = self.inner.race_count(input, &pool);
        let mut taken: BTreeMap<Bracket, usize> = BTreeMap::new();
        for index in 0..count {
            let bracket = self.inner.bracket(index);
            let nth = taken.entry(bracket).or_insert(0);
            let slot = match draft.editable(bracket).get(*nth) {
                Some(&existing) => existing,
                None => draft.add_race(bracket),
            };
            *nth += 1;
            if input.plan.casual_practice {
                continue;
            }
            let unplaced = self
                .inner
                .populate(input, index, count, &pool, &mut draft.races[slot]);
            for pilot in unplaced {
                draft.unplaced(&pilot, format!("no seat in race {}", index + 1));
            }
        }

        draft.into_generation()
    }
}

/// Standings ladder.
///
/// The field is ordered by points (then best time) and cut into
/// consecutive, near-equal races: the leaders fly race 1, the next group
/// race 2, and so on. Earlier races take the extra pilot when the field
/// does not divide evenly.
#[derive(Debug, Clone, Copy, Default)]
pub struct LadderFormat;

impl LadderFormat {
    /// Pilots of race `index` out of `count` over an ordered field of `n`.
    fn chunk(index: usize, count: usize, n: usize) -> std::ops::Range<usize> {
        let base = n / count;
        let extra = n % count;
        let start = index * base + index.min(extra);
        let len = base + usize::from(index < extra);
        start..(start + len).min(n)
    }
}

impl RaceCountFormat for LadderFormat {
    fn name(&self) -> &'static str {
        "ladder"
    }

    fn race_count(&self, input: &FormatInput<'_>, pool: &[String]) -> usize {
        input
            .plan
            .number_of_races
            .unwrap_or_else(|| input.plan.races_needed(pool.len()))
            .max(1)
    }

    fn populate(
        &self,
        input: &FormatInput<'_>,
        index: usize,
        count: usize,
        pool: &[String],
        race: &mut Race,
    ) -> Vec<String> {
        let model = input.channels();
        let context = SeedingContext::new(pool).with_standings(input.standings, pool);
        let order = SeedingEngine::by_standings().order(pool, &context);

        let mut unplaced = Vec::new();
        for pilot in &order[Self::chunk(index, count, order.len())] {
            let channel = super::pick_channel(race, input.plan.channel_of(pilot), model)
                .or_else(|| super::pick_channel(race, None, model));
            let seated = channel
                .map(|c| race.add_pilot(pilot.as_str(), c, model).is_ok())
                .unwrap_or(false);
            if !seated {
                unplaced.push(pilot.clone());
            }
        }
        unplaced
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::history::PairingHistory;
    use crate::models::{PointsTable, RoundId, Standings};
    use crate::plan::RoundPlan;

    #[test]
    fn test_chunks_cover_field() {
        let ranges: Vec<_> = (0..3).map(|i| LadderFormat::chunk(i, 3, 10)).collect();
        assert_eq!(ranges, vec![0..4, 4..7, 7..10]);
        assert_eq!(LadderFormat::chunk(1, 2, 1), 1..1);
    }

    #[test]
    fn test_ladder_puts_leaders_in_race_one() {
        let model = raceband4();
        let plan = plan(6, model.clone());
        let prior = ended_race(
            RoundId(1),
            1,
            Bracket::None,
            &[("P5", "R3"), ("P4", "R1"), ("P3", "R8")],
            &model,
        );
        let standings = Standings::from_races([&prior], &PointsTable::default());
        let history = PairingHistory::new();
        let config = GeneratorConfig::default();
        let input = FormatInput::new(RoundId(2), &plan, &history, &standings, &config);

        let format = PerRace::new(LadderFormat);
        assert_eq!(format.name(), "ladder");
        let g = format.generate_round(&input);
        assert_eq!(g.race_count(), 2);
        let first: Vec<&str> = g.races[0].pilot_ids().collect();
        assert_eq!(first, vec!["P5", "P4", "P3"]);
        assert_eq!(g.races[1].pilot_count(), 3);
        assert!(g.is_valid());
    }

    #[test]
    fn test_regenerating_reuses_races() {
        let plan: RoundPlan = plan(8, raceband4()).with_casual_practice(true);
        let history = PairingHistory::new();
        let standings = Standings::new();
        let config = GeneratorConfig::default();
        let input = FormatInput::new(RoundId(1), &plan, &history, &standings, &config);
        let format = PerRace::new(LadderFormat);

        let first = format.generate_round(&input);
        assert_eq!(first.race_count(), 2);

        let existing: Vec<&Race> = first.races.iter().collect();
        let second = format.generate_round(&input.with_existing_races(&existing));
        let numbers: Vec<u32> = second.races.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }
}
