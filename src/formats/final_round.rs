//! Parallel finals.
//!
//! One race per bracket letter. Pilots are ordered by the bracket of their
//! last race, then points (descending), then personal best (ascending), and
//! poured into the races in turn. The current race is closed once it holds
//! `ceil(remaining pilots / remaining races)` pilots or has no channel left
//! for the next pilot, so uneven counts still fill the finals evenly.

use tracing::debug;

use super::{open_pool, pick_channel, FormatInput, RoundDraft, RoundFormat};
use crate::models::{Bracket, Generation};
use crate::seeding::{SeedingContext, SeedingEngine};

/// Lettered finals.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinalFormat;

impl RoundFormat for FinalFormat {
    fn name(&self) -> &'static str {
        "final"
    }

    fn generate_round(&self, input: &FormatInput<'_>) -> Generation {
        let plan = input.plan;
        let model = input.channels();
        let mut draft = RoundDraft::new(input);
        let pool = open_pool(plan, &draft);
        if pool.is_empty() || model.group_count() == 0 {
            return draft.into_generation();
        }

        let context = SeedingContext::new(&pool).with_standings(input.standings, &pool);
        let order = SeedingEngine::for_finals().order(&pool, &context);

        let count = plan
            .number_of_races
            .unwrap_or_else(|| plan.races_needed(order.len()))
            .max(1);
        let mut races: Vec<usize> = (0..count)
            .map(|i| final_race(&mut draft, i))
            .collect();
        if plan.casual_practice {
            return draft.into_generation();
        }

        let mut current = 0;
        let mut remaining = order.len();
        let mut max_per_race = remaining.div_ceil(count);

        for pilot in &order {
            let preferred = plan.channel_of(pilot);
            loop {
                if current >= races.len() {
                    let index = final_race(&mut draft, current);
                    debug!(race = draft.races[index].number, "added final");
                    races.push(index);
                    max_per_race = remaining;
                }
                let race = &draft.races[races[current]];
                let channel = if race.pilot_count() >= max_per_race {
                    None
                } else {
                    pick_channel(race, preferred, model)
                };
                match channel {
                    Some(channel) => {
                        draft.seat(races[current], pilot, channel, model);
                        remaining -= 1;
                        break;
                    }
                    None => {
                        current += 1;
                        let races_left = races.len().saturating_sub(current).max(1);
                        max_per_race = remaining.div_ceil(races_left);
                    }
                }
            }
        }

        draft.into_generation()
    }
}

/// The editable final for letter `index`, or a new one.
fn final_race(draft: &mut RoundDraft, index: usize) -> usize {
    let bracket = Bracket::letter(index);
    match draft.editable(bracket).first() {
        Some(&existing) => existing,
        None => draft.add_race(bracket),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::history::PairingHistory;
    use crate::models::{PointsTable, Race, RoundId, Standings};

    #[test]
    fn test_finals_fill_evenly_in_points_order() {
        let model = raceband4();
        let plan = plan(7, model.clone());
        // Two qualifying heats of 4 and 3, finishing in slot order
        let q1 = ended_race(
            RoundId(1),
            1,
            Bracket::None,
            &[("P6", "R6"), ("P5", "R3"), ("P4", "R1"), ("P3", "R8")],
            &model,
        );
        let q2 = ended_race(
            RoundId(1),
            2,
            Bracket::None,
            &[("P2", "R6"), ("P1", "R3"), ("P0", "R1")],
            &model,
        );
        let races: Vec<&Race> = vec![&q1, &q2];
        let standings = Standings::from_races(races.iter().copied(), &PointsTable::default());
        let history = PairingHistory::new();
        let config = GeneratorConfig::default();
        let input = FormatInput::new(RoundId(2), &plan, &history, &standings, &config);

        let g = FinalFormat.generate_round(&input);
        assert_eq!(g.race_count(), 2);
        assert_eq!(g.races[0].bracket, Bracket::Lettered('A'));
        assert_eq!(g.races[1].bracket, Bracket::Lettered('B'));
        assert_eq!(g.races[0].pilot_count(), 4);
        assert_eq!(g.races[1].pilot_count(), 3);
        // Winners of both heats (10 points) lead the A final
        assert!(g.races[0].has_pilot("P6"));
        assert!(g.races[0].has_pilot("P2"));
        assert!(g.races[1].has_pilot("P0"));
    }

    #[test]
    fn test_explicit_race_count_splits_evenly() {
        let model = raceband4();
        let plan = crate::plan::RoundPlan::new(
            vec![
                crate::models::PilotChannel::new("A", "R1"),
                crate::models::PilotChannel::new("B", "R3"),
                crate::models::PilotChannel::new("C", "R6"),
                crate::models::PilotChannel::new("D", "R8"),
            ],
            model,
        )
        .with_number_of_races(2);
        let history = PairingHistory::new();
        let standings = Standings::new();
        let config = GeneratorConfig::default();
        let input = FormatInput::new(RoundId(2), &plan, &history, &standings, &config);

        let g = FinalFormat.generate_round(&input);
        let sizes: Vec<usize> = g.races.iter().map(|r| r.pilot_count()).collect();
        assert_eq!(sizes, vec![2, 2]);
        assert!(g.races[0].has_pilot("A") && g.races[0].has_pilot("B"));
    }

    #[test]
    fn test_regenerating_reuses_finals() {
        let model = raceband4();
        let plan = plan(8, model).with_casual_practice(true);
        let history = PairingHistory::new();
        let standings = Standings::new();
        let config = GeneratorConfig::default();
        let input = FormatInput::new(RoundId(2), &plan, &history, &standings, &config);

        let first = FinalFormat.generate_round(&input);
        assert_eq!(first.race_count(), 2);

        let existing: Vec<&Race> = first.races.iter().collect();
        let input = input.with_existing_races(&existing);
        let second = FinalFormat.generate_round(&input);
        let brackets: Vec<(u32, Bracket)> =
            second.races.iter().map(|r| (r.number, r.bracket)).collect();
        assert_eq!(
            brackets,
            vec![(1, Bracket::Lettered('A')), (2, Bracket::Lettered('B'))]
        );
    }
}
