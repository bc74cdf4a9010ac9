//! Street league.
//!
//! The whole field is regrouped every round: lowest cumulative points
//! first, cut into groups as large as the previous round's channel count.
//! Groups are then evened out by passing the last pilot of each group to
//! the following one until sizes differ by at most one. Pilots keep their
//! previous channel where they can.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use tracing::debug;

use super::{open_pool, pick_channel, FormatInput, RoundDraft, RoundFormat};
use crate::models::{Bracket, Generation, RaceResult};
use crate::seeding::{SeedingContext, SeedingEngine};

/// Points-ordered regrouping.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreetLeague;

impl StreetLeague {
    /// Group size for the round.
    fn group_size(input: &FormatInput<'_>) -> usize {
        let groups = input.channels().group_count();
        let used: BTreeSet<&str> = input
            .prior_races
            .iter()
            .flat_map(|r| r.pilot_channels())
            .map(|pc| pc.channel_id.as_str())
            .collect();
        let size = if used.is_empty() { groups } else { used.len() };
        size.clamp(1, groups.max(1))
    }

    /// Cuts `pool` into groups of `size` and evens them out.
    pub fn split_groups(pool: Vec<String>, size: usize) -> Vec<Vec<String>> {
        let size = size.max(1);
        let mut chunks: Vec<Vec<String>> = pool.chunks(size).map(<[String]>::to_vec).collect();

        let limit = pool.len() * pool.len() + 1;
        for _ in 0..limit {
            let Some(max) = chunks.iter().map(Vec::len).max() else {
                break;
            };
            let Some((min_i, min)) = chunks
                .iter()
                .map(Vec::len)
                .enumerate()
                .min_by_key(|&(i, len)| (len, Reverse(i)))
            else {
                break;
            };
            if max - min <= 1 || min_i == 0 {
                break;
            }
            if let Some(moved) = chunks[min_i - 1].pop() {
                chunks[min_i].insert(0, moved);
            }
        }
        chunks
    }

    /// Re-ranks a street league race.
    ///
    /// Most laps first, then fastest time, pilots without a time after
    /// those with one, DNFs last. Positions follow the ranking and points
    /// are awarded directly: `n` for the winner down to `1` for the last
    /// finisher, `0` for a DNF.
    pub fn adjust_results(results: &mut [RaceResult]) {
        results.sort_by_key(|r| (r.dnf, Reverse(r.laps), r.time_ms.is_none(), r.time_ms));
        let n = results.len();
        for (i, result) in results.iter_mut().enumerate() {
            result.position = i as u32 + 1;
            result.points = Some(if result.dnf { 0 } else { (n - i) as i32 });
        }
    }
}

impl RoundFormat for StreetLeague {
    fn name(&self) -> &'static str {
        "street-league"
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
        let order = SeedingEngine::for_street_league().order(&pool, &context);
        let size = Self::group_size(input);
        let groups = Self::split_groups(order, size);
        debug!(size, groups = groups.len(), "street league groups");

        let mut races = draft.editable(Bracket::None);
        while races.len() < groups.len() {
            races.push(draft.add_race(Bracket::None));
        }
        if plan.casual_practice {
            return draft.into_generation();
        }

        for (group, &index) in groups.iter().zip(&races) {
            let mut pending = Vec::new();
            for pilot in group {
                let race = &draft.races[index];
                let kept = plan
                    .channel_of(pilot)
                    .filter(|c| !race.is_full() && race.is_frequency_free(c, model));
                match kept {
                    Some(channel) => {
                        draft.seat(index, pilot, channel, model);
                    }
                    None => pending.push(pilot),
                }
            }
            for pilot in pending {
                let race = &draft.races[index];
                let channel = pick_channel(race, plan.channel_of(pilot), model)
                    .or_else(|| pick_channel(race, None, model));
                match channel {
                    Some(channel) => {
                        draft.seat(index, pilot, channel, model);
                    }
                    None => draft.unplaced(pilot, "no free channel in group"),
                }
            }
        }

        draft.into_generation()
    }
}
