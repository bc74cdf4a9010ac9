//! General heat balancing with minimal repeat pairings.
//!
//! # Algorithm
//!
//! Per bracket of the calling round (or a single unbracketed pool):
//!
//! 1. Pool = plan pilots of the bracket, minus practice pilots and pilots
//!    already seated in the round.
//! 2. Under the `Change` policy, re-roll channels per band type so pilots
//!    who have never met end up on channels that can share a heat.
//! 3. Heat count = requested (or `ceil(pilots / channels per race)`), raised
//!    to the shared-frequency lower bound and to the calling round's heat
//!    count for the bracket.
//! 4. Greedy placement: score every (pilot, race) pair and seat the best,
//!    until the pool is empty or the retry budget runs out.
//! 5. Rebalance: move pilots from the largest race to the smallest while
//!    their sizes differ by more than one.
//!
//! # Complexity
//! O(b * p² * r) per round for b placement attempts, p pilots, r races.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::scoring::{PilotPoints, Scorer, Seat};
use super::{
    heat_count_from_shared_frequencies, open_pool, pick_channel, FormatInput, RoundDraft,
    RoundFormat,
};
use crate::models::{Bracket, Generation, PilotChannel, Race, Violation};
use crate::plan::ChannelChange;
use crate::seeding::{SeedingContext, SeedingEngine};

/// Score-based heat generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoFormat;

impl RoundFormat for AutoFormat {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn generate_round(&self, input: &FormatInput<'_>) -> Generation {
        let mut draft = RoundDraft::new(input);
        if input.channels().group_count() == 0 {
            return draft.into_generation();
        }

        let brackets = prior_brackets(input.prior_races);
        let mut pools: Vec<(Bracket, Vec<String>)> =
            brackets.iter().map(|&b| (b, Vec::new())).collect();
        for pilot in open_pool(input.plan, &draft) {
            let bracket = input
                .prior_races
                .iter()
                .find(|r| r.has_pilot(&pilot))
                .map_or(brackets[0], |r| r.bracket);
            if let Some((_, pool)) = pools.iter_mut().find(|(b, _)| *b == bracket) {
                pool.push(pilot);
            }
        }

        let mut rng = input.config.shuffle_seed.map(StdRng::seed_from_u64);
        for (bracket, mut pool) in pools {
            if let Some(rng) = rng.as_mut() {
                pool.shuffle(rng);
            }
            let prior_heats = input
                .prior_races
                .iter()
                .filter(|r| r.bracket == bracket)
                .count();
            fill_bracket(input, &mut draft, bracket, pool, prior_heats);
        }

        draft.into_generation()
    }
}

/// Brackets of the calling round in race order; `[None]` without one.
fn prior_brackets(prior_races: &[&Race]) -> Vec<Bracket> {
    let mut brackets = Vec::new();
    for race in prior_races {
        if !brackets.contains(&race.bracket) {
            brackets.push(race.bracket);
        }
    }
    if brackets.is_empty() {
        brackets.push(Bracket::None);
    }
    brackets
}

fn fill_bracket(
    input: &FormatInput<'_>,
    draft: &mut RoundDraft,
    bracket: Bracket,
    pool: Vec<String>,
    prior_heats: usize,
) {
    let plan = input.plan;
    let model = input.channels();

    let mut channels: HashMap<String, String> = pool
        .iter()
        .filter_map(|p| {
            plan.channel_of(p)
                .filter(|c| model.contains(c))
                .map(|c| (p.clone(), c.to_string()))
        })
        .collect();
    if plan.channel_change == ChannelChange::Change {
        reassign_channels(input, &pool, &mut channels);
    }

    let mut races = draft.editable(bracket);
    let mut slots: Vec<PilotChannel> = races
        .iter()
        .flat_map(|&i| draft.races[i].pilot_channels().iter().cloned())
        .collect();
    let mut targets: Vec<String> = slots.iter().map(|s| s.pilot_id.clone()).collect();
    targets.extend(pool.iter().cloned());
    slots.extend(
        pool.iter()
            .filter_map(|p| channels.get(p).map(|c| PilotChannel::new(p.clone(), c.clone()))),
    );

    let total = targets.len();
    if total == 0 {
        return;
    }

    let requested = plan
        .number_of_races
        .unwrap_or_else(|| plan.races_needed(total));
    let shared = heat_count_from_shared_frequencies(&slots, model);
    let heats = requested.max(shared).max(prior_heats).max(1);
    if heats > requested {
        debug!(?bracket, requested, shared, prior_heats, heats, "raised heat count");
    }
    while races.len() < heats {
        races.push(draft.add_race(bracket));
    }

    if plan.casual_practice {
        return;
    }

    let scorer = Scorer {
        history: input.history,
        weights: &input.config.weights,
        keep_channels: plan.channel_change == ChannelChange::KeepFromPreviousRound,
        targets: &targets,
    };
    let mut placement = Placement {
        input,
        bracket,
        scorer,
        channels,
        total,
        races,
        moved: HashSet::new(),
    };
    placement.place(draft, pool);
    placement.rebalance(draft);
}

/// Under the `Change` policy, picks a fresh channel for every pool pilot.
///
/// Per band type, pilots are taken lowest pairing load first. Each pilot
/// avoids channels that clash with pilots it has never raced, then takes
/// the least contended remaining channel, preferring the one it already
/// flies. With nothing legal it takes the least contended channel overall.
fn reassign_channels(
    input: &FormatInput<'_>,
    pool: &[String],
    channels: &mut HashMap<String, String>,
) {
    let model = input.channels();
    let history = input.history;
    let band_types = model.band_types();

    for &band in &band_types {
        let band_channels = model.channels_of_type(band);
        let pilots: Vec<&String> = pool
            .iter()
            .filter(|p| {
                match channels.get(p.as_str()).and_then(|c| model.band_type_of(c)) {
                    Some(t) => t == band,
                    None => band == band_types[0],
                }
            })
            .collect();
        let context = SeedingContext::new(&pilots).with_history(history, &pilots);
        let order = SeedingEngine::by_pairing_load().order(&pilots, &context);

        let mut usage: HashMap<&str, usize> = HashMap::new();
        let mut assigned: Vec<(String, &str)> = Vec::new();
        for pilot in order {
            let previous = channels.get(&pilot).cloned();
            let load = |id: &str| {
                usage.get(id).copied().unwrap_or(0)
                    + model
                        .interfering_channels(id)
                        .iter()
                        .map(|o| usage.get(o.as_str()).copied().unwrap_or(0))
                        .sum::<usize>()
            };
            let legal: Vec<_> = band_channels
                .iter()
                .copied()
                .filter(|c| {
                    !assigned.iter().any(|(other, taken)| {
                        history.flown_count(&pilot, other) == 0
                            && model.shares_frequency(&c.id, taken)
                    })
                })
                .collect();
            let candidates = if legal.is_empty() {
                &band_channels
            } else {
                &legal
            };
            let pick = candidates
                .iter()
                .enumerate()
                .min_by_key(|(i, c)| {
                    (
                        load(&c.id),
                        previous.as_deref() != Some(c.id.as_str()),
                        *i,
                    )
                })
                .map(|(_, c)| *c)
                .map(|c| c.id.as_str());

            if let Some(channel) = pick {
                debug!(pilot = pilot.as_str(), channel, ?previous, "channel re-rolled");
                *usage.entry(channel).or_insert(0) += 1;
                channels.insert(pilot.clone(), channel.to_string());
                assigned.push((pilot, channel));
            }
        }
    }
}

/// Placement state for one bracket.
struct Placement<'a, 'i> {
    input: &'a FormatInput<'i>,
    bracket: Bracket,
    scorer: Scorer<'a>,
    /// Channel each pool pilot wants to fly.
    channels: HashMap<String, String>,
    total: usize,
    /// Draft indices of the bracket's races, by number.
    races: Vec<usize>,
    /// Pilots seated by this pass; only these may be moved.
    moved: HashSet<String>,
}

impl Placement<'_, '_> {
    fn soft_max(&self) -> usize {
        self.total.div_ceil(self.races.len().max(1))
    }

    fn place(&mut self, draft: &mut RoundDraft, mut unplaced: Vec<String>) {
        let model = self.input.channels();
        let budget = self.input.config.placement_budget(unplaced.len());
        let mut attempts = 0;

        while !unplaced.is_empty() && attempts < budget {
            attempts += 1;
            let soft_max = self.soft_max();
            let mut best: Option<(PilotPoints, &str)> = None;

            for (pi, pilot) in unplaced.iter().enumerate() {
                let own = self.channels.get(pilot).map(String::as_str);
                let own_free = self
                    .races
                    .iter()
                    .filter(|&&i| {
                        let race = &draft.races[i];
                        !race.is_full() && own.is_some_and(|c| race.is_frequency_free(c, model))
                    })
                    .count();

                for (ri, &index) in self.races.iter().enumerate() {
                    let race = &draft.races[index];
                    let Some(channel) = pick_channel(race, own, model) else {
                        continue;
                    };
                    let others: Vec<&str> = race.pilot_ids().collect();
                    let seat = Seat {
                        others: &others,
                        only_free: own_free == 1 && own == Some(channel),
                        at_capacity: race.pilot_count() >= soft_max,
                        channel_changed: own.is_some_and(|c| c != channel),
                    };
                    let points = PilotPoints {
                        score: self.scorer.points_for_race(pilot, &seat),
                        pilot: pi,
                        race: ri,
                    };
                    if best.map_or(true, |(b, _)| points > b) {
                        best = Some((points, channel));
                    }
                }
            }

            match best {
                Some((points, channel)) => {
                    let pilot = unplaced.remove(points.pilot);
                    let index = self.races[points.race];
                    if draft.seat(index, &pilot, channel, model) {
                        debug!(
                            pilot = pilot.as_str(),
                            channel,
                            race = draft.races[index].number,
                            score = points.score,
                            "placed pilot"
                        );
                        self.channels.insert(pilot.clone(), channel.to_string());
                        self.moved.insert(pilot);
                    }
                }
                None => {
                    let index = draft.add_race(self.bracket);
                    debug!(race = draft.races[index].number, "no free seat, added race");
                    self.races.push(index);
                }
            }
        }

        if !unplaced.is_empty() {
            for pilot in &unplaced {
                draft.unplaced(pilot, "placement budget exhausted");
            }
            draft
                .violations
                .push(Violation::retry_budget_exhausted(self.bracket, attempts, unplaced.len()));
        }
    }

    fn rebalance(&mut self, draft: &mut RoundDraft) {
        let model = self.input.channels();
        let cap = self.input.config.placement_budget(self.moved.len()).max(1);

        for _ in 0..cap {
            let Some((big, small)) = self.extremes(draft) else {
                return;
            };
            let soft_max = self.soft_max();
            let mut best: Option<(i64, String, &str)> = None;

            let small_race = &draft.races[small];
            let big_race = &draft.races[big];
            let small_others: Vec<&str> = small_race.pilot_ids().collect();
            for pilot in big_race.pilot_ids().filter(|p| self.moved.contains(*p)) {
                let own = self.channels.get(pilot).map(String::as_str);
                let Some(channel) = pick_channel(small_race, own, model) else {
                    continue;
                };
                let big_others: Vec<&str> = big_race.pilot_ids().filter(|p| *p != pilot).collect();
                let moved = self.scorer.points_for_race(
                    pilot,
                    &Seat {
                        others: &small_others,
                        only_free: false,
                        at_capacity: small_others.len() >= soft_max,
                        channel_changed: own.is_some_and(|c| c != channel),
                    },
                );
                let stayed = self.scorer.points_for_race(
                    pilot,
                    &Seat {
                        others: &big_others,
                        only_free: false,
                        at_capacity: big_others.len() >= soft_max,
                        channel_changed: own != big_race.channel_of(pilot),
                    },
                );
                let delta = moved - stayed;
                if best.as_ref().map_or(true, |(d, _, _)| delta > *d) {
                    best = Some((delta, pilot.to_string(), channel));
                }
            }

            let Some((delta, pilot, channel)) = best else {
                self.record_unbalanced(draft, big, small);
                return;
            };
            if draft.races[big].remove_pilot(&pilot).is_ok()
                && draft.seat(small, &pilot, channel, model)
            {
                debug!(
                    pilot = pilot.as_str(),
                    from = draft.races[big].number,
                    to = draft.races[small].number,
                    delta,
                    "rebalanced"
                );
                self.channels.insert(pilot, channel.to_string());
            }
        }

        if let Some((big, small)) = self.extremes(draft) {
            self.record_unbalanced(draft, big, small);
        }
    }

    /// Largest and smallest race when they differ by more than one.
    fn extremes(&self, draft: &RoundDraft) -> Option<(usize, usize)> {
        let size = |i: &usize| draft.races[*i].pilot_count();
        let big = self
            .races
            .iter()
            .copied()
            .reduce(|a, b| if size(&b) > size(&a) { b } else { a })?;
        let small = self
            .races
            .iter()
            .copied()
            .reduce(|a, b| if size(&b) < size(&a) { b } else { a })?;
        (size(&big) > size(&small) + 1).then_some((big, small))
    }

    fn record_unbalanced(&self, draft: &mut RoundDraft, big: usize, small: usize) {
        let largest = draft.races[big].pilot_count();
        let smallest = draft.races[small].pilot_count();
        draft
            .violations
            .push(Violation::unbalanced(self.bracket, largest, smallest));
    }
}
