//! Round formats.
//!
//! A format turns a [`RoundPlan`] plus prior races into the races of a new
//! round. Every format implements [`RoundFormat`]; formats whose only
//! variable is the race count implement the simpler [`RaceCountFormat`]
//! and are wrapped by [`PerRace`].
//!
//! # Formats
//!
//! | Format | Round type | Placement |
//! |--------|-----------|-----------|
//! | [`AutoFormat`] | `Round` | Score-based, minimises repeat pairings |
//! | [`SeededFormat`] | `Round` (ordered/seeded) | Round-robin in plan order |
//! | [`FinalFormat`] | `Final` | Bracket/points order, filled in turn |
//! | [`DoubleElimination`] | `DoubleElimination` | Winners/losers rotation |
//! | [`ChaseTheAce`] | `ChaseTheAce` | Repeat the last race |
//! | [`StreetLeague`] | `StreetLeague` | Points-ordered groups |
//! | [`LadderFormat`] | `Ladder` | Standings-ordered chunks |
//!
//! Formats only ever edit races that have not started. Started and ended
//! races already in the round are passed through untouched, and pilots
//! already seated in the round are not placed again.

mod auto;
mod chase_the_ace;
mod double_elimination;
mod final_round;
mod per_race;
mod scoring;
mod seeded;
mod street_league;

pub use auto::AutoFormat;
pub use chase_the_ace::ChaseTheAce;
pub use double_elimination::{make_winners_losers, BracketSplit, DoubleElimination};
pub use final_round::FinalFormat;
pub use per_race::{LadderFormat, PerRace, RaceCountFormat};
pub use seeded::SeededFormat;
pub use street_league::StreetLeague;

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use crate::config::GeneratorConfig;
use crate::error::ScheduleError;
use crate::history::PairingHistory;
use crate::models::{
    Bracket, ChannelModel, Generation, PilotChannel, Race, RoundId, RoundType, Standings,
    Violation,
};
use crate::plan::{PilotOrdering, RoundPlan};

/// Everything a format reads while generating one round.
#[derive(Debug, Clone, Copy)]
pub struct FormatInput<'a> {
    /// Round being generated.
    pub round_id: RoundId,
    /// Resolved plan.
    pub plan: &'a RoundPlan,
    /// Pairing history of every other round.
    pub history: &'a PairingHistory,
    /// Races of the calling round, ordered by number.
    pub prior_races: &'a [&'a Race],
    /// Races already in the round being generated.
    pub existing_races: &'a [&'a Race],
    /// Races of earlier rounds in the same stage, chronologically.
    pub stage_races: &'a [&'a Race],
    /// Standings over the whole event.
    pub standings: &'a Standings,
    /// Generator settings.
    pub config: &'a GeneratorConfig,
}

impl<'a> FormatInput<'a> {
    /// Creates an input with no prior, existing or stage races.
    pub fn new(
        round_id: RoundId,
        plan: &'a RoundPlan,
        history: &'a PairingHistory,
        standings: &'a Standings,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            round_id,
            plan,
            history,
            prior_races: &[],
            existing_races: &[],
            stage_races: &[],
            standings,
            config,
        }
    }

    /// Sets the calling round's races.
    pub fn with_prior_races(mut self, races: &'a [&'a Race]) -> Self {
        self.prior_races = races;
        self
    }

    /// Sets the races already in the round.
    pub fn with_existing_races(mut self, races: &'a [&'a Race]) -> Self {
        self.existing_races = races;
        self
    }

    /// Sets the earlier races of the stage.
    pub fn with_stage_races(mut self, races: &'a [&'a Race]) -> Self {
        self.stage_races = races;
        self
    }

    /// Channel model of the plan.
    pub fn channels(&self) -> &'a ChannelModel {
        &self.plan.channels
    }
}

/// A tournament format.
pub trait RoundFormat: Debug {
    /// Format name (e.g., "auto").
    fn name(&self) -> &'static str;

    /// Refuses generation when the inputs are unusable for this format.
    fn can_generate(&self, _input: &FormatInput<'_>) -> Result<(), ScheduleError> {
        Ok(())
    }

    /// Produces every race of the round.
    fn generate_round(&self, input: &FormatInput<'_>) -> Generation;

    /// Pilots that feed the next round's plan.
    fn output_pilots(&self, round_races: &[&Race]) -> Vec<String> {
        default_output_pilots(round_races)
    }
}

/// Format for a round type and seeding policy.
pub fn format_for(
    round_type: RoundType,
    ordering: PilotOrdering,
    config: &GeneratorConfig,
) -> Box<dyn RoundFormat> {
    match round_type {
        RoundType::Round => match ordering {
            PilotOrdering::MinimisePreviouslyFlown => Box::new(AutoFormat),
            PilotOrdering::Ordered | PilotOrdering::Seeded => Box::new(SeededFormat),
        },
        RoundType::Final => Box::new(FinalFormat),
        RoundType::DoubleElimination => Box::new(DoubleElimination),
        RoundType::ChaseTheAce => Box::new(ChaseTheAce::new(config.chase_the_ace_limit)),
        RoundType::StreetLeague => Box::new(StreetLeague),
        RoundType::Ladder => Box::new(PerRace::new(LadderFormat)),
    }
}

/// Every pilot of the round, in race then slot order.
pub fn default_output_pilots(round_races: &[&Race]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut pilots = Vec::new();
    for race in round_races {
        for pilot in race.pilot_ids() {
            if seen.insert(pilot) {
                pilots.push(pilot.to_string());
            }
        }
    }
    pilots
}

/// Minimum heats needed so interfering channels never share a heat.
///
/// For each channel, its own usage plus the usage of every channel that
/// interferes with it; the maximum over channels.
pub fn heat_count_from_shared_frequencies(slots: &[PilotChannel], model: &ChannelModel) -> usize {
    let mut usage: HashMap<&str, usize> = HashMap::new();
    for slot in slots {
        *usage.entry(slot.channel_id.as_str()).or_insert(0) += 1;
    }
    usage
        .iter()
        .map(|(&channel, &own)| {
            own + model
                .interfering_channels(channel)
                .iter()
                .map(|other| usage.get(other.as_str()).copied().unwrap_or(0))
                .sum::<usize>()
        })
        .max()
        .unwrap_or(0)
}

/// Channel a pilot would fly in `race`.
///
/// The preferred channel if it is free, else the first free channel of the
/// same band type, else (only when the preferred channel is unknown) any
/// free channel. `None` when the race is full or nothing fits.
pub fn pick_channel<'m>(
    race: &Race,
    preferred: Option<&str>,
    model: &'m ChannelModel,
) -> Option<&'m str> {
    if race.is_full() {
        return None;
    }
    let preferred = preferred.and_then(|id| model.get(id));
    if let Some(channel) = preferred {
        if race.is_frequency_free(&channel.id, model) {
            return Some(channel.id.as_str());
        }
    }
    match preferred {
        Some(channel) => race
            .free_frequencies(model.channels_of_type(channel.band_type), model)
            .into_iter()
            .next()
            .map(|c| c.id.as_str()),
        None => race
            .free_frequencies(model.channels(), model)
            .into_iter()
            .next()
            .map(|c| c.id.as_str()),
    }
}

/// Working set of a round's races while a format fills them.
///
/// Starts from the races already in the round. Locked races stay as they
/// are; editable ones may receive more pilots; new shells are numbered
/// after the highest existing race.
#[derive(Debug)]
pub(crate) struct RoundDraft {
    round_id: RoundId,
    capacity: usize,
    practice: bool,
    next_number: u32,
    pub(crate) races: Vec<Race>,
    pub(crate) violations: Vec<Violation>,
}

impl RoundDraft {
    pub(crate) fn new(input: &FormatInput<'_>) -> Self {
        let races: Vec<Race> = input.existing_races.iter().map(|r| (*r).clone()).collect();
        let next_number = races.iter().map(|r| r.number).max().unwrap_or(0) + 1;
        Self {
            round_id: input.round_id,
            capacity: input.plan.channels_per_race(),
            practice: input.plan.casual_practice,
            next_number,
            races,
            violations: Vec::new(),
        }
    }

    /// Whether the pilot already holds a slot in the round.
    pub(crate) fn is_placed(&self, pilot_id: &str) -> bool {
        self.races.iter().any(|r| r.has_pilot(pilot_id))
    }

    /// Appends an empty race and returns its index.
    pub(crate) fn add_race(&mut self, bracket: Bracket) -> usize {
        let mut race =
            Race::new(self.round_id, self.next_number, self.capacity).with_bracket(bracket);
        race.practice = self.practice;
        self.next_number += 1;
        self.races.push(race);
        self.races.len() - 1
    }

    /// Appends a copy of `race` renumbered into this round.
    pub(crate) fn push_clone(&mut self, race: &Race) -> usize {
        self.races
            .push(race.clone_for_round(self.round_id, self.next_number));
        self.next_number += 1;
        self.races.len() - 1
    }

    /// Indices of editable races in `bracket`, ordered by number.
    pub(crate) fn editable(&self, bracket: Bracket) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.races.len())
            .filter(|&i| self.races[i].bracket == bracket && self.races[i].is_editable())
            .collect();
        indices.sort_by_key(|&i| self.races[i].number);
        indices
    }

    /// Seats a pilot, recording an unplaced violation on failure.
    pub(crate) fn seat(
        &mut self,
        index: usize,
        pilot_id: &str,
        channel_id: &str,
        model: &ChannelModel,
    ) -> bool {
        match self.races[index].add_pilot(pilot_id, channel_id, model) {
            Ok(()) => true,
            Err(e) => {
                self.unplaced(pilot_id, e.to_string());
                false
            }
        }
    }

    /// Seats a pilot in the first of `indices` (starting at `start`, cycling)
    /// with a channel for it, appending a new race when none has room.
    pub(crate) fn seat_cycling(
        &mut self,
        indices: &mut Vec<usize>,
        start: usize,
        pilot_id: &str,
        preferred: Option<&str>,
        bracket: Bracket,
        model: &ChannelModel,
    ) -> bool {
        let count = indices.len();
        for offset in 0..count {
            let index = indices[(start + offset) % count];
            if let Some(channel) = pick_channel(&self.races[index], preferred, model) {
                return self.seat(index, pilot_id, channel, model);
            }
        }
        let index = self.add_race(bracket);
        indices.push(index);
        match pick_channel(&self.races[index], preferred, model) {
            Some(channel) => self.seat(index, pilot_id, channel, model),
            None => {
                self.unplaced(pilot_id, "no channel available");
                false
            }
        }
    }

    pub(crate) fn unplaced(&mut self, pilot_id: &str, reason: impl Into<String>) {
        self.violations
            .push(Violation::unplaced_pilot(pilot_id, reason));
    }

    pub(crate) fn into_generation(self) -> Generation {
        let mut generation = Generation {
            races: self.races,
            violations: self.violations,
        };
        generation.sort();
        generation
    }
}

/// Plan pilots still to seat: not practice pilots, not already placed.
pub(crate) fn open_pool(plan: &RoundPlan, draft: &RoundDraft) -> Vec<String> {
    plan.pilot_ids()
        .filter(|id| !plan.is_practice_pilot(id) && !draft.is_placed(id))
        .map(str::to_string)
        .collect()
}
