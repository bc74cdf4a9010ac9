//! Round plans.
//!
//! A [`RoundPlan`] is the resolved input of one generation: which pilots
//! are eligible, which channel each one currently flies, how many races to
//! build and which channel and seeding policies apply. It is built once
//! per call and never mutated by a format.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::config::GeneratorConfig;
use crate::error::ScheduleError;
use crate::formats::format_for;
use crate::models::{ChannelModel, Event, PilotChannel, RoundId, StageId};
use crate::seeding::{SeedingContext, SeedingEngine};

/// Whether pilots keep the channel they flew last round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelChange {
    /// Keep each pilot on its previous channel where possible.
    #[default]
    KeepFromPreviousRound,
    /// Re-roll channels to open up new pairings.
    Change,
}

/// How pilots are ordered before placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PilotOrdering {
    /// Score-based placement that minimises repeat pairings.
    #[default]
    MinimisePreviouslyFlown,
    /// Entry order, distributed round-robin.
    Ordered,
    /// Standings order, distributed round-robin.
    Seeded,
}

/// Resolved configuration for generating one round.
#[derive(Debug, Clone)]
pub struct RoundPlan {
    /// Round the pilots come from, if any.
    pub calling_round: Option<RoundId>,
    /// Candidate pilots with the channel each currently flies.
    pub pilots: Vec<PilotChannel>,
    /// Channels available to the round.
    pub channels: ChannelModel,
    /// Requested race count; `None` = auto.
    pub number_of_races: Option<usize>,
    /// Channel policy.
    pub channel_change: ChannelChange,
    /// Seeding policy.
    pub pilot_ordering: PilotOrdering,
    /// Races are created pilotless.
    pub casual_practice: bool,
    /// Stage of the round being generated.
    pub stage: Option<StageId>,
    /// Pilots excluded from competitive pools.
    pub practice_pilots: BTreeSet<String>,
}

impl RoundPlan {
    /// Creates a plan with default policies.
    pub fn new(pilots: Vec<PilotChannel>, channels: ChannelModel) -> Self {
        Self {
            calling_round: None,
            pilots,
            channels,
            number_of_races: None,
            channel_change: ChannelChange::default(),
            pilot_ordering: PilotOrdering::default(),
            casual_practice: false,
            stage: None,
            practice_pilots: BTreeSet::new(),
        }
    }

    /// Sets the calling round.
    pub fn with_calling_round(mut self, round: RoundId) -> Self {
        self.calling_round = Some(round);
        self
    }

    /// Requests an explicit race count.
    pub fn with_number_of_races(mut self, count: usize) -> Self {
        self.number_of_races = Some(count);
        self
    }

    /// Sets the channel policy.
    pub fn with_channel_change(mut self, policy: ChannelChange) -> Self {
        self.channel_change = policy;
        self
    }

    /// Sets the seeding policy.
    pub fn with_pilot_ordering(mut self, ordering: PilotOrdering) -> Self {
        self.pilot_ordering = ordering;
        self
    }

    /// Marks the round as casual practice.
    pub fn with_casual_practice(mut self, casual: bool) -> Self {
        self.casual_practice = casual;
        self
    }

    /// Sets the stage.
    pub fn with_stage(mut self, stage: StageId) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Flags a pilot as a practice pilot.
    pub fn with_practice_pilot(mut self, pilot_id: impl Into<String>) -> Self {
        self.practice_pilots.insert(pilot_id.into());
        self
    }

    /// Per-race pilot capacity (channel-group count).
    pub fn channels_per_race(&self) -> usize {
        self.channels.group_count()
    }

    /// Races needed to seat `pilots` pilots.
    pub fn races_needed(&self, pilots: usize) -> usize {
        match self.channels_per_race() {
            0 => 0,
            per_race => pilots.div_ceil(per_race),
        }
    }

    /// `ceil(competitive pilots / channels per race)`.
    pub fn auto_number_of_races(&self) -> usize {
        let competitive = self
            .pilots
            .iter()
            .filter(|pc| !self.is_practice_pilot(&pc.pilot_id))
            .count();
        self.races_needed(competitive)
    }

    /// Requested race count, or the automatic one.
    pub fn race_count(&self) -> usize {
        self.number_of_races
            .unwrap_or_else(|| self.auto_number_of_races())
    }

    /// Whether the pilot is excluded from competitive pools.
    pub fn is_practice_pilot(&self, pilot_id: &str) -> bool {
        self.practice_pilots.contains(pilot_id)
    }

    /// Whether the pilot is a candidate.
    pub fn contains_pilot(&self, pilot_id: &str) -> bool {
        self.pilots.iter().any(|pc| pc.pilot_id == pilot_id)
    }

    /// Channel the pilot currently flies.
    pub fn channel_of(&self, pilot_id: &str) -> Option<&str> {
        self.pilots
            .iter()
            .find(|pc| pc.pilot_id == pilot_id)
            .map(|pc| pc.channel_id.as_str())
    }

    /// Candidate IDs in plan order.
    pub fn pilot_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.pilots.iter().map(|pc| pc.pilot_id.as_str())
    }

    /// Resolves the plan for `round_id` from event state.
    ///
    /// - The calling round is the previous round by number.
    /// - Pilots are the calling round's output pilots (per its format), or
    ///   every registered pilot when there is no calling round or it is empty.
    /// - A pilot's channel is the one it flew in the calling round, else its
    ///   event default, else the next channel-group representative in turn.
    /// - `Seeded` ordering sorts pilots by points, then best time.
    pub fn from_event(
        event: &Event,
        round_id: RoundId,
        ordering: PilotOrdering,
        config: &GeneratorConfig,
    ) -> Result<Self, ScheduleError> {
        let round = event
            .round(round_id)
            .ok_or(ScheduleError::UnknownRound(round_id))?;
        let calling_round = event.previous_round(round_id);
        let model = event.channels();

        let mut calling_channels: HashMap<&str, &str> = HashMap::new();
        let mut pilot_ids: Vec<String> = Vec::new();
        if let Some(calling) = calling_round.and_then(|id| event.round(id)) {
            let races = event.races_in_round(calling.id);
            for race in &races {
                for pc in race.pilot_channels() {
                    calling_channels.insert(&pc.pilot_id, &pc.channel_id);
                }
            }
            let format = format_for(calling.round_type, ordering, config);
            pilot_ids = format
                .output_pilots(&races)
                .into_iter()
                .filter(|id| event.pilot(id).is_some())
                .collect();
        }
        if pilot_ids.is_empty() {
            pilot_ids = event.pilots().iter().map(|p| p.id.clone()).collect();
        }

        if ordering == PilotOrdering::Seeded {
            let standings = event.standings(&config.points);
            let context = SeedingContext::new(&pilot_ids).with_standings(&standings, &pilot_ids);
            pilot_ids = SeedingEngine::by_standings().order(&pilot_ids, &context);
        }

        let mut next_group = 0usize;
        let mut pilots = Vec::with_capacity(pilot_ids.len());
        for id in &pilot_ids {
            let known = calling_channels
                .get(id.as_str())
                .copied()
                .or_else(|| event.default_channel(id))
                .filter(|ch| model.contains(ch));
            let channel = match known {
                Some(ch) => Some(ch.to_string()),
                None => {
                    let rep = model
                        .representative(next_group % model.group_count().max(1))
                        .map(|c| c.id.clone());
                    next_group += 1;
                    rep
                }
            };
            if let Some(channel) = channel {
                pilots.push(PilotChannel::new(id.clone(), channel));
            }
        }

        let practice_pilots = event
            .pilots()
            .iter()
            .filter(|p| p.practice_pilot)
            .map(|p| p.id.clone())
            .collect();

        Ok(Self {
            calling_round,
            pilots,
            channels: model.clone(),
            number_of_races: None,
            channel_change: ChannelChange::default(),
            pilot_ordering: ordering,
            casual_practice: event.is_casual_practice(),
            stage: round.stage,
            practice_pilots,
        })
    }
}
