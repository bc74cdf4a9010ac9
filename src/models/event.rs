//! Event state: pilots, channels, rounds and the race table.
//!
//! Races live in a single table owned by the event; rounds only hold
//! [`RaceKey`]s into it. Replacing a round's races pushes the new races,
//! swaps the round's key list in one assignment and then retires the old
//! entries, so a round is never observed half-rewritten.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ChannelModel, Pilot, PointsTable, Race, Round, RoundId, RoundType, StageId, Standings};
use crate::error::ScheduleError;
use crate::history::PairingHistory;

/// Index into the event's race table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RaceKey(pub usize);

/// Kind of event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// Competitive racing.
    #[default]
    Race,
    /// Casual practice: races are created but left pilotless.
    CasualPractice,
}

/// The read-only view the engine consumes, plus the race table it writes to.
#[derive(Debug, Clone)]
pub struct Event {
    /// Kind of event.
    pub event_type: EventType,
    pilots: Vec<Pilot>,
    channels: ChannelModel,
    default_channels: HashMap<String, String>,
    rounds: Vec<Round>,
    races: Vec<Option<Race>>,
}

impl Event {
    /// Creates an event flying on the given channels.
    pub fn new(channels: ChannelModel) -> Self {
        Self {
            event_type: EventType::Race,
            pilots: Vec::new(),
            channels,
            default_channels: HashMap::new(),
            rounds: Vec::new(),
            races: Vec::new(),
        }
    }

    /// Sets the event type.
    pub fn with_event_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    /// Whether races are created pilotless.
    pub fn is_casual_practice(&self) -> bool {
        self.event_type == EventType::CasualPractice
    }

    /// Registers a pilot.
    pub fn add_pilot(&mut self, pilot: Pilot) {
        self.pilots.push(pilot);
    }

    /// Registers a pilot with a default channel.
    pub fn add_pilot_on(&mut self, pilot: Pilot, channel_id: impl Into<String>) {
        self.default_channels
            .insert(pilot.id.clone(), channel_id.into());
        self.pilots.push(pilot);
    }

    /// Sets a pilot's default channel.
    pub fn set_default_channel(
        &mut self,
        pilot_id: impl Into<String>,
        channel_id: impl Into<String>,
    ) {
        self.default_channels
            .insert(pilot_id.into(), channel_id.into());
    }

    /// Registered pilots in entry order.
    pub fn pilots(&self) -> &[Pilot] {
        &self.pilots
    }

    /// Looks up a pilot.
    pub fn pilot(&self, id: &str) -> Option<&Pilot> {
        self.pilots.iter().find(|p| p.id == id)
    }

    /// The event's channel model.
    pub fn channels(&self) -> &ChannelModel {
        &self.channels
    }

    /// A pilot's default channel.
    pub fn default_channel(&self, pilot_id: &str) -> Option<&str> {
        self.default_channels.get(pilot_id).map(String::as_str)
    }

    /// All default channel assignments.
    pub fn default_channels(&self) -> &HashMap<String, String> {
        &self.default_channels
    }

    /// Adds an empty round and returns its ID.
    pub fn add_round(
        &mut self,
        number: u32,
        round_type: RoundType,
        stage: Option<StageId>,
    ) -> RoundId {
        let id = RoundId(self.rounds.len() as u32 + 1);
        let mut round = Round::new(id, number, round_type);
        round.stage = stage;
        self.rounds.push(round);
        id
    }

    fn round_index(&self, id: RoundId) -> Result<usize, ScheduleError> {
        self.rounds
            .iter()
            .position(|r| r.id == id)
            .ok_or(ScheduleError::UnknownRound(id))
    }

    /// Looks up a round.
    pub fn round(&self, id: RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == id)
    }

    /// Rounds ordered by number.
    pub fn rounds(&self) -> Vec<&Round> {
        let mut rounds: Vec<&Round> = self.rounds.iter().collect();
        rounds.sort_by_key(|r| (r.number, r.id));
        rounds
    }

    /// The round immediately before `id` by number.
    pub fn previous_round(&self, id: RoundId) -> Option<RoundId> {
        let current = self.round(id)?;
        self.rounds
            .iter()
            .filter(|r| (r.number, r.id) < (current.number, current.id))
            .max_by_key(|r| (r.number, r.id))
            .map(|r| r.id)
    }

    /// Appends a race to a round.
    pub fn push_race(
        &mut self,
        round_id: RoundId,
        mut race: Race,
    ) -> Result<RaceKey, ScheduleError> {
        let index = self.round_index(round_id)?;
        race.round_id = round_id;
        let key = RaceKey(self.races.len());
        self.races.push(Some(race));
        self.rounds[index].race_keys.push(key);
        Ok(key)
    }

    /// Looks up a race.
    pub fn race(&self, key: RaceKey) -> Option<&Race> {
        self.races.get(key.0).and_then(Option::as_ref)
    }

    /// Mutable access to a race (for recording results).
    pub fn race_mut(&mut self, key: RaceKey) -> Option<&mut Race> {
        self.races.get_mut(key.0).and_then(Option::as_mut)
    }

    /// Races of a round ordered by number.
    pub fn races_in_round(&self, id: RoundId) -> Vec<&Race> {
        let mut races: Vec<&Race> = self
            .round(id)
            .map(|r| r.race_keys.iter().filter_map(|k| self.race(*k)).collect())
            .unwrap_or_default();
        races.sort_by_key(|r| r.number);
        races
    }

    /// Keys of a round's races ordered by race number.
    pub fn race_keys_in_round(&self, id: RoundId) -> Vec<RaceKey> {
        let mut keys: Vec<RaceKey> = self
            .round(id)
            .map(|r| r.race_keys.clone())
            .unwrap_or_default();
        keys.sort_by_key(|k| self.race(*k).map_or(u32::MAX, |r| r.number));
        keys
    }

    /// All live races, rounds by number then races by number.
    pub fn races_chronological(&self) -> Vec<&Race> {
        self.rounds()
            .into_iter()
            .flat_map(|r| self.races_in_round(r.id))
            .collect()
    }

    /// Races of every round in `stage`, chronologically, skipping `excluding`.
    pub fn races_in_stage(&self, stage: Option<StageId>, excluding: Option<RoundId>) -> Vec<&Race> {
        self.rounds()
            .into_iter()
            .filter(|r| r.stage == stage && Some(r.id) != excluding)
            .flat_map(|r| self.races_in_round(r.id))
            .collect()
    }

    /// Races of the other rounds sharing `id`'s stage and round type.
    pub fn sibling_races(&self, id: RoundId) -> Vec<&Race> {
        let Some(round) = self.round(id) else {
            return Vec::new();
        };
        self.rounds()
            .into_iter()
            .filter(|r| r.id != id && r.stage == round.stage && r.round_type == round.round_type)
            .flat_map(|r| self.races_in_round(r.id))
            .collect()
    }

    /// Atomically replaces a round's races, returning the retired ones.
    pub fn replace_round_races(
        &mut self,
        id: RoundId,
        races: Vec<Race>,
    ) -> Result<Vec<Race>, ScheduleError> {
        let index = self.round_index(id)?;

        let mut keys = Vec::with_capacity(races.len());
        for mut race in races {
            race.round_id = id;
            keys.push(RaceKey(self.races.len()));
            self.races.push(Some(race));
        }

        let retired = std::mem::replace(&mut self.rounds[index].race_keys, keys);
        Ok(retired
            .into_iter()
            .filter_map(|k| self.races.get_mut(k.0).and_then(Option::take))
            .collect())
    }

    /// Pairing history rebuilt from every race outside `excluding`.
    pub fn pairing_history(&self, excluding: Option<RoundId>) -> PairingHistory {
        let mut history = PairingHistory::new();
        for round in self.rounds() {
            if Some(round.id) == excluding {
                continue;
            }
            history.add_races(self.races_in_round(round.id));
        }
        history
    }

    /// Standings folded over the whole event.
    pub fn standings(&self, table: &PointsTable) -> Standings {
        Standings::from_races(self.races_chronological(), table)
    }
}
