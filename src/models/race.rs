//! Race (heat) model.
//!
//! A race is a set of pilot→channel slots plus round/bracket/number
//! metadata. Races are created empty by a format, populated slot by slot,
//! then started and ended by the timing collaborator. Once a race has
//! started it is read-only history.
//!
//! # Lifecycle
//!
//! `Created → Populated → Started → Ended`

use serde::{Deserialize, Serialize};

use super::{Channel, ChannelModel, RoundId};
use crate::error::RaceError;

/// Bracket tag partitioning the races of a round.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Bracket {
    /// No bracket.
    #[default]
    None,
    /// Double elimination winners bracket.
    Winners,
    /// Double elimination losers bracket.
    Losers,
    /// Lettered bracket (`A`..`Z`), used by finals.
    Lettered(char),
}

impl Bracket {
    /// Lettered bracket for a zero-based index (`0 → A`), wrapping after `Z`.
    pub fn letter(index: usize) -> Self {
        let offset = (index % 26) as u8;
        Self::Lettered(char::from(b'A' + offset))
    }
}

/// Lifecycle state of a race.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RaceState {
    /// Created by a format, no pilots yet.
    #[default]
    Created,
    /// Has at least one pilot.
    Populated,
    /// Running; read-only from here on.
    Started,
    /// Results recorded.
    Ended,
}

impl RaceState {
    /// Whether formats may still edit the race.
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Created | Self::Populated)
    }
}

/// One slot of a race.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PilotChannel {
    /// Pilot occupying the slot.
    pub pilot_id: String,
    /// Channel the pilot flies on.
    pub channel_id: String,
}

impl PilotChannel {
    /// Creates a slot.
    pub fn new(pilot_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            pilot_id: pilot_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

/// A pilot's recorded result in an ended race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    /// Pilot the result belongs to.
    pub pilot_id: String,
    /// Finishing position (1 = winner).
    pub position: u32,
    /// Laps completed.
    pub laps: u32,
    /// Total race time (ms), if the pilot finished.
    pub time_ms: Option<i64>,
    /// Points override; `None` = use the event points table.
    pub points: Option<i32>,
    /// Did not finish.
    pub dnf: bool,
}

impl RaceResult {
    /// Creates a result at a finishing position.
    pub fn new(pilot_id: impl Into<String>, position: u32) -> Self {
        Self {
            pilot_id: pilot_id.into(),
            position,
            laps: 0,
            time_ms: None,
            points: None,
            dnf: false,
        }
    }

    /// Sets completed laps.
    pub fn with_laps(mut self, laps: u32) -> Self {
        self.laps = laps;
        self
    }

    /// Sets the total time.
    pub fn with_time(mut self, time_ms: i64) -> Self {
        self.time_ms = Some(time_ms);
        self
    }

    /// Overrides the awarded points.
    pub fn with_points(mut self, points: i32) -> Self {
        self.points = Some(points);
        self
    }

    /// Marks the result as a DNF.
    pub fn did_not_finish(mut self) -> Self {
        self.dnf = true;
        self
    }
}

/// A heat: pilot→channel slots with round, bracket and number metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    /// Round the race belongs to.
    pub round_id: RoundId,
    /// Race number within the round (1-based).
    pub number: u32,
    /// Bracket tag.
    pub bracket: Bracket,
    /// Practice races never feed the pairing history.
    pub practice: bool,
    /// Maximum number of slots (channel-group count).
    pub capacity: usize,
    state: RaceState,
    pilot_channels: Vec<PilotChannel>,
    results: Vec<RaceResult>,
}

impl Race {
    /// Creates an empty race.
    pub fn new(round_id: RoundId, number: u32, capacity: usize) -> Self {
        Self {
            round_id,
            number,
            bracket: Bracket::None,
            practice: false,
            capacity,
            state: RaceState::Created,
            pilot_channels: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Sets the bracket.
    pub fn with_bracket(mut self, bracket: Bracket) -> Self {
        self.bracket = bracket;
        self
    }

    /// Marks the race as a practice race.
    pub fn as_practice(mut self) -> Self {
        self.practice = true;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RaceState {
        self.state
    }

    /// Whether formats may still edit the race.
    pub fn is_editable(&self) -> bool {
        self.state.is_editable()
    }

    /// Whether results have been recorded.
    pub fn is_ended(&self) -> bool {
        self.state == RaceState::Ended
    }

    /// Slots in insertion order.
    pub fn pilot_channels(&self) -> &[PilotChannel] {
        &self.pilot_channels
    }

    /// Recorded results.
    pub fn results(&self) -> &[RaceResult] {
        &self.results
    }

    /// Number of occupied slots.
    pub fn pilot_count(&self) -> usize {
        self.pilot_channels.len()
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.pilot_channels.is_empty()
    }

    /// Whether every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.pilot_channels.len() >= self.capacity
    }

    /// Pilot IDs in slot order.
    pub fn pilot_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.pilot_channels.iter().map(|pc| pc.pilot_id.as_str())
    }

    /// Whether the pilot holds a slot.
    pub fn has_pilot(&self, pilot_id: &str) -> bool {
        self.pilot_channels.iter().any(|pc| pc.pilot_id == pilot_id)
    }

    /// Channel a pilot flies on in this race.
    pub fn channel_of(&self, pilot_id: &str) -> Option<&str> {
        self.pilot_channels
            .iter()
            .find(|pc| pc.pilot_id == pilot_id)
            .map(|pc| pc.channel_id.as_str())
    }

    /// First occupied channel that equals or interferes with `channel_id`,
    /// ignoring the slot of `skip_pilot`.
    fn conflicting_channel(
        &self,
        channel_id: &str,
        model: &ChannelModel,
        skip_pilot: Option<&str>,
    ) -> Option<&str> {
        self.pilot_channels
            .iter()
            .filter(|pc| skip_pilot != Some(pc.pilot_id.as_str()))
            .map(|pc| pc.channel_id.as_str())
            .find(|occupied| model.shares_frequency(occupied, channel_id))
    }

    /// Whether no pilot occupies `channel_id` or an interfering channel.
    pub fn is_frequency_free(&self, channel_id: &str, model: &ChannelModel) -> bool {
        self.conflicting_channel(channel_id, model, None).is_none()
    }

    /// Candidates minus occupied-or-interfering channels.
    pub fn free_frequencies<'a>(
        &self,
        candidates: impl IntoIterator<Item = &'a Channel>,
        model: &ChannelModel,
    ) -> Vec<&'a Channel> {
        candidates
            .into_iter()
            .filter(|c| self.is_frequency_free(&c.id, model))
            .collect()
    }

    fn ensure_editable(&self) -> Result<(), RaceError> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(RaceError::Locked(self.state))
        }
    }

    /// Adds a pilot on a channel.
    ///
    /// Either the slot is added or the race is left untouched.
    pub fn add_pilot(
        &mut self,
        pilot_id: impl Into<String>,
        channel_id: impl Into<String>,
        model: &ChannelModel,
    ) -> Result<(), RaceError> {
        self.ensure_editable()?;
        let pilot_id = pilot_id.into();
        let channel_id = channel_id.into();

        if self.has_pilot(&pilot_id) {
            return Err(RaceError::DuplicatePilot(pilot_id));
        }
        if self.is_full() {
            return Err(RaceError::Full(self.capacity));
        }
        if !model.contains(&channel_id) {
            return Err(RaceError::UnknownChannel(channel_id));
        }
        if let Some(occupied) = self.conflicting_channel(&channel_id, model, None) {
            return Err(RaceError::ChannelConflict {
                occupied: occupied.to_string(),
                channel: channel_id,
            });
        }

        self.pilot_channels.push(PilotChannel {
            pilot_id,
            channel_id,
        });
        self.state = RaceState::Populated;
        Ok(())
    }

    /// Removes a pilot, returning the freed slot.
    pub fn remove_pilot(&mut self, pilot_id: &str) -> Result<PilotChannel, RaceError> {
        self.ensure_editable()?;
        let index = self
            .pilot_channels
            .iter()
            .position(|pc| pc.pilot_id == pilot_id)
            .ok_or_else(|| RaceError::PilotNotInRace(pilot_id.to_string()))?;
        let slot = self.pilot_channels.remove(index);
        if self.pilot_channels.is_empty() {
            self.state = RaceState::Created;
        }
        Ok(slot)
    }

    /// Replaces `out_pilot` with `in_pilot` on the same channel.
    pub fn swap_pilot(&mut self, out_pilot: &str, in_pilot: &str) -> Result<(), RaceError> {
        self.ensure_editable()?;
        if self.has_pilot(in_pilot) {
            return Err(RaceError::DuplicatePilot(in_pilot.to_string()));
        }
        let slot = self
            .pilot_channels
            .iter_mut()
            .find(|pc| pc.pilot_id == out_pilot)
            .ok_or_else(|| RaceError::PilotNotInRace(out_pilot.to_string()))?;
        slot.pilot_id = in_pilot.to_string();
        Ok(())
    }

    /// Moves a pilot already in the race onto another channel.
    pub fn set_channel(
        &mut self,
        pilot_id: &str,
        channel_id: &str,
        model: &ChannelModel,
    ) -> Result<(), RaceError> {
        self.ensure_editable()?;
        if !model.contains(channel_id) {
            return Err(RaceError::UnknownChannel(channel_id.to_string()));
        }
        if let Some(occupied) = self.conflicting_channel(channel_id, model, Some(pilot_id)) {
            return Err(RaceError::ChannelConflict {
                channel: channel_id.to_string(),
                occupied: occupied.to_string(),
            });
        }
        let slot = self
            .pilot_channels
            .iter_mut()
            .find(|pc| pc.pilot_id == pilot_id)
            .ok_or_else(|| RaceError::PilotNotInRace(pilot_id.to_string()))?;
        slot.channel_id = channel_id.to_string();
        Ok(())
    }

    /// `Populated → Started`.
    pub fn start(&mut self) -> Result<(), RaceError> {
        if self.state != RaceState::Populated {
            return Err(RaceError::InvalidTransition {
                from: self.state,
                to: RaceState::Started,
            });
        }
        self.state = RaceState::Started;
        Ok(())
    }

    /// `Started → Ended`, recording results.
    pub fn finish(&mut self, results: Vec<RaceResult>) -> Result<(), RaceError> {
        if self.state != RaceState::Started {
            return Err(RaceError::InvalidTransition {
                from: self.state,
                to: RaceState::Ended,
            });
        }
        self.results = results;
        self.state = RaceState::Ended;
        Ok(())
    }

    /// Recorded finishing position of a pilot.
    pub fn position_of(&self, pilot_id: &str) -> Option<u32> {
        self.results
            .iter()
            .find(|r| r.pilot_id == pilot_id)
            .map(|r| r.position)
    }

    /// Pilot credited with first place.
    pub fn winner(&self) -> Option<&str> {
        self.results
            .iter()
            .find(|r| r.position == 1 && !r.dnf)
            .map(|r| r.pilot_id.as_str())
    }

    /// Pilots by finishing position; DNFs after finishers, pilots without a
    /// result last in slot order.
    pub fn finishing_order(&self) -> Vec<&str> {
        let mut ranked: Vec<&RaceResult> = self
            .results
            .iter()
            .filter(|r| self.has_pilot(&r.pilot_id))
            .collect();
        ranked.sort_by_key(|r| (r.dnf, r.position));

        let mut order: Vec<&str> = ranked.iter().map(|r| r.pilot_id.as_str()).collect();
        for pilot in self.pilot_ids() {
            if !order.contains(&pilot) {
                order.push(pilot);
            }
        }
        order
    }

    /// Copies slots and bracket into a fresh race of another round.
    pub fn clone_for_round(&self, round_id: RoundId, number: u32) -> Race {
        Race {
            round_id,
            number,
            bracket: self.bracket,
            practice: self.practice,
            capacity: self.capacity,
            state: if self.pilot_channels.is_empty() {
                RaceState::Created
            } else {
                RaceState::Populated
            },
            pilot_channels: self.pilot_channels.clone(),
            results: Vec::new(),
        }
    }
}
