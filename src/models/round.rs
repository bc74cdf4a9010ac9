//! Round and stage topology.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::RaceKey;

/// Identifier of a round within an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoundId(pub u32);

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a stage (a run of rounds sharing a format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageId(pub u32);

/// Tournament format of a round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundType {
    /// General heat round (auto-balanced or seeded).
    #[default]
    Round,
    /// Parallel finals, one per bracket letter.
    Final,
    /// Winners/losers bracket maintenance.
    DoubleElimination,
    /// Repeat the last race until someone reaches the win limit.
    ChaseTheAce,
    /// Points-based regrouping every round.
    StreetLeague,
    /// Standings-ordered consecutive heats.
    Ladder,
}

/// An ordered container of races sharing a round number.
///
/// The round only holds keys into the event's race table; see
/// [`Event::replace_round_races`](super::Event::replace_round_races).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// Round identifier.
    pub id: RoundId,
    /// Display/ordering number.
    pub number: u32,
    /// Format of this round.
    pub round_type: RoundType,
    /// Owning stage, if any.
    pub stage: Option<StageId>,
    pub(crate) race_keys: Vec<RaceKey>,
}

impl Round {
    /// Creates an empty round.
    pub fn new(id: RoundId, number: u32, round_type: RoundType) -> Self {
        Self {
            id,
            number,
            round_type,
            stage: None,
            race_keys: Vec::new(),
        }
    }

    /// Assigns the round to a stage.
    pub fn with_stage(mut self, stage: StageId) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Keys of this round's races.
    pub fn race_keys(&self) -> &[RaceKey] {
        &self.race_keys
    }
}
