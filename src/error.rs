//! Error types.
//!
//! Only hard refusals are errors. Best-effort outcomes of a generation
//! (unplaced pilots, exhausted retry budgets) are reported as
//! [`Violation`](crate::models::Violation)s on the returned generation.

use thiserror::Error;

use crate::models::{RaceState, RoundId};

/// A rejected race mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RaceError {
    /// The race has started or ended.
    #[error("race is {0:?} and can no longer be edited")]
    Locked(RaceState),

    /// The pilot already holds a slot in this race.
    #[error("pilot '{0}' is already in the race")]
    DuplicatePilot(String),

    /// The pilot holds no slot in this race.
    #[error("pilot '{0}' is not in the race")]
    PilotNotInRace(String),

    /// Every slot is taken.
    #[error("race is full ({0} slots)")]
    Full(usize),

    /// The channel is not part of the channel model.
    #[error("unknown channel '{0}'")]
    UnknownChannel(String),

    /// The channel is taken by, or interferes with, an occupied channel.
    #[error("channel '{channel}' conflicts with occupied channel '{occupied}'")]
    ChannelConflict { channel: String, occupied: String },

    /// Illegal lifecycle transition.
    #[error("cannot move race from {from:?} to {to:?}")]
    InvalidTransition { from: RaceState, to: RaceState },
}

/// A refused generation request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The round does not exist in the event.
    #[error("unknown round {0}")]
    UnknownRound(RoundId),

    /// The calling round still has a race that has not ended.
    #[error("round {round} has unfinished race {race}")]
    UnfinishedRace { round: RoundId, race: u32 },

    /// The calling round spans more than one bracket.
    #[error("round {0} has races in more than one bracket")]
    MultipleBrackets(RoundId),

    /// A race mutation was rejected.
    #[error(transparent)]
    Race(#[from] RaceError),
}
