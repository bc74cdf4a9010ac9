//! Validation of event inputs and generated races.
//!
//! [`validate_event`] checks the structural integrity of an event before
//! a round is generated. Detects:
//! - Duplicate pilot and channel IDs
//! - Default channels or race slots naming unknown channels
//! - Race slots naming unknown pilots
//! - An empty channel model
//!
//! [`check_races`] re-checks generated races against the race invariants
//! and reports anything broken as [`Violation`]s.

use crate::models::{ChannelModel, Event, Race, Violation, ViolationType};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A reference to a channel that doesn't exist.
    UnknownChannelReference,
    /// A race references a pilot that doesn't exist.
    UnknownPilotReference,
    /// The event has no channels.
    EmptyChannels,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates an event.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_event(event: &Event) -> ValidationResult {
    let mut errors = Vec::new();
    let model = event.channels();

    if model.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyChannels,
            "Event has no channels",
        ));
    }

    let mut channel_ids = HashSet::new();
    for channel in model.channels() {
        if !channel_ids.insert(channel.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate channel ID: {}", channel.id),
            ));
        }
    }

    let mut pilot_ids = HashSet::new();
    for pilot in event.pilots() {
        if !pilot_ids.insert(pilot.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate pilot ID: {}", pilot.id),
            ));
        }
    }

    let mut defaults: Vec<(&String, &String)> = event.default_channels().iter().collect();
    defaults.sort();
    for (pilot, channel) in defaults {
        if !channel_ids.contains(channel.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownChannelReference,
                format!("Pilot '{pilot}' defaults to unknown channel '{channel}'"),
            ));
        }
    }

    for race in event.races_chronological() {
        for slot in race.pilot_channels() {
            if !pilot_ids.contains(slot.pilot_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownPilotReference,
                    format!(
                        "Race {}/{} references unknown pilot '{}'",
                        race.round_id, race.number, slot.pilot_id
                    ),
                ));
            }
            if !channel_ids.contains(slot.channel_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownChannelReference,
                    format!(
                        "Race {}/{} references unknown channel '{}'",
                        race.round_id, race.number, slot.channel_id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks races against the race invariants.
///
/// A pilot appears at most once per race, a race never holds more pilots
/// than its capacity, and no two slots share or interfere on a channel.
pub fn check_races(races: &[Race], model: &ChannelModel) -> Vec<Violation> {
    let mut violations = Vec::new();

    for race in races {
        let entity = format!("race {}", race.number);
        let slots = race.pilot_channels();

        let mut seen = HashSet::new();
        for slot in slots {
            if !seen.insert(slot.pilot_id.as_str()) {
                violations.push(Violation::new(
                    ViolationType::DuplicatePilot,
                    &entity,
                    format!("pilot '{}' holds two slots", slot.pilot_id),
                    100,
                ));
            }
            if !model.contains(&slot.channel_id) {
                violations.push(Violation::new(
                    ViolationType::Custom("UNKNOWN_CHANNEL".into()),
                    &entity,
                    format!("channel '{}' is not in the channel model", slot.channel_id),
                    100,
                ));
            }
        }

        if slots.len() > race.capacity {
            violations.push(Violation::new(
                ViolationType::CapacityExceeded,
                &entity,
                format!("{} pilots for {} slots", slots.len(), race.capacity),
                100,
            ));
        }

        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                if model.shares_frequency(&a.channel_id, &b.channel_id) {
                    violations.push(Violation::new(
                        ViolationType::ChannelConflict,
                        &entity,
                        format!(
                            "'{}' on {} conflicts with '{}' on {}",
                            a.pilot_id, a.channel_id, b.pilot_id, b.channel_id
                        ),
                        100,
                    ));
                }
            }
        }
    }

    violations
}
