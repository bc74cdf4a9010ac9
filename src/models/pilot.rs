//! Pilot model.
//!
//! A pilot is the unit being scheduled. Identity is stable for the whole
//! event; the only scheduling-relevant flag is whether the pilot is a
//! practice pilot (flies, but never counts towards pools or scoring).

use serde::{Deserialize, Serialize};

/// A pilot registered for the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pilot {
    /// Unique pilot identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Excluded from competitive pools and pairing scores.
    pub practice_pilot: bool,
}

impl Pilot {
    /// Creates a competitive pilot.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            practice_pilot: false,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks the pilot as a practice pilot.
    pub fn practice(mut self) -> Self {
        self.practice_pilot = true;
        self
    }
}
