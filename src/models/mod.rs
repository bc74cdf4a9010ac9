//! Tournament domain models.
//!
//! Provides the data types the engine reads (pilots, channels, rounds,
//! results) and the ones it produces (races grouped into a generation).
//!
//! # Domain Mappings
//!
//! | u-heat | Scheduling | Radio |
//! |--------|-----------|-------|
//! | Pilot | Task | Transmitter |
//! | Channel | Resource | Frequency slot |
//! | Race | Time slot | Simultaneous transmission window |
//! | Generation | Schedule | Frequency plan |

mod channel;
mod event;
mod generation;
mod pilot;
mod race;
mod results;
mod round;

pub use channel::{BandType, Channel, ChannelModel, DEFAULT_SEPARATION_MHZ};
pub use event::{Event, EventType, RaceKey};
pub use generation::{Generation, Violation, ViolationType};
pub use pilot::Pilot;
pub use race::{Bracket, PilotChannel, Race, RaceResult, RaceState};
pub use results::{PilotStanding, PointsTable, Standings};
pub use round::{Round, RoundId, RoundType, StageId};
