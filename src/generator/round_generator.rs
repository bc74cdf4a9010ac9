//! End-to-end round generation.
//!
//! # Algorithm
//!
//! 1. Look up the round and pick the format for its round type.
//! 2. Rebuild the pairing history from every other round and the
//!    standings from the whole event.
//! 3. Collect the calling round's races, the races already in the round
//!    and the earlier races of the stage.
//! 4. Ask the format whether it can run, then generate.
//! 5. Re-check the produced races and log the round's KPIs.
//!
//! # Complexity
//! Dominated by the format; AutoFormat is O(b · p² · r) where b is the
//! retry factor, p the pilots and r the races.

use tracing::{info, warn};

use super::RoundKpi;
use crate::config::GeneratorConfig;
use crate::error::ScheduleError;
use crate::formats::{format_for, FormatInput};
use crate::models::{Event, Generation, RoundId};
use crate::plan::{PilotOrdering, RoundPlan};
use crate::validation::check_races;

/// Generates rounds of an event.
///
/// # Example
///
/// ```
/// use u_heat::generator::RoundGenerator;
/// use u_heat::models::{Channel, ChannelModel, Event, Pilot, RoundType};
/// use u_heat::plan::PilotOrdering;
///
/// let mut event = Event::new(ChannelModel::new(vec![
///     Channel::new("R1", "R", 1, 5658),
///     Channel::new("R8", "R", 8, 5917),
/// ]));
/// for (pilot, channel) in [("A", "R1"), ("B", "R8"), ("C", "R1")] {
///     event.add_pilot_on(Pilot::new(pilot), channel);
/// }
/// let round = event.add_round(1, RoundType::Round, None);
///
/// let generator = RoundGenerator::new();
/// let generation = generator
///     .generate_and_apply(&mut event, round, PilotOrdering::default())
///     .unwrap();
/// assert_eq!(generation.race_count(), 2);
/// assert_eq!(event.races_in_round(round).len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoundGenerator {
    config: GeneratorConfig,
}

impl RoundGenerator {
    /// Creates a generator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the generator settings.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Generator settings.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Resolves the plan for a round from event state.
    pub fn plan(
        &self,
        event: &Event,
        round_id: RoundId,
        ordering: PilotOrdering,
    ) -> Result<RoundPlan, ScheduleError> {
        RoundPlan::from_event(event, round_id, ordering, &self.config)
    }

    /// Generates the races of a round without touching the event.
    pub fn generate(
        &self,
        event: &Event,
        round_id: RoundId,
        plan: &RoundPlan,
    ) -> Result<Generation, ScheduleError> {
        let round = event
            .round(round_id)
            .ok_or(ScheduleError::UnknownRound(round_id))?;
        let format = format_for(round.round_type, plan.pilot_ordering, &self.config);

        let history = event.pairing_history(Some(round_id));
        let standings = event.standings(&self.config.points);
        let prior = plan
            .calling_round
            .map(|id| event.races_in_round(id))
            .unwrap_or_default();
        let existing = event.races_in_round(round_id);
        let stage = event.sibling_races(round_id);

        let input = FormatInput::new(round_id, plan, &history, &standings, &self.config)
            .with_prior_races(&prior)
            .with_existing_races(&existing)
            .with_stage_races(&stage);

        format.can_generate(&input)?;
        let mut generation = format.generate_round(&input);
        generation
            .violations
            .extend(check_races(&generation.races, input.channels()));

        for violation in &generation.violations {
            warn!(
                round = %round_id,
                kind = ?violation.violation_type,
                entity = violation.entity_id.as_str(),
                "{}",
                violation.message
            );
        }

        let kpi = RoundKpi::calculate(&generation, &history);
        info!(
            round = %round_id,
            format = format.name(),
            races = kpi.race_count,
            pilots = kpi.pilots_placed,
            repeat_pairings = kpi.repeat_pairings,
            fresh_pairings = kpi.fresh_pairings,
            unplaced = kpi.unplaced,
            balanced = kpi.is_balanced(),
            "round generated"
        );

        Ok(generation)
    }

    /// Resolves the plan, generates, and swaps the round's races in.
    ///
    /// The event is only touched once generation has succeeded.
    pub fn generate_and_apply(
        &self,
        event: &mut Event,
        round_id: RoundId,
        ordering: PilotOrdering,
    ) -> Result<Generation, ScheduleError> {
        let plan = self.plan(event, round_id, ordering)?;
        let generation = self.generate(event, round_id, &plan)?;
        event.replace_round_races(round_id, generation.races.clone())?;
        Ok(generation)
    }
}
