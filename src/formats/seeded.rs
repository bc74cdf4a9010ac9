//! Round-robin distribution in plan order.
//!
//! Pilot `i` of the plan goes to race `i mod races`. If that race has no
//! free channel for the pilot the next races are tried in turn; if none
//! fits a race is added. No scoring, no backtracking.

use super::{open_pool, FormatInput, RoundDraft, RoundFormat};
use crate::models::{Bracket, Generation};

/// Seeded round-robin heats.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededFormat;

impl RoundFormat for SeededFormat {
    fn name(&self) -> &'static str {
        "seeded"
    }

    fn generate_round(&self, input: &FormatInput<'_>) -> Generation {
        let plan = input.plan;
        let model = input.channels();
        let mut draft = RoundDraft::new(input);
        let pool = open_pool(plan, &draft);
        if pool.is_empty() || model.group_count() == 0 {
            return draft.into_generation();
        }

        let mut races = draft.editable(Bracket::None);
        let count = plan
            .number_of_races
            .unwrap_or_else(|| plan.races_needed(pool.len()))
            .max(1);
        while races.len() < count {
            races.push(draft.add_race(Bracket::None));
        }
        if plan.casual_practice {
            return draft.into_generation();
        }

        for (i, pilot) in pool.iter().enumerate() {
            let start = i % count;
            draft.seat_cycling(
                &mut races,
                start,
                pilot,
                plan.channel_of(pilot),
                Bracket::None,
                model,
            );
        }

        draft.into_generation()
    }
}
