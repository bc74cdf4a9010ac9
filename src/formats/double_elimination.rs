//! Double elimination.
//!
//! Two pilot pools survive from round to round. In a winners-bracket race
//! (or an unbracketed race) the top half of the field, `ceil(n / 2)`, stays
//! in winners and the rest drop to losers. In a losers-bracket race the top
//! half survives in losers and the rest are eliminated.
//!
//! Each pool gets `ceil(pool / channel groups)` heats of its own bracket.
//! When both pools together are smaller than the channel count they are
//! merged into a single unbracketed heat. Pilots are dealt round-robin in
//! the order of the race they last flew.

use std::collections::HashSet;

use tracing::debug;

use super::{default_output_pilots, open_pool, FormatInput, RoundDraft, RoundFormat};
use crate::models::{Bracket, Generation, Race};
use crate::seeding::{SeedingContext, SeedingEngine};

/// Surviving pools after a round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketSplit {
    /// Pilots still in the winners bracket.
    pub winners: Vec<String>,
    /// Pilots in the losers bracket.
    pub losers: Vec<String>,
    /// Pilots knocked out this round.
    pub eliminated: Vec<String>,
}

impl BracketSplit {
    /// Whether no ended race contributed to the split.
    pub fn is_empty(&self) -> bool {
        self.winners.is_empty() && self.losers.is_empty() && self.eliminated.is_empty()
    }

    fn contains(&self, pilot_id: &str) -> bool {
        [&self.winners, &self.losers, &self.eliminated]
            .iter()
            .any(|pool| pool.iter().any(|p| p == pilot_id))
    }
}

/// Splits the pilots of ended races into winners, losers and eliminated.
///
/// Practice races and races that have not ended are ignored. Races are
/// read in number order; a pilot is classified by the first race it
/// appears in, so no pilot lands in two pools.
pub fn make_winners_losers(races: &[&Race]) -> BracketSplit {
    let mut ended: Vec<&Race> = races
        .iter()
        .copied()
        .filter(|r| r.is_ended() && !r.practice)
        .collect();
    ended.sort_by_key(|r| r.number);

    let mut split = BracketSplit::default();
    for race in ended {
        let order = race.finishing_order();
        let top = order.len().div_ceil(2);
        for (i, pilot) in order.into_iter().enumerate() {
            if split.contains(pilot) {
                continue;
            }
            let pool = match (race.bracket, i < top) {
                (Bracket::Losers, true) => &mut split.losers,
                (Bracket::Losers, false) => &mut split.eliminated,
                (_, true) => &mut split.winners,
                (_, false) => &mut split.losers,
            };
            pool.push(pilot.to_string());
        }
    }
    split
}

/// Winners/losers bracket rounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleElimination;

impl DoubleElimination {
    fn pools(input: &FormatInput<'_>, open: &[String]) -> (Vec<String>, Vec<String>) {
        let split = make_winners_losers(input.prior_races);
        if split.is_empty() {
            return (open.to_vec(), Vec::new());
        }
        let open: HashSet<&str> = open.iter().map(String::as_str).collect();
        let keep = |pool: Vec<String>| -> Vec<String> {
            pool.into_iter()
                .filter(|p| open.contains(p.as_str()))
                .collect()
        };
        (keep(split.winners), keep(split.losers))
    }

    fn rotation(input: &FormatInput<'_>, pool: &[String]) -> Vec<String> {
        let mut context = SeedingContext::new(pool);
        for race in input.prior_races {
            for pilot in race.pilot_ids() {
                context = context.with_last_race_number(pilot, race.number);
            }
        }
        SeedingEngine::for_rotation().order(pool, &context)
    }

    fn fill_bracket(
        input: &FormatInput<'_>,
        draft: &mut RoundDraft,
        bracket: Bracket,
        pool: &[String],
    ) {
        if pool.is_empty() {
            return;
        }
        let plan = input.plan;
        let model = input.channels();
        let count = plan.races_needed(pool.len()).max(1);

        let mut races = draft.editable(bracket);
        while races.len() < count {
            races.push(draft.add_race(bracket));
        }
        if plan.casual_practice {
            return;
        }

        let order = Self::rotation(input, pool);
        for (i, pilot) in order.iter().enumerate() {
            draft.seat_cycling(
                &mut races,
                i % count,
                pilot,
                plan.channel_of(pilot),
                bracket,
                model,
            );
        }
    }
}

impl RoundFormat for DoubleElimination {
    fn name(&self) -> &'static str {
        "double-elimination"
    }

    fn generate_round(&self, input: &FormatInput<'_>) -> Generation {
        let model = input.channels();
        let mut draft = RoundDraft::new(input);
        let open = open_pool(input.plan, &draft);
        if model.group_count() == 0 {
            return draft.into_generation();
        }

        let (winners, losers) = Self::pools(input, &open);
        let total = winners.len() + losers.len();
        if total < 2 {
            debug!(total, "bracket decided, no further heats");
            return draft.into_generation();
        }

        if total < model.len() {
            debug!(winners = winners.len(), losers = losers.len(), "merging brackets");
            let merged: Vec<String> = winners.into_iter().chain(losers).collect();
            Self::fill_bracket(input, &mut draft, Bracket::None, &merged);
        } else {
            Self::fill_bracket(input, &mut draft, Bracket::Winners, &winners);
            Self::fill_bracket(input, &mut draft, Bracket::Losers, &losers);
        }

        draft.into_generation()
    }

    fn output_pilots(&self, round_races: &[&Race]) -> Vec<String> {
        let split = make_winners_losers(round_races);
        if split.winners.is_empty() && split.losers.is_empty() {
            return default_output_pilots(round_races);
        }
        split.winners.into_iter().chain(split.losers).collect()
    }
}
