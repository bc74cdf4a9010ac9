//! Placement scoring for AutoFormat.
//!
//! Scores are plain integers computed fresh for every (pilot, race) pair on
//! every pass. Ties are broken explicitly: higher score first, then the
//! pilot earlier in the pool, then the earlier race.

use std::cmp::{Ordering, Reverse};

use crate::config::ScoringWeights;
use crate::history::PairingHistory;

/// Facts about one candidate seat.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Seat<'r> {
    /// Pilots already in the race (the candidate excluded).
    pub others: &'r [&'r str],
    /// This is the only race where the pilot's own channel is still free.
    pub only_free: bool,
    /// The race already holds its fair share of pilots.
    pub at_capacity: bool,
    /// The pilot would have to fly a different channel.
    pub channel_changed: bool,
}

/// Scores seats against the pairing history.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scorer<'a> {
    pub history: &'a PairingHistory,
    pub weights: &'a ScoringWeights,
    pub keep_channels: bool,
    /// Every pilot of the bracket; "opponents still to meet" are counted here.
    pub targets: &'a [String],
}

impl Scorer<'_> {
    pub(crate) fn points_for_race(&self, pilot: &str, seat: &Seat<'_>) -> i64 {
        let w = self.weights;
        let mut score = 0i64;

        if seat.only_free {
            score += w.only_free_race;
        }
        if seat.at_capacity {
            score -= w.full_race;
        }
        if seat.channel_changed && self.keep_channels {
            score -= w.channel_change;
        }

        let fresh = seat
            .others
            .iter()
            .filter(|other| self.history.flown_count(pilot, other) == 0)
            .count() as i64;
        score += w.unflown_affinity * fresh * fresh;

        let repeats = self.history.flown_pilots_sum_sqr(pilot, seat.others);
        score -= w.repeat_penalty * i64::from(repeats);

        let remaining = self.history.unflown_pilots(pilot, self.targets).len() as i64;
        score += w.remaining_opponents * remaining;

        score
    }
}

/// A scored (pilot, race) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PilotPoints {
    pub score: i64,
    /// Index into the unplaced list.
    pub pilot: usize,
    /// Index into the bracket's race list.
    pub race: usize,
}

impl PilotPoints {
    fn key(&self) -> (i64, Reverse<usize>, Reverse<usize>) {
        (self.score, Reverse(self.pilot), Reverse(self.race))
    }
}

impl Ord for PilotPoints {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for PilotPoints {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Vec<String> {
        ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect()
    }

    fn seat<'r>(others: &'r [&'r str]) -> Seat<'r> {
        Seat {
            others,
            only_free: false,
            at_capacity: false,
            channel_changed: false,
        }
    }

    #[test]
    fn test_fresh_opponents_attract() {
        let mut history = PairingHistory::new();
        history.add_pilots(&["A", "B"]);
        let weights = ScoringWeights::default();
        let t = targets();
        let scorer = Scorer {
            history: &history,
            weights: &weights,
            keep_channels: true,
            targets: &t,
        };

        // A has met B once; C and D are fresh.
        let with_b = scorer.points_for_race("A", &seat(&["B"]));
        let with_c = scorer.points_for_race("A", &seat(&["C"]));
        let with_cd = scorer.points_for_race("A", &seat(&["C", "D"]));
        assert_eq!(with_b, -2 + 2);
        assert_eq!(with_c, 5 + 2);
        assert_eq!(with_cd, 20 + 2);
    }

    #[test]
    fn test_flags() {
        let history = PairingHistory::new();
        let weights = ScoringWeights::default();
        let t = targets();
        let keep = Scorer {
            history: &history,
            weights: &weights,
            keep_channels: true,
            targets: &t,
        };
        let change = Scorer {
            keep_channels: false,
            ..keep
        };
        let s = Seat {
            only_free: true,
            at_capacity: true,
            channel_changed: true,
            ..seat(&[])
        };
        assert_eq!(keep.points_for_race("A", &s), 1000 - 10_000 - 1000 + 3);
        assert_eq!(change.points_for_race("A", &s), 1000 - 10_000 + 3);
    }

    #[test]
    fn test_tie_break_order() {
        let a = PilotPoints { score: 5, pilot: 0, race: 1 };
        let b = PilotPoints { score: 5, pilot: 0, race: 0 };
        let c = PilotPoints { score: 5, pilot: 1, race: 0 };
        let d = PilotPoints { score: 6, pilot: 3, race: 3 };
        assert!(b > a);
        assert!(a > c);
        assert!(d > b);
    }
}
