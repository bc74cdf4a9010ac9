//! Property tests for pairing history and heat generation.

use proptest::prelude::*;

use u_heat::config::GeneratorConfig;
use u_heat::formats::{heat_count_from_shared_frequencies, AutoFormat, FormatInput, RoundFormat};
use u_heat::history::PairingHistory;
use u_heat::models::{Channel, ChannelModel, PilotChannel, RoundId, Standings};
use u_heat::plan::{ChannelChange, RoundPlan};
use u_heat::validation::check_races;

const CHANNELS: [&str; 4] = ["R1", "R3", "R6", "R8"];

/// R1/D1 and R3/F1 sit within the separation threshold of each other.
fn crowded4() -> ChannelModel {
    ChannelModel::new(vec![
        Channel::new("R1", "R", 1, 5658),
        Channel::digital("D1", "DJI", 1, 5660),
        Channel::new("R3", "R", 3, 5732),
        Channel::new("F1", "F", 1, 5740),
    ])
}

const CROWDED: [&str; 4] = ["R1", "D1", "R3", "F1"];

fn raceband4() -> ChannelModel {
    ChannelModel::new(vec![
        Channel::new("R1", "R", 1, 5658),
        Channel::new("R3", "R", 3, 5732),
        Channel::new("R6", "R", 6, 5843),
        Channel::new("R8", "R", 8, 5917),
    ])
}

/// Co-races over a small pilot pool, each given as pilot indices.
fn races_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0usize..8, 0..5), 0..10)
}

fn names(race: &[usize]) -> Vec<String> {
    race.iter().map(|i| format!("P{i}")).collect()
}

proptest! {
    #[test]
    fn history_counts_are_symmetric(races in races_strategy()) {
        let mut history = PairingHistory::new();
        for race in &races {
            let ids = names(race);
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            history.add_pilots(&refs);
        }
        for a in 0..8 {
            for b in 0..8 {
                let (a, b) = (format!("P{a}"), format!("P{b}"));
                prop_assert_eq!(history.flown_count(&a, &b), history.flown_count(&b, &a));
            }
            let a = format!("P{a}");
            prop_assert_eq!(history.flown_count(&a, &a), 0);
        }
    }

    #[test]
    fn history_counts_never_decrease(
        races in races_strategy(),
        extra in prop::collection::vec(0usize..8, 0..5),
    ) {
        let mut history = PairingHistory::new();
        for race in &races {
            let ids = names(race);
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            history.add_pilots(&refs);
        }
        let before = history.clone();

        let ids = names(&extra);
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        history.add_pilots(&refs);

        for a in 0..8 {
            for b in 0..8 {
                let (a, b) = (format!("P{a}"), format!("P{b}"));
                prop_assert!(history.flown_count(&a, &b) >= before.flown_count(&a, &b));
            }
        }
    }

    #[test]
    fn auto_format_places_everyone_legally(
        channels in prop::collection::vec(0usize..4, 0..20),
        change in any::<bool>(),
        prior in races_strategy(),
    ) {
        let model = raceband4();
        let pilots: Vec<PilotChannel> = channels
            .iter()
            .enumerate()
            .map(|(i, &c)| PilotChannel::new(format!("P{i}"), CHANNELS[c]))
            .collect();
        let policy = if change {
            ChannelChange::Change
        } else {
            ChannelChange::KeepFromPreviousRound
        };
        let plan = RoundPlan::new(pilots.clone(), model.clone()).with_channel_change(policy);

        let mut history = PairingHistory::new();
        for race in &prior {
            let ids = names(race);
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            history.add_pilots(&refs);
        }
        let standings = Standings::new();
        let config = GeneratorConfig::default();
        let input = FormatInput::new(RoundId(1), &plan, &history, &standings, &config);

        let generation = AutoFormat.generate_round(&input);

        prop_assert!(check_races(&generation.races, &model).is_empty());
        prop_assert_eq!(generation.pilots_placed(), pilots.len());
        prop_assert!(generation.unplaced_pilots().is_empty());

        let sizes: Vec<usize> = generation.races.iter().map(|r| r.pilot_count()).collect();
        if let (Some(max), Some(min)) = (sizes.iter().max(), sizes.iter().min()) {
            prop_assert!(max - min <= 1, "sizes {:?}", sizes);
        }
        if !change {
            let bound = heat_count_from_shared_frequencies(&pilots, &model);
            prop_assert!(generation.race_count() >= bound);
        }
    }

    #[test]
    fn auto_format_never_seats_interfering_channels(
        channels in prop::collection::vec(0usize..4, 0..16),
        change in any::<bool>(),
        prior in races_strategy(),
    ) {
        let model = crowded4();
        let pilots: Vec<PilotChannel> = channels
            .iter()
            .enumerate()
            .map(|(i, &c)| PilotChannel::new(format!("P{i}"), CROWDED[c]))
            .collect();
        let policy = if change {
            ChannelChange::Change
        } else {
            ChannelChange::KeepFromPreviousRound
        };
        let plan = RoundPlan::new(pilots.clone(), model.clone()).with_channel_change(policy);

        let mut history = PairingHistory::new();
        for race in &prior {
            let ids = names(race);
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            history.add_pilots(&refs);
        }
        let standings = Standings::new();
        let config = GeneratorConfig::default();
        let input = FormatInput::new(RoundId(1), &plan, &history, &standings, &config);

        let generation = AutoFormat.generate_round(&input);

        prop_assert!(check_races(&generation.races, &model).is_empty());
        prop_assert_eq!(generation.pilots_placed(), pilots.len());
        for race in &generation.races {
            prop_assert!(race.pilot_count() <= model.group_count());
            let slots = race.pilot_channels();
            for (i, a) in slots.iter().enumerate() {
                for b in &slots[i + 1..] {
                    prop_assert!(!model.shares_frequency(&a.channel_id, &b.channel_id));
                }
            }
        }
    }
}
