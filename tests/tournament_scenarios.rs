//! End-to-end tournament scenarios driven through `RoundGenerator`.

use u_heat::config::GeneratorConfig;
use u_heat::formats::StreetLeague;
use u_heat::generator::{RoundGenerator, RoundKpi};
use u_heat::models::{
    Bracket, Channel, ChannelModel, Event, Pilot, Race, RaceResult, RoundId, RoundType, StageId,
};
use u_heat::plan::PilotOrdering;
use u_heat::validation::validate_event;

fn raceband4() -> ChannelModel {
    ChannelModel::new(vec![
        Channel::new("R1", "R", 1, 5658),
        Channel::new("R3", "R", 3, 5732),
        Channel::new("R6", "R", 6, 5843),
        Channel::new("R8", "R", 8, 5917),
    ])
}

fn event_with_pilots(n: usize) -> Event {
    let mut event = Event::new(raceband4());
    let channels = ["R1", "R3", "R6", "R8"];
    for i in 0..n {
        event.add_pilot_on(Pilot::new(format!("P{i}")), channels[i % channels.len()]);
    }
    event
}

/// Ends every race of the round; pilots finish in `order` when given,
/// otherwise in slot order.
fn finish_round(event: &mut Event, round: RoundId, order: Option<&[&str]>) {
    for key in event.race_keys_in_round(round) {
        let Some(race) = event.race_mut(key) else {
            continue;
        };
        let mut pilots: Vec<String> = race.pilot_ids().map(str::to_string).collect();
        if let Some(order) = order {
            pilots.sort_by_key(|p| {
                order
                    .iter()
                    .position(|o| *o == p.as_str())
                    .unwrap_or(usize::MAX)
            });
        }
        let results = pilots
            .iter()
            .enumerate()
            .map(|(i, p)| RaceResult::new(p.as_str(), i as u32 + 1))
            .collect();
        race.start().unwrap();
        race.finish(results).unwrap();
    }
}

fn sizes(races: &[&Race]) -> Vec<usize> {
    races.iter().map(|r| r.pilot_count()).collect()
}

#[test]
fn eight_pilots_on_four_channels_fly_two_full_heats() {
    let mut event = event_with_pilots(8);
    assert!(validate_event(&event).is_ok());
    let round = event.add_round(1, RoundType::Round, None);

    let generation = RoundGenerator::new()
        .generate_and_apply(&mut event, round, PilotOrdering::default())
        .unwrap();

    assert!(generation.is_valid(), "{:?}", generation.violations);
    assert_eq!(sizes(&event.races_in_round(round)), vec![4, 4]);
    for race in event.races_in_round(round) {
        let mut channels: Vec<&str> = race
            .pilot_channels()
            .iter()
            .map(|pc| pc.channel_id.as_str())
            .collect();
        channels.sort();
        assert_eq!(channels, vec!["R1", "R3", "R6", "R8"]);
    }
}

#[test]
fn second_round_mixes_the_field() {
    for seed in [1u64, 7, 42] {
        let mut event = event_with_pilots(8);
        let generator =
            RoundGenerator::new().with_config(GeneratorConfig::default().with_shuffle_seed(seed));

        let r1 = event.add_round(1, RoundType::Round, None);
        generator
            .generate_and_apply(&mut event, r1, PilotOrdering::default())
            .unwrap();
        finish_round(&mut event, r1, None);

        let r2 = event.add_round(2, RoundType::Round, None);
        let generation = generator
            .generate_and_apply(&mut event, r2, PilotOrdering::default())
            .unwrap();

        let kpi = RoundKpi::calculate(&generation, &event.pairing_history(Some(r2)));
        assert_eq!(kpi.pilots_placed, 8);
        assert!(kpi.is_balanced());
        assert!(kpi.repeat_pairings < 12, "seed {seed}: {kpi:?}");
    }
}

#[test]
fn chase_the_ace_stops_at_the_win_limit() {
    let mut event = event_with_pilots(3);
    let generator = RoundGenerator::new();
    let stage = Some(StageId(1));

    let r1 = event.add_round(1, RoundType::Round, None);
    generator
        .generate_and_apply(&mut event, r1, PilotOrdering::default())
        .unwrap();
    finish_round(&mut event, r1, Some(&["P2", "P0", "P1"]));

    // Qualifying wins do not count towards the ace
    let r2 = event.add_round(2, RoundType::ChaseTheAce, stage);
    let g2 = generator
        .generate_and_apply(&mut event, r2, PilotOrdering::default())
        .unwrap();
    assert_eq!(g2.race_count(), 1);
    assert_eq!(
        g2.races[0].pilot_channels(),
        event.races_in_round(r1)[0].pilot_channels()
    );
    finish_round(&mut event, r2, Some(&["P0", "P1", "P2"]));

    // P0 holds one win, below the limit of two
    let r3 = event.add_round(3, RoundType::ChaseTheAce, stage);
    let g3 = generator
        .generate_and_apply(&mut event, r3, PilotOrdering::default())
        .unwrap();
    assert_eq!(g3.race_count(), 1);
    finish_round(&mut event, r3, Some(&["P0", "P2", "P1"]));

    let r4 = event.add_round(4, RoundType::ChaseTheAce, stage);
    let g4 = generator
        .generate_and_apply(&mut event, r4, PilotOrdering::default())
        .unwrap();
    assert_eq!(g4.race_count(), 0);
}

#[test]
fn unstaged_chase_ignores_qualifier_wins() {
    let mut event = event_with_pilots(3);
    let generator = RoundGenerator::new();

    let r1 = event.add_round(1, RoundType::Round, None);
    generator
        .generate_and_apply(&mut event, r1, PilotOrdering::default())
        .unwrap();
    finish_round(&mut event, r1, Some(&["P2", "P0", "P1"]));

    let r2 = event.add_round(2, RoundType::ChaseTheAce, None);
    generator
        .generate_and_apply(&mut event, r2, PilotOrdering::default())
        .unwrap();
    finish_round(&mut event, r2, Some(&["P2", "P0", "P1"]));

    // P2 has won the qualifier and one chase race: one win towards the ace
    let r3 = event.add_round(3, RoundType::ChaseTheAce, None);
    let g3 = generator
        .generate_and_apply(&mut event, r3, PilotOrdering::default())
        .unwrap();
    assert_eq!(g3.race_count(), 1);
}

#[test]
fn double_elimination_pools_follow_results() {
    let mut event = event_with_pilots(12);
    let model = raceband4();
    let r1 = event.add_round(1, RoundType::DoubleElimination, None);

    let heats: [(Bracket, [&str; 4]); 3] = [
        (Bracket::Winners, ["P0", "P1", "P2", "P3"]),
        (Bracket::Winners, ["P4", "P5", "P6", "P7"]),
        (Bracket::Losers, ["P8", "P9", "P10", "P11"]),
    ];
    let channels = ["R1", "R3", "R6", "R8"];
    for (number, (bracket, pilots)) in heats.iter().enumerate() {
        let mut race = Race::new(r1, number as u32 + 1, 4).with_bracket(*bracket);
        for (pilot, channel) in pilots.iter().zip(channels) {
            race.add_pilot(*pilot, channel, &model).unwrap();
        }
        event.push_race(r1, race).unwrap();
    }
    finish_round(&mut event, r1, None);

    let r2 = event.add_round(2, RoundType::DoubleElimination, None);
    let generation = RoundGenerator::new()
        .generate_and_apply(&mut event, r2, PilotOrdering::default())
        .unwrap();
    assert!(generation.is_valid(), "{:?}", generation.violations);

    let by_bracket = generation.races_by_bracket();
    let winners: Vec<&str> = by_bracket[&Bracket::Winners]
        .iter()
        .flat_map(|r| r.pilot_ids())
        .collect();
    let losers: usize = by_bracket[&Bracket::Losers]
        .iter()
        .map(|r| r.pilot_count())
        .sum();
    assert_eq!(by_bracket[&Bracket::Winners].len(), 1);
    assert_eq!(winners.len(), 4);
    for pilot in ["P0", "P1", "P4", "P5"] {
        assert!(winners.contains(&pilot));
    }
    assert_eq!(by_bracket[&Bracket::Losers].len(), 2);
    assert_eq!(losers, 6);
    // Bottom half of the losers heat is out
    assert!(generation.race_of("P10").is_none());
    assert!(generation.race_of("P11").is_none());
}

#[test]
fn street_league_regroups_ten_pilots() {
    let mut event = event_with_pilots(10);
    let r1 = event.add_round(1, RoundType::StreetLeague, None);
    let generation = RoundGenerator::new()
        .generate_and_apply(&mut event, r1, PilotOrdering::default())
        .unwrap();

    assert!(generation.is_valid(), "{:?}", generation.violations);
    assert_eq!(sizes(&event.races_in_round(r1)), vec![4, 3, 3]);

    // Street league scores its own races
    let key = event.race_keys_in_round(r1)[0];
    let race = event.race(key).unwrap();
    let mut results: Vec<RaceResult> = race
        .pilot_ids()
        .enumerate()
        .map(|(i, p)| RaceResult::new(p, 1).with_laps(3 + i as u32))
        .collect();
    StreetLeague::adjust_results(&mut results);
    assert_eq!(results[0].points, Some(4));
    assert_eq!(results[3].points, Some(1));
}

#[test]
fn finals_follow_qualifying_points() {
    let mut event = event_with_pilots(8);
    let generator = RoundGenerator::new();
    let r1 = event.add_round(1, RoundType::Round, None);
    generator
        .generate_and_apply(&mut event, r1, PilotOrdering::default())
        .unwrap();
    finish_round(&mut event, r1, None);

    let r2 = event.add_round(2, RoundType::Final, None);
    let generation = generator
        .generate_and_apply(&mut event, r2, PilotOrdering::default())
        .unwrap();
    assert_eq!(generation.race_count(), 2);
    assert_eq!(generation.races[0].bracket, Bracket::Lettered('A'));
    assert_eq!(generation.races[1].bracket, Bracket::Lettered('B'));

    // Both heat winners make the A final
    let winners: Vec<String> = event
        .races_in_round(r1)
        .iter()
        .filter_map(|r| r.winner().map(str::to_string))
        .collect();
    assert_eq!(winners.len(), 2);
    for winner in &winners {
        assert!(generation.races[0].has_pilot(winner));
    }
}

#[test]
fn regenerating_keeps_started_races() {
    let mut event = event_with_pilots(8);
    let generator = RoundGenerator::new();
    let r1 = event.add_round(1, RoundType::Round, None);
    generator
        .generate_and_apply(&mut event, r1, PilotOrdering::default())
        .unwrap();

    let first = event.race_keys_in_round(r1)[0];
    event.race_mut(first).unwrap().start().unwrap();
    let started: Vec<String> = event
        .race(first)
        .unwrap()
        .pilot_ids()
        .map(str::to_string)
        .collect();

    let generation = generator
        .generate_and_apply(&mut event, r1, PilotOrdering::default())
        .unwrap();
    assert_eq!(generation.race_count(), 2);
    let kept: Vec<&str> = generation.races[0].pilot_ids().collect();
    assert_eq!(kept, started);
    assert_eq!(generation.pilots_placed(), 8);
}
