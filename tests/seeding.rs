//! Integration tests for seeding round 1.

use bracket_web::{
    is_seedable, seed, seed_with_rng, BracketError, MatchStatus, Participant, ParticipantId,
    TournamentUpdate,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

fn participants(n: usize) -> Vec<Participant> {
    (0..n).map(|i| Participant::new(format!("P{i}"))).collect()
}

#[test]
fn seeding_pairs_every_participant_once() {
    let tournament_id = Uuid::new_v4();
    for n in [2, 4, 8, 16, 32, 64] {
        let entrants = participants(n);
        let seeded = seed(tournament_id, &entrants).unwrap();

        assert_eq!(seeded.matches.len(), n / 2);
        assert_eq!(seeded.tournament_update, TournamentUpdate::BracketGenerated);

        let numbers: Vec<u32> = seeded.matches.iter().map(|m| m.match_number).collect();
        let expected: Vec<u32> = (1..=(n / 2) as u32).collect();
        assert_eq!(numbers, expected);

        let mut seen = HashSet::new();
        for m in &seeded.matches {
            assert_eq!(m.round, 1);
            assert_eq!(m.tournament_id, tournament_id);
            assert_eq!(m.status, MatchStatus::Pending);
            assert_eq!(m.winner_id, None);
            let player2 = m.player2_id.expect("round 1 has no empty slots");
            assert!(m.player2_name.is_some());
            assert!(seen.insert(m.player1_id));
            assert!(seen.insert(player2));
        }
        let all: HashSet<ParticipantId> = entrants.iter().map(|p| p.id).collect();
        assert_eq!(seen, all);
    }
}

#[test]
fn seeding_rejects_counts_that_are_not_powers_of_two() {
    for n in [0, 1, 3, 5, 6, 7, 9, 12, 100] {
        assert!(!is_seedable(n));
        assert_eq!(
            seed(Uuid::new_v4(), &participants(n)).unwrap_err(),
            BracketError::InvalidParticipantCount { count: n }
        );
    }
}

#[test]
fn three_participants_report_their_count() {
    let err = seed(Uuid::new_v4(), &participants(3)).unwrap_err();
    assert_eq!(err, BracketError::InvalidParticipantCount { count: 3 });
    assert!(err.to_string().contains('3'));
}

#[test]
fn names_travel_with_ids() {
    let entrants = participants(8);
    let names: HashMap<ParticipantId, &str> = entrants
        .iter()
        .map(|p| (p.id, p.display_name.as_str()))
        .collect();
    let seeded = seed(Uuid::new_v4(), &entrants).unwrap();
    for m in &seeded.matches {
        assert_eq!(names[&m.player1_id], m.player1_name);
        assert_eq!(Some(names[&m.player2_id.unwrap()]), m.player2_name.as_deref());
    }
}

#[test]
fn same_rng_seed_gives_same_pairing() {
    let tournament_id = Uuid::new_v4();
    let entrants = participants(16);
    let pairs = |rng_seed: u64| -> Vec<(ParticipantId, Option<ParticipantId>)> {
        let mut rng = StdRng::seed_from_u64(rng_seed);
        seed_with_rng(tournament_id, &entrants, &mut rng)
            .unwrap()
            .matches
            .iter()
            .map(|m| (m.player1_id, m.player2_id))
            .collect()
    };
    assert_eq!(pairs(42), pairs(42));
}

#[test]
fn every_opponent_is_roughly_equally_likely() {
    let tournament_id = Uuid::new_v4();
    let entrants = participants(4);
    let first = entrants[0].id;
    let mut rng = StdRng::seed_from_u64(7);
    let mut opponents: HashMap<ParticipantId, u32> = HashMap::new();
    let draws = 6000;

    for _ in 0..draws {
        let seeded = seed_with_rng(tournament_id, &entrants, &mut rng).unwrap();
        let m = seeded
            .matches
            .iter()
            .find(|m| m.has_player(first))
            .unwrap();
        let opponent = if m.player1_id == first {
            m.player2_id.unwrap()
        } else {
            m.player1_id
        };
        *opponents.entry(opponent).or_default() += 1;
    }

    assert_eq!(opponents.len(), 3);
    for count in opponents.values() {
        assert!((1700..=2300).contains(count), "skewed pairing: {:?}", opponents);
    }
}
