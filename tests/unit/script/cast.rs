use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn ranking_is_by_frequency_with_stable_ties() {
    let appearances = ["ann", "bob", "cy", "bob", "dee", "cy", "bob"];
    assert_eq!(rank_participants(&appearances), vec!["bob", "cy", "ann", "dee"]);
}

#[test]
fn leads_go_to_the_two_most_frequent() {
    let mut rng = StdRng::seed_from_u64(7);
    let cast = CastAssignment::assign(&["bob", "cy", "ann"], &mut rng).unwrap();
    assert_eq!(cast.character_for("bob"), Some(Character::Phoenix));
    assert_eq!(cast.character_for("cy"), Some(Character::Edgeworth));

    let ann = cast.character_for("ann").unwrap();
    assert!(SUPPORTING_ROLES.contains(&ann));
    assert_eq!(cast.participant_for(ann), Some("ann"));
    assert_eq!(cast.len(), 3);
}

#[test]
fn every_participant_gets_a_distinct_role() {
    let people: Vec<String> = (0..14).map(|i| format!("p{i}")).collect();
    let mut rng = StdRng::seed_from_u64(1);
    let cast = CastAssignment::assign(&people, &mut rng).unwrap();

    let mut roles: Vec<Character> = cast.iter().map(|(_, c)| c).collect();
    roles.sort();
    roles.dedup();
    assert_eq!(roles.len(), 14);
}

#[test]
fn assignment_is_reproducible_for_a_seed() {
    let people = ["a", "b", "c", "d", "e"];
    let one = CastAssignment::assign(&people, &mut StdRng::seed_from_u64(99)).unwrap();
    let two = CastAssignment::assign(&people, &mut StdRng::seed_from_u64(99)).unwrap();
    assert_eq!(one, two);
}

#[test]
fn full_cast_is_an_error() {
    let people: Vec<String> = (0..15).map(|i| format!("p{i}")).collect();
    let err = CastAssignment::assign(&people, &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert!(matches!(err, TurnaboutError::Validation(_)));
}

#[test]
fn duplicate_participant_is_an_error() {
    let err = CastAssignment::assign(&["a", "a"], &mut StdRng::seed_from_u64(1)).unwrap_err();
    assert!(matches!(err, TurnaboutError::Validation(_)));
}

#[test]
fn empty_ranking_yields_empty_cast() {
    let none: [&str; 0] = [];
    let cast = CastAssignment::assign(&none, &mut StdRng::seed_from_u64(1)).unwrap();
    assert!(cast.is_empty());
}
