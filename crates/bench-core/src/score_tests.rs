use super::*;
use proptest::prelude::*;

#[test]
fn test_win_speed_bonus() {
    assert_eq!(game_score(Outcome::Win, 400, 1500), 1.2);
    assert_eq!(game_score(Outcome::Win, 749, 1500), 1.2);
    assert_eq!(game_score(Outcome::Win, 750, 1500), 1.1);
    assert_eq!(game_score(Outcome::Win, 1124, 1500), 1.1);
    assert_eq!(game_score(Outcome::Win, 1125, 1500), 1.0);
    assert_eq!(game_score(Outcome::Win, 1500, 1500), 1.0);
}

#[test]
fn test_non_wins() {
    assert_eq!(game_score(Outcome::Draw, 1500, 1500), 0.5);
    assert_eq!(game_score(Outcome::Loss, 10, 1500), 0.0);
    assert_eq!(game_score(Outcome::Timeout, 1500, 1500), 0.0);
    assert_eq!(game_score(Outcome::Error, 0, 1500), 0.0);
}

#[test]
fn test_timeout_result_charges_ceiling() {
    let result = MatchResult::timeout(3000);
    assert_eq!(result.ticks, 3000);
    assert_eq!(result_score(&result, 3000), 0.0);
}

#[test]
fn test_round_to() {
    assert_eq!(round_to(12.04, 1), 12.0);
    assert_eq!(round_to(12.06, 1), 12.1);
    assert_eq!(round_to(0.33333, 3), 0.333);
}

#[test]
fn test_grades() {
    assert_eq!(Grade::from_score(100.0), Grade::APlus);
    assert_eq!(Grade::from_score(90.0), Grade::APlus);
    assert_eq!(Grade::from_score(89.9), Grade::A);
    assert_eq!(Grade::from_score(70.0), Grade::B);
    assert_eq!(Grade::from_score(60.0), Grade::C);
    assert_eq!(Grade::from_score(40.0), Grade::D);
    assert_eq!(Grade::from_score(39.9), Grade::F);
    assert_eq!(Grade::APlus.to_string(), "A+");
}

fn any_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Win),
        Just(Outcome::Loss),
        Just(Outcome::Draw),
        Just(Outcome::Timeout),
        Just(Outcome::Error),
    ]
}

proptest! {
    #[test]
    fn prop_score_in_allowed_set(outcome in any_outcome(), ticks in 0u32..10_000, ceiling in 1u32..10_000) {
        let s = game_score(outcome, ticks, ceiling);
        prop_assert!(s == 0.0 || s == 0.5 || (1.0..=1.2).contains(&s));
    }

    #[test]
    fn prop_win_score_non_increasing_in_ticks(a in 0u32..10_000, b in 0u32..10_000, ceiling in 1u32..10_000) {
        let (fast, slow) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(game_score(Outcome::Win, fast, ceiling) >= game_score(Outcome::Win, slow, ceiling));
    }
}
