//! Tests for typestate round architecture.

use number_master::{
    Guess, GuessError, GuessHistory, GuessResult, InvariantSet, RoundInProgress, RoundInvariants,
    RoundResult, RoundSetup, Target,
};

fn guess(n: i64) -> Guess {
    Guess::new(n).expect("Valid guess")
}

fn target(n: i64) -> Target {
    Target::new(guess(n))
}

#[test]
fn test_typestate_lifecycle() {
    let round = RoundSetup::with_target(target(50)).start();
    assert_eq!(round.attempts(), 0);

    let round = match round.guess(guess(70)).expect("Valid guess") {
        RoundResult::InProgress(r) => r,
        RoundResult::Won(_) => panic!("70 shouldn't win"),
    };
    assert_eq!(round.history()[0].result, GuessResult::High);

    match round.guess(guess(50)).expect("Valid guess") {
        RoundResult::Won(won) => {
            assert_eq!(won.score().attempts(), 2);
            assert_eq!(won.target().value(), 50);
        }
        RoundResult::InProgress(_) => panic!("50 should win"),
    }
}

#[test]
fn test_rejected_guess_returns_round() {
    let round = match RoundSetup::with_target(target(50))
        .start()
        .guess(guess(15))
        .expect("Valid guess")
    {
        RoundResult::InProgress(r) => r,
        RoundResult::Won(_) => panic!("15 shouldn't win"),
    };

    let rejected = round.guess(guess(15)).expect_err("Duplicate should fail");
    assert_eq!(rejected.error(), &GuessError::DuplicateGuess(guess(15)));

    let round = rejected.into_round();
    assert_eq!(round.attempts(), 1);
}

#[test]
fn test_replay_to_win() {
    let guesses = [guess(70), guess(30), guess(50)];
    match RoundInProgress::replay(target(50), &guesses).expect("Valid replay") {
        RoundResult::Won(won) => assert_eq!(won.score().attempts(), 3),
        RoundResult::InProgress(_) => panic!("Replay should end in a win"),
    }
}

#[test]
fn test_replay_stops_at_win() {
    // Guesses after the winning one are ignored.
    let guesses = [guess(50), guess(50), guess(1)];
    match RoundInProgress::replay(target(50), &guesses).expect("Valid replay") {
        RoundResult::Won(won) => assert_eq!(won.history().len(), 1),
        RoundResult::InProgress(_) => panic!("Replay should end in a win"),
    }
}

#[test]
fn test_replay_rejects_duplicate() {
    let guesses = [guess(10), guess(10)];
    assert_eq!(
        RoundInProgress::replay(target(50), &guesses).err(),
        Some(GuessError::DuplicateGuess(guess(10)))
    );
}

#[test]
fn test_invariants_hold_through_round() {
    let mut round = RoundSetup::with_target(target(64)).start();
    for n in [10, 90, 50, 70, 60, 65, 62, 63] {
        round = match round.guess(guess(n)).expect("Valid guess") {
            RoundResult::InProgress(r) => r,
            RoundResult::Won(_) => panic!("{n} shouldn't win"),
        };
        assert!(RoundInvariants::check_all(&round).is_ok());
        assert!(!round.is_won());
    }

    let won = round.guess(guess(64)).expect("Valid guess");
    assert!(won.is_won());
    assert!(RoundInvariants::check_all(&won).is_ok());
}
