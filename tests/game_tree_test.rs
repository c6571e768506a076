//! Walks every reachable game and checks the rules at each position.

use strum::IntoEnumIterator;
use tictactoe_ladder::{
    Cell, Game, GameStatus, MoveError, MoveOutcome, Outcome, PlayerResult, SQUARES, Symbol,
    results_for, rules, score_for,
};

#[derive(Debug, Default)]
struct Totals {
    positions: usize,
    x_wins: usize,
    o_wins: usize,
    draws: usize,
}

fn check_position(game: &Game) {
    let occupied = game
        .board()
        .squares()
        .iter()
        .filter(|c| **c != Cell::Empty)
        .count();
    assert_eq!(occupied, game.number_of_moves());
    assert_eq!(game.moves().len(), game.number_of_moves());

    let expected = if game.number_of_moves() % 2 == 0 {
        game.player1_symbol()
    } else {
        game.player2_symbol()
    };
    assert_eq!(game.symbol_to_move(), expected);

    match game.status() {
        GameStatus::InProgress => {
            assert!(!rules::has_line(game.board(), Symbol::X));
            assert!(!rules::has_line(game.board(), Symbol::O));
            assert!(game.number_of_moves() < SQUARES);
        }
        GameStatus::Won(winner) => {
            assert!(rules::has_line(game.board(), winner));
            assert!(!rules::has_line(game.board(), winner.opponent()));
        }
        GameStatus::Draw => {
            assert!(rules::is_full(game.board()));
            assert!(!rules::has_line(game.board(), Symbol::X));
            assert!(!rules::has_line(game.board(), Symbol::O));
        }
        GameStatus::Cancelled => panic!("Play never cancels"),
    }
}

fn check_finished(outcome: Outcome, player1_symbol: Symbol) {
    let (first, second) = results_for(outcome, player1_symbol);
    let points = score_for(outcome, player1_symbol);
    assert_eq!(points.player1, first.points());
    assert_eq!(points.player2, second.points());
    match (first, second) {
        (PlayerResult::Win, PlayerResult::Loss)
        | (PlayerResult::Loss, PlayerResult::Win)
        | (PlayerResult::Draw, PlayerResult::Draw) => {}
        other => panic!("Asymmetric results {:?}", other),
    }
}

fn walk(game: &Game, totals: &mut Totals) {
    totals.positions += 1;
    check_position(game);

    if game.is_over() {
        let outcome = game.outcome().expect("Finished by play");
        check_finished(outcome, game.player1_symbol());
        match outcome {
            Outcome::Won(Symbol::X) => totals.x_wins += 1,
            Outcome::Won(Symbol::O) => totals.o_wins += 1,
            Outcome::Draw => totals.draws += 1,
        }
        return;
    }

    let mover = game.symbol_to_move();
    let mut wrong = game.clone();
    assert_eq!(
        wrong.apply_move(mover.opponent(), 0),
        Err(MoveError::WrongTurn(mover.opponent()))
    );
    assert_eq!(&wrong, game);

    for square in 0..SQUARES as i32 {
        let mut next = game.clone();
        match next.apply_move(mover, square) {
            Ok(MoveOutcome::AlreadyOver) => panic!("Game was in progress"),
            Ok(_) => {
                assert_eq!(next.number_of_moves(), game.number_of_moves() + 1);
                walk(&next, totals);
            }
            Err(MoveError::SquareOccupied { square: sq, occupant }) => {
                assert_eq!(sq as i32, square);
                assert_eq!(game.board().get(sq), Ok(Cell::Occupied(occupant)));
                assert_eq!(&next, game);
            }
            Err(e) => panic!("Unexpected error {:?}", e),
        }
    }
}

#[test]
fn test_every_reachable_game_obeys_the_rules() {
    let mut totals = Totals::default();
    walk(&Game::new(1, 1, 2, Symbol::X), &mut totals);

    // Known counts for the complete tic-tac-toe game tree.
    assert_eq!(totals.positions, 549_946);
    assert_eq!(totals.x_wins, 131_184);
    assert_eq!(totals.o_wins, 77_904);
    assert_eq!(totals.draws, 46_080);
}

#[test]
fn test_player1_symbol_choice_mirrors_the_tree() {
    for first in Symbol::iter() {
        let mut totals = Totals::default();
        walk(&Game::new(1, 1, 2, first), &mut totals);
        let first_wins = if first == Symbol::X {
            totals.x_wins
        } else {
            totals.o_wins
        };
        assert_eq!(first_wins, 131_184);
        assert_eq!(totals.draws, 46_080);
    }
}
