//! League service scenarios against the in-memory repository.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use tictactoe_ladder::{
    DbError, DbErrorKind, Game, GameId, GameStore, LeagueError, LeagueService, MemoryRepository,
    MoveCommit, PlayerId, PlayerRanking, RankingSnapshot, RankingStore, Repository, Score,
    ScoreStore, Symbol, User, UserRegistry,
};

fn league() -> LeagueService {
    LeagueService::new(Arc::new(MemoryRepository::new()), Duration::from_secs(600))
}

fn league_with_players() -> LeagueService {
    let league = league();
    league
        .create_user("alice", Some("alice@example.com"))
        .expect("Create failed");
    league.create_user("bob", None).expect("Create failed");
    league
}

/// Plays `squares` with whichever symbol is to move.
fn play(league: &LeagueService, id: GameId, squares: &[i32]) -> String {
    let mut message = String::new();
    for &square in squares {
        let game = league.get_game(id).expect("Game missing");
        let symbol = if game.number_of_moves % 2 == 0 {
            game.player1_symbol
        } else {
            game.player2_symbol
        };
        message = league
            .make_move(id, symbol, square)
            .expect("Move rejected")
            .message;
    }
    message
}

fn ranking_of<'a>(rankings: &'a [RankingSnapshot], name: &str) -> &'a RankingSnapshot {
    rankings
        .iter()
        .find(|r| r.player_name == name)
        .expect("Player missing from rankings")
}

#[test]
fn test_create_user_messages() {
    let league = league();
    let view = league.create_user("alice", None).expect("Create failed");
    assert_eq!(view.message, "User alice created!");

    let err = league.create_user("alice", None).unwrap_err();
    assert!(matches!(err, LeagueError::Conflict(ref m) if m == "User name already exists!"));

    let err = league.create_user("  ", None).unwrap_err();
    assert!(matches!(err, LeagueError::Validation(_)));
}

#[test]
fn test_new_game_validation() {
    let league = league_with_players();

    assert!(matches!(
        league.new_game("alice", None, None),
        Err(LeagueError::Validation(_))
    ));
    assert!(matches!(
        league.new_game("alice", Some("alice"), None),
        Err(LeagueError::Validation(_))
    ));
    assert!(matches!(
        league.new_game("alice", Some("zed"), None),
        Err(LeagueError::NotFound(ref m)) if m == "Player 2 does not exist!"
    ));
    assert!(matches!(
        league.new_game("zed", Some("bob"), None),
        Err(LeagueError::NotFound(ref m)) if m == "Player 1 does not exist!"
    ));
}

#[test]
fn test_memory_create_game_unknown_player_is_not_found() {
    let repo = MemoryRepository::new();
    let alice = repo.create_user("alice", None).expect("Create failed");

    let err = repo
        .create_game(*alice.id(), 9999, Symbol::X)
        .expect_err("Unknown player accepted");
    assert_eq!(err.kind, DbErrorKind::NotFound);
}

#[test]
fn test_new_game_snapshot() {
    let league = league_with_players();
    let game = league
        .new_game("alice", Some("bob"), Some(Symbol::O))
        .expect("New game failed");

    assert_eq!(game.message, "Good luck playing Tic Tac Toe!");
    assert_eq!(game.player1_name, "alice");
    assert_eq!(game.player1_symbol, Symbol::O);
    assert_eq!(game.player2_symbol, Symbol::X);
    assert_eq!(game.board, "         ");
    assert_eq!(game.status, "in_progress");
    assert!(!game.game_over);

    let fetched = league.get_game(game.id).expect("Get failed");
    assert_eq!(fetched.message, "Time for 'O' to make a move!");
}

#[test]
fn test_unknown_game_is_not_found() {
    let league = league_with_players();
    assert!(matches!(
        league.get_game(42),
        Err(LeagueError::NotFound(ref m)) if m == "Game not found!"
    ));
    assert!(matches!(
        league.make_move(42, Symbol::X, 0),
        Err(LeagueError::NotFound(_))
    ));
    assert!(matches!(league.cancel_game(42), Err(LeagueError::NotFound(_))));
    assert!(matches!(league.game_history(42), Err(LeagueError::NotFound(_))));
}

#[test]
fn test_occupied_square_scenario() {
    let league = league_with_players();
    let game = league.new_game("alice", Some("bob"), None).expect("New game failed");
    play(&league, game.id, &[4, 0, 8, 2]);

    let err = league.make_move(game.id, Symbol::X, 0).unwrap_err();
    assert!(matches!(
        err,
        LeagueError::SquareOccupied {
            square: 0,
            occupant: Symbol::O
        }
    ));
    assert_eq!(err.to_string(), "There is already an O in square 0");

    let after = league.get_game(game.id).expect("Get failed");
    assert_eq!(after.number_of_moves, 4);
    assert_eq!(after.board, "O O X   X");
}

#[test]
fn test_rejected_moves_leave_game_unchanged() {
    let league = league_with_players();
    let game = league.new_game("alice", Some("bob"), None).expect("New game failed");
    play(&league, game.id, &[4]);
    let before = league.get_game(game.id).expect("Get failed");

    assert!(matches!(
        league.make_move(game.id, Symbol::X, 0),
        Err(LeagueError::WrongTurn(Symbol::X))
    ));
    assert!(matches!(
        league.make_move(game.id, Symbol::O, 9),
        Err(LeagueError::InvalidSquare(9))
    ));
    assert!(matches!(
        league.make_move(game.id, Symbol::X, -3),
        Err(LeagueError::WrongTurn(Symbol::X))
    ));

    assert_eq!(league.get_game(game.id).expect("Get failed"), before);
}

#[test]
fn test_win_scenario_scores_and_ranks() {
    let league = league_with_players();
    let game = league.new_game("alice", Some("bob"), None).expect("New game failed");

    let message = play(&league, game.id, &[0, 3, 1, 4, 2]);
    assert_eq!(message, "'X' wins the game!");

    let finished = league.get_game(game.id).expect("Get failed");
    assert!(finished.game_over);
    assert_eq!(finished.status, "won");
    assert_eq!(finished.winner, Some(Symbol::X));
    assert_eq!(finished.message, "This game has ended.");

    let scores = league.list_scores().expect("Scores failed");
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].winner, "X");
    assert_eq!((scores[0].player1_points, scores[0].player2_points), (3, 0));
    assert_eq!(scores[0].number_of_moves, 5);

    let rankings = league.list_rankings().expect("Rankings failed");
    assert_eq!(rankings[0].player_name, "alice");
    let alice = ranking_of(&rankings, "alice");
    assert_eq!((alice.total_games, alice.wins, alice.losses), (1, 1, 0));
    assert_eq!(alice.ranking, 3.0);
    let bob = ranking_of(&rankings, "bob");
    assert_eq!((bob.total_games, bob.wins, bob.losses), (1, 0, 1));
    assert_eq!(bob.ranking, 0.0);
}

#[test]
fn test_player2_symbol_win_awards_player2() {
    let league = league_with_players();
    let game = league.new_game("alice", Some("bob"), None).expect("New game failed");

    let message = play(&league, game.id, &[0, 3, 1, 4, 8, 5]);
    assert_eq!(message, "'O' wins the game!");

    let scores = league.list_scores_for_user("bob").expect("Scores failed");
    assert_eq!((scores[0].player1_points, scores[0].player2_points), (0, 3));
    let rankings = league.list_rankings().expect("Rankings failed");
    assert_eq!(ranking_of(&rankings, "bob").wins, 1);
    assert_eq!(ranking_of(&rankings, "alice").losses, 1);
}

#[test]
fn test_draw_scenario() {
    let league = league_with_players();
    let game = league.new_game("alice", Some("bob"), None).expect("New game failed");

    let message = play(&league, game.id, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
    assert_eq!(message, "The game ended in a draw.");

    let scores = league.list_scores().expect("Scores failed");
    assert_eq!(scores[0].winner, "Draw");
    assert_eq!((scores[0].player1_points, scores[0].player2_points), (1, 1));

    let rankings = league.list_rankings().expect("Rankings failed");
    for name in ["alice", "bob"] {
        let row = ranking_of(&rankings, name);
        assert_eq!((row.total_games, row.draws), (1, 1));
        assert_eq!(row.ranking, 1.0);
    }
}

#[test]
fn test_move_after_end_is_informational() {
    let league = league_with_players();
    let game = league.new_game("alice", Some("bob"), None).expect("New game failed");
    play(&league, game.id, &[0, 3, 1, 4, 2]);

    let view = league.make_move(game.id, Symbol::O, 5).expect("Move errored");
    assert_eq!(view.message, "Game already over!");
    assert_eq!(view.number_of_moves, 5);
    assert_eq!(league.list_scores().expect("Scores failed").len(), 1);
}

#[test]
fn test_cancel_scenarios() {
    let league = league_with_players();
    let game = league.new_game("alice", Some("bob"), None).expect("New game failed");
    play(&league, game.id, &[4]);

    let view = league.cancel_game(game.id).expect("Cancel failed");
    assert_eq!(view.message, "The game has been cancelled.");
    let cancelled = league.get_game(game.id).expect("Get failed");
    assert_eq!(cancelled.status, "cancelled");
    assert_eq!(cancelled.message, "This game has been cancelled.");
    assert_eq!(
        league.make_move(game.id, Symbol::O, 0).expect("Move errored").message,
        "Game already over!"
    );

    let won = league.new_game("alice", Some("bob"), None).expect("New game failed");
    play(&league, won.id, &[0, 3, 1, 4, 2]);
    let view = league.cancel_game(won.id).expect("Cancel failed");
    assert_eq!(view.message, "This game has already ended.");
    assert_eq!(league.get_game(won.id).expect("Get failed").status, "won");

    // Only the won game was scored.
    assert_eq!(league.list_scores().expect("Scores failed").len(), 1);
    let rankings = league.list_rankings().expect("Rankings failed");
    assert_eq!(ranking_of(&rankings, "alice").total_games, 1);
}

#[test]
fn test_ranking_over_mixed_results() {
    let league = league_with_players();
    league.create_user("carol", None).expect("Create failed");

    // alice beats bob twice, draws carol once, loses to carol once
    for _ in 0..2 {
        let g = league.new_game("alice", Some("bob"), None).expect("New game failed");
        play(&league, g.id, &[0, 3, 1, 4, 2]);
    }
    let g = league.new_game("alice", Some("carol"), None).expect("New game failed");
    play(&league, g.id, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
    let g = league.new_game("carol", Some("alice"), None).expect("New game failed");
    play(&league, g.id, &[0, 3, 1, 4, 2]);

    let rankings = league.list_rankings().expect("Rankings failed");
    let alice = ranking_of(&rankings, "alice");
    assert_eq!((alice.wins, alice.draws, alice.losses), (2, 1, 1));
    assert_eq!(alice.ranking, (3.0 * 2.0 + 1.0) / 4.0);

    let carol = ranking_of(&rankings, "carol");
    assert_eq!(carol.ranking, 2.0);
    let names: Vec<&str> = rankings.iter().map(|r| r.player_name.as_str()).collect();
    assert_eq!(names, vec!["carol", "alice", "bob"]);

    assert_eq!(league.list_scores_for_user("alice").expect("Scores failed").len(), 4);
    assert_eq!(league.list_scores_for_user("bob").expect("Scores failed").len(), 2);
    assert!(matches!(
        league.list_scores_for_user("zed"),
        Err(LeagueError::NotFound(_))
    ));
}

#[test]
fn test_games_for_user_lists_only_active() {
    let league = league_with_players();
    let open = league.new_game("alice", Some("bob"), None).expect("New game failed");
    let done = league.new_game("bob", Some("alice"), None).expect("New game failed");
    play(&league, done.id, &[0, 3, 1, 4, 2]);
    let cancelled = league.new_game("alice", Some("bob"), None).expect("New game failed");
    league.cancel_game(cancelled.id).expect("Cancel failed");

    let games = league.list_games_for_user("alice").expect("List failed");
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id, open.id);
    assert_eq!(games[0].message, "Time for 'X' to make a move!");
}

#[test]
fn test_game_history_follows_turn_order() {
    let league = league_with_players();
    let game = league
        .new_game("alice", Some("bob"), Some(Symbol::O))
        .expect("New game failed");
    play(&league, game.id, &[4, 0, 8]);

    let history = league.game_history(game.id).expect("History failed");
    let moves: Vec<(usize, usize, Symbol)> = history
        .moves
        .iter()
        .map(|m| (m.move_number, m.square, m.symbol))
        .collect();
    assert_eq!(
        moves,
        vec![(1, 4, Symbol::O), (2, 0, Symbol::X), (3, 8, Symbol::O)]
    );
    assert_eq!(history.message, "Time for 'X' to make a move!");
}

#[test]
fn test_average_moves_remaining_tracks_writes() {
    let league = league_with_players();
    assert_eq!(league.average_moves_remaining().expect("Stats failed").message, "");

    let first = league.new_game("alice", Some("bob"), None).expect("New game failed");
    let second = league.new_game("bob", Some("alice"), None).expect("New game failed");
    assert_eq!(
        league.average_moves_remaining().expect("Stats failed").message,
        "The average moves remaining is 9.00"
    );

    play(&league, first.id, &[4, 0, 8]);
    assert_eq!(
        league.average_moves_remaining().expect("Stats failed").message,
        "The average moves remaining is 7.50"
    );

    league.cancel_game(second.id).expect("Cancel failed");
    assert_eq!(
        league.average_moves_remaining().expect("Stats failed").message,
        "The average moves remaining is 6.00"
    );
}

#[test]
fn test_pending_reminders() {
    let league = league_with_players();
    league
        .create_user("carol", Some("carol@example.com"))
        .expect("Create failed");
    let game = league.new_game("alice", Some("bob"), None).expect("New game failed");

    let reminders = league.pending_reminders().expect("Reminders failed");
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].user_name, "alice");
    assert_eq!(reminders[0].email, "alice@example.com");
    assert_eq!(
        reminders[0].subject,
        "Reminder: You have a tic-tac-toe game in progress!"
    );
    assert_eq!(
        reminders[0].body,
        "Hello alice, Your tic-tac-toe game needs your attention!"
    );
    assert_eq!(reminders[0].game_ids, vec![game.id]);

    league.cancel_game(game.id).expect("Cancel failed");
    assert!(league.pending_reminders().expect("Reminders failed").is_empty());
}

#[test]
fn test_competing_moves_apply_once() {
    let league = league_with_players();
    let game = league.new_game("alice", Some("bob"), None).expect("New game failed");

    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|square| {
            let league = league.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                league.make_move(game.id, Symbol::X, square)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, LeagueError::WrongTurn(Symbol::X)))
    );
    assert_eq!(league.get_game(game.id).expect("Get failed").number_of_moves, 1);
}

/// Repository that lets another writer slip a move in before the first
/// commit it sees.
struct InterferingRepository {
    inner: MemoryRepository,
    interfered: AtomicBool,
}

impl UserRegistry for InterferingRepository {
    fn create_user(&self, name: &str, email: Option<&str>) -> Result<User, DbError> {
        self.inner.create_user(name, email)
    }
    fn find_user_by_name(&self, name: &str) -> Result<Option<User>, DbError> {
        self.inner.find_user_by_name(name)
    }
    fn get_user(&self, id: PlayerId) -> Result<Option<User>, DbError> {
        self.inner.get_user(id)
    }
    fn list_users(&self) -> Result<Vec<User>, DbError> {
        self.inner.list_users()
    }
}

impl GameStore for InterferingRepository {
    fn create_game(&self, p1: PlayerId, p2: PlayerId, s: Symbol) -> Result<Game, DbError> {
        self.inner.create_game(p1, p2, s)
    }
    fn get_game(&self, id: GameId) -> Result<Option<Game>, DbError> {
        self.inner.get_game(id)
    }
    fn cancel_game(&self, id: GameId) -> Result<bool, DbError> {
        self.inner.cancel_game(id)
    }
    fn delete_game(&self, id: GameId) -> Result<(), DbError> {
        self.inner.delete_game(id)
    }
    fn active_games_for_player(&self, player: PlayerId) -> Result<Vec<Game>, DbError> {
        self.inner.active_games_for_player(player)
    }
    fn active_games(&self) -> Result<Vec<Game>, DbError> {
        self.inner.active_games()
    }
}

impl ScoreStore for InterferingRepository {
    fn list_scores(&self) -> Result<Vec<Score>, DbError> {
        self.inner.list_scores()
    }
    fn scores_for_player(&self, player: PlayerId) -> Result<Vec<Score>, DbError> {
        self.inner.scores_for_player(player)
    }
}

impl RankingStore for InterferingRepository {
    fn get_ranking(&self, player: PlayerId) -> Result<Option<PlayerRanking>, DbError> {
        self.inner.get_ranking(player)
    }
    fn list_rankings(&self) -> Result<Vec<PlayerRanking>, DbError> {
        self.inner.list_rankings()
    }
}

impl Repository for InterferingRepository {
    fn commit_move(&self, commit: MoveCommit) -> Result<Option<Score>, DbError> {
        if !self.interfered.swap(true, Ordering::SeqCst) {
            let mut rival = self
                .inner
                .get_game(commit.game.id())?
                .expect("Game exists");
            let expected_moves = rival.number_of_moves();
            let symbol = rival.symbol_to_move();
            let free = (0..9)
                .find(|sq| !commit.game.moves().contains(&(*sq as usize)))
                .expect("Free square");
            rival.apply_move(symbol, free).expect("Rival move");
            self.inner.commit_move(MoveCommit {
                game: rival,
                expected_moves,
                score: None,
            })?;
        }
        self.inner.commit_move(commit)
    }
}

#[test]
fn test_stale_commit_is_revalidated() {
    let repository = Arc::new(InterferingRepository {
        inner: MemoryRepository::new(),
        interfered: AtomicBool::new(false),
    });
    let league = LeagueService::new(repository, Duration::from_secs(600));
    league.create_user("alice", None).expect("Create failed");
    league.create_user("bob", None).expect("Create failed");
    let game = league.new_game("alice", Some("bob"), None).expect("New game failed");

    // The rival commits X first, so the retried X move is out of turn.
    let err = league.make_move(game.id, Symbol::X, 4).unwrap_err();
    assert!(matches!(err, LeagueError::WrongTurn(Symbol::X)));

    let after = league.get_game(game.id).expect("Get failed");
    assert_eq!(after.number_of_moves, 1);
    assert_eq!(after.message, "Time for 'O' to make a move!");
}
