use chess_rules::game::{GameState, GameStatus, Winner};
use chess_rules::moves::MoveRequest;
use chess_rules::piece::PieceType;
use rand::seq::SliceRandom;

/// Play one game of uniformly random legal moves and dump the SAN log as
/// JSON on stdout. Exercises generation, legality filtering and terminal
/// detection end to end; there is no evaluation of any kind.
fn main() {
    let mut rng = rand::thread_rng();
    let mut state = GameState::new();
    let mut ply = 0;

    while state.status == GameStatus::Playing && ply < 300 {
        let candidates = state.candidate_moves();
        let pick = match candidates.choose(&mut rng) {
            Some(c) => *c,
            None => break,
        };
        let req = MoveRequest {
            from: pick.from,
            to: pick.to,
            promotion: Some(PieceType::Queen),
        };
        match state.apply_move(&req) {
            Some(next) => state = next,
            None => break,
        }
        ply += 1;
    }

    let log: Vec<&str> = state.history.iter().map(|m| m.notation.as_str()).collect();
    match serde_json::to_string(&log) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to serialize move log: {err}"),
    }

    let outcome = match (state.status, state.winner) {
        (GameStatus::Checkmate, Some(Winner::White)) => "checkmate — white wins",
        (GameStatus::Checkmate, Some(Winner::Black)) => "checkmate — black wins",
        (GameStatus::Stalemate, _) => "stalemate",
        _ => "ongoing",
    };
    eprintln!("Game over after {ply} plies: {outcome}");
}
