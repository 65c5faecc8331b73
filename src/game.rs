use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::moves::{san, Move, MoveCandidate, MoveRequest};
use crate::piece::{Color, PieceType, Position};

/// Session status. Menu, Paused and the presentation-level Draw (agreed or
/// claimed draws) are owned by the UI layer; the engine only ever produces
/// Playing, Checkmate and Stalemate.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    Checkmate,
    Stalemate,
    Draw,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Winner {
    White,
    Black,
    Draw,
}

impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Winner::White,
            Color::Black => Winner::Black,
        }
    }
}

/// One game as an immutable value. The presentation layer holds the single
/// mutable reference and replaces it wholesale with whatever `apply_move`
/// returns; nothing in here mutates in place.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GameState {
    pub board: Board,
    pub turn: Color,
    pub history: Vec<Move>,
    pub status: GameStatus,
    pub winner: Option<Winner>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            board: Board::new(),
            turn: Color::White,
            history: Vec::new(),
            status: GameStatus::Playing,
            winner: None,
        }
    }

    /// Start from an arbitrary position. Used for test fixtures and for
    /// analysis boards; the history starts empty, so there is no en passant
    /// context until a move is played.
    pub fn with_board(board: Board, turn: Color) -> Self {
        GameState {
            board,
            turn,
            history: Vec::new(),
            status: GameStatus::Playing,
            winner: None,
        }
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// Destinations to highlight for the piece on `from`.
    pub fn legal_destinations(&self, from: Position) -> Vec<Position> {
        self.board.legal_moves(from, self.last_move())
    }

    /// Every legal move for the side to move.
    pub fn candidate_moves(&self) -> Vec<MoveCandidate> {
        self.board.all_legal_moves(self.turn, self.last_move())
    }

    pub fn is_in_check(&self) -> bool {
        self.board.is_in_check(self.turn)
    }

    /// The pure transition: validate the request against the current
    /// position and return the successor state, or `None` if the game is not
    /// in progress, the source square does not hold a piece of the side to
    /// move, or the destination is not legal. The input state is untouched
    /// either way.
    pub fn apply_move(&self, req: &MoveRequest) -> Option<GameState> {
        if self.status != GameStatus::Playing {
            return None;
        }
        let mut piece = self.board.get(req.from)?;
        if piece.color != self.turn {
            return None;
        }
        if !self.board.legal_moves(req.from, self.last_move()).contains(&req.to) {
            return None;
        }

        let mut board = self.board.clone();
        let is_en_passant = piece.kind == PieceType::Pawn
            && req.to.col != req.from.col
            && board.get(req.to).is_none();
        let is_castling = piece.kind == PieceType::King
            && (req.to.col as i32 - req.from.col as i32).abs() == 2;
        let is_promotion =
            piece.kind == PieceType::Pawn && req.to.row == piece.color.promotion_row();

        // The en passant victim sits beside the source square, not on the
        // destination.
        let captured = if is_en_passant {
            let victim = Position::new(req.from.row, req.to.col);
            let taken = board.get(victim);
            board.set(victim, None);
            taken
        } else {
            board.get(req.to)
        };

        let before = piece;
        piece.has_moved = true;
        let promotion = if is_promotion {
            // Queen when the request does not say otherwise.
            Some(req.promotion.unwrap_or(PieceType::Queen))
        } else {
            None
        };
        if let Some(kind) = promotion {
            piece.kind = kind;
        }
        board.set(req.to, Some(piece));
        board.set(req.from, None);

        if is_castling {
            let (rook_from, rook_to) = if req.to.col > req.from.col {
                (Position::new(req.from.row, 7), Position::new(req.from.row, req.to.col - 1))
            } else {
                (Position::new(req.from.row, 0), Position::new(req.from.row, req.to.col + 1))
            };
            if let Some(mut rook) = board.get(rook_from) {
                rook.has_moved = true;
                board.set(rook_to, Some(rook));
                board.set(rook_from, None);
            }
        }

        let mut mv = Move {
            from: req.from,
            to: req.to,
            piece: before,
            captured,
            is_castling,
            is_en_passant,
            is_promotion,
            promotion,
            notation: String::new(),
        };

        // Classify the resulting position for the side that moves next; the
        // just-made move is its en passant context.
        let next = self.turn.opposite();
        let in_check = board.is_in_check(next);
        let replies = board.all_legal_moves(next, Some(&mv));
        let (status, winner) = if replies.is_empty() {
            if in_check {
                (GameStatus::Checkmate, Some(Winner::from(self.turn)))
            } else {
                (GameStatus::Stalemate, Some(Winner::Draw))
            }
        } else {
            (GameStatus::Playing, None)
        };

        mv.notation = san(
            req.from,
            req.to,
            before,
            captured.is_some(),
            in_check,
            status == GameStatus::Checkmate,
        );

        let mut history = self.history.clone();
        history.push(mv);
        Some(GameState { board, turn: next, history, status, winner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Piece;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn place(board: &mut Board, row: usize, col: usize, kind: PieceType, color: Color) {
        board.squares[row][col] = Some(Piece::new(kind, color));
    }

    fn place_moved(board: &mut Board, row: usize, col: usize, kind: PieceType, color: Color) {
        let mut piece = Piece::new(kind, color);
        piece.has_moved = true;
        board.squares[row][col] = Some(piece);
    }

    fn play(state: &GameState, uci: &str) -> GameState {
        let req = MoveRequest::from_uci(uci).unwrap();
        state
            .apply_move(&req)
            .unwrap_or_else(|| panic!("move {uci} rejected"))
    }

    #[test]
    fn scholars_mate_ends_in_checkmate_for_white() {
        let mut state = GameState::new();
        for uci in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6"] {
            state = play(&state, uci);
            assert_eq!(state.status, GameStatus::Playing);
        }
        let state = play(&state, "h5f7");

        assert_eq!(state.status, GameStatus::Checkmate);
        assert_eq!(state.winner, Some(Winner::White));
        assert_eq!(state.turn, Color::Black);
        assert!(state.is_in_check());
        assert!(state.candidate_moves().is_empty());
        assert_eq!(state.history.last().unwrap().notation, "Qxf7#");
    }

    #[test]
    fn lone_cornered_king_is_stalemated() {
        // Black king a8, white king b6; Qf7-c7 leaves black with no move
        // and no check.
        let mut board = Board::empty();
        place(&mut board, 0, 0, PieceType::King, Color::Black);
        place_moved(&mut board, 2, 1, PieceType::King, Color::White);
        place_moved(&mut board, 1, 5, PieceType::Queen, Color::White);
        let state = GameState::with_board(board, Color::White);

        let state = play(&state, "f7c7");
        assert_eq!(state.status, GameStatus::Stalemate);
        assert_eq!(state.winner, Some(Winner::Draw));
        assert!(!state.is_in_check());
        assert!(state.candidate_moves().is_empty());
    }

    #[test]
    fn en_passant_capture_removes_the_bypassed_pawn() {
        let mut board = Board::empty();
        place(&mut board, 7, 4, PieceType::King, Color::White);
        place(&mut board, 0, 4, PieceType::King, Color::Black);
        place(&mut board, 6, 4, PieceType::Pawn, Color::White);
        place_moved(&mut board, 4, 3, PieceType::Pawn, Color::Black);
        let state = GameState::with_board(board, Color::White);

        let state = play(&state, "e2e4");
        assert!(state.legal_destinations(Position::new(4, 3)).contains(&Position::new(5, 4)));

        let state = play(&state, "d4e3");
        let mv = state.history.last().unwrap();
        assert!(mv.is_en_passant);
        assert_eq!(mv.captured.map(|p| p.kind), Some(PieceType::Pawn));
        assert_eq!(mv.notation, "dxe3");
        // The white pawn came off e4, not the landing square.
        assert!(state.board.get(Position::new(4, 4)).is_none());
        assert_eq!(
            state.board.get(Position::new(5, 4)).map(|p| (p.kind, p.color)),
            Some((PieceType::Pawn, Color::Black))
        );
    }

    #[test]
    fn kingside_castle_places_rook_beside_the_king() {
        let mut board = Board::empty();
        place(&mut board, 7, 4, PieceType::King, Color::White);
        place(&mut board, 7, 7, PieceType::Rook, Color::White);
        place(&mut board, 0, 4, PieceType::King, Color::Black);
        let state = GameState::with_board(board, Color::White);

        let state = play(&state, "e1g1");
        let mv = state.history.last().unwrap();
        assert!(mv.is_castling);
        assert_eq!(mv.notation, "O-O");

        let king = state.board.get(Position::new(7, 6)).unwrap();
        let rook = state.board.get(Position::new(7, 5)).unwrap();
        assert_eq!(king.kind, PieceType::King);
        assert_eq!(rook.kind, PieceType::Rook);
        assert!(king.has_moved && rook.has_moved);
        assert!(state.board.get(Position::new(7, 7)).is_none());
    }

    #[test]
    fn promotion_materializes_the_requested_archetype() {
        let mut board = Board::empty();
        place_moved(&mut board, 7, 4, PieceType::King, Color::White);
        place_moved(&mut board, 0, 7, PieceType::King, Color::Black);
        place_moved(&mut board, 1, 0, PieceType::Pawn, Color::White);
        let state = GameState::with_board(board.clone(), Color::White);

        let next = play(&state, "a7a8n");
        let mv = next.history.last().unwrap();
        assert!(mv.is_promotion);
        assert_eq!(mv.promotion, Some(PieceType::Knight));
        assert_eq!(
            next.board.get(Position::new(0, 0)).map(|p| p.kind),
            Some(PieceType::Knight)
        );

        // No archetype supplied: queen, here with check on the back rank.
        let state = GameState::with_board(board, Color::White);
        let next = play(&state, "a7a8");
        let mv = next.history.last().unwrap();
        assert_eq!(mv.promotion, Some(PieceType::Queen));
        assert_eq!(mv.notation, "a8+");
        assert!(next.is_in_check());
    }

    #[test]
    fn promoted_pawn_keeps_its_identity() {
        // The id survives promotion so the UI can animate the same piece.
        let mut board = Board::empty();
        place_moved(&mut board, 7, 4, PieceType::King, Color::White);
        place_moved(&mut board, 0, 7, PieceType::King, Color::Black);
        place_moved(&mut board, 1, 0, PieceType::Pawn, Color::White);
        let pawn_id = board.get(Position::new(1, 0)).unwrap().id;
        let state = GameState::with_board(board, Color::White);

        let next = play(&state, "a7a8q");
        assert_eq!(next.board.get(Position::new(0, 0)).map(|p| p.id), Some(pawn_id));
    }

    #[test]
    fn illegal_requests_are_refused() {
        let state = GameState::new();
        // Empty square, wrong side, unreachable destination.
        assert!(state.apply_move(&MoveRequest::from_uci("e4e5").unwrap()).is_none());
        assert!(state.apply_move(&MoveRequest::from_uci("e7e5").unwrap()).is_none());
        assert!(state.apply_move(&MoveRequest::from_uci("e2e5").unwrap()).is_none());
    }

    #[test]
    fn finished_games_accept_no_further_moves() {
        let mut state = GameState::new();
        for uci in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"] {
            state = play(&state, uci);
        }
        assert_eq!(state.status, GameStatus::Checkmate);
        assert!(state.apply_move(&MoveRequest::from_uci("a7a6").unwrap()).is_none());
    }

    #[test]
    fn apply_move_leaves_the_input_state_untouched() {
        let state = GameState::new();
        let before = state.board.squares;
        let _ = play(&state, "e2e4");
        assert_eq!(state.board.squares, before);
        assert!(state.history.is_empty());
        assert_eq!(state.turn, Color::White);
    }

    /// Seeded random playout holding the structural invariants at every ply:
    /// exactly one king per side, the side that just moved is never left in
    /// check, and has_moved never resets.
    #[test]
    fn random_playout_preserves_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = GameState::new();

        for _ in 0..120 {
            let candidates = state.candidate_moves();
            if state.status != GameStatus::Playing {
                assert!(candidates.is_empty());
                break;
            }
            let pick = *candidates.choose(&mut rng).unwrap();
            let mover = state.turn;
            state = state
                .apply_move(&MoveRequest {
                    from: pick.from,
                    to: pick.to,
                    promotion: Some(PieceType::Queen),
                })
                .expect("candidate move must commit");

            assert!(!state.board.is_in_check(mover), "mover left in check");
            assert!(state.board.find_king(Color::White).is_some());
            assert!(state.board.find_king(Color::Black).is_some());
            let mv = state.history.last().unwrap();
            assert!(state.board.get(mv.to).map(|p| p.has_moved).unwrap_or(false));
        }
    }
}
