use serde::{Deserialize, Serialize};

use crate::moves::{Move, MoveCandidate};
use crate::piece::{Color, Piece, PieceType, Position};

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const STRAIGHT_DIRS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAG_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// The 8x8 grid. Pure piece placement — whose turn it is and the move
/// history live in `GameState`, which threads the last move back in for
/// en passant context.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Board {
    pub squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard initial setup. Row 0 is black's back rank (rank 8),
    /// row 7 is white's (rank 1).
    pub fn new() -> Self {
        let mut squares = [[None; 8]; 8];

        squares[0][0] = Some(Piece::new(PieceType::Rook, Color::Black));
        squares[0][1] = Some(Piece::new(PieceType::Knight, Color::Black));
        squares[0][2] = Some(Piece::new(PieceType::Bishop, Color::Black));
        squares[0][3] = Some(Piece::new(PieceType::Queen, Color::Black));
        squares[0][4] = Some(Piece::new(PieceType::King, Color::Black));
        squares[0][5] = Some(Piece::new(PieceType::Bishop, Color::Black));
        squares[0][6] = Some(Piece::new(PieceType::Knight, Color::Black));
        squares[0][7] = Some(Piece::new(PieceType::Rook, Color::Black));
        for sq in &mut squares[1] {
            *sq = Some(Piece::new(PieceType::Pawn, Color::Black));
        }

        for sq in &mut squares[6] {
            *sq = Some(Piece::new(PieceType::Pawn, Color::White));
        }
        squares[7][0] = Some(Piece::new(PieceType::Rook, Color::White));
        squares[7][1] = Some(Piece::new(PieceType::Knight, Color::White));
        squares[7][2] = Some(Piece::new(PieceType::Bishop, Color::White));
        squares[7][3] = Some(Piece::new(PieceType::Queen, Color::White));
        squares[7][4] = Some(Piece::new(PieceType::King, Color::White));
        squares[7][5] = Some(Piece::new(PieceType::Bishop, Color::White));
        squares[7][6] = Some(Piece::new(PieceType::Knight, Color::White));
        squares[7][7] = Some(Piece::new(PieceType::Rook, Color::White));

        Board { squares }
    }

    /// The single source of truth for board-edge clipping.
    pub fn in_bounds(row: i32, col: i32) -> bool {
        (0..8).contains(&row) && (0..8).contains(&col)
    }

    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.row][pos.col]
    }

    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        self.squares[pos.row][pos.col] = piece;
    }

    pub fn find_king(&self, color: Color) -> Option<Position> {
        for r in 0..8 {
            for c in 0..8 {
                if let Some(p) = self.squares[r][c] {
                    if p.kind == PieceType::King && p.color == color {
                        return Some(Position::new(r, c));
                    }
                }
            }
        }
        None
    }

    /// Geometric reach of the piece at `from`: every square it could move to
    /// or capture on, with no castling and no en passant. This is the set
    /// attack queries consume — keeping castling out of it is what breaks
    /// the mutual recursion between move generation and check detection.
    /// Empty source square: empty vec.
    pub fn raw_reach(&self, from: Position) -> Vec<Position> {
        let piece = match self.get(from) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let mut reach = Vec::new();
        match piece.kind {
            PieceType::Pawn => self.pawn_reach(from, piece, &mut reach),
            PieceType::Knight => self.knight_reach(from, piece.color, &mut reach),
            PieceType::Bishop => self.sliding_reach(from, piece.color, &DIAG_DIRS, &mut reach),
            PieceType::Rook => self.sliding_reach(from, piece.color, &STRAIGHT_DIRS, &mut reach),
            PieceType::Queen => {
                self.sliding_reach(from, piece.color, &STRAIGHT_DIRS, &mut reach);
                self.sliding_reach(from, piece.color, &DIAG_DIRS, &mut reach);
            }
            PieceType::King => self.king_reach(from, piece.color, &mut reach),
        }
        reach
    }

    fn pawn_reach(&self, from: Position, piece: Piece, reach: &mut Vec<Position>) {
        let dir = piece.color.forward();
        let forward = from.row as i32 + dir;

        // Single push, and the double push behind it. The double step is
        // gated on the piece's has_moved flag rather than its rank; a pawn
        // must never be constructed off its home rank with has_moved unset.
        if Self::in_bounds(forward, from.col as i32)
            && self.squares[forward as usize][from.col].is_none()
        {
            reach.push(Position::new(forward as usize, from.col));
            if !piece.has_moved {
                let double = forward + dir;
                if Self::in_bounds(double, from.col as i32)
                    && self.squares[double as usize][from.col].is_none()
                {
                    reach.push(Position::new(double as usize, from.col));
                }
            }
        }

        // Diagonal captures only onto enemy-occupied squares.
        for dc in &[-1i32, 1] {
            let nc = from.col as i32 + dc;
            if !Self::in_bounds(forward, nc) {
                continue;
            }
            let target = Position::new(forward as usize, nc as usize);
            if self.get(target).map(|p| p.color != piece.color).unwrap_or(false) {
                reach.push(target);
            }
        }
    }

    fn knight_reach(&self, from: Position, color: Color, reach: &mut Vec<Position>) {
        for (dr, dc) in &KNIGHT_OFFSETS {
            let r = from.row as i32 + dr;
            let c = from.col as i32 + dc;
            if !Self::in_bounds(r, c) {
                continue;
            }
            let target = Position::new(r as usize, c as usize);
            if self.get(target).map(|p| p.color == color).unwrap_or(false) {
                continue;
            }
            reach.push(target);
        }
    }

    fn sliding_reach(
        &self,
        from: Position,
        color: Color,
        directions: &[(i32, i32)],
        reach: &mut Vec<Position>,
    ) {
        for (dr, dc) in directions {
            let mut r = from.row as i32 + dr;
            let mut c = from.col as i32 + dc;
            while Self::in_bounds(r, c) {
                let target = Position::new(r as usize, c as usize);
                if let Some(p) = self.get(target) {
                    if p.color != color {
                        reach.push(target);
                    }
                    break;
                }
                reach.push(target);
                r += dr;
                c += dc;
            }
        }
    }

    fn king_reach(&self, from: Position, color: Color, reach: &mut Vec<Position>) {
        for dr in -1..=1i32 {
            for dc in -1..=1i32 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let r = from.row as i32 + dr;
                let c = from.col as i32 + dc;
                if !Self::in_bounds(r, c) {
                    continue;
                }
                let target = Position::new(r as usize, c as usize);
                if self.get(target).map(|p| p.color == color).unwrap_or(false) {
                    continue;
                }
                reach.push(target);
            }
        }
    }

    /// Full pseudo-legal destination set for the piece at `from`: raw reach
    /// plus en passant (needs the previous move) plus structurally eligible
    /// castling. "Pseudo" because nothing here asks whether the mover's own
    /// king ends up in check — that is `legal_moves`' job, as is castling
    /// path safety.
    pub fn pseudo_legal_moves(&self, from: Position, last_move: Option<&Move>) -> Vec<Position> {
        let piece = match self.get(from) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let mut moves = self.raw_reach(from);

        if piece.kind == PieceType::Pawn {
            if let Some(target) = self.en_passant_square(from, piece, last_move) {
                moves.push(target);
            }
        }

        if piece.kind == PieceType::King && !piece.has_moved {
            // Kingside rook on col 7, queenside on col 0. The two-column
            // hop can fall off the board for odd fixture positions, so it
            // is clipped like everything else.
            for rook_col in [7usize, 0] {
                if self.castling_path_clear(from, piece.color, rook_col) {
                    let dest_col = if rook_col > from.col {
                        from.col as i32 + 2
                    } else {
                        from.col as i32 - 2
                    };
                    if Self::in_bounds(from.row as i32, dest_col) {
                        moves.push(Position::new(from.row, dest_col as usize));
                    }
                }
            }
        }

        moves
    }

    /// If the previous move was an enemy pawn double-step landing beside
    /// this pawn, the square diagonally behind it is capturable.
    fn en_passant_square(
        &self,
        from: Position,
        piece: Piece,
        last_move: Option<&Move>,
    ) -> Option<Position> {
        let last = last_move?;
        if last.piece.kind != PieceType::Pawn {
            return None;
        }
        let rank_delta = (last.from.row as i32 - last.to.row as i32).abs();
        let file_delta = (last.to.col as i32 - from.col as i32).abs();
        if rank_delta == 2 && last.to.row == from.row && file_delta == 1 {
            let behind = from.row as i32 + piece.color.forward();
            if Self::in_bounds(behind, last.to.col as i32) {
                return Some(Position::new(behind as usize, last.to.col));
            }
        }
        None
    }

    /// Structural castling eligibility: the corner rook is present, really a
    /// rook, same color, unmoved, and every square strictly between king and
    /// rook is empty. Whether the king is in check or crosses an attacked
    /// square is deliberately NOT asked here; the legality filter answers
    /// that, on boards where castling is not itself a generation candidate.
    fn castling_path_clear(&self, king: Position, color: Color, rook_col: usize) -> bool {
        let rook_ok = self.squares[king.row][rook_col]
            .map(|p| p.kind == PieceType::Rook && p.color == color && !p.has_moved)
            .unwrap_or(false);
        if !rook_ok {
            return false;
        }
        let (lo, hi) = if rook_col > king.col {
            (king.col, rook_col)
        } else {
            (rook_col, king.col)
        };
        ((lo + 1)..hi).all(|c| self.squares[king.row][c].is_none())
    }

    /// True iff any piece of `attacker` has `square` in its raw reach.
    pub fn is_square_attacked(&self, square: Position, attacker: Color) -> bool {
        for r in 0..8 {
            for c in 0..8 {
                if let Some(p) = self.squares[r][c] {
                    if p.color == attacker && self.raw_reach(Position::new(r, c)).contains(&square)
                    {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// A board with no king of `color` reports "not in check". That is a
    /// defensive default for malformed inputs, not a statement that a
    /// kingless position is safe.
    pub fn is_in_check(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(king) => self.is_square_attacked(king, color.opposite()),
            None => false,
        }
    }

    /// Play `from`→`to` on an independent copy and hand the copy back. The
    /// receiver is never touched. A pawn sliding diagonally onto an empty
    /// square is en passant, and the captured pawn sits beside the source
    /// square rather than on the destination.
    fn simulate(&self, from: Position, to: Position) -> Board {
        let mut next = self.clone();
        if let Some(piece) = next.get(from) {
            if piece.kind == PieceType::Pawn && to.col != from.col && next.get(to).is_none() {
                next.squares[from.row][to.col] = None;
            }
            next.set(to, Some(piece));
            next.set(from, None);
        }
        next
    }

    /// Pseudo-legal destinations filtered down to the ones that do not leave
    /// the mover's own king in check. Castling candidates (a king moving two
    /// columns) are additionally refused while in check or when the transit
    /// square is attacked; the landing square is covered by the ordinary
    /// simulation since the king ends up there.
    pub fn legal_moves(&self, from: Position, last_move: Option<&Move>) -> Vec<Position> {
        let piece = match self.get(from) {
            Some(p) => p,
            None => return Vec::new(),
        };
        let mut legal = Vec::new();
        for to in self.pseudo_legal_moves(from, last_move) {
            if piece.kind == PieceType::King && (to.col as i32 - from.col as i32).abs() == 2 {
                if self.is_in_check(piece.color) {
                    continue;
                }
                let transit = Position::new(from.row, (from.col + to.col) / 2);
                if self.simulate(from, transit).is_in_check(piece.color) {
                    continue;
                }
            }
            if !self.simulate(from, to).is_in_check(piece.color) {
                legal.push(to);
            }
        }
        legal
    }

    /// Every legal move for `side`, one entry per (piece, destination).
    /// This is what checkmate/stalemate detection counts: empty while in
    /// check is mate, empty while not is stalemate.
    pub fn all_legal_moves(&self, side: Color, last_move: Option<&Move>) -> Vec<MoveCandidate> {
        let mut moves = Vec::new();
        for r in 0..8 {
            for c in 0..8 {
                let from = Position::new(r, c);
                if let Some(piece) = self.get(from) {
                    if piece.color != side {
                        continue;
                    }
                    for to in self.legal_moves(from, last_move) {
                        moves.push(MoveCandidate { from, to, piece });
                    }
                }
            }
        }
        moves
    }
}
