use serde::{Deserialize, Serialize};

use crate::piece::{Piece, PieceType, Position};

/// A committed move as it lives in the history. Immutable once appended;
/// `piece` is the piece as it stood *before* the move, which is what both
/// notation and next-ply en passant context need.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub is_castling: bool,
    pub is_en_passant: bool,
    pub is_promotion: bool,
    pub promotion: Option<PieceType>,
    pub notation: String,
}

/// What the presentation layer submits for commitment. `promotion` is only
/// consulted when the move actually promotes.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct MoveRequest {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PieceType>,
}

impl MoveRequest {
    pub fn new(from: Position, to: Position) -> Self {
        MoveRequest { from, to, promotion: None }
    }

    /// Convert to UCI notation, e.g. "e2e4", "a7a8q"
    pub fn to_uci(&self) -> String {
        let fc = self.from.file_char();
        let fr = self.from.rank_char();
        let tc = self.to.file_char();
        let tr = self.to.rank_char();
        let promo = match self.promotion {
            Some(PieceType::Queen) => "q",
            Some(PieceType::Rook) => "r",
            Some(PieceType::Bishop) => "b",
            Some(PieceType::Knight) => "n",
            _ => "",
        };
        format!("{fc}{fr}{tc}{tr}{promo}")
    }

    /// Parse from UCI notation
    pub fn from_uci(s: &str) -> Option<MoveRequest> {
        let bytes = s.as_bytes();
        if bytes.len() < 4 {
            return None;
        }
        let fc = bytes[0].checked_sub(b'a')? as usize;
        let fr = b'8'.checked_sub(bytes[1])? as usize;
        let tc = bytes[2].checked_sub(b'a')? as usize;
        let tr = b'8'.checked_sub(bytes[3])? as usize;
        if fc >= 8 || fr >= 8 || tc >= 8 || tr >= 8 {
            return None;
        }
        let promotion = if bytes.len() > 4 {
            match bytes[4] {
                b'q' => Some(PieceType::Queen),
                b'r' => Some(PieceType::Rook),
                b'b' => Some(PieceType::Bishop),
                b'n' => Some(PieceType::Knight),
                _ => None,
            }
        } else {
            None
        };
        Some(MoveRequest {
            from: Position::new(fr, fc),
            to: Position::new(tr, tc),
            promotion,
        })
    }
}

/// One entry of a side-wide legal-move enumeration. Notation is absent on
/// purpose: it is only ever computed for moves that get committed.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct MoveCandidate {
    pub from: Position,
    pub to: Position,
    pub piece: Piece,
}

/// Render a committed move in algebraic notation. A king travelling two
/// columns is castling: "O-O" toward the h-file, "O-O-O" toward the a-file,
/// with no check/mate suffix even when one would apply (a known deviation
/// from standard notation, kept as-is). Pawn captures lead with the origin
/// file; other pieces lead with their letter.
pub fn san(
    from: Position,
    to: Position,
    piece: Piece,
    was_capture: bool,
    is_check: bool,
    is_mate: bool,
) -> String {
    if piece.kind == PieceType::King && (to.col as i32 - from.col as i32).abs() == 2 {
        return if to.col > from.col { "O-O".to_string() } else { "O-O-O".to_string() };
    }

    let mut out = String::new();
    out.push_str(piece.kind.letter());
    if was_capture {
        if piece.kind == PieceType::Pawn {
            out.push(from.file_char());
        }
        out.push('x');
    }
    out.push(to.file_char());
    out.push(to.rank_char());
    if is_mate {
        out.push('#');
    } else if is_check {
        out.push('+');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color;

    #[test]
    fn uci_round_trip_in_this_orientation() {
        // Row 6 col 4 is e2; row 4 col 4 is e4.
        let req = MoveRequest::new(Position::new(6, 4), Position::new(4, 4));
        assert_eq!(req.to_uci(), "e2e4");
        assert_eq!(MoveRequest::from_uci("e2e4"), Some(req));

        let promo = MoveRequest {
            from: Position::new(1, 0),
            to: Position::new(0, 0),
            promotion: Some(PieceType::Queen),
        };
        assert_eq!(promo.to_uci(), "a7a8q");
        assert_eq!(MoveRequest::from_uci("a7a8q"), Some(promo));
    }

    #[test]
    fn from_uci_rejects_garbage() {
        assert_eq!(MoveRequest::from_uci("e2"), None);
        assert_eq!(MoveRequest::from_uci("z9e4"), None);
    }

    #[test]
    fn pawn_capture_leads_with_origin_file() {
        let pawn = Piece::new(PieceType::Pawn, Color::White);
        // e5 pawn takes on d6.
        let s = san(Position::new(3, 4), Position::new(2, 3), pawn, true, false, false);
        assert_eq!(s, "exd6");
    }

    #[test]
    fn piece_moves_and_captures() {
        let knight = Piece::new(PieceType::Knight, Color::White);
        assert_eq!(
            san(Position::new(7, 6), Position::new(5, 5), knight, false, false, false),
            "Nf3"
        );
        let queen = Piece::new(PieceType::Queen, Color::White);
        assert_eq!(
            san(Position::new(3, 7), Position::new(1, 5), queen, true, false, true),
            "Qxf7#"
        );
        assert_eq!(
            san(Position::new(3, 7), Position::new(1, 5), queen, true, true, false),
            "Qxf7+"
        );
    }

    #[test]
    fn castling_notation_carries_no_check_suffix() {
        // Deviation kept from the source rules: even a castle that delivers
        // check or mate renders bare.
        let king = Piece::new(PieceType::King, Color::White);
        assert_eq!(
            san(Position::new(7, 4), Position::new(7, 6), king, false, true, false),
            "O-O"
        );
        assert_eq!(
            san(Position::new(7, 4), Position::new(7, 2), king, false, false, true),
            "O-O-O"
        );
    }
}
