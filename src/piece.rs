use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Pawn advance direction as a row delta. Row 0 is black's back rank,
    /// so white pawns march toward decreasing row.
    pub fn forward(&self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// The row a pawn of this color promotes on.
    pub fn promotion_row(&self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// SAN letter for the piece; pawns have none.
    pub fn letter(&self) -> &'static str {
        match self {
            PieceType::Pawn => "",
            PieceType::Knight => "N",
            PieceType::Bishop => "B",
            PieceType::Rook => "R",
            PieceType::Queen => "Q",
            PieceType::King => "K",
        }
    }
}

/// Square coordinate. Both components are in 0..8 for any position that
/// refers to a real square; row 0 is rank 8, col 0 is the a-file.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.col as u8) as char
    }

    pub fn rank_char(&self) -> char {
        (b'8' - self.row as u8) as char
    }
}

static NEXT_PIECE_ID: AtomicU32 = AtomicU32::new(0);

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    /// Unique per piece instance. Only the UI cares about this (sprite
    /// continuity across moves); the rules never read it.
    pub id: u32,
    pub kind: PieceType,
    pub color: Color,
    /// Set once, on the piece's first relocation (castling rooks included).
    /// Gates the pawn double-step and castling eligibility.
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceType, color: Color) -> Self {
        Piece {
            id: NEXT_PIECE_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            color,
            has_moved: false,
        }
    }
}
