// This file is part of the shako library.
// Copyright (C) 2017-2019 Niklas Fiekas <niklas.fiekas@backscattering.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

use std::error::Error;
use std::fmt;

use crate::movelist::MoveList;
use crate::square::Square;
use crate::types::{Black, Color, Move, Piece, Role, White};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1),
];

const BISHOP_DELTAS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

const ROOK_DELTAS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

const BACK_RANK: [Role; 8] = [
    Role::Rook, Role::Knight, Role::Bishop, Role::Queen,
    Role::King, Role::Bishop, Role::Knight, Role::Rook,
];

/// Castling rights of both sides, as a bitmask.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const WHITE_KING_SIDE: CastlingRights = CastlingRights(1);
    pub const WHITE_QUEEN_SIDE: CastlingRights = CastlingRights(2);
    pub const BLACK_KING_SIDE: CastlingRights = CastlingRights(4);
    pub const BLACK_QUEEN_SIDE: CastlingRights = CastlingRights(8);

    pub const EMPTY: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(15);

    #[inline]
    pub fn king_side(color: Color) -> CastlingRights {
        color.fold(CastlingRights::WHITE_KING_SIDE, CastlingRights::BLACK_KING_SIDE)
    }

    #[inline]
    pub fn queen_side(color: Color) -> CastlingRights {
        color.fold(CastlingRights::WHITE_QUEEN_SIDE, CastlingRights::BLACK_QUEEN_SIDE)
    }

    /// Both rights of the given side.
    #[inline]
    pub fn side(color: Color) -> CastlingRights {
        CastlingRights(CastlingRights::king_side(color).0 | CastlingRights::queen_side(color).0)
    }

    #[inline]
    pub fn contains(self, other: CastlingRights) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn add(&mut self, other: CastlingRights) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn discard(&mut self, other: CastlingRights) {
        self.0 &= !other.0;
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Error when a move cannot be played on the board.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PushError {
    /// There is no piece on the origin square.
    NoPieceToMove,
    /// Drops are not played on the board.
    UnsupportedDrop,
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PushError::NoPieceToMove => "no piece to move".fmt(f),
            PushError::UnsupportedDrop => "unsupported drop".fmt(f),
        }
    }
}

impl Error for PushError {}

/// Error when a UCI move cannot be applied: `InvalidUci` if the string does
/// not match the UCI grammar, `IllegalUci` if the move is not legal in the
/// position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UciError {
    InvalidUci,
    IllegalUci,
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            UciError::InvalidUci => "invalid uci".fmt(f),
            UciError::IllegalUci => "illegal uci".fmt(f),
        }
    }
}

impl Error for UciError {}

impl From<crate::types::InvalidUci> for UciError {
    fn from(_: crate::types::InvalidUci) -> UciError {
        UciError::InvalidUci
    }
}

/// An undo record: the played move, the captured piece, and a snapshot of
/// the state before the move.
#[derive(Clone, Debug)]
struct Undo {
    m: Move,
    capture: Option<Piece>,
    pieces: [Option<Piece>; 64],
    turn: Color,
    castling_rights: CastlingRights,
    ep_square: Option<Square>,
    halfmove_clock: u32,
    fullmoves: u32,
}

/// A chess board with full game state and a move stack.
///
/// Moves are applied with [`Board::push()`] and taken back with
/// [`Board::pop()`]. Pushing does not check legality; use
/// [`Board::legal_moves()`], [`Board::parse_san()`] or
/// [`Board::push_uci()`] to obtain legal moves.
///
/// # Example
///
/// ```
/// use shako::{Board, Square, White};
///
/// let mut board = Board::new();
/// board.push_uci("e2e4")?;
/// assert_eq!(board.piece_at(Square::E4), Some(White.pawn()));
///
/// board.pop();
/// assert_eq!(board.piece_at(Square::E4), None);
/// # Ok::<_, shako::UciError>(())
/// ```
#[derive(Debug)]
pub struct Board {
    pub(crate) pieces: [Option<Piece>; 64],
    pub(crate) turn: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) ep_square: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmoves: u32,
    stack: Vec<Undo>,
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}

impl Board {
    /// The standard initial position.
    pub fn new() -> Board {
        let mut board = Board::empty();
        for (file, &role) in BACK_RANK.iter().enumerate() {
            board.pieces[file] = Some(role.of(White));
            board.pieces[8 + file] = Some(White.pawn());
            board.pieces[48 + file] = Some(Black.pawn());
            board.pieces[56 + file] = Some(role.of(Black));
        }
        board.castling_rights = CastlingRights::ALL;
        board
    }

    /// An empty board with white to move and no castling rights.
    pub fn empty() -> Board {
        Board {
            pieces: [None; 64],
            turn: White,
            castling_rights: CastlingRights::EMPTY,
            ep_square: None,
            halfmove_clock: 0,
            fullmoves: 1,
            stack: Vec::new(),
        }
    }

    /// A structurally identical board with an empty move stack.
    pub fn copy(&self) -> Board {
        Board {
            pieces: self.pieces,
            turn: self.turn,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            halfmove_clock: self.halfmove_clock,
            fullmoves: self.fullmoves,
            stack: Vec::new(),
        }
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.pieces[usize::from(sq)]
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmoves(&self) -> u32 {
        self.fullmoves
    }

    /// Finds the king of the given side.
    pub fn king(&self, color: Color) -> Option<Square> {
        (0..64u8)
            .map(Square::new)
            .find(|&sq| self.pieces[usize::from(sq)] == Some(color.king()))
    }

    /// Plays a move without checking legality. The state before the move is
    /// recorded so that [`Board::pop()`] can take it back.
    ///
    /// Castling is given as the king moving two files; the rook moves along.
    /// A null move only advances the clocks and flips the turn.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::NoPieceToMove`] if the origin square is empty
    /// and [`PushError::UnsupportedDrop`] for drops. The board is left
    /// unchanged on error.
    pub fn push(&mut self, m: Move) -> Result<(), PushError> {
        let (from, to, promotion) = match m {
            Move::Put { .. } => return Err(PushError::UnsupportedDrop),
            Move::Null => {
                self.stack.push(self.undo_record(m, None));
                self.ep_square = None;
                self.halfmove_clock += 1;
                if self.turn.is_black() {
                    self.fullmoves += 1;
                }
                self.turn = !self.turn;
                return Ok(());
            }
            Move::Normal { from, to, promotion } => (from, to, promotion),
        };

        let piece = match self.pieces[usize::from(from)] {
            Some(piece) => piece,
            None => return Err(PushError::NoPieceToMove),
        };

        let dir: i8 = piece.color.fold(1, -1);
        let is_en_passant =
            piece.role == Role::Pawn && Some(to) == self.ep_square && from.file() != to.file();

        let capture = if is_en_passant {
            to.offset(0, -dir).and_then(|sq| self.pieces[usize::from(sq)])
        } else {
            self.pieces[usize::from(to)]
        };

        self.stack.push(self.undo_record(m, capture));

        if piece.role == Role::King {
            self.castling_rights.discard(CastlingRights::side(piece.color));
        }
        for sq in [from, to] {
            match sq {
                Square::A1 => self.castling_rights.discard(CastlingRights::WHITE_QUEEN_SIDE),
                Square::H1 => self.castling_rights.discard(CastlingRights::WHITE_KING_SIDE),
                Square::A8 => self.castling_rights.discard(CastlingRights::BLACK_QUEEN_SIDE),
                Square::H8 => self.castling_rights.discard(CastlingRights::BLACK_KING_SIDE),
                _ => (),
            }
        }

        self.pieces[usize::from(from)] = None;

        let is_castling =
            piece.role == Role::King && (from.file() as i8 - to.file() as i8).abs() == 2;

        if is_castling {
            let (rook_from, rook_to) = if to.file() > from.file() {
                (
                    piece.color.fold(Square::H1, Square::H8),
                    piece.color.fold(Square::F1, Square::F8),
                )
            } else {
                (
                    piece.color.fold(Square::A1, Square::A8),
                    piece.color.fold(Square::D1, Square::D8),
                )
            };
            if let Some(rook) = self.pieces[usize::from(rook_from)].take() {
                self.pieces[usize::from(rook_to)] = Some(rook);
            }
            self.pieces[usize::from(to)] = Some(piece);
        } else if is_en_passant {
            if let Some(victim) = to.offset(0, -dir) {
                self.pieces[usize::from(victim)] = None;
            }
            self.pieces[usize::from(to)] = Some(piece);
        } else if let Some(promotion) = promotion {
            self.pieces[usize::from(to)] = Some(promotion.of(piece.color));
        } else {
            self.pieces[usize::from(to)] = Some(piece);
        }

        self.ep_square =
            if piece.role == Role::Pawn && (from.rank() as i8 - to.rank() as i8).abs() == 2 {
                from.offset(0, dir)
            } else {
                None
            };

        if piece.role == Role::Pawn || capture.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if self.turn.is_black() {
            self.fullmoves += 1;
        }
        self.turn = !self.turn;

        Ok(())
    }

    /// Takes back the last pushed move, restoring every state field.
    /// Returns the move, or `None` if the stack is empty.
    pub fn pop(&mut self) -> Option<Move> {
        let undo = self.stack.pop()?;
        self.pieces = undo.pieces;
        self.turn = undo.turn;
        self.castling_rights = undo.castling_rights;
        self.ep_square = undo.ep_square;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmoves = undo.fullmoves;
        Some(undo.m)
    }

    /// The number of moves on the stack.
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    fn undo_record(&self, m: Move, capture: Option<Piece>) -> Undo {
        Undo {
            m,
            capture,
            pieces: self.pieces,
            turn: self.turn,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            halfmove_clock: self.halfmove_clock,
            fullmoves: self.fullmoves,
        }
    }

    /// Parses and plays a move in UCI notation, checking legality first.
    ///
    /// # Errors
    ///
    /// Returns [`UciError::InvalidUci`] if the string does not match the UCI
    /// grammar, [`UciError::IllegalUci`] if the move is not legal.
    pub fn push_uci(&mut self, uci: &str) -> Result<Move, UciError> {
        let m = Move::from_ascii(uci.as_bytes())?;
        if !m.is_null() && !self.legal_moves().contains(&m) {
            return Err(UciError::IllegalUci);
        }
        self.push(m).map_err(|_| UciError::IllegalUci)?;
        Ok(m)
    }

    /// Generates all legal moves for the side to move.
    pub fn legal_moves(&self) -> MoveList {
        let mut moves = self.pseudo_legal_moves();
        moves.retain(|m| self.keeps_king_safe(*m));
        moves
    }

    /// Generates moves following the piece movement rules, including moves
    /// that leave the own king in check.
    pub fn pseudo_legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        for index in 0..64u8 {
            let from = Square::new(index);
            let piece = match self.pieces[usize::from(from)] {
                Some(piece) if piece.color == self.turn => piece,
                _ => continue,
            };
            match piece.role {
                Role::Pawn => self.pawn_moves(from, &mut moves),
                Role::Knight => self.leaper_moves(from, &KNIGHT_DELTAS, &mut moves),
                Role::Bishop => self.slider_moves(from, &BISHOP_DELTAS, &mut moves),
                Role::Rook => self.slider_moves(from, &ROOK_DELTAS, &mut moves),
                Role::Queen => {
                    self.slider_moves(from, &BISHOP_DELTAS, &mut moves);
                    self.slider_moves(from, &ROOK_DELTAS, &mut moves);
                }
                Role::King => self.leaper_moves(from, &KING_DELTAS, &mut moves),
            }
        }
        self.castling_moves(&mut moves);
        moves
    }

    /// Tests if the move is a castling move: the king stepping two files.
    pub fn is_castling(&self, m: &Move) -> bool {
        match *m {
            Move::Normal { from, to, .. } => {
                self.pieces[usize::from(from)].map_or(false, |p| p.role == Role::King)
                    && (from.file() as i8 - to.file() as i8).abs() == 2
            }
            _ => false,
        }
    }

    fn pawn_moves(&self, from: Square, moves: &mut MoveList) {
        let color = self.turn;
        let dir = color.fold(1, -1);

        if let Some(to) = from.offset(0, dir) {
            if self.pieces[usize::from(to)].is_none() {
                push_pawn_move(color, from, to, moves);
                if from.rank() == color.fold(1, 6) {
                    if let Some(to) = from.offset(0, 2 * dir) {
                        if self.pieces[usize::from(to)].is_none() {
                            moves.push(Move::Normal { from, to, promotion: None });
                        }
                    }
                }
            }
        }

        for file_delta in [-1, 1] {
            if let Some(to) = from.offset(file_delta, dir) {
                let target = self.pieces[usize::from(to)];
                if target.map_or(false, |p| p.color != color) || Some(to) == self.ep_square {
                    push_pawn_move(color, from, to, moves);
                }
            }
        }
    }

    fn leaper_moves(&self, from: Square, deltas: &[(i8, i8)], moves: &mut MoveList) {
        for &(df, dr) in deltas {
            if let Some(to) = from.offset(df, dr) {
                if self.pieces[usize::from(to)].map_or(true, |p| p.color != self.turn) {
                    moves.push(Move::Normal { from, to, promotion: None });
                }
            }
        }
    }

    fn slider_moves(&self, from: Square, deltas: &[(i8, i8)], moves: &mut MoveList) {
        for &(df, dr) in deltas {
            let mut to = from;
            while let Some(next) = to.offset(df, dr) {
                to = next;
                match self.pieces[usize::from(to)] {
                    None => moves.push(Move::Normal { from, to, promotion: None }),
                    Some(p) => {
                        if p.color != self.turn {
                            moves.push(Move::Normal { from, to, promotion: None });
                        }
                        break;
                    }
                }
            }
        }
    }

    // The through-check rule is enforced here. The destination square is
    // covered by the regular legality filter.
    fn castling_moves(&self, moves: &mut MoveList) {
        let color = self.turn;
        let them = !color;
        let king_from = color.fold(Square::E1, Square::E8);

        if self.pieces[usize::from(king_from)] != Some(color.king()) {
            return;
        }

        if self.castling_rights.contains(CastlingRights::king_side(color)) {
            let rook_from = color.fold(Square::H1, Square::H8);
            let f = color.fold(Square::F1, Square::F8);
            let g = color.fold(Square::G1, Square::G8);
            if self.pieces[usize::from(rook_from)] == Some(color.rook())
                && self.pieces[usize::from(f)].is_none()
                && self.pieces[usize::from(g)].is_none()
                && !self.is_attacked(king_from, them)
                && !self.is_attacked(f, them)
            {
                moves.push(Move::Normal { from: king_from, to: g, promotion: None });
            }
        }

        if self.castling_rights.contains(CastlingRights::queen_side(color)) {
            let rook_from = color.fold(Square::A1, Square::A8);
            let d = color.fold(Square::D1, Square::D8);
            let c = color.fold(Square::C1, Square::C8);
            let b = color.fold(Square::B1, Square::B8);
            if self.pieces[usize::from(rook_from)] == Some(color.rook())
                && self.pieces[usize::from(d)].is_none()
                && self.pieces[usize::from(c)].is_none()
                && self.pieces[usize::from(b)].is_none()
                && !self.is_attacked(king_from, them)
                && !self.is_attacked(d, them)
            {
                moves.push(Move::Normal { from: king_from, to: c, promotion: None });
            }
        }
    }

    fn keeps_king_safe(&self, m: Move) -> bool {
        let mut after = self.copy();
        if after.push(m).is_err() {
            return false;
        }
        match after.king(self.turn) {
            Some(king) => !after.is_attacked(king, after.turn),
            None => true,
        }
    }

    /// Tests if the given side attacks the square.
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        for &(df, dr) in &KNIGHT_DELTAS {
            if let Some(from) = sq.offset(df, dr) {
                if self.pieces[usize::from(from)] == Some(by.knight()) {
                    return true;
                }
            }
        }

        for &(df, dr) in &KING_DELTAS {
            if let Some(from) = sq.offset(df, dr) {
                if self.pieces[usize::from(from)] == Some(by.king()) {
                    return true;
                }
            }
        }

        let dir = by.fold(1, -1);
        for file_delta in [-1, 1] {
            if let Some(from) = sq.offset(file_delta, -dir) {
                if self.pieces[usize::from(from)] == Some(by.pawn()) {
                    return true;
                }
            }
        }

        self.ray_attack(sq, by, &BISHOP_DELTAS, Role::Bishop)
            || self.ray_attack(sq, by, &ROOK_DELTAS, Role::Rook)
    }

    fn ray_attack(&self, sq: Square, by: Color, deltas: &[(i8, i8)], slider: Role) -> bool {
        for &(df, dr) in deltas {
            let mut from = sq;
            while let Some(next) = from.offset(df, dr) {
                from = next;
                if let Some(piece) = self.pieces[usize::from(from)] {
                    if piece.color == by && (piece.role == slider || piece.role == Role::Queen) {
                        return true;
                    }
                    break;
                }
            }
        }
        false
    }

    /// Tests if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.king(self.turn)
            .map_or(false, |king| self.is_attacked(king, !self.turn))
    }

    /// Tests for checkmate: in check with no legal move.
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.legal_moves().is_empty()
    }

    /// Tests for stalemate: not in check, but no legal move.
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.legal_moves().is_empty()
    }

    /// Tests if the game is over: no legal moves, or the halfmove clock has
    /// reached 100 plies.
    pub fn is_game_over(&self) -> bool {
        self.legal_moves().is_empty() || self.halfmove_clock >= 100
    }

    /// Tests if neither side can force checkmate: no pawns, rooks or
    /// queens, and at most one minor piece on the board.
    pub fn has_insufficient_material(&self) -> bool {
        let mut minors = 0;
        for piece in self.pieces.iter().flatten() {
            match piece.role {
                Role::Pawn | Role::Rook | Role::Queen => return false,
                Role::Knight | Role::Bishop => minors += 1,
                Role::King => (),
            }
        }
        minors <= 1
    }
}

fn push_pawn_move(color: Color, from: Square, to: Square, moves: &mut MoveList) {
    if to.rank() == color.fold(7, 0) {
        for role in [Role::Queen, Role::Rook, Role::Bishop, Role::Knight] {
            moves.push(Move::Normal { from, to, promotion: Some(role) });
        }
    } else {
        moves.push(Move::Normal { from, to, promotion: None });
    }
}
