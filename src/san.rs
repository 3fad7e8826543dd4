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

//! Read and write Standard Algebraic Notation.
//!
//! # Examples
//!
//! Parse and write SANs:
//!
//! ```
//! use shako::san::San;
//!
//! let san: San = "Nf3".parse().expect("valid san");
//! assert_eq!(san.to_string(), "Nf3");
//! ```
//!
//! Converting to a move in the context of a position:
//!
//! ```
//! use shako::{Board, Move, Square};
//! use shako::san::San;
//!
//! let board = Board::new();
//! let san: San = "Nf3".parse().expect("valid san");
//! let m = san.to_move(&board).expect("legal move");
//!
//! assert_eq!(m, Move::Normal {
//!     from: Square::G1,
//!     to: Square::F3,
//!     promotion: None,
//! });
//! ```
//!
//! Back to a (possibly disambiguated) SAN with check suffix:
//!
//! ```
//! use shako::Board;
//!
//! let mut board = Board::new();
//! let m = board.parse_san("Nf3").expect("legal san");
//! assert_eq!(board.san(&m), "Nf3");
//! ```

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use crate::board::Board;
use crate::square::Square;
use crate::types::{Move, Role};

/// Error when parsing a syntactically invalid SAN.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidSan;

impl fmt::Display for InvalidSan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "invalid san".fmt(f)
    }
}

impl Error for InvalidSan {}

/// `IllegalSan` when no legal move matches, `AmbiguousSan` when more than
/// one does.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SanError {
    IllegalSan,
    AmbiguousSan,
}

impl fmt::Display for SanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SanError::IllegalSan => "illegal san".fmt(f),
            SanError::AmbiguousSan => "ambiguous san".fmt(f),
        }
    }
}

impl Error for SanError {}

/// A move in Standard Algebraic Notation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum San {
    Normal {
        role: Role,
        file: Option<u8>,
        rank: Option<u8>,
        capture: bool,
        to: Square,
        promotion: Option<Role>,
    },
    CastleShort,
    CastleLong,
    Put { role: Role, to: Square },
    Null,
}

impl FromStr for San {
    type Err = InvalidSan;

    /// Parses a SAN, tolerating trailing `+`, `#`, `!` and `?` decorations
    /// and accepting `0-0`, `0-0-0`, `--` and `Z0`.
    fn from_str(san: &str) -> Result<San, InvalidSan> {
        let san = san.trim_end_matches(|ch| matches!(ch, '+' | '#' | '!' | '?'));

        if san == "--" || san == "Z0" {
            Ok(San::Null)
        } else if san == "O-O" || san == "0-0" {
            Ok(San::CastleShort)
        } else if san == "O-O-O" || san == "0-0-0" {
            Ok(San::CastleLong)
        } else if let Some(sep) = san.find('@') {
            if sep == 0 {
                Ok(San::Put { role: Role::Pawn, to: san[1..].parse().map_err(|_| InvalidSan)? })
            } else if sep == 1 {
                Ok(San::Put {
                    role: san
                        .chars()
                        .next()
                        .and_then(Role::from_char)
                        .ok_or(InvalidSan)?,
                    to: san[2..].parse().map_err(|_| InvalidSan)?,
                })
            } else {
                Err(InvalidSan)
            }
        } else {
            let mut chars = san.chars();

            let (role, next) = {
                let ch = chars.next().ok_or(InvalidSan)?;
                if ch.is_ascii_uppercase() {
                    (Role::from_char(ch).ok_or(InvalidSan)?, chars.next().ok_or(InvalidSan)?)
                } else {
                    (Role::Pawn, ch)
                }
            };

            let (file, next) = if ('a'..='h').contains(&next) {
                (Some(next as u8 - b'a'), chars.next().ok_or(InvalidSan)?)
            } else {
                (None, next)
            };

            let (rank, next) = if ('1'..='8').contains(&next) {
                (Some(next as u8 - b'1'), chars.next())
            } else {
                (None, Some(next))
            };

            // The pieces collected so far may be the origin or already the
            // destination.
            let (capture, file, rank, to, next) = match next {
                Some('x') => {
                    let to_file = chars.next().filter(|c| ('a'..='h').contains(c)).ok_or(InvalidSan)?;
                    let to_rank = chars.next().filter(|c| ('1'..='8').contains(c)).ok_or(InvalidSan)?;
                    let to = Square::from_coords(to_file as u8 - b'a', to_rank as u8 - b'1')
                        .ok_or(InvalidSan)?;
                    (true, file, rank, to, chars.next())
                }
                Some('=') => {
                    let to = Square::from_coords(file.ok_or(InvalidSan)?, rank.ok_or(InvalidSan)?)
                        .ok_or(InvalidSan)?;
                    (false, None, None, to, Some('='))
                }
                Some(to_file) if ('a'..='h').contains(&to_file) => {
                    let to_rank = chars.next().filter(|c| ('1'..='8').contains(c)).ok_or(InvalidSan)?;
                    let to = Square::from_coords(to_file as u8 - b'a', to_rank as u8 - b'1')
                        .ok_or(InvalidSan)?;
                    (false, file, rank, to, chars.next())
                }
                Some(_) => return Err(InvalidSan),
                None => {
                    let to = Square::from_coords(file.ok_or(InvalidSan)?, rank.ok_or(InvalidSan)?)
                        .ok_or(InvalidSan)?;
                    (false, None, None, to, None)
                }
            };

            let promotion = match next {
                Some('=') => Some(
                    chars
                        .next()
                        .and_then(Role::from_char)
                        .filter(|role| *role != Role::Pawn && *role != Role::King)
                        .ok_or(InvalidSan)?,
                ),
                Some(_) => return Err(InvalidSan),
                None => None,
            };

            if chars.next().is_some() {
                return Err(InvalidSan);
            }

            Ok(San::Normal { role, file, rank, capture, to, promotion })
        }
    }
}

impl fmt::Display for San {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            San::Normal { role, file, rank, capture, to, promotion } => {
                if role != Role::Pawn {
                    write!(f, "{}", role.upper_char())?;
                }
                if let Some(file) = file {
                    write!(f, "{}", (b'a' + file) as char)?;
                }
                if let Some(rank) = rank {
                    write!(f, "{}", (b'1' + rank) as char)?;
                }
                if capture {
                    f.write_str("x")?;
                }
                write!(f, "{}", to)?;
                if let Some(promotion) = promotion {
                    write!(f, "={}", promotion.upper_char())?;
                }
                Ok(())
            }
            San::CastleShort => f.write_str("O-O"),
            San::CastleLong => f.write_str("O-O-O"),
            San::Put { role: Role::Pawn, to } => write!(f, "@{}", to),
            San::Put { role, to } => write!(f, "{}@{}", role.upper_char(), to),
            San::Null => f.write_str("--"),
        }
    }
}

impl San {
    /// Tries to convert the `San` to a move in the context of a position.
    ///
    /// Null moves and drops convert without consulting the move generator;
    /// whether the board can actually play them is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns [`SanError::IllegalSan`] if no legal move matches and
    /// [`SanError::AmbiguousSan`] if the notation underspecifies between
    /// several legal moves.
    pub fn to_move(&self, board: &Board) -> Result<Move, SanError> {
        let mut legals = board.legal_moves();

        match *self {
            San::Normal { role, file, rank, capture: _, to, promotion } => legals.retain(|m| {
                match *m {
                    Move::Normal { from, to: t, promotion: p } => {
                        board.piece_at(from).map_or(false, |piece| piece.role == role)
                            && !board.is_castling(m)
                            && file.map_or(true, |f| f == from.file())
                            && rank.map_or(true, |r| r == from.rank())
                            && to == t
                            && promotion == p
                    }
                    _ => false,
                }
            }),
            San::CastleShort => legals.retain(|m| {
                board.is_castling(m)
                    && m.to().map_or(false, |to| m.from().map_or(false, |from| from.file() < to.file()))
            }),
            San::CastleLong => legals.retain(|m| {
                board.is_castling(m)
                    && m.to().map_or(false, |to| m.from().map_or(false, |from| to.file() < from.file()))
            }),
            San::Put { role, to } => return Ok(Move::Put { role, to }),
            San::Null => return Ok(Move::Null),
        }

        legals
            .split_first()
            .map_or(Err(SanError::IllegalSan), |(m, others)| {
                if others.is_empty() {
                    Ok(*m)
                } else {
                    Err(SanError::AmbiguousSan)
                }
            })
    }

    /// Converts a move to Standard Algebraic Notation, disambiguating
    /// against the other legal moves in the position.
    pub fn from_move(board: &Board, m: &Move) -> San {
        let (from, to, promotion) = match *m {
            Move::Null => return San::Null,
            Move::Put { role, to } => return San::Put { role, to },
            Move::Normal { from, to, promotion } => (from, to, promotion),
        };

        let role = match board.piece_at(from) {
            Some(piece) => piece.role,
            None => return San::Null,
        };

        if board.is_castling(m) {
            return if from.file() < to.file() { San::CastleShort } else { San::CastleLong };
        }

        if role == Role::Pawn {
            let capture = board.piece_at(to).is_some() || from.file() != to.file();
            return San::Normal {
                role,
                file: Some(from.file()).filter(|_| capture),
                rank: None,
                capture,
                to,
                promotion,
            };
        }

        // Disambiguate against other legal moves of the same role to the
        // same destination. A mover on the same file forces the rank; the
        // file is needed only for a mover on the same rank, or when no
        // same-file mover makes the rank sufficient.
        let mut any_other = false;
        let mut same_file = false;
        let mut same_rank = false;
        for candidate in board.legal_moves() {
            let other = match candidate {
                Move::Normal { from: other, to: t, .. }
                    if t == to
                        && other != from
                        && board.piece_at(other).map_or(false, |p| p.role == role)
                        && !board.is_castling(&candidate) =>
                {
                    other
                }
                _ => continue,
            };
            any_other = true;
            if other.file() == from.file() {
                same_file = true;
            }
            if other.rank() == from.rank() {
                same_rank = true;
            }
        }

        let need_rank = same_file;
        let need_file = same_rank || (any_other && !same_file);

        San::Normal {
            role,
            file: Some(from.file()).filter(|_| need_file),
            rank: Some(from.rank()).filter(|_| need_rank),
            capture: board.piece_at(to).is_some(),
            to,
            promotion,
        }
    }
}

/// A [`San`] and possible check or checkmate suffix.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SanPlus {
    pub san: San,
    pub check: bool,
    pub checkmate: bool,
}

impl FromStr for SanPlus {
    type Err = InvalidSan;

    fn from_str(san: &str) -> Result<SanPlus, InvalidSan> {
        let stripped = san.trim_end_matches(|ch| matches!(ch, '!' | '?'));
        San::from_str(stripped).map(|result| SanPlus {
            san: result,
            checkmate: stripped.ends_with('#'),
            check: stripped.ends_with('+'),
        })
    }
}

impl fmt::Display for SanPlus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.checkmate {
            write!(f, "{}#", self.san)
        } else if self.check {
            write!(f, "{}+", self.san)
        } else {
            write!(f, "{}", self.san)
        }
    }
}

impl SanPlus {
    /// Converts a move to SAN including a possible `+` or `#` suffix for
    /// the resulting position.
    pub fn from_move(board: &Board, m: &Move) -> SanPlus {
        let san = San::from_move(board, m);
        let mut after = board.copy();
        let (check, checkmate) = if after.push(*m).is_ok() {
            if after.is_checkmate() {
                (false, true)
            } else {
                (after.is_check(), false)
            }
        } else {
            (false, false)
        };
        SanPlus { san, check, checkmate }
    }
}

impl Board {
    /// The canonical SAN for a move legal in this position, including
    /// disambiguation, capture marker, promotion suffix, and a `+` or `#`
    /// suffix for the resulting position.
    pub fn san(&self, m: &Move) -> String {
        SanPlus::from_move(self, m).to_string()
    }

    /// Converts SAN text to a legal move in this position.
    ///
    /// # Errors
    ///
    /// Returns [`SanError::IllegalSan`] for unreadable notation and
    /// notation that matches no legal move, [`SanError::AmbiguousSan`]
    /// when several legal moves match.
    pub fn parse_san(&self, san: &str) -> Result<Move, SanError> {
        let san: San = san.parse().map_err(|_| SanError::IllegalSan)?;
        san.to_move(self)
    }

    /// Parses and plays a move in SAN notation. Returns the played move.
    pub fn push_san(&mut self, san: &str) -> Result<Move, SanError> {
        let m = self.parse_san(san)?;
        self.push(m).map_err(|_| SanError::IllegalSan)?;
        Ok(m)
    }
}
