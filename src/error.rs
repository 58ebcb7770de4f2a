//! Error types shared by the parser, the interactive game and the solver.
use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

use crate::engine::MAX_SIZE;

/// Reasons a bookcase description can be rejected by [`crate::utils::parse_bookcase`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input has no header line at all.
    #[error("missing \"<rows> <columns>\" header line")]
    MissingHeader,
    /// The header line is not two unsigned integers.
    #[error("malformed header line {0:?}, expected \"<rows> <columns>\"")]
    MalformedHeader(String),
    /// Rows or columns are zero or larger than [`MAX_SIZE`].
    #[error("bookcase size {rows}x{columns} is out of range (1..={max} each)", max = MAX_SIZE)]
    SizeOutOfRange { rows: usize, columns: usize },
    /// Fewer row lines than announced in the header.
    #[error("expected {expected} rows, found {found}")]
    MissingRow { expected: usize, found: usize },
    /// A row line does not have exactly `columns` characters.
    #[error("row {row} has {found} characters (expected {expected})")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A character outside the book alphabet.
    #[error("unrecognized character '{ch}' in row {row} col {col}")]
    UnknownBook { ch: char, row: usize, col: usize },
    /// A book appears to the right of an empty cell.
    #[error("book '{ch}' after an empty cell in row {row} col {col}")]
    BookAfterGap { ch: char, row: usize, col: usize },
}

/// Why a move requested by a player cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("row {0} is outside the bookcase")]
    RowOutOfRange(usize),
    #[error("source and destination are both row {0}")]
    SameRow(usize),
    #[error("row {0} has no book to move")]
    EmptySource(usize),
    #[error("row {0} is full")]
    FullDestination(usize),
}

/// Failures of the breadth-first search itself.
///
/// Running out of levels or states is not an error; see
/// [`crate::solver::SearchOutcome`].
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("could not grow the search history: {0}")]
    Allocation(#[from] TryReserveError),
    #[error("could not write the report: {0}")]
    Io(#[from] io::Error),
}
