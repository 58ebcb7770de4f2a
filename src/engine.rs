//! Core puzzle model for the bookcase sorting puzzle.
//!
//! This module defines:
//! - `Book`: one cell of a shelf, either a colored book or empty.
//! - `Bookcase`: a grid of left-packed shelves, with move generation and the goal test.
//! - `Move`: relocation of the rightmost book of one row onto another row.
//! - `Game`: an interactive session with undo, used by the `bookcase_player` binary.
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;

use crate::error::MoveError;

/// Represents the content of one cell of the bookcase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Book {
    /// An empty slot. Only allowed to the right of every book in its row.
    Empty,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

/// Number of distinct book colors (everything but `Book::Empty`).
pub const COLOR_COUNT: usize = 8;

/// All book colors, in the order used for tallies and random generation.
pub const COLORS: [Book; COLOR_COUNT] = [
    Book::Black,
    Book::Red,
    Book::Green,
    Book::Yellow,
    Book::Blue,
    Book::Magenta,
    Book::Cyan,
    Book::White,
];

impl Book {
    /// Converts the book to the character used in puzzle files.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookcase_solver::engine::Book;
    /// assert_eq!(Book::Red.to_char(), 'R');
    /// assert_eq!(Book::Empty.to_char(), '.');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Book::Empty => '.',
            Book::Black => 'K',
            Book::Red => 'R',
            Book::Green => 'G',
            Book::Yellow => 'Y',
            Book::Blue => 'B',
            Book::Magenta => 'M',
            Book::Cyan => 'C',
            Book::White => 'W',
        }
    }

    /// Inverse of [`Book::to_char`]. Returns `None` for characters outside `KRGYBMCW.`.
    pub fn from_char(ch: char) -> Option<Book> {
        match ch {
            '.' => Some(Book::Empty),
            'K' => Some(Book::Black),
            'R' => Some(Book::Red),
            'G' => Some(Book::Green),
            'Y' => Some(Book::Yellow),
            'B' => Some(Book::Blue),
            'M' => Some(Book::Magenta),
            'C' => Some(Book::Cyan),
            'W' => Some(Book::White),
            _ => None,
        }
    }

    /// Position of this color in [`COLORS`], `None` for `Book::Empty`.
    pub fn color_index(&self) -> Option<usize> {
        COLORS.iter().position(|c| c == self)
    }

    /// Returns the ANSI background color code for terminal output.
    fn to_ansi_color_code(&self) -> &'static str {
        match self {
            Book::Empty => "49",
            Book::Black => "100",
            Book::Red => "41",
            Book::Green => "42",
            Book::Yellow => "43",
            Book::Blue => "44",
            Book::Magenta => "45",
            Book::Cyan => "46",
            Book::White => "47",
        }
    }
}

/// Largest number of rows, and of columns, a bookcase may have.
pub const MAX_SIZE: usize = 9;

/// Moves the rightmost book of row `from` to the first free slot of row `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// How many rows each color is the row-color of, and how many of those rows
/// still have free slots.
///
/// Produced by [`Bookcase::row_colors`]; each call builds a fresh tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorTally {
    counts: [usize; COLOR_COUNT],
    partial: [usize; COLOR_COUNT],
}

impl ColorTally {
    fn record(&mut self, book: Book, full: bool) {
        if let Some(idx) = book.color_index() {
            self.counts[idx] += 1;
            if !full {
                self.partial[idx] += 1;
            }
        }
    }

    /// Number of rows whose color is `book`. Always 0 for `Book::Empty`.
    pub fn rows_of(&self, book: Book) -> usize {
        book.color_index().map_or(0, |idx| self.counts[idx])
    }

    /// True when no color is spread over two or more rows.
    pub fn is_unique(&self) -> bool {
        self.counts.iter().all(|&n| n <= 1)
    }

    /// True when every color sits on a single row, or only on full rows.
    ///
    /// A color with more books than one row can hold has to span several rows;
    /// that is sorted as long as none of them has room left.
    pub fn is_sorted(&self) -> bool {
        self.counts
            .iter()
            .zip(&self.partial)
            .all(|(&rows, &partial)| rows <= 1 || partial == 0)
    }
}

/// One configuration of the puzzle: `rows` shelves of `columns` slots each.
///
/// Cells outside `rows x columns` are always `Book::Empty`, so two bookcases
/// of the same size compare and hash equal exactly when their visible grids match.
/// Every row is left-packed: its books form a contiguous prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bookcase {
    rows: usize,
    columns: usize,
    grid: [[Book; MAX_SIZE]; MAX_SIZE],
}

impl Bookcase {
    /// Creates a bookcase of the given size with every slot empty.
    ///
    /// # Panics
    /// Panics if `rows` or `columns` is 0 or greater than [`MAX_SIZE`].
    ///
    /// # Examples
    /// ```
    /// use bookcase_solver::engine::{Book, Bookcase};
    /// let bookcase = Bookcase::new_empty(3, 4);
    /// assert_eq!(bookcase.get_book(2, 3), Book::Empty);
    /// assert!(bookcase.is_solved());
    /// ```
    pub fn new_empty(rows: usize, columns: usize) -> Self {
        assert!(
            (1..=MAX_SIZE).contains(&rows) && (1..=MAX_SIZE).contains(&columns),
            "bookcase size {}x{} out of range",
            rows,
            columns
        );
        Bookcase {
            rows,
            columns,
            grid: [[Book::Empty; MAX_SIZE]; MAX_SIZE],
        }
    }

    /// Creates a random left-packed bookcase using the first `colors` entries of [`COLORS`].
    ///
    /// Each row gets a random fill level between 0 and `columns`, and each book a random
    /// color. The same seed always yields the same bookcase. The result is not
    /// guaranteed to be solvable.
    ///
    /// # Panics
    /// Panics if the size is out of range or `colors` is not in `1..=COLOR_COUNT`.
    pub fn new_random_with_seed(rows: usize, columns: usize, colors: usize, seed: u64) -> Self {
        assert!(
            (1..=COLOR_COUNT).contains(&colors),
            "color count {} out of range",
            colors
        );
        let mut bookcase = Bookcase::new_empty(rows, columns);
        let mut rng = SmallRng::seed_from_u64(seed);

        for r in 0..rows {
            let fill = rng.gen_range(0..=columns);
            for c in 0..fill {
                bookcase.grid[r][c] = COLORS[rng.gen_range(0..colors)];
            }
        }
        bookcase
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Returns the book at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if `r` or `c` is not below [`MAX_SIZE`].
    pub fn get_book(&self, r: usize, c: usize) -> Book {
        self.grid[r][c]
    }

    /// Overwrites one cell. Callers are responsible for keeping rows left-packed.
    pub(crate) fn set_book(&mut self, r: usize, c: usize, book: Book) {
        self.grid[r][c] = book;
    }

    /// The visible cells of row `r`.
    pub fn row(&self, r: usize) -> &[Book] {
        &self.grid[r][..self.columns]
    }

    /// Number of books on row `r`, which is also the index of its first free slot.
    pub fn fill_level(&self, r: usize) -> usize {
        self.row(r)
            .iter()
            .position(|&b| b == Book::Empty)
            .unwrap_or(self.columns)
    }

    /// True when every row's books form a contiguous prefix.
    pub fn is_left_packed(&self) -> bool {
        (0..self.rows).all(|r| {
            let fill = self.fill_level(r);
            self.row(r)[fill..].iter().all(|&b| b == Book::Empty)
        })
    }

    /// Lists every legal move, ordered by source row and then destination row.
    ///
    /// A move from row `j` to row `k` is legal when `j != k`, row `j` holds at least
    /// one book and row `k` has a free slot. There are at most `rows * (rows - 1)`.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for from in 0..self.rows {
            if self.fill_level(from) == 0 {
                continue;
            }
            for to in 0..self.rows {
                if from == to || self.fill_level(to) == self.columns {
                    continue;
                }
                moves.push(Move { from, to });
            }
        }
        moves
    }

    /// Swaps the last book of `mv.from` with the first free slot of `mv.to`.
    /// The move must already be known to be legal.
    fn swap_for_move(&mut self, mv: Move) {
        let x_a = self.fill_level(mv.from) - 1;
        let x_b = self.fill_level(mv.to);
        let book_a = self.grid[mv.from][x_a];
        let book_b = self.grid[mv.to][x_b];
        self.grid[mv.from][x_a] = book_b;
        self.grid[mv.to][x_b] = book_a;
    }

    /// Applies a player-chosen move after checking that it is legal.
    ///
    /// # Examples
    /// ```
    /// use bookcase_solver::engine::{Book, Move};
    /// use bookcase_solver::utils::bookcase_from_str_array;
    ///
    /// let mut bookcase = bookcase_from_str_array(&["RG", "R."]).unwrap();
    /// bookcase.apply_move(Move { from: 0, to: 1 }).unwrap();
    /// assert_eq!(bookcase.get_book(1, 1), Book::Green);
    /// assert!(bookcase.apply_move(Move { from: 0, to: 0 }).is_err());
    /// ```
    pub fn apply_move(&mut self, mv: Move) -> Result<(), MoveError> {
        for row in [mv.from, mv.to] {
            if row >= self.rows {
                return Err(MoveError::RowOutOfRange(row));
            }
        }
        if mv.from == mv.to {
            return Err(MoveError::SameRow(mv.from));
        }
        if self.fill_level(mv.from) == 0 {
            return Err(MoveError::EmptySource(mv.from));
        }
        if self.fill_level(mv.to) == self.columns {
            return Err(MoveError::FullDestination(mv.to));
        }
        self.swap_for_move(mv);
        Ok(())
    }

    /// Every configuration reachable in one move, paired with the move that produced it.
    pub fn successors(&self) -> Vec<(Move, Bookcase)> {
        self.legal_moves()
            .into_iter()
            .map(|mv| (mv, self.after_move(mv)))
            .collect()
    }

    /// The bookcase reached by a move already known to be legal.
    pub(crate) fn after_move(&self, mv: Move) -> Bookcase {
        let mut child = self.clone();
        child.swap_for_move(mv);
        child
    }

    /// Tallies the row-color of every non-empty row.
    ///
    /// Returns `None` as soon as a row holds two different colors.
    pub fn row_colors(&self) -> Option<ColorTally> {
        let mut tally = ColorTally::default();
        for r in 0..self.rows {
            let mut row_color = Book::Empty;
            for &book in self.row(r) {
                if book == Book::Empty {
                    break;
                }
                if row_color == Book::Empty {
                    row_color = book;
                }
                if book != row_color {
                    return None;
                }
            }
            tally.record(row_color, self.fill_level(r) == self.columns);
        }
        Some(tally)
    }

    /// The goal test: every row is monochrome and no color is split over two rows,
    /// unless all the rows it fills are full.
    ///
    /// # Examples
    /// ```
    /// use bookcase_solver::utils::bookcase_from_str_array;
    ///
    /// assert!(bookcase_from_str_array(&["RR.", "GG.", "..."]).unwrap().is_solved());
    /// assert!(!bookcase_from_str_array(&["RG.", "G..", "..."]).unwrap().is_solved());
    /// assert!(!bookcase_from_str_array(&["R..", "R..", "..."]).unwrap().is_solved());
    /// assert!(bookcase_from_str_array(&["RR", "RR"]).unwrap().is_solved());
    /// ```
    pub fn is_solved(&self) -> bool {
        self.row_colors().map_or(false, |tally| tally.is_sorted())
    }

    /// Renders the bookcase with ANSI colors, one block per slot.
    ///
    /// Row numbers are printed on the left. When `highlight_row` is set, that row is
    /// marked with `>` so a player can see the selected source shelf.
    pub fn to_string_with_highlight(&self, highlight_row: Option<usize>) -> String {
        let mut output = String::new();

        for r in 0..self.rows {
            let marker = if highlight_row == Some(r) { '>' } else { ' ' };
            output.push_str(&format!("{}{:<2}", marker, r));
            for &book in self.row(r) {
                let content = if book == Book::Empty { " ." } else { "  " };
                output.push_str(&format!(
                    "\x1b[1;{}m{}\x1b[m",
                    book.to_ansi_color_code(),
                    content
                ));
            }
            if r + 1 < self.rows {
                output.push('\n');
            }
        }

        output
    }
}

impl fmt::Display for Bookcase {
    /// Formats the bookcase in the puzzle file format, without the header line:
    /// `rows` lines of `columns` characters, no trailing newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            if r > 0 {
                writeln!(f)?;
            }
            for book in self.row(r) {
                write!(f, "{}", book.to_char())?;
            }
        }
        Ok(())
    }
}

/// An interactive session: the current bookcase plus the history needed for undo.
///
/// # Examples
/// ```
/// use bookcase_solver::engine::{Game, Move};
/// use bookcase_solver::utils::bookcase_from_str_array;
///
/// let bookcase = bookcase_from_str_array(&["RG", "R."]).unwrap();
/// let mut game = Game::new_with_bookcase(bookcase);
/// game.process_move(Move { from: 0, to: 1 }).unwrap();
/// assert_eq!(game.steps(), 1);
/// assert!(game.undo_last_move());
/// assert_eq!(game.steps(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct Game {
    bookcase: Bookcase,
    history: Vec<Bookcase>,
}

impl Game {
    pub fn new_with_bookcase(initial_bookcase: Bookcase) -> Self {
        Game {
            bookcase: initial_bookcase.clone(),
            history: vec![initial_bookcase],
        }
    }

    pub fn bookcase(&self) -> &Bookcase {
        &self.bookcase
    }

    /// Number of moves played since the start, not counting undone ones.
    pub fn steps(&self) -> usize {
        self.history.len() - 1
    }

    /// Plays one move. On error the game is left untouched.
    pub fn process_move(&mut self, mv: Move) -> Result<(), MoveError> {
        self.bookcase.apply_move(mv)?;
        self.history.push(self.bookcase.clone());
        Ok(())
    }

    /// Reverts the last move. Returns `false` when nothing has been played yet.
    pub fn undo_last_move(&mut self) -> bool {
        if self.history.len() <= 1 {
            return false;
        }
        self.history.pop();
        if let Some(previous) = self.history.last() {
            self.bookcase = previous.clone();
        }
        true
    }

    pub fn is_solved(&self) -> bool {
        self.bookcase.is_solved()
    }
}
