use log::debug;

use crate::engine::{Book, Bookcase, MAX_SIZE};
use crate::error::ParseError;

/// Parses a complete puzzle description.
///
/// The first line is the header `"<rows> <columns>"`, both between 1 and [`MAX_SIZE`].
/// It is followed by `rows` lines of exactly `columns` characters, each one of
/// `K R G Y B M C W` or `.` for an empty slot. A `.` may only be followed by more `.`
/// on the same line. A trailing `\r` on any line is ignored, as is anything after the
/// last row.
///
/// # Examples
/// ```
/// use bookcase_solver::engine::Book;
/// use bookcase_solver::utils::parse_bookcase;
///
/// let bookcase = parse_bookcase("2 3\nRG.\nB..\n").unwrap();
/// assert_eq!(bookcase.rows(), 2);
/// assert_eq!(bookcase.get_book(0, 1), Book::Green);
///
/// assert!(parse_bookcase("2 3\nR.G\nB..\n").is_err());
/// ```
pub fn parse_bookcase(text: &str) -> Result<Bookcase, ParseError> {
    let result = parse_lines(text);
    if let Err(e) = &result {
        debug!("rejected bookcase description: {}", e);
    }
    result
}

fn parse_lines(text: &str) -> Result<Bookcase, ParseError> {
    let mut lines = text.lines().map(|line| line.strip_suffix('\r').unwrap_or(line));

    let header = lines.next().ok_or(ParseError::MissingHeader)?;
    let (rows, columns) = parse_header(header)?;

    let row_lines: Vec<&str> = lines.take(rows).collect();
    if row_lines.len() < rows {
        return Err(ParseError::MissingRow {
            expected: rows,
            found: row_lines.len(),
        });
    }
    fill_bookcase(rows, columns, &row_lines)
}

fn parse_header(header: &str) -> Result<(usize, usize), ParseError> {
    let malformed = || ParseError::MalformedHeader(header.to_string());
    let mut fields = header.split_whitespace();
    let rows = fields
        .next()
        .and_then(|f| f.parse::<usize>().ok())
        .ok_or_else(malformed)?;
    let columns = fields
        .next()
        .and_then(|f| f.parse::<usize>().ok())
        .ok_or_else(malformed)?;
    if fields.next().is_some() {
        return Err(malformed());
    }
    if !(1..=MAX_SIZE).contains(&rows) || !(1..=MAX_SIZE).contains(&columns) {
        return Err(ParseError::SizeOutOfRange { rows, columns });
    }
    Ok((rows, columns))
}

/// Builds a bookcase from row strings that have already been split out.
fn fill_bookcase(rows: usize, columns: usize, row_lines: &[&str]) -> Result<Bookcase, ParseError> {
    let mut bookcase = Bookcase::new_empty(rows, columns);

    for (r, line) in row_lines.iter().enumerate() {
        let found = line.chars().count();
        if found != columns {
            return Err(ParseError::RowLength {
                row: r,
                expected: columns,
                found,
            });
        }

        let mut gap_seen = false;
        for (c, ch) in line.chars().enumerate() {
            let book = Book::from_char(ch).ok_or(ParseError::UnknownBook { ch, row: r, col: c })?;
            if book == Book::Empty {
                gap_seen = true;
            } else if gap_seen {
                return Err(ParseError::BookAfterGap { ch, row: r, col: c });
            }
            bookcase.set_book(r, c, book);
        }
    }
    Ok(bookcase)
}

/// Parses an array of row strings into a `Bookcase`, without a header line.
///
/// The number of rows is `s.len()` and the number of columns is the length of the
/// first row; every row must have that same length. Validation is the same as
/// [`parse_bookcase`].
///
/// # Examples
/// ```
/// use bookcase_solver::engine::Book;
/// use bookcase_solver::utils::bookcase_from_str_array;
///
/// let bookcase = bookcase_from_str_array(&["RGY", "B.."]).unwrap();
/// assert_eq!(bookcase.columns(), 3);
/// assert_eq!(bookcase.get_book(1, 0), Book::Blue);
/// assert!(bookcase_from_str_array(&["RXB"]).is_err());
/// ```
pub fn bookcase_from_str_array(s: &[&str]) -> Result<Bookcase, ParseError> {
    let rows = s.len();
    let columns = s.first().map_or(0, |row| row.chars().count());
    if !(1..=MAX_SIZE).contains(&rows) || !(1..=MAX_SIZE).contains(&columns) {
        return Err(ParseError::SizeOutOfRange { rows, columns });
    }
    fill_bookcase(rows, columns, s)
}

/// Renders a bookcase in the puzzle file format, header line included.
///
/// The output is accepted by [`parse_bookcase`] and ends with a newline.
pub fn bookcase_to_file_string(bookcase: &Bookcase) -> String {
    format!("{} {}\n{}\n", bookcase.rows(), bookcase.columns(), bookcase)
}
