//! Text helpers around the core: loading board definitions and rendering states.
use crate::engine::{Board, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use crate::error::{PuzzleError, PuzzleResult};
use crate::state::SearchState;
use std::fs;
use std::path::Path;

/// Builds a `Board` from rows of board symbols.
///
/// The height is the number of rows and the width the length of the first row;
/// every row must have that same length. Valid symbols are:
/// - `'x'`: wall
/// - `'z'`: exit
/// - `' '`: empty cell
/// - `'a'..='p'`: car cells, `'a'` being the main car
///
/// Cars stay on the returned board; call `SearchState::extract_from` to lift
/// them off and register their geometry.
///
/// # Returns
/// * `Ok(Board)` if every symbol is valid and exactly one exit is present.
/// * `Err(PuzzleError::Parse)` if rows have different lengths.
/// * `Err(PuzzleError::MissingExit)` if no `'z'` appears.
/// * Any size or symbol error from `Board::new` and `Board::set_baseline`.
///
/// # Examples
/// ```
/// use rush_hour_solver::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["xxxxx", "xaa z", "xxxxx"]).unwrap();
/// assert_eq!((board.width(), board.height()), (5, 3));
/// assert_eq!(board.cell_at(4, 1), 'z');
///
/// assert!(board_from_str_array(&["xxxxx", "xaa x", "xxxxx"]).is_err()); // no exit
/// assert!(board_from_str_array(&["xxxxx", "xaa z", "xxx"]).is_err()); // ragged
/// ```
pub fn board_from_str_array(rows: &[&str]) -> PuzzleResult<Board> {
    let width = rows.first().map_or(0, |row| row.chars().count());
    for (y, row) in rows.iter().enumerate() {
        let len = row.chars().count();
        if len != width {
            return Err(PuzzleError::Parse(format!(
                "row {} has {} characters, expected {}",
                y, len, width
            )));
        }
    }

    let mut board = Board::new(width, rows.len())?;
    for (y, row) in rows.iter().enumerate() {
        for (x, symbol) in row.chars().enumerate() {
            board.set_baseline(x, y, symbol)?;
        }
    }

    if board.exit().is_none() {
        return Err(PuzzleError::MissingExit);
    }
    Ok(board)
}

/// Parses a board definition file's contents.
///
/// The first non-empty line holds the height and the width, separated by a
/// comma and/or whitespace. Exactly `height` rows follow; each must have at
/// least `width` characters and is cut to `width`. Trailing carriage returns
/// are ignored. The header sizes are checked against the board limits before
/// any row is read.
pub fn parse_board_text(text: &str) -> PuzzleResult<Board> {
    let mut lines = text.lines().map(|line| line.trim_end_matches('\r'));

    let header = lines
        .by_ref()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| PuzzleError::Parse("missing size header".to_string()))?;
    let (height, width) = parse_header(header)?;

    let mut rows = Vec::with_capacity(height);
    for y in 0..height {
        let line = lines.next().ok_or_else(|| {
            PuzzleError::Parse(format!("expected {} rows, found {}", height, y))
        })?;
        let len = line.chars().count();
        if len < width {
            return Err(PuzzleError::Parse(format!(
                "row {} has {} characters, expected {}",
                y, len, width
            )));
        }
        rows.push(line.chars().take(width).collect::<String>());
    }

    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    board_from_str_array(&row_refs)
}

fn parse_header(header: &str) -> PuzzleResult<(usize, usize)> {
    let numbers: Vec<&str> = header
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    match numbers.as_slice() {
        [height, width] => {
            let parse = |value: &str| {
                value.parse::<usize>().map_err(|e| {
                    PuzzleError::Parse(format!("invalid size '{}' in header: {}", value, e))
                })
            };
            let (height, width) = (parse(*height)?, parse(*width)?);
            if width < MIN_BOARD_SIZE || height < MIN_BOARD_SIZE {
                return Err(PuzzleError::BoardTooSmall { width, height });
            }
            if width > MAX_BOARD_SIZE || height > MAX_BOARD_SIZE {
                return Err(PuzzleError::BoardTooLarge { width, height });
            }
            Ok((height, width))
        }
        _ => Err(PuzzleError::Parse(format!(
            "header must be 'height width', found '{}'",
            header
        ))),
    }
}

/// Reads and parses a board definition file.
pub fn load_board_file(path: impl AsRef<Path>) -> PuzzleResult<Board> {
    let text = fs::read_to_string(path)?;
    parse_board_text(&text)
}

/// Renders `state` on `board`, highlighting car `highlight`, and clears the
/// board again.
pub fn render_state(
    board: &mut Board,
    state: &SearchState,
    highlight: Option<u8>,
) -> PuzzleResult<String> {
    let placed = state.apply_to(board);
    let rendered = board.to_string_with_highlight(highlight);
    board.clear();
    placed.map(|()| rendered)
}
