//! Error types for the Rush Hour solver.
//!
//! Every variant except `Io` and `Parse` describes an invalid puzzle definition
//! or a broken internal invariant. None of them is a normal search outcome:
//! an unsolvable puzzle is reported through `SearchOutcome::Exhausted` instead.

use crate::engine::Coord;

/// Errors raised while loading a board or running a search.
#[derive(thiserror::Error, Debug)]
pub enum PuzzleError {
    /// A car was placed onto a cell that already holds something else.
    #[error("two cars collided at x = {x}, y = {y}: cell holds '{existing}', tried to add '{incoming}'")]
    PlacementConflict {
        x: i32,
        y: i32,
        existing: char,
        incoming: char,
    },

    /// A car cell has no neighbour with the same code, so its axis is unknown.
    #[error("car '{symbol}' at x = {x}, y = {y} has length 1; single-cell cars are not supported")]
    SingleCellCar { x: i32, y: i32, symbol: char },

    /// A car code was looked up that no geometry is registered for.
    #[error("no car registered with code {code}")]
    UnknownCar { code: u8 },

    #[error("cell x = {x}, y = {y} holds '{symbol}', not a car")]
    NotACar { x: i32, y: i32, symbol: char },

    /// The same car letter shows up as two separate runs of cells.
    #[error("car '{symbol}' appears more than once or is not a straight run")]
    DuplicateCar { symbol: char },

    /// More cars than a state key can hold.
    #[error("{count} cars given; at most 16 fit in a search state")]
    TooManyCars { count: usize },

    #[error("board {width}x{height} is too small; at least 3x3 including the border is required")]
    BoardTooSmall { width: usize, height: usize },

    /// Interior coordinates are packed into 3 bits, so the interior is capped at 8x8.
    #[error("board {width}x{height} is too large; at most 10x10 including the border is supported")]
    BoardTooLarge { width: usize, height: usize },

    #[error("unrecognized symbol '{symbol}' at x = {x}, y = {y}")]
    InvalidSymbol { x: usize, y: usize, symbol: char },

    #[error("car '{symbol}' at x = {x}, y = {y} sits on the wall border")]
    CarOnBorder { x: usize, y: usize, symbol: char },

    #[error("board has a second exit at {second}; first exit was at {first}")]
    MultipleExits { first: Coord, second: Coord },

    /// Two consecutive states of a reconstructed path differ by more than one slide.
    #[error("solution path step {step} is not a single slide")]
    BrokenPath { step: usize },

    #[error("board has no exit ('z')")]
    MissingExit,

    #[error("board has no main car ('a')")]
    MissingMainCar,

    #[error("malformed board definition: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for puzzle operations.
pub type PuzzleResult<T> = Result<T, PuzzleError>;
