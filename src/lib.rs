//! # Rush Hour Solver Library
//!
//! This library finds a shortest sequence of slides that gets the main car of a
//! "Rush Hour" sliding-block puzzle to the exit, using a breadth-first search
//! over compactly encoded car arrangements.
//!
//! It is used by the `rush_hour` binary, which loads a board definition file,
//! runs the search and prints every step of the solution.
//!
//! ## Modules
//! - `engine`: Contains the board (`Board`), its cells (`Cell`), coordinates (`Coord`)
//!   and the two halves of a car: the fixed `CarGeometry` and the moving `CarPosition`.
//! - `state`: Provides `SearchState`, one full car arrangement, with move generation
//!   and the canonical `StateKey` used for deduplication.
//! - `solver`: Provides the `solve_bfs` function and the search bookkeeping
//!   (`SearchArena`, `DedupSet`).
//! - `utils`: Provides text helpers, such as parsing board definitions and rendering states.
//! - `error`: Defines `PuzzleError`.

pub mod engine;
pub mod error;
pub mod solver;
pub mod state;
pub mod utils;

pub use crate::engine::{Board, CarGeometry, CarPosition, Cell, Coord, Orientation};
pub use crate::error::{PuzzleError, PuzzleResult};
pub use crate::solver::{solve_bfs, SearchOutcome, Solution};
pub use crate::state::{Move, SearchState, StateKey};
