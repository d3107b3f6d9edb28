//! Search states: one full arrangement of cars.
//!
//! A `SearchState` only stores car positions. Everything that stays fixed during
//! a search (car lengths, orientations, walls, the exit) lives in the `Board`,
//! so states stay small enough to keep millions of them in memory.
use crate::engine::{Board, CarPosition, Cell, Orientation, MAX_CARS, MAIN_CAR};
use crate::error::{PuzzleError, PuzzleResult};
use log::debug;
use smallvec::SmallVec;
use std::fmt;

/// Storage for the non-main cars of a state. All of them fit inline.
pub type OtherCars = SmallVec<[CarPosition; MAX_CARS - 1]>;

/// Canonical encoding of a `SearchState`, used as the deduplication key.
///
/// The 7-bit encodings of the main car and every other car (in storage order)
/// are packed into a `u128`, main car first, below a single sentinel bit. The
/// sentinel keeps states with different car counts apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(u128);

impl StateKey {
    /// Number of cars encoded in the key.
    pub fn car_count(self) -> usize {
        ((127 - self.0.leading_zeros()) / 7) as usize
    }

    /// The 7-bit car encodings, main car first.
    pub fn encodings(self) -> impl Iterator<Item = u8> {
        (0..self.car_count())
            .rev()
            .map(move |slot| ((self.0 >> (7 * slot)) & 0x7F) as u8)
    }
}

impl fmt::Display for StateKey {
    /// Formats the key as its canonical string: one hex byte per car.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bits in self.encodings() {
            write!(f, "{:02x}", bits)?;
        }
        Ok(())
    }
}

/// One slide: car `code` moved `offset` cells along its axis (negative towards
/// its origin end).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub code: u8,
    pub offset: i32,
}

impl Move {
    /// Human readable form such as `"b down 2"`.
    pub fn describe(&self, orientation: Orientation) -> String {
        let (backward, forward) = orientation.direction_names();
        let direction = if self.offset < 0 { backward } else { forward };
        format!(
            "{} {} {}",
            crate::engine::car_symbol(self.code),
            direction,
            self.offset.abs()
        )
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:+}", crate::engine::car_symbol(self.code), self.offset)
    }
}

/// A complete assignment of car positions: the main car plus every other car.
///
/// The root state is extracted once from a freshly loaded board; every other
/// state is a copy of its predecessor with exactly one car moved.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchState {
    main: CarPosition,
    others: OtherCars,
}

impl SearchState {
    /// Builds a state from explicit car positions.
    ///
    /// Returns `Err(PuzzleError::TooManyCars)` if more than `MAX_CARS` cars are
    /// given, since their encodings would no longer fit in a `StateKey`.
    pub fn new(
        main: CarPosition,
        others: impl IntoIterator<Item = CarPosition>,
    ) -> PuzzleResult<Self> {
        let others: OtherCars = others.into_iter().collect();
        if others.len() + 1 > MAX_CARS {
            return Err(PuzzleError::TooManyCars {
                count: others.len() + 1,
            });
        }
        Ok(SearchState { main, others })
    }

    /// Builds the root state by lifting every car off a freshly loaded board.
    ///
    /// Interior cells are scanned in raster order (row by row, left to right).
    /// The car with code 0 becomes the main car; the others are stored in the
    /// order they are discovered. Afterwards the board holds no cars and every
    /// car geometry is registered.
    ///
    /// # Returns
    /// * `Err(PuzzleError::MissingMainCar)` if no `'a'` car is present.
    /// * Any extraction error from `Board::extract_car`.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::utils::board_from_str_array;
    /// use rush_hour_solver::state::SearchState;
    /// use rush_hour_solver::engine::CarPosition;
    ///
    /// let mut board = board_from_str_array(&["xxxxx", "xaa z", "xxxxx"]).unwrap();
    /// let state = SearchState::extract_from(&mut board).unwrap();
    /// assert_eq!(state.main_car(), CarPosition::new(0, 1));
    /// assert!(state.other_cars().is_empty());
    /// assert_eq!(board.cell_at(1, 1), ' ');
    /// ```
    pub fn extract_from(board: &mut Board) -> PuzzleResult<Self> {
        let mut main = None;
        let mut others = OtherCars::new();

        for y in 1..board.height() as i32 - 1 {
            for x in 1..board.width() as i32 - 1 {
                if let Some(Cell::Car(_)) = board.cell(x, y) {
                    let car = board.extract_car(x, y)?;
                    if car.code == MAIN_CAR {
                        main = Some(car);
                    } else {
                        others.push(car);
                    }
                }
            }
        }

        let main = main.ok_or(PuzzleError::MissingMainCar)?;
        debug!(
            "extracted main car at origin {} and {} other cars",
            main.origin,
            others.len()
        );
        Ok(SearchState { main, others })
    }

    pub fn main_car(&self) -> CarPosition {
        self.main
    }

    pub fn other_cars(&self) -> &[CarPosition] {
        &self.others
    }

    /// Every car, main car first, then the others in storage order.
    pub fn cars(&self) -> impl Iterator<Item = CarPosition> + '_ {
        std::iter::once(self.main).chain(self.others.iter().copied())
    }

    pub fn car_count(&self) -> usize {
        1 + self.others.len()
    }

    /// Places every car onto the board, main car first.
    ///
    /// Must be followed by `Board::clear` before the board is reused.
    pub fn apply_to(&self, board: &mut Board) -> PuzzleResult<()> {
        for car in self.cars() {
            board.place(&car)?;
        }
        Ok(())
    }

    /// Whether the main car touches the exit with its origin end or its far end.
    pub fn is_solution(&self, board: &Board) -> PuzzleResult<bool> {
        let exit = board.exit().ok_or(PuzzleError::MissingExit)?;
        let geometry = board.car_geometry(self.main.code)?;
        Ok(geometry.origin_end(&self.main, 1) == exit || geometry.far_end(&self.main, 1) == exit)
    }

    /// Canonical key of this state. Two states get the same key exactly when
    /// all their car positions match in storage order.
    pub fn serialize(&self) -> StateKey {
        let bits = self
            .cars()
            .fold(1u128, |bits, car| (bits << 7) | car.to_bits7() as u128);
        StateKey(bits)
    }

    /// Lists every state reachable from this one with a single slide.
    ///
    /// Cars are tried in storage order, main car first. For each car the offsets
    /// `-1, -2, ...` are tried until a slide is blocked or the border is reached,
    /// then `+1, +2, ...` likewise. The board is cleared before returning, also on
    /// error. Deduplication is left to the caller.
    pub fn enumerate_successors(&self, board: &mut Board) -> PuzzleResult<Vec<SearchState>> {
        let successors = self
            .apply_to(board)
            .and_then(|()| self.collect_successors(board));
        board.clear();
        successors
    }

    fn collect_successors(&self, board: &Board) -> PuzzleResult<Vec<SearchState>> {
        let mut successors = Vec::new();
        for (slot, car) in self.cars().enumerate() {
            for distance in 1..=board.free_distance_backward(&car) {
                if !board.can_slide(&car, -distance)? {
                    break;
                }
                successors.push(self.with_car_shifted(slot, -distance));
            }
            for distance in 1..=board.free_distance_forward(&car)? {
                if !board.can_slide(&car, distance)? {
                    break;
                }
                successors.push(self.with_car_shifted(slot, distance));
            }
        }
        Ok(successors)
    }

    /// Copy of this state with the car in `slot` (0 = main car) moved by `offset`.
    fn with_car_shifted(&self, slot: usize, offset: i32) -> SearchState {
        let mut next = self.clone();
        match slot {
            0 => next.main = next.main.shifted(offset),
            _ => next.others[slot - 1] = next.others[slot - 1].shifted(offset),
        }
        next
    }

    /// The slide that turns `previous` into this state, if they differ in
    /// exactly one car.
    pub fn move_from(&self, previous: &SearchState) -> Option<Move> {
        if self.car_count() != previous.car_count() {
            return None;
        }
        let mut moved = self
            .cars()
            .zip(previous.cars())
            .filter(|(now, before)| now != before);
        let (now, before) = moved.next()?;
        if moved.next().is_some() || now.code != before.code {
            return None;
        }
        Some(Move {
            code: now.code,
            offset: now.origin as i32 - before.origin as i32,
        })
    }
}
