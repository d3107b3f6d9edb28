//! Board model for the Rush Hour puzzle.
//!
//! This module defines the spatial building blocks of the solver:
//! - `Coord`: a 2D cell coordinate with a compact 6-bit encoding.
//! - `CarGeometry`: the immutable shape of one car (length, orientation, fixed axis).
//! - `CarPosition`: the mutable part of a car, its code and origin along its axis.
//! - `Cell`: the content of one board cell.
//! - `Board`: the grid, the exit, the car registry and the empty template used
//!   to reset the grid between trial placements.
use crate::error::{PuzzleError, PuzzleResult};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Largest supported board side, border included. The interior is at most 8x8
/// so that every interior coordinate fits in 3 bits.
pub const MAX_BOARD_SIZE: usize = 10;

/// Smallest supported board side, border included (one interior cell).
pub const MIN_BOARD_SIZE: usize = 3;

/// Number of distinct car codes; codes are packed into 4 bits.
pub const MAX_CARS: usize = 16;

/// Reserved code of the car that has to reach the exit.
pub const MAIN_CAR: u8 = 0;

/// A cell coordinate. `x` is the column and `y` the row, both counted from the
/// top-left corner of the bordered board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Packs an interior coordinate into 6 bits: `x - 1` in the low three bits,
    /// `y - 1` in the high three.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::Coord;
    /// assert_eq!(Coord::new(1, 1).to_bits6(), 0);
    /// assert_eq!(Coord::new(8, 8).to_bits6(), 0x3F);
    /// assert_eq!(Coord::new(3, 2).to_bits6(), 0b001_010);
    /// ```
    pub fn to_bits6(self) -> u8 {
        (((self.x - 1) & 0x07) | (((self.y - 1) & 0x07) << 3)) as u8
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, other: Coord) -> Coord {
        Coord::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, other: Coord) -> Coord {
        Coord::new(self.x - other.x, self.y - other.y)
    }
}

impl AddAssign for Coord {
    fn add_assign(&mut self, other: Coord) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl SubAssign for Coord {
    fn sub_assign(&mut self, other: Coord) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x={}, y={})", self.x, self.y)
    }
}

/// The axis a car slides along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Along a row: the car moves left and right, its `y` never changes.
    Horizontal,
    /// Along a column: the car moves up and down, its `x` never changes.
    Vertical,
}

impl Orientation {
    /// Unit step from the origin end towards the far end.
    pub fn step(self) -> Coord {
        match self {
            Orientation::Horizontal => Coord::new(1, 0),
            Orientation::Vertical => Coord::new(0, 1),
        }
    }

    /// Words for the backward and forward directions, used when describing moves.
    pub fn direction_names(self) -> (&'static str, &'static str) {
        match self {
            Orientation::Horizontal => ("left", "right"),
            Orientation::Vertical => ("up", "down"),
        }
    }
}

/// The mutable part of a car: which car it is, and where its origin end sits
/// along the car's axis.
///
/// The origin is the left-most cell of a horizontal car and the top-most cell of
/// a vertical one. Interior coordinates start at 1, so a valid origin is in `1..=8`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CarPosition {
    pub code: u8,
    pub origin: u8,
}

impl CarPosition {
    pub const fn new(code: u8, origin: u8) -> Self {
        CarPosition { code, origin }
    }

    /// Packs the position into 7 bits: the code in the high four bits and
    /// `origin - 1` in the low three.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::CarPosition;
    /// assert_eq!(CarPosition::new(0, 1).to_bits7(), 0);
    /// assert_eq!(CarPosition::new(15, 8).to_bits7(), 0x7F);
    /// assert_eq!(CarPosition::new(2, 4).to_bits7(), 0b0010_011);
    /// ```
    pub fn to_bits7(self) -> u8 {
        ((self.code & 0x0F) << 3) | (self.origin.wrapping_sub(1) & 0x07)
    }

    /// Returns a copy of this position moved `offset` cells along the car's axis.
    pub fn shifted(self, offset: i32) -> Self {
        CarPosition {
            code: self.code,
            origin: (self.origin as i32 + offset) as u8,
        }
    }

    /// Board symbol of this car (`'a'` for code 0).
    pub fn symbol(self) -> char {
        car_symbol(self.code)
    }
}

/// Board symbol for a car code.
pub fn car_symbol(code: u8) -> char {
    (b'a' + code) as char
}

/// The immutable part of a car, registered once in the board when the car is
/// extracted and looked up by code afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CarGeometry {
    pub code: u8,
    pub length: u8,
    pub orientation: Orientation,
    /// `y` of a horizontal car, `x` of a vertical one.
    pub axis: i32,
}

impl CarGeometry {
    /// Coordinate of the cell at position `along` on this car's axis.
    fn at(&self, along: i32) -> Coord {
        match self.orientation {
            Orientation::Horizontal => Coord::new(along, self.axis),
            Orientation::Vertical => Coord::new(self.axis, along),
        }
    }

    /// The origin end of `car`, moved back by `decr` cells.
    ///
    /// With `decr == 0` this is the car's own first cell; with `decr == 1` it is
    /// the cell just before the car.
    pub fn origin_end(&self, car: &CarPosition, decr: i32) -> Coord {
        self.at(car.origin as i32 - decr)
    }

    /// The far end of `car`, moved forward by `incr` cells.
    ///
    /// With `incr == 0` this is the car's own last cell; with `incr == 1` it is
    /// the cell just past the car.
    pub fn far_end(&self, car: &CarPosition, incr: i32) -> Coord {
        self.at(car.origin as i32 + self.length as i32 - 1 + incr)
    }

    /// All cells covered by `car`, origin end first.
    pub fn cells(&self, car: &CarPosition) -> impl Iterator<Item = Coord> + '_ {
        let origin = car.origin as i32;
        (origin..origin + self.length as i32).map(move |along| self.at(along))
    }
}

/// The content of one board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Empty,
    Exit,
    /// A cell covered by the car with this code.
    Car(u8),
}

impl Cell {
    /// Parses a board definition symbol: `'x'` wall, `'z'` exit, `' '` empty and
    /// `'a'..='p'` car codes 0 to 15.
    pub fn from_symbol(symbol: char) -> Option<Cell> {
        match symbol {
            'x' => Some(Cell::Wall),
            'z' => Some(Cell::Exit),
            ' ' => Some(Cell::Empty),
            'a'..='p' => Some(Cell::Car(symbol as u8 - b'a')),
            _ => None,
        }
    }

    /// Converts the cell back to its board definition symbol.
    pub fn to_char(self) -> char {
        match self {
            Cell::Wall => 'x',
            Cell::Exit => 'z',
            Cell::Empty => ' ',
            Cell::Car(code) => car_symbol(code),
        }
    }
}

/// Symbol returned by `Board::cell_at` for coordinates outside the board.
pub const OUT_OF_BOUNDS: char = '@';

type Grid = [[Cell; MAX_BOARD_SIZE]; MAX_BOARD_SIZE];

/// The authoritative spatial state of one search run.
///
/// The board keeps two grids: the live grid that cars are placed onto, and an
/// empty template holding only walls, the exit and empty cells. `clear` copies
/// the template back over the live grid. Car geometries are registered when cars
/// are extracted from a freshly loaded board and stay fixed for the whole run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    exit: Option<Coord>,
    grid: Grid,
    template: Grid,
    cars: [Option<CarGeometry>; MAX_CARS],
}

impl Board {
    /// Creates a bordered board: walls on the outer ring, empty cells inside.
    ///
    /// # Arguments
    /// * `width`: Number of columns, border included.
    /// * `height`: Number of rows, border included.
    ///
    /// # Returns
    /// * `Ok(Board)` with an empty interior and no exit yet.
    /// * `Err(PuzzleError::BoardTooSmall)` or `Err(PuzzleError::BoardTooLarge)` if
    ///   either side is outside `3..=10`.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::engine::Board;
    /// let board = Board::new(6, 6).unwrap();
    /// assert_eq!(board.cell_at(0, 0), 'x');
    /// assert_eq!(board.cell_at(2, 3), ' ');
    /// assert!(board.exit().is_none());
    /// assert!(Board::new(11, 6).is_err());
    /// ```
    pub fn new(width: usize, height: usize) -> PuzzleResult<Self> {
        if width < MIN_BOARD_SIZE || height < MIN_BOARD_SIZE {
            return Err(PuzzleError::BoardTooSmall { width, height });
        }
        if width > MAX_BOARD_SIZE || height > MAX_BOARD_SIZE {
            return Err(PuzzleError::BoardTooLarge { width, height });
        }

        // Cells outside width x height are never read; walls keep them inert.
        let mut grid = [[Cell::Wall; MAX_BOARD_SIZE]; MAX_BOARD_SIZE];
        for row in grid.iter_mut().take(height - 1).skip(1) {
            for cell in row.iter_mut().take(width - 1).skip(1) {
                *cell = Cell::Empty;
            }
        }

        Ok(Board {
            width,
            height,
            exit: None,
            grid,
            template: grid,
            cars: [None; MAX_CARS],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The exit coordinate, once an exit symbol has been written.
    pub fn exit(&self) -> Option<Coord> {
        self.exit
    }

    /// Whether `(x, y)` lies on the board (border included).
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// The cell at `(x, y)`, or `None` outside the board.
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        if self.is_valid(x, y) {
            Some(self.grid[y as usize][x as usize])
        } else {
            None
        }
    }

    /// The board symbol at `(x, y)`; `'@'` outside the board.
    pub fn cell_at(&self, x: i32, y: i32) -> char {
        self.cell(x, y).map_or(OUT_OF_BOUNDS, Cell::to_char)
    }

    fn is_empty_at(&self, p: Coord) -> bool {
        self.cell(p.x, p.y) == Some(Cell::Empty)
    }

    /// Writes one symbol of the board definition. Used only while loading.
    ///
    /// Static symbols (wall, empty, exit) are written to both the live grid and
    /// the empty template. Car symbols are written to the live grid only, since
    /// extraction later removes them. Coordinates outside the board are ignored.
    ///
    /// # Returns
    /// * `Err(PuzzleError::InvalidSymbol)` for characters outside the board alphabet.
    /// * `Err(PuzzleError::CarOnBorder)` for a car symbol on the outer ring.
    /// * `Err(PuzzleError::MultipleExits)` when a second exit is written.
    pub fn set_baseline(&mut self, x: usize, y: usize, symbol: char) -> PuzzleResult<()> {
        if x >= self.width || y >= self.height {
            return Ok(());
        }
        let cell = Cell::from_symbol(symbol).ok_or(PuzzleError::InvalidSymbol { x, y, symbol })?;

        match cell {
            Cell::Car(_) => {
                if x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1 {
                    return Err(PuzzleError::CarOnBorder { x, y, symbol });
                }
                if self.exit == Some(Coord::new(x as i32, y as i32)) {
                    self.exit = None;
                    self.template[y][x] = Cell::Empty;
                }
                self.grid[y][x] = cell;
            }
            _ => {
                let here = Coord::new(x as i32, y as i32);
                if cell == Cell::Exit {
                    match self.exit {
                        Some(first) if first != here => {
                            return Err(PuzzleError::MultipleExits {
                                first,
                                second: here,
                            });
                        }
                        _ => self.exit = Some(here),
                    }
                } else if self.exit == Some(here) {
                    self.exit = None;
                }
                self.grid[y][x] = cell;
                self.template[y][x] = cell;
            }
        }
        Ok(())
    }

    /// Looks up the registered geometry of a car code.
    pub fn car_geometry(&self, code: u8) -> PuzzleResult<&CarGeometry> {
        self.cars
            .get(code as usize)
            .and_then(Option::as_ref)
            .ok_or(PuzzleError::UnknownCar { code })
    }

    /// Number of cars registered by extraction.
    pub fn car_count(&self) -> usize {
        self.cars.iter().flatten().count()
    }

    /// Writes the car's code into every cell it covers, origin end to far end.
    ///
    /// # Returns
    /// * `Err(PuzzleError::PlacementConflict)` if any covered cell is not empty.
    ///   Cells before the conflicting one are already written; the caller is
    ///   expected to `clear` the board.
    /// * `Err(PuzzleError::UnknownCar)` if the code has no registered geometry.
    pub fn place(&mut self, car: &CarPosition) -> PuzzleResult<()> {
        let geometry = *self.car_geometry(car.code)?;
        for p in geometry.cells(car) {
            match self.cell(p.x, p.y) {
                Some(Cell::Empty) => self.grid[p.y as usize][p.x as usize] = Cell::Car(car.code),
                existing => {
                    return Err(PuzzleError::PlacementConflict {
                        x: p.x,
                        y: p.y,
                        existing: existing.map_or(OUT_OF_BOUNDS, Cell::to_char),
                        incoming: car.symbol(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Removes every car by restoring the empty template.
    pub fn clear(&mut self) {
        self.grid = self.template;
    }

    /// Checks whether `car` can slide `distance` cells along its axis.
    ///
    /// A negative distance moves towards the origin end, a positive one towards
    /// the far end. Every cell the car would pass through is probed, not only the
    /// destination, so a move is rejected as soon as one intervening cell is
    /// occupied or off the board. A distance of zero probes nothing and is legal.
    ///
    /// # Examples
    /// ```
    /// use rush_hour_solver::utils::board_from_str_array;
    /// use rush_hour_solver::state::SearchState;
    ///
    /// let mut board = board_from_str_array(&[
    ///     "xxxxxx",
    ///     "x    x",
    ///     "xaa bz",
    ///     "x   bx",
    ///     "x    x",
    ///     "xxxxxx",
    /// ]).unwrap();
    /// let state = SearchState::extract_from(&mut board).unwrap();
    /// state.apply_to(&mut board).unwrap();
    /// let main = state.main_car();
    /// assert!(board.can_slide(&main, 1).unwrap());
    /// assert!(!board.can_slide(&main, 2).unwrap()); // passes through 'b'
    /// assert!(!board.can_slide(&main, -1).unwrap()); // wall
    /// board.clear();
    /// ```
    pub fn can_slide(&self, car: &CarPosition, distance: i32) -> PuzzleResult<bool> {
        let geometry = self.car_geometry(car.code)?;
        let free = if distance < 0 {
            (1..=-distance).all(|k| self.is_empty_at(geometry.origin_end(car, k)))
        } else {
            (1..=distance).all(|k| self.is_empty_at(geometry.far_end(car, k)))
        };
        Ok(free)
    }

    /// Number of interior cells between the car's far end and the board border,
    /// ignoring other cars. Bounds how far `can_slide` needs to probe forward.
    pub fn free_distance_forward(&self, car: &CarPosition) -> PuzzleResult<i32> {
        let geometry = self.car_geometry(car.code)?;
        let last_interior = match geometry.orientation {
            Orientation::Horizontal => self.width as i32 - 2,
            Orientation::Vertical => self.height as i32 - 2,
        };
        let far = car.origin as i32 + geometry.length as i32 - 1;
        Ok((last_interior - far).max(0))
    }

    /// Number of interior cells between the car's origin end and the board border.
    pub fn free_distance_backward(&self, car: &CarPosition) -> i32 {
        (car.origin as i32 - 1).max(0)
    }

    /// Lifts the car whose first cell is `(x, y)` off the board and registers its
    /// geometry.
    ///
    /// `(x, y)` must be the top-most or left-most cell of the car, which is what a
    /// raster scan meets first. The cell below is checked before the cell to the
    /// right, so a car continuing downwards is vertical. All cells of the car are
    /// reset to empty.
    ///
    /// # Returns
    /// * `Ok(CarPosition)` for the extracted car.
    /// * `Err(PuzzleError::NotACar)` if `(x, y)` is not a car cell.
    /// * `Err(PuzzleError::SingleCellCar)` if neither neighbour carries the same code.
    /// * `Err(PuzzleError::DuplicateCar)` if the code is already registered.
    pub fn extract_car(&mut self, x: i32, y: i32) -> PuzzleResult<CarPosition> {
        let code = match self.cell(x, y) {
            Some(Cell::Car(code)) => code,
            other => {
                return Err(PuzzleError::NotACar {
                    x,
                    y,
                    symbol: other.map_or(OUT_OF_BOUNDS, Cell::to_char),
                })
            }
        };
        if self.cars[code as usize].is_some() {
            return Err(PuzzleError::DuplicateCar {
                symbol: car_symbol(code),
            });
        }

        let start = Coord::new(x, y);
        let orientation = if self.cell(x, y + 1) == Some(Cell::Car(code)) {
            Orientation::Vertical
        } else if self.cell(x + 1, y) == Some(Cell::Car(code)) {
            Orientation::Horizontal
        } else {
            return Err(PuzzleError::SingleCellCar {
                x,
                y,
                symbol: car_symbol(code),
            });
        };

        let mut length = 0u8;
        let mut p = start;
        while self.cell(p.x, p.y) == Some(Cell::Car(code)) {
            self.grid[p.y as usize][p.x as usize] = Cell::Empty;
            length += 1;
            p += orientation.step();
        }

        let (axis, origin) = match orientation {
            Orientation::Horizontal => (y, x),
            Orientation::Vertical => (x, y),
        };
        self.cars[code as usize] = Some(CarGeometry {
            code,
            length,
            orientation,
            axis,
        });
        Ok(CarPosition::new(code, origin as u8))
    }

    /// Renders the board, drawing the cells of car `highlight` in reverse video.
    ///
    /// Used to point out the car that moved in each step of a solution.
    pub fn to_string_with_highlight(&self, highlight: Option<u8>) -> String {
        let mut output = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.grid[y][x];
                match cell {
                    Cell::Car(code) if Some(code) == highlight => {
                        output.push_str(&format!("\x1b[7m{}\x1b[m", cell.to_char()));
                    }
                    _ => output.push(cell.to_char()),
                }
            }
            if y < self.height - 1 {
                output.push('\n');
            }
        }
        output
    }
}

impl fmt::Display for Board {
    /// Formats the board exactly as the text definition it was loaded from.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}
