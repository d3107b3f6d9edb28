//! Common test utilities shared across integration tests.
#![allow(dead_code)]

use rand::rngs::SmallRng;
use rand::Rng;
use rush_hour_solver::engine::{Board, CarGeometry, Cell, Coord, Orientation};
use rush_hour_solver::state::SearchState;
use std::collections::{HashMap, HashSet, VecDeque};

/// Result of an exhaustive reference search.
#[derive(Debug)]
pub struct Reference {
    /// Fewest slides to any goal state, if one is reachable.
    pub shortest: Option<usize>,
    /// Number of distinct arrangements reachable from the root, goals included.
    pub reachable: usize,
}

/// Cells covered by a car, computed straight from its geometry.
fn covered(geometry: &CarGeometry, origin: u8) -> Vec<Coord> {
    (0..geometry.length as i32)
        .map(|i| match geometry.orientation {
            Orientation::Horizontal => Coord::new(origin as i32 + i, geometry.axis),
            Orientation::Vertical => Coord::new(geometry.axis, origin as i32 + i),
        })
        .collect()
}

/// Breadth-first search over plain origin vectors that rebuilds occupancy from
/// scratch for every state and expands goal states as well, so it visits the
/// whole reachable graph. `board` must be cleared with all cars registered.
pub fn reference_search(board: &Board, root: &SearchState) -> Reference {
    let cars: Vec<_> = root.cars().collect();
    let geometries: Vec<CarGeometry> = cars
        .iter()
        .map(|car| *board.car_geometry(car.code).unwrap())
        .collect();
    let exit = board.exit().unwrap();
    let start: Vec<u8> = cars.iter().map(|car| car.origin).collect();

    let mut distance: HashMap<Vec<u8>, usize> = HashMap::new();
    distance.insert(start.clone(), 0);
    let mut queue = VecDeque::from([start]);
    let mut shortest = None;

    while let Some(origins) = queue.pop_front() {
        let depth = distance[&origins];

        let main_cells = covered(&geometries[0], origins[0]);
        let step = geometries[0].orientation.step();
        let before = main_cells[0] - step;
        let after = *main_cells.last().unwrap() + step;
        if shortest.is_none() && (before == exit || after == exit) {
            shortest = Some(depth);
        }

        let occupied: HashSet<Coord> = geometries
            .iter()
            .zip(&origins)
            .flat_map(|(geometry, &origin)| covered(geometry, origin))
            .collect();

        for (i, geometry) in geometries.iter().enumerate() {
            for direction in [-1i32, 1] {
                let mut k = 1;
                loop {
                    let moved = (origins[i] as i32 + direction * k) as u8;
                    let cells = covered(geometry, moved);
                    let probe = if direction < 0 { cells[0] } else { *cells.last().unwrap() };
                    if board.cell(probe.x, probe.y) != Some(Cell::Empty) || occupied.contains(&probe) {
                        break;
                    }
                    let mut next = origins.clone();
                    next[i] = moved;
                    if !distance.contains_key(&next) {
                        distance.insert(next.clone(), depth + 1);
                        queue.push_back(next);
                    }
                    k += 1;
                }
            }
        }
    }

    Reference {
        shortest,
        reachable: distance.len(),
    }
}

/// Rows of a random, non-overlapping layout: a horizontal main car with the exit
/// on the right wall of its row, plus up to `max_others` cars of length 2 or 3.
pub fn random_rows(rng: &mut SmallRng, width: usize, height: usize, max_others: usize) -> Vec<String> {
    let mut grid = vec![vec![' '; width]; height];
    for (y, row) in grid.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                *cell = 'x';
            }
        }
    }

    let main_row = rng.gen_range(1..height - 1);
    let main_x = rng.gen_range(1..=width - 3);
    grid[main_row][main_x] = 'a';
    grid[main_row][main_x + 1] = 'a';
    grid[main_row][width - 1] = 'z';

    let others = rng.gen_range(0..=max_others);
    let mut letter = b'b';
    for _ in 0..others {
        for _attempt in 0..20 {
            let length = rng.gen_range(2..=3usize);
            let horizontal = rng.gen_bool(0.5);
            let (span, cross) = if horizontal { (width, height) } else { (height, width) };
            if span - 2 < length {
                continue;
            }
            let origin = rng.gen_range(1..=span - 1 - length);
            let axis = rng.gen_range(1..cross - 1);
            let cells: Vec<(usize, usize)> = (origin..origin + length)
                .map(|along| if horizontal { (along, axis) } else { (axis, along) })
                .collect();
            if cells.iter().all(|&(x, y)| grid[y][x] == ' ') {
                for (x, y) in cells {
                    grid[y][x] = letter as char;
                }
                letter += 1;
                break;
            }
        }
    }

    grid.into_iter().map(|row| row.into_iter().collect()).collect()
}
