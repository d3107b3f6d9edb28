//! Breadth-first search for the shortest sequence of slides.
use crate::engine::Board;
use crate::error::{PuzzleError, PuzzleResult};
use crate::state::{Move, SearchState, StateKey};
use log::{debug, info, trace};
use rustc_hash::FxHashSet;

/// How often (in expanded states) progress is traced.
const TRACE_INTERVAL: usize = 10_000;

/// The set of state keys already generated during one search run.
///
/// A fresh set is created by every `solve_bfs` call, so independent searches
/// never see each other's states.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: FxHashSet<StateKey>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as seen. Returns `true` if it was not seen before.
    pub fn insert(&mut self, key: StateKey) -> bool {
        self.seen.insert(key)
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Every state generated during a search, addressed by index.
///
/// States are only ever appended, so an index identifies a state for the whole
/// run. `ancestors[i]` is the index of the state `states[i]` was generated from;
/// the root at index 0 has none. Indices at or past the search cursor double as
/// the BFS frontier.
#[derive(Debug, Default)]
pub struct SearchArena {
    states: Vec<SearchState>,
    ancestors: Vec<Option<usize>>,
}

impl SearchArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `state`, generated from `parent`, and returns its index.
    pub fn push(&mut self, state: SearchState, parent: Option<usize>) -> usize {
        self.states.push(state);
        self.ancestors.push(parent);
        self.states.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&SearchState> {
        self.states.get(index)
    }

    pub fn ancestor(&self, index: usize) -> Option<usize> {
        self.ancestors.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Indices from the root to `index`, following the ancestor links.
    pub fn path_to(&self, index: usize) -> Vec<usize> {
        let mut path = vec![index];
        let mut current = index;
        while let Some(parent) = self.ancestor(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }
}

/// A shortest solution found by the solver.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Every state from the root to the goal, both included.
    pub path: Vec<SearchState>,
    /// The slide between each pair of consecutive states in `path`.
    pub moves: Vec<Move>,
    /// Number of states expanded before the goal was dequeued.
    pub explored: usize,
    /// Number of distinct states generated, root included.
    pub generated: usize,
}

impl Solution {
    pub fn move_count(&self) -> usize {
        self.path.len() - 1
    }
}

/// Result of a search run.
#[derive(Clone, Debug)]
pub enum SearchOutcome {
    /// The main car can reach the exit.
    Solved(Solution),
    /// Every reachable state was expanded without reaching the exit.
    Exhausted { explored: usize, generated: usize },
}

impl SearchOutcome {
    pub fn found(&self) -> bool {
        matches!(self, SearchOutcome::Solved(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SearchOutcome::Solved(solution) => Some(solution),
            SearchOutcome::Exhausted { .. } => None,
        }
    }

    pub fn explored(&self) -> usize {
        match self {
            SearchOutcome::Solved(solution) => solution.explored,
            SearchOutcome::Exhausted { explored, .. } => *explored,
        }
    }

    pub fn generated(&self) -> usize {
        match self {
            SearchOutcome::Solved(solution) => solution.generated,
            SearchOutcome::Exhausted { generated, .. } => *generated,
        }
    }
}

/// The slides between consecutive states of `path`.
///
/// Fails with `PuzzleError::BrokenPath` if two neighbouring states do not
/// differ by exactly one slide.
pub fn moves_along(path: &[SearchState]) -> PuzzleResult<Vec<Move>> {
    path.windows(2)
        .enumerate()
        .map(|(step, pair)| {
            pair[1]
                .move_from(&pair[0])
                .ok_or(PuzzleError::BrokenPath { step: step + 1 })
        })
        .collect()
}

/// Solves the puzzle with a breadth-first search from `root`.
///
/// `board` must be the board `root` was extracted from: it holds the car
/// geometries and the exit, and is used as scratch space to test moves. It is
/// left cleared when the search returns.
///
/// A state is checked against the exit when it is dequeued, before it is
/// expanded, which makes the first goal found a shortest one.
///
/// # Arguments
/// * `board`: The cleared board with all car geometries registered.
/// * `root`: The starting arrangement, usually from `SearchState::extract_from`.
///
/// # Returns
/// * `Ok(SearchOutcome::Solved)` with the shortest path to the exit.
/// * `Ok(SearchOutcome::Exhausted)` if the exit cannot be reached.
/// * `Err(PuzzleError)` if the board has no exit or a state turns out to be
///   inconsistent with the board (colliding cars, unknown car codes).
///
/// # Examples
/// ```
/// use rush_hour_solver::utils::board_from_str_array;
/// use rush_hour_solver::state::SearchState;
/// use rush_hour_solver::solver::solve_bfs;
///
/// let mut board = board_from_str_array(&[
///     "xxxxxx",
///     "x    x",
///     "xaa bz",
///     "x   bx",
///     "x    x",
///     "xxxxxx",
/// ]).unwrap();
/// let root = SearchState::extract_from(&mut board).unwrap();
/// let outcome = solve_bfs(&mut board, root).unwrap();
/// assert_eq!(outcome.solution().unwrap().move_count(), 2);
/// ```
pub fn solve_bfs(board: &mut Board, root: SearchState) -> PuzzleResult<SearchOutcome> {
    if board.exit().is_none() {
        return Err(PuzzleError::MissingExit);
    }

    let mut dedup = DedupSet::new();
    let mut arena = SearchArena::new();
    dedup.insert(root.serialize());
    arena.push(root, None);

    let mut cursor = 0;
    let mut goal = None;

    while let Some(current) = arena.get(cursor) {
        if current.is_solution(board)? {
            goal = Some(cursor);
            break;
        }

        let successors = current.enumerate_successors(board)?;
        for candidate in successors {
            if dedup.insert(candidate.serialize()) {
                arena.push(candidate, Some(cursor));
            }
        }

        cursor += 1;
        if cursor % TRACE_INTERVAL == 0 {
            trace!("expanded {} states, {} generated", cursor, arena.len());
        }
    }

    debug!(
        "search finished after expanding {} states ({} generated, {} keys)",
        cursor,
        arena.len(),
        dedup.len()
    );

    let outcome = match goal {
        Some(index) => {
            let path: Vec<SearchState> = arena
                .path_to(index)
                .into_iter()
                .filter_map(|i| arena.get(i).cloned())
                .collect();
            let moves = moves_along(&path)?;
            let solution = Solution {
                path,
                moves,
                explored: cursor,
                generated: arena.len(),
            };
            info!(
                "solved in {} moves, {} states explored",
                solution.move_count(),
                solution.explored
            );
            SearchOutcome::Solved(solution)
        }
        None => {
            info!("no solution, {} states explored", cursor);
            SearchOutcome::Exhausted {
                explored: cursor,
                generated: arena.len(),
            }
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CarPosition;
    use crate::utils::board_from_str_array;

    fn solve_rows(rows: &[&str]) -> SearchOutcome {
        let mut board = board_from_str_array(rows).unwrap();
        let root = SearchState::extract_from(&mut board).unwrap();
        solve_bfs(&mut board, root).unwrap()
    }

    #[test]
    fn test_arena_path_to() {
        let mut arena = SearchArena::new();
        let state = SearchState::new(CarPosition::new(0, 1), []).unwrap();
        let root = arena.push(state.clone(), None);
        let a = arena.push(state.clone(), Some(root));
        let b = arena.push(state.clone(), Some(root));
        let c = arena.push(state, Some(b));

        assert_eq!(arena.path_to(root), vec![0]);
        assert_eq!(arena.path_to(a), vec![0, 1]);
        assert_eq!(arena.path_to(c), vec![0, 2, 3]);
        assert_eq!(arena.ancestor(root), None);
        assert_eq!(arena.len(), 4);
    }

    #[test]
    fn test_moves_along_rejects_non_slide_steps() {
        let start = SearchState::new(CarPosition::new(0, 1), [CarPosition::new(1, 2)]).unwrap();
        let slid = SearchState::new(CarPosition::new(0, 1), [CarPosition::new(1, 3)]).unwrap();
        let jumped = SearchState::new(CarPosition::new(0, 3), [CarPosition::new(1, 1)]).unwrap();

        let moves = moves_along(&[start.clone(), slid.clone()]).unwrap();
        assert_eq!(moves, vec![Move { code: 1, offset: 1 }]);
        assert!(moves_along(&[start.clone()]).unwrap().is_empty());

        assert!(matches!(
            moves_along(&[start.clone(), slid.clone(), jumped]),
            Err(PuzzleError::BrokenPath { step: 2 })
        ));
        assert!(matches!(
            moves_along(&[start.clone(), start]),
            Err(PuzzleError::BrokenPath { step: 1 })
        ));
    }

    #[test]
    fn test_dedup_set_insert() {
        let mut dedup = DedupSet::new();
        let key = SearchState::new(CarPosition::new(0, 2), []).unwrap().serialize();
        assert!(dedup.is_empty());
        assert!(dedup.insert(key));
        assert!(!dedup.insert(key));
        assert!(dedup.contains(&key));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn test_solve_already_solved() {
        let outcome = solve_rows(&[
            "xxxxx", //
            "x aaz", //
            "xxxxx", //
        ]);
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.move_count(), 0);
        assert!(solution.moves.is_empty());
        assert_eq!(solution.explored, 0);
        assert_eq!(solution.generated, 1);
    }

    #[test]
    fn test_solve_single_slide() {
        let outcome = solve_rows(&[
            "xxxxxxx", //
            "xaa   z", //
            "xxxxxxx", //
        ]);
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.move_count(), 1);
        assert_eq!(solution.moves, vec![Move { code: 0, offset: 3 }]);
    }

    #[test]
    fn test_solve_scenario_path_and_counts() {
        let outcome = solve_rows(&[
            "xxxxxx", //
            "x    x", //
            "xaa bz", //
            "x   bx", //
            "x    x", //
            "xxxxxx", //
        ]);
        assert!(outcome.found());
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.move_count(), 2);
        assert_eq!(
            solution.moves,
            vec![Move { code: 1, offset: 1 }, Move { code: 0, offset: 2 }]
        );
        assert_eq!(solution.explored, 6);
        assert_eq!(solution.generated, 7);
        assert_eq!(
            solution.path.last().unwrap(),
            &SearchState::new(CarPosition::new(0, 3), [CarPosition::new(1, 3)]).unwrap()
        );
    }

    #[test]
    fn test_solve_exhausted() {
        let outcome = solve_rows(&[
            "xxxxxx", //
            "x   bx", //
            "xaa bz", //
            "x   bx", //
            "x   bx", //
            "xxxxxx", //
        ]);
        assert!(!outcome.found());
        assert!(outcome.solution().is_none());
        assert_eq!(outcome.explored(), 2);
        assert_eq!(outcome.generated(), 2);
    }

    #[test]
    fn test_solve_leaves_board_cleared() {
        let rows = [
            "xxxxxx", //
            "x    x", //
            "xaa bz", //
            "x   bx", //
            "x    x", //
            "xxxxxx", //
        ];
        let mut board = board_from_str_array(&rows).unwrap();
        let root = SearchState::extract_from(&mut board).unwrap();
        let cleared = board.clone();
        solve_bfs(&mut board, root).unwrap();
        assert_eq!(board, cleared);
    }

    #[test]
    fn test_solve_runs_are_independent() {
        let rows = [
            "xxxxxx", //
            "x    x", //
            "xaa bz", //
            "x   bx", //
            "x    x", //
            "xxxxxx", //
        ];
        let first = solve_rows(&rows);
        let second = solve_rows(&rows);
        assert_eq!(first.explored(), second.explored());
        assert_eq!(first.generated(), second.generated());
    }

    #[test]
    fn test_solve_reports_collision() {
        let mut board = board_from_str_array(&[
            "xxxxxx", //
            "x    x", //
            "xaa bz", //
            "x   bx", //
            "x    x", //
            "xxxxxx", //
        ])
        .unwrap();
        SearchState::extract_from(&mut board).unwrap();
        // Main car pushed into the exit cell.
        let broken = SearchState::new(CarPosition::new(0, 4), [CarPosition::new(1, 3)]).unwrap();
        assert!(matches!(
            solve_bfs(&mut board, broken),
            Err(PuzzleError::PlacementConflict { x: 5, y: 2, existing: 'z', .. })
        ));
    }
}
