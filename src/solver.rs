use log::{debug, info, trace};
use std::collections::HashMap;
use std::io::{self, Write};

use crate::engine::{Bookcase, Move};
use crate::error::SolveError;

/// Printed when the search ends without reaching a solved bookcase.
pub const NO_SOLUTION: &str = "No Solution?";

/// Index of a configuration inside [`History`].
pub type NodeId = usize;

#[derive(Clone, Copy, Debug)]
struct Node {
    parent: Option<NodeId>,
    via: Option<Move>,
}

/// Every configuration generated during one search run.
///
/// Each grid is stored once, as a key of `seen`. The arena only keeps the link back
/// to the parent node and the move that led here, so a winning path is rebuilt by
/// replaying those moves from the root.
#[derive(Debug)]
pub struct History {
    root: Bookcase,
    nodes: Vec<Node>,
    seen: HashMap<Bookcase, NodeId>,
}

impl History {
    /// Starts a history containing only `root`, which gets id 0.
    pub fn with_root(root: Bookcase) -> Result<Self, SolveError> {
        let mut history = History {
            root: root.clone(),
            nodes: Vec::new(),
            seen: HashMap::new(),
        };
        history.insert(&root, None, None)?;
        Ok(history)
    }

    /// Records `bookcase` unless an identical grid is already known.
    ///
    /// Returns the new id, or `None` for a duplicate.
    pub fn insert(
        &mut self,
        bookcase: &Bookcase,
        parent: Option<NodeId>,
        via: Option<Move>,
    ) -> Result<Option<NodeId>, SolveError> {
        if self.seen.contains_key(bookcase) {
            return Ok(None);
        }
        self.nodes.try_reserve(1)?;
        self.seen.try_reserve(1)?;

        let id = self.nodes.len();
        self.seen.insert(bookcase.clone(), id);
        self.nodes.push(Node { parent, via });
        Ok(Some(id))
    }

    pub fn id_of(&self, bookcase: &Bookcase) -> Option<NodeId> {
        self.seen.get(bookcase).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn contains(&self, bookcase: &Bookcase) -> bool {
        self.seen.contains_key(bookcase)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids from the root down to `id`, inclusive.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Rebuilds the path ending at `goal` by replaying its moves from the root.
    pub fn solution(&self, goal: NodeId) -> Solution {
        let moves: Vec<Move> = self
            .path_to(goal)
            .iter()
            .filter_map(|&id| self.nodes[id].via)
            .collect();
        let mut path = Vec::with_capacity(moves.len() + 1);
        path.push(self.root.clone());
        for &mv in &moves {
            let next = path[path.len() - 1].after_move(mv);
            path.push(next);
        }
        Solution { path, moves }
    }
}

/// A shortest path from the initial bookcase to a solved one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    path: Vec<Bookcase>,
    moves: Vec<Move>,
}

impl Solution {
    /// Number of bookcases on the path, the initial one included.
    /// An already-solved puzzle has a solution of length 1.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Every bookcase from the initial one to the solved one.
    pub fn path(&self) -> &[Bookcase] {
        &self.path
    }

    /// The moves between successive bookcases of [`Solution::path`].
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }
}

/// How the search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved(Solution),
    /// No new configuration could be reached before the depth bound.
    Exhausted,
    /// The depth bound was reached with configurations still left to expand.
    TooDeep,
}

impl SearchOutcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SearchOutcome::Solved(solution) => Some(solution),
            SearchOutcome::Exhausted | SearchOutcome::TooDeep => None,
        }
    }
}

/// Counters collected while searching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Frontiers that were goal-tested.
    pub levels: usize,
    /// Successors produced by move generation, duplicates included.
    pub generated: usize,
    /// Successors dropped because they were already in the history.
    pub duplicates: usize,
    /// Size of the history when the search stopped.
    pub visited: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

/// Tuning knobs for [`solve_bfs`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Overrides the depth bound derived from the number of rows.
    pub depth_bound: Option<usize>,
}

impl SearchLimits {
    pub fn depth_bound_for(&self, rows: usize) -> usize {
        self.depth_bound.unwrap_or_else(|| default_depth_bound(rows))
    }
}

/// The depth at which the search gives up: `rows * (rows - 1) + 1`.
///
/// `rows * (rows - 1)` is the number of ordered row pairs. For a single row that
/// product is 0, so it is raised to 1 to make sure the initial bookcase is still tested.
/// This is a ceiling, not a proof: a puzzle needing more levels is reported unsolved.
///
/// ```
/// use bookcase_solver::solver::default_depth_bound;
/// assert_eq!(default_depth_bound(9), 73);
/// assert_eq!(default_depth_bound(1), 2);
/// ```
pub fn default_depth_bound(rows: usize) -> usize {
    (rows * rows.saturating_sub(1)).max(1) + 1
}

/// Breadth-first search for a shortest sequence of moves that solves `root`.
///
/// Each level goal-tests the whole frontier first; the first solved bookcase in
/// frontier order wins. Frontier order is generation order, which ties break by
/// parent position, then source row, then destination row. Successors already in
/// the history are dropped. The search stops as `Exhausted` when a level produces
/// nothing new and as `TooDeep` once the depth bound is reached.
pub fn solve_bfs(root: &Bookcase, limits: &SearchLimits) -> Result<SearchResult, SolveError> {
    let depth_bound = limits.depth_bound_for(root.rows());
    let mut history = History::with_root(root.clone())?;
    let mut frontier: Vec<(NodeId, Bookcase)> = vec![(0, root.clone())];
    let mut stats = SearchStats::default();
    let mut depth = 0;

    info!(
        "searching {}x{} bookcase, depth bound {}",
        root.rows(),
        root.columns(),
        depth_bound
    );

    let outcome = loop {
        depth += 1;
        if depth >= depth_bound {
            break SearchOutcome::TooDeep;
        }
        stats.levels += 1;
        debug!(
            "level {}: frontier {}, history {}",
            depth - 1,
            frontier.len(),
            history.len()
        );

        if let Some((goal, _)) = frontier.iter().find(|(_, bookcase)| bookcase.is_solved()) {
            break SearchOutcome::Solved(history.solution(*goal));
        }

        let mut next_frontier: Vec<(NodeId, Bookcase)> = Vec::new();
        for (id, bookcase) in &frontier {
            for (mv, child) in bookcase.successors() {
                stats.generated += 1;
                match history.insert(&child, Some(*id), Some(mv))? {
                    Some(child_id) => {
                        trace!("node {} -> {} via {}", id, child_id, mv);
                        next_frontier.try_reserve(1)?;
                        next_frontier.push((child_id, child));
                    }
                    None => stats.duplicates += 1,
                }
            }
        }

        if next_frontier.is_empty() {
            break SearchOutcome::Exhausted;
        }
        frontier = next_frontier;
    };

    stats.visited = history.len();
    match &outcome {
        SearchOutcome::Solved(solution) => info!(
            "solved in {} moves after {} levels, {} states visited",
            solution.moves().len(),
            stats.levels,
            stats.visited
        ),
        SearchOutcome::Exhausted => info!(
            "state space exhausted after {} levels, {} states visited",
            stats.levels, stats.visited
        ),
        SearchOutcome::TooDeep => info!(
            "depth bound {} reached, {} states visited",
            depth_bound, stats.visited
        ),
    }

    Ok(SearchResult { outcome, stats })
}

/// Writes the result of a search.
///
/// Terse mode prints the path length. Verbose mode prints the path length, a blank
/// line, then every bookcase of the path followed by a blank line. Without a
/// solution the output is `No Solution?`.
pub fn write_report<W: Write>(out: &mut W, outcome: &SearchOutcome, verbose: bool) -> io::Result<()> {
    let solution = match outcome.solution() {
        Some(solution) => solution,
        None => return writeln!(out, "{}", NO_SOLUTION),
    };

    if !verbose {
        return writeln!(out, "{}", solution.len());
    }

    writeln!(out, "{}", solution.len())?;
    writeln!(out)?;
    for bookcase in solution.path() {
        writeln!(out, "{}", bookcase)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Solves `root` with the default limits and writes the report to `out`.
///
/// # Examples
/// ```
/// use bookcase_solver::solver::solve;
/// use bookcase_solver::utils::parse_bookcase;
///
/// let root = parse_bookcase("2 2\nRR\n..\n").unwrap();
/// let mut out = Vec::new();
/// solve(&root, false, &mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "1\n");
/// ```
pub fn solve<W: Write>(root: &Bookcase, verbose: bool, out: &mut W) -> Result<SearchOutcome, SolveError> {
    let result = solve_bfs(root, &SearchLimits::default())?;
    write_report(out, &result.outcome, verbose)?;
    Ok(result.outcome)
}

/// The first move of a shortest solution from `bookcase`, if one exists within the default bound.
pub fn hint(bookcase: &Bookcase) -> Result<Option<Move>, SolveError> {
    let result = solve_bfs(bookcase, &SearchLimits::default())?;
    Ok(result
        .outcome
        .solution()
        .and_then(|solution| solution.moves().first().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{bookcase_from_str_array, parse_bookcase};

    fn report(text: &str, verbose: bool) -> String {
        let root = parse_bookcase(text).unwrap();
        let mut out = Vec::new();
        solve(&root, verbose, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn replay(solution: &Solution) {
        let path = solution.path();
        assert_eq!(solution.moves().len() + 1, path.len());
        for (step, mv) in solution.moves().iter().enumerate() {
            let mut bookcase = path[step].clone();
            bookcase.apply_move(*mv).unwrap();
            assert_eq!(bookcase, path[step + 1], "move {} does not lead to the next grid", mv);
        }
    }

    #[test]
    fn test_history_rejects_duplicates() {
        let root = bookcase_from_str_array(&["RG", "G."]).unwrap();
        let mut history = History::with_root(root.clone()).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.insert(&root, Some(0), None).unwrap(), None);

        let (mv, child) = root.successors().remove(0);
        assert_eq!(history.insert(&child, Some(0), Some(mv)).unwrap(), Some(1));
        assert_eq!(history.insert(&child, Some(0), Some(mv)).unwrap(), None);
        assert!(history.contains(&child));
        assert_eq!(history.id_of(&root), Some(0));
        assert_eq!(history.id_of(&child), Some(1));
        assert_eq!(history.len(), 2);
        assert_eq!(history.path_to(1), vec![0, 1]);
        assert_eq!(history.parent(0), None);
    }

    #[test]
    fn test_history_solution_replays_moves() {
        let root = bookcase_from_str_array(&["RGG", "...", "..."]).unwrap();
        let mut history = History::with_root(root.clone()).unwrap();
        let first = Move { from: 0, to: 1 };
        let second = Move { from: 0, to: 1 };
        let step = root.after_move(first);
        let end = step.after_move(second);
        let step_id = history.insert(&step, Some(0), Some(first)).unwrap().unwrap();
        let end_id = history.insert(&end, Some(step_id), Some(second)).unwrap().unwrap();

        let solution = history.solution(end_id);
        assert_eq!(solution.path(), &[root, step, end]);
        assert_eq!(solution.moves(), &[first, second]);
    }

    #[test]
    fn test_already_solved_root() {
        let root = bookcase_from_str_array(&["RR", ".."]).unwrap();
        let result = solve_bfs(&root, &SearchLimits::default()).unwrap();
        let solution = result.outcome.solution().unwrap();
        assert_eq!(solution.len(), 1);
        assert!(solution.moves().is_empty());
        assert_eq!(solution.path()[0], root);
        assert_eq!(result.stats.levels, 1);
        assert_eq!(result.stats.generated, 0);
    }

    #[test]
    fn test_single_move_solution() {
        let root = bookcase_from_str_array(&["RG", "G."]).unwrap();
        let result = solve_bfs(&root, &SearchLimits::default()).unwrap();
        let solution = result.outcome.solution().unwrap();
        assert_eq!(solution.len(), 2);
        assert_eq!(solution.moves(), &[Move { from: 0, to: 1 }]);
        assert_eq!(solution.path()[1].to_string(), "R.\nGG");
    }

    #[test]
    fn test_swap_puzzle_path() {
        let root = parse_bookcase("3 2\nRG\nGR\n..\n").unwrap();
        let result = solve_bfs(&root, &SearchLimits::default()).unwrap();
        let solution = result.outcome.solution().unwrap();
        // Two books must leave their rows and one must come back: 3 moves.
        assert_eq!(solution.len(), 4);
        assert_eq!(solution.path()[0], root);
        assert!(solution.path().last().unwrap().is_solved());
        assert!(solution.path()[..3].iter().all(|b| !b.is_solved()));
        replay(solution);
    }

    #[test]
    fn test_search_is_deterministic() {
        let root = bookcase_from_str_array(&["RGB", "BR.", "G..", "..."]).unwrap();
        let first = solve_bfs(&root, &SearchLimits::default()).unwrap();
        let second = solve_bfs(&root, &SearchLimits::default()).unwrap();
        assert_eq!(first, second);
        replay(first.outcome.solution().unwrap());
    }

    #[test]
    fn test_solution_is_shortest() {
        let root = bookcase_from_str_array(&["RGB", "BR.", "G..", "..."]).unwrap();
        let result = solve_bfs(&root, &SearchLimits::default()).unwrap();
        let len = result.outcome.solution().unwrap().len();

        // Nothing solved is reachable with fewer moves.
        let mut level = vec![root];
        for _ in 1..len {
            assert!(level.iter().all(|b| !b.is_solved()));
            level = level
                .iter()
                .flat_map(|b| b.successors().into_iter().map(|(_, child)| child))
                .collect();
        }
        assert!(level.iter().any(|b| b.is_solved()));
    }

    #[test]
    fn test_history_never_revisits() {
        let root = Bookcase::new_random_with_seed(4, 3, 3, 7);
        let result = solve_bfs(&root, &SearchLimits::default()).unwrap();
        let stats = result.stats;
        // Every generated successor is either new or a counted duplicate.
        assert_eq!(stats.visited, 1 + stats.generated - stats.duplicates);
    }

    #[test]
    fn test_no_moves_possible_is_exhausted() {
        let root = parse_bookcase("2 2\nRG\nGR\n").unwrap();
        let result = solve_bfs(&root, &SearchLimits::default()).unwrap();
        assert_eq!(result.outcome, SearchOutcome::Exhausted);
        assert_eq!(result.stats.levels, 1);
    }

    #[test]
    fn test_unsolvable_state_space_is_exhausted() {
        // Three colors can never fit on two rows.
        let root = bookcase_from_str_array(&["RG", "B."]).unwrap();
        let result = solve_bfs(&root, &SearchLimits::default()).unwrap();
        assert_eq!(result.outcome, SearchOutcome::Exhausted);
    }

    #[test]
    fn test_depth_bound_stops_search() {
        // Solvable in two moves, but two rows give a bound of 3: only levels 0 and 1 are tested.
        let root = bookcase_from_str_array(&["RGG", "..."]).unwrap();
        let result = solve_bfs(&root, &SearchLimits::default()).unwrap();
        assert_eq!(result.outcome, SearchOutcome::TooDeep);
        assert_eq!(result.stats.levels, 2);

        let deeper = SearchLimits {
            depth_bound: Some(4),
        };
        let result = solve_bfs(&root, &deeper).unwrap();
        let solution = result.outcome.solution().unwrap();
        assert_eq!(solution.len(), 3);
        assert_eq!(solution.path()[2].to_string(), "R..\nGG.");
    }

    #[test]
    fn test_depth_bound_override() {
        let root = parse_bookcase("3 2\nRG\nGR\n..\n").unwrap();
        let limits = SearchLimits {
            depth_bound: Some(3),
        };
        assert_eq!(limits.depth_bound_for(3), 3);
        let result = solve_bfs(&root, &limits).unwrap();
        assert_eq!(result.outcome, SearchOutcome::TooDeep);
    }

    #[test]
    fn test_default_depth_bound() {
        assert_eq!(SearchLimits::default().depth_bound_for(2), 3);
        assert_eq!(default_depth_bound(3), 7);
        assert_eq!(default_depth_bound(9), 73);
    }

    #[test]
    fn test_nine_rows_within_bound() {
        let root = bookcase_from_str_array(&[
            "K.", "R.", "G.", "Y.", "B.", "M.", "C.", "W.", "K.",
        ])
        .unwrap();
        let result = solve_bfs(&root, &SearchLimits::default()).unwrap();
        let solution = result.outcome.solution().unwrap();
        assert_eq!(solution.len(), 2);
        // First solved successor in generation order: row 0 onto row 8.
        assert_eq!(solution.moves(), &[Move { from: 0, to: 8 }]);
        assert!(result.stats.levels < default_depth_bound(9));
    }

    #[test]
    fn test_single_row_root_is_tested() {
        let root = bookcase_from_str_array(&["RRR"]).unwrap();
        let result = solve_bfs(&root, &SearchLimits::default()).unwrap();
        assert_eq!(result.outcome.solution().map(Solution::len), Some(1));
    }

    #[test]
    fn test_report_terse() {
        assert_eq!(report("2 2\nRR\n..\n", false), "1\n");
        assert_eq!(report("3 2\nRG\nGR\n..\n", false), "4\n");
        // Full shelves of one color are sorted even when the color repeats.
        assert_eq!(report("2 2\nRR\nRR\n", false), "1\n");
        assert_eq!(report("2 2\nRR\nRR\n", true), "1\n\nRR\nRR\n\n");
    }

    #[test]
    fn test_report_verbose() {
        assert_eq!(
            report("2 2\nRG\nG.\n", true),
            "2\n\nRG\nG.\n\nR.\nGG\n\n"
        );
    }

    #[test]
    fn test_report_no_solution() {
        assert_eq!(report("2 2\nRG\nGR\n", false), "No Solution?\n");
        assert_eq!(report("2 3\nRGB\n...\n", false), "No Solution?\n");
    }

    #[test]
    fn test_hint() {
        let root = bookcase_from_str_array(&["RG", "G."]).unwrap();
        assert_eq!(hint(&root).unwrap(), Some(Move { from: 0, to: 1 }));
        let solved = bookcase_from_str_array(&["RR", ".."]).unwrap();
        assert_eq!(hint(&solved).unwrap(), None);
    }
}
