//! Concurrent backtracking search.
//!
//! A fixed pool of workers shares one unbounded FIFO queue of partial tilings.
//! Each worker pops a state, finds its lowest free cell, and queues one child
//! per remaining piece and placement anchored on that cell that does not
//! overlap the board. The first complete tiling any worker produces is the
//! result. Which tiling that is depends on scheduling and may differ between
//! runs when several exist.
//!
//! Key points:
//! - Boards are immutable snapshots, so parents are shared without locks
//! - An outstanding-state counter detects an exhausted search space
//! - The result slot holds one solution; later finds are dropped

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, info, trace};

use crate::board::{Board, PlacementMask};
use crate::pieces::{Piece, Puzzle};

/// Worker pool settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Number of worker threads. Zero is treated as one.
    pub workers: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
        }
    }
}

impl SolverConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }
}

/// Twice the available hardware parallelism.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get() * 2)
        .unwrap_or(2)
}

/// One piece in a finished tiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedPiece {
    pub name: char,
    pub mask: PlacementMask,
}

impl PlacedPiece {
    /// Board coordinates `(x, y)` covered by this piece.
    pub fn cells(&self, width: usize) -> Vec<(usize, usize)> {
        self.mask.grid_positions(width)
    }
}

/// A complete tiling: every piece with the cells it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    width: usize,
    height: usize,
    placements: Vec<PlacedPiece>,
}

impl Solution {
    pub fn new(width: usize, height: usize, placements: Vec<PlacedPiece>) -> Self {
        Self {
            width,
            height,
            placements,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Placed pieces in the order the search placed them.
    pub fn placements(&self) -> &[PlacedPiece] {
        &self.placements
    }

    /// Each piece identifier with the board coordinates it covers.
    pub fn cell_sets(&self) -> Vec<(char, Vec<(usize, usize)>)> {
        self.placements
            .iter()
            .map(|placed| (placed.name, placed.cells(self.width)))
            .collect()
    }

    /// Returns whether the placements cover every cell exactly once.
    pub fn covers_board(&self) -> bool {
        let mut board = Board::new(self.width, self.height);
        for placed in &self.placements {
            match board.place(&placed.mask) {
                Some(next) => board = next,
                None => return false,
            }
        }
        board.first_free_spot().is_none()
    }
}

/// Result of a search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Solved(Solution),
    /// Every branch was explored without covering the board.
    Unsolvable,
}

impl Outcome {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Self::Solved(solution) => Some(solution),
            Self::Unsolvable => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            Self::Solved(solution) => Some(solution),
            Self::Unsolvable => None,
        }
    }
}

/// Work counters for one search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States pushed onto the queue, including the initial one.
    pub states_queued: u64,
    /// States popped and expanded.
    pub states_expanded: u64,
    /// States popped after a solution was found and dropped unexpanded.
    pub states_discarded: u64,
    /// Placement masks tried against a board.
    pub masks_tried: u64,
    /// Masks rejected because they overlap occupied cells.
    pub overlaps_pruned: u64,
}

/// Outcome of a search together with its counters.
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub outcome: Outcome,
    pub stats: SearchStats,
}

#[derive(Default)]
struct Counters {
    states_queued: AtomicU64,
    states_expanded: AtomicU64,
    states_discarded: AtomicU64,
    masks_tried: AtomicU64,
    overlaps_pruned: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> SearchStats {
        SearchStats {
            states_queued: self.states_queued.load(Ordering::Relaxed),
            states_expanded: self.states_expanded.load(Ordering::Relaxed),
            states_discarded: self.states_discarded.load(Ordering::Relaxed),
            masks_tried: self.masks_tried.load(Ordering::Relaxed),
            overlaps_pruned: self.overlaps_pruned.load(Ordering::Relaxed),
        }
    }
}

/// A partial tiling. Never modified once created; expanding it produces
/// new states.
struct SearchState<'a> {
    board: Board,
    /// Lowest free cell, `None` once the board is full.
    first_free: Option<usize>,
    placed: Vec<(&'a Piece, &'a PlacementMask)>,
    remaining: Vec<&'a Piece>,
}

impl<'a> SearchState<'a> {
    fn initial(puzzle: &'a Puzzle) -> Self {
        let board = Board::new(puzzle.width(), puzzle.height());
        Self {
            first_free: board.first_free_spot(),
            board,
            placed: Vec::new(),
            remaining: puzzle.pieces().iter().collect(),
        }
    }

    fn is_complete(&self) -> bool {
        self.first_free.is_none() && self.remaining.is_empty()
    }

    /// The state after placing `remaining[index]` at `mask`, given the
    /// resulting board.
    fn child(&self, index: usize, mask: &'a PlacementMask, board: Board) -> Self {
        let mut placed = Vec::with_capacity(self.placed.len() + 1);
        placed.extend_from_slice(&self.placed);
        placed.push((self.remaining[index], mask));

        let mut remaining = self.remaining.clone();
        remaining.remove(index);

        Self {
            // masks may cover cells past the anchor, so rescan
            first_free: board.first_free_spot(),
            board,
            placed,
            remaining,
        }
    }

    fn into_solution(self, width: usize, height: usize) -> Solution {
        let placements = self
            .placed
            .into_iter()
            .map(|(piece, mask)| PlacedPiece {
                name: piece.name(),
                mask: mask.clone(),
            })
            .collect();
        Solution::new(width, height, placements)
    }
}

enum Job<'a> {
    Expand(SearchState<'a>),
    Shutdown,
}

/// State shared by all workers of one search.
struct Shared<'a> {
    width: usize,
    height: usize,
    workers: usize,
    jobs: Sender<Job<'a>>,
    queue: Receiver<Job<'a>>,
    results: Sender<Solution>,
    /// States queued or being expanded.
    pending: AtomicUsize,
    found: AtomicBool,
    counters: Counters,
}

impl<'a> Shared<'a> {
    fn enqueue(&self, state: SearchState<'a>) {
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.counters.states_queued.fetch_add(1, Ordering::Relaxed);
        // the receiver lives in `self`, so the channel cannot be disconnected
        let _ = self.jobs.send(Job::Expand(state));
    }

    fn run_worker(&self, worker: usize) {
        trace!("worker {worker} started");
        while let Ok(Job::Expand(state)) = self.queue.recv() {
            if self.found.load(Ordering::Acquire) {
                self.counters.states_discarded.fetch_add(1, Ordering::Relaxed);
            } else {
                self.expand(state);
            }
            self.finish_state();
        }
        trace!("worker {worker} stopped");
    }

    /// Marks one state as fully processed. Whoever retires the last
    /// outstanding state stops the pool.
    fn finish_state(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            debug!("search space drained, stopping {} workers", self.workers);
            for _ in 0..self.workers {
                let _ = self.jobs.send(Job::Shutdown);
            }
        }
    }

    fn expand(&self, state: SearchState<'a>) {
        self.counters.states_expanded.fetch_add(1, Ordering::Relaxed);
        let Some(cell) = state.first_free else {
            return;
        };

        for (index, &piece) in state.remaining.iter().enumerate() {
            for mask in piece.placements_at(cell) {
                self.counters.masks_tried.fetch_add(1, Ordering::Relaxed);
                let Some(board) = state.board.place(mask) else {
                    self.counters.overlaps_pruned.fetch_add(1, Ordering::Relaxed);
                    continue;
                };

                let child = state.child(index, mask, board);
                if child.is_complete() {
                    self.deliver(child);
                    return;
                }
                if child.first_free.is_none() {
                    // board full with pieces left over
                    continue;
                }
                self.enqueue(child);
            }
        }
    }

    fn deliver(&self, state: SearchState<'a>) {
        let solution = state.into_solution(self.width, self.height);
        if self.results.try_send(solution).is_ok() {
            self.found.store(true, Ordering::Release);
            debug!("solution delivered");
        } else {
            trace!("solution dropped, another worker was first");
        }
    }
}

/// Searches for one tiling of `puzzle` using the given pool settings.
///
/// Blocks until a tiling is found or the search space is exhausted. Worker
/// threads are joined before returning.
pub fn solve(puzzle: &Puzzle, config: &SolverConfig) -> SearchReport {
    let workers = config.workers.max(1);
    let (jobs, queue) = unbounded();
    let (results, found_solution) = bounded(1);

    let shared = Shared {
        width: puzzle.width(),
        height: puzzle.height(),
        workers,
        jobs,
        queue,
        results,
        pending: AtomicUsize::new(0),
        found: AtomicBool::new(false),
        counters: Counters::default(),
    };

    info!(
        "searching {}x{} board with {} pieces on {} workers",
        puzzle.width(),
        puzzle.height(),
        puzzle.pieces().len(),
        workers
    );
    let started = Instant::now();

    shared.enqueue(SearchState::initial(puzzle));
    thread::scope(|scope| {
        for worker in 0..workers {
            let shared = &shared;
            scope.spawn(move || shared.run_worker(worker));
        }
    });

    let stats = shared.counters.snapshot();
    let outcome = match found_solution.try_recv() {
        Ok(solution) => Outcome::Solved(solution),
        Err(_) => Outcome::Unsolvable,
    };
    info!(
        "search finished in {:.2?}: {} ({} states expanded, {} queued, {} discarded, {} masks tried, {} overlaps)",
        started.elapsed(),
        if matches!(outcome, Outcome::Solved(_)) { "solved" } else { "unsolvable" },
        stats.states_expanded,
        stats.states_queued,
        stats.states_discarded,
        stats.masks_tried,
        stats.overlaps_pruned
    );

    SearchReport { outcome, stats }
}
