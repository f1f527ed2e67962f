//! Polyomino Tiling Solver Library
//!
//! Finds one way to cover a rectangular board exactly with a fixed set of
//! pieces. Pieces may be rotated by quarter turns but not reflected, and each
//! piece is used exactly once.
//!
//! ```no_run
//! use tiler::pieces::Puzzle;
//! use tiler::render::format_solution;
//! use tiler::solver::{solve, SolverConfig};
//!
//! let puzzle = Puzzle::parse(3, 2, "**\n\n*\n\n**\n*\n")?;
//! let report = solve(&puzzle, &SolverConfig::default());
//! if let Some(solution) = report.outcome.solution() {
//!     print!("{}", format_solution(solution));
//! }
//! # Ok::<(), tiler::error::ConfigError>(())
//! ```

pub mod board;
pub mod error;
pub mod geometry;
pub mod parse;
pub mod pieces;
pub mod render;
pub mod solver;

pub use error::{ConfigError, ShapeError};
pub use pieces::{PieceDefinition, Puzzle};
pub use solver::{Outcome, Solution, SolverConfig};
