//! Configuration errors.
//!
//! Everything here is fatal and reported before any search starts. Placement
//! conflicts during the search are not errors, and neither is an exhausted
//! search space (see [`Outcome::Unsolvable`](crate::solver::Outcome)).

/// A malformed piece shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// The notation contains something other than `*` or blanks.
    #[error("invalid character {character:?} in row {row}")]
    InvalidCharacter { character: char, row: usize },
    /// A row between occupied rows has no occupied cell. Rows are counted
    /// from 0 at the first input row.
    #[error("row {row} has no occupied cell")]
    EmptyRow { row: usize },
    /// The piece has no occupied cell at all.
    #[error("piece has no occupied cell")]
    EmptyPiece,
    /// The coordinates span more than
    /// [`MAX_SPAN`](crate::geometry::MAX_SPAN) cells in some direction.
    #[error("piece spans {width}x{height} cells, at most {limit} are allowed in each direction")]
    TooLarge {
        width: u64,
        height: u64,
        limit: usize,
    },
}

/// Error for [`Puzzle`](crate::pieces::Puzzle) construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    EmptyBoard { width: usize, height: usize },
    /// Piece number `index` (0-based, in input order) has a malformed shape.
    #[error("cannot parse piece {index}: {source}")]
    InvalidPiece {
        index: usize,
        #[source]
        source: ShapeError,
    },
    #[error("piece {name} is too large to fit on a {width}x{height} board in any orientation")]
    PieceTooLarge {
        name: char,
        width: usize,
        height: usize,
    },
    #[error("pieces occupy a total of {cells} cells, but a {width}x{height} board has {} cells", .width * .height)]
    AreaMismatch {
        cells: usize,
        width: usize,
        height: usize,
    },
    #[error("too many pieces: {count} given, but only {available} identifiers are available")]
    TooManyPieces { count: usize, available: usize },
    #[error("piece identifier {0:?} is used more than once")]
    DuplicateIdentifier(char),
    /// Whitespace, control and box-drawing characters cannot name a piece.
    #[error("piece identifier {0:?} cannot be drawn")]
    InvalidIdentifier(char),
}
