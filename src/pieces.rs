//! Pieces, their placement index, and puzzle configuration.
//!
//! Each piece precomputes, for every board cell `c`, the placements whose
//! lowest occupied cell is `c`. The solver always fills the lowest free cell
//! next, so it only ever asks "which placements start exactly here".

use log::debug;
use rustc_hash::FxHashSet;

use crate::board::PlacementMask;
use crate::error::{ConfigError, ShapeError};
use crate::geometry::{distinct_rotations, Coord, Shape};
use crate::parse::parse_pieces;

/// Identifiers handed out to pieces, in input order.
pub const PIECE_NAMES: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Maximum number of pieces in a puzzle.
pub const MAX_PIECES: usize = PIECE_NAMES.len();

/// Offsets of an orientation's cells relative to an anchor cell, plus the
/// clearance the anchor needs on each side to keep the piece on the board.
struct Template {
    rows_above: usize,
    rows_below: usize,
    columns_left: usize,
    columns_right: usize,
    offsets: Vec<(isize, isize)>,
}

impl Template {
    /// Builds the template that anchors `orientation` on its first occupied
    /// cell in reading order, which is also the lowest cell of every mask it
    /// produces.
    fn new(orientation: &Shape) -> Option<Self> {
        let anchor_row = 0;
        let anchor_column = orientation.first_in_row(anchor_row)?;
        let offsets = orientation
            .occupied()
            .map(|(x, y)| {
                (
                    x as isize - anchor_column as isize,
                    y as isize - anchor_row as isize,
                )
            })
            .collect();

        Some(Self {
            rows_above: anchor_row,
            rows_below: orientation.height() - anchor_row - 1,
            columns_left: anchor_column,
            columns_right: orientation.width() - anchor_column - 1,
            offsets,
        })
    }

    /// Every mask this template produces on a `width` x `height` board.
    fn masks(&self, width: usize, height: usize) -> impl Iterator<Item = PlacementMask> + '_ {
        (self.rows_above..height - self.rows_below).flat_map(move |y| {
            (self.columns_left..width - self.columns_right).map(move |x| {
                PlacementMask::from_cells(self.offsets.iter().map(|&(dx, dy)| {
                    let cell_x = (x as isize + dx) as usize;
                    let cell_y = (y as isize + dy) as usize;
                    cell_y * width + cell_x
                }))
            })
        })
    }
}

/// A piece with its admissible orientations and placement index.
#[derive(Clone, Debug)]
pub struct Piece {
    name: char,
    shape: Shape,
    /// Distinct rotations that fit the board.
    orientations: Vec<Shape>,
    /// `placements[c]` holds every placement whose lowest cell is `c`.
    placements: Vec<Vec<PlacementMask>>,
}

impl Piece {
    /// Computes the orientations and placement index of `shape` on a
    /// `board_width` x `board_height` board.
    ///
    /// Fails if the piece does not fit the board in any orientation.
    pub fn new(
        name: char,
        shape: Shape,
        board_width: usize,
        board_height: usize,
    ) -> Result<Self, ConfigError> {
        let orientations: Vec<Shape> = distinct_rotations(&shape)
            .into_iter()
            .filter(|orientation| orientation.fits_within(board_width, board_height))
            .collect();
        if orientations.is_empty() {
            return Err(ConfigError::PieceTooLarge {
                name,
                width: board_width,
                height: board_height,
            });
        }

        let placements = build_placement_index(&orientations, board_width, board_height);

        let piece = Self {
            name,
            shape,
            orientations,
            placements,
        };
        debug!(
            "piece {}: {} cells, {} orientations, {} placements",
            piece.name,
            piece.cell_count(),
            piece.orientations.len(),
            piece.placement_count()
        );
        Ok(piece)
    }

    pub fn name(&self) -> char {
        self.name
    }

    /// The shape as given, before rotation.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn cell_count(&self) -> usize {
        self.shape.cell_count()
    }

    /// Distinct rotations of the piece that fit the board.
    pub fn orientations(&self) -> &[Shape] {
        &self.orientations
    }

    /// Placements whose lowest occupied cell is `cell`.
    #[inline]
    pub fn placements_at(&self, cell: usize) -> &[PlacementMask] {
        self.placements
            .get(cell)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of placements on the board.
    pub fn placement_count(&self) -> usize {
        self.placements.iter().map(Vec::len).sum()
    }
}

/// Builds the per-cell placement lists for the given orientations.
///
/// Each orientation gets one template anchored on its first cell, so every
/// mask is produced once and filed under its lowest cell.
fn build_placement_index(
    orientations: &[Shape],
    width: usize,
    height: usize,
) -> Vec<Vec<PlacementMask>> {
    let mut placements: Vec<Vec<PlacementMask>> = vec![Vec::new(); width * height];

    for template in orientations.iter().filter_map(Template::new) {
        for mask in template.masks(width, height) {
            if let Some(anchor) = mask.lowest_cell() {
                placements[anchor].push(mask);
            }
        }
    }

    placements
}

/// Identifiers must not blend into the diagram drawn by
/// [`format_solution`](crate::render::format_solution).
fn is_drawable_identifier(name: char) -> bool {
    !(name.is_whitespace() || name.is_control() || ('\u{2500}'..='\u{257f}').contains(&name))
}

/// A piece shape with a caller-chosen identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieceDefinition {
    pub name: char,
    pub shape: Shape,
}

impl PieceDefinition {
    pub fn new(name: char, shape: Shape) -> Self {
        Self { name, shape }
    }

    /// Defines a piece from relative cell coordinates.
    pub fn from_cells(name: char, cells: &[Coord]) -> Result<Self, ShapeError> {
        Ok(Self::new(name, Shape::from_cells(cells)?))
    }
}

/// A validated puzzle: board dimensions and the pieces that must cover it.
///
/// Built once and read-only afterwards; the solver shares it between all
/// of its worker threads.
#[derive(Clone, Debug)]
pub struct Puzzle {
    width: usize,
    height: usize,
    pieces: Vec<Piece>,
}

impl Puzzle {
    /// Creates a puzzle from pieces with explicit identifiers.
    ///
    /// The piece cell counts must add up to the board area, identifiers must
    /// be unique and visible in a rendered diagram, and there may be at most
    /// [`MAX_PIECES`] pieces.
    pub fn new(
        width: usize,
        height: usize,
        definitions: Vec<PieceDefinition>,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyBoard { width, height });
        }
        if definitions.len() > MAX_PIECES {
            return Err(ConfigError::TooManyPieces {
                count: definitions.len(),
                available: MAX_PIECES,
            });
        }

        let mut names: FxHashSet<char> = FxHashSet::default();
        for definition in &definitions {
            if !is_drawable_identifier(definition.name) {
                return Err(ConfigError::InvalidIdentifier(definition.name));
            }
            if !names.insert(definition.name) {
                return Err(ConfigError::DuplicateIdentifier(definition.name));
            }
        }

        let cells: usize = definitions
            .iter()
            .map(|definition| definition.shape.cell_count())
            .sum();
        if Some(cells) != width.checked_mul(height) {
            return Err(ConfigError::AreaMismatch {
                cells,
                width,
                height,
            });
        }

        let pieces = definitions
            .into_iter()
            .map(|definition| Piece::new(definition.name, definition.shape, width, height))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            width,
            height,
            pieces,
        })
    }

    /// Creates a puzzle naming the pieces `A`, `B`, `C`, ... in order.
    pub fn from_shapes(width: usize, height: usize, shapes: Vec<Shape>) -> Result<Self, ConfigError> {
        if shapes.len() > MAX_PIECES {
            return Err(ConfigError::TooManyPieces {
                count: shapes.len(),
                available: MAX_PIECES,
            });
        }
        let definitions = PIECE_NAMES
            .chars()
            .zip(shapes)
            .map(|(name, shape)| PieceDefinition::new(name, shape))
            .collect();
        Self::new(width, height, definitions)
    }

    /// Creates a puzzle from the ASCII piece notation (see [`crate::parse`]).
    pub fn parse(width: usize, height: usize, text: &str) -> Result<Self, ConfigError> {
        Self::from_shapes(width, height, parse_pieces(text)?)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of board cells.
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Pieces in configuration order.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }
}

/// A puzzle shipped with the crate, in ASCII piece notation.
#[derive(Clone, Copy, Debug)]
pub struct CatalogPuzzle {
    pub name: &'static str,
    pub width: usize,
    pub height: usize,
    pub pieces: &'static str,
}

impl CatalogPuzzle {
    pub fn build(&self) -> Result<Puzzle, ConfigError> {
        Puzzle::parse(self.width, self.height, self.pieces)
    }
}

/// Domino, monomino and L-tromino on a 3x2 board.
pub const SIMPLE_PUZZLE: CatalogPuzzle = CatalogPuzzle {
    name: "simple",
    width: 3,
    height: 2,
    pieces: r"
    **

    *

    **
    *
    ",
};

/// Three straight and two square tetrominoes on a 5x4 board.
pub const BARS_PUZZLE: CatalogPuzzle = CatalogPuzzle {
    name: "bars",
    width: 5,
    height: 4,
    pieces: r"
    ****

    ****

    ****

    **
    **

    **
    **
    ",
};

/// The twelve pentominoes of the Meiji chocolate puzzle on a 10x6 board.
pub const MEIJI_PUZZLE: CatalogPuzzle = CatalogPuzzle {
    name: "meiji",
    width: 10,
    height: 6,
    pieces: r"
    ****
    *

    ***
     **

    ****
     *

     *
    ***
     *

    **
     *
    **

    *
    *
    ***

      *
    ***
    *

    **
     **
      *

     *
    ***
      *

    ***
     *
     *

      **
    ***

    *****
    ",
};

/// All built-in puzzles.
pub const CATALOG: &[CatalogPuzzle] = &[SIMPLE_PUZZLE, BARS_PUZZLE, MEIJI_PUZZLE];

/// Looks up a built-in puzzle by name.
pub fn find_builtin(name: &str) -> Option<&'static CatalogPuzzle> {
    CATALOG.iter().find(|puzzle| puzzle.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(coords: &[Coord]) -> Shape {
        Shape::from_cells(coords).unwrap()
    }

    fn piece(coords: &[Coord], width: usize, height: usize) -> Piece {
        Piece::new('A', shape(coords), width, height).unwrap()
    }

    #[test]
    fn test_domino_placements_on_3x2() {
        let domino = piece(&[(0, 0), (1, 0)], 3, 2);
        assert_eq!(domino.orientations().len(), 2);
        // 4 horizontal + 3 vertical
        assert_eq!(domino.placement_count(), 7);

        let at_origin: Vec<Vec<usize>> = domino
            .placements_at(0)
            .iter()
            .map(|mask| mask.cells().collect())
            .collect();
        assert_eq!(at_origin, vec![vec![0, 1], vec![0, 3]]);

        // the last column only admits the vertical domino
        let at_right_edge: Vec<Vec<usize>> = domino
            .placements_at(2)
            .iter()
            .map(|mask| mask.cells().collect())
            .collect();
        assert_eq!(at_right_edge, vec![vec![2, 5]]);

        assert!(domino.placements_at(5).is_empty());
    }

    #[test]
    fn test_every_placement_is_keyed_by_its_lowest_cell() {
        let f_pentomino = piece(&[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)], 10, 7);
        assert_eq!(f_pentomino.orientations().len(), 4);

        for cell in 0..70 {
            for mask in f_pentomino.placements_at(cell) {
                assert_eq!(mask.lowest_cell(), Some(cell));
                assert_eq!(mask.cell_count(), 5);
                assert!(mask.cells().all(|c| c < 70));
            }
        }
        // 4 orientations, each with a 3x3 bounding box: 8 * 5 positions
        assert_eq!(f_pentomino.placement_count(), 4 * 8 * 5);
    }

    #[test]
    fn test_placement_index_has_no_duplicates() {
        // a plus has a 3x3 box whose first row holds a single cell
        let plus = piece(&[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)], 5, 5);
        let mut masks: FxHashSet<&PlacementMask> = FxHashSet::default();
        for cell in 0..25 {
            for mask in plus.placements_at(cell) {
                assert!(masks.insert(mask), "duplicate placement at {cell}");
            }
        }
        assert_eq!(plus.orientations().len(), 1);
        assert_eq!(plus.placement_count(), 9);
        assert_eq!(plus.placements_at(1)[0].cells().collect::<Vec<_>>(), vec![1, 5, 6, 7, 11]);
    }

    #[test]
    fn test_placements_never_wrap_around_rows() {
        let l_tromino = piece(&[(0, 0), (0, 1), (1, 1)], 4, 3);
        for cell in 0..12 {
            for mask in l_tromino.placements_at(cell) {
                let positions = mask.grid_positions(4);
                let min_x = positions.iter().map(|&(x, _)| x).min().unwrap();
                let max_x = positions.iter().map(|&(x, _)| x).max().unwrap();
                let min_y = positions.iter().map(|&(_, y)| y).min().unwrap();
                let max_y = positions.iter().map(|&(_, y)| y).max().unwrap();
                assert_eq!((max_x - min_x, max_y - min_y), (1, 1), "{positions:?}");
            }
        }
    }

    #[test]
    fn test_placement_index_is_reproducible() {
        let coords = [(0, 0), (1, 0), (2, 0), (1, 1)];
        let first = piece(&coords, 6, 5);
        let second = piece(&coords, 6, 5);

        for cell in 0..30 {
            let a: FxHashSet<&PlacementMask> = first.placements_at(cell).iter().collect();
            let b: FxHashSet<&PlacementMask> = second.placements_at(cell).iter().collect();
            assert_eq!(a, b, "placements at {cell} differ");
        }
    }

    #[test]
    fn test_orientations_too_large_are_dropped() {
        let bar = piece(&[(0, 0), (1, 0), (2, 0)], 1, 3);
        assert_eq!(bar.orientations().len(), 1);
        assert_eq!(bar.orientations()[0].width(), 1);
        assert_eq!(bar.placement_count(), 1);
    }

    #[test]
    fn test_piece_too_large_everywhere() {
        let result = Piece::new('Q', shape(&[(0, 0), (1, 0), (2, 0)]), 2, 2);
        assert_eq!(
            result.unwrap_err(),
            ConfigError::PieceTooLarge {
                name: 'Q',
                width: 2,
                height: 2
            }
        );
    }

    #[test]
    fn test_area_mismatch() {
        let shapes = vec![shape(&[(0, 0)]), shape(&[(0, 0)])];
        let err = Puzzle::from_shapes(2, 2, shapes).unwrap_err();
        assert_eq!(
            err,
            ConfigError::AreaMismatch {
                cells: 2,
                width: 2,
                height: 2
            }
        );

        let shapes = vec![shape(&[(0, 0), (1, 0)]), shape(&[(0, 0), (0, 1), (1, 1)])];
        assert!(matches!(
            Puzzle::from_shapes(3, 2, shapes),
            Err(ConfigError::AreaMismatch { cells: 5, .. })
        ));
    }

    #[test]
    fn test_area_mismatch_is_reported_before_indexing() {
        // indexing a monomino on this board would need 10^10 placement lists
        let err = Puzzle::from_shapes(100_000, 100_000, vec![shape(&[(0, 0)])]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::AreaMismatch {
                cells: 1,
                width: 100_000,
                height: 100_000
            }
        );

        assert!(matches!(
            Puzzle::from_shapes(usize::MAX, 2, vec![shape(&[(0, 0)])]),
            Err(ConfigError::AreaMismatch { cells: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_identifier() {
        for name in [' ', '\t', '─', '│', '┼'] {
            let definitions = vec![
                PieceDefinition::from_cells('A', &[(0, 0)]).unwrap(),
                PieceDefinition::from_cells(name, &[(0, 0)]).unwrap(),
            ];
            assert_eq!(
                Puzzle::new(2, 1, definitions).unwrap_err(),
                ConfigError::InvalidIdentifier(name)
            );
        }

        let definitions = vec![
            PieceDefinition::from_cells('x', &[(0, 0)]).unwrap(),
            PieceDefinition::from_cells('7', &[(0, 0)]).unwrap(),
        ];
        assert!(Puzzle::new(2, 1, definitions).is_ok());
    }

    #[test]
    fn test_too_many_pieces() {
        let shapes = vec![shape(&[(0, 0)]); 27];
        assert_eq!(
            Puzzle::from_shapes(27, 1, shapes).unwrap_err(),
            ConfigError::TooManyPieces {
                count: 27,
                available: 26
            }
        );

        let shapes = vec![shape(&[(0, 0)]); 26];
        let puzzle = Puzzle::from_shapes(26, 1, shapes).unwrap();
        assert_eq!(puzzle.pieces().last().map(Piece::name), Some('Z'));
    }

    #[test]
    fn test_duplicate_identifier() {
        let definitions = vec![
            PieceDefinition::from_cells('X', &[(0, 0)]).unwrap(),
            PieceDefinition::from_cells('X', &[(0, 0)]).unwrap(),
        ];
        assert_eq!(
            Puzzle::new(2, 1, definitions).unwrap_err(),
            ConfigError::DuplicateIdentifier('X')
        );
    }

    #[test]
    fn test_empty_board() {
        assert_eq!(
            Puzzle::from_shapes(0, 3, Vec::new()).unwrap_err(),
            ConfigError::EmptyBoard {
                width: 0,
                height: 3
            }
        );
    }

    #[test]
    fn test_catalog_puzzles_are_valid() {
        for entry in CATALOG {
            let puzzle = entry.build().unwrap();
            let cells: usize = puzzle.pieces().iter().map(Piece::cell_count).sum();
            assert_eq!(cells, puzzle.cell_count(), "{}", entry.name);
        }

        let meiji = MEIJI_PUZZLE.build().unwrap();
        assert_eq!(meiji.pieces().len(), 12);
        assert!(meiji.pieces().iter().all(|piece| piece.cell_count() == 5));
        assert_eq!(find_builtin("meiji").map(|entry| entry.width), Some(10));
        assert!(find_builtin("soma").is_none());
    }

    #[test]
    fn test_simple_puzzle_names_pieces_in_order() {
        let puzzle = SIMPLE_PUZZLE.build().unwrap();
        let summary: Vec<(char, usize, usize)> = puzzle
            .pieces()
            .iter()
            .map(|piece| (piece.name(), piece.cell_count(), piece.orientations().len()))
            .collect();
        assert_eq!(summary, vec![('A', 2, 2), ('B', 1, 1), ('C', 3, 4)]);
    }
}
