//! 2D piece shapes and their rotations.
//!
//! A square grid has four rotations (0, 90, 180 and 270 degrees). Pieces are
//! never reflected, so a shape has between one and four distinct orientations
//! depending on its rotational symmetry.

use std::fmt;

use crate::error::ShapeError;

/// A relative cell position `(x, y)`; `y` grows downwards.
pub type Coord = (i32, i32);

/// Number of quarter turns that bring a shape back to itself.
const NUM_ROTATIONS: usize = 4;

/// Largest bounding box side accepted by [`Shape::from_cells`].
pub const MAX_SPAN: usize = 4096;

/// A rectangular occupancy grid trimmed to its bounding box.
///
/// Every row and every column holds at least one occupied cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    width: usize,
    height: usize,
    /// Row-major occupancy, `width * height` entries.
    cells: Vec<bool>,
}

impl Shape {
    /// Builds a shape from rows of occupancy flags.
    ///
    /// Rows may have different lengths; missing entries are empty. Blank rows
    /// and columns around the occupied area are trimmed. A blank row between
    /// occupied rows is rejected.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, ShapeError> {
        let occupied_rows: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.as_ref().contains(&true))
            .map(|(index, _)| index)
            .collect();
        let (Some(&top), Some(&bottom)) = (occupied_rows.first(), occupied_rows.last()) else {
            return Err(ShapeError::EmptyPiece);
        };
        if let Some(row) = (top..=bottom).find(|row| !occupied_rows.contains(row)) {
            return Err(ShapeError::EmptyRow { row });
        }

        let rows = &rows[top..=bottom];
        let left = rows
            .iter()
            .filter_map(|row| row.as_ref().iter().position(|&cell| cell))
            .min()
            .unwrap_or(0);
        let right = rows
            .iter()
            .filter_map(|row| row.as_ref().iter().rposition(|&cell| cell))
            .max()
            .unwrap_or(0);

        let width = right - left + 1;
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            let row = row.as_ref();
            cells.extend((left..=right).map(|x| row.get(x).copied().unwrap_or(false)));
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Builds a shape from a set of relative cell coordinates.
    ///
    /// Coordinates are translated so the minimum x and y are zero; negative
    /// values are fine. Duplicates are ignored. The bounding box may span at
    /// most [`MAX_SPAN`] cells in each direction.
    pub fn from_cells(coords: &[Coord]) -> Result<Self, ShapeError> {
        let (Some(min_x), Some(max_x)) = (
            coords.iter().map(|&(x, _)| x).min(),
            coords.iter().map(|&(x, _)| x).max(),
        ) else {
            return Err(ShapeError::EmptyPiece);
        };
        let min_y = coords.iter().map(|&(_, y)| y).min().unwrap_or(0);
        let max_y = coords.iter().map(|&(_, y)| y).max().unwrap_or(0);

        let span = |low: i32, high: i32| (i64::from(high) - i64::from(low)) as u64 + 1;
        let (width, height) = (span(min_x, max_x), span(min_y, max_y));
        if width > MAX_SPAN as u64 || height > MAX_SPAN as u64 {
            return Err(ShapeError::TooLarge {
                width,
                height,
                limit: MAX_SPAN,
            });
        }

        let mut rows = vec![vec![false; width as usize]; height as usize];
        for &(x, y) in coords {
            let column = (i64::from(x) - i64::from(min_x)) as usize;
            let row = (i64::from(y) - i64::from(min_y)) as usize;
            rows[row][column] = true;
        }

        Self::from_rows(&rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Returns whether `(x, y)` is occupied. Out-of-range positions are empty.
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Occupied cells in reading order (row by row, left to right).
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &cell)| cell)
            .map(|(index, _)| (index % self.width, index / self.width))
    }

    /// Column of the leftmost occupied cell in row `y`.
    pub fn first_in_row(&self, y: usize) -> Option<usize> {
        (0..self.width).find(|&x| self.is_occupied(x, y))
    }

    /// Rotates the shape a quarter turn counter-clockwise.
    ///
    /// Column `width - 1` becomes row 0. The result is still trimmed, since
    /// rotation maps bounding-box edges onto bounding-box edges.
    pub fn rotated(&self) -> Self {
        let width = self.height;
        let height = self.width;
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(self.is_occupied(self.width - y - 1, x));
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    /// Returns whether the shape's bounding box fits a `width` x `height` board.
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.width <= width && self.height <= height
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            if y > 0 {
                writeln!(f)?;
            }
            let line: String = (0..self.width)
                .map(|x| if self.is_occupied(x, y) { '*' } else { ' ' })
                .collect();
            f.write_str(line.trim_end())?;
        }
        Ok(())
    }
}

/// Generates the distinct rotations of a shape, starting with the shape itself.
///
/// Rotation stops at the first quarter turn that reproduces an earlier
/// orientation. A shape's rotation orbit always has 1, 2 or 4 members, so this
/// yields exactly the distinct orientations.
pub fn distinct_rotations(shape: &Shape) -> Vec<Shape> {
    let mut orientations = vec![shape.clone()];

    for _ in 1..NUM_ROTATIONS {
        let Some(previous) = orientations.last() else {
            break;
        };
        let next = previous.rotated();
        if orientations.contains(&next) {
            break;
        }
        orientations.push(next);
    }

    orientations
}
