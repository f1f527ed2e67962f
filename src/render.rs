//! Box-drawing diagrams of solutions.
//!
//! A `width` x `height` board is drawn on a `(2 * width + 1)` x
//! `(2 * height + 1)` character canvas. Odd rows and columns hold cell
//! centres (the piece identifier), even ones hold edges and corners. Edges
//! are drawn between cells of different pieces and along the board border.

use crate::solver::Solution;

const BLANK: char = ' ';
const HORIZONTAL: char = '─';
const VERTICAL: char = '│';

const EDGE_LEFT: u8 = 1 << 0;
const EDGE_RIGHT: u8 = 1 << 1;
const EDGE_UP: u8 = 1 << 2;
const EDGE_DOWN: u8 = 1 << 3;

/// Picks the corner glyph joining the drawn edges around it.
const fn corner_glyph(edges: u8) -> char {
    const LR: u8 = EDGE_LEFT | EDGE_RIGHT;
    const UD: u8 = EDGE_UP | EDGE_DOWN;
    match edges {
        e if e == LR | UD => '┼',
        e if e == LR | EDGE_UP => '┴',
        e if e == LR | EDGE_DOWN => '┬',
        e if e == EDGE_LEFT | UD => '┤',
        e if e == EDGE_LEFT | EDGE_UP => '┘',
        e if e == EDGE_LEFT | EDGE_DOWN => '┐',
        e if e == EDGE_RIGHT | UD => '├',
        e if e == EDGE_RIGHT | EDGE_UP => '└',
        e if e == EDGE_RIGHT | EDGE_DOWN => '┌',
        e if e == LR || e == EDGE_LEFT || e == EDGE_RIGHT => HORIZONTAL,
        e if e == UD || e == EDGE_UP || e == EDGE_DOWN => VERTICAL,
        _ => BLANK,
    }
}

struct Canvas {
    width: usize,
    height: usize,
    chars: Vec<Vec<char>>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            chars: vec![vec![BLANK; 2 * width + 1]; 2 * height + 1],
        }
    }

    fn cell(&self, x: usize, y: usize) -> char {
        self.chars[2 * y + 1][2 * x + 1]
    }

    fn set_cell(&mut self, x: usize, y: usize, name: char) {
        self.chars[2 * y + 1][2 * x + 1] = name;
    }

    /// Draws or clears the edge of cell `(x, y)` facing `(dx, dy)`.
    ///
    /// The edge is kept only when the neighbour holds a different piece or
    /// lies off the board.
    fn set_edge(&mut self, x: usize, y: usize, dx: isize, dy: isize, edge: char) {
        let neighbour_x = x.checked_add_signed(dx).filter(|&nx| nx < self.width);
        let neighbour_y = y.checked_add_signed(dy).filter(|&ny| ny < self.height);
        let draw = match (neighbour_x, neighbour_y) {
            (Some(nx), Some(ny)) => self.cell(x, y) != self.cell(nx, ny),
            _ => true,
        };

        let row = (2 * y + 1).wrapping_add_signed(dy);
        let column = (2 * x + 1).wrapping_add_signed(dx);
        self.chars[row][column] = if draw { edge } else { BLANK };
    }

    fn draw_corners(&mut self) {
        for y in 0..=self.height {
            for x in 0..=self.width {
                let (row, column) = (2 * y, 2 * x);
                let mut edges = 0;
                if x > 0 && self.chars[row][column - 1] != BLANK {
                    edges |= EDGE_LEFT;
                }
                if x < self.width && self.chars[row][column + 1] != BLANK {
                    edges |= EDGE_RIGHT;
                }
                if y > 0 && self.chars[row - 1][column] != BLANK {
                    edges |= EDGE_UP;
                }
                if y < self.height && self.chars[row + 1][column] != BLANK {
                    edges |= EDGE_DOWN;
                }
                self.chars[row][column] = corner_glyph(edges);
            }
        }
    }

    fn into_string(self) -> String {
        let mut output = String::new();
        for line in self.chars {
            output.extend(line);
            output.push('\n');
        }
        output
    }
}

/// Formats a solution as a box-drawing diagram.
///
/// Cells not covered by any placement stay blank.
pub fn format_solution(solution: &Solution) -> String {
    let mut canvas = Canvas::new(solution.width(), solution.height());

    for (name, cells) in solution.cell_sets() {
        for &(x, y) in &cells {
            canvas.set_cell(x, y, name);
        }
        for &(x, y) in &cells {
            canvas.set_edge(x, y, -1, 0, VERTICAL);
            canvas.set_edge(x, y, 1, 0, VERTICAL);
            canvas.set_edge(x, y, 0, -1, HORIZONTAL);
            canvas.set_edge(x, y, 0, 1, HORIZONTAL);
        }
    }
    canvas.draw_corners();

    canvas.into_string()
}
