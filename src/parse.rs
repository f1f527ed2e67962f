//! ASCII piece notation.
//!
//! Each piece is drawn with `*` for occupied cells and spaces for holes.
//! Pieces are separated by blank (whitespace-only) lines:
//!
//! ```text
//! ****
//! *
//!
//!  *
//! ***
//! ```
//!
//! Tabs count as a single space and carriage returns are ignored. Common
//! indentation is removed per piece, so pieces can be written indented inside
//! string literals.

use crate::error::{ConfigError, ShapeError};
use crate::geometry::Shape;

const OCCUPIED: char = '*';
const EMPTY: char = ' ';

/// Parses every piece in `text`, in order of appearance.
pub fn parse_pieces(text: &str) -> Result<Vec<Shape>, ConfigError> {
    let cleaned = text.replace('\r', "").replace('\t', " ");

    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in cleaned.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
        .iter()
        .enumerate()
        .map(|(index, lines)| {
            parse_piece(lines).map_err(|source| ConfigError::InvalidPiece { index, source })
        })
        .collect()
}

/// Parses the lines of a single piece.
pub fn parse_piece(lines: &[&str]) -> Result<Shape, ShapeError> {
    let mut rows = Vec::with_capacity(lines.len());
    for (row, line) in lines.iter().enumerate() {
        let cells = line
            .chars()
            .map(|character| match character {
                OCCUPIED => Ok(true),
                EMPTY => Ok(false),
                _ => Err(ShapeError::InvalidCharacter { character, row }),
            })
            .collect::<Result<Vec<bool>, _>>()?;
        rows.push(cells);
    }

    Shape::from_rows(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separates_pieces_on_blank_lines() {
        let shapes = parse_pieces("\n****\n*\n\n \n *\n***\n").unwrap();
        let drawn: Vec<String> = shapes.iter().map(Shape::to_string).collect();
        assert_eq!(drawn, vec!["****\n*", " *\n***"]);
    }

    #[test]
    fn test_parse_removes_common_indentation() {
        let text = "
            **
             **
              *

            *****
        ";
        let shapes = parse_pieces(text).unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].to_string(), "**\n **\n  *");
        assert_eq!(shapes[0].cell_count(), 5);
        assert_eq!((shapes[1].width(), shapes[1].height()), (5, 1));
    }

    #[test]
    fn test_parse_tabs_and_carriage_returns() {
        let shapes = parse_pieces("\t**\r\n\t *\r\n").unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].to_string(), "**\n *");
    }

    #[test]
    fn test_parse_rejects_invalid_character() {
        let err = parse_pieces("**\n\n*x*\n").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidPiece {
                index: 1,
                source: ShapeError::InvalidCharacter {
                    character: 'x',
                    row: 0
                },
            }
        );
        assert_eq!(
            err.to_string(),
            "cannot parse piece 1: invalid character 'x' in row 0"
        );
    }

    #[test]
    fn test_parse_piece_rejects_gap_row() {
        assert_eq!(
            parse_piece(&["*", "   ", "*"]),
            Err(ShapeError::EmptyRow { row: 1 })
        );
    }

    #[test]
    fn test_parse_empty_text_has_no_pieces() {
        assert!(parse_pieces("  \n\n").unwrap().is_empty());
    }
}
