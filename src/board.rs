//! Bit-packed board representation and placement masks.
//!
//! The board is a sequence of `u64` words read as one long bitfield. Bit `i`
//! is the cell at `(i % width, i / width)`; a set bit means the cell is
//! occupied. Bits past `width * height` in the last word are set when the
//! board is created, so scanning for the first clear bit never has to check
//! bounds.

use std::collections::BTreeMap;

/// Number of cells stored per board word.
pub const WORD_BITS: usize = u64::BITS as usize;

/// A word with every cell occupied.
const ALL_SET: u64 = u64::MAX;

/// Number of words needed to hold `cells` bits.
#[inline]
const fn words_for(cells: usize) -> usize {
    cells.div_ceil(WORD_BITS)
}

/// Immutable occupancy snapshot of the board.
///
/// There is no way to clear or set a bit in place. [`Board::place`] returns a
/// new board, so the same parent can be expanded from several threads.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    words: Box<[u64]>,
}

impl Board {
    /// Creates a board with all real cells free and all padding cells occupied.
    pub fn new(width: usize, height: usize) -> Self {
        let cells = width * height;
        let mut words = vec![0u64; words_for(cells)].into_boxed_slice();

        let used_in_last = cells % WORD_BITS;
        if used_in_last != 0 {
            if let Some(last) = words.last_mut() {
                *last = ALL_SET << used_in_last;
            }
        }

        Self { words }
    }

    /// Raw words, lowest cells first.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Returns whether `cell` is occupied. Cells past the end of the board
    /// count as occupied.
    pub fn is_occupied(&self, cell: usize) -> bool {
        self.words
            .get(cell / WORD_BITS)
            .map_or(true, |word| word & (1u64 << (cell % WORD_BITS)) != 0)
    }

    /// Finds the lowest-numbered free cell.
    ///
    /// Returns `None` once every cell, padding included, is occupied.
    pub fn first_free_spot(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, &word)| word != ALL_SET)
            // the number of trailing 1s equals the index of the first 0 bit
            .map(|(index, word)| index * WORD_BITS + word.trailing_ones() as usize)
    }

    /// Returns a copy of this board with every bit of `mask` set.
    ///
    /// Returns `None` if any bit of `mask` is already occupied. `self` is never
    /// modified.
    pub fn place(&self, mask: &PlacementMask) -> Option<Self> {
        let fits = mask.words.iter().all(|word_mask| {
            self.words
                .get(word_mask.index)
                .is_some_and(|word| word & word_mask.bits == 0)
        });
        if !fits {
            return None;
        }

        let mut words = self.words.clone();
        for word_mask in &mask.words {
            words[word_mask.index] |= word_mask.bits;
        }
        Some(Self { words })
    }
}

/// The bits one placement sets in a single board word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordMask {
    /// Index into [`Board::words`].
    pub index: usize,
    /// Bits to set in that word.
    pub bits: u64,
}

/// The exact set of board cells covered by one oriented, positioned piece.
///
/// Stored sparsely as word masks sorted by ascending word index, with at most
/// one entry per word.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlacementMask {
    words: Vec<WordMask>,
}

impl PlacementMask {
    /// Builds the mask covering the given absolute cell indices.
    pub fn from_cells(cells: impl IntoIterator<Item = usize>) -> Self {
        let mut by_word: BTreeMap<usize, u64> = BTreeMap::new();
        for cell in cells {
            *by_word.entry(cell / WORD_BITS).or_default() |= 1 << (cell % WORD_BITS);
        }

        Self {
            words: by_word
                .into_iter()
                .map(|(index, bits)| WordMask { index, bits })
                .collect(),
        }
    }

    /// Word masks in ascending word order.
    pub fn words(&self) -> &[WordMask] {
        &self.words
    }

    /// Absolute cell indices covered by this mask, ascending.
    pub fn cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().flat_map(|word_mask| {
            (0..WORD_BITS)
                .filter(move |bit| word_mask.bits & (1 << bit) != 0)
                .map(move |bit| word_mask.index * WORD_BITS + bit)
        })
    }

    /// The lowest covered cell, i.e. the anchor the placement index keys on.
    pub fn lowest_cell(&self) -> Option<usize> {
        self.words
            .iter()
            .find(|word_mask| word_mask.bits != 0)
            .map(|word_mask| word_mask.index * WORD_BITS + word_mask.bits.trailing_zeros() as usize)
    }

    /// Number of covered cells.
    pub fn cell_count(&self) -> usize {
        self.words
            .iter()
            .map(|word_mask| word_mask.bits.count_ones() as usize)
            .sum()
    }

    /// Grid coordinates `(x, y)` of every covered cell on a board `width` wide.
    pub fn grid_positions(&self, width: usize) -> Vec<(usize, usize)> {
        self.cells().map(|cell| (cell % width, cell / width)).collect()
    }
}
