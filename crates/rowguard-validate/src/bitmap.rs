//! Dense per-cell error storage.
//!
//! [`ErrorBitmap`] holds one bit per cell, [`ErrorCodeMap`] one byte per
//! cell, both row-major over `rows × cols`. The engine writes them only
//! through `ErrorGrid`, which keeps `bit set ⇔ code != 0`.

use crate::codes::{ErrorCode, VALID};

const WORD_BITS: usize = 32;

/// Packed bit matrix marking cells that have an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBitmap {
    rows: usize,
    cols: usize,
    words: Vec<u32>,
}

impl ErrorBitmap {
    pub fn new(rows: usize, cols: usize) -> Self {
        let cells = rows * cols;
        Self {
            rows,
            cols,
            words: vec![0; cells.div_ceil(WORD_BITS)],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    pub fn set_error(&mut self, row: usize, col: usize) {
        debug_assert!(row < self.rows && col < self.cols, "cell out of bounds");
        if let Some(index) = self.index(row, col) {
            self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
        }
    }

    pub fn has_error(&self, row: usize, col: usize) -> bool {
        self.index(row, col).is_some_and(|index| {
            self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
        })
    }

    pub fn has_row_error(&self, row: usize) -> bool {
        (0..self.cols).any(|col| self.has_error(row, col))
    }

    /// Total number of set bits.
    pub fn count_errors(&self) -> usize {
        self.words.iter().map(|&word| count_bits(word)).sum()
    }

    pub fn count_error_rows(&self) -> usize {
        (0..self.rows).filter(|&row| self.has_row_error(row)).count()
    }

    /// Rows with an error in `col`, ascending.
    pub fn get_column_errors(&self, col: usize) -> Vec<usize> {
        (0..self.rows)
            .filter(|&row| self.has_error(row, col))
            .collect()
    }

    /// Columns with an error in `row`, ascending.
    pub fn get_row_error_columns(&self, row: usize) -> Vec<usize> {
        (0..self.cols)
            .filter(|&col| self.has_error(row, col))
            .collect()
    }

    /// Linear indices of set bits in ascending order, skipping empty words.
    pub fn iter(&self) -> ErrorIter<'_> {
        ErrorIter {
            words: &self.words,
            word_index: 0,
            current: self.words.first().copied().unwrap_or(0),
            limit: self.cell_count(),
        }
    }

    /// Call `f(row, col)` for every cell with an error, row-major.
    pub fn for_each_error(&self, mut f: impl FnMut(usize, usize)) {
        if self.cols == 0 {
            return;
        }
        for index in self.iter() {
            f(index / self.cols, index % self.cols);
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn byte_size(&self) -> usize {
        self.words.len() * size_of::<u32>()
    }
}

/// Brian Kernighan's loop: clears the lowest set bit per step.
fn count_bits(mut word: u32) -> usize {
    let mut count = 0;
    while word != 0 {
        word &= word - 1;
        count += 1;
    }
    count
}

/// Iterator over set bit positions of an [`ErrorBitmap`].
#[derive(Debug, Clone)]
pub struct ErrorIter<'a> {
    words: &'a [u32],
    word_index: usize,
    current: u32,
    limit: usize,
}

impl Iterator for ErrorIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                let index = self.word_index * WORD_BITS + bit;
                // Bits past the last cell of a partial word are never reported.
                return (index < self.limit).then_some(index);
            }
            self.word_index += 1;
            while self.word_index < self.words.len() && self.words[self.word_index] == 0 {
                self.word_index += 1;
            }
            self.current = *self.words.get(self.word_index)?;
        }
    }
}

/// One error code byte per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCodeMap {
    rows: usize,
    cols: usize,
    codes: Vec<u8>,
}

impl ErrorCodeMap {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            codes: vec![VALID; rows * cols],
        }
    }

    pub fn set_code(&mut self, row: usize, col: usize, code: u8) {
        debug_assert!(row < self.rows && col < self.cols, "cell out of bounds");
        if row < self.rows && col < self.cols {
            self.codes[row * self.cols + col] = code;
        }
    }

    /// Stored code, or `0` for cells outside the map.
    pub fn get_code(&self, row: usize, col: usize) -> u8 {
        if row < self.rows && col < self.cols {
            self.codes[row * self.cols + col]
        } else {
            VALID
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.codes
    }

    pub fn byte_size(&self) -> usize {
        self.codes.len()
    }
}

/// Bitmap and code map sized and written together.
#[derive(Debug, Clone)]
pub(crate) struct ErrorGrid {
    bitmap: ErrorBitmap,
    codes: ErrorCodeMap,
}

impl ErrorGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            bitmap: ErrorBitmap::new(rows, cols),
            codes: ErrorCodeMap::new(rows, cols),
        }
    }

    pub fn mark(&mut self, row: usize, col: usize, code: ErrorCode) {
        self.bitmap.set_error(row, col);
        self.codes.set_code(row, col, code.to_raw());
    }

    pub fn code(&self, row: usize, col: usize) -> Option<ErrorCode> {
        ErrorCode::from_raw(self.codes.get_code(row, col))
    }

    pub fn bitmap(&self) -> &ErrorBitmap {
        &self.bitmap
    }

    pub fn code_map(&self) -> &ErrorCodeMap {
        &self.codes
    }
}
