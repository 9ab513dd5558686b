//! N-tuple feature patterns and the board symmetry set.
//!
//! Each pattern reads six cells of a board as base-15 digits (most significant
//! first) to produce an index into that pattern's weight table. Evaluating the
//! same four patterns over all eight rotations/reflections of a board yields
//! 32 indices per board.

use crate::board::Board;

/// Number of cells read by one pattern.
pub const TUPLE_LEN: usize = 6;
/// Number of patterns (and weight tables).
pub const PATTERN_COUNT: usize = 4;
/// Rotations x reflections.
pub const SYMMETRY_COUNT: usize = 8;
/// Exponents 0..=14 are the digits of a feature index.
pub const FEATURE_BASE: usize = 15;
/// Entries per weight table, `15^6`.
pub const TABLE_SIZE: usize = FEATURE_BASE.pow(TUPLE_LEN as u32);

/// Cell coordinates of the four 6-tuples.
///
/// ```text
///  0  1  2  3     . . . .     . . . .     . . . .
///  4  5  .  .     . . . .     . 5 6 7     . . . .
///  .  .  .  .     8 9 a b     . 9 a b     . 9 a b
///  .  .  .  .     c d . .     . . . .     . d e f
/// ```
pub const PATTERNS: [[usize; TUPLE_LEN]; PATTERN_COUNT] = [
    [0, 1, 2, 3, 4, 5],
    [8, 9, 10, 11, 12, 13],
    [5, 6, 7, 9, 10, 11],
    [9, 10, 11, 13, 14, 15],
];

/// One table index per (symmetry, pattern), symmetries in [`symmetries`] order.
pub type FeatureIndices = [[usize; PATTERN_COUNT]; SYMMETRY_COUNT];

/// Base-15 index of `pattern` read from `board`.
#[inline]
pub fn feature_index(board: &Board, pattern: usize) -> usize {
    PATTERNS[pattern].iter().fold(0, |index, &cell| {
        let digit = board.cell(cell) as usize;
        debug_assert!(digit < FEATURE_BASE, "exponent {digit} at cell {cell} is outside the feature range");
        index * FEATURE_BASE + digit
    })
}

/// The eight symmetric variants of `board`.
///
/// Order: the four clockwise rotations, then the four rotations of the
/// horizontally reflected board.
pub fn symmetries(board: &Board) -> [Board; SYMMETRY_COUNT] {
    let mut out = [*board; SYMMETRY_COUNT];
    let mut current = *board;
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = current;
        current.rotate(1);
        if i == 3 {
            current.reflect_horizontal();
        }
    }
    out
}

/// All 32 feature indices of `board`.
pub fn feature_indices(board: &Board) -> FeatureIndices {
    let mut out = [[0; PATTERN_COUNT]; SYMMETRY_COUNT];
    for (indices, variant) in out.iter_mut().zip(symmetries(board).iter()) {
        for (pattern, index) in indices.iter_mut().enumerate() {
            *index = feature_index(variant, pattern);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Board {
        Board::from_cells([1, 2, 3, 4, 0, 5, 6, 7, 8, 0, 9, 10, 11, 12, 13, 14])
    }

    fn sorted(indices: &FeatureIndices) -> Vec<(usize, usize)> {
        let mut flat: Vec<(usize, usize)> = indices
            .iter()
            .flat_map(|row| row.iter().copied().enumerate())
            .collect();
        flat.sort_unstable();
        flat
    }

    #[test]
    fn index_is_base_15_most_significant_first() {
        let b = Board::from_cells([1, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(feature_index(&b, 0), 15usize.pow(5) + 2);
        assert_eq!(feature_index(&b, 2), 2 * 15usize.pow(5));
        assert_eq!(feature_index(&Board::EMPTY, 3), 0);
    }

    #[test]
    fn largest_index_fits_table() {
        let b = Board::from_cells([14; 16]);
        for pattern in 0..PATTERN_COUNT {
            assert_eq!(feature_index(&b, pattern), TABLE_SIZE - 1);
        }
    }

    #[test]
    fn symmetries_are_distinct_for_asymmetric_board() {
        let variants = symmetries(&sample());
        for i in 0..SYMMETRY_COUNT {
            for j in (i + 1)..SYMMETRY_COUNT {
                assert_ne!(variants[i], variants[j], "symmetry {i} == {j}");
            }
        }
        assert_eq!(variants[0], sample());
    }

    #[test]
    fn symmetry_application_commutes_with_indexing() {
        let base = sorted(&feature_indices(&sample()));
        for variant in symmetries(&sample()) {
            assert_eq!(sorted(&feature_indices(&variant)), base);
        }
    }

    #[test]
    fn first_symmetry_reads_untransformed_board() {
        let b = sample();
        let indices = feature_indices(&b);
        for pattern in 0..PATTERN_COUNT {
            assert_eq!(indices[0][pattern], feature_index(&b, pattern));
        }
    }
}
