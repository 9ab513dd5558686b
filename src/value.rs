use crate::board::Board;
use crate::pattern::{self, FeatureIndices, PATTERN_COUNT, TABLE_SIZE};
use crate::weights::{WeightError, Weights};

/// Afterstate value approximator: four n-tuple tables shared by all eight
/// board symmetries.
#[derive(Debug, Clone)]
pub struct ValueFunction {
    weights: Weights,
}

impl ValueFunction {
    /// Fresh network, every weight zero.
    pub fn new() -> Self {
        ValueFunction { weights: Weights::zeroed(PATTERN_COUNT, TABLE_SIZE) }
    }

    /// Wrap existing weights, which must hold one `15^6` table per pattern.
    pub fn from_weights(weights: Weights) -> Result<Self, WeightError> {
        weights.ensure_shape(PATTERN_COUNT, TABLE_SIZE)?;
        Ok(ValueFunction { weights })
    }

    /// The underlying tables, one per pattern.
    pub fn weights(&self) -> &Weights { &self.weights }

    /// The 32 table indices that contribute to `board`'s value.
    #[inline]
    pub fn feature_indices(&self, board: &Board) -> FeatureIndices { pattern::feature_indices(board) }

    /// Sum of the weights addressed by `indices`.
    pub fn estimate(&self, indices: &FeatureIndices) -> f32 {
        let tables = self.weights.tables();
        indices
            .iter()
            .flat_map(|row| row.iter().enumerate())
            .map(|(pattern, &index)| tables[pattern].get(index))
            .sum()
    }

    /// Value of an afterstate. Pure: reads the tables only.
    ///
    /// ```
    /// use ntuple_2048::board::Board;
    /// use ntuple_2048::value::ValueFunction;
    /// let v = ValueFunction::new();
    /// assert_eq!(v.evaluate(&Board::EMPTY), 0.0);
    /// ```
    #[inline]
    pub fn evaluate(&self, board: &Board) -> f32 { self.estimate(&self.feature_indices(board)) }

    /// Add `delta` to one weight.
    #[inline]
    pub fn accumulate(&mut self, pattern: usize, index: usize, delta: f32) {
        self.weights.tables_mut()[pattern].accumulate(index, delta);
    }

    /// Set one weight back to zero.
    #[inline]
    pub fn reset(&mut self, pattern: usize, index: usize) {
        self.weights.tables_mut()[pattern].set(index, 0.0);
    }

    /// Current weight of one table entry.
    #[inline]
    pub fn weight(&self, pattern: usize, index: usize) -> f32 { self.weights.tables()[pattern].get(index) }
}

impl Default for ValueFunction {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{symmetries, SYMMETRY_COUNT};

    fn sample() -> Board {
        Board::from_cells([1, 2, 3, 4, 0, 5, 6, 7, 8, 0, 9, 10, 11, 12, 13, 14])
    }

    /// Small integer weights keep every sum exact regardless of order.
    fn seeded(board: &Board) -> ValueFunction {
        let mut v = ValueFunction::new();
        for (sym, row) in v.feature_indices(board).iter().enumerate() {
            for (pattern, &index) in row.iter().enumerate() {
                v.accumulate(pattern, index, (sym * PATTERN_COUNT + pattern + 1) as f32);
            }
        }
        v
    }

    #[test]
    fn evaluate_sums_all_32_entries() {
        let b = sample();
        let v = seeded(&b);
        // 1 + 2 + ... + 32, each entry distinct for this board
        assert_eq!(v.evaluate(&b), (1..=32).sum::<i32>() as f32);
    }

    #[test]
    fn evaluate_is_pure() {
        let b = sample();
        let v = seeded(&b);
        let snapshot = |v: &ValueFunction| -> Vec<f32> {
            v.feature_indices(&b)
                .iter()
                .flat_map(|row| row.iter().enumerate().map(|(p, &ix)| v.weight(p, ix)))
                .collect()
        };
        let before = snapshot(&v);
        assert_eq!(v.evaluate(&b), v.evaluate(&b));
        assert_eq!(snapshot(&v), before);
    }

    #[test]
    fn value_is_invariant_under_symmetries() {
        let b = sample();
        let v = seeded(&b);
        let expected = v.evaluate(&b);
        let variants = symmetries(&b);
        assert_eq!(variants.len(), SYMMETRY_COUNT);
        for variant in variants {
            assert_eq!(v.evaluate(&variant), expected);
        }
    }

    #[test]
    fn reset_zeroes_one_entry() {
        let b = sample();
        let mut v = seeded(&b);
        let index = v.feature_indices(&b)[0][0];
        v.reset(0, index);
        assert_eq!(v.weight(0, index), 0.0);
        assert_eq!(v.evaluate(&b), ((1..=32).sum::<i32>() - 1) as f32);
    }

    #[test]
    fn from_weights_checks_shape() {
        assert!(ValueFunction::from_weights(Weights::zeroed(PATTERN_COUNT, 10)).is_err());
        assert!(ValueFunction::from_weights(Weights::zeroed(PATTERN_COUNT, TABLE_SIZE)).is_ok());
    }
}
