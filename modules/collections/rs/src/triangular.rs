//! Dense indexing of the strict upper triangle of an n×n matrix.
//!
//! Cells `(row, col)` with `row < col < n` are packed row by row: `(0, 1), (0, 2), ..., (0, n-1),
//! (1, 2), ..., (n-2, n-1)`, giving every unordered pair of `n` items a unique index in
//! `[0, choose_two(n))`.

/// Binomial coefficient C(n, 2), the number of unordered pairs among `n` items.
#[inline]
pub fn choose_two(n: u64) -> u64 {
    if n < 2 {
        0
    } else if n % 2 == 0 {
        (n / 2) * (n - 1)
    } else {
        n * ((n - 1) / 2)
    }
}

/// Number of precomputed entries in [`ChooseTwoTable`], covering n = 0..=100.
pub const TABLE_SIZE: usize = 101;

/// Precomputed C(n, 2) values for small n. Larger arguments fall back to [`choose_two`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ChooseTwoTable {
    values: Vec<u64>,
}

impl Default for ChooseTwoTable {
    fn default() -> Self {
        Self {
            values: (0..TABLE_SIZE as u64).map(choose_two).collect(),
        }
    }
}

impl ChooseTwoTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, n: u64) -> u64 {
        usize::try_from(n)
            .ok()
            .and_then(|x| self.values.get(x))
            .copied()
            .unwrap_or_else(|| choose_two(n))
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.values
    }
}

// Index of the first cell of the given row.
#[inline]
fn row_start(row: u64, n: u64) -> u64 {
    choose_two(n) - choose_two(n - row)
}

/// Pack `(row, col)`, `row < col < n`, into its linear index.
#[inline]
pub fn pair_to_index(row: u64, col: u64, n: u64) -> u64 {
    debug_assert!(row < col && col < n, "Invalid cell ({row}, {col}) for n = {n}");
    row_start(row, n) + (col - row - 1)
}

/// Unpack a linear index, `index < choose_two(n)`, into its `(row, col)` cell.
#[inline]
pub fn index_to_pair(index: u64, n: u64) -> (u64, u64) {
    debug_assert!(
        index < choose_two(n),
        "Index {index} is out of range for n = {n}"
    );

    // Counted from the end, rows hold 1, 2, 3, ... cells. The k-th cell from the end therefore
    // lives in the band b with C(b + 1, 2) <= k < C(b + 2, 2),
    // i.e. b = floor((sqrt(8k + 1) - 1) / 2).
    let reversed = (choose_two(n) - 1 - index) as u128;
    let band = ((8 * reversed + 1).isqrt() - 1) / 2;

    let row = n - 2 - band as u64;
    let col = index - row_start(row, n) + row + 1;
    (row, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Enumerate the upper triangle in packing order.
    fn cells(n: u64) -> impl Iterator<Item = (u64, u64)> {
        (0..n).flat_map(move |row| (row + 1..n).map(move |col| (row, col)))
    }

    #[test]
    fn test_choose_two_values() {
        for (n, expected) in [
            (0, 0),
            (1, 0),
            (2, 1),
            (3, 3),
            (4, 6),
            (5, 10),
            (48, 1128),
            (64, 2016),
            (100, 4950),
            (1000, 499500),
            (4623824, 10689871879576),
        ] {
            assert_eq!(choose_two(n), expected, "n = {n}");
        }
    }

    #[test]
    fn test_choose_two_table() {
        let table = ChooseTwoTable::new();
        assert_eq!(table.as_slice().len(), TABLE_SIZE);
        for n in 0..TABLE_SIZE as u64 {
            assert_eq!(table.get(n), choose_two(n));
            assert_eq!(table.as_slice()[n as usize], choose_two(n));
        }
        assert_eq!(table.get(101), 5050);
        assert_eq!(table.get(4623824), 10689871879576);
    }

    #[test]
    fn test_pair_to_index_matches_enumeration() {
        for n in 2..11 {
            for (expected, (row, col)) in cells(n).enumerate() {
                assert_eq!(pair_to_index(row, col, n), expected as u64);
            }
        }
    }

    #[test]
    fn test_index_to_pair_matches_enumeration() {
        for p in 0..10 {
            let n = 2u64 << p;
            for (index, cell) in cells(n).enumerate() {
                assert_eq!(index_to_pair(index as u64, n), cell, "n = {n}");
            }
        }
    }

    #[test]
    fn test_round_trip() {
        for n in 2..64 {
            for index in 0..choose_two(n) {
                let (row, col) = index_to_pair(index, n);
                assert!(row < col && col < n);
                assert_eq!(pair_to_index(row, col, n), index);
            }
        }
    }

    #[test]
    fn test_large_n_boundaries() {
        let n = 10_000_000;
        let last = choose_two(n) - 1;
        assert_eq!(index_to_pair(0, n), (0, 1));
        assert_eq!(index_to_pair(n - 2, n), (0, n - 1));
        assert_eq!(index_to_pair(n - 1, n), (1, 2));
        assert_eq!(index_to_pair(last, n), (n - 2, n - 1));
        assert_eq!(pair_to_index(n - 2, n - 1, n), last);

        for index in [1, 12345, last / 3, last / 2, last - 7] {
            let (row, col) = index_to_pair(index, n);
            assert_eq!(pair_to_index(row, col, n), index);
        }
    }
}
