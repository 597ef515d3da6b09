use std::sync::Arc;

use eyre::{ensure, Result};
use rand::Rng;

use mafpairs_collections_rs::pairs::{Pair, PairSet};
use mafpairs_collections_rs::triangular::{index_to_pair, ChooseTwoTable};

/// Stream of gaps between accepted candidates in a sequence of independent Bernoulli(p) trials.
///
/// Every skip is geometric: the number of rejected candidates before the next accepted one.
/// Consuming candidates one skip at a time accepts each of them independently with probability p.
#[derive(Clone, Debug)]
pub struct SkipStream<R> {
    rng: R,
    probability: f64,
    // ln(1 - p), cached
    log_rejection: f64,
}

impl<R: Rng> SkipStream<R> {
    pub fn new(rng: R, probability: f64) -> Result<Self> {
        ensure!(
            probability > 0.0 && probability <= 1.0,
            "Acceptance probability must be in (0, 1], got {probability}"
        );
        Ok(Self {
            rng,
            probability,
            log_rejection: (-probability).ln_1p(),
        })
    }

    /// Number of candidates to reject before the next accepted one.
    pub fn next_skip(&mut self) -> u64 {
        if self.probability >= 1.0 {
            return 0;
        }
        // Uniform on (0, 1]
        let uniform = 1.0 - self.rng.random::<f64>();
        // Float to int casts saturate, huge skips simply run past the end of any column
        (uniform.ln() / self.log_rejection).floor() as u64
    }
}

/// Rows of one alignment column that take part in pairing.
///
/// The column knows every row of the block by name. Before sampling a column, the caller resets it
/// and admits the rows that are eligible in this column (legitimate and holding a residue) in
/// increasing row order, together with their current positions.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Column {
    names: Vec<Arc<str>>,
    positions: Vec<Option<u64>>,
    admitted: Vec<usize>,
}

impl Column {
    pub fn new(names: impl IntoIterator<Item = Arc<str>>) -> Self {
        let names: Vec<_> = names.into_iter().collect();
        Self {
            positions: vec![None; names.len()],
            admitted: Vec::with_capacity(names.len()),
            names,
        }
    }

    pub fn reset(&mut self) {
        for row in self.admitted.drain(..) {
            self.positions[row] = None;
        }
    }

    pub fn admit(&mut self, row: usize, position: u64) {
        debug_assert!(
            self.admitted.last().is_none_or(|x| *x < row),
            "Rows must be admitted in increasing order"
        );
        self.positions[row] = Some(position);
        self.admitted.push(row);
    }

    /// Total number of rows, admitted or not.
    pub fn rows(&self) -> usize {
        self.names.len()
    }

    /// Admitted rows in increasing order.
    pub fn admitted(&self) -> &[usize] {
        &self.admitted
    }

    pub fn position(&self, row: usize) -> Option<u64> {
        self.positions[row]
    }

    /// Canonical pair formed by two admitted rows.
    pub fn pair(&self, first: usize, second: usize) -> Option<Pair> {
        let pos1 = self.positions[first]?;
        let pos2 = self.positions[second]?;
        Some(Pair::canonical(
            self.names[first].clone(),
            pos1,
            self.names[second].clone(),
            pos2,
        ))
    }
}

/// Sample pairs of admitted rows, accepting each of them independently with the stream probability.
///
/// Only accepted candidates are visited: linear indices into the pair space are drawn in increasing
/// order by jumping over rejected ones and decoded back into rows. Returns the number of accepted
/// candidates.
pub fn sample_column<R: Rng>(
    column: &Column,
    skips: &mut SkipStream<R>,
    table: &ChooseTwoTable,
    out: &mut PairSet,
) -> u64 {
    let admitted = column.admitted();
    if admitted.len() < 2 {
        return 0;
    }

    let rows = admitted.len() as u64;
    let total = table.get(rows);

    let mut emitted = 0;
    let mut index = skips.next_skip();
    while index < total {
        let (row, col) = index_to_pair(index, rows);
        if let Some(pair) = column.pair(admitted[row as usize], admitted[col as usize]) {
            out.insert(pair);
        }
        emitted += 1;
        index = index.saturating_add(1).saturating_add(skips.next_skip());
    }
    emitted
}

/// Reference sampler visiting every candidate pair of admitted rows.
///
/// Candidates are visited in the same order as the linear indices of [`sample_column`], and the
/// stream is consumed the same way, so both samplers accept the same pairs from the same stream.
pub fn sample_column_naive<R: Rng>(
    column: &Column,
    skips: &mut SkipStream<R>,
    out: &mut PairSet,
) -> u64 {
    if column.admitted().len() < 2 {
        return 0;
    }

    let mut emitted = 0;
    let mut countdown = skips.next_skip();
    for first in 0..column.rows() {
        if column.position(first).is_none() {
            continue;
        }
        for second in first + 1..column.rows() {
            let Some(pair) = column.pair(first, second) else {
                continue;
            };
            if countdown == 0 {
                out.insert(pair);
                emitted += 1;
                countdown = skips.next_skip();
            } else {
                countdown -= 1;
            }
        }
    }
    emitted
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn column(rows: usize, admitted: impl IntoIterator<Item = usize>) -> Column {
        let mut column = Column::new((0..rows).map(|x| Arc::from(format!("seq{x:02}"))));
        for row in admitted {
            column.admit(row, 100 + row as u64);
        }
        column
    }

    #[test]
    fn test_skip_stream_rejects_invalid_probabilities() {
        for p in [0.0, -0.5, 1.5, f64::NAN] {
            assert!(SkipStream::new(StdRng::seed_from_u64(1), p).is_err(), "p = {p}");
        }
        assert!(SkipStream::new(StdRng::seed_from_u64(1), 1e-9).is_ok());
        assert!(SkipStream::new(StdRng::seed_from_u64(1), 1.0).is_ok());
    }

    #[test]
    fn test_skip_stream_certain_acceptance() {
        let mut skips = SkipStream::new(StdRng::seed_from_u64(7), 1.0).unwrap();
        assert!((0..1000).all(|_| skips.next_skip() == 0));
    }

    #[test]
    fn test_skip_stream_mean() {
        let mut skips = SkipStream::new(StdRng::seed_from_u64(11), 0.2).unwrap();
        let draws = 200_000;
        let mean = (0..draws).map(|_| skips.next_skip() as f64).sum::<f64>() / draws as f64;
        // Geometric mean of rejections: (1 - p) / p = 4
        assert!((mean - 4.0).abs() < 0.1, "mean = {mean}");
    }

    #[test]
    fn test_column_reset() {
        let mut column = column(4, [0, 2, 3]);
        assert_eq!(column.admitted(), &[0, 2, 3]);
        assert_eq!(column.position(2), Some(102));
        assert!(column.pair(0, 1).is_none());

        column.reset();
        assert!(column.admitted().is_empty());
        assert!((0..4).all(|x| column.position(x).is_none()));
        assert_eq!(column.rows(), 4);
    }

    #[test]
    fn test_too_few_rows() {
        let table = ChooseTwoTable::new();
        let mut skips = SkipStream::new(StdRng::seed_from_u64(3), 1.0).unwrap();
        let mut out = PairSet::new();

        for column in [column(0, []), column(5, []), column(5, [3])] {
            assert_eq!(sample_column(&column, &mut skips, &table, &mut out), 0);
            assert_eq!(sample_column_naive(&column, &mut skips, &mut out), 0);
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_certain_acceptance_yields_every_pair() {
        let table = ChooseTwoTable::new();
        let mut skips = SkipStream::new(StdRng::seed_from_u64(3), 1.0).unwrap();
        let column = column(12, [0, 1, 4, 5, 7, 11]);

        let mut out = PairSet::new();
        assert_eq!(sample_column(&column, &mut skips, &table, &mut out), 15);
        assert_eq!(out.len(), 15);

        let first = out.iter().next().unwrap();
        assert_eq!(
            (first.seq1(), first.pos1(), first.seq2(), first.pos2()),
            ("seq00", 100, "seq01", 101)
        );
        for pair in &out {
            assert!((pair.seq1(), pair.pos1()) < (pair.seq2(), pair.pos2()));
        }
    }

    #[test]
    fn test_naive_and_clever_samplers_agree() {
        let table = ChooseTwoTable::new();
        for p in [0.01, 0.1, 0.35, 0.5, 0.9, 1.0] {
            for rows in 0..=16 {
                for seed in 0..8 {
                    // Every third row is not admitted
                    let column = column(rows, (0..rows).filter(|x| x % 3 != 1));

                    let mut clever = PairSet::new();
                    let mut skips = SkipStream::new(StdRng::seed_from_u64(seed), p).unwrap();
                    let emitted = sample_column(&column, &mut skips, &table, &mut clever);

                    let mut naive = PairSet::new();
                    let mut skips = SkipStream::new(StdRng::seed_from_u64(seed), p).unwrap();
                    let naive_emitted = sample_column_naive(&column, &mut skips, &mut naive);

                    assert_eq!(emitted, naive_emitted, "p = {p}, rows = {rows}");
                    assert_eq!(clever, naive, "p = {p}, rows = {rows}");
                }
            }
        }
    }

    #[test]
    fn test_sampling_is_calibrated_and_uniform() {
        let table = ChooseTwoTable::new();
        let column = column(10, 0..10);
        let (p, rounds) = (0.3, 20_000);

        let mut skips = SkipStream::new(StdRng::seed_from_u64(2024), p).unwrap();
        let mut hits = vec![0u64; 45];
        let mut total = 0;
        for _ in 0..rounds {
            let mut out = PairSet::new();
            total += sample_column(&column, &mut skips, &table, &mut out);
            for pair in &out {
                let (first, second) = (pair.pos1() - 100, pair.pos2() - 100);
                let index =
                    mafpairs_collections_rs::triangular::pair_to_index(first, second, 10);
                hits[index as usize] += 1;
            }
        }

        let expected = p * 45.0 * rounds as f64;
        assert!(
            (total as f64 - expected).abs() / expected < 0.01,
            "total = {total}, expected = {expected}"
        );

        let per_pair = p * rounds as f64;
        for (index, count) in hits.into_iter().enumerate() {
            assert!(
                (count as f64 - per_pair).abs() / per_pair < 0.05,
                "pair {index} was sampled {count} times, expected about {per_pair}"
            );
        }
    }
}
