use std::sync::Arc;

use ahash::AHashSet;
use eyre::Result;
use itertools::Itertools;
use rand::Rng;

use mafpairs_collections_rs::pairs::{Pair, PairSet};
use mafpairs_collections_rs::triangular::ChooseTwoTable;
use mafpairs_core_rs::maf::{AlignmentBlock, LegitimateSequences, SequenceLine};

use crate::sampler::{sample_column, Column, SkipStream};

/// Number of residues each row of a block has consumed so far.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PositionTracker {
    offsets: Vec<u64>,
}

impl PositionTracker {
    pub fn new(rows: usize) -> Self {
        Self {
            offsets: vec![0; rows],
        }
    }

    pub fn offset(&self, row: usize) -> u64 {
        self.offsets[row]
    }

    pub fn advance(&mut self, row: usize) {
        self.offsets[row] += 1;
    }
}

// Validated sequence rows of a block along with their eligibility.
struct Rows<'a> {
    width: usize,
    lines: Vec<&'a SequenceLine>,
    eligible: Vec<bool>,
}

impl<'a> Rows<'a> {
    fn new(block: &'a AlignmentBlock, eligible: impl Fn(&SequenceLine) -> bool) -> Result<Self> {
        let width = block.validate()?;
        let lines: Vec<_> = block.sequences().collect();
        let eligible = lines.iter().map(|x| eligible(*x)).collect();
        Ok(Self {
            width,
            lines,
            eligible,
        })
    }

    fn name(&self, row: usize) -> &Arc<str> {
        self.lines[row].name()
    }

    // Columns are visited left to right. For each of them, `visit` receives eligible rows holding
    // a residue in the column (in block order) with the forward-strand positions of these residues.
    fn for_each_column(&self, mut visit: impl FnMut(&[(usize, u64)])) {
        let mut tracker = PositionTracker::new(self.lines.len());
        let mut present = Vec::with_capacity(self.lines.len());

        for column in 0..self.width {
            present.clear();
            for (row, line) in self.lines.iter().enumerate() {
                if line.is_gap(column) {
                    continue;
                }
                if self.eligible[row] {
                    present.push((row, line.coordinate(tracker.offset(row))));
                }
                tracker.advance(row);
            }
            visit(&present);
        }
    }
}

/// Exact number of position pairs formed by legitimate rows of the block.
///
/// Every column contributes C(m, 2) pairs, where m is the number of legitimate rows holding a
/// residue in that column.
pub fn walk_block_counting_pairs(
    block: &AlignmentBlock,
    legit: &LegitimateSequences,
    table: &ChooseTwoTable,
) -> Result<u64> {
    let rows = Rows::new(block, |x| legit.contains(x.name()))?;

    let mut total = 0;
    rows.for_each_column(|present| total += table.get(present.len() as u64));
    Ok(total)
}

/// Sample position pairs of legitimate rows into `out`. Returns the exact number of pairs in the
/// block, the same value as [`walk_block_counting_pairs`].
pub fn walk_block_sampling_pairs<R: Rng>(
    block: &AlignmentBlock,
    legit: &LegitimateSequences,
    skips: &mut SkipStream<R>,
    table: &ChooseTwoTable,
    out: &mut PairSet,
) -> Result<u64> {
    let rows = Rows::new(block, |x| legit.contains(x.name()))?;
    let mut column = Column::new(rows.lines.iter().map(|x| x.name().clone()));

    let mut total = 0;
    rows.for_each_column(|present| {
        column.reset();
        for (row, position) in present {
            column.admit(*row, *position);
        }
        total += table.get(present.len() as u64);
        sample_column(&column, skips, table, out);
    });
    Ok(total)
}

/// Sampled pairs to look for while walking blocks of another dataset.
#[derive(Clone, Debug)]
pub struct HomologyProbe<'a> {
    sampled: &'a PairSet,
    names: AHashSet<Arc<str>>,
    near: u64,
}

impl<'a> HomologyProbe<'a> {
    /// Sampled pair `(s1, p1, s2, p2)` is confirmed by a candidate `(s1, q1, s2, q2)` when both
    /// `|p1 - q1|` and `|p2 - q2|` are at most `near`.
    pub fn new(sampled: &'a PairSet, near: u64) -> Self {
        Self {
            sampled,
            names: sampled.names(),
            near,
        }
    }

    pub fn sampled(&self) -> &PairSet {
        self.sampled
    }

    pub fn near(&self) -> u64 {
        self.near
    }

    /// Whether the sequence occurs in at least one sampled pair.
    pub fn is_relevant(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Copy every sampled pair confirmed by the candidate into `matched`. Returns whether there was
    /// any.
    pub fn test(&self, candidate: &Pair, matched: &mut PairSet) -> bool {
        if self.near == 0 {
            return match self.sampled.get(candidate) {
                Some(pair) => {
                    matched.insert(pair.clone());
                    true
                }
                None => false,
            };
        }

        let mut found = false;
        for pair in self.sampled.near(candidate, self.near) {
            matched.insert(pair.clone());
            found = true;
        }
        found
    }
}

/// Test every position pair of legitimate rows against the probe, collecting confirmed sampled
/// pairs into `matched`. Returns the number of candidate pairs examined.
pub fn walk_block_testing_homology(
    block: &AlignmentBlock,
    legit: &LegitimateSequences,
    probe: &HomologyProbe,
    matched: &mut PairSet,
) -> Result<u64> {
    // Rows absent from the sampled pairs can't confirm anything
    let rows = Rows::new(block, |x| {
        legit.contains(x.name()) && probe.is_relevant(x.name())
    })?;

    let mut examined = 0;
    rows.for_each_column(|present| {
        for ((row1, pos1), (row2, pos2)) in present.iter().tuple_combinations() {
            let candidate =
                Pair::canonical(rows.name(*row1).clone(), *pos1, rows.name(*row2).clone(), *pos2);
            probe.test(&candidate, matched);
            examined += 1;
        }
    });
    Ok(examined)
}
