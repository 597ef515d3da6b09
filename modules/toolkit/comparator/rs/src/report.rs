use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use derive_getters::{Dissolve, Getters};
use derive_more::Constructor;

use mafpairs_collections_rs::pairs::PairSet;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Constructor, Dissolve, Getters)]
pub struct PairStats {
    sampled: u64,
    matched: u64,
}

impl PairStats {
    pub fn unmatched(&self) -> u64 {
        self.sampled - self.matched
    }

    /// Fraction of sampled pairs confirmed by the target dataset, `None` if nothing was sampled.
    pub fn matched_fraction(&self) -> Option<f64> {
        if self.sampled == 0 {
            None
        } else {
            Some(self.matched as f64 / self.sampled as f64)
        }
    }
}

impl Display for PairStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sampled={} matched={}", self.sampled, self.matched)?;
        match self.matched_fraction() {
            Some(fraction) => write!(f, " fraction={fraction:.6}"),
            None => write!(f, " fraction=NA"),
        }
    }
}

/// Outcome of sampling pairs from the query dataset and looking them up in the target one.
#[derive(Clone, PartialEq, Debug, Default, Dissolve, Getters)]
pub struct Report {
    // Exact number of pairs in the query dataset
    total_pairs: u64,
    accept_probability: f64,
    seed: u64,
    overall: PairStats,
    // Breakdown by (seq1, seq2) of the sampled pairs
    per_sequences: BTreeMap<(Arc<str>, Arc<str>), PairStats>,
}

impl Report {
    /// Report for a query dataset without any pairs.
    pub fn empty(seed: u64) -> Self {
        Self {
            accept_probability: 1.0,
            seed,
            ..Default::default()
        }
    }

    /// Summarize sampled pairs. Every matched pair must also be a sampled one.
    pub fn new(
        total_pairs: u64,
        accept_probability: f64,
        seed: u64,
        sampled: &PairSet,
        matched: &PairSet,
    ) -> Self {
        let mut per_sequences: BTreeMap<(Arc<str>, Arc<str>), PairStats> = BTreeMap::new();
        for pair in sampled {
            let (seq1, seq2, _, _) = pair.clone().dissolve();
            let stats = per_sequences.entry((seq1, seq2)).or_default();
            stats.sampled += 1;
            if matched.contains(pair) {
                stats.matched += 1;
            }
        }

        let overall = per_sequences
            .values()
            .fold(PairStats::default(), |acc, x| {
                PairStats::new(acc.sampled + x.sampled, acc.matched + x.matched)
            });

        Self {
            total_pairs,
            accept_probability,
            seed,
            overall,
            per_sequences,
        }
    }

    pub fn matched_fraction(&self) -> Option<f64> {
        self.overall.matched_fraction()
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "total_pairs={} accept_probability={:.6} seed={} {}",
            self.total_pairs, self.accept_probability, self.seed, self.overall
        )?;
        for ((seq1, seq2), stats) in &self.per_sequences {
            writeln!(f, "{seq1}\t{seq2}\t{stats}")?;
        }
        Ok(())
    }
}
