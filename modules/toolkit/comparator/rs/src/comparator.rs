use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eyre::{ensure, Result, WrapErr};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPool;

use mafpairs_collections_rs::pairs::PairSet;
use mafpairs_collections_rs::triangular::ChooseTwoTable;
use mafpairs_core_rs::maf::{AlignmentBlock, LegitimateSequences};

use crate::config::Config;
use crate::report::Report;
use crate::sampler::SkipStream;
use crate::walker::{
    walk_block_counting_pairs, walk_block_sampling_pairs, walk_block_testing_homology,
    HomologyProbe,
};

/// Estimates how many position pairs aligned in a query dataset are also aligned in a target one.
///
/// Pairs of the query are sampled uniformly at random, each with the same probability tuned to
/// yield the configured number of samples on average. Blocks of the target are then scanned for
/// the sampled pairs.
pub struct Comparator {
    config: Config,
    table: ChooseTwoTable,
    thread_pool: Option<ThreadPool>,
    cancelled: Arc<AtomicBool>,
}

impl Comparator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            table: ChooseTwoTable::new(),
            thread_pool: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run all comparisons inside the given pool instead of the global one.
    pub fn set_thread_pool(mut self, pool: ThreadPool) -> Self {
        self.thread_pool = Some(pool);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Raising the flag aborts running comparisons at the next block boundary. It stays raised
    /// until cleared by the caller.
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Sample pairs of `query` and look them up in `target`. Only sequences admitted by `legit`
    /// take part in the comparison.
    pub fn compare(
        &self,
        query: &[AlignmentBlock],
        target: &[AlignmentBlock],
        legit: &LegitimateSequences,
    ) -> Result<Report> {
        let seed = self.seed();
        let mut rng = StdRng::seed_from_u64(seed);
        self.install(|| self._compare(("query", query), ("target", target), legit, seed, &mut rng))
    }

    /// Compare datasets in both directions. Both sampling passes draw from the same seeded source,
    /// the first one comparing `first` against `second`.
    pub fn compare_both(
        &self,
        first: &[AlignmentBlock],
        second: &[AlignmentBlock],
        legit: &LegitimateSequences,
    ) -> Result<(Report, Report)> {
        let seed = self.seed();
        let mut rng = StdRng::seed_from_u64(seed);
        self.install(|| {
            let forward =
                self._compare(("first", first), ("second", second), legit, seed, &mut rng)?;
            let backward =
                self._compare(("second", second), ("first", first), legit, seed, &mut rng)?;
            Ok((forward, backward))
        })
    }

    fn install<T: Send>(&self, job: impl FnOnce() -> Result<T> + Send) -> Result<T> {
        match &self.thread_pool {
            Some(pool) => pool.install(job),
            None => job(),
        }
    }

    fn seed(&self) -> u64 {
        match self.config.seed() {
            Some(seed) => *seed,
            None => {
                let seed = rand::rng().random();
                info!("Sampling seed was not provided, using {seed}");
                seed
            }
        }
    }

    fn ensure_not_cancelled(&self) -> Result<()> {
        ensure!(
            !self.cancelled.load(Ordering::Relaxed),
            "Comparison was cancelled"
        );
        Ok(())
    }

    fn _compare(
        &self,
        (qname, query): (&str, &[AlignmentBlock]),
        (tname, target): (&str, &[AlignmentBlock]),
        legit: &LegitimateSequences,
        seed: u64,
        rng: &mut StdRng,
    ) -> Result<Report> {
        // Exact number of pairs in the query
        let total = query
            .par_iter()
            .map(|block| {
                self.ensure_not_cancelled()?;
                walk_block_counting_pairs(block, legit, &self.table)
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))
            .wrap_err_with(|| format!("Failed to count pairs in the {qname} dataset"))?;
        info!("{total} pairs are available in the {qname} dataset");

        if total == 0 {
            warn!("Nothing to sample in the {qname} dataset");
            return Ok(Report::empty(seed));
        }

        let num_samples = *self.config.num_samples();
        let probability = if num_samples >= total {
            warn!(
                "Requested {num_samples} samples, but only {total} pairs are available. \
                 Sampling all of them"
            );
            1.0
        } else {
            num_samples as f64 / total as f64
        };
        info!("Sampling pairs with probability {probability}");

        // Sampling must see blocks in their original order to be reproducible
        let mut sampled = PairSet::new();
        let mut skips = SkipStream::new(&mut *rng, probability)?;
        for block in query {
            self.ensure_not_cancelled()?;
            walk_block_sampling_pairs(block, legit, &mut skips, &self.table, &mut sampled)
                .wrap_err_with(|| format!("Failed to sample pairs in the {qname} dataset"))?;
            debug!(
                "Block at line {}: {} pairs sampled so far",
                block.line_number(),
                sampled.len()
            );
        }
        info!("Sampled {} pairs from the {qname} dataset", sampled.len());

        let probe = HomologyProbe::new(&sampled, *self.config.near());
        let matched = target
            .par_iter()
            .map(|block| -> Result<PairSet> {
                self.ensure_not_cancelled()?;
                let mut matched = PairSet::new();
                let examined = walk_block_testing_homology(block, legit, &probe, &mut matched)?;
                debug!(
                    "Block at line {}: {examined} candidate pairs examined, {} matched",
                    block.line_number(),
                    matched.len()
                );
                Ok(matched)
            })
            .try_reduce(PairSet::new, |mut a, b| {
                a.append(b);
                Ok(a)
            })
            .wrap_err_with(|| format!("Failed to match pairs in the {tname} dataset"))?;
        info!(
            "{} of {} sampled pairs were found in the {tname} dataset",
            matched.len(),
            sampled.len()
        );

        Ok(Report::new(total, probability, seed, &sampled, &matched))
    }
}
