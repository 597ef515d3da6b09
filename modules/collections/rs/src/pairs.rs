use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::ops::Bound;
use std::sync::Arc;

use ahash::AHashSet;
use derive_getters::Dissolve;

/// Two aligned positions: `(seq1, pos1)` and `(seq2, pos2)`.
///
/// Pairs are ordered by `seq1`, then `seq2` (lexicographically), then `pos1`, then `pos2`.
/// The field order below defines the derived ordering and must not be changed.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Dissolve)]
pub struct Pair {
    seq1: Arc<str>,
    seq2: Arc<str>,
    pos1: u64,
    pos2: u64,
}

impl Pair {
    /// Pair with sides taken exactly as given.
    pub fn new(
        seq1: impl Into<Arc<str>>,
        pos1: u64,
        seq2: impl Into<Arc<str>>,
        pos2: u64,
    ) -> Self {
        Self {
            seq1: seq1.into(),
            seq2: seq2.into(),
            pos1,
            pos2,
        }
    }

    /// Pair with sides swapped if needed so that `(seq1, pos1) <= (seq2, pos2)`.
    pub fn canonical(seq1: Arc<str>, pos1: u64, seq2: Arc<str>, pos2: u64) -> Self {
        if (&seq1, pos1) <= (&seq2, pos2) {
            Self::new(seq1, pos1, seq2, pos2)
        } else {
            Self::new(seq2, pos2, seq1, pos1)
        }
    }

    /// Smallest possible pair with the given `(seq1, seq2, pos1)` prefix.
    pub fn lower_bound(seq1: impl Into<Arc<str>>, seq2: impl Into<Arc<str>>, pos1: u64) -> Self {
        Self::new(seq1, pos1, seq2, 0)
    }

    pub fn seq1(&self) -> &str {
        &self.seq1
    }

    pub fn seq2(&self) -> &str {
        &self.seq2
    }

    pub fn pos1(&self) -> u64 {
        self.pos1
    }

    pub fn pos2(&self) -> u64 {
        self.pos2
    }

    /// Whether both pairs refer to the same sequences.
    pub fn same_sequences(&self, other: &Pair) -> bool {
        self.seq1 == other.seq1 && self.seq2 == other.seq2
    }
}

impl Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}:{}", self.seq1, self.pos1, self.seq2, self.pos2)
    }
}

/// Sorted set of pairs supporting ordered iteration and "first element >= key" lookups.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PairSet {
    pairs: BTreeSet<Pair>,
}

impl PairSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Insert the pair. Returns `false` if an equal pair was already present, leaving the set
    /// unchanged.
    pub fn insert(&mut self, pair: Pair) -> bool {
        self.pairs.insert(pair)
    }

    pub fn contains(&self, pair: &Pair) -> bool {
        self.pairs.contains(pair)
    }

    pub fn get(&self, pair: &Pair) -> Option<&Pair> {
        self.pairs.get(pair)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Pair> {
        self.pairs.iter()
    }

    /// First stored pair that is greater than or equal to `key`.
    pub fn search_ge(&self, key: &Pair) -> Option<&Pair> {
        self.iter_from(key).next()
    }

    /// Iterate stored pairs in order, starting from the first one that is `>= key`.
    pub fn iter_from(&self, key: &Pair) -> btree_set::Range<'_, Pair> {
        self.pairs.range::<Pair, _>((Bound::Included(key), Bound::Unbounded))
    }

    /// Stored pairs within `tolerance` of the query on both positions. The query must be canonical.
    pub fn near<'a>(
        &'a self,
        query: &'a Pair,
        tolerance: u64,
    ) -> impl Iterator<Item = &'a Pair> + 'a {
        let key = Pair::lower_bound(
            query.seq1.clone(),
            query.seq2.clone(),
            query.pos1.saturating_sub(tolerance),
        );
        let last = query.pos1.saturating_add(tolerance);

        self.iter_from(&key)
            .take_while(move |x| x.same_sequences(query) && x.pos1 <= last)
            .filter(move |x| x.pos2.abs_diff(query.pos2) <= tolerance)
    }

    /// Every sequence name referenced by at least one stored pair.
    pub fn names(&self) -> AHashSet<Arc<str>> {
        let mut names = AHashSet::new();
        for pair in &self.pairs {
            if !names.contains(&pair.seq1) {
                names.insert(pair.seq1.clone());
            }
            if !names.contains(&pair.seq2) {
                names.insert(pair.seq2.clone());
            }
        }
        names
    }

    /// Move all pairs from `other` into this set.
    pub fn append(&mut self, mut other: PairSet) {
        if self.pairs.len() < other.pairs.len() {
            std::mem::swap(&mut self.pairs, &mut other.pairs);
        }
        self.pairs.append(&mut other.pairs);
    }
}

impl Extend<Pair> for PairSet {
    fn extend<T: IntoIterator<Item = Pair>>(&mut self, iter: T) {
        self.pairs.extend(iter)
    }
}

impl FromIterator<Pair> for PairSet {
    fn from_iter<T: IntoIterator<Item = Pair>>(iter: T) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for PairSet {
    type Item = Pair;
    type IntoIter = btree_set::IntoIter<Pair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<'a> IntoIterator for &'a PairSet {
    type Item = &'a Pair;
    type IntoIter = btree_set::Iter<'a, Pair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
