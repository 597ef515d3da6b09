use ahash::AHashSet;

use super::block::AlignmentBlock;
use super::line::SequenceLine;

/// Sequence names eligible for pairing.
///
/// A name ending with `*` is a wildcard: it admits every sequence whose name starts with the text
/// before the asterisk (e.g. `hg19*` admits `hg19.chr1`, `hg19.chrX`, ...).
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct LegitimateSequences {
    exact: AHashSet<String>,
    prefixes: Vec<String>,
}

impl LegitimateSequences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>) -> &mut Self {
        let name = name.as_ref();
        match name.strip_suffix('*') {
            Some(prefix) => {
                if !self.prefixes.iter().any(|x| x == prefix) {
                    self.prefixes.push(prefix.to_string());
                }
            }
            None => {
                self.exact.insert(name.to_string());
            }
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.exact.contains(name) || self.prefixes.iter().any(|x| name.starts_with(x.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefixes.is_empty()
    }

    /// Names of all sequences that are present in both collections of blocks.
    pub fn shared<'a>(
        first: impl IntoIterator<Item = &'a AlignmentBlock>,
        second: impl IntoIterator<Item = &'a AlignmentBlock>,
    ) -> Self {
        let first = names(first);
        let second = names(second);

        Self {
            exact: first
                .intersection(&second)
                .map(|x| x.to_string())
                .collect(),
            prefixes: Vec::new(),
        }
    }
}

fn names<'a>(blocks: impl IntoIterator<Item = &'a AlignmentBlock>) -> AHashSet<&'a str> {
    blocks
        .into_iter()
        .flat_map(|x| x.sequences())
        .map(|x: &'a SequenceLine| -> &'a str { x.name() })
        .collect()
}

impl<S: AsRef<str>> FromIterator<S> for LegitimateSequences {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut result = Self::new();
        for name in iter {
            result.insert(name);
        }
        result
    }
}
