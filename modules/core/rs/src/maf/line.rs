use std::sync::Arc;

use derive_getters::{Dissolve, Getters};
use derive_more::IsVariant;
use eyre::{ensure, Result};

use crate::loc::Strand;

/// Residue symbol used by alignment rows to mark a gap.
pub const GAP: u8 = b'-';

/// A single aligned sequence row (an `s` line of a MAF block).
#[derive(Clone, PartialEq, Eq, Debug, Getters, Dissolve)]
pub struct SequenceLine {
    /// Source sequence name, usually `genome.chromosome`
    name: Arc<str>,
    /// 0-based start of the aligned region, counted along `strand`
    start: u64,
    /// Number of residues (non-gap symbols) in the row
    size: u64,
    strand: Strand,
    /// Length of the whole source sequence
    source_length: u64,
    /// Aligned residues, one ASCII symbol per alignment column
    text: String,
}

impl SequenceLine {
    pub fn new(
        name: impl Into<Arc<str>>,
        start: u64,
        size: u64,
        strand: Strand,
        source_length: u64,
        text: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let text = text.into();
        ensure!(!name.is_empty(), "Sequence line has an empty sequence name");
        ensure!(
            text.is_ascii(),
            "Sequence line for {name} contains non-ASCII residues"
        );
        let residues = text.bytes().filter(|x| *x != GAP).count() as u64;
        ensure!(
            residues == size,
            "Sequence line for {name} declares {size} residues, but {residues} were found"
        );
        let end = start.checked_add(size);
        ensure!(
            end.is_some_and(|x| x <= source_length),
            "Sequence line for {name} (start {start}, size {size}) ends past its source length \
             ({source_length})"
        );

        Ok(Self {
            name,
            start,
            size,
            strand,
            source_length,
            text,
        })
    }

    /// Number of alignment columns covered by the row.
    pub fn width(&self) -> usize {
        self.text.len()
    }

    pub fn is_gap(&self, column: usize) -> bool {
        self.text.as_bytes()[column] == GAP
    }

    /// Forward-strand coordinate of the residue located `offset` residues after the row start.
    /// `offset` must be less than the row size.
    pub fn coordinate(&self, offset: u64) -> u64 {
        debug_assert!(offset < self.size, "Offset {offset} is outside of {}", self.name);
        // start + size <= source_length, so the sum can't overflow for valid offsets
        self.strand
            .forward_coordinate(self.start.saturating_add(offset), self.source_length)
    }
}

/// One line of an alignment block. Lines are classified once, when the block is assembled.
#[derive(Clone, PartialEq, Eq, Debug, IsVariant)]
pub enum AlignmentLine {
    /// Block header (`a` line) with its raw key=value fields
    Header(String),
    /// Aligned sequence row (`s` line)
    Sequence(SequenceLine),
    /// Free-text comment located inside the block
    Comment(String),
}

impl AlignmentLine {
    pub fn as_sequence(&self) -> Option<&SequenceLine> {
        match self {
            AlignmentLine::Sequence(line) => Some(line),
            _ => None,
        }
    }
}

impl From<SequenceLine> for AlignmentLine {
    fn from(value: SequenceLine) -> Self {
        AlignmentLine::Sequence(value)
    }
}
