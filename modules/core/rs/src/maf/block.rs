use derive_getters::{Dissolve, Getters};
use eyre::{bail, ensure, Result};

use super::line::{AlignmentLine, SequenceLine};

/// An alignment block: rows sharing one set of alignment columns.
///
/// Declared counts are the numbers reported by whoever assembled the block (e.g. a file parser).
/// They are kept separately from the lines themselves so that walkers can detect a block that
/// was truncated or corrupted on the way.
#[derive(Clone, PartialEq, Eq, Debug, Getters, Dissolve)]
pub struct AlignmentBlock {
    /// 1-based line number of the block header in its source file
    line_number: usize,
    declared_lines: usize,
    declared_sequences: usize,
    lines: Vec<AlignmentLine>,
}

impl AlignmentBlock {
    /// Assemble a block whose declared counts are taken from the lines themselves.
    pub fn new(line_number: usize, lines: Vec<AlignmentLine>) -> Self {
        let declared_sequences = lines.iter().filter(|x| x.is_sequence()).count();
        Self {
            line_number,
            declared_lines: lines.len(),
            declared_sequences,
            lines,
        }
    }

    pub fn with_declared_counts(
        line_number: usize,
        declared_lines: usize,
        declared_sequences: usize,
        lines: Vec<AlignmentLine>,
    ) -> Self {
        Self {
            line_number,
            declared_lines,
            declared_sequences,
            lines,
        }
    }

    /// Sequence rows of the block in their original order.
    pub fn sequences(&self) -> impl Iterator<Item = &SequenceLine> {
        self.lines.iter().filter_map(AlignmentLine::as_sequence)
    }

    /// Check that the block is internally consistent and return its width (number of columns).
    pub fn validate(&self) -> Result<usize> {
        ensure!(
            self.lines.len() == self.declared_lines,
            "Block at line {} declares {} lines, but {} were found",
            self.line_number,
            self.declared_lines,
            self.lines.len()
        );

        let mut sequences = 0;
        let mut width = None;
        for line in self.sequences() {
            sequences += 1;
            match width {
                None => width = Some(line.width()),
                Some(width) if width != line.width() => bail!(
                    "Block at line {}: row {} spans {} columns, expected {}",
                    self.line_number,
                    line.name(),
                    line.width(),
                    width
                ),
                Some(_) => {}
            }
        }

        ensure!(
            sequences == self.declared_sequences,
            "Block at line {} declares {} sequences, but {} were found",
            self.line_number,
            self.declared_sequences,
            sequences
        );
        Ok(width.unwrap_or(0))
    }
}
