use std::fmt::Display;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(i8)]
pub enum Strand {
    /// The forward strand, also known as the positive strand or Watson strand.
    #[default]
    Forward = 1,
    /// The reverse strand, also known as the negative strand or Crick strand.
    Reverse = -1,
}

impl Strand {
    /// Get the symbolic representation of the strand.
    pub fn symbol(&self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }

    /// Translate a 0-based position counted along this strand into the forward-strand coordinate
    /// of the same residue. `source_length` is the length of the whole source sequence.
    ///
    /// Positions on the reverse strand are counted from the end of the source sequence, so the
    /// last residue of the forward strand is position 0 of the reverse strand.
    pub fn forward_coordinate(&self, position: u64, source_length: u64) -> u64 {
        match self {
            Self::Forward => position,
            Self::Reverse => {
                debug_assert!(position < source_length);
                source_length - 1 - position
            }
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
