pub use block::AlignmentBlock;
pub use legit::LegitimateSequences;
pub use line::{AlignmentLine, SequenceLine, GAP};

mod block;
mod legit;
mod line;
