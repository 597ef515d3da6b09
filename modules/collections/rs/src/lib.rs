pub mod pairs;
pub mod triangular;
