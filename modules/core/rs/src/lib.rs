pub mod loc;
pub mod maf;
pub mod parallelism;
