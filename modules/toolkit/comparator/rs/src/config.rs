use derive_getters::Getters;
use eyre::{ensure, Result};

/// Default number of pairs to sample from the query dataset.
pub const DEFAULT_NUM_SAMPLES: u64 = 1_000_000;

#[derive(Clone, PartialEq, Eq, Debug, Getters)]
pub struct Config {
    // Expected number of sampled pairs
    num_samples: u64,
    // Seed of the sampling RNG. A random one is drawn (and logged) when missing
    seed: Option<u64>,
    // Maximum positional distance between a sampled pair and the pair confirming it
    near: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_samples: DEFAULT_NUM_SAMPLES,
            seed: None,
            near: 0,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_num_samples(&mut self, num_samples: u64) -> Result<&mut Self> {
        ensure!(num_samples > 0, "Number of samples must be greater than 0");

        self.num_samples = num_samples;
        Ok(self)
    }

    pub fn set_seed(&mut self, seed: Option<u64>) -> &mut Self {
        self.seed = seed;
        self
    }

    pub fn set_near(&mut self, near: u64) -> &mut Self {
        self.near = near;
        self
    }
}
