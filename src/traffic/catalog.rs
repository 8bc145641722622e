//! Key Catalog Module
//!
//! Decides which key each dispatched request asks for.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_distr::{Distribution as _, Zipf};

use crate::error::{LabError, Result};

// == Key Popularity ==
/// How request keys are spread over the key space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyPopularity {
    /// Every key equally likely
    Uniform,
    /// Key `k` drawn with weight `1 / k^exponent`
    Zipf { exponent: f64 },
}

impl fmt::Display for KeyPopularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPopularity::Uniform => f.write_str("uniform"),
            KeyPopularity::Zipf { exponent } => write!(f, "zipf(s={})", exponent),
        }
    }
}

impl FromStr for KeyPopularity {
    type Err = LabError;

    /// Parses `uniform` or `zipf`; Zipf starts with exponent 1.0.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(KeyPopularity::Uniform),
            "zipf" => Ok(KeyPopularity::Zipf { exponent: 1.0 }),
            other => Err(LabError::Config(format!("unknown key popularity '{}'", other))),
        }
    }
}

// == Key Catalog ==
/// Numeric key space `1..=size` with a popularity model.
#[derive(Debug, Clone)]
pub struct KeyCatalog {
    size: u64,
    sampler: Sampler,
}

#[derive(Debug, Clone)]
enum Sampler {
    Uniform,
    Zipf(Zipf<f64>),
}

impl KeyCatalog {
    /// Creates a catalog of `size` keys.
    pub fn new(size: u64, popularity: KeyPopularity) -> Result<Self> {
        if size == 0 {
            return Err(LabError::Config("key space must hold at least one key".to_string()));
        }

        let sampler = match popularity {
            KeyPopularity::Uniform => Sampler::Uniform,
            KeyPopularity::Zipf { exponent } => Sampler::Zipf(
                Zipf::new(size as f64, exponent)
                    .map_err(|e| LabError::Config(format!("invalid zipf parameters: {}", e)))?,
            ),
        };

        Ok(Self { size, sampler })
    }

    /// Uniform catalog over `1..=size`; an empty key space is widened to one key.
    pub fn uniform(size: u64) -> Self {
        Self {
            size: size.max(1),
            sampler: Sampler::Uniform,
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Draws the next request key.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> String {
        let id = match &self.sampler {
            Sampler::Uniform => rng.random_range(1..=self.size),
            Sampler::Zipf(zipf) => (zipf.sample(rng) as u64).clamp(1, self.size),
        };
        id.to_string()
    }
}
