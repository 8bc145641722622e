//! Arrival Schedule Module
//!
//! Turns a distribution, a target rate and a duration into the ordered list of
//! offsets at which requests are dispatched.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use rand_distr::{Distribution as _, Exp, Normal};
use serde::Serialize;

use crate::error::{LabError, Result};

/// Smallest gap between two normally distributed arrivals, in seconds.
pub const MIN_NORMAL_GAP: f64 = 0.001;

/// Upper bound on the number of arrivals in one schedule.
pub const MAX_ARRIVALS: usize = 1_000_000;

// == Distribution ==
/// Arrival process shaping the gaps between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Exponential gaps with mean `1 / rate`
    Poisson,
    /// Fixed gaps of `1 / rate`
    Uniform,
    /// Exponential gaps with mean `1 / rate`; same process as `Poisson`
    Exponential,
    /// Normal gaps, mean `1 / rate`, std-dev `0.2 / rate`, floored at
    /// [`MIN_NORMAL_GAP`]
    Normal,
}

impl Distribution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Distribution::Poisson => "poisson",
            Distribution::Uniform => "uniform",
            Distribution::Exponential => "exponential",
            Distribution::Normal => "normal",
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Distribution {
    type Err = LabError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "poisson" => Ok(Distribution::Poisson),
            "uniform" => Ok(Distribution::Uniform),
            "exponential" => Ok(Distribution::Exponential),
            "normal" => Ok(Distribution::Normal),
            _ => Err(LabError::InvalidDistribution(s.to_string())),
        }
    }
}

// == Arrival Schedule ==
/// Strictly increasing arrival offsets, in seconds, all below the run duration.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalSchedule {
    offsets: Vec<f64>,
}

impl ArrivalSchedule {
    /// Offsets in seconds since the start of the run.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Offsets as durations since the start of the run.
    pub fn iter(&self) -> impl Iterator<Item = Duration> + '_ {
        self.offsets.iter().map(|&secs| Duration::from_secs_f64(secs))
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

// == Generate ==
/// Generates a schedule using the thread-local RNG.
pub fn generate(distribution: Distribution, rate: f64, duration: f64) -> Result<ArrivalSchedule> {
    generate_with(distribution, rate, duration, &mut rand::rng())
}

/// Generates a schedule drawing randomness from `rng`.
///
/// # Arguments
/// * `distribution` - Shape of the inter-arrival gaps
/// * `rate` - Mean arrivals per second, must be positive and finite
/// * `duration` - Run length in seconds, must be positive and finite
pub fn generate_with<R: Rng + ?Sized>(
    distribution: Distribution,
    rate: f64,
    duration: f64,
    rng: &mut R,
) -> Result<ArrivalSchedule> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(LabError::InvalidRequest(format!(
            "rate must be a positive number, got {}",
            rate
        )));
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(LabError::InvalidRequest(format!(
            "duration must be a positive number, got {}",
            duration
        )));
    }
    if rate * duration > MAX_ARRIVALS as f64 {
        return Err(LabError::InvalidRequest(format!(
            "rate * duration exceeds the limit of {} arrivals",
            MAX_ARRIVALS
        )));
    }

    let offsets = match distribution {
        Distribution::Uniform => (1u64..)
            .map(|k| k as f64 / rate)
            .take_while(|&offset| offset < duration)
            .collect(),
        Distribution::Poisson | Distribution::Exponential => {
            let gaps = Exp::new(rate).map_err(|e| LabError::InvalidRequest(e.to_string()))?;
            accumulate(duration, || gaps.sample(&mut *rng))
        }
        Distribution::Normal => {
            let gaps = Normal::new(1.0 / rate, 0.2 / rate)
                .map_err(|e| LabError::InvalidRequest(e.to_string()))?;
            accumulate(duration, || gaps.sample(&mut *rng).max(MIN_NORMAL_GAP))
        }
    };

    Ok(ArrivalSchedule { offsets })
}

/// Sums gaps from `next_gap` until the total reaches `duration`.
fn accumulate(duration: f64, mut next_gap: impl FnMut() -> f64) -> Vec<f64> {
    let mut offsets = Vec::new();
    let mut current = 0.0;
    loop {
        current += next_gap();
        if current >= duration || offsets.len() >= MAX_ARRIVALS {
            break;
        }
        // A zero-length draw would repeat the previous offset
        if offsets.last().is_some_and(|&last| current <= last) {
            continue;
        }
        offsets.push(current);
    }
    offsets
}
