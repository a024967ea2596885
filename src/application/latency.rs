//! Simulated network latency for mock endpoints.

use std::{fmt, sync::Mutex, time::Duration};

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::trace;

/// Delay policy declared per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelaySpec {
    None,
    Fixed(u64),
    /// Uniform in `[min, max]` milliseconds.
    Range(u64, u64),
}

impl DelaySpec {
    pub fn sample_millis(&self, rng: &mut impl Rng) -> u64 {
        match *self {
            DelaySpec::None => 0,
            DelaySpec::Fixed(ms) => ms,
            DelaySpec::Range(min, max) => sample_between(min, max, rng),
        }
    }
}

impl fmt::Display for DelaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelaySpec::None => f.write_str("none"),
            DelaySpec::Fixed(ms) => write!(f, "{ms}ms"),
            DelaySpec::Range(min, max) => write!(f, "{min}-{max}ms"),
        }
    }
}

fn sample_between(min: u64, max: u64, rng: &mut impl Rng) -> u64 {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    rng.gen_range(low..=high)
}

/// Suspend for exactly `ms` milliseconds.
pub async fn delay(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Suspend for a duration sampled uniformly from `[min, max]` milliseconds.
pub async fn random_delay(min: u64, max: u64, rng: &mut (impl Rng + Send)) {
    let ms = sample_between(min, max, rng);
    delay(ms).await;
}

/// Applies endpoint delay policies; can be switched off for tests and demos.
pub struct LatencySimulator {
    enabled: bool,
    rng: Mutex<StdRng>,
}

impl LatencySimulator {
    pub fn new(enabled: bool, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            enabled,
            rng: Mutex::new(rng),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, Some(0))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn apply(&self, delay_spec: DelaySpec) {
        if !self.enabled {
            return;
        }
        let ms = match self.rng.lock() {
            Ok(mut rng) => delay_spec.sample_millis(&mut *rng),
            Err(poisoned) => delay_spec.sample_millis(&mut *poisoned.into_inner()),
        };
        trace!(target = "property_mock::latency", delay_ms = ms, "simulating latency");
        delay(ms).await;
    }
}
