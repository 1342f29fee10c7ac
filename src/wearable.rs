//! Biometric sources
//!
//! A wearable is either connected or not. Reads while disconnected fail;
//! `connect` can always be retried.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::ComputeError;
use crate::types::BiometricSnapshot;

/// Supplier of biometric snapshots
pub trait BiometricSource {
    fn connect(&mut self) -> Result<(), ComputeError>;

    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Take the next reading
    fn read(&mut self) -> Result<BiometricSnapshot, ComputeError>;
}

/// Seeded stand-in for a real wearable.
///
/// Produces heart rate in 55-100 bpm and the remaining readings in 0-100.
/// The same seed yields the same sequence.
#[derive(Debug)]
pub struct SimulatedWearable {
    rng: StdRng,
    connected: bool,
}

impl SimulatedWearable {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            connected: false,
        }
    }
}

impl BiometricSource for SimulatedWearable {
    fn connect(&mut self) -> Result<(), ComputeError> {
        debug!("Simulated wearable connected");
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn read(&mut self) -> Result<BiometricSnapshot, ComputeError> {
        if !self.connected {
            return Err(ComputeError::NotConnected(
                "simulated wearable".to_string(),
            ));
        }
        Ok(BiometricSnapshot {
            heart_rate: self.rng.gen_range(55.0..=100.0),
            stress_level: self.rng.gen_range(0.0..=100.0),
            sleep_quality: self.rng.gen_range(0.0..=100.0),
            activity_level: self.rng.gen_range(0.0..=100.0),
        })
    }
}
