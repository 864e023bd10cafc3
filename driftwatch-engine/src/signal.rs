//! Synthetic sensor signal with a stateful drift/spike anomaly model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Tunables for the synthetic signal.
#[derive(Debug, Clone, Copy)]
pub struct SignalConfig {
    /// Baseline the signal hovers around.
    pub base: f64,
    /// Standard deviation of the gaussian noise on every tick.
    pub noise_stddev: f64,
    /// Per-tick probability of starting a drift episode (0..1).
    pub drift_chance: f64,
    /// Per-tick probability of a one-tick spike (0..1).
    pub spike_chance: f64,
    /// Shortest drift episode, in ticks.
    pub drift_min_ticks: u32,
    /// Longest drift episode, in ticks.
    pub drift_max_ticks: u32,
    /// The two offset magnitudes a drift episode can target.
    pub drift_magnitudes: [f64; 2],
    /// Largest offset change per tick while drifting or recovering.
    pub drift_step: f64,
    /// Smallest spike magnitude.
    pub spike_min: f64,
    /// Largest spike magnitude.
    pub spike_max: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            base: 50.0,
            noise_stddev: 2.0,
            drift_chance: 0.05,
            spike_chance: 0.02,
            drift_min_ticks: 5,
            drift_max_ticks: 10,
            drift_magnitudes: [20.0, 35.0],
            drift_step: 5.0,
            spike_min: 150.0,
            spike_max: 250.0,
        }
    }
}

/// Progress of the current drift episode.
///
/// Owned exclusively by one generator; advances one micro-step per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriftState {
    pub is_drifting: bool,
    pub remaining_ticks: u32,
    pub current_offset: f64,
    pub target_offset: f64,
}

/// Produces one scalar reading per tick.
///
/// Each tick advances the drift state machine, rolls for a spike, and adds
/// gaussian noise. Drift walks the offset toward a target in bounded random
/// steps over several ticks, then walks it back to zero once the episode
/// ends — simulating gradual sensor calibration loss and recovery. Spikes
/// are instantaneous one-tick glitches and leave no state behind.
///
/// Reproducible only under [`SignalGenerator::seeded`]; production use
/// seeds from entropy.
#[derive(Debug)]
pub struct SignalGenerator<R = StdRng> {
    config: SignalConfig,
    drift: DriftState,
    rng: R,
}

impl SignalGenerator<StdRng> {
    /// Generator seeded from OS entropy.
    pub fn from_entropy(config: SignalConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic generator for tests and reproducible runs.
    pub fn seeded(config: SignalConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SignalGenerator<R> {
    /// Generator over a caller-supplied random source.
    pub fn with_rng(config: SignalConfig, rng: R) -> Self {
        Self {
            config,
            drift: DriftState::default(),
            rng,
        }
    }

    /// Current drift state, for status reporting.
    pub fn drift(&self) -> &DriftState {
        &self.drift
    }

    /// Produce the next reading value.
    pub fn next_value(&mut self) -> f64 {
        self.advance_drift();

        let spike = if self.rng.gen::<f64>() < self.config.spike_chance {
            let magnitude = self.rng.gen_range(self.config.spike_min..=self.config.spike_max);
            if self.rng.gen::<bool>() {
                magnitude
            } else {
                -magnitude
            }
        } else {
            0.0
        };

        let noise: f64 = self.rng.sample::<f64, _>(StandardNormal) * self.config.noise_stddev;

        self.config.base + self.drift.current_offset + spike + noise
    }

    /// One tick of the drift state machine: progress an active episode,
    /// recover toward zero after one, or roll to start a new one.
    fn advance_drift(&mut self) {
        if self.drift.is_drifting {
            self.drift.remaining_ticks = self.drift.remaining_ticks.saturating_sub(1);
            self.drift.current_offset =
                self.step_toward(self.drift.current_offset, self.drift.target_offset);
            if self.drift.remaining_ticks == 0 {
                self.drift.is_drifting = false;
                tracing::debug!(offset = self.drift.current_offset, "drift episode ended");
            }
        } else if self.drift.current_offset != 0.0 {
            // Recovery phase: walk the leftover offset back to baseline.
            self.drift.current_offset = self.step_toward(self.drift.current_offset, 0.0);
        } else if self.rng.gen::<f64>() < self.config.drift_chance {
            self.drift.is_drifting = true;
            self.drift.remaining_ticks = self
                .rng
                .gen_range(self.config.drift_min_ticks..=self.config.drift_max_ticks.max(self.config.drift_min_ticks));
            let magnitude = if self.rng.gen::<bool>() {
                self.config.drift_magnitudes[0]
            } else {
                self.config.drift_magnitudes[1]
            };
            self.drift.target_offset = if self.rng.gen::<bool>() { magnitude } else { -magnitude };
            tracing::debug!(
                target = self.drift.target_offset,
                ticks = self.drift.remaining_ticks,
                "drift episode started"
            );
        }
    }

    /// Move `current` toward `target` by a random step bounded by
    /// `drift_step`, clamped so it never overshoots.
    fn step_toward(&mut self, current: f64, target: f64) -> f64 {
        let step = self.rng.gen_range(0.0..=self.config.drift_step);
        let gap = target - current;
        if gap.abs() <= step {
            target
        } else if gap > 0.0 {
            current + step
        } else {
            current - step
        }
    }
}
