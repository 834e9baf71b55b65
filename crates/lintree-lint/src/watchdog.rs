//! Host memory pressure sampling.

use std::time::Duration;

use humansize::{BINARY, format_size};
use sysinfo::System;
use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// Watchdog sampling settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchdogConfig {
    /// Time between two samples.
    pub interval: Duration,
    /// Fraction of total memory above which the invocation is interrupted.
    pub threshold: f64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            threshold: 0.9,
        }
    }
}

/// One reading of host memory, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySample {
    pub total: u64,
    pub used: u64,
    pub swap_used: u64,
}

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("memory statistics are unavailable")]
    Unavailable,
}

/// Source of memory samples.
pub trait MemorySource: Send {
    fn sample(&mut self) -> Result<MemorySample, SampleError>;
}

/// Host memory as reported by `sysinfo`.
pub struct SystemMemory {
    system: System,
}

impl SystemMemory {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for SystemMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SystemMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemMemory").finish_non_exhaustive()
    }
}

impl MemorySource for SystemMemory {
    fn sample(&mut self) -> Result<MemorySample, SampleError> {
        self.system.refresh_memory();
        Ok(MemorySample {
            total: self.system.total_memory(),
            used: self.system.used_memory(),
            swap_used: self.system.used_swap(),
        })
    }
}

/// Pressure computation with a rolling-minimum swap baseline.
///
/// Some platforms grow swap speculatively, so only swap use above the lowest
/// level seen so far counts towards pressure.
#[derive(Debug, Clone, Default)]
pub struct PressureGauge {
    swap_baseline: Option<u64>,
}

impl PressureGauge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowest swap use observed so far.
    pub fn swap_baseline(&self) -> Option<u64> {
        self.swap_baseline
    }

    /// Swap use above the baseline, updating the baseline first.
    fn excess_swap(&mut self, sample: &MemorySample) -> u64 {
        let baseline = self
            .swap_baseline
            .map_or(sample.swap_used, |baseline| baseline.min(sample.swap_used));
        self.swap_baseline = Some(baseline);
        sample.swap_used - baseline
    }

    /// Fraction of total memory under pressure.
    pub fn observe(&mut self, sample: &MemorySample) -> f64 {
        let excess = self.excess_swap(sample);
        (sample.used.saturating_add(excess)) as f64 / sample.total.max(1) as f64
    }
}

/// Samples memory pressure while one invocation runs.
///
/// The swap baseline is kept across invocations of the same run.
#[derive(Debug)]
pub struct MemoryWatchdog<S = SystemMemory> {
    source: S,
    gauge: PressureGauge,
    config: WatchdogConfig,
}

impl MemoryWatchdog<SystemMemory> {
    /// Watchdog over host memory.
    pub fn system(config: WatchdogConfig) -> Self {
        Self::new(SystemMemory::new(), config)
    }
}

impl<S: MemorySource> MemoryWatchdog<S> {
    pub fn new(source: S, config: WatchdogConfig) -> Self {
        Self {
            source,
            gauge: PressureGauge::new(),
            config,
        }
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    /// Sample until a reading exceeds the threshold or `cancel` fires.
    ///
    /// Returns `true` only if the threshold was exceeded first.
    pub async fn watch(&mut self, cancel: CancellationToken) -> bool {
        let mut ticker = interval_at(Instant::now() + self.config.interval, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                _ = ticker.tick() => {}
            }

            let sample = match self.source.sample() {
                Ok(sample) if sample.total == 0 => {
                    tracing::debug!("Memory sample reports no total memory");
                    continue;
                }
                Ok(sample) => sample,
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to sample memory usage");
                    continue;
                }
            };

            let pressure = self.gauge.observe(&sample);
            let excess = sample.swap_used - self.gauge.swap_baseline().unwrap_or(sample.swap_used);
            tracing::debug!(
                usage_percent = pressure * 100.0,
                ram = %format_size(sample.used, BINARY),
                swap = %format_size(excess, BINARY),
                "Memory usage"
            );

            if pressure > self.config.threshold {
                tracing::info!(
                    usage_percent = pressure * 100.0,
                    threshold = self.config.threshold,
                    "Memory pressure threshold exceeded"
                );
                return true;
            }
        }
    }
}
