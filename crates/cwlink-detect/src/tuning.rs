use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Receiver tuning shared between the processing thread and a control
/// thread.
///
/// Each value is a single-writer register backed by an atomic cell; the
/// detector re-reads them at every frame boundary, so there is nothing to
/// lock on the sample path.
pub struct Tuning {
    target_freq_bits: AtomicU32,
    threshold_bits: AtomicU32,
    auto_threshold: AtomicBool,
}

impl Tuning {
    pub fn new(target_freq_hz: f32, threshold: f32, auto_threshold: bool) -> Self {
        let tuning = Self {
            target_freq_bits: AtomicU32::new(0),
            threshold_bits: AtomicU32::new(0),
            auto_threshold: AtomicBool::new(auto_threshold),
        };
        tuning.set_target_freq(target_freq_hz);
        tuning.set_threshold(threshold);
        tuning
    }

    pub fn target_freq(&self) -> f32 {
        f32::from_bits(self.target_freq_bits.load(Ordering::Relaxed))
    }

    pub fn set_target_freq(&self, hz: f32) {
        self.target_freq_bits
            .store(hz.max(0.0).to_bits(), Ordering::Relaxed);
    }

    /// Detection threshold as a fraction of the dynamic range above the
    /// noise floor. In auto mode the detector writes back the calibrated
    /// value here so display callers can read it.
    pub fn threshold(&self) -> f32 {
        f32::from_bits(self.threshold_bits.load(Ordering::Relaxed))
    }

    pub fn set_threshold(&self, fraction: f32) {
        self.threshold_bits
            .store(fraction.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn auto_threshold(&self) -> bool {
        self.auto_threshold.load(Ordering::Relaxed)
    }

    pub fn set_auto_threshold(&self, enabled: bool) {
        self.auto_threshold.store(enabled, Ordering::Relaxed);
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::new(600.0, 0.1, false)
    }
}
