use std::sync::Arc;

use log::trace;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::tuning::Tuning;

pub const DEFAULT_WINDOW_LEN: usize = 1024;

/// Magnitudes at or below this level are treated as ambient noise.
pub const NOISE_FLOOR_DB: f32 = -60.0;

const AUTO_THRESHOLD_PERCENTILE: f32 = 0.95;

/// FFT tone detector over a fixed-length sample window.
///
/// Samples are stored pre-weighted with a Hamming taper; each full window
/// is transformed once and reduced to a single present/absent decision
/// for the tuned frequency bin. One decision is produced every
/// `window_len` samples, so the decoder downstream runs at
/// `sample_rate / window_len` updates per second.
pub struct ToneDetector {
    sample_rate_hz: f32,
    window_len: usize,
    noise_floor_db: f32,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    pos: usize,
    magnitudes_db: Vec<f32>,
    tuning: Arc<Tuning>,
    threshold: f32,
}

impl ToneDetector {
    pub fn new(sample_rate_hz: f32, tuning: Arc<Tuning>) -> Self {
        Self::with_window_len(sample_rate_hz, DEFAULT_WINDOW_LEN, tuning)
    }

    /// Create a detector with a custom window length. The length is
    /// rounded up to a power of two.
    pub fn with_window_len(sample_rate_hz: f32, window_len: usize, tuning: Arc<Tuning>) -> Self {
        let window_len = window_len.max(2).next_power_of_two();
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(window_len);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let threshold = tuning.threshold();
        Self {
            sample_rate_hz,
            window_len,
            noise_floor_db: NOISE_FLOOR_DB,
            fft,
            buffer: vec![Complex::new(0.0, 0.0); window_len],
            scratch,
            pos: 0,
            magnitudes_db: vec![NOISE_FLOOR_DB; window_len / 2],
            tuning,
            threshold,
        }
    }

    /// Accumulate one sample in [-1, 1].
    ///
    /// Returns the tone decision once per completed window, `None` while
    /// the window is still filling.
    pub fn push_sample(&mut self, sample: f32) -> Option<bool> {
        let taper = 0.54
            - 0.46 * (std::f32::consts::TAU * self.pos as f32 / self.window_len as f32).cos();
        self.buffer[self.pos] = Complex::new(sample * taper, 0.0);
        self.pos += 1;
        if self.pos < self.window_len {
            return None;
        }
        self.pos = 0;
        Some(self.finish_window())
    }

    fn finish_window(&mut self) -> bool {
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let scale = 1.0 / self.window_len as f32;
        for (bin, out) in self.buffer[..self.window_len / 2]
            .iter()
            .zip(self.magnitudes_db.iter_mut())
        {
            let mag = bin.norm() * scale;
            *out = (20.0 * mag.log10()).max(self.noise_floor_db);
        }

        if self.tuning.auto_threshold() {
            if let Some(fraction) = calibrate_threshold(&self.magnitudes_db, self.noise_floor_db) {
                self.threshold = fraction;
                // Write back so display callers see the calibrated value.
                self.tuning.set_threshold(fraction);
            }
        } else {
            self.threshold = self.tuning.threshold().clamp(0.0, 1.0);
        }

        let bin = self.target_bin();
        let magnitude = self.buffer[bin].norm() * scale;
        let gate = linear_threshold(self.threshold, self.noise_floor_db);
        trace!(
            "frame: bin {} mag {:.6} gate {:.6} threshold {:.3}",
            bin,
            magnitude,
            gate,
            self.threshold
        );
        magnitude > gate
    }

    fn target_bin(&self) -> usize {
        let bin =
            (self.tuning.target_freq() * self.window_len as f32 / self.sample_rate_hz).round();
        (bin.max(0.0) as usize).min(self.window_len / 2 - 1)
    }

    /// Active threshold fraction, calibrated or manual.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Magnitude spectrum of the last completed window, in dB, clamped at
    /// the noise floor. One entry per bin up to Nyquist.
    pub fn magnitudes_db(&self) -> &[f32] {
        &self.magnitudes_db
    }

    /// Center frequency of a spectrum bin.
    pub fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate_hz / self.window_len as f32
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }
}

/// Derive a [0, 1] threshold fraction from the 95th percentile of the
/// bins above the noise floor. Returns `None` when no bin rises above the
/// floor, in which case the caller keeps its previous threshold.
fn calibrate_threshold(magnitudes_db: &[f32], noise_floor_db: f32) -> Option<f32> {
    let mut above: Vec<f32> = magnitudes_db
        .iter()
        .copied()
        .filter(|&db| db > noise_floor_db)
        .collect();
    if above.is_empty() {
        return None;
    }
    above.sort_by(|a, b| a.total_cmp(b));
    let idx = (AUTO_THRESHOLD_PERCENTILE * above.len() as f32).floor() as usize;
    let p95 = above[idx.min(above.len() - 1)];
    Some(((p95 - noise_floor_db) / -noise_floor_db).clamp(0.0, 1.0))
}

fn linear_threshold(fraction: f32, noise_floor_db: f32) -> f32 {
    10.0_f32.powf((noise_floor_db + fraction * -noise_floor_db) / 20.0)
}
