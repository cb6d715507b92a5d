//! Spectral peak detection.
//!
//! Used by the status view to show which pitch is sounding, and by tests to
//! check that a held key actually produces its frequency.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Magnitudes below this count as silence.
const SILENT_MAGNITUDE: f32 = 1e-6;

/// Reusable FFT peak finder for a fixed window length.
pub struct PeakFinder {
    fft: Arc<dyn Fft<f32>>,
    /// Hann window coefficients
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl PeakFinder {
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(len);

        let window = (0..len)
            .map(|i| {
                if len > 1 {
                    let denom = (len - 1) as f32;
                    0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
                } else {
                    1.0
                }
            })
            .collect();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); len],
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Strongest non-DC frequency in `samples`, in Hz.
    ///
    /// `samples` must have the finder's length. Returns `None` for silence or
    /// a mismatched length.
    pub fn dominant_frequency(&mut self, samples: &[f32], sample_rate: f32) -> Option<f32> {
        let len = self.window.len();
        if len < 2 || samples.len() != len {
            return None;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(samples).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let half = len / 2;
        let magnitude = |i: usize| self.scratch[i].norm();

        let (peak, peak_mag) = (1..half)
            .map(|i| (i, magnitude(i)))
            .fold((0, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });
        if peak == 0 || peak_mag < SILENT_MAGNITUDE {
            return None;
        }

        // Parabolic interpolation between the neighbouring bins
        let offset = if peak + 1 < half {
            let (a, b, c) = (magnitude(peak - 1), peak_mag, magnitude(peak + 1));
            let denom = a - 2.0 * b + c;
            if denom.abs() > f32::EPSILON {
                0.5 * (a - c) / denom
            } else {
                0.0
            }
        } else {
            0.0
        };

        Some((peak as f32 + offset) * sample_rate / len as f32)
    }
}

/// One-shot form of [`PeakFinder::dominant_frequency`].
pub fn dominant_frequency(samples: &[f32], sample_rate: f32) -> Option<f32> {
    if samples.len() < 2 {
        return None;
    }
    PeakFinder::new(samples.len()).dominant_frequency(samples, sample_rate)
}
