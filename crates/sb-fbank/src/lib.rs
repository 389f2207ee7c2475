//! SpeechBrain-style log-mel filterbank features in pure Rust.
//!
//! Reproduces the ECAPA-TDNN front end: centered STFT with reflect padding,
//! periodic Hann window, magnitude-squared spectrum, HTK-scale triangular
//! mel filterbank with Slaney normalization, natural-log compression with a
//! fixed 1e-8 floor, and per-utterance mean subtraction.

mod mel;
mod stft;

pub use mel::{hz_to_mel, mel_filterbank, mel_to_hz};
pub use stft::{frame_signal, hann_window, pad_signal, power_spectrum};

use std::sync::Arc;

use ndarray::{Array1, Array2, Axis};
use rustfft::{Fft, FftPlanner};

#[derive(Debug, thiserror::Error)]
pub enum FbankError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid filterbank parameters: {0}")]
    Filterbank(String),
}

/// Padding mode for centered framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PadMode {
    #[default]
    Reflect,
    Zero,
}

/// Filterbank configuration. The defaults match the SpeechBrain ECAPA front
/// end exactly and are load-bearing for compatibility with models trained
/// against it; the power spectrum is fixed at magnitude squared.
#[derive(Debug, Clone)]
pub struct FbankConfig {
    pub n_mels: usize,
    pub n_fft: usize,
    pub hop_length: usize,
    pub win_length: usize,
    pub f_min: f32,
    /// Upper band edge; `None` means Nyquist (`sample_rate / 2`).
    pub f_max: Option<f32>,
    pub center: bool,
    pub pad_mode: PadMode,
    /// Slaney area normalization of the filters.
    pub slaney_norm: bool,
}

impl Default for FbankConfig {
    fn default() -> Self {
        Self {
            n_mels: 80,
            n_fft: 400,
            hop_length: 160,
            win_length: 400,
            f_min: 0.0,
            f_max: None,
            center: true,
            pad_mode: PadMode::Reflect,
            slaney_norm: true,
        }
    }
}

/// Log-mel extractor. The Hann window, filterbank matrix, and FFT plan are
/// computed once here and reused for every frame of every call.
pub struct FbankExtractor {
    config: FbankConfig,
    sample_rate: u32,
    window: Vec<f32>,
    filterbank: Array2<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl FbankExtractor {
    pub fn new(config: FbankConfig, sample_rate: u32) -> Result<Self, FbankError> {
        if sample_rate == 0 {
            return Err(FbankError::InvalidInput(
                "sample_rate must be positive".into(),
            ));
        }
        if config.hop_length == 0 {
            return Err(FbankError::Filterbank("hop_length must be positive".into()));
        }
        if config.win_length == 0 || config.win_length > config.n_fft {
            return Err(FbankError::Filterbank(format!(
                "win_length must be in [1, n_fft], got {}",
                config.win_length
            )));
        }
        let f_max = config.f_max.unwrap_or(sample_rate as f32 / 2.0);
        let filterbank = mel_filterbank(
            config.n_mels,
            config.n_fft,
            sample_rate,
            config.f_min,
            f_max,
            config.slaney_norm,
        )?;
        let window = hann_window(config.win_length);
        let fft = FftPlanner::new().plan_fft_forward(config.n_fft);
        Ok(Self {
            config,
            sample_rate,
            window,
            filterbank,
            fft,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn n_mels(&self) -> usize {
        self.config.n_mels
    }

    /// Mean-normalized log-mel features, band-major `[n_mels, n_frames]`.
    ///
    /// The per-band mean over all frames of the utterance is subtracted
    /// (mean only, no variance normalization).
    pub fn compute(&self, samples: &[f32]) -> Result<Array2<f32>, FbankError> {
        validate_waveform(samples)?;

        let frames = frame_signal(
            samples,
            self.config.n_fft,
            self.config.hop_length,
            self.config.win_length,
            &self.window,
            self.config.center,
            self.config.pad_mode == PadMode::Reflect,
        );

        let mut features = Array2::<f32>::zeros((self.config.n_mels, frames.len()));
        for (f, frame) in frames.iter().enumerate() {
            let spectrum = Array1::from_vec(power_spectrum(frame, &self.fft));
            let energies = self.filterbank.dot(&spectrum);
            for (m, &e) in energies.iter().enumerate() {
                features[[m, f]] = (e + 1e-8).ln();
            }
        }

        let mean = features
            .mean_axis(Axis(1))
            .ok_or_else(|| FbankError::InvalidInput("no frames to normalize".into()))?;
        Ok(features - mean.insert_axis(Axis(1)))
    }
}

fn validate_waveform(samples: &[f32]) -> Result<(), FbankError> {
    if samples.is_empty() {
        return Err(FbankError::InvalidInput("waveform cannot be empty".into()));
    }
    if samples.iter().any(|s| s.is_nan()) {
        return Err(FbankError::InvalidInput(
            "waveform contains NaN values".into(),
        ));
    }
    if samples.iter().any(|s| s.is_infinite()) {
        return Err(FbankError::InvalidInput(
            "waveform contains infinite values".into(),
        ));
    }
    Ok(())
}

/// One-shot helper with the default configuration.
pub fn compute_fbank(samples: &[f32], sample_rate: u32) -> Result<Array2<f32>, FbankError> {
    FbankExtractor::new(FbankConfig::default(), sample_rate)?.compute(samples)
}
