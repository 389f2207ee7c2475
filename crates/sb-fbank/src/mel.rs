//! HTK mel scale and triangular filterbank construction.

use ndarray::Array2;

use crate::FbankError;

/// Convert frequency in Hz to mel scale (HTK formula).
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Convert mel scale to frequency in Hz (HTK formula).
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0f32.powf(mel / 2595.0) - 1.0)
}

/// Build the triangular mel filterbank matrix, shape `[n_mels, n_fft/2 + 1]`.
///
/// `n_mels + 2` points are equally spaced between `f_min` and `f_max` on the
/// mel scale and mapped to FFT bins with `floor((n_fft + 1) * hz / rate)`,
/// clamped to `[0, n_fft]`. Each filter rises linearly from its left bin to
/// its center bin and falls from center to right. With `slaney_norm` each
/// filter is rescaled by `2 / (hz[i+2] - hz[i])`.
pub fn mel_filterbank(
    n_mels: usize,
    n_fft: usize,
    sample_rate: u32,
    f_min: f32,
    f_max: f32,
    slaney_norm: bool,
) -> Result<Array2<f32>, FbankError> {
    if n_mels == 0 {
        return Err(FbankError::Filterbank("n_mels must be positive".into()));
    }
    if n_fft == 0 {
        return Err(FbankError::Filterbank("n_fft must be positive".into()));
    }
    if sample_rate == 0 {
        return Err(FbankError::Filterbank("sample_rate must be positive".into()));
    }
    if f_min < 0.0 {
        return Err(FbankError::Filterbank(format!(
            "f_min must be non-negative, got {f_min}"
        )));
    }
    if f_max <= f_min {
        return Err(FbankError::Filterbank(format!(
            "f_max must be greater than f_min, got f_max={f_max}, f_min={f_min}"
        )));
    }

    let mel_min = hz_to_mel(f_min);
    let mel_max = hz_to_mel(f_max);

    let hz_freqs: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_min + (mel_max - mel_min) * i as f32 / (n_mels + 1) as f32)
        .map(mel_to_hz)
        .collect();

    let bins: Vec<usize> = hz_freqs
        .iter()
        .map(|&hz| {
            let bin = ((n_fft + 1) as f32 * hz / sample_rate as f32).floor() as isize;
            bin.clamp(0, n_fft as isize) as usize
        })
        .collect();

    let n_freqs = n_fft / 2 + 1;
    let mut filterbank = Array2::<f32>::zeros((n_mels, n_freqs));

    for m in 0..n_mels {
        let (left, center, right) = (bins[m], bins[m + 1], bins[m + 2]);

        if left < center {
            for j in left..=center {
                if j < n_freqs {
                    filterbank[[m, j]] = (j - left) as f32 / ((center - left) as f32 + 1e-8);
                }
            }
        }
        if center < right {
            for j in center..=right {
                if j < n_freqs {
                    filterbank[[m, j]] = (right - j) as f32 / ((right - center) as f32 + 1e-8);
                }
            }
        }
    }

    if slaney_norm {
        for m in 0..n_mels {
            let enorm = 2.0 / (hz_freqs[m + 2] - hz_freqs[m]);
            for j in 0..n_freqs {
                filterbank[[m, j]] *= enorm;
            }
        }
    }

    Ok(filterbank)
}
