//! STFT framing, windowing, and power spectrum.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::Fft;

/// Periodic Hann window: `w[i] = 0.5 - 0.5 * cos(2*pi*i / length)`.
pub fn hann_window(length: usize) -> Vec<f32> {
    let n = length as f64;
    (0..length)
        .map(|i| (0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / n).cos()) as f32)
        .collect()
}

/// Center padding of `pad` samples per side. Reflect mode mirrors interior
/// samples (indices clamp at the edges for very short signals); otherwise
/// zeros. `signal` must be non-empty.
pub fn pad_signal(signal: &[f32], pad: usize, reflect: bool) -> Vec<f32> {
    let mut padded = Vec::with_capacity(signal.len() + 2 * pad);
    if reflect {
        let last = signal.len() - 1;
        for k in 0..pad {
            padded.push(signal[(pad - k).min(last)]);
        }
        padded.extend_from_slice(signal);
        for i in 0..pad {
            let idx = (signal.len() as isize - 2 - i as isize).max(0) as usize;
            padded.push(signal[idx]);
        }
    } else {
        padded.resize(pad, 0.0);
        padded.extend_from_slice(signal);
        padded.resize(signal.len() + 2 * pad, 0.0);
    }
    padded
}

/// Split a signal into overlapping frames of length `n_fft`, windowed with
/// `window` applied cyclically when `win_length < n_fft`. Frame count is
/// `1 + (padded_len - n_fft) / hop_length`, minimum 1; samples past the end
/// of the padded signal read as zero.
pub fn frame_signal(
    signal: &[f32],
    n_fft: usize,
    hop_length: usize,
    win_length: usize,
    window: &[f32],
    center: bool,
    reflect: bool,
) -> Vec<Vec<f32>> {
    let padded = if center {
        pad_signal(signal, n_fft / 2, reflect)
    } else {
        signal.to_vec()
    };

    let num_frames = 1 + padded.len().saturating_sub(n_fft) / hop_length;
    let mut frames = Vec::with_capacity(num_frames);
    for f in 0..num_frames {
        let start = f * hop_length;
        let mut frame = vec![0.0f32; n_fft];
        for (j, value) in frame.iter_mut().enumerate() {
            let idx = start + j;
            if idx < padded.len() {
                *value = padded[idx] * window[j % win_length];
            }
        }
        frames.push(frame);
    }
    frames
}

/// Magnitude-squared spectrum over bins `0..=n_fft/2` of one windowed frame.
/// DC and Nyquist are pure real components; interior bins combine the real
/// and imaginary parts.
pub fn power_spectrum(frame: &[f32], fft: &Arc<dyn Fft<f32>>) -> Vec<f32> {
    let n_fft = frame.len();
    let mut buf: Vec<Complex<f32>> = frame
        .iter()
        .map(|&x| Complex { re: x, im: 0.0 })
        .collect();
    fft.process(&mut buf);

    let mut spectrum = vec![0.0f32; n_fft / 2 + 1];
    spectrum[0] = buf[0].re * buf[0].re;
    for k in 1..n_fft / 2 {
        let c = buf[k];
        spectrum[k] = c.re * c.re + c.im * c.im;
    }
    spectrum[n_fft / 2] = buf[n_fft / 2].re * buf[n_fft / 2].re;
    spectrum
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::FftPlanner;

    #[test]
    fn hann_window_periodic_endpoints() {
        let window = hann_window(400);
        assert_eq!(window.len(), 400);
        assert!(window[0].abs() < 1e-7);
        // Periodic window peaks at n/2 and does not return to zero at n-1.
        assert!((window[200] - 1.0).abs() < 1e-6);
        assert!(window[399] > 0.0);
    }

    #[test]
    fn reflect_pad_mirrors_interior() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let padded = pad_signal(&x, 2, true);
        assert_eq!(padded, vec![3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0]);
    }

    #[test]
    fn reflect_pad_clamps_for_short_signals() {
        let x = vec![1.0, 2.0];
        let padded = pad_signal(&x, 3, true);
        assert_eq!(padded.len(), 8);
        // Mirror indices clamp to the valid range instead of panicking.
        assert_eq!(&padded[3..5], &[1.0, 2.0]);
    }

    #[test]
    fn zero_pad_fills_zeros() {
        let x = vec![1.0, 2.0];
        let padded = pad_signal(&x, 2, false);
        assert_eq!(padded, vec![0.0, 0.0, 1.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn frame_count_matches_formula() {
        let window = hann_window(400);
        let signal = vec![0.1f32; 16_000];
        let frames = frame_signal(&signal, 400, 160, 400, &window, true, true);
        // padded = 16000 + 400; 1 + (16400 - 400) / 160 = 101
        assert_eq!(frames.len(), 101);
        assert!(frames.iter().all(|f| f.len() == 400));
    }

    #[test]
    fn short_signal_yields_one_frame() {
        let window = hann_window(64);
        let signal = vec![0.5f32; 10];
        let frames = frame_signal(&signal, 64, 16, 64, &window, false, false);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn power_spectrum_of_dc_signal() {
        let fft = FftPlanner::new().plan_fft_forward(8);
        let frame = vec![1.0f32; 8];
        let spectrum = power_spectrum(&frame, &fft);
        assert_eq!(spectrum.len(), 5);
        // All energy lands in the DC bin: (sum of samples)^2.
        assert!((spectrum[0] - 64.0).abs() < 1e-3);
        for &v in &spectrum[1..] {
            assert!(v.abs() < 1e-3);
        }
    }

    #[test]
    fn power_spectrum_peak_tracks_tone_frequency() {
        let n = 256;
        let fft = FftPlanner::new().plan_fft_forward(n);
        // Tone at bin 32.
        let frame: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * 32.0 * i as f32 / n as f32).sin())
            .collect();
        let spectrum = power_spectrum(&frame, &fft);
        let peak = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak, 32);
    }
}
