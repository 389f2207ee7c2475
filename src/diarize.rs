use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::embedding::EmbeddingExtractor;
use crate::error::{Error, Result};
use crate::similarity::cosine_similarity;
use crate::wav;
use crate::SAMPLE_RATE;

/// A matched time span of the meeting audio, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Sliding-window parameters for one diarization run.
#[derive(Debug, Clone)]
pub struct DiarizationConfig {
    /// Window length in seconds.
    pub segment_length: f64,
    /// Step between window starts in seconds. Smaller than `segment_length`
    /// overlaps windows, larger leaves gaps; both are valid.
    pub segment_step: f64,
    /// Fraction of a full window below which a window is too short to score.
    pub min_segment_ratio: f64,
    /// Default similarity threshold for a match, in [-1, 1].
    pub match_threshold: f32,
}

impl Default for DiarizationConfig {
    fn default() -> Self {
        Self {
            segment_length: 2.0,
            segment_step: 2.0,
            min_segment_ratio: 0.5,
            match_threshold: 0.6,
        }
    }
}

impl DiarizationConfig {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("segment_length", self.segment_length),
            ("segment_step", self.segment_step),
            ("min_segment_ratio", self.min_segment_ratio),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !self.match_threshold.is_finite() || !(-1.0..=1.0).contains(&self.match_threshold) {
            return Err(Error::InvalidInput(format!(
                "match_threshold must be in [-1, 1], got {}",
                self.match_threshold
            )));
        }
        Ok(())
    }
}

/// Timing summary of one diarization scan, built once the scan finishes.
#[derive(Debug, Clone, Default)]
pub struct PerformanceReport {
    pub audio_duration: f64,
    pub windows_scored: usize,
    pub windows_matched: usize,
    pub windows_skipped: usize,
    pub windows_failed: usize,
    pub inference_time: Duration,
    pub total_time: Duration,
}

impl PerformanceReport {
    /// Mean embedding-inference time per scored window.
    pub fn avg_inference_time(&self) -> Duration {
        if self.windows_scored == 0 {
            Duration::ZERO
        } else {
            self.inference_time / self.windows_scored as u32
        }
    }

    /// Processing time relative to audio duration (lower is faster).
    pub fn real_time_factor(&self) -> f64 {
        if self.audio_duration > 0.0 {
            self.total_time.as_secs_f64() / self.audio_duration
        } else {
            0.0
        }
    }
}

/// Scans meeting audio with a monotonic sliding window and matches each
/// window's embedding against one enrolled speaker.
pub struct DiarizationEngine {
    extractor: EmbeddingExtractor,
    config: DiarizationConfig,
    last_report: Option<PerformanceReport>,
}

impl DiarizationEngine {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        Self::with_config(model_path, DiarizationConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(model_path: P, config: DiarizationConfig) -> Result<Self> {
        let extractor = EmbeddingExtractor::new(model_path)?;
        Self::from_extractor(extractor, config)
    }

    /// Build an engine over an existing extractor (alternative backends).
    pub fn from_extractor(extractor: EmbeddingExtractor, config: DiarizationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor,
            config,
            last_report: None,
        })
    }

    pub fn config(&self) -> &DiarizationConfig {
        &self.config
    }

    /// Report for the most recent `diarize_meeting` call.
    pub fn last_report(&self) -> Option<&PerformanceReport> {
        self.last_report.as_ref()
    }

    /// Compute the enrollment embedding for the target speaker.
    pub fn enroll_speaker<P: AsRef<Path>>(&mut self, enrollment_path: P) -> Result<Vec<f32>> {
        let (audio, _) = wav::load_audio(enrollment_path, SAMPLE_RATE)?;
        self.extractor.compute(&audio)
    }

    /// Scan the meeting audio and return every window whose similarity to
    /// the enrollment embedding reaches `threshold`, in chronological order.
    ///
    /// A window whose embedding extraction fails is logged and treated as a
    /// non-match; the scan continues. A dimension mismatch against the
    /// enrollment embedding aborts the scan instead, since every remaining
    /// window would fail identically.
    pub fn diarize_meeting<P: AsRef<Path>>(
        &mut self,
        meeting_path: P,
        enrollment: &[f32],
        threshold: f32,
    ) -> Result<Vec<Segment>> {
        let scan_start = Instant::now();
        let (audio, sr) = wav::load_audio(meeting_path, SAMPLE_RATE)?;
        let duration = audio.len() as f64 / sr as f64;
        info!("diarizing meeting audio: {duration:.2}s");

        let min_samples =
            (self.config.segment_length * sr as f64 * self.config.min_segment_ratio) as usize;

        let mut segments = Vec::new();
        let mut report = PerformanceReport {
            audio_duration: duration,
            ..PerformanceReport::default()
        };

        let mut current = 0.0f64;
        while current < duration {
            let end = (current + self.config.segment_length).min(duration);
            let start_sample = (current * sr as f64) as usize;
            let end_sample = ((end * sr as f64) as usize).min(audio.len());
            let window = &audio[start_sample..end_sample];

            // Too short to score reliably; advance anyway.
            if window.len() < min_samples {
                report.windows_skipped += 1;
                current += self.config.segment_step;
                continue;
            }

            let inference_start = Instant::now();
            match self.extractor.compute(window) {
                Ok(embedding) => {
                    report.inference_time += inference_start.elapsed();
                    report.windows_scored += 1;

                    let similarity = cosine_similarity(&embedding, enrollment)?;
                    debug!("window {current:.2}s-{end:.2}s similarity {similarity:.3}");

                    if similarity >= threshold {
                        segments.push(Segment {
                            start: current,
                            end,
                        });
                        report.windows_matched += 1;
                    }
                }
                Err(error) => {
                    report.windows_failed += 1;
                    warn!("window {current:.2}s-{end:.2}s failed, treating as non-match: {error}");
                }
            }

            current += self.config.segment_step;
        }

        report.total_time = scan_start.elapsed();
        info!(
            "diarization completed: {}/{} windows matched (RTF {:.2}x)",
            report.windows_matched,
            report.windows_scored,
            report.real_time_factor()
        );
        self.last_report = Some(report);

        Ok(segments)
    }

    /// Concatenate the matched spans of the meeting audio, in segment
    /// order, into one 16-bit PCM WAV file.
    pub fn extract_segments<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        meeting_path: P,
        segments: &[Segment],
        output_path: Q,
    ) -> Result<()> {
        if segments.is_empty() {
            warn!("no segments to extract");
            return Err(Error::NoSegments);
        }

        let (audio, sr) = wav::load_audio(meeting_path, SAMPLE_RATE)?;

        let mut output = Vec::new();
        let mut total_duration = 0.0f64;
        for segment in segments {
            if !(segment.start >= 0.0 && segment.end > segment.start) {
                return Err(Error::InvalidInput(format!(
                    "segment {:.2}s-{:.2}s is not a valid time span",
                    segment.start, segment.end
                )));
            }
            let start_sample = ((segment.start * sr as f64) as usize).min(audio.len());
            let end_sample = ((segment.end * sr as f64) as usize).min(audio.len());
            output.extend_from_slice(&audio[start_sample..end_sample]);
            total_duration += segment.duration();
        }

        wav::write_wav(output_path, &output, sr)?;
        info!(
            "extracted {} segments ({total_duration:.1}s total)",
            segments.len()
        );
        Ok(())
    }
}
