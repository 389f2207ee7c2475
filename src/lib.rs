//! Target-speaker diarization: enroll a speaker from a short recording,
//! find their time windows in a longer recording, and extract the matched
//! audio into a new WAV file.
//!
//! The pipeline is WAV decode -> linear resample to 16 kHz -> log-mel
//! features (`sb-fbank`) -> ECAPA-TDNN embedding (ONNX) -> cosine matching
//! over a sliding window.

mod diarize;
mod embedding;
mod error;
mod resample;
mod session;
mod similarity;
mod wav;

pub use diarize::{DiarizationConfig, DiarizationEngine, PerformanceReport, Segment};
pub use embedding::{EmbeddingExtractor, EmbeddingModel, OnnxEmbeddingModel};
pub use error::{Error, Result};
pub use resample::resample;
pub use sb_fbank::{compute_fbank, FbankConfig, FbankExtractor};
pub use session::create_session;
pub use similarity::cosine_similarity;
pub use wav::{load_audio, read_wav, write_wav, MIN_DURATION_SECS};

/// Operating sample rate of the whole pipeline.
pub const SAMPLE_RATE: u32 = 16_000;
