use sb_fbank::FbankError;

/// Failure conditions of the diarization pipeline.
///
/// "Zero segments matched" is not an error; a scan that completes without
/// matches returns an empty segment list. Only `extract_segments` on an
/// empty list fails, so a silent header-only WAV can never be produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported WAV format: {0} (only 16-bit PCM is supported)")]
    UnsupportedFormat(String),
    #[error("audio contains no samples")]
    EmptyAudio,
    #[error("audio too short: {duration:.2}s (minimum {min:.1}s)")]
    AudioTooShort { duration: f64, min: f64 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Fbank(#[from] FbankError),
    #[error("embedding extraction failed: {0}")]
    EmbeddingExtractionFailed(String),
    #[error("incompatible embeddings: length {expected} vs {got}")]
    IncompatibleEmbeddings { expected: usize, got: usize },
    #[error("no segments to extract")]
    NoSegments,
    #[error(transparent)]
    Wav(#[from] hound::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ort(#[from] ort::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
