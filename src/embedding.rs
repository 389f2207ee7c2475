use std::path::Path;

use ndarray::{Array3, ArrayView3, Axis};
use ort::Session;

use sb_fbank::{FbankConfig, FbankExtractor};

use crate::error::{Error, Result};
use crate::session;
use crate::SAMPLE_RATE;

/// The opaque embedding network: a frame-major `[1, frames, n_mels]` tensor
/// in, a flat speaker vector out. Implementations own all knowledge of the
/// backend's output shape.
pub trait EmbeddingModel: Send {
    fn infer(&mut self, features: ArrayView3<'_, f32>) -> Result<Vec<f32>>;
}

/// ONNX-backed embedding model (ECAPA-TDNN or any network with the same
/// tensor contract).
pub struct OnnxEmbeddingModel {
    session: Session,
    output_name: String,
}

impl OnnxEmbeddingModel {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let session = session::create_session(model_path)?;
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == "embedding")
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| Error::EmbeddingExtractionFailed("model has no outputs".into()))?;
        Ok(Self {
            session,
            output_name,
        })
    }
}

impl EmbeddingModel for OnnxEmbeddingModel {
    fn infer(&mut self, features: ArrayView3<'_, f32>) -> Result<Vec<f32>> {
        let inputs = ort::inputs![features.into_dyn()]?;
        let ort_outs = self.session.run(inputs)?;
        let ort_out = ort_outs
            .get(self.output_name.as_str())
            .ok_or_else(|| Error::EmbeddingExtractionFailed("output tensor not found".into()))?
            .try_extract_tensor::<f32>()?;

        // Whatever rank the model returns, iterating the view flattens it
        // to the embedding in row-major order.
        Ok(ort_out.iter().copied().collect())
    }
}

/// Adapts audio windows into model inputs and model outputs into flat
/// embeddings.
pub struct EmbeddingExtractor {
    fbank: FbankExtractor,
    model: Box<dyn EmbeddingModel>,
}

impl EmbeddingExtractor {
    /// ONNX-backed extractor at the pipeline operating rate.
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model = OnnxEmbeddingModel::new(model_path)?;
        Self::with_model(Box::new(model))
    }

    /// Extractor over any embedding backend.
    pub fn with_model(model: Box<dyn EmbeddingModel>) -> Result<Self> {
        Self::with_model_and_config(model, FbankConfig::default())
    }

    /// Extractor with non-default feature parameters. The defaults match
    /// what ECAPA-TDNN models are trained against; override only for
    /// experimentation.
    pub fn with_model_and_config(
        model: Box<dyn EmbeddingModel>,
        config: FbankConfig,
    ) -> Result<Self> {
        let fbank = FbankExtractor::new(config, SAMPLE_RATE)?;
        Ok(Self { fbank, model })
    }

    /// Compute a speaker embedding for one window of 16 kHz mono audio.
    pub fn compute(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        let features = self.fbank.compute(samples)?; // [n_mels, frames]

        // The model wants frame-major: [1, frames, n_mels].
        let frame_major = features.t().as_standard_layout().to_owned();
        let input: Array3<f32> = frame_major.insert_axis(Axis(0));

        let embedding = self.model.infer(input.view())?;
        if embedding.is_empty() {
            return Err(Error::EmbeddingExtractionFailed(
                "model returned an empty embedding".into(),
            ));
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct ShapeProbe {
        seen: Arc<Mutex<Option<(usize, usize, usize)>>>,
        response: Vec<f32>,
    }

    impl EmbeddingModel for ShapeProbe {
        fn infer(&mut self, features: ArrayView3<'_, f32>) -> Result<Vec<f32>> {
            let shape = features.shape();
            *self.seen.lock().unwrap() = Some((shape[0], shape[1], shape[2]));
            Ok(self.response.clone())
        }
    }

    #[test]
    fn features_reach_the_model_frame_major() {
        let seen = Arc::new(Mutex::new(None));
        let probe = ShapeProbe {
            seen: seen.clone(),
            response: vec![1.0; 192],
        };
        let mut extractor = EmbeddingExtractor::with_model(Box::new(probe)).unwrap();

        let samples = vec![0.1f32; 16_000]; // 1s at 16 kHz
        let embedding = extractor.compute(&samples).unwrap();
        assert_eq!(embedding.len(), 192);

        // 1 + 16000 / 160 = 101 frames, 80 mel bands, batch of one.
        assert_eq!(seen.lock().unwrap().unwrap(), (1, 101, 80));
    }

    #[test]
    fn empty_model_output_is_a_hard_failure() {
        let probe = ShapeProbe {
            seen: Arc::new(Mutex::new(None)),
            response: vec![],
        };
        let mut extractor = EmbeddingExtractor::with_model(Box::new(probe)).unwrap();

        assert!(matches!(
            extractor.compute(&vec![0.1f32; 8000]),
            Err(Error::EmbeddingExtractionFailed(_))
        ));
    }

    #[test]
    fn invalid_audio_propagates_as_feature_error() {
        let probe = ShapeProbe {
            seen: Arc::new(Mutex::new(None)),
            response: vec![1.0; 8],
        };
        let mut extractor = EmbeddingExtractor::with_model(Box::new(probe)).unwrap();

        assert!(matches!(
            extractor.compute(&[f32::NAN; 100]),
            Err(Error::Fbank(_))
        ));
    }
}
