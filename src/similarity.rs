use crate::error::{Error, Result};

/// Cosine similarity between two speaker embeddings, clamped to [-1, 1].
///
/// Each norm gets a 1e-8 epsilon before dividing, so zero vectors cannot
/// divide by zero without branching. Mismatched or empty inputs are an
/// error rather than a score of 0.0, which would be indistinguishable from
/// a confident non-match.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return Err(Error::IncompatibleEmbeddings {
            expected: a.len(),
            got: b.len(),
        });
    }

    const EPSILON: f32 = 1e-8;
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt() + EPSILON;
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt() + EPSILON;

    let similarity: f32 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x / norm_a) * (y / norm_b))
        .sum();

    Ok(similarity.clamp(-1.0, 1.0))
}
