use std::path::Path;

use ort::{GraphOptimizationLevel, Session};

use crate::error::Result;

pub fn create_session<P: AsRef<Path>>(model_path: P) -> Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(1)?
        .with_inter_threads(1)?
        .commit_from_file(model_path.as_ref())?;
    Ok(session)
}
