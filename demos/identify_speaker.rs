/*
Export an ECAPA-TDNN speaker embedding model to ONNX
(input: float32 [1, frames, 80] log-mel features, output: float32 [1, dim]),
then:
cargo run --example identify_speaker model.onnx enrollment.wav meeting.wav
*/

use eyre::Result;
use ecapa_rs::DiarizationEngine;

fn main() -> Result<()> {
    let model_path = std::env::args().nth(1).expect("Please specify model path");
    let enrollment_path = std::env::args()
        .nth(2)
        .expect("Please specify enrollment audio");
    let meeting_path = std::env::args()
        .nth(3)
        .expect("Please specify meeting audio");

    let mut engine = DiarizationEngine::new(&model_path)?;
    let threshold = engine.config().match_threshold;

    let enrollment = engine.enroll_speaker(&enrollment_path)?;
    let segments = engine.diarize_meeting(&meeting_path, &enrollment, threshold)?;

    if segments.is_empty() {
        println!("no match for the enrolled speaker");
        return Ok(());
    }

    for segment in segments {
        println!("start = {:.2}, end = {:.2}", segment.start, segment.end);
    }

    Ok(())
}
