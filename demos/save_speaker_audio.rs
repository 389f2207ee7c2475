/*
Export an ECAPA-TDNN speaker embedding model to ONNX, then:
cargo run --example save_speaker_audio model.onnx enrollment.wav meeting.wav out.wav

Writes every window of meeting.wav that matches the voice in enrollment.wav
into out.wav, in order.
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
    let output_path = std::env::args().nth(4).expect("Please specify output path");

    let mut engine = DiarizationEngine::new(&model_path)?;
    let threshold = engine.config().match_threshold;

    let enrollment = engine.enroll_speaker(&enrollment_path)?;
    let segments = engine.diarize_meeting(&meeting_path, &enrollment, threshold)?;

    match engine.extract_segments(&meeting_path, &segments, &output_path) {
        Ok(()) => println!("created {output_path}"),
        Err(error) => eprintln!("nothing extracted: {error}"),
    }

    Ok(())
}
