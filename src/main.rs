use eyre::{ContextCompat, Result};
use tracing_subscriber::EnvFilter;

use ecapa_rs::DiarizationEngine;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let usage = "usage: ecapa-rs <model.onnx> <enrollment.wav> <meeting.wav> <output.wav>";
    let model_path = args.next().context(usage)?;
    let enrollment_path = args.next().context(usage)?;
    let meeting_path = args.next().context(usage)?;
    let output_path = args.next().context(usage)?;

    let mut engine = DiarizationEngine::new(&model_path)?;
    let threshold = engine.config().match_threshold;

    let enrollment = engine.enroll_speaker(&enrollment_path)?;
    println!("enrolled speaker: {} dimensions", enrollment.len());

    let segments = engine.diarize_meeting(&meeting_path, &enrollment, threshold)?;
    for segment in &segments {
        println!("matched {:.2}s - {:.2}s", segment.start, segment.end);
    }

    if segments.is_empty() {
        println!("no windows matched the enrolled speaker");
        return Ok(());
    }

    engine.extract_segments(&meeting_path, &segments, &output_path)?;
    if let Some(report) = engine.last_report() {
        println!(
            "scored {} windows in {:.2}s (RTF {:.2}x)",
            report.windows_scored,
            report.total_time.as_secs_f64(),
            report.real_time_factor()
        );
    }
    println!("saved extracted audio to {output_path}");

    Ok(())
}
