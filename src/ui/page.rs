//! The single-page gallery UI

use crate::ui::progress::SimulatedProgress;

const TEMPLATE: &str = include_str!("../../assets/index.html");

/// Render the page with the progress simulation parameters filled in
pub fn render_index(progress: &SimulatedProgress) -> String {
    TEMPLATE
        .replace("{{TICK_MS}}", &progress.tick.as_millis().to_string())
        .replace("{{STEP}}", &progress.step.to_string())
        .replace("{{CAP}}", &progress.cap.to_string())
        .replace(
            "{{ASSUMED_SECS}}",
            &progress.assumed_duration.as_secs().to_string(),
        )
}
