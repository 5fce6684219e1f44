// @module: Seek bar helpers

/// Format a position as `mm:ss`; zero renders as `0:00`
pub fn format_clock(ms: u64) -> String {
    if ms == 0 {
        return "0:00".to_string();
    }

    let total_seconds = ms / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// How far `position_ms` is into `duration_ms`, from 0 to 100
pub fn progress_percent(position_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    (position_ms.min(duration_ms) as f64 / duration_ms as f64) * 100.0
}
