use std::time::{Duration, UNIX_EPOCH};

use loadstat_core::RunWindow;

pub(crate) fn format_ms(ms: u64) -> String {
    if ms >= 1_000 {
        format!("{:.2}s", (ms as f64) / 1000.0)
    } else {
        format!("{ms}ms")
    }
}

pub(crate) fn format_ms_f64(ms: f64) -> String {
    if !ms.is_finite() {
        return "0ms".to_string();
    }
    if ms >= 1_000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{ms:.2}ms")
    }
}

pub(crate) fn format_rate(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.2}")
    } else {
        "0".to_string()
    }
}

pub(crate) fn format_percent(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.2}%")
    } else {
        "0.00%".to_string()
    }
}

pub(crate) fn format_window(w: RunWindow) -> String {
    let duration = Duration::from_millis(u64::try_from(w.duration_ms()).unwrap_or(0));
    match u64::try_from(w.start_ms) {
        Ok(start) if start > 0 => {
            let at = UNIX_EPOCH + Duration::from_millis(start);
            format!(
                "{} (+{})",
                humantime::format_rfc3339_millis(at),
                humantime::format_duration(duration)
            )
        }
        _ => humantime::format_duration(duration).to_string(),
    }
}
