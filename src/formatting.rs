use chrono::{DateTime, Local};
use std::time::SystemTime;

/// Formato común de fechas en toda la metadata (`YYYY:MM:DD HH:MM:SS`).
pub const TIMESTAMP_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

pub fn format_optional_time(time: Option<SystemTime>) -> String {
    match time {
        Some(value) => format_system_time(value),
        None => "No disponible".to_string(),
    }
}

pub fn format_system_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format(TIMESTAMP_FORMAT).to_string()
}

/// Tamaño legible con prefijos binarios y dos decimales (umbral de 1024).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;

    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }

    format!("{value:.2} TB")
}

/// Duración `HH:MM:SS` truncando las fracciones de segundo.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Megapíxeles con un decimal.
pub fn format_megapixels(width: u32, height: u32) -> String {
    format!("{:.1}", (width as f64 * height as f64) / 1_000_000.0)
}
