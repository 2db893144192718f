//! Respaldo con `ffprobe` para contenedores sin lector nativo (wmv, perfiles raros).

use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tracing::debug;

use super::StreamInfo;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    nb_frames: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

pub(super) fn probe(path: &Path) -> Option<StreamInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,nb_frames,avg_frame_rate,r_frame_rate,duration:format=duration",
            "-of",
            "json",
        ])
        .arg(path)
        .output();

    let output = match output {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            debug!(status = %output.status, "ffprobe no pudo leer el video");
            return None;
        }
        Err(error) => {
            debug!(%error, "ffprobe no disponible");
            return None;
        }
    };

    parse_output(&output.stdout)
}

fn parse_output(stdout: &[u8]) -> Option<StreamInfo> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout).ok()?;
    let stream = parsed.streams.into_iter().next()?;
    let (width, height) = (stream.width?, stream.height?);

    let fps = [stream.avg_frame_rate.as_deref(), stream.r_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(parse_rate)
        .find(|rate| *rate > 0.0)
        .unwrap_or(0.0);

    let duration = stream
        .duration
        .or_else(|| parsed.format.and_then(|format| format.duration))
        .and_then(|value| value.parse::<f64>().ok())
        .unwrap_or(0.0);

    let frame_count = stream
        .nb_frames
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|frames| *frames > 0)
        .unwrap_or_else(|| (duration * fps).round().max(0.0) as u64);

    Some(StreamInfo {
        width,
        height,
        frame_count,
        fps,
    })
}

/// `"30000/1001"` → 29.97.
fn parse_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => rate.trim().parse::<f64>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_output_is_interpreted() {
        let json = br#"{
            "programs": [],
            "streams": [{
                "width": 1280, "height": 720,
                "avg_frame_rate": "30000/1001", "r_frame_rate": "30000/1001",
                "nb_frames": "300"
            }],
            "format": {"duration": "10.010000"}
        }"#;

        let info = parse_output(json).expect("salida válida");
        assert_eq!((info.width, info.height), (1280, 720));
        assert_eq!(info.frame_count, 300);
        assert!((info.fps - 29.97).abs() < 0.01);
    }

    #[test]
    fn frame_count_is_estimated_without_nb_frames() {
        let json = br#"{"streams": [{"width": 640, "height": 360,
            "avg_frame_rate": "0/0", "r_frame_rate": "25/1"}],
            "format": {"duration": "4.0"}}"#;
        let info = parse_output(json).expect("salida válida");
        assert_eq!(info.frame_count, 100);
        assert!((info.fps - 25.0).abs() < 1e-9);
    }

    #[test]
    fn rates_tolerate_zero_denominators() {
        assert_eq!(parse_rate("0/0"), None);
        assert_eq!(parse_rate("25"), Some(25.0));
    }
}
