//! Propiedades del flujo de video (espacio `VIDEO`).
//!
//! Los contenedores conocidos se leen de forma nativa; si no se obtiene la
//! cadencia se intenta `ffprobe`. Ningún manejador de archivo sobrevive a la
//! llamada.

mod ffprobe;
mod flv;
mod matroska;
mod mp4;
mod riff;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::family::lowercase_extension;
use crate::formatting::{format_duration, format_megapixels};
use crate::metadata::mapping::{MetadataMapping, Namespace};

pub const VIDEO_UNREADABLE: &str = "No se pudo abrir el video";

pub const LABEL_DURATION: &str = "Duración";
pub const LABEL_FRAMES: &str = "Fotogramas";
pub const LABEL_FPS: &str = "FPS";
pub const LABEL_RESOLUTION: &str = "Resolución";
pub const LABEL_MEGAPIXELS: &str = "Megapíxeles por fotograma";
pub const LABEL_ASPECT: &str = "Relación de aspecto";

/// Datos mínimos del primer flujo de video.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
    pub fps: f64,
}

impl StreamInfo {
    fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    fn has_timing(&self) -> bool {
        self.fps > 0.0
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Container {
    IsoBmff,
    Matroska,
    Avi,
    Flv,
    Other,
}

fn detect_container(path: &Path) -> Container {
    let mut header = [0_u8; 12];
    let read = File::open(path)
        .and_then(|mut file| file.read(&mut header))
        .unwrap_or(0);
    let header = &header[..read];

    if header.len() >= 8 && matches!(&header[4..8], b"ftyp" | b"moov" | b"mdat" | b"wide" | b"free")
    {
        return Container::IsoBmff;
    }
    if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Container::Matroska;
    }
    if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"AVI " {
        return Container::Avi;
    }
    if header.starts_with(b"FLV") {
        return Container::Flv;
    }
    match lowercase_extension(path).as_str() {
        "mp4" | "mov" => Container::IsoBmff,
        "mkv" | "webm" => Container::Matroska,
        "avi" => Container::Avi,
        "flv" => Container::Flv,
        _ => Container::Other,
    }
}

/// Abre el video y devuelve sus propiedades, o `None` si no es legible.
pub fn probe_stream(path: &Path) -> Option<StreamInfo> {
    let container = detect_container(path);
    let native = match container {
        Container::IsoBmff => mp4::probe(path),
        Container::Matroska => matroska::probe(path),
        Container::Avi => riff::probe(path),
        Container::Flv => flv::probe(path),
        Container::Other => None,
    }
    .filter(StreamInfo::has_dimensions);

    match native {
        Some(info) if info.has_timing() => Some(info),
        partial => {
            debug!(?container, "lectura nativa incompleta, probando ffprobe");
            ffprobe::probe(path)
                .filter(StreamInfo::has_dimensions)
                .or(partial)
        }
    }
}

pub fn extract_video_metadata(path: &Path) -> MetadataMapping {
    match probe_stream(path) {
        Some(info) => describe(&info),
        None => MetadataMapping::sentinel(Namespace::Video, VIDEO_UNREADABLE),
    }
}

fn describe(info: &StreamInfo) -> MetadataMapping {
    let mut mapping = MetadataMapping::new();
    if info.has_timing() {
        let seconds = info.frame_count as f64 / info.fps;
        mapping.push(Namespace::Video, LABEL_DURATION, format_duration(seconds));
    }
    mapping.push(Namespace::Video, LABEL_FRAMES, info.frame_count.to_string());
    mapping.push(Namespace::Video, LABEL_FPS, format!("{:.2}", info.fps));
    mapping.push(
        Namespace::Video,
        LABEL_RESOLUTION,
        format!("{}x{}", info.width, info.height),
    );
    mapping.push(
        Namespace::Video,
        LABEL_MEGAPIXELS,
        format_megapixels(info.width, info.height),
    );
    mapping.push(
        Namespace::Video,
        LABEL_ASPECT,
        format!("{}:{}", info.width, info.height),
    );
    mapping
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub(crate) use super::matroska::tests::sample_mkv;
    pub(crate) use super::mp4::tests::sample_mp4;
    pub(crate) use super::riff::tests::sample_avi;
}
