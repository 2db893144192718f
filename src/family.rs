//! Clasificación de archivos por familia de contenedor a partir de la extensión.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::metadata::mapping::Namespace;

pub const IMAGE_EXTENSIONS: [&str; 10] = [
    "jpg", "jpeg", "tiff", "tif", "png", "bmp", "gif", "webp", "ico", "svg",
];
pub const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "flac", "ogg", "wav"];
pub const PDF_EXTENSIONS: [&str; 1] = ["pdf"];
pub const DOCUMENT_EXTENSIONS: [&str; 1] = ["docx"];
pub const PRESENTATION_EXTENSIONS: [&str; 1] = ["pptx"];
pub const SPREADSHEET_EXTENSIONS: [&str; 1] = ["xlsx"];
pub const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mkv", "mov", "flv", "wmv", "webm"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Family {
    Image,
    Audio,
    Pdf,
    Document,
    Presentation,
    Spreadsheet,
    Video,
    Unsupported,
}

impl Family {
    /// Familia correspondiente a una extensión (sin punto, cualquier capitalización).
    pub fn from_extension(extension: &str) -> Self {
        let extension = extension.to_lowercase();
        let ext = extension.as_str();

        if IMAGE_EXTENSIONS.contains(&ext) {
            Family::Image
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            Family::Audio
        } else if PDF_EXTENSIONS.contains(&ext) {
            Family::Pdf
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            Family::Document
        } else if PRESENTATION_EXTENSIONS.contains(&ext) {
            Family::Presentation
        } else if SPREADSHEET_EXTENSIONS.contains(&ext) {
            Family::Spreadsheet
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Family::Video
        } else {
            Family::Unsupported
        }
    }

    /// Espacio de nombres propio de la familia.
    pub fn namespace(self) -> Option<Namespace> {
        match self {
            Family::Image => Some(Namespace::Exif),
            Family::Audio => Some(Namespace::Id3),
            Family::Pdf => Some(Namespace::Pdf),
            Family::Document => Some(Namespace::Docx),
            Family::Presentation => Some(Namespace::Pptx),
            Family::Spreadsheet => Some(Namespace::Xlsx),
            Family::Video => Some(Namespace::Video),
            Family::Unsupported => None,
        }
    }
}

/// Extensión en minúsculas, sin punto; vacía si no existe.
pub fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Clasifica un archivo sin realizar E/S.
pub fn classify(path: &Path) -> Family {
    Family::from_extension(&lowercase_extension(path))
}

/// Descriptor inmutable del archivo durante una operación.
#[derive(Clone, Debug)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub extension: String,
    pub family: Family,
}

impl FileDescriptor {
    pub fn new(path: &Path) -> Self {
        let extension = lowercase_extension(path);
        let family = Family::from_extension(&extension);
        Self {
            path: path.to_path_buf(),
            extension,
            family,
        }
    }

    /// Extensión con punto, tal como se muestra en los mensajes.
    pub fn dotted_extension(&self) -> String {
        if self.extension.is_empty() {
            String::new()
        } else {
            format!(".{}", self.extension)
        }
    }
}
