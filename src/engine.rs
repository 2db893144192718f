//! Despacho por familia de los tres puntos de entrada: `extract`, `remove` y `save`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::advanced_metadata::{
    OfficeKind, extract_audio_metadata, extract_image_metadata, extract_office_metadata,
    extract_pdf_metadata, extract_video_metadata,
};
use crate::error::EngineResult;
use crate::family::{Family, FileDescriptor};
use crate::metadata::mapping::{MetadataMapping, UNSUPPORTED_KEY};
use crate::metadata::probe::{ExtractOptions, probe_file};
use crate::metadata_editor::{
    remove_audio_metadata, remove_image_metadata, remove_office_metadata, remove_pdf_metadata,
    remove_video_metadata, save_audio_metadata, save_image_metadata, save_office_metadata,
    save_pdf_metadata, save_video_metadata,
};

pub const UNSUPPORTED_FILE_TYPE: &str = "Tipo de archivo no soportado";

/// Resultado de una operación destructiva.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<Outcome> for (bool, String) {
    fn from(outcome: Outcome) -> Self {
        (outcome.success, outcome.message)
    }
}

impl<E: std::fmt::Display> From<Result<String, E>> for Outcome {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(message) => Outcome::success(message),
            Err(error) => Outcome::failure(error.to_string()),
        }
    }
}

/// Estrategias de lectura, limpieza y escritura de una familia.
pub trait FamilyHandler: Sync {
    fn extract(&self, path: &Path) -> EngineResult<MetadataMapping>;
    fn remove(&self, path: &Path) -> EngineResult<String>;
    fn save(&self, path: &Path, edited: &MetadataMapping) -> EngineResult<String>;
}

struct ImageHandler;
struct AudioHandler;
struct PdfHandler;
struct OfficeHandler(OfficeKind);
struct VideoHandler;

impl FamilyHandler for ImageHandler {
    fn extract(&self, path: &Path) -> EngineResult<MetadataMapping> {
        extract_image_metadata(path)
    }

    fn remove(&self, path: &Path) -> EngineResult<String> {
        remove_image_metadata(path)
    }

    fn save(&self, path: &Path, edited: &MetadataMapping) -> EngineResult<String> {
        save_image_metadata(path, edited)
    }
}

impl FamilyHandler for AudioHandler {
    fn extract(&self, path: &Path) -> EngineResult<MetadataMapping> {
        Ok(extract_audio_metadata(path))
    }

    fn remove(&self, path: &Path) -> EngineResult<String> {
        remove_audio_metadata(path)
    }

    fn save(&self, path: &Path, edited: &MetadataMapping) -> EngineResult<String> {
        save_audio_metadata(path, edited)
    }
}

impl FamilyHandler for PdfHandler {
    fn extract(&self, path: &Path) -> EngineResult<MetadataMapping> {
        extract_pdf_metadata(path)
    }

    fn remove(&self, path: &Path) -> EngineResult<String> {
        remove_pdf_metadata(path)
    }

    fn save(&self, path: &Path, edited: &MetadataMapping) -> EngineResult<String> {
        save_pdf_metadata(path, edited)
    }
}

impl FamilyHandler for OfficeHandler {
    fn extract(&self, path: &Path) -> EngineResult<MetadataMapping> {
        extract_office_metadata(path, self.0)
    }

    fn remove(&self, path: &Path) -> EngineResult<String> {
        remove_office_metadata(path)
    }

    fn save(&self, path: &Path, edited: &MetadataMapping) -> EngineResult<String> {
        save_office_metadata(path, self.0, edited)
    }
}

impl FamilyHandler for VideoHandler {
    fn extract(&self, path: &Path) -> EngineResult<MetadataMapping> {
        Ok(extract_video_metadata(path))
    }

    fn remove(&self, path: &Path) -> EngineResult<String> {
        remove_video_metadata(path)
    }

    fn save(&self, path: &Path, _edited: &MetadataMapping) -> EngineResult<String> {
        save_video_metadata(path)
    }
}

static IMAGE: ImageHandler = ImageHandler;
static AUDIO: AudioHandler = AudioHandler;
static PDF: PdfHandler = PdfHandler;
static DOCUMENT: OfficeHandler = OfficeHandler(OfficeKind::Document);
static PRESENTATION: OfficeHandler = OfficeHandler(OfficeKind::Presentation);
static SPREADSHEET: OfficeHandler = OfficeHandler(OfficeKind::Spreadsheet);
static VIDEO: VideoHandler = VideoHandler;

/// Manejador de una familia; `None` para `Unsupported`.
pub fn handler_for(family: Family) -> Option<&'static dyn FamilyHandler> {
    match family {
        Family::Image => Some(&IMAGE),
        Family::Audio => Some(&AUDIO),
        Family::Pdf => Some(&PDF),
        Family::Document => Some(&DOCUMENT),
        Family::Presentation => Some(&PRESENTATION),
        Family::Spreadsheet => Some(&SPREADSHEET),
        Family::Video => Some(&VIDEO),
        Family::Unsupported => None,
    }
}

/// Metadata del archivo: datos `FILE` seguidos de los de su familia.
pub fn extract(path: &Path) -> MetadataMapping {
    extract_with(path, ExtractOptions::default())
}

pub fn extract_with(path: &Path, options: ExtractOptions) -> MetadataMapping {
    let descriptor = FileDescriptor::new(path);
    debug!(path = %path.display(), family = ?descriptor.family, "archivo clasificado");

    let mut mapping = probe_file(path, options);
    let Some(handler) = handler_for(descriptor.family) else {
        mapping.insert(UNSUPPORTED_KEY, descriptor.dotted_extension());
        return mapping;
    };

    match handler.extract(path) {
        Ok(specific) => mapping.merge(specific),
        Err(error) => {
            warn!(path = %path.display(), %error, "extracción fallida");
            mapping.merge(MetadataMapping::error(error.to_string()));
        }
    }
    mapping
}

/// Elimina la metadata propia de la familia del archivo.
pub fn remove(path: &Path) -> Outcome {
    let descriptor = FileDescriptor::new(path);
    let Some(handler) = handler_for(descriptor.family) else {
        return unsupported(&descriptor);
    };

    let outcome = Outcome::from(handler.remove(path));
    info!(path = %path.display(), success = outcome.success, "limpieza terminada");
    outcome
}

/// Escribe en el archivo las entradas editadas de su espacio de nombres.
///
/// Las entradas `FILE` y las de otras familias se ignoran.
pub fn save(path: &Path, edited: &MetadataMapping) -> Outcome {
    let descriptor = FileDescriptor::new(path);
    let Some(handler) = handler_for(descriptor.family) else {
        return unsupported(&descriptor);
    };

    let outcome = Outcome::from(handler.save(path, edited));
    info!(path = %path.display(), success = outcome.success, "guardado terminado");
    outcome
}

fn unsupported(descriptor: &FileDescriptor) -> Outcome {
    Outcome::failure(format!(
        "{}: {}",
        UNSUPPORTED_FILE_TYPE,
        descriptor.dotted_extension()
    ))
}
