//! Los contenedores de video no admiten limpieza ni edición.

use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::family::lowercase_extension;

pub const VIDEO_REMOVAL_UNSUPPORTED: &str =
    "La eliminación de metadata no está disponible para archivos de video";

pub fn remove_video_metadata(_path: &Path) -> EngineResult<String> {
    Err(EngineError::Other(VIDEO_REMOVAL_UNSUPPORTED.to_string()))
}

pub fn save_video_metadata(path: &Path) -> EngineResult<String> {
    Err(EngineError::Unsupported(format!(".{}", lowercase_extension(path))))
}
