//! Errores internos del motor de metadata.
//!
//! Ningún error cruza los puntos de entrada públicos: `extract`, `remove` y
//! `save` los convierten en entradas centinela o en un [`Outcome`](crate::Outcome)
//! fallido.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No se pudo acceder a `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No se pudo decodificar la imagen: {0}")]
    Image(#[from] image::ImageError),

    #[error("Metadata EXIF inválida: {0}")]
    Exif(String),

    #[error("No es un documento Office válido: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Error leyendo XML de metadata: {0}")]
    Xml(String),

    #[error("No se pudo procesar el PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("No se pudo procesar el audio: {0}")]
    Audio(#[from] lofty::error::LoftyError),

    #[error("Video no legible: {0}")]
    Video(String),

    #[error("Formato {0} no soportado para esta operación")]
    Unsupported(String),

    #[error("No se pudo reemplazar el archivo original: {0}")]
    Staging(String),

    #[error("{0}")]
    Other(String),
}

impl EngineError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<exif::Error> for EngineError {
    fn from(error: exif::Error) -> Self {
        Self::Exif(error.to_string())
    }
}

impl From<xmltree::ParseError> for EngineError {
    fn from(error: xmltree::ParseError) -> Self {
        Self::Xml(error.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
