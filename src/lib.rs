//! MetaStrip: inspección, limpieza y edición de metadata en imágenes, audio,
//! PDF, documentos Office y video.
//!
//! Toda la funcionalidad se expone mediante tres puntos de entrada que nunca
//! devuelven errores: [`extract`], [`remove`] y [`save`].

pub mod advanced_metadata;
pub mod config;
pub mod engine;
pub mod error;
pub mod exif;
pub mod family;
pub mod formatting;
pub mod metadata;
pub mod metadata_editor;

pub use engine::{FamilyHandler, Outcome, extract, extract_with, handler_for, remove, save};
pub use error::{EngineError, EngineResult};
pub use family::{Family, FileDescriptor, classify};
pub use metadata::mapping::{MetadataMapping, Namespace};
pub use metadata::probe::ExtractOptions;
