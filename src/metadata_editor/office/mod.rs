//! Limpieza y edición de propiedades en documentos Office basados en ZIP.

pub(crate) mod archive;
mod clean;
mod edit;
mod sanitize;
mod verify;
pub(crate) mod xml;

pub use clean::remove_office_metadata;
pub use edit::save_office_metadata;
pub use verify::verify_office_metadata_clean;
