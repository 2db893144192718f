//! Modelo de metadata compartido, sondeo genérico del archivo y exportación.

pub mod export;
mod hashing;
pub mod mapping;
mod mime;
pub mod probe;

pub use mapping::{ERROR_KEY, MetadataMapping, Namespace, UNSUPPORTED_KEY};
pub use probe::{ExtractOptions, probe_file};
