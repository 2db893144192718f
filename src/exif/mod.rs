//! Modelo EXIF propio: registro de etiquetas, valores tipados, directorio por
//! IFD y serialización TIFF para volver a incrustarlo.
//!
//! La lectura se apoya en `kamadak-exif`; la escritura es propia porque esa
//! biblioteca solo lee.

pub mod container;
pub mod directory;
pub mod registry;
pub mod value;
pub mod writer;

pub use directory::{ApplySummary, TagDirectory};
pub use registry::{Ifd, TagInfo, TypeCode};
pub use value::ExifValue;
