//! Extractores por familia: cada uno aplana el modelo nativo del contenedor
//! en entradas con espacio de nombres.

pub mod audio;
pub mod image;
pub mod office;
pub mod pdf;
pub mod video;

pub use audio::extract_audio_metadata;
pub use image::extract_image_metadata;
pub use office::{OfficeKind, extract_office_metadata};
pub use pdf::extract_pdf_metadata;
pub use video::extract_video_metadata;
