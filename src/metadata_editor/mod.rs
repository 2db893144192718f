//! Funciones para eliminar o editar la metadata de cada familia de archivos.
//!
//! Toda escritura pasa por un temporal en el mismo directorio que se
//! renombra sobre el original solo si la operación termina bien.

pub mod audio;
pub mod constants;
pub mod image;
pub mod office;
pub mod pdf;
pub(crate) mod utils;
pub mod video;

pub use audio::{remove_audio_metadata, save_audio_metadata};
pub use image::{remove_image_metadata, save_image_metadata};
pub use office::{remove_office_metadata, save_office_metadata};
pub use pdf::{remove_pdf_metadata, save_pdf_metadata};
pub use video::{VIDEO_REMOVAL_UNSUPPORTED, remove_video_metadata, save_video_metadata};
