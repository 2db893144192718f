//! Limpieza y edición de EXIF en imágenes.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::exif::TagDirectory;
use crate::exif::container::{read_directory, write_jpeg_exif, write_tiff_exif};
use crate::family::lowercase_extension;
use crate::metadata::mapping::MetadataMapping;
use crate::metadata_editor::utils::StagedFile;

/// Calidad usada al recodificar JPEG sin metadata.
const JPEG_QUALITY: u8 = 95;

/// Extensiones cuyo contenedor admite escribir un bloque EXIF.
pub const EXIF_WRITABLE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "tif", "tiff"];

/// Elimina toda la metadata de una imagen conservando solo los píxeles.
///
/// La imagen se decodifica y se vuelve a codificar en su formato, por lo que
/// se pierden también perfiles ICC y fragmentos auxiliares.
pub fn remove_image_metadata(path: &Path) -> EngineResult<String> {
    let reader = ImageReader::open(path)
        .map_err(|e| EngineError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| EngineError::io(path, e))?;
    let format = reader
        .format()
        .ok_or_else(|| EngineError::Unsupported(format!(".{}", lowercase_extension(path))))?;
    let image = reader.decode()?;

    let staged = StagedFile::new(path)?;
    write_pixels_only(path, &image, format, staged.path())?;

    if !verify_image_metadata_clean(staged.path(), format)? {
        return Err(EngineError::Other(
            "La verificación indicó que la metadata no se eliminó correctamente".to_string(),
        ));
    }

    staged.commit()?;
    info!(path = %path.display(), "metadata de imagen eliminada");
    Ok("Metadata de imagen eliminada".to_string())
}

fn write_pixels_only(
    source: &Path,
    image: &DynamicImage,
    format: ImageFormat,
    target: &Path,
) -> EngineResult<()> {
    match format {
        ImageFormat::Jpeg => {
            let file = File::create(target).map_err(|e| EngineError::io(target, e))?;
            let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
            image.write_with_encoder(encoder)?;
            Ok(())
        }
        // El codificador TIFF propio no añade resolución ni otras etiquetas.
        ImageFormat::Tiff => write_tiff_exif(source, target, &TagDirectory::empty()),
        other => Ok(image.save_with_format(target, other)?),
    }
}

/// Comprueba que una imagen no conserva etiquetas EXIF registradas.
pub fn verify_image_metadata_clean(path: &Path, format: ImageFormat) -> EngineResult<bool> {
    Ok(read_directory(path, format)?
        .map(|directory| directory.to_mapping().is_empty())
        .unwrap_or(true))
}

/// Aplica las entradas `EXIF:*` del mapeo editado (solo JPEG y TIFF).
pub fn save_image_metadata(path: &Path, edited: &MetadataMapping) -> EngineResult<String> {
    let extension = lowercase_extension(path);
    if !EXIF_WRITABLE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(EngineError::Unsupported(format!(".{}", extension)));
    }
    let format = if matches!(extension.as_str(), "tif" | "tiff") {
        ImageFormat::Tiff
    } else {
        ImageFormat::Jpeg
    };

    let mut directory = match read_directory(path, format) {
        Ok(Some(directory)) => directory,
        Ok(None) => TagDirectory::empty(),
        Err(error) => {
            warn!(%error, "EXIF ilegible, se parte de un directorio vacío");
            TagDirectory::empty()
        }
    };

    let summary = directory.apply_mapping(edited);
    if !summary.ignored.is_empty() {
        info!(ignored = ?summary.ignored, "etiquetas EXIF sin registro ignoradas");
    }

    let staged = StagedFile::new(path)?;
    match format {
        ImageFormat::Tiff => write_tiff_exif(path, staged.path(), &directory)?,
        _ => write_jpeg_exif(path, staged.path(), &directory)?,
    }
    staged.commit()?;

    Ok(format!(
        "Metadata EXIF guardada ({} etiquetas actualizadas)",
        summary.updated
    ))
}
