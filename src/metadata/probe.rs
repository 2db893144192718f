//! Atributos del sistema de archivos comunes a todas las familias (espacio `FILE`).

use image::{ImageFormat, ImageReader};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

use crate::formatting::{format_optional_time, format_size};
use crate::metadata::hashing::fingerprint;
use crate::metadata::mapping::{MetadataMapping, Namespace};
use crate::metadata::mime::sniff_mime;

pub const LABEL_NAME: &str = "Nombre";
pub const LABEL_PATH: &str = "Ruta completa";
pub const LABEL_SIZE: &str = "Tamaño";
pub const LABEL_SIZE_BYTES: &str = "Tamaño (bytes)";
pub const LABEL_MODIFIED: &str = "Fecha de modificación";
pub const LABEL_ACCESSED: &str = "Fecha de acceso";
pub const LABEL_CHANGED: &str = "Fecha de cambio";
pub const LABEL_DETECTED_TYPE: &str = "Tipo detectado";
pub const LABEL_MIME: &str = "MIME";
pub const LABEL_EXTENSION_MATCH: &str = "Extensión coherente";
pub const LABEL_ERROR: &str = "Error";

const UNKNOWN: &str = "Unknown";

/// Opciones explícitas de la extracción.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractOptions {
    pub include_hash: bool,
}

/// Lee los atributos genéricos del archivo.
///
/// Nunca falla: si `stat` no es posible devuelve una única entrada `FILE:Error`.
pub fn probe_file(path: &Path, options: ExtractOptions) -> MetadataMapping {
    let mut mapping = MetadataMapping::new();

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            debug!(path = %path.display(), %error, "stat falló");
            mapping.push(Namespace::File, LABEL_ERROR, error.to_string());
            return mapping;
        }
    };

    let name = path
        .file_name()
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_default();
    mapping.push(Namespace::File, LABEL_NAME, name);

    let absolute = fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string());
    mapping.push(Namespace::File, LABEL_PATH, absolute);

    mapping.push(Namespace::File, LABEL_SIZE, format_size(metadata.len()));
    mapping.push(Namespace::File, LABEL_SIZE_BYTES, metadata.len().to_string());
    mapping.push(
        Namespace::File,
        LABEL_MODIFIED,
        format_optional_time(metadata.modified().ok()),
    );
    mapping.push(
        Namespace::File,
        LABEL_ACCESSED,
        format_optional_time(metadata.accessed().ok()),
    );
    mapping.push(
        Namespace::File,
        LABEL_CHANGED,
        format_optional_time(changed_time(&metadata)),
    );
    mapping.push(Namespace::File, LABEL_DETECTED_TYPE, detect_file_type(path));

    if let Some(guess) = sniff_mime(path) {
        mapping.push(Namespace::File, LABEL_MIME, guess.mime);
        let coherent = if guess.matches_extension { "Sí" } else { "No" };
        mapping.push(Namespace::File, LABEL_EXTENSION_MATCH, coherent);
    }

    if options.include_hash {
        let (md5, sha256) = fingerprint(path, &metadata).into_pair();
        mapping.push(Namespace::File, "MD5", md5);
        mapping.push(Namespace::File, "SHA-256", sha256);
    }

    mapping
}

#[cfg(unix)]
fn changed_time(metadata: &fs::Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let secs = u64::try_from(metadata.ctime()).ok()?;
    let nanos = u32::try_from(metadata.ctime_nsec()).unwrap_or(0);
    Some(UNIX_EPOCH + Duration::new(secs, nanos))
}

#[cfg(not(unix))]
fn changed_time(metadata: &fs::Metadata) -> Option<SystemTime> {
    metadata.created().ok()
}

/// Tipo detectado abriendo el archivo como imagen: `"<FORMATO> (<mime>)"` o `Unknown`.
pub fn detect_file_type(path: &Path) -> String {
    match detect_image_format(path) {
        Some(format) => format!("{} ({})", format_name(format), format_mime(format)),
        None => UNKNOWN.to_string(),
    }
}

/// Formato de imagen cuya cabecera se pudo decodificar.
pub(crate) fn detect_image_format(path: &Path) -> Option<ImageFormat> {
    let reader = ImageReader::open(path).ok()?.with_guessed_format().ok()?;
    let format = reader.format()?;
    reader.into_dimensions().ok()?;
    Some(format)
}

pub(crate) fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Ico => "ICO".to_string(),
        other => format!("{other:?}").to_uppercase(),
    }
}

fn format_mime(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "image/jpeg".to_string(),
        ImageFormat::Png => "image/png".to_string(),
        ImageFormat::Gif => "image/gif".to_string(),
        ImageFormat::Tiff => "image/tiff".to_string(),
        ImageFormat::Ico => "image/x-icon".to_string(),
        other => format!("image/{}", format_name(other).to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn probe_reports_generic_fields() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("notas.txt");
        fs::write(&path, vec![b'x'; 2048])?;

        let mapping = probe_file(&path, ExtractOptions::default());

        assert_eq!(mapping.get("FILE:Nombre"), Some("notas.txt"));
        assert_eq!(mapping.get("FILE:Tamaño"), Some("2.00 KB"));
        assert_eq!(mapping.get("FILE:Tamaño (bytes)"), Some("2048"));
        assert_eq!(mapping.get("FILE:Tipo detectado"), Some("Unknown"));
        assert!(mapping.get("FILE:MD5").is_none());

        let modified = mapping.get("FILE:Fecha de modificación").unwrap_or_default();
        assert_eq!(modified.len(), "2024:01:01 00:00:00".len());
        assert_eq!(&modified[4..5], ":");
        Ok(())
    }

    #[test]
    fn probe_detects_png_images() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("pixel.png");
        image::RgbImage::new(3, 2).save(&path)?;

        let mapping = probe_file(&path, ExtractOptions { include_hash: true });
        assert_eq!(mapping.get("FILE:Tipo detectado"), Some("PNG (image/png)"));
        assert_eq!(mapping.get("FILE:MIME"), Some("image/png"));
        assert_eq!(mapping.get("FILE:Extensión coherente"), Some("Sí"));
        assert!(mapping.get("FILE:SHA-256").is_some());
        Ok(())
    }

    #[test]
    fn probe_failure_yields_single_error_entry() {
        let mapping = probe_file(Path::new("/no/existe/archivo.jpg"), ExtractOptions::default());
        assert_eq!(mapping.len(), 1);
        assert!(mapping.get("FILE:Error").is_some());
    }
}
