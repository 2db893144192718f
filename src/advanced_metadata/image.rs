//! Metadata de imágenes: datos visuales (`FILE`) y etiquetas EXIF.

use image::{ColorType, ImageDecoder, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::exif::TagDirectory;
use crate::exif::container::{read_directory, read_jpeg};
use crate::exif::registry::Ifd;
use crate::formatting::format_megapixels;
use crate::metadata::mapping::{MetadataMapping, Namespace};
use crate::metadata::probe::{LABEL_ERROR, format_name};

pub const NO_EXIF: &str = "Sin metadata EXIF";

pub const LABEL_DIMENSIONS: &str = "Dimensiones";
pub const LABEL_MEGAPIXELS: &str = "Megapíxeles";
pub const LABEL_FORMAT: &str = "Formato de imagen";
pub const LABEL_COLOR_MODE: &str = "Modo de color";
pub const LABEL_DPI: &str = "DPI";

const INCHES_PER_METER: f64 = 0.0254;
const CM_PER_INCH: f64 = 2.54;

/// Datos visuales seguidos de las entradas `EXIF:*` (o el centinela).
pub fn extract_image_metadata(path: &Path) -> EngineResult<MetadataMapping> {
    let mut mapping = MetadataMapping::new();

    let format = match image_facts(path, &mut mapping) {
        Ok(format) => Some(format),
        Err(error) => {
            debug!(path = %path.display(), %error, "no se pudieron leer los datos visuales");
            mapping.push(Namespace::File, LABEL_ERROR, error.to_string());
            None
        }
    };

    let mut exif_error = None;
    let directory = match format.map(|format| read_directory(path, format)) {
        Some(Ok(directory)) => directory,
        Some(Err(error)) => {
            warn!(path = %path.display(), %error, "bloque EXIF ilegible");
            exif_error = Some(error.to_string());
            None
        }
        None => None,
    };

    if let Some(dpi) = format.and_then(|format| resolve_dpi(path, format, directory.as_ref())) {
        mapping.push(Namespace::File, LABEL_DPI, dpi);
    }

    let exif_entries = directory
        .map(|directory| directory.to_mapping())
        .unwrap_or_default();
    if let Some(error) = exif_error {
        mapping.push(Namespace::Exif, LABEL_ERROR, error);
    } else if exif_entries.is_empty() {
        mapping.merge(MetadataMapping::sentinel(Namespace::Exif, NO_EXIF));
    } else {
        mapping.merge(exif_entries);
    }

    Ok(mapping)
}

fn image_facts(path: &Path, mapping: &mut MetadataMapping) -> EngineResult<ImageFormat> {
    let reader = ImageReader::open(path)
        .map_err(|e| EngineError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| EngineError::io(path, e))?;
    let format = reader
        .format()
        .ok_or_else(|| EngineError::Other("Formato de imagen desconocido".to_string()))?;
    let decoder = reader.into_decoder()?;
    let (width, height) = decoder.dimensions();

    mapping.push(Namespace::File, LABEL_DIMENSIONS, format!("{width}x{height}"));
    mapping.push(Namespace::File, LABEL_MEGAPIXELS, format_megapixels(width, height));
    mapping.push(Namespace::File, LABEL_FORMAT, format_name(format));
    mapping.push(Namespace::File, LABEL_COLOR_MODE, color_mode(decoder.color_type()));
    Ok(format)
}

/// Nombre corto convencional del modo de color.
pub fn color_mode(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "I;16".to_string(),
        ColorType::La16 => "LA;16".to_string(),
        ColorType::Rgb16 => "RGB;16".to_string(),
        ColorType::Rgba16 => "RGBA;16".to_string(),
        ColorType::Rgb32F => "RGB;F".to_string(),
        ColorType::Rgba32F => "RGBA;F".to_string(),
        other => format!("{other:?}"),
    }
}

fn resolve_dpi(path: &Path, format: ImageFormat, directory: Option<&TagDirectory>) -> Option<String> {
    let density = match format {
        ImageFormat::Jpeg => jfif_density(path),
        ImageFormat::Png => png_density(path),
        _ => None,
    }
    .or_else(|| directory.and_then(exif_density))?;

    Some(format!("{}x{}", density.0.round(), density.1.round()))
}

/// Densidad del segmento APP0 JFIF (unidad 1 = ppp, 2 = ppcm).
fn jfif_density(path: &Path) -> Option<(f64, f64)> {
    let jpeg = read_jpeg(path).ok()?;
    let segment = jpeg
        .segments()
        .iter()
        .find(|segment| segment.marker() == 0xE0 && segment.contents().starts_with(b"JFIF\0"))?;
    let contents = segment.contents();
    let unit = *contents.get(7)?;
    let x = f64::from(u16::from_be_bytes([*contents.get(8)?, *contents.get(9)?]));
    let y = f64::from(u16::from_be_bytes([*contents.get(10)?, *contents.get(11)?]));

    match unit {
        1 => Some((x, y)),
        2 => Some((x * CM_PER_INCH, y * CM_PER_INCH)),
        _ => None,
    }
}

/// Densidad del fragmento `pHYs` cuando la unidad es el metro.
fn png_density(path: &Path) -> Option<(f64, f64)> {
    let decoder = png::Decoder::new(BufReader::new(File::open(path).ok()?));
    let reader = decoder.read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    match dims.unit {
        png::Unit::Meter => Some((
            f64::from(dims.xppu) * INCHES_PER_METER,
            f64::from(dims.yppu) * INCHES_PER_METER,
        )),
        png::Unit::Unspecified => None,
    }
}

/// `XResolution`/`YResolution` con `ResolutionUnit` (2 = pulgada, 3 = cm).
fn exif_density(directory: &TagDirectory) -> Option<(f64, f64)> {
    let x = directory.get(Ifd::Zeroth, 282)?.first_f64()?;
    let y = directory
        .get(Ifd::Zeroth, 283)
        .and_then(|value| value.first_f64())
        .unwrap_or(x);
    let unit = directory
        .get(Ifd::Zeroth, 296)
        .and_then(|value| value.first_uint())
        .unwrap_or(2);
    match unit {
        3 => Some((x * CM_PER_INCH, y * CM_PER_INCH)),
        1 => None,
        _ => Some((x, y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::container::write_jpeg_exif;
    use crate::exif::{ExifValue, Ifd};
    use image::{GrayImage, Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn image_without_exif_reports_facts_and_sentinel() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("gris.png");
        GrayImage::new(4, 2).save(&path)?;

        let mapping = extract_image_metadata(&path)?;
        assert_eq!(mapping.get("FILE:Dimensiones"), Some("4x2"));
        assert_eq!(mapping.get("FILE:Megapíxeles"), Some("0.0"));
        assert_eq!(mapping.get("FILE:Formato de imagen"), Some("PNG"));
        assert_eq!(mapping.get("FILE:Modo de color"), Some("L"));
        assert_eq!(mapping.get("EXIF"), Some(NO_EXIF));
        assert!(!mapping.has_namespace(Namespace::Exif));
        Ok(())
    }

    #[test]
    fn jpeg_exif_entries_are_listed() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let plain = dir.path().join("plano.jpg");
        let tagged = dir.path().join("foto.jpg");
        RgbImage::from_pixel(6, 4, Rgb([1, 2, 3])).save(&plain)?;

        let mut directory = TagDirectory::empty();
        directory.set(Ifd::Zeroth, 271, ExifValue::Ascii(b"Canon".to_vec()));
        directory.set(Ifd::Exif, 33437, ExifValue::Rational(vec![(28, 10)]));
        write_jpeg_exif(&plain, &tagged, &directory)?;

        let mapping = extract_image_metadata(&tagged)?;
        assert_eq!(mapping.get("FILE:Modo de color"), Some("RGB"));
        assert_eq!(mapping.get("EXIF:Make"), Some("Canon"));
        assert_eq!(mapping.get("EXIF:FNumber"), Some("2.8"));
        assert!(mapping.get("EXIF").is_none());
        Ok(())
    }

    #[test]
    fn exif_resolution_converts_centimetres() {
        let mut directory = TagDirectory::empty();
        directory.set(Ifd::Zeroth, 282, ExifValue::Rational(vec![(100, 1)]));
        directory.set(Ifd::Zeroth, 296, ExifValue::Short(vec![3]));
        let (x, y) = exif_density(&directory).expect("densidad presente");
        assert!((x - 254.0).abs() < 1e-9);
        assert!((y - 254.0).abs() < 1e-9);
    }

    #[test]
    fn undecodable_images_report_a_file_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("falsa.jpg");
        std::fs::write(&path, b"no soy una imagen")?;

        let mapping = extract_image_metadata(&path)?;
        assert!(mapping.get("FILE:Error").is_some());
        assert_eq!(mapping.get("EXIF"), Some(NO_EXIF));
        Ok(())
    }

    #[test]
    fn corrupt_exif_keeps_the_image_facts() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let plain = dir.path().join("plano.jpg");
        RgbImage::from_pixel(5, 3, Rgb([40, 80, 120])).save(&plain)?;
        let data = std::fs::read(&plain)?;

        // APP1 cuyo IFD anuncia cinco entradas y se corta tras el contador.
        let payload: &[u8] = b"Exif\0\0MM\0*\0\0\0\x08\0\x05";
        let mut corrupt = data[..2].to_vec();
        corrupt.extend_from_slice(&[0xFF, 0xE1]);
        corrupt.extend_from_slice(&(payload.len() as u16 + 2).to_be_bytes());
        corrupt.extend_from_slice(payload);
        corrupt.extend_from_slice(&data[2..]);
        let path = dir.path().join("truncado.jpg");
        std::fs::write(&path, corrupt)?;

        let mapping = extract_image_metadata(&path)?;
        assert_eq!(mapping.get("FILE:Dimensiones"), Some("5x3"));
        assert_eq!(mapping.get("FILE:Modo de color"), Some("RGB"));
        assert!(mapping.get("EXIF:Error").is_some());
        assert!(mapping.get("EXIF").is_none());
        Ok(())
    }
}
