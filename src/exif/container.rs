//! Incrustación del bloque EXIF en los contenedores que admiten escritura.

use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::directory::TagDirectory;
use super::writer::{self, RasterStrip};

/// Contenedores de los que se puede leer un bloque EXIF.
pub fn supports_exif(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Tiff | ImageFormat::Png | ImageFormat::WebP
    )
}

/// Directorio EXIF de una imagen ya identificada.
///
/// En TIFF el IFD `0th` describe también el raster; esas entradas no son
/// metadata editable y se descartan.
pub fn read_directory(path: &Path, format: ImageFormat) -> EngineResult<Option<TagDirectory>> {
    if !supports_exif(format) {
        return Ok(None);
    }
    let mut directory = TagDirectory::read_from_path(path)?;
    if format == ImageFormat::Tiff
        && let Some(directory) = directory.as_mut()
    {
        directory.drop_raster_layout();
    }
    Ok(directory)
}

pub fn read_jpeg(path: &Path) -> EngineResult<Jpeg> {
    let data = fs::read(path).map_err(|e| EngineError::io(path, e))?;
    Jpeg::from_bytes(Bytes::from(data))
        .map_err(|e| EngineError::Exif(format!("JPEG inválido: {}", e)))
}

/// Copia `source` en `target` sustituyendo su segmento APP1 EXIF.
///
/// Los segmentos de imagen no se tocan: los píxeles no se recodifican.
pub fn write_jpeg_exif(source: &Path, target: &Path, directory: &TagDirectory) -> EngineResult<()> {
    let mut jpeg = read_jpeg(source)?;
    let payload = if directory.is_empty() {
        None
    } else {
        Some(Bytes::from(writer::encode_exif(directory)))
    };
    jpeg.set_exif(payload);

    let encoded = jpeg.encoder().bytes();
    fs::write(target, &encoded).map_err(|e| EngineError::io(target, e))
}

/// Reescribe un TIFF sin comprimir con los píxeles de `source` y el directorio dado.
pub fn write_tiff_exif(source: &Path, target: &Path, directory: &TagDirectory) -> EngineResult<()> {
    let image = ImageReader::open(source)
        .map_err(|e| EngineError::io(source, e))?
        .with_guessed_format()
        .map_err(|e| EngineError::io(source, e))?
        .decode()?;

    // Las entradas de disposición editadas tampoco deben describir la tira nueva.
    let mut directory = directory.clone();
    directory.drop_raster_layout();

    let encoded = writer::encode_tiff(&directory, &raster_from(image));
    fs::write(target, &encoded).map_err(|e| EngineError::io(target, e))
}

fn raster_from(image: DynamicImage) -> RasterStrip {
    let (width, height) = (image.width(), image.height());

    let (bits, samples, alpha, data) = match image.color() {
        ColorType::L8 => (8, 1, false, image.into_luma8().into_raw()),
        ColorType::La8 => (8, 2, true, image.into_luma_alpha8().into_raw()),
        ColorType::Rgb8 => (8, 3, false, image.into_rgb8().into_raw()),
        ColorType::L16 => (16, 1, false, be_words(image.into_luma16().into_raw())),
        ColorType::La16 => (16, 2, true, be_words(image.into_luma_alpha16().into_raw())),
        ColorType::Rgb16 => (16, 3, false, be_words(image.into_rgb16().into_raw())),
        ColorType::Rgba16 => (16, 4, true, be_words(image.into_rgba16().into_raw())),
        ColorType::Rgba8 => (8, 4, true, image.into_rgba8().into_raw()),
        _ if image.color().has_alpha() => (8, 4, true, image.into_rgba8().into_raw()),
        _ => (8, 3, false, image.into_rgb8().into_raw()),
    };

    RasterStrip {
        width,
        height,
        bits_per_sample: bits,
        samples_per_pixel: samples,
        has_alpha: alpha,
        data,
    }
}

fn be_words(words: Vec<u16>) -> Vec<u8> {
    words.into_iter().flat_map(u16::to_be_bytes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::{ExifValue, Ifd};
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn jpeg_exif_is_replaced_without_touching_pixels() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let source = dir.path().join("foto.jpg");
        let target = dir.path().join("foto_exif.jpg");
        RgbImage::from_pixel(8, 8, Rgb([200, 10, 10])).save(&source)?;

        let mut directory = TagDirectory::empty();
        directory.set(Ifd::Zeroth, 274, ExifValue::Short(vec![6]));
        write_jpeg_exif(&source, &target, &directory)?;

        let read_back = TagDirectory::read_from_path(&target)?.expect("EXIF presente");
        assert_eq!(read_back.get(Ifd::Zeroth, 274), Some(&ExifValue::Short(vec![6])));

        let original = image::open(&source)?.into_rgb8();
        let rewritten = image::open(&target)?.into_rgb8();
        assert_eq!(original.as_raw(), rewritten.as_raw());
        Ok(())
    }

    #[test]
    fn tiff_rewrite_keeps_pixels_and_tags() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let source = dir.path().join("escaneo.tiff");
        let target = dir.path().join("escaneo_exif.tiff");
        let pixels = RgbImage::from_fn(5, 3, |x, y| Rgb([x as u8 * 40, y as u8 * 60, 7]));
        pixels.save(&source)?;

        let mut directory = TagDirectory::empty();
        directory.set(Ifd::Zeroth, 305, ExifValue::Ascii(b"metastrip".to_vec()));
        directory.set(Ifd::Exif, 36867, ExifValue::Ascii(b"2024:01:01 10:00:00".to_vec()));
        write_tiff_exif(&source, &target, &directory)?;

        let decoded = image::open(&target)?.into_rgb8();
        assert_eq!(decoded.as_raw(), pixels.as_raw());

        let read_back = TagDirectory::read_from_path(&target)?.expect("EXIF presente");
        assert_eq!(
            read_back.get(Ifd::Zeroth, 305),
            Some(&ExifValue::Ascii(b"metastrip".to_vec()))
        );
        assert_eq!(
            read_back.get(Ifd::Exif, 36867),
            Some(&ExifValue::Ascii(b"2024:01:01 10:00:00".to_vec()))
        );
        Ok(())
    }

    #[test]
    fn tiff_layout_tags_are_not_metadata() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let source = dir.path().join("plano.tif");
        let target = dir.path().join("limpio.tif");
        RgbImage::from_pixel(4, 4, Rgb([9, 9, 9])).save(&source)?;
        write_tiff_exif(&source, &target, &TagDirectory::empty())?;

        let directory = read_directory(&target, ImageFormat::Tiff)?.ok_or("sin directorio")?;
        assert!(directory.to_mapping().is_empty());
        Ok(())
    }
}
