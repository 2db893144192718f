//! Ciclos completos extraer/limpiar/guardar sobre imágenes JPEG y TIFF.

use image::{ImageFormat, Rgb, RgbImage};
use metastrip::advanced_metadata::image::NO_EXIF;
use metastrip::exif::container::{read_directory, write_jpeg_exif};
use metastrip::exif::{ExifValue, Ifd, TagDirectory};
use metastrip::{MetadataMapping, Namespace, extract, remove, save};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// JPEG con Make, Orientation, FNumber y una referencia GPS.
fn jpeg_with_exif(dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let plain = dir.join("plano.jpg");
    let path = dir.join("vacaciones.jpg");
    RgbImage::from_fn(24, 16, |x, y| Rgb([x as u8 * 10, y as u8 * 10, 90])).save(&plain)?;

    let mut directory = TagDirectory::empty();
    directory.set(Ifd::Zeroth, 271, ExifValue::Ascii(b"Fujifilm".to_vec()));
    directory.set(Ifd::Zeroth, 274, ExifValue::Short(vec![1]));
    directory.set(Ifd::Exif, 33437, ExifValue::Rational(vec![(56, 10)]));
    directory.set(Ifd::Gps, 1, ExifValue::Ascii(b"S".to_vec()));
    write_jpeg_exif(&plain, &path, &directory)?;
    std::fs::remove_file(&plain)?;
    Ok(path)
}

#[test]
fn extract_lists_exif_and_image_facts() -> TestResult {
    let dir = TempDir::new()?;
    let path = jpeg_with_exif(dir.path())?;

    let mapping = extract(&path);
    assert_eq!(mapping.get("FILE:Nombre"), Some("vacaciones.jpg"));
    assert_eq!(mapping.get("FILE:Dimensiones"), Some("24x16"));
    assert_eq!(mapping.get("EXIF:Make"), Some("Fujifilm"));
    assert_eq!(mapping.get("EXIF:FNumber"), Some("5.6"));
    assert_eq!(mapping.get("EXIF:GPSLatitudeRef"), Some("S"));
    Ok(())
}

#[test]
fn remove_then_extract_shows_only_the_sentinel() -> TestResult {
    let dir = TempDir::new()?;
    let path = jpeg_with_exif(dir.path())?;

    let outcome = remove(&path);
    assert!(outcome.success, "{}", outcome.message);

    let mapping = extract(&path);
    assert_eq!(mapping.get("EXIF"), Some(NO_EXIF));
    assert!(!mapping.has_namespace(Namespace::Exif));
    Ok(())
}

#[test]
fn remove_is_idempotent() -> TestResult {
    let dir = TempDir::new()?;
    let path = jpeg_with_exif(dir.path())?;

    assert!(remove(&path).success);
    assert!(remove(&path).success);
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
    Ok(())
}

#[test]
fn orientation_edit_decodes_back_to_integer() -> TestResult {
    let dir = TempDir::new()?;
    let path = jpeg_with_exif(dir.path())?;

    let mut edited = extract(&path);
    edited.insert("EXIF:Orientation", "3");
    let outcome = save(&path, &edited);
    assert!(outcome.success, "{}", outcome.message);

    assert_eq!(extract(&path).get("EXIF:Orientation"), Some("3"));
    let directory = read_directory(&path, ImageFormat::Jpeg)?.ok_or("sin EXIF")?;
    assert_eq!(directory.get(Ifd::Zeroth, 274), Some(&ExifValue::Short(vec![3])));
    Ok(())
}

#[test]
fn resolution_is_stored_with_three_decimals() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("sin_exif.jpg");
    RgbImage::new(4, 4).save(&path)?;

    let mut edited = MetadataMapping::new();
    edited.insert("EXIF:XResolution", "72.0");
    edited.insert("EXIF:ExposureBiasValue", "-0.3333");
    assert!(save(&path, &edited).success);

    let directory = read_directory(&path, ImageFormat::Jpeg)?.ok_or("sin EXIF")?;
    assert_eq!(
        directory.get(Ifd::Zeroth, 282),
        Some(&ExifValue::Rational(vec![(72000, 1000)]))
    );
    assert_eq!(
        directory.get(Ifd::Exif, 37380),
        Some(&ExifValue::SRational(vec![(-333, 1000)]))
    );
    assert_eq!(extract(&path).get("EXIF:XResolution"), Some("72"));
    Ok(())
}

#[test]
fn unknown_tags_are_ignored_and_save_succeeds() -> TestResult {
    let dir = TempDir::new()?;
    let path = jpeg_with_exif(dir.path())?;

    let mut edited = MetadataMapping::new();
    edited.insert("EXIF:EtiquetaInventada", "42");
    let outcome = save(&path, &edited);
    assert!(outcome.success, "{}", outcome.message);

    let mapping = extract(&path);
    assert!(mapping.get("EXIF:EtiquetaInventada").is_none());
    assert_eq!(mapping.get("EXIF:Make"), Some("Fujifilm"));
    Ok(())
}

#[test]
fn file_entries_survive_a_save_round_trip() -> TestResult {
    let dir = TempDir::new()?;
    let path = jpeg_with_exif(dir.path())?;

    let before = extract(&path);
    let mut edited = before.clone();
    edited.insert("EXIF:Make", "Leica");
    edited.insert("FILE:Nombre", "otro_nombre.jpg");
    assert!(save(&path, &edited).success);

    let after = extract(&path);
    let keys = |mapping: &MetadataMapping| -> Vec<String> {
        mapping
            .namespace_entries(Namespace::File)
            .map(|(label, _)| label.to_string())
            .collect()
    };
    assert_eq!(keys(&before), keys(&after));
    assert_eq!(after.get("FILE:Nombre"), before.get("FILE:Nombre"));
    assert_eq!(after.get("FILE:Ruta completa"), before.get("FILE:Ruta completa"));
    assert_eq!(after.get("EXIF:Make"), Some("Leica"));
    Ok(())
}

#[test]
fn png_edits_are_rejected_without_touching_the_file() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("captura.png");
    RgbImage::new(2, 2).save(&path)?;
    let before = std::fs::read(&path)?;

    let mut edited = MetadataMapping::new();
    edited.insert("EXIF:Artist", "Ana");
    let outcome = save(&path, &edited);

    assert!(!outcome.success);
    assert!(outcome.message.contains(".png"));
    assert_eq!(std::fs::read(&path)?, before);
    Ok(())
}

#[test]
fn tiff_edit_and_strip_round_trip() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("escaneo.tif");
    RgbImage::from_pixel(6, 6, Rgb([10, 20, 30])).save(&path)?;

    let mut edited = MetadataMapping::new();
    edited.insert("EXIF:Artist", "Archivo municipal");
    assert!(save(&path, &edited).success);
    assert_eq!(extract(&path).get("EXIF:Artist"), Some("Archivo municipal"));

    assert!(remove(&path).success);
    let mapping = extract(&path);
    assert!(!mapping.has_namespace(Namespace::Exif));
    assert_eq!(image::open(&path)?.into_rgb8().get_pixel(0, 0), &Rgb([10, 20, 30]));
    Ok(())
}

fn sample_pixel(x: u32, y: u32) -> Rgb<u8> {
    Rgb([(x * 40 + y * 7) as u8, (200 - x * 30) as u8, (y * 90 + x) as u8])
}

/// Flujo zlib con un único bloque almacenado (sin comprimir).
fn zlib_stored(data: &[u8]) -> Vec<u8> {
    let (mut a, mut b) = (1_u32, 0_u32);
    for byte in data {
        a = (a + u32::from(*byte)) % 65521;
        b = (b + a) % 65521;
    }
    let len = data.len() as u16;
    let mut out = vec![0x78, 0x01, 0x01];
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(&((b << 16) | a).to_be_bytes());
    out
}

/// TIFF RGB con compresión Deflate y predictor horizontal.
fn deflate_predictor_tiff(width: u32, height: u32) -> Vec<u8> {
    let mut samples = Vec::new();
    for y in 0..height {
        let mut previous = [0_u8; 3];
        for x in 0..width {
            let pixel = sample_pixel(x, y).0;
            for channel in 0..3 {
                let delta = if x == 0 {
                    pixel[channel]
                } else {
                    pixel[channel].wrapping_sub(previous[channel])
                };
                samples.push(delta);
            }
            previous = pixel;
        }
    }
    let strip = zlib_stored(&samples);

    const ENTRIES: u16 = 11;
    let bits_offset = 8 + 2 + u32::from(ENTRIES) * 12 + 4;
    let strip_offset = bits_offset + 6;

    let mut out = b"II*\0".to_vec();
    out.extend_from_slice(&8_u32.to_le_bytes());
    out.extend_from_slice(&ENTRIES.to_le_bytes());
    let mut entry = |tag: u16, kind: u16, count: u32, value: u32| {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    };
    const SHORT: u16 = 3;
    const LONG: u16 = 4;
    entry(256, LONG, 1, width);
    entry(257, LONG, 1, height);
    entry(258, SHORT, 3, bits_offset);
    entry(259, SHORT, 1, 8);
    entry(262, SHORT, 1, 2);
    entry(273, LONG, 1, strip_offset);
    entry(277, SHORT, 1, 3);
    entry(278, LONG, 1, height);
    entry(279, LONG, 1, strip.len() as u32);
    entry(284, SHORT, 1, 1);
    entry(317, SHORT, 1, 2);
    out.extend_from_slice(&0_u32.to_le_bytes());
    for _ in 0..3 {
        out.extend_from_slice(&8_u16.to_le_bytes());
    }
    out.extend(strip);
    out
}

#[test]
fn predictor_tiff_keeps_its_pixels_after_an_edit() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("plano_catastral.tif");
    std::fs::write(&path, deflate_predictor_tiff(4, 2))?;
    let expected = RgbImage::from_fn(4, 2, sample_pixel);
    assert_eq!(image::open(&path)?.into_rgb8(), expected);
    assert!(extract(&path).get("EXIF:Predictor").is_none());

    let mut edited = MetadataMapping::new();
    edited.insert("EXIF:Artist", "Catastro");
    edited.insert("EXIF:Predictor", "2");
    let outcome = save(&path, &edited);
    assert!(outcome.success, "{}", outcome.message);

    assert_eq!(image::open(&path)?.into_rgb8(), expected);
    let mapping = extract(&path);
    assert_eq!(mapping.get("EXIF:Artist"), Some("Catastro"));
    assert!(mapping.get("EXIF:Predictor").is_none());
    Ok(())
}
