//! Serialización big-endian de un [`TagDirectory`] como estructura TIFF.
//!
//! Disposición: cabecera, `0th`, `Exif`, `GPS`, `1st`, miniatura y por último
//! los datos de imagen (solo para archivos TIFF completos). Los punteros entre
//! IFDs y los desplazamientos se calculan aquí.

use super::directory::{
    EXIF_POINTER, GPS_POINTER, STRIP_BYTE_COUNTS, STRIP_OFFSETS, THUMBNAIL_LENGTH,
    THUMBNAIL_OFFSET, TagDirectory, is_structural,
};
use super::registry::Ifd;
use super::value::ExifValue;

const HEADER_LEN: usize = 8;

/// Píxeles sin comprimir que acompañan a un TIFF completo.
#[derive(Debug, Clone)]
pub struct RasterStrip {
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u16,
    pub samples_per_pixel: u16,
    pub has_alpha: bool,
    pub data: Vec<u8>,
}

impl RasterStrip {
    fn structure_entries(&self) -> Vec<(u16, ExifValue)> {
        let color_samples = if self.has_alpha {
            self.samples_per_pixel - 1
        } else {
            self.samples_per_pixel
        };
        let photometric = if color_samples >= 3 { 2 } else { 1 };

        let mut entries = vec![
            (256, ExifValue::Long(vec![self.width])),
            (257, ExifValue::Long(vec![self.height])),
            (
                258,
                ExifValue::Short(vec![self.bits_per_sample; usize::from(self.samples_per_pixel)]),
            ),
            (259, ExifValue::Short(vec![1])),
            (262, ExifValue::Short(vec![photometric])),
            (STRIP_OFFSETS, ExifValue::Long(vec![0])),
            (277, ExifValue::Short(vec![self.samples_per_pixel])),
            (278, ExifValue::Long(vec![self.height])),
            (
                STRIP_BYTE_COUNTS,
                ExifValue::Long(vec![u32::try_from(self.data.len()).unwrap_or(u32::MAX)]),
            ),
            (284, ExifValue::Short(vec![1])),
        ];
        if self.has_alpha {
            entries.push((338, ExifValue::Short(vec![2])));
        }
        entries
    }
}

/// Bloque TIFF listo para incrustarse en un segmento APP1.
pub fn encode_exif(directory: &TagDirectory) -> Vec<u8> {
    encode(directory, None)
}

/// Archivo TIFF completo con los píxeles en una única tira.
pub fn encode_tiff(directory: &TagDirectory, raster: &RasterStrip) -> Vec<u8> {
    encode(directory, Some(raster))
}

fn encode(directory: &TagDirectory, raster: Option<&RasterStrip>) -> Vec<u8> {
    let mut zeroth = collect_entries(directory, Ifd::Zeroth);
    let exif = collect_entries(directory, Ifd::Exif);
    let gps = collect_entries(directory, Ifd::Gps);
    let mut first = collect_entries(directory, Ifd::First);
    let thumbnail = directory.thumbnail().unwrap_or_default();

    if let Some(raster) = raster {
        for (id, value) in raster.structure_entries() {
            upsert(&mut zeroth, id, value);
        }
    }
    if !exif.is_empty() {
        upsert(&mut zeroth, EXIF_POINTER, ExifValue::Long(vec![0]));
    }
    if !gps.is_empty() {
        upsert(&mut zeroth, GPS_POINTER, ExifValue::Long(vec![0]));
    }
    if !thumbnail.is_empty() {
        upsert(&mut first, THUMBNAIL_OFFSET, ExifValue::Long(vec![0]));
        upsert(
            &mut first,
            THUMBNAIL_LENGTH,
            ExifValue::Long(vec![u32::try_from(thumbnail.len()).unwrap_or(u32::MAX)]),
        );
    }

    let zeroth_offset = HEADER_LEN;
    let exif_offset = zeroth_offset + ifd_size(&zeroth);
    let gps_offset = exif_offset + optional_ifd_size(&exif);
    let first_offset = gps_offset + optional_ifd_size(&gps);
    let thumbnail_offset = first_offset + optional_ifd_size(&first);
    let strip_offset = thumbnail_offset + thumbnail.len();

    if !exif.is_empty() {
        upsert(&mut zeroth, EXIF_POINTER, long(exif_offset));
    }
    if !gps.is_empty() {
        upsert(&mut zeroth, GPS_POINTER, long(gps_offset));
    }
    if raster.is_some() {
        upsert(&mut zeroth, STRIP_OFFSETS, long(strip_offset));
    }
    if !thumbnail.is_empty() {
        upsert(&mut first, THUMBNAIL_OFFSET, long(thumbnail_offset));
    }

    let next_after_zeroth = if first.is_empty() { 0 } else { first_offset };

    let mut out = Vec::with_capacity(strip_offset + raster.map(|r| r.data.len()).unwrap_or(0));
    out.extend_from_slice(b"MM");
    out.extend_from_slice(&42u16.to_be_bytes());
    out.extend_from_slice(&(zeroth_offset as u32).to_be_bytes());

    write_ifd(&mut out, &zeroth, zeroth_offset, next_after_zeroth);
    if !exif.is_empty() {
        write_ifd(&mut out, &exif, exif_offset, 0);
    }
    if !gps.is_empty() {
        write_ifd(&mut out, &gps, gps_offset, 0);
    }
    if !first.is_empty() {
        write_ifd(&mut out, &first, first_offset, 0);
    }
    out.extend_from_slice(thumbnail);
    if let Some(raster) = raster {
        out.extend_from_slice(&raster.data);
    }
    out
}

fn long(offset: usize) -> ExifValue {
    ExifValue::Long(vec![u32::try_from(offset).unwrap_or(u32::MAX)])
}

fn collect_entries(directory: &TagDirectory, ifd: Ifd) -> Vec<(u16, ExifValue)> {
    directory
        .entries(ifd)
        .filter(|(id, _)| !is_structural(*id))
        .map(|(id, value)| (id, value.clone()))
        .collect()
}

/// Inserta o sustituye manteniendo el orden ascendente de ids.
fn upsert(entries: &mut Vec<(u16, ExifValue)>, id: u16, value: ExifValue) {
    match entries.binary_search_by_key(&id, |(existing, _)| *existing) {
        Ok(index) => entries[index].1 = value,
        Err(index) => entries.insert(index, (id, value)),
    }
}

fn padded_len(len: usize) -> usize {
    len + (len % 2)
}

fn ifd_size(entries: &[(u16, ExifValue)]) -> usize {
    let external: usize = entries
        .iter()
        .map(|(_, value)| value.to_be_bytes().len())
        .filter(|len| *len > 4)
        .map(padded_len)
        .sum();
    2 + 12 * entries.len() + 4 + external
}

/// `Exif`, `GPS` y `1st` vacíos no se escriben; `0th` siempre existe.
fn optional_ifd_size(entries: &[(u16, ExifValue)]) -> usize {
    if entries.is_empty() { 0 } else { ifd_size(entries) }
}

fn write_ifd(out: &mut Vec<u8>, entries: &[(u16, ExifValue)], offset: usize, next: usize) {
    let mut data_offset = offset + 2 + 12 * entries.len() + 4;
    let mut data_area = Vec::new();

    out.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    for (id, value) in entries {
        let payload = value.to_be_bytes();
        out.extend_from_slice(&id.to_be_bytes());
        out.extend_from_slice(&value.type_code().code().to_be_bytes());
        out.extend_from_slice(&value.count().to_be_bytes());

        if payload.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..payload.len()].copy_from_slice(&payload);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&(data_offset as u32).to_be_bytes());
            data_offset += padded_len(payload.len());
            data_area.extend_from_slice(&payload);
            if payload.len() % 2 == 1 {
                data_area.push(0);
            }
        }
    }
    out.extend_from_slice(&(next as u32).to_be_bytes());
    out.extend_from_slice(&data_area);
}
