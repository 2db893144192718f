//! Directorio de etiquetas EXIF agrupado por IFD.

use exif::{Context, Exif, Field, In, Tag, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::metadata::mapping::{MetadataMapping, Namespace};

use super::registry::{self, Ifd};
use super::value::ExifValue;

pub const EXIF_POINTER: u16 = 34665;
pub const GPS_POINTER: u16 = 34853;
pub const INTEROP_POINTER: u16 = 40965;
pub const THUMBNAIL_OFFSET: u16 = 513;
pub const THUMBNAIL_LENGTH: u16 = 514;
pub const STRIP_OFFSETS: u16 = 273;
pub const STRIP_BYTE_COUNTS: u16 = 279;
pub const TILE_OFFSETS: u16 = 324;
pub const TILE_BYTE_COUNTS: u16 = 325;

/// Entradas que describen la disposición del archivo y se regeneran al escribir.
const STRUCTURAL_TAGS: [u16; 9] = [
    EXIF_POINTER,
    GPS_POINTER,
    INTEROP_POINTER,
    THUMBNAIL_OFFSET,
    THUMBNAIL_LENGTH,
    STRIP_OFFSETS,
    STRIP_BYTE_COUNTS,
    TILE_OFFSETS,
    TILE_BYTE_COUNTS,
];

/// Descripción del raster principal en el IFD `0th` de un TIFF.
///
/// Incluye la codificación de origen. El escritor TIFF guarda una única tira
/// sin comprimir y ninguna de estas entradas la describe.
pub const RASTER_LAYOUT_TAGS: [u16; 21] = [
    256, // ImageWidth
    257, // ImageLength
    258, // BitsPerSample
    259, // Compression
    262, // PhotometricInterpretation
    266, // FillOrder
    277, // SamplesPerPixel
    278, // RowsPerStrip
    284, // PlanarConfiguration
    292, // T4Options
    293, // T6Options
    317, // Predictor
    320, // ColorMap
    322, // TileWidth
    323, // TileLength
    338, // ExtraSamples
    339, // SampleFormat
    347, // JPEGTables
    529, // YCbCrCoefficients
    530, // YCbCrSubSampling
    531, // YCbCrPositioning
];

pub fn is_structural(id: u16) -> bool {
    STRUCTURAL_TAGS.contains(&id)
}

/// Resultado de aplicar un mapeo editado sobre el directorio.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplySummary {
    pub updated: usize,
    pub unchanged: usize,
    pub ignored: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagDirectory {
    ifds: BTreeMap<Ifd, BTreeMap<u16, ExifValue>>,
    thumbnail: Option<Vec<u8>>,
}

impl TagDirectory {
    /// Cuatro IFDs vacíos, sin miniatura.
    pub fn empty() -> Self {
        Self {
            ifds: Ifd::ALL.into_iter().map(|ifd| (ifd, BTreeMap::new())).collect(),
            thumbnail: None,
        }
    }

    /// Lee el EXIF incrustado en un contenedor (JPEG, TIFF, PNG o WebP).
    ///
    /// Devuelve `None` cuando el archivo no tiene segmento EXIF.
    pub fn read_from_path(path: &Path) -> EngineResult<Option<Self>> {
        let file = File::open(path).map_err(|e| EngineError::io(path, e))?;
        let mut reader = BufReader::new(file);

        match exif::Reader::new().read_from_container(&mut reader) {
            Ok(exif) => Ok(Some(Self::from_exif(&exif))),
            Err(exif::Error::NotFound(_)) | Err(exif::Error::BlankValue(_)) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    /// Interpreta un bloque TIFF crudo (el contenido de APP1 sin `Exif\0\0`).
    pub fn from_tiff_bytes(data: Vec<u8>) -> EngineResult<Self> {
        let exif = exif::Reader::new().read_raw(data)?;
        Ok(Self::from_exif(&exif))
    }

    pub fn from_exif(exif: &Exif) -> Self {
        let mut directory = Self::empty();

        for field in exif.fields() {
            let Some(ifd) = ifd_of(field) else {
                continue;
            };
            let id = field.tag.number();
            if is_structural(id) {
                continue;
            }
            match convert_value(&field.value) {
                Some(value) => directory.set(ifd, id, value),
                None => debug!(tag = id, ifd = ifd.name(), "valor EXIF de tipo desconocido"),
            }
        }

        directory.thumbnail = thumbnail_bytes(exif);
        directory
    }

    pub fn get(&self, ifd: Ifd, id: u16) -> Option<&ExifValue> {
        self.ifds.get(&ifd).and_then(|entries| entries.get(&id))
    }

    pub fn set(&mut self, ifd: Ifd, id: u16, value: ExifValue) {
        self.ifds.entry(ifd).or_default().insert(id, value);
    }

    pub fn remove(&mut self, ifd: Ifd, id: u16) -> Option<ExifValue> {
        self.ifds.get_mut(&ifd).and_then(|entries| entries.remove(&id))
    }

    /// Entradas de un IFD ordenadas por id.
    pub fn entries(&self, ifd: Ifd) -> impl Iterator<Item = (u16, &ExifValue)> {
        self.ifds
            .get(&ifd)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(id, value)| (*id, value)))
    }

    pub fn ifd_len(&self, ifd: Ifd) -> usize {
        self.ifds.get(&ifd).map(BTreeMap::len).unwrap_or(0)
    }

    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.thumbnail.as_deref()
    }

    pub fn set_thumbnail(&mut self, thumbnail: Option<Vec<u8>>) {
        self.thumbnail = thumbnail;
    }

    /// Descarta la descripción del raster de `0th`; el escritor TIFF la regenera.
    pub fn drop_raster_layout(&mut self) {
        for id in RASTER_LAYOUT_TAGS {
            self.remove(Ifd::Zeroth, id);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.thumbnail.is_none() && Ifd::ALL.into_iter().all(|ifd| self.ifd_len(ifd) == 0)
    }

    /// Entradas `EXIF:<Nombre>` de las etiquetas registradas.
    ///
    /// Si un nombre aparece en varios IFDs gana el primero en el orden
    /// `0th`, `Exif`, `GPS`, `1st`.
    pub fn to_mapping(&self) -> MetadataMapping {
        let mut mapping = MetadataMapping::new();
        for ifd in Ifd::ALL {
            for (id, value) in self.entries(ifd) {
                if let Some(info) = registry::lookup(ifd, id) {
                    mapping.insert_new(Namespace::Exif.key(info.name), value.display());
                }
            }
        }
        mapping
    }

    /// Aplica las entradas `EXIF:*` de un mapeo editado.
    ///
    /// Los nombres fuera del registro se ignoran. Un valor cuyo texto coincide
    /// con la representación actual conserva el valor original sin recodificar.
    pub fn apply_mapping(&mut self, edited: &MetadataMapping) -> ApplySummary {
        let mut summary = ApplySummary::default();

        for (name, text) in edited.namespace_entries(Namespace::Exif) {
            let candidates = registry::candidates(name);
            let target = candidates
                .iter()
                .find(|(ifd, info)| self.get(*ifd, info.id).is_some())
                .or_else(|| candidates.first())
                .copied();

            let Some((ifd, info)) = target else {
                debug!(tag = name, "etiqueta EXIF desconocida, se ignora");
                summary.ignored.push(name.to_string());
                continue;
            };

            if let Some(current) = self.get(ifd, info.id)
                && current.display() == text.trim()
            {
                summary.unchanged += 1;
                continue;
            }

            self.set(ifd, info.id, ExifValue::encode(info.type_code, text));
            summary.updated += 1;
        }

        summary
    }
}

fn ifd_of(field: &Field) -> Option<Ifd> {
    match (field.tag.context(), field.ifd_num.index()) {
        (Context::Tiff, 0) => Some(Ifd::Zeroth),
        (Context::Tiff, 1) => Some(Ifd::First),
        (Context::Exif, 0) => Some(Ifd::Exif),
        (Context::Gps, 0) => Some(Ifd::Gps),
        _ => None,
    }
}

fn convert_value(value: &Value) -> Option<ExifValue> {
    let converted = match value {
        Value::Byte(v) => ExifValue::Byte(v.clone()),
        Value::Ascii(parts) => ExifValue::Ascii(parts.join(&0u8)),
        Value::Short(v) => ExifValue::Short(v.clone()),
        Value::Long(v) => ExifValue::Long(v.clone()),
        Value::Rational(v) => ExifValue::Rational(v.iter().map(|r| (r.num, r.denom)).collect()),
        Value::SByte(v) => ExifValue::SByte(v.clone()),
        Value::Undefined(v, _) => ExifValue::Undefined(v.clone()),
        Value::SShort(v) => ExifValue::SShort(v.clone()),
        Value::SLong(v) => ExifValue::SLong(v.clone()),
        Value::SRational(v) => {
            ExifValue::SRational(v.iter().map(|r| (r.num, r.denom)).collect())
        }
        Value::Float(v) => ExifValue::Float(v.clone()),
        Value::Double(v) => ExifValue::Double(v.clone()),
        _ => return None,
    };
    Some(converted)
}

fn thumbnail_bytes(exif: &Exif) -> Option<Vec<u8>> {
    let offset = exif
        .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    let length = exif
        .get_field(Tag::JPEGInterchangeFormatLength, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    exif.buf()
        .get(offset..offset.checked_add(length)?)
        .map(<[u8]>::to_vec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TagDirectory {
        let mut directory = TagDirectory::empty();
        directory.set(Ifd::Zeroth, 271, ExifValue::Ascii(b"Canon\0".to_vec()));
        directory.set(Ifd::Zeroth, 282, ExifValue::Rational(vec![(72, 1)]));
        directory.set(Ifd::Exif, 33437, ExifValue::Rational(vec![(28, 10)]));
        directory.set(Ifd::First, 282, ExifValue::Rational(vec![(96, 1)]));
        directory.set(Ifd::First, 259, ExifValue::Short(vec![6]));
        directory.set(Ifd::Zeroth, 50000, ExifValue::Short(vec![1]));
        directory
    }

    #[test]
    fn mapping_keeps_first_occurrence_of_each_name() {
        let mapping = sample().to_mapping();

        assert_eq!(mapping.get("EXIF:Make"), Some("Canon"));
        assert_eq!(mapping.get("EXIF:XResolution"), Some("72"));
        assert_eq!(mapping.get("EXIF:FNumber"), Some("2.8"));
        assert_eq!(mapping.get("EXIF:Compression"), Some("6"));
        assert_eq!(mapping.len(), 4);
    }

    #[test]
    fn applying_an_unchanged_mapping_changes_nothing() {
        let original = sample();
        let mut directory = original.clone();
        let summary = directory.apply_mapping(&original.to_mapping());

        assert_eq!(summary.updated, 0);
        assert_eq!(summary.unchanged, 4);
        assert_eq!(directory, original);
    }

    #[test]
    fn edits_land_in_the_ifd_that_produced_the_entry() {
        let mut directory = sample();
        let mut edited = MetadataMapping::new();
        edited.insert("EXIF:Compression", "1");
        edited.insert("EXIF:Orientation", "3");
        edited.insert("EXIF:NoExiste", "x");
        edited.insert("FILE:Nombre", "otro.jpg");

        let summary = directory.apply_mapping(&edited);

        assert_eq!(summary.updated, 2);
        assert_eq!(summary.ignored, vec!["NoExiste".to_string()]);
        assert_eq!(directory.get(Ifd::First, 259), Some(&ExifValue::Short(vec![1])));
        assert!(directory.get(Ifd::Zeroth, 259).is_none());
        assert_eq!(directory.get(Ifd::Zeroth, 274), Some(&ExifValue::Short(vec![3])));
    }

    #[test]
    fn empty_directory_has_four_ifds() {
        let directory = TagDirectory::empty();
        assert!(directory.is_empty());
        assert!(directory.to_mapping().is_empty());
        for ifd in Ifd::ALL {
            assert_eq!(directory.ifd_len(ifd), 0);
        }
    }
}
