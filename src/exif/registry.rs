//! Registro estático de etiquetas EXIF: (IFD, id) → nombre legible y tipo numérico.
//!
//! Solo las etiquetas presentes aquí se muestran o se aceptan desde un
//! [`MetadataMapping`](crate::MetadataMapping). Los punteros entre IFDs y los
//! desplazamientos de miniaturas y tiras no figuran: se regeneran al escribir.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub enum Ifd {
    Zeroth,
    Exif,
    Gps,
    First,
}

impl Ifd {
    /// Orden de búsqueda y de emisión.
    pub const ALL: [Ifd; 4] = [Ifd::Zeroth, Ifd::Exif, Ifd::Gps, Ifd::First];

    pub fn name(self) -> &'static str {
        match self {
            Ifd::Zeroth => "0th",
            Ifd::Exif => "Exif",
            Ifd::Gps => "GPS",
            Ifd::First => "1st",
        }
    }
}

/// Códigos de tipo TIFF.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum TypeCode {
    Byte = 1,
    Ascii = 2,
    Short = 3,
    Long = 4,
    Rational = 5,
    SByte = 6,
    Undefined = 7,
    SShort = 8,
    SLong = 9,
    SRational = 10,
    Float = 11,
    Double = 12,
}

impl TypeCode {
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Tamaño en bytes de un elemento.
    pub fn unit_size(self) -> usize {
        match self {
            TypeCode::Byte | TypeCode::Ascii | TypeCode::SByte | TypeCode::Undefined => 1,
            TypeCode::Short | TypeCode::SShort => 2,
            TypeCode::Long | TypeCode::SLong | TypeCode::Float => 4,
            TypeCode::Rational | TypeCode::SRational | TypeCode::Double => 8,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TagInfo {
    pub id: u16,
    pub name: &'static str,
    pub type_code: TypeCode,
}

const fn tag(id: u16, name: &'static str, type_code: TypeCode) -> TagInfo {
    TagInfo {
        id,
        name,
        type_code,
    }
}

use TypeCode::{Ascii, Byte, Long, Rational, SRational, Short, Undefined};

/// Etiquetas de imagen, compartidas por `0th` y `1st`.
static IMAGE_TAGS: &[TagInfo] = &[
    tag(11, "ProcessingSoftware", Ascii),
    tag(254, "NewSubfileType", Long),
    tag(255, "SubfileType", Short),
    tag(256, "ImageWidth", Long),
    tag(257, "ImageLength", Long),
    tag(258, "BitsPerSample", Short),
    tag(259, "Compression", Short),
    tag(262, "PhotometricInterpretation", Short),
    tag(263, "Threshholding", Short),
    tag(266, "FillOrder", Short),
    tag(269, "DocumentName", Ascii),
    tag(270, "ImageDescription", Ascii),
    tag(271, "Make", Ascii),
    tag(272, "Model", Ascii),
    tag(274, "Orientation", Short),
    tag(277, "SamplesPerPixel", Short),
    tag(278, "RowsPerStrip", Long),
    tag(282, "XResolution", Rational),
    tag(283, "YResolution", Rational),
    tag(284, "PlanarConfiguration", Short),
    tag(285, "PageName", Ascii),
    tag(296, "ResolutionUnit", Short),
    tag(297, "PageNumber", Short),
    tag(301, "TransferFunction", Short),
    tag(305, "Software", Ascii),
    tag(306, "DateTime", Ascii),
    tag(315, "Artist", Ascii),
    tag(316, "HostComputer", Ascii),
    tag(317, "Predictor", Short),
    tag(318, "WhitePoint", Rational),
    tag(319, "PrimaryChromaticities", Rational),
    tag(320, "ColorMap", Short),
    tag(338, "ExtraSamples", Short),
    tag(339, "SampleFormat", Short),
    tag(529, "YCbCrCoefficients", Rational),
    tag(530, "YCbCrSubSampling", Short),
    tag(531, "YCbCrPositioning", Short),
    tag(532, "ReferenceBlackWhite", Rational),
    tag(18246, "Rating", Short),
    tag(18249, "RatingPercent", Short),
    tag(33421, "CFARepeatPatternDim", Short),
    tag(33422, "CFAPattern", Byte),
    tag(33432, "Copyright", Ascii),
    tag(34858, "TimeZoneOffset", Short),
    tag(40091, "XPTitle", Byte),
    tag(40092, "XPComment", Byte),
    tag(40093, "XPAuthor", Byte),
    tag(40094, "XPKeywords", Byte),
    tag(40095, "XPSubject", Byte),
    tag(50341, "PrintImageMatching", Undefined),
    tag(50706, "DNGVersion", Byte),
    tag(50708, "UniqueCameraModel", Ascii),
];

static EXIF_TAGS: &[TagInfo] = &[
    tag(33434, "ExposureTime", Rational),
    tag(33437, "FNumber", Rational),
    tag(34850, "ExposureProgram", Short),
    tag(34852, "SpectralSensitivity", Ascii),
    tag(34855, "ISOSpeedRatings", Short),
    tag(34856, "OECF", Undefined),
    tag(34864, "SensitivityType", Short),
    tag(34865, "StandardOutputSensitivity", Long),
    tag(34866, "RecommendedExposureIndex", Long),
    tag(34867, "ISOSpeed", Long),
    tag(36864, "ExifVersion", Undefined),
    tag(36867, "DateTimeOriginal", Ascii),
    tag(36868, "DateTimeDigitized", Ascii),
    tag(36880, "OffsetTime", Ascii),
    tag(36881, "OffsetTimeOriginal", Ascii),
    tag(36882, "OffsetTimeDigitized", Ascii),
    tag(37121, "ComponentsConfiguration", Undefined),
    tag(37122, "CompressedBitsPerPixel", Rational),
    tag(37377, "ShutterSpeedValue", SRational),
    tag(37378, "ApertureValue", Rational),
    tag(37379, "BrightnessValue", SRational),
    tag(37380, "ExposureBiasValue", SRational),
    tag(37381, "MaxApertureValue", Rational),
    tag(37382, "SubjectDistance", Rational),
    tag(37383, "MeteringMode", Short),
    tag(37384, "LightSource", Short),
    tag(37385, "Flash", Short),
    tag(37386, "FocalLength", Rational),
    tag(37396, "SubjectArea", Short),
    tag(37500, "MakerNote", Undefined),
    tag(37510, "UserComment", Undefined),
    tag(37520, "SubSecTime", Ascii),
    tag(37521, "SubSecTimeOriginal", Ascii),
    tag(37522, "SubSecTimeDigitized", Ascii),
    tag(40960, "FlashpixVersion", Undefined),
    tag(40961, "ColorSpace", Short),
    tag(40962, "PixelXDimension", Long),
    tag(40963, "PixelYDimension", Long),
    tag(40964, "RelatedSoundFile", Ascii),
    tag(41483, "FlashEnergy", Rational),
    tag(41484, "SpatialFrequencyResponse", Undefined),
    tag(41486, "FocalPlaneXResolution", Rational),
    tag(41487, "FocalPlaneYResolution", Rational),
    tag(41488, "FocalPlaneResolutionUnit", Short),
    tag(41492, "SubjectLocation", Short),
    tag(41493, "ExposureIndex", Rational),
    tag(41495, "SensingMethod", Short),
    tag(41728, "FileSource", Undefined),
    tag(41729, "SceneType", Undefined),
    tag(41730, "CFAPattern", Undefined),
    tag(41985, "CustomRendered", Short),
    tag(41986, "ExposureMode", Short),
    tag(41987, "WhiteBalance", Short),
    tag(41988, "DigitalZoomRatio", Rational),
    tag(41989, "FocalLengthIn35mmFilm", Short),
    tag(41990, "SceneCaptureType", Short),
    tag(41991, "GainControl", Short),
    tag(41992, "Contrast", Short),
    tag(41993, "Saturation", Short),
    tag(41994, "Sharpness", Short),
    tag(41995, "DeviceSettingDescription", Undefined),
    tag(41996, "SubjectDistanceRange", Short),
    tag(42016, "ImageUniqueID", Ascii),
    tag(42032, "CameraOwnerName", Ascii),
    tag(42033, "BodySerialNumber", Ascii),
    tag(42034, "LensSpecification", Rational),
    tag(42035, "LensMake", Ascii),
    tag(42036, "LensModel", Ascii),
    tag(42037, "LensSerialNumber", Ascii),
    tag(42240, "Gamma", Rational),
];

static GPS_TAGS: &[TagInfo] = &[
    tag(0, "GPSVersionID", Byte),
    tag(1, "GPSLatitudeRef", Ascii),
    tag(2, "GPSLatitude", Rational),
    tag(3, "GPSLongitudeRef", Ascii),
    tag(4, "GPSLongitude", Rational),
    tag(5, "GPSAltitudeRef", Byte),
    tag(6, "GPSAltitude", Rational),
    tag(7, "GPSTimeStamp", Rational),
    tag(8, "GPSSatellites", Ascii),
    tag(9, "GPSStatus", Ascii),
    tag(10, "GPSMeasureMode", Ascii),
    tag(11, "GPSDOP", Rational),
    tag(12, "GPSSpeedRef", Ascii),
    tag(13, "GPSSpeed", Rational),
    tag(14, "GPSTrackRef", Ascii),
    tag(15, "GPSTrack", Rational),
    tag(16, "GPSImgDirectionRef", Ascii),
    tag(17, "GPSImgDirection", Rational),
    tag(18, "GPSMapDatum", Ascii),
    tag(19, "GPSDestLatitudeRef", Ascii),
    tag(20, "GPSDestLatitude", Rational),
    tag(21, "GPSDestLongitudeRef", Ascii),
    tag(22, "GPSDestLongitude", Rational),
    tag(23, "GPSDestBearingRef", Ascii),
    tag(24, "GPSDestBearing", Rational),
    tag(25, "GPSDestDistanceRef", Ascii),
    tag(26, "GPSDestDistance", Rational),
    tag(27, "GPSProcessingMethod", Undefined),
    tag(28, "GPSAreaInformation", Undefined),
    tag(29, "GPSDateStamp", Ascii),
    tag(30, "GPSDifferential", Short),
    tag(31, "GPSHPositioningError", Rational),
];

pub fn tags(ifd: Ifd) -> &'static [TagInfo] {
    match ifd {
        Ifd::Zeroth | Ifd::First => IMAGE_TAGS,
        Ifd::Exif => EXIF_TAGS,
        Ifd::Gps => GPS_TAGS,
    }
}

pub fn lookup(ifd: Ifd, id: u16) -> Option<&'static TagInfo> {
    tags(ifd).iter().find(|info| info.id == id)
}

/// IFDs (en orden `0th`, `Exif`, `GPS`, `1st`) que declaran una etiqueta con ese nombre.
pub fn candidates(name: &str) -> Vec<(Ifd, &'static TagInfo)> {
    Ifd::ALL
        .into_iter()
        .filter_map(|ifd| {
            tags(ifd)
                .iter()
                .find(|info| info.name == name)
                .map(|info| (ifd, info))
        })
        .collect()
}

/// Primera coincidencia por nombre en el orden de búsqueda.
pub fn find_by_name(name: &str) -> Option<(Ifd, &'static TagInfo)> {
    candidates(name).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_resolves_known_tags() {
        let orientation = lookup(Ifd::Zeroth, 274).map(|t| t.name);
        assert_eq!(orientation, Some("Orientation"));
        assert_eq!(lookup(Ifd::Gps, 2).map(|t| t.type_code), Some(TypeCode::Rational));
        assert!(lookup(Ifd::Exif, 274).is_none());
        assert!(lookup(Ifd::Zeroth, 34665).is_none());
    }

    #[test]
    fn name_search_prefers_zeroth_over_first() {
        let (ifd, info) = find_by_name("XResolution").expect("XResolution registrada");
        assert_eq!(ifd, Ifd::Zeroth);
        assert_eq!(info.type_code, TypeCode::Rational);

        let all: Vec<Ifd> = candidates("XResolution").into_iter().map(|(i, _)| i).collect();
        assert_eq!(all, vec![Ifd::Zeroth, Ifd::First]);
    }

    #[test]
    fn ids_are_unique_within_each_table() {
        for ifd in Ifd::ALL {
            let table = tags(ifd);
            for (index, info) in table.iter().enumerate() {
                assert!(
                    table[index + 1..].iter().all(|other| other.id != info.id),
                    "id duplicado {} en {}",
                    info.id,
                    ifd.name()
                );
            }
        }
    }
}
