//! Extracción de metadata en PDFs mediante lectura del diccionario Info.

use lopdf::{Dictionary, Document, Object};
use std::path::Path;

use crate::error::EngineResult;
use crate::metadata::mapping::{MetadataMapping, Namespace};

pub const NO_PDF_METADATA: &str = "Sin metadata PDF";

pub fn extract_pdf_metadata(path: &Path) -> EngineResult<MetadataMapping> {
    let doc = Document::load(path)?;

    let mut mapping = MetadataMapping::new();
    if let Some(info) = info_dictionary(&doc) {
        for (key, value) in info.iter() {
            let Some(text) = object_to_string(&doc, value) else {
                continue;
            };
            let label = String::from_utf8_lossy(key);
            mapping.push(Namespace::Pdf, label.trim_start_matches('/'), text);
        }
    }

    if mapping.is_empty() {
        return Ok(MetadataMapping::sentinel(Namespace::Pdf, NO_PDF_METADATA));
    }
    Ok(mapping)
}

pub(crate) fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    let info = doc.trailer.get(b"Info").ok()?;
    deref_dictionary(doc, info)
}

fn deref_dictionary<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(reference) => doc.get_dictionary(*reference).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn object_to_string(doc: &Document, obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_string(bytes).trim().to_string()),
        Object::Name(name) => Some(String::from_utf8_lossy(name).trim().to_string()),
        Object::Integer(value) => Some(value.to_string()),
        Object::Real(value) => Some(value.to_string()),
        Object::Boolean(value) => Some(value.to_string()),
        Object::Reference(reference) => doc
            .get_object(*reference)
            .ok()
            .and_then(|inner| object_to_string(doc, inner)),
        _ => None,
    }
}

/// Decodifica una cadena de texto PDF.
///
/// Sin BOM se interpreta como PDFDocEncoding, salvo que los bytes ya sean
/// UTF-8 válido (productores que no siguen la norma).
pub(crate) fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        _ => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => lopdf::decode_text_string(&Object::string_literal(bytes.to_vec()))
                .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Cadena literal si el texto es ASCII; en otro caso UTF-16BE con BOM en hexadecimal.
pub(crate) fn encode_text_string(text: &str) -> Object {
    lopdf::text_string(text)
}
