//! Propiedades de paquetes Office Open XML (DOCX, PPTX, XLSX).

use chrono::{DateTime, NaiveDateTime};
use std::path::Path;
use xmltree::Element;

use crate::error::EngineResult;
use crate::family::Family;
use crate::formatting::TIMESTAMP_FORMAT;
use crate::metadata::mapping::{MetadataMapping, Namespace};
use crate::metadata_editor::constants::{
    CORE_PART, DOCX_BODY_PART, OFFICE_FIELDS, OFFICE_TIMESTAMPS, XLSX_WORKBOOK_PART,
};
use crate::metadata_editor::office::archive::{Package, open_package, read_part};
use crate::metadata_editor::office::xml::{child_elements, core_field_spec, find_child_text};

pub const NO_OFFICE_METADATA: &str = "Sin metadata de documento";

pub const LABEL_PARAGRAPHS: &str = "Párrafos";
pub const LABEL_TABLES: &str = "Tablas";
pub const LABEL_SLIDES: &str = "Diapositivas";
pub const LABEL_SHEETS: &str = "Hojas";
pub const LABEL_SHEET_NAMES: &str = "Nombres de hojas";

/// Variante de paquete Office.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OfficeKind {
    Document,
    Presentation,
    Spreadsheet,
}

impl OfficeKind {
    pub fn from_family(family: Family) -> Option<Self> {
        match family {
            Family::Document => Some(OfficeKind::Document),
            Family::Presentation => Some(OfficeKind::Presentation),
            Family::Spreadsheet => Some(OfficeKind::Spreadsheet),
            _ => None,
        }
    }

    pub fn namespace(self) -> Namespace {
        match self {
            OfficeKind::Document => Namespace::Docx,
            OfficeKind::Presentation => Namespace::Pptx,
            OfficeKind::Spreadsheet => Namespace::Xlsx,
        }
    }
}

/// Campos de `core.xml` no vacíos seguidos del recuento estructural.
pub fn extract_office_metadata(path: &Path, kind: OfficeKind) -> EngineResult<MetadataMapping> {
    let namespace = kind.namespace();
    let mut archive = open_package(path)?;
    let mut mapping = MetadataMapping::new();

    if let Some(core) = read_part(&mut archive, CORE_PART)? {
        let root = Element::parse(core.as_slice())?;

        for (label, tag) in OFFICE_FIELDS {
            if let Some(text) = core_field_spec(tag).and_then(|spec| find_child_text(&root, &spec))
                && !text.is_empty()
            {
                mapping.push(namespace, label, text);
            }
        }

        for (label, tag) in OFFICE_TIMESTAMPS {
            if let Some(text) = core_field_spec(tag).and_then(|spec| find_child_text(&root, &spec))
                && !text.is_empty()
            {
                mapping.push(namespace, label, format_w3cdtf(&text));
            }
        }
    }

    match kind {
        OfficeKind::Document => document_counts(&mut archive, &mut mapping)?,
        OfficeKind::Presentation => {
            mapping.push(namespace, LABEL_SLIDES, slide_count(&archive).to_string());
        }
        OfficeKind::Spreadsheet => sheet_summary(&mut archive, &mut mapping)?,
    }

    if mapping.is_empty() {
        return Ok(MetadataMapping::sentinel(namespace, NO_OFFICE_METADATA));
    }
    Ok(mapping)
}

/// Fechas W3CDTF de `core.xml`; si no se reconocen se devuelven tal cual.
fn format_w3cdtf(text: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return parsed.naive_utc().format(TIMESTAMP_FORMAT).to_string();
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .map(|parsed| parsed.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|_| text.to_string())
}

fn document_counts(archive: &mut Package, mapping: &mut MetadataMapping) -> EngineResult<()> {
    let Some(document) = read_part(archive, DOCX_BODY_PART)? else {
        return Ok(());
    };
    let root = Element::parse(document.as_slice())?;
    let (paragraphs, tables) = match root.get_child("body") {
        Some(body) => (
            child_elements(body, "p").count(),
            child_elements(body, "tbl").count(),
        ),
        None => (0, 0),
    };

    mapping.push(Namespace::Docx, LABEL_PARAGRAPHS, paragraphs.to_string());
    mapping.push(Namespace::Docx, LABEL_TABLES, tables.to_string());
    Ok(())
}

fn slide_count(archive: &Package) -> usize {
    archive.file_names().filter(|name| is_slide_part(name)).count()
}

fn is_slide_part(name: &str) -> bool {
    name.strip_prefix("ppt/slides/slide")
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|number| !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()))
}

fn sheet_summary(archive: &mut Package, mapping: &mut MetadataMapping) -> EngineResult<()> {
    let Some(workbook) = read_part(archive, XLSX_WORKBOOK_PART)? else {
        return Ok(());
    };
    let root = Element::parse(workbook.as_slice())?;
    let names: Vec<String> = root
        .get_child("sheets")
        .map(|sheets| {
            child_elements(sheets, "sheet")
                .filter_map(|sheet| sheet.attributes.get("name").cloned())
                .collect()
        })
        .unwrap_or_default();

    mapping.push(Namespace::Xlsx, LABEL_SHEETS, names.len().to_string());
    mapping.push(Namespace::Xlsx, LABEL_SHEET_NAMES, names.join(", "));
    Ok(())
}
