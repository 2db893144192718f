//! Exportacion de la metadata extraida en distintos formatos.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::metadata::mapping::{MetadataMapping, Namespace, split_key};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Formato de exportacion no reconocido: {0}")]
    UnknownFormat(String),

    #[error("No se pudo guardar el reporte: {0}")]
    Io(#[from] std::io::Error),

    #[error("No se pudo serializar JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No se pudo escribir el CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("No se pudo escribir el XLSX: {0}")]
    Xlsx(#[from] XlsxError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Txt,
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Txt => "TXT",
            ExportFormat::Csv => "CSV",
            ExportFormat::Xlsx => "Excel",
        }
    }
}

pub fn parse_export_format(input: &str) -> Result<ExportFormat, ExportError> {
    match input.to_lowercase().as_str() {
        "json" => Ok(ExportFormat::Json),
        "txt" | "text" => Ok(ExportFormat::Txt),
        "csv" => Ok(ExportFormat::Csv),
        "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
        other => Err(ExportError::UnknownFormat(other.to_string())),
    }
}

pub fn export_metadata(
    mapping: &MetadataMapping,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Json => export_json(mapping, path),
        ExportFormat::Txt => export_txt(mapping, path),
        ExportFormat::Csv => export_csv(mapping, path),
        ExportFormat::Xlsx => export_xlsx(mapping, path),
    }
}

fn export_json(mapping: &MetadataMapping, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(mapping)?;
    fs::write(path, json)?;
    Ok(())
}

fn export_txt(mapping: &MetadataMapping, path: &Path) -> Result<(), ExportError> {
    let mut output = String::new();
    output.push_str("Reporte de metadata\n");
    output.push_str("===================\n");

    let mut current_section: Option<String> = None;
    for row in collect_rows(mapping) {
        let section = if row.namespace.is_empty() {
            "General".to_string()
        } else {
            row.namespace.clone()
        };
        if current_section.as_deref() != Some(section.as_str()) {
            output.push('\n');
            output.push_str(&section);
            output.push('\n');
            output.push_str(&"-".repeat(section.chars().count()));
            output.push('\n');
            current_section = Some(section);
        }

        if row.label.is_empty() {
            output.push_str(&format!("({})\n", row.value));
        } else {
            output.push_str(&format!("- {}: {}\n", row.label, row.value));
        }
    }

    fs::write(path, output)?;
    Ok(())
}

fn export_csv(mapping: &MetadataMapping, path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["key", "namespace", "label", "value"])?;
    for row in collect_rows(mapping) {
        writer.write_record([&row.key, &row.namespace, &row.label, &row.value])?;
    }
    writer.flush()?;
    Ok(())
}

fn export_xlsx(mapping: &MetadataMapping, path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Metadata")?;

    worksheet.set_column_width(0, 14.0)?;
    worksheet.set_column_width(1, 32.0)?;
    worksheet.set_column_width(2, 70.0)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x1F4E78))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);

    let cell_format = Format::new()
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Left);

    for (column, title) in ["Seccion", "Etiqueta", "Valor"].into_iter().enumerate() {
        worksheet.write_with_format(0, column as u16, title, &header_format)?;
    }

    for (index, row) in collect_rows(mapping).iter().enumerate() {
        let row_index = (index + 1) as u32;
        worksheet.write_with_format(row_index, 0, row.namespace.as_str(), &cell_format)?;
        worksheet.write_with_format(row_index, 1, row.label.as_str(), &cell_format)?;
        worksheet.write_with_format(row_index, 2, row.value.as_str(), &cell_format)?;
    }

    workbook.save(path)?;
    Ok(())
}

struct ExportRow {
    key: String,
    namespace: String,
    label: String,
    value: String,
}

/// Filas planas; los centinelas se colocan en la sección de su familia sin etiqueta.
fn collect_rows(mapping: &MetadataMapping) -> Vec<ExportRow> {
    mapping
        .iter()
        .map(|(key, value)| {
            let (namespace, label) = match split_key(key) {
                Some((namespace, label)) => (namespace.prefix().to_string(), label.to_string()),
                None if Namespace::from_prefix(key).is_some() => (key.to_string(), String::new()),
                None => (String::new(), key.to_string()),
            };
            ExportRow {
                key: key.to_string(),
                namespace,
                label,
                value: value.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetadataMapping {
        let mut mapping = MetadataMapping::new();
        mapping.insert("FILE:Nombre", "foto.jpg");
        mapping.insert("EXIF:Make", "Canon, Inc.");
        mapping.insert("ID3", "Sin etiquetas de audio");
        mapping.insert("Error", "fallo");
        mapping
    }

    #[test]
    fn csv_has_one_row_per_entry() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reporte.csv");
        export_metadata(&sample(), ExportFormat::Csv, &path)?;

        let mut reader = csv::Reader::from_path(&path)?;
        let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[1][0], "EXIF:Make");
        assert_eq!(&rows[1][3], "Canon, Inc.");
        assert_eq!(&rows[2][1], "ID3");
        assert_eq!(&rows[2][2], "");
        assert_eq!(&rows[3][1], "");
        Ok(())
    }

    #[test]
    fn json_round_trips_the_mapping() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reporte.json");
        export_metadata(&sample(), ExportFormat::Json, &path)?;

        let restored: MetadataMapping = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(restored, sample());
        Ok(())
    }

    #[test]
    fn txt_groups_entries_by_namespace() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reporte.txt");
        export_metadata(&sample(), ExportFormat::Txt, &path)?;

        let text = fs::read_to_string(&path)?;
        assert!(text.contains("FILE\n----\n- Nombre: foto.jpg"));
        assert!(text.contains("ID3\n---\n(Sin etiquetas de audio)"));
        assert!(text.contains("General\n-------\n- Error: fallo"));
        Ok(())
    }

    #[test]
    fn xlsx_is_written() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reporte.xlsx");
        export_metadata(&sample(), ExportFormat::Xlsx, &path)?;
        assert!(fs::metadata(&path)?.len() > 0);
        Ok(())
    }

    #[test]
    fn unknown_formats_are_rejected() {
        assert!(matches!(parse_export_format("Excel"), Ok(ExportFormat::Xlsx)));
        assert!(parse_export_format("pdf").is_err());
    }
}
