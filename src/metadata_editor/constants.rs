//! Valores compartidos para leer y normalizar propiedades de documentos Office.

pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const CP_NS: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";

pub const CORE_PART: &str = "docProps/core.xml";
pub const DOCX_BODY_PART: &str = "word/document.xml";
pub const XLSX_WORKBOOK_PART: &str = "xl/workbook.xml";

pub const LABEL_TITLE: &str = "Título";
pub const LABEL_SUBJECT: &str = "Asunto";
pub const LABEL_AUTHOR: &str = "Autor";
pub const LABEL_KEYWORDS: &str = "Palabras clave";
pub const LABEL_COMMENTS: &str = "Comentarios";
pub const LABEL_CREATED: &str = "Fecha de creación";
pub const LABEL_MODIFIED: &str = "Fecha de modificación";

/// Campos editables: etiqueta mostrada → elemento de `core.xml`.
pub const OFFICE_FIELDS: [(&str, &str); 5] = [
    (LABEL_TITLE, "dc:title"),
    (LABEL_SUBJECT, "dc:subject"),
    (LABEL_AUTHOR, "dc:creator"),
    (LABEL_KEYWORDS, "cp:keywords"),
    (LABEL_COMMENTS, "dc:description"),
];

pub const OFFICE_TIMESTAMPS: [(&str, &str); 2] = [
    (LABEL_CREATED, "dcterms:created"),
    (LABEL_MODIFIED, "dcterms:modified"),
];

/// Autor que queda tras la limpieza.
pub const ANONYMOUS_AUTHOR: &str = "Unknown";

pub const OFFICE_REMOVAL_VALUES: [(&str, &str); 5] = [
    ("dc:title", ""),
    ("dc:subject", ""),
    ("dc:creator", ANONYMOUS_AUTHOR),
    ("cp:keywords", ""),
    ("dc:description", ""),
];
