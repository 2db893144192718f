use std::path::Path;

use crate::advanced_metadata::OfficeKind;
use crate::error::{EngineError, EngineResult};
use crate::metadata::mapping::MetadataMapping;
use crate::metadata_editor::constants::{CORE_PART, OFFICE_FIELDS};
use crate::metadata_editor::utils::StagedFile;

use super::archive::rewrite_package;
use super::sanitize::apply_xml_updates;
use super::xml::core_field_spec;

/// Escribe los cinco campos editables presentes en el mapeo.
///
/// Los recuentos estructurales y las fechas son de solo lectura.
pub fn save_office_metadata(
    path: &Path,
    kind: OfficeKind,
    edited: &MetadataMapping,
) -> EngineResult<String> {
    let namespace = kind.namespace();
    let updates: Vec<(&str, &str)> = OFFICE_FIELDS
        .iter()
        .filter_map(|&(label, tag)| {
            edited
                .get(&namespace.key(label))
                .map(|value| (tag, value.trim()))
        })
        .collect();

    let staged = StagedFile::new(path)?;
    let mut found_core = false;
    let changed = rewrite_package(path, staged.path(), |name, contents| {
        if name == CORE_PART {
            found_core = true;
            apply_xml_updates(contents, &updates, core_field_spec)
        } else {
            Ok((contents, false))
        }
    })?;

    if !found_core {
        return Err(EngineError::Other(
            "El documento no contiene propiedades principales (docProps/core.xml)".to_string(),
        ));
    }

    if changed {
        staged.commit()?;
    }
    Ok(format!("Metadata del documento guardada ({} campos)", updates.len()))
}
