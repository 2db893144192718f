use xmltree::Element;

use crate::error::{EngineError, EngineResult};
use crate::metadata_editor::constants::OFFICE_REMOVAL_VALUES;

use super::xml::{FieldSpec, apply_update_to_element, core_field_spec};

/// Normaliza los campos principales de metadata para eliminar rastros de autoría.
pub(crate) fn sanitize_core_properties(contents: Vec<u8>) -> EngineResult<(Vec<u8>, bool)> {
    apply_xml_updates(contents, &OFFICE_REMOVAL_VALUES, core_field_spec)
}

/// Aplica pares `(prefijo:campo, valor)` sobre el XML; solo reescribe si algo cambió.
pub(crate) fn apply_xml_updates(
    contents: Vec<u8>,
    updates: &[(&str, &str)],
    lookup: fn(&str) -> Option<FieldSpec<'static>>,
) -> EngineResult<(Vec<u8>, bool)> {
    let mut root = Element::parse(contents.as_slice())?;

    let mut modified = false;
    for &(tag, value) in updates {
        if let Some(spec) = lookup(tag) {
            modified |= apply_update_to_element(&mut root, spec, value);
        }
    }

    if !modified {
        return Ok((contents, false));
    }

    let mut output = Vec::new();
    let mut config = xmltree::EmitterConfig::new();
    config.perform_indent = false;
    config.write_document_declaration = true;
    root.write_with_config(&mut output, config)
        .map_err(|e| EngineError::Xml(format!("Error escribiendo XML sanitizado: {}", e)))?;

    Ok((output, true))
}
