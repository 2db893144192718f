use std::path::Path;
use xmltree::Element;

use crate::error::EngineResult;
use crate::metadata_editor::constants::{CORE_PART, OFFICE_REMOVAL_VALUES};

use super::archive::{open_package, read_part};
use super::xml::{core_field_spec, element_matches_expected_value};

/// Comprueba que un documento Office limpio no conserva metadata de autoría.
pub fn verify_office_metadata_clean(path: &Path) -> EngineResult<bool> {
    let mut archive = open_package(path)?;
    let Some(contents) = read_part(&mut archive, CORE_PART)? else {
        return Ok(true);
    };
    let root = Element::parse(contents.as_slice())?;

    Ok(OFFICE_REMOVAL_VALUES.iter().all(|&(tag, expected)| {
        core_field_spec(tag)
            .is_none_or(|spec| element_matches_expected_value(&root, spec, expected))
    }))
}
