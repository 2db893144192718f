use std::path::Path;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::metadata_editor::constants::CORE_PART;
use crate::metadata_editor::utils::StagedFile;

use super::archive::rewrite_package;
use super::sanitize::sanitize_core_properties;
use super::verify::verify_office_metadata_clean;

/// Vacía las propiedades editables de `core.xml`; el autor queda como `Unknown`.
pub fn remove_office_metadata(path: &Path) -> EngineResult<String> {
    let staged = StagedFile::new(path)?;

    let cleaned_anything = rewrite_package(path, staged.path(), |name, contents| {
        if name == CORE_PART {
            sanitize_core_properties(contents)
        } else {
            Ok((contents, false))
        }
    })?;

    if !verify_office_metadata_clean(staged.path())? {
        return Err(EngineError::Other(
            "La verificación indicó que la metadata no se eliminó correctamente".to_string(),
        ));
    }

    staged.commit()?;

    if cleaned_anything {
        info!(path = %path.display(), "propiedades del documento eliminadas");
        Ok("Se eliminaron: Título, Asunto, Autor, Palabras clave, Comentarios".to_string())
    } else {
        Ok("No se detectó metadata sensible; el contenido permanece sin cambios".to_string())
    }
}
