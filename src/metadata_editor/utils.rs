//! Archivos temporales junto al original para reemplazos atómicos.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

/// Copia de trabajo oculta en el mismo directorio que el archivo de destino.
///
/// Si no se confirma con [`StagedFile::commit`], el temporal se borra al
/// soltarse y el original queda intacto.
pub(crate) struct StagedFile {
    target: PathBuf,
    temp: TempPath,
}

impl StagedFile {
    /// Reserva un temporal vacío con la misma extensión que `target`.
    pub(crate) fn new(target: &Path) -> EngineResult<Self> {
        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let stem = target.file_stem().unwrap_or_default().to_string_lossy();
        let suffix = match target.extension() {
            Some(extension) => format!(".{}", extension.to_string_lossy()),
            None => String::new(),
        };

        let temp = Builder::new()
            .prefix(&format!(".{}_temp_", stem))
            .suffix(&suffix)
            .tempfile_in(parent)
            .map_err(|e| EngineError::io(parent, e))?
            .into_temp_path();

        debug!(temp = %temp.display(), "temporal reservado");
        Ok(Self {
            target: target.to_path_buf(),
            temp,
        })
    }

    /// Temporal con una copia exacta del contenido de `target`.
    pub(crate) fn copy_of(target: &Path) -> EngineResult<Self> {
        let staged = Self::new(target)?;
        fs::copy(target, staged.path()).map_err(|e| EngineError::io(target, e))?;
        Ok(staged)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.temp
    }

    /// Sustituye el original por el temporal mediante un renombrado atómico.
    pub(crate) fn commit(self) -> EngineResult<()> {
        match fs::metadata(&self.target) {
            Ok(original) => {
                if let Err(error) = fs::set_permissions(&self.temp, original.permissions()) {
                    warn!(%error, "no se pudieron copiar los permisos del original");
                }
            }
            Err(error) => warn!(%error, "no se pudieron leer los permisos del original"),
        }

        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| EngineError::Staging(e.error.to_string()))?;
        debug!(target = %target.display(), "archivo reemplazado");
        Ok(())
    }
}
