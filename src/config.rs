//! Preferencias persistentes de la interfaz (idioma).
//!
//! El motor no las consulta; solo la capa de presentación las recibe.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

const APP_DIR: &str = "metastrip";
const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No se encontró el directorio de configuración del sistema")]
    ConfigDirNotFound,

    #[error("No se pudo acceder a `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Preferencias corruptas en `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Idioma desconocido: {0}")]
    UnknownLanguage(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
    Hu,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Es, Language::En, Language::Hu];

    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
            Language::Hu => "hu",
        }
    }

    pub fn parse(code: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|language| language.code().eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| ConfigError::UnknownLanguage(code.to_string()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: Language,
}

impl Preferences {
    /// Ruta por defecto: `<config_dir>/metastrip/preferences.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::ConfigDirNotFound)?;
        Ok(base.join(APP_DIR).join(PREFERENCES_FILE))
    }

    /// Carga las preferencias; un archivo inexistente da los valores por defecto.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "sin preferencias guardadas");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Como [`Preferences::load`], pero un archivo ilegible o corrupto solo se
    /// registra y se usan los valores por defecto.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|error| {
            warn!(%error, "preferencias ignoradas, se usan los valores por defecto");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content).map_err(io_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let prefs = Preferences::load(&dir.path().join("no_existe.json"))?;
        assert_eq!(prefs.language, Language::Es);
        Ok(())
    }

    #[test]
    fn saved_language_is_restored() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sub").join(PREFERENCES_FILE);

        Preferences {
            language: Language::Hu,
        }
        .save(&path)?;

        assert!(fs::read_to_string(&path)?.contains("\"hu\""));
        assert_eq!(Preferences::load(&path)?.language, Language::Hu);
        Ok(())
    }

    #[test]
    fn corrupt_file_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PREFERENCES_FILE);
        fs::write(&path, "{ idioma")?;

        assert!(matches!(Preferences::load(&path), Err(ConfigError::Parse { .. })));
        Ok(())
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PREFERENCES_FILE);
        fs::write(&path, "{ \"language\": \"klingon\" }")?;

        assert_eq!(Preferences::load_or_default(&path), Preferences::default());
        Ok(())
    }

    #[test]
    fn language_codes_are_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(Language::parse("EN")?, Language::En);
        assert!(Language::parse("fr").is_err());
        Ok(())
    }
}
