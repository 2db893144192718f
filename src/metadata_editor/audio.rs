//! Etiquetas de audio mediante `lofty`.

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::tag::{ItemKey, Tag, TagExt};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::metadata::mapping::{MetadataMapping, Namespace};
use crate::metadata_editor::utils::StagedFile;

/// Borra todas las etiquetas del contenedor.
pub fn remove_audio_metadata(path: &Path) -> EngineResult<String> {
    let tagged = lofty::read_from_path(path)?;
    let tag_types: Vec<_> = tagged.tags().iter().map(Tag::tag_type).collect();

    let staged = StagedFile::copy_of(path)?;
    for tag_type in &tag_types {
        tag_type.remove_from_path(staged.path())?;
    }
    staged.commit()?;

    info!(path = %path.display(), removed = tag_types.len(), "etiquetas de audio eliminadas");
    Ok(format!("Etiquetas de audio eliminadas ({})", tag_types.len()))
}

/// Escribe cada entrada `ID3:<clave>` en la etiqueta principal.
pub fn save_audio_metadata(path: &Path, edited: &MetadataMapping) -> EngineResult<String> {
    let mut tagged = lofty::read_from_path(path)?;
    let tag_type = tagged.primary_tag_type();

    if tagged.primary_tag().is_none() {
        tagged.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged
        .primary_tag_mut()
        .ok_or_else(|| EngineError::Other("No se pudo crear la etiqueta de audio".to_string()))?;

    let mut written = 0;
    for (key, value) in edited.namespace_entries(Namespace::Id3) {
        let item_key = ItemKey::from_key(tag_type, key);
        if tag.insert_text(item_key, value.to_string()) {
            written += 1;
        } else {
            debug!(key, "clave no admitida por la etiqueta");
        }
    }

    let staged = StagedFile::copy_of(path)?;
    tag.save_to_path(staged.path(), WriteOptions::default())?;
    staged.commit()?;

    Ok(format!("Etiquetas de audio guardadas ({} campos)", written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advanced_metadata::audio::tests::sample_wav;
    use crate::advanced_metadata::audio::{NO_AUDIO_TAGS, extract_audio_metadata};

    #[test]
    fn save_then_remove_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nota.wav");
        sample_wav(&path)?;

        let mut edited = MetadataMapping::new();
        edited.insert("ID3:TIT2", "Nocturno");
        edited.insert("ID3:TPE1", "Orquesta");
        save_audio_metadata(&path, &edited)?;

        let mapping = extract_audio_metadata(&path);
        assert_eq!(mapping.get("ID3:TIT2"), Some("Nocturno"));
        assert_eq!(mapping.get("ID3:TPE1"), Some("Orquesta"));

        remove_audio_metadata(&path)?;
        remove_audio_metadata(&path)?;
        assert_eq!(extract_audio_metadata(&path).get("ID3"), Some(NO_AUDIO_TAGS));
        Ok(())
    }

    #[test]
    fn unreadable_audio_fails() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("roto.flac");
        std::fs::write(&path, b"no es flac")?;
        assert!(remove_audio_metadata(&path).is_err());
        Ok(())
    }
}
