//! Etiquetas de audio (ID3, Vorbis, RIFF INFO...) aplanadas bajo `ID3`.

use indexmap::IndexMap;
use lofty::file::TaggedFileExt;
use lofty::tag::{ItemKey, ItemValue, Tag};
use std::path::Path;
use tracing::debug;

use crate::metadata::mapping::{MetadataMapping, Namespace};

pub const AUDIO_UNREADABLE: &str = "No se pudieron leer las etiquetas de audio";
pub const NO_AUDIO_TAGS: &str = "Sin etiquetas de audio";

/// Separador para claves con varios valores.
const MULTI_VALUE_SEPARATOR: &str = "; ";

pub fn extract_audio_metadata(path: &Path) -> MetadataMapping {
    let tagged = match lofty::read_from_path(path) {
        Ok(tagged) => tagged,
        Err(error) => {
            debug!(path = %path.display(), %error, "audio no legible");
            return MetadataMapping::sentinel(Namespace::Id3, AUDIO_UNREADABLE);
        }
    };

    // La etiqueta principal primero; en claves repetidas entre etiquetas gana la primera.
    let mut ordered: Vec<&Tag> = Vec::new();
    if let Some(primary) = tagged.primary_tag() {
        ordered.push(primary);
    }
    ordered.extend(
        tagged
            .tags()
            .iter()
            .filter(|tag| tag.tag_type() != tagged.primary_tag_type()),
    );

    let mut collected: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut owners: IndexMap<String, usize> = IndexMap::new();
    for (index, tag) in ordered.into_iter().enumerate() {
        for item in tag.items() {
            let Some(value) = item_text(item.value()) else {
                continue;
            };
            let label = native_key(item.key(), tag);
            let owner = *owners.entry(label.clone()).or_insert(index);
            if owner == index {
                collected.entry(label).or_default().push(value);
            }
        }
    }

    if collected.is_empty() {
        return MetadataMapping::sentinel(Namespace::Id3, NO_AUDIO_TAGS);
    }

    let mut mapping = MetadataMapping::new();
    for (label, values) in collected {
        mapping.push(Namespace::Id3, &label, values.join(MULTI_VALUE_SEPARATOR));
    }
    mapping
}

/// Clave nativa del formato (p. ej. `TIT2` en ID3v2, `TITLE` en Vorbis).
pub(crate) fn native_key(key: &ItemKey, tag: &Tag) -> String {
    key.map_key(tag.tag_type(), true)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{key:?}"))
}

fn item_text(value: &ItemValue) -> Option<String> {
    match value {
        ItemValue::Text(text) | ItemValue::Locator(text) => Some(text.trim().to_string()),
        ItemValue::Binary(_) => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// WAV PCM mono de 8 bits con unas pocas muestras de silencio.
    pub(crate) fn sample_wav(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let samples = [0x80_u8; 800];
        let sample_rate: u32 = 8000;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + samples.len() as u32).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16_u32.to_le_bytes());
        bytes.extend_from_slice(&1_u16.to_le_bytes());
        bytes.extend_from_slice(&1_u16.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&1_u16.to_le_bytes());
        bytes.extend_from_slice(&8_u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&(samples.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&samples);
        std::fs::write(path, bytes)?;
        Ok(())
    }

    #[test]
    fn untagged_audio_yields_no_tags_sentinel() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("silencio.wav");
        sample_wav(&path)?;

        let mapping = extract_audio_metadata(&path);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("ID3"), Some(NO_AUDIO_TAGS));
        Ok(())
    }

    #[test]
    fn unreadable_audio_yields_sentinel() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("roto.mp3");
        std::fs::write(&path, b"definitivamente no es audio")?;

        let mapping = extract_audio_metadata(&path);
        assert_eq!(mapping.get("ID3"), Some(AUDIO_UNREADABLE));
        Ok(())
    }

    #[test]
    fn native_keys_follow_the_tag_format() {
        use lofty::tag::TagType;

        let id3 = Tag::new(TagType::Id3v2);
        let vorbis = Tag::new(TagType::VorbisComments);
        assert_eq!(native_key(&ItemKey::TrackTitle, &id3), "TIT2");
        assert_eq!(native_key(&ItemKey::TrackTitle, &vorbis), "TITLE");
    }
}
