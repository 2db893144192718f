//! Diccionario Info y flujo XMP de documentos PDF.

use lopdf::{Dictionary, Document, Object};
use std::path::Path;
use tracing::{debug, info};

use crate::advanced_metadata::pdf::{encode_text_string, info_dictionary};
use crate::error::{EngineError, EngineResult};
use crate::metadata::mapping::{MetadataMapping, Namespace};
use crate::metadata_editor::utils::StagedFile;

/// Vacía el diccionario Info y desvincula el XMP del catálogo.
pub fn remove_pdf_metadata(path: &Path) -> EngineResult<String> {
    let mut doc = Document::load(path)?;
    replace_info(&mut doc, Dictionary::new());
    detach_xmp(&mut doc)?;

    let staged = StagedFile::new(path)?;
    write_document(&mut doc, staged.path())?;

    if !verify_pdf_metadata_clean(staged.path())? {
        return Err(EngineError::Other(
            "La verificación indicó que la metadata no se eliminó correctamente".to_string(),
        ));
    }
    staged.commit()?;

    info!(path = %path.display(), "metadata PDF eliminada");
    Ok("Metadata PDF eliminada".to_string())
}

/// Sustituye el diccionario Info por las entradas `PDF:*` del mapeo.
pub fn save_pdf_metadata(path: &Path, edited: &MetadataMapping) -> EngineResult<String> {
    let mut doc = Document::load(path)?;

    let mut info = Dictionary::new();
    for (key, value) in edited.namespace_entries(Namespace::Pdf) {
        let name = key.trim_start_matches('/');
        if name.is_empty() {
            continue;
        }
        info.set(name, encode_text_string(value));
    }
    let count = info.len();
    replace_info(&mut doc, info);

    let staged = StagedFile::new(path)?;
    write_document(&mut doc, staged.path())?;
    staged.commit()?;

    Ok(format!("Metadata PDF guardada ({} campos)", count))
}

fn replace_info(doc: &mut Document, info: Dictionary) {
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", Object::Reference(info_id));
}

fn detach_xmp(doc: &mut Document) -> EngineResult<()> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_object_mut(root_id)?.as_dict_mut()?;
    if catalog.remove(b"Metadata").is_some() {
        debug!("flujo XMP desvinculado del catálogo");
    }
    Ok(())
}

/// Guarda el documento sin los objetos que quedaron huérfanos.
fn write_document(doc: &mut Document, target: &Path) -> EngineResult<()> {
    doc.prune_objects();
    doc.save(target).map_err(|e| EngineError::io(target, e))?;
    Ok(())
}

fn verify_pdf_metadata_clean(path: &Path) -> EngineResult<bool> {
    let doc = Document::load(path)?;
    Ok(info_dictionary(&doc).is_none_or(Dictionary::is_empty))
}
