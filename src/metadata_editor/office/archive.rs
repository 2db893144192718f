use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{EngineError, EngineResult};

pub(crate) type Package = ZipArchive<BufReader<File>>;

pub(crate) fn open_package(path: &Path) -> EngineResult<Package> {
    let file = File::open(path).map_err(|e| EngineError::io(path, e))?;
    Ok(ZipArchive::new(BufReader::new(file))?)
}

/// Contenido de una parte del paquete, o `None` si no existe.
pub(crate) fn read_part(archive: &mut Package, name: &str) -> EngineResult<Option<Vec<u8>>> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(error) => return Err(error.into()),
    };
    let mut contents = Vec::new();
    part.read_to_end(&mut contents)
        .map_err(|e| EngineError::Other(format!("Error leyendo {}: {}", name, e)))?;
    Ok(Some(contents))
}

/// Reescribe un paquete Office aplicando una transformación por parte.
///
/// Las partes no modificadas conservan sus bytes, compresión, permisos y fecha.
/// Devuelve si alguna parte cambió.
pub(crate) fn rewrite_package<F>(path: &Path, output_path: &Path, mut transform: F) -> EngineResult<bool>
where
    F: FnMut(&str, Vec<u8>) -> EngineResult<(Vec<u8>, bool)>,
{
    let mut archive = open_package(path)?;

    let target_file = File::create(output_path).map_err(|e| EngineError::io(output_path, e))?;
    let mut writer = ZipWriter::new(target_file);

    let mut modified_any = false;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();

        let mut options = SimpleFileOptions::default().compression_method(file.compression());
        if let Some(mode) = file.unix_mode() {
            options = options.unix_permissions(mode);
        }
        if let Some(time) = file.last_modified() {
            options = options.last_modified_time(time);
        }

        if file.is_dir() {
            writer.add_directory(name, options)?;
            continue;
        }

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| EngineError::Other(format!("Error leyendo {}: {}", name, e)))?;

        let (data_to_write, changed) = transform(&name, contents)?;
        modified_any |= changed;

        writer.start_file(name.as_str(), options)?;
        writer
            .write_all(&data_to_write)
            .map_err(|e| EngineError::io(output_path, e))?;
    }

    writer.finish()?;

    Ok(modified_any)
}
