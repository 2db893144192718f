//! Huellas MD5 y SHA-256 del contenido, bajo demanda.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::{File, Metadata};
use std::io::{self, BufReader, Write};
use std::path::Path;

/// Por encima de este tamaño no se calcula ninguna huella.
const HASH_SIZE_LIMIT: u64 = 32 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fingerprint {
    Computed { md5: String, sha256: String },
    Skipped(String),
}

impl Fingerprint {
    /// Par `(md5, sha256)`; si se omitió, ambos llevan el motivo.
    pub fn into_pair(self) -> (String, String) {
        match self {
            Fingerprint::Computed { md5, sha256 } => (md5, sha256),
            Fingerprint::Skipped(reason) => (reason.clone(), reason),
        }
    }
}

/// Alimenta ambos digestores en una sola lectura.
struct DualDigest {
    md5: Md5,
    sha256: Sha256,
}

impl Write for DualDigest {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Digest::update(&mut self.md5, buf);
        Digest::update(&mut self.sha256, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn fingerprint(path: &Path, metadata: &Metadata) -> Fingerprint {
    if !metadata.is_file() {
        return Fingerprint::Skipped("No aplica".to_string());
    }
    if metadata.len() > HASH_SIZE_LIMIT {
        return Fingerprint::Skipped(format!(
            "Omitido (> {} MiB)",
            HASH_SIZE_LIMIT / (1024 * 1024)
        ));
    }

    match digest_file(path) {
        Ok(fingerprint) => fingerprint,
        Err(error) => Fingerprint::Skipped(format!("No disponible ({error})")),
    }
}

fn digest_file(path: &Path) -> io::Result<Fingerprint> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut digest = DualDigest {
        md5: Md5::new(),
        sha256: Sha256::new(),
    };
    io::copy(&mut reader, &mut digest)?;

    Ok(Fingerprint::Computed {
        md5: format!("{:x}", digest.md5.finalize()),
        sha256: format!("{:x}", digest.sha256.finalize()),
    })
}
