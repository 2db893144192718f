//! Modelo compartido para representar metadata como pares clave/valor con espacio de nombres.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clave sin espacio de nombres para errores de extracción.
pub const ERROR_KEY: &str = "Error";
/// Clave sin espacio de nombres para extensiones no soportadas.
pub const UNSUPPORTED_KEY: &str = "Extensión no soportada";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    File,
    Exif,
    Id3,
    Pdf,
    Docx,
    Pptx,
    Xlsx,
    Video,
}

impl Namespace {
    pub const ALL: [Namespace; 8] = [
        Namespace::File,
        Namespace::Exif,
        Namespace::Id3,
        Namespace::Pdf,
        Namespace::Docx,
        Namespace::Pptx,
        Namespace::Xlsx,
        Namespace::Video,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::File => "FILE",
            Namespace::Exif => "EXIF",
            Namespace::Id3 => "ID3",
            Namespace::Pdf => "PDF",
            Namespace::Docx => "DOCX",
            Namespace::Pptx => "PPTX",
            Namespace::Xlsx => "XLSX",
            Namespace::Video => "VIDEO",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.prefix() == prefix)
    }

    /// Construye la clave completa `<NAMESPACE>:<label>`.
    pub fn key(self, label: &str) -> String {
        format!("{}:{}", self.prefix(), label)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Divide una clave en su espacio de nombres y su etiqueta.
///
/// Las claves centinela (sin `:`) devuelven `None`.
pub fn split_key(key: &str) -> Option<(Namespace, &str)> {
    let (prefix, label) = key.split_once(':')?;
    Namespace::from_prefix(prefix).map(|ns| (ns, label))
}

/// Colección ordenada de metadata con claves únicas.
///
/// Conserva el orden de inserción para la presentación; insertar una clave
/// existente sustituye su valor sin moverla.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataMapping {
    entries: IndexMap<String, String>,
}

impl MetadataMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Inserta `<ns>:<label>`.
    pub fn push(&mut self, namespace: Namespace, label: &str, value: impl Into<String>) {
        self.insert(namespace.key(label), value);
    }

    /// Inserta solo si la clave aún no existe. Devuelve si se insertó.
    pub fn insert_new(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    /// Mapeo de un solo par, usado para errores y centinelas.
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut mapping = Self::new();
        mapping.insert(key, value);
        mapping
    }

    /// Centinela "revisado, sin datos" de una familia (clave = espacio de nombres).
    pub fn sentinel(namespace: Namespace, message: impl Into<String>) -> Self {
        Self::single(namespace.prefix(), message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::single(ERROR_KEY, message)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pares `(etiqueta, valor)` pertenecientes a un espacio de nombres.
    pub fn namespace_entries(&self, namespace: Namespace) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter_map(move |(key, value)| match split_key(key) {
            Some((ns, label)) if ns == namespace => Some((label, value)),
            _ => None,
        })
    }

    pub fn has_namespace(&self, namespace: Namespace) -> bool {
        self.namespace_entries(namespace).next().is_some()
    }

    /// Añade las entradas de `other` al final; las claves repetidas conservan su posición.
    pub fn merge(&mut self, other: MetadataMapping) {
        for (key, value) in other.entries {
            self.entries.insert(key, value);
        }
    }
}

impl FromIterator<(String, String)> for MetadataMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MetadataMapping {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
