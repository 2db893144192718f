//! Tipo MIME deducido del contenido y su coherencia con la extensión.

use infer::Infer;
use std::path::Path;

use crate::family::lowercase_extension;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MimeGuess {
    pub mime: String,
    /// `false` cuando la firma del contenido contradice la extensión.
    pub matches_extension: bool,
}

/// Inspecciona la firma del archivo; `None` si no se reconoce.
pub fn sniff_mime(path: &Path) -> Option<MimeGuess> {
    let kind = Infer::new().get_from_path(path).ok().flatten()?;
    let extension = lowercase_extension(path);
    let matches_extension = kind.extension() == extension
        || equivalent_extensions(kind.extension()).contains(&extension.as_str());

    Some(MimeGuess {
        mime: kind.mime_type().to_string(),
        matches_extension,
    })
}

fn equivalent_extensions(sniffed: &str) -> &'static [&'static str] {
    match sniffed {
        "jpg" => &["jpeg", "jpe"],
        "tif" => &["tiff"],
        "mov" => &["qt"],
        // Los paquetes Office se reconocen a veces solo como ZIP.
        "zip" => &["docx", "pptx", "xlsx"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renamed_png_is_flagged() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pixel.jpg");
        image::RgbImage::new(1, 1).save_with_format(&path, image::ImageFormat::Png)?;

        let guess = sniff_mime(&path).ok_or("sin firma")?;
        assert_eq!(guess.mime, "image/png");
        assert!(!guess.matches_extension);
        Ok(())
    }

    #[test]
    fn jpeg_alias_matches() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("foto.JPEG");
        image::RgbImage::new(2, 2).save_with_format(&path, image::ImageFormat::Jpeg)?;

        assert_eq!(
            sniff_mime(&path).map(|guess| guess.matches_extension),
            Some(true)
        );
        Ok(())
    }

    #[test]
    fn plain_text_has_no_signature() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("notas.txt");
        std::fs::write(&path, "hola")?;
        assert!(sniff_mime(&path).is_none());
        Ok(())
    }
}
