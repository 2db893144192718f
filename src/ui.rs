//! Presentación en consola: encabezado, propiedades agrupadas y resultados.

use console::style;

use metastrip::config::Language;
use metastrip::metadata::mapping::split_key;
use metastrip::{MetadataMapping, Namespace, Outcome};

const HEADER_WIDTH: usize = 74;

/// Textos fijos de la interfaz por idioma.
pub struct Texts {
    pub title: &'static str,
    pub general: &'static str,
    pub success: &'static str,
    pub failure: &'static str,
    pub language: &'static str,
}

pub fn texts(language: Language) -> Texts {
    match language {
        Language::Es => Texts {
            title: "MetaStrip · Inspector y limpiador de metadata",
            general: "General",
            success: "Operación completada",
            failure: "La operación falló",
            language: "Idioma actual",
        },
        Language::En => Texts {
            title: "MetaStrip · Metadata inspector and cleaner",
            general: "General",
            success: "Operation completed",
            failure: "Operation failed",
            language: "Current language",
        },
        Language::Hu => Texts {
            title: "MetaStrip · Metaadat-vizsgáló és -tisztító",
            general: "Általános",
            success: "A művelet sikeres",
            failure: "A művelet sikertelen",
            language: "Jelenlegi nyelv",
        },
    }
}

pub fn render_header(texts: &Texts) {
    let border = "─".repeat(HEADER_WIDTH - 2);
    println!("\n{}", style(format!("┌{}┐", border)).cyan());
    println!(
        "{}",
        style(format!(
            "│ {:^inner_width$} │",
            texts.title,
            inner_width = HEADER_WIDTH - 4
        ))
        .cyan()
        .bold()
    );
    println!("{}\n", style(format!("└{}┘", border)).cyan());
}

/// Imprime una propiedad con el estilo consistente de MetaStrip.
pub fn print_property(label: &str, value: &str) {
    let label_styled = style(format!("  {}", label)).cyan().bold();
    let arrow = style("→").dim();
    println!("{} {} {}", label_styled, arrow, style(value).white());
}

/// Muestra el mapeo agrupado por espacio de nombres, en orden de aparición.
pub fn render_mapping(mapping: &MetadataMapping, texts: &Texts) {
    let mut current: Option<String> = None;

    for (key, value) in mapping.iter() {
        let (section, label) = match split_key(key) {
            Some((namespace, label)) => (namespace.prefix().to_string(), Some(label)),
            None if Namespace::from_prefix(key).is_some() => (key.to_string(), None),
            None => (texts.general.to_string(), Some(key)),
        };

        if current.as_deref() != Some(section.as_str()) {
            println!("\n{}", style(format!("┌─ {} ─", section)).cyan().bold());
            current = Some(section);
        }

        match label {
            Some(label) => print_property(label, value),
            // Centinela: la familia se revisó y no tiene datos.
            None => println!("  {}", style(value).yellow()),
        }
    }
    println!();
}

pub fn render_outcome(outcome: &Outcome, texts: &Texts) {
    if outcome.success {
        println!("\n{}", style(format!("┌─ {} ─", texts.success)).green());
        println!("{}", style(format!("│ {}", outcome.message)).green());
        println!("{}", style("└─").green());
    } else {
        eprintln!("\n{}", style(format!("┌─ {} ─", texts.failure)).red());
        eprintln!("{}", style(format!("│ {}", outcome.message)).red());
        eprintln!("{}", style("└─").red());
    }
}

pub fn render_language(language: Language, texts: &Texts) {
    print_property(texts.language, language.code());
}
