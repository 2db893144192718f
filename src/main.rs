mod ui;

use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use metastrip::config::{Language, Preferences};
use metastrip::metadata::export::{export_metadata, parse_export_format};
use metastrip::{ExtractOptions, MetadataMapping, extract, extract_with, remove, save};

#[derive(Parser)]
#[command(name = "metastrip", version, about = "Inspecciona, limpia y edita metadata de archivos")]
struct Cli {
    /// Archivo de preferencias alternativo.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Muestra toda la metadata del archivo.
    Show {
        path: PathBuf,
        /// Salida JSON en lugar de texto.
        #[arg(long)]
        json: bool,
        /// Incluye MD5 y SHA-256.
        #[arg(long)]
        hash: bool,
    },
    /// Elimina la metadata del archivo.
    Strip { path: PathBuf },
    /// Edita campos con pares `CLAVE=VALOR` (p. ej. `EXIF:Orientation=3`).
    Set {
        path: PathBuf,
        #[arg(required = true, value_parser = parse_pair)]
        pairs: Vec<(String, String)>,
    },
    /// Exporta la metadata a json, txt, csv o xlsx.
    Export {
        path: PathBuf,
        #[arg(long, short)]
        format: String,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Muestra o guarda el idioma de la interfaz (es, en, hu).
    Lang { code: Option<String> },
}

fn parse_pair(input: &str) -> Result<(String, String), String> {
    input
        .split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("Se esperaba CLAVE=VALOR: `{input}`"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("{}", style(message).red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    let preferences_path = match cli.config {
        Some(path) => path,
        None => Preferences::default_path().map_err(|e| e.to_string())?,
    };
    let preferences = Preferences::load_or_default(&preferences_path);
    debug!(language = preferences.language.code(), "preferencias cargadas");
    let texts = ui::texts(preferences.language);

    match cli.command {
        Command::Show { path, json, hash } => {
            let mapping = extract_with(&path, ExtractOptions { include_hash: hash });
            if json {
                let output = serde_json::to_string_pretty(&mapping).map_err(|e| e.to_string())?;
                println!("{output}");
            } else {
                ui::render_header(&texts);
                ui::render_mapping(&mapping, &texts);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Strip { path } => {
            let outcome = remove(&path);
            ui::render_outcome(&outcome, &texts);
            Ok(exit_code(outcome.success))
        }
        Command::Set { path, pairs } => {
            let mut edited: MetadataMapping = extract(&path);
            for (key, value) in pairs {
                edited.insert(key, value);
            }
            let outcome = save(&path, &edited);
            ui::render_outcome(&outcome, &texts);
            Ok(exit_code(outcome.success))
        }
        Command::Export {
            path,
            format,
            output,
        } => {
            let format = parse_export_format(&format).map_err(|e| e.to_string())?;
            let mapping = extract(&path);
            export_metadata(&mapping, format, &output).map_err(|e| e.to_string())?;
            ui::print_property(format.label(), &output.display().to_string());
            Ok(ExitCode::SUCCESS)
        }
        Command::Lang { code } => {
            let language = match code {
                Some(code) => {
                    let language = Language::parse(&code).map_err(|e| e.to_string())?;
                    Preferences { language }
                        .save(&preferences_path)
                        .map_err(|e| e.to_string())?;
                    language
                }
                None => preferences.language,
            };
            ui::render_language(language, &ui::texts(language));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
