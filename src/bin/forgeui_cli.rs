//! ForgeUI CLI - Catalog inspection and rendering
//!
//! Commands: list, render, check
//! Outputs JSON (or HTML for `render --format html`) to stdout
//! Returns non-zero on render failure, 2 when `check` finds problems

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use forgeui_core::{
    document_fingerprint, ComponentRegistry, LayoutCatalog, PropSchemaTable, RenderError,
    RenderOptions, Renderer, StyleHost,
};

#[derive(Parser)]
#[command(name = "forgeui-cli")]
#[command(about = "ForgeUI CLI - Declarative Layout Renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to layout catalog directory
    #[arg(short, long, default_value = "catalog")]
    catalog_dir: PathBuf,

    /// Prop schema table (JSON); defaults to the built-in table
    #[arg(short, long)]
    schemas: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List layout documents in the catalog
    List,

    /// Render a layout document
    Render {
        /// Layout id
        #[arg(short, long)]
        id: String,

        /// Wrap the output with a view-source affordance
        #[arg(long)]
        show_source: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Render a layout document and report diagnostics
    Check {
        /// Layout id
        #[arg(short, long)]
        id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Html,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let catalog = match LayoutCatalog::load_from_dir(&cli.catalog_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", error_json(&format!("Failed to load catalog: {}", e)));
            return ExitCode::FAILURE;
        }
    };

    let schemas = match &cli.schemas {
        Some(path) => match PropSchemaTable::load_from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}", error_json(&e.to_string()));
                return ExitCode::FAILURE;
            }
        },
        None => PropSchemaTable::builtin(),
    };

    let renderer = Renderer::new(ComponentRegistry::builtin(), schemas);

    match cli.command {
        Commands::List => {
            let documents: Vec<_> = catalog
                .list()
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "id": d.id,
                        "title": d.title,
                        "description": d.description,
                        "fingerprint": document_fingerprint(d).ok(),
                    })
                })
                .collect();

            print_json(&serde_json::Value::Array(documents));
            ExitCode::SUCCESS
        }

        Commands::Render { id, show_source, format } => {
            let options = RenderOptions {
                show_source,
                ..RenderOptions::default()
            };

            let result = catalog
                .get(&id)
                .ok_or_else(|| RenderError::DocumentNotFound(id.clone()))
                .and_then(|document| match format {
                    OutputFormat::Json => {
                        let manifest = renderer.render_manifest(document, &options)?;
                        Ok(serde_json::to_string_pretty(&serde_json::json!({
                            "success": true,
                            "manifest": manifest,
                        }))?)
                    }
                    OutputFormat::Html => {
                        let host = StyleHost::new();
                        let mounted = renderer.mount(document, &options, &host)?;
                        let body = mounted.tree().map(|t| t.to_html()).unwrap_or_default();
                        Ok(format!("{}{}", host.to_html(), body))
                    }
                });

            match result {
                Ok(output) => {
                    println!("{}", output);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    println!("{}", error_json(&e.to_string()));
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Check { id } => {
            let Some(document) = catalog.get(&id) else {
                println!("{}", error_json(&format!("Layout document not found: {}", id)));
                return ExitCode::FAILURE;
            };

            match renderer.render_with_diagnostics(document, &RenderOptions::default()) {
                Ok((_, diagnostics)) => {
                    let clean = diagnostics.is_empty();
                    print_json(&serde_json::json!({
                        "id": id,
                        "clean": clean,
                        "diagnostics": diagnostics,
                    }));
                    if clean {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(2)
                    }
                }
                Err(e) => {
                    println!("{}", error_json(&e.to_string()));
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "success": false, "error": message }).to_string()
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{}", error_json(&e.to_string())),
    }
}
