//! Provenance CLI - JSON bridge to the studio dashboard
//!
//! Commands: list, generate, edition, validate, code, certificate, letter
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation or generation failure

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use provenance_core::{
    generate_code_from_parts, ArtworkStore, DocumentKind, DocumentSettings, EditionKind,
    HtmlFilePrinter, PrintDispatcher, ProvenancePipeline, StderrNotifier, SystemClock,
};

#[derive(Parser)]
#[command(name = "provenance-cli")]
#[command(about = "Provenance CLI - traceability codes, certificates and letters")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog JSON file (built-in seed catalog when omitted)
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    /// Document settings JSON file
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List artworks in catalog order
    List,

    /// Generate traceability codes
    Generate {
        /// Artwork id (all pending artworks when omitted)
        #[arg(short, long)]
        id: Option<u32>,

        /// Replace codes that are already stored
        #[arg(long)]
        regenerate: bool,

        /// Write the updated catalog back to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Show the edition label of an artwork
    Edition {
        #[arg(short, long)]
        id: u32,
    },

    /// Run data-quality checks
    Validate {
        /// Artwork id (every artwork when omitted)
        #[arg(short, long)]
        id: Option<u32>,
    },

    /// Compute a code from raw fields
    Code {
        #[arg(short, long)]
        id: u32,

        /// Certification date, YYYY-MM-DD or YYYY-MM
        #[arg(short, long)]
        date: String,

        #[arg(long, requires = "total")]
        index: Option<u32>,

        #[arg(long, requires = "index")]
        total: Option<u32>,

        /// Open edition (takes precedence over index/total)
        #[arg(long)]
        open: bool,
    },

    /// Render a certificate of authenticity
    Certificate(RenderArgs),

    /// Render a letter
    Letter(RenderArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    #[arg(short, long)]
    id: u32,

    /// Write the document to this file instead of embedding it in the output
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Send the document to print through the browser
    #[arg(long)]
    print: bool,

    /// Directory for printed documents
    #[arg(long, default_value = "printed")]
    print_dir: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Code { id, date, index, total, open } => code_command(id, &date, index, total, open),
        command => match load_pipeline(cli.catalog.as_deref(), cli.settings.as_deref()) {
            Ok(pipeline) => run(command, pipeline),
            Err(e) => fail(&e.to_string()),
        },
    }
}

fn code_command(id: u32, date: &str, index: Option<u32>, total: Option<u32>, open: bool) -> ExitCode {
    let (edition, _) = EditionKind::from_fields(index, total, open);
    match generate_code_from_parts(id, date, &edition) {
        Ok(code) => emit(&serde_json::json!({ "success": true, "code": code }), ExitCode::SUCCESS),
        Err(e) => emit(&serde_json::json!({ "success": false, "error": e.to_string() }), ExitCode::from(2)),
    }
}

fn run(command: Commands, mut pipeline: ProvenancePipeline) -> ExitCode {
    match command {
        Commands::List => {
            let artworks: Vec<_> = pipeline
                .list_artworks()
                .iter()
                .map(|a| serde_json::json!({
                    "id": a.id(),
                    "title": a.title(),
                    "certificationDate": a.certification_date(),
                    "edition": a.edition(),
                    "code": a.code(),
                    "status": a.status(),
                }))
                .collect();
            emit(&artworks, ExitCode::SUCCESS)
        }

        Commands::Generate { id, regenerate, save } => {
            let (output, failed) = match id {
                Some(id) => {
                    let result = if regenerate { pipeline.regenerate_code(id) } else { pipeline.generate_code(id) };
                    match result {
                        Ok(code) => (serde_json::json!({ "success": true, "artworkId": id, "code": code }), false),
                        Err(e) => (serde_json::json!({ "success": false, "artworkId": id, "error": e.to_string() }), true),
                    }
                }
                None => {
                    let report = if regenerate { pipeline.regenerate_all() } else { pipeline.generate_pending() };
                    let failed = !report.failed.is_empty();
                    (serde_json::json!({ "success": !failed, "report": report }), failed)
                }
            };

            if let Some(path) = save {
                if let Err(e) = pipeline.store().save_to_file(&path) {
                    return fail(&e.to_string());
                }
                tracing::info!(path = %path.display(), "catalog saved");
            }

            emit(&output, if failed { ExitCode::from(2) } else { ExitCode::SUCCESS })
        }

        Commands::Edition { id } => match pipeline.describe_edition(id) {
            Ok(label) => emit(&serde_json::json!({ "artworkId": id, "edition": label }), ExitCode::SUCCESS),
            Err(e) => emit(&serde_json::json!({ "error": e.to_string() }), ExitCode::FAILURE),
        },

        Commands::Validate { id } => {
            let ids: Vec<u32> = match id {
                Some(id) => vec![id],
                None => pipeline.list_artworks().iter().map(|a| a.id()).collect(),
            };
            let mut results = Vec::with_capacity(ids.len());
            for id in ids {
                match pipeline.validate_artwork(id) {
                    Ok(r) => results.push(r),
                    Err(e) => return emit(&serde_json::json!({ "valid": false, "error": e.to_string() }), ExitCode::FAILURE),
                }
            }
            let valid = results.iter().all(|r| r.valid);
            emit(&results, if valid { ExitCode::SUCCESS } else { ExitCode::from(2) })
        }

        Commands::Certificate(args) => render_command(&pipeline, DocumentKind::Certificate, args),
        Commands::Letter(args) => render_command(&pipeline, DocumentKind::Letter, args),

        Commands::Code { id, date, index, total, open } => code_command(id, &date, index, total, open),
    }
}

fn load_pipeline(catalog: Option<&Path>, settings: Option<&Path>) -> Result<ProvenancePipeline, String> {
    let clock = SystemClock;
    let store = match catalog {
        Some(path) => ArtworkStore::load_from_file(path, &clock),
        None => ArtworkStore::seeded(&clock),
    }
    .map_err(|e| e.to_string())?;

    let settings = match settings {
        Some(path) => DocumentSettings::load_from_file(path).map_err(|e| e.to_string())?,
        None => DocumentSettings::default(),
    };

    Ok(ProvenancePipeline::new(store, settings))
}

fn render_command(pipeline: &ProvenancePipeline, kind: DocumentKind, args: RenderArgs) -> ExitCode {
    let document = match pipeline.render_document(args.id, kind) {
        Ok(d) => d,
        Err(e) => return emit(&serde_json::json!({ "success": false, "error": e.to_string() }), ExitCode::FAILURE),
    };

    let mut output = serde_json::json!({
        "success": true,
        "kind": document.kind,
        "artworkId": document.artwork_id,
        "title": document.title,
        "documentHash": document.document_hash,
        "renderKey": document.render_key,
    });

    match &args.out {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &document.markup) {
                return emit(&serde_json::json!({ "success": false, "error": e.to_string() }), ExitCode::FAILURE);
            }
            output["path"] = serde_json::json!(path.display().to_string());
        }
        None if !args.print => output["markup"] = serde_json::json!(document.markup),
        None => {}
    }

    if args.print {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
            Ok(rt) => rt,
            Err(e) => return emit(&serde_json::json!({ "success": false, "error": e.to_string() }), ExitCode::FAILURE),
        };
        let printer = HtmlFilePrinter::new(&args.print_dir).open_in_browser(true);
        let dispatcher = PrintDispatcher::new(Arc::new(printer), Arc::new(StderrNotifier));
        let outcome = runtime.block_on(dispatcher.dispatch(&document.markup, &document.title));
        output["print"] = serde_json::json!(outcome);
    }

    emit(&output, ExitCode::SUCCESS)
}

fn emit<T: serde::Serialize>(value: &T, code: ExitCode) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            code
        }
        Err(e) => fail(&format!("Failed to serialize output: {}", e)),
    }
}

/// Errors that stop the command go to stderr as a JSON object
fn fail(error: &str) -> ExitCode {
    eprintln!("{}", error_json(error));
    ExitCode::FAILURE
}

fn error_json(error: &str) -> serde_json::Value {
    serde_json::json!({ "error": error })
}
