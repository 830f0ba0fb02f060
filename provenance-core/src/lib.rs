//! Provenance Core - traceability codes and provenance documents
//!
//! # Ground Rules
//! 1. A stored code is always the generator's output for the current fields
//! 2. Generation validates first
//! 3. Rendering never fails on a missing code
//! 4. Documents are standalone HTML
//! 5. Settings are passed in, never read from ambient state
//! 6. Printing is a port; the core stays pure

pub mod artwork;
pub mod clock;
pub mod code;
pub mod edition;
pub mod hashing;
pub mod pipeline;
pub mod print;
pub mod render;
pub mod settings;
pub mod validation;

pub use artwork::{Artwork, ArtworkId, ArtworkStore, CatalogEntry, CatalogError, CertificationStatus, EditionKind};
pub use clock::{Clock, FixedClock, SystemClock};
pub use code::{generate_code, generate_code_from_parts, parse_certification_date, CodeError};
pub use edition::describe_edition;
pub use hashing::{canonical_json, compute_document_hash, compute_render_key};
pub use pipeline::{GenerationReport, PipelineError, ProvenancePipeline, RenderedDocument};
pub use print::{HtmlFilePrinter, Notifier, PrintDispatcher, PrintError, PrintOutcome, PrintSurface, Printer, StderrNotifier};
pub use render::{render_certificate, render_letter, DocumentKind};
pub use settings::{DocumentSettings, SettingsError};
pub use validation::{FailureMode, ValidationResult, ValidationRule, ValidationViolation, Validator, ViolationSeverity};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
