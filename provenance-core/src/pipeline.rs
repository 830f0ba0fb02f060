//! Provenance Pipeline - Single Entry Point
//!
//! Code generation always runs validation first. No bypass.
//! Field edits go through here so a stored code never goes stale.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::artwork::{Artwork, ArtworkId, ArtworkStore, EditionKind};
use crate::clock::{Clock, SystemClock};
use crate::edition::describe_edition;
use crate::hashing::{compute_document_hash, compute_render_key};
use crate::print::{PrintDispatcher, PrintOutcome};
use crate::render::{document_title, render, DocumentKind};
use crate::settings::DocumentSettings;
use crate::validation::{ValidationResult, Validator};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Artwork not found: {0}")]
    ArtworkNotFound(ArtworkId),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub kind: DocumentKind,
    pub artwork_id: ArtworkId,
    pub title: String,
    pub rendered_on: NaiveDate,
    pub document_hash: String,
    pub render_key: String,
    pub markup: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCode {
    pub artwork_id: ArtworkId,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedGeneration {
    pub artwork_id: ArtworkId,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub generated: Vec<GeneratedCode>,
    pub failed: Vec<FailedGeneration>,
}

/// Owns the session's artworks, settings and clock
pub struct ProvenancePipeline {
    store: ArtworkStore,
    settings: DocumentSettings,
    validator: Validator,
    clock: Arc<dyn Clock>,
}

impl ProvenancePipeline {
    pub fn new(store: ArtworkStore, settings: DocumentSettings) -> Self {
        Self {
            store,
            settings,
            validator: Validator::new(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn store(&self) -> &ArtworkStore {
        &self.store
    }

    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: DocumentSettings) {
        self.settings = settings;
    }

    /// List all artworks in catalog order
    pub fn list_artworks(&self) -> &[Artwork] {
        self.store.list()
    }

    pub fn get_artwork(&self, id: ArtworkId) -> Result<&Artwork, PipelineError> {
        self.store.get(id).ok_or(PipelineError::ArtworkNotFound(id))
    }

    /// Validate an artwork against the data-quality rules
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_artwork(&self, id: ArtworkId) -> Result<ValidationResult, PipelineError> {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        let artwork = self.get_artwork(id)?;
        Ok(self.validator.validate(artwork, self.clock.today()))
    }

    /// Generate the code for an artwork, or return the one already stored.
    ///
    /// A stored code is only returned if the record still validates.
    pub fn generate_code(&mut self, id: ArtworkId) -> Result<String, PipelineError> {
        self.ensure_valid(id)?;
        let artwork = self.store.get_mut(id).ok_or(PipelineError::ArtworkNotFound(id))?;
        if let Some(code) = artwork.code() {
            return Ok(code.to_string());
        }
        let code = artwork.attach_code().to_string();
        tracing::debug!(artwork_id = id, code = %code, "traceability code generated");
        Ok(code)
    }

    /// Generate the code for an artwork even when one is stored.
    ///
    /// Always validates first. A blocked record keeps no code.
    pub fn regenerate_code(&mut self, id: ArtworkId) -> Result<String, PipelineError> {
        self.ensure_valid(id)?;
        let artwork = self.store.get_mut(id).ok_or(PipelineError::ArtworkNotFound(id))?;
        let code = artwork.attach_code().to_string();
        tracing::debug!(artwork_id = id, code = %code, "traceability code generated");
        Ok(code)
    }

    fn ensure_valid(&mut self, id: ArtworkId) -> Result<(), PipelineError> {
        let validation = self.validate_artwork(id)?;
        if !validation.valid {
            if let Some(artwork) = self.store.get_mut(id) {
                artwork.clear_code();
            }
            return Err(PipelineError::ValidationFailed(validation.summary()));
        }
        for v in &validation.violations {
            tracing::debug!(artwork_id = id, rule = %v.rule, message = %v.message, "validation note");
        }
        Ok(())
    }

    /// Generate codes for every artwork still pending
    pub fn generate_pending(&mut self) -> GenerationReport {
        self.generate_where(|a| a.code().is_none(), false)
    }

    /// Regenerate codes for every artwork
    pub fn regenerate_all(&mut self) -> GenerationReport {
        self.generate_where(|_| true, true)
    }

    fn generate_where(&mut self, select: impl Fn(&Artwork) -> bool, force: bool) -> GenerationReport {
        let ids: Vec<ArtworkId> = self.store.list().iter().filter(|a| select(*a)).map(|a| a.id()).collect();

        let mut report = GenerationReport::default();
        for id in ids {
            let result = if force { self.regenerate_code(id) } else { self.generate_code(id) };
            match result {
                Ok(code) => report.generated.push(GeneratedCode { artwork_id: id, code }),
                Err(e) => {
                    tracing::warn!(artwork_id = id, error = %e, "code generation refused");
                    report.failed.push(FailedGeneration { artwork_id: id, error: e.to_string() });
                }
            }
        }
        report
    }

    pub fn set_certification_date(&mut self, id: ArtworkId, date: NaiveDate) -> Result<bool, PipelineError> {
        let artwork = self.store.get_mut(id).ok_or(PipelineError::ArtworkNotFound(id))?;
        let changed = artwork.set_certification_date(date);
        if changed {
            tracing::debug!(artwork_id = id, %date, "certification date changed, code cleared");
        }
        Ok(changed)
    }

    pub fn set_edition(&mut self, id: ArtworkId, edition: EditionKind) -> Result<bool, PipelineError> {
        let artwork = self.store.get_mut(id).ok_or(PipelineError::ArtworkNotFound(id))?;
        let changed = artwork.set_edition(edition);
        if changed {
            tracing::debug!(artwork_id = id, edition = ?edition, "edition changed, code cleared");
        }
        Ok(changed)
    }

    pub fn describe_edition(&self, id: ArtworkId) -> Result<String, PipelineError> {
        Ok(describe_edition(self.get_artwork(id)?))
    }

    /// Render a provenance document. A missing code is rendered as a
    /// blank to fill in, not refused.
    pub fn render_document(&self, id: ArtworkId, kind: DocumentKind) -> Result<RenderedDocument, PipelineError> {
        let artwork = self.get_artwork(id)?;
        if artwork.code().is_none() {
            tracing::warn!(artwork_id = id, kind = ?kind, "rendering document without a traceability code");
        }

        let markup = render(kind, artwork, &self.settings, self.clock.as_ref());
        Ok(RenderedDocument {
            kind,
            artwork_id: id,
            title: document_title(kind, artwork),
            rendered_on: self.clock.today(),
            document_hash: compute_document_hash(&markup),
            render_key: compute_render_key(kind, artwork, &self.settings, ENGINE_VERSION)?,
            markup,
        })
    }

    /// Render and send a document to print
    pub async fn print_document(
        &self,
        id: ArtworkId,
        kind: DocumentKind,
        dispatcher: &PrintDispatcher,
    ) -> Result<PrintOutcome, PipelineError> {
        let document = self.render_document(id, kind)?;
        Ok(dispatcher.dispatch(&document.markup, &document.title).await)
    }
}
