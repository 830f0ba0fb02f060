//! Document Settings - artist identity and letter phrasing

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read-only inputs to the document renderer. Missing keys in a settings
/// file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentSettings {
    pub artist_name: String,
    pub artist_title: String,
    pub cycle_name: String,
    pub city: String,
    pub letter_opening: String,
    pub letter_closing: String,
    pub website: String,
    pub email: String,
    pub social_handle: String,
    /// Path or URL of the artist mark shown at the top of each document
    pub logo: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            artist_name: "Nombre del Artista".to_string(),
            artist_title: "Artista Visual".to_string(),
            cycle_name: "Ciclo de Exposiciones".to_string(),
            city: "Madrid".to_string(),
            letter_opening: "Estimado coleccionista:".to_string(),
            letter_closing: "Quedo a su disposición para cualquier consulta sobre la obra o su conservación."
                .to_string(),
            website: "www.example.com".to_string(),
            email: "estudio@example.com".to_string(),
            social_handle: "@estudio".to_string(),
            logo: "/logo.png".to_string(),
        }
    }
}

impl DocumentSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
