//! Document Fingerprints - SHA-256 over markup and render inputs
//!
//! Two renders with the same inputs and the same date must hash the same.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

use crate::artwork::Artwork;
use crate::render::DocumentKind;
use crate::settings::DocumentSettings;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// Digest of a rendered document
pub fn compute_document_hash(markup: &str) -> String {
    sha256_hex(markup.as_bytes())
}

/// Digest of everything a render depends on except the current date.
/// render_key = sha256(kind + canonical artwork + canonical settings + engine version)
pub fn compute_render_key(
    kind: DocumentKind,
    artwork: &Artwork,
    settings: &DocumentSettings,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let combined = format!(
        "{}:{}:{}:{}",
        canonical_json(&kind)?,
        canonical_json(artwork)?,
        canonical_json(settings)?,
        engine_version
    );
    Ok(sha256_hex(combined.as_bytes()))
}
