//! Artwork Records - catalog import and the in-memory store

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::clock::Clock;
use crate::code::{generate_code, parse_certification_date, CodeError};
use crate::validation::Validator;

pub type ArtworkId = u32;

/// Built-in catalog used when no catalog file is supplied
pub const SEED_CATALOG: &str = include_str!("../catalog/seed.json");

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditionKind {
    Unique,
    Limited { index: u32, total: u32 },
    Open,
}

impl EditionKind {
    /// Resolve the loose import fields into a variant.
    ///
    /// Returns the variant and whether the fields were inconsistent
    /// (exactly one of index/total present).
    pub fn from_fields(index: Option<u32>, total: Option<u32>, open_edition: bool) -> (Self, bool) {
        if open_edition {
            return (Self::Open, false);
        }
        match (index, total) {
            (Some(index), Some(total)) => (Self::Limited { index, total }, false),
            (None, None) => (Self::Unique, false),
            _ => (Self::Unique, true),
        }
    }
}

impl Default for EditionKind {
    fn default() -> Self {
        Self::Unique
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CertificationStatus {
    #[default]
    Pending,
    Generated,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    id: ArtworkId,
    title: String,
    dimensions: String,
    technique: String,
    image: String,
    original_index: usize,
    certification_date: NaiveDate,
    edition: EditionKind,
    code: Option<String>,
    status: CertificationStatus,
}

impl Artwork {
    pub fn new(
        id: ArtworkId,
        title: impl Into<String>,
        certification_date: NaiveDate,
        edition: EditionKind,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            dimensions: String::new(),
            technique: String::new(),
            image: String::new(),
            original_index: 0,
            certification_date,
            edition,
            code: None,
            status: CertificationStatus::Pending,
        }
    }

    pub fn with_details(
        mut self,
        dimensions: impl Into<String>,
        technique: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        self.dimensions = dimensions.into();
        self.technique = technique.into();
        self.image = image.into();
        self
    }

    pub fn with_original_index(mut self, original_index: usize) -> Self {
        self.original_index = original_index;
        self
    }

    pub fn id(&self) -> ArtworkId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn dimensions(&self) -> &str {
        &self.dimensions
    }

    pub fn technique(&self) -> &str {
        &self.technique
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    /// Position in the catalog display order
    pub fn original_index(&self) -> usize {
        self.original_index
    }

    pub fn certification_date(&self) -> NaiveDate {
        self.certification_date
    }

    pub fn edition(&self) -> &EditionKind {
        &self.edition
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn status(&self) -> CertificationStatus {
        self.status
    }

    /// Change the certification date. A stored code is cleared when the
    /// date actually changes.
    pub fn set_certification_date(&mut self, date: NaiveDate) -> bool {
        if self.certification_date == date {
            return false;
        }
        self.certification_date = date;
        self.clear_code();
        true
    }

    /// Change the edition. A stored code is cleared when the edition
    /// actually changes.
    pub fn set_edition(&mut self, edition: EditionKind) -> bool {
        if self.edition == edition {
            return false;
        }
        self.edition = edition;
        self.clear_code();
        true
    }

    /// Generate and store the code. Returns the stored value.
    pub fn attach_code(&mut self) -> &str {
        let code = generate_code(self);
        self.status = CertificationStatus::Generated;
        self.code.insert(code)
    }

    pub fn clear_code(&mut self) {
        self.code = None;
        self.status = CertificationStatus::Pending;
    }

    pub fn to_entry(&self) -> CatalogEntry {
        let (edition_index, edition_total) = match self.edition {
            EditionKind::Limited { index, total } => (Some(index), Some(total)),
            _ => (None, None),
        };
        CatalogEntry {
            id: self.id,
            title: self.title.clone(),
            dimensions: self.dimensions.clone(),
            technique: self.technique.clone(),
            image: self.image.clone(),
            certification_date: Some(self.certification_date.format("%Y-%m-%d").to_string()),
            edition_index,
            edition_total,
            open_edition: self.edition == EditionKind::Open,
            code: self.code.clone(),
        }
    }
}

/// Catalog record as supplied by the surrounding application
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: ArtworkId,
    pub title: String,
    #[serde(default)]
    pub dimensions: String,
    #[serde(default)]
    pub technique: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub certification_date: Option<String>,
    #[serde(default)]
    pub edition_index: Option<u32>,
    #[serde(default)]
    pub edition_total: Option<u32>,
    #[serde(default)]
    pub open_edition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Artwork {id}: {source}")]
    MalformedDate {
        id: ArtworkId,
        #[source]
        source: CodeError,
    },

    #[error("Duplicate artwork id: {0}")]
    DuplicateId(ArtworkId),
}

impl CatalogEntry {
    pub fn into_artwork(self, original_index: usize, clock: &dyn Clock) -> Result<Artwork, CatalogError> {
        let certification_date = match self.certification_date.as_deref() {
            Some(raw) => parse_certification_date(raw)
                .map_err(|source| CatalogError::MalformedDate { id: self.id, source })?,
            None => clock.today(),
        };

        let (edition, inconsistent) =
            EditionKind::from_fields(self.edition_index, self.edition_total, self.open_edition);
        if inconsistent {
            tracing::warn!(
                artwork_id = self.id,
                edition_index = ?self.edition_index,
                edition_total = ?self.edition_total,
                "incomplete edition numbering, treating as unique original"
            );
        }

        let mut artwork = Artwork::new(self.id, self.title, certification_date, edition)
            .with_details(self.dimensions, self.technique, self.image)
            .with_original_index(original_index);

        // A stored code survives only if it is regenerable and the record validates
        if let Some(stored) = self.code {
            let matches = artwork.attach_code() == stored;
            let validation = Validator::new().validate(&artwork, clock.today());
            if !matches || !validation.valid {
                tracing::warn!(
                    artwork_id = artwork.id,
                    stored = %stored,
                    matches,
                    violations = %validation.summary(),
                    "discarding stored code"
                );
                artwork.clear_code();
            }
        }

        Ok(artwork)
    }
}

/// Ordered in-memory collection of artworks, keyed by id
#[derive(Debug, Clone, Default)]
pub struct ArtworkStore {
    artworks: Vec<Artwork>,
}

impl ArtworkStore {
    pub fn new() -> Self {
        Self { artworks: Vec::new() }
    }

    pub fn from_entries(entries: Vec<CatalogEntry>, clock: &dyn Clock) -> Result<Self, CatalogError> {
        let mut store = Self::new();
        for (index, entry) in entries.into_iter().enumerate() {
            store.insert(entry.into_artwork(index, clock)?)?;
        }
        tracing::debug!(count = store.len(), "catalog loaded");
        Ok(store)
    }

    pub fn from_json(json: &str, clock: &dyn Clock) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries, clock)
    }

    pub fn load_from_file(path: &Path, clock: &dyn Clock) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content, clock)
    }

    pub fn seeded(clock: &dyn Clock) -> Result<Self, CatalogError> {
        Self::from_json(SEED_CATALOG, clock)
    }

    pub fn insert(&mut self, artwork: Artwork) -> Result<(), CatalogError> {
        if self.get(artwork.id()).is_some() {
            return Err(CatalogError::DuplicateId(artwork.id()));
        }
        let pos = self
            .artworks
            .partition_point(|a| a.original_index() <= artwork.original_index());
        self.artworks.insert(pos, artwork);
        Ok(())
    }

    pub fn get(&self, id: ArtworkId) -> Option<&Artwork> {
        self.artworks.iter().find(|a| a.id() == id)
    }

    pub fn get_mut(&mut self, id: ArtworkId) -> Option<&mut Artwork> {
        self.artworks.iter_mut().find(|a| a.id() == id)
    }

    /// Artworks in catalog display order
    pub fn list(&self) -> &[Artwork] {
        &self.artworks
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Artwork> {
        self.artworks.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.artworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artworks.is_empty()
    }

    pub fn snapshot(&self) -> Vec<CatalogEntry> {
        self.artworks.iter().map(Artwork::to_entry).collect()
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), CatalogError> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2026, 3, 4).unwrap())
    }

    fn entry(id: ArtworkId) -> CatalogEntry {
        CatalogEntry {
            id,
            title: format!("Obra {id}"),
            certification_date: Some("2025-12-10".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_flag_wins_over_numbers() {
        let (kind, inconsistent) = EditionKind::from_fields(Some(1), Some(5), true);
        assert_eq!(kind, EditionKind::Open);
        assert!(!inconsistent);
    }

    #[test]
    fn test_partial_numbers_fall_back_to_unique() {
        assert_eq!(EditionKind::from_fields(Some(2), None, false), (EditionKind::Unique, true));
        assert_eq!(EditionKind::from_fields(None, Some(9), false), (EditionKind::Unique, true));
    }

    #[test]
    fn test_missing_date_uses_clock() {
        let e = CatalogEntry { certification_date: None, ..entry(1) };
        let a = e.into_artwork(0, &clock()).unwrap();
        assert_eq!(a.certification_date(), clock().0);
    }

    #[test]
    fn test_malformed_date_names_artwork() {
        let e = CatalogEntry { certification_date: Some("10/12/2025".into()), ..entry(4) };
        let err = e.into_artwork(0, &clock()).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedDate { id: 4, .. }));
    }

    #[test]
    fn test_stale_stored_code_is_discarded() {
        let e = CatalogEntry { code: Some("MA-1999-9901-01".into()), ..entry(1) };
        let a = e.into_artwork(0, &clock()).unwrap();
        assert_eq!(a.code(), None);
        assert_eq!(a.status(), CertificationStatus::Pending);
    }

    #[test]
    fn test_matching_stored_code_is_kept() {
        let e = CatalogEntry { code: Some("MA-2025-2512-01".into()), ..entry(1) };
        let a = e.into_artwork(0, &clock()).unwrap();
        assert_eq!(a.code(), Some("MA-2025-2512-01"));
        assert_eq!(a.status(), CertificationStatus::Generated);
    }

    #[test]
    fn test_stored_code_on_out_of_bounds_edition_is_discarded() {
        let e = CatalogEntry {
            edition_index: Some(13),
            edition_total: Some(12),
            code: Some("MA-2025-2512-13/12".into()),
            ..entry(1)
        };
        let a = e.into_artwork(0, &clock()).unwrap();
        assert_eq!(a.code(), None);
        assert_eq!(a.status(), CertificationStatus::Pending);
    }

    #[test]
    fn test_store_mutation_keeps_identity_and_code_in_step() {
        let mut store = ArtworkStore::seeded(&clock()).unwrap();
        let before: Vec<(ArtworkId, usize)> =
            store.list().iter().map(|a| (a.id(), a.original_index())).collect();

        for a in store.iter_mut() {
            a.attach_code();
            a.set_certification_date(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
            a.attach_code();
        }
        if let Some(a) = store.get_mut(1) {
            a.set_edition(EditionKind::Open);
        }

        let after: Vec<(ArtworkId, usize)> =
            store.list().iter().map(|a| (a.id(), a.original_index())).collect();
        assert_eq!(before, after);
        for a in store.list() {
            if let Some(code) = a.code() {
                assert_eq!(code, generate_code(a));
            }
        }
        assert_eq!(store.get(1).unwrap().code(), None);
    }

    #[test]
    fn test_insert_respects_original_index() {
        let mut store = ArtworkStore::from_entries(vec![entry(1), entry(2)], &clock()).unwrap();
        store.insert(entry(3).into_artwork(0, &clock()).unwrap()).unwrap();
        let order: Vec<_> = store.list().iter().map(|a| (a.id(), a.original_index())).collect();
        assert_eq!(order, vec![(1, 0), (3, 0), (2, 1)]);
    }

    #[test]
    fn test_edits_clear_code() {
        let mut a = entry(1).into_artwork(0, &clock()).unwrap();
        a.attach_code();
        assert!(!a.set_edition(EditionKind::Unique));
        assert!(a.code().is_some());

        assert!(a.set_edition(EditionKind::Open));
        assert_eq!(a.code(), None);

        a.attach_code();
        assert!(a.set_certification_date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
        assert_eq!(a.status(), CertificationStatus::Pending);
    }

    #[test]
    fn test_store_keeps_catalog_order_and_rejects_duplicates() {
        let mut store = ArtworkStore::from_entries(vec![entry(5), entry(2), entry(9)], &clock()).unwrap();
        let ids: Vec<_> = store.list().iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![5, 2, 9]);

        let dup = entry(2).into_artwork(3, &clock()).unwrap();
        assert!(matches!(store.insert(dup), Err(CatalogError::DuplicateId(2))));
    }

    #[test]
    fn test_snapshot_reloads_to_same_records() {
        let mut store = ArtworkStore::seeded(&clock()).unwrap();
        for a in store.iter_mut() {
            a.attach_code();
        }
        let json = serde_json::to_string(&store.snapshot()).unwrap();
        let reloaded = ArtworkStore::from_json(&json, &clock()).unwrap();
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn test_seed_catalog_loads() {
        let store = ArtworkStore::seeded(&clock()).unwrap();
        assert!(!store.is_empty());
    }
}
