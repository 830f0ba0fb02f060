//! Edition labels shown on provenance documents

use crate::artwork::{Artwork, EditionKind};

pub const OPEN_EDITION_LABEL: &str = "Edición Seriada Abierta (Giclée)";
pub const UNIQUE_ORIGINAL_LABEL: &str = "Obra Única Original";

pub fn describe_edition(artwork: &Artwork) -> String {
    artwork.edition().describe()
}

impl EditionKind {
    pub fn describe(&self) -> String {
        match self {
            EditionKind::Limited { index, total } => format!("Edición Limitada {}/{}", index, total),
            EditionKind::Open => OPEN_EDITION_LABEL.to_string(),
            EditionKind::Unique => UNIQUE_ORIGINAL_LABEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn artwork(edition: EditionKind) -> Artwork {
        Artwork::new(1, "Obra", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), edition)
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            describe_edition(&artwork(EditionKind::Limited { index: 2, total: 10 })),
            "Edición Limitada 2/10"
        );
        assert_eq!(describe_edition(&artwork(EditionKind::Open)), "Edición Seriada Abierta (Giclée)");
        assert_eq!(describe_edition(&artwork(EditionKind::Unique)), "Obra Única Original");
    }

    #[test]
    fn test_limited_label_is_not_padded() {
        let label = EditionKind::Limited { index: 120, total: 150 }.describe();
        assert_eq!(label, "Edición Limitada 120/150");
    }
}
