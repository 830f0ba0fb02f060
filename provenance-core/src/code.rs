//! Traceability Codes
//!
//! `MA-{year}-{yy}{mm}-{id}` for unique pieces and open editions,
//! `MA-{year}-{yy}{mm}-{index}/{total}` for limited editions.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::artwork::{Artwork, EditionKind};

pub const CODE_PREFIX: &str = "MA";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodeError {
    #[error("Malformed certification date {input:?}: {reason}")]
    MalformedDate { input: String, reason: String },
}

/// Generate the canonical code for an artwork from its current fields.
pub fn generate_code(artwork: &Artwork) -> String {
    compose(artwork.id(), artwork.certification_date(), artwork.edition())
}

/// Generate a code from raw, unvalidated parts.
///
/// A malformed date is an error; no code is produced for it.
pub fn generate_code_from_parts(
    id: u32,
    certification_date: &str,
    edition: &EditionKind,
) -> Result<String, CodeError> {
    let date = parse_certification_date(certification_date)?;
    Ok(compose(id, date, edition))
}

fn compose(id: u32, date: NaiveDate, edition: &EditionKind) -> String {
    let year = date.year();
    let segment = format!("{:02}{:02}", year.rem_euclid(100), date.month());

    match edition {
        EditionKind::Limited { index, total } => format!(
            "{}-{:04}-{}-{}/{}",
            CODE_PREFIX,
            year,
            segment,
            two_digits(*index),
            two_digits(*total)
        ),
        EditionKind::Unique | EditionKind::Open => {
            format!("{}-{:04}-{}-{:02}", CODE_PREFIX, year, segment, id)
        }
    }
}

/// Edition numbers always occupy exactly two digits. Values of 100 and
/// above keep their last two digits.
fn two_digits(n: u32) -> String {
    format!("{:02}", n % 100)
}

/// Strict parser for certification dates.
///
/// Accepts `YYYY-MM-DD` or `YYYY-MM` (day 1). The year must be four ASCII
/// digits and the result a real calendar date.
pub fn parse_certification_date(input: &str) -> Result<NaiveDate, CodeError> {
    let malformed = |reason: &str| CodeError::MalformedDate {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = input.trim().split('-').collect();
    let (year, month, day) = match parts.as_slice() {
        [y, m] => (*y, *m, "01"),
        [y, m, d] => (*y, *m, *d),
        _ => return Err(malformed("expected YYYY-MM-DD or YYYY-MM")),
    };

    let numeric = |s: &str, width: usize| s.len() == width && s.bytes().all(|b| b.is_ascii_digit());
    if !numeric(year, 4) {
        return Err(malformed("year must be four digits"));
    }
    if !numeric(month, 2) || !numeric(day, 2) {
        return Err(malformed("month and day must be two digits"));
    }

    let y: i32 = year.parse().map_err(|_| malformed("invalid year"))?;
    let m: u32 = month.parse().map_err(|_| malformed("invalid month"))?;
    let d: u32 = day.parse().map_err(|_| malformed("invalid day"))?;

    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| malformed("not a calendar date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artwork(id: u32, date: &str, edition: EditionKind) -> Artwork {
        Artwork::new(id, "Obra", parse_certification_date(date).unwrap(), edition)
    }

    #[test]
    fn test_limited_edition_code() {
        let a = artwork(1, "2025-12-10", EditionKind::Limited { index: 3, total: 12 });
        assert_eq!(generate_code(&a), "MA-2025-2512-03/12");
    }

    #[test]
    fn test_unique_code_uses_id() {
        let a = artwork(7, "2025-01-05", EditionKind::Unique);
        assert_eq!(generate_code(&a), "MA-2025-2501-07");
    }

    #[test]
    fn test_open_edition_code_uses_id() {
        let a = artwork(12, "2024-06-30", EditionKind::Open);
        assert_eq!(generate_code(&a), "MA-2024-2406-12");
    }

    #[test]
    fn test_edition_numbers_stay_two_digits() {
        let a = artwork(1, "2025-03-01", EditionKind::Limited { index: 105, total: 250 });
        assert_eq!(generate_code(&a), "MA-2025-2503-05/50");
    }

    #[test]
    fn test_year_2000_suffix() {
        let a = artwork(3, "2000-02-14", EditionKind::Unique);
        assert_eq!(generate_code(&a), "MA-2000-0002-03");
    }

    #[test]
    fn test_parse_month_only() {
        let d = parse_certification_date("2025-12").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "2025", "25-12-10", "2025/12/10", "2025-13-01", "2025-02-30", "2025-1-05", "abcd-ef-gh"] {
            assert!(parse_certification_date(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_from_parts_malformed_date() {
        let err = generate_code_from_parts(1, "diciembre 2025", &EditionKind::Unique).unwrap_err();
        assert!(err.to_string().contains("Malformed certification date"));
    }

    #[test]
    fn test_from_parts_matches_record() {
        let a = artwork(9, "2023-09-15", EditionKind::Limited { index: 1, total: 5 });
        let raw = generate_code_from_parts(9, "2023-09-15", a.edition()).unwrap();
        assert_eq!(raw, generate_code(&a));
    }
}
