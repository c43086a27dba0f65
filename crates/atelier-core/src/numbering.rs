//! # Document Numbering
//!
//! Year-scoped business numbers for quotes and invoices.
//!
//! ## Format
//! ```text
//! DEV-2026-0001   quote    ("devis")
//! FAC-2026-0001   invoice  ("facture")
//! ```
//!
//! The sequence is derived from the most recently created document of the
//! same kind within the current calendar year (creation order, not a parse
//! of the numbers themselves) and restarts at 0001 every January.
//!
//! These are pure functions; the repository layer feeds them the last
//! number read inside the same transaction that inserts the new document,
//! and relies on a UNIQUE constraint plus bounded retry to close the
//! read-then-increment race under concurrent allocation.

use chrono::{DateTime, Datelike, Utc};

use crate::error::{CoreError, CoreResult};

/// The two kinds of numbered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Quote,
    Invoice,
}

impl DocumentKind {
    /// The number prefix for this kind.
    #[inline]
    pub const fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "DEV",
            DocumentKind::Invoice => "FAC",
        }
    }
}

/// The calendar year a document created at `now` is numbered under.
#[inline]
pub fn numbering_year(now: DateTime<Utc>) -> i32 {
    now.year()
}

/// Formats a document number: `PREFIX-YYYY-NNNN`.
pub fn format_number(kind: DocumentKind, year: i32, sequence: u32) -> String {
    format!("{}-{}-{:04}", kind.prefix(), year, sequence)
}

/// Computes the next sequence given the newest number of the year.
///
/// `None` (no document yet this year) starts the sequence at 1. Otherwise
/// the trailing segment after the last `-` must parse as an integer; a
/// malformed suffix is an error, never a silent restart.
pub fn next_sequence(last_number: Option<&str>) -> CoreResult<u32> {
    let last = match last_number {
        None => return Ok(1),
        Some(number) => number,
    };

    let suffix = last.rsplit('-').next().unwrap_or(last);
    let sequence: u32 = suffix
        .parse()
        .map_err(|_| CoreError::MalformedDocumentNumber {
            number: last.to_string(),
        })?;

    Ok(sequence + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format() {
        assert_eq!(format_number(DocumentKind::Quote, 2026, 1), "DEV-2026-0001");
        assert_eq!(
            format_number(DocumentKind::Invoice, 2026, 42),
            "FAC-2026-0042"
        );
        // sequences past 4 digits widen rather than wrap
        assert_eq!(
            format_number(DocumentKind::Quote, 2026, 12345),
            "DEV-2026-12345"
        );
    }

    #[test]
    fn test_first_of_year_starts_at_one() {
        assert_eq!(next_sequence(None).unwrap(), 1);
    }

    #[test]
    fn test_increments_trailing_sequence() {
        assert_eq!(next_sequence(Some("DEV-2026-0007")).unwrap(), 8);
        assert_eq!(next_sequence(Some("FAC-2026-0099")).unwrap(), 100);
        assert_eq!(next_sequence(Some("DEV-2026-9999")).unwrap(), 10000);
    }

    #[test]
    fn test_malformed_suffix_is_an_error() {
        assert!(matches!(
            next_sequence(Some("DEV-2026-00A1")),
            Err(CoreError::MalformedDocumentNumber { .. })
        ));
        assert!(matches!(
            next_sequence(Some("garbage")),
            Err(CoreError::MalformedDocumentNumber { .. })
        ));
        assert!(matches!(
            next_sequence(Some("DEV-2026-")),
            Err(CoreError::MalformedDocumentNumber { .. })
        ));
    }

    #[test]
    fn test_numbering_year() {
        let now = Utc.with_ymd_and_hms(2026, 8, 4, 12, 0, 0).unwrap();
        assert_eq!(numbering_year(now), 2026);
    }
}
