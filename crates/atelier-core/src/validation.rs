//! # Validation Module
//!
//! Field-level validation for API input, run before any persistence work.
//!
//! ## Validation Layers
//! ```text
//! Layer 1: deserialization   (types, status vocabularies)
//! Layer 2: THIS MODULE       (business rules, exact decimal parsing)
//! Layer 3: database          (NOT NULL / UNIQUE / FK constraints)
//! ```
//!
//! A failed validation aborts the whole operation with no mutation.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::{Money, Quantity};
use crate::totals::NewLineItem;
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field (non-empty, no length bound).
/// Returns the trimmed value.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Ok(value.to_string())
}

/// Validates a required name-like field (non-empty, bounded length).
/// Returns the trimmed value.
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = validate_required(field, value)?;

    if value.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(value)
}

/// Validates an email address. Kept intentionally shallow (one `@` with
/// non-empty sides); deliverability is not a storage-layer concern.
pub fn validate_email(value: &str) -> ValidationResult<String> {
    let value = validate_name("email", value)?;

    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(value),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must be a valid email address".to_string(),
        }),
    }
}

// =============================================================================
// Amount Validators
// =============================================================================

/// Parses a 2-decimal quantity string; must be strictly positive.
pub fn parse_quantity(field: &str, value: &str) -> ValidationResult<Quantity> {
    let quantity: Quantity = value.parse().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a number with at most two decimal places".to_string(),
    })?;

    if !quantity.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(quantity)
}

/// Parses a 2-decimal price string; must be non-negative (free lines are
/// allowed).
pub fn parse_unit_price(field: &str, value: &str) -> ValidationResult<Money> {
    let price: Money = value.parse().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a number with at most two decimal places".to_string(),
    })?;

    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(price)
}

// =============================================================================
// Line Items
// =============================================================================

/// Validates one raw line item into a [`NewLineItem`].
///
/// The field names in errors are indexed ("items.0.quantity") so the
/// client can point at the offending row.
pub fn parse_line_item(
    index: usize,
    service_name: &str,
    description: Option<&str>,
    quantity: &str,
    unit_price: &str,
) -> ValidationResult<NewLineItem> {
    let service_name = validate_name(&format!("items.{index}.service_name"), service_name)?;
    let quantity = parse_quantity(&format!("items.{index}.quantity"), quantity)?;
    let unit_price = parse_unit_price(&format!("items.{index}.unit_price"), unit_price)?;

    Ok(NewLineItem {
        service_name,
        description: description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        quantity,
        unit_price,
    })
}

/// A document needs at least one billable line.
pub fn ensure_items_present(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// The date must lie strictly after `today`.
pub fn validate_future_date(field: &str, date: NaiveDate, today: NaiveDate) -> ValidationResult<()> {
    if date <= today {
        return Err(ValidationError::MustBeInFuture {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Project years are bounded to a plausible window.
pub fn validate_project_year(year: i64, current_year: i64) -> ValidationResult<()> {
    let max = current_year + 10;
    if year < 2000 || year > max {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: 2000,
            max,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_is_unbounded() {
        assert!(validate_required("message", &"x".repeat(5000)).is_ok());
        assert!(validate_required("message", "  ").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("contact_name", "  Jeanne Martin ").unwrap(), "Jeanne Martin");
        assert!(validate_name("contact_name", "").is_err());
        assert!(validate_name("contact_name", "   ").is_err());
        assert!(validate_name("contact_name", &"x".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jeanne@example.fr").is_ok());
        assert!(validate_email("jeanne").is_err());
        assert!(validate_email("@example.fr").is_err());
        assert!(validate_email("jeanne@nodot").is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("quantity", "2.50").unwrap().hundredths(), 250);
        assert!(parse_quantity("quantity", "0").is_err());
        assert!(parse_quantity("quantity", "-1").is_err());
        assert!(parse_quantity("quantity", "1.234").is_err());
    }

    #[test]
    fn test_parse_unit_price() {
        assert_eq!(parse_unit_price("unit_price", "100.00").unwrap().cents(), 10000);
        // zero is allowed (offered lines)
        assert_eq!(parse_unit_price("unit_price", "0").unwrap().cents(), 0);
        assert!(parse_unit_price("unit_price", "-0.01").is_err());
    }

    #[test]
    fn test_parse_line_item() {
        let item = parse_line_item(0, "Conception", Some("  "), "2.00", "100.00").unwrap();
        assert_eq!(item.service_name, "Conception");
        assert_eq!(item.description, None);
        assert_eq!(item.total_price().cents(), 20000);

        let err = parse_line_item(3, "Conception", None, "0", "100.00").unwrap_err();
        assert!(err.to_string().contains("items.3.quantity"));
    }

    #[test]
    fn test_ensure_items_present() {
        assert!(ensure_items_present(1).is_ok());
        assert!(ensure_items_present(0).is_err());
    }

    #[test]
    fn test_validate_future_date() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        assert!(validate_future_date("valid_until", today.succ_opt().unwrap(), today).is_ok());
        assert!(validate_future_date("valid_until", today, today).is_err());
        assert!(validate_future_date("valid_until", today.pred_opt().unwrap(), today).is_err());
    }

    #[test]
    fn test_validate_project_year() {
        assert!(validate_project_year(2020, 2026).is_ok());
        assert!(validate_project_year(1999, 2026).is_err());
        assert!(validate_project_year(2037, 2026).is_err());
        assert!(validate_project_year(2036, 2026).is_ok());
    }
}
