//! # atelier-core: Pure Business Logic
//!
//! The heart of the studio backend: every business rule lives here as a
//! pure function with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! apps/api (axum REST)          thin orchestration + DTO mapping
//!        │
//! atelier-core (THIS CRATE)     money, totals, numbering, validation
//!        │                      NO I/O, NO DATABASE, NO CLOCKS
//! atelier-db (sqlx/SQLite)      repositories, migrations, transactions
//! ```
//!
//! ## Modules
//!
//! - [`money`] - fixed-point `Money`, `Quantity`, `TaxRate`
//! - [`types`] - domain entities and status vocabularies
//! - [`totals`] - the line-item totals calculator
//! - [`numbering`] - year-scoped document numbers (`DEV-`/`FAC-`)
//! - [`validation`] - business rule validation
//! - [`error`] - domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output; "now" is a parameter
//! 2. **Integer fixed point**: cents / hundredths / basis points, never floats
//! 3. **Explicit errors**: typed enums, no panics in library code

pub mod error;
pub mod money;
pub mod numbering;
pub mod totals;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Quantity, TaxRate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tax rate for new documents when settings are first created
/// (2000 bps = 20.00 %, the standard VAT rate).
pub const DEFAULT_TAX_RATE_BPS: u32 = 2000;

/// Default number of days a new quote stays valid.
pub const DEFAULT_QUOTE_VALIDITY_DAYS: i64 = 30;

/// Default number of days until a new invoice is due.
pub const DEFAULT_INVOICE_DUE_DAYS: i64 = 30;

/// Upper bound for name-like fields, mirroring the column widths.
pub const MAX_NAME_LENGTH: usize = 255;
