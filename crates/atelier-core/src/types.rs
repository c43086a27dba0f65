//! # Domain Types
//!
//! Core domain types for the studio backend.
//!
//! ## Entity Map
//! ```text
//! Client 1──* Quote 1──* QuoteItem
//!   │           │
//!   │           └──0..1 Invoice 1──* InvoiceItem
//!   ├──* Invoice
//!   ├──* Project
//!   └──0..1 ContactRequest (conversion back-reference)
//!
//! CompanySettings: singleton defaults row (tax rate, validity windows)
//! Admin:           back-office account
//! ```
//!
//! ## Identity
//! Every entity has a UUID v4 string `id`; quotes and invoices also carry
//! a human-facing, year-scoped business number (`DEV-2026-0001`,
//! `FAC-2026-0001`) that is unique and immutable once assigned.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::{Money, Quantity, TaxRate};
use crate::{DEFAULT_INVOICE_DUE_DAYS, DEFAULT_QUOTE_VALIDITY_DAYS, DEFAULT_TAX_RATE_BPS};

// =============================================================================
// Status Vocabularies
// =============================================================================

/// The status of a quote.
///
/// The transition set is deliberately permissive: any enumerated value can
/// be set from any other through the update operations. Only values
/// outside the vocabulary are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Being drafted, not yet shared with the client.
    Draft,
    /// Sent to the client, awaiting a decision.
    Sent,
    /// Accepted by the client.
    Accepted,
    /// Rejected by the client.
    Rejected,
}

impl Default for QuoteStatus {
    fn default() -> Self {
        QuoteStatus::Draft
    }
}

/// The status of an invoice.
///
/// `Overdue` exists in the stored vocabulary for manual bookkeeping, but
/// the lifecycle never writes it automatically: whether an invoice is
/// overdue is derived at read time from [`is_overdue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        InvoiceStatus::Draft
    }
}

/// The status of a portfolio project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    InProgress,
    Completed,
    /// Published on the marketing site.
    Portfolio,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::InProgress
    }
}

/// The status of an inbound contact-form lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    New,
    Read,
    /// Converted into a client; the conversion link is set once and never
    /// reversed.
    Converted,
}

impl Default for ContactStatus {
    fn default() -> Self {
        ContactStatus::New
    }
}

// =============================================================================
// Overdue Predicate
// =============================================================================

/// Whether an invoice counts as overdue on `today`.
///
/// This is the single source of truth for "overdue": the per-invoice
/// accessor, the list filter, and the dashboard count all agree with this
/// predicate. It is never persisted as authoritative state.
#[inline]
pub fn is_overdue(status: InvoiceStatus, due_date: NaiveDate, today: NaiveDate) -> bool {
    status != InvoiceStatus::Paid && due_date < today
}

// =============================================================================
// Client
// =============================================================================

/// A client of the studio. Owns quotes, invoices, and projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: String,
    pub company_name: Option<String>,
    pub contact_name: String,
    /// Unique across clients.
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub project_type: Option<String>,
    pub budget_range: Option<String>,
    /// How the client found the studio ("contact_form", "referral", ...).
    pub source: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Quote
// =============================================================================

/// A proposal document with line items, awaiting a client decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Quote {
    pub id: String,
    /// Year-scoped business number (`DEV-2026-0001`), immutable.
    pub quote_number: String,
    pub client_id: String,
    pub status: QuoteStatus,
    /// The quote expires after this date.
    pub valid_until: NaiveDate,
    pub subtotal_cents: i64,
    /// Tax rate frozen at creation/update time, in basis points.
    pub tax_rate_bps: u32,
    pub tax_amount_cents: i64,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub terms_conditions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    #[inline]
    pub fn tax_amount(&self) -> Money {
        Money::from_cents(self.tax_amount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A billable row belonging to a quote.
///
/// `total_price_cents` is computed and stored at write time
/// (quantity × unit price); it is never recomputed on read. `position` is
/// the 1-based display order — insertion order is not assumed to survive
/// the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct QuoteItem {
    pub id: String,
    pub quote_id: String,
    pub service_name: String,
    pub description: Option<String>,
    pub quantity_hundredths: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

impl QuoteItem {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_hundredths(self.quantity_hundredths)
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A billing document, optionally derived from a quote, tracked to
/// payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,
    /// Year-scoped business number (`FAC-2026-0001`), immutable.
    pub invoice_number: String,
    /// Originating quote, if any. Becomes NULL when that quote is deleted.
    pub quote_id: Option<String>,
    pub client_id: String,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub subtotal_cents: i64,
    pub tax_rate_bps: u32,
    pub tax_amount_cents: i64,
    pub total_cents: i64,
    pub payment_terms: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    #[inline]
    pub fn tax_amount(&self) -> Money {
        Money::from_cents(self.tax_amount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Read-time overdue derivation; see [`is_overdue`].
    #[inline]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self.status, self.due_date, today)
    }
}

/// A billable row belonging to an invoice. Same shape as [`QuoteItem`];
/// values are copied verbatim when an invoice is derived from a quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,
    pub service_name: String,
    pub description: Option<String>,
    pub quantity_hundredths: i64,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

impl InvoiceItem {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_hundredths(self.quantity_hundredths)
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

// =============================================================================
// Project
// =============================================================================

/// A portfolio/case-study record tied to a client.
///
/// `gallery` and `services` are ordered lists of opaque strings (image
/// paths, service labels); the store keeps them as JSON text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub category: String,
    pub year: i64,
    pub location: String,
    pub description: String,
    pub featured_image: Option<String>,
    pub gallery: Vec<String>,
    pub services: Vec<String>,
    pub surface: Option<String>,
    pub duration: Option<String>,
    pub budget_range: Option<String>,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Contact Request
// =============================================================================

/// An inbound lead from the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ContactRequest {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub project_type: String,
    pub budget: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    /// Set once on conversion; NULLed if the client is later deleted.
    pub converted_client_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Company Settings
// =============================================================================

/// The singleton configuration record supplying document defaults.
///
/// Exactly one row is ever read or created; if none exists it is created
/// with the defaults below on first access and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CompanySettings {
    pub id: String,
    pub company_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub phone: String,
    pub email: String,
    pub website: Option<String>,
    pub tax_number: Option<String>,
    /// Default tax rate applied to new quotes and invoices, in bps.
    pub default_tax_rate_bps: u32,
    /// Default payment terms text for invoices.
    pub payment_terms: Option<String>,
    pub quote_validity_days: i64,
    pub invoice_due_days: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanySettings {
    /// The fixed defaults used when no settings row exists yet.
    pub fn with_defaults(id: String, now: DateTime<Utc>) -> Self {
        CompanySettings {
            id,
            company_name: "Atelier Intérieur".to_string(),
            address: "12 rue des Filles-du-Calvaire".to_string(),
            city: "Paris".to_string(),
            postal_code: "75003".to_string(),
            country: "France".to_string(),
            phone: "+33 1 42 72 00 00".to_string(),
            email: "contact@atelier-interieur.fr".to_string(),
            website: None,
            tax_number: None,
            default_tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            payment_terms: Some("Paiement à 30 jours".to_string()),
            quote_validity_days: DEFAULT_QUOTE_VALIDITY_DAYS,
            invoice_due_days: DEFAULT_INVOICE_DUE_DAYS,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn default_tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.default_tax_rate_bps)
    }
}

// =============================================================================
// Admin
// =============================================================================

/// A back-office account allowed to use the admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string; never serialized to API responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
