//! # HTTP Handlers
//!
//! One module per resource, each defining its request/response DTOs next
//! to the handlers that use them.
//!
//! ## Wire Conventions
//! - amounts travel as 2-decimal strings ("250.00"), parsed and rendered
//!   exactly by the fixed-point types
//! - list endpoints return `{data, total, page, per_page}` at 15 per page
//! - invoices always carry the derived `is_overdue` flag, computed at
//!   read time

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use atelier_core::{Invoice, InvoiceItem, InvoiceStatus, Money, Quote, QuoteItem, QuoteStatus, TaxRate};
use atelier_db::repository::invoice::InvoiceDetail;
use atelier_db::repository::quote::QuoteDetail;
use atelier_db::Page;

pub mod auth;
pub mod clients;
pub mod contacts;
pub mod dashboard;
pub mod invoices;
pub mod projects;
pub mod quotes;

// =============================================================================
// Shared Envelopes
// =============================================================================

/// Paginated list envelope.
#[derive(Debug, Serialize)]
pub struct PageDto<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> PageDto<T> {
    pub fn from_page<U>(page: Page<U>, map: impl FnMut(U) -> T) -> Self {
        PageDto {
            data: page.items.into_iter().map(map).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

/// Simple acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn message(text: impl Into<String>) -> MessageResponse {
    MessageResponse {
        message: text.into(),
    }
}

pub(crate) fn money_str(cents: i64) -> String {
    Money::from_cents(cents).to_string()
}

pub(crate) fn rate_str(bps: u32) -> String {
    TaxRate::from_bps(bps).to_string()
}

// =============================================================================
// Line Item DTO
// =============================================================================

#[derive(Debug, Serialize)]
pub struct LineItemDto {
    pub id: String,
    pub service_name: String,
    pub description: Option<String>,
    pub quantity: String,
    pub unit_price: String,
    pub total_price: String,
    pub position: i64,
}

impl From<QuoteItem> for LineItemDto {
    fn from(item: QuoteItem) -> Self {
        LineItemDto {
            quantity: item.quantity().to_string(),
            unit_price: item.unit_price().to_string(),
            total_price: item.total_price().to_string(),
            id: item.id,
            service_name: item.service_name,
            description: item.description,
            position: item.position,
        }
    }
}

impl From<InvoiceItem> for LineItemDto {
    fn from(item: InvoiceItem) -> Self {
        LineItemDto {
            quantity: item.quantity().to_string(),
            unit_price: item.unit_price().to_string(),
            total_price: item.total_price().to_string(),
            id: item.id,
            service_name: item.service_name,
            description: item.description,
            position: item.position,
        }
    }
}

// =============================================================================
// Quote DTOs
// =============================================================================

/// Flat quote fields, used standalone as the back-reference inside invoice
/// responses and flattened into [`QuoteDto`].
#[derive(Debug, Serialize)]
pub struct QuoteSummaryDto {
    pub id: String,
    pub quote_number: String,
    pub client_id: String,
    pub status: QuoteStatus,
    pub valid_until: NaiveDate,
    pub subtotal: String,
    pub tax_rate: String,
    pub tax_amount: String,
    pub total: String,
    pub notes: Option<String>,
    pub terms_conditions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Quote> for QuoteSummaryDto {
    fn from(quote: Quote) -> Self {
        QuoteSummaryDto {
            subtotal: money_str(quote.subtotal_cents),
            tax_rate: rate_str(quote.tax_rate_bps),
            tax_amount: money_str(quote.tax_amount_cents),
            total: money_str(quote.total_cents),
            id: quote.id,
            quote_number: quote.quote_number,
            client_id: quote.client_id,
            status: quote.status,
            valid_until: quote.valid_until,
            notes: quote.notes,
            terms_conditions: quote.terms_conditions,
            created_at: quote.created_at,
            updated_at: quote.updated_at,
        }
    }
}

/// Full quote response: quote fields plus client, ordered items, and the
/// derived invoice when loaded.
#[derive(Debug, Serialize)]
pub struct QuoteDto {
    #[serde(flatten)]
    pub quote: QuoteSummaryDto,
    pub client: atelier_core::Client,
    pub items: Vec<LineItemDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<InvoiceSummaryDto>,
}

impl QuoteDto {
    pub fn from_detail(detail: QuoteDetail, today: NaiveDate) -> Self {
        QuoteDto {
            quote: detail.quote.into(),
            client: detail.client,
            items: detail.items.into_iter().map(LineItemDto::from).collect(),
            invoice: detail
                .invoice
                .map(|invoice| InvoiceSummaryDto::from_invoice(invoice, today)),
        }
    }
}

// =============================================================================
// Invoice DTOs
// =============================================================================

/// Flat invoice fields with the derived overdue flag.
#[derive(Debug, Serialize)]
pub struct InvoiceSummaryDto {
    pub id: String,
    pub invoice_number: String,
    pub quote_id: Option<String>,
    pub client_id: String,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub subtotal: String,
    pub tax_rate: String,
    pub tax_amount: String,
    pub total: String,
    pub payment_terms: Option<String>,
    /// Derived from (status, due_date, today); never stored.
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InvoiceSummaryDto {
    pub fn from_invoice(invoice: Invoice, today: NaiveDate) -> Self {
        InvoiceSummaryDto {
            is_overdue: invoice.is_overdue(today),
            subtotal: money_str(invoice.subtotal_cents),
            tax_rate: rate_str(invoice.tax_rate_bps),
            tax_amount: money_str(invoice.tax_amount_cents),
            total: money_str(invoice.total_cents),
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            quote_id: invoice.quote_id,
            client_id: invoice.client_id,
            status: invoice.status,
            due_date: invoice.due_date,
            paid_date: invoice.paid_date,
            payment_terms: invoice.payment_terms,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

/// Full invoice response: invoice fields plus client, ordered items, and
/// the originating quote when the link survives.
#[derive(Debug, Serialize)]
pub struct InvoiceDto {
    #[serde(flatten)]
    pub invoice: InvoiceSummaryDto,
    pub client: atelier_core::Client,
    pub items: Vec<LineItemDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteSummaryDto>,
}

impl InvoiceDto {
    pub fn from_detail(detail: InvoiceDetail, today: NaiveDate) -> Self {
        InvoiceDto {
            invoice: InvoiceSummaryDto::from_invoice(detail.invoice, today),
            client: detail.client,
            items: detail.items.into_iter().map(LineItemDto::from).collect(),
            quote: detail.quote.map(QuoteSummaryDto::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_invoice(status: InvoiceStatus, due: NaiveDate) -> Invoice {
        let now = Utc::now();
        Invoice {
            id: "inv-1".to_string(),
            invoice_number: "FAC-2026-0001".to_string(),
            quote_id: None,
            client_id: "client-1".to_string(),
            status,
            due_date: due,
            paid_date: None,
            subtotal_cents: 25000,
            tax_rate_bps: 2000,
            tax_amount_cents: 5000,
            total_cents: 30000,
            payment_terms: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_invoice_summary_renders_amount_strings() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let dto = InvoiceSummaryDto::from_invoice(
            sample_invoice(InvoiceStatus::Sent, NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()),
            today,
        );

        assert_eq!(dto.subtotal, "250.00");
        assert_eq!(dto.tax_rate, "20.00");
        assert_eq!(dto.tax_amount, "50.00");
        assert_eq!(dto.total, "300.00");
        assert!(!dto.is_overdue);
    }

    #[test]
    fn test_invoice_summary_overdue_flag() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let past = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();

        let sent = InvoiceSummaryDto::from_invoice(sample_invoice(InvoiceStatus::Sent, past), today);
        assert!(sent.is_overdue);

        let paid = InvoiceSummaryDto::from_invoice(sample_invoice(InvoiceStatus::Paid, past), today);
        assert!(!paid.is_overdue);
    }
}
