//! # atelier-db: Database Layer
//!
//! SQLite persistence for the studio backend.
//!
//! ## Responsibilities
//! ```text
//! OWNED HERE                         NOT OWNED HERE
//! ------------------------------     -----------------------------
//! connection pool management         business rules (atelier-core)
//! SQL query execution                HTTP/DTO formatting (apps/api)
//! schema migrations                  authentication
//! repository implementations
//! transaction management
//! ```
//!
//! Every lifecycle operation that writes a parent plus child rows (quote +
//! items, invoice + items, lead conversion) runs in a single transaction:
//! any failure rolls the whole operation back.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{Page, PER_PAGE};
