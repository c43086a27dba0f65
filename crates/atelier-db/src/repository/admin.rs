//! # Admin Repository
//!
//! Back-office accounts used by the login endpoint.

use sqlx::SqlitePool;
use tracing::debug;

use atelier_core::Admin;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: SqlitePool,
}

impl AdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AdminRepository { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<Admin>> {
        let admin: Option<Admin> = sqlx::query_as("SELECT * FROM admins WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(admin)
    }

    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Admin>> {
        let admin: Option<Admin> = sqlx::query_as("SELECT * FROM admins WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(admin)
    }

    /// Inserts a new admin account. Email is unique.
    pub async fn insert(&self, admin: &Admin) -> DbResult<()> {
        debug!(email = %admin.email, "inserting admin");

        sqlx::query(
            r#"
            INSERT INTO admins (id, name, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&admin.id)
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin.created_at)
        .bind(admin.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
