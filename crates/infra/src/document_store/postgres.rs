//! Postgres-backed document store implementation.
//!
//! Documents live in a single `documents` table keyed by `(doc_type, id)`,
//! with the body stored as `jsonb` and the revision as `bigint`. Optimistic
//! concurrency is enforced at the database level: inserts are guarded by
//! `ON CONFLICT DO NOTHING` and updates by a `WHERE revision = $n` clause,
//! both checked via `rows_affected`.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Concurrent insert of the same document (detected at the insert site, where the document identity is known) |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolClosed | N/A | `Backend` | Connection pool was closed |
//! | RowNotFound | N/A | `Backend` | Unexpected row not found (should not occur) |
//! | Other | N/A | `Backend` | Network errors, connection failures, etc. |
//!
//! ## Thread Safety
//!
//! `PostgresDocumentStore` is `Send + Sync` and can be shared across threads.
//! All operations use the SQLx connection pool which handles thread-safe
//! connection management.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool, Row};
use tokio_util::sync::CancellationToken;
use tracing::{Span, instrument};
use uuid::Uuid;

use shopforge_core::ExpectedRevision;

use super::backend::{DocumentBackend, PendingOp, StoreError, StoredDocument, stamp_revision};

/// Postgres-backed document store.
///
/// ## Optimistic Concurrency
///
/// `commit()` runs the whole batch inside one transaction. Every upsert is
/// guarded by its revision expectation; the first failed guard rolls the
/// transaction back, so a conflicting batch leaves the table untouched.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    /// Create a new PostgresDocumentStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the backing table when absent.
    ///
    /// Intended for development and test bootstrap; production schemas are
    /// managed by migrations.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                doc_type    TEXT        NOT NULL,
                id          UUID        NOT NULL,
                revision    BIGINT      NOT NULL CHECK (revision > 0),
                body        JSONB       NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (doc_type, id)
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for PostgresDocumentStore {
    #[instrument(skip(self, cancel), fields(doc_type = doc_type, id = %id), err)]
    async fn load(
        &self,
        doc_type: &str,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Option<StoredDocument>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let row = sqlx::query(
            r#"
            SELECT id, revision, body, updated_at
            FROM documents
            WHERE doc_type = $1 AND id = $2
            "#,
        )
        .bind(doc_type)
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_document", e))?;

        match row {
            Some(row) => {
                let stored = StoredDocumentRow::from_row(&row).map_err(|e| {
                    StoreError::Backend(format!("failed to deserialize document row: {e}"))
                })?;
                Ok(Some(stored.into()))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, cancel), fields(doc_type = doc_type, document_count), err)]
    async fn load_all(
        &self,
        doc_type: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let rows = sqlx::query(
            r#"
            SELECT id, revision, body, updated_at
            FROM documents
            WHERE doc_type = $1
            ORDER BY id ASC
            "#,
        )
        .bind(doc_type)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_all_documents", e))?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let stored = StoredDocumentRow::from_row(&row).map_err(|e| {
                StoreError::Backend(format!("failed to deserialize document row: {e}"))
            })?;
            documents.push(stored.into());
        }

        Span::current().record("document_count", documents.len());
        Ok(documents)
    }

    #[instrument(skip(self, ops, cancel), fields(op_count = ops.len()), err)]
    async fn commit(
        &self,
        ops: Vec<PendingOp>,
        cancel: &CancellationToken,
    ) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        if ops.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for op in ops {
            match op {
                PendingOp::Upsert {
                    doc_type,
                    id,
                    expected,
                    mut body,
                } => {
                    let revision = expected.next();
                    stamp_revision(&mut body, revision);

                    let rows_affected = match expected {
                        ExpectedRevision::NoDocument => {
                            sqlx::query(
                                r#"
                                INSERT INTO documents (doc_type, id, revision, body, updated_at)
                                VALUES ($1, $2, $3, $4, now())
                                ON CONFLICT (doc_type, id) DO NOTHING
                                "#,
                            )
                            .bind(doc_type)
                            .bind(id)
                            .bind(revision as i64)
                            .bind(&body)
                            .execute(&mut *tx)
                            .await
                            .map_err(|e| {
                                // Concurrent insert between our guard and the
                                // constraint check surfaces as a unique violation.
                                if is_unique_violation(&e) {
                                    StoreError::conflict(doc_type, id)
                                } else {
                                    map_sqlx_error("insert_document", e)
                                }
                            })?
                            .rows_affected()
                        }
                        ExpectedRevision::Exact(current) => {
                            sqlx::query(
                                r#"
                                UPDATE documents
                                SET revision = $3, body = $4, updated_at = now()
                                WHERE doc_type = $1 AND id = $2 AND revision = $5
                                "#,
                            )
                            .bind(doc_type)
                            .bind(id)
                            .bind(revision as i64)
                            .bind(&body)
                            .bind(current as i64)
                            .execute(&mut *tx)
                            .await
                            .map_err(|e| map_sqlx_error("update_document", e))?
                            .rows_affected()
                        }
                    };

                    if rows_affected != 1 {
                        tx.rollback()
                            .await
                            .map_err(|e| map_sqlx_error("rollback", e))?;
                        return Err(StoreError::conflict(doc_type, id));
                    }
                }
                PendingOp::Delete { doc_type, id } => {
                    // Missing documents are a no-op, so rows_affected is not checked.
                    sqlx::query("DELETE FROM documents WHERE doc_type = $1 AND id = $2")
                        .bind(doc_type)
                        .bind(id)
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| map_sqlx_error("delete_document", e))?;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(())
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Backend(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::RowNotFound => {
            StoreError::Backend(format!("unexpected row not found in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

// SQLx row types

#[derive(Debug)]
struct StoredDocumentRow {
    id: Uuid,
    revision: i64,
    body: JsonValue,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredDocumentRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredDocumentRow {
            id: row.try_get("id")?,
            revision: row.try_get("revision")?,
            body: row.try_get("body")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<StoredDocumentRow> for StoredDocument {
    fn from(row: StoredDocumentRow) -> Self {
        StoredDocument {
            id: row.id,
            revision: row.revision as u64,
            body: row.body,
            updated_at: row.updated_at,
        }
    }
}
