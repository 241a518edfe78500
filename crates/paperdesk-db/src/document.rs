use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row};

use paperdesk_core::models::{DetailStatus, DocumentDetail, NewDocumentDetail};
use paperdesk_core::AppError;

/// Persistence seam for the ingestion pipeline.
///
/// The database assigns the surrogate keys and returns them synchronously.
/// The two inserts are deliberately not wrapped in a transaction: a crash
/// between them can leave a document row without a detail, which the
/// approval workflow tolerates.
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    /// Insert a document and return its server-assigned ID.
    async fn insert_document(&self, category: &str) -> Result<i64, AppError>;

    /// Insert a document detail; returns the assigned ID and creation time.
    async fn insert_document_detail(
        &self,
        detail: &NewDocumentDetail,
    ) -> Result<(i64, DateTime<Utc>), AppError>;
}

/// Read side of the document store, split from [`DocumentWriter`] so
/// consumers take only the capability they need.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    /// Fetch the latest detail for a document, if any.
    async fn get_latest_detail(
        &self,
        document_id: i64,
    ) -> Result<Option<DocumentDetail>, AppError>;
}

/// Repository for documents and their revision details
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentReader for DocumentRepository {
    #[tracing::instrument(skip(self), fields(db.table = "document_details", db.operation = "select"))]
    async fn get_latest_detail(
        &self,
        document_id: i64,
    ) -> Result<Option<DocumentDetail>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, document_id, document_name, stored_filename, data_type,
                   submitter_name, submitter_team, status, is_latest, is_approved, created_at
            FROM document_details
            WHERE document_id = $1 AND is_latest = TRUE
            "#,
        )
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_detail).transpose()
    }
}

fn row_to_detail(row: sqlx::postgres::PgRow) -> Result<DocumentDetail, AppError> {
    let status: Option<String> = row.try_get("status")?;
    Ok(DocumentDetail {
        id: row.try_get("id")?,
        document_id: row.try_get("document_id")?,
        document_name: row.try_get("document_name")?,
        stored_filename: row.try_get("stored_filename")?,
        data_type: row.try_get("data_type")?,
        submitter_name: row.try_get("submitter_name")?,
        submitter_team: row.try_get("submitter_team")?,
        status: status.as_deref().map(parse_status).transpose()?,
        is_latest: row.try_get("is_latest")?,
        is_approved: row.try_get("is_approved")?,
        created_at: row.try_get("created_at")?,
    })
}

fn parse_status(s: &str) -> Result<DetailStatus, AppError> {
    match s {
        "Pending" => Ok(DetailStatus::Pending),
        "Approved" => Ok(DetailStatus::Approved),
        other => Err(AppError::Internal(format!(
            "Unknown document status in database: {}",
            other
        ))),
    }
}

#[async_trait]
impl DocumentWriter for DocumentRepository {
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "insert"))]
    async fn insert_document(&self, category: &str) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<Postgres, i64>(
            "INSERT INTO documents (category) VALUES ($1) RETURNING id",
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    #[tracing::instrument(
        skip(self, detail),
        fields(db.table = "document_details", db.operation = "insert", document_id = detail.document_id)
    )]
    async fn insert_document_detail(
        &self,
        detail: &NewDocumentDetail,
    ) -> Result<(i64, DateTime<Utc>), AppError> {
        let row = sqlx::query(
            r#"
            INSERT INTO document_details
                (document_id, document_name, stored_filename, data_type,
                 submitter_name, submitter_team, status, is_latest, is_approved)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, created_at
            "#,
        )
        .bind(detail.document_id)
        .bind(&detail.document_name)
        .bind(&detail.stored_filename)
        .bind(&detail.data_type)
        .bind(&detail.submitter_name)
        .bind(&detail.submitter_team)
        .bind(detail.status.map(|s| s.as_str()))
        .bind(detail.is_latest)
        .bind(detail.is_approved)
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = row.try_get("id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        Ok((id, created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        assert_eq!(parse_status("Pending").unwrap(), DetailStatus::Pending);
        assert_eq!(parse_status("Approved").unwrap(), DetailStatus::Approved);
        assert!(parse_status("Rejected").is_err());
    }
}
