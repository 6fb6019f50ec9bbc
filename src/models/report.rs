//! Report model

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::analysis::AnalysisResult;

/// Stored analysis of one upload
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub image_name: String,
    pub image_size: i64,
    pub image_type: String,
    pub image_path: String,
    pub content_sha256: String,
    pub verdict: String,
    pub confidence: i32,
    pub reasons: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields the upload handler owns, plus the analysis
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub image_name: String,
    pub image_size: u64,
    pub image_type: String,
    pub image_path: String,
    pub content_sha256: String,
    pub analysis: AnalysisResult,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReportFilter {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ReportFilter {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 500;

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub report_id: Uuid,
    pub result: AnalysisResult,
}

impl Report {
    pub async fn create(pool: &PgPool, data: CreateReport) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (image_name, image_size, image_type, image_path, content_sha256, verdict, confidence, reasons)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#
        )
        .bind(&data.image_name)
        .bind(i64::try_from(data.image_size).unwrap_or(i64::MAX))
        .bind(&data.image_type)
        .bind(&data.image_path)
        .bind(&data.content_sha256)
        .bind(&data.analysis.verdict)
        .bind(i32::from(data.analysis.confidence))
        .bind(&data.analysis.reasons)
        .fetch_one(pool)
        .await
    }

    /// Newest first
    pub async fn list_recent(pool: &PgPool, filter: &ReportFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Report>(
            r#"
            SELECT * FROM reports
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        )
        .bind(filter.limit())
        .bind(filter.offset())
        .fetch_all(pool)
        .await
    }
}
