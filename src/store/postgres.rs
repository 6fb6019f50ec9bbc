//! PostgreSQL-backed stores

use sqlx::PgPool;
use uuid::Uuid;

use super::{AdminStore, ReportStore};
use crate::AppResult;
use crate::models::{Admin, CreateReport, Report, ReportFilter};

#[derive(Clone)]
pub struct PgReportStore {
    pool: PgPool,
}

impl PgReportStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[axum::async_trait]
impl ReportStore for PgReportStore {
    async fn insert(&self, report: CreateReport) -> AppResult<Report> {
        Ok(Report::create(&self.pool, report).await?)
    }

    async fn list_recent(&self, filter: &ReportFilter) -> AppResult<Vec<Report>> {
        Ok(Report::list_recent(&self.pool, filter).await?)
    }
}

#[derive(Clone)]
pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[axum::async_trait]
impl AdminStore for PgAdminStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        Ok(Admin::find_by_email(&self.pool, email).await?)
    }

    async fn upsert(&self, email: &str, password_hash: &str) -> AppResult<Admin> {
        Ok(Admin::upsert(&self.pool, email, password_hash).await?)
    }

    async fn record_login(&self, id: Uuid) -> AppResult<()> {
        Ok(Admin::update_last_login(&self.pool, id).await?)
    }
}
