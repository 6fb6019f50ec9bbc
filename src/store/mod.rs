//! Persistence seams
//!
//! Handlers only see these traits; `AppState` carries the implementation.

pub mod postgres;
#[cfg(test)]
pub mod memory;

use uuid::Uuid;

use crate::AppResult;
use crate::models::{Admin, CreateReport, Report, ReportFilter};

pub use postgres::{PgAdminStore, PgReportStore};

/// Report history: insert-one and list newest-first
#[axum::async_trait]
pub trait ReportStore: Send + Sync {
    async fn insert(&self, report: CreateReport) -> AppResult<Report>;
    async fn list_recent(&self, filter: &ReportFilter) -> AppResult<Vec<Report>>;
}

/// Admin accounts
#[axum::async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>>;
    async fn upsert(&self, email: &str, password_hash: &str) -> AppResult<Admin>;
    async fn record_login(&self, id: Uuid) -> AppResult<()>;
}
