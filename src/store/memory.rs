//! In-memory stores for router tests

use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use super::{AdminStore, ReportStore};
use crate::AppResult;
use crate::models::{Admin, CreateReport, Report, ReportFilter};

#[derive(Default)]
pub struct MemoryReportStore {
    reports: Mutex<Vec<Report>>,
}

impl MemoryReportStore {
    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }
}

#[axum::async_trait]
impl ReportStore for MemoryReportStore {
    async fn insert(&self, data: CreateReport) -> AppResult<Report> {
        let report = Report {
            id: Uuid::new_v4(),
            image_name: data.image_name,
            image_size: data.image_size as i64,
            image_type: data.image_type,
            image_path: data.image_path,
            content_sha256: data.content_sha256,
            verdict: data.analysis.verdict,
            confidence: i32::from(data.analysis.confidence),
            reasons: data.analysis.reasons,
            created_at: Utc::now(),
        };
        self.reports.lock().unwrap().push(report.clone());
        Ok(report)
    }

    async fn list_recent(&self, filter: &ReportFilter) -> AppResult<Vec<Report>> {
        let mut reports = self.all();
        // Stable sort keeps later inserts first on equal timestamps
        reports.reverse();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryAdminStore {
    admins: Mutex<Vec<Admin>>,
}

#[axum::async_trait]
impl AdminStore for MemoryAdminStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        Ok(self.admins.lock().unwrap().iter().find(|a| a.email == email).cloned())
    }

    async fn upsert(&self, email: &str, password_hash: &str) -> AppResult<Admin> {
        let mut admins = self.admins.lock().unwrap();
        let now = Utc::now();
        if let Some(admin) = admins.iter_mut().find(|a| a.email == email) {
            admin.password_hash = password_hash.to_string();
            admin.updated_at = now;
            return Ok(admin.clone());
        }
        let admin = Admin {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        admins.push(admin.clone());
        Ok(admin)
    }

    async fn record_login(&self, id: Uuid) -> AppResult<()> {
        if let Some(admin) = self.admins.lock().unwrap().iter_mut().find(|a| a.id == id) {
            admin.last_login = Some(Utc::now());
        }
        Ok(())
    }
}
