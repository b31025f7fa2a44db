//! Admin dashboard and reports

use crate::{
    error::AppResult,
    models::{
        report::{DashboardStats, RepairsReport},
        UserClaims,
    },
    repository::Repository,
};

/// Requests shown in the dashboard activity feed
const RECENT_ACTIVITY: i64 = 5;

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn dashboard(&self, claims: &UserClaims) -> AppResult<DashboardStats> {
        claims.require_admin()?;
        let reports = &self.repository.reports;
        Ok(DashboardStats {
            counts: reports.dashboard_counts().await?,
            low_stock: reports.low_stock_parts().await?,
            recent_activity: reports.recent_requests(RECENT_ACTIVITY).await?,
        })
    }

    pub async fn repairs(&self, claims: &UserClaims) -> AppResult<RepairsReport> {
        claims.require_admin()?;
        let reports = &self.repository.reports;
        Ok(RepairsReport {
            repairs_by_status: reports.repairs_by_status().await?,
            repairs_by_technician: reports.repairs_by_technician().await?,
        })
    }
}
