// src/admin/models.rs

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::applications::store::ApplicationRow;

// Hiring status

/// Reviewer-assigned label, tracked per applicant email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiringStatus {
    Applied,
    Shortlisted,
    Interviewed,
    Offered,
    Hired,
    Rejected,
}

impl HiringStatus {
    pub const ALL: [HiringStatus; 6] = [
        HiringStatus::Applied,
        HiringStatus::Shortlisted,
        HiringStatus::Interviewed,
        HiringStatus::Offered,
        HiringStatus::Hired,
        HiringStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HiringStatus::Applied => "Applied",
            HiringStatus::Shortlisted => "Shortlisted",
            HiringStatus::Interviewed => "Interviewed",
            HiringStatus::Offered => "Offered",
            HiringStatus::Hired => "Hired",
            HiringStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for HiringStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize, Debug)]
pub struct UpdateStatusRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
}

// User management

#[derive(Deserialize, Debug)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct DeleteUserRequest {
    pub id: Option<i64>,
}

// Reports

/// Query-string filters shared by the dashboard data and export endpoints.
/// Empty values and `all` mean "no filter".
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ReportFilters {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub post: Option<String>,
    pub qualification: Option<String>,
    pub business_entity: Option<String>,
    pub course: Option<String>,
    pub college: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ExportParams {
    pub format: Option<String>,
    #[serde(flatten)]
    pub filters: ReportFilters,
}

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct Kpis {
    pub applications: i64,
    pub shortlisted: i64,
    pub interviewed: i64,
    pub offered: i64,
    pub hired: i64,
    pub rejected: i64,
    pub acceptance_rate: f64,
    pub rejection_rate: f64,
}

/// `(value, count)` pairs, most frequent first, serialized as a JSON object
/// in that order
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValueCounts(pub Vec<(String, i64)>);

impl ValueCounts {
    pub fn get(&self, value: &str) -> Option<i64> {
        self.0.iter().find(|(v, _)| v == value).map(|(_, c)| *c)
    }
}

impl Serialize for ValueCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (value, count) in &self.0 {
            map.serialize_entry(value, count)?;
        }
        map.end()
    }
}

#[derive(Serialize, Debug, Default, Clone)]
pub struct Funnel {
    pub labels: Vec<&'static str>,
    pub data: Vec<i64>,
}

#[derive(Serialize, Debug, Default, Clone)]
pub struct Charts {
    pub apps_per_company: ValueCounts,
    pub apps_per_college: ValueCounts,
    pub gender_diversity: ValueCounts,
    pub recruitment_funnel: Funnel,
}

/// Distinct values offered by the dashboard filter dropdowns
#[derive(Serialize, Debug, Default, Clone)]
pub struct FilterOptions {
    pub locations: Vec<String>,
    pub posts: Vec<String>,
    pub qualifications: Vec<String>,
    pub business_entities: Vec<String>,
    pub courses: Vec<String>,
    pub colleges: Vec<String>,
}

/// Everything the dashboard renders for one filter selection
#[derive(Serialize, Debug, Default)]
pub struct DashboardData {
    pub kpis: Kpis,
    pub charts: Charts,
    pub table_data: Vec<ApplicationRow>,
    pub all_columns: Vec<String>,
    pub default_columns: Vec<String>,
    pub filters: FilterOptions,
}

// Public statistics and health

#[derive(Serialize, Debug, sqlx::FromRow)]
pub struct DailyCount {
    pub date: String,
    pub count: i64,
}

#[derive(Serialize, Debug, sqlx::FromRow)]
pub struct PositionCount {
    pub post_applying_for: String,
    pub count: i64,
}

#[derive(Serialize, Debug)]
pub struct SubmissionStatistics {
    pub total_applications: i64,
    pub recent_submissions: Vec<DailyCount>,
    pub popular_positions: Vec<PositionCount>,
}

#[derive(Serialize, Debug)]
pub struct StatisticsResponse {
    pub success: bool,
    pub statistics: SubmissionStatistics,
    pub timestamp: String,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
}
