// src/admin/reports.rs
//! Dashboard report pipeline
//!
//! Application rows are loaded once with their hiring status attached, then
//! filtered and summarized in memory:
//! - KPIs and status funnel
//! - value counts for the chart panels
//! - display rows and dropdown options for the table view

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::admin::models::{
    Charts, DashboardData, FilterOptions, Funnel, HiringStatus, Kpis, ReportFilters, ValueCounts,
};
use crate::applications::store::{all_applications, status_map, text_value, ApplicationRow, DEFAULT_STATUS};
use crate::common::ApiError;
use crate::forms::schema::application_columns;

pub const STATUS_COLUMN: &str = "Status";
pub const DATE_COLUMN: &str = "submission_timestamp";
pub const GENDER_COLUMN: &str = "gender";
pub const COMPANY_COLUMN: &str = "business_entity";
pub const COLLEGE_COLUMN: &str = "qualification_grad_school";
pub const LOCATION_COLUMN: &str = "location_of_position";
pub const POST_COLUMN: &str = "post_applying_for";
pub const COURSE_COLUMN: &str = "qualification_grad_course";

const DEFAULT_COLUMNS: [&str; 6] = [
    "name",
    "email",
    POST_COLUMN,
    COLLEGE_COLUMN,
    STATUS_COLUMN,
    "resume_path",
];

const FUNNEL: [HiringStatus; 4] = [
    HiringStatus::Shortlisted,
    HiringStatus::Interviewed,
    HiringStatus::Offered,
    HiringStatus::Hired,
];

/// All application rows plus the table's column list (`Status` appended)
#[derive(Debug, Default)]
pub struct ReportSource {
    pub columns: Vec<String>,
    pub rows: Vec<ApplicationRow>,
}

impl ReportSource {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads every application, lower-cases emails and attaches the status
pub async fn load_source(db: &SqlitePool) -> Result<ReportSource, sqlx::Error> {
    let mut columns = application_columns(db).await?;
    let statuses = status_map(db).await?;
    let mut rows = all_applications(db).await?;

    for row in rows.iter_mut() {
        let email = text_value(row, "email").to_lowercase();
        let status = statuses
            .get(&email)
            .cloned()
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());
        row.insert("email".to_string(), Value::String(email));
        row.insert(STATUS_COLUMN.to_string(), Value::String(status));
    }
    columns.push(STATUS_COLUMN.to_string());

    debug!(rows = rows.len(), columns = columns.len(), "Loaded report source");
    Ok(ReportSource { columns, rows })
}

/// Accepts the timestamp layouts SQLite and this service write
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    let text = text.trim();
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|d| d.naive_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "all")
}

fn filter_date(name: &str, value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ApiError::ValidationFailed {
        message: format!("Invalid {}", name),
        details: vec![format!("{} must be a date in YYYY-MM-DD format", name)],
    })
}

/// Rows matching every active filter. The end date covers its whole day;
/// filters on columns the table does not have are ignored.
pub fn apply_filters(
    source: &ReportSource,
    filters: &ReportFilters,
) -> Result<Vec<ApplicationRow>, ApiError> {
    let start = active(&filters.start_date)
        .map(|v| filter_date("start_date", v))
        .transpose()?
        .and_then(|d| d.and_hms_opt(0, 0, 0));
    let end = active(&filters.end_date)
        .map(|v| filter_date("end_date", v))
        .transpose()?
        .and_then(|d| d.succ_opt())
        .and_then(|d| d.and_hms_opt(0, 0, 0));
    let by_date = source.has_column(DATE_COLUMN) && (start.is_some() || end.is_some());

    let equality: Vec<(&str, &str)> = [
        (LOCATION_COLUMN, &filters.location),
        (POST_COLUMN, &filters.post),
        (COURSE_COLUMN, &filters.qualification),
        (COMPANY_COLUMN, &filters.business_entity),
        (COURSE_COLUMN, &filters.course),
        (COLLEGE_COLUMN, &filters.college),
    ]
    .into_iter()
    .filter(|(column, _)| source.has_column(column))
    .filter_map(|(column, value)| active(value).map(|v| (column, v)))
    .collect();

    let rows = source
        .rows
        .iter()
        .filter(|row| {
            if by_date {
                let Some(at) = parse_timestamp(&text_value(row, DATE_COLUMN)) else {
                    return false;
                };
                if start.is_some_and(|s| at < s) || end.is_some_and(|e| at >= e) {
                    return false;
                }
            }
            equality
                .iter()
                .all(|(column, value)| text_value(row, column) == *value)
        })
        .cloned()
        .collect();

    Ok(rows)
}

/// Non-empty values of a column, most frequent first (ties by value)
pub fn value_counts(rows: &[ApplicationRow], column: &str) -> ValueCounts {
    let mut counts: HashMap<String, i64> = HashMap::new();
    for row in rows {
        let value = text_value(row, column);
        if !value.is_empty() {
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let mut pairs: Vec<(String, i64)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ValueCounts(pairs)
}

fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 10_000.0).round() / 100.0
}

pub fn compute_kpis(rows: &[ApplicationRow]) -> Kpis {
    let statuses = value_counts(rows, STATUS_COLUMN);
    let count = |status: HiringStatus| statuses.get(status.as_str()).unwrap_or(0);

    let applications = rows.len() as i64;
    let offered = count(HiringStatus::Offered);
    let hired = count(HiringStatus::Hired);
    let rejected = count(HiringStatus::Rejected);

    Kpis {
        applications,
        shortlisted: count(HiringStatus::Shortlisted),
        interviewed: count(HiringStatus::Interviewed),
        offered,
        hired,
        rejected,
        acceptance_rate: percentage(hired + offered, applications),
        rejection_rate: percentage(rejected, applications),
    }
}

fn funnel(kpis: &Kpis) -> Funnel {
    let mut labels = vec!["Applications"];
    let mut data = vec![kpis.applications];
    for status in FUNNEL {
        labels.push(status.as_str());
        data.push(match status {
            HiringStatus::Shortlisted => kpis.shortlisted,
            HiringStatus::Interviewed => kpis.interviewed,
            HiringStatus::Offered => kpis.offered,
            _ => kpis.hired,
        });
    }
    Funnel { labels, data }
}

fn unique_values(rows: &[ApplicationRow], column: &str) -> Vec<String> {
    rows.iter()
        .map(|row| text_value(row, column))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Table cell values: nulls become empty strings, submission timestamps
/// are normalized to `%Y-%m-%d %H:%M:%S`
pub fn display_row(row: &ApplicationRow) -> ApplicationRow {
    row.iter()
        .map(|(column, value)| {
            let shown = match value {
                Value::Null => Value::String(String::new()),
                Value::String(text) if column == DATE_COLUMN => Value::String(
                    parse_timestamp(text)
                        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| text.clone()),
                ),
                other => other.clone(),
            };
            (column.clone(), shown)
        })
        .collect()
}

/// Column order for tables and exports: `name` first, then table order
pub fn ordered_columns(source: &ReportSource) -> Vec<String> {
    let mut columns = source.columns.clone();
    if let Some(index) = columns.iter().position(|c| c == "name") {
        let name = columns.remove(index);
        columns.insert(0, name);
    }
    columns
}

pub fn build_dashboard(
    source: &ReportSource,
    filters: &ReportFilters,
) -> Result<DashboardData, ApiError> {
    let rows = apply_filters(source, filters)?;
    let kpis = compute_kpis(&rows);

    let charts = Charts {
        apps_per_company: value_counts(&rows, COMPANY_COLUMN),
        apps_per_college: value_counts(&rows, COLLEGE_COLUMN),
        gender_diversity: value_counts(&rows, GENDER_COLUMN),
        recruitment_funnel: funnel(&kpis),
    };

    let filters = FilterOptions {
        locations: unique_values(&rows, LOCATION_COLUMN),
        posts: unique_values(&rows, POST_COLUMN),
        qualifications: unique_values(&rows, COURSE_COLUMN),
        business_entities: unique_values(&rows, COMPANY_COLUMN),
        courses: unique_values(&rows, COURSE_COLUMN),
        colleges: unique_values(&rows, COLLEGE_COLUMN),
    };

    let all_columns = ordered_columns(source);
    let default_columns = DEFAULT_COLUMNS
        .iter()
        .filter(|c| all_columns.iter().any(|a| a == *c))
        .map(|c| c.to_string())
        .collect();

    Ok(DashboardData {
        kpis,
        charts,
        table_data: rows.iter().map(display_row).collect(),
        all_columns,
        default_columns,
        filters,
    })
}

/// CSV with a header row; cells follow `columns`
pub fn to_csv(columns: &[String], rows: &[ApplicationRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|column| text_value(row, column)))?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}
