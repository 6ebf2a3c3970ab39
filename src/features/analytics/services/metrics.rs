//! Pure aggregations over report lists for the admin dashboard.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::reports::models::{Report, ReportCategory, ReportStatus};

const UNASSIGNED_DEPARTMENT: &str = "Unassigned";
const UNKNOWN_WARD: &str = "Unknown";
const TREND_DAYS: i64 = 7;
const HOTSPOT_PRECISION: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AnalyticsSummary {
    pub total_reports: i64,
    pub resolved: i64,
    pub submitted: i64,
    pub in_progress: i64,
    pub resolution_rate: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Breakdown {
    pub by_status: BTreeMap<String, i64>,
    pub by_category: BTreeMap<String, i64>,
    pub by_priority: BTreeMap<String, i64>,
}

/// Hours from creation to last update of resolved reports, rounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResolutionMetrics {
    pub avg_resolution_hours: i64,
    pub fastest_resolution_hours: i64,
    pub slowest_resolution_hours: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Hotspot {
    pub latitude: f64,
    pub longitude: f64,
    pub count: i64,
    pub reports: Vec<Uuid>,
    pub categories: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DepartmentStats {
    pub name: String,
    pub total: i64,
    pub resolved: i64,
    pub submitted: i64,
    pub in_progress: i64,
    pub resolution_rate: i64,
    pub efficiency: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct WardStats {
    pub name: String,
    pub total: i64,
    pub resolved: i64,
    /// Everything not yet resolved
    pub pending: i64,
    pub categories: BTreeMap<String, i64>,
    pub priorities: BTreeMap<String, i64>,
    pub resolution_rate: i64,
}

/// Whole-number percentage, 0 when `total` is 0
fn percentage(part: i64, total: i64) -> i64 {
    if total == 0 {
        0
    } else {
        ((part as f64 / total as f64) * 100.0).round() as i64
    }
}

fn count_by<'a>(
    reports: impl IntoIterator<Item = &'a Report>,
    key: impl Fn(&Report) -> &'static str,
) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for report in reports {
        *counts.entry(key(report).to_string()).or_insert(0) += 1;
    }
    counts
}

fn count_status(reports: &[Report], status: ReportStatus) -> i64 {
    reports.iter().filter(|r| r.status == status).count() as i64
}

pub fn summary(reports: &[Report]) -> AnalyticsSummary {
    let total_reports = reports.len() as i64;
    let resolved = count_status(reports, ReportStatus::Resolved);

    AnalyticsSummary {
        total_reports,
        resolved,
        submitted: count_status(reports, ReportStatus::Submitted),
        in_progress: count_status(reports, ReportStatus::InProgress),
        resolution_rate: percentage(resolved, total_reports),
    }
}

pub fn breakdown(reports: &[Report]) -> Breakdown {
    Breakdown {
        by_status: count_by(reports, |r| r.status.as_str()),
        by_category: count_by(reports, |r| r.category.as_str()),
        by_priority: count_by(reports, |r| r.priority.as_str()),
    }
}

fn hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

pub fn resolution_metrics(reports: &[Report]) -> ResolutionMetrics {
    let durations: Vec<f64> = reports
        .iter()
        .filter(|r| r.status == ReportStatus::Resolved)
        .map(|r| hours(r.updated_at - r.created_at))
        .collect();

    if durations.is_empty() {
        return ResolutionMetrics::default();
    }

    let avg = durations.iter().sum::<f64>() / durations.len() as f64;
    let fastest = durations.iter().copied().fold(f64::INFINITY, f64::min);
    let slowest = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ResolutionMetrics {
        avg_resolution_hours: avg.round() as i64,
        fastest_resolution_hours: fastest.round() as i64,
        slowest_resolution_hours: slowest.round() as i64,
    }
}

/// Reports per UTC day for the last seven days, oldest first, today included
pub fn trend(reports: &[Report], now: DateTime<Utc>) -> Vec<TrendPoint> {
    let today = now.date_naive();
    let mut counts: BTreeMap<NaiveDate, i64> = (0..TREND_DAYS)
        .map(|offset| (today - Duration::days(offset), 0))
        .collect();

    for report in reports {
        if let Some(count) = counts.get_mut(&report.created_at.date_naive()) {
            *count += 1;
        }
    }

    counts
        .into_iter()
        .map(|(date, count)| TrendPoint { date, count })
        .collect()
}

/// Group reports whose coordinates agree to three decimals (roughly 100m),
/// keep groups with at least `min_reports`, largest first.
pub fn hotspots(reports: &[Report], min_reports: i64) -> Vec<Hotspot> {
    let mut groups: BTreeMap<(i64, i64), Hotspot> = BTreeMap::new();

    for report in reports {
        let point = report.location.point();
        if !point.is_valid() {
            continue;
        }

        let lat_key = (point.latitude * HOTSPOT_PRECISION).round() as i64;
        let lon_key = (point.longitude * HOTSPOT_PRECISION).round() as i64;

        let hotspot = groups.entry((lat_key, lon_key)).or_insert_with(|| Hotspot {
            latitude: lat_key as f64 / HOTSPOT_PRECISION,
            longitude: lon_key as f64 / HOTSPOT_PRECISION,
            count: 0,
            reports: Vec::new(),
            categories: BTreeMap::new(),
        });

        hotspot.count += 1;
        hotspot.reports.push(report.id);
        *hotspot
            .categories
            .entry(report.category.as_str().to_string())
            .or_insert(0) += 1;
    }

    let mut hotspots: Vec<Hotspot> = groups
        .into_values()
        .filter(|h| h.count >= min_reports)
        .collect();
    hotspots.sort_by(|a, b| b.count.cmp(&a.count));
    hotspots
}

/// `max(0, round(resolved/total*70 + in_progress/total*20 - submitted/total*10))`
pub fn department_efficiency(total: i64, resolved: i64, in_progress: i64, submitted: i64) -> i64 {
    if total == 0 {
        return 0;
    }

    let total = total as f64;
    let score = (resolved as f64 / total) * 70.0 + (in_progress as f64 / total) * 20.0
        - (submitted as f64 / total) * 10.0;

    score.round().max(0.0) as i64
}

fn sorted_by_total<T>(mut rows: Vec<T>, total: impl Fn(&T) -> i64) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(total(row)));
    rows
}

pub fn department_stats(reports: &[Report]) -> Vec<DepartmentStats> {
    let mut grouped: HashMap<&str, Vec<&Report>> = HashMap::new();
    for report in reports {
        let name = match report.assigned_department.trim() {
            "" => UNASSIGNED_DEPARTMENT,
            _ => report.assigned_department.as_str(),
        };
        grouped.entry(name).or_default().push(report);
    }

    let mut rows: Vec<DepartmentStats> = grouped
        .into_iter()
        .map(|(name, group)| {
            let count = |status: ReportStatus| {
                group.iter().filter(|r| r.status == status).count() as i64
            };
            let total = group.len() as i64;
            let resolved = count(ReportStatus::Resolved);
            let submitted = count(ReportStatus::Submitted);
            let in_progress = count(ReportStatus::InProgress);

            DepartmentStats {
                name: name.to_string(),
                total,
                resolved,
                submitted,
                in_progress,
                resolution_rate: percentage(resolved, total),
                efficiency: department_efficiency(total, resolved, in_progress, submitted),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.name.cmp(&b.name));
    sorted_by_total(rows, |d| d.total)
}

pub fn ward_stats(reports: &[Report]) -> Vec<WardStats> {
    let mut grouped: HashMap<&str, Vec<&Report>> = HashMap::new();
    for report in reports {
        let name = report
            .location
            .ward
            .as_deref()
            .filter(|w| !w.trim().is_empty())
            .unwrap_or(UNKNOWN_WARD);
        grouped.entry(name).or_default().push(report);
    }

    let mut rows: Vec<WardStats> = grouped
        .into_iter()
        .map(|(name, group)| {
            let total = group.len() as i64;
            let resolved = group
                .iter()
                .filter(|r| r.status == ReportStatus::Resolved)
                .count() as i64;

            WardStats {
                name: name.to_string(),
                total,
                resolved,
                pending: total - resolved,
                categories: count_by(group.iter().copied(), |r| r.category.as_str()),
                priorities: count_by(group.iter().copied(), |r| r.priority.as_str()),
                resolution_rate: percentage(resolved, total),
            }
        })
        .collect();

    rows.sort_by(|a, b| a.name.cmp(&b.name));
    sorted_by_total(rows, |w| w.total)
}

/// Keep only reports of `category` when one is given
pub fn filter_category(reports: Vec<Report>, category: Option<ReportCategory>) -> Vec<Report> {
    match category {
        Some(category) => reports.into_iter().filter(|r| r.category == category).collect(),
        None => reports,
    }
}
