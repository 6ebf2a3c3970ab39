use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::analytics::services::{
    AnalyticsPeriod, DepartmentStats, Hotspot, WardStats,
};
use crate::features::reports::models::ReportCategory;

fn default_period() -> AnalyticsPeriod {
    AnalyticsPeriod::ThirtyDays
}

fn default_timeframe() -> AnalyticsPeriod {
    AnalyticsPeriod::SevenDays
}

fn default_min_reports() -> i64 {
    2
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AnalyticsQuery {
    /// `7d` or `30d` (default)
    #[serde(default = "default_period")]
    #[param(value_type = String, example = "30d")]
    pub period: AnalyticsPeriod,
    /// Exact department name
    pub department: Option<String>,
    pub ward: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct HotspotQuery {
    pub category: Option<ReportCategory>,
    /// `7d` (default) or `30d`
    #[serde(default = "default_timeframe")]
    #[param(value_type = String, example = "7d")]
    pub timeframe: AnalyticsPeriod,
    /// Smallest group reported as a hotspot
    #[serde(default = "default_min_reports")]
    #[param(minimum = 1)]
    pub min_reports: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HotspotsResponseDto {
    pub hotspots: Vec<Hotspot>,
    pub total_hotspots: usize,
    pub timeframe: AnalyticsPeriod,
    pub min_reports: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartmentsResponseDto {
    pub departments: Vec<DepartmentStats>,
    pub total_departments: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WardsResponseDto {
    pub wards: Vec<WardStats>,
    pub total_wards: usize,
}
