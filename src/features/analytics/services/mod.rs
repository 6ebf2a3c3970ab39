mod analytics_service;
pub mod metrics;

pub use analytics_service::{AnalyticsPeriod, AnalyticsService, DashboardAnalytics};
pub use metrics::{
    AnalyticsSummary, Breakdown, DepartmentStats, Hotspot, ResolutionMetrics, TrendPoint,
    WardStats,
};
