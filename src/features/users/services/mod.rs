mod user_dashboard_service;

pub use user_dashboard_service::{
    RecentReport, UserDashboard, UserDashboardService, UserStatistics,
};
