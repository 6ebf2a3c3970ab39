mod report;
mod report_category;
mod report_filter;
mod report_location;
mod report_timeline;

pub use report::{
    ClosingDetails, CreateReport, Report, ReportPriority, ReportSeverity, ReportStatus, RiskLevel,
    StatusChange,
};
pub use report_category::ReportCategory;
pub use report_filter::ReportFilter;
pub use report_location::{GeoPoint, ReportLocation};
pub use report_timeline::ReportTimelineEntry;
