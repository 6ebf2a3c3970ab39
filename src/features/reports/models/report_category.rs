use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;

/// Fixed set of civic issue categories, matching the `report_category` database enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "report_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportCategory {
    Pothole,
    Garbage,
    Streetlight,
    Water,
    Traffic,
    Drainage,
    Construction,
    Other,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 8] = [
        ReportCategory::Pothole,
        ReportCategory::Garbage,
        ReportCategory::Streetlight,
        ReportCategory::Water,
        ReportCategory::Traffic,
        ReportCategory::Drainage,
        ReportCategory::Construction,
        ReportCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::Pothole => "pothole",
            ReportCategory::Garbage => "garbage",
            ReportCategory::Streetlight => "streetlight",
            ReportCategory::Water => "water",
            ReportCategory::Traffic => "traffic",
            ReportCategory::Drainage => "drainage",
            ReportCategory::Construction => "construction",
            ReportCategory::Other => "other",
        }
    }

    /// Department a new report of this category is routed to
    pub fn department(&self) -> &'static str {
        match self {
            ReportCategory::Pothole => "Roads & Infrastructure Department",
            ReportCategory::Garbage => "Sanitation Department",
            ReportCategory::Streetlight => "Electricity Department",
            ReportCategory::Water => "Water Supply Department",
            ReportCategory::Traffic => "Traffic Police Department",
            ReportCategory::Drainage => "Drainage Department",
            ReportCategory::Construction => "Building & Construction Department",
            ReportCategory::Other => "General Administration",
        }
    }
}

impl std::fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
