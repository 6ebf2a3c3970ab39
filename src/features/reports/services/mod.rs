mod duplicate_detector;
mod photo;
mod priority_classifier;
mod report_repository;
mod report_service;

pub use duplicate_detector::{
    find_duplicate, similarity_score, text_similarity, DuplicateCandidate, DuplicateMatch,
};
pub use photo::{decode_photo, PhotoKind, PhotoStorage, PhotoUpload};
pub use priority_classifier::{
    analytics_score, classify, risk_level, Classification, ClassificationInput,
};
pub use report_repository::{PgReportRepository, ReportRepository};
pub use report_service::{
    BulkUpdate, BulkUpdateOutcome, CloseRequest, NewReport, ReportService, StatusUpdate,
    SubmissionOutcome,
};
