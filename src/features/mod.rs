pub mod analytics;
pub mod notifications;
pub mod reports;
pub mod sla;
pub mod users;
