mod alert_store;
mod sla_policy;
mod sla_service;

pub use alert_store::{AlertDedupStore, InMemoryAlertStore};
pub use sla_policy::{
    deadline_hours, estimated_resolution, evaluate, is_breached, SlaEvaluation, SlaSubject,
};
pub use sla_service::{SlaService, SlaStats};
