use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::sla::handlers::{self, SlaState};
use crate::features::sla::services::SlaService;
use crate::features::sla::workers::SlaMonitor;

pub fn routes(sla_service: Arc<SlaService>, monitor: Arc<SlaMonitor>) -> Router {
    let state = SlaState {
        sla_service,
        monitor,
    };

    Router::new()
        .route("/api/admin/sla/status", get(handlers::get_sla_status))
        .route("/api/admin/sla/reports/{id}", get(handlers::check_report_sla))
        .route("/api/admin/sla/sweep", post(handlers::run_sla_sweep))
        .with_state(state)
}
