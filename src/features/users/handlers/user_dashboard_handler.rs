use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::features::users::services::{UserDashboard, UserDashboardService};
use crate::shared::types::ApiResponse;

/// Personal statistics and latest reports of one citizen
#[utoipa::path(
    get,
    path = "/api/users/dashboard/{email}",
    params(("email" = String, Path, description = "Reporter email")),
    responses(
        (status = 200, description = "Citizen dashboard", body = ApiResponse<UserDashboard>),
        (status = 400, description = "Malformed email")
    ),
    tag = "users"
)]
pub async fn get_user_dashboard(
    State(service): State<Arc<UserDashboardService>>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<UserDashboard>>> {
    let dashboard = service.dashboard(&email).await?;
    Ok(Json(ApiResponse::success(Some(dashboard), None, None)))
}
