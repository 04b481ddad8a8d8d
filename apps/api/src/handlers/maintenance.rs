use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use smartsales_core::ActorContext;
use smartsales_domain::MaintenanceTicket;

use crate::dto::{
    AssignTechnicianRequest, CreateMaintenanceRequest, MaintenanceResponse,
    UpdateMaintenanceStatusRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn request_maintenance_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<CreateMaintenanceRequest>,
) -> ApiResult<(StatusCode, Json<MaintenanceResponse>)> {
    let ticket = state
        .maintenance_service
        .request(&actor, payload.into_request()?)
        .await?;

    Ok((StatusCode::CREATED, Json(MaintenanceResponse::from(ticket))))
}

pub async fn list_maintenance_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Vec<MaintenanceResponse>>> {
    let tickets = state.maintenance_service.list(&actor).await?;
    Ok(Json(responses(tickets)))
}

pub async fn get_maintenance_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(ticket_id): Path<i64>,
) -> ApiResult<Json<MaintenanceResponse>> {
    let ticket = state.maintenance_service.get(&actor, ticket_id).await?;
    Ok(Json(MaintenanceResponse::from(ticket)))
}

pub async fn my_maintenance_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Vec<MaintenanceResponse>>> {
    let tickets = state.maintenance_service.my_tickets(&actor).await?;
    Ok(Json(responses(tickets)))
}

pub async fn my_assignments_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Vec<MaintenanceResponse>>> {
    let tickets = state.maintenance_service.my_assignments(&actor).await?;
    Ok(Json(responses(tickets)))
}

pub async fn assign_technician_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(ticket_id): Path<i64>,
    Json(payload): Json<AssignTechnicianRequest>,
) -> ApiResult<Json<MaintenanceResponse>> {
    let ticket = state
        .maintenance_service
        .assign_technician(&actor, ticket_id, payload.tecnico)
        .await?;

    Ok(Json(MaintenanceResponse::from(ticket)))
}

pub async fn update_maintenance_status_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(ticket_id): Path<i64>,
    Json(payload): Json<UpdateMaintenanceStatusRequest>,
) -> ApiResult<Json<MaintenanceResponse>> {
    let ticket = state
        .maintenance_service
        .update_status(&actor, ticket_id, payload.into_progress()?)
        .await?;

    Ok(Json(MaintenanceResponse::from(ticket)))
}

pub async fn delete_maintenance_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(ticket_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.maintenance_service.delete(&actor, ticket_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn responses(tickets: Vec<MaintenanceTicket>) -> Vec<MaintenanceResponse> {
    tickets.into_iter().map(MaintenanceResponse::from).collect()
}
