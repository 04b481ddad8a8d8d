use axum::Json;
use axum::extract::{Extension, Query, State};

use smartsales_application::AuditLogQuery;
use smartsales_core::ActorContext;

use crate::dto::AuditEntryResponse;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct AuditListQuery {
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn list_audit_entries_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<AuditListQuery>,
) -> ApiResult<Json<Vec<AuditEntryResponse>>> {
    let entries = state
        .audit_recorder
        .list_entries(
            &actor,
            AuditLogQuery {
                search: query.search,
                limit: query.limit.unwrap_or(50).clamp(1, 500),
                offset: query.offset.unwrap_or(0),
            },
        )
        .await?
        .into_iter()
        .map(AuditEntryResponse::from)
        .collect();

    Ok(Json(entries))
}
