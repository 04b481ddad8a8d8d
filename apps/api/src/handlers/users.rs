use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use smartsales_application::CreateUserInput;
use smartsales_core::{ActorContext, UserRole};

use crate::dto::{
    ChangeRoleRequest, CreateUserRequest, CreatedUserResponse, RoleResponse, UserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::parse_optional;

#[derive(Debug, serde::Deserialize)]
pub struct UserListQuery {
    pub rol: Option<String>,
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreatedUserResponse>)> {
    let issued = state
        .user_service
        .create_user(
            &actor,
            CreateUserInput {
                username: payload.username,
                email: payload.email,
                phone: payload.telefono,
                address: payload.direccion,
                role: payload.rol.parse()?,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedUserResponse::from(issued))))
}

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let role = parse_optional::<UserRole>(query.rol)?;
    let users = state
        .user_service
        .list_users(&actor, role)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn list_customers_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let customers = state
        .user_service
        .list_users(&actor, Some(UserRole::Cliente))
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(customers))
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.user_service.current_user(&actor).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn change_role_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(user_id): Path<i64>,
    Json(payload): Json<ChangeRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_service
        .change_role(&actor, user_id, payload.rol.parse()?)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.user_service.delete_user(&actor, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_roles_handler(State(state): State<AppState>) -> Json<Vec<RoleResponse>> {
    Json(
        state
            .user_service
            .list_roles()
            .into_iter()
            .map(RoleResponse::from)
            .collect(),
    )
}
