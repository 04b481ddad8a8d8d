use serde::{Deserialize, Serialize};
use smartsales_application::{IssuedUser, RoleDescriptor};
use smartsales_domain::UserAccount;
use ts_rs::TS;

use super::common::timestamp;

/// Incoming payload for user creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub rol: String,
}

/// Incoming payload for a role change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/change-role-request.ts"
)]
pub struct ChangeRoleRequest {
    pub rol: String,
}

/// API representation of a user account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub rol: String,
    pub fecha_registro: String,
    pub activo: bool,
}

/// Created account plus its one-time bearer token.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/created-user-response.ts"
)]
pub struct CreatedUserResponse {
    pub usuario: UserResponse,
    pub token: String,
}

/// API representation of a platform role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub nombre: String,
    pub descripcion: String,
    pub capacidades: Vec<String>,
}

impl From<UserAccount> for UserResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            telefono: account.phone,
            direccion: account.address,
            rol: account.role.as_str().to_owned(),
            fecha_registro: timestamp(account.joined_at),
            activo: account.active,
        }
    }
}

impl From<IssuedUser> for CreatedUserResponse {
    fn from(issued: IssuedUser) -> Self {
        Self {
            usuario: UserResponse::from(issued.account),
            token: issued.token,
        }
    }
}

impl From<RoleDescriptor> for RoleResponse {
    fn from(descriptor: RoleDescriptor) -> Self {
        Self {
            nombre: descriptor.role.as_str().to_owned(),
            descripcion: descriptor.description.to_owned(),
            capacidades: descriptor
                .capabilities
                .iter()
                .map(|capability| (*capability).to_owned())
                .collect(),
        }
    }
}
