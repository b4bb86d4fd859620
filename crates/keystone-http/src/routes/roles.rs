//! User role endpoints (`/api/v1/user-roles`).

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use utoipa::ToSchema;

use keystone_service::api::ApiException;
use keystone_service::error::ModelNotFound;
use keystone_service::resource::{UserRoleCollection, UserRoleItem};
use keystone_service::roles::UserRole;

use crate::error::HttpFailure;
use crate::state::AppState;

const MAX_ROLE_NAME_LEN: usize = 255;

/// Request to create a user role.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRole {
    /// Unique role name.
    #[serde(default)]
    pub role_name: Option<String>,
}

/// Resolves a path id the way route model binding does: anything that is
/// not a known id is a missing model.
fn parse_id(raw: &str) -> Result<u64, HttpFailure> {
    raw.parse::<u64>()
        .map_err(|_| ModelNotFound::of::<UserRole>().with_ids([raw]).into())
}

/// List user roles.
#[utoipa::path(
    get,
    path = "/api/v1/user-roles",
    responses(
        (status = 200, description = "All user roles", body = UserRoleCollection),
    ),
    tag = "User Roles"
)]
pub async fn index(State(state): State<AppState>) -> Json<UserRoleCollection> {
    Json(UserRoleCollection::new(&state.roles().list()))
}

/// Create a user role.
#[utoipa::path(
    post,
    path = "/api/v1/user-roles",
    request_body = CreateUserRole,
    responses(
        (status = 201, description = "Role created", body = UserRoleItem),
        (status = 400, description = "Malformed body", body = keystone_service::translate::ErrorResponse),
        (status = 422, description = "Validation failed", body = keystone_service::translate::ErrorResponse),
        (status = 500, description = "Duplicate role name", body = keystone_service::translate::ErrorResponse),
    ),
    tag = "User Roles"
)]
pub async fn store(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRole>, JsonRejection>,
) -> Result<(StatusCode, Json<UserRoleItem>), HttpFailure> {
    let Json(req) = body?;
    let name = match req.role_name {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(
                ApiException::invalid_field("role_name", "The role name field is required.")
                    .into(),
            );
        }
    };
    if name.chars().count() > MAX_ROLE_NAME_LEN {
        return Err(ApiException::invalid_field(
            "role_name",
            format!("The role name field must not be greater than {MAX_ROLE_NAME_LEN} characters."),
        )
        .into());
    }

    let role = state.roles().create(&name)?;
    Ok((StatusCode::CREATED, Json(UserRoleItem::new(&role))))
}

/// Show a user role.
#[utoipa::path(
    get,
    path = "/api/v1/user-roles/{id}",
    params(("id" = u64, Path, description = "User role id")),
    responses(
        (status = 200, description = "The user role", body = UserRoleItem),
        (status = 404, description = "No such role", body = keystone_service::translate::ErrorResponse),
    ),
    tag = "User Roles"
)]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserRoleItem>, HttpFailure> {
    let role = state.roles().find_or_fail(parse_id(&id)?)?;
    Ok(Json(UserRoleItem::new(&role)))
}

/// Delete a user role.
#[utoipa::path(
    delete,
    path = "/api/v1/user-roles/{id}",
    params(("id" = u64, Path, description = "User role id")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "No such role", body = keystone_service::translate::ErrorResponse),
    ),
    tag = "User Roles"
)]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, HttpFailure> {
    state.roles().delete(parse_id(&id)?)?;
    Ok(StatusCode::NO_CONTENT)
}
