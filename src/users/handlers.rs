use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    envelope::{ApiResponse, ApiResult, Created, PageInfo},
    error::ApiError,
    extract::{JsonBody, PathParam, QueryParams},
    state::AppState,
    users::{
        dto::{CreateUserRequest, UpdateUserRequest, UserListQuery, UserSummary},
        repo::User,
        services::{create_user, CreateUserError},
    },
    validate::{parse_id, parse_page},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create))
        .route("/users/:id", get(get_user).put(update).delete(delete))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<UserListQuery>,
) -> ApiResult<Vec<User>> {
    let page = parse_page(&q.paging)?;
    let role = q.role.as_deref().filter(|r| !r.is_empty());
    let users = User::list(&state.db, role, page)
        .await
        .map_err(|e| ApiError::internal("Error al obtener usuarios", e))?;

    let info = PageInfo {
        page: page.page,
        limit: page.limit,
        total: users.len(),
    };
    Ok(Json(
        ApiResponse::ok(users, "Usuarios obtenidos exitosamente").with_pagination(info),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    PathParam(raw_id): PathParam<String>,
) -> ApiResult<User> {
    let user = match parse_id(&raw_id) {
        Some(id) => User::find(&state.db, id)
            .await
            .map_err(|e| ApiError::internal("Error al obtener usuario", e))?,
        None => None,
    };
    let user = user.ok_or_else(|| ApiError::user_not_found(&raw_id))?;
    Ok(Json(ApiResponse::ok(user, "Usuario encontrado exitosamente")))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> Created<UserSummary> {
    let new_user = body.validate()?;
    let user = create_user(&state, new_user).await.map_err(|e| match e {
        CreateUserError::EmailTaken => {
            ApiError::conflict("Email ya existe", "Ya existe un usuario con este email")
        }
        other => ApiError::internal("Error al crear usuario", other),
    })?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(user, "Usuario creado exitosamente")),
    ))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    PathParam(raw_id): PathParam<String>,
    JsonBody(body): JsonBody<UpdateUserRequest>,
) -> ApiResult<User> {
    const LABEL: &str = "Error al actualizar usuario";
    let id = existing_user_id(&state, &raw_id, LABEL).await?;
    let changes = body.validate()?;

    if let Some(email) = &changes.email {
        let taken = User::email_taken(&state.db, email, Some(id))
            .await
            .map_err(|e| ApiError::internal(LABEL, e))?;
        if taken {
            warn!(user_id = id, email = %email, "email belongs to another user");
            return Err(ApiError::conflict(
                "Email ya existe",
                "Ya existe otro usuario con este email",
            ));
        }
    }

    User::update(&state.db, id, &changes)
        .await
        .map_err(|e| ApiError::from_storage(LABEL, e))?;
    let user = User::find(&state.db, id)
        .await
        .map_err(|e| ApiError::internal(LABEL, e))?
        .ok_or_else(|| ApiError::user_not_found(id))?;

    info!(user_id = id, "user updated");
    Ok(Json(ApiResponse::ok(user, "Usuario actualizado exitosamente")))
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    PathParam(raw_id): PathParam<String>,
) -> ApiResult<()> {
    const LABEL: &str = "Error al eliminar usuario";
    let id = existing_user_id(&state, &raw_id, LABEL).await?;
    User::delete(&state.db, id)
        .await
        .map_err(|e| ApiError::internal(LABEL, e))?;

    info!(user_id = id, "user deleted");
    Ok(Json(ApiResponse::done("Usuario eliminado exitosamente")))
}

/// Existence check that must precede any mutation.
async fn existing_user_id(state: &AppState, raw_id: &str, label: &str) -> Result<i64, ApiError> {
    let Some(id) = parse_id(raw_id) else {
        return Err(ApiError::user_not_found(raw_id));
    };
    let exists = User::exists(&state.db, id)
        .await
        .map_err(|e| ApiError::internal(label, e))?;
    if exists {
        Ok(id)
    } else {
        Err(ApiError::user_not_found(raw_id))
    }
}
