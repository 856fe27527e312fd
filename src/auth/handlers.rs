use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, ChangePasswordRequest, LoginRequest, ProfileRequest, VerifyResponse},
        jwt::{AuthUser, JwtKeys, TokenSubject},
    },
    envelope::{ApiResponse, ApiResult, Created},
    error::ApiError,
    extract::JsonBody,
    state::AppState,
    users::{
        dto::{CreateUserRequest, UserSummary},
        repo::{User, UserCredentials},
        services::{create_user, CreateUserError},
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", post(change_password))
        .route("/verify", get(verify))
}

fn respond_with_token(
    keys: &JwtKeys,
    user: UserSummary,
    label: &str,
) -> Result<AuthResponse, ApiError> {
    let token = keys
        .issue(&TokenSubject {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            name: user.name.clone(),
        })
        .map_err(|e| {
            error!(error = %e, "jwt sign failed");
            ApiError::internal(label, e)
        })?;
    Ok(AuthResponse {
        user,
        token,
        expires_in: keys.expires_in(),
    })
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> Created<AuthResponse> {
    const LABEL: &str = "Error al registrar usuario";
    let new_user = body.validate()?;
    let user = create_user(&state, new_user).await.map_err(|e| match e {
        CreateUserError::EmailTaken => {
            ApiError::conflict("Email ya registrado", "Ya existe una cuenta con este email")
        }
        other => ApiError::internal(LABEL, other),
    })?;

    let response = respond_with_token(&state.jwt, user, LABEL)?;
    info!(user_id = response.user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(response, "Usuario registrado exitosamente")),
    ))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<AuthResponse> {
    const LABEL: &str = "Error al iniciar sesión";
    let creds = body.validate()?;
    let bad_credentials =
        || ApiError::authentication("Credenciales inválidas", "Email o contraseña incorrectos");

    let Some(user) = UserCredentials::find_by_email(&state.db, &creds.email)
        .await
        .map_err(|e| ApiError::internal(LABEL, e))?
    else {
        warn!(email = %creds.email, "login unknown email");
        return Err(bad_credentials());
    };

    let ok = state
        .hasher
        .verify(creds.password, user.password.clone())
        .await
        .map_err(|e| ApiError::internal(LABEL, e))?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(bad_credentials());
    }

    let summary = UserSummary {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    };
    let response = respond_with_token(&state.jwt, summary, LABEL)?;
    info!(user_id = response.user.id, "user logged in");
    Ok(Json(ApiResponse::ok(response, "Inicio de sesión exitoso")))
}

#[instrument(skip(state, claims), fields(user_id = claims.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<User> {
    let user = User::find(&state.db, claims.id)
        .await
        .map_err(|e| ApiError::internal("Error al obtener perfil", e))?
        .ok_or_else(|| {
            ApiError::not_found(
                "Usuario no encontrado",
                "El usuario autenticado no existe en la base de datos",
            )
        })?;
    Ok(Json(ApiResponse::ok(user, "Perfil obtenido exitosamente")))
}

#[instrument(skip(state, claims, body), fields(user_id = claims.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    JsonBody(body): JsonBody<ProfileRequest>,
) -> ApiResult<UserSummary> {
    const LABEL: &str = "Error al actualizar perfil";
    let profile = body.validate()?;

    let taken = User::email_taken(&state.db, &profile.email, Some(claims.id))
        .await
        .map_err(|e| ApiError::internal(LABEL, e))?;
    if taken {
        warn!(email = %profile.email, "profile email belongs to another user");
        return Err(ApiError::conflict(
            "Email ya existe",
            "Ya existe otro usuario con este email",
        ));
    }

    UserCredentials::set_profile(&state.db, claims.id, &profile.name, &profile.email)
        .await
        .map_err(|e| ApiError::from_storage(LABEL, e))?;

    Ok(Json(ApiResponse::ok(
        UserSummary {
            id: claims.id,
            name: profile.name,
            email: profile.email,
            role: claims.role,
        },
        "Perfil actualizado exitosamente",
    )))
}

#[instrument(skip(state, claims, body), fields(user_id = claims.id))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    JsonBody(body): JsonBody<ChangePasswordRequest>,
) -> ApiResult<()> {
    const LABEL: &str = "Error al cambiar contraseña";
    let change = body.validate()?;

    let user = UserCredentials::find(&state.db, claims.id)
        .await
        .map_err(|e| ApiError::internal(LABEL, e))?
        .ok_or_else(|| {
            ApiError::not_found(
                "Usuario no encontrado",
                "El usuario autenticado no existe en la base de datos",
            )
        })?;

    let ok = state
        .hasher
        .verify(change.current, user.password)
        .await
        .map_err(|e| ApiError::internal(LABEL, e))?;
    if !ok {
        warn!("current password mismatch");
        return Err(ApiError::authentication(
            "Contraseña actual incorrecta",
            "La contraseña actual proporcionada no es correcta",
        ));
    }

    let hash = state
        .hasher
        .hash(change.new)
        .await
        .map_err(|e| ApiError::internal(LABEL, e))?;
    UserCredentials::set_password(&state.db, claims.id, &hash)
        .await
        .map_err(|e| ApiError::internal(LABEL, e))?;

    info!("password changed");
    Ok(Json(ApiResponse::done("Contraseña cambiada exitosamente")))
}

#[instrument(skip(claims), fields(user_id = claims.id))]
pub async fn verify(AuthUser(claims): AuthUser) -> ApiResult<VerifyResponse> {
    Ok(Json(ApiResponse::ok(
        VerifyResponse {
            user: claims,
            token_valid: true,
        },
        "Token válido",
    )))
}
