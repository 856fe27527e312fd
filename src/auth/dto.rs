use serde::{Deserialize, Serialize};

use crate::{
    auth::jwt::Claims,
    error::ApiError,
    users::dto::UserSummary,
    validate::{check_email, password_long_enough, present},
};

/// Request body for login.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(self) -> Result<Credentials, ApiError> {
        match (present(&self.email), present(&self.password)) {
            (Some(email), Some(password)) => Ok(Credentials {
                email: email.to_owned(),
                password: password.to_owned(),
            }),
            _ => Err(ApiError::incomplete("Email y contraseña son obligatorios")),
        }
    }
}

/// Request body for `PUT /auth/profile`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
}

impl ProfileRequest {
    pub fn validate(self) -> Result<ProfileUpdate, ApiError> {
        let (Some(name), Some(email)) = (present(&self.name), present(&self.email)) else {
            return Err(ApiError::incomplete("Name y email son obligatorios"));
        };
        check_email(email)?;
        Ok(ProfileUpdate {
            name: name.to_owned(),
            email: email.to_owned(),
        })
    }
}

/// Request body for `POST /auth/change-password`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub current: String,
    pub new: String,
}

impl ChangePasswordRequest {
    pub fn validate(self) -> Result<PasswordChange, ApiError> {
        let (Some(current), Some(new)) = (
            present(&self.current_password),
            present(&self.new_password),
        ) else {
            return Err(ApiError::incomplete(
                "Contraseña actual y nueva contraseña son obligatorias",
            ));
        };
        if !password_long_enough(new) {
            return Err(ApiError::validation(
                "Contraseña muy corta",
                "La nueva contraseña debe tener al menos 6 caracteres",
            ));
        }
        Ok(PasswordChange {
            current: current.to_owned(),
            new: new.to_owned(),
        })
    }
}

/// Response returned after login or register.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserSummary,
    pub token: String,
    pub expires_in: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub user: Claims,
    pub token_valid: bool,
}
