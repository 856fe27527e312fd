use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    validate::{check_email, password_long_enough, present, PageQuery},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    #[serde(flatten)]
    pub paging: PageQuery,
    pub role: Option<String>,
}

/// Body of `POST /api/users` and `POST /auth/register`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// A creation request that passed validation; password still in clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl CreateUserRequest {
    pub fn validate(self) -> Result<NewUser, ApiError> {
        let (Some(name), Some(email), Some(password)) = (
            present(&self.name),
            present(&self.email),
            present(&self.password),
        ) else {
            return Err(ApiError::incomplete(
                "Los campos name, email y password son obligatorios",
            ));
        };
        if !password_long_enough(password) {
            return Err(ApiError::validation(
                "Contraseña muy corta",
                "La contraseña debe tener al menos 6 caracteres",
            ));
        }
        check_email(email)?;
        Ok(NewUser {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            role: self.role.unwrap_or_default(),
        })
    }
}

/// Body of `PUT /api/users/:id`. Absent fields keep their stored value.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn validate(self) -> Result<UserChanges, ApiError> {
        let name = present(&self.name).map(str::to_owned);
        let email = present(&self.email).map(str::to_owned);
        if let Some(email) = &email {
            check_email(email)?;
        }
        Ok(UserChanges {
            name,
            email,
            role: self.role,
        })
    }
}

/// What creation and update endpoints echo back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}
