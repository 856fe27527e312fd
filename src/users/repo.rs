use serde::Serialize;
use sqlx::FromRow;

use crate::{
    db::{Database, ExecOutcome, Param, StorageError},
    users::dto::{NewUser, UserChanges},
    validate::Page,
};

/// User as exposed over HTTP; the password column is never selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

/// Row used by the credential checks.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password: String,
}

const PUBLIC_COLUMNS: &str = "id, name, email, role, created_at";

impl User {
    pub async fn list(
        db: &Database,
        role: Option<&str>,
        page: Page,
    ) -> Result<Vec<User>, StorageError> {
        let mut sql = format!("SELECT {PUBLIC_COLUMNS} FROM users");
        let mut params: Vec<Param> = Vec::new();
        if let Some(role) = role {
            sql.push_str(" WHERE role = ?");
            params.push(role.into());
        }
        sql.push_str(" ORDER BY id LIMIT ? OFFSET ?");
        params.push(page.limit.into());
        params.push(page.offset().into());
        db.query(&sql, &params).await
    }

    pub async fn find(db: &Database, id: i64) -> Result<Option<User>, StorageError> {
        db.query_one(
            &format!("SELECT {PUBLIC_COLUMNS} FROM users WHERE id = ?"),
            &[id.into()],
        )
        .await
    }

    pub async fn exists(db: &Database, id: i64) -> Result<bool, StorageError> {
        let row: Option<(i64,)> = db
            .query_one("SELECT id FROM users WHERE id = ?", &[id.into()])
            .await?;
        Ok(row.is_some())
    }

    /// Is `email` taken by anybody other than `except`?
    pub async fn email_taken(
        db: &Database,
        email: &str,
        except: Option<i64>,
    ) -> Result<bool, StorageError> {
        let row: Option<(i64,)> = match except {
            Some(id) => {
                db.query_one(
                    "SELECT id FROM users WHERE email = ? AND id != ?",
                    &[email.into(), id.into()],
                )
                .await?
            }
            None => {
                db.query_one("SELECT id FROM users WHERE email = ?", &[email.into()])
                    .await?
            }
        };
        Ok(row.is_some())
    }

    /// Inserts a user whose password has already been hashed.
    pub async fn create(
        db: &Database,
        user: &NewUser,
        password_hash: &str,
    ) -> Result<ExecOutcome, StorageError> {
        db.execute(
            "INSERT INTO users (name, email, password, role) VALUES (?, ?, ?, ?)",
            &[
                user.name.as_str().into(),
                user.email.as_str().into(),
                password_hash.into(),
                user.role.as_str().into(),
            ],
        )
        .await
    }

    pub async fn update(
        db: &Database,
        id: i64,
        changes: &UserChanges,
    ) -> Result<ExecOutcome, StorageError> {
        db.execute(
            "UPDATE users SET name = COALESCE(?, name), email = COALESCE(?, email), \
             role = COALESCE(?, role), updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            &[
                changes.name.clone().into(),
                changes.email.clone().into(),
                changes.role.map(|r| r.as_str()).into(),
                id.into(),
            ],
        )
        .await
    }

    pub async fn delete(db: &Database, id: i64) -> Result<ExecOutcome, StorageError> {
        db.execute("DELETE FROM users WHERE id = ?", &[id.into()]).await
    }
}

impl UserCredentials {
    pub async fn find_by_email(
        db: &Database,
        email: &str,
    ) -> Result<Option<UserCredentials>, StorageError> {
        db.query_one(
            "SELECT id, name, email, role, password FROM users WHERE email = ?",
            &[email.into()],
        )
        .await
    }

    pub async fn find(db: &Database, id: i64) -> Result<Option<UserCredentials>, StorageError> {
        db.query_one(
            "SELECT id, name, email, role, password FROM users WHERE id = ?",
            &[id.into()],
        )
        .await
    }

    pub async fn set_password(
        db: &Database,
        id: i64,
        password_hash: &str,
    ) -> Result<ExecOutcome, StorageError> {
        db.execute(
            "UPDATE users SET password = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            &[password_hash.into(), id.into()],
        )
        .await
    }

    /// Profile edit: name and email only, role stays as issued.
    pub async fn set_profile(
        db: &Database,
        id: i64,
        name: &str,
        email: &str,
    ) -> Result<ExecOutcome, StorageError> {
        db.execute(
            "UPDATE users SET name = ?, email = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            &[name.into(), email.into(), id.into()],
        )
        .await
    }
}
