use tracing::{info, warn};

use crate::{
    db::StorageError,
    state::AppState,
    users::{dto::NewUser, dto::UserSummary, repo::User},
};

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("email already registered")]
    EmailTaken,
    #[error(transparent)]
    Storage(StorageError),
    #[error("password hashing failed: {0}")]
    Hash(#[from] anyhow::Error),
}

impl From<StorageError> for CreateUserError {
    fn from(e: StorageError) -> Self {
        // the insert can lose a race against a concurrent registration
        if e.is_unique_violation() {
            CreateUserError::EmailTaken
        } else {
            CreateUserError::Storage(e)
        }
    }
}

/// Uniqueness check, hash, insert. The check and the insert are not atomic;
/// the UNIQUE index on `users.email` settles any race and surfaces as
/// [`CreateUserError::EmailTaken`] too.
pub async fn create_user(state: &AppState, user: NewUser) -> Result<UserSummary, CreateUserError> {
    if User::email_taken(&state.db, &user.email, None).await? {
        warn!(email = %user.email, "email already registered");
        return Err(CreateUserError::EmailTaken);
    }

    let hash = state.hasher.hash(user.password.clone()).await?;
    let created = User::create(&state.db, &user, &hash).await?;

    info!(user_id = created.inserted_id, email = %user.email, "user created");
    Ok(UserSummary {
        id: created.inserted_id,
        name: user.name,
        email: user.email,
        role: user.role.as_str().to_owned(),
    })
}
