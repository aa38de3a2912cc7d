use crate::api::{Session, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Backend session linked to a Discord account.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LinkedSession {
    pub discord_id: String,
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    /// Device credential enrolled with `/enroll`, used for biometric punches.
    pub credential_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkedSession {
    pub fn session(&self) -> Session {
        Session {
            token: self.token.clone(),
            user: UserProfile {
                id: self.user_id.clone(),
                name: self.name.clone(),
                email: self.email.clone(),
            },
        }
    }
}
