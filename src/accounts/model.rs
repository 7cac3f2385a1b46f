use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub school: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expiry: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

/// Fields supplied at signup; everything else is store-assigned.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub fullname: String,
    pub email: String,
    pub password_hash: String,
    pub school: Option<String>,
}

impl Account {
    /// Token and expiry always move together; a token without an expiry (or
    /// vice versa) is unrepresentable through these two methods.
    pub fn set_pending_reset(&mut self, token: String, expiry: OffsetDateTime) {
        self.reset_token = Some(token);
        self.reset_token_expiry = Some(expiry);
    }

    pub fn clear_pending_reset(&mut self) {
        self.reset_token = None;
        self.reset_token_expiry = None;
    }

    pub fn has_pending_reset(&self) -> bool {
        self.reset_token.is_some() && self.reset_token_expiry.is_some()
    }
}
