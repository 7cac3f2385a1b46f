use serde::{Deserialize, Serialize};

use crate::accounts::model::Account;

/// Request body for POST /signup. Field names match the original frontend
/// contract, camelCase included.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub fullname: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    pub school: Option<String>,
}

/// Request body for POST /signin.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Request body for POST /forgot-password.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request body for POST /reset-password.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public part of the account returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub fullname: String,
    pub email: String,
    pub school: Option<String>,
}

impl From<Account> for PublicUser {
    fn from(account: Account) -> Self {
        Self {
            fullname: account.fullname,
            email: account.email,
            school: account.school,
        }
    }
}

/// Response for a successful signin.
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}
