use serde::{Deserialize, Deserializer, Serialize};

use crate::id::{EmailId, UserId};

/// A user as listed by `GET /rest/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// An email address owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub user_id: UserId,
    pub address: String,
}

/// Draft for a new email, bound to the user whose emails were last fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailDraft {
    pub user_id: UserId,
    pub address: String,
}

impl EmailDraft {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            address: String::new(),
        }
    }
}

// ============================================================================
// Wire bodies
// ============================================================================

/// Body of `GET /rest/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct UsersResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<User>,
}

/// Body of `GET /rest/emails?user_id=..`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailsResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub emails: Vec<Email>,
}

// The backend encodes an empty list as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /rest/users`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub name: String,
}

/// Body of `POST /rest/emails`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateEmailRequest {
    pub user_id: UserId,
    pub address: String,
}

/// Success body of `POST /rest/users`. Older servers reply with nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserCreated {
    #[serde(default)]
    pub user_id: Option<UserId>,
}

/// Success body of `POST /rest/emails`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmailCreated {
    #[serde(default)]
    pub email_id: Option<EmailId>,
}
