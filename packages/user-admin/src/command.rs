//! Commands: requests for I/O, as inert data.
//!
//! A transition never talks to the network. It returns a [`Command`] and the
//! effect executor turns it into an HTTP call. Each command knows which
//! request it stands for ([`Command::request`]) and which event its outcome
//! becomes ([`Command::complete`]), so the executor stays a thin interpreter.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::RequestError;
use crate::event::Event;
use crate::id::{EmailId, UserId};
use crate::types::{
    CreateEmailRequest, CreateUserRequest, EmailCreated, EmailsResponse, UserCreated,
    UsersResponse,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    FetchUsers,
    FetchEmails { user_id: UserId },
    CreateUser { name: String },
    DeleteUser { user_id: UserId },
    CreateEmail { user_id: UserId, address: String },
    DeleteEmail { email_id: EmailId },
}

/// The HTTP request a command describes, relative to the REST base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl RequestSpec {
    fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
        }
    }

    fn post(path: impl Into<String>, body: impl Serialize) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            // Plain structs of strings and integers always serialize.
            body: serde_json::to_value(body).ok(),
        }
    }
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::FetchUsers => "fetch_users",
            Command::FetchEmails { .. } => "fetch_emails",
            Command::CreateUser { .. } => "create_user",
            Command::DeleteUser { .. } => "delete_user",
            Command::CreateEmail { .. } => "create_email",
            Command::DeleteEmail { .. } => "delete_email",
        }
    }

    pub fn request(&self) -> RequestSpec {
        match self {
            Command::FetchUsers => RequestSpec::get("/rest/users"),
            Command::FetchEmails { user_id } => {
                RequestSpec::get(format!("/rest/emails?user_id={}", user_id))
            }
            Command::CreateUser { name } => {
                RequestSpec::post("/rest/users", CreateUserRequest { name: name.clone() })
            }
            Command::DeleteUser { user_id } => {
                RequestSpec::delete(format!("/rest/users/{}", user_id))
            }
            Command::CreateEmail { user_id, address } => RequestSpec::post(
                "/rest/emails",
                CreateEmailRequest {
                    user_id: *user_id,
                    address: address.clone(),
                },
            ),
            Command::DeleteEmail { email_id } => {
                RequestSpec::delete(format!("/rest/emails/{}", email_id))
            }
        }
    }

    /// Decode a raw outcome (success body text or error) into the completion event.
    pub fn complete(self, outcome: Result<String, RequestError>) -> Event {
        match self {
            Command::FetchUsers => {
                Event::UsersFetched(decode::<UsersResponse>(outcome).map(|r| r.users))
            }
            Command::FetchEmails { user_id } => Event::EmailsFetched {
                user_id,
                result: decode::<EmailsResponse>(outcome).map(|r| r.emails),
            },
            Command::CreateUser { .. } => Event::UserAdded(decode_lenient::<UserCreated>(outcome)),
            Command::DeleteUser { user_id } => Event::UserDeleted {
                user_id,
                result: outcome.map(|_| ()),
            },
            Command::CreateEmail { user_id, .. } => Event::EmailAdded {
                user_id,
                result: decode_lenient::<EmailCreated>(outcome),
            },
            Command::DeleteEmail { email_id } => Event::EmailDeleted {
                email_id,
                result: outcome.map(|_| ()),
            },
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    outcome: Result<String, RequestError>,
) -> Result<T, RequestError> {
    let body = outcome?;
    Ok(serde_json::from_str(&body)?)
}

// Creation endpoints may answer with an empty body or `null`; only the
// request status matters for them.
fn decode_lenient<T: serde::de::DeserializeOwned + Default>(
    outcome: Result<String, RequestError>,
) -> Result<T, RequestError> {
    let body = outcome?;
    Ok(serde_json::from_str::<Option<T>>(&body)
        .ok()
        .flatten()
        .unwrap_or_default())
}
