//! Events: facts fed into the state machine.
//!
//! Intents come from the operator (or a script driving the runtime).
//! Completions come back from the effect executor, one per dispatched command.

use crate::error::RequestError;
use crate::id::{EmailId, UserId};
use crate::types::{Email, EmailCreated, User, UserCreated};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // =========================================================================
    // Intents
    // =========================================================================
    EditUserName(String),
    EditEmailAddress(String),
    FetchUsers,
    FetchEmails { user_id: UserId },
    AddUser,
    DeleteUser { user_id: UserId },
    AddEmail,
    DeleteEmail { email_id: EmailId },

    // =========================================================================
    // Completions
    // =========================================================================
    UsersFetched(Result<Vec<User>, RequestError>),
    EmailsFetched {
        user_id: UserId,
        result: Result<Vec<Email>, RequestError>,
    },
    UserAdded(Result<UserCreated, RequestError>),
    UserDeleted {
        user_id: UserId,
        result: Result<(), RequestError>,
    },
    EmailAdded {
        user_id: UserId,
        result: Result<EmailCreated, RequestError>,
    },
    EmailDeleted {
        email_id: EmailId,
        result: Result<(), RequestError>,
    },
}

impl Event {
    /// True for intents that would dispatch a request.
    pub fn starts_request(&self) -> bool {
        matches!(
            self,
            Event::FetchUsers
                | Event::FetchEmails { .. }
                | Event::AddUser
                | Event::DeleteUser { .. }
                | Event::AddEmail
                | Event::DeleteEmail { .. }
        )
    }

    /// True for events produced by the effect executor.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Event::UsersFetched(_)
                | Event::EmailsFetched { .. }
                | Event::UserAdded(_)
                | Event::UserDeleted { .. }
                | Event::EmailAdded { .. }
                | Event::EmailDeleted { .. }
        )
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::EditUserName(_) => "edit_user_name",
            Event::EditEmailAddress(_) => "edit_email_address",
            Event::FetchUsers => "fetch_users",
            Event::FetchEmails { .. } => "fetch_emails",
            Event::AddUser => "add_user",
            Event::DeleteUser { .. } => "delete_user",
            Event::AddEmail => "add_email",
            Event::DeleteEmail { .. } => "delete_email",
            Event::UsersFetched(_) => "users_fetched",
            Event::EmailsFetched { .. } => "emails_fetched",
            Event::UserAdded(_) => "user_added",
            Event::UserDeleted { .. } => "user_deleted",
            Event::EmailAdded { .. } => "email_added",
            Event::EmailDeleted { .. } => "email_deleted",
        }
    }
}
