//! The single state value owned by the admin runtime.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::RequestError;
use crate::id::UserId;
use crate::types::{Email, EmailDraft, User};

/// Which bulk fetch is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Loading {
    Users,
}

/// Something the operator should be told about, usually a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub detail: Option<String>,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
            raised_at: Utc::now(),
        }
    }

    pub fn failed(message: impl Into<String>, err: &RequestError) -> Self {
        Self {
            detail: Some(err.message.clone()),
            ..Self::new(message)
        }
    }
}

/// UI state of the admin page.
///
/// Created once with empty collections. Every change goes through the
/// functions in [`crate::transition`]; nothing here performs I/O.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppState {
    /// Requests dispatched and not yet completed.
    pub lock: u32,
    pub loading: Option<Loading>,
    pub users: Vec<User>,
    pub emails: Vec<Email>,
    pub new_user: String,
    /// Set once a user's emails have been fetched.
    pub new_email: Option<EmailDraft>,
    /// Pending notices, drained by the runtime after each transition.
    pub notices: Vec<Notice>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controls that start a request must be disabled while this holds.
    pub fn is_locked(&self) -> bool {
        self.lock > 0
    }

    pub fn emails_of(&self, user_id: UserId) -> impl Iterator<Item = &Email> {
        self.emails.iter().filter(move |e| e.user_id == user_id)
    }

    /// The user whose card is expanded, if any.
    pub fn selected_user(&self) -> Option<UserId> {
        self.new_email.as_ref().map(|d| d.user_id)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
