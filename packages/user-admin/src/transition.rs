//! Pure state transitions.
//!
//! Every function takes the state by value and hands back the next state,
//! plus a [`Command`] when a request has to be made. `begin_*` locks and
//! schedules; the matching `on_*` unlocks whatever the outcome. Failures only
//! push a [`Notice`]; nothing is applied before the server confirms it.

use crate::command::Command;
use crate::error::RequestError;
use crate::id::{EmailId, UserId};
use crate::state::{AppState, Loading, Notice};
use crate::types::{Email, EmailCreated, EmailDraft, User, UserCreated};

pub fn lock(mut state: AppState) -> AppState {
    state.lock += 1;
    state
}

pub fn unlock(mut state: AppState) -> AppState {
    state.lock = state.lock.saturating_sub(1);
    state
}

pub fn update_draft_user_name(mut state: AppState, text: impl Into<String>) -> AppState {
    state.new_user = text.into();
    state
}

/// Ignored until a user's emails have been fetched, since there is no
/// user to attach the address to.
pub fn update_draft_email_address(mut state: AppState, text: impl Into<String>) -> AppState {
    if let Some(draft) = state.new_email.as_mut() {
        draft.address = text.into();
    }
    state
}

// ============================================================================
// Users
// ============================================================================

pub fn begin_fetch_users(mut state: AppState) -> (AppState, Command) {
    state.loading = Some(Loading::Users);
    (lock(state), Command::FetchUsers)
}

pub fn on_users_fetched(state: AppState, result: Result<Vec<User>, RequestError>) -> AppState {
    let mut state = unlock(state);
    state.loading = None;
    match result {
        Ok(users) => state.users = users,
        Err(err) => state.notices.push(Notice::failed("could not fetch users", &err)),
    }
    state
}

pub fn begin_add_user(state: AppState) -> (AppState, Command) {
    let command = Command::CreateUser {
        name: state.new_user.clone(),
    };
    (lock(state), command)
}

/// On success the list is fetched again rather than merged locally.
pub fn on_user_added(
    state: AppState,
    result: Result<UserCreated, RequestError>,
) -> (AppState, Option<Command>) {
    let mut state = unlock(state);
    match result {
        Ok(_) => {
            state.new_user.clear();
            let (state, refetch) = begin_fetch_users(state);
            (state, Some(refetch))
        }
        Err(err) => {
            state.notices.push(Notice::failed("could not add user", &err));
            (state, None)
        }
    }
}

pub fn begin_delete_user(state: AppState, user_id: UserId) -> (AppState, Command) {
    (lock(state), Command::DeleteUser { user_id })
}

/// The deleted user's emails are dropped with it, and so is a draft aimed at it.
pub fn on_user_deleted(
    state: AppState,
    user_id: UserId,
    result: Result<(), RequestError>,
) -> AppState {
    let mut state = unlock(state);
    match result {
        Ok(()) => {
            state.users.retain(|u| u.id != user_id);
            state.emails.retain(|e| e.user_id != user_id);
            if state.selected_user() == Some(user_id) {
                state.new_email = None;
            }
        }
        Err(err) => state.notices.push(Notice::failed("could not remove user", &err)),
    }
    state
}

// ============================================================================
// Emails
// ============================================================================

pub fn begin_fetch_emails(state: AppState, user_id: UserId) -> (AppState, Command) {
    (lock(state), Command::FetchEmails { user_id })
}

/// Replaces every entry of `user_id` with the fetched list and points the
/// email draft at that user.
pub fn on_emails_fetched(
    state: AppState,
    user_id: UserId,
    result: Result<Vec<Email>, RequestError>,
) -> AppState {
    let mut state = unlock(state);
    match result {
        Ok(fetched) => {
            state.emails.retain(|e| e.user_id != user_id);
            state.emails.extend(fetched);
            state.new_email = Some(EmailDraft::for_user(user_id));
        }
        Err(err) => state
            .notices
            .push(Notice::failed("could not fetch e-mails", &err)),
    }
    state
}

/// Without a draft target nothing is locked or scheduled.
pub fn begin_add_email(mut state: AppState) -> (AppState, Option<Command>) {
    let Some(draft) = state.new_email.clone() else {
        state
            .notices
            .push(Notice::new("select a user before adding an e-mail address"));
        return (state, None);
    };

    let command = Command::CreateEmail {
        user_id: draft.user_id,
        address: draft.address,
    };
    (lock(state), Some(command))
}

pub fn on_email_added(
    state: AppState,
    user_id: UserId,
    result: Result<EmailCreated, RequestError>,
) -> (AppState, Option<Command>) {
    let mut state = unlock(state);
    match result {
        Ok(_) => {
            let (state, refetch) = begin_fetch_emails(state, user_id);
            (state, Some(refetch))
        }
        Err(err) => {
            state
                .notices
                .push(Notice::failed("could not add e-mail address", &err));
            (state, None)
        }
    }
}

pub fn begin_delete_email(state: AppState, email_id: EmailId) -> (AppState, Command) {
    (lock(state), Command::DeleteEmail { email_id })
}

pub fn on_email_deleted(
    state: AppState,
    email_id: EmailId,
    result: Result<(), RequestError>,
) -> AppState {
    let mut state = unlock(state);
    match result {
        Ok(()) => state.emails.retain(|e| e.id != email_id),
        Err(err) => state
            .notices
            .push(Notice::failed("could not remove e-mail", &err)),
    }
    state
}
