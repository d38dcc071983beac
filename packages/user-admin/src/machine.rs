//! The admin machine: routes events to transitions.
//!
//! Machines are pure. `decide` takes the current state and one event and
//! returns the next state plus at most one command. It is called serially by
//! the runtime, never concurrently.

use std::str::FromStr;

use tracing::debug;

use crate::command::Command;
use crate::event::Event;
use crate::state::{AppState, Notice};
use crate::transition;

/// What to do with an intent that would start a request while one is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockPolicy {
    /// The lock only disables view controls; intents are always honoured.
    #[default]
    Advisory,
    /// Intents that start a request are refused while `lock > 0`.
    Reject,
}

impl FromStr for LockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(LockPolicy::Advisory),
            "reject" => Ok(LockPolicy::Reject),
            other => Err(format!(
                "unknown lock policy \"{}\" (expected advisory or reject)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AdminMachine {
    policy: LockPolicy,
}

impl AdminMachine {
    pub fn new(policy: LockPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    /// Apply one event.
    ///
    /// Completions are never refused, so follow-up commands they produce
    /// (the refetch after a create) go out regardless of the policy.
    pub fn decide(&self, state: AppState, event: Event) -> (AppState, Option<Command>) {
        if self.policy == LockPolicy::Reject && event.starts_request() && state.is_locked() {
            debug!(event = event.name(), lock = state.lock, "intent refused while locked");
            let mut state = state;
            state
                .notices
                .push(Notice::new("another request is still in progress"));
            return (state, None);
        }

        match event {
            Event::EditUserName(text) => (transition::update_draft_user_name(state, text), None),
            Event::EditEmailAddress(text) => {
                (transition::update_draft_email_address(state, text), None)
            }
            Event::FetchUsers => some(transition::begin_fetch_users(state)),
            Event::FetchEmails { user_id } => {
                some(transition::begin_fetch_emails(state, user_id))
            }
            Event::AddUser => some(transition::begin_add_user(state)),
            Event::DeleteUser { user_id } => some(transition::begin_delete_user(state, user_id)),
            Event::AddEmail => transition::begin_add_email(state),
            Event::DeleteEmail { email_id } => {
                some(transition::begin_delete_email(state, email_id))
            }

            Event::UsersFetched(result) => (transition::on_users_fetched(state, result), None),
            Event::EmailsFetched { user_id, result } => {
                (transition::on_emails_fetched(state, user_id, result), None)
            }
            Event::UserAdded(result) => transition::on_user_added(state, result),
            Event::UserDeleted { user_id, result } => {
                (transition::on_user_deleted(state, user_id, result), None)
            }
            Event::EmailAdded { user_id, result } => {
                transition::on_email_added(state, user_id, result)
            }
            Event::EmailDeleted { email_id, result } => {
                (transition::on_email_deleted(state, email_id, result), None)
            }
        }
    }
}

fn some((state, command): (AppState, Command)) -> (AppState, Option<Command>) {
    (state, Some(command))
}
