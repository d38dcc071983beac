//! Declarative view model of the admin page.
//!
//! [`render`] turns the state into a tree of plain values that a front end
//! (the CLI, or anything else) draws. It decides which controls are enabled;
//! the front end only has to respect the flags.

use serde::Serialize;

use crate::id::{EmailId, UserId};
use crate::state::{AppState, Loading};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub enabled: bool,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Input {
    pub value: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminView {
    pub fetch_users: Button,
    pub new_user: Input,
    pub add_user: Button,
    pub users: Vec<UserRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRow {
    pub id: UserId,
    pub name: String,
    /// Clicking a collapsed row fetches the user's emails.
    pub open: Button,
    /// Present for the user the email draft points at.
    pub card: Option<UserCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserCard {
    pub delete: Button,
    pub new_email: Input,
    pub add_email: Button,
    pub emails: Vec<EmailRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailRow {
    pub id: EmailId,
    pub address: String,
    pub delete: Button,
}

impl AdminView {
    pub fn user(&self, id: UserId) -> Option<&UserRow> {
        self.users.iter().find(|u| u.id == id)
    }
}

fn button(enabled: bool) -> Button {
    Button {
        enabled,
        loading: false,
    }
}

pub fn render(state: &AppState) -> AdminView {
    let idle = !state.is_locked();

    let users = state
        .users
        .iter()
        .map(|user| {
            let card = state
                .new_email
                .as_ref()
                .filter(|draft| draft.user_id == user.id)
                .map(|draft| UserCard {
                    delete: button(idle),
                    new_email: Input {
                        value: draft.address.clone(),
                        enabled: idle,
                    },
                    add_email: button(idle && !draft.address.trim().is_empty()),
                    emails: state
                        .emails_of(user.id)
                        .map(|email| EmailRow {
                            id: email.id,
                            address: email.address.clone(),
                            delete: button(idle),
                        })
                        .collect(),
                });

            UserRow {
                id: user.id,
                name: user.name.clone(),
                open: button(idle && card.is_none()),
                card,
            }
        })
        .collect();

    AdminView {
        fetch_users: Button {
            enabled: idle,
            loading: state.loading == Some(Loading::Users),
        },
        new_user: Input {
            value: state.new_user.clone(),
            enabled: idle,
        },
        add_user: button(idle && !state.new_user.trim().is_empty()),
        users,
    }
}
