//! Interactive session
//!
//! Each round waits for the runtime to settle, renders the view and offers
//! only the actions whose controls are enabled.

use anyhow::{Context, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use user_admin::{render as render_view, AdminHandle, AdminView, EmailId, Event, UserId};

use crate::render::print_view;

/// Actions offered in the menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    FetchUsers,
    EditUserName,
    AddUser,
    Open(UserId),
    DeleteUser(UserId),
    EditEmailAddress,
    AddEmail,
    DeleteEmail(EmailId),
    Exit,
}

/// Menu entries for the enabled controls of `view`, in display order.
pub fn menu(view: &AdminView) -> Vec<(String, MenuAction)> {
    let mut items = Vec::new();

    if view.fetch_users.enabled {
        items.push(("Fetch users".to_string(), MenuAction::FetchUsers));
    }
    if view.new_user.enabled {
        items.push(("Set new user name".to_string(), MenuAction::EditUserName));
    }
    if view.add_user.enabled {
        items.push((
            format!("Add user \"{}\"", view.new_user.value),
            MenuAction::AddUser,
        ));
    }

    for row in &view.users {
        if row.open.enabled {
            items.push((format!("Open {}", row.name), MenuAction::Open(row.id)));
        }
        if let Some(card) = &row.card {
            if card.new_email.enabled {
                items.push((
                    format!("Set e-mail address for {}", row.name),
                    MenuAction::EditEmailAddress,
                ));
            }
            if card.add_email.enabled {
                items.push((
                    format!("Add {} to {}", card.new_email.value, row.name),
                    MenuAction::AddEmail,
                ));
            }
            for email in &card.emails {
                if email.delete.enabled {
                    items.push((
                        format!("Delete {}", email.address),
                        MenuAction::DeleteEmail(email.id),
                    ));
                }
            }
            if card.delete.enabled {
                items.push((format!("Delete user {}", row.name), MenuAction::DeleteUser(row.id)));
            }
        }
    }

    items.push(("Exit".to_string(), MenuAction::Exit));
    items
}

pub async fn run(handle: AdminHandle) -> Result<()> {
    handle.dispatch(Event::FetchUsers)?;

    loop {
        let snapshot = handle.settled().await?;
        let view = render_view(&snapshot.state);
        print_view(&view);

        let items = menu(&view);
        let labels: Vec<String> = items.iter().map(|(label, _)| label.clone()).collect();
        let selection = tokio::task::spawn_blocking(move || {
            Select::with_theme(&ColorfulTheme::default())
                .with_prompt("What would you like to do?")
                .items(&labels)
                .default(0)
                .interact()
        })
        .await
        .context("prompt task failed")??;

        let event = match items[selection].1.clone() {
            MenuAction::Exit => {
                println!("{}", style("Goodbye!").blue());
                return Ok(());
            }
            MenuAction::FetchUsers => Event::FetchUsers,
            MenuAction::EditUserName => Event::EditUserName(prompt("Name", view.new_user.value.clone()).await?),
            MenuAction::AddUser => Event::AddUser,
            MenuAction::Open(user_id) => Event::FetchEmails { user_id },
            MenuAction::DeleteUser(user_id) => Event::DeleteUser { user_id },
            MenuAction::EditEmailAddress => {
                let current = view
                    .users
                    .iter()
                    .find_map(|row| row.card.as_ref())
                    .map(|card| card.new_email.value.clone())
                    .unwrap_or_default();
                Event::EditEmailAddress(prompt("Email", current).await?)
            }
            MenuAction::AddEmail => Event::AddEmail,
            MenuAction::DeleteEmail(email_id) => Event::DeleteEmail { email_id },
        };

        handle.dispatch(event)?;
    }
}

async fn prompt(label: &'static str, initial: String) -> Result<String> {
    let text = tokio::task::spawn_blocking(move || {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(label)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
    })
    .await
    .context("prompt task failed")??;
    Ok(text)
}
