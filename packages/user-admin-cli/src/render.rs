//! Terminal rendering of admin state and view

use console::style;
use user_admin::{AdminView, AppState, UserId};

pub fn print_users(state: &AppState) {
    if state.users.is_empty() {
        println!("{}", style("no users").dim());
        return;
    }
    for user in &state.users {
        println!("{:>6}  {}", style(user.id).cyan(), user.name);
    }
}

pub fn print_emails(state: &AppState, user_id: UserId) {
    let mut any = false;
    for email in state.emails_of(user_id) {
        any = true;
        println!("{:>6}  {}", style(email.id).cyan(), email.address);
    }
    if !any {
        println!("{}", style(format!("no e-mail addresses for user {}", user_id)).dim());
    }
}

pub fn print_view(view: &AdminView) {
    println!();
    let fetch = if view.fetch_users.loading {
        style("loading users…").yellow().to_string()
    } else {
        style("Users").bold().to_string()
    };
    println!("{}", fetch);

    if !view.new_user.value.is_empty() {
        println!("  new user: {}", style(&view.new_user.value).italic());
    }

    for row in &view.users {
        match &row.card {
            None => println!("  {:>4}  {}", style(row.id).cyan(), row.name),
            Some(card) => {
                println!("  {:>4}  {}", style(row.id).cyan(), style(&row.name).bold().underlined());
                for email in &card.emails {
                    println!("        {:>4}  {}", style(email.id).dim(), email.address);
                }
                if !card.new_email.value.is_empty() {
                    println!("        new e-mail: {}", style(&card.new_email.value).italic());
                }
            }
        }
    }
}
