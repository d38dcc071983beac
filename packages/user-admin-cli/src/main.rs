// Command-line front end for the user admin runtime

mod interactive;
mod render;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use user_admin::{
    AdminHandle, AdminRuntime, Config, EmailId, Event, LockPolicy, Notice, Notifier, RestClient,
    RestEffect, Snapshot, UserId,
};

#[derive(Parser)]
#[command(name = "user-admin", about = "Manage users and their e-mail addresses")]
struct Cli {
    /// REST server root (overrides ADMIN_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in seconds (overrides ADMIN_REQUEST_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,

    /// Ask the server for detailed error messages
    #[arg(long)]
    debug: bool,

    /// advisory or reject (overrides ADMIN_LOCK_POLICY)
    #[arg(long)]
    lock_policy: Option<LockPolicy>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List users
    Users,
    /// Create a user and list users again
    AddUser { name: String },
    /// Remove a user
    DeleteUser { id: UserId },
    /// List a user's e-mail addresses
    Emails { user_id: UserId },
    /// Add an e-mail address to a user
    AddEmail { user_id: UserId, address: String },
    /// Remove an e-mail address
    DeleteEmail { id: EmailId },
    /// Browse and edit interactively (default)
    Interactive,
}

/// Prints notices to stderr and remembers how many there were.
#[derive(Clone, Default)]
struct ConsoleNotifier {
    count: Arc<AtomicUsize>,
}

impl ConsoleNotifier {
    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        self.count.fetch_add(1, Ordering::SeqCst);
        match &notice.detail {
            Some(detail) => eprintln!(
                "{} {} ({})",
                style("✗").red().bold(),
                style(&notice.message).red(),
                style(detail).dim()
            ),
            None => eprintln!("{} {}", style("!").yellow().bold(), notice.message),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,user_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    if cli.debug {
        config.debug = true;
    }
    if let Some(policy) = cli.lock_policy {
        config.lock_policy = policy;
    }
    tracing::debug!(base_url = %config.base_url, policy = ?config.lock_policy, "Configuration loaded");

    let client = RestClient::from_config(&config).context("Failed to build HTTP client")?;
    let notifier = ConsoleNotifier::default();
    let (runtime, handle) = AdminRuntime::builder(RestEffect::new(client))
        .lock_policy(config.lock_policy)
        .notifier(notifier.clone())
        .build();
    tokio::spawn(runtime.run());

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => return interactive::run(handle).await,
        Commands::Users => {
            let snapshot = run(&handle, [Event::FetchUsers]).await?;
            render::print_users(&snapshot.state);
        }
        Commands::AddUser { name } => {
            let snapshot = run(&handle, [Event::EditUserName(name), Event::AddUser]).await?;
            render::print_users(&snapshot.state);
        }
        Commands::DeleteUser { id } => {
            run(&handle, [Event::DeleteUser { user_id: id }]).await?;
        }
        Commands::Emails { user_id } => {
            let snapshot = run(&handle, [Event::FetchEmails { user_id }]).await?;
            render::print_emails(&snapshot.state, user_id);
        }
        Commands::AddEmail { user_id, address } => {
            // The draft only exists once the user's emails have been fetched.
            run(&handle, [Event::FetchEmails { user_id }]).await?;
            let snapshot = run(&handle, [Event::EditEmailAddress(address), Event::AddEmail]).await?;
            render::print_emails(&snapshot.state, user_id);
        }
        Commands::DeleteEmail { id } => {
            run(&handle, [Event::DeleteEmail { email_id: id }]).await?;
        }
    }

    let failed = notifier.count();
    if failed > 0 {
        bail!("{} request(s) failed", failed);
    }
    Ok(())
}

/// Dispatch events in order and wait for everything they started.
async fn run(handle: &AdminHandle, events: impl IntoIterator<Item = Event>) -> Result<Snapshot> {
    for event in events {
        handle.dispatch(event)?;
    }
    Ok(handle.settled().await?)
}
