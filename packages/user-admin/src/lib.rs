//! # user-admin
//!
//! Admin client for a users/emails REST backend where transitions decide,
//! effects execute, and a lock counter keeps mutations from overlapping.
//!
//! ## Architecture
//!
//! ```text
//! Front end (CLI)
//!     │
//!     ▼ dispatch(intent)
//! AdminRuntime.run() loop ◄─────────────────────────┐
//!     │                                             │
//!     ▼                                             │
//! AdminMachine.decide(state, event)                 │
//!     │        │                                    │
//!     │        └─► Some(Command) ─► Effect.execute()│
//!     │                                 │           │
//!     ▼                                 └─► completion event
//! Snapshot ─► view::render() ─► front end
//! ```
//!
//! ## Key Invariants
//!
//! 1. **Transitions are pure** - no I/O, state in, state (and command) out
//! 2. **Commands are data** - a tagged enum interpreted by one executor
//! 3. **Lock is balanced** - every `begin_*` locks once, its completion unlocks once
//! 4. **Confirm, then apply** - failures notify and change nothing else
//! 5. **Every command resolves** - the executor always returns a completion event
//!
//! ## Example
//!
//! ```rust,ignore
//! use user_admin::{AdminRuntime, Config, Event, RestClient, RestEffect};
//!
//! let config = Config::from_env()?;
//! let effect = RestEffect::new(RestClient::from_config(&config)?);
//! let (runtime, handle) = AdminRuntime::builder(effect)
//!     .lock_policy(config.lock_policy)
//!     .build();
//! tokio::spawn(runtime.run());
//!
//! handle.dispatch(Event::FetchUsers)?;
//! let snapshot = handle.settled().await?;
//! for user in &snapshot.state.users {
//!     println!("{} {}", user.id, user.name);
//! }
//! ```

pub mod command;
pub mod config;
pub mod effect;
pub mod error;
pub mod event;
pub mod id;
pub mod machine;
pub mod rest;
pub mod runtime;
pub mod state;
pub mod transition;
pub mod types;
pub mod view;

pub use command::{Command, RequestSpec};
pub use config::Config;
pub use effect::{Effect, RestEffect};
pub use error::{RequestError, RuntimeError};
pub use event::Event;
pub use id::{EmailId, Id, UserId};
pub use machine::{AdminMachine, LockPolicy};
pub use rest::RestClient;
pub use runtime::{AdminHandle, AdminRuntime, AdminRuntimeBuilder, Notifier, Snapshot, TracingNotifier};
pub use state::{AppState, Loading, Notice};
pub use types::{Email, EmailCreated, EmailDraft, User, UserCreated};
pub use view::{render, AdminView};

// Re-export commonly used external types
pub use async_trait::async_trait;
