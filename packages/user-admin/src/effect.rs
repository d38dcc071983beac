//! Effect executor: the only place a command touches the network.
//!
//! # Key Properties
//!
//! - **Stateless**: commands carry everything the request needs
//! - **Always resolves**: `execute` returns an event, never an error; a
//!   failed request becomes the `Err` side of the completion event
//! - **One command, one event**: the runtime feeds the returned event back
//!   into the machine

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::command::Command;
use crate::event::Event;
use crate::rest::RestClient;

#[async_trait]
pub trait Effect: Send + Sync + 'static {
    /// Run the command and describe its outcome as a completion event.
    async fn execute(&self, command: Command) -> Event;
}

/// Production executor backed by [`RestClient`].
#[derive(Clone)]
pub struct RestEffect {
    client: RestClient,
}

impl RestEffect {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }
}

#[async_trait]
impl Effect for RestEffect {
    async fn execute(&self, command: Command) -> Event {
        let spec = command.request();
        let outcome = self.client.send(&spec).await;

        match &outcome {
            Ok(_) => debug!(command = command.name(), "command succeeded"),
            Err(err) => warn!(
                command = command.name(),
                status = ?err.status,
                error = %err,
                "command failed"
            ),
        }

        let event = command.complete(outcome);
        match &event {
            Event::UserAdded(Ok(created)) => {
                debug!(user_id = ?created.user_id, "server created user")
            }
            Event::EmailAdded {
                result: Ok(created),
                ..
            } => debug!(email_id = ?created.email_id, "server created email"),
            _ => {}
        }
        event
    }
}
