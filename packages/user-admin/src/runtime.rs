//! Runtime: owns the state and connects machine, effects and front end.
//!
//! The runtime:
//! 1. Receives intents from [`AdminHandle`]s and completions from effect tasks
//! 2. Applies each event with [`AdminMachine::decide`], one at a time
//! 3. Spawns any resulting command on the effect executor, tagged with a request id
//! 4. Publishes a [`Snapshot`] and drains notices to the [`Notifier`]
//!
//! # Example
//!
//! ```rust,ignore
//! let effect = RestEffect::new(RestClient::from_config(&config)?);
//! let (runtime, handle) = AdminRuntime::builder(effect)
//!     .lock_policy(config.lock_policy)
//!     .build();
//! tokio::spawn(runtime.run());
//!
//! handle.dispatch(Event::FetchUsers)?;
//! let snapshot = handle.settled().await?;
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::command::Command;
use crate::effect::Effect;
use crate::error::{RequestError, RuntimeError};
use crate::event::Event;
use crate::machine::{AdminMachine, LockPolicy};
use crate::state::{AppState, Notice};

/// Receives notices as the runtime drains them from the state.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notice: &Notice);
}

/// Default notifier: logs each notice at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        warn!(
            message = %notice.message,
            detail = notice.detail.as_deref().unwrap_or(""),
            "operator notice"
        );
    }
}

/// State as last published by the runtime.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub state: AppState,
    /// Effect tasks spawned and not yet fed back.
    pub in_flight: usize,
    processed: u64,
}

impl Snapshot {
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0
    }
}

/// Cheap, cloneable handle for feeding intents to a running runtime.
#[derive(Clone)]
pub struct AdminHandle {
    intents: mpsc::UnboundedSender<Event>,
    snapshots: watch::Receiver<Snapshot>,
    dispatched: Arc<AtomicU64>,
}

impl AdminHandle {
    pub fn dispatch(&self, event: Event) -> Result<(), RuntimeError> {
        self.intents.send(event).map_err(|_| RuntimeError::Closed)?;
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until every event dispatched so far has been applied and no
    /// request is in flight, including follow-up refetches.
    pub async fn settled(&self) -> Result<Snapshot, RuntimeError> {
        let target = self.dispatched.load(Ordering::SeqCst);
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| s.processed >= target && s.is_idle())
            .await
            .map_err(|_| RuntimeError::Closed)?;
        Ok(snapshot.clone())
    }

    /// Wait for the next published snapshot.
    pub async fn changed(&mut self) -> Result<Snapshot, RuntimeError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| RuntimeError::Closed)?;
        Ok(self.snapshots.borrow_and_update().clone())
    }
}

pub struct AdminRuntimeBuilder<E> {
    effect: E,
    policy: LockPolicy,
    notifier: Arc<dyn Notifier>,
    state: AppState,
}

impl<E: Effect> AdminRuntimeBuilder<E> {
    pub fn lock_policy(mut self, policy: LockPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn notifier(mut self, notifier: impl Notifier) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    /// Start from an existing state instead of an empty one.
    pub fn initial_state(mut self, state: AppState) -> Self {
        self.state = state;
        self
    }

    pub fn build(self) -> (AdminRuntime<E>, AdminHandle) {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot {
            state: self.state.clone(),
            ..Snapshot::default()
        });

        let runtime = AdminRuntime {
            machine: AdminMachine::new(self.policy),
            effect: Arc::new(self.effect),
            notifier: self.notifier,
            state: self.state,
            intents: intent_rx,
            done_tx,
            done_rx,
            snapshots: snapshot_tx,
            in_flight: 0,
            processed: 0,
        };
        let handle = AdminHandle {
            intents: intent_tx,
            snapshots: snapshot_rx,
            dispatched: Arc::new(AtomicU64::new(0)),
        };
        (runtime, handle)
    }
}

enum Next {
    Completion(Event),
    Intent(Option<Event>),
}

pub struct AdminRuntime<E> {
    machine: AdminMachine,
    effect: Arc<E>,
    notifier: Arc<dyn Notifier>,
    state: AppState,
    intents: mpsc::UnboundedReceiver<Event>,
    done_tx: mpsc::UnboundedSender<Event>,
    done_rx: mpsc::UnboundedReceiver<Event>,
    snapshots: watch::Sender<Snapshot>,
    in_flight: usize,
    processed: u64,
}

impl<E: Effect> AdminRuntime<E> {
    pub fn builder(effect: E) -> AdminRuntimeBuilder<E> {
        AdminRuntimeBuilder {
            effect,
            policy: LockPolicy::default(),
            notifier: Arc::new(TracingNotifier),
            state: AppState::default(),
        }
    }

    /// Build with defaults and spawn the loop on the current tokio runtime.
    pub fn spawn(effect: E) -> AdminHandle {
        let (runtime, handle) = Self::builder(effect).build();
        tokio::spawn(runtime.run());
        handle
    }

    /// Process events until every handle is dropped and nothing is in flight.
    ///
    /// Returns the final state.
    pub async fn run(mut self) -> AppState {
        info!(policy = ?self.machine.policy(), "admin runtime starting");

        let mut intents_open = true;
        loop {
            let next = tokio::select! {
                // Completions first: they release locks that intents may be waiting on.
                biased;

                Some(event) = self.done_rx.recv() => Next::Completion(event),
                maybe = self.intents.recv(), if intents_open => Next::Intent(maybe),
                else => break,
            };

            match next {
                Next::Completion(event) => {
                    self.in_flight -= 1;
                    self.apply(event);
                }
                Next::Intent(Some(event)) => {
                    self.processed += 1;
                    self.apply(event);
                }
                Next::Intent(None) => {
                    debug!("all handles dropped");
                    intents_open = false;
                }
            }

            self.publish();

            if !intents_open && self.in_flight == 0 {
                break;
            }
        }

        info!(lock = self.state.lock, "admin runtime stopped");
        self.state
    }

    fn apply(&mut self, event: Event) {
        let name = event.name();
        let state = std::mem::take(&mut self.state);
        let (state, command) = self.machine.decide(state, event);
        self.state = state;
        debug!(event = name, lock = self.state.lock, "event applied");

        for notice in self.state.take_notices() {
            self.notifier.notify(&notice);
        }

        if let Some(command) = command {
            self.dispatch(command);
        }
    }

    fn dispatch(&mut self, command: Command) {
        let request_id = Uuid::new_v4();
        let span = info_span!("request", %request_id, command = command.name());
        let effect = self.effect.clone();
        let done = self.done_tx.clone();

        self.in_flight += 1;
        tokio::spawn(
            async move {
                debug!("dispatching");
                let fallback = command.clone();
                // Run in its own task so a panicking executor still yields a completion.
                let event = match tokio::spawn(async move { effect.execute(command).await }).await
                {
                    Ok(event) => event,
                    Err(join_err) => {
                        warn!(error = %join_err, "effect task aborted");
                        fallback.complete(Err(RequestError::other(format!(
                            "request aborted: {}",
                            join_err
                        ))))
                    }
                };
                // The runtime owns a sender, so this only fails once it is gone.
                let _ = done.send(event);
            }
            .instrument(span),
        );
    }

    fn publish(&self) {
        self.snapshots.send_replace(Snapshot {
            state: self.state.clone(),
            in_flight: self.in_flight,
            processed: self.processed,
        });
    }
}
