//! Connection manager for the engine lifecycle.
//!
//! The manager runs the setup protocol at most once per lifetime. Its state is
//! published through a `watch` channel so renderers can follow transitions,
//! while the engine and connection stay owned here and are only lent out.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, RwLock, RwLockReadGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::statements;
use crate::config::ConnectionSettings;
use crate::engine::{Engine, EngineConnection, EngineFactory};
use crate::error::{ConsoleError, InitError, InitStep, Result};

/// Exclusive access to the open connection, valid for one call.
///
/// At most one lease exists per manager; it is returned on drop.
pub struct ConnectionLease<'a> {
    conn: RwLockReadGuard<'a, dyn EngineConnection>,
    _slot: LeaseSlot<'a>,
}

impl Deref for ConnectionLease<'_> {
    type Target = dyn EngineConnection;

    fn deref(&self) -> &Self::Target {
        &*self.conn
    }
}

impl fmt::Debug for ConnectionLease<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionLease").finish_non_exhaustive()
    }
}

/// Marks the lease as taken until dropped.
struct LeaseSlot<'a>(&'a AtomicBool);

impl<'a> LeaseSlot<'a> {
    fn take(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LeaseSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Description of an online connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Engine name reported by the factory.
    pub engine: &'static str,
    /// Alias the catalog is attached under.
    pub alias: String,
    /// Bucket or location that was attached.
    pub bucket: String,
    /// Catalog REST endpoint.
    pub catalog_endpoint: String,
}

impl fmt::Display for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.alias, self.engine)
    }
}

/// Observable lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Initializing,
    Ready(ConnectionInfo),
    Failed(InitError),
}

impl ConnectionState {
    /// Returns true once the state can no longer change.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Failed(_))
    }

    /// Returns true if queries may run.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }

    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: &ConnectionState) -> bool {
        matches!(
            (self, next),
            (Self::Uninitialized, Self::Initializing)
                | (Self::Initializing, Self::Ready(_))
                | (Self::Initializing, Self::Failed(_))
        )
    }
}

/// How one run of the setup protocol ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Completed,
    Failed,
    Abandoned,
}

struct Active {
    engine: Box<dyn Engine>,
    conn: Box<dyn EngineConnection>,
}

/// Brings the engine online once and owns the resulting connection.
pub struct ConnectionManager {
    factory: Arc<dyn EngineFactory>,
    settings: ConnectionSettings,
    state: watch::Sender<ConnectionState>,
    active: RwLock<Option<Active>>,
    leased: AtomicBool,
    torn_down: CancellationToken,
}

impl ConnectionManager {
    /// Creates a manager in the `Uninitialized` state.
    pub fn new(factory: Arc<dyn EngineFactory>, settings: ConnectionSettings) -> Self {
        let (state, _) = watch::channel(ConnectionState::Uninitialized);
        Self {
            factory,
            settings,
            state,
            active: RwLock::new(None),
            leased: AtomicBool::new(false),
            torn_down: CancellationToken::new(),
        }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Returns true if the connection is ready for queries.
    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    /// Name of the engine behind this manager.
    pub fn engine_name(&self) -> &'static str {
        self.factory.name()
    }

    /// Runs the setup protocol if no attempt has been made yet.
    ///
    /// Callers arriving while an attempt is in flight wait for it to settle
    /// instead of starting another one. Once settled, this returns the
    /// settled state without contacting the engine.
    pub async fn initialize(&self) -> ConnectionState {
        if self.torn_down.is_cancelled() {
            return self.state();
        }

        if !self.transition(ConnectionState::Initializing) {
            return self.wait_until_settled().await;
        }

        info!(engine = self.factory.name(), "Initializing connection");
        match self.establish().await {
            Outcome::Completed => info!(alias = %self.settings.alias, "Connection ready"),
            Outcome::Failed => warn!("Connection initialization failed"),
            Outcome::Abandoned => debug!("Initialization abandoned after teardown"),
        }

        self.state()
    }

    /// Returns true while a connection lease is outstanding.
    pub fn is_leased(&self) -> bool {
        self.leased.load(Ordering::SeqCst)
    }

    /// Leases the open connection.
    ///
    /// Fails with `Busy` while another lease is outstanding, whichever
    /// component holds it, and with `NotReady` when no connection is open.
    pub async fn connection(&self) -> Result<ConnectionLease<'_>> {
        let slot = LeaseSlot::take(&self.leased).ok_or(ConsoleError::Busy)?;
        let guard = self.active.read().await;
        let conn = RwLockReadGuard::try_map(guard, |active| {
            active.as_ref().map(|active| active.conn.as_ref())
        })
        .map_err(|_| ConsoleError::NotReady)?;
        Ok(ConnectionLease { conn, _slot: slot })
    }

    /// Releases the connection and engine, and stops any in-flight setup from
    /// publishing its result.
    ///
    /// Waits for a borrowed connection to be returned first.
    pub async fn shutdown(&self) {
        self.torn_down.cancel();

        let active = self.active.write().await.take();
        if let Some(active) = active {
            release(active.engine, Some(active.conn)).await;
            info!("Connection closed");
        }
    }

    async fn wait_until_settled(&self) -> ConnectionState {
        let mut rx = self.state.subscribe();
        tokio::select! {
            settled = rx.wait_for(ConnectionState::is_settled) => match settled {
                Ok(state) => state.clone(),
                Err(_) => self.state(),
            },
            _ = self.torn_down.cancelled() => self.state(),
        }
    }

    async fn establish(&self) -> Outcome {
        let engine = match self.factory.instantiate().await {
            Ok(engine) => engine,
            Err(err) => {
                return self
                    .fail(InitError::at(InitStep::InstantiateEngine, err), None)
                    .await
            }
        };
        if self.torn_down.is_cancelled() {
            release(engine, None).await;
            return Outcome::Abandoned;
        }
        debug!("Engine instantiated");

        let conn = match engine.connect().await {
            Ok(conn) => conn,
            Err(err) => {
                return self
                    .fail(InitError::at(InitStep::OpenConnection, err), Some((engine, None)))
                    .await
            }
        };
        if self.torn_down.is_cancelled() {
            release(engine, Some(conn)).await;
            return Outcome::Abandoned;
        }
        debug!("Connection opened");

        for (step, sql) in statements::setup_plan(&self.settings) {
            if let Err(err) = conn.execute_batch(&sql).await {
                return self
                    .fail(InitError::at(step, err), Some((engine, Some(conn))))
                    .await;
            }
            if self.torn_down.is_cancelled() {
                release(engine, Some(conn)).await;
                return Outcome::Abandoned;
            }
            debug!(step = %step, "Setup statement applied");
        }

        let mut active = self.active.write().await;
        if self.torn_down.is_cancelled() {
            drop(active);
            release(engine, Some(conn)).await;
            return Outcome::Abandoned;
        }

        *active = Some(Active { engine, conn });
        self.transition(ConnectionState::Ready(ConnectionInfo {
            engine: self.factory.name(),
            alias: self.settings.alias.clone(),
            bucket: self.settings.bucket.clone(),
            catalog_endpoint: self.settings.catalog_endpoint.clone(),
        }));
        Outcome::Completed
    }

    async fn fail(
        &self,
        error: InitError,
        partial: Option<(Box<dyn Engine>, Option<Box<dyn EngineConnection>>)>,
    ) -> Outcome {
        warn!(step = %error.step, error = %error.message, "Setup step failed");
        if let Some((engine, conn)) = partial {
            release(engine, conn).await;
        }

        let _active = self.active.write().await;
        if self.torn_down.is_cancelled() {
            return Outcome::Abandoned;
        }
        self.transition(ConnectionState::Failed(error));
        Outcome::Failed
    }

    /// Applies a transition if the table allows it.
    fn transition(&self, next: ConnectionState) -> bool {
        let mut next = Some(next);
        self.state.send_if_modified(|current| match next.take() {
            Some(state) if current.can_transition_to(&state) => {
                debug!(from = current.label(), to = state.label(), "Connection state changed");
                *current = state;
                true
            }
            _ => false,
        })
    }
}

/// Closes the connection, then shuts the engine down.
async fn release(engine: Box<dyn Engine>, conn: Option<Box<dyn EngineConnection>>) {
    if let Some(conn) = conn {
        if let Err(e) = conn.close().await {
            warn!(error = %e, "Failed to close connection");
        }
    }
    if let Err(e) = engine.shutdown().await {
        warn!(error = %e, "Failed to shut down engine");
    }
}
