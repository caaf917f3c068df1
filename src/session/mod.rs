//! Connection/session manager
//!
//! [`Session`] owns the connection parameters, the connection state and the
//! liveness poll. It is the only writer of [`ConnectionState`]; everything
//! else observes it through [`Session::subscribe`] or the [`TableClient`]
//! handed out by [`Session::tables`].

mod poller;

use crate::api::client::TableClient;
use crate::api::transport::{ApiRequest, RequestBody, Transport};
use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, ConnectionResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Default spacing between liveness pings
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Liveness of the backend session as last reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    /// Nothing has been asked of the backend yet
    #[default]
    Unknown,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connected => "connected",
            ConnectionState::Unknown => "unknown",
        }
    }
}

/// A client-side handle on one backend session
pub struct Session<T: Transport> {
    transport: Arc<T>,
    state: Arc<watch::Sender<ConnectionState>>,
    config: Option<ConnectionConfig>,
    poll_interval: Duration,
    poller: Option<JoinHandle<()>>,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self::with_poll_interval(transport, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(transport: T, poll_interval: Duration) -> Self {
        let (state, _) = watch::channel(ConnectionState::Unknown);
        Self {
            transport: Arc::new(transport),
            state: Arc::new(state),
            config: None,
            poll_interval,
            poller: None,
        }
    }

    /// Open a backend session and start the liveness poll
    ///
    /// # Errors
    /// `InvalidConfig` before any request if the parameters are unusable;
    /// `Unreachable`, `Timeout` or `Rejected` if the backend refuses.
    /// On error the state is `Disconnected`.
    pub async fn connect(&mut self, config: ConnectionConfig) -> ConnectionResult<()> {
        config
            .validate()
            .map_err(|e| ConnectionError::InvalidConfig(e.to_string()))?;

        self.stop_polling();
        let body = serde_json::json!({ "conn_str": config.conn_str() });
        let result = self
            .transport
            .send(ApiRequest::post("/connect", RequestBody::Json(body)))
            .await;

        let outcome = match result {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(ConnectionError::Rejected {
                status: response.status,
            }),
            Err(e) => Err(e.into()),
        };

        match outcome {
            Ok(()) => {
                tracing::info!(target_db = %config.display_target(), "connected");
                self.config = Some(config);
                poller::set_state(&self.state, ConnectionState::Connected);
                self.start_polling();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(target_db = %config.display_target(), error = %e, "connect failed");
                poller::set_state(&self.state, ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Close the backend session
    ///
    /// The poll is stopped and the state becomes `Disconnected` whatever the
    /// backend answers; a failed close is still reported.
    pub async fn disconnect(&mut self) -> ConnectionResult<()> {
        self.stop_polling();
        let result = self
            .transport
            .send(ApiRequest::post("/close", RequestBody::Empty))
            .await;
        poller::set_state(&self.state, ConnectionState::Disconnected);

        match result {
            Ok(response) if response.is_success() => {
                tracing::info!("disconnected");
                Ok(())
            }
            Ok(response) => Err(ConnectionError::Rejected {
                status: response.status,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// One liveness check; a failure marks the session disconnected and
    /// cancels the poll
    pub async fn ping(&mut self) -> ConnectionResult<()> {
        let result = poller::probe(self.transport.as_ref(), &self.state).await;
        if result.is_err() {
            self.stop_polling();
        }
        result
    }

    /// Pick up a backend session left open by an earlier run
    pub async fn resume(&mut self) -> ConnectionState {
        if self.ping().await.is_ok() && !self.is_polling() {
            self.start_polling();
        }
        self.state()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Whether a liveness poll task is currently alive
    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Parameters of the last successful connect
    pub fn config(&self) -> Option<&ConnectionConfig> {
        self.config.as_ref()
    }

    /// Read-only view of the connection state
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Table/query client bound to this session
    pub fn tables(&self) -> TableClient<T> {
        TableClient::new(Arc::clone(&self.transport), self.subscribe())
    }

    fn start_polling(&mut self) {
        self.stop_polling();
        self.poller = Some(poller::spawn(
            Arc::clone(&self.transport),
            Arc::clone(&self.state),
            self.poll_interval,
        ));
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poller.take() {
            handle.abort();
        }
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
