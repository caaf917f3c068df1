//! Liveness poll
//!
//! One background task per connected session that pings the backend on a
//! fixed interval. Each ping is awaited before the next tick, so at most one
//! is in flight. The task ends itself on the first failed ping.

use super::ConnectionState;
use crate::api::transport::{ApiRequest, Transport};
use crate::error::{ConnectionError, ConnectionResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Ping once and record the outcome in `state`
pub(crate) async fn probe<T: Transport>(
    transport: &T,
    state: &watch::Sender<ConnectionState>,
) -> ConnectionResult<()> {
    let outcome = match transport.send(ApiRequest::get("/ping")).await {
        Ok(response) if response.is_success() => Ok(()),
        Ok(response) => Err(ConnectionError::Rejected {
            status: response.status,
        }),
        Err(e) => Err(e.into()),
    };

    match outcome {
        Ok(()) => {
            set_state(state, ConnectionState::Connected);
            Ok(())
        }
        Err(e) => {
            set_state(state, ConnectionState::Disconnected);
            Err(e)
        }
    }
}

/// Update the state, notifying observers only on an actual change
pub(crate) fn set_state(state: &watch::Sender<ConnectionState>, next: ConnectionState) {
    state.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            tracing::debug!(from = ?*current, to = ?next, "connection state changed");
            *current = next;
            true
        }
    });
}

/// Start the poll; the first ping fires one `period` from now
pub(crate) fn spawn<T: Transport>(
    transport: Arc<T>,
    state: Arc<watch::Sender<ConnectionState>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = probe(transport.as_ref(), &state).await {
                tracing::warn!(error = %e, "liveness ping failed; stopping poll");
                break;
            }
        }
    })
}
