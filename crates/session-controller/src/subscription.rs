//! Observer handle for session state.

use crate::store::StateStore;
use crate::SessionState;
use futures_util::stream::{self, BoxStream};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

/// A live view of a controller's state.
///
/// Yields the value current at subscription time first, then every later
/// transition in order. Ends once the controller has been dropped.
pub struct StateSubscription {
    store: Weak<StateStore>,
    pending: Option<SessionState>,
    rx: broadcast::Receiver<SessionState>,
}

impl StateSubscription {
    pub(crate) fn new(store: &Arc<StateStore>) -> Self {
        let (current, rx) = store.snapshot_and_subscribe();
        Self {
            store: Arc::downgrade(store),
            pending: Some(current),
            rx,
        }
    }

    /// Wait for the next state. Returns `None` once the controller is gone.
    pub async fn next(&mut self) -> Option<SessionState> {
        if let Some(state) = self.pending.take() {
            return Some(state);
        }

        match self.rx.recv().await {
            Ok(state) => Some(state),
            Err(RecvError::Lagged(skipped)) => self.resync(skipped),
            Err(RecvError::Closed) => None,
        }
    }

    /// Return the next state if one is already buffered.
    pub fn try_next(&mut self) -> Option<SessionState> {
        if let Some(state) = self.pending.take() {
            return Some(state);
        }

        match self.rx.try_recv() {
            Ok(state) => Some(state),
            Err(TryRecvError::Lagged(skipped)) => self.resync(skipped),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Convert into a `Stream` of states.
    pub fn into_stream(self) -> BoxStream<'static, SessionState> {
        Box::pin(stream::unfold(self, |mut sub| async move {
            let state = sub.next().await?;
            Some((state, sub))
        }))
    }

    /// Skip whatever was missed and continue from the current value.
    fn resync(&mut self, skipped: u64) -> Option<SessionState> {
        let store = self.store.upgrade()?;
        warn!(skipped, "State observer lagged, resyncing to current state");
        let (current, rx) = store.snapshot_and_subscribe();
        self.rx = rx;
        Some(current)
    }
}
