//! Single-owner state holder with ordered fan-out.
//!
//! The FSM, the current `SessionState` and subscriber registration share one
//! lock, so a subscriber sees the value current at subscription time followed
//! by every later transition, with no gap and no repeat.

use crate::fsm::SessionEvent;
use crate::{SessionError, SessionMachine, SessionResult, SessionState};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

struct Core {
    machine: SessionMachine,
    state: SessionState,
}

pub(crate) struct StateStore {
    core: Mutex<Core>,
    tx: broadcast::Sender<SessionState>,
}

impl StateStore {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            core: Mutex::new(Core {
                machine: SessionMachine::new(),
                state: SessionState::Unauthenticated,
            }),
            tx,
        }
    }

    pub(crate) fn current(&self) -> SessionState {
        self.core.lock().state.clone()
    }

    /// Snapshot the current state and register a receiver for every later one.
    pub(crate) fn snapshot_and_subscribe(&self) -> (SessionState, broadcast::Receiver<SessionState>) {
        let core = self.core.lock();
        (core.state.clone(), self.tx.subscribe())
    }

    /// Run `event` through the FSM and publish the resulting state.
    ///
    /// A transition that leaves the state unchanged is not re-published.
    pub(crate) fn apply(&self, event: SessionEvent) -> SessionResult<SessionState> {
        let mut core = self.core.lock();
        let input = event.input();
        let old_phase = *core.machine.state();

        core.machine.consume(&input).map_err(|_| {
            SessionError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input, old_phase
            ))
        })?;

        let new_phase = *core.machine.state();
        let Some(next) = event.settle(new_phase) else {
            core.machine = SessionMachine::from_state(old_phase);
            return Err(SessionError::InvalidStateTransition(format!(
                "{:?} reached {:?} without the data it requires",
                input, new_phase
            )));
        };

        if next != core.state {
            debug!(
                old_state = ?old_phase,
                new_state = ?new_phase,
                "Session state transition"
            );
            core.state = next.clone();
            // No receivers is fine; the value stays readable via current()
            let _ = self.tx.send(next.clone());
        }

        Ok(next)
    }
}
