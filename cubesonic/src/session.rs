//! Audio session and interruption signalling.
//!
//! An [`AudioSession`] stands in for the platform's shared audio session. It
//! is created once by the application, shared by `Arc`, and handed to each
//! playback engine at construction. Interruptions (a phone call, another app
//! taking the device) are broadcast to every subscriber over its own channel
//! and drained by the engine on the driver thread.

use crate::error::{CubeSonicError, Result};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::sync::Mutex;

/// Start or end of an external audio interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionPhase {
    Began,
    Ended,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

/// Receiving end of a session subscription.
#[derive(Debug)]
pub struct SessionSubscription {
    id: SubscriptionId,
    receiver: Receiver<InterruptionPhase>,
}

impl SessionSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Next pending interruption, if any.
    pub fn try_next(&self) -> Option<InterruptionPhase> {
        match self.receiver.try_recv() {
            Ok(phase) => Some(phase),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sender<InterruptionPhase>)>,
    active: bool,
    interrupted: bool,
}

#[derive(Debug, Default)]
pub struct AudioSession {
    state: Mutex<SessionState>,
}

impl AudioSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates or deactivates the session.
    ///
    /// # Errors
    ///
    /// Activation is refused while an interruption is in progress.
    pub fn set_active(&self, active: bool) -> Result<()> {
        let mut state = self.lock()?;
        if active && state.interrupted {
            return Err(CubeSonicError::Session(
                "Cannot activate the session during an interruption".to_string(),
            ));
        }
        state.active = active;
        log::debug!("Audio session active: {}", active);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.lock().map(|state| state.active).unwrap_or(false)
    }

    pub fn is_interrupted(&self) -> bool {
        self.lock().map(|state| state.interrupted).unwrap_or(false)
    }

    pub fn subscribe(&self) -> Result<SessionSubscription> {
        let mut state = self.lock()?;
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;

        let (sender, receiver) = crossbeam_channel::unbounded();
        state.subscribers.push((id, sender));
        log::debug!("Session subscriber added: {}", id);

        Ok(SessionSubscription { id, receiver })
    }

    /// Removes a subscriber. Interruptions already queued for it are discarded.
    pub fn unsubscribe(&self, subscription: SessionSubscription) -> Result<()> {
        let mut state = self.lock()?;
        state.subscribers.retain(|(id, _)| *id != subscription.id);
        log::debug!("Session subscriber removed: {}", subscription.id);
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().map(|state| state.subscribers.len()).unwrap_or(0)
    }

    /// Broadcasts an interruption to every subscriber.
    ///
    /// `Began` deactivates the session; subscribers reactivate it when they
    /// handle `Ended`.
    pub fn interrupt(&self, phase: InterruptionPhase) -> Result<()> {
        let mut state = self.lock()?;
        match phase {
            InterruptionPhase::Began => {
                state.interrupted = true;
                state.active = false;
            }
            InterruptionPhase::Ended => state.interrupted = false,
        }

        // Drop subscribers whose receiving end is gone
        state
            .subscribers
            .retain(|(_, sender)| sender.send(phase).is_ok());

        log::info!(
            "Audio interruption {:?} sent to {} subscriber(s)",
            phase,
            state.subscribers.len()
        );
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SessionState>> {
        self.state
            .lock()
            .map_err(|_| CubeSonicError::Session("Session state lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_to_subscribers() {
        let session = AudioSession::new();
        let first = session.subscribe().unwrap();
        let second = session.subscribe().unwrap();
        assert_ne!(first.id(), second.id());

        session.interrupt(InterruptionPhase::Began).unwrap();
        assert_eq!(first.try_next(), Some(InterruptionPhase::Began));
        assert_eq!(second.try_next(), Some(InterruptionPhase::Began));
        assert_eq!(first.try_next(), None);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let session = AudioSession::new();
        let subscription = session.subscribe().unwrap();
        assert_eq!(session.subscriber_count(), 1);

        session.unsubscribe(subscription).unwrap();
        assert_eq!(session.subscriber_count(), 0);
        session.interrupt(InterruptionPhase::Began).unwrap();
    }

    #[test]
    fn test_activation_refused_while_interrupted() {
        let session = AudioSession::new();
        session.set_active(true).unwrap();
        assert!(session.is_active());

        session.interrupt(InterruptionPhase::Began).unwrap();
        assert!(!session.is_active());
        assert!(session.is_interrupted());
        assert!(session.set_active(true).is_err());

        session.interrupt(InterruptionPhase::Ended).unwrap();
        session.set_active(true).unwrap();
        assert!(session.is_active());
    }

    #[test]
    fn test_dropped_subscription_is_pruned() {
        let session = AudioSession::new();
        drop(session.subscribe().unwrap());
        session.interrupt(InterruptionPhase::Ended).unwrap();
        assert_eq!(session.subscriber_count(), 0);
    }
}
