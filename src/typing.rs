//! Typing indicator timers
//!
//! One cancellable expiry per (room, username). Expiries are delivered as
//! `TypingExpiry` values on a channel read by the coordinator; each carries the
//! generation it was armed with, so an expiry that raced a cancel or a
//! reschedule is recognised as stale and ignored.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::types::{ClientId, RoomName};

/// How long a typing indicator lives without a refresh
pub const TYPING_TIMEOUT: Duration = Duration::from_secs(3);

/// Timer key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypingKey {
    pub room: RoomName,
    pub username: String,
}

impl TypingKey {
    pub fn new(room: RoomName, username: impl Into<String>) -> Self {
        Self {
            room,
            username: username.into(),
        }
    }
}

/// A timer fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingExpiry {
    pub key: TypingKey,
    pub generation: u64,
}

#[derive(Debug)]
struct PendingTimer {
    generation: u64,
    /// Connection that raised the indicator
    owner: ClientId,
    handle: JoinHandle<()>,
}

/// Live typing timers
#[derive(Debug)]
pub struct TypingTimers {
    pending: HashMap<TypingKey, PendingTimer>,
    next_generation: u64,
    expiry_tx: mpsc::UnboundedSender<TypingExpiry>,
}

impl TypingTimers {
    /// Create the manager and the receiver its expiries arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TypingExpiry>) {
        let (expiry_tx, expiry_rx) = mpsc::unbounded_channel();
        let timers = Self {
            pending: HashMap::new(),
            next_generation: 0,
            expiry_tx,
        };
        (timers, expiry_rx)
    }

    /// Arm the timer for `key`, replacing any pending one
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, key: TypingKey, owner: ClientId, after: Duration) {
        self.cancel(&key);

        self.next_generation += 1;
        let generation = self.next_generation;
        let expiry = TypingExpiry {
            key: key.clone(),
            generation,
        };
        let deadline = tokio::time::Instant::now() + after;
        let expiry_tx = self.expiry_tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = expiry_tx.send(expiry);
        });

        self.pending.insert(
            key,
            PendingTimer {
                generation,
                owner,
                handle,
            },
        );
    }

    /// Disarm the timer for `key`
    ///
    /// Returns the owning connection if a timer was pending.
    pub fn cancel(&mut self, key: &TypingKey) -> Option<ClientId> {
        let timer = self.pending.remove(key)?;
        timer.handle.abort();
        debug!(
            "Typing timer cancelled for {} in {}",
            key.username, key.room
        );
        Some(timer.owner)
    }

    /// Accept an expiry from the channel
    ///
    /// Returns the owner if the expiry belongs to the live timer for its key,
    /// clearing that timer. Stale expiries return None.
    pub fn fire(&mut self, expiry: &TypingExpiry) -> Option<ClientId> {
        match self.pending.get(&expiry.key) {
            Some(timer) if timer.generation == expiry.generation => {
                self.pending.remove(&expiry.key).map(|timer| timer.owner)
            }
            _ => None,
        }
    }

    /// Owner of the pending timer for `key`, if any
    pub fn owner(&self, key: &TypingKey) -> Option<ClientId> {
        self.pending.get(key).map(|timer| timer.owner)
    }

    pub fn is_pending(&self, key: &TypingKey) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Drop for TypingTimers {
    fn drop(&mut self) {
        for timer in self.pending.values() {
            timer.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout, Instant};

    fn key() -> TypingKey {
        TypingKey::new(RoomName::default(), "Alice")
    }

    /// Let spawned timer tasks run after a clock advance
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_once() {
        let (mut timers, mut expiry_rx) = TypingTimers::new();
        let owner = ClientId::new();
        let start = Instant::now();

        timers.schedule(key(), owner, TYPING_TIMEOUT);
        assert!(timers.is_pending(&key()));

        let expiry = timeout(Duration::from_secs(10), expiry_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(start.elapsed() >= TYPING_TIMEOUT);
        assert_eq!(timers.fire(&expiry), Some(owner));
        assert!(!timers.is_pending(&key()));

        // Replaying the same expiry has no effect
        assert_eq!(timers.fire(&expiry), None);

        advance(Duration::from_secs(10)).await;
        settle().await;
        assert!(expiry_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_resets_timer() {
        let (mut timers, mut expiry_rx) = TypingTimers::new();
        let owner = ClientId::new();
        let start = Instant::now();

        timers.schedule(key(), owner, TYPING_TIMEOUT);
        advance(Duration::from_secs(2)).await;
        settle().await;

        timers.schedule(key(), owner, TYPING_TIMEOUT);
        assert_eq!(timers.len(), 1);

        // The first deadline passes without an expiry
        advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(expiry_rx.try_recv().is_err());

        let expiry = timeout(Duration::from_secs(10), expiry_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert_eq!(expiry.generation, 2);
        assert_eq!(timers.fire(&expiry), Some(owner));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let (mut timers, mut expiry_rx) = TypingTimers::new();
        let owner = ClientId::new();

        timers.schedule(key(), owner, TYPING_TIMEOUT);
        assert_eq!(timers.cancel(&key()), Some(owner));
        assert_eq!(timers.cancel(&key()), None);

        advance(Duration::from_secs(10)).await;
        settle().await;
        assert!(expiry_rx.try_recv().is_err());
        assert!(timers.is_empty());
    }

    #[tokio::test]
    async fn test_stale_expiry_ignored() {
        let (mut timers, _expiry_rx) = TypingTimers::new();
        let owner = ClientId::new();

        timers.schedule(key(), owner, TYPING_TIMEOUT);
        timers.schedule(key(), owner, TYPING_TIMEOUT);

        let stale = TypingExpiry {
            key: key(),
            generation: 1,
        };
        assert_eq!(timers.fire(&stale), None);
        assert!(timers.is_pending(&key()));
        assert_eq!(timers.owner(&key()), Some(owner));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (mut timers, _expiry_rx) = TypingTimers::new();
        let alice = ClientId::new();
        let bob = ClientId::new();
        let bob_key = TypingKey::new(RoomName::default(), "Bob");

        timers.schedule(key(), alice, TYPING_TIMEOUT);
        timers.schedule(bob_key.clone(), bob, TYPING_TIMEOUT);
        timers.cancel(&key());

        assert!(!timers.is_pending(&key()));
        assert_eq!(timers.owner(&bob_key), Some(bob));
    }
}
