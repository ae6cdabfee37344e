//! Event delivery and timers for the single-threaded UI loop.
//!
//! Anything happening outside of the UI thread (a finished download, a timer) is turned into a
//! message and put into an [`Inbox`]. The UI loop drains the inbox once per frame and hands
//! every message to the controllers one at a time.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use log::trace;
use web_time::Instant;

/// Wakes up the UI loop when a new message arrives.
pub trait Messenger: Send + Sync {
    /// Ask the UI to run another frame.
    fn request_redraw(&self);
}

/// Messenger that does nothing. Used when the loop polls the inbox anyway.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyMessenger;

impl Messenger for DummyMessenger {
    fn request_redraw(&self) {}
}

/// Single-consumer message queue.
pub struct Inbox<E> {
    sender: Sender<E>,
    receiver: Receiver<E>,
    messenger: Arc<dyn Messenger>,
}

impl<E> Inbox<E> {
    /// Creates an inbox that doesn't wake anyone up.
    pub fn new() -> Self {
        Self::with_messenger(DummyMessenger)
    }

    /// Creates an inbox notifying the `messenger` on every message.
    pub fn with_messenger(messenger: impl Messenger + 'static) -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            messenger: Arc::new(messenger),
        }
    }

    /// Returns a handle that can post messages from any thread.
    pub fn sender(&self) -> InboxSender<E> {
        InboxSender {
            sender: self.sender.clone(),
            messenger: self.messenger.clone(),
        }
    }

    /// Posts a message from the UI thread.
    pub fn push(&self, event: E) {
        // The receiver lives in `self`, so sending can't fail here.
        let _ = self.sender.send(event);
    }

    /// Takes all messages posted so far, in the order they were posted.
    pub fn drain(&self) -> impl Iterator<Item = E> + '_ {
        self.receiver.try_iter()
    }
}

impl<E> Default for Inbox<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sending half of an [`Inbox`].
pub struct InboxSender<E> {
    sender: Sender<E>,
    messenger: Arc<dyn Messenger>,
}

impl<E> Clone for InboxSender<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            messenger: self.messenger.clone(),
        }
    }
}

impl<E> InboxSender<E> {
    /// Posts a message. Messages sent after the inbox was dropped are discarded.
    pub fn send(&self, event: E) {
        if self.sender.send(event).is_err() {
            trace!("Inbox is closed, message discarded");
            return;
        }

        self.messenger.request_redraw();
    }
}

/// Source of the current time.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    start: Instant,
    elapsed: std::cell::Cell<Duration>,
}

impl ManualClock {
    /// Creates a clock stopped at the current instant.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Default::default(),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed.get()
    }
}

/// Queue of messages to be delivered at a given time.
#[derive(Debug)]
pub struct Scheduler<E> {
    // Sorted by the deadline; entries with equal deadlines keep insertion order.
    entries: Vec<(Instant, E)>,
}

impl<E> Scheduler<E> {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    /// Schedules `event` to be delivered at `at`.
    pub fn schedule(&mut self, at: Instant, event: E) {
        let position = self.entries.partition_point(|(deadline, _)| *deadline <= at);
        self.entries.insert(position, (at, event));
    }

    /// Removes and returns all events due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<E> {
        let due_count = self.entries.partition_point(|(deadline, _)| *deadline <= now);
        self.entries
            .drain(..due_count)
            .map(|(_, event)| event)
            .collect()
    }

    /// The earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.first().map(|(deadline, _)| *deadline)
    }

    /// Returns true if no events are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
