//! Hand-off stack between the worker pool and the writer thread.
//!
//! Workers push finished containers; the single writer pops them. Pops are
//! LIFO: the most recently finished container is written first, so its
//! buffer is freed while still warm in cache. Write order across files is
//! therefore unspecified and nothing may rely on it.
//!
//! Each pushed item is returned by exactly one pop, after which the caller
//! owns it.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// A finished container waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedOutput {
    /// Relative output path, forward slashes.
    pub path: String,
    pub data: Vec<u8>,
}

impl EncodedOutput {
    pub fn new(path: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Result of a timed pop.
#[derive(Debug, PartialEq, Eq)]
pub enum Popped {
    Item(EncodedOutput),
    /// Nothing arrived before the timeout; producers may still push.
    Empty,
    /// Closed and empty; nothing will ever arrive.
    Drained,
}

#[derive(Debug, Default)]
struct State {
    items: Vec<EncodedOutput>,
    closed: bool,
}

/// Mutex-guarded LIFO stack with a condition variable for the consumer.
#[derive(Debug, Default)]
pub struct PendingQueue {
    state: Mutex<State>,
    available: Condvar,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfer ownership of `item` to the queue and wake the consumer.
    pub fn push(&self, item: EncodedOutput) {
        self.state.lock().items.push(item);
        self.available.notify_one();
    }

    /// Mark that no more items will be pushed.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Take the newest item, waiting up to `timeout` for one to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> Popped {
        let mut state = self.state.lock();
        if state.items.is_empty() && !state.closed {
            self.available.wait_for(&mut state, timeout);
        }
        match state.items.pop() {
            Some(item) => Popped::Item(item),
            None if state.closed => Popped::Drained,
            None => Popped::Empty,
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }
}
