// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! Thread-safe FIFO hand-off between producers and consumer workers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

/// Unbounded multi-producer/multi-consumer FIFO of completed bulks.
///
/// Pushes never block beyond the internal lock; consumers wait with a
/// bounded timeout so they can observe a cancellation token promptly.
/// Cloning yields another handle to the same queue.
pub struct SynchronizedQueue<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    items: Mutex<VecDeque<T>>,
    notify: Notify,
}

impl<T> Clone for SynchronizedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SynchronizedQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SynchronizedQueue<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                items: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
            }),
        }
    }

    /// Appends an item and wakes one waiting consumer. Always succeeds;
    /// there is no upper bound on queue size.
    pub fn push(&self, item: T) {
        {
            #[allow(clippy::expect_used)]
            let mut items = self.inner.items.lock().expect("lock poisoned");
            items.push_back(item);
        }
        self.inner.notify.notify_one();
    }

    /// Removes and returns the front item, waiting up to `timeout` for
    /// one to arrive. Returns `None` if the timeout elapses with the
    /// queue still empty.
    pub async fn try_pop(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(item) = self.pop_front() {
                return Some(item);
            }
            let notified = self.inner.notify.notified();
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                // Deadline hit; one last check in case a push raced the
                // timeout.
                return self.pop_front();
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        #[allow(clippy::expect_used)]
        let items = self.inner.items.lock().expect("lock poisoned");
        items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        #[allow(clippy::expect_used)]
        let items = self.inner.items.lock().expect("lock poisoned");
        items.len()
    }

    fn pop_front(&self) -> Option<T> {
        #[allow(clippy::expect_used)]
        let mut items = self.inner.items.lock().expect("lock poisoned");
        items.pop_front()
    }
}
