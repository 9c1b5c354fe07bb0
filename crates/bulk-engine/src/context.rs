// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! Handle-indexed session registry for embedding the engine without a
//! transport layer.
//!
//! A registry is an explicitly constructed, explicitly owned value:
//! embedders (and tests) may run any number of independent registries.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::aggregator::BulkAggregator;
use crate::errors;
use crate::handler::{BulkHandler, HandlerRegistry};
use crate::processor::InputProcessor;

/// Opaque session identifier returned by [`ContextManager::connect`].
///
/// Handles are assigned monotonically and never reused within one
/// registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(u32);

impl ContextHandle {
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Session = Arc<Mutex<InputProcessor>>;

#[derive(Default)]
pub struct ContextManager {
    next_handle: AtomicU32,
    sessions: Mutex<HashMap<ContextHandle, Session>>,
}

impl ContextManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new session with its own aggregator bound to `handlers`
    /// and the given static bulk size, returning a fresh unique handle.
    pub fn connect(
        &self,
        static_bulk_size: usize,
        handlers: Vec<Arc<dyn BulkHandler>>,
    ) -> Result<ContextHandle, errors::Creation> {
        let registry = HandlerRegistry::from(handlers);
        let aggregator = Arc::new(BulkAggregator::new(static_bulk_size, registry)?);
        let processor = InputProcessor::new(aggregator);

        let handle = ContextHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        #[allow(clippy::expect_used)]
        let mut sessions = self.sessions.lock().expect("lock poisoned");
        sessions.insert(handle, Arc::new(Mutex::new(processor)));
        Ok(handle)
    }

    /// Feeds raw bytes into the session identified by `handle`.
    ///
    /// Calls for different handles only contend on the registry lookup;
    /// calls for the same handle serialize on that session's own lock.
    pub fn receive(&self, handle: ContextHandle, data: &[u8]) -> Result<(), errors::Context> {
        let session = self.lookup(handle)?;
        #[allow(clippy::expect_used)]
        let mut processor = session.lock().expect("lock poisoned");
        processor.process_chunk(data)?;
        Ok(())
    }

    /// Removes the session's state. Any partially accumulated bulk is
    /// dropped, not flushed.
    ///
    /// Serialized against `receive` on the same handle: this returns
    /// only once any in-flight chunk for the session has finished
    /// processing.
    pub fn disconnect(&self, handle: ContextHandle) -> Result<(), errors::Context> {
        let session = {
            #[allow(clippy::expect_used)]
            let mut sessions = self.sessions.lock().expect("lock poisoned");
            sessions
                .remove(&handle)
                .ok_or(errors::Context::UnknownHandle(handle.0))?
        };
        // A concurrent receive may still hold the session lock; wait for
        // it to drain before the session is reported gone. The registry
        // lock is already released so other handles are not held up.
        #[allow(clippy::expect_used)]
        drop(session.lock().expect("lock poisoned"));
        Ok(())
    }

    fn lookup(&self, handle: ContextHandle) -> Result<Session, errors::Context> {
        #[allow(clippy::expect_used)]
        let sessions = self.sessions.lock().expect("lock poisoned");
        sessions
            .get(&handle)
            .cloned()
            .ok_or(errors::Context::UnknownHandle(handle.0))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testutil::RecordingSink;
    use std::collections::HashSet;

    fn sink_handlers() -> (Arc<RecordingSink>, Vec<Arc<dyn BulkHandler>>) {
        let sink = Arc::new(RecordingSink::new());
        let handlers: Vec<Arc<dyn BulkHandler>> = vec![Arc::clone(&sink) as _];
        (sink, handlers)
    }

    #[test]
    fn test_connect_receive_disconnect_round_trip() {
        let manager = ContextManager::new();
        let (sink, handlers) = sink_handlers();
        let handle = manager.connect(2, handlers).unwrap();

        manager.receive(handle, b"a\nb\nc\n").unwrap();
        manager.disconnect(handle).unwrap();

        // The full bulk was delivered; the trailing partial was dropped
        // by disconnect.
        assert_eq!(sink.recorded(), vec![vec!["a", "b"]]);
    }

    #[test]
    fn test_handles_are_unique() {
        let manager = ContextManager::new();
        let mut handles = HashSet::new();
        for _ in 0..100 {
            let (_, handlers) = sink_handlers();
            let handle = manager.connect(1, handlers).unwrap();
            assert!(handles.insert(handle));
        }

        // Disconnecting does not make a handle eligible for reuse.
        let first = *handles.iter().next().unwrap();
        manager.disconnect(first).unwrap();
        let (_, handlers) = sink_handlers();
        let fresh = manager.connect(1, handlers).unwrap();
        assert!(!handles.contains(&fresh));
    }

    #[test]
    fn test_unknown_handle_operations_fail() {
        let manager = ContextManager::new();
        let (_, handlers) = sink_handlers();
        let handle = manager.connect(1, handlers).unwrap();
        manager.disconnect(handle).unwrap();

        assert_eq!(
            manager.receive(handle, b"x\n"),
            Err(errors::Context::UnknownHandle(handle.as_u32()))
        );
        assert_eq!(
            manager.disconnect(handle),
            Err(errors::Context::UnknownHandle(handle.as_u32()))
        );
    }

    #[test]
    fn test_zero_bulk_size_connect_fails() {
        let manager = ContextManager::new();
        let (_, handlers) = sink_handlers();
        assert_eq!(
            manager.connect(0, handlers).err(),
            Some(errors::Creation::InvalidBulkSize)
        );
    }

    #[test]
    fn test_sessions_do_not_share_bulk_state() {
        let manager = ContextManager::new();
        let (sink_a, handlers_a) = sink_handlers();
        let (sink_b, handlers_b) = sink_handlers();
        let a = manager.connect(3, handlers_a).unwrap();
        let b = manager.connect(3, handlers_b).unwrap();

        manager.receive(a, b"a1\na2\n").unwrap();
        manager.receive(b, b"b1\nb2\nb3\n").unwrap();

        // Session B reached its threshold alone; A's partial stays put.
        assert!(sink_a.recorded().is_empty());
        assert_eq!(sink_b.recorded(), vec![vec!["b1", "b2", "b3"]]);
    }

    #[test]
    fn test_disconnect_waits_for_in_flight_receive() {
        use crate::bulk::CommandBulk;
        use crate::errors::BoxError;
        use std::sync::atomic::AtomicBool;
        use std::thread;
        use std::time::Duration;

        let manager = Arc::new(ContextManager::new());
        let sink = Arc::new(RecordingSink::new());
        let started = Arc::new(AtomicBool::new(false));

        let handlers: Vec<Arc<dyn BulkHandler>> = vec![Arc::new({
            let sink = Arc::clone(&sink);
            let started = Arc::clone(&started);
            move |bulk: &CommandBulk| -> Result<(), BoxError> {
                started.store(true, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(50));
                sink.handle(bulk)
            }
        })];
        let handle = manager.connect(1, handlers).unwrap();

        let receiver = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.receive(handle, b"a\n"))
        };
        while !started.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }

        // Disconnect must not return while the same handle's receive is
        // still mid-chunk.
        manager.disconnect(handle).unwrap();
        assert_eq!(sink.recorded(), vec![vec!["a"]]);

        receiver.join().unwrap().unwrap();
    }

    #[test]
    fn test_protocol_error_surfaces_through_receive() {
        let manager = ContextManager::new();
        let (sink, handlers) = sink_handlers();
        let handle = manager.connect(2, handlers).unwrap();

        assert_eq!(
            manager.receive(handle, b"}\n"),
            Err(errors::Context::Process(errors::Process::UnmatchedClose))
        );

        // The session survives the error.
        manager.receive(handle, b"a\nb\n").unwrap();
        assert_eq!(sink.recorded(), vec![vec!["a", "b"]]);
    }
}
