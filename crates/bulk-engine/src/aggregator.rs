// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! Cross-session merge point for static bulks.
//!
//! Any number of [`crate::processor::InputProcessor`] instances may feed
//! one aggregator. Static commands are coalesced into a single shared
//! bulk flushed at the configured command count; completed dynamic bulks
//! are forwarded untouched, so dynamic blocks from different sessions are
//! never mixed. This dual policy is the aggregator's central contract.

use std::sync::Mutex;

use tracing::debug;

use crate::bulk::CommandBulk;
use crate::errors;
use crate::handler::HandlerRegistry;

pub struct BulkAggregator {
    static_bulk_size: usize,
    static_bulk: Mutex<CommandBulk>,
    registry: HandlerRegistry,
}

impl BulkAggregator {
    /// Creates an aggregator flushing its shared static bulk every
    /// `static_bulk_size` commands. A zero size fails fast.
    pub fn new(
        static_bulk_size: usize,
        registry: HandlerRegistry,
    ) -> Result<Self, errors::Creation> {
        if static_bulk_size == 0 {
            return Err(errors::Creation::InvalidBulkSize);
        }
        Ok(Self {
            static_bulk_size,
            static_bulk: Mutex::new(CommandBulk::new()),
            registry,
        })
    }

    #[must_use]
    pub fn static_bulk_size(&self) -> usize {
        self.static_bulk_size
    }

    /// Static merge path: appends one command to the shared static bulk,
    /// dispatching it once the size threshold is reached.
    ///
    /// Arrival order at the lock is the cross-session interleaving order.
    /// The critical section covers append-and-maybe-flush so no command
    /// from another session can slip into a bulk past its threshold.
    pub fn send_command(&self, command: String) {
        #[allow(clippy::expect_used)]
        let mut pending = self.static_bulk.lock().expect("lock poisoned");
        pending.add_command(command);
        if pending.len() == self.static_bulk_size {
            let full = std::mem::take(&mut *pending);
            debug!("dispatching full static bulk of {} commands", full.len());
            self.registry.dispatch(&full);
        }
    }

    /// Pass-through path for completed dynamic bulks: dispatched as their
    /// own bulk, never merged with other sessions. Empty bulks are not
    /// delivered.
    pub fn send_bulk(&self, bulk: CommandBulk) {
        if bulk.is_empty() {
            return;
        }
        debug!("dispatching dynamic bulk of {} commands", bulk.len());
        self.registry.dispatch(&bulk);
    }

    /// Dispatches a non-empty partial static bulk, leaving a fresh empty
    /// one behind. Used when a stream ends or before a dynamic block
    /// opens.
    pub fn flush_static(&self) {
        #[allow(clippy::expect_used)]
        let mut pending = self.static_bulk.lock().expect("lock poisoned");
        if pending.is_empty() {
            return;
        }
        let partial = std::mem::take(&mut *pending);
        debug!(
            "dispatching partial static bulk of {} commands",
            partial.len()
        );
        self.registry.dispatch(&partial);
    }
}
