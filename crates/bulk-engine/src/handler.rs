// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! Handler capability trait and the ordered, fault-isolating registry.

use std::sync::Arc;

use tracing::error;

use crate::bulk::CommandBulk;
use crate::errors::BoxError;

/// A sink for completed command bulks.
///
/// Implementations must tolerate being called from multiple producer and
/// worker threads. A returned error is logged by the dispatcher and never
/// reaches other handlers or the producer.
pub trait BulkHandler: Send + Sync {
    fn handle(&self, bulk: &CommandBulk) -> Result<(), BoxError>;
}

impl<F> BulkHandler for F
where
    F: Fn(&CommandBulk) -> Result<(), BoxError> + Send + Sync,
{
    fn handle(&self, bulk: &CommandBulk) -> Result<(), BoxError> {
        self(bulk)
    }
}

/// An ordered list of handlers invoked for every completed bulk.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn BulkHandler>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler; returns the registry for chaining.
    pub fn register(&mut self, handler: Arc<dyn BulkHandler>) -> &mut Self {
        self.handlers.push(handler);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invokes every handler in registration order.
    ///
    /// A failing handler is logged and the remaining handlers still run:
    /// one broken sink must never stop the others from receiving bulks.
    pub fn dispatch(&self, bulk: &CommandBulk) {
        for handler in &self.handlers {
            if let Err(e) = handler.handle(bulk) {
                error!("unexpected error during command bulk handling: {e}");
            }
        }
    }
}

impl From<Vec<Arc<dyn BulkHandler>>> for HandlerRegistry {
    fn from(handlers: Vec<Arc<dyn BulkHandler>>) -> Self {
        Self { handlers }
    }
}
