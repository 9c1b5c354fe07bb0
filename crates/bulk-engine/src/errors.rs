// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for the bulk engine.
//!
//! Handler failures are deliberately absent: they are recovered at the
//! dispatch boundary and only surface as an operator-visible log line.

use thiserror::Error;

/// Error type handlers may return from [`crate::handler::BulkHandler::handle`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while constructing engine components.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Creation {
    #[error("static bulk size can not be zero")]
    InvalidBulkSize,
}

/// Protocol errors raised while processing a command stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Process {
    #[error("attempt to close a dynamic bulk that is not open")]
    UnmatchedClose,
}

/// Errors raised by [`crate::context::ContextManager`] operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Context {
    #[error("unknown context handle: {0}")]
    UnknownHandle(u32),
    #[error(transparent)]
    Process(#[from] Process),
}
