// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! Command bulk aggregation and dispatch engine.
//!
//! The engine consumes line-oriented command streams from any number of
//! independent sessions, groups commands into ordered batches ("bulks")
//! using a static/dynamic boundary protocol, and delivers every completed
//! bulk to a set of registered handlers with per-handler fault isolation.
//!
//! Pipeline: raw bytes -> per-session [`processor::InputProcessor`] ->
//! [`aggregator::BulkAggregator`] -> [`handler::HandlerRegistry`] (or a
//! [`queue::SynchronizedQueue`] consumed by a [`worker::WorkerPool`]) ->
//! sinks. [`context::ContextManager`] exposes the same pipeline through a
//! handle-based API for embedders without a transport layer.

pub mod aggregator;
pub mod bulk;
pub mod context;
pub mod errors;
pub mod handler;
pub mod processor;
pub mod queue;
pub mod worker;

#[cfg(test)]
pub(crate) mod testutil;
