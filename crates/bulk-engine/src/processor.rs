// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! Per-session tokenizer and bulk boundary state machine.
//!
//! One processor serves exactly one logical source (a connection or an
//! embedder handle) and is driven single-threadedly; cross-session
//! synchronization lives in the shared [`BulkAggregator`].
//!
//! Line protocol: `{` opens one level of dynamic block, `}` closes one
//! (an error with no block open), a blank line is ignored, anything else
//! is a command taken verbatim. In the static state (nesting 0) commands
//! go to the aggregator's merge path; inside a dynamic block they
//! accumulate locally and are emitted as a single bulk at the outermost
//! close regardless of inner nesting depth.

use std::sync::Arc;

use tracing::debug;

use crate::aggregator::BulkAggregator;
use crate::bulk::CommandBulk;
use crate::errors;

pub struct InputProcessor {
    aggregator: Arc<BulkAggregator>,
    current_bulk: CommandBulk,
    nesting_level: usize,
    partial_line: Vec<u8>,
}

impl InputProcessor {
    #[must_use]
    pub fn new(aggregator: Arc<BulkAggregator>) -> Self {
        Self {
            aggregator,
            current_bulk: CommandBulk::new(),
            nesting_level: 0,
            partial_line: Vec::new(),
        }
    }

    /// Processes one already-delimited line (no trailing terminator).
    pub fn process_line(&mut self, line: &str) -> Result<(), errors::Process> {
        match line {
            "" => Ok(()),
            "{" => {
                self.open_dynamic_bulk();
                Ok(())
            }
            "}" => self.close_dynamic_bulk(),
            command => {
                self.process_command(command);
                Ok(())
            }
        }
    }

    /// Feeds a raw byte chunk, splitting on line boundaries.
    ///
    /// A trailing fragment without a newline is buffered as raw bytes
    /// until the rest of the line arrives in a later chunk, so a
    /// multi-byte character split across chunks is reassembled intact;
    /// only complete lines are decoded as UTF-8 (invalid sequences
    /// become replacement characters). On a protocol error the remaining
    /// complete lines of the chunk are still processed and the first
    /// error is returned, leaving the session usable.
    pub fn process_chunk(&mut self, data: &[u8]) -> Result<(), errors::Process> {
        self.partial_line.extend_from_slice(data);

        let mut first_error = None;
        while let Some(pos) = self.partial_line.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.partial_line.drain(..=pos).collect();
            line.pop(); // the '\n'
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Err(e) = self.process_line(&line) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Signals that the session's stream is done.
    ///
    /// A residual unterminated final line is processed first. In the
    /// static state any pending partial static bulk is flushed; an open
    /// dynamic block is dropped without emitting, matching the disconnect
    /// policy for partially accumulated bulks.
    pub fn end_of_stream(&mut self) -> Result<(), errors::Process> {
        let result = if self.partial_line.is_empty() {
            Ok(())
        } else {
            let mut line = std::mem::take(&mut self.partial_line);
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line).into_owned();
            self.process_line(&line)
        };

        if self.is_static() {
            self.aggregator.flush_static();
        } else {
            debug!(
                "dropping unterminated dynamic bulk of {} commands",
                self.current_bulk.len()
            );
            self.current_bulk = CommandBulk::new();
            self.nesting_level = 0;
        }
        result
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.nesting_level == 0
    }

    fn open_dynamic_bulk(&mut self) {
        if self.is_static() {
            // Entering dynamic mode ends the static bulk early.
            self.aggregator.flush_static();
        }
        self.nesting_level += 1;
    }

    fn close_dynamic_bulk(&mut self) -> Result<(), errors::Process> {
        if self.is_static() {
            return Err(errors::Process::UnmatchedClose);
        }
        self.nesting_level -= 1;

        if self.nesting_level == 0 {
            let bulk = std::mem::take(&mut self.current_bulk);
            self.aggregator.send_bulk(bulk);
        }
        Ok(())
    }

    fn process_command(&mut self, command: &str) {
        if self.is_static() {
            self.aggregator.send_command(command.to_string());
        } else {
            self.current_bulk.add_command(command.to_string());
        }
    }
}
