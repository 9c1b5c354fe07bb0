// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! Sinks for completed bulks: immediate console output and the
//! worker-side report sink behind the queue.

use std::io::Write;

use tracing::info;

use bulk_engine::bulk::CommandBulk;
use bulk_engine::errors::BoxError;
use bulk_engine::handler::BulkHandler;

fn render(bulk: &CommandBulk) -> String {
    bulk.commands().join(", ")
}

/// Prints every completed bulk to stdout on the producer's thread.
#[derive(Default)]
pub struct ConsoleSink;

impl BulkHandler for ConsoleSink {
    fn handle(&self, bulk: &CommandBulk) -> Result<(), BoxError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "bulk: {}", render(bulk))?;
        Ok(())
    }
}

/// Reports every bulk popped by a worker through the logging subsystem.
#[derive(Default)]
pub struct ReportSink;

impl BulkHandler for ReportSink {
    fn handle(&self, bulk: &CommandBulk) -> Result<(), BoxError> {
        info!("bulk: {}", render(bulk));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_joins_commands_in_order() {
        let mut bulk = CommandBulk::new();
        bulk.add_command("cmd1".to_string());
        bulk.add_command("cmd2".to_string());
        assert_eq!(render(&bulk), "cmd1, cmd2");
    }
}
