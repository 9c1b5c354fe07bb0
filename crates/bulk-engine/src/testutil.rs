// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! Shared helpers for unit tests.

use std::sync::Mutex;

use crate::bulk::CommandBulk;
use crate::errors::BoxError;
use crate::handler::BulkHandler;

/// Test sink recording the commands of every bulk it receives.
#[derive(Default)]
pub(crate) struct RecordingSink {
    bulks: Mutex<Vec<Vec<String>>>,
}

impl RecordingSink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::unwrap_used)]
    pub(crate) fn recorded(&self) -> Vec<Vec<String>> {
        self.bulks.lock().unwrap().clone()
    }
}

impl BulkHandler for RecordingSink {
    #[allow(clippy::unwrap_used)]
    fn handle(&self, bulk: &CommandBulk) -> Result<(), BoxError> {
        self.bulks.lock().unwrap().push(bulk.commands().to_vec());
        Ok(())
    }
}

/// Test sink failing on every bulk.
pub(crate) struct AlwaysFail;

impl BulkHandler for AlwaysFail {
    fn handle(&self, _bulk: &CommandBulk) -> Result<(), BoxError> {
        Err("sink unavailable".into())
    }
}

pub(crate) fn bulk_of(commands: &[&str]) -> CommandBulk {
    let mut bulk = CommandBulk::new();
    for command in commands {
        bulk.add_command((*command).to_string());
    }
    bulk
}
