// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

//! The unit of delivery: an ordered batch of command strings.

use std::time::SystemTime;

/// An ordered, append-only batch of commands plus the wall-clock instant
/// the first command arrived.
///
/// A bulk is created empty, grows by [`CommandBulk::add_command`], and is
/// read-only once handed to handlers; a dispatched bulk is never reused,
/// a fresh instance takes its place.
#[derive(Debug, Clone, Default)]
pub struct CommandBulk {
    commands: Vec<String>,
    first_command_time: Option<SystemTime>,
}

impl CommandBulk {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command, recording the arrival time if the bulk was empty.
    pub fn add_command(&mut self, command: String) {
        if self.commands.is_empty() {
            self.first_command_time = Some(SystemTime::now());
        }
        self.commands.push(command);
    }

    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Arrival time of the first command. `None` while the bulk is empty.
    #[must_use]
    pub fn first_command_time(&self) -> Option<SystemTime> {
        self.first_command_time
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.commands.iter()
    }
}

impl<'a> IntoIterator for &'a CommandBulk {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
