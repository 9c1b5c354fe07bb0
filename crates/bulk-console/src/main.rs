// Copyright 2025-Present the bulk-engine authors
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

mod config;
mod sinks;

use std::env;
use std::io::BufRead;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use bulk_engine::aggregator::BulkAggregator;
use bulk_engine::handler::{BulkHandler, HandlerRegistry};
use bulk_engine::processor::InputProcessor;
use bulk_engine::queue::SynchronizedQueue;
use bulk_engine::worker::{QueueSink, WorkerPool};

use crate::config::Config;
use crate::sinks::{ConsoleSink, ReportSink};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("BULK_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(log_level).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Error creating config on bulk console startup: {e}");
            return;
        }
    };

    let queue = SynchronizedQueue::new();
    let pool = WorkerPool::start(
        queue.clone(),
        Arc::new(ReportSink),
        config.workers,
        CancellationToken::new(),
    );

    let mut registry = HandlerRegistry::new();
    registry
        .register(Arc::new(ConsoleSink) as Arc<dyn BulkHandler>)
        .register(Arc::new(QueueSink::new(queue.clone())) as Arc<dyn BulkHandler>);

    let aggregator = match BulkAggregator::new(config.bulk_size, registry) {
        Ok(a) => Arc::new(a),
        Err(e) => {
            error!("Error creating bulk aggregator: {e}");
            return;
        }
    };

    info!(
        "bulk-console: reading stdin with bulk size {} and {} workers",
        config.bulk_size, config.workers
    );

    // stdin is blocking; drive the processor off the async runtime.
    let reader = tokio::task::spawn_blocking(move || {
        let mut processor = InputProcessor::new(aggregator);
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    // A stray close brace is reported and the stream
                    // keeps going.
                    if let Err(e) = processor.process_line(&line) {
                        error!("protocol error: {e}");
                    }
                }
                Err(e) => {
                    error!("error reading stdin: {e}");
                    break;
                }
            }
        }
        if let Err(e) = processor.end_of_stream() {
            error!("protocol error at end of stream: {e}");
        }
    });

    if let Err(e) = reader.await {
        error!("stdin reader task failed: {e}");
    }

    // Drain the queue before exiting so no accepted bulk is dropped.
    pool.shutdown().await;
    debug!("bulk-console: all workers stopped");
}
