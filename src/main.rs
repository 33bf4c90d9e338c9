// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[macro_use]
extern crate rustcommon_logger;

use rustcommon_logger::{LogBuilder, MultiLogBuilder, Stdout};

use rpc_perf_plot::*;

fn main() {
    let config = Config::new();

    // initialize logging
    let log = LogBuilder::new()
        .output(Box::new(Stdout::new()))
        .log_queue_depth(1024)
        .single_message_size(4096)
        .build()
        .expect("failed to initialize log");

    let mut log = MultiLogBuilder::new()
        .level_filter(config.logging().to_level_filter())
        .default(log)
        .build()
        .start();

    info!("{} {} initializing...", NAME, VERSION);
    config.print();

    // an unreadable input is fatal, chart failures are not
    let table = match load(&config) {
        Ok(table) => table,
        Err(e) => {
            error!("failed to load results: {}", e);
            let _ = log.flush();
            std::process::exit(1);
        }
    };
    let _ = log.flush();

    let report = run(&config, &table);
    if report.throughput.is_err() || report.latency.is_err() {
        debug!("one or more graphs were skipped");
    }

    let _ = log.flush();
}
