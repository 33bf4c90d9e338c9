// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rpc_perf_plot::*;

use std::fs;
use std::path::Path;

const HEADER: &str = "Test, target req/s, req len, branch, GBit/s, p50 latency (ms), p90 latency (ms), p99 latency (ms), p999 latency (ms), stddev";

const MASTER: &str = "\
tcp, 0, 0, master 1a2b3c 2021-06-01 HTTP/1.1, 9.4, 0, 0, 0, 0, 0
http, 1000, 100, master 1a2b3c 2021-06-01 HTTP/1.1, 0, 0.41, 0.62, 1.10, 2.40, 0.12
http, 5000, 100, master 1a2b3c 2021-06-01 HTTP/1.1, 0, 0.48, 0.80, 1.90, 4.80, 0.30
grpc, 1000, 1000, master 1a2b3c 2021-06-01 gRPC, 0, 0.52, 0.71, 1.30, 3.10, 0.15
";

const FEATURE: &str = "\
tcp, 0, 0, feature 4d5e6f 2021-06-02 HTTP/1.1, 10.2, 0, 0, 0, 0, 0
http, 1000, 100, feature 4d5e6f 2021-06-02 HTTP/1.1, 0, 0.39, 0.58, 0.95, 2.10, 0.10
http, 5000, 100, feature 4d5e6f 2021-06-02 HTTP/1.1, 0, 0.45, 0.75, 1.60, 4.10, 0.25
grpc, 1000, 1000, feature 4d5e6f 2021-06-02 gRPC, 0, 0.50, 0.69, 1.20, 2.90, 0.14
";

fn write(dir: &Path, name: &str, header: &str, rows: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, format!("{}\n{}", header, rows)).unwrap();
    path.to_str().unwrap().to_string()
}

fn is_png(path: &Path) -> bool {
    let bytes = fs::read(path).unwrap();
    bytes.len() > 8 && bytes[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
}

#[test]
fn both_graphs() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "master.csv", HEADER, MASTER);
    let second = write(dir.path(), "feature.csv", HEADER, FEATURE);
    let prefix = format!("{}/cmp_", dir.path().display());

    let args = ["rpc-perf-plot", first.as_str(), second.as_str(), prefix.as_str()];
    let config = Config::from_args(&args).unwrap();
    let table = load(&config).unwrap();
    assert_eq!(table.len(), 8);

    let report = run(&config, &table);
    let gbits = report.throughput.unwrap();
    let latency = report.latency.unwrap();

    assert_eq!(gbits, dir.path().join("cmp_gbits.png"));
    assert_eq!(latency, dir.path().join("cmp_latency.png"));
    assert!(is_png(&gbits));
    assert!(is_png(&latency));
}

#[test]
fn log_scale() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "master.csv", HEADER, MASTER);
    let second = write(dir.path(), "feature.csv", HEADER, FEATURE);
    let prefix = format!("{}/", dir.path().display());

    let args = [
        "rpc-perf-plot",
        first.as_str(),
        second.as_str(),
        prefix.as_str(),
        "--logy",
    ];
    let config = Config::from_args(&args).unwrap();
    let table = load(&config).unwrap();

    let report = run(&config, &table);
    assert!(report.throughput.is_ok());
    assert!(is_png(&report.latency.unwrap()));
}

#[test]
fn missing_throughput_column() {
    let header = "Test,target req/s,req len,branch,p50 latency (ms),p90 latency (ms),p99 latency (ms),p999 latency (ms),stddev";
    let rows = "\
http,1000,100,master,0.41,0.62,1.10,2.40,0.12
http,1000,100,feature,0.39,0.58,0.95,2.10,0.10
";
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "a.csv", header, rows);
    let second = write(dir.path(), "b.csv", header, rows);
    let prefix = format!("{}/", dir.path().display());

    let args = ["rpc-perf-plot", first.as_str(), second.as_str(), prefix.as_str()];
    let config = Config::from_args(&args).unwrap();
    let table = load(&config).unwrap();
    let report = run(&config, &table);

    match report.throughput {
        Err(PlotError::MissingColumn(column)) => assert_eq!(column, "GBit/s"),
        other => panic!("unexpected: {:?}", other),
    }
    assert!(!dir.path().join("gbits.png").exists());
    assert!(is_png(&report.latency.unwrap()));
}

#[test]
fn throughput_only_results() {
    let header = "Test, target req/s, req len, branch, GBit/s";
    let rows = "\
tcp, 0, 0, master 1a2b3c 2021-06-01 HTTP/1.1, 9.4
udp, 0, 0, master 1a2b3c 2021-06-01 HTTP/1.1, 3.1
";
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "a.csv", header, rows);
    let second = write(dir.path(), "b.csv", header, rows);
    let prefix = format!("{}/", dir.path().display());

    let args = ["rpc-perf-plot", first.as_str(), second.as_str(), prefix.as_str()];
    let config = Config::from_args(&args).unwrap();
    let table = load(&config).unwrap();
    let report = run(&config, &table);

    assert!(is_png(&report.throughput.unwrap()));
    assert!(report.latency.is_err());
    assert!(!dir.path().join("latency.png").exists());
}

#[test]
fn unreadable_input() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv");
    let missing = missing.to_str().unwrap();

    let config = Config::from_args(&["rpc-perf-plot", missing, missing, "out_"]).unwrap();
    match load(&config) {
        Err(PlotError::Io(_)) => {}
        other => panic!("unexpected: {:?}", other),
    }
}
