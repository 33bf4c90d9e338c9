// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::PlotError;

use clap::{App, Arg, ArgMatches};
use rustcommon_logger::Level;
use serde_derive::*;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    general: General,
    #[serde(default)]
    throughput: Throughput,
    #[serde(default)]
    latency: Latency,
    #[serde(skip)]
    inputs: Vec<PathBuf>,
    #[serde(skip)]
    prefix: String,
    #[serde(skip)]
    verbose: u64,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    #[serde(default)]
    logy: bool,
}

impl General {
    pub fn logy(&self) -> bool {
        self.logy
    }
}

fn default_title() -> String {
    "Throughput (GBit/s)".to_string()
}

fn default_throughput_width() -> u32 {
    1000
}

fn default_throughput_height() -> u32 {
    800
}

fn default_label_tokens() -> usize {
    3
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Throughput {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default = "default_throughput_width")]
    width: u32,
    #[serde(default = "default_throughput_height")]
    height: u32,
    #[serde(default = "default_label_tokens")]
    label_tokens: usize,
}

impl Default for Throughput {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_throughput_width(),
            height: default_throughput_height(),
            label_tokens: default_label_tokens(),
        }
    }
}

impl Throughput {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// the number of space separated branch label tokens to keep
    pub fn label_tokens(&self) -> usize {
        self.label_tokens
    }
}

fn default_latency_width() -> u32 {
    2800
}

fn default_latency_height() -> u32 {
    1500
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Latency {
    #[serde(default = "default_latency_width")]
    width: u32,
    #[serde(default = "default_latency_height")]
    height: u32,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            width: default_latency_width(),
            height: default_latency_height(),
        }
    }
}

impl Latency {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn app() -> App<'static, 'static> {
    App::new(NAME)
        .version(VERSION)
        .about("Plot two CSV results for comparison")
        .arg(
            Arg::with_name("input1")
                .help("First CSV result file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("input2")
                .help("Second CSV result file")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("outputprefix")
                .help("Prefix to use for the PNG graph files")
                .required(true)
                .index(3),
        )
        .arg(
            Arg::with_name("logy")
                .long("logy")
                .help("Use logarithmic scale for Y axis"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .value_name("FILE")
                .help("TOML config file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Increase verbosity by one level. Can be used more than once")
                .multiple(true),
        )
}

impl Config {
    /// parse command line options and return `Config`
    pub fn new() -> Config {
        let matches = app().get_matches();
        Self::from_matches(&matches).unwrap_or_else(|e| {
            println!("ERROR: {}", e);
            process::exit(1);
        })
    }

    /// parse the given arguments, the first being the program name
    pub fn from_args<I, T>(args: I) -> Result<Config, PlotError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = app().get_matches_from_safe(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Config, PlotError> {
        let mut config = if let Some(file) = matches.value_of("config") {
            Config::load_from_file(file)?
        } else {
            Default::default()
        };

        for input in &["input1", "input2"] {
            if let Some(path) = matches.value_of(input) {
                config.inputs.push(PathBuf::from(path));
            }
        }

        config.prefix = matches
            .value_of("outputprefix")
            .map(|v| v.to_string())
            .unwrap_or_default();

        if matches.is_present("logy") {
            config.general.logy = true;
        }

        config.verbose = matches.occurrences_of("verbose");

        Ok(config)
    }

    pub fn load_from_file(file: &str) -> Result<Config, PlotError> {
        let content = std::fs::read_to_string(file)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn general(&self) -> &General {
        &self.general
    }

    pub fn throughput(&self) -> &Throughput {
        &self.throughput
    }

    pub fn latency(&self) -> &Latency {
        &self.latency
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// get logging level
    pub fn logging(&self) -> Level {
        match self.verbose {
            0 => Level::Info,
            1 => Level::Debug,
            _ => Level::Trace,
        }
    }

    pub fn throughput_output(&self) -> PathBuf {
        PathBuf::from(format!("{}gbits.png", self.prefix))
    }

    pub fn latency_output(&self) -> PathBuf {
        PathBuf::from(format!("{}latency.png", self.prefix))
    }

    pub fn print(&self) {
        info!("-----");
        for input in &self.inputs {
            info!("Config: Input: {}", input.display());
        }
        info!(
            "Config: Output: {} {}",
            self.throughput_output().display(),
            self.latency_output().display()
        );
        info!(
            "Config: Throughput: {}x{} Label Tokens: {}",
            self.throughput.width, self.throughput.height, self.throughput.label_tokens
        );
        info!(
            "Config: Latency: {}x{} Log Scale: {}",
            self.latency.width,
            self.latency.height,
            self.general.logy()
        );
    }
}
