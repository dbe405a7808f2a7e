use crate::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

/// Collapsible timeline viewer for hierarchical events
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Event file to open (.json or .mm_profdata)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// JSON file with timeline options
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Viewport height in pixels
    #[arg(long = "height", value_name = "PX")]
    pub height: Option<f32>,

    /// Row height in pixels
    #[arg(long = "event-height", value_name = "PX")]
    pub event_height: Option<f32>,

    /// Fix the start of the time axis
    #[arg(long = "start", value_name = "VALUE", allow_negative_numbers = true)]
    pub start: Option<f64>,

    /// Fix the end of the time axis
    #[arg(long = "end", value_name = "VALUE", allow_negative_numbers = true)]
    pub end: Option<f64>,

    /// Unit appended to tick labels (default: ms)
    #[arg(short = 'u', long = "unit", value_name = "UNIT")]
    pub unit: Option<String>,

    /// Minimum time between handled window resizes
    #[arg(long = "resize-throttle", value_name = "MS")]
    pub resize_throttle: Option<u64>,

    /// Keep collapsed rows collapsed when new data is loaded
    #[arg(long = "retain-collapse")]
    pub retain_collapse: bool,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Args {
    /// Options given on the command line, applied after the config file.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            height: self.height,
            event_height: self.event_height,
            start: self.start,
            end: self.end,
            tick_unit: self.unit.clone(),
            resize_throttle: self.resize_throttle,
            retain_collapse: self.retain_collapse.then_some(true),
        }
    }
}
