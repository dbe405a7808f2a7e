use clap::Parser;
use treeline::cli::Args;
use treeline::config::{ConfigOverrides, TimelineConfig};

fn main() -> iced::Result {
    let args = Args::parse();

    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let default_level = match args.verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("wgpu_hal", log::LevelFilter::Warn)
        .filter_module("naga", log::LevelFilter::Warn)
        .format_timestamp_millis()
        .init();

    log::debug!("command-line args: {args:?}");

    let mut config = TimelineConfig::default();
    if let Some(path) = &args.config {
        match ConfigOverrides::load(path) {
            Ok(overrides) => config.apply(&overrides),
            Err(e) => log::warn!("ignoring config {}: {e}", path.display()),
        }
    }
    config.apply(&args.overrides());

    treeline::app::run(config, args.file)
}
