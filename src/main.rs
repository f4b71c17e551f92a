use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use argh::FromArgs;
use qweather_rss::{AppConfig, WeatherRssError, pipeline};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Fetch tomorrow's weather forecast and merge it into an RSS feed.
///
/// Runs must not overlap on the same feed file.
#[derive(FromArgs, Debug)]
struct Args {
    /// path to a TOML config file (default: ./qweather-rss.toml when present)
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// feed file to update, overriding the configured output path
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// print the merged feed to stdout instead of writing it
    #[argh(switch)]
    dry_run: bool,

    /// log level (error, warn, info, debug, trace)
    #[argh(option, short = 'l')]
    log_level: Option<String>,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(args: &Args) -> qweather_rss::Result<AppConfig> {
    let mut config = AppConfig::load(args.config.clone())?;
    if let Some(output) = &args.output {
        config.feed.output_path = output.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn execute(args: &Args, config: &AppConfig) -> anyhow::Result<()> {
    if args.dry_run {
        let xml = pipeline::preview(config).context("dry run failed")?;
        print!("{xml}");
        return Ok(());
    }

    let outcome = pipeline::run(config).with_context(|| {
        format!("failed to update {}", config.feed.output_path.display())
    })?;
    info!(
        "Feed {} updated with {}",
        config.feed.output_path.display(),
        outcome.guid
    );
    Ok(())
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            init_logging(args.log_level.as_deref().unwrap_or("info"));
            error!("{e}");
            eprintln!("{}", e.user_message());
            return ExitCode::from(e.exit_code());
        }
    };

    init_logging(&config.logging.level);
    info!("qweather-rss {} starting", qweather_rss::VERSION);

    match execute(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            let code = match e.downcast_ref::<WeatherRssError>() {
                Some(inner) => {
                    eprintln!("{}", inner.user_message());
                    inner.exit_code()
                }
                None => 1,
            };
            ExitCode::from(code)
        }
    }
}
