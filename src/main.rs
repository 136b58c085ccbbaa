use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use whisperlite::app::{RunOptions, run_file_command};
use whisperlite::cli::{Cli, Commands};
use whisperlite::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Some(Commands::Devices) => {
            list_audio_devices()?;
            return Ok(());
        }
        None => {}
    }

    let config = load_config(&cli)?;
    let options = RunOptions {
        quiet: cli.quiet,
        duration: cli.duration,
        flush_partial: cli.flush_partial,
        output_name: cli.output_name,
    };

    if let Some(input) = cli.input {
        run_file_command(config, input, options)?;
    } else {
        run_live(config, options)?;
    }

    Ok(())
}

#[cfg(feature = "cpal-audio")]
fn run_live(config: Config, options: RunOptions) -> Result<()> {
    whisperlite::app::run_live_command(config, options)?;
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn run_live(_config: Config, _options: RunOptions) -> Result<()> {
    anyhow::bail!("live capture support not compiled in; use --input to transcribe a file")
}

/// Route diagnostics to stderr. Default level is warn so normal runs stay
/// quiet; -v raises to info, -vv to debug. RUST_LOG overrides everything.
fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("whisperlite={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load configuration and apply overrides.
///
/// Priority order (highest wins):
/// 1. CLI flags
/// 2. Environment variables (WHISPERLITE_*)
/// 3. Config file (--config path, or ~/.config/whisperlite/config.toml)
/// 4. Built-in defaults
fn load_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(path) = cli.config.as_deref() {
        // An explicitly requested config file must exist; a missing one
        // surfaces as ConfigFileNotFound rather than falling back.
        Config::load(path)?
    } else {
        let default_path = dirs::config_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("whisperlite")
            .join("config.toml");
        Config::load_or_default(&default_path)?
    };

    let mut config = config.with_env_overrides();

    if let Some(device) = cli.device.clone() {
        config.audio.device = Some(device);
    }
    if let Some(duration) = cli.chunk_duration {
        config.audio.chunk_duration_secs = duration.as_secs_f64();
    }
    if let Some(model) = cli.model.clone() {
        config.recognizer.model = model;
    }
    if let Some(recognizer) = cli.recognizer.clone() {
        config.recognizer.binary = Some(recognizer);
    }
    if let Some(language) = cli.language.clone() {
        config.recognizer.language = language;
    }
    if let Some(format) = cli.format.clone() {
        config.output.format = format;
    }
    if let Some(dir) = cli.output_dir.clone() {
        config.output.directory = Some(dir);
    }
    if let Some(max) = cli.max_segments {
        config.output.max_segments = Some(max);
    }
    if cli.keep_chunks {
        config.output.keep_chunks = true;
    }

    Ok(config)
}

/// List available audio input devices.
#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = whisperlite::audio::capture::list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    anyhow::bail!("live capture support not compiled in")
}
