use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::Context;

use layered_audio::audio_system::{AudioManager, HeadlessBackend, OutputBackend, RodioBackend};
use layered_audio::config::AudioConfig;
use layered_audio::error::AppResult;
use layered_audio::messaging::{AudioCommand, AudioDriver, EventBus};

fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Get log directory in user config folder
    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("LayeredAudio").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    // Create file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "layered-audio.log");

    // Configure filter (info level by default)
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    // In debug builds, also log to console
    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    // In release builds, only log to file
    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

/// Config from the first argument, or the default file next to the executable
fn load_config() -> AppResult<AudioConfig> {
    let (mut config, path) = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            let config = AudioConfig::load(&path).with_context(|| format!("Loading {}", path.display()))?;
            (config, path)
        }
        None => {
            let config = AudioConfig::load_or_create().context("Loading default audio config")?;
            (config, AudioConfig::config_path()?)
        }
    };

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_clip_paths(base);
    Ok(config)
}

fn open_backend() -> Box<dyn OutputBackend> {
    match RodioBackend::try_default() {
        Ok(backend) => Box::new(backend),
        Err(e) => {
            tracing::warn!("No audio output ({}), running headless", e);
            Box::new(HeadlessBackend::new())
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  music|sfx|voice <name|index> [x y z]");
    println!("  volume <music|sfx|voice|master> <0.0-1.0>");
    println!("  volumes <sfx> <music> <voice> <master>");
    println!("  config <category> <index> <volume> [pitch]");
    println!("  stop | pause");
    println!("  jb play|pause|stop|next|random");
    println!("  help | quit");
}

fn main() -> AppResult<()> {
    initialize_tracing();

    println!("===========================================");
    println!("  Layered Audio - playback console");
    println!("===========================================\n");

    let config = load_config()?;
    println!(
        "✓ Configuration loaded: {} music, {} sfx, {} voice{}",
        config.catalog.music.len(),
        config.catalog.sfx.len(),
        config.catalog.voice.len(),
        if config.jukebox.is_some() { ", jukebox" } else { "" }
    );

    let event_bus = EventBus::new();
    let (events, _subscription) = event_bus.subscribe();
    thread::spawn(move || {
        for event in events {
            println!("  ♪ {}", event.description());
        }
    });

    let driver = AudioDriver::spawn(move || AudioManager::new(&config, open_backend()), event_bus)
        .context("Starting audio driver")?;
    println!("✓ Audio driver running\n");
    print_help();

    for line in std::io::stdin().lock().lines() {
        let line = line.context("Reading stdin")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("help") {
            print_help();
            continue;
        }

        match line.parse::<AudioCommand>() {
            Ok(AudioCommand::Quit) => break,
            Ok(command) => {
                if !driver.send(command) {
                    eprintln!("✗ Audio driver stopped");
                    break;
                }
            }
            Err(e) => eprintln!("✗ {}", e),
        }
    }

    driver.shutdown();
    println!("Goodbye");
    Ok(())
}
