//! Sercom - scriptable serial commander
//!
//! Opens one serial connection and drives it from a command file, the
//! keyboard, or not at all, mirroring the traffic into an annotated
//! transcript. Exit codes are stable so wrapper scripts can tell failure
//! classes apart.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use crossterm::terminal::SetTitle;

use sercom_core::cli::{self, channel_exit_code, session_exit_code, Args, ExitCodes};
use sercom_core::config::FileConfig;
use sercom_core::core::channel::{SerialChannel, SerialLink};
use sercom_core::core::console::Console;
use sercom_core::core::dispatch;
use sercom_core::core::session::SessionIo;
use sercom_core::core::transcript::{Direction, Transcript, TranscriptConfig};

fn main() -> ExitCode {
    // Diagnostics go to stderr so piped session data stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list_ports {
        return match cli::print_ports() {
            Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::from(ExitCodes::ERROR)
            }
        };
    }

    let file_config = match FileConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(ExitCodes::CONFIG_ERROR);
        }
    };
    let settings = match args.resolve(&file_config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(ExitCodes::CONFIG_ERROR);
        }
    };

    let console = Console::new(settings.color);

    if let Some(title) = &settings.title {
        if atty::is(atty::Stream::Stdout) {
            let _ = crossterm::execute!(std::io::stdout(), SetTitle(title));
        }
    }

    let mut transcript = match &settings.log_path {
        Some(path) => {
            let config = TranscriptConfig {
                max_size_mb: settings.max_log_size_mb,
                flush_every: settings.flush_every,
            };
            match Transcript::create(path.clone(), &config, &settings.serial.summary()) {
                Ok(transcript) => Some(transcript),
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::from(ExitCodes::CONFIG_ERROR);
                }
            }
        }
        None => None,
    };
    if let Some(transcript) = transcript.as_ref() {
        console.info(&format!("Logging to {}", transcript.path().display()));
    }

    let mut channel = match SerialChannel::open(&settings.serial) {
        Ok(channel) => channel,
        Err(e) => {
            console.error(&e.to_string());
            if let Some(transcript) = transcript.as_mut() {
                transcript.append(Direction::Error, &e.to_string(), None);
                transcript.finish();
            }
            return ExitCode::from(channel_exit_code(&e));
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            running.store(false, Ordering::SeqCst);
        }) {
            tracing::warn!("could not install interrupt handler: {}", e);
        }
    }

    let connected = format!("Connected: {}", channel.describe());
    let result = {
        let mut io = SessionIo::new(&mut channel, &console, transcript.as_mut());
        io.note(&connected);
        dispatch::run(&settings, &mut io, &running)
    };

    if let Err(e) = &result {
        if let Some(transcript) = transcript.as_mut() {
            transcript.append(Direction::Error, &e.to_string(), None);
        }
    }
    if let Some(transcript) = transcript.as_mut() {
        transcript.finish();
    }
    channel.close();

    match result {
        Ok(()) => {
            console.info("Session ended.");
            ExitCode::from(ExitCodes::SUCCESS)
        }
        Err(e) => {
            console.error(&e.to_string());
            ExitCode::from(session_exit_code(&e))
        }
    }
}
