//! Ansikey Inspector
//!
//! An interactive tool that puts the terminal into raw mode and prints every
//! decoded input event. Useful for checking what sequences a terminal
//! emulator actually sends.

use std::io;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ansikey::{Handlers, InputEvent, Terminal};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut output_format = OutputFormat::Text;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                return ExitCode::FAILURE;
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let stop = Arc::new(AtomicBool::new(false));
    let handlers = build_handlers(output_format, Arc::clone(&stop));

    let mut terminal = match Terminal::new(handlers) {
        Ok(terminal) => terminal,
        Err(e) => {
            eprintln!("Error opening terminal: {}", e);
            return ExitCode::FAILURE;
        },
    };
    terminal.set_stopper(stop);

    if output_format == OutputFormat::Text {
        print!("ansikey-inspect: press keys to see decoded events, q to quit\r\n");
    }

    match terminal.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

fn build_handlers(format: OutputFormat, stop: Arc<AtomicBool>) -> Handlers {
    Handlers::default()
        .on_keypress({
            let stop = Arc::clone(&stop);
            move |text| {
                report(format, &InputEvent::Keypress(text.to_string()));
                if text == "q" {
                    stop.store(true, Ordering::Relaxed);
                }
            }
        })
        .on_special(move |key, mods| {
            report(format, &InputEvent::Special { key, mods });
        })
        .on_position(move |row, col| {
            report(
                format,
                &InputEvent::Position {
                    row: row.to_string(),
                    col: col.to_string(),
                },
            );
        })
        .on_status(move |status| {
            report(format, &InputEvent::Status(status.to_string()));
        })
        .on_resize(move |size| {
            report(format, &InputEvent::Resize(size));
        })
        .on_unrecognized(move |sequence| {
            report(format, &InputEvent::Unrecognized(sequence.to_string()));
        })
        .on_interrupt(move || {
            report(format, &InputEvent::Interrupt);
            stop.store(true, Ordering::Relaxed);
        })
}

/// Print one event. Raw mode means explicit `\r\n` line endings.
fn report(format: OutputFormat, event: &InputEvent) {
    match format {
        OutputFormat::Text => match event {
            InputEvent::Keypress(text) => print!("keypress  {:?}\r\n", text),
            InputEvent::Special { key, mods } => {
                if mods.any() {
                    print!("special   {} ({:?})\r\n", key.name(), mods);
                } else {
                    print!("special   {}\r\n", key.name());
                }
            },
            InputEvent::Position { row, col } => print!("position  row={} col={}\r\n", row, col),
            InputEvent::Status(status) => print!("status    {:?}\r\n", status),
            InputEvent::Resize(size) => print!("resize    {}x{}\r\n", size.cols, size.rows),
            InputEvent::Interrupt => print!("interrupt\r\n"),
            InputEvent::Unrecognized(sequence) => print!("unknown   {:?}\r\n", sequence),
        },
        OutputFormat::Json => match serde_json::to_string(event) {
            Ok(json) => print!("{}\r\n", json),
            Err(e) => eprintln!("Error serializing event: {}", e),
        },
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn print_help() {
    println!("Ansikey Inspector");
    println!();
    println!("Usage: ansikey-inspect [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -j, --json  Print one JSON object per decoded event");
    println!("  -t, --text  Print human-readable events (default)");
    println!("  -h, --help  Show this help message");
    println!();
    println!("Press q or send an interrupt (^C) to quit.");
    println!();
    println!("Examples:");
    println!("  ansikey-inspect");
    println!("  RUST_LOG=debug ansikey-inspect --json 2>decoder.log");
}
