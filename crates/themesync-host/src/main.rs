//! `themesync` - drive a theme provider from a script of host events.
//!
//! ```text
//! $ printf '%s\n' \
//!     '{"event":"setTheme","theme":"DARK"}' \
//!     '{"event":"message","origin":"http://localhost","data":{"type":"VIBE_STYLE_OVERRIDE","payload":{"kind":"cssVars","variables":{"--x":"#123456"}}}}' \
//!   | themesync run --initial LIGHT --system light --origin http://localhost
//! ```

mod cli;
mod events;
mod output;
mod session;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use anyhow::{Context, Result};
use clap::Parser;
use themesync::{detect_system_preference, resolve, SyncConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, RunArgs};
use crate::events::parse_event_line;
use crate::output::Printer;
use crate::session::Session;

fn main() {
    init_logging();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{} {:#}", console::style("error:").red().bold(), err);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("THEMESYNC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => run_script(args),
        Command::Resolve { mode, system } => {
            let fallback = SyncConfig::default().system_fallback;
            let prefers_dark = system
                .preference()
                .unwrap_or_else(detect_system_preference)
                .unwrap_or(fallback.is_dark());
            println!("{}", resolve(mode, prefers_dark));
            Ok(())
        }
        Command::Detect => {
            match detect_system_preference() {
                Some(true) => println!("dark"),
                Some(false) => println!("light"),
                None => println!("unavailable"),
            }
            Ok(())
        }
    }
}

fn run_script(args: RunArgs) -> Result<()> {
    let config = args.load_config()?;
    let session = Session::start(config, args.system.signal())?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin().lock())),
    };

    let mut out = run_events(&session, reader, Printer::new(args.format, io::stdout().lock()))?;
    out.flush()?;
    Ok(())
}

/// Prints the mount record, then applies each script line and prints a
/// record numbered by its line. Returns the printer's writer.
fn run_events<R: BufRead, W: Write>(
    session: &Session,
    reader: R,
    mut printer: Printer<W>,
) -> Result<W> {
    printer.print(0, "mount", None, &session.snapshot())?;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("failed to read line {}", line_no))?;
        let Some(event) = parse_event_line(&line).with_context(|| format!("line {}", line_no))?
        else {
            continue;
        };

        let label = event.label();
        let disposition = session.apply(event);
        printer.print(line_no, label, disposition.as_ref(), &session.snapshot())?;
    }

    Ok(printer.into_inner())
}
