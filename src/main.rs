// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;
mod export;
mod render;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use clap::Parser;
use cli::{Cli, Commands, OutputFormatArg};
use delve_config::{Config, FingerprintMode};
use delve_core::{Session, SessionUpdate, WorkspaceState};
use delve_tools::{read_events, EventParseError, ToolEvent};

/// Capacity of the event and update channels between the reader, the
/// session and the printer.
const CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Completions { shell } => {
            cli::print_completions(shell);
            Ok(())
        }
        Commands::ShowConfig => {
            let config = delve_config::load(cli.config.as_deref())?;
            println!("{}", serde_yaml::to_string(&config).unwrap_or_default());
            Ok(())
        }
        Commands::Replay { input, format, expand, export, fingerprint, dedup_capacity } => {
            let mut config = delve_config::load(cli.config.as_deref())?;
            apply_session_overrides(&mut config, fingerprint, dedup_capacity);
            let opts = ReplayOptions { input, format, expand, export };
            replay_cmd(&config, opts).await
        }
        Commands::Export { input, out, overwrite } => {
            let config = delve_config::load(cli.config.as_deref())?;
            let dir = out.unwrap_or_else(|| config.export.dir.clone());
            let overwrite = overwrite || config.export.overwrite;
            let (session, _) = replay(&config, input, |_| Ok(())).await?;
            write_export(&session.snapshot(), &dir, overwrite)
        }
    }
}

fn apply_session_overrides(config: &mut Config, fingerprint: Option<FingerprintMode>, capacity: Option<usize>) {
    if let Some(mode) = fingerprint {
        config.session.fingerprint = mode;
    }
    if let Some(n) = capacity {
        config.session.dedup_capacity = n;
    }
}

struct ReplayOptions {
    input: PathBuf,
    format: OutputFormatArg,
    expand: bool,
    export: Option<PathBuf>,
}

async fn replay_cmd(config: &Config, opts: ReplayOptions) -> anyhow::Result<()> {
    let mut records = Vec::new();
    let mut stdout = io::stdout().lock();
    let (session, skipped) = match opts.format {
        OutputFormatArg::Text => {
            replay(config, opts.input, |update| {
                writeln!(stdout, "{}", render::card_text(&update, opts.expand))?;
                Ok(())
            })
            .await?
        }
        OutputFormatArg::Json => {
            replay(config, opts.input, |update| {
                records.push(render::CardRecord::from(update));
                Ok(())
            })
            .await?
        }
    };

    let snapshot = session.snapshot();
    match opts.format {
        OutputFormatArg::Text => {
            writeln!(stdout)?;
            writeln!(stdout, "{}", render::workspace_text(&snapshot, &session.stats()))?;
            if skipped > 0 {
                writeln!(stdout, "{skipped} malformed line(s) skipped")?;
            }
        }
        OutputFormatArg::Json => {
            let report = render::ReplayReport {
                session: &session.id,
                stats: session.stats(),
                cards: records,
                workspace: &snapshot,
            };
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
        }
    }
    drop(stdout);

    if let Some(dir) = opts.export {
        write_export(&snapshot, &dir, config.export.overwrite)?;
    }
    Ok(())
}

fn write_export(snapshot: &WorkspaceState, dir: &Path, overwrite: bool) -> anyhow::Result<()> {
    let written = export::export_files(&snapshot.files, dir, overwrite)?;
    info!(count = written.len(), dir = %dir.display(), "exported workspace files");
    for path in written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

/// Feed every event of a JSONL log through a fresh session and hand each
/// update to `on_update` in arrival order.  Returns the finished session and
/// the number of malformed lines that were skipped.
async fn replay<F>(config: &Config, input: PathBuf, mut on_update: F) -> anyhow::Result<(Session, usize)>
where
    F: FnMut(SessionUpdate) -> anyhow::Result<()>,
{
    let (event_tx, event_rx) = mpsc::channel::<ToolEvent>(CHANNEL_CAPACITY);
    let (update_tx, mut update_rx) = mpsc::channel::<SessionUpdate>(CHANNEL_CAPACITY);

    let session = Session::new(config);
    info!(session = %session.id, input = %input.display(), "replaying tool events");
    let driver = tokio::spawn(session.run(event_rx, update_tx));
    let reader = tokio::task::spawn_blocking(move || feed_events(&input, &event_tx));

    while let Some(update) = update_rx.recv().await {
        if let Err(e) = on_update(update) {
            // Stop the session; the reader notices the closed channel on its
            // next send and exits (a blocked stdin read still waits for a line).
            drop(update_rx);
            driver.abort();
            return Err(e);
        }
    }

    let skipped = reader.await.context("event reader panicked")??;
    let session = driver.await.context("session driver panicked")?;
    Ok((session, skipped))
}

fn open_input(input: &Path) -> anyhow::Result<Box<dyn BufRead + Send>> {
    if input == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(input).with_context(|| format!("opening event log {}", input.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Blocking side of [`replay`]: parse the log and push events into the
/// session channel.  Malformed lines are logged and skipped.
fn feed_events(input: &Path, events: &mpsc::Sender<ToolEvent>) -> anyhow::Result<usize> {
    let reader = open_input(input)?;
    let mut skipped = 0;
    for item in read_events(reader) {
        match item {
            Ok(event) => {
                if events.blocking_send(event).is_err() {
                    // session stopped early; nothing left to feed
                    break;
                }
            }
            Err(e @ EventParseError::Json { .. }) => {
                warn!("{e}");
                skipped += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("reading {}", input.display())),
        }
    }
    Ok(skipped)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replay_stops_when_the_printer_fails() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("events.jsonl");
        let line = r#"{"name":"read_file","status":"complete","args":{"path":"a.md"}}"#;
        std::fs::write(&log, format!("{line}\n").repeat(CHANNEL_CAPACITY * 4)).unwrap();

        let mut seen = 0;
        let result = replay(&Config::default(), log, |_| {
            seen += 1;
            anyhow::bail!("stdout closed")
        })
        .await;
        assert!(result.is_err());
        assert_eq!(seen, 1);
    }

    #[tokio::test]
    async fn replay_counts_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("events.jsonl");
        std::fs::write(
            &log,
            "{\"name\":\"write_file\",\"status\":\"complete\",\"args\":{\"path\":\"a.md\",\"content\":\"x\"}}\nnot json\n",
        )
        .unwrap();
        let (session, skipped) = replay(&Config::default(), log, |_| Ok(())).await.unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(session.snapshot().files.len(), 1);
    }
}
