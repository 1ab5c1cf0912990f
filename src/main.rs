//! DirSentry — live directory watcher and disk usage analyser.
//!
//! Thin binary entry point. All logic lives in the `dirsentry-core` crate;
//! this file only parses arguments, wires logging, and prints results.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use crossbeam_channel::RecvTimeoutError;
use dirsentry_core::analysis::candidate_paths;
use dirsentry_core::model::size::{format_count, format_size};
use dirsentry_core::model::{FileStat, Notification};
use dirsentry_core::{export, Config, Sentry};
use std::path::Path;
use std::time::{Duration, Instant};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialise structured logging on stderr so stdout stays parseable.
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    tracing::info!("DirSentry starting");
    let sentry = Sentry::start(config).context("cannot start the filesystem watcher")?;
    tracing::debug!("Effective configuration: {:?}", sentry.config());

    match cli.command {
        Command::Watch {
            path,
            seconds,
            json,
        } => watch(sentry, &path, seconds.map(Duration::from_secs), json),
        Command::Insight { path, json } => insight(&sentry, &path, json),
        Command::Top { path, json, csv } => {
            let files = sentry
                .top_files(&path)
                .with_context(|| format!("cannot rank files under {}", path.display()))?;
            print_files(&files, json, csv.as_deref())
        }
        Command::Cleanup {
            path,
            delete,
            json,
            csv,
        } => {
            let candidates = sentry
                .scan_cleanup(&path)
                .with_context(|| format!("cannot scan {}", path.display()))?;
            print_files(&candidates, json, csv.as_deref())?;
            if delete {
                let report = sentry.execute_cleanup(&candidate_paths(&candidates));
                println!(
                    "Removed {} files ({}), {} failed",
                    format_count(report.removed),
                    format_size(report.freed_bytes),
                    report.failed
                );
            }
            Ok(())
        }
    }
}

fn watch(sentry: Sentry, path: &Path, limit: Option<Duration>, json: bool) -> anyhow::Result<()> {
    sentry
        .add_recursive(path)
        .with_context(|| format!("cannot watch {}", path.display()))?;
    let rx = sentry.notifications();
    let deadline = limit.map(|d| Instant::now() + d);

    loop {
        let timeout = match deadline {
            Some(d) => d.saturating_duration_since(Instant::now()),
            None => Duration::from_secs(3_600),
        };
        match rx.recv_timeout(timeout) {
            Ok(Notification::FileEvent(ev)) => {
                if json {
                    println!("{}", serde_json::to_string(&ev)?);
                } else {
                    println!(
                        "{} {:<6} {}{}{}",
                        ev.time_detail(),
                        ev.op,
                        ev.path.display(),
                        if ev.is_dir { "/" } else { "" },
                        if ev.is_sensitive { "  [sensitive]" } else { "" }
                    );
                }
            }
            Ok(Notification::ScanProgress(_)) => {}
            Err(RecvTimeoutError::Timeout) if deadline.is_none() => {}
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let audit = sentry.audit_log();
    sentry.shutdown();

    if json {
        println!("{}", serde_json::to_string_pretty(&audit)?);
    } else {
        println!("Audit log ({} entries):", audit.len());
        for entry in &audit {
            println!(
                "  {} {:<6} {:?} {}",
                entry.event.time_detail(),
                entry.event.op,
                entry.reason,
                entry.event.path.display()
            );
        }
    }
    Ok(())
}

fn insight(sentry: &Sentry, path: &Path, json: bool) -> anyhow::Result<()> {
    let rx = sentry.notifications();
    let result = std::thread::scope(|s| {
        let scan = s.spawn(|| sentry.scan_insight(path));
        while !scan.is_finished() {
            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(Notification::ScanProgress(p)) => {
                    eprint!("\rScanned {:>10}  {:<40}", format_count(p.scanned), p.current);
                }
                Ok(_) | Err(_) => {}
            }
        }
        eprintln!();
        scan.join()
    });
    let insight = match result {
        Ok(r) => r.with_context(|| format!("cannot scan {}", path.display()))?,
        Err(_) => anyhow::bail!("insight scan panicked"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&insight)?);
        return Ok(());
    }

    println!("Total size : {} ({} bytes)", insight.total_size, insight.total_bytes);
    println!("Files      : {}", format_count(insight.file_count));
    println!("Directories: {}", format_count(insight.dir_count));
    let mut by_count: Vec<_> = insight.categories.iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (ext, count) in by_count {
        println!("  {:<16} {:>10}", ext, format_count(*count));
    }
    Ok(())
}

fn print_files(files: &[FileStat], json: bool, csv: Option<&Path>) -> anyhow::Result<()> {
    if let Some(csv_path) = csv {
        let file = std::fs::File::create(csv_path)
            .with_context(|| format!("cannot create {}", csv_path.display()))?;
        export::write_csv(file, files)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(files)?);
        return Ok(());
    }

    for f in files {
        println!("{:>12}  {}  {}", f.size, f.time_detail, f.path.display());
    }
    let total: u64 = files.iter().map(|f| f.bytes).sum();
    println!("{} files, {}", format_count(files.len() as u64), format_size(total));
    Ok(())
}
