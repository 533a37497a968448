//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load a staffbook data root (or a TOML config pointing at one) and print
//!   a deterministic summary of what was indexed.
//! - List documents that failed to load so they can be fixed by hand.

use staffbook_core::{default_log_level, init_logging, DocumentStore, StoreConfig};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(target) = std::env::args().nth(1) else {
        eprintln!("usage: staffbook_cli <data-dir | config.toml>");
        return ExitCode::from(2);
    };

    let config = if target.ends_with(".toml") {
        match StoreConfig::load(Path::new(&target)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        StoreConfig::new(&target)
    };

    if let Some(log_dir) = &config.log_dir {
        let level = config.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let (store, report) = match DocumentStore::open(&config) {
        Ok(opened) => opened,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("staffbook_core version={}", staffbook_core::core_version());
    println!("root={}", store.config().root.display());
    println!(
        "staff={} transcripts={} reminders={}",
        report.staff, report.transcripts, report.reminders
    );
    for corrupt in &report.corrupt {
        println!("corrupt path={} error={}", corrupt.path.display(), corrupt.error);
    }
    for dangling in &report.dangling {
        println!(
            "dangling reminder={} staff={}",
            dangling.reminder_id, dangling.staff_id
        );
    }

    if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(3)
    }
}
