//! File watcher: binds on startup, then re-binds when source files change
//! and prints the breakpoints whose outcome moved.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::binder::Binder;
use crate::commands;
use crate::error::Error;
use crate::types::{BindOutcome, BreakpointRequest};

/// Debounce delay between filesystem events and re-bind.
const DEBOUNCE_MS: u64 = 100;

/// Parent directories of every requested file.
fn collect_watch_dirs(requests: &[BreakpointRequest]) -> HashSet<PathBuf> {
    let mut dirs = HashSet::new();
    for request in requests {
        match request.file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => dirs.insert(parent.to_path_buf()),
            _ => dirs.insert(PathBuf::from(".")),
        };
    }
    return dirs;
}

/// Create a filesystem watcher that signals on the given channel.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(tx: crossbeam_channel::Sender<()>) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
            )
        {
            // A closed channel means the watch loop already ended.
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::WatchFailed { reason: format!("watcher setup failed: {e}") };
    });
}

/// Exit code for a round of outcomes: 0 when all bound, 1 otherwise.
fn exit_code(outcomes: &[BindOutcome]) -> ExitCode {
    if outcomes.iter().all(Result::is_ok) {
        return ExitCode::SUCCESS;
    }
    return ExitCode::from(1);
}

/// Comparable summary of an outcome: the qualified method when bound, the
/// failure code when not.
fn outcome_key(outcome: &BindOutcome) -> Result<String, &'static str> {
    return match outcome {
        Ok(scope) => Ok(scope.qualified_method_name()),
        Err(failure) => Err(failure.code()),
    };
}

/// Print the outcomes that differ between two rounds. Returns how many did.
fn print_changes(requests: &[BreakpointRequest], before: &[BindOutcome], after: &[BindOutcome]) -> usize {
    let mut changed = 0_usize;
    for ((request, old), new) in requests.iter().zip(before).zip(after) {
        if outcome_key(old) != outcome_key(new) {
            commands::print_outcome_line(request, new);
            changed = changed.saturating_add(1);
        }
    }
    return changed;
}

/// Drop cached parses of every requested file and bind again.
fn rebind(binder: &Binder, requests: &[BreakpointRequest]) -> Vec<BindOutcome> {
    let files: HashSet<&Path> = requests.iter().map(|r| return r.file.as_path()).collect();
    for file in files {
        binder.invalidate(file);
    }
    return binder.bind_all(requests);
}

/// Entry point for the watch command.
///
/// Binds every location once and prints all outcomes, then watches the
/// containing directories and prints only outcomes that change.
///
/// # Errors
///
/// Returns errors from location parsing, config loading, or watcher setup.
pub fn run(locations: &[String], no_cache: bool) -> Result<ExitCode, Error> {
    let requests = commands::parse_locations(locations)?;
    let binder = commands::load_binder(no_cache)?;

    eprintln!("watch: initial bind");
    let mut last = binder.bind_all(&requests);
    for (request, outcome) in requests.iter().zip(&last) {
        commands::print_outcome_line(request, outcome);
    }

    let watch_dirs = collect_watch_dirs(&requests);
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;

    for dir in &watch_dirs {
        if dir.exists()
            && let Err(e) = watcher.watch(dir, RecursiveMode::NonRecursive)
        {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot watch directory");
        }
    }

    let dir_count = watch_dirs.len();
    eprintln!("watch: monitoring {dir_count} directories, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}

        let current = rebind(&binder, &requests);
        let changed = print_changes(&requests, &last, &current);
        eprintln!("watch: change detected, {changed} breakpoints moved");
        last = current;
    }

    return Ok(exit_code(&last));
}
