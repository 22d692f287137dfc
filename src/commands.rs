//! CLI commands for bpbind: bind and scopes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;
use walkdir::WalkDir;

use crate::binder::Binder;
use crate::config::Config;
use crate::diagnostics;
use crate::error::Error;
use crate::grammar;
use crate::location;
use crate::scope::{self, MethodScope};
use crate::types::{BindOutcome, BreakpointRequest, ResolvedScope};

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// A JSON array on stdout.
    Json,
    /// One aligned line per result.
    Text,
}

/// One bind result as printed in JSON output.
#[derive(Serialize)]
struct BindReport<'a> {
    /// One-based column of the request.
    column: u32,
    /// File as given on the command line.
    file: &'a Path,
    /// One-based line of the request.
    line: u32,
    /// Human-readable failure, when unbound.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// Stable failure code, when unbound.
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    /// Resolved names, when bound.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    scope: Option<&'a ResolvedScope>,
    /// `bound` or `unbound`.
    status: &'static str,
}

/// One method scope as printed in JSON output.
#[derive(Serialize)]
struct ScopeReport<'a> {
    /// File the scope was found in.
    file: &'a Path,
    /// Line range and names.
    #[serde(flatten)]
    scope: &'a MethodScope,
}

/// Bind every location and print the outcomes.
/// Exits 0 when all bound, 1 when any is unbound.
///
/// # Errors
///
/// Returns errors from config loading, location parsing, or JSON output.
pub fn bind(locations: &[String], format: OutputFormat, no_cache: bool) -> Result<ExitCode, Error> {
    let requests = parse_locations(locations)?;
    let binder = load_binder(no_cache)?;
    let outcomes = binder.bind_all(&requests);

    print_outcomes(&requests, &outcomes, format)?;

    if outcomes.iter().all(Result::is_ok) {
        return Ok(ExitCode::SUCCESS);
    }
    return Ok(ExitCode::from(1));
}

/// Collect the files to list: explicit files as given, directories walked
/// for configured extensions, in sorted order.
fn collect_source_files(paths: &[PathBuf], config: &Config) -> Vec<(PathBuf, bool)> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push((path.clone(), true));
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| {
                return e.file_type().is_file() && grammar::language_for_path(e.path(), &config.extensions).is_ok();
            })
            .map(|e| return e.path().to_path_buf())
            .collect();
        found.sort();
        files.extend(found.into_iter().map(|f| return (f, false)));
    }
    return files;
}

/// Load `.bpbind.toml` from the working directory and build a binder.
///
/// # Errors
///
/// Returns config loading errors.
pub fn load_binder(no_cache: bool) -> Result<Binder, Error> {
    let mut config = Config::load(Path::new("."))?;
    if no_cache {
        config.cache = false;
    }
    return Ok(Binder::new(config));
}

/// Parse all location arguments, failing on the first malformed one.
///
/// # Errors
///
/// Returns `Error::InvalidLocation` for a malformed argument.
pub fn parse_locations(locations: &[String]) -> Result<Vec<BreakpointRequest>, Error> {
    return locations.iter().map(|l| return location::parse_location(l)).collect();
}

/// Print one `BOUND`/`UNBOUND` line, with a hint on stderr for failures.
pub fn print_outcome_line(request: &BreakpointRequest, outcome: &BindOutcome) {
    match outcome {
        Ok(scope) => println!("BOUND    {request}  {}", scope.qualified_method_name()),
        Err(failure) => {
            println!("UNBOUND  {request}  ({})", failure.code().replace('_', " "));
            eprintln!("  hint: {}", diagnostics::failure_hint(failure));
        },
    }
}

/// Print bind outcomes in the requested format.
///
/// # Errors
///
/// Returns `Error::Json` if JSON serialization fails.
pub fn print_outcomes(
    requests: &[BreakpointRequest],
    outcomes: &[BindOutcome],
    format: OutputFormat,
) -> Result<(), Error> {
    match format {
        OutputFormat::Json => {
            let reports: Vec<BindReport<'_>> =
                requests.iter().zip(outcomes).map(|(r, o)| return report(r, o)).collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        },
        OutputFormat::Text => {
            for (request, outcome) in requests.iter().zip(outcomes) {
                print_outcome_line(request, outcome);
            }
        },
    }
    return Ok(());
}

/// Build the JSON report for one outcome.
fn report<'a>(request: &'a BreakpointRequest, outcome: &'a BindOutcome) -> BindReport<'a> {
    let (scope, reason, message) = match outcome {
        Ok(scope) => (Some(scope), None, None),
        Err(failure) => (None, Some(failure.code()), Some(failure.to_string())),
    };
    return BindReport {
        column: request.start.column.saturating_add(1),
        file: &request.file,
        line: request.start.line.saturating_add(1),
        message,
        reason,
        scope,
        status: if scope.is_some() { "bound" } else { "unbound" },
    };
}

/// List the method scopes of files and directories.
///
/// Files named explicitly must load; files found by walking a directory
/// are skipped with a warning when they don't.
///
/// # Errors
///
/// Returns errors from config loading, loading an explicit file, or JSON output.
pub fn scopes(paths: &[PathBuf], format: OutputFormat) -> Result<(), Error> {
    let binder = load_binder(true)?;
    let files = collect_source_files(paths, binder.config());

    let mut listed: Vec<(PathBuf, Vec<MethodScope>)> = Vec::new();
    for (file, explicit) in files {
        let document = match binder.load_document(&file) {
            Err(failure) if !explicit => {
                tracing::warn!(file = %file.display(), reason = failure.code(), "skipping file");
                continue;
            },
            Err(failure) => return Err(Error::Bind(failure)),
            Ok(document) => document,
        };
        let found = scope::list_method_scopes(&document);
        listed.push((file, found));
    }

    match format {
        OutputFormat::Json => {
            let reports: Vec<ScopeReport<'_>> = listed
                .iter()
                .flat_map(|(file, found)| {
                    return found.iter().map(|scope| return ScopeReport { file, scope });
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        },
        OutputFormat::Text => {
            for (file, found) in &listed {
                for method in found {
                    println!(
                        "{}:{}-{}  {}",
                        file.display(),
                        method.start_line,
                        method.end_line,
                        method.scope.qualified_method_name()
                    );
                }
            }
        },
    }

    return Ok(());
}
