use crate::error::{BindFailure, Error};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// One-line advice for an unbound breakpoint, shown next to it.
pub const fn failure_hint(failure: &BindFailure) -> &'static str {
    return match failure {
        BindFailure::FileTooLarge { .. } => "raise `max_file_size` in .bpbind.toml",
        BindFailure::Io { .. } => "check the path; the file may have been moved or deleted",
        BindFailure::LineOutOfRange { .. } => "the file is shorter than when the breakpoint was set; move the breakpoint",
        BindFailure::NoBindableNode { .. } => "move the breakpoint onto a line with code",
        BindFailure::NotInsideMethod { .. } => "breakpoints bind to code inside methods, constructors and accessors",
        BindFailure::NotInsideType { .. } => "top-level code has no type to bind to",
        BindFailure::Parse { .. } => "save the file as UTF-8 or BOM-marked UTF-16",
        BindFailure::UnsupportedLanguage { .. } => "add the extension to `extensions` in .bpbind.toml",
    };
}

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened and how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::Bind(failure) => render_bind_failure(failure),
        Error::InvalidLocation { input, reason } => format!("\
# Error: Invalid Location

`{input}`: {reason}

## Fix

Locations are one-based:

    path/to/File.cs:12
    path/to/File.cs:12:5
    path/to/File.cs:12:5-12:30
"),
        Error::Io(err) => format!("\
# Error: I/O

{err}
"),
        Error::Json(err) => format!("\
# Error: JSON Output

{err}
"),
        Error::TomlDe(err) => format!("\
# Error: Invalid Config

{err}

## Fix

Check `.bpbind.toml`. Known keys: `cache`, `extensions`, `max_file_size`, `workers`.
"),
        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}
"),
    };
}

/// Render a bind failure raised while a command needed the whole document.
fn render_bind_failure(failure: &BindFailure) -> String {
    return format!("\
# Error: Cannot Bind

{failure}

## Fix

{}
", failure_hint(failure));
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn invalid_location_shows_accepted_forms() {
        let md = render_error(&Error::InvalidLocation {
            input: "A.cs:0".to_string(),
            reason: "lines and columns start at 1".to_string(),
        });
        assert!(md.starts_with("# Error: Invalid Location"));
        assert!(md.contains("path/to/File.cs:12:5"));
    }

    #[test]
    fn bind_failure_includes_hint() {
        let failure = BindFailure::UnsupportedLanguage { ext: "vb".to_string(), file: PathBuf::from("A.vb") };
        let md = render_error(&Error::Bind(failure));
        assert!(md.contains("no grammar for extension: .vb"));
        assert!(md.contains("`extensions`"));
    }
}
