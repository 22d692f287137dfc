//! Parse one-based `path:line[:col][-endline[:endcol]]` arguments into breakpoint requests.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::types::{BreakpointRequest, TextPosition};

/// `file:line[:col][-endline[:endcol]]`. The lazy file group lets Windows
/// drive letters (`C:\src\A.cs:12`) through.
#[allow(clippy::expect_used, reason = "hardcoded pattern, checked by tests")]
static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    return Regex::new(r"^(?P<file>.+?):(?P<line>\d+)(?::(?P<col>\d+))?(?:-(?P<end_line>\d+)(?::(?P<end_col>\d+))?)?$")
        .expect("valid regex");
});

/// Parse a location argument. Lines and columns are one-based on the
/// command line and zero-based in the returned request. A missing end
/// defaults to the start.
///
/// # Errors
///
/// Returns `Error::InvalidLocation` if the argument doesn't match the
/// format, a number is zero or too large, or the end precedes the start.
pub fn parse_location(input: &str) -> Result<BreakpointRequest, Error> {
    let invalid = |reason: &str| {
        return Error::InvalidLocation { input: input.to_string(), reason: reason.to_string() };
    };

    let Some(caps) = LOCATION.captures(input) else {
        return Err(invalid("expected path:line[:col][-endline[:endcol]]"));
    };

    let number = |name: &str| -> Result<Option<u32>, Error> {
        let Some(m) = caps.name(name) else {
            return Ok(None);
        };
        let value: u32 = m.as_str().parse().map_err(|_err| return invalid("number too large"))?;
        let Some(zero_based) = value.checked_sub(1) else {
            return Err(invalid("lines and columns start at 1"));
        };
        return Ok(Some(zero_based));
    };

    let line = number("line")?.unwrap_or(0);
    let start = TextPosition { column: number("col")?.unwrap_or(0), line };
    let end_line = number("end_line")?.unwrap_or(line);
    let end = TextPosition { column: number("end_col")?.unwrap_or(start.column), line: end_line };

    if (end.line, end.column) < (start.line, start.column) {
        return Err(invalid("range ends before it starts"));
    }

    let file = caps.name("file").map_or("", |m| return m.as_str());
    return Ok(BreakpointRequest::new(file, start, end));
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn line_only() {
        let request = parse_location("src/Player.cs:12").unwrap();
        assert_eq!(request.file, PathBuf::from("src/Player.cs"));
        assert_eq!(request.start, TextPosition { column: 0, line: 11 });
        assert_eq!(request.end, request.start);
    }

    #[test]
    fn full_range() {
        let request = parse_location("Player.cs:12:5-14:9").unwrap();
        assert_eq!(request.start, TextPosition { column: 4, line: 11 });
        assert_eq!(request.end, TextPosition { column: 8, line: 13 });
    }

    #[test]
    fn windows_drive_letter() {
        let request = parse_location(r"C:\game\Player.cs:3:1").unwrap();
        assert_eq!(request.file, PathBuf::from(r"C:\game\Player.cs"));
        assert_eq!(request.start.line, 2);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(parse_location("Player.cs:0").is_err());
        assert!(parse_location("Player.cs").is_err());
        assert!(parse_location("Player.cs:abc").is_err());
        assert!(parse_location("Player.cs:99999999999").is_err());
    }

    #[test]
    fn rejects_backwards_range() {
        assert!(matches!(
            parse_location("Player.cs:10-9"),
            Err(Error::InvalidLocation { .. })
        ));
    }
}
