/// Core domain types for breakpoint requests and bind results.
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::BindFailure;

/// Result of one bind attempt.
pub type BindOutcome = Result<ResolvedScope, BindFailure>;

/// A user breakpoint as the host debugger hands it over. All coordinates are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointRequest {
    /// End of the selected range.
    pub end: TextPosition,
    /// Source file the breakpoint was set in.
    pub file: PathBuf,
    /// Start of the selected range. Only its line takes part in binding.
    pub start: TextPosition,
}

impl BreakpointRequest {
    /// Build a request spanning `start..end` in `file`.
    pub fn new(file: impl Into<PathBuf>, start: TextPosition, end: TextPosition) -> Self {
        return Self { end, file: file.into(), start };
    }

    /// A request covering the start of a single line.
    pub fn at_line(file: impl Into<PathBuf>, line: u32) -> Self {
        let position = TextPosition { column: 0, line };
        return Self::new(file, position, position);
    }
}

impl fmt::Display for BreakpointRequest {
    /// Editor-style `file:line:column`, one-based.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(
            f,
            "{}:{}:{}",
            self.file.display(),
            self.start.line.saturating_add(1),
            self.start.column.saturating_add(1)
        );
    }
}

/// Output of a successful bind. Owns its strings: the parsed document is
/// gone by the time anyone reads this.
///
/// `type_name` and `method_name` are never empty. `namespace_name` is empty
/// for the global namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedScope {
    /// Metadata name of the innermost enclosing method.
    #[serde(rename = "method")]
    pub method_name: String,
    /// Dotted namespace path, outermost first.
    #[serde(rename = "namespace")]
    pub namespace_name: String,
    /// Identifier of the innermost enclosing type.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ResolvedScope {
    /// `Namespace.Type.Method`.
    pub fn qualified_method_name(&self) -> String {
        return format!("{}.{}", self.qualified_type_name(), self.method_name);
    }

    /// Canonical type name: namespace and type joined by a single `.`,
    /// or the bare type name in the global namespace.
    pub fn qualified_type_name(&self) -> String {
        if self.namespace_name.is_empty() {
            return self.type_name.clone();
        }
        return format!("{}.{}", self.namespace_name, self.type_name);
    }
}

/// A zero-based line/column pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextPosition {
    /// Zero-based column.
    pub column: u32,
    /// Zero-based line index.
    pub line: u32,
}
