/// Crate-level error types for bpbind.
use std::path::PathBuf;

/// Why a single bind attempt produced no scope.
///
/// Every variant is a normal result value, never a crash. Each one names the
/// file (and line where it applies) so an unbound breakpoint can be explained
/// from the message alone.
#[derive(Debug, thiserror::Error)]
pub enum BindFailure {
    /// The file exceeds the configured size limit.
    #[error("file too large ({size_bytes} bytes, max {max_bytes}): {}", file.display())]
    FileTooLarge {
        /// File that exceeded the size limit.
        file: PathBuf,
        /// Maximum allowed file size in bytes.
        max_bytes: u64,
        /// Actual file size in bytes.
        size_bytes: u64,
    },

    /// The file could not be opened or read.
    #[error("cannot read {}: {source}", file.display())]
    Io {
        /// File that failed to open or read.
        file: PathBuf,
        /// The wrapped I/O error.
        source: std::io::Error,
    },

    /// The requested line is not inside the document (file shortened since the breakpoint was set).
    #[error("line {line} out of range in {} ({line_count} lines)", file.display())]
    LineOutOfRange {
        /// File the line was requested from.
        file: PathBuf,
        /// Zero-based line index that was requested.
        line: u32,
        /// Number of lines in the document.
        line_count: usize,
    },

    /// The line holds nothing that can carry a breakpoint.
    #[error("no bindable code on line {line} in {}", file.display())]
    NoBindableNode {
        /// File containing the line.
        file: PathBuf,
        /// Zero-based line index.
        line: u32,
    },

    /// The line is not inside any executable member.
    #[error("line {line} is not inside a method in {}", file.display())]
    NotInsideMethod {
        /// File containing the line.
        file: PathBuf,
        /// Zero-based line index.
        line: u32,
    },

    /// A method was found but no type encloses it.
    #[error("method `{method}` on line {line} has no enclosing type in {}", file.display())]
    NotInsideType {
        /// File containing the method.
        file: PathBuf,
        /// Zero-based line index.
        line: u32,
        /// Metadata name of the enclosing method.
        method: String,
    },

    /// The text could not be decoded or parsed at all.
    #[error("parse failed: {}: {reason}", file.display())]
    Parse {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The file extension is not configured as C#.
    #[error("no grammar for extension: .{ext} ({})", file.display())]
    UnsupportedLanguage {
        /// File extension without the leading dot.
        ext: String,
        /// File that was requested.
        file: PathBuf,
    },
}

impl BindFailure {
    /// Stable snake_case identifier used in machine-readable output.
    pub const fn code(&self) -> &'static str {
        return match self {
            Self::FileTooLarge { .. } => "file_too_large",
            Self::Io { .. } => "io_error",
            Self::LineOutOfRange { .. } => "line_out_of_range",
            Self::NoBindableNode { .. } => "no_bindable_node",
            Self::NotInsideMethod { .. } => "not_inside_method",
            Self::NotInsideType { .. } => "not_inside_type",
            Self::Parse { .. } => "parse_error",
            Self::UnsupportedLanguage { .. } => "unsupported_language",
        };
    }

    /// True when the position simply isn't executable code, as opposed to a
    /// problem reading or parsing the file.
    pub const fn is_expected(&self) -> bool {
        return matches!(
            self,
            Self::NoBindableNode { .. } | Self::NotInsideMethod { .. } | Self::NotInsideType { .. }
        );
    }
}

/// Errors raised by the command-line surface around the binder.
#[allow(clippy::error_impl_error, reason = "crate-level error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document needed by a command could not be loaded.
    #[error(transparent)]
    Bind(
        /// The wrapped bind failure.
        #[from]
        BindFailure,
    ),

    /// A breakpoint location argument is malformed.
    #[error("invalid location `{input}`: {reason}")]
    InvalidLocation {
        /// The argument as given.
        input: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// TOML deserialization of `.bpbind.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}
