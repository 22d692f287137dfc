//! Source location: read one file, parse it, and find the syntax node a line maps to.

use std::io::Read as _;
use std::ops::Range;
use std::path::{Path, PathBuf};

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::BindFailure;

/// One parsed source file. Owns the tree; nodes borrowed from it cannot outlive it.
pub struct SourceDocument {
    /// Line start offsets into `text`.
    lines: LineIndex,
    /// File the text was read from, used in every failure.
    path: PathBuf,
    /// Decoded source text the tree was parsed from.
    text: String,
    /// Syntax tree over `text`. May contain local error nodes.
    tree: Tree,
}

/// Byte offsets where each line starts.
///
/// Line breaks are `\n`, `\r\n` and a lone `\r`. Text ending in a line break
/// has one more, empty, line after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Start offset of every line, plus `text.len()` as a sentinel.
    starts: Vec<usize>,
}

impl SourceDocument {
    /// Read, decode and parse a file.
    ///
    /// # Errors
    ///
    /// Returns `BindFailure::Io` if the file can't be opened or read,
    /// `BindFailure::FileTooLarge` if it exceeds `max_file_size`,
    /// or `BindFailure::Parse` if it can't be decoded or parsed.
    pub fn open(path: &Path, language: &Language, max_file_size: u64) -> Result<Self, BindFailure> {
        let io_failure = |source: std::io::Error| {
            return BindFailure::Io { file: path.to_path_buf(), source };
        };

        let mut file = std::fs::File::open(path).map_err(io_failure)?;
        let size_bytes = file.metadata().map_err(io_failure)?.len();
        if size_bytes > max_file_size {
            return Err(BindFailure::FileTooLarge {
                file: path.to_path_buf(),
                max_bytes: max_file_size,
                size_bytes,
            });
        }

        let mut bytes = Vec::with_capacity(usize::try_from(size_bytes).unwrap_or(0));
        file.read_to_end(&mut bytes).map_err(io_failure)?;

        let text = decode_source_text(bytes).map_err(|reason| {
            return BindFailure::Parse { file: path.to_path_buf(), reason };
        })?;

        return Self::parse(path.to_path_buf(), text, language);
    }

    /// Parse already-decoded text. Local syntax errors are kept in the tree;
    /// only a missing tree or an error root fails.
    ///
    /// # Errors
    ///
    /// Returns `BindFailure::Parse` if the grammar can't be loaded or the
    /// text is unparseable as a whole.
    pub fn parse(path: PathBuf, text: String, language: &Language) -> Result<Self, BindFailure> {
        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(language) {
            return Err(BindFailure::Parse { file: path, reason: e.to_string() });
        }

        let Some(tree) = parser.parse(&text, None) else {
            return Err(BindFailure::Parse {
                file: path,
                reason: "tree-sitter returned None".to_string(),
            });
        };

        if tree.root_node().is_error() {
            tracing::warn!(file = %path.display(), "syntax tree root is an error node");
            return Err(BindFailure::Parse {
                file: path,
                reason: "no recognizable C# structure".to_string(),
            });
        }

        tracing::debug!(
            file = %path.display(),
            bytes = text.len(),
            has_errors = tree.root_node().has_error(),
            "parsed source"
        );

        let lines = LineIndex::new(&text);
        return Ok(Self { lines, path, text, tree });
    }

    /// Number of lines in the document.
    pub fn line_count(&self) -> usize {
        return self.lines.line_count();
    }

    /// Find the innermost node covering the non-blank text of a line.
    ///
    /// # Errors
    ///
    /// Returns `BindFailure::LineOutOfRange` if `line` is past the end of the
    /// document, or `BindFailure::NoBindableNode` if the line is blank.
    pub fn node_at_line(&self, line: u32) -> Result<Node<'_>, BindFailure> {
        let index = usize::try_from(line).unwrap_or(usize::MAX);
        let Some(span) = self.lines.line_span(index, &self.text) else {
            return Err(BindFailure::LineOutOfRange {
                file: self.path.clone(),
                line,
                line_count: self.line_count(),
            });
        };

        let no_bindable_node = || {
            return BindFailure::NoBindableNode { file: self.path.clone(), line };
        };

        let content = trim_whitespace(&self.text, span).ok_or_else(no_bindable_node)?;
        let node = self
            .root()
            .descendant_for_byte_range(content.start, content.end)
            .ok_or_else(no_bindable_node)?;

        tracing::debug!(
            file = %self.path.display(),
            line,
            kind = node.kind(),
            "located node"
        );
        return Ok(node);
    }

    /// File the document was read from.
    pub fn path(&self) -> &Path {
        return &self.path;
    }

    /// Root node of the syntax tree.
    pub fn root(&self) -> Node<'_> {
        return self.tree.root_node();
    }

    /// Decoded source text.
    pub fn text(&self) -> &str {
        return &self.text;
    }
}

impl LineIndex {
    /// Index the line starts of `text`.
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut starts = vec![0];
        let mut offset = 0_usize;

        while let Some(&byte) = bytes.get(offset) {
            offset = offset.saturating_add(1);
            match byte {
                b'\n' => starts.push(offset),
                b'\r' => {
                    if bytes.get(offset) == Some(&b'\n') {
                        offset = offset.saturating_add(1);
                    }
                    starts.push(offset);
                },
                _ => {},
            }
        }

        starts.push(text.len());
        return Self { starts };
    }

    /// Number of lines, counting a final empty line after a trailing break.
    pub fn line_count(&self) -> usize {
        return self.starts.len().saturating_sub(1);
    }

    /// Byte range of a line's text, line break excluded. `None` past the end.
    pub fn line_span(&self, line: usize, text: &str) -> Option<Range<usize>> {
        let start = *self.starts.get(line)?;
        let next = *self.starts.get(line.checked_add(1)?)?;
        let raw = text.get(start..next)?;
        let content = raw.trim_end_matches(['\r', '\n']);
        return Some(start..start.saturating_add(content.len()));
    }
}

/// Decode raw file bytes: UTF-8 with or without BOM, or BOM-marked UTF-16.
fn decode_source_text(bytes: Vec<u8>) -> Result<String, String> {
    return match bytes.as_slice() {
        [0xEF, 0xBB, 0xBF, rest @ ..] => {
            String::from_utf8(rest.to_vec()).map_err(|e| return format!("invalid UTF-8: {e}"))
        },
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => String::from_utf8(bytes).map_err(|e| return format!("invalid UTF-8: {e}")),
    };
}

/// Decode UTF-16 code units with the given byte order.
fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, String> {
    let chunks = bytes.chunks_exact(2);
    if !chunks.remainder().is_empty() {
        return Err("odd byte count in UTF-16 text".to_string());
    }

    let units = chunks.map(|pair| return <[u8; 2]>::try_from(pair).map_or(0, unit));
    return char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|e| return format!("invalid UTF-16: {e}"));
}

/// Narrow a byte range to its non-whitespace content. `None` if it is all whitespace.
fn trim_whitespace(text: &str, span: Range<usize>) -> Option<Range<usize>> {
    let slice = text.get(span.clone())?;
    let leading = slice.len().saturating_sub(slice.trim_start().len());
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }

    let start = span.start.saturating_add(leading);
    return Some(start..start.saturating_add(trimmed.len()));
}
