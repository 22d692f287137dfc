/// Tree-sitter grammar resolution by file extension.
use std::path::Path;

use tree_sitter::Language;

use crate::error::BindFailure;

/// Map a file extension to the C# grammar if it is one of `extensions`.
///
/// Comparison ignores ASCII case so `Player.CS` binds like `Player.cs`.
///
/// # Errors
///
/// Returns `BindFailure::UnsupportedLanguage` for extensions not in the list.
pub fn language_for_path(path: &Path, extensions: &[String]) -> Result<Language, BindFailure> {
    let ext = path.extension().and_then(|e| return e.to_str()).unwrap_or("");

    if extensions.iter().any(|known| return known.eq_ignore_ascii_case(ext)) {
        return Ok(tree_sitter_c_sharp::LANGUAGE.into());
    }

    return Err(BindFailure::UnsupportedLanguage {
        ext: ext.to_string(),
        file: path.to_path_buf(),
    });
}
