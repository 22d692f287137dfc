//! Bind breakpoint requests: locate the node for a line, then resolve its scope.

use std::path::Path;
use std::sync::Arc;

use crate::cache::DocumentCache;
use crate::config::Config;
use crate::error::BindFailure;
use crate::grammar;
use crate::locator::SourceDocument;
use crate::scope;
use crate::types::{BindOutcome, BreakpointRequest, TextPosition};

/// Binds breakpoint requests under one configuration.
///
/// Attempts are independent: without the cache a `Binder` holds no state
/// between them, and with it the only shared state is the parse cache.
pub struct Binder {
    /// Parsed documents kept between attempts, when enabled.
    cache: Option<DocumentCache>,
    /// Extensions, size limit and worker count.
    config: Config,
}

impl Binder {
    /// A binder using `config`, with a parse cache if `config.cache` is set.
    pub fn new(config: Config) -> Self {
        let cache = config.cache.then(DocumentCache::new);
        return Self { cache, config };
    }

    /// Bind one request: read and parse its file, find the node on its start
    /// line, walk up to method, type and namespace.
    pub fn bind(&self, request: &BreakpointRequest) -> BindOutcome {
        let line = request.start.line;
        let document = self.load_document(&request.file)?;
        let node = document.node_at_line(line)?;
        let outcome = scope::resolve_from(&document, node, line);

        match &outcome {
            Ok(resolved) => tracing::debug!(%request, scope = %resolved.qualified_method_name(), "bound"),
            Err(failure) => tracing::debug!(%request, reason = failure.code(), "unbound"),
        }
        return outcome;
    }

    /// Bind many requests on a pool of worker threads. Outcomes come back in
    /// request order.
    pub fn bind_all(&self, requests: &[BreakpointRequest]) -> Vec<BindOutcome> {
        let workers = self.config.workers.get().min(requests.len()).max(1);
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &BreakpointRequest)>();
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<(usize, BindOutcome)>();

        for job in requests.iter().enumerate() {
            // The receiver is alive in this scope, so sending can't fail.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        std::thread::scope(|s| {
            for _ in 0..workers {
                let jobs = job_rx.clone();
                let done = done_tx.clone();
                s.spawn(move || {
                    for (index, request) in jobs.iter() {
                        // `done_rx` outlives the scope, so sending can't fail.
                        let _ = done.send((index, self.bind(request)));
                    }
                });
            }
        });
        drop(done_tx);

        let mut outcomes: Vec<(usize, BindOutcome)> = done_rx.iter().collect();
        outcomes.sort_by_key(|(index, _)| return *index);
        return outcomes.into_iter().map(|(_, outcome)| return outcome).collect();
    }

    /// The binder's configuration.
    pub const fn config(&self) -> &Config {
        return &self.config;
    }

    /// Forget any cached parse of `path`.
    pub fn invalidate(&self, path: &Path) {
        if let Some(cache) = &self.cache {
            cache.invalidate(path);
        }
    }

    /// Open a document through the cache if there is one.
    ///
    /// # Errors
    ///
    /// Returns the language, I/O, size and parse failures of loading.
    pub fn load_document(&self, path: &Path) -> Result<Arc<SourceDocument>, BindFailure> {
        let language = grammar::language_for_path(path, &self.config.extensions)?;
        return match &self.cache {
            Some(cache) => cache.load(path, &language, self.config.max_file_size),
            None => Ok(Arc::new(SourceDocument::open(path, &language, self.config.max_file_size)?)),
        };
    }
}

impl Default for Binder {
    /// Default configuration without a parse cache: every attempt re-reads the file.
    fn default() -> Self {
        let config = Config { cache: false, ..Config::default() };
        return Self::new(config);
    }
}

/// Resolve a breakpoint in `file_path` to its enclosing namespace, type and method.
///
/// Positions are zero-based. Only the start line takes part in binding; the
/// columns and end position are accepted for hosts that send a range.
/// Uses the default configuration and re-reads the file on every call.
pub fn resolve(
    file_path: &Path,
    start_line: u32,
    start_column: u32,
    end_line: u32,
    end_column: u32,
) -> BindOutcome {
    let request = BreakpointRequest::new(
        file_path,
        TextPosition { column: start_column, line: start_line },
        TextPosition { column: end_column, line: end_line },
    );
    return Binder::default().bind(&request);
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;
    use std::path::PathBuf;

    use super::*;
    use crate::types::ResolvedScope;

    const PLAYER: &str = "\
using System;

namespace Game.Actors
{
    public class Player
    {
        private int _health = 100;

        public void TakeDamage(int amount)
        {
            _health -= amount;

            if (_health <= 0)
            {
                Die();
            }
        }

        private void Die() { Console.WriteLine(\"dead\"); }
    }
}
";

    fn write_fixture(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        return path;
    }

    #[test]
    fn resolves_statement_in_method() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "Player.cs", PLAYER);

        let resolved = resolve(&path, 10, 12, 10, 30).unwrap();
        assert_eq!(resolved, ResolvedScope {
            method_name: "TakeDamage".to_string(),
            namespace_name: "Game.Actors".to_string(),
            type_name: "Player".to_string(),
        });
        assert_eq!(resolved.qualified_type_name(), "Game.Actors.Player");
    }

    #[test]
    fn nested_block_and_one_line_method() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "Player.cs", PLAYER);

        assert_eq!(resolve(&path, 14, 0, 14, 0).unwrap().method_name, "TakeDamage");
        assert_eq!(resolve(&path, 18, 0, 18, 0).unwrap().method_name, "Die");
    }

    #[test]
    fn field_using_and_blank_lines_fail_structurally() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "Player.cs", PLAYER);

        assert!(matches!(resolve(&path, 0, 0, 0, 0), Err(BindFailure::NotInsideMethod { .. })));
        assert!(matches!(resolve(&path, 6, 0, 6, 0), Err(BindFailure::NotInsideMethod { .. })));
        assert!(matches!(resolve(&path, 1, 0, 1, 0), Err(BindFailure::NoBindableNode { .. })));
    }

    #[test]
    fn line_past_end_is_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let ten_lines = "class C\n{\n    void M()\n    {\n        int a = 1;\n        int b = 2;\n        int c = 3;\n        int d = 4;\n    }\n}";
        let path = write_fixture(&dir, "Ten.cs", ten_lines);

        let err = resolve(&path, 9999, 0, 9999, 0).unwrap_err();
        assert!(matches!(err, BindFailure::LineOutOfRange { line: 9999, line_count: 10, .. }));
        assert!(!err.is_expected());
    }

    #[test]
    fn missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(&dir.path().join("Gone.cs"), 0, 0, 0, 0).unwrap_err();
        assert_eq!(err.code(), "io_error");
    }

    #[test]
    fn non_csharp_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "notes.txt", "class C { }");
        assert!(matches!(resolve(&path, 0, 0, 0, 0), Err(BindFailure::UnsupportedLanguage { .. })));
    }

    #[test]
    fn repeated_binds_are_identical_with_and_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "Player.cs", PLAYER);
        let request = BreakpointRequest::at_line(&path, 10);

        let uncached = Binder::default();
        let cached = Binder::new(Config::default());
        let first = uncached.bind(&request).unwrap();
        assert_eq!(uncached.bind(&request).unwrap(), first);
        assert_eq!(cached.bind(&request).unwrap(), first);
        assert_eq!(cached.bind(&request).unwrap(), first);
    }

    #[test]
    fn rebind_after_edit_sees_new_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "Player.cs", PLAYER);
        let binder = Binder::new(Config::default());
        let request = BreakpointRequest::at_line(&path, 18);
        assert_eq!(binder.bind(&request).unwrap().method_name, "Die");

        std::fs::write(&path, "class C\n{\n}\n").unwrap();
        binder.invalidate(&path);
        assert!(matches!(binder.bind(&request), Err(BindFailure::LineOutOfRange { .. })));
    }

    #[test]
    fn bind_all_keeps_request_order() {
        let dir = tempfile::tempdir().unwrap();
        let player = write_fixture(&dir, "Player.cs", PLAYER);
        let other = write_fixture(&dir, "Other.cs", "namespace N\n{\n    class Other\n    {\n        void Run()\n        {\n            int x = 0;\n        }\n    }\n}\n");

        let config = Config { workers: NonZeroUsize::new(3).unwrap(), ..Config::default() };
        let binder = Binder::new(config);
        let requests = vec![
            BreakpointRequest::at_line(&player, 10),
            BreakpointRequest::at_line(&other, 6),
            BreakpointRequest::at_line(&player, 6),
            BreakpointRequest::at_line(&other, 4),
        ];

        let outcomes = binder.bind_all(&requests);
        assert_eq!(outcomes.len(), 4);
        let names: Vec<Option<String>> = outcomes
            .iter()
            .map(|o| return o.as_ref().ok().map(ResolvedScope::qualified_method_name))
            .collect();
        assert_eq!(names, vec![
            Some("Game.Actors.Player.TakeDamage".to_string()),
            Some("N.Other.Run".to_string()),
            None,
            Some("N.Other.Run".to_string()),
        ]);
    }

    #[test]
    fn bind_all_with_no_requests() {
        assert!(Binder::default().bind_all(&[]).is_empty());
    }
}
