//! Include-aware list file walker.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::fs::{identity_key, resolve_against};

use super::Directive;

/// Files already visited during one top-level resolution.
///
/// Keys are file identities (see [`identity_key`]). A path in this set is
/// never parsed again during the same resolution, which is what terminates
/// self- and mutually-referencing include chains.
pub type IncludeContext = HashSet<PathBuf>;

/// Walk `path` depth-first, following `@include` directives.
///
/// Every non-include directive is handed to `sink` together with the trimmed
/// source line, in file order. Missing or unreadable files produce a warning
/// and contribute nothing.
pub(crate) fn walk<F>(path: &Path, visited: &mut IncludeContext, sink: &mut F)
where
    F: FnMut(Directive, &str),
{
    if !visited.insert(identity_key(path)) {
        tracing::debug!(path = %path.display(), "already visited, skipping");
        return;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "list file not found");
            return;
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read list file");
            return;
        }
    };

    let base = path.parent().unwrap_or_else(|| Path::new("."));

    for line in content.lines() {
        match Directive::parse(line) {
            None => {}
            Some(Directive::Include(target)) => {
                let resolved = resolve_against(base, Path::new(&target));
                if visited.contains(&identity_key(&resolved)) {
                    tracing::debug!(
                        from = %path.display(),
                        include = %resolved.display(),
                        "skipping repeated include"
                    );
                    continue;
                }
                walk(&resolved, visited, sink);
            }
            Some(directive) => sink(directive, line.trim()),
        }
    }
}

/// Load a list file, expanding includes.
///
/// Returns the trimmed non-blank, non-comment, non-include lines in
/// depth-first order. Duplicates are kept; callers dedupe.
pub fn load(path: &Path, visited: &mut IncludeContext) -> Vec<String> {
    let mut out = Vec::new();
    walk(path, visited, &mut |_, line| out.push(line.to_string()));
    out
}

/// Load a list file with a fresh include context.
pub fn load_list(path: &Path) -> Vec<String> {
    let mut visited = IncludeContext::new();
    load(path, &mut visited)
}
