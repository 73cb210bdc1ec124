//! File references in directives
//!
//! `:- include('part.lgt').` and `:- logtalk_load(utils).` embed file
//! paths in source text. Renaming a file must rewrite them, so this
//! module scans a workspace for directives referring to a given file and
//! produces the text edits a rename requires.
//!
//! Path arguments are resolved against the directory of the referencing
//! file; a bare atom gets the `.lgt` extension. Only the first argument
//! of a directive is scanned: the options list of `logtalk_load/2` never
//! names files.

use std::ops::Range as ByteRange;
use std::path::{Path, PathBuf};
use std::{fs, io};

use ignore::WalkBuilder;
use tracing::debug;

use lgt_parser::lgt::{analyze, ScopeFrame, Structure, Token};

const LOADING_DIRECTIVES: &[&str] = &["include", "logtalk_load"];

/// One file-naming argument found in a loading directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeReference {
    /// The file containing the directive.
    pub file: PathBuf,
    /// Span of the path argument token within that file.
    pub span: ByteRange<usize>,
    /// The argument as written, quotes stripped.
    pub raw: String,
    /// The path it resolves to.
    pub target: PathBuf,
}

/// A text replacement in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEdit {
    pub file: PathBuf,
    pub span: ByteRange<usize>,
    pub new_text: String,
}

/// Scan one file's text for loading-directive references.
pub fn scan_text(file: &Path, text: &str) -> Vec<IncludeReference> {
    let structure = analyze(text);
    let base = file.parent().unwrap_or_else(|| Path::new("."));
    let mut references = Vec::new();

    for region in structure.regions() {
        if !matches!(region.frame, ScopeFrame::ClauseHead { directive: true, .. }) {
            continue;
        }
        let Some((goal_span, args)) = directive_call(&structure, &region.span) else {
            continue;
        };
        if !LOADING_DIRECTIVES.contains(&&text[goal_span]) {
            continue;
        }
        for span in args {
            let raw = unquote(&text[span.clone()]);
            let target = resolve(base, &raw);
            references.push(IncludeReference {
                file: file.to_path_buf(),
                span,
                raw,
                target,
            });
        }
    }
    references
}

/// All references across `root` that resolve to `target`.
pub fn find_include_references(
    root: &Path,
    target: &Path,
) -> io::Result<Vec<IncludeReference>> {
    let target = normalize(target);
    let mut references = Vec::new();
    for entry in WalkBuilder::new(root).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(%err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.extension().map_or(false, |ext| ext == "lgt") {
            continue;
        }
        let text = fs::read_to_string(path)?;
        references.extend(
            scan_text(path, &text)
                .into_iter()
                .filter(|reference| normalize(&reference.target) == target),
        );
    }
    references.sort_by(|a, b| a.file.cmp(&b.file).then(a.span.start.cmp(&b.span.start)));
    Ok(references)
}

/// The edits that keep references valid when `old` is renamed to `new`.
pub fn rename_edits(root: &Path, old: &Path, new: &Path) -> io::Result<Vec<FileEdit>> {
    let references = find_include_references(root, old)?;
    Ok(references
        .into_iter()
        .map(|reference| {
            let base = reference.file.parent().unwrap_or_else(|| Path::new("."));
            let relative =
                pathdiff::diff_paths(new, base).unwrap_or_else(|| new.to_path_buf());
            FileEdit {
                file: reference.file,
                span: reference.span,
                new_text: format!("'{}'", relative.display()),
            }
        })
        .collect())
}

/// The goal atom span and first-argument path spans of a directive clause.
fn directive_call(
    structure: &Structure,
    clause: &ByteRange<usize>,
) -> Option<(ByteRange<usize>, Vec<ByteRange<usize>>)> {
    let tokens: Vec<(Token, ByteRange<usize>)> = structure
        .tokens()
        .iter()
        .filter(|(token, span)| {
            token.is_significant() && span.start >= clause.start && span.end <= clause.end
        })
        .map(|(token, span)| (*token, span.clone()))
        .collect();

    // Expected shape: `:-` goal `(` first-arg ...
    let mut iter = tokens.iter();
    let (neck, _) = iter.next()?;
    if *neck != Token::Neck {
        return None;
    }
    let (goal, goal_span) = iter.next()?;
    if !goal.is_name() {
        return None;
    }
    let (open, open_span) = iter.next()?;
    if *open != Token::OpenParen || open_span.start != goal_span.end {
        return None;
    }

    let mut args = Vec::new();
    let mut depth = 0usize;
    for (token, span) in iter {
        match token {
            _ if token.opens().is_some() => depth += 1,
            _ if token.closes().is_some() => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            Token::Comma if depth == 0 => break,
            Token::Atom | Token::QuotedAtom => args.push(span.clone()),
            _ => {}
        }
    }
    Some((goal_span.clone(), args))
}

fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .unwrap_or(raw);
    inner.replace("''", "'").replace("\\'", "'")
}

fn resolve(base: &Path, raw: &str) -> PathBuf {
    let mut path = base.join(raw);
    if path.extension().is_none() {
        path.set_extension("lgt");
    }
    path
}

/// Collapse `.` and `..` components without touching the filesystem, so
/// references to files that do not exist yet still compare.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
