//! Editable documents
//!
//! [Document] owns one text buffer and keeps its token stream current
//! across edits through the incremental scanner; the heavier structural
//! snapshot is rebuilt lazily, only when a query actually needs it.
//! [DocumentStore] holds the open documents of a host session keyed by
//! URI or path.
//!
//! Edits are byte-based splices. Offsets that fall outside the buffer or
//! inside a UTF-8 sequence are rejected up front so the splice can never
//! corrupt the text.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range as ByteRange;

use tracing::debug;

use crate::lgt::indent::{indent_in, IndentDecision, IndentStyle};
use crate::lgt::scanner::{rescan, tokenize};
use crate::lgt::spans::enclosing_ranges_in;
use crate::lgt::structure::Structure;
use crate::lgt::token::Token;

/// One text splice: at `offset`, remove `removed_len` bytes, insert
/// `inserted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDelta {
    pub offset: usize,
    pub removed_len: usize,
    pub inserted: String,
}

impl EditDelta {
    pub fn new(offset: usize, removed_len: usize, inserted: String) -> Self {
        Self {
            offset,
            removed_len,
            inserted,
        }
    }

    /// Pure insertion.
    pub fn insert(offset: usize, inserted: String) -> Self {
        Self::new(offset, 0, inserted)
    }

    /// Pure deletion.
    pub fn delete(offset: usize, removed_len: usize) -> Self {
        Self::new(offset, removed_len, String::new())
    }
}

/// Rejected edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The edit reaches past the end of the buffer.
    OutOfBounds { offset: usize, len: usize },
    /// An edit boundary splits a UTF-8 sequence.
    NotCharBoundary { offset: usize },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::OutOfBounds { offset, len } => {
                write!(f, "edit at {} out of bounds (buffer is {} bytes)", offset, len)
            }
            EditError::NotCharBoundary { offset } => {
                write!(f, "edit boundary at {} splits a character", offset)
            }
        }
    }
}

impl std::error::Error for EditError {}

/// A text buffer with incrementally maintained tokens and a lazily rebuilt
/// structural snapshot.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    version: u64,
    tokens: Vec<(Token, ByteRange<usize>)>,
    structure: Option<Structure>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let tokens = tokenize(&text);
        Self {
            text,
            version: 0,
            tokens,
            structure: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn tokens(&self) -> &[(Token, ByteRange<usize>)] {
        &self.tokens
    }

    /// Apply one edit, splicing the text and re-synchronizing tokens.
    pub fn apply_edit(&mut self, edit: &EditDelta) -> Result<(), EditError> {
        let end = edit
            .offset
            .checked_add(edit.removed_len)
            .filter(|&end| end <= self.text.len())
            .ok_or(EditError::OutOfBounds {
                offset: edit.offset,
                len: self.text.len(),
            })?;
        if !self.text.is_char_boundary(edit.offset) {
            return Err(EditError::NotCharBoundary { offset: edit.offset });
        }
        if !self.text.is_char_boundary(end) {
            return Err(EditError::NotCharBoundary { offset: end });
        }

        self.text.replace_range(edit.offset..end, &edit.inserted);
        self.tokens = rescan(&self.text, edit, &self.tokens);
        self.version += 1;
        self.structure = None;
        debug!(
            version = self.version,
            offset = edit.offset,
            removed = edit.removed_len,
            inserted = edit.inserted.len(),
            "edit applied"
        );
        Ok(())
    }

    /// The structural snapshot of the current text, built on first use.
    pub fn structure(&mut self) -> &Structure {
        let text = &self.text;
        let tokens = &self.tokens;
        self.structure
            .get_or_insert_with(|| Structure::from_tokens(text, tokens.clone()))
    }

    /// Indentation proposal for the line starting at `offset`.
    pub fn indent_for(&mut self, offset: usize, style: IndentStyle) -> IndentDecision {
        let text = &self.text;
        let tokens = &self.tokens;
        let structure = self
            .structure
            .get_or_insert_with(|| Structure::from_tokens(text, tokens.clone()));
        indent_in(structure, text, offset, style)
    }

    /// Enclosing spans around `offset`, innermost first.
    pub fn enclosing_ranges(&mut self, offset: usize) -> Vec<ByteRange<usize>> {
        let text = &self.text;
        let tokens = &self.tokens;
        let structure = self
            .structure
            .get_or_insert_with(|| Structure::from_tokens(text, tokens.clone()));
        enclosing_ranges_in(structure, text, offset)
    }
}

/// The open documents of one host session.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open (or replace) a document under `key`.
    pub fn open(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(key.into(), Document::new(text));
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.documents.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Document> {
        self.documents.get_mut(key)
    }

    /// Apply an edit to an open document. Unknown keys are ignored with a
    /// trace, matching how hosts deliver late edits for closed files.
    pub fn edit(&mut self, key: &str, edit: &EditDelta) -> Result<(), EditError> {
        match self.documents.get_mut(key) {
            Some(document) => document.apply_edit(edit),
            None => {
                debug!(key, "edit for unknown document dropped");
                Ok(())
            }
        }
    }

    pub fn close(&mut self, key: &str) -> Option<Document> {
        self.documents.remove(key)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lgt::scanner::tokenize;

    #[test]
    fn test_edit_keeps_tokens_in_sync() {
        let mut document = Document::new("foo(X) :- bar(X).\n");
        document
            .apply_edit(&EditDelta::insert(4, "Y, ".to_string()))
            .unwrap();
        assert_eq!(document.text(), "foo(Y, X) :- bar(X).\n");
        assert_eq!(document.tokens(), &tokenize(document.text())[..]);
        assert_eq!(document.version(), 1);
    }

    #[test]
    fn test_edit_out_of_bounds() {
        let mut document = Document::new("p.\n");
        let err = document
            .apply_edit(&EditDelta::delete(2, 5))
            .unwrap_err();
        assert!(matches!(err, EditError::OutOfBounds { .. }));
        // The document is untouched
        assert_eq!(document.text(), "p.\n");
        assert_eq!(document.version(), 0);
    }

    #[test]
    fn test_edit_inside_char() {
        let mut document = Document::new("p('é').\n");
        let inside = document.text().find('é').unwrap() + 1;
        let err = document
            .apply_edit(&EditDelta::insert(inside, "x".to_string()))
            .unwrap_err();
        assert!(matches!(err, EditError::NotCharBoundary { .. }));
    }

    #[test]
    fn test_structure_rebuilds_after_edit() {
        let mut document = Document::new("p(X)\n");
        assert!(document.structure().boundaries().iter().all(|mark| {
            mark.boundary != crate::lgt::boundary::Boundary::ClauseEnd
        }));
        let end = document.text().find('\n').unwrap();
        document
            .apply_edit(&EditDelta::insert(end, " :- q(X).".to_string()))
            .unwrap();
        assert!(document.structure().boundaries().iter().any(|mark| {
            mark.boundary == crate::lgt::boundary::Boundary::ClauseEnd
        }));
    }

    #[test]
    fn test_store_round_trip() {
        let mut store = DocumentStore::new();
        store.open("file:///a.lgt", "p.\n");
        assert_eq!(store.len(), 1);
        store
            .edit("file:///a.lgt", &EditDelta::insert(0, "% note\n".to_string()))
            .unwrap();
        assert_eq!(store.get("file:///a.lgt").unwrap().text(), "% note\np.\n");
        // Edits for unknown documents are dropped, not errors
        store
            .edit("file:///missing.lgt", &EditDelta::insert(0, "x".to_string()))
            .unwrap();
        assert!(store.close("file:///a.lgt").is_some());
        assert!(store.is_empty());
    }
}
