//! Structural selection expansion
//!
//! Grow-selection repeatedly widens the current selection to the next
//! enclosing structure: token, compound term, enclosing call, clause,
//! entity, whole document. Shrinking walks the same ladder back down,
//! which editors implement by remembering the previous selection; the
//! function here recomputes it for hosts without that memory.

use std::ops::Range as ByteRange;

use lgt_parser::lgt::{enclosing_ranges_in, Structure};

/// The next wider selection around `selection`, if any.
///
/// A collapsed selection (cursor) expands to the token under it first. When
/// the selection already covers the whole buffer there is nothing wider and
/// the result is `None`.
pub fn expand_selection(
    structure: &Structure,
    text: &str,
    selection: &ByteRange<usize>,
) -> Option<ByteRange<usize>> {
    let ladder = enclosing_ranges_in(structure, text, selection.start);
    ladder
        .into_iter()
        .find(|range| contains(range, selection) && *range != *selection)
}

/// The widest ladder step strictly inside `selection`, if any.
pub fn shrink_selection(
    structure: &Structure,
    text: &str,
    selection: &ByteRange<usize>,
) -> Option<ByteRange<usize>> {
    let ladder = enclosing_ranges_in(structure, text, selection.start);
    ladder
        .into_iter()
        .rev()
        .find(|range| contains(selection, range) && *range != *selection)
}

fn contains(outer: &ByteRange<usize>, inner: &ByteRange<usize>) -> bool {
    outer.start <= inner.start && outer.end >= inner.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgt_parser::lgt::analyze;

    #[test]
    fn test_expand_from_cursor() {
        let source = "p(X) :- q(r(X)).\n";
        let structure = analyze(source);
        let cursor = source.find("r(").unwrap();
        let first = expand_selection(&structure, source, &(cursor..cursor)).unwrap();
        assert_eq!(&source[first.clone()], "r");
        let second = expand_selection(&structure, source, &first).unwrap();
        assert_eq!(&source[second.clone()], "r(X)");
        let third = expand_selection(&structure, source, &second).unwrap();
        assert_eq!(&source[third.clone()], "q(r(X))");
    }

    #[test]
    fn test_expand_stops_at_buffer() {
        let source = "p.\n";
        let structure = analyze(source);
        let whole = 0..source.len();
        assert_eq!(expand_selection(&structure, source, &whole), None);
    }

    #[test]
    fn test_expansion_is_monotone() {
        let source = ":- object(o).\n\np(X) :- q(X).\n\n:- end_object.\n";
        let structure = analyze(source);
        let cursor = source.find("q(X)").unwrap();
        let mut selection = cursor..cursor;
        while let Some(next) = expand_selection(&structure, source, &selection) {
            assert!(next.start <= selection.start && next.end >= selection.end);
            assert_ne!(next, selection);
            selection = next;
        }
        assert_eq!(selection, 0..source.len());
    }

    #[test]
    fn test_shrink_undoes_expand() {
        let source = "p(X) :- q(r(X)).\n";
        let structure = analyze(source);
        let cursor = source.find('r').unwrap();
        let token = expand_selection(&structure, source, &(cursor..cursor)).unwrap();
        let term = expand_selection(&structure, source, &token).unwrap();
        let back = shrink_selection(&structure, source, &term).unwrap();
        assert_eq!(back, token);
    }
}
