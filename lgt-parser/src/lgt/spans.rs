//! Enclosing-span queries
//!
//! [enclosing_ranges] answers "what surrounds this offset", innermost
//! first: token, compound term, enclosing brackets, clause, entity,
//! whole document. Hosts drive selection expansion with it by walking
//! the list outward one step at a time.
//!
//! The list is strictly widening: every range contains the previous one
//! and is strictly larger, and the final entry is always the full buffer.

use std::ops::Range as ByteRange;

use crate::lgt::scope::ScopeFrame;
use crate::lgt::structure::{analyze, Structure};
use crate::lgt::token::{Delimiter, Token};

/// Enclosing byte ranges around `offset`, innermost first, ending with the
/// whole buffer.
pub fn enclosing_ranges(text: &str, offset: usize) -> Vec<ByteRange<usize>> {
    enclosing_ranges_in(&analyze(text), text, offset)
}

/// [enclosing_ranges] against an existing structural snapshot.
pub fn enclosing_ranges_in(
    structure: &Structure,
    text: &str,
    offset: usize,
) -> Vec<ByteRange<usize>> {
    let offset = offset.min(text.len());
    let mut candidates: Vec<ByteRange<usize>> = Vec::new();

    if let Some((token, span)) = structure.token_at(offset) {
        if token.is_significant() || token.is_comment() {
            candidates.push(span.clone());
            if token.is_name() {
                if let Some(extended) = compound_span(structure, span) {
                    candidates.push(extended);
                }
            }
        }
    }

    // Innermost scope first; clause bodies are skipped as a step so the walk
    // goes call, clause, entity without an intermediate stop at the neck.
    for region in structure.regions_containing(offset).into_iter().rev() {
        match &region.frame {
            ScopeFrame::Bracket { functor_start, .. } => {
                let start = functor_start.unwrap_or(region.span.start);
                candidates.push(start..region.span.end);
            }
            ScopeFrame::IfThenElse { .. } => candidates.push(region.span.clone()),
            ScopeFrame::ClauseHead { .. } => candidates.push(region.span.clone()),
            ScopeFrame::Entity { .. } => candidates.push(region.span.clone()),
            ScopeFrame::ClauseBody { .. } => {}
        }
    }

    candidates.push(0..text.len());

    // Enforce strict widening; candidates that do not contain their
    // predecessor (or do not grow it) are dropped.
    let mut ranges: Vec<ByteRange<usize>> = Vec::new();
    for candidate in candidates {
        match ranges.last() {
            None => ranges.push(candidate),
            Some(last) => {
                if candidate.start <= last.start
                    && candidate.end >= last.end
                    && candidate != *last
                {
                    ranges.push(candidate);
                }
            }
        }
    }
    ranges
}

/// Extend a functor atom to its whole compound term, when the next token is
/// an immediately adjacent `(` with a recorded bracket region.
fn compound_span(
    structure: &Structure,
    atom_span: &ByteRange<usize>,
) -> Option<ByteRange<usize>> {
    let (next, next_span) = structure.next_significant(atom_span.end)?;
    if *next != Token::OpenParen || next_span.start != atom_span.end {
        return None;
    }
    structure
        .regions()
        .iter()
        .find(|region| {
            region.span.start == next_span.start
                && matches!(
                    region.frame,
                    ScopeFrame::Bracket {
                        delimiter: Delimiter::Paren,
                        ..
                    }
                )
        })
        .map(|region| atom_span.start..region.span.end)
}
