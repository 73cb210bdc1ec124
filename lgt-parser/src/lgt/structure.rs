//! Structural snapshot
//!
//! [Structure] bundles everything one pass derives from a text snapshot:
//! the token tiling, the frame regions, the boundary list and the anomaly
//! list. It is immutable once built; [Document](crate::lgt::Document)
//! rebuilds it lazily after edits from incrementally maintained tokens.
//!
//! Scope recovery
//!
//! The stack of open frames at a cursor offset is recovered by filtering
//! the recorded regions for the ones active at that offset and ordering
//! them outermost-first (ascending start, descending end). Regions are
//! recorded in push order per clause, but an entity region is only pushed
//! once its opening directive's period is seen, so ordering by span is
//! what restores the nesting.

use std::ops::Range as ByteRange;

use crate::lgt::anomaly::Anomaly;
use crate::lgt::boundary::{track, BoundaryMark};
use crate::lgt::scanner::{literal_anomalies, tokenize};
use crate::lgt::scope::{FrameRegion, ScopeFrame};
use crate::lgt::token::Token;

/// The structural model of one text snapshot.
#[derive(Debug, Clone)]
pub struct Structure {
    len: usize,
    tokens: Vec<(Token, ByteRange<usize>)>,
    regions: Vec<FrameRegion>,
    boundaries: Vec<BoundaryMark>,
    anomalies: Vec<Anomaly>,
}

/// Scan and analyze `text` in one call.
pub fn analyze(text: &str) -> Structure {
    let tokens = tokenize(text);
    Structure::from_tokens(text, tokens)
}

impl Structure {
    /// Build the structural model from an already-scanned token stream.
    pub fn from_tokens(text: &str, tokens: Vec<(Token, ByteRange<usize>)>) -> Self {
        let result = track(text, &tokens);
        let mut anomalies = literal_anomalies(&tokens);
        anomalies.extend(result.anomalies);
        anomalies.sort_by_key(|anomaly| (anomaly.span().start, anomaly.span().end));
        Self {
            len: text.len(),
            tokens,
            regions: result.regions,
            boundaries: result.boundaries,
            anomalies,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn tokens(&self) -> &[(Token, ByteRange<usize>)] {
        &self.tokens
    }

    pub fn regions(&self) -> &[FrameRegion] {
        &self.regions
    }

    pub fn boundaries(&self) -> &[BoundaryMark] {
        &self.boundaries
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// The token whose span contains `offset`, if any.
    pub fn token_at(&self, offset: usize) -> Option<&(Token, ByteRange<usize>)> {
        let idx = self.tokens.partition_point(|(_, span)| span.end <= offset);
        self.tokens.get(idx).filter(|(_, span)| span.start <= offset)
    }

    /// The last significant token ending at or before `offset`.
    pub fn prev_significant(&self, offset: usize) -> Option<&(Token, ByteRange<usize>)> {
        let idx = self.tokens.partition_point(|(_, span)| span.end <= offset);
        self.tokens[..idx]
            .iter()
            .rev()
            .find(|(token, _)| token.is_significant())
    }

    /// The first significant token starting at or after `offset`.
    pub fn next_significant(&self, offset: usize) -> Option<&(Token, ByteRange<usize>)> {
        let idx = self.tokens.partition_point(|(_, span)| span.start < offset);
        self.tokens[idx..]
            .iter()
            .find(|(token, _)| token.is_significant())
    }

    /// Regions active for a cursor at `offset`, outermost first.
    pub fn active_regions(&self, offset: usize) -> Vec<&FrameRegion> {
        let mut active: Vec<&FrameRegion> = self
            .regions
            .iter()
            .filter(|region| region.active_at(offset))
            .collect();
        active.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then(b.span.end.cmp(&a.span.end))
        });
        active
    }

    /// The scope stack for a cursor at `offset`, outermost first.
    pub fn scope_stack_at(&self, offset: usize) -> Vec<&ScopeFrame> {
        self.active_regions(offset)
            .into_iter()
            .map(|region| &region.frame)
            .collect()
    }

    /// Regions whose span contains `offset`, outermost first. Unlike
    /// [active_regions](Self::active_regions) this treats a region's first
    /// byte as inside, which is what span queries want.
    pub fn regions_containing(&self, offset: usize) -> Vec<&FrameRegion> {
        let mut containing: Vec<&FrameRegion> = self
            .regions
            .iter()
            .filter(|region| {
                region.span.start <= offset
                    && (offset < region.span.end || (!region.closed && offset == region.span.end))
            })
            .collect();
        containing.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then(b.span.end.cmp(&a.span.end))
        });
        containing
    }

    /// Whether `offset` sits inside an unterminated literal.
    pub fn in_unterminated_literal(&self, offset: usize) -> bool {
        self.tokens.iter().any(|(token, span)| {
            token.is_unterminated() && span.start < offset && offset <= span.end
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lgt::scope::EntityKind;

    #[test]
    fn test_scope_stack_inside_nested_call() {
        let source = ":- object(o).\n\np(X) :-\n\tq(r(X)).\n\n:- end_object.\n";
        let structure = analyze(source);
        // Cursor just after the X inside r(...)
        let offset = source.find("r(X").unwrap() + 3;
        let stack = structure.scope_stack_at(offset);
        assert!(matches!(
            stack[0],
            ScopeFrame::Entity { kind: EntityKind::Object, .. }
        ));
        assert!(stack[1].is_clause_head());
        assert!(stack[2].is_clause_body());
        assert!(stack[3].is_bracket());
        assert!(stack[4].is_bracket());
        assert_eq!(stack.len(), 5);
    }

    #[test]
    fn test_scope_stack_between_clauses_keeps_entity() {
        let source = ":- object(o).\n\np.\n\nq.\n\n:- end_object.\n";
        let structure = analyze(source);
        let offset = source.find("\n\nq").unwrap() + 1;
        let stack = structure.scope_stack_at(offset);
        assert_eq!(stack.len(), 1);
        assert!(stack[0].is_entity());
    }

    #[test]
    fn test_scope_stack_after_period_is_clean() {
        let source = "p(X) :- q(X).\n";
        let structure = analyze(source);
        let after_period = source.find('.').unwrap() + 1;
        assert!(structure.scope_stack_at(after_period).is_empty());
    }

    #[test]
    fn test_token_at_boundaries() {
        let source = "ab cd";
        let structure = analyze(source);
        assert_eq!(structure.token_at(0).map(|(t, _)| *t), Some(Token::Atom));
        assert_eq!(
            structure.token_at(2).map(|(t, _)| *t),
            Some(Token::Whitespace)
        );
        assert_eq!(structure.token_at(3).map(|(t, _)| *t), Some(Token::Atom));
        assert_eq!(structure.token_at(5), None);
    }

    #[test]
    fn test_anomalies_are_ordered() {
        let source = "p :- 'oops\nq :- r(.\n";
        let structure = analyze(source);
        let starts: Vec<usize> = structure
            .anomalies()
            .iter()
            .map(|a| a.span().start)
            .collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
        assert!(!starts.is_empty());
    }

    #[test]
    fn test_in_unterminated_literal() {
        let source = "p('abc\nq.\n";
        let structure = analyze(source);
        let inside = source.find("abc").unwrap();
        assert!(structure.in_unterminated_literal(inside));
        let next_line = source.find("q.").unwrap() + 1;
        assert!(!structure.in_unterminated_literal(next_line));
    }
}
