//! Clause/term boundary tracker
//!
//! A single left-to-right pass over the token stream. The pass maintains
//! a stack of open scope frames and records every frame as a region with
//! its covered byte span, plus the ordered boundary list for the whole
//! document and any soft anomalies it tolerated along the way.
//!
//! The tracker must stay usable on transiently invalid text: mismatched
//! closers close the innermost compatible bracket if one exists and are
//! otherwise ignored; frames still open at end-of-buffer are finalized
//! unclosed. Nothing here raises.
//!
//! Period disambiguation
//!
//! A `.` token is a clause terminator only when the next token is layout,
//! a comment, or end-of-buffer. Decimal points and symbolic operators
//! like `=..` never surface as Period tokens in the first place (see the
//! scanner), so this check is a one-token lookahead, not a parse.

use serde::Serialize;
use std::ops::Range as ByteRange;
use tracing::debug;

use crate::lgt::anomaly::Anomaly;
use crate::lgt::scope::{CondBranch, EntityKind, FrameRegion, ScopeFrame, ENTITY_DIRECTIVES};
use crate::lgt::token::{Delimiter, Token};

/// A classified document position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Boundary {
    ClauseStart,
    ClauseEnd,
    DirectiveStart,
    EntityOpen,
    EntityClose,
}

/// A boundary with the span of the text that triggered it.
///
/// Clause starts carry the first token, clause ends the period, directive
/// starts the `:-`, and entity open/close the whole directive clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundaryMark {
    pub boundary: Boundary,
    pub span: ByteRange<usize>,
}

/// Everything the boundary pass derives from one token stream.
#[derive(Debug, Clone, Default)]
pub struct TrackResult {
    pub regions: Vec<FrameRegion>,
    pub boundaries: Vec<BoundaryMark>,
    pub anomalies: Vec<Anomaly>,
}

/// Run the boundary pass.
pub fn track(text: &str, tokens: &[(Token, ByteRange<usize>)]) -> TrackResult {
    Tracker::new(text, tokens).run()
}

/// Per-clause state while the clause is open.
struct ClauseState {
    head_region: usize,
    start: usize,
    head_line_start: usize,
    directive: bool,
    has_body: bool,
    /// First significant tokens after a directive's `:-`, for entity
    /// open/close classification (three are enough: goal atom, `(`, name).
    directive_sig: Vec<(Token, ByteRange<usize>)>,
}

struct Tracker<'a> {
    text: &'a str,
    tokens: &'a [(Token, ByteRange<usize>)],
    regions: Vec<FrameRegion>,
    open: Vec<usize>,
    boundaries: Vec<BoundaryMark>,
    anomalies: Vec<Anomaly>,
    line_start: usize,
    clause: Option<ClauseState>,
    prev_sig: Option<(Token, ByteRange<usize>)>,
}

impl<'a> Tracker<'a> {
    fn new(text: &'a str, tokens: &'a [(Token, ByteRange<usize>)]) -> Self {
        Self {
            text,
            tokens,
            regions: Vec::new(),
            open: Vec::new(),
            boundaries: Vec::new(),
            anomalies: Vec::new(),
            line_start: 0,
            clause: None,
            prev_sig: None,
        }
    }

    fn push(&mut self, frame: ScopeFrame, start: usize) -> usize {
        let idx = self.regions.len();
        self.regions.push(FrameRegion {
            frame,
            span: start..self.text.len(),
            closed: false,
        });
        self.open.push(idx);
        idx
    }

    fn pop(&mut self, end: usize) -> Option<usize> {
        let idx = self.open.pop()?;
        self.regions[idx].span.end = end;
        self.regions[idx].closed = true;
        Some(idx)
    }

    fn top(&self) -> Option<&ScopeFrame> {
        self.open.last().map(|&idx| &self.regions[idx].frame)
    }

    /// Number of bracket frames open inside the current clause.
    fn bracket_depth(&self) -> usize {
        self.open
            .iter()
            .rev()
            .take_while(|&&idx| {
                matches!(
                    self.regions[idx].frame,
                    ScopeFrame::Bracket { .. } | ScopeFrame::IfThenElse { .. }
                )
            })
            .filter(|&&idx| self.regions[idx].frame.is_bracket())
            .count()
    }

    fn run(mut self) -> TrackResult {
        let mut i = 0;
        while i < self.tokens.len() {
            let (token, span) = &self.tokens[i];
            let span = span.clone();

            if *token == Token::Newline {
                self.line_start = span.end;
                i += 1;
                continue;
            }
            if !token.is_significant() {
                i += 1;
                continue;
            }

            if self.clause.is_none() {
                self.begin_clause(*token, &span);
                if *token == Token::Neck {
                    // The directive's neck is consumed by begin_clause
                    self.prev_sig = Some((*token, span));
                    i += 1;
                    continue;
                }
            }

            if self.is_clause_end(i) {
                self.end_clause(&span);
                self.prev_sig = Some((*token, span));
                i += 1;
                continue;
            }

            if let Some(state) = self.clause.as_mut() {
                if state.directive && state.directive_sig.len() < 3 {
                    state.directive_sig.push((*token, span.clone()));
                }
            }

            if let Some(delimiter) = token.opens() {
                self.open_bracket(delimiter, &span);
            } else if let Some(delimiter) = token.closes() {
                self.close_bracket(delimiter, &span);
            } else if token.is_neck() && self.bracket_depth() == 0 {
                self.begin_body(*token, &span);
            } else if matches!(token, Token::IfThen | Token::SoftCutThen) {
                self.condition_branch(CondBranch::Then, &span);
            } else if *token == Token::Semicolon {
                self.condition_branch(CondBranch::Else, &span);
            } else {
                self.note_goal_token(&span);
            }

            self.prev_sig = Some((*token, span));
            i += 1;
        }

        self.finish()
    }

    /// Start a new clause (or directive) at its first significant token.
    fn begin_clause(&mut self, token: Token, span: &ByteRange<usize>) {
        let directive = token == Token::Neck;
        let boundary = if directive {
            Boundary::DirectiveStart
        } else {
            Boundary::ClauseStart
        };
        self.boundaries.push(BoundaryMark {
            boundary,
            span: span.clone(),
        });

        let head_region = self.push(
            ScopeFrame::ClauseHead {
                directive,
                line_start: self.line_start,
            },
            span.start,
        );
        if directive {
            // The directive goal is the clause body
            self.push(
                ScopeFrame::ClauseBody {
                    dcg: false,
                    head_line_start: self.line_start,
                    first_goal: None,
                },
                span.start,
            );
        }
        self.clause = Some(ClauseState {
            head_region,
            start: span.start,
            head_line_start: self.line_start,
            directive,
            has_body: directive,
            directive_sig: Vec::new(),
        });
    }

    /// Clause terminator: a period whose next token is layout, a comment, or
    /// end-of-buffer. Open brackets do not suppress the terminator; ending
    /// the clause (with anomalies) recovers better than swallowing the rest
    /// of the buffer while a closer is missing.
    fn is_clause_end(&self, i: usize) -> bool {
        if self.tokens[i].0 != Token::Period {
            return false;
        }
        match self.tokens.get(i + 1) {
            None => true,
            Some((next, _)) => next.is_layout() || next.is_comment(),
        }
    }

    fn open_bracket(&mut self, delimiter: Delimiter, span: &ByteRange<usize>) {
        let functor_start = match &self.prev_sig {
            Some((prev, prev_span)) if prev.is_name() && prev_span.end == span.start => {
                Some(prev_span.start)
            }
            _ => None,
        };
        self.push(
            ScopeFrame::Bracket {
                delimiter,
                open_offset: span.start,
                line_start: self.line_start,
                functor_start,
            },
            span.start,
        );
    }

    fn close_bracket(&mut self, delimiter: Delimiter, span: &ByteRange<usize>) {
        // Alignment scopes end with their bracket
        while matches!(self.top(), Some(ScopeFrame::IfThenElse { .. })) {
            self.pop(span.start);
        }

        if let Some(ScopeFrame::Bracket { delimiter: open, .. }) = self.top() {
            if *open == delimiter {
                self.pop(span.end);
                return;
            }
        }

        debug!(offset = span.start, closer = %delimiter.closer(), "unmatched closer");
        self.anomalies.push(Anomaly::UnmatchedBracket {
            span: span.clone(),
            delimiter,
            orphan_closer: true,
        });

        // Close the innermost compatible bracket if one is open in this
        // clause, discarding anything stacked above it; otherwise ignore.
        let compatible = self
            .open
            .iter()
            .rev()
            .take_while(|&&idx| {
                matches!(
                    self.regions[idx].frame,
                    ScopeFrame::Bracket { .. } | ScopeFrame::IfThenElse { .. }
                )
            })
            .find(|&&idx| {
                matches!(
                    self.regions[idx].frame,
                    ScopeFrame::Bracket { delimiter: d, .. } if d == delimiter
                )
            })
            .copied();
        if let Some(target) = compatible {
            while let Some(&top_idx) = self.open.last() {
                if top_idx == target {
                    self.pop(span.end);
                    break;
                }
                if let ScopeFrame::Bracket {
                    delimiter: d,
                    open_offset,
                    ..
                } = self.regions[top_idx].frame
                {
                    self.anomalies.push(Anomaly::UnmatchedBracket {
                        span: open_offset..open_offset + 1,
                        delimiter: d,
                        orphan_closer: false,
                    });
                }
                self.pop(span.start);
            }
        }
    }

    /// `:-` / `-->` after a head: the clause has a body from here on.
    fn begin_body(&mut self, token: Token, span: &ByteRange<usize>) {
        let state = match self.clause.as_mut() {
            Some(state) if !state.has_body => state,
            // A second neck in the same clause is just an ordinary token
            _ => return,
        };
        state.has_body = true;
        let head_line_start = state.head_line_start;
        self.push(
            ScopeFrame::ClauseBody {
                dcg: token == Token::DcgNeck,
                head_line_start,
                first_goal: None,
            },
            span.start,
        );
    }

    /// `->`, `*->` or `;` rotate or open an alignment scope inside parens.
    fn condition_branch(&mut self, branch: CondBranch, span: &ByteRange<usize>) {
        let (align_offset, line_start) = match self.top() {
            Some(ScopeFrame::IfThenElse {
                align_offset,
                line_start,
                ..
            }) => {
                let (a, l) = (*align_offset, *line_start);
                self.pop(span.start);
                (a, l)
            }
            Some(ScopeFrame::Bracket {
                delimiter: Delimiter::Paren,
                open_offset,
                line_start,
                ..
            }) => (*open_offset, *line_start),
            _ => return,
        };
        self.push(
            ScopeFrame::IfThenElse {
                branch,
                align_offset,
                line_start,
            },
            span.start,
        );
    }

    /// Record the first goal token of an open body for indentation.
    fn note_goal_token(&mut self, span: &ByteRange<usize>) {
        if let Some(&top_idx) = self.open.last() {
            if let ScopeFrame::ClauseBody {
                first_goal: first_goal @ None,
                ..
            } = &mut self.regions[top_idx].frame
            {
                *first_goal = Some(span.start);
            }
        }
    }

    /// Terminating period: pop the clause, then apply entity bookkeeping.
    fn end_clause(&mut self, span: &ByteRange<usize>) {
        self.boundaries.push(BoundaryMark {
            boundary: Boundary::ClauseEnd,
            span: span.clone(),
        });

        let Some(state) = self.clause.take() else {
            return;
        };

        while let Some(&top_idx) = self.open.last() {
            if top_idx == state.head_region {
                break;
            }
            if let ScopeFrame::Bracket {
                delimiter,
                open_offset,
                ..
            } = self.regions[top_idx].frame
            {
                debug!(offset = open_offset, "bracket left open at clause end");
                self.anomalies.push(Anomaly::UnmatchedBracket {
                    span: open_offset..open_offset + 1,
                    delimiter,
                    orphan_closer: false,
                });
            }
            self.pop(span.end);
        }
        self.pop(span.end);

        if state.directive {
            self.classify_directive(&state, span);
        }
    }

    /// Entity open/close recognition by directive argument pattern.
    fn classify_directive(&mut self, state: &ClauseState, period: &ByteRange<usize>) {
        let directive_span = state.start..period.end;
        let sig = &state.directive_sig;

        let Some((Token::Atom, goal_span)) = sig.first() else {
            return;
        };
        let Some(&(kind, is_end)) = ENTITY_DIRECTIVES.get(&self.text[goal_span.clone()]) else {
            return;
        };

        if !is_end {
            // `:- object(Name, ...)`: the argument pattern is required
            if !matches!(sig.get(1), Some((Token::OpenParen, _))) {
                return;
            }
            let name = sig.get(2).and_then(|(token, name_span)| {
                matches!(token, Token::Atom | Token::QuotedAtom | Token::Variable)
                    .then(|| self.text[name_span.clone()].to_string())
            });
            self.boundaries.push(BoundaryMark {
                boundary: Boundary::EntityOpen,
                span: directive_span,
            });
            self.push(
                ScopeFrame::Entity {
                    kind,
                    name,
                    line_start: state.head_line_start,
                },
                state.start,
            );
            return;
        }

        // `:- end_object.` takes no arguments
        if sig.len() != 1 {
            return;
        }
        match self.top() {
            Some(ScopeFrame::Entity { kind: open_kind, .. }) if *open_kind == kind => {
                self.pop(period.end);
                self.boundaries.push(BoundaryMark {
                    boundary: Boundary::EntityClose,
                    span: directive_span,
                });
            }
            _ => {
                debug!(offset = state.start, "entity close without matching open");
                self.anomalies.push(Anomaly::UnmatchedEntityDirective {
                    span: directive_span,
                });
            }
        }
    }

    /// Finalize frames still open at end-of-buffer.
    fn finish(mut self) -> TrackResult {
        while let Some(&top_idx) = self.open.last() {
            match &self.regions[top_idx].frame {
                ScopeFrame::Bracket {
                    delimiter,
                    open_offset,
                    ..
                } => {
                    self.anomalies.push(Anomaly::UnmatchedBracket {
                        span: *open_offset..*open_offset + 1,
                        delimiter: *delimiter,
                        orphan_closer: false,
                    });
                }
                ScopeFrame::Entity { .. } => {
                    let start = self.regions[top_idx].span.start;
                    let span = self
                        .boundaries
                        .iter()
                        .find(|mark| {
                            mark.boundary == Boundary::EntityOpen && mark.span.start == start
                        })
                        .map(|mark| mark.span.clone())
                        .unwrap_or(start..start + 1);
                    self.anomalies.push(Anomaly::UnmatchedEntityDirective { span });
                }
                _ => {}
            }
            // Leave the region marked unclosed; its span already reaches
            // end-of-buffer.
            self.open.pop();
        }

        TrackResult {
            regions: self.regions,
            boundaries: self.boundaries,
            anomalies: self.anomalies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lgt::scanner::tokenize;

    fn track_source(source: &str) -> TrackResult {
        track(source, &tokenize(source))
    }

    fn boundary_kinds(result: &TrackResult) -> Vec<Boundary> {
        result.boundaries.iter().map(|mark| mark.boundary).collect()
    }

    #[test]
    fn test_fact_has_no_body_frame() {
        let result = track_source("fact_test(100000).\n");
        assert_eq!(
            boundary_kinds(&result),
            vec![Boundary::ClauseStart, Boundary::ClauseEnd]
        );
        assert!(result.regions.iter().any(|r| r.frame.is_clause_head()));
        assert!(!result.regions.iter().any(|r| r.frame.is_clause_body()));
    }

    #[test]
    fn test_rule_has_body_frame() {
        let result = track_source("simple_test(X) :- X > 100000.\n");
        assert!(result.regions.iter().any(|r| r.frame.is_clause_body()));
    }

    #[test]
    fn test_dcg_neck_opens_body() {
        let result = track_source("greeting --> [hello], [world].\n");
        assert!(result
            .regions
            .iter()
            .any(|r| matches!(r.frame, ScopeFrame::ClauseBody { dcg: true, .. })));
    }

    #[test]
    fn test_entity_open_close() {
        let source = ":- object(list).\n\nlen([], 0).\n\n:- end_object.\n";
        let result = track_source(source);
        assert_eq!(
            boundary_kinds(&result),
            vec![
                Boundary::DirectiveStart,
                Boundary::ClauseEnd,
                Boundary::EntityOpen,
                Boundary::ClauseStart,
                Boundary::ClauseEnd,
                Boundary::DirectiveStart,
                Boundary::ClauseEnd,
                Boundary::EntityClose,
            ]
        );
        let entity = result
            .regions
            .iter()
            .find(|r| r.frame.is_entity())
            .expect("entity region");
        assert!(entity.closed);
        assert_eq!(entity.span.start, 0);
        assert_eq!(entity.span.end, source.rfind('.').unwrap() + 1);
        assert!(matches!(
            &entity.frame,
            ScopeFrame::Entity { kind: EntityKind::Object, name: Some(n), .. } if n == "list"
        ));
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_object_atom_elsewhere_is_not_an_entity() {
        // `object` as a plain goal argument must not open an entity
        let result = track_source("p(X) :- q(object, X).\n");
        assert!(!result.regions.iter().any(|r| r.frame.is_entity()));
        // And an entity directive without the argument pattern is ignored too
        let result = track_source(":- object.\n");
        assert!(!result.regions.iter().any(|r| r.frame.is_entity()));
    }

    #[test]
    fn test_end_without_open_is_an_anomaly() {
        let result = track_source(":- end_object.\n");
        assert!(result
            .anomalies
            .iter()
            .any(|a| matches!(a, Anomaly::UnmatchedEntityDirective { .. })));
    }

    #[test]
    fn test_balanced_document_closes_all_regions() {
        let source = ":- object(t).\n\np(X) :-\n\tq([a, b], {X}),\n\tr((X ; Y)).\n\n:- end_object.\n";
        let result = track_source(source);
        assert!(result.regions.iter().all(|r| r.closed));
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_unmatched_closer_is_tolerated() {
        let result = track_source("p :- q).\n");
        assert!(result
            .anomalies
            .iter()
            .any(|a| matches!(a, Anomaly::UnmatchedBracket { orphan_closer: true, .. })));
        // The clause still terminates normally
        assert!(boundary_kinds(&result).contains(&Boundary::ClauseEnd));
    }

    #[test]
    fn test_open_bracket_at_clause_end_is_an_anomaly() {
        let result = track_source("p :- q(a, b.\nr.\n");
        assert!(result
            .anomalies
            .iter()
            .any(|a| matches!(a, Anomaly::UnmatchedBracket { orphan_closer: false, .. })));
        // The terminator still ends the clause; the next clause starts clean
        assert_eq!(
            boundary_kinds(&result),
            vec![
                Boundary::ClauseStart,
                Boundary::ClauseEnd,
                Boundary::ClauseStart,
                Boundary::ClauseEnd,
            ]
        );
    }

    #[test]
    fn test_embedded_periods_do_not_terminate() {
        // `=..` and decimal points never surface as Period tokens
        let result = track_source("p :- memberchk(X, [1,2]), X =.. L.\n");
        let ends = result
            .boundaries
            .iter()
            .filter(|m| m.boundary == Boundary::ClauseEnd)
            .count();
        assert_eq!(ends, 1);
    }

    #[test]
    fn test_if_then_else_scopes() {
        let source = "p(X) :-\n\t(\tq(X) ->\n\t\tr(X)\n\t;\ts(X)\n\t).\n";
        let result = track_source(source);
        let branches: Vec<CondBranch> = result
            .regions
            .iter()
            .filter_map(|r| match r.frame {
                ScopeFrame::IfThenElse { branch, .. } => Some(branch),
                _ => None,
            })
            .collect();
        assert_eq!(branches, vec![CondBranch::Then, CondBranch::Else]);
        assert!(result.anomalies.is_empty());
    }

    #[test]
    fn test_neck_inside_parens_does_not_open_body() {
        let result = track_source("p :- assertz((q :- r)).\n");
        let bodies = result
            .regions
            .iter()
            .filter(|r| r.frame.is_clause_body())
            .count();
        assert_eq!(bodies, 1);
    }

    #[test]
    fn test_unclosed_entity_at_eof() {
        let result = track_source(":- object(t).\np.\n");
        let entity = result.regions.iter().find(|r| r.frame.is_entity()).unwrap();
        assert!(!entity.closed);
        assert!(result
            .anomalies
            .iter()
            .any(|a| matches!(a, Anomaly::UnmatchedEntityDirective { .. })));
    }
}
