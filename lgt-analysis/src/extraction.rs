//! Clause and goal delimitation
//!
//! Refactoring operations need exact spans: the clause under the cursor
//! (verbatim, terminator included), whether the cursor sits in a rule
//! body at all, and the span of the goal being pointed at. All of it
//! comes from the recorded frame regions; no re-parse, no guessing from
//! line boundaries.

use std::ops::Range as ByteRange;

use lgt_parser::lgt::{enclosing_ranges_in, ScopeFrame, Structure, Token};

/// The clause containing an offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseInfo {
    /// First token through terminating period (or end-of-buffer when the
    /// clause is unterminated).
    pub span: ByteRange<usize>,
    /// True for `:- ...` directives.
    pub directive: bool,
    /// True for `-->` rules.
    pub dcg: bool,
    /// Span of the body, from the neck onward, when the clause has one.
    pub body: Option<ByteRange<usize>>,
    pub terminated: bool,
}

/// The clause whose span contains `offset`, if any.
pub fn clause_at(structure: &Structure, offset: usize) -> Option<ClauseInfo> {
    let regions = structure.regions_containing(offset);
    let head = regions
        .iter()
        .find(|region| region.frame.is_clause_head())?;
    let directive = matches!(head.frame, ScopeFrame::ClauseHead { directive: true, .. });

    let body = structure
        .regions()
        .iter()
        .find(|region| region.frame.is_clause_body() && region.span.start >= head.span.start
            && region.span.end <= head.span.end);
    let dcg = matches!(
        body.map(|region| &region.frame),
        Some(ScopeFrame::ClauseBody { dcg: true, .. })
    );

    Some(ClauseInfo {
        span: head.span.clone(),
        directive,
        dcg,
        body: body.map(|region| region.span.clone()),
        terminated: head.closed,
    })
}

/// Whether `offset` sits inside the body of a rule (not a fact, not a
/// directive). This gates extract-goal style operations.
pub fn is_in_rule_body(structure: &Structure, offset: usize) -> bool {
    let regions = structure.regions_containing(offset);
    let in_body = regions
        .iter()
        .any(|region| region.frame.is_clause_body());
    let in_directive = regions.iter().any(|region| {
        matches!(region.frame, ScopeFrame::ClauseHead { directive: true, .. })
    });
    in_body && !in_directive
}

/// The span of the goal under `offset`: the enclosing call when the cursor
/// is inside one, otherwise the significant token itself.
///
/// Returns `None` outside rule bodies; extracting a "goal" from a head or a
/// directive is not meaningful.
pub fn goal_span(structure: &Structure, text: &str, offset: usize) -> Option<ByteRange<usize>> {
    if !is_in_rule_body(structure, offset) {
        return None;
    }
    let candidates: Vec<ByteRange<usize>> = enclosing_ranges_in(structure, text, offset)
        .into_iter()
        .filter(|range| {
            *range != (0..text.len())
                && !range_is_control(structure, range)
                && !is_clause_span(structure, range)
        })
        .collect();
    let first = candidates.first()?.clone();

    // A bare token widens to its innermost enclosing call; a call range is
    // kept as-is.
    if is_single_token(structure, &first) {
        if let Some(second) = candidates.get(1) {
            if starts_on_name(structure, second) {
                return Some(second.clone());
            }
        }
    }
    Some(first)
}

/// True when a range starts on a control token or is not inside any clause.
fn range_is_control(structure: &Structure, range: &ByteRange<usize>) -> bool {
    match structure.token_at(range.start) {
        Some((token, _)) => matches!(
            token,
            Token::OpenParen
                | Token::Semicolon
                | Token::IfThen
                | Token::SoftCutThen
                | Token::Neck
                | Token::DcgNeck
                | Token::Comma
        ),
        None => true,
    }
}

fn is_clause_span(structure: &Structure, range: &ByteRange<usize>) -> bool {
    structure
        .regions()
        .iter()
        .any(|region| region.frame.is_clause_head() && region.span == *range)
}

fn is_single_token(structure: &Structure, range: &ByteRange<usize>) -> bool {
    matches!(structure.token_at(range.start), Some((_, span)) if *span == *range)
}

fn starts_on_name(structure: &Structure, range: &ByteRange<usize>) -> bool {
    matches!(structure.token_at(range.start), Some((token, _)) if token.is_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lgt_parser::lgt::analyze;

    #[test]
    fn test_clause_at_rule() {
        let source = "len([], 0).\nlen([_|T], N) :-\n\tlen(T, M),\n\tN is M + 1.\n";
        let structure = analyze(source);
        let offset = source.find("M + 1").unwrap();
        let info = clause_at(&structure, offset).unwrap();
        assert_eq!(
            &source[info.span.clone()],
            "len([_|T], N) :-\n\tlen(T, M),\n\tN is M + 1."
        );
        assert!(!info.directive);
        assert!(!info.dcg);
        assert!(info.terminated);
        let body = info.body.unwrap();
        assert!(source[body].starts_with(":-"));
    }

    #[test]
    fn test_clause_at_fact_has_no_body() {
        let source = "len([], 0).\n";
        let structure = analyze(source);
        let info = clause_at(&structure, 2).unwrap();
        assert_eq!(info.body, None);
        assert!(!info.directive);
    }

    #[test]
    fn test_clause_at_directive() {
        let source = ":- dynamic(counter/1).\n";
        let structure = analyze(source);
        let info = clause_at(&structure, 5).unwrap();
        assert!(info.directive);
    }

    #[test]
    fn test_clause_at_blank_line_is_none() {
        let source = "p.\n\nq.\n";
        let structure = analyze(source);
        let blank = source.find("\n\n").unwrap() + 1;
        assert_eq!(clause_at(&structure, blank), None);
    }

    #[test]
    fn test_unterminated_clause() {
        let source = "p(X) :-\n\tq(X)";
        let structure = analyze(source);
        let info = clause_at(&structure, 3).unwrap();
        assert!(!info.terminated);
        assert_eq!(info.span, 0..source.len());
    }

    #[test]
    fn test_is_in_rule_body() {
        let source = "fact(1).\nrule(X) :- goal(X).\n:- dynamic(p/1).\n";
        let structure = analyze(source);
        assert!(!is_in_rule_body(&structure, source.find("1).").unwrap()));
        assert!(is_in_rule_body(&structure, source.find("goal").unwrap() + 1));
        assert!(!is_in_rule_body(&structure, source.find("p/1").unwrap()));
    }

    #[test]
    fn test_goal_span_whole_call() {
        let source = "p(X) :- q(X, f(Y)), r.\n";
        let structure = analyze(source);
        let offset = source.find("q(").unwrap() + 1;
        let span = goal_span(&structure, source, offset).unwrap();
        assert_eq!(&source[span], "q(X, f(Y))");
    }

    #[test]
    fn test_goal_span_bare_atom() {
        let source = "p(X) :- q(X), r.\n";
        let structure = analyze(source);
        let offset = source.find(", r.").unwrap() + 2;
        let span = goal_span(&structure, source, offset).unwrap();
        assert_eq!(&source[span], "r");
    }

    #[test]
    fn test_goal_span_outside_body() {
        let source = "p(X) :- q(X).\n";
        let structure = analyze(source);
        assert_eq!(goal_span(&structure, source, 1), None);
    }
}
