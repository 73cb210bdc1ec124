//! Indentation-on-newline policy
//!
//! Given the cursor offset at the start of a freshly opened line,
//! [indent_for] proposes the leading whitespace for that line from the
//! scope stack active at the cursor. Indents are composed from the
//! opening line's actual leading whitespace plus indent units, never from
//! absolute column counts, so mixed tab/space files keep their local
//! style instead of being normalized.
//!
//! The engine looks one step ahead: when the text after the cursor on the
//! same line starts with a closer or an else-separator, the proposal is
//! the outdented or aligned form for that token rather than the inside-
//! the-scope indent.

use serde::Serialize;

use crate::lgt::range::{leading_whitespace, line_start_of};
use crate::lgt::scope::{FrameRegion, ScopeFrame};
use crate::lgt::structure::{analyze, Structure};
use crate::lgt::token::Token;

/// The indentation unit in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndentStyle {
    Tabs,
    Spaces(usize),
}

impl IndentStyle {
    /// One indentation level rendered as a string.
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Tabs => "\t".to_string(),
            IndentStyle::Spaces(width) => " ".repeat(*width),
        }
    }
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::Tabs
    }
}

/// Why an indent was proposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndentReason {
    /// No open scope: column zero.
    TopLevel,
    /// Inside an entity, between clauses.
    EntityBody,
    /// First line of a clause body, or a continued head.
    EnterBody,
    /// Later body line, aligned with the first goal.
    ContinueBody,
    /// Inside an open bracket.
    Bracket,
    /// The line starts with the closer of the innermost bracket.
    BracketCloser,
    /// Inside a then-branch.
    ThenBranch,
    /// Inside an else-branch.
    ElseBranch,
    /// The line starts with `;`, aligned under the opening parenthesis.
    ElseAlign,
    /// Inside an unterminated literal: keep the previous line verbatim.
    Preserve,
}

/// A proposed indent with its rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndentDecision {
    pub indent: String,
    pub reason: IndentReason,
}

impl IndentDecision {
    fn new(indent: String, reason: IndentReason) -> Self {
        Self { indent, reason }
    }
}

/// Propose indentation for the line starting at `offset`, analyzing `text`
/// from scratch. Hosts holding a [Document](crate::lgt::Document) should go
/// through it instead to reuse the cached structure.
pub fn indent_for(text: &str, offset: usize, style: IndentStyle) -> IndentDecision {
    indent_in(&analyze(text), text, offset, style)
}

/// [indent_for] against an existing structural snapshot.
pub fn indent_in(
    structure: &Structure,
    text: &str,
    offset: usize,
    style: IndentStyle,
) -> IndentDecision {
    let offset = offset.min(text.len());

    // A quote left open on the previous line ends at the newline itself, so
    // a cursor at the start of the fresh line checks one byte back too.
    let in_literal = structure.in_unterminated_literal(offset)
        || (offset > 0
            && text.as_bytes().get(offset - 1) == Some(&b'\n')
            && structure.in_unterminated_literal(offset - 1));
    if in_literal {
        let prev_line = line_start_of(text, offset.saturating_sub(1));
        let indent = leading_whitespace(text, prev_line).to_string();
        return IndentDecision::new(indent, IndentReason::Preserve);
    }

    let active = structure.active_regions(offset);

    // Lookahead: a closer or else-separator at the start of this line is
    // indented for its own scope boundary, not for the scope's interior.
    if let Some((token, span)) = structure.next_significant(offset) {
        let line_end = text[offset..]
            .find('\n')
            .map(|nl| offset + nl)
            .unwrap_or(text.len());
        if span.start < line_end {
            if let Some(delimiter) = token.closes() {
                let bracket = active.iter().rev().find_map(|region| match &region.frame {
                    ScopeFrame::Bracket {
                        delimiter: open,
                        line_start,
                        ..
                    } if *open == delimiter => Some(*line_start),
                    _ => None,
                });
                if let Some(line_start) = bracket {
                    let indent = leading_whitespace(text, line_start).to_string();
                    return IndentDecision::new(indent, IndentReason::BracketCloser);
                }
            }
            if matches!(token, Token::Semicolon | Token::IfThen | Token::SoftCutThen) {
                if let Some(align_offset) = else_alignment(&active) {
                    let indent = align_to(text, align_offset);
                    return IndentDecision::new(indent, IndentReason::ElseAlign);
                }
            }
        }
    }

    match active.last().map(|region| &region.frame) {
        None => IndentDecision::new(String::new(), IndentReason::TopLevel),
        Some(ScopeFrame::Entity { line_start, .. }) => {
            let indent = format!("{}{}", leading_whitespace(text, *line_start), style.unit());
            IndentDecision::new(indent, IndentReason::EntityBody)
        }
        Some(ScopeFrame::ClauseHead { line_start, .. }) => {
            let indent = format!("{}{}", leading_whitespace(text, *line_start), style.unit());
            IndentDecision::new(indent, IndentReason::EnterBody)
        }
        Some(ScopeFrame::ClauseBody {
            head_line_start,
            first_goal,
            ..
        }) => {
            let head_indent = leading_whitespace(text, *head_line_start);
            match first_goal {
                Some(goal) if line_start_of(text, *goal) != *head_line_start => {
                    // Align with the established body indentation
                    let goal_line = line_start_of(text, *goal);
                    let indent = leading_whitespace(text, goal_line).to_string();
                    IndentDecision::new(indent, IndentReason::ContinueBody)
                }
                _ => {
                    let indent = format!("{}{}", head_indent, style.unit());
                    IndentDecision::new(indent, IndentReason::EnterBody)
                }
            }
        }
        Some(ScopeFrame::Bracket { line_start, .. }) => {
            let indent = format!("{}{}", leading_whitespace(text, *line_start), style.unit());
            IndentDecision::new(indent, IndentReason::Bracket)
        }
        Some(ScopeFrame::IfThenElse {
            branch, line_start, ..
        }) => {
            let indent = format!("{}{}", leading_whitespace(text, *line_start), style.unit());
            let reason = match branch {
                crate::lgt::scope::CondBranch::Else => IndentReason::ElseBranch,
                _ => IndentReason::ThenBranch,
            };
            IndentDecision::new(indent, reason)
        }
    }
}

/// The paren offset a leading `;` or `->` should align under, if the
/// innermost scope is an if-then-else or a parenthesis.
fn else_alignment(active: &[&FrameRegion]) -> Option<usize> {
    match active.last().map(|region| &region.frame)? {
        ScopeFrame::IfThenElse { align_offset, .. } => Some(*align_offset),
        ScopeFrame::Bracket {
            delimiter: crate::lgt::token::Delimiter::Paren,
            open_offset,
            ..
        } => Some(*open_offset),
        _ => None,
    }
}

/// Whitespace string reaching the column of `offset`: tabs before it stay
/// tabs, every other character becomes a space, so the alignment holds under
/// any tab width.
fn align_to(text: &str, offset: usize) -> String {
    let line_start = line_start_of(text, offset);
    text[line_start..offset]
        .chars()
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indent_after(text: &str) -> IndentDecision {
        indent_for(text, text.len(), IndentStyle::Tabs)
    }

    #[test]
    fn test_after_rule_neck_one_level() {
        let decision = indent_after("complex_rule(X, Y) :-\n");
        assert_eq!(decision.indent, "\t");
        assert_eq!(decision.reason, IndentReason::EnterBody);
    }

    #[test]
    fn test_after_period_back_to_top_level() {
        let decision = indent_after("complex_rule(X, Y) :-\n\tfirst_goal(X),\n\tsecond_goal(Y).\n");
        assert_eq!(decision.indent, "");
        assert_eq!(decision.reason, IndentReason::TopLevel);
    }

    #[test]
    fn test_body_continuation_aligns_with_first_goal() {
        let decision = indent_after("complex_rule(X, Y) :-\n\tfirst_goal(X),\n");
        assert_eq!(decision.indent, "\t");
        assert_eq!(decision.reason, IndentReason::ContinueBody);
    }

    #[test]
    fn test_open_list_adds_a_level() {
        let decision = indent_after("test_list([\n");
        assert_eq!(decision.indent, "\t");
        assert_eq!(decision.reason, IndentReason::Bracket);
    }

    #[test]
    fn test_closer_line_outdents_to_opener_line() {
        let text = "test_list([\n\ta,\n\tb\n]";
        // Cursor at the start of the line holding the `]`
        let offset = text.rfind('\n').unwrap() + 1;
        let decision = indent_for(text, offset, IndentStyle::Tabs);
        assert_eq!(decision.indent, "");
        assert_eq!(decision.reason, IndentReason::BracketCloser);
    }

    #[test]
    fn test_inside_entity_one_level() {
        let decision = indent_after(":- object(test).\n\n");
        assert_eq!(decision.indent, "\t");
        assert_eq!(decision.reason, IndentReason::EntityBody);
    }

    #[test]
    fn test_then_branch_two_levels() {
        let decision = indent_after("p(X) :-\n\t(\tq(X) ->\n");
        assert_eq!(decision.indent, "\t\t");
        assert_eq!(decision.reason, IndentReason::ThenBranch);
    }

    #[test]
    fn test_else_separator_aligns_under_paren() {
        let text = "p(X) :-\n\t(\tq(X) ->\n\t\tr(X)\n\t;\n";
        // Cursor at the start of the line holding the `;`
        let offset = text.rfind("\t;").unwrap();
        let decision = indent_for(text, offset, IndentStyle::Tabs);
        assert_eq!(decision.indent, "\t");
        assert_eq!(decision.reason, IndentReason::ElseAlign);
    }

    #[test]
    fn test_unterminated_literal_preserves_previous_line() {
        let decision = indent_after("p(X) :-\n\tformat('unclosed\n");
        assert_eq!(decision.reason, IndentReason::Preserve);
        assert_eq!(decision.indent, "\t");
    }

    #[test]
    fn test_spaces_style() {
        let decision = indent_for("p :-\n", 5, IndentStyle::Spaces(4));
        assert_eq!(decision.indent, "    ");
    }

    #[test]
    fn test_offset_clamped_to_len() {
        let decision = indent_for("p.\n", 100, IndentStyle::Tabs);
        assert_eq!(decision.reason, IndentReason::TopLevel);
    }
}
