//! Scope frames
//!
//! One frame per open structural context, innermost last on the stack. The
//! boundary tracker records every frame it pushes as a [FrameRegion] with the
//! byte span the frame covered, so the stack valid at any offset can be
//! recovered by containment filtering instead of replaying the pass.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range as ByteRange;

use crate::lgt::token::Delimiter;

/// Logtalk entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Object,
    Protocol,
    Category,
}

/// Branch position inside an if-then-else alignment scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CondBranch {
    Condition,
    Then,
    Else,
}

/// Directive atoms that open or close an entity.
///
/// Recognition is by directive argument pattern (`:- object(` ...), never by
/// the atom appearing somewhere in a clause; the tracker consults this table
/// only for the first goal atom of a directive.
pub static ENTITY_DIRECTIVES: Lazy<HashMap<&'static str, (EntityKind, bool)>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("object", (EntityKind::Object, false));
    map.insert("protocol", (EntityKind::Protocol, false));
    map.insert("category", (EntityKind::Category, false));
    map.insert("end_object", (EntityKind::Object, true));
    map.insert("end_protocol", (EntityKind::Protocol, true));
    map.insert("end_category", (EntityKind::Category, true));
    map
});

/// One open structural context.
///
/// `line_start` fields are byte offsets of the start of the line that opened
/// the frame; the indentation engine slices that line's leading whitespace to
/// compose indents, so frames never store rendered indent strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScopeFrame {
    /// An `object`/`protocol`/`category` block.
    Entity {
        kind: EntityKind,
        name: Option<String>,
        line_start: usize,
    },
    /// A clause, from its first token to its terminating period. A fact is a
    /// `ClauseHead` with no nested `ClauseBody`; that distinction gates every
    /// feature restricted to rule bodies.
    ClauseHead {
        directive: bool,
        line_start: usize,
    },
    /// The body of a rule (`:-`), DCG rule (`-->`), or directive goal.
    ClauseBody {
        dcg: bool,
        head_line_start: usize,
        /// Offset of the first goal token, once seen.
        first_goal: Option<usize>,
    },
    /// An open `(`, `[` or `{`.
    Bracket {
        delimiter: Delimiter,
        open_offset: usize,
        line_start: usize,
        /// Start of the adjacent functor atom, when this is a compound term.
        functor_start: Option<usize>,
    },
    /// Alignment scope opened by `->`/`*->` or `;` inside parentheses.
    IfThenElse {
        branch: CondBranch,
        /// Offset of the opening parenthesis the branch aligns against.
        align_offset: usize,
        line_start: usize,
    },
}

impl ScopeFrame {
    pub fn is_entity(&self) -> bool {
        matches!(self, ScopeFrame::Entity { .. })
    }

    pub fn is_clause_head(&self) -> bool {
        matches!(self, ScopeFrame::ClauseHead { .. })
    }

    pub fn is_clause_body(&self) -> bool {
        matches!(self, ScopeFrame::ClauseBody { .. })
    }

    pub fn is_bracket(&self) -> bool {
        matches!(self, ScopeFrame::Bracket { .. })
    }
}

/// A frame together with the byte span it covered.
///
/// `closed` is false for frames still open at end-of-buffer; their span ends
/// at the buffer length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRegion {
    pub frame: ScopeFrame,
    pub span: ByteRange<usize>,
    pub closed: bool,
}

impl FrameRegion {
    /// Whether the scope is active for a cursor sitting at `offset`.
    ///
    /// A frame becomes active after its first byte and stops being active at
    /// its end; a cursor directly behind a closing bracket or terminating
    /// period is outside the frame.
    pub fn active_at(&self, offset: usize) -> bool {
        self.span.start < offset && offset < self.span.end
            || (!self.closed && offset == self.span.end)
    }
}
