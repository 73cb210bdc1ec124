//! Structural document model
//!
//! Data flows one way for every query:
//!
//!     raw text -> scanner -> token stream -> boundary tracker
//!              -> scope regions / boundary list
//!              -> { indentation engine, span query service }
//!
//! The scanner ([scanner]) is a logos lexer whose tokens tile the input
//! exactly: every byte of the document belongs to exactly one token, no
//! gaps, no overlaps. Lexer failures degrade to an `Unknown` token so the
//! tiling invariant survives arbitrary input.
//!
//! The boundary tracker ([boundary]) is a single left-to-right pass over
//! the token stream. It maintains a stack of scope frames (entities,
//! clause heads and bodies, brackets, if-then-else branches) and records
//! each frame as a region with its byte span. Mismatched closers and
//! unmatched entity directives are tolerated and recorded as soft
//! anomalies; mid-typing text must keep answering queries.
//!
//! [structure] bundles the derived results into a per-snapshot index.
//! [indent] and [spans] answer the editor-facing queries from that index.
//! [document] owns per-document state with an explicit lifecycle (open,
//! edit, close) and a version counter for cache invalidation.
//!
//! Incrementality
//!
//! Incremental re-scanning after an edit ([scanner::rescan]) is an
//! optimization layered on top of the full-rescan reference path. A full
//! re-analysis of the whole buffer is always correct; the boundary pass
//! itself is inherently sequential and is recomputed from tokens.

pub mod anomaly;
pub mod boundary;
pub mod document;
pub mod indent;
pub mod range;
pub mod scanner;
pub mod scope;
pub mod spans;
pub mod structure;
pub mod token;

pub use anomaly::Anomaly;
pub use boundary::{Boundary, BoundaryMark};
pub use document::{Document, DocumentStore, EditDelta, EditError};
pub use indent::{indent_for, indent_in, IndentDecision, IndentReason, IndentStyle};
pub use range::{LineIndex, Position, Range};
pub use scanner::{rescan, tokenize};
pub use scope::{CondBranch, EntityKind, FrameRegion, ScopeFrame};
pub use spans::{enclosing_ranges, enclosing_ranges_in};
pub use structure::{analyze, Structure};
pub use token::{Delimiter, Token};
