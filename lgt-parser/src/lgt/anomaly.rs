//! Soft structural anomalies
//!
//! Nothing in this taxonomy is fatal. Anomalies are recorded alongside the
//! best-effort structural result and surfaced to the host as advisory
//! diagnostics; indentation and span queries keep answering (conservatively)
//! in their presence.

use crate::lgt::token::Delimiter;
use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteRange;

/// A structural defect the tracker tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Anomaly {
    /// A quote or block comment never closed before end-of-line/buffer.
    UnterminatedLiteral { span: ByteRange<usize> },
    /// A closer without a matching opener, or an opener never closed.
    UnmatchedBracket {
        span: ByteRange<usize>,
        delimiter: Delimiter,
        /// True for a dangling closer, false for an opener left open.
        orphan_closer: bool,
    },
    /// An `end_*` directive without a matching open, or vice versa.
    UnmatchedEntityDirective { span: ByteRange<usize> },
}

impl Anomaly {
    /// The byte span the anomaly points at.
    pub fn span(&self) -> &ByteRange<usize> {
        match self {
            Anomaly::UnterminatedLiteral { span }
            | Anomaly::UnmatchedBracket { span, .. }
            | Anomaly::UnmatchedEntityDirective { span } => span,
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::UnterminatedLiteral { span } => {
                write!(f, "unterminated literal at {}..{}", span.start, span.end)
            }
            Anomaly::UnmatchedBracket {
                span,
                delimiter,
                orphan_closer: true,
            } => write!(
                f,
                "unmatched '{}' at {}..{}",
                delimiter.closer(),
                span.start,
                span.end
            ),
            Anomaly::UnmatchedBracket { span, .. } => {
                write!(f, "bracket never closed at {}..{}", span.start, span.end)
            }
            Anomaly::UnmatchedEntityDirective { span } => {
                write!(
                    f,
                    "unmatched entity directive at {}..{}",
                    span.start, span.end
                )
            }
        }
    }
}

impl std::error::Error for Anomaly {}
