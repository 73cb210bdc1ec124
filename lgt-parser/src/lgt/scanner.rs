//! Lexical scanner
//!
//! This is the entry point where source strings become token streams, driven
//! by the logos lexer in [crate::lgt::token]. Two contracts hold for every
//! input, valid or not:
//!
//! - the produced spans tile the input exactly: no gaps, no overlaps,
//!   offsets monotonically increasing;
//! - scanning never fails. Input the token rules cannot classify comes
//!   back as `Unknown` tokens; unterminated literals come back as their
//!   invalid-marked twins.
//!
//! [rescan] is the incremental variant: it resumes from a token boundary
//! before an edit and scans forward only until token boundaries re-align with
//! the shifted, unaffected tail of the previous scan. It produces output
//! identical to a full [tokenize] of the edited text.

use crate::lgt::anomaly::Anomaly;
use crate::lgt::document::EditDelta;
use crate::lgt::token::Token;
use logos::Logos;
use std::ops::Range as ByteRange;

/// Tokenize source text with byte spans.
pub fn tokenize(source: &str) -> Vec<(Token, ByteRange<usize>)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let token = result.unwrap_or(Token::Unknown);
        tokens.push((token, lexer.span()));
    }

    tokens
}

/// Collect [Anomaly::UnterminatedLiteral] entries from a token stream.
pub fn literal_anomalies(tokens: &[(Token, ByteRange<usize>)]) -> Vec<Anomaly> {
    tokens
        .iter()
        .filter(|(token, _)| token.is_unterminated())
        .map(|(_, span)| Anomaly::UnterminatedLiteral { span: span.clone() })
        .collect()
}

/// Re-tokenize after an edit, reusing the unaffected parts of `previous`.
///
/// `source` is the text after the edit has been applied; `previous` is the
/// token stream of the text before the edit. Resumes one token before the
/// first token the edit could have touched and stops as soon as a fresh token
/// boundary lands exactly on a shifted old boundary past the edited region;
/// from there on the old tail is reused with shifted spans.
pub fn rescan(
    source: &str,
    edit: &EditDelta,
    previous: &[(Token, ByteRange<usize>)],
) -> Vec<(Token, ByteRange<usize>)> {
    let inserted_len = edit.inserted.len();
    let delta = inserted_len as i64 - edit.removed_len as i64;
    // First old position that is guaranteed untouched by the edit
    let old_tail_start = edit.offset + edit.removed_len;
    // New positions at or past this point may sync with the old tail
    let new_tail_start = edit.offset + inserted_len;

    // Resume point: one token before the first token whose span reaches the
    // edit offset. A token ending exactly at the edit offset can still merge
    // with inserted text, so it must be re-lexed too.
    let first_touched = previous
        .partition_point(|(_, span)| span.end < edit.offset);
    let resume_idx = first_touched.saturating_sub(1);
    let resume_offset = previous
        .get(resume_idx)
        .map(|(_, span)| span.start)
        .unwrap_or(0);

    let mut tokens: Vec<(Token, ByteRange<usize>)> = previous[..resume_idx].to_vec();

    let mut lexer = Token::lexer(&source[resume_offset..]);
    // Index into `previous` from which the old tail could be spliced
    let mut old_idx = previous.partition_point(|(_, span)| span.start < old_tail_start);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let start = resume_offset + span.start;
        let end = resume_offset + span.end;

        if start >= new_tail_start {
            // Try to re-synchronize with the old token boundaries
            while old_idx < previous.len()
                && (previous[old_idx].1.start as i64 + delta) < start as i64
            {
                old_idx += 1;
            }
            if old_idx < previous.len()
                && previous[old_idx].1.start as i64 + delta == start as i64
            {
                // Boundary aligned: the rest of the text is unchanged, reuse
                // the old tail with shifted spans.
                for (token, old_span) in &previous[old_idx..] {
                    let shifted = (old_span.start as i64 + delta) as usize
                        ..(old_span.end as i64 + delta) as usize;
                    tokens.push((*token, shifted));
                }
                return tokens;
            }
        }

        let token = result.unwrap_or(Token::Unknown);
        tokens.push((token, start..end));
    }

    tokens
}
