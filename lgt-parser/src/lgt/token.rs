//! Token definitions for the Logtalk scanner
//!
//! All tokens are defined with the logos derive macro. Tokens carry no owned
//! text; the byte span paired with each token by the scanner is the single
//! source of truth, and callers slice the source when they need the text.
//!
//! Classification notes
//!
//! Quoted atoms, strings, and back-quoted terms consume backslash escapes
//! and doubled-quote escaping, so an escaped delimiter never terminates
//! the literal early. Each quoted form has an unterminated twin that runs
//! to end-of-line; one missing quote must not swallow the rest of the
//! buffer while the user is typing. Block comments are a single
//! non-nesting span ended by the first `*/` (Prolog convention), with an
//! unterminated twin running to end-of-buffer.
//!
//! Decimal floats, char codes (`0'c`), and radix literals are single
//! number tokens. This is what keeps the period-as-clause-end lookahead
//! local: a `.` that is part of `3.14` never surfaces as a Period token.
//!
//! `:-`, `-->`, `->`, `*->`, `;` and `|` are distinct tokens because the
//! indentation policy keys behavior off them. Everything else symbolic
//! collapses into `Symbolic`.

use logos::Logos;
use serde::Serialize;

/// Bracket delimiter kinds recognized by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Delimiter {
    Paren,
    Square,
    Curly,
}

impl Delimiter {
    /// The closing character for this delimiter.
    pub fn closer(&self) -> char {
        match self {
            Delimiter::Paren => ')',
            Delimiter::Square => ']',
            Delimiter::Curly => '}',
        }
    }
}

/// All tokens produced by the Logtalk scanner.
///
/// The catch-all `Unknown` token guarantees total coverage: any byte sequence
/// lexes into some token, so token spans always tile the input.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Token {
    // Layout
    #[regex(r"[ \t\r]+", priority = 3)]
    Whitespace,
    #[regex(r"\r?\n", priority = 4)]
    Newline,

    // Comments
    #[regex(r"%[^\n]*")]
    LineComment,
    #[regex(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/", priority = 6)]
    BlockComment,
    #[regex(r"/\*(?:[^*]|\*+[^/*])*\*?", priority = 5)]
    UnterminatedBlockComment,

    // Quoted literals
    #[regex(r"'(?:[^'\\\n]|\\[\s\S]|'')*'", priority = 6)]
    QuotedAtom,
    #[regex(r"'(?:[^'\\\n]|\\[\s\S]|'')*", priority = 5)]
    UnterminatedQuotedAtom,
    #[regex(r#""(?:[^"\\\n]|\\[\s\S]|"")*""#, priority = 6)]
    String,
    #[regex(r#""(?:[^"\\\n]|\\[\s\S]|"")*"#, priority = 5)]
    UnterminatedString,
    #[regex(r"`(?:[^`\\\n]|\\[\s\S]|``)*`", priority = 6)]
    BackQuoted,
    #[regex(r"`(?:[^`\\\n]|\\[\s\S]|``)*", priority = 5)]
    UnterminatedBackQuoted,

    // Numbers: integers, floats, radix literals, char codes
    #[regex(r"[0-9]+", priority = 4)]
    #[regex(r"[0-9]+\.[0-9]+(?:[eE][+-]?[0-9]+)?", priority = 6)]
    #[regex(r"0x[0-9a-fA-F]+|0o[0-7]+|0b[01]+", priority = 6)]
    #[regex(r"0'(?:\\[^\n]|[^\n])", priority = 7)]
    Number,

    // Names
    #[regex(r"[a-z][_a-zA-Z0-9]*", priority = 3)]
    Atom,
    #[regex(r"[_A-Z][_a-zA-Z0-9]*", priority = 3)]
    Variable,

    // Punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenSquare,
    #[token("]")]
    CloseSquare,
    #[token("{")]
    OpenCurly,
    #[token("}")]
    CloseCurly,
    #[token(",")]
    Comma,

    // Operators the structural model keys off
    #[token(":-", priority = 10)]
    Neck,
    #[token("-->", priority = 12)]
    DcgNeck,
    #[token("->", priority = 10)]
    IfThen,
    #[token("*->", priority = 12)]
    SoftCutThen,
    #[token(";", priority = 10)]
    Semicolon,
    #[token("|", priority = 10)]
    Bar,
    #[token("!", priority = 10)]
    Cut,
    #[token(".", priority = 10)]
    Period,

    // Remaining symbolic-char runs (`=`, `\+`, `=..`, `@<`, ...)
    #[regex(r"[#$&*+\-./:<=>?@^~\\]+", priority = 3)]
    Symbolic,

    // Total-coverage fallback; anything the rules above cannot classify
    #[regex(r".", priority = 0)]
    Unknown,
}

impl Token {
    /// Whitespace or newline.
    pub fn is_layout(&self) -> bool {
        matches!(self, Token::Whitespace | Token::Newline)
    }

    /// Line or block comment, terminated or not.
    pub fn is_comment(&self) -> bool {
        matches!(
            self,
            Token::LineComment | Token::BlockComment | Token::UnterminatedBlockComment
        )
    }

    /// A token that participates in clause structure (not layout, not comment).
    pub fn is_significant(&self) -> bool {
        !self.is_layout() && !self.is_comment()
    }

    /// A literal or comment that never closed before end-of-line/buffer.
    pub fn is_unterminated(&self) -> bool {
        matches!(
            self,
            Token::UnterminatedQuotedAtom
                | Token::UnterminatedString
                | Token::UnterminatedBackQuoted
                | Token::UnterminatedBlockComment
        )
    }

    /// The delimiter this token opens, if any.
    pub fn opens(&self) -> Option<Delimiter> {
        match self {
            Token::OpenParen => Some(Delimiter::Paren),
            Token::OpenSquare => Some(Delimiter::Square),
            Token::OpenCurly => Some(Delimiter::Curly),
            _ => None,
        }
    }

    /// The delimiter this token closes, if any.
    pub fn closes(&self) -> Option<Delimiter> {
        match self {
            Token::CloseParen => Some(Delimiter::Paren),
            Token::CloseSquare => Some(Delimiter::Square),
            Token::CloseCurly => Some(Delimiter::Curly),
            _ => None,
        }
    }

    /// Tokens that can name a predicate or entity (functor position).
    pub fn is_name(&self) -> bool {
        matches!(self, Token::Atom | Token::QuotedAtom)
    }

    /// `:-` or `-->`: the operators that separate a clause head from a body.
    pub fn is_neck(&self) -> bool {
        matches!(self, Token::Neck | Token::DcgNeck)
    }
}
