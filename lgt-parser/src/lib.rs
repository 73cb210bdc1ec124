//! # lgt-parser
//!
//! Structural document model for Logtalk source editing.
//!
//! This crate recovers clause, term, comment, and bracket/quote boundaries
//! from raw Logtalk/Prolog text without requiring a full grammar or a
//! successful compilation. It is the core an editor integration builds on:
//! indentation-on-newline, selection-range expansion, and the boundary-finding
//! half of refactorings (extraction spans, verbatim clause copy) all consume
//! the structures produced here.
//!
//! The crate never executes source text and never mutates a buffer; it only
//! classifies text spans. Malformed input degrades to best-effort answers plus
//! soft anomalies, never to a failed query.
//!
//! For the module layout and data flow see [lgt].

#![allow(rustdoc::invalid_html_tags)]

pub mod lgt;
