//! Command-line interface for the lgt structural model
//! This binary exposes the editor queries for inspection and scripting:
//! token streams, clause boundaries, anomalies, indentation proposals and
//! enclosing-range ladders, all as JSON on stdout.
//!
//! Usage:
//!   lgt `<path>` --mode tokens                       - Dump the token tiling
//!   lgt `<path>` --mode boundaries                   - Clause/entity boundaries
//!   lgt `<path>` --mode anomalies                    - Soft anomalies
//!   lgt `<path>` --mode indent --offset `<n>`        - Indent proposal at offset
//!   lgt `<path>` --mode ranges --offset `<n>`        - Enclosing ranges at offset
//!   lgt `<path>` --mode stack --offset `<n>`         - Scope stack at offset
//!   lgt `<path>` --mode clause --offset `<n>`        - Clause under the offset

use clap::{Arg, Command};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use lgt_config::Loader;
use lgt_parser::lgt::{
    analyze, enclosing_ranges_in, indent_in, LineIndex, Structure,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("lgt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect the structural model of Logtalk source files")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the Logtalk source file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .short('m')
                .help("Query to run: tokens, boundaries, anomalies, indent, ranges, stack, clause")
                .default_value("boundaries"),
        )
        .arg(
            Arg::new("offset")
                .long("offset")
                .short('o')
                .help("Byte offset for offset-based queries")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults"),
        )
        .get_matches();

    let path = matches
        .get_one::<String>("path")
        .expect("path is required");
    let mode = matches.get_one::<String>("mode").expect("mode has a default");
    let offset = matches.get_one::<usize>("offset").copied();

    let mut loader = Loader::new();
    if let Some(config_path) = matches.get_one::<String>("config") {
        loader = loader.with_file(config_path);
    }
    let config = loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Cannot read {}: {}", path, e);
        std::process::exit(1);
    });
    let structure = analyze(&text);

    let output = match mode.as_str() {
        "tokens" => tokens_json(&structure),
        "boundaries" => boundaries_json(&text, &structure),
        "anomalies" => anomalies_json(&text, &structure),
        "indent" => {
            let offset = require_offset(offset, mode);
            let decision =
                indent_in(&structure, &text, offset, config.indentation.indent_style());
            json!({
                "indent": decision.indent,
                "reason": decision.reason,
            })
        }
        "ranges" => {
            let offset = require_offset(offset, mode);
            let index = LineIndex::new(&text);
            let ranges: Vec<_> = enclosing_ranges_in(&structure, &text, offset)
                .into_iter()
                .map(|span| {
                    json!({
                        "range": index.range(&span),
                        "text": &text[span],
                    })
                })
                .collect();
            json!(ranges)
        }
        "stack" => {
            let offset = require_offset(offset, mode);
            json!(structure.scope_stack_at(offset))
        }
        "clause" => {
            let offset = require_offset(offset, mode);
            let index = LineIndex::new(&text);
            match lgt_analysis::clause_at(&structure, offset) {
                Some(info) => json!({
                    "range": index.range(&info.span),
                    "text": &text[info.span.clone()],
                    "directive": info.directive,
                    "dcg": info.dcg,
                    "terminated": info.terminated,
                }),
                None => json!(null),
            }
        }
        other => {
            eprintln!("Unknown mode '{}'", other);
            eprintln!("Available modes: tokens, boundaries, anomalies, indent, ranges, stack, clause");
            std::process::exit(1);
        }
    };

    let rendered = serde_json::to_string_pretty(&output).unwrap_or_else(|e| {
        eprintln!("Error formatting output: {}", e);
        std::process::exit(1);
    });
    println!("{}", rendered);
}

fn require_offset(offset: Option<usize>, mode: &str) -> usize {
    offset.unwrap_or_else(|| {
        eprintln!("Mode '{}' requires --offset", mode);
        std::process::exit(1);
    })
}

fn tokens_json(structure: &Structure) -> serde_json::Value {
    let tokens: Vec<_> = structure
        .tokens()
        .iter()
        .map(|(token, span)| {
            json!({
                "token": token,
                "start": span.start,
                "end": span.end,
            })
        })
        .collect();
    json!(tokens)
}

fn boundaries_json(text: &str, structure: &Structure) -> serde_json::Value {
    let index = LineIndex::new(text);
    let boundaries: Vec<_> = structure
        .boundaries()
        .iter()
        .map(|mark| {
            json!({
                "boundary": mark.boundary,
                "range": index.range(&mark.span),
            })
        })
        .collect();
    json!(boundaries)
}

fn anomalies_json(text: &str, structure: &Structure) -> serde_json::Value {
    let index = LineIndex::new(text);
    let anomalies: Vec<_> = structure
        .anomalies()
        .iter()
        .map(|anomaly| {
            json!({
                "message": anomaly.to_string(),
                "range": index.range(anomaly.span()),
            })
        })
        .collect();
    json!(anomalies)
}
