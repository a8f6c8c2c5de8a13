//! A small driver binary over [`earley_core::Grammar`], in the shape of
//! `examples/acweathersby-radlr/src/app/cli/main.rs`: a `clap::Command`
//! with one subcommand per grammar-handle operation, a `configure_matches`
//! helper that lifts typed arguments out of `ArgMatches`, and a `main`
//! that builds the command, dispatches, and reports failures through the
//! grammar handle's own error context rather than a generic panic.
//!
//! Token streams are read from a plain text file: one `code[:attr]` pair
//! per line, terminated implicitly by end of file (translated to the
//! negative-code sentinel `read_token_cb` uses for end-of-input). This
//! keeps the binary lexer-agnostic, same as the engine it drives.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{value_parser, Arg, ArgMatches, Command};
use earley_core::{Grammar, Sppf, SppfNode, SppfNodeId};
use earley_runtime::{ScannedToken, TokenAttr};

fn command() -> ArgMatches {
  Command::new("earley")
    .about("Earley/Leo parser engine driver")
    .subcommand_required(true)
    .subcommand(
      Command::new("check")
        .about("parse and validate a grammar description, reporting any errors")
        .arg(Arg::new("grammar").required(true).value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("strict").long("strict").num_args(0)),
    )
    .subcommand(
      Command::new("parse")
        .about("parse a token stream against a grammar description")
        .arg(Arg::new("grammar").required(true).value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("tokens").required(true).value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("strict").long("strict").num_args(0))
        .arg(Arg::new("lookahead").long("lookahead").value_parser(value_parser!(u32)).default_value("1"))
        .arg(Arg::new("one-parse").long("one-parse").num_args(0))
        .arg(Arg::new("cost").long("cost").num_args(0))
        .arg(Arg::new("no-recovery").long("no-recovery").num_args(0))
        .arg(Arg::new("recovery-match").long("recovery-match").value_parser(value_parser!(u32)).default_value("1"))
        .arg(Arg::new("debug").long("debug").value_parser(value_parser!(u32)).default_value("0"))
        .arg(Arg::new("leo-debug").long("leo-debug").num_args(0))
        .arg(Arg::new("tree").long("tree").num_args(0).help("print the parse forest instead of a one-line summary"))
        .arg(Arg::new("bench").long("bench").value_parser(value_parser!(u64)).help("re-parse the same token stream N times and print a JSON benchmark line")),
    )
    .get_matches()
}

/// Reads a grammar description as raw bytes rather than `fs::read_to_string`:
/// the engine's own `InvalidUtf8` diagnostic (spec.md S4.3's "pre-flight
/// UTF-8 validation") should fire from this binary, not from a `std::io`
/// error thrown before the grammar handle ever sees the bytes.
fn read_grammar_source(path: &PathBuf) -> Result<Vec<u8>, String> {
  fs::read(path).map_err(|e| format!("could not read `{}`: {e}", path.display()))
}

/// Parses the `code[:attr]` token file format described at module level,
/// appending the end-of-input sentinel the engine's `read_token_cb`
/// expects.
fn read_token_stream(path: &PathBuf) -> Result<Vec<ScannedToken>, String> {
  let text = fs::read_to_string(path).map_err(|e| format!("could not read `{}`: {e}", path.display()))?;
  let mut tokens = Vec::new();
  for (lineno, line) in text.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    let (code_str, attr_str) = line.split_once(':').unwrap_or((line, "0"));
    let code: i64 = code_str.trim().parse().map_err(|_| format!("line {}: invalid token code `{code_str}`", lineno + 1))?;
    let attr: u64 = attr_str.trim().parse().map_err(|_| format!("line {}: invalid token attribute `{attr_str}`", lineno + 1))?;
    tokens.push(ScannedToken::new(code, TokenAttr(attr)));
  }
  tokens.push(ScannedToken::new(-1, TokenAttr::default()));
  Ok(tokens)
}

fn run_check(matches: &ArgMatches) -> Result<(), String> {
  let path = matches.get_one::<PathBuf>("grammar").unwrap();
  let strict = matches.get_flag("strict");
  let source = read_grammar_source(path)?;

  let mut grammar = Grammar::new();
  grammar.parse_grammar_bytes(strict, &source).map_err(|_| grammar.error_message())?;
  println!("grammar `{}` is valid: {} rules", path.display(), grammar.rule_count());
  Ok(())
}

fn run_parse(matches: &ArgMatches) -> Result<(), String> {
  let grammar_path = matches.get_one::<PathBuf>("grammar").unwrap();
  let tokens_path = matches.get_one::<PathBuf>("tokens").unwrap();
  let strict = matches.get_flag("strict");
  let source = read_grammar_source(grammar_path)?;
  let tokens = read_token_stream(tokens_path)?;

  let mut grammar = Grammar::new();
  grammar.parse_grammar_bytes(strict, &source).map_err(|_| grammar.error_message())?;

  let one_parse = matches.get_flag("one-parse");
  let cost = matches.get_flag("cost");
  grammar.set_lookahead_level(*matches.get_one::<u32>("lookahead").unwrap());
  grammar.set_one_parse_flag(one_parse);
  grammar.set_cost_flag(cost);
  grammar.set_error_recovery_flag(!matches.get_flag("no-recovery"));
  grammar.set_recovery_match(*matches.get_one::<u32>("recovery-match").unwrap());
  grammar.set_debug_level(*matches.get_one::<u32>("debug").unwrap());
  grammar.set_leo_debug(matches.get_flag("leo-debug"));

  if let Some(iterations) = matches.get_one::<u64>("bench").copied() {
    let mode = if one_parse { "one-parse" } else if cost { "cost" } else { "forest" };
    return run_bench(&mut grammar, &tokens, iterations, mode);
  }

  let mut token_iter = tokens.into_iter();
  let mut error_count = 0usize;
  let result = grammar
    .parse(
      || token_iter.next().unwrap_or_else(|| ScannedToken::new(-1, TokenAttr::default())),
      |event| {
        error_count += 1;
        eprintln!(
          "syntax error at token {}{}",
          event.error_token,
          match (event.start_ignored, event.start_recovered) {
            (Some(ignored), Some(recovered)) => format!(", recovered: discarded tokens {ignored}..{recovered}"),
            _ => " (unrecovered)".to_string(),
          }
        );
      },
    )
    .map_err(|_| grammar.error_message())?;

  if matches.get_flag("tree") {
    print_tree(&grammar, &result.forest);
  } else {
    println!(
      "accepted: ambiguous={}, leo completions={}/{} items, syntax errors={error_count}",
      result.ambiguous, result.leo_stats.n_completions, result.leo_stats.n_items
    );
  }
  Ok(())
}

/// Prints the parse forest rooted at `forest.root()` as an indented tree
/// (spec.md SPEC_FULL crate-layout A: the CLI exists to print "the tree or
/// a JSON benchmark line"). `ANODE`/`ALT` names come from
/// [`Grammar::node_name`]; an unannotated rule prints as `<anon>`.
fn print_tree(grammar: &Grammar, forest: &Sppf) {
  print_node(grammar, forest, forest.root(), 0);
}

fn print_node(grammar: &Grammar, forest: &Sppf, id: SppfNodeId, depth: usize) {
  let indent = "  ".repeat(depth);
  match forest.node(id) {
    SppfNode::Nil => println!("{indent}NIL"),
    SppfNode::Error { span } => println!("{indent}ERROR [{}, {})", span.0, span.1),
    SppfNode::Term { token, span } => println!("{indent}TERM code={} [{}, {})", token.code, span.0, span.1),
    SppfNode::Anode { span, alt } => {
      let name = grammar.node_name(alt.rule).unwrap_or("<anon>");
      println!("{indent}ANODE {name} cost={} [{}, {})", alt.cost, span.0, span.1);
      for child in &alt.children {
        print_node(grammar, forest, *child, depth + 1);
      }
    }
    SppfNode::Alt { span, alternatives } => {
      println!("{indent}ALT [{}, {}) ({} alternatives)", span.0, span.1, alternatives.len());
      for alt in alternatives {
        let name = grammar.node_name(alt.rule).unwrap_or("<anon>");
        println!("{indent}  - {name} cost={}", alt.cost);
        for child in &alt.children {
          print_node(grammar, forest, *child, depth + 2);
        }
      }
    }
  }
}

/// Re-parses `tokens` `iterations` times against the already-configured
/// `grammar`, resetting between runs (spec.md S4.11), and prints a single
/// JSON line matching spec.md S6's benchmark format: `schema_version`,
/// `mode`, `iterations`, `tokens`, `best_ns`, `avg_ns`, `avg_ns_per_token`.
/// Hand-formatted rather than pulled from a JSON crate: nothing in this
/// codebase's dependency stack serializes JSON, and one fixed-shape object
/// doesn't earn a new dependency.
fn run_bench(grammar: &mut Grammar, tokens: &[ScannedToken], iterations: u64, mode: &str) -> Result<(), String> {
  if iterations == 0 {
    return Err("--bench requires at least one iteration".to_string());
  }
  let token_count = tokens.len().saturating_sub(1); // exclude the end-of-input sentinel
  let mut best_ns = u128::MAX;
  let mut total_ns: u128 = 0;

  for _ in 0..iterations {
    grammar.reset();
    let mut token_iter = tokens.iter().copied();
    let start = Instant::now();
    grammar
      .parse(|| token_iter.next().unwrap_or_else(|| ScannedToken::new(-1, TokenAttr::default())), |_| {})
      .map_err(|_| grammar.error_message())?;
    let elapsed = start.elapsed().as_nanos();
    best_ns = best_ns.min(elapsed);
    total_ns += elapsed;
  }

  let avg_ns = total_ns / iterations as u128;
  let avg_ns_per_token = if token_count > 0 { avg_ns as f64 / token_count as f64 } else { 0.0 };
  println!(
    "{{\"schema_version\":1,\"mode\":\"{mode}\",\"iterations\":{iterations},\"tokens\":{token_count},\"best_ns\":{best_ns},\"avg_ns\":{avg_ns},\"avg_ns_per_token\":{avg_ns_per_token:.3}}}"
  );
  Ok(())
}

fn main() -> ExitCode {
  let matches = command();
  let outcome = match matches.subcommand() {
    Some(("check", sub)) => run_check(sub),
    Some(("parse", sub)) => run_parse(sub),
    _ => unreachable!("subcommand_required(true) rules this out"),
  };

  match outcome {
    Ok(()) => ExitCode::SUCCESS,
    Err(message) => {
      eprintln!("earley: {message}");
      ExitCode::FAILURE
    }
  }
}
