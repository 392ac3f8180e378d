//! amatch CLI — driving adapter for the amatch matchers.
//!
//! Subcommands:
//! - `check <config>` — build every matcher, warn about duplicates
//! - `show <config> [--json]` — print the canonical form of every matcher, or
//!   the normalized config it rebuilds from
//! - `eval <config> [--header name=value...]` — evaluate every matcher
//!
//! A config file lists header matchers:
//!
//! ```yaml
//! matchers:
//!   - name: x-user-age
//!     value_match: { range: { start: 18, end: 65 } }
//!   - name: x-env
//!     value_match: { exact: prod }
//!     invert_match: true
//! ```

use std::collections::HashSet;
use std::process;

use amatch::{HeaderMatcher, HeaderMatcherConfig};
use amatch_test::TestContext;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Top-level config file shape.
#[derive(Debug, Serialize, Deserialize)]
struct MatchersFile {
    matchers: Vec<HeaderMatcherConfig>,
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "show" => cmd_show(&args[2..]),
        "eval" => cmd_eval(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_check(args: &[String]) -> Result<(), String> {
    let [config_path] = args else {
        return Err("check requires exactly one config file path".into());
    };

    let matchers = build_matchers(load_config(config_path)?)?;

    for (index, first) in find_duplicates(&matchers) {
        eprintln!(
            "warning: matcher #{index} duplicates #{first}: {}",
            matchers[index]
        );
    }

    println!("Config valid ({} matchers)", matchers.len());
    Ok(())
}

fn cmd_show(args: &[String]) -> Result<(), String> {
    let (config_path, json) = match args {
        [path] => (path, false),
        [path, flag] if flag == "--json" => (path, true),
        _ => return Err("show requires one config file path and an optional --json".into()),
    };

    let matchers = build_matchers(load_config(config_path)?)?;
    if json {
        println!("{}", render_json(&matchers)?);
    } else {
        for matcher in matchers {
            println!("{matcher}");
        }
    }
    Ok(())
}

fn cmd_eval(args: &[String]) -> Result<(), String> {
    let Some((config_path, rest)) = args.split_first() else {
        return Err("eval requires a config file path".into());
    };

    let ctx = parse_headers(rest)?;
    let matchers = build_matchers(load_config(config_path)?)?;

    for matcher in &matchers {
        let verdict = if ctx.evaluate(matcher) {
            "match"
        } else {
            "no match"
        };
        println!("{matcher}: {verdict}");
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_config(path: &str) -> Result<MatchersFile, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    parse_config(&content, is_json)
}

fn parse_config(content: &str, is_json: bool) -> Result<MatchersFile, String> {
    if is_json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        amatch::from_yaml(content).map_err(|e| e.to_string())
    }
}

/// Normalized config for every matcher, as a loadable JSON document.
fn render_json(matchers: &[HeaderMatcher]) -> Result<String, String> {
    let file = MatchersFile {
        matchers: matchers.iter().map(HeaderMatcher::to_config).collect(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| format!("failed to render config: {e}"))
}

/// Build every matcher, stopping at the first invalid one.
fn build_matchers(file: MatchersFile) -> Result<Vec<HeaderMatcher>, String> {
    file.matchers
        .into_iter()
        .enumerate()
        .map(|(index, config)| {
            HeaderMatcher::try_from(config)
                .map_err(|e| format!("matcher #{index} is invalid: {e}"))
        })
        .collect()
}

/// `(duplicate index, index of its first occurrence)` pairs.
fn find_duplicates(matchers: &[HeaderMatcher]) -> Vec<(usize, usize)> {
    let mut seen = HashSet::new();
    matchers
        .iter()
        .enumerate()
        .filter(|&(_, m)| !seen.insert(m))
        .filter_map(|(index, m)| {
            let first = matchers.iter().position(|other| other == m)?;
            Some((index, first))
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_headers(args: &[String]) -> Result<TestContext, String> {
    let mut ctx = TestContext::new();
    let mut i = 0;

    while i < args.len() {
        if args[i] == "--header" {
            i += 1;
            while i < args.len() && !args[i].starts_with("--") {
                let pair = &args[i];
                let (name, value) = pair.split_once('=').ok_or_else(|| {
                    format!("invalid header pair \"{pair}\", expected name=value")
                })?;
                ctx = ctx.with(name, value);
                i += 1;
            }
        } else {
            return Err(format!("unexpected argument \"{}\"", args[i]));
        }
    }

    Ok(ctx)
}

fn print_usage() {
    eprintln!(
        "Usage: amatch <command> [options]

Commands:
  check <config>                          Build all matchers, report duplicates
  show <config> [--json]                  Print canonical forms (or normalized JSON config)
  eval <config> [--header name=value...]  Evaluate matchers against headers
  help                                    Show this help

Logging: set RUST_LOG (e.g. RUST_LOG=amatch=debug)"
    );
}
