use chrono::NaiveDateTime;
use hubrank::{Context, Engine, Link, LinkId, MemoryClickStore, Rule, VisitorContext};
use serde::Deserialize;
use std::io::{self, Read};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let snapshot: Snapshot = match serde_json::from_str(&config.input) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            eprintln!("error: invalid snapshot JSON: {err}");
            std::process::exit(2);
        }
    };

    let mut store = MemoryClickStore::new();
    for click in &snapshot.clicks {
        let clicked_at = match parse_timestamp(&click.clicked_at) {
            Ok(clicked_at) => clicked_at,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(2);
            }
        };
        store.record_many(snapshot.hub_id.as_str(), click.link_id.clone(), click.clicks, clicked_at);
    }

    let ctx = match config.reference_time {
        Some(reference_time) => Context { reference_time },
        None => Context::default(),
    };

    let engine = Engine::with_click_store(store);
    let hub_id = snapshot.hub_id.as_str().into();
    let evaluation =
        engine.evaluate_verbose_at(&hub_id, &snapshot.visitor, &snapshot.links, &snapshot.rules, &ctx);

    println!(
        "hub {} — {} links, {} rules, reference {}, evaluated in {:?}",
        snapshot.hub_id,
        snapshot.links.len(),
        snapshot.rules.len(),
        ctx.reference_time,
        evaluation.elapsed
    );
    println!();

    for (position, link) in evaluation.links.iter().enumerate() {
        println!("{:>3}. {}  {}", position + 1, link.title, link.url);
    }

    if !evaluation.trace.is_empty() {
        println!();
        println!("rule trace (evaluation order):");
        for trace in &evaluation.trace {
            let matched: Vec<&str> = trace.matched.iter().map(LinkId::as_str).collect();
            println!(
                "  [{}] {}: matched [{}], {} newly promoted",
                trace.rule_kind,
                trace.rule_id,
                matched.join(", "),
                trace.promoted
            );
        }
    }
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    hub_id: String,
    #[serde(default)]
    visitor: VisitorContext,
    links: Vec<Link>,
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default)]
    clicks: Vec<SnapshotClick>,
}

/// Pre-aggregated click history for the demo's in-memory store.
#[derive(Debug, Deserialize)]
struct SnapshotClick {
    link_id: LinkId,
    #[serde(default = "one")]
    clicks: u64,
    clicked_at: String,
}

fn one() -> u64 {
    1
}

struct CliConfig {
    input: String,
    reference_time: Option<NaiveDateTime>,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input_path: Option<String> = None;
    let mut reference_time = None;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("hubrank {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--reference" => {
                let value = args.next().ok_or_else(|| "error: --reference expects a value".to_string())?;
                reference_time = Some(parse_timestamp(&value)?);
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input_path.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input_path = Some(value);
            }
            _ if arg.starts_with("--reference=") => {
                let value = arg.trim_start_matches("--reference=");
                reference_time = Some(parse_timestamp(value)?);
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input_path.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input_path = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                if input_path.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input_path = Some(arg);
            }
        }
    }

    let input = match input_path {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|err| format!("error: failed to read '{path}': {err}"))?,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no snapshot provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, reference_time })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| format!("error: invalid timestamp '{value}' (expected YYYY-MM-DDTHH:MM:SS)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "hubrank {version}

Evaluate a hub snapshot and print the link ordering a visitor would see.

The snapshot is a JSON object with `hub_id`, `visitor`, `links`, `rules`
and optional `clicks` (timestamped click history for performance rules).

Usage:
  hubrank [OPTIONS] [snapshot.json]
  hubrank [OPTIONS] --input <snapshot.json>

Options:
  -i, --input <path>         Snapshot file. Reads stdin when omitted.
  --reference <timestamp>    Reference time in YYYY-MM-DDTHH:MM:SS.
                             Default: the local wall clock.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Success.
  2  Invalid arguments or snapshot.
",
        version = env!("CARGO_PKG_VERSION")
    )
}
