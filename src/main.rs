use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lingo::{Options, Translator, Value, datetime, report, timezone};

#[derive(Parser)]
#[command(name = "lingo", version, about = "A localization runtime in Rust")]
struct Cli {
    /// Directory of <locale>.json catalog documents
    #[arg(short = 'd', long = "dir")]
    dir: Option<PathBuf>,

    /// Active locale
    #[arg(short = 'l', long = "locale")]
    locale: Option<String>,

    /// Fallback locale consulted before the default
    #[arg(long = "fallback")]
    fallback: Option<String>,

    /// Debug-level logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a scope: lingo -d locales t greeting name=Ada count=2
    T {
        scope: String,
        /// key=value substitution pairs; numeric values pluralize when
        /// the key is `count`
        pairs: Vec<String>,
    },
    /// Per-locale coverage and lint report
    Coverage {
        #[arg(long)]
        json: bool,
    },
    /// Format an instant in the active locale
    L {
        /// Named style (default/short/long or any time.formats.* key)
        #[arg(long, default_value = "default")]
        style: String,
        /// RFC 3339 instant, e.g. 2021-07-01T12:00:00Z (now by default)
        #[arg(long)]
        at: Option<String>,
        /// Render in this zone instead of UTC
        #[arg(long)]
        zone: Option<String>,
    },
    /// List IANA zone names, optionally filtered by substring
    Zones { filter: Option<String> },
    /// Inspect one zone at an instant (now by default)
    Zone {
        name: String,
        /// RFC 3339 instant, e.g. 2021-07-01T12:00:00Z
        #[arg(long)]
        at: Option<String>,
    },
}

fn build_translator(cli: &Cli) -> anyhow::Result<Translator> {
    let mut tr = Translator::new();
    if let Some(dir) = &cli.dir {
        let loaded = tr
            .load_dir(dir)
            .with_context(|| format!("loading catalogs from {}", dir.display()))?;
        if loaded.is_empty() {
            eprintln!("warning: no catalog documents in {}", dir.display());
        }
    }
    if let Some(tag) = &cli.locale {
        tr.set_locale(tag)?;
    }
    if let Some(tag) = &cli.fallback {
        tr.set_fallback_locale(Some(tag))?;
    }
    Ok(tr)
}

/// Parse `name=value` pairs into translate options. A numeric `count`
/// becomes the plural count; everything else is a substitution value.
fn options_from_pairs(pairs: &[String]) -> anyhow::Result<Options> {
    let mut options = Options::new();
    for pair in pairs {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("expected name=value, got {pair:?}"))?;
        if name == "count" {
            let count: f64 = value
                .parse()
                .map_err(|_| anyhow!("count must be numeric, got {value:?}"))?;
            options = options.count(count);
        } else if let Ok(n) = value.parse::<f64>() {
            options = options.value(name, Value::Float(n));
        } else {
            options = options.value(name, value);
        }
    }
    Ok(options)
}

fn run_translate(tr: &Translator, scope: &str, pairs: &[String]) -> anyhow::Result<()> {
    let options = options_from_pairs(pairs)?;
    println!("{}", tr.translate(scope, &options));
    Ok(())
}

fn parse_instant(at: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match at {
        Some(text) => Ok(DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("invalid RFC 3339 instant {text:?}"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn run_localize(
    tr: &Translator,
    style: &str,
    at: Option<&str>,
    zone: Option<&str>,
) -> anyhow::Result<()> {
    let instant = parse_instant(at)?;
    let rendered = match zone {
        Some(name) => match timezone::lookup(name)? {
            timezone::Zone::Named(tz) => {
                datetime::localize(tr, &instant.with_timezone(&tz), style, None)
            }
            timezone::Zone::Fixed(offset) => {
                datetime::localize(tr, &instant.with_timezone(&offset), style, None)
            }
        },
        None => datetime::localize(tr, &instant, style, None),
    };
    println!("{rendered}");
    Ok(())
}

fn run_coverage(tr: &Translator, json: bool) -> anyhow::Result<()> {
    let coverage = report::coverage(tr.translations());
    let issues = report::lint(tr.translations(), tr.default_locale());
    if json {
        let out = serde_json::json!({ "coverage": coverage, "lint": issues });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    println!("{} keys across {} locales", coverage.total_keys, coverage.locales.len());
    for locale in &coverage.locales {
        println!(
            "  {:8} {:>5.1}%  ({} of {})",
            locale.locale,
            locale.percent,
            locale.present,
            coverage.total_keys
        );
        for key in &locale.missing {
            println!("           missing {key}");
        }
    }
    if !issues.is_empty() {
        println!("{} lint issue(s):", issues.len());
        for issue in &issues {
            println!("  {}.{}: {}", issue.locale, issue.scope, issue.detail);
        }
    }
    Ok(())
}

fn run_zones(filter: Option<&str>) {
    for name in timezone::names() {
        if filter.is_none_or(|f| name.to_lowercase().contains(&f.to_lowercase())) {
            println!("{name}");
        }
    }
}

fn run_zone(name: &str, at: Option<&str>) -> anyhow::Result<()> {
    let zone = timezone::lookup(name)?;
    let instant = parse_instant(at)?;
    println!("zone:         {}", zone.name());
    println!("offset:       {}", timezone::format_offset(timezone::offset_at(zone, instant)));
    println!("abbreviation: {}", timezone::abbreviation_at(zone, instant));
    match timezone::next_transition(zone, instant) {
        Some(next) => println!("next change:  {}", next.to_rfc3339()),
        None => println!("next change:  none"),
    }
    Ok(())
}

fn run_repl(tr: &Translator) -> ExitCode {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("lingo v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Active locale: {}. Type `scope name=value ...`. Press Ctrl-D to exit.",
        tr.locale()
    );

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let mut words = line.split_whitespace();
                let Some(scope) = words.next() else { continue };
                let pairs: Vec<String> = words.map(str::to_string).collect();
                match options_from_pairs(&pairs) {
                    Ok(options) => println!("{}", tr.translate(scope, &options)),
                    Err(e) => eprintln!("{e}"),
                }
            }
            Err(e) => {
                eprintln!("Read error: {e}");
                return ExitCode::from(1);
            }
        }
    }

    println!();
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();

    // Zone inspection works without a catalog directory.
    match &cli.command {
        Some(Command::Zones { filter }) => {
            run_zones(filter.as_deref());
            return ExitCode::SUCCESS;
        }
        Some(Command::Zone { name, at }) => {
            return match run_zone(name, at.as_deref()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    ExitCode::from(1)
                }
            };
        }
        _ => {}
    }

    let tr = match build_translator(&cli) {
        Ok(tr) => tr,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match &cli.command {
        Some(Command::T { scope, pairs }) => run_translate(&tr, scope, pairs),
        Some(Command::L { style, at, zone }) => {
            run_localize(&tr, style, at.as_deref(), zone.as_deref())
        }
        Some(Command::Coverage { json }) => run_coverage(&tr, *json),
        Some(Command::Zones { .. }) | Some(Command::Zone { .. }) => unreachable!(),
        None => return run_repl(&tr),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
