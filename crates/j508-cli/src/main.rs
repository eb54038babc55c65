//! j508 - Command-line entry point
//!
//! Fixes an HTML file in place of a browser: parse, run the compliance
//! rules on the body, write the document back out.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use j508::html::HtmlSerializer;
use j508::{Compliance, Rule, RuleSet, RunConfiguration, Target};
use tracing_subscriber::EnvFilter;

/// Section 508 compliance fixer for HTML documents
#[derive(Parser)]
#[command(name = "j508")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fix an HTML file
    Fix(FixArgs),

    /// List the available rules
    Rules,
}

#[derive(Args)]
struct FixArgs {
    /// HTML file to fix
    input: PathBuf,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rules to apply: names joined with `|`, `All`, or a bit mask
    #[arg(long)]
    rules: Option<RuleSet>,

    /// Rules whose violations are logged; bare `--debug` logs all
    #[arg(long, num_args = 0..=1, default_missing_value = "All")]
    debug: Option<RuleSet>,

    /// JSON run configuration; `--rules` and `--debug` override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the JSON report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Indent the output HTML
    #[arg(long)]
    pretty: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the fixed document
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Command::Fix(args) => fix(&args),
        Command::Rules => {
            list_rules();
            Ok(())
        }
    }
}

fn fix(args: &FixArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    let config = merge_config(config, args.rules, args.debug);

    let html = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let mut doc = j508::html::parse(&html);

    let mut compliance = Compliance::new();
    let report = compliance.run_with_config(&mut doc, Target::Body, config);
    tracing::info!(
        total = report.total(),
        fixed = report.fixed_count(),
        failed = report.failed.len(),
        "{}",
        args.input.display()
    );

    let serializer = if args.pretty { HtmlSerializer::pretty() } else { HtmlSerializer::new() };
    let fixed = serializer.serialize_outer(doc.tree(), doc.tree().root());
    match &args.output {
        Some(path) => fs::write(path, fixed)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{fixed}"),
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        fs::write(path, json).with_context(|| format!("failed to write report {}", path.display()))?;
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<RunConfiguration> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Command-line rule sets win over the config file
fn merge_config(file: Option<RunConfiguration>, rules: Option<RuleSet>, debug: Option<RuleSet>) -> RunConfiguration {
    let mut config = file.unwrap_or_default();
    if let Some(rules) = rules {
        config.rules = rules;
    }
    if let Some(debug) = debug {
        config.debug = debug;
    }
    config
}

fn list_rules() {
    for rule in Rule::ALL {
        println!("{:<30} {:>5}  {}", rule.name(), rule.bit(), rule.selector());
    }
}
