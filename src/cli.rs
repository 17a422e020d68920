use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::commands::{self, CommandReport, ConfigOverrides, InputOptions};
use crate::logging;

#[derive(Debug, Parser)]
#[command(
    name = "docsum",
    version,
    about = "Segment long documents and summarize them through a hosted model"
)]
struct Cli {
    /// Print the command report as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Emit log lines as JSON on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summarize a document and list its key points.
    Summarize(SummarizeArgs),
    /// Show how a document would be split into segments.
    Segment(SegmentArgs),
    /// Show the resolved configuration.
    Config,
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Read the document from a text or PDF file.
    #[arg(long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Pass the document inline. Stdin is read when neither flag is given.
    #[arg(long)]
    text: Option<String>,
}

impl InputArgs {
    fn into_options(self) -> InputOptions {
        InputOptions {
            file: self.file,
            text: self.text,
        }
    }
}

#[derive(Debug, Args)]
struct SummarizeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Maximum characters per segment.
    #[arg(long)]
    max_length: Option<usize>,

    /// Maximum segments submitted for summarization.
    #[arg(long)]
    max_segments: Option<usize>,

    /// Number of key points to extract.
    #[arg(long)]
    key_points: Option<usize>,

    /// Stop submitting segments once the run has taken this long.
    #[arg(long)]
    deadline_secs: Option<u64>,
}

#[derive(Debug, Args)]
struct SegmentArgs {
    #[command(flatten)]
    input: InputArgs,

    #[arg(long)]
    max_length: Option<usize>,
}

fn render(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for line in &report.body {
        println!("{line}");
    }
    if !report.body.is_empty() && !(report.details.is_empty() && report.issues.is_empty()) {
        println!();
    }
    for detail in &report.details {
        println!("  {detail}");
    }
    for issue in &report.issues {
        println!("  issue: {issue}");
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let report = match cli.command {
        Command::Summarize(args) => commands::summarize::run(
            &args.input.into_options(),
            &ConfigOverrides {
                max_length: args.max_length,
                max_segments: args.max_segments,
                key_points: args.key_points,
            },
            args.deadline_secs.map(Duration::from_secs),
        )?,
        Command::Segment(args) => commands::segment::run(
            &args.input.into_options(),
            &ConfigOverrides {
                max_length: args.max_length,
                ..ConfigOverrides::default()
            },
        )?,
        Command::Config => commands::show_config::run()?,
    };

    render(&report, cli.json)?;
    if !report.ok {
        anyhow::bail!(
            "{} failed with {} issue(s)",
            report.command,
            report.issues.len()
        );
    }
    Ok(())
}
