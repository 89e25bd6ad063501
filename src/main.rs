use anyhow::{bail, Context, Result};
use chat_token_tools::{
    create_summary, handle_split, human_file_size, load_text_file, text_stats, write_chunks,
    ChunkerConfig, ErrorResponse, LoadedText, ModelLimits, SplitRequest, SqliteSummaryStore,
    SummaryDraft, SummaryLog, TextStats, DEFAULT_MODEL,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ctt",
    version,
    about = "Estimate tokens and split long transcripts into model-sized chunks"
)]
struct Cli {
    /// JSON file with model limit overrides
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count words and estimate tokens
    Estimate(EstimateArgs),

    /// Split text into chunks that fit a model's context
    Split(SplitArgs),

    /// List known model context limits
    Models,

    /// Manage the local summary log
    Summary {
        #[command(subcommand)]
        command: SummaryCommands,
    },

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Transcript file (.txt), or `-` for stdin
    file: Option<PathBuf>,

    /// Inline text instead of a file
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,
}

#[derive(Args, Debug)]
struct EstimateArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SplitArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Target model identifier
    #[arg(short = 'm', long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Per-chunk token budget (clamped to the model limit)
    #[arg(long, allow_negative_numbers = true)]
    max_tokens: Option<i64>,

    /// Write chunk files into this directory
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Summary database file
    #[arg(long, default_value = "ctt.db")]
    db: PathBuf,
}

#[derive(Subcommand, Debug)]
enum SummaryCommands {
    /// Add a summary to the log
    Add {
        #[command(flatten)]
        store: StoreArgs,
        /// Model that produced the summary
        #[arg(short = 'm', long, default_value = DEFAULT_MODEL)]
        model: String,
        /// Source range, e.g. "chat-part-01..03"
        #[arg(long)]
        range: Option<String>,
        /// Topic tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Summary text
        summary: String,
    },
    /// Show the log, newest first
    List {
        #[command(flatten)]
        store: StoreArgs,
        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Merge the oldest entries once the log grows large
    Compact {
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Subcommand, Debug)]
enum KeyCommands {
    /// Store an API key
    Set {
        #[command(flatten)]
        store: StoreArgs,
        key: String,
    },
    /// Print the stored API key
    Show {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Remove the stored API key
    Clear {
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EstimateReport<'a> {
    #[serde(flatten)]
    stats: TextStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<&'a LoadedText>,
}

/// Text gathered from the command line, with file details when read from disk
struct Input {
    text: String,
    file: Option<LoadedText>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let limits = match &cli.config {
        Some(path) => ModelLimits::with_overrides(&ChunkerConfig::from_file(path)?),
        None => ModelLimits::new(),
    };

    match cli.command {
        Commands::Estimate(args) => run_estimate(args),
        Commands::Split(args) => run_split(&limits, args),
        Commands::Models => {
            run_models(&limits);
            Ok(())
        }
        Commands::Summary { command } => run_summary(command),
        Commands::Key { command } => run_key(command),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(args: InputArgs) -> Result<Input> {
    if let Some(text) = args.text {
        return Ok(Input {
            text: chat_token_tools::input::normalize_newlines(&text),
            file: None,
        });
    }

    match args.file {
        Some(path) if path == Path::new("-") => {
            let raw = io::read_to_string(io::stdin()).context("reading stdin")?;
            Ok(Input {
                text: chat_token_tools::input::normalize_newlines(&raw),
                file: None,
            })
        }
        Some(path) => {
            let loaded = load_text_file(&path)?;
            debug!(name = %loaded.name, size = loaded.size, "read input file");
            Ok(Input {
                text: loaded.text.clone(),
                file: Some(loaded),
            })
        }
        None => Ok(Input {
            text: String::new(),
            file: None,
        }),
    }
}

fn run_estimate(args: EstimateArgs) -> Result<()> {
    let input = read_input(args.input)?;
    if input.text.trim().is_empty() && input.file.is_none() {
        bail!("Missing text input.");
    }

    let stats = text_stats(&input.text);
    if args.json {
        let report = EstimateReport {
            stats,
            file: input.file.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(file) = &input.file {
        println!("{} ({})", file.name, human_file_size(file.size));
    }
    println!(
        "Words: {} • Estimated tokens: {}",
        stats.words, stats.tokens
    );
    Ok(())
}

fn run_split(limits: &ModelLimits, args: SplitArgs) -> Result<()> {
    let input = read_input(args.input)?;
    let budget = limits.resolve_budget(&args.model, args.max_tokens);

    let request = SplitRequest {
        text: Some(input.text),
        model: Some(args.model.clone()),
        max_tokens: args.max_tokens,
    };
    let response = match handle_split(limits, request) {
        Ok(response) => response,
        Err(err) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&err))?);
            }
            return Err(err.into());
        }
    };

    if let Some(dir) = &args.out {
        let written = write_chunks(dir, &response.chunks)?;
        // Paths would corrupt the JSON document on stdout
        if !args.json {
            for path in &written {
                println!("{}", path.display());
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if args.out.is_none() {
        for chunk in &response.chunks {
            println!("{:<20} {:>8} tokens", chunk.filename, chunk.approx_tokens);
        }
    }
    println!(
        "{} chunk(s) for {} (budget {} tokens)",
        response.chunks.len(),
        args.model,
        budget
    );
    Ok(())
}

fn run_models(limits: &ModelLimits) {
    for (model, limit) in limits.entries() {
        println!("{:<20} {:>8}", model, limit);
    }
    println!("{:<20} {:>8}", "(default)", limits.default_limit());
}

fn open_log(store: &StoreArgs) -> Result<SummaryLog<SqliteSummaryStore>> {
    let path = store.db.to_string_lossy();
    Ok(SummaryLog::new(SqliteSummaryStore::open(&path)?))
}

fn run_summary(command: SummaryCommands) -> Result<()> {
    match command {
        SummaryCommands::Add {
            store,
            model,
            range,
            tags,
            summary,
        } => {
            let mut log = open_log(&store)?;
            let entry = create_summary(SummaryDraft {
                summary,
                model,
                source_range: range,
                topic_tags: Some(tags),
            });
            let id = entry.id.clone();
            let summaries = log.add(entry)?;
            println!("added {} ({} in log)", id, summaries.len());
        }
        SummaryCommands::List { store, json } => {
            let summaries = open_log(&store)?.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                println!("(no summaries)");
            } else {
                for s in &summaries {
                    println!("[{}] {} {}: {}", s.tier_label, s.created_at, s.model, s.summary);
                }
            }
        }
        SummaryCommands::Compact { store } => {
            let mut log = open_log(&store)?;
            let before = log.list()?.len();
            let after = log.compact()?.len();
            if after < before {
                println!("compacted {} entries into {}", before, after);
            } else {
                println!("nothing to compact ({} entries)", before);
            }
        }
    }
    Ok(())
}

fn run_key(command: KeyCommands) -> Result<()> {
    match command {
        KeyCommands::Set { store, key } => {
            open_log(&store)?.save_api_key(key.trim())?;
            println!("API key saved");
        }
        KeyCommands::Show { store } => {
            let key = open_log(&store)?.api_key()?;
            if key.is_empty() {
                println!("(no API key stored)");
            } else {
                println!("{}", key);
            }
        }
        KeyCommands::Clear { store } => {
            open_log(&store)?.save_api_key("")?;
            println!("API key cleared");
        }
    }
    Ok(())
}
