use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use tabjump_protocol::{snapshot_schema, ErrorEnvelope, Snapshot};
use tabjump_search::{
    candidates_from_snapshot, Candidate, Ranker, ScoringProfile, SearchError, BUILTIN_PROFILES,
};

mod report;

#[derive(Parser)]
#[command(name = "tabjump")]
#[command(about = "Fuzzy-rank open and recently closed browser tabs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Scoring profile: builtin name or path to a JSON/TOML profile (default: default)
    #[arg(long, global = true)]
    profile: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a snapshot of tabs for a query
    Rank(RankArgs),

    /// Show the per-token score breakdown of every candidate
    Explain(ExplainArgs),

    /// Print the JSON Schema of the snapshot document
    Schema,

    /// List bundled scoring profiles
    Profiles,
}

#[derive(Args)]
struct RankArgs {
    /// Query words; omit for the recency order
    query: Vec<String>,

    /// Snapshot JSON file, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    snapshot: String,

    /// Maximum number of results to show
    #[arg(short, long)]
    limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExplainArgs {
    /// Query words
    query: Vec<String>,

    /// Snapshot JSON file, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    snapshot: String,
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers.
    let json_output = match &cli.command {
        Commands::Rank(args) => args.json,
        Commands::Explain(_) | Commands::Schema => true,
        Commands::Profiles => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_output {
                let envelope = classify_error(&err);
                match serde_json::to_string_pretty(&envelope) {
                    Ok(body) => println!("{body}"),
                    Err(ser_err) => eprintln!("Error: {err:#} ({ser_err})"),
                }
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Rank(args) => run_rank(args, cli.profile),
        Commands::Explain(args) => run_explain(args, cli.profile),
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&snapshot_schema()?)?);
            Ok(())
        }
        Commands::Profiles => {
            for name in BUILTIN_PROFILES {
                let profile = load_profile(Some((*name).to_string()))?;
                println!("{name}\t{}", profile.description().unwrap_or_default());
            }
            Ok(())
        }
    }
}

fn run_rank(args: RankArgs, profile: Option<String>) -> Result<()> {
    let profile = load_profile(profile)?;
    let profile_name = profile.name().to_string();
    let candidates = load_candidates(&args.snapshot)?;
    let query = args.query.join(" ");

    let ranker = Ranker::new(profile);
    let presentation = ranker.present(&candidates, &query, args.limit);
    log::info!(
        "{} of {} candidates shown (profile: {profile_name})",
        presentation.len(),
        candidates.len()
    );

    if args.json {
        let output = report::rank_output(&presentation, &query, &profile_name);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", report::render_text(&presentation));
    }
    Ok(())
}

fn run_explain(args: ExplainArgs, profile: Option<String>) -> Result<()> {
    let profile = load_profile(profile)?;
    let candidates = load_candidates(&args.snapshot)?;
    let query = args.query.join(" ");

    let ranker = Ranker::new(profile);
    let items = report::explain_items(ranker.scorer(), &candidates, &query);
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

fn load_profile(requested: Option<String>) -> Result<ScoringProfile> {
    let spec = requested
        .or_else(|| env::var("TABJUMP_PROFILE").ok())
        .unwrap_or_else(|| "default".to_string());
    let profile = ScoringProfile::resolve(&spec)?;
    log::debug!("Using scoring profile '{}'", profile.name());
    Ok(profile)
}

fn load_candidates(source: &str) -> Result<Vec<Candidate>> {
    let bytes = if source == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read snapshot from stdin")?;
        buf
    } else {
        fs::read(source).with_context(|| format!("Failed to read snapshot file {source}"))?
    };
    let snapshot = Snapshot::from_json(&bytes)?;
    Ok(candidates_from_snapshot(&snapshot))
}

fn classify_error(err: &anyhow::Error) -> ErrorEnvelope {
    let message = format!("{err:#}");
    let (code, hint) = match err.downcast_ref::<SearchError>() {
        Some(SearchError::UnknownProfile(_)) => (
            "unknown_profile",
            Some(format!(
                "Use one of: {}, or a path to a JSON/TOML profile file.",
                BUILTIN_PROFILES.join(", ")
            )),
        ),
        Some(SearchError::ReadProfile { .. }) => ("io", None),
        Some(_) => (
            "invalid_profile",
            Some("Fix the profile file; unknown keys are reported with their path.".to_string()),
        ),
        None if err.downcast_ref::<io::Error>().is_some() => ("io", None),
        None if message.contains("Snapshot") || message.contains("snapshot") => (
            "invalid_snapshot",
            Some("Run `tabjump schema` for the expected snapshot shape.".to_string()),
        ),
        None => ("internal", None),
    };

    ErrorEnvelope {
        code: code.to_string(),
        message,
        hint,
    }
}
