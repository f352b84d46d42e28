//! stroll - coreference resolution CLI
//!
//! Resolves mentions into entities one document at a time and scores the
//! result against gold `refid` labels.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a corpus and print per-document scores and the corpus average
//! stroll resolve corpus.jsonl --score
//!
//! # Write the documents back with entity ranks on every mention
//! stroll resolve corpus.json --output annotated.json
//!
//! # Use a config file, overriding the candidate bound
//! stroll resolve corpus.jsonl --config stroll.toml --max-candidates 10
//!
//! # Compare two cluster files directly
//! stroll score --gold gold.json --system system.json
//! ```
//!
//! Documents are read as a JSON array or as one JSON document per line
//! (`-` reads standard input). Logging goes to stderr and follows
//! `RUST_LOG`; `-v` raises the default level.

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};

use stroll::eval::{score_partitions, CorpusEvaluator, CorpusReport};
use stroll::{build_scorer, Document, Partition, ScorerKind, StaticVectors, StrollConfig};

// ============================================================================
// CLI Structure
// ============================================================================

/// Entity-centric coreference resolution and scoring
#[derive(Parser, Debug)]
#[command(name = "stroll", author, version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve coreference in a corpus of documents
    #[command(visible_alias = "r")]
    Resolve(ResolveArgs),

    /// Score a system clustering against a gold clustering
    #[command(visible_alias = "s")]
    Score(ScoreArgs),
}

/// Arguments for `stroll resolve`
#[derive(Args, Debug)]
struct ResolveArgs {
    /// Documents (JSON array or JSONL); `-` for stdin
    #[arg(value_name = "DOCS")]
    input: String,

    /// Score every document against its gold refids
    #[arg(long)]
    score: bool,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Write the annotated documents to this file
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Maximum number of link candidates per mention
    #[arg(short = 'k', long, value_name = "N")]
    max_candidates: Option<usize>,

    /// Action scorer (new-entity, nearest, head-match, vectors)
    #[arg(long, value_name = "KIND")]
    scorer: Option<ScorerKind>,

    /// Word vectors as a JSON object of word -> array
    #[arg(long, value_name = "PATH")]
    vectors: Option<String>,

    /// Resolve documents in parallel (needs the `parallel` feature)
    #[arg(long)]
    parallel: bool,
}

/// Arguments for `stroll score`
#[derive(Args, Debug)]
struct ScoreArgs {
    /// Gold clusters: JSON array of arrays of mention keys
    #[arg(short, long, value_name = "PATH")]
    gold: String,

    /// System clusters, same format
    #[arg(short, long, value_name = "PATH")]
    system: String,

    /// Print scores as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result: Result<(), String> = match cli.command {
        Commands::Resolve(args) => run_resolve(args),
        Commands::Score(args) => run_score(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => StrollConfig::from_file(path).map_err(|e| format!("{path}: {e}"))?,
        None => StrollConfig::default(),
    };
    if let Some(n) = args.max_candidates {
        config.resolver.max_candidates = n;
    }
    if let Some(kind) = args.scorer {
        config.scorer.kind = kind;
    }
    config.parallel |= args.parallel;
    config.validate().map_err(|e| e.to_string())?;

    let vectors = args
        .vectors
        .as_deref()
        .map(StaticVectors::from_json_file)
        .transpose()
        .map_err(|e| e.to_string())?;
    let scorer = build_scorer(&config.scorer, vectors).map_err(|e| e.to_string())?;

    let mut documents = load_documents(&args.input)?;
    if args.score && !documents.iter().any(Document::has_gold) {
        log::warn!("no mention carries a refid; every gold cluster is a singleton");
    }

    let report = CorpusEvaluator::from_config(&config).evaluate(&documents, scorer.as_ref());

    apply_report(&mut documents, &report);
    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&documents)
            .map_err(|e| format!("serialize documents: {e}"))?;
        fs::write(path, json).map_err(|e| format!("write {path}: {e}"))?;
        log::info!("wrote {} annotated documents to {path}", documents.len());
    }

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).map_err(|e| format!("serialize report: {e}"))?;
        println!("{json}");
    } else {
        print_report(&report, args.score);
    }

    if report.is_complete() {
        Ok(())
    } else {
        Err(format!(
            "{} of {} documents failed",
            report.failures.len(),
            report.total()
        ))
    }
}

fn run_score(args: ScoreArgs) -> Result<(), String> {
    let gold = load_clusters(&args.gold)?;
    let system = load_clusters(&args.system)?;
    let eval = score_partitions(&gold, &system).map_err(|e| e.to_string())?;

    if args.json {
        let json = serde_json::to_string_pretty(&eval).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        print!("{eval}");
    }
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn print_report(report: &CorpusReport, with_scores: bool) {
    for doc in &report.documents {
        println!(
            "{}: {} mentions, {} entities",
            doc.doc_id, doc.mention_count, doc.entity_count
        );
        if !doc.trace.is_empty() {
            println!("  trace: {}", doc.trace);
        }
        if with_scores {
            println!("  {}", doc.evaluation.summary_line());
        }
    }
    for failure in &report.failures {
        eprintln!("{}: failed: {}", failure.doc_id, failure.error);
    }
    if with_scores {
        println!();
        print!("{report}");
    }
}

/// Write system entity ranks onto resolved documents. Documents that failed
/// lose any `cluster` values they were read with.
fn apply_report(documents: &mut [Document], report: &CorpusReport) {
    for doc in &report.documents {
        documents[doc.index].annotate(&doc.system);
    }
    for failure in &report.failures {
        for mention in &mut documents[failure.index].mentions {
            mention.cluster = None;
        }
    }
}

/// Read a file, or stdin for `-`.
fn read_input(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("read stdin: {e}"))?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))
    }
}

/// Parse documents from a JSON array or JSON lines.
fn parse_documents(content: &str) -> Result<Vec<Document>, String> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).map_err(|e| format!("invalid document array: {e}"));
    }

    let mut documents = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let doc: Document = serde_json::from_str(line)
            .map_err(|e| format!("invalid document at line {}: {}", line_num + 1, e))?;
        documents.push(doc);
    }
    Ok(documents)
}

fn load_documents(path: &str) -> Result<Vec<Document>, String> {
    let documents = parse_documents(&read_input(path)?)?;
    log::info!("loaded {} documents from {path}", documents.len());
    Ok(documents)
}

/// Clusters as a JSON array of arrays.
///
/// Keys are all strings or all numbers; numbers are compared by their JSON
/// text, so a file mixing `3` and `"3"` is rejected rather than merged.
fn parse_clusters(content: &str) -> Result<Partition<String>, String> {
    let raw: Vec<Vec<serde_json::Value>> = serde_json::from_str(content)
        .map_err(|e| format!("expected an array of clusters: {e}"))?;

    let mut numeric: Option<bool> = None;
    let mut clusters = Vec::with_capacity(raw.len());
    for cluster in raw {
        let mut keys = Vec::with_capacity(cluster.len());
        for key in cluster {
            let (is_number, key) = match key {
                serde_json::Value::String(s) => (false, s),
                serde_json::Value::Number(n) => (true, n.to_string()),
                other => {
                    return Err(format!("cluster keys must be strings or numbers, got {other}"));
                }
            };
            match numeric {
                Some(kind) if kind != is_number => {
                    return Err(format!("cluster file mixes string and numeric keys (at {key})"));
                }
                _ => numeric = Some(is_number),
            }
            keys.push(key);
        }
        clusters.push(keys);
    }
    Partition::new(clusters).map_err(|e| e.to_string())
}

fn load_clusters(path: &str) -> Result<Partition<String>, String> {
    parse_clusters(&read_input(path)?).map_err(|e| format!("{path}: {e}"))
}
