use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use subsearch_core::tokenizer::Analyzer;
use subsearch_core::{build_index, BuildConfig, CorpusSource, IdfScheme, SnapshotStore, DEFAULT_TOP_K};
use tracing_subscriber::{fmt, EnvFilter};

mod sqlite;
mod srt_dir;

use sqlite::{SqliteCorpus, SqliteLayout};
use srt_dir::SrtDirCorpus;

#[derive(Parser)]
#[command(name = "subsearch-indexer")]
#[command(about = "Build and inspect the subtitle similarity snapshot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample the corpus, fit TF-IDF and write the snapshot
    Build(BuildArgs),
    /// Print snapshot metadata
    Inspect {
        #[arg(long, default_value = "./processed_data.snap")]
        snapshot: String,
    },
    /// Rank a query against a snapshot
    Query {
        #[arg(long, default_value = "./processed_data.snap")]
        snapshot: String,
        /// Query text
        #[arg(long)]
        q: String,
        #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
    },
}

#[derive(Args)]
struct BuildArgs {
    /// SQLite database holding the subtitle rows
    #[arg(long, conflicts_with = "srt_dir", required_unless_present = "srt_dir")]
    db: Option<String>,
    /// Directory of .srt files to use instead of a database
    #[arg(long)]
    srt_dir: Option<String>,
    /// Output snapshot path
    #[arg(long, default_value = "./processed_data.snap")]
    output: String,
    #[arg(long, default_value = "zipfiles")]
    table: String,
    #[arg(long, default_value = "num")]
    id_column: String,
    #[arg(long, default_value = "name")]
    name_column: String,
    #[arg(long, default_value = "content")]
    content_column: String,
    /// Fraction of the corpus to index, in (0, 1]
    #[arg(long, default_value_t = subsearch_core::config::DEFAULT_SAMPLE_FRACTION)]
    sample_fraction: f64,
    /// Seed for the sample
    #[arg(long, default_value_t = subsearch_core::config::DEFAULT_SEED, conflicts_with = "unseeded")]
    seed: u64,
    /// Draw a fresh random sample on every build
    #[arg(long, default_value_t = false)]
    unseeded: bool,
    /// IDF variant: smooth = ln((1+N)/(1+df))+1, plain = ln(N/df), log1p = ln(1+N/df)
    #[arg(long, default_value = "smooth")]
    idf: IdfScheme,
    /// Use 1 + ln(tf) instead of raw term counts
    #[arg(long, default_value_t = false)]
    sublinear_tf: bool,
    /// Apply English stemming to terms
    #[arg(long, default_value_t = false)]
    stem: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => build(args),
        Commands::Inspect { snapshot } => inspect(&snapshot),
        Commands::Query { snapshot, q, k } => query(&snapshot, &q, k),
    }
}

fn build(args: BuildArgs) -> Result<()> {
    let config = BuildConfig {
        sample_fraction: args.sample_fraction,
        seed: if args.unseeded { None } else { Some(args.seed) },
        analyzer: Analyzer { stem: args.stem, ..Analyzer::default() },
        idf_scheme: args.idf,
        sublinear_tf: args.sublinear_tf,
    };
    let source: Box<dyn CorpusSource> = match (args.db, args.srt_dir) {
        (Some(db), _) => {
            let layout = SqliteLayout {
                table: args.table,
                id_column: args.id_column,
                name_column: args.name_column,
                content_column: args.content_column,
            };
            Box::new(SqliteCorpus::new(db, layout))
        }
        (None, Some(dir)) => Box::new(SrtDirCorpus::new(dir)),
        (None, None) => bail!("either --db or --srt-dir is required"),
    };

    let (index, meta) = build_index(source.as_ref(), &config).context("failed to build index")?;
    SnapshotStore::new(&args.output).save(&index, &meta).context("failed to save snapshot")?;
    tracing::info!(output = %args.output, num_docs = meta.num_docs, num_terms = meta.num_terms, "index build complete");
    Ok(())
}

fn inspect(snapshot: &str) -> Result<()> {
    let (index, meta) = SnapshotStore::new(snapshot).load()?;
    println!("{}", serde_json::to_string_pretty(&meta)?);
    let nnz: usize = index.document_vectors().iter().map(|v| v.nnz()).sum();
    let model = index.term_model();
    println!(
        "documents={} terms={} nonzeros={} idf={:?} sublinear_tf={} stem={}",
        index.len(),
        model.num_terms(),
        nnz,
        model.idf_scheme,
        model.sublinear_tf,
        model.analyzer.stem
    );
    Ok(())
}

fn query(snapshot: &str, q: &str, k: usize) -> Result<()> {
    let (index, _) = SnapshotStore::new(snapshot).load()?;
    let results = index.rank(q, k)?;
    if results.iter().all(|r| r.score == 0.0) {
        println!("No relevant subtitles found.");
        return Ok(());
    }
    for (i, r) in results.iter().enumerate() {
        println!("{:>2}. {:.4}  [{}] {}", i + 1, r.score, r.id, r.name);
        println!("    {}", r.snippet);
    }
    Ok(())
}
