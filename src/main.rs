use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use callsight::{
    EmotionEngine, EmotionTables, HttpSentimentClassifier, SentimentApiConfig, SentimentClassifier,
    SentimentPassConfig, Summarizer, SummarizerConfig, execute_emotion_pass,
    execute_sentiment_pass,
};

#[derive(Parser)]
#[command(name = "callsight")]
#[command(author, version, about = "Earnings-call transcript sentiment and emotion annotation pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate transcripts with sentence- and turn-level sentiment
    Sentiment {
        /// Input transcript file or directory of .xml transcripts
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for annotated output (defaults to rewriting in place)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Maximum retries per classification request
        #[arg(long, default_value = "2")]
        max_retries: u32,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Annotate sentiment-scored transcripts with per-turn emotions
    Emotion {
        /// Input transcript file or directory of .xml transcripts
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for annotated output (defaults to rewriting in place)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Score range table JSON (emotion -> score ranges)
        #[arg(long)]
        score_ranges: Option<PathBuf>,

        /// Keyword stem table JSON (emotion -> stems)
        #[arg(long)]
        keywords: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the sentiment and emotion passes back to back
    Annotate {
        /// Input transcript file or directory of .xml transcripts
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for annotated output (defaults to rewriting in place)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Maximum retries per classification request
        #[arg(long, default_value = "2")]
        max_retries: u32,

        /// Score range table JSON (emotion -> score ranges)
        #[arg(long)]
        score_ranges: Option<PathBuf>,

        /// Keyword stem table JSON (emotion -> stems)
        #[arg(long)]
        keywords: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Summarize a question or answer passage
    Summarize {
        /// Passage text
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// File containing the passage
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Treat the passage as an answer rather than a question
        #[arg(long)]
        answer: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sentiment {
            input,
            output_dir,
            max_retries,
            verbose,
        } => {
            setup_logging(verbose);
            sentiment_command(input, output_dir, max_retries).await
        }
        Commands::Emotion {
            input,
            output_dir,
            score_ranges,
            keywords,
            verbose,
        } => {
            setup_logging(verbose);
            emotion_command(input, output_dir, score_ranges, keywords)
        }
        Commands::Annotate {
            input,
            output_dir,
            max_retries,
            score_ranges,
            keywords,
            verbose,
        } => {
            setup_logging(verbose);
            annotate_command(input, output_dir, max_retries, score_ranges, keywords).await
        }
        Commands::Summarize {
            text,
            file,
            answer,
            verbose,
        } => {
            setup_logging(verbose);
            summarize_command(text, file, answer).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn sentiment_command(
    input: PathBuf,
    output_dir: Option<PathBuf>,
    max_retries: u32,
) -> Result<()> {
    let classifier = HttpSentimentClassifier::new(SentimentApiConfig::from_env()?)?;
    let config = SentimentPassConfig { max_retries };
    let documents = collect_documents(&input)?;
    prepare_output_dir(output_dir.as_deref())?;

    let mut failed = 0;
    for document in &documents {
        let output = output_path(document, output_dir.as_deref())?;
        info!("Processing {:?}", document);
        if let Err(e) = run_sentiment(&classifier, document, &output, &config).await {
            warn!("Sentiment pass failed for {:?}: {:#}", document, e);
            failed += 1;
        }
    }
    finish_batch(failed, documents.len())
}

fn emotion_command(
    input: PathBuf,
    output_dir: Option<PathBuf>,
    score_ranges: Option<PathBuf>,
    keywords: Option<PathBuf>,
) -> Result<()> {
    let engine = EmotionEngine::new(EmotionTables::load(
        score_ranges.as_deref(),
        keywords.as_deref(),
    )?);
    let documents = collect_documents(&input)?;
    prepare_output_dir(output_dir.as_deref())?;

    let mut failed = 0;
    for document in &documents {
        let output = output_path(document, output_dir.as_deref())?;
        info!("Processing {:?}", document);
        if let Err(e) = run_emotion(&engine, document, &output) {
            warn!("Emotion pass failed for {:?}: {:#}", document, e);
            failed += 1;
        }
    }
    finish_batch(failed, documents.len())
}

async fn annotate_command(
    input: PathBuf,
    output_dir: Option<PathBuf>,
    max_retries: u32,
    score_ranges: Option<PathBuf>,
    keywords: Option<PathBuf>,
) -> Result<()> {
    let classifier = HttpSentimentClassifier::new(SentimentApiConfig::from_env()?)?;
    let config = SentimentPassConfig { max_retries };
    let engine = EmotionEngine::new(EmotionTables::load(
        score_ranges.as_deref(),
        keywords.as_deref(),
    )?);
    let documents = collect_documents(&input)?;
    prepare_output_dir(output_dir.as_deref())?;

    let mut failed = 0;
    for document in &documents {
        let output = output_path(document, output_dir.as_deref())?;
        info!("Processing {:?}", document);
        // the emotion pass reads the sentiment pass output and rewrites it
        let result = match run_sentiment(&classifier, document, &output, &config).await {
            Ok(()) => run_emotion(&engine, &output, &output),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!("Annotation failed for {:?}: {:#}", document, e);
            failed += 1;
        }
    }
    finish_batch(failed, documents.len())
}

async fn summarize_command(
    text: Option<String>,
    file: Option<PathBuf>,
    answer: bool,
) -> Result<()> {
    let passage = match (text, file) {
        (Some(text), _) => text,
        (None, Some(file)) => std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read passage {:?}", file))?,
        (None, None) => bail!("provide a passage with --text or --file"),
    };

    let summarizer = Summarizer::new(SummarizerConfig::from_env()?);
    let summary = summarizer.summarize(&passage, !answer).await?;
    println!("{}", summary);
    Ok(())
}

async fn run_sentiment<C: SentimentClassifier>(
    classifier: &C,
    input: &Path,
    output: &Path,
    config: &SentimentPassConfig,
) -> Result<()> {
    let result = execute_sentiment_pass(classifier, input, output, config).await?;
    info!(
        "Sentiment: {} statements, {} turns annotated",
        result.statements_annotated, result.turns_annotated
    );
    Ok(())
}

fn run_emotion(engine: &EmotionEngine, input: &Path, output: &Path) -> Result<()> {
    let result = execute_emotion_pass(engine, input, output)?;
    info!(
        "Emotion: {} turns classified, {} operator turns skipped",
        result.turns_classified, result.operator_turns_skipped
    );
    Ok(())
}

/// Collect the documents to process: the file itself, or every .xml file in
/// the directory, sorted for determinism
fn collect_documents(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("input {:?} is neither a file nor a directory", input);
    }

    let mut documents: Vec<PathBuf> = std::fs::read_dir(input)
        .with_context(|| format!("failed to read directory {:?}", input))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    documents.sort();

    if documents.is_empty() {
        bail!("no .xml transcripts found in {:?}", input);
    }
    Ok(documents)
}

fn prepare_output_dir(output_dir: Option<&Path>) -> Result<()> {
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {:?}", dir))?;
    }
    Ok(())
}

fn output_path(document: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    match output_dir {
        Some(dir) => {
            let name = document
                .file_name()
                .with_context(|| format!("document {:?} has no file name", document))?;
            Ok(dir.join(name))
        }
        None => Ok(document.to_path_buf()),
    }
}

fn finish_batch(failed: usize, total: usize) -> Result<()> {
    if failed > 0 {
        bail!("{} of {} documents failed", failed, total);
    }
    info!("Complete: {} documents processed", total);
    Ok(())
}
